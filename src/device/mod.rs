//! Device state shared with the effects
//!
//! Typing cadence, connectivity and battery level are owned here instead of
//! living in globals. The engine updates them from incoming events and hands
//! effects a shared reference while rendering.

mod connectivity;
mod wpm;

pub use connectivity::{
    CONNECTED_DISPLAY, CONNECTING_BLINK_PERIOD, ConnectivityMonitor, ConnectivityStatus,
    PAIRING_BLINK_PERIOD,
};
pub use wpm::{WPM_BUFFER_LENGTH, WPM_INTERVAL, WpmEstimator};

/// Device power activity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityState {
    Active,
    Idle,
    Sleep,
}

/// Events delivered by the device's event sources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FxEvent {
    /// A key changed state
    KeyPosition { position: usize, pressed: bool },
    /// The selected connection profile or its state changed
    Connectivity(ConnectivityStatus),
    /// The device became active or is about to sleep
    Activity(ActivityState),
    /// New battery state of charge, in percent
    BatteryLevel(u8),
}

/// Device-wide state read by effects during a render pass
#[derive(Debug, Clone, Default)]
pub struct DeviceState {
    pub wpm: WpmEstimator,
    pub connectivity: ConnectivityMonitor,
    battery_level: u8,
}

impl DeviceState {
    pub const fn new() -> Self {
        Self {
            wpm: WpmEstimator::new(),
            connectivity: ConnectivityMonitor::new(),
            battery_level: 0,
        }
    }

    /// Battery state of charge in percent
    pub const fn battery_level(&self) -> u8 {
        self.battery_level
    }

    pub fn set_battery_level(&mut self, level: u8) {
        self.battery_level = level.min(100);
    }
}
