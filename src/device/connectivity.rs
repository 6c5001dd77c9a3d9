use embassy_time::{Duration, Instant};
use log::debug;

use crate::frame_scheduler::FrameScheduler;

/// How long the indicator stays lit after a connection is established
pub const CONNECTED_DISPLAY: Duration = Duration::from_millis(3000);

/// Blink period while reconnecting to a bonded host
pub const CONNECTING_BLINK_PERIOD: Duration = Duration::from_millis(200);

/// Blink period while the profile is open for pairing
pub const PAIRING_BLINK_PERIOD: Duration = Duration::from_millis(1000);

/// State of the selected connection profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectivityStatus {
    /// Wireless transport is the selected endpoint
    pub active: bool,
    pub profile_index: u8,
    /// The profile has a bonded host
    pub bonded: bool,
    pub connected: bool,
}

impl ConnectivityStatus {
    /// Wireless transport not selected
    pub const fn inactive() -> Self {
        Self {
            active: false,
            profile_index: 0,
            bonded: false,
            connected: false,
        }
    }

    pub const fn connected(profile_index: u8) -> Self {
        Self {
            active: true,
            profile_index,
            bonded: true,
            connected: true,
        }
    }

    /// Bonded profile waiting for its host
    pub const fn connecting(profile_index: u8) -> Self {
        Self {
            active: true,
            profile_index,
            bonded: true,
            connected: false,
        }
    }

    /// Open profile advertising for a new host
    pub const fn pairing(profile_index: u8) -> Self {
        Self {
            active: true,
            profile_index,
            bonded: false,
            connected: false,
        }
    }
}

/// Tracks the selected profile and drives the indicator blink
///
/// Profiles are mutually exclusive, so one blink phase serves every indicator.
#[derive(Debug, Clone, Default)]
pub struct ConnectivityMonitor {
    status: ConnectivityStatus,
    indicator_on: bool,
    blink_period: Option<Duration>,
    next_toggle: Option<Instant>,
}

impl ConnectivityMonitor {
    pub const fn new() -> Self {
        Self {
            status: ConnectivityStatus::inactive(),
            indicator_on: false,
            blink_period: None,
            next_toggle: None,
        }
    }

    pub const fn status(&self) -> ConnectivityStatus {
        self.status
    }

    /// Current blink phase
    pub const fn indicator_on(&self) -> bool {
        self.indicator_on
    }

    pub const fn deadline(&self) -> Option<Instant> {
        self.next_toggle
    }

    /// Apply a new connection status and restart the blink pattern
    pub fn update(
        &mut self,
        status: ConnectivityStatus,
        now: Instant,
        frames: &mut FrameScheduler,
    ) {
        frames.request_frames(1);

        if !status.active {
            debug!("connectivity: wireless inactive");
            self.status = ConnectivityStatus::inactive();
            self.indicator_on = false;
            self.blink_period = None;
            self.next_toggle = None;
            return;
        }

        self.status = status;
        self.indicator_on = true;

        if status.connected {
            debug!("connectivity: profile {} connected", status.profile_index);
            self.blink_period = None;
            self.next_toggle = Some(now + CONNECTED_DISPLAY);
        } else if status.bonded {
            debug!("connectivity: profile {} connecting", status.profile_index);
            self.blink_period = Some(CONNECTING_BLINK_PERIOD);
            self.next_toggle = Some(now + CONNECTING_BLINK_PERIOD);
        } else {
            debug!("connectivity: profile {} pairing", status.profile_index);
            self.blink_period = Some(PAIRING_BLINK_PERIOD);
            self.next_toggle = Some(now + PAIRING_BLINK_PERIOD);
        }
    }

    /// Toggle the blink phase once its deadline passed
    pub fn poll(&mut self, now: Instant, frames: &mut FrameScheduler) {
        let Some(due) = self.next_toggle else {
            return;
        };
        if now < due {
            return;
        }

        self.indicator_on = !self.indicator_on;
        frames.request_frames(1);

        self.next_toggle = self.blink_period.map(|period| {
            let next = due + period;
            if next > now { next } else { now + period }
        });
    }
}
