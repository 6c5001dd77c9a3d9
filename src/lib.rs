#![no_std]

pub mod channel;
pub mod color;
pub mod control;
pub mod device;
pub mod dispatch;
pub mod effect;
pub mod engine;
pub mod error;
pub mod frame_scheduler;
pub mod math;
pub mod pixel;

pub use control::{CURRENT_ZONE, CommandKind, ControlCommand, ControlZones, StateStore};
pub use device::{ActivityState, ConnectivityStatus, DeviceState, FxEvent};
pub use dispatch::{FxIntent, IntentChannel, IntentReceiver, IntentSender};
pub use effect::{Effect, EffectSlot, EffectTree, FxContext, FxId};
pub use engine::{Engine, EngineConfig, FrameResult};
pub use error::FxError;
pub use frame_scheduler::{FrameScheduler, SchedulerState};
pub use pixel::{FrameBuffer, Pixel, PixelLayout};

pub use color::{BlendMode, ColorHsl, ColorRgb, Rgb};
pub use embassy_time::{Duration, Instant};

/// Render rate of the periodic frame tick
pub const FPS: u32 = 30;

/// Duration of one frame at [`FPS`]
pub const FRAME_DURATION: Duration = Duration::from_millis(1000 / FPS as u64);

/// Capacity of the frame buffer used by [`Engine`] unless overridden
pub const MAX_PIXELS: usize = 128;

/// Number of effect slots in an [`EffectTree`]
pub const MAX_EFFECTS: usize = 32;

/// Children of one composite or candidates of one control group
pub const MAX_CHILDREN: usize = 16;

/// Number of control groups addressable as command zones
pub const MAX_CONTROL_GROUPS: usize = 8;

/// Colors kept by one palette-driven effect
pub const MAX_PALETTE: usize = 8;

/// Upper bound of a ripple effect's event queue
pub const MAX_RIPPLE_EVENTS: usize = 16;

/// Number of output segments a layout may declare
pub const MAX_SEGMENTS: usize = 4;

/// Pixel output driver
///
/// Implement this trait to push finalized colors to the hardware. The engine
/// calls it once per segment on every rendered frame.
pub trait PixelSink {
    /// Write the colors of one output segment
    fn update(&mut self, segment: usize, colors: &[Rgb]);
}
