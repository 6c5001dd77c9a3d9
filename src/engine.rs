//! The engine: one owner for the effect tree, the frame buffer and the device
//! state.
//!
//! Everything runs from [`Engine::tick`]. Each tick drains queued intents,
//! services the deadlines (typing-speed interval, indicator blink, debounced
//! saves) and renders a frame if the scheduler says one is due. The caller
//! sleeps until the returned deadline or until it queues a new intent.

use embassy_time::{Duration, Instant};
use log::{debug, info, warn};

use crate::control::{CommandKind, ControlCommand, ControlZones, StateStore};
use crate::device::{ActivityState, DeviceState, FxEvent};
use crate::dispatch::{FxIntent, IntentReceiver};
use crate::effect::{EffectTree, FxContext, FxId};
use crate::error::FxError;
use crate::frame_scheduler::FrameScheduler;
use crate::pixel::{FrameBuffer, PixelLayout};
use crate::{FRAME_DURATION, PixelSink};

/// Configuration for the engine
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub layout: PixelLayout,
    pub frame_duration: Duration,
}

impl EngineConfig {
    pub const fn new(layout: PixelLayout) -> Self {
        Self {
            layout,
            frame_duration: FRAME_DURATION,
        }
    }
}

/// Result of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameResult {
    /// A frame was rendered and flushed
    pub rendered: bool,
    /// Earliest pending deadline, `None` when only a new intent can wake the engine
    pub next_deadline: Option<Instant>,
    /// Time until `next_deadline`
    pub sleep_duration: Option<Duration>,
}

/// RGB effect engine
///
/// `N` is the frame buffer capacity, `Q` the intent channel size.
pub struct Engine<'a, S: PixelSink, T: StateStore, const N: usize, const Q: usize> {
    intents: IntentReceiver<'a, Q>,
    sink: S,
    store: T,

    tree: EffectTree,
    root: FxId,

    buffer: FrameBuffer<N>,
    scheduler: FrameScheduler,
    device: DeviceState,
    zones: ControlZones,
}

impl<'a, S: PixelSink, T: StateStore, const N: usize, const Q: usize> Engine<'a, S, T, N, Q> {
    /// Create an engine rendering `root` of `tree`
    ///
    /// Control groups are restored from `store` right away. Nothing renders
    /// until [`Engine::start`] or an activity event starts the root.
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(
        intents: IntentReceiver<'a, Q>,
        sink: S,
        mut store: T,
        mut tree: EffectTree,
        root: FxId,
        config: &EngineConfig,
    ) -> Self {
        tree.load_persisted(&mut store);
        let zones = ControlZones::new(tree.control_group_count() as u8);

        Self {
            intents,
            sink,
            store,
            tree,
            root,
            buffer: FrameBuffer::new(&config.layout),
            scheduler: FrameScheduler::with_frame_duration(config.frame_duration),
            device: DeviceState::new(),
            zones,
        }
    }

    /// Start the root effect
    pub fn start(&mut self, now: Instant) {
        info!("rgb fx: starting");
        let mut ctx = FxContext::new(now, &mut self.scheduler, &self.device);
        self.tree.start(self.root, &mut ctx);
    }

    /// Stop the root effect and drop every outstanding frame
    pub fn stop(&mut self, now: Instant) {
        info!("rgb fx: stopping");
        let mut ctx = FxContext::new(now, &mut self.scheduler, &self.device);
        self.tree.stop(self.root, &mut ctx);
        self.scheduler.stop();
    }

    /// Process one engine step
    ///
    /// Call again no later than the returned deadline, and whenever an intent
    /// was queued.
    pub fn tick(&mut self, now: Instant) -> FrameResult {
        self.process_intents(now);

        self.device.wpm.poll(now, &mut self.scheduler);
        self.device.connectivity.poll(now, &mut self.scheduler);
        self.tree.poll_persistence(now, &mut self.store);

        let rendered = self.scheduler.begin_frame(now);
        if rendered {
            self.render(now);
            self.scheduler.end_frame();
        }

        let next_deadline = self.next_deadline(now);
        FrameResult {
            rendered,
            next_deadline,
            sleep_duration: next_deadline.map(|deadline| {
                deadline
                    .checked_duration_since(now)
                    .unwrap_or(Duration::from_ticks(0))
            }),
        }
    }

    /// Earliest of the frame, typing-speed, blink and save deadlines
    pub fn next_deadline(&self, now: Instant) -> Option<Instant> {
        [
            self.scheduler.next_deadline(now),
            self.device.wpm.deadline(),
            self.device.connectivity.deadline(),
            self.tree.save_deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Apply a device event
    pub fn handle_event(&mut self, event: FxEvent, now: Instant) {
        match event {
            FxEvent::KeyPosition { position, pressed } => {
                if !pressed {
                    return;
                }

                self.device.wpm.on_key_press(now);

                if let Some(pixel) = self.buffer.pixel_for_key(position) {
                    let mut ctx = FxContext::new(now, &mut self.scheduler, &self.device);
                    self.tree.on_key_press(pixel, &mut ctx);
                }
            }
            FxEvent::BatteryLevel(level) => {
                self.device.set_battery_level(level);
                self.scheduler.request_frames(1);
            }
            FxEvent::Connectivity(status) => {
                self.device.connectivity.update(status, now, &mut self.scheduler);
            }
            FxEvent::Activity(ActivityState::Active) => self.start(now),
            FxEvent::Activity(ActivityState::Sleep) => self.stop(now),
            FxEvent::Activity(ActivityState::Idle) => {}
        }
    }

    /// Apply a control command
    ///
    /// Zone commands move the zone cursor. Every other command goes to the
    /// control group of its zone, [`crate::CURRENT_ZONE`] meaning the cursor.
    pub fn handle_command(&mut self, command: ControlCommand, now: Instant) -> Result<(), FxError> {
        match command.kind {
            CommandKind::NextControlZone => {
                self.zones.next();
                debug!("rgb fx: control zone {}", self.zones.current());
                Ok(())
            }
            CommandKind::PreviousControlZone => {
                self.zones.previous();
                debug!("rgb fx: control zone {}", self.zones.current());
                Ok(())
            }
            kind => {
                let zone = self.zones.resolve(command.zone)?;
                let mut ctx = FxContext::new(now, &mut self.scheduler, &self.device);
                self.tree.handle_command(zone, kind, command.param, &mut ctx)
            }
        }
    }

    fn process_intents(&mut self, now: Instant) {
        while let Ok(intent) = self.intents.try_receive() {
            match intent {
                FxIntent::Event(event) => self.handle_event(event, now),
                FxIntent::Command(command) => {
                    if let Err(err) = self.handle_command(command, now) {
                        warn!("rgb fx: command {:?} failed: {}", command, err);
                    }
                }
            }
        }
    }

    fn render(&mut self, now: Instant) {
        self.buffer.reset();

        let mut ctx = FxContext::new(now, &mut self.scheduler, &self.device);
        self.tree.render_frame(self.root, self.buffer.pixels_mut(), &mut ctx);

        self.buffer.flush(&mut self.sink);
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn device(&self) -> &DeviceState {
        &self.device
    }

    pub fn tree(&self) -> &EffectTree {
        &self.tree
    }

    pub fn buffer(&self) -> &FrameBuffer<N> {
        &self.buffer
    }

    pub fn zones(&self) -> &ControlZones {
        &self.zones
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn store(&self) -> &T {
        &self.store
    }
}
