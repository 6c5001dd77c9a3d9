//! Effect system with compile-time known effect variants
//!
//! All effects are stored in an enum to avoid heap allocations. Effects that
//! contain other effects (composites and control groups) refer to their
//! children by [`FxId`] inside one [`EffectTree`] arena, so the whole tree is
//! a flat fixed-capacity array traversed by index.

mod battery_gauge;
mod composite;
mod connectivity;
mod control_group;
mod gauge;
mod linear_gradient;
mod ripple;
mod solid;
mod sparkle;
mod static_color;
mod wpm;

use embassy_time::Instant;
use heapless::Vec;
use log::{debug, warn};

pub use battery_gauge::{BatteryGaugeConfig, BatteryGaugeEffect};
pub use composite::CompositeEffect;
pub use connectivity::{ConnectivityIndicatorConfig, ConnectivityIndicatorEffect};
pub use control_group::{
    CommandOutcome, ControlGroupConfig, ControlGroupEffect, DEFAULT_SAVE_DEBOUNCE,
};
pub use gauge::{GaugeAxis, GaugeBar, GaugeConfig, GaugeEffect, GaugeSource};
pub use linear_gradient::{LinearGradientConfig, LinearGradientEffect};
pub use ripple::{RippleConfig, RippleEffect, RippleEvent};
pub use solid::{SolidConfig, SolidEffect};
pub use sparkle::{SparkleConfig, SparkleEffect, Twinkle};
pub use static_color::{StaticConfig, StaticEffect};
pub use wpm::{WpmIndicatorConfig, WpmIndicatorEffect};

use crate::color::{BlendMode, ColorRgb};
use crate::control::{CommandKind, ControlGroupState, StateStore};
use crate::device::DeviceState;
use crate::error::FxError;
use crate::frame_scheduler::FrameScheduler;
use crate::pixel::Pixel;
use crate::{MAX_CHILDREN, MAX_CONTROL_GROUPS, MAX_EFFECTS};

/// Longest persisted record the tree reads back
const RECORD_BUFFER_SIZE: usize = 8;

/// Ordered child list of a composite or control group
pub type Children = Vec<FxId, MAX_CHILDREN>;

/// What an effect sees while it runs
pub struct FxContext<'a> {
    pub now: Instant,
    pub frames: &'a mut FrameScheduler,
    pub device: &'a DeviceState,
}

impl<'a> FxContext<'a> {
    pub fn new(now: Instant, frames: &'a mut FrameScheduler, device: &'a DeviceState) -> Self {
        Self {
            now,
            frames,
            device,
        }
    }

    /// Ask for at least `frames` more frames
    pub fn request_frames(&mut self, frames: u32) {
        self.frames.request_frames(frames);
    }
}

/// Capability set of every effect
///
/// Effects only write to the pixels of their own pixel index map and never
/// allocate after construction. An effect that keeps animating must request
/// another frame from its own render pass.
pub trait Effect {
    /// Activate the effect, idempotent
    fn start(&mut self, ctx: &mut FxContext<'_>) {
        ctx.request_frames(1);
    }

    /// Deactivate the effect
    fn stop(&mut self, _ctx: &mut FxContext<'_>) {}

    /// Blend this effect's contribution into the frame
    fn render_frame(&mut self, pixels: &mut [Pixel], ctx: &mut FxContext<'_>);
}

/// Blend `color` into the pixel at `index`, ignoring indices outside the frame
#[inline]
pub(crate) fn blend_at(pixels: &mut [Pixel], index: usize, color: ColorRgb, mode: BlendMode) {
    if let Some(pixel) = pixels.get_mut(index) {
        pixel.blend(color, mode);
    }
}

/// Handle of an effect inside an [`EffectTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FxId(u8);

impl FxId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Effect slot - enum containing all possible effects
#[derive(Debug, Clone)]
pub enum EffectSlot {
    Solid(SolidEffect),
    Static(StaticEffect),
    LinearGradient(LinearGradientEffect),
    Gauge(GaugeEffect),
    Ripple(RippleEffect),
    Sparkle(SparkleEffect),
    Wpm(WpmIndicatorEffect),
    BatteryGauge(BatteryGaugeEffect),
    Connectivity(ConnectivityIndicatorEffect),
    Composite(CompositeEffect),
    ControlGroup(ControlGroupEffect),
}

impl EffectSlot {
    /// The effect behind a slot that has no children
    pub fn leaf_mut(&mut self) -> Option<&mut dyn Effect> {
        let effect: &mut dyn Effect = match self {
            Self::Solid(effect) => effect,
            Self::Static(effect) => effect,
            Self::LinearGradient(effect) => effect,
            Self::Gauge(effect) => effect,
            Self::Ripple(effect) => effect,
            Self::Sparkle(effect) => effect,
            Self::Wpm(effect) => effect,
            Self::BatteryGauge(effect) => effect,
            Self::Connectivity(effect) => effect,
            Self::Composite(_) | Self::ControlGroup(_) => return None,
        };
        Some(effect)
    }

    /// Effects referenced by this slot
    pub fn children(&self) -> &[FxId] {
        match self {
            Self::Composite(effect) => effect.children(),
            Self::ControlGroup(effect) => effect.candidates(),
            _ => &[],
        }
    }
}

/// Fixed-capacity arena holding a whole effect tree
///
/// Children must be added before their parents, which keeps the tree acyclic.
/// Slots are never replaced after they are added.
/// Control groups are numbered in insertion order; that number is the zone
/// commands address.
#[derive(Debug, Default)]
pub struct EffectTree {
    slots: Vec<EffectSlot, MAX_EFFECTS>,
    groups: Vec<FxId, MAX_CONTROL_GROUPS>,
}

impl EffectTree {
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Add an effect and return its handle
    ///
    /// Fails with [`FxError::Unsupported`] if the slot refers to an effect that
    /// was not added yet, and with [`FxError::ResourceExhausted`] when the
    /// arena or the control-group table is full.
    pub fn add(&mut self, slot: EffectSlot) -> Result<FxId, FxError> {
        if slot
            .children()
            .iter()
            .any(|child| child.index() >= self.slots.len())
        {
            return Err(FxError::Unsupported);
        }

        let id = u8::try_from(self.slots.len())
            .map(FxId)
            .map_err(|_| FxError::ResourceExhausted)?;

        if matches!(slot, EffectSlot::ControlGroup(_)) {
            self.groups.push(id).map_err(|_| FxError::ResourceExhausted)?;
        }

        if self.slots.push(slot).is_err() {
            if self.groups.last() == Some(&id) {
                self.groups.pop();
            }
            return Err(FxError::ResourceExhausted);
        }

        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, id: FxId) -> Option<&EffectSlot> {
        self.slots.get(id.index())
    }

    pub fn control_group_count(&self) -> usize {
        self.groups.len()
    }

    /// Handle of the control group addressed by `zone`
    pub fn control_group_id(&self, zone: usize) -> Option<FxId> {
        self.groups.get(zone).copied()
    }

    pub fn control_group(&self, zone: usize) -> Option<&ControlGroupEffect> {
        match self.get(self.control_group_id(zone)?)? {
            EffectSlot::ControlGroup(group) => Some(group),
            _ => None,
        }
    }

    pub fn start(&mut self, id: FxId, ctx: &mut FxContext<'_>) {
        match self.slots.get_mut(id.index()) {
            None => {}
            Some(EffectSlot::Composite(composite)) => {
                let children = composite.children_list();
                for child in children {
                    self.start(child, ctx);
                }
            }
            Some(EffectSlot::ControlGroup(group)) => {
                if let Some(current) = group.active_effect() {
                    self.start(current, ctx);
                }
            }
            Some(slot) => {
                if let Some(effect) = slot.leaf_mut() {
                    effect.start(ctx);
                }
            }
        }
    }

    pub fn stop(&mut self, id: FxId, ctx: &mut FxContext<'_>) {
        match self.slots.get_mut(id.index()) {
            None => {}
            Some(EffectSlot::Composite(composite)) => {
                let children = composite.children_list();
                for child in children {
                    self.stop(child, ctx);
                }
            }
            Some(EffectSlot::ControlGroup(group)) => {
                let current = group.current_effect();
                self.stop(current, ctx);
            }
            Some(slot) => {
                if let Some(effect) = slot.leaf_mut() {
                    effect.stop(ctx);
                }
            }
        }
    }

    /// Render the subtree rooted at `id`, children in order
    pub fn render_frame(&mut self, id: FxId, pixels: &mut [Pixel], ctx: &mut FxContext<'_>) {
        match self.slots.get_mut(id.index()) {
            None => {}
            Some(EffectSlot::Composite(composite)) => {
                let children = composite.children_list();
                for child in children {
                    self.render_frame(child, pixels, ctx);
                }
            }
            Some(EffectSlot::ControlGroup(group)) => {
                let Some(current) = group.active_effect() else {
                    return;
                };
                let factor = group.brightness_factor();

                self.render_frame(current, pixels, ctx);

                if let Some(factor) = factor {
                    for pixel in pixels.iter_mut() {
                        pixel.value = pixel.value.scale(factor);
                    }
                }
            }
            Some(slot) => {
                if let Some(effect) = slot.leaf_mut() {
                    effect.render_frame(pixels, ctx);
                }
            }
        }
    }

    /// Apply a command to the control group addressed by `zone`
    pub fn handle_command(
        &mut self,
        zone: usize,
        kind: CommandKind,
        param: u8,
        ctx: &mut FxContext<'_>,
    ) -> Result<(), FxError> {
        let id = self.control_group_id(zone).ok_or(FxError::Unsupported)?;
        let Some(EffectSlot::ControlGroup(group)) = self.slots.get_mut(id.index()) else {
            return Err(FxError::Unsupported);
        };

        let outcome = group.apply(kind, param, ctx.now)?;
        debug!(
            "control group {}: {:?} -> {:?}",
            group.name(),
            kind,
            group.state()
        );

        if let Some(outgoing) = outcome.stop {
            self.stop(outgoing, ctx);
        }
        if let Some(incoming) = outcome.start {
            self.start(incoming, ctx);
        }
        if outcome.changed {
            ctx.request_frames(1);
        }

        Ok(())
    }

    /// Feed a key press on `pixel` to every ripple effect
    pub fn on_key_press(&mut self, pixel: usize, ctx: &mut FxContext<'_>) {
        for slot in &mut self.slots {
            if let EffectSlot::Ripple(ripple) = slot
                && let Err(err) = ripple.on_key_press(pixel, ctx)
            {
                warn!("ripple dropped key press on pixel {}: {}", pixel, err);
            }
        }
    }

    /// Earliest pending debounced write
    pub fn save_deadline(&self) -> Option<Instant> {
        self.control_groups().filter_map(ControlGroupEffect::pending_save).min()
    }

    /// Write every control-group record whose debounce expired
    pub fn poll_persistence<T: StateStore>(&mut self, now: Instant, store: &mut T) {
        for slot in &mut self.slots {
            if let EffectSlot::ControlGroup(group) = slot
                && let Some(record) = group.take_due_record(now)
            {
                debug!("control group {}: saving state", group.name());
                store.save(group.name(), &record);
            }
        }
    }

    /// Restore every control group from its persisted record
    ///
    /// Missing records keep the defaults, invalid ones are reported and ignored.
    pub fn load_persisted<T: StateStore>(&mut self, store: &mut T) {
        for slot in &mut self.slots {
            let EffectSlot::ControlGroup(group) = slot else {
                continue;
            };

            let mut buf = [0u8; RECORD_BUFFER_SIZE];
            let Some(len) = store.load(group.name(), &mut buf) else {
                continue;
            };

            let record = &buf[..len.min(RECORD_BUFFER_SIZE)];
            let restored = ControlGroupState::from_bytes(
                record,
                group.brightness_steps(),
                group.candidates().len(),
            )
            .and_then(|state| group.restore(state));

            if let Err(err) = restored {
                warn!("control group {}: {}", group.name(), err);
            }
        }
    }

    fn control_groups(&self) -> impl Iterator<Item = &ControlGroupEffect> {
        self.slots.iter().filter_map(|slot| match slot {
            EffectSlot::ControlGroup(group) => Some(group),
            _ => None,
        })
    }
}
