//! Control group: a persisted selector over candidate effects
//!
//! The group owns the enable flag, the brightness level and the selected
//! candidate. Commands update that state and report which effects to stop and
//! start; the tree carries those out since it owns the candidates. Every
//! change arms a debounced save, so a burst of commands results in one write.

use embassy_time::{Duration, Instant};
use heapless::Vec;

use super::{Children, FxId};
use crate::control::{CommandKind, ControlGroupState, STATE_RECORD_SIZE};
use crate::error::FxError;

/// Quiet period before a changed state is written
pub const DEFAULT_SAVE_DEBOUNCE: Duration = Duration::from_secs(60);

const DEFAULT_BRIGHTNESS_STEPS: u8 = 10;

#[derive(Debug, Clone, Copy)]
pub struct ControlGroupConfig {
    /// Key of the persisted record
    pub name: &'static str,
    pub brightness_steps: u8,
    pub save_debounce: Duration,
}

impl ControlGroupConfig {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            brightness_steps: DEFAULT_BRIGHTNESS_STEPS,
            save_debounce: DEFAULT_SAVE_DEBOUNCE,
        }
    }

    #[must_use]
    pub const fn with_brightness_steps(mut self, steps: u8) -> Self {
        self.brightness_steps = steps;
        self
    }

    #[must_use]
    pub const fn with_save_debounce(mut self, debounce: Duration) -> Self {
        self.save_debounce = debounce;
        self
    }
}

/// Effects a command asks the tree to stop and start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommandOutcome {
    pub stop: Option<FxId>,
    pub start: Option<FxId>,
    /// State changed; a refresh frame and a save are due
    pub changed: bool,
}

impl CommandOutcome {
    const UNCHANGED: Self = Self {
        stop: None,
        start: None,
        changed: false,
    };

    const fn changed(stop: Option<FxId>, start: Option<FxId>) -> Self {
        Self {
            stop,
            start,
            changed: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ControlGroupEffect {
    config: ControlGroupConfig,
    candidates: Children,
    state: ControlGroupState,
    pending_save: Option<Instant>,
}

impl ControlGroupEffect {
    /// Fails with [`FxError::Unsupported`] for an empty candidate list and
    /// with [`FxError::ResourceExhausted`] past [`crate::MAX_CHILDREN`]
    pub fn new(config: ControlGroupConfig, candidates: &[FxId]) -> Result<Self, FxError> {
        if candidates.is_empty() || config.brightness_steps == 0 {
            return Err(FxError::Unsupported);
        }
        let candidates = Vec::from_slice(candidates).map_err(|()| FxError::ResourceExhausted)?;

        Ok(Self {
            state: ControlGroupState::new(config.brightness_steps),
            config,
            candidates,
            pending_save: None,
        })
    }

    pub const fn name(&self) -> &'static str {
        self.config.name
    }

    pub const fn state(&self) -> ControlGroupState {
        self.state
    }

    pub const fn brightness_steps(&self) -> u8 {
        self.config.brightness_steps
    }

    pub fn candidates(&self) -> &[FxId] {
        &self.candidates
    }

    pub fn current_effect(&self) -> FxId {
        self.candidates[usize::from(self.state.current)]
    }

    /// Current effect, if the group is active
    pub fn active_effect(&self) -> Option<FxId> {
        self.state.active.then(|| self.current_effect())
    }

    /// Scale applied after rendering, `None` at full brightness
    pub fn brightness_factor(&self) -> Option<f32> {
        if self.state.brightness >= self.config.brightness_steps {
            return None;
        }
        Some(f32::from(self.state.brightness) / f32::from(self.config.brightness_steps))
    }

    pub const fn pending_save(&self) -> Option<Instant> {
        self.pending_save
    }

    /// Replace the state with a persisted one, without scheduling a save
    ///
    /// States out of range for this group fail with
    /// [`FxError::InvalidPersistedState`] and leave the current state in place.
    pub fn restore(&mut self, state: ControlGroupState) -> Result<(), FxError> {
        self.state = state.validate(self.config.brightness_steps, self.candidates.len())?;
        Ok(())
    }

    /// Take the record to write if the debounce expired by `now`
    pub fn take_due_record(&mut self, now: Instant) -> Option<[u8; STATE_RECORD_SIZE]> {
        let due = self.pending_save?;
        if now < due {
            return None;
        }

        self.pending_save = None;
        Some(self.state.to_bytes())
    }

    /// Update the state for one command
    ///
    /// Out-of-range selections and zone commands fail with
    /// [`FxError::Unsupported`] and leave the state untouched. Dimming at zero,
    /// brightening at full and selecting the current effect succeed without
    /// changing anything.
    pub fn apply(
        &mut self,
        kind: CommandKind,
        param: u8,
        now: Instant,
    ) -> Result<CommandOutcome, FxError> {
        let outcome = match kind {
            CommandKind::Toggle => {
                self.state.active = !self.state.active;
                let current = Some(self.current_effect());
                if self.state.active {
                    CommandOutcome::changed(None, current)
                } else {
                    CommandOutcome::changed(current, None)
                }
            }
            CommandKind::Next => {
                let next = (usize::from(self.state.current) + 1) % self.candidates.len();
                let Some(outcome) = self.select(next) else {
                    return Ok(CommandOutcome::UNCHANGED);
                };
                outcome
            }
            CommandKind::Previous => {
                let current = usize::from(self.state.current);
                let previous = current.checked_sub(1).unwrap_or(self.candidates.len() - 1);
                let Some(outcome) = self.select(previous) else {
                    return Ok(CommandOutcome::UNCHANGED);
                };
                outcome
            }
            CommandKind::Select => {
                let index = usize::from(param);
                if index >= self.candidates.len() {
                    return Err(FxError::Unsupported);
                }
                let Some(outcome) = self.select(index) else {
                    return Ok(CommandOutcome::UNCHANGED);
                };
                outcome
            }
            CommandKind::Brighten => {
                if self.state.brightness >= self.config.brightness_steps {
                    return Ok(CommandOutcome::UNCHANGED);
                }
                let start = if self.state.brightness == 0 {
                    self.active_effect()
                } else {
                    None
                };
                self.state.brightness += 1;
                CommandOutcome::changed(None, start)
            }
            CommandKind::Dim => {
                if self.state.brightness == 0 {
                    return Ok(CommandOutcome::UNCHANGED);
                }
                self.state.brightness -= 1;
                let stop = if self.state.brightness == 0 {
                    self.active_effect()
                } else {
                    None
                };
                CommandOutcome::changed(stop, None)
            }
            CommandKind::NextControlZone | CommandKind::PreviousControlZone => {
                return Err(FxError::Unsupported);
            }
        };

        self.pending_save = Some(now + self.config.save_debounce);
        Ok(outcome)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn select(&mut self, index: usize) -> Option<CommandOutcome> {
        if index == usize::from(self.state.current) {
            return None;
        }

        let outgoing = self.active_effect();
        self.state.current = index as u8;
        let incoming = self.active_effect();

        Some(CommandOutcome::changed(outgoing, incoming))
    }
}
