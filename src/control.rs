//! Control commands, zones and persisted control-group state

use crate::error::FxError;

const CMD_TOGGLE: u8 = 0;
const CMD_NEXT: u8 = 1;
const CMD_PREVIOUS: u8 = 2;
const CMD_SELECT: u8 = 3;
const CMD_BRIGHTEN: u8 = 4;
const CMD_DIM: u8 = 5;
const CMD_NEXT_CONTROL_ZONE: u8 = 6;
const CMD_PREVIOUS_CONTROL_ZONE: u8 = 7;

/// Zone value addressing whichever zone the cursor points at
pub const CURRENT_ZONE: u8 = 0xFF;

/// Size of a persisted [`ControlGroupState`] record
pub const STATE_RECORD_SIZE: usize = 3;

/// Command kinds accepted by the control interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandKind {
    Toggle = CMD_TOGGLE,
    Next = CMD_NEXT,
    Previous = CMD_PREVIOUS,
    /// Select the candidate given by the command parameter
    Select = CMD_SELECT,
    Brighten = CMD_BRIGHTEN,
    Dim = CMD_DIM,
    NextControlZone = CMD_NEXT_CONTROL_ZONE,
    PreviousControlZone = CMD_PREVIOUS_CONTROL_ZONE,
}

impl CommandKind {
    pub const fn from_raw(value: u8) -> Option<Self> {
        Some(match value {
            CMD_TOGGLE => Self::Toggle,
            CMD_NEXT => Self::Next,
            CMD_PREVIOUS => Self::Previous,
            CMD_SELECT => Self::Select,
            CMD_BRIGHTEN => Self::Brighten,
            CMD_DIM => Self::Dim,
            CMD_NEXT_CONTROL_ZONE => Self::NextControlZone,
            CMD_PREVIOUS_CONTROL_ZONE => Self::PreviousControlZone,
            _ => return None,
        })
    }

    /// Whether the command moves the zone cursor instead of addressing a group
    pub const fn is_zone_command(self) -> bool {
        matches!(self, Self::NextControlZone | Self::PreviousControlZone)
    }
}

/// Tagged command addressed to a control zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlCommand {
    pub zone: u8,
    pub kind: CommandKind,
    pub param: u8,
}

impl ControlCommand {
    pub const fn new(zone: u8, kind: CommandKind, param: u8) -> Self {
        Self { zone, kind, param }
    }

    /// Decode a packed `(zone << 24) | (kind << 16) | param` binding value
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_binding(value: u32) -> Result<Self, FxError> {
        let zone = (value >> 24) as u8;
        let kind = CommandKind::from_raw((value >> 16) as u8).ok_or(FxError::Unsupported)?;
        let param = value as u8;

        Ok(Self { zone, kind, param })
    }

    pub const fn to_binding(self) -> u32 {
        ((self.zone as u32) << 24) | ((self.kind as u32) << 16) | self.param as u32
    }

    pub const fn toggle(zone: u8) -> Self {
        Self::new(zone, CommandKind::Toggle, 0)
    }

    pub const fn next(zone: u8) -> Self {
        Self::new(zone, CommandKind::Next, 0)
    }

    pub const fn previous(zone: u8) -> Self {
        Self::new(zone, CommandKind::Previous, 0)
    }

    pub const fn select(zone: u8, index: u8) -> Self {
        Self::new(zone, CommandKind::Select, index)
    }

    pub const fn brighten(zone: u8) -> Self {
        Self::new(zone, CommandKind::Brighten, 0)
    }

    pub const fn dim(zone: u8) -> Self {
        Self::new(zone, CommandKind::Dim, 0)
    }

    pub const fn next_zone() -> Self {
        Self::new(0, CommandKind::NextControlZone, 0)
    }

    pub const fn previous_zone() -> Self {
        Self::new(0, CommandKind::PreviousControlZone, 0)
    }
}

/// Cursor over the configured control zones
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlZones {
    current: u8,
    count: u8,
}

impl ControlZones {
    pub const fn new(count: u8) -> Self {
        Self { current: 0, count }
    }

    pub const fn current(&self) -> u8 {
        self.current
    }

    pub const fn count(&self) -> u8 {
        self.count
    }

    /// Advance the cursor, wrapping past the last zone
    pub fn next(&mut self) {
        if self.count == 0 {
            return;
        }
        self.current = (self.current + 1) % self.count;
    }

    /// Move the cursor back, wrapping before the first zone
    pub fn previous(&mut self) {
        if self.count == 0 {
            return;
        }
        self.current = if self.current == 0 {
            self.count - 1
        } else {
            self.current - 1
        };
    }

    /// Resolve [`CURRENT_ZONE`] and check the zone exists
    pub fn resolve(&self, zone: u8) -> Result<usize, FxError> {
        let zone = if zone == CURRENT_ZONE { self.current } else { zone };
        if zone >= self.count {
            return Err(FxError::Unsupported);
        }
        Ok(usize::from(zone))
    }
}

/// Persistent storage for control-group records
///
/// Records are small opaque byte strings keyed by the group's name.
pub trait StateStore {
    /// Read the record stored under `key` into `buf`, returning its length
    fn load(&mut self, key: &str, buf: &mut [u8]) -> Option<usize>;

    /// Replace the record stored under `key`
    fn save(&mut self, key: &str, record: &[u8]);
}

/// Store that keeps nothing
impl StateStore for () {
    fn load(&mut self, _key: &str, _buf: &mut [u8]) -> Option<usize> {
        None
    }

    fn save(&mut self, _key: &str, _record: &[u8]) {}
}

/// Selection and brightness state of one control group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlGroupState {
    pub active: bool,
    /// Brightness level in `0..=steps`
    pub brightness: u8,
    /// Index of the selected candidate effect
    pub current: u8,
}

impl ControlGroupState {
    /// Active, full brightness, first candidate
    pub const fn new(brightness_steps: u8) -> Self {
        Self {
            active: true,
            brightness: brightness_steps,
            current: 0,
        }
    }

    pub const fn to_bytes(self) -> [u8; STATE_RECORD_SIZE] {
        [self.active as u8, self.brightness, self.current]
    }

    /// Decode a persisted record for a group with `candidates` effects
    pub fn from_bytes(
        record: &[u8],
        brightness_steps: u8,
        candidates: usize,
    ) -> Result<Self, FxError> {
        let &[active, brightness, current] = record else {
            return Err(FxError::InvalidPersistedState);
        };

        if active > 1 {
            return Err(FxError::InvalidPersistedState);
        }

        Self {
            active: active == 1,
            brightness,
            current,
        }
        .validate(brightness_steps, candidates)
    }

    /// Check the state fits a group with `brightness_steps` and `candidates` effects
    pub fn validate(self, brightness_steps: u8, candidates: usize) -> Result<Self, FxError> {
        if self.brightness > brightness_steps || usize::from(self.current) >= candidates {
            return Err(FxError::InvalidPersistedState);
        }
        Ok(self)
    }
}
