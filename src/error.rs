use core::fmt;

/// Errors reported by commands, event handlers and persisted state loading
///
/// None of these are fatal: the failing command or effect degrades while the
/// rest of the engine keeps rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FxError {
    /// Zone, command or parameter is out of range. No state was changed.
    Unsupported,
    /// A bounded container is full and the new entry was dropped.
    ResourceExhausted,
    /// A persisted record has the wrong size or out-of-range fields.
    InvalidPersistedState,
}

impl fmt::Display for FxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported => f.write_str("unsupported zone, command or parameter"),
            Self::ResourceExhausted => f.write_str("bounded buffer is full"),
            Self::InvalidPersistedState => f.write_str("persisted state record is invalid"),
        }
    }
}

impl core::error::Error for FxError {}
