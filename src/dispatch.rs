//! Intents queued for the engine
//!
//! Event sources and the command interface never touch effect state directly.
//! They queue an [`FxIntent`] and the engine applies it from its own context
//! on the next tick.

use crate::channel::{Channel, Receiver, Sender};
use crate::control::ControlCommand;
use crate::device::FxEvent;
use crate::error::FxError;

/// Work item for the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FxIntent {
    /// Device event from an event source
    Event(FxEvent),
    /// User command from the control interface
    Command(ControlCommand),
}

impl FxIntent {
    /// Command intent from a packed binding value
    pub fn from_binding(value: u32) -> Result<Self, FxError> {
        ControlCommand::from_binding(value).map(Self::Command)
    }
}

impl From<FxEvent> for FxIntent {
    fn from(event: FxEvent) -> Self {
        Self::Event(event)
    }
}

impl From<ControlCommand> for FxIntent {
    fn from(command: ControlCommand) -> Self {
        Self::Command(command)
    }
}

/// Type alias for intent sender
pub type IntentSender<'a, const SIZE: usize> = Sender<'a, FxIntent, SIZE>;

/// Type alias for intent receiver
pub type IntentReceiver<'a, const SIZE: usize> = Receiver<'a, FxIntent, SIZE>;

/// Type alias for the intent channel
pub type IntentChannel<const SIZE: usize> = Channel<FxIntent, SIZE>;
