use std::fmt;

/// Requests the tool-server can make of the recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandEvent {
    /// Begin a new recording if idle.
    StartRecording,
    /// End the active recording if there is one.
    StopRecording,
}

impl CommandEvent {
    /// Wire name of [`CommandEvent::StartRecording`].
    pub const START_RECORDING: &'static str = "com.pochi.recorder.startRecording";
    /// Wire name of [`CommandEvent::StopRecording`].
    pub const STOP_RECORDING: &'static str = "com.pochi.recorder.stopRecording";

    /// Globally namespaced event name.
    pub fn name(self) -> &'static str {
        match self {
            CommandEvent::StartRecording => Self::START_RECORDING,
            CommandEvent::StopRecording => Self::STOP_RECORDING,
        }
    }

    /// Parse a wire name. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            Self::START_RECORDING => Some(CommandEvent::StartRecording),
            Self::STOP_RECORDING => Some(CommandEvent::StopRecording),
            _ => None,
        }
    }
}

impl fmt::Display for CommandEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
