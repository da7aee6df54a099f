/// Commands sent from the hotkey handler to the application loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Start recording if idle, stop if recording.
    Toggle,
    /// Request application shutdown.
    Shutdown,
}
