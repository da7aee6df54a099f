use crate::TrayIconState;

/// Commands sent from the async runtime to the main UI thread.
///
/// The main thread owns `TrayManager` (because `TrayIcon` is `!Send`),
/// so all tray mutations and process lifecycle events flow through this enum.
#[derive(Debug, Clone, PartialEq)]
pub enum TrayCommand {
    /// Update the tray icon to a new state.
    SetState(TrayIconState),
    /// Text shown next to the icon (elapsed time), or none.
    SetTitle(Option<String>),
    /// Replace the entries of the Recordings submenu, newest first.
    SetRecordings(Vec<String>),
    /// Shut down the application. The main thread will exit the event loop.
    Shutdown,
}
