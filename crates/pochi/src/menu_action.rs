//! Tray menu item identifiers.

const TOGGLE_ID: &str = "toggle";
const OPEN_FOLDER_ID: &str = "open-folder";
const QUIT_ID: &str = "quit";
const RECORDING_PREFIX: &str = "recording:";

/// What a tray menu item does when clicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    /// Start or stop recording.
    Toggle,
    /// Reveal the Pochi Directory.
    OpenFolder,
    /// Open one recording with the default application.
    OpenRecording(String),
    /// Exit the application.
    Quit,
}

impl MenuAction {
    /// Menu item id carrying this action.
    pub fn id(&self) -> String {
        match self {
            Self::Toggle => TOGGLE_ID.to_string(),
            Self::OpenFolder => OPEN_FOLDER_ID.to_string(),
            Self::OpenRecording(name) => format!("{}{}", RECORDING_PREFIX, name),
            Self::Quit => QUIT_ID.to_string(),
        }
    }

    /// Action for a clicked menu item id.
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            TOGGLE_ID => Some(Self::Toggle),
            OPEN_FOLDER_ID => Some(Self::OpenFolder),
            QUIT_ID => Some(Self::Quit),
            _ => id
                .strip_prefix(RECORDING_PREFIX)
                .filter(|name| !name.is_empty())
                .map(|name| Self::OpenRecording(name.to_string())),
        }
    }
}
