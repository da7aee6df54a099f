//! System tray icon with state-based updates.
//!
//! Shows an idle ring or a level-driven recording disc, an optional elapsed
//! time title, and a menu with the recording toggle, the recordings folder, a
//! Recordings submenu and Quit.

use crate::{AppError, AppResult, MenuAction, TrayIconState, tray_icon_state::ICON_SIZE};

use std::panic::Location;

use error_location::ErrorLocation;
use tracing::{debug, info, instrument};
use tray_icon::menu::{Menu, MenuItem, PredefinedMenuItem, Submenu};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

/// Entries shown in the Recordings submenu.
const MENU_RECORDING_LIMIT: usize = 20;

/// System tray icon manager.
pub struct TrayManager {
    tray_icon: TrayIcon,
    state: TrayIconState,
    recordings: Vec<String>,
}

impl TrayManager {
    /// Create a new tray manager in the idle state.
    #[track_caller]
    #[instrument]
    pub fn new() -> AppResult<Self> {
        let state = TrayIconState::Idle;
        let menu = Self::build_menu(state, &[])?;

        let tray_icon = TrayIconBuilder::new()
            .with_tooltip(state.tooltip())
            .with_menu(Box::new(menu))
            .with_icon(Self::load_icon(state)?)
            .build()
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to create tray icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!("System tray icon initialized");

        Ok(Self {
            tray_icon,
            state,
            recordings: Vec::new(),
        })
    }

    /// Update the icon and tooltip. The menu is rebuilt when the recording
    /// flag flips, so the toggle item reads correctly.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn update_state(&mut self, state: TrayIconState) -> AppResult<()> {
        if state == self.state {
            return Ok(());
        }

        self.tray_icon
            .set_icon(Some(Self::load_icon(state)?))
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to update icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.tray_icon
            .set_tooltip(Some(state.tooltip()))
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to update tooltip: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let flipped = state.is_recording() != self.state.is_recording();
        self.state = state;

        if flipped {
            self.refresh_menu()?;
        }

        Ok(())
    }

    /// Show `title` next to the icon, or clear it.
    pub fn set_title(&mut self, title: Option<String>) {
        self.tray_icon.set_title(title.as_deref());
    }

    /// Replace the Recordings submenu entries.
    #[track_caller]
    #[instrument(skip(self, recordings), fields(count = recordings.len()))]
    pub fn set_recordings(&mut self, recordings: Vec<String>) -> AppResult<()> {
        if recordings == self.recordings {
            return Ok(());
        }
        self.recordings = recordings;
        self.refresh_menu()
    }

    #[track_caller]
    fn refresh_menu(&mut self) -> AppResult<()> {
        let menu = Self::build_menu(self.state, &self.recordings)?;
        self.tray_icon.set_menu(Some(Box::new(menu)));
        debug!(recordings = self.recordings.len(), "Tray menu rebuilt");
        Ok(())
    }

    #[track_caller]
    fn build_menu(state: TrayIconState, recordings: &[String]) -> AppResult<Menu> {
        let menu_error = |what: &str, e: tray_icon::menu::Error| AppError::TrayError {
            reason: format!("Failed to add {} menu: {}", what, e),
            location: ErrorLocation::from(Location::caller()),
        };

        let toggle_label = if state.is_recording() {
            "Stop Recording"
        } else {
            "Start Recording"
        };
        let toggle = MenuItem::with_id(MenuAction::Toggle.id(), toggle_label, true, None);
        let open_folder = MenuItem::with_id(
            MenuAction::OpenFolder.id(),
            "Open Recordings Folder",
            true,
            None,
        );
        let quit = MenuItem::with_id(MenuAction::Quit.id(), "Quit Pochi", true, None);

        let submenu = Submenu::new("Recordings", true);
        if recordings.is_empty() {
            submenu
                .append(&MenuItem::new("No recordings", false, None))
                .map_err(|e| menu_error("recordings", e))?;
        }
        for name in recordings.iter().take(MENU_RECORDING_LIMIT) {
            let item = MenuItem::with_id(
                MenuAction::OpenRecording(name.clone()).id(),
                name,
                true,
                None,
            );
            submenu
                .append(&item)
                .map_err(|e| menu_error("recording", e))?;
        }

        let menu = Menu::new();
        menu.append(&toggle).map_err(|e| menu_error("toggle", e))?;
        menu.append(&open_folder)
            .map_err(|e| menu_error("folder", e))?;
        menu.append(&submenu)
            .map_err(|e| menu_error("recordings", e))?;
        menu.append(&PredefinedMenuItem::separator())
            .map_err(|e| menu_error("separator", e))?;
        menu.append(&quit).map_err(|e| menu_error("quit", e))?;

        Ok(menu)
    }

    #[track_caller]
    fn load_icon(state: TrayIconState) -> AppResult<Icon> {
        Icon::from_rgba(state.rgba(), ICON_SIZE, ICON_SIZE).map_err(|e| AppError::TrayError {
            reason: format!("Failed to create icon from RGBA: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}
