use crate::config::{default_hotkey_enabled, default_show_timer};

use serde::{Deserialize, Serialize};

/// Recorder behaviour configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviourConfig {
    /// Whether the global toggle hotkey is registered.
    #[serde(default = "default_hotkey_enabled")]
    pub hotkey_enabled: bool,

    /// Show the elapsed recording time next to the tray icon.
    #[serde(default = "default_show_timer")]
    pub show_timer: bool,
}

impl Default for BehaviourConfig {
    fn default() -> Self {
        Self {
            hotkey_enabled: default_hotkey_enabled(),
            show_timer: default_show_timer(),
        }
    }
}
