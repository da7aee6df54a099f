mod behaviour_config;
#[allow(clippy::module_inception)]
mod config;
mod control_config;
mod storage_config;

pub(crate) use {
    behaviour_config::BehaviourConfig, config::Config, control_config::ControlConfig,
    storage_config::StorageConfig,
};

pub(crate) const DEFAULT_POLL_INTERVAL_MS: u64 = 100;
pub(crate) const DEFAULT_POLL_ATTEMPTS: u32 = 30;
pub(crate) const DEFAULT_HOTKEY_ENABLED: bool = true;
pub(crate) const DEFAULT_SHOW_TIMER: bool = true;

pub(crate) fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

pub(crate) fn default_poll_attempts() -> u32 {
    DEFAULT_POLL_ATTEMPTS
}

pub(crate) fn default_hotkey_enabled() -> bool {
    DEFAULT_HOTKEY_ENABLED
}

pub(crate) fn default_show_timer() -> bool {
    DEFAULT_SHOW_TIMER
}
