use crate::{
    AppError, AppResult,
    config::{default_poll_attempts, default_poll_interval_ms},
};

use std::{ops::RangeInclusive, panic::Location, time::Duration};

use error_location::ErrorLocation;
use pochi_core::ConfirmPolicy;
use serde::{Deserialize, Serialize};

/// Accepted delay between status reads, in milliseconds.
pub(crate) const POLL_INTERVAL_RANGE_MS: RangeInclusive<u64> = 10..=1000;

/// Accepted number of status reads per command.
pub(crate) const POLL_ATTEMPTS_RANGE: RangeInclusive<u32> = 1..=100;

/// How the tool-server waits for the recorder to confirm a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Delay between status reads, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Status reads before a command is reported as unconfirmed.
    #[serde(default = "default_poll_attempts")]
    pub poll_attempts: u32,
}

impl ControlConfig {
    /// Reject polling settings that would make confirmation impossible or
    /// unbounded.
    #[track_caller]
    pub fn validate(&self) -> AppResult<()> {
        if !POLL_INTERVAL_RANGE_MS.contains(&self.poll_interval_ms) {
            return Err(AppError::ConfigError {
                reason: format!(
                    "control.poll_interval_ms must be between {} and {}, got {}",
                    POLL_INTERVAL_RANGE_MS.start(),
                    POLL_INTERVAL_RANGE_MS.end(),
                    self.poll_interval_ms
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if !POLL_ATTEMPTS_RANGE.contains(&self.poll_attempts) {
            return Err(AppError::ConfigError {
                reason: format!(
                    "control.poll_attempts must be between {} and {}, got {}",
                    POLL_ATTEMPTS_RANGE.start(),
                    POLL_ATTEMPTS_RANGE.end(),
                    self.poll_attempts
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(())
    }

    /// The dispatcher policy for these settings.
    pub fn confirm_policy(&self) -> ConfirmPolicy {
        ConfirmPolicy {
            interval: Duration::from_millis(self.poll_interval_ms),
            attempts: self.poll_attempts,
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            poll_attempts: default_poll_attempts(),
        }
    }
}
