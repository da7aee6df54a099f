use std::{future, time::Duration};

use tokio::time::{Instant, sleep_until};

/// One metering sample taken while recording.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterReading {
    /// Time since the recording started.
    pub elapsed: Duration,
    /// Normalized peak level in `0.0..=1.0`.
    pub level: f32,
}

/// Periodic tick that only fires while armed.
///
/// [`Meter::tick`] pends forever when disarmed, so it can sit in a
/// `tokio::select!` next to other event sources.
#[derive(Debug)]
pub struct Meter {
    period: Duration,
    next: Option<Instant>,
}

impl Meter {
    /// Default metering period.
    pub const PERIOD: Duration = Duration::from_millis(50);

    /// Disarmed meter ticking every `period` once armed.
    pub fn new(period: Duration) -> Self {
        Self { period, next: None }
    }

    /// Start ticking, first tick one period from now.
    pub fn arm(&mut self) {
        self.next = Some(Instant::now() + self.period);
    }

    /// Stop ticking.
    pub fn disarm(&mut self) {
        self.next = None;
    }

    /// Whether the meter is ticking.
    pub fn is_armed(&self) -> bool {
        self.next.is_some()
    }

    /// Wait for the next tick. Cancel-safe.
    pub async fn tick(&mut self) {
        let Some(at) = self.next else {
            return future::pending().await;
        };

        sleep_until(at).await;

        // Skip missed ticks instead of bursting.
        let now = Instant::now();
        let mut next = at + self.period;
        if next <= now {
            next = now + self.period;
        }
        self.next = Some(next);
    }
}

impl Default for Meter {
    fn default() -> Self {
        Self::new(Self::PERIOD)
    }
}
