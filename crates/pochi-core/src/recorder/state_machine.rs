use crate::{
    CoreResult,
    channel::CommandEvent,
    library::allocate_file_name,
    recorder::{CaptureBackend, Meter, MeterReading, RecordingState, SleepGuard},
    status::{RecordingStatus, StatusStore},
};

use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use chrono::{Local, Utc};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Result of asking the recorder to change state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// A new recording began.
    Started {
        /// File name of the new recording.
        file: String,
    },
    /// The active recording ended.
    Stopped {
        /// File name of the finished recording.
        file: String,
        /// How long it ran.
        elapsed: Duration,
        /// The capture died instead of being stopped.
        abnormal: bool,
    },
    /// Already in the requested state; nothing happened.
    Unchanged,
}

/// What a metering tick observed.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Not recording; nothing to report.
    Idle,
    /// Level and elapsed time of the active recording.
    Reading(MeterReading),
    /// The capture failed and the recording was stopped.
    CaptureLost(Transition),
}

/// The recording state machine.
///
/// Owns the capture backend, the meter and the sleep assertion, and is the
/// only writer of the status document. Every real transition writes the
/// document exactly once; requests for the current state are ignored.
pub struct Recorder<C: CaptureBackend> {
    dir: PathBuf,
    capture: C,
    status: StatusStore,
    state: RecordingState,
    meter: Meter,
    sleep_guard: Option<SleepGuard>,
    prevent_sleep: bool,
    last_file: Option<String>,
}

impl<C: CaptureBackend> Recorder<C> {
    /// Recorder writing into `dir` and publishing to `status`.
    pub fn new(dir: impl Into<PathBuf>, capture: C, status: StatusStore) -> Self {
        Self {
            dir: dir.into(),
            capture,
            status,
            state: RecordingState::Idle,
            meter: Meter::default(),
            sleep_guard: None,
            prevent_sleep: true,
            last_file: None,
        }
    }

    /// Skip the idle-sleep assertion while recording.
    pub fn without_sleep_prevention(mut self) -> Self {
        self.prevent_sleep = false;
        self
    }

    /// Replace the metering period.
    pub fn with_meter_period(mut self, period: Duration) -> Self {
        self.meter = Meter::new(period);
        self
    }

    /// Publish an idle document, clearing whatever a previous run left.
    pub fn publish_initial_status(&self) {
        let last_file = self.status.read().and_then(|s| s.current_file);
        self.status.write(&RecordingStatus::idle(last_file));
    }

    /// Current state.
    pub fn state(&self) -> &RecordingState {
        &self.state
    }

    /// Whether a recording is in progress.
    pub fn is_recording(&self) -> bool {
        self.state.is_recording()
    }

    /// Directory recordings are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The capture backend.
    pub fn capture(&self) -> &C {
        &self.capture
    }

    /// Apply a command from the channel.
    pub fn handle_command(&mut self, event: CommandEvent) -> CoreResult<Transition> {
        match event {
            CommandEvent::StartRecording => self.start(),
            CommandEvent::StopRecording => self.stop(),
        }
    }

    /// Start if idle, stop if recording.
    pub fn toggle(&mut self) -> CoreResult<Transition> {
        if self.is_recording() {
            self.stop()
        } else {
            self.start()
        }
    }

    /// `Idle -> Recording`. If capture cannot start, stays idle and
    /// publishes nothing.
    #[instrument(skip(self))]
    pub fn start(&mut self) -> CoreResult<Transition> {
        if self.is_recording() {
            info!("Start ignored, already recording");
            return Ok(Transition::Unchanged);
        }

        let file = allocate_file_name(
            &self.dir,
            Local::now().date_naive(),
            self.capture.extension(),
        )?;
        let path = self.dir.join(&file);

        self.capture.start(&path)?;

        self.meter.arm();

        if self.prevent_sleep {
            match SleepGuard::acquire("Recording audio") {
                Ok(guard) => self.sleep_guard = Some(guard),
                Err(e) => warn!(error = %e, "Could not prevent system sleep"),
            }
        }

        let started_at = Utc::now();
        let session_id = Uuid::new_v4();
        self.state = RecordingState::Recording {
            file: file.clone(),
            path,
            started_at,
            started: Instant::now(),
            session_id,
        };
        self.last_file = Some(file.clone());

        self.status
            .write(&RecordingStatus::recording(file.clone(), started_at));

        info!(session_id = %session_id, file = %file, "Recording started");

        Ok(Transition::Started { file })
    }

    /// `Recording -> Idle`.
    #[instrument(skip(self))]
    pub fn stop(&mut self) -> CoreResult<Transition> {
        Ok(self.finish(false))
    }

    /// Take a metering sample. A failed capture stops the recording.
    pub fn tick(&mut self) -> TickOutcome {
        let RecordingState::Recording { started, .. } = &self.state else {
            return TickOutcome::Idle;
        };
        let elapsed = started.elapsed();

        if self.capture.has_failed() {
            warn!("Capture failed, stopping recording");
            return TickOutcome::CaptureLost(self.finish(true));
        }

        TickOutcome::Reading(MeterReading {
            elapsed,
            level: self.capture.take_level(),
        })
    }

    /// Wait for the next metering tick. Pends forever while idle.
    pub async fn next_tick(&mut self) {
        self.meter.tick().await
    }

    fn finish(&mut self, abnormal: bool) -> Transition {
        let RecordingState::Recording {
            file,
            started,
            session_id,
            ..
        } = std::mem::replace(&mut self.state, RecordingState::Idle)
        else {
            info!("Stop ignored, not recording");
            return Transition::Unchanged;
        };

        // The file may be incomplete, but the recorder must not stay stuck
        // in Recording because of it.
        if let Err(e) = self.capture.stop() {
            error!(session_id = %session_id, error = %e, "Failed to stop capture cleanly");
        }

        self.meter.disarm();
        self.sleep_guard = None;

        self.status
            .write(&RecordingStatus::idle(self.last_file.clone()));

        let elapsed = started.elapsed();
        info!(
            session_id = %session_id,
            file = %file,
            duration_ms = elapsed.as_millis(),
            abnormal,
            "Recording stopped"
        );

        Transition::Stopped {
            file,
            elapsed,
            abnormal,
        }
    }
}

impl<C: CaptureBackend> Drop for Recorder<C> {
    fn drop(&mut self) {
        if self.is_recording() {
            self.finish(false);
        }
    }
}
