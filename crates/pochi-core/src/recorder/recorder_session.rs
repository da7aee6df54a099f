use crate::{
    CoreResult,
    channel::{CommandBus, CommandEvent, CommandSubscription},
    paths,
    recorder::{CaptureBackend, MeterReading, Recorder, TickOutcome, Transition},
    registry::RecordingRegistry,
    watch::{ChangeBatch, DirectoryWatch},
};

use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Something the session did that a UI may want to show.
#[derive(Debug)]
pub enum SessionUpdate {
    /// A channel command was applied to the recorder.
    Command {
        /// The command received.
        event: CommandEvent,
        /// What the recorder did with it.
        result: CoreResult<Transition>,
    },
    /// Level and elapsed time of the active recording.
    Reading(MeterReading),
    /// The capture failed and the recording was stopped.
    CaptureLost(Transition),
    /// The registry was rebuilt after a change in the directory.
    RecordingsChanged,
}

/// Recorder-side wiring of the state machine, the command channel, the
/// directory watch and the registry.
///
/// Everything that changes recording state or the registry goes through this
/// one owner, one event at a time. A UI drives it by awaiting
/// [`RecorderSession::step`] next to its own event sources.
pub struct RecorderSession<C: CaptureBackend> {
    recorder: Recorder<C>,
    registry: RecordingRegistry,
    subscription: CommandSubscription,
    watch: DirectoryWatch,
    changes: mpsc::Receiver<ChangeBatch>,
}

impl<C: CaptureBackend> RecorderSession<C> {
    /// Subscribe to `bus`, watch the recorder's directory, clear any stale
    /// status and fill the registry.
    ///
    /// Must run inside a Tokio runtime.
    #[track_caller]
    #[instrument(skip_all, fields(dir = ?recorder.dir()))]
    pub fn start(recorder: Recorder<C>, bus: &dyn CommandBus) -> CoreResult<Self> {
        let dir = recorder.dir().to_path_buf();
        let (watch, changes) = DirectoryWatch::subscribe(&dir)?;
        let subscription = bus.subscribe()?;

        let mut session = Self {
            recorder,
            registry: RecordingRegistry::new(&dir),
            subscription,
            watch,
            changes,
        };

        session.recorder.publish_initial_status();
        session.refresh();

        info!("Recorder session started");

        Ok(session)
    }

    /// The state machine.
    pub fn recorder(&self) -> &Recorder<C> {
        &self.recorder
    }

    /// Recordings as of the last refresh.
    pub fn registry(&self) -> &RecordingRegistry {
        &self.registry
    }

    /// Local start/stop request (tray click, hotkey).
    pub fn toggle(&mut self) -> CoreResult<Transition> {
        let result = self.recorder.toggle();
        self.after(&result);
        result
    }

    /// Wait for the next channel command, directory batch or metering tick
    /// and apply it.
    ///
    /// Cancel-safe: nothing is applied until an event has been taken, and
    /// applying does not await.
    pub async fn step(&mut self) -> SessionUpdate {
        loop {
            tokio::select! {
                Some(event) = self.subscription.recv() => {
                    info!(event = %event, "Command received from channel");
                    let result = self.recorder.handle_command(event);
                    self.after(&result);
                    return SessionUpdate::Command { event, result };
                }

                Some(batch) = self.changes.recv() => {
                    if batch.rescan || batch.paths.iter().any(|p| paths::is_listed_recording(p)) {
                        debug!(paths = batch.paths.len(), rescan = batch.rescan, "Recordings changed");
                        self.refresh();
                        return SessionUpdate::RecordingsChanged;
                    }
                }

                _ = self.recorder.next_tick() => {
                    match self.recorder.tick() {
                        TickOutcome::Reading(reading) => return SessionUpdate::Reading(reading),
                        TickOutcome::CaptureLost(transition) => {
                            self.refresh();
                            return SessionUpdate::CaptureLost(transition);
                        }
                        TickOutcome::Idle => {}
                    }
                }
            }
        }
    }

    /// Stop any recording and release the channel and the watch.
    #[instrument(skip(self))]
    pub fn shutdown(&mut self) -> CoreResult<Transition> {
        let result = self.recorder.stop();
        self.subscription.cancel();
        self.watch.cancel();
        info!("Recorder session shut down");
        result
    }

    fn after(&mut self, result: &CoreResult<Transition>) {
        if let Ok(Transition::Stopped { .. }) = result {
            self.refresh();
        }
    }

    fn refresh(&mut self) {
        if let Err(e) = self.registry.refresh() {
            warn!(error = ?e, "Failed to rescan recordings");
        }
    }
}
