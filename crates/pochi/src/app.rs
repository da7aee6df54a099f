use crate::{AppCommand, AppResult, MenuAction, TrayCommand, TrayIconState, timer_title};

use std::time::Duration;

use pochi_core::{
    CoreResult, RecorderSession, SessionUpdate, Transition, WavCapture, recorder::MeterReading,
};
use tao::event_loop::EventLoopProxy;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, instrument, warn};
use tray_icon::menu::MenuEvent;

/// Main application state.
///
/// Runs on the async runtime thread and owns the recorder session: hotkey
/// presses and tray clicks are handled here next to the session's channel
/// commands, metering ticks and directory batches, one at a time. Tray
/// updates go back to the main thread through `tray_proxy` because
/// `TrayIcon` is `!Send`.
pub struct App {
    pub(crate) session: RecorderSession<WavCapture>,
    pub(crate) tray_proxy: EventLoopProxy<TrayCommand>,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
    pub(crate) show_timer: bool,
    pub(crate) icon: TrayIconState,
    pub(crate) title: Option<String>,
}

impl App {
    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!(dir = ?self.session.recorder().dir(), "Pochi recorder starting");

        self.show_recordings();

        // MenuEvent::receiver() blocks in recv(); forward on one blocking
        // thread. The forwarder exits on its next send after tray_event_rx
        // is dropped.
        let (tray_event_tx, mut tray_event_rx) = mpsc::channel(32);
        let tray_handle = tokio::task::spawn_blocking(move || {
            let receiver = MenuEvent::receiver();
            while let Ok(event) = receiver.recv() {
                if tray_event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        loop {
            tokio::select! {
                Some(event) = tray_event_rx.recv() => {
                    if !self.handle_tray_event(event) {
                        break;
                    }
                }

                Some(cmd) = self.command_rx.recv() => {
                    match cmd {
                        AppCommand::Toggle => {
                            let result = self.session.toggle();
                            self.apply(result);
                        }
                        AppCommand::Shutdown => {
                            info!("Shutdown requested");
                            break;
                        }
                    }
                }

                update = self.session.step() => {
                    match update {
                        SessionUpdate::Command { result, .. } => self.apply(result),
                        SessionUpdate::Reading(reading) => self.show_reading(reading),
                        SessionUpdate::CaptureLost(transition) => self.apply(Ok(transition)),
                        SessionUpdate::RecordingsChanged => self.show_recordings(),
                    }
                }
            }
        }

        drop(tray_event_rx);

        // Finalize an in-progress file before the main thread exits the process.
        let result = self.session.shutdown();
        self.apply(result);

        match tokio::time::timeout(Duration::from_secs(1), tray_handle).await {
            Ok(Ok(())) => info!("Tray event forwarder stopped cleanly"),
            Ok(Err(e)) => error!(error = ?e, "Tray event forwarder task panicked"),
            Err(_) => info!(
                "Tray event forwarder did not stop within timeout, \
                     will be cleaned up on exit"
            ),
        }

        let _ = self.shutdown_tx.send(true);
        self.send_tray(TrayCommand::Shutdown);
        info!("Pochi recorder shut down successfully");

        Ok(())
    }

    /// Reflect a state-machine result in the tray and the registry.
    fn apply(&mut self, result: CoreResult<Transition>) {
        match result {
            Ok(Transition::Started { file }) => {
                info!(file = %file, "Recording started");
                self.set_icon(TrayIconState::recording(0.0));
                if self.show_timer {
                    self.set_title(Some(timer_title(Duration::ZERO)));
                }
            }
            Ok(Transition::Stopped {
                file,
                elapsed,
                abnormal,
            }) => {
                if abnormal {
                    warn!(file = %file, "Recording ended because capture failed");
                }
                debug!(file = %file, duration_ms = elapsed.as_millis(), "Recording finished");
                self.set_icon(TrayIconState::Idle);
                self.set_title(None);
                self.show_recordings();
            }
            Ok(Transition::Unchanged) => {}
            Err(e) => error!(error = ?e, "Recorder transition failed"),
        }
    }

    fn show_reading(&mut self, reading: MeterReading) {
        self.set_icon(TrayIconState::recording(reading.level));
        if self.show_timer {
            self.set_title(Some(timer_title(reading.elapsed)));
        }
    }

    fn show_recordings(&self) {
        let names = self.session.registry().names();
        self.send_tray(TrayCommand::SetRecordings(names));
    }

    fn set_icon(&mut self, icon: TrayIconState) {
        if icon != self.icon {
            self.icon = icon;
            self.send_tray(TrayCommand::SetState(icon));
        }
    }

    fn set_title(&mut self, title: Option<String>) {
        if title != self.title {
            self.title = title.clone();
            self.send_tray(TrayCommand::SetTitle(title));
        }
    }

    fn send_tray(&self, command: TrayCommand) {
        if self.tray_proxy.send_event(command).is_err() {
            debug!("Tray event loop closed, dropping update");
        }
    }

    /// Handle one tray menu click. Returns `false` when the app should quit.
    #[instrument(skip(self))]
    fn handle_tray_event(&mut self, event: MenuEvent) -> bool {
        let Some(action) = MenuAction::from_id(&event.id.0) else {
            debug!(id = ?event.id, "Ignoring unknown menu item");
            return true;
        };

        match action {
            MenuAction::Toggle => {
                let result = self.session.toggle();
                self.apply(result);
            }
            MenuAction::OpenFolder => {
                if let Err(e) = open::that(self.session.recorder().dir()) {
                    error!(error = ?e, "Failed to open recordings folder");
                }
            }
            MenuAction::OpenRecording(name) => {
                if let Err(e) = open::that(self.session.registry().dir().join(&name)) {
                    error!(file = %name, error = ?e, "Failed to open recording");
                }
            }
            MenuAction::Quit => {
                info!("Quit requested from tray menu");
                return false;
            }
        }

        true
    }
}
