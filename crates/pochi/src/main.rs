//! Pochi: menu-bar audio recorder with an MCP tool-server mode.

mod app;
mod app_command;
mod config;
mod error;
mod hotkey_handler;
mod installer;
mod logging;
mod mcp;
mod menu_action;
mod tray_command;
mod tray_icon_state;
mod tray_manager;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    error::{AppError, Result as AppResult},
    hotkey_handler::HotkeyHandler,
    menu_action::MenuAction,
    tray_command::TrayCommand,
    tray_icon_state::{TrayIconState, timer_title},
    tray_manager::TrayManager,
};

use crate::{config::Config, mcp::McpServer};

use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use global_hotkey::GlobalHotKeyManager;
use pochi_core::{
    Recorder, RecorderSession, RecordingLibrary, SocketChannel, StatusStore, ToolDispatcher,
    WavCapture,
};
use tao::{
    event::Event,
    event_loop::{ControlFlow, EventLoopBuilder, EventLoopProxy},
};
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

/// Command-line interface.
#[derive(Parser, Debug)]
#[command(name = "pochi", version)]
#[command(about = "Menu-bar audio recorder with an MCP tool-server mode", long_about = None)]
struct Cli {
    /// Serve recording tools over stdin/stdout until the input closes.
    #[arg(long, conflicts_with_all = ["mcp_install", "mcp_config"])]
    mcp: bool,

    /// Print a command that registers this executable with the claude CLI.
    #[arg(long, conflicts_with = "mcp_config")]
    mcp_install: bool,

    /// Print an MCP client configuration snippet for this executable.
    #[arg(long)]
    mcp_config: bool,
}

/// Application entry point.
fn main() {
    let cli = Cli::parse();

    if cli.mcp_install || cli.mcp_config {
        let executable = match std::env::current_exe() {
            Ok(path) => path,
            Err(e) => {
                eprintln!("Failed to locate the pochi executable: {}", e);
                std::process::exit(1);
            }
        };

        if cli.mcp_install {
            println!("{}", installer::install_command(&executable));
        } else {
            println!("{}", installer::config_snippet(&executable));
        }
        return;
    }

    if cli.mcp {
        logging::init_mcp();
        std::process::exit(run_tool_server());
    }

    run_recorder();
}

/// Serve tools on stdio. Returns the process exit code.
fn run_tool_server() -> i32 {
    let config = Config::load_or_default();
    let dir = config.storage.recordings_dir();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            return 1;
        }
    };

    let dispatcher = ToolDispatcher::new(
        RecordingLibrary::new(&dir),
        StatusStore::in_dir(&dir),
        Arc::new(SocketChannel::for_recordings(&dir)),
    )
    .with_confirm_policy(config.control.confirm_policy());
    let server = McpServer::new(dispatcher);

    match rt.block_on(server.serve_stdio()) {
        Ok(()) => 0,
        Err(e) => {
            error!(error = ?e, "MCP transport failed");
            1
        }
    }
}

/// Run the menu-bar recorder until Quit.
fn run_recorder() {
    let log_guard = logging::init_gui();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    #[allow(unused_mut)]
    let mut event_loop = EventLoopBuilder::<TrayCommand>::with_user_event().build();

    #[cfg(target_os = "macos")]
    {
        use tao::platform::macos::{ActivationPolicy, EventLoopExtMacOS};
        event_loop.set_activation_policy(ActivationPolicy::Accessory);
    }

    let tray_proxy = event_loop.create_proxy();

    // TrayManager lives on the main thread - TrayIcon is !Send on all platforms.
    let mut tray_manager = match TrayManager::new() {
        Ok(tm) => tm,
        Err(e) => {
            error!("Failed to create TrayManager: {:?}", e);
            std::process::exit(1);
        }
    };

    // Dropping the manager unregisters the hotkey, so it lives in the closure.
    let mut hotkey_manager: Option<GlobalHotKeyManager> = None;
    let mut config = Some(config);

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::UserEvent(cmd) => {
                match cmd {
                    TrayCommand::SetState(state) => {
                        if let Err(e) = tray_manager.update_state(state) {
                            error!(error = ?e, "Failed to update tray icon");
                        }
                    }
                    TrayCommand::SetTitle(title) => tray_manager.set_title(title),
                    TrayCommand::SetRecordings(names) => {
                        if let Err(e) = tray_manager.set_recordings(names) {
                            error!(error = ?e, "Failed to update recordings menu");
                        }
                    }
                    TrayCommand::Shutdown => {
                        *control_flow = ControlFlow::ExitWithCode(0);
                    }
                }
                return;
            }
            Event::NewEvents(tao::event::StartCause::Init) => {
                let Some(config) = config.take() else {
                    return;
                };

                #[cfg(target_os = "macos")]
                unsafe {
                    use core_foundation::runloop::{CFRunLoopGetMain, CFRunLoopWakeUp};
                    CFRunLoopWakeUp(CFRunLoopGetMain());
                }

                // Registered on the main thread: tao's event loop pumps the
                // messages needed for hotkey delivery.
                let hotkey_id = if config.behaviour.hotkey_enabled {
                    match HotkeyHandler::register_hotkey() {
                        Ok((manager, id)) => {
                            hotkey_manager = Some(manager);
                            Some(id)
                        }
                        Err(e) => {
                            warn!(error = ?e, "Continuing without global hotkey");
                            None
                        }
                    }
                } else {
                    None
                };

                spawn_runtime(config, hotkey_id, tray_proxy.clone());
            }
            _ => {}
        }

        // Keep these alive in the closure for the app's lifetime.
        let _ = &hotkey_manager;
        let _ = &log_guard;
    });
}

/// Start the tokio runtime thread that owns the recorder.
fn spawn_runtime(config: Config, hotkey_id: Option<u32>, tray_proxy: EventLoopProxy<TrayCommand>) {
    std::thread::spawn(move || {
        let rt = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                error!("Failed to create tokio runtime: {:?}", e);
                std::process::exit(1);
            }
        };

        rt.block_on(async {
            let (command_tx, command_rx) = mpsc::channel(32);
            let (shutdown_tx, shutdown_rx) = watch::channel(false);

            let dir = config.storage.recordings_dir();
            let app = match build_app(&config, dir, tray_proxy, command_rx, shutdown_tx) {
                Ok(app) => app,
                Err(e) => {
                    error!(error = ?e, "Failed to start recorder");
                    std::process::exit(1);
                }
            };

            let hotkey_handler = hotkey_id.map(|id| HotkeyHandler::new(id, command_tx));

            tokio::join!(
                async {
                    if let Some(handler) = hotkey_handler {
                        if let Err(e) = handler.run(shutdown_rx).await {
                            error!(error = ?e, "Hotkey handler error");
                        }
                    }
                },
                async {
                    if let Err(e) = app.run().await {
                        error!(error = ?e, "App error");
                    }
                }
            );
        });
    });
}

/// Start the recorder session on the recordings folder.
///
/// Must run inside the runtime: the subscription and the watch spawn tasks.
fn build_app(
    config: &Config,
    dir: PathBuf,
    tray_proxy: EventLoopProxy<TrayCommand>,
    command_rx: mpsc::Receiver<AppCommand>,
    shutdown_tx: watch::Sender<bool>,
) -> AppResult<App> {
    let capture = WavCapture::new()?;
    let recorder = Recorder::new(&dir, capture, StatusStore::in_dir(&dir));
    let session = RecorderSession::start(recorder, &SocketChannel::for_recordings(&dir))?;

    info!(dir = ?dir, "Recorder ready");

    Ok(App {
        session,
        tray_proxy,
        command_rx,
        shutdown_tx,
        show_timer: config.behaviour.show_timer,
        icon: TrayIconState::Idle,
        title: None,
    })
}
