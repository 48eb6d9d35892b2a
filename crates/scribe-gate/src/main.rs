//! Scribe Gate: dictation tray and Supabase session tools.
//!
//! `scribe-gate` (or `scribe-gate dictate`) runs a tray icon that acts as a
//! voice input button: CTRL+SHIFT+Space or the tray menu toggles listening,
//! and each transcript is appended to a prompt mirrored on the clipboard.
//! The remaining subcommands drive the session adapter from the shell.

mod app;
mod app_command;
mod auth_cli;
mod browser_navigator;
mod cli;
mod config;
mod error;
mod hotkey_handler;
mod logging;
mod prompt_field;
mod tray_command;
mod tray_manager;
mod tray_view;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    browser_navigator::BrowserNavigator,
    error::{AppError, Result as AppResult},
    hotkey_handler::HotkeyHandler,
    prompt_field::PromptField,
    tray_command::TrayCommand,
    tray_manager::{TrayManager, TrayMenuIds},
    tray_view::TrayView,
};

use crate::{
    cli::{Cli, Command, SessionCommand},
    config::Config,
};

use std::{process::ExitCode, sync::mpsc as std_mpsc};

use clap::Parser;
use global_hotkey::GlobalHotKeyManager;
use scribe_gate_core::{RecognitionEvent, RecognitionOptions, VoiceCapture, WhisperRecognizer};
use tao::{
    event::{Event, StartCause},
    event_loop::{ControlFlow, EventLoopBuilder},
};
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

/// Application entry point.
fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Dictate) {
        Command::Dictate => run_dictation(),
        Command::Session(command) => run_session(command),
    }
}

fn run_session(command: SessionCommand) -> ExitCode {
    if let Err(e) = logging::init_cli() {
        eprintln!("{}", e);
    }

    let result = Config::load().and_then(|config| {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(auth_cli::run(command, &config))
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = ?e, "Command failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Load the configured Whisper model and open the default microphone.
///
/// # Errors
///
/// Returns error if the model file is missing, or if the microphone or the
/// model cannot be opened.
fn build_recognizer(
    config: &Config,
    events: std_mpsc::Sender<RecognitionEvent>,
) -> AppResult<WhisperRecognizer> {
    config.validate_model_path()?;

    let recognizer =
        WhisperRecognizer::new(&config.voice.model_path, config.voice.use_gpu, events)?;

    Ok(recognizer)
}

fn run_dictation() -> ExitCode {
    let logging_guard = match Config::data_dir()
        .and_then(|data_dir| logging::init_dictation(&data_dir.join("logs")))
    {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            return ExitCode::FAILURE;
        }
    };

    let navigator = match BrowserNavigator::new(&config.site.url) {
        Ok(n) => n,
        Err(e) => {
            error!("Invalid site configuration: {:?}", e);
            return ExitCode::FAILURE;
        }
    };

    let event_loop = EventLoopBuilder::<TrayCommand>::with_user_event().build();
    let tray_proxy = event_loop.create_proxy();

    // TrayManager lives on the main thread - TrayIcon is !Send on all platforms.
    let mut tray_manager = match TrayManager::new() {
        Ok(tm) => tm,
        Err(e) => {
            error!("Failed to create TrayManager: {:?}", e);
            return ExitCode::FAILURE;
        }
    };

    // Persists across event loop iterations; dropping it unregisters the hotkey.
    let mut hotkey_manager: Option<GlobalHotKeyManager> = None;
    let mut startup = Some((config, navigator));

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::UserEvent(cmd) => {
                let result = match cmd {
                    TrayCommand::Render(face) => tray_manager.render(&face),
                    TrayCommand::Hide => tray_manager.hide(),
                    TrayCommand::Shutdown => {
                        *control_flow = ControlFlow::ExitWithCode(0);
                        Ok(())
                    }
                };
                if let Err(e) = result {
                    error!(error = ?e, "Failed to update tray icon");
                }
                return;
            }
            Event::NewEvents(StartCause::Init) => {
                let Some((config, navigator)) = startup.take() else {
                    return;
                };

                #[cfg(target_os = "macos")]
                unsafe {
                    use core_foundation::runloop::{CFRunLoopGetMain, CFRunLoopWakeUp};
                    CFRunLoopWakeUp(CFRunLoopGetMain());
                }

                // Register hotkey on the main thread: tao's event loop pumps
                // the Windows messages needed for WM_HOTKEY delivery.
                let (manager, hotkey_id) = match HotkeyHandler::register_hotkey() {
                    Ok(pair) => pair,
                    Err(e) => {
                        error!("Failed to register hotkey: {:?}", e);
                        *control_flow = ControlFlow::ExitWithCode(1);
                        return;
                    }
                };
                hotkey_manager = Some(manager);

                let tray_proxy = tray_proxy.clone();
                let menu = tray_manager.menu_ids().clone();

                // Spawn tokio runtime on separate thread.
                // TrayManager and hotkey_manager stay on the main thread.
                std::thread::spawn(move || {
                    let rt = match tokio::runtime::Runtime::new() {
                        Ok(rt) => rt,
                        Err(e) => {
                            error!("Failed to create tokio runtime: {:?}", e);
                            let _ = tray_proxy.send_event(TrayCommand::Shutdown);
                            return;
                        }
                    };

                    rt.block_on(async {
                        let (command_tx, command_rx) = mpsc::channel(32);
                        let (shutdown_tx, shutdown_rx) = watch::channel(false);
                        let (events_tx, events_rx) = std_mpsc::channel();

                        let recognizer = build_recognizer(&config, events_tx)
                            .map_err(|e| warn!(error = %e, "Speech recognition unavailable"))
                            .ok();

                        let prompt = PromptField::new(config.voice.mirror_to_clipboard);
                        let view = TrayView::new(prompt, tray_proxy.clone());
                        let capture = VoiceCapture::new(
                            view,
                            recognizer,
                            RecognitionOptions::single_utterance(config.voice.language.clone()),
                        );

                        let hotkey_handler = HotkeyHandler::new(hotkey_id, command_tx);

                        let app = App {
                            capture,
                            recognition_rx: app::bridge_recognition(events_rx),
                            navigator,
                            tray_proxy,
                            command_rx,
                            shutdown_tx,
                            menu,
                            utterance: None,
                        };

                        tokio::join!(
                            async {
                                if let Err(e) = hotkey_handler.run(shutdown_rx).await {
                                    error!(error = ?e, "Hotkey handler error");
                                }
                            },
                            async {
                                if let Err(e) = app.run().await {
                                    error!(error = ?e, "App error");
                                }
                            }
                        );
                    });

                    info!("Runtime thread finished");
                });
            }
            _ => {}
        }

        // Keep hotkey_manager and the log writer alive in the closure for
        // the app's lifetime.
        let _ = (&hotkey_manager, &logging_guard);
    })
}
