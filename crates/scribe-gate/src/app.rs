use crate::{AppCommand, AppResult, BrowserNavigator, TrayCommand, TrayMenuIds, TrayView};

use std::{sync::mpsc as std_mpsc, time::Duration};

use scribe_gate_core::{
    CaptureState, Navigation, Navigator, RecognitionEvent, VoiceCapture, WhisperRecognizer,
};
use tao::event_loop::EventLoopProxy;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, instrument, warn};
use tray_icon::menu::MenuEvent;
use uuid::Uuid;

/// Dictation state on the async runtime thread.
///
/// Tray mutations go back to the main thread through `tray_proxy` because
/// `TrayIcon` is `!Send` and must remain on the UI thread.
pub struct App {
    pub(crate) capture: VoiceCapture<TrayView, WhisperRecognizer>,
    pub(crate) recognition_rx: mpsc::Receiver<RecognitionEvent>,
    pub(crate) navigator: BrowserNavigator,
    pub(crate) tray_proxy: EventLoopProxy<TrayCommand>,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
    pub(crate) menu: TrayMenuIds,
    pub(crate) utterance: Option<Uuid>,
}

impl App {
    /// Run the dictation loop until Exit or a shutdown command.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        if self.capture.state() == CaptureState::Unsupported {
            warn!("No speech recognizer available, nothing to dictate with");
            self.shutdown();
            return Ok(());
        }

        info!("Scribe Gate dictation starting");

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
                    if !self.handle_menu_event(&event) {
                        break;
                    }
                }

                Some(cmd) = self.command_rx.recv() => {
                    match cmd {
                        AppCommand::Click => self.click(),
                        AppCommand::Shutdown => {
                            info!("Shutdown requested");
                            break;
                        }
                    }
                }

                Some(event) = self.recognition_rx.recv() => {
                    self.handle_recognition(event);
                }

                else => {
                    info!("All channels closed, shutting down");
                    break;
                }
            }
        }

        drop(tray_event_rx);

        match tokio::time::timeout(Duration::from_secs(1), tray_handle).await {
            Ok(Ok(())) => debug!("Tray event forwarder stopped cleanly"),
            Ok(Err(e)) => error!(error = ?e, "Tray event forwarder task panicked"),
            Err(_) => debug!(
                "Tray event forwarder did not stop within timeout, \
                     will be cleaned up on exit"
            ),
        }

        self.shutdown();
        info!("Scribe Gate shut down successfully");

        Ok(())
    }

    /// Returns false when the menu asked to exit.
    fn handle_menu_event(&mut self, event: &MenuEvent) -> bool {
        let id = &event.id;

        if id == &self.menu.toggle {
            self.click();
        } else if id == &self.menu.open_site {
            self.navigator.navigate(Navigation::Root);
        } else if id == &self.menu.clear_prompt {
            self.capture.view_mut().clear_prompt();
            info!("Prompt cleared");
        } else if id == &self.menu.exit {
            info!("Exit requested from tray menu");
            return false;
        }

        true
    }

    fn click(&mut self) {
        self.capture.click();

        if self.capture.is_listening() {
            let utterance = Uuid::new_v4();
            info!(utterance = %utterance, "Listening");
            self.utterance = Some(utterance);
        } else if let Some(utterance) = self.utterance {
            info!(utterance = %utterance, "Stop requested");
        }
    }

    fn handle_recognition(&mut self, event: RecognitionEvent) {
        let finished = matches!(event, RecognitionEvent::End | RecognitionEvent::Error(_));
        let utterance = self.utterance;

        if let RecognitionEvent::Result(results) = &event {
            debug!(utterance = ?utterance, results = results.len(), "Transcript received");
        }

        self.capture.handle(event);

        if finished {
            debug!(utterance = ?utterance, "Utterance finished");
            // A newer utterance may already be running.
            if !self.capture.is_listening() {
                self.utterance = None;
            }
        }
    }

    fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
        if self.tray_proxy.send_event(TrayCommand::Shutdown).is_err() {
            warn!("Event loop closed before shutdown could be requested");
        }
    }
}

/// Forward recognizer events from its std channel onto the runtime.
///
/// The forwarding task ends once every sender is gone or the returned
/// receiver is dropped.
pub(crate) fn bridge_recognition(
    source: std_mpsc::Receiver<RecognitionEvent>,
) -> mpsc::Receiver<RecognitionEvent> {
    let (tx, rx) = mpsc::channel(32);
    tokio::task::spawn_blocking(move || {
        while let Ok(event) = source.recv() {
            if tx.blocking_send(event).is_err() {
                break;
            }
        }
    });
    rx
}
