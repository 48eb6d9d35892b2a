//! Global hotkey handler.
//!
//! Registers CTRL+SHIFT+Space as a global hotkey and turns each press into a
//! voice input button click.

use crate::{AppCommand, AppError, AppResult};

use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;
use global_hotkey::{
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
    hotkey::{Code, HotKey, Modifiers},
};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument, warn};

/// Forwards presses of the registered hotkey as [`AppCommand::Click`].
pub struct HotkeyHandler {
    hotkey_id: u32,
    command_tx: mpsc::Sender<AppCommand>,
}

impl HotkeyHandler {
    /// Register CTRL+SHIFT+Space as the global hotkey.
    ///
    /// Must be called on a thread with a message pump (e.g. the main thread
    /// running a `tao`/`winit` event loop) so that `WM_HOTKEY` messages are
    /// dispatched on Windows. The returned [`GlobalHotKeyManager`] must be
    /// kept alive on that thread for the hotkey to remain registered.
    #[track_caller]
    #[instrument]
    pub fn register_hotkey() -> AppResult<(GlobalHotKeyManager, u32)> {
        let manager =
            GlobalHotKeyManager::new().map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to create manager: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let hotkey = HotKey::new(Some(Modifiers::CONTROL | Modifiers::SHIFT), Code::Space);

        manager
            .register(hotkey)
            .map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to register CTRL+SHIFT+Space: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(hotkey = "CTRL+SHIFT+Space", "Global hotkey registered");

        Ok((manager, hotkey.id()))
    }

    /// Create a handler for a previously registered hotkey.
    pub fn new(hotkey_id: u32, command_tx: mpsc::Sender<AppCommand>) -> Self {
        Self {
            hotkey_id,
            command_tx,
        }
    }

    /// Forward hotkey presses until a shutdown signal is received.
    #[instrument(skip(self))]
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        let receiver = GlobalHotKeyEvent::receiver().clone();
        let (event_tx, mut event_rx) = mpsc::channel(32);

        // Blocking recv on the global channel, one persistent thread. Exits on
        // the first send after event_rx is dropped.
        let handle = tokio::task::spawn_blocking(move || {
            while let Ok(event) = receiver.recv() {
                if event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Hotkey handler shutting down");
                    break;
                }
                Some(event) = event_rx.recv() => {
                    if self.is_press(&event) {
                        self.click().await?;
                    }
                }
            }
        }

        drop(event_rx);

        // The forwarder may sit in recv() until the next hotkey event.
        match tokio::time::timeout(Duration::from_secs(1), handle).await {
            Ok(Ok(())) => debug!("Hotkey event forwarder stopped cleanly"),
            Ok(Err(e)) => warn!(error = ?e, "Hotkey event forwarder task panicked"),
            Err(_) => debug!(
                "Hotkey event forwarder did not stop within timeout, \
                   will be cleaned up on exit"
            ),
        }

        Ok(())
    }

    /// Only the key-down of our hotkey counts; releases would toggle twice.
    pub(crate) fn is_press(&self, event: &GlobalHotKeyEvent) -> bool {
        event.id == self.hotkey_id && event.state == HotKeyState::Pressed
    }

    async fn click(&self) -> AppResult<()> {
        self.command_tx
            .send(AppCommand::Click)
            .await
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("Failed to send Click: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        debug!("Hotkey pressed");

        Ok(())
    }
}
