/// Commands sent from the hotkey handler and tray menu to the main application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// The voice input button was pressed.
    Click,
    /// Request application shutdown.
    Shutdown,
}
