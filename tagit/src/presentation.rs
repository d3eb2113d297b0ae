//! Presentation adapter contract.
//!
//! The controller never touches a view directly. Everything the user sees
//! goes through a [`PresentationAdapter`]: rendered content, its escaped
//! source, the status and hint lines, the detected tag label and the
//! start/stop controls.

/// Enabled state of the start and stop controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlState {
    pub start_enabled: bool,
    pub stop_enabled: bool,
}

impl ControlState {
    /// Start enabled, stop disabled.
    pub const IDLE: ControlState = ControlState {
        start_enabled: true,
        stop_enabled: false,
    };

    /// Start disabled, stop enabled.
    pub const RUNNING: ControlState = ControlState {
        start_enabled: false,
        stop_enabled: true,
    };

    /// Both disabled.
    pub const LOCKED: ControlState = ControlState {
        start_enabled: false,
        stop_enabled: false,
    };
}

/// Status lines shown by the controller.
pub mod status {
    pub const LOADING: &str = "Loading card data…";
    pub const READY: &str = "Ready to scan…";
    pub const OPENING_CAMERA: &str = "Opening camera…";
    pub const SCANNING: &str = "Scanning active.";
    pub const STOPPED: &str = "Scanning stopped.";

    pub const HINT_AIM: &str = "Aim the camera at a card.";
    pub const HINT_RESTART: &str = "Press Start to scan again.";
}

/// Receiver of everything the scan lifecycle shows to the user.
///
/// Implementations must be cheap and non-blocking; they are called from the
/// controller task.
pub trait PresentationAdapter: Send + Sync {
    /// Render markup in the content area.
    fn render_content(&self, html: &str);

    /// Show already-escaped markup as literal source.
    fn render_source(&self, escaped_html: &str);

    /// Set the status line.
    fn set_status(&self, text: &str);

    /// Set the detected tag label (e.g. `<b>`), `None` to clear it.
    fn set_detected(&self, tag_label: Option<&str>);

    /// Set the hint line.
    fn set_hint(&self, text: &str);

    /// Update the start/stop controls.
    fn set_controls(&self, controls: ControlState);

    /// Show a transient notification.
    fn notify(&self, message: &str);
}
