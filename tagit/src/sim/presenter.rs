//! Recording presentation adapter.

use parking_lot::Mutex;

use crate::presentation::{ControlState, PresentationAdapter};

/// Everything a [`RecordingPresenter`] has been told.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenterState {
    pub content: String,
    pub source: String,
    pub status: String,
    pub detected: Option<String>,
    pub hint: String,
    pub controls: ControlState,
    pub notifications: Vec<String>,
    /// Every `render_content` call, in order.
    pub content_history: Vec<String>,
    /// Every `set_status` call, in order.
    pub status_history: Vec<String>,
}

/// Presentation adapter that records calls for later inspection.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    state: Mutex<PresenterState>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the recorded state.
    pub fn state(&self) -> PresenterState {
        self.state.lock().clone()
    }

    /// Currently rendered content.
    pub fn content(&self) -> String {
        self.state.lock().content.clone()
    }

    /// Current status line.
    pub fn status(&self) -> String {
        self.state.lock().status.clone()
    }
}

impl PresentationAdapter for RecordingPresenter {
    fn render_content(&self, html: &str) {
        let mut state = self.state.lock();
        state.content = html.to_string();
        state.content_history.push(html.to_string());
    }

    fn render_source(&self, escaped_html: &str) {
        self.state.lock().source = escaped_html.to_string();
    }

    fn set_status(&self, text: &str) {
        let mut state = self.state.lock();
        state.status = text.to_string();
        state.status_history.push(text.to_string());
    }

    fn set_detected(&self, tag_label: Option<&str>) {
        self.state.lock().detected = tag_label.map(str::to_string);
    }

    fn set_hint(&self, text: &str) {
        self.state.lock().hint = text.to_string();
    }

    fn set_controls(&self, controls: ControlState) {
        self.state.lock().controls = controls;
    }

    fn notify(&self, message: &str) {
        self.state.lock().notifications.push(message.to_string());
    }
}
