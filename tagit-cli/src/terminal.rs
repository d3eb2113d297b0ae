//! Terminal presentation adapter.
//!
//! Prints every presentation call as a labelled line, so a simulated scan
//! reads like a transcript of what the app would show.

use console::{style, Style};
use tagit::config::Theme;
use tagit::presentation::{ControlState, PresentationAdapter};

/// Presentation adapter writing to stdout.
pub struct ConsolePresenter {
    label: Style,
    show_source: bool,
}

impl ConsolePresenter {
    pub fn new(theme: Theme, show_source: bool) -> Self {
        let label = match theme {
            Theme::Dark => Style::new().cyan().bold(),
            Theme::Light => Style::new().blue().bold(),
        };
        Self { label, show_source }
    }

    fn line(&self, name: &str, text: &str) {
        println!("  {:>8}  {}", self.label.apply_to(name), text);
    }
}

impl PresentationAdapter for ConsolePresenter {
    fn render_content(&self, html: &str) {
        self.line("content", html);
    }

    fn render_source(&self, escaped_html: &str) {
        if self.show_source {
            self.line("source", escaped_html);
        }
    }

    fn set_status(&self, text: &str) {
        self.line("status", text);
    }

    fn set_detected(&self, tag_label: Option<&str>) {
        self.line("detected", tag_label.unwrap_or("-"));
    }

    fn set_hint(&self, text: &str) {
        self.line("hint", &style(text).dim().to_string());
    }

    fn set_controls(&self, controls: ControlState) {
        let flag = |on: bool| if on { "on" } else { "off" };
        self.line(
            "controls",
            &format!(
                "start {} / stop {}",
                flag(controls.start_enabled),
                flag(controls.stop_enabled)
            ),
        );
    }

    fn notify(&self, message: &str) {
        self.line("notice", &style(message).yellow().to_string());
    }
}
