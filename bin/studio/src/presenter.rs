//! Headless presenter.

use appcanvas_preview::Presenter;
use serde_json::{Map, Value};
use tracing::info;

/// Logs presentation effects instead of drawing them, and counts them.
#[derive(Debug, Default)]
pub struct LoggingPresenter {
    pub effects: usize,
}

impl Presenter for LoggingPresenter {
    fn show_modal(&mut self, parameters: &Map<String, Value>) {
        self.effects += 1;
        let title = parameters.get("title").and_then(Value::as_str).unwrap_or_default();
        info!(title, "modal shown");
    }

    fn show_toast(&mut self, message: &str, _parameters: &Map<String, Value>) {
        self.effects += 1;
        info!(message, "toast shown");
    }

    fn open_url(&mut self, url: &str) {
        self.effects += 1;
        info!(url, "url opened");
    }
}
