//! Preview navigation engine.
//!
//! A [`PreviewSession`] holds everything transient about one preview: the
//! simulated device and viewport, a browser-style screen history and the
//! append-only interaction log.
//!
//! History semantics: navigating discards every entry past the current
//! index before appending, so `[A, B, C]` at `C`, back to `B`, then
//! navigate to `D` yields `[A, B, D]`.

use crate::app::{AppDefinition, ComponentId, Screen, ScreenId};
use crate::clock::{Clock, SystemClock};
use crate::device::{Device, Orientation};
use crate::error::PreviewError;
use crate::export::InteractionExport;
use appcanvas_core::InteractionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Smallest zoom factor.
pub const MIN_ZOOM: f64 = 0.25;
/// Largest zoom factor.
pub const MAX_ZOOM: f64 = 2.0;
/// Zoom change for one zoom-in or zoom-out step.
pub const ZOOM_STEP: f64 = 0.25;

/// One entry in the interaction log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionEvent {
    pub id: InteractionId,
    /// Interaction kind, e.g. `tap` or `input`.
    #[serde(rename = "type")]
    pub kind: String,
    pub timestamp: DateTime<Utc>,
    /// Screen shown when the interaction happened; absent only for apps
    /// without screens.
    pub screen_id: Option<ScreenId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_id: Option<ComponentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

/// State of one preview session.
#[derive(Clone)]
pub struct PreviewSession {
    app: Arc<AppDefinition>,
    device: &'static Device,
    orientation: Orientation,
    zoom: f64,
    history: Vec<ScreenId>,
    index: usize,
    interactions: Vec<InteractionEvent>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for PreviewSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewSession")
            .field("device", &self.device.id)
            .field("orientation", &self.orientation)
            .field("zoom", &self.zoom)
            .field("history", &self.history)
            .field("index", &self.index)
            .field("interactions", &self.interactions.len())
            .finish_non_exhaustive()
    }
}

impl PreviewSession {
    /// Opens a preview on the app's home screen using the default device.
    #[must_use]
    pub fn new(app: impl Into<Arc<AppDefinition>>) -> Self {
        let app = app.into();
        let history = app
            .home_screen()
            .map(|screen| vec![screen.id.clone()])
            .unwrap_or_default();
        Self {
            app,
            device: Device::default_device(),
            orientation: Orientation::default(),
            zoom: 1.0,
            history,
            index: 0,
            interactions: Vec::new(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the time source used for interaction timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn app(&self) -> &Arc<AppDefinition> {
        &self.app
    }

    #[must_use]
    pub fn device(&self) -> &'static Device {
        self.device
    }

    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Viewport `(width, height)` for the current device and orientation.
    #[must_use]
    pub fn viewport_size(&self) -> (u32, u32) {
        self.device.viewport_size(self.orientation)
    }

    #[must_use]
    pub fn history(&self) -> &[ScreenId] {
        &self.history
    }

    #[must_use]
    pub fn history_index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn current_screen_id(&self) -> Option<&ScreenId> {
        self.history.get(self.index)
    }

    #[must_use]
    pub fn current_screen(&self) -> Option<&Screen> {
        self.current_screen_id().and_then(|id| self.app.screen(id))
    }

    /// Navigates to a screen, discarding any forward history.
    ///
    /// # Errors
    ///
    /// Returns `ScreenNotFound` if the app has no such screen; history is
    /// left untouched.
    pub fn navigate_to_screen(&mut self, screen_id: &ScreenId) -> Result<(), PreviewError> {
        if self.app.screen(screen_id).is_none() {
            return Err(PreviewError::ScreenNotFound {
                screen_id: screen_id.clone(),
            });
        }

        if !self.history.is_empty() {
            self.history.truncate(self.index + 1);
        }
        self.history.push(screen_id.clone());
        self.index = self.history.len() - 1;
        debug!(%screen_id, index = self.index, "navigated");
        Ok(())
    }

    #[must_use]
    pub fn can_go_back(&self) -> bool {
        self.index > 0
    }

    #[must_use]
    pub fn can_go_forward(&self) -> bool {
        self.index + 1 < self.history.len()
    }

    /// Steps back in history. Returns false at the start.
    pub fn go_back(&mut self) -> bool {
        if !self.can_go_back() {
            return false;
        }
        self.index -= 1;
        true
    }

    /// Steps forward in history. Returns false at the end.
    pub fn go_forward(&mut self) -> bool {
        if !self.can_go_forward() {
            return false;
        }
        self.index += 1;
        true
    }

    /// Sets the zoom factor, clamped to `[MIN_ZOOM, MAX_ZOOM]`. Returns the
    /// stored value. NaN is ignored.
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        if !zoom.is_nan() {
            self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
        self.zoom
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.set_zoom(self.zoom + ZOOM_STEP)
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.set_zoom(self.zoom - ZOOM_STEP)
    }

    pub fn reset_zoom(&mut self) {
        self.zoom = 1.0;
    }

    /// Switches the simulated device.
    ///
    /// # Errors
    ///
    /// Returns `DeviceNotFound` for an unknown id.
    pub fn set_device(&mut self, device_id: &str) -> Result<(), PreviewError> {
        self.device = Device::lookup(device_id).ok_or_else(|| PreviewError::DeviceNotFound {
            device_id: device_id.to_string(),
        })?;
        Ok(())
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    pub fn toggle_orientation(&mut self) -> Orientation {
        self.orientation = self.orientation.toggled();
        self.orientation
    }

    /// Appends an interaction on the current screen to the log.
    pub fn record_interaction(
        &mut self,
        kind: impl Into<String>,
        component_id: Option<ComponentId>,
        payload: Option<Value>,
    ) -> InteractionId {
        let event = InteractionEvent {
            id: InteractionId::new(),
            kind: kind.into(),
            timestamp: self.clock.now(),
            screen_id: self.current_screen_id().cloned(),
            component_id,
            payload,
        };
        let id = event.id;
        debug!(interaction_id = %id, kind = %event.kind, "interaction recorded");
        self.interactions.push(event);
        id
    }

    /// The interaction log, oldest first.
    #[must_use]
    pub fn interactions(&self) -> &[InteractionEvent] {
        &self.interactions
    }

    pub fn clear_interactions(&mut self) {
        self.interactions.clear();
    }

    /// Snapshots the log with its viewport context.
    #[must_use]
    pub fn export_interactions(&self) -> InteractionExport {
        let duration = match (self.interactions.first(), self.interactions.last()) {
            (Some(first), Some(last)) if self.interactions.len() >= 2 => {
                (last.timestamp - first.timestamp).num_milliseconds()
            }
            _ => 0,
        };
        InteractionExport {
            interactions: self.interactions.clone(),
            device: self.device.id.to_string(),
            orientation: self.orientation,
            total_interactions: self.interactions.len(),
            duration,
            exported_at: self.clock.now(),
        }
    }

    /// Returns to the home screen with empty history and log.
    pub fn reset(&mut self) {
        self.history = self
            .app
            .home_screen()
            .map(|screen| vec![screen.id.clone()])
            .unwrap_or_default();
        self.index = 0;
        self.interactions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeDelta;
    use serde_json::json;

    fn app() -> AppDefinition {
        serde_json::from_value(json!({
            "screens": [
                {"id": "A", "title": "A", "isHome": true},
                {"id": "B", "title": "B"},
                {"id": "C", "title": "C"},
                {"id": "D", "title": "D"}
            ]
        }))
        .expect("valid app")
    }

    fn ids(session: &PreviewSession) -> Vec<&str> {
        session.history().iter().map(ScreenId::as_str).collect()
    }

    #[test]
    fn starts_on_home_screen() {
        let session = PreviewSession::new(app());
        assert_eq!(ids(&session), ["A"]);
        assert_eq!(session.current_screen().map(|s| s.title.as_str()), Some("A"));
        assert!(!session.can_go_back());
        assert!(!session.can_go_forward());
    }

    #[test]
    fn navigate_after_back_discards_forward_history() {
        let mut session = PreviewSession::new(app());
        session.navigate_to_screen(&"B".into()).unwrap();
        session.navigate_to_screen(&"C".into()).unwrap();
        assert_eq!(session.history_index(), 2);

        assert!(session.go_back());
        assert_eq!(session.history_index(), 1);

        session.navigate_to_screen(&"D".into()).unwrap();
        assert_eq!(ids(&session), ["A", "B", "D"]);
        assert_eq!(session.history_index(), 2);
        assert!(!session.can_go_forward());
    }

    #[test]
    fn back_and_forward_are_clamped() {
        let mut session = PreviewSession::new(app());
        assert!(!session.go_back());
        assert!(!session.go_forward());

        session.navigate_to_screen(&"B".into()).unwrap();
        assert!(session.go_back());
        assert!(!session.go_back());
        assert!(session.go_forward());
        assert!(!session.go_forward());
        assert_eq!(session.current_screen_id().map(ScreenId::as_str), Some("B"));
    }

    #[test]
    fn unknown_screen_leaves_history_alone() {
        let mut session = PreviewSession::new(app());
        let err = session.navigate_to_screen(&"Z".into()).unwrap_err();
        assert_eq!(err, PreviewError::ScreenNotFound { screen_id: "Z".into() });
        assert_eq!(ids(&session), ["A"]);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut session = PreviewSession::new(app());
        assert_eq!(session.set_zoom(3.0), 2.0);
        assert_eq!(session.set_zoom(0.1), 0.25);
        assert_eq!(session.set_zoom(f64::NAN), 0.25);
        assert_eq!(session.zoom_in(), 0.5);
        session.reset_zoom();
        assert_eq!(session.zoom_out(), 0.75);
        assert_eq!(session.set_zoom(1.75), 1.75);
        assert_eq!(session.zoom_in(), 2.0);
        assert_eq!(session.zoom_in(), 2.0);
    }

    #[test]
    fn device_and_orientation() {
        let mut session = PreviewSession::new(app());
        session.set_device("ipad-pro-11").unwrap();
        assert_eq!(session.toggle_orientation(), Orientation::Landscape);
        assert_eq!(session.viewport_size(), (1194, 834));
        assert!(matches!(
            session.set_device("unknown"),
            Err(PreviewError::DeviceNotFound { .. })
        ));
        assert_eq!(session.device().id, "ipad-pro-11");
    }

    #[test]
    fn recorded_interactions_carry_screen_and_unique_ids() {
        let mut session = PreviewSession::new(app());
        let first = session.record_interaction("tap", Some("btn".into()), None);
        session.navigate_to_screen(&"B".into()).unwrap();
        let second = session.record_interaction("input", None, Some(json!({"value": "x"})));

        assert_ne!(first, second);
        let log = session.interactions();
        assert_eq!(log[0].screen_id, Some("A".into()));
        assert_eq!(log[0].component_id, Some("btn".into()));
        assert_eq!(log[1].screen_id, Some("B".into()));

        session.clear_interactions();
        assert!(session.interactions().is_empty());
    }

    #[test]
    fn export_of_empty_log() {
        let export = PreviewSession::new(app()).export_interactions();
        assert_eq!(export.duration, 0);
        assert_eq!(export.total_interactions, 0);
        assert_eq!(export.device, "iphone-14-pro");
    }

    #[test]
    fn export_duration_spans_first_to_last() {
        let clock = Arc::new(ManualClock::starting_at(Utc::now()));
        let mut session = PreviewSession::new(app()).with_clock(clock.clone());

        session.record_interaction("tap", None, None);
        assert_eq!(session.export_interactions().duration, 0);

        clock.advance(TimeDelta::milliseconds(750));
        session.record_interaction("tap", None, None);
        clock.advance(TimeDelta::milliseconds(250));
        session.record_interaction("tap", None, None);

        let export = session.export_interactions();
        assert_eq!(export.duration, 1000);
        assert_eq!(export.total_interactions, 3);
    }

    #[test]
    fn reset_returns_home() {
        let mut session = PreviewSession::new(app());
        session.navigate_to_screen(&"C".into()).unwrap();
        session.record_interaction("tap", None, None);

        session.reset();
        assert_eq!(ids(&session), ["A"]);
        assert_eq!(session.history_index(), 0);
        assert!(session.interactions().is_empty());
    }

    #[test]
    fn app_without_screens() {
        let mut session = PreviewSession::new(AppDefinition::default());
        assert!(session.current_screen_id().is_none());
        session.record_interaction("tap", None, None);
        assert_eq!(session.interactions()[0].screen_id, None);
    }
}
