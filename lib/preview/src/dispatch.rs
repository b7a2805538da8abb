//! Interaction dispatcher.
//!
//! Dispatching a UI event on a component:
//!
//! 1. Records the interaction, before anything else, so the log reflects it
//!    even when nothing is bound or every action fails.
//! 2. Looks up the component's bindings for the event name.
//! 3. Runs each bound action in list order.
//!
//! A broken binding never aborts the loop: unknown types and bad parameters
//! are logged and skipped, and the next action still runs.

use crate::app::{Action, ComponentId, ScreenId};
use crate::error::ActionError;
use crate::session::PreviewSession;
use appcanvas_core::InteractionId;
use serde_json::{Map, Value, json};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// A UI event raised on a rendered component.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Tap,
    LongPress,
    /// The component's value changed.
    Input { value: Value },
}

impl UiEvent {
    /// Name of the bindings this event triggers.
    #[must_use]
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Tap => "onTap",
            Self::LongPress => "onLongPress",
            Self::Input { .. } => "onChange",
        }
    }

    /// Kind recorded in the interaction log.
    #[must_use]
    pub fn interaction_kind(&self) -> &'static str {
        match self {
            Self::Tap | Self::LongPress => "tap",
            Self::Input { .. } => "input",
        }
    }

    /// Event metadata stored with the interaction.
    #[must_use]
    pub fn payload(&self) -> Value {
        match self {
            Self::Tap | Self::LongPress => json!({ "event": self.event_name() }),
            Self::Input { value } => json!({ "event": self.event_name(), "value": value }),
        }
    }

    /// Rebuilds an event from recorded metadata.
    #[must_use]
    pub fn from_payload(payload: &Value) -> Option<Self> {
        match payload.get("event")?.as_str()? {
            "onTap" => Some(Self::Tap),
            "onLongPress" => Some(Self::LongPress),
            "onChange" => Some(Self::Input {
                value: payload.get("value").cloned().unwrap_or(Value::Null),
            }),
            _ => None,
        }
    }
}

/// Action kinds the preview can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreviewActionKind {
    Navigate,
    GoBack,
    ShowModal,
    ShowToast,
    OpenUrl,
}

impl PreviewActionKind {
    /// Key used in app definitions.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Navigate => "navigate",
            Self::GoBack => "goBack",
            Self::ShowModal => "showModal",
            Self::ShowToast => "showToast",
            Self::OpenUrl => "openUrl",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "navigate" => Some(Self::Navigate),
            "goBack" => Some(Self::GoBack),
            "showModal" => Some(Self::ShowModal),
            "showToast" => Some(Self::ShowToast),
            "openUrl" => Some(Self::OpenUrl),
            _ => None,
        }
    }
}

impl fmt::Display for PreviewActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A validated action, ready to run.
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewAction {
    Navigate { screen_id: ScreenId },
    GoBack,
    ShowModal { parameters: Map<String, Value> },
    ShowToast { message: String, parameters: Map<String, Value> },
    OpenUrl { url: String },
}

impl PreviewAction {
    #[must_use]
    pub fn kind(&self) -> PreviewActionKind {
        match self {
            Self::Navigate { .. } => PreviewActionKind::Navigate,
            Self::GoBack => PreviewActionKind::GoBack,
            Self::ShowModal { .. } => PreviewActionKind::ShowModal,
            Self::ShowToast { .. } => PreviewActionKind::ShowToast,
            Self::OpenUrl { .. } => PreviewActionKind::OpenUrl,
        }
    }
}

impl TryFrom<&Action> for PreviewAction {
    type Error = ActionError;

    fn try_from(action: &Action) -> Result<Self, Self::Error> {
        let kind =
            PreviewActionKind::from_key(&action.action_type).ok_or_else(|| ActionError::UnknownType {
                action_type: action.action_type.clone(),
            })?;

        let required = |parameter: &'static str| {
            action
                .parameters
                .get(parameter)
                .and_then(Value::as_str)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
                .ok_or_else(|| ActionError::MissingParameter {
                    action_type: action.action_type.clone(),
                    parameter,
                })
        };

        Ok(match kind {
            PreviewActionKind::Navigate => Self::Navigate {
                screen_id: ScreenId::new(required("screenId")?),
            },
            PreviewActionKind::GoBack => Self::GoBack,
            PreviewActionKind::ShowModal => Self::ShowModal {
                parameters: action.parameters.clone(),
            },
            PreviewActionKind::ShowToast => Self::ShowToast {
                message: required("message")?,
                parameters: action.parameters.clone(),
            },
            PreviewActionKind::OpenUrl => Self::OpenUrl {
                url: required("url")?,
            },
        })
    }
}

/// Presentation side effects the preview asks its host to perform.
pub trait Presenter {
    fn show_modal(&mut self, parameters: &Map<String, Value>);

    fn show_toast(&mut self, message: &str, parameters: &Map<String, Value>);

    fn open_url(&mut self, url: &str);
}

/// Outcome of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    /// The interaction recorded for this dispatch.
    pub interaction: InteractionId,
    /// Actions that ran, in order.
    pub executed: Vec<PreviewActionKind>,
    /// Bindings that were logged and skipped.
    pub skipped: usize,
}

/// Dispatches a UI event on a component of the current screen.
pub fn dispatch(
    session: &mut PreviewSession,
    presenter: &mut dyn Presenter,
    component_id: &ComponentId,
    event: &UiEvent,
) -> DispatchReport {
    let interaction = session.record_interaction(
        event.interaction_kind(),
        Some(component_id.clone()),
        Some(event.payload()),
    );
    let mut report = DispatchReport {
        interaction,
        executed: Vec::new(),
        skipped: 0,
    };

    // Hold our own handle so bindings can be read while the session mutates.
    let app = Arc::clone(session.app());
    let Some(component) = session
        .current_screen_id()
        .and_then(|screen_id| app.screen(screen_id))
        .and_then(|screen| screen.component(component_id))
    else {
        warn!(%component_id, "component not on current screen");
        return report;
    };

    for bound in component.bound_events(event.event_name()) {
        let action = match PreviewAction::try_from(&bound.action) {
            Ok(action) => action,
            Err(err) => {
                warn!(%component_id, error = %err, "skipping bound action");
                report.skipped += 1;
                continue;
            }
        };

        match &action {
            PreviewAction::Navigate { screen_id } => {
                if let Err(err) = session.navigate_to_screen(screen_id) {
                    warn!(%component_id, error = %err, "navigate action failed");
                    report.skipped += 1;
                    continue;
                }
            }
            PreviewAction::GoBack => {
                session.go_back();
            }
            PreviewAction::ShowModal { parameters } => presenter.show_modal(parameters),
            PreviewAction::ShowToast {
                message,
                parameters,
            } => presenter.show_toast(message, parameters),
            PreviewAction::OpenUrl { url } => presenter.open_url(url),
        }

        debug!(%component_id, action = %action.kind(), "action executed");
        report.executed.push(action.kind());
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppDefinition;

    #[derive(Default)]
    struct RecordingPresenter {
        calls: Vec<String>,
    }

    impl Presenter for RecordingPresenter {
        fn show_modal(&mut self, parameters: &Map<String, Value>) {
            let title = parameters.get("title").and_then(Value::as_str).unwrap_or("");
            self.calls.push(format!("modal:{title}"));
        }

        fn show_toast(&mut self, message: &str, _parameters: &Map<String, Value>) {
            self.calls.push(format!("toast:{message}"));
        }

        fn open_url(&mut self, url: &str) {
            self.calls.push(format!("url:{url}"));
        }
    }

    fn session() -> PreviewSession {
        let app: AppDefinition = serde_json::from_value(json!({
            "screens": [
                {
                    "id": "S1",
                    "isHome": true,
                    "components": [
                        {
                            "id": "go",
                            "type": "button",
                            "events": {"onTap": [
                                {"action": {"type": "navigate", "parameters": {"screenId": "S2"}}}
                            ]}
                        },
                        {
                            "id": "messy",
                            "type": "button",
                            "events": {"onTap": [
                                {"action": {"type": "teleport"}},
                                {"action": {"type": "navigate", "parameters": {}}},
                                {"action": {"type": "showToast", "parameters": {"message": "hi"}}},
                                {"action": {"type": "navigate", "parameters": {"screenId": "nowhere"}}},
                                {"action": {"type": "showModal", "parameters": {"title": "Terms"}}}
                            ]}
                        },
                        {
                            "id": "name",
                            "type": "text-input",
                            "events": {"onChange": [
                                {"action": {"type": "openUrl", "parameters": {"url": "https://example.com"}}}
                            ]}
                        },
                        {"id": "label", "type": "text"}
                    ]
                },
                {
                    "id": "S2",
                    "components": [{
                        "id": "back",
                        "type": "button",
                        "events": {"onTap": [{"action": {"type": "goBack"}}]}
                    }]
                }
            ]
        }))
        .expect("valid app");
        PreviewSession::new(app)
    }

    #[test]
    fn tap_records_then_navigates() {
        let mut session = session();
        let mut presenter = RecordingPresenter::default();

        let report = dispatch(&mut session, &mut presenter, &"go".into(), &UiEvent::Tap);

        assert_eq!(session.interactions().len(), 1);
        let event = &session.interactions()[0];
        assert_eq!(event.id, report.interaction);
        assert_eq!(event.kind, "tap");
        // Recorded on the screen the tap happened on, before navigating.
        assert_eq!(event.screen_id, Some("S1".into()));
        assert_eq!(event.component_id, Some("go".into()));
        assert_eq!(report.executed, [PreviewActionKind::Navigate]);
        assert_eq!(session.current_screen_id(), Some(&"S2".into()));
    }

    #[test]
    fn broken_bindings_are_skipped_in_order() {
        let mut session = session();
        let mut presenter = RecordingPresenter::default();

        let report = dispatch(&mut session, &mut presenter, &"messy".into(), &UiEvent::Tap);

        assert_eq!(report.executed, [PreviewActionKind::ShowToast, PreviewActionKind::ShowModal]);
        assert_eq!(report.skipped, 3);
        assert_eq!(presenter.calls, ["toast:hi", "modal:Terms"]);
        assert_eq!(session.current_screen_id(), Some(&"S1".into()));
        assert_eq!(session.interactions().len(), 1);
    }

    #[test]
    fn unbound_component_still_records() {
        let mut session = session();
        let mut presenter = RecordingPresenter::default();

        let report = dispatch(&mut session, &mut presenter, &"label".into(), &UiEvent::Tap);
        assert!(report.executed.is_empty());

        let report = dispatch(&mut session, &mut presenter, &"ghost".into(), &UiEvent::LongPress);
        assert!(report.executed.is_empty());
        assert_eq!(session.interactions().len(), 2);
    }

    #[test]
    fn input_records_value_and_runs_on_change() {
        let mut session = session();
        let mut presenter = RecordingPresenter::default();
        let event = UiEvent::Input {
            value: json!("Ada"),
        };

        let report = dispatch(&mut session, &mut presenter, &"name".into(), &event);

        assert_eq!(report.executed, [PreviewActionKind::OpenUrl]);
        assert_eq!(presenter.calls, ["url:https://example.com"]);
        let recorded = &session.interactions()[0];
        assert_eq!(recorded.kind, "input");
        assert_eq!(recorded.payload, Some(json!({"event": "onChange", "value": "Ada"})));
    }

    #[test]
    fn go_back_action() {
        let mut session = session();
        let mut presenter = RecordingPresenter::default();

        dispatch(&mut session, &mut presenter, &"go".into(), &UiEvent::Tap);
        dispatch(&mut session, &mut presenter, &"back".into(), &UiEvent::Tap);
        assert_eq!(session.current_screen_id(), Some(&"S1".into()));
        assert!(session.can_go_forward());
    }

    #[test]
    fn ui_event_payload_round_trips() {
        for event in [
            UiEvent::Tap,
            UiEvent::LongPress,
            UiEvent::Input { value: json!(42) },
        ] {
            assert_eq!(UiEvent::from_payload(&event.payload()), Some(event));
        }
        assert_eq!(UiEvent::from_payload(&json!({"event": "onSwipe"})), None);
    }

    #[test]
    fn action_parsing_errors() {
        let action = Action {
            action_type: "openUrl".to_string(),
            parameters: Map::new(),
        };
        assert_eq!(
            PreviewAction::try_from(&action),
            Err(ActionError::MissingParameter {
                action_type: "openUrl".to_string(),
                parameter: "url",
            })
        );
    }
}
