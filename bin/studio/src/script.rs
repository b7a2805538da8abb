//! Interaction scripts.
//!
//! A script is a JSON list of steps run against a preview session:
//!
//! ```json
//! [
//!   {"step": "tap", "component": "login-button"},
//!   {"step": "input", "component": "email", "value": "ada@example.com"},
//!   {"step": "back"},
//!   {"step": "zoom", "level": 1.5}
//! ]
//! ```
//!
//! Steps that cannot be applied are logged and the script continues.

use appcanvas_preview::{
    ComponentId, Orientation, Presenter, PreviewSession, ScreenId, UiEvent, dispatch,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "step", rename_all = "camelCase")]
pub enum ScriptStep {
    Tap { component: ComponentId },
    LongPress { component: ComponentId },
    Input { component: ComponentId, value: Value },
    Navigate { screen: ScreenId },
    Back,
    Forward,
    Zoom { level: f64 },
    Device { id: String },
    Orientation { orientation: Orientation },
    Rotate,
}

/// Counts from a script run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptSummary {
    pub steps: usize,
    pub dispatched: usize,
    pub failed: usize,
}

fn dispatch_step(
    session: &mut PreviewSession,
    presenter: &mut dyn Presenter,
    index: usize,
    component: &ComponentId,
    event: UiEvent,
) {
    let report = dispatch(session, presenter, component, &event);
    debug!(
        index,
        %component,
        executed = report.executed.len(),
        skipped = report.skipped,
        "step dispatched"
    );
}

/// Runs every step in order.
pub fn run_script(
    session: &mut PreviewSession,
    presenter: &mut dyn Presenter,
    steps: &[ScriptStep],
) -> ScriptSummary {
    let mut summary = ScriptSummary {
        steps: steps.len(),
        ..ScriptSummary::default()
    };

    for (index, step) in steps.iter().enumerate() {
        let applied = match step {
            ScriptStep::Tap { component } => {
                dispatch_step(session, presenter, index, component, UiEvent::Tap);
                summary.dispatched += 1;
                Ok(())
            }
            ScriptStep::LongPress { component } => {
                dispatch_step(session, presenter, index, component, UiEvent::LongPress);
                summary.dispatched += 1;
                Ok(())
            }
            ScriptStep::Input { component, value } => {
                let event = UiEvent::Input {
                    value: value.clone(),
                };
                dispatch_step(session, presenter, index, component, event);
                summary.dispatched += 1;
                Ok(())
            }
            ScriptStep::Navigate { screen } => session
                .navigate_to_screen(screen)
                .map_err(|e| e.to_string()),
            ScriptStep::Back => {
                session.go_back();
                Ok(())
            }
            ScriptStep::Forward => {
                session.go_forward();
                Ok(())
            }
            ScriptStep::Zoom { level } => {
                session.set_zoom(*level);
                Ok(())
            }
            ScriptStep::Device { id } => session.set_device(id).map_err(|e| e.to_string()),
            ScriptStep::Orientation { orientation } => {
                session.set_orientation(*orientation);
                Ok(())
            }
            ScriptStep::Rotate => {
                session.toggle_orientation();
                Ok(())
            }
        };

        if let Err(error) = applied {
            warn!(index, %error, "script step failed");
            summary.failed += 1;
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use appcanvas_preview::AppDefinition;
    use serde_json::{Map, json};

    struct Silent;

    impl Presenter for Silent {
        fn show_modal(&mut self, _parameters: &Map<String, Value>) {}
        fn show_toast(&mut self, _message: &str, _parameters: &Map<String, Value>) {}
        fn open_url(&mut self, _url: &str) {}
    }

    #[test]
    fn parses_steps() {
        let steps: Vec<ScriptStep> = serde_json::from_value(json!([
            {"step": "tap", "component": "go"},
            {"step": "input", "component": "email", "value": "a@b.c"},
            {"step": "longPress", "component": "go"},
            {"step": "orientation", "orientation": "landscape"},
            {"step": "back"}
        ]))
        .expect("valid script");

        assert_eq!(steps[0], ScriptStep::Tap { component: "go".into() });
        assert_eq!(
            steps[3],
            ScriptStep::Orientation {
                orientation: Orientation::Landscape
            }
        );
        assert_eq!(steps[4], ScriptStep::Back);
    }

    #[test]
    fn runs_steps_and_counts_failures() {
        let app: AppDefinition = serde_json::from_value(json!({
            "screens": [
                {"id": "S1", "isHome": true, "components": [{
                    "id": "go",
                    "type": "button",
                    "events": {"onTap": [{"action": {"type": "navigate", "parameters": {"screenId": "S2"}}}]}
                }]},
                {"id": "S2"}
            ]
        }))
        .expect("valid app");
        let mut session = PreviewSession::new(app);

        let summary = run_script(
            &mut session,
            &mut Silent,
            &[
                ScriptStep::Tap { component: "go".into() },
                ScriptStep::Back,
                ScriptStep::Navigate { screen: "missing".into() },
                ScriptStep::Zoom { level: 5.0 },
                ScriptStep::Device { id: "ipad-mini".to_string() },
                ScriptStep::Rotate,
            ],
        );

        assert_eq!(
            summary,
            ScriptSummary {
                steps: 6,
                dispatched: 1,
                failed: 1,
            }
        );
        assert_eq!(session.current_screen_id().map(ScreenId::as_str), Some("S1"));
        assert_eq!(session.zoom(), 2.0);
        assert_eq!(session.viewport_size(), (1133, 744));
        assert_eq!(session.interactions().len(), 1);
    }
}
