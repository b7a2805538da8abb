//! Interaction export and replay.
//!
//! An export is the downloadable trace of a preview session:
//!
//! ```json
//! {"interactions": [...], "device": "iphone-14-pro", "orientation": "portrait",
//!  "totalInteractions": 3, "duration": 1200, "exportedAt": "..."}
//! ```
//!
//! `duration` is milliseconds from the first to the last interaction.

use crate::app::AppDefinition;
use crate::device::Orientation;
use crate::dispatch::{Presenter, UiEvent, dispatch};
use crate::error::PreviewError;
use crate::session::{InteractionEvent, PreviewSession};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Serializable snapshot of an interaction log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionExport {
    pub interactions: Vec<InteractionEvent>,
    /// Id of the simulated device.
    pub device: String,
    pub orientation: Orientation,
    pub total_interactions: usize,
    /// Milliseconds between the first and last interaction.
    pub duration: i64,
    pub exported_at: DateTime<Utc>,
}

/// Runs a recorded trace against an app in a fresh session.
///
/// The session is opened on the exported device and orientation. Each
/// interaction whose metadata names a UI event and a component is
/// dispatched again; when the recorded screen differs from the one shown,
/// the session navigates there first. Entries that cannot be replayed are
/// logged and skipped.
///
/// # Errors
///
/// Returns `DeviceNotFound` if the exported device is not built in.
pub fn replay(
    export: &InteractionExport,
    app: impl Into<Arc<AppDefinition>>,
    presenter: &mut dyn Presenter,
) -> Result<PreviewSession, PreviewError> {
    let mut session = PreviewSession::new(app);
    session.set_device(&export.device)?;
    session.set_orientation(export.orientation);

    let mut replayed = 0usize;
    for recorded in &export.interactions {
        let event = recorded.payload.as_ref().and_then(UiEvent::from_payload);
        let (Some(event), Some(component_id)) = (event, recorded.component_id.as_ref()) else {
            warn!(interaction_id = %recorded.id, kind = %recorded.kind, "interaction not replayable");
            continue;
        };

        if let Some(screen_id) = &recorded.screen_id {
            if session.current_screen_id() != Some(screen_id) {
                if let Err(err) = session.navigate_to_screen(screen_id) {
                    warn!(interaction_id = %recorded.id, error = %err, "cannot reach recorded screen");
                    continue;
                }
            }
        }

        dispatch(&mut session, presenter, component_id, &event);
        replayed += 1;
    }

    info!(
        replayed,
        total = export.interactions.len(),
        device = %export.device,
        "replay finished"
    );
    Ok(session)
}
