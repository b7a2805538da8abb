//! One headless studio run.
//!
//! Loads the app definition, opens a preview session, plays the interaction
//! script through it and writes the export. When collaboration is
//! configured, progress is broadcast to the room.

use crate::api::ApiClient;
use crate::config::{AppSource, CollabConfig, StudioConfig, TransportKind};
use crate::error::StudioError;
use crate::presenter::LoggingPresenter;
use crate::script::{ScriptStep, ScriptSummary, run_script};
use appcanvas_collab::{CollabChannel, NatsConfig, NatsTransport, Transport, WebSocketTransport};
use appcanvas_core::Result;
use appcanvas_preview::{AppDefinition, InteractionExport, PreviewSession};
use appcanvas_workflow::{Workflow, WorkflowNode, route};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// What a run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub script: Option<ScriptSummary>,
    pub workflow: Option<WorkflowSummary>,
    pub total_interactions: usize,
    pub output_path: PathBuf,
}

/// Shape of a loaded workflow document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowSummary {
    pub nodes: usize,
    pub connections: usize,
    /// Connections long enough to be drawn.
    pub routes: usize,
    pub has_trigger: bool,
}

impl WorkflowSummary {
    #[must_use]
    pub fn of(workflow: &Workflow) -> Self {
        Self {
            nodes: workflow.graph.node_count(),
            connections: workflow.graph.connection_count(),
            routes: route::route_all(&workflow.graph, WorkflowNode::position).len(),
            has_trigger: workflow.has_trigger(),
        }
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path, what: &'static str) -> Result<T, StudioError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| StudioError::Io {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;
    let value = serde_json::from_slice(&bytes).map_err(|e| StudioError::Parse {
        what,
        details: format!("{}: {e}", path.display()),
    })?;
    Ok(value)
}

async fn load_app(source: AppSource) -> Result<AppDefinition, StudioError> {
    match source {
        AppSource::File(path) => read_json(&path, "app definition").await,
        AppSource::Api(api) => ApiClient::new(&api)?.fetch_app_definition(&api.app_id).await,
    }
}

fn open_collab(config: &CollabConfig) -> CollabChannel {
    let transport: Arc<dyn Transport> = match config.transport {
        TransportKind::Websocket => Arc::new(WebSocketTransport::new(config.url.clone())),
        TransportKind::Nats => Arc::new(NatsTransport::new(NatsConfig::new(
            config.url.clone(),
            config.room.clone(),
        ))),
    };
    info!(url = %config.url, room = %config.room, transport = ?config.transport, "opening collaboration channel");
    CollabChannel::open(transport, config.reconnect_policy())
}

fn announce(channel: Option<&CollabChannel>, event: &str, data: serde_json::Value) {
    if let Some(channel) = channel {
        if let Err(e) = channel.broadcast(event, data) {
            warn!(event, error = %e, "broadcast failed");
        }
    }
}

async fn write_export(path: &Path, export: &InteractionExport) -> Result<(), StudioError> {
    let bytes = serde_json::to_vec_pretty(export).map_err(|e| StudioError::Parse {
        what: "interaction export",
        details: e.to_string(),
    })?;
    tokio::fs::write(path, bytes).await.map_err(|e| StudioError::Io {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;
    Ok(())
}

/// Runs the studio once.
///
/// # Errors
///
/// Returns an error if configuration is incomplete, an input cannot be
/// loaded, or the export cannot be written. Failing script steps are
/// logged, not returned.
#[instrument(skip_all)]
pub async fn run(config: StudioConfig) -> Result<RunSummary, StudioError> {
    let source = config.app_source().map_err(|e| StudioError::Config {
        details: e.to_string(),
    })?;
    let app = load_app(source).await?;
    info!(screens = app.screens.len(), "app definition loaded");

    let workflow = match &config.workflow_path {
        Some(path) => {
            let workflow: Workflow = read_json(path, "workflow").await?;
            let summary = WorkflowSummary::of(&workflow);
            info!(
                name = workflow.name(),
                nodes = summary.nodes,
                connections = summary.connections,
                "workflow loaded"
            );
            if !summary.has_trigger {
                warn!(name = workflow.name(), "workflow has no trigger and will never run");
            }
            Some(summary)
        }
        None => None,
    };

    let mut session = PreviewSession::new(app);
    if let Some(device_id) = &config.device_id {
        session.set_device(device_id).map_err(|e| StudioError::Preview {
            details: e.to_string(),
        })?;
    }

    let channel = config.collab.as_ref().map(open_collab);
    announce(
        channel.as_ref(),
        "preview:started",
        json!({ "device": session.device().id }),
    );

    let mut presenter = LoggingPresenter::default();
    let script = match &config.script_path {
        Some(path) => {
            let steps: Vec<ScriptStep> = read_json(path, "interaction script").await?;
            let summary = run_script(&mut session, &mut presenter, &steps);
            info!(
                steps = summary.steps,
                dispatched = summary.dispatched,
                failed = summary.failed,
                effects = presenter.effects,
                "script finished"
            );
            Some(summary)
        }
        None => None,
    };

    let export = session.export_interactions();
    write_export(&config.output_path, &export).await?;
    info!(
        path = %config.output_path.display(),
        interactions = export.total_interactions,
        duration_ms = export.duration,
        "export written"
    );

    announce(
        channel.as_ref(),
        "preview:exported",
        json!({
            "totalInteractions": export.total_interactions,
            "duration": export.duration,
        }),
    );
    if let Some(channel) = channel {
        info!(status = %channel.status(), "closing collaboration channel");
        channel.close().await;
    }

    Ok(RunSummary {
        script,
        workflow,
        total_interactions: export.total_interactions,
        output_path: config.output_path,
    })
}
