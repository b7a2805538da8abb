//! Workflow document types.
//!
//! A workflow document is what the builder loads into the editor wholesale:
//! - Metadata (name, description, timestamps)
//! - The node graph with its connections

use crate::graph::WorkflowGraph;
use appcanvas_core::WorkflowId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowMetadata {
    /// Human-readable name for this workflow.
    pub name: String,
    /// Description of what this workflow does.
    pub description: Option<String>,
    /// When this workflow was created.
    pub created_at: DateTime<Utc>,
    /// When this workflow was last updated.
    pub updated_at: DateTime<Utc>,
}

impl WorkflowMetadata {
    /// Creates new metadata stamped with the current time.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            description: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A workflow loaded into the editor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: WorkflowId,
    pub metadata: WorkflowMetadata,
    pub graph: WorkflowGraph,
}

impl Workflow {
    /// Creates a new, empty workflow.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: WorkflowId::new(),
            metadata: WorkflowMetadata::new(name),
            graph: WorkflowGraph::new(),
        }
    }

    /// Returns the workflow name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Returns true if the graph has at least one trigger to start from.
    #[must_use]
    pub fn has_trigger(&self) -> bool {
        self.graph.nodes().any(|node| node.node_type().is_trigger())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ActionKind, NodeType, TriggerKind};
    use crate::layout::Position;

    #[test]
    fn workflow_creation() {
        let workflow = Workflow::new("Welcome flow");
        assert_eq!(workflow.name(), "Welcome flow");
        assert_eq!(workflow.graph.node_count(), 0);
        assert!(!workflow.has_trigger());
    }

    #[test]
    fn has_trigger_needs_a_trigger_node() {
        let mut workflow = Workflow::new("Checkout");
        workflow
            .graph
            .insert_node(NodeType::Action(ActionKind::SendEmail), Position::default());
        assert!(!workflow.has_trigger());

        workflow
            .graph
            .insert_node(NodeType::Trigger(TriggerKind::FormSubmitted), Position::default());
        assert!(workflow.has_trigger());
    }

    #[test]
    fn workflow_serde_roundtrip() {
        let mut workflow = Workflow::new("Serialized");
        workflow.metadata.description = Some("round trip".to_string());
        let trigger = workflow
            .graph
            .insert_node(NodeType::Trigger(TriggerKind::AppOpened), Position::default());
        let toast = workflow
            .graph
            .insert_node(NodeType::Action(ActionKind::ShowToast), Position::new(200.0, 0.0));
        workflow.graph.connect(trigger, 0, toast, 0).unwrap();

        let json = serde_json::to_string(&workflow).expect("serialize");
        let parsed: Workflow = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(parsed.id, workflow.id);
        assert_eq!(parsed.metadata, workflow.metadata);
        assert_eq!(parsed.graph.connection_count(), 1);
    }
}
