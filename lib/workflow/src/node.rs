//! Workflow node type.
//!
//! Nodes are the building blocks of workflows. Each node has:
//! - A unique ID within the workflow
//! - A node type (a trigger or action kind from the catalog)
//! - A display name and optional description
//! - A canvas position
//! - Ordered input and output ports seeded from the type's template
//!
//! Identity, type and ports are fixed at creation. The position changes only
//! through [`WorkflowGraph::move_node`](crate::WorkflowGraph::move_node).

use crate::catalog::NodeType;
use crate::layout::Position;
use crate::port::{Port, PortDirection};
use appcanvas_core::NodeId;
use serde::{Deserialize, Serialize};

/// A workflow node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowNode {
    id: NodeId,
    #[serde(rename = "type")]
    node_type: NodeType,
    /// Human-readable name shown on the card.
    pub name: String,
    /// Optional longer description shown in the inspector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    position: Position,
    inputs: Vec<Port>,
    outputs: Vec<Port>,
}

impl WorkflowNode {
    /// Creates a node named after its catalog entry.
    #[must_use]
    pub fn new(id: NodeId, node_type: NodeType, position: Position) -> Self {
        let (inputs, outputs) = node_type.port_template();
        Self {
            id,
            node_type,
            name: node_type.entry().name.to_string(),
            description: None,
            position,
            inputs,
            outputs,
        }
    }

    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    #[must_use]
    pub fn inputs(&self) -> &[Port] {
        &self.inputs
    }

    #[must_use]
    pub fn outputs(&self) -> &[Port] {
        &self.outputs
    }

    /// Returns the ports on one side of the node.
    #[must_use]
    pub fn ports(&self, direction: PortDirection) -> &[Port] {
        match direction {
            PortDirection::Input => &self.inputs,
            PortDirection::Output => &self.outputs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ActionKind, TriggerKind};

    #[test]
    fn node_takes_name_from_catalog() {
        let node = WorkflowNode::new(
            NodeId::new(),
            NodeType::Action(ActionKind::ShowToast),
            Position::new(10.0, 20.0),
        );
        assert_eq!(node.name, "Show Toast");
        assert_eq!(node.position(), Position::new(10.0, 20.0));
        assert!(node.description.is_none());
    }

    #[test]
    fn ports_by_direction() {
        let node = WorkflowNode::new(
            NodeId::new(),
            NodeType::Action(ActionKind::HttpRequest),
            Position::default(),
        );
        assert_eq!(node.ports(PortDirection::Input).len(), 1);
        assert_eq!(node.ports(PortDirection::Output)[1].name, "error");
    }

    #[test]
    fn node_serializes_type_key() {
        let node = WorkflowNode::new(
            NodeId::new(),
            NodeType::Trigger(TriggerKind::FormSubmitted),
            Position::default(),
        );
        let json = serde_json::to_value(&node).expect("serialize");
        assert_eq!(json["type"], "form_submitted");
        assert!(json.get("description").is_none());

        let parsed: WorkflowNode = serde_json::from_value(json).expect("deserialize");
        assert_eq!(parsed, node);
    }
}
