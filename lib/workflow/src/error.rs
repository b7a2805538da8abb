//! Error types for the workflow crate.
//!
//! - `GraphError`: graph mutations (unknown node types, nodes, ports)
//! - `CanvasError`: canvas gestures, wrapping graph errors they trigger
//!
//! Both are surfaced synchronously so the editor can reject the gesture.

use crate::port::PortDirection;
use appcanvas_core::NodeId;
use std::fmt;

/// Errors from graph operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The node type key is not in the catalog.
    InvalidNodeType { node_type: String },
    /// Node with the given ID was not found in the graph.
    NodeNotFound { node_id: NodeId },
    /// Port index is out of range for the node's port list.
    InvalidPort {
        node_id: NodeId,
        direction: PortDirection,
        index: usize,
        available: usize,
    },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidNodeType { node_type } => {
                write!(f, "unknown node type: {node_type}")
            }
            Self::NodeNotFound { node_id } => {
                write!(f, "node not found: {node_id}")
            }
            Self::InvalidPort {
                node_id,
                direction,
                index,
                available,
            } => {
                write!(
                    f,
                    "{direction} port {index} out of range on node {node_id} ({available} available)"
                )
            }
        }
    }
}

impl std::error::Error for GraphError {}

/// Errors from canvas gestures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanvasError {
    /// A connection was completed without one being started.
    NoPendingConnection,
    /// The graph rejected the gesture.
    Graph(GraphError),
}

impl fmt::Display for CanvasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoPendingConnection => write!(f, "no connection is being drawn"),
            Self::Graph(err) => write!(f, "graph rejected gesture: {err}"),
        }
    }
}

impl std::error::Error for CanvasError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NoPendingConnection => None,
            Self::Graph(err) => Some(err),
        }
    }
}

impl From<GraphError> for CanvasError {
    fn from(err: GraphError) -> Self {
        Self::Graph(err)
    }
}
