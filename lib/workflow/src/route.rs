//! Connection routing.
//!
//! Each connection is drawn as a cubic Bézier from the source node's output
//! anchor to the target node's input anchor. Routing is a rendering concern:
//! connections whose endpoints coincide are skipped here, never removed from
//! the graph.

use crate::graph::{WorkflowConnection, WorkflowGraph};
use crate::layout::{self, Position};
use crate::node::WorkflowNode;
use appcanvas_core::ConnectionId;

/// Connections shorter than this are not drawn.
pub const MIN_CONNECTION_LENGTH: f64 = 1.0;

/// Lower bound for the horizontal control-point offset.
pub const MIN_CONTROL_OFFSET: f64 = 50.0;

/// A connection ready to be drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionRoute {
    pub connection: ConnectionId,
    pub from: Position,
    pub to: Position,
}

impl ConnectionRoute {
    /// Horizontal distance of both control points from their endpoints.
    #[must_use]
    pub fn control_offset(&self) -> f64 {
        ((self.to.x - self.from.x).abs() / 2.0).max(MIN_CONTROL_OFFSET)
    }

    /// Returns the route as an SVG path.
    #[must_use]
    pub fn svg_path(&self) -> String {
        let offset = self.control_offset();
        format!(
            "M {} {} C {} {} {} {} {} {}",
            self.from.x,
            self.from.y,
            self.from.x + offset,
            self.from.y,
            self.to.x - offset,
            self.to.y,
            self.to.x,
            self.to.y
        )
    }
}

/// Routes one connection, drawing each node where `origin_of` places it.
///
/// Returns `None` for degenerate connections or missing endpoints.
pub fn route_connection<F>(
    graph: &WorkflowGraph,
    connection: &WorkflowConnection,
    origin_of: F,
) -> Option<ConnectionRoute>
where
    F: Fn(&WorkflowNode) -> Position,
{
    let source = graph.node(connection.source)?;
    let target = graph.node(connection.target)?;
    let from = layout::output_anchor(origin_of(source), connection.source_port);
    let to = layout::input_anchor(origin_of(target), connection.target_port);

    if from.distance_to(to) < MIN_CONNECTION_LENGTH {
        return None;
    }

    Some(ConnectionRoute {
        connection: connection.id,
        from,
        to,
    })
}

/// Routes every drawable connection in the graph.
pub fn route_all<F>(graph: &WorkflowGraph, origin_of: F) -> Vec<ConnectionRoute>
where
    F: Fn(&WorkflowNode) -> Position,
{
    graph
        .connections()
        .filter_map(|connection| route_connection(graph, connection, &origin_of))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ActionKind, NodeType, TriggerKind};
    use crate::layout::NODE_WIDTH;

    #[test]
    fn route_runs_from_output_to_input_anchor() {
        let mut graph = WorkflowGraph::new();
        let trigger = graph.insert_node(
            NodeType::Trigger(TriggerKind::ButtonTapped),
            Position::new(0.0, 0.0),
        );
        let action = graph.insert_node(
            NodeType::Action(ActionKind::Navigate),
            Position::new(400.0, 100.0),
        );
        graph.connect(trigger, 0, action, 0).unwrap();

        let routes = route_all(&graph, WorkflowNode::position);
        assert_eq!(routes.len(), 1);
        let route = routes[0];
        assert_eq!(route.from, layout::output_anchor(Position::new(0.0, 0.0), 0));
        assert_eq!(route.to, layout::input_anchor(Position::new(400.0, 100.0), 0));
        assert_eq!(route.control_offset(), (400.0 - NODE_WIDTH) / 2.0);
        assert!(route.svg_path().starts_with(&format!("M {} ", NODE_WIDTH)));
    }

    #[test]
    fn close_nodes_use_minimum_control_offset() {
        let route = ConnectionRoute {
            connection: ConnectionId::new(),
            from: Position::new(0.0, 0.0),
            to: Position::new(20.0, 80.0),
        };
        assert_eq!(route.control_offset(), MIN_CONTROL_OFFSET);
        assert_eq!(route.svg_path(), "M 0 0 C 50 0 -30 80 20 80");
    }

    #[test]
    fn degenerate_connection_is_skipped() {
        let mut graph = WorkflowGraph::new();
        let left = graph.insert_node(NodeType::Action(ActionKind::Delay), Position::new(0.0, 0.0));
        // Input anchor of `right` lands exactly on the output anchor of `left`.
        let right = graph.insert_node(
            NodeType::Action(ActionKind::Delay),
            Position::new(NODE_WIDTH, 0.0),
        );
        graph.connect(left, 0, right, 0).unwrap();

        assert!(route_all(&graph, WorkflowNode::position).is_empty());
        assert_eq!(graph.connection_count(), 1);
    }
}
