//! Canvas interaction engine.
//!
//! A [`CanvasSession`] owns all transient editing state for one canvas:
//! which node is selected, the drag in progress and the connection being
//! drawn. Keeping it in one place makes selection exclusive by
//! construction.
//!
//! ```text
//! Idle ──down on node──▶ Dragging ──up──▶ Selected
//!  ▲                        ▲               │
//!  └──down on background────┼───────────────┤
//!                           └─down on node──┘
//! ```
//!
//! While dragging, the node is drawn at its live position; the graph is
//! only updated when the pointer is released.

use crate::error::{CanvasError, GraphError};
use crate::graph::WorkflowGraph;
use crate::layout::{self, Position};
use crate::node::WorkflowNode;
use crate::route::{self, ConnectionRoute};
use appcanvas_core::{ConnectionId, NodeId};
use tracing::{debug, warn};

/// Interaction state of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CanvasState {
    #[default]
    Idle,
    Selected {
        node: NodeId,
    },
    Dragging {
        node: NodeId,
        /// Pointer position minus node position at drag start.
        offset: Position,
        /// Where the node is drawn right now.
        live: Position,
    },
}

/// How one node should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeInteraction {
    Idle,
    Selected,
    Dragging,
}

/// A connection started from an output port, waiting for its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingConnection {
    pub source: NodeId,
    pub source_port: usize,
}

/// Transient editing state for one canvas.
#[derive(Debug, Clone, Default)]
pub struct CanvasSession {
    state: CanvasState,
    pending: Option<PendingConnection>,
}

impl CanvasSession {
    /// Creates an idle session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> CanvasState {
        self.state
    }

    /// The selected node, whether or not it is being dragged.
    #[must_use]
    pub fn selected(&self) -> Option<NodeId> {
        match self.state {
            CanvasState::Idle => None,
            CanvasState::Selected { node } | CanvasState::Dragging { node, .. } => Some(node),
        }
    }

    /// The node being dragged, if any.
    #[must_use]
    pub fn dragging(&self) -> Option<NodeId> {
        match self.state {
            CanvasState::Dragging { node, .. } => Some(node),
            _ => None,
        }
    }

    /// Returns true while pointer-move and pointer-up must be delivered.
    ///
    /// Hosts attach their move/up listeners when this turns true and detach
    /// them as soon as it turns false.
    #[must_use]
    pub fn is_capturing_pointer(&self) -> bool {
        self.dragging().is_some()
    }

    /// Returns how a node should be drawn.
    #[must_use]
    pub fn node_interaction(&self, node_id: NodeId) -> NodeInteraction {
        match self.state {
            CanvasState::Dragging { node, .. } if node == node_id => NodeInteraction::Dragging,
            CanvasState::Selected { node } if node == node_id => NodeInteraction::Selected,
            _ => NodeInteraction::Idle,
        }
    }

    /// Where a node is drawn: its live position while dragged, else its
    /// stored position.
    #[must_use]
    pub fn display_position(&self, node: &WorkflowNode) -> Position {
        match self.state {
            CanvasState::Dragging { node: id, live, .. } if id == node.id() => live,
            _ => node.position(),
        }
    }

    /// Node ids in paint order, bottom first.
    ///
    /// Idle nodes keep insertion order; the selected node paints above them
    /// and the dragged node above everything.
    #[must_use]
    pub fn render_order(&self, graph: &WorkflowGraph) -> Vec<NodeId> {
        let mut order = graph.node_ids().to_vec();
        // Stable sort keeps insertion order within a layer.
        order.sort_by_key(|id| match self.node_interaction(*id) {
            NodeInteraction::Idle => 0,
            NodeInteraction::Selected => 1,
            NodeInteraction::Dragging => 2,
        });
        order
    }

    /// Returns the topmost node under the pointer.
    #[must_use]
    pub fn hit_test(&self, graph: &WorkflowGraph, pointer: Position) -> Option<NodeId> {
        self.render_order(graph).into_iter().rev().find(|id| {
            graph.node(*id).is_some_and(|node| {
                layout::node_bounds(node, self.display_position(node)).contains(pointer)
            })
        })
    }

    /// Handles pointer-down at a canvas position.
    ///
    /// Pressing a node selects it and starts dragging; pressing empty canvas
    /// clears the selection. Returns the pressed node.
    pub fn pointer_down(&mut self, graph: &WorkflowGraph, pointer: Position) -> Option<NodeId> {
        match self.hit_test(graph, pointer) {
            Some(node_id) => {
                // Hit-tested ids always exist.
                if let Err(err) = self.press_node(graph, node_id, pointer) {
                    warn!(%node_id, error = %err, "hit-tested node missing");
                    return None;
                }
                Some(node_id)
            }
            None => {
                self.press_background();
                None
            }
        }
    }

    /// Starts dragging a node the host has already hit-tested.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if the node does not exist.
    pub fn press_node(
        &mut self,
        graph: &WorkflowGraph,
        node_id: NodeId,
        pointer: Position,
    ) -> Result<(), GraphError> {
        let node = graph
            .node(node_id)
            .ok_or(GraphError::NodeNotFound { node_id })?;
        let position = node.position();
        self.state = CanvasState::Dragging {
            node: node_id,
            offset: pointer - position,
            live: position,
        };
        debug!(%node_id, "drag started");
        Ok(())
    }

    /// Clears the selection.
    pub fn press_background(&mut self) {
        if self.state != CanvasState::Idle {
            debug!("selection cleared");
        }
        self.state = CanvasState::Idle;
    }

    /// Handles pointer-move. Returns the dragged node's live position, or
    /// `None` when no drag is active.
    pub fn pointer_move(&mut self, pointer: Position) -> Option<Position> {
        match &mut self.state {
            CanvasState::Dragging { offset, live, .. } => {
                *live = pointer - *offset;
                Some(*live)
            }
            _ => None,
        }
    }

    /// Handles pointer-up, committing the drag into the graph.
    ///
    /// Returns the node that was dropped, or `None` when no drag was active.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if the dragged node vanished mid-drag; the
    /// session then returns to idle.
    pub fn pointer_up(&mut self, graph: &mut WorkflowGraph) -> Result<Option<NodeId>, GraphError> {
        let CanvasState::Dragging { node, live, .. } = self.state else {
            return Ok(None);
        };

        if let Err(err) = graph.move_node(node, live) {
            self.state = CanvasState::Idle;
            return Err(err);
        }

        self.state = CanvasState::Selected { node };
        debug!(node_id = %node, x = live.x, y = live.y, "drag committed");
        Ok(Some(node))
    }

    /// Deletes a node through the canvas so selection and pending
    /// connections never point at a missing node.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if the node does not exist.
    pub fn delete_node(
        &mut self,
        graph: &mut WorkflowGraph,
        node_id: NodeId,
    ) -> Result<WorkflowNode, GraphError> {
        let node = graph.delete_node(node_id)?;
        if self.selected() == Some(node_id) {
            self.state = CanvasState::Idle;
        }
        if self.pending.is_some_and(|p| p.source == node_id) {
            self.pending = None;
        }
        Ok(node)
    }

    /// Deletes the selected node, if any.
    ///
    /// # Errors
    ///
    /// Propagates graph errors from the delete.
    pub fn delete_selected(
        &mut self,
        graph: &mut WorkflowGraph,
    ) -> Result<Option<WorkflowNode>, GraphError> {
        match self.selected() {
            Some(node_id) => self.delete_node(graph, node_id).map(Some),
            None => Ok(None),
        }
    }

    /// Starts drawing a connection from an output port.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` or `InvalidPort` if the port does not exist.
    pub fn begin_connection(
        &mut self,
        graph: &WorkflowGraph,
        source: NodeId,
        source_port: usize,
    ) -> Result<(), GraphError> {
        let node = graph
            .node(source)
            .ok_or(GraphError::NodeNotFound { node_id: source })?;
        let available = node.outputs().len();
        if source_port >= available {
            return Err(GraphError::InvalidPort {
                node_id: source,
                direction: crate::port::PortDirection::Output,
                index: source_port,
                available,
            });
        }
        self.pending = Some(PendingConnection {
            source,
            source_port,
        });
        Ok(())
    }

    /// Finishes the pending connection on an input port.
    ///
    /// The pending connection is consumed whether or not the graph accepts
    /// it.
    ///
    /// # Errors
    ///
    /// Returns `NoPendingConnection` if none was started, or the graph's
    /// rejection.
    pub fn complete_connection(
        &mut self,
        graph: &mut WorkflowGraph,
        target: NodeId,
        target_port: usize,
    ) -> Result<ConnectionId, CanvasError> {
        let pending = self.pending.take().ok_or(CanvasError::NoPendingConnection)?;
        let id = graph.connect(pending.source, pending.source_port, target, target_port)?;
        Ok(id)
    }

    /// Abandons the pending connection.
    pub fn cancel_connection(&mut self) {
        self.pending = None;
    }

    #[must_use]
    pub fn pending_connection(&self) -> Option<PendingConnection> {
        self.pending
    }

    /// Routes every connection using display positions, so lines follow a
    /// node while it is dragged.
    #[must_use]
    pub fn routes(&self, graph: &WorkflowGraph) -> Vec<ConnectionRoute> {
        route::route_all(graph, |node| self.display_position(node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ActionKind, NodeType, TriggerKind};

    fn two_nodes() -> (WorkflowGraph, NodeId, NodeId) {
        let mut graph = WorkflowGraph::new();
        let a = graph.insert_node(
            NodeType::Trigger(TriggerKind::ButtonTapped),
            Position::new(0.0, 0.0),
        );
        let b = graph.insert_node(
            NodeType::Action(ActionKind::Navigate),
            Position::new(300.0, 0.0),
        );
        (graph, a, b)
    }

    #[test]
    fn press_drag_release_commits_position() {
        let (mut graph, a, _) = two_nodes();
        let mut canvas = CanvasSession::new();

        assert_eq!(canvas.pointer_down(&graph, Position::new(10.0, 10.0)), Some(a));
        assert!(canvas.is_capturing_pointer());

        let live = canvas.pointer_move(Position::new(110.0, 60.0));
        assert_eq!(live, Some(Position::new(100.0, 50.0)));
        // Not committed yet.
        assert_eq!(graph.node(a).unwrap().position(), Position::new(0.0, 0.0));
        assert_eq!(
            canvas.display_position(graph.node(a).unwrap()),
            Position::new(100.0, 50.0)
        );

        assert_eq!(canvas.pointer_up(&mut graph), Ok(Some(a)));
        assert_eq!(graph.node(a).unwrap().position(), Position::new(100.0, 50.0));
        assert_eq!(canvas.state(), CanvasState::Selected { node: a });
        assert!(!canvas.is_capturing_pointer());
    }

    #[test]
    fn move_and_up_without_drag_do_nothing() {
        let (mut graph, a, _) = two_nodes();
        let mut canvas = CanvasSession::new();

        assert_eq!(canvas.pointer_move(Position::new(5.0, 5.0)), None);
        assert_eq!(canvas.pointer_up(&mut graph), Ok(None));
        assert_eq!(graph.node(a).unwrap().position(), Position::new(0.0, 0.0));
        assert_eq!(canvas.state(), CanvasState::Idle);
    }

    #[test]
    fn selection_is_exclusive() {
        let (mut graph, a, b) = two_nodes();
        let mut canvas = CanvasSession::new();

        canvas.pointer_down(&graph, Position::new(10.0, 10.0));
        canvas.pointer_up(&mut graph).unwrap();
        assert_eq!(canvas.selected(), Some(a));

        canvas.pointer_down(&graph, Position::new(310.0, 10.0));
        assert_eq!(canvas.selected(), Some(b));
        assert_eq!(canvas.node_interaction(a), NodeInteraction::Idle);
        assert_eq!(canvas.node_interaction(b), NodeInteraction::Dragging);
    }

    #[test]
    fn pressing_background_deselects() {
        let (mut graph, _, _) = two_nodes();
        let mut canvas = CanvasSession::new();

        canvas.pointer_down(&graph, Position::new(10.0, 10.0));
        canvas.pointer_up(&mut graph).unwrap();
        assert_eq!(canvas.pointer_down(&graph, Position::new(1000.0, 1000.0)), None);
        assert_eq!(canvas.state(), CanvasState::Idle);
    }

    #[test]
    fn deleting_selected_node_clears_selection() {
        let (mut graph, a, b) = two_nodes();
        graph.connect(a, 0, b, 0).unwrap();
        let mut canvas = CanvasSession::new();

        canvas.press_node(&graph, b, Position::new(300.0, 0.0)).unwrap();
        canvas.pointer_up(&mut graph).unwrap();
        let deleted = canvas.delete_selected(&mut graph).unwrap();

        assert_eq!(deleted.map(|n| n.id()), Some(b));
        assert_eq!(canvas.selected(), None);
        assert_eq!(graph.connection_count(), 0);
    }

    #[test]
    fn node_deleted_mid_drag_fails_release() {
        let (mut graph, a, _) = two_nodes();
        let mut canvas = CanvasSession::new();

        canvas.pointer_down(&graph, Position::new(10.0, 10.0));
        graph.delete_node(a).unwrap();

        assert_eq!(
            canvas.pointer_up(&mut graph),
            Err(GraphError::NodeNotFound { node_id: a })
        );
        assert_eq!(canvas.state(), CanvasState::Idle);
    }

    #[test]
    fn render_order_floats_selected_and_dragged() {
        let mut graph = WorkflowGraph::new();
        let ids: Vec<_> = (0..3)
            .map(|i| {
                graph.insert_node(
                    NodeType::Action(ActionKind::Delay),
                    Position::new(f64::from(i) * 200.0, 0.0),
                )
            })
            .collect();
        let mut canvas = CanvasSession::new();

        canvas.press_node(&graph, ids[0], Position::new(0.0, 0.0)).unwrap();
        assert_eq!(canvas.render_order(&graph), [ids[1], ids[2], ids[0]]);

        canvas.pointer_up(&mut graph).unwrap();
        assert_eq!(canvas.render_order(&graph), [ids[1], ids[2], ids[0]]);

        canvas.press_background();
        assert_eq!(canvas.render_order(&graph), ids);
    }

    #[test]
    fn hit_test_prefers_topmost_node() {
        let mut graph = WorkflowGraph::new();
        let bottom = graph.insert_node(NodeType::Action(ActionKind::Delay), Position::new(0.0, 0.0));
        let top = graph.insert_node(NodeType::Action(ActionKind::Delay), Position::new(20.0, 20.0));
        let mut canvas = CanvasSession::new();

        assert_eq!(canvas.hit_test(&graph, Position::new(30.0, 30.0)), Some(top));

        canvas.press_node(&graph, bottom, Position::new(5.0, 5.0)).unwrap();
        assert_eq!(canvas.hit_test(&graph, Position::new(30.0, 30.0)), Some(bottom));
    }

    #[test]
    fn connection_drawing() {
        let (mut graph, a, b) = two_nodes();
        let mut canvas = CanvasSession::new();

        assert_eq!(
            canvas.complete_connection(&mut graph, b, 0),
            Err(CanvasError::NoPendingConnection)
        );

        canvas.begin_connection(&graph, a, 0).unwrap();
        let id = canvas.complete_connection(&mut graph, b, 0).unwrap();
        assert_eq!(graph.connection(id).map(|c| (c.source, c.target)), Some((a, b)));
        assert!(canvas.pending_connection().is_none());
    }

    #[test]
    fn rejected_connection_is_surfaced() {
        let (mut graph, a, b) = two_nodes();
        let mut canvas = CanvasSession::new();

        assert!(canvas.begin_connection(&graph, a, 4).is_err());

        canvas.begin_connection(&graph, b, 0).unwrap();
        // Triggers have no inputs.
        let err = canvas.complete_connection(&mut graph, a, 0).unwrap_err();
        assert!(matches!(err, CanvasError::Graph(GraphError::InvalidPort { .. })));
        assert_eq!(graph.connection_count(), 0);
    }

    #[test]
    fn deleting_source_drops_pending_connection() {
        let (mut graph, a, _) = two_nodes();
        let mut canvas = CanvasSession::new();

        canvas.begin_connection(&graph, a, 0).unwrap();
        canvas.delete_node(&mut graph, a).unwrap();
        assert!(canvas.pending_connection().is_none());
    }

    #[test]
    fn routes_follow_dragged_node() {
        let (mut graph, a, b) = two_nodes();
        graph.connect(a, 0, b, 0).unwrap();
        let mut canvas = CanvasSession::new();

        canvas.press_node(&graph, b, Position::new(300.0, 0.0)).unwrap();
        canvas.pointer_move(Position::new(300.0, 200.0));

        let routes = canvas.routes(&graph);
        assert_eq!(routes[0].to, layout::input_anchor(Position::new(300.0, 200.0), 0));
    }
}
