//! Workflow graph implementation using petgraph.
//!
//! Workflows are directed graphs where:
//! - Nodes are triggers and actions with ordered ports
//! - Connections join an output port of one node to an input port of another
//!
//! A stable graph keeps node and edge indices valid across deletions, so the
//! id-to-index maps never need rebuilding after a node is removed.
//!
//! Node insertion order is tracked separately; it is the base z-order the
//! canvas renders in.

use crate::catalog::NodeType;
use crate::error::GraphError;
use crate::layout::Position;
use crate::node::WorkflowNode;
use crate::port::PortDirection;
use appcanvas_core::{ConnectionId, NodeId};
use petgraph::Direction;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// A directed connection from an output port to an input port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowConnection {
    pub id: ConnectionId,
    pub source: NodeId,
    /// Index into the source node's outputs.
    pub source_port: usize,
    pub target: NodeId,
    /// Index into the target node's inputs.
    pub target_port: usize,
}

impl WorkflowConnection {
    /// Returns true if the connection starts or ends at `node_id`.
    #[must_use]
    pub fn touches(&self, node_id: NodeId) -> bool {
        self.source == node_id || self.target == node_id
    }

    fn same_ports(&self, other: &Self) -> bool {
        self.source == other.source
            && self.source_port == other.source_port
            && self.target == other.target
            && self.target_port == other.target_port
    }
}

/// A workflow graph using petgraph's stable directed graph.
#[derive(Debug, Clone, Default)]
pub struct WorkflowGraph {
    graph: StableDiGraph<WorkflowNode, WorkflowConnection>,
    node_index_map: HashMap<NodeId, NodeIndex>,
    edge_index_map: HashMap<ConnectionId, EdgeIndex>,
    order: Vec<NodeId>,
}

impl WorkflowGraph {
    /// Creates a new empty workflow graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node of the given catalog type.
    ///
    /// # Errors
    ///
    /// Returns `InvalidNodeType` if `node_type` is not a catalog key.
    pub fn add_node(&mut self, node_type: &str, position: Position) -> Result<NodeId, GraphError> {
        let node_type: NodeType = node_type.parse()?;
        Ok(self.insert_node(node_type, position))
    }

    /// Adds a node of a known type.
    pub fn insert_node(&mut self, node_type: NodeType, position: Position) -> NodeId {
        self.insert(WorkflowNode::new(NodeId::new(), node_type, position))
    }

    fn insert(&mut self, node: WorkflowNode) -> NodeId {
        let node_id = node.id();
        debug!(%node_id, node_type = %node.node_type(), "adding node");
        let index = self.graph.add_node(node);
        self.node_index_map.insert(node_id, index);
        self.order.push(node_id);
        node_id
    }

    /// Moves a node to a new position.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if the node does not exist. Unknown ids are
    /// always an error, never a silent no-op.
    pub fn move_node(&mut self, node_id: NodeId, position: Position) -> Result<(), GraphError> {
        let node = self
            .node_mut(node_id)
            .ok_or(GraphError::NodeNotFound { node_id })?;
        node.set_position(position);
        Ok(())
    }

    /// Removes a node and every connection that starts or ends at it.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if the node does not exist.
    pub fn delete_node(&mut self, node_id: NodeId) -> Result<WorkflowNode, GraphError> {
        let index = self
            .node_index_map
            .remove(&node_id)
            .ok_or(GraphError::NodeNotFound { node_id })?;

        let incident: Vec<ConnectionId> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .chain(self.graph.edges_directed(index, Direction::Incoming))
            .map(|edge| edge.weight().id)
            .collect();
        for connection_id in &incident {
            self.edge_index_map.remove(connection_id);
        }

        self.order.retain(|id| *id != node_id);
        let node = self
            .graph
            .remove_node(index)
            .ok_or(GraphError::NodeNotFound { node_id })?;

        debug!(%node_id, pruned = incident.len(), "deleted node");
        Ok(node)
    }

    /// Connects an output port to an input port.
    ///
    /// Self-loops are allowed. Connecting the same pair of ports twice
    /// returns the id of the existing connection.
    ///
    /// # Errors
    ///
    /// Returns `NodeNotFound` if either node is absent, or `InvalidPort` if
    /// a port index is out of range.
    pub fn connect(
        &mut self,
        source: NodeId,
        source_port: usize,
        target: NodeId,
        target_port: usize,
    ) -> Result<ConnectionId, GraphError> {
        let source_index = *self
            .node_index_map
            .get(&source)
            .ok_or(GraphError::NodeNotFound { node_id: source })?;
        let target_index = *self
            .node_index_map
            .get(&target)
            .ok_or(GraphError::NodeNotFound { node_id: target })?;

        check_port(&self.graph[source_index], PortDirection::Output, source_port)?;
        check_port(&self.graph[target_index], PortDirection::Input, target_port)?;

        let connection = WorkflowConnection {
            id: ConnectionId::new(),
            source,
            source_port,
            target,
            target_port,
        };

        if let Some(existing) = self
            .graph
            .edges_directed(source_index, Direction::Outgoing)
            .map(|edge| edge.weight())
            .find(|existing| existing.same_ports(&connection))
        {
            debug!(connection_id = %existing.id, "connection already exists");
            return Ok(existing.id);
        }

        let index = self.graph.add_edge(source_index, target_index, connection);
        self.edge_index_map.insert(connection.id, index);
        debug!(connection_id = %connection.id, %source, %target, "connected nodes");
        Ok(connection.id)
    }

    /// Removes a connection. Unknown ids are ignored.
    pub fn disconnect(&mut self, connection_id: ConnectionId) -> Option<WorkflowConnection> {
        let index = self.edge_index_map.remove(&connection_id)?;
        self.graph.remove_edge(index)
    }

    /// Returns a reference to a node by its ID.
    #[must_use]
    pub fn node(&self, node_id: NodeId) -> Option<&WorkflowNode> {
        let index = self.node_index_map.get(&node_id)?;
        self.graph.node_weight(*index)
    }

    /// Returns a mutable reference to a node by its ID.
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut WorkflowNode> {
        let index = self.node_index_map.get(&node_id)?;
        self.graph.node_weight_mut(*index)
    }

    /// Returns true if the node exists.
    #[must_use]
    pub fn contains_node(&self, node_id: NodeId) -> bool {
        self.node_index_map.contains_key(&node_id)
    }

    /// Returns a connection by its ID.
    #[must_use]
    pub fn connection(&self, connection_id: ConnectionId) -> Option<&WorkflowConnection> {
        let index = self.edge_index_map.get(&connection_id)?;
        self.graph.edge_weight(*index)
    }

    /// Returns all nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &WorkflowNode> {
        self.order.iter().filter_map(|id| self.node(*id))
    }

    /// Returns node ids in insertion order.
    #[must_use]
    pub fn node_ids(&self) -> &[NodeId] {
        &self.order
    }

    /// Returns all connections.
    pub fn connections(&self) -> impl Iterator<Item = &WorkflowConnection> {
        self.graph
            .edge_indices()
            .filter_map(|index| self.graph.edge_weight(index))
    }

    /// Returns every connection starting or ending at a node.
    #[must_use]
    pub fn connections_of(&self, node_id: NodeId) -> Vec<&WorkflowConnection> {
        self.connections().filter(|c| c.touches(node_id)).collect()
    }

    /// Returns the number of nodes in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of connections in the graph.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns connections whose source or target node is missing.
    ///
    /// Always empty for a graph built through this API.
    #[must_use]
    pub fn dangling_connections(&self) -> Vec<ConnectionId> {
        self.connections()
            .filter(|c| !self.contains_node(c.source) || !self.contains_node(c.target))
            .map(|c| c.id)
            .collect()
    }
}

fn check_port(node: &WorkflowNode, direction: PortDirection, index: usize) -> Result<(), GraphError> {
    let available = node.ports(direction).len();
    if index < available {
        Ok(())
    } else {
        Err(GraphError::InvalidPort {
            node_id: node.id(),
            direction,
            index,
            available,
        })
    }
}

/// Serialized shape of a graph: nodes in insertion order plus connections.
#[derive(Serialize, Deserialize)]
struct GraphDocument<N, C> {
    nodes: N,
    connections: C,
}

impl Serialize for WorkflowGraph {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        GraphDocument {
            nodes: self.nodes().collect::<Vec<_>>(),
            connections: self.connections().collect::<Vec<_>>(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for WorkflowGraph {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let document =
            GraphDocument::<Vec<WorkflowNode>, Vec<WorkflowConnection>>::deserialize(deserializer)?;

        let mut graph = Self::new();
        for node in document.nodes {
            if graph.contains_node(node.id()) {
                warn!(node_id = %node.id(), "dropping duplicate node on load");
                continue;
            }
            graph.insert(node);
        }

        // Reconnect through the checked path so stored graphs with dangling
        // or out-of-range connections load clean.
        for stored in document.connections {
            let source_index = graph.node_index_map.get(&stored.source).copied();
            let target_index = graph.node_index_map.get(&stored.target).copied();
            let (Some(source_index), Some(target_index)) = (source_index, target_index) else {
                warn!(connection_id = %stored.id, "dropping dangling connection on load");
                continue;
            };
            let valid = check_port(&graph.graph[source_index], PortDirection::Output, stored.source_port)
                .and(check_port(&graph.graph[target_index], PortDirection::Input, stored.target_port));
            if let Err(err) = valid {
                warn!(connection_id = %stored.id, error = %err, "dropping invalid connection on load");
                continue;
            }
            if graph.edge_index_map.contains_key(&stored.id) {
                warn!(connection_id = %stored.id, "dropping connection with duplicate id on load");
                continue;
            }
            let duplicate = graph
                .graph
                .edges_directed(source_index, Direction::Outgoing)
                .any(|edge| edge.weight().same_ports(&stored));
            if duplicate {
                warn!(connection_id = %stored.id, "dropping duplicate connection on load");
                continue;
            }
            let index = graph.graph.add_edge(source_index, target_index, stored);
            graph.edge_index_map.insert(stored.id, index);
        }

        Ok(graph)
    }
}
