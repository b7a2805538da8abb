//! Visual workflow engine for appcanvas.
//!
//! This crate provides everything the workflow editor needs below the
//! presentation layer:
//!
//! - **Catalog**: the closed set of trigger and action kinds with palette metadata
//! - **Graph Model**: nodes with ordered ports and directed port-to-port connections
//! - **Layout & Routing**: port anchors, node bounds and connection paths
//! - **Canvas**: pointer-driven selection, dragging and connection drawing

pub mod canvas;
pub mod catalog;
pub mod definition;
pub mod error;
pub mod graph;
pub mod layout;
pub mod node;
pub mod port;
pub mod route;

pub use canvas::{CanvasSession, CanvasState, NodeInteraction, PendingConnection};
pub use catalog::{ActionKind, CatalogEntry, NodeCategory, NodeType, TriggerKind};
pub use definition::{Workflow, WorkflowMetadata};
pub use error::{CanvasError, GraphError};
pub use graph::{WorkflowConnection, WorkflowGraph};
pub use layout::{Bounds, Position};
pub use node::WorkflowNode;
pub use port::{Port, PortDirection};
pub use route::ConnectionRoute;
