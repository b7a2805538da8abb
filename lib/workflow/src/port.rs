//! Port system for workflow nodes.
//!
//! Ports are the attachment points connections enter (inputs) or leave
//! (outputs). A node's ports are ordered; connections address them by index,
//! and the index also decides where the port is drawn on the node.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of a node a port sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortDirection {
    Input,
    Output,
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Output => f.write_str("output"),
        }
    }
}

/// A named port on a workflow node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    /// The name of this port, unique per side of a node.
    pub name: String,
}

impl Port {
    /// Creates a new port.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_direction_display() {
        assert_eq!(PortDirection::Input.to_string(), "input");
        assert_eq!(PortDirection::Output.to_string(), "output");
    }

    #[test]
    fn port_serializes_as_object() {
        let json = serde_json::to_value(Port::new("true")).expect("serialize");
        assert_eq!(json, serde_json::json!({ "name": "true" }));
    }
}
