//! Canvas geometry: positions, node bounds and port anchors.
//!
//! Nodes are drawn as fixed-width cards. Ports stack vertically below the
//! header, inputs on the left edge and outputs on the right edge, one row per
//! port index.

use crate::node::WorkflowNode;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// Width of a node card.
pub const NODE_WIDTH: f64 = 160.0;
/// Height of the title area above the first port row.
pub const NODE_HEADER_HEIGHT: f64 = 36.0;
/// Vertical distance between port rows.
pub const PORT_SPACING: f64 = 24.0;
/// Minimum card height, used by nodes with a single port row.
pub const MIN_NODE_HEIGHT: f64 = 60.0;

/// A point in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Creates a position.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

impl Add for Position {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Position {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub origin: Position,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    /// Returns true if the point lies inside or on the edge.
    #[must_use]
    pub fn contains(&self, point: Position) -> bool {
        point.x >= self.origin.x
            && point.x <= self.origin.x + self.width
            && point.y >= self.origin.y
            && point.y <= self.origin.y + self.height
    }
}

/// Card height for a node, growing with its longest port column.
#[must_use]
pub fn node_height(node: &WorkflowNode) -> f64 {
    let rows = node.inputs().len().max(node.outputs().len()) as f64;
    (NODE_HEADER_HEIGHT + rows * PORT_SPACING).max(MIN_NODE_HEIGHT)
}

/// Bounds of a node drawn at `origin`.
///
/// `origin` is passed separately so a node being dragged can be hit-tested
/// at its live position.
#[must_use]
pub fn node_bounds(node: &WorkflowNode, origin: Position) -> Bounds {
    Bounds {
        origin,
        width: NODE_WIDTH,
        height: node_height(node),
    }
}

fn port_row_y(origin: Position, index: usize) -> f64 {
    origin.y + NODE_HEADER_HEIGHT + index as f64 * PORT_SPACING + PORT_SPACING / 2.0
}

/// Anchor of input port `index` for a node drawn at `origin`.
#[must_use]
pub fn input_anchor(origin: Position, index: usize) -> Position {
    Position::new(origin.x, port_row_y(origin, index))
}

/// Anchor of output port `index` for a node drawn at `origin`.
#[must_use]
pub fn output_anchor(origin: Position, index: usize) -> Position {
    Position::new(origin.x + NODE_WIDTH, port_row_y(origin, index))
}
