//! Core graph models for the workflow editor.
//!
//! These types are the in-memory state of an open editor. They never leave
//! the process directly; the serializer flattens them into an
//! [`AutomationDefinition`](crate::AutomationDefinition) on save.

use std::ops::{Add, Sub};

use catalog::{CatalogEntry, NodeConfig, NodeKind};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// Canvas coordinate of a node's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y)
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A trigger or step placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique within the graph (referenced by connections).
    pub id: String,
    pub kind: NodeKind,
    /// Catalog subtype; `None` until the user picks one.
    pub subtype: Option<String>,
    pub display_name: String,
    pub position: Position,
    pub config: NodeConfig,
}

impl Node {
    /// A trigger node with no subtype selected yet.
    pub fn unset_trigger(id: impl Into<String>, position: Position) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Trigger,
            subtype: None,
            display_name: "Trigger".into(),
            position,
            config: NodeConfig::default(),
        }
    }

    /// A node for a catalog entry, named after it and with an empty config.
    pub fn from_entry(id: impl Into<String>, entry: &CatalogEntry, position: Position) -> Self {
        Self {
            id: id.into(),
            kind: entry.kind,
            subtype: Some(entry.id.to_owned()),
            display_name: entry.name.to_owned(),
            position,
            config: NodeConfig::empty_for(Some(entry.id)),
        }
    }

    pub fn is_trigger(&self) -> bool {
        self.kind == NodeKind::Trigger
    }

    /// The subtype, treating an empty string as unset.
    pub fn subtype(&self) -> Option<&str> {
        self.subtype.as_deref().filter(|s| !s.is_empty())
    }
}

// ---------------------------------------------------------------------------
// NodePatch
// ---------------------------------------------------------------------------

/// Fields merged into an existing node by
/// [`WorkflowGraph::update_node`](crate::WorkflowGraph::update_node).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    pub position: Option<Position>,
    pub config: Option<NodeConfig>,
    pub subtype: Option<String>,
    pub display_name: Option<String>,
    /// Only accepted when it keeps the node on the same side of trigger/step.
    pub kind: Option<NodeKind>,
}

impl NodePatch {
    pub fn position(position: Position) -> Self {
        Self { position: Some(position), ..Self::default() }
    }
}

// ---------------------------------------------------------------------------
// Connection
// ---------------------------------------------------------------------------

/// Directed edge from one node to another, drawn on the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl Connection {
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}
