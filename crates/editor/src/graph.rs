//! Node and connection stores for one open editor.
//!
//! Invariants held after every operation:
//! 1. Exactly one node of kind `trigger` exists, and it cannot be removed.
//! 2. Node IDs are unique.
//! 3. Every connection references two nodes currently in the graph.

use tracing::debug;

use crate::models::{Connection, Node, NodePatch, Position};
use crate::EditorError;

/// The workflow graph: nodes in insertion order plus their connections.
#[derive(Debug, Clone)]
pub struct WorkflowGraph {
    nodes: Vec<Node>,
    connections: Vec<Connection>,
    next_connection: u64,
}

impl WorkflowGraph {
    /// Create a graph holding only `trigger`.
    ///
    /// # Errors
    /// [`EditorError::KindMismatch`] if `trigger` is not a trigger node.
    pub fn new(trigger: Node) -> Result<Self, EditorError> {
        if !trigger.is_trigger() {
            return Err(EditorError::KindMismatch {
                id: trigger.id,
                expected: "a trigger",
            });
        }
        Ok(Self {
            nodes: vec![trigger],
            connections: Vec::new(),
            next_connection: 1,
        })
    }

    /// Create a graph holding a trigger with no subtype chosen yet.
    pub fn with_unset_trigger(id: impl Into<String>, position: Position) -> Self {
        Self {
            nodes: vec![Node::unset_trigger(id, position)],
            connections: Vec::new(),
            next_connection: 1,
        }
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Never true: the trigger is always present.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// The graph's single trigger node.
    pub fn trigger(&self) -> &Node {
        // Index 0 is the trigger: `new` seeds it and it can never be removed.
        &self.nodes[0]
    }

    /// Every node except the trigger.
    pub fn steps(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| !n.is_trigger())
    }

    /// The node drawn furthest down the canvas (greatest `y`).
    /// Ties go to the most recently added node.
    pub fn lowest_node(&self) -> &Node {
        self.nodes
            .iter()
            .max_by(|a, b| a.position.y.total_cmp(&b.position.y))
            .unwrap_or_else(|| self.trigger())
    }

    pub fn connections_from<'a>(
        &'a self,
        id: &'a str,
    ) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.iter().filter(move |c| c.source == id)
    }

    // -----------------------------------------------------------------------
    // Node operations
    // -----------------------------------------------------------------------

    /// Insert a node.
    ///
    /// # Errors
    /// - [`EditorError::DuplicateId`] if the ID is taken.
    /// - [`EditorError::TriggerAlreadyPresent`] if `node` is a second trigger.
    pub fn add_node(&mut self, node: Node) -> Result<(), EditorError> {
        if self.contains(&node.id) {
            return Err(EditorError::DuplicateId(node.id));
        }
        if node.is_trigger() {
            return Err(EditorError::TriggerAlreadyPresent);
        }
        debug!("adding {} node '{}'", node.kind, node.id);
        self.nodes.push(node);
        Ok(())
    }

    /// Remove a node and every connection touching it.
    ///
    /// Returns the removed node and the number of connections dropped with it.
    ///
    /// # Errors
    /// - [`EditorError::NotFound`] if no node has this ID.
    /// - [`EditorError::CannotDeleteTrigger`] for the trigger node.
    pub fn remove_node(&mut self, id: &str) -> Result<(Node, usize), EditorError> {
        let index = self.index_of(id)?;
        if self.nodes[index].is_trigger() {
            return Err(EditorError::CannotDeleteTrigger);
        }

        let node = self.nodes.remove(index);
        let before = self.connections.len();
        self.connections.retain(|c| !c.touches(id));
        let dropped = before - self.connections.len();

        debug!("removed node '{}' and {} connection(s)", id, dropped);
        Ok((node, dropped))
    }

    /// Merge `patch` into an existing node.
    ///
    /// # Errors
    /// - [`EditorError::NotFound`] if no node has this ID.
    /// - [`EditorError::KindMismatch`] if the patch would turn a step into a
    ///   trigger or the trigger into a step.
    pub fn update_node(&mut self, id: &str, patch: NodePatch) -> Result<(), EditorError> {
        let index = self.index_of(id)?;
        let node = &mut self.nodes[index];

        if let Some(kind) = patch.kind {
            if kind.is_step() == node.is_trigger() {
                return Err(EditorError::KindMismatch {
                    id: id.to_owned(),
                    expected: if node.is_trigger() { "a step" } else { "a trigger" },
                });
            }
            node.kind = kind;
        }
        if let Some(position) = patch.position {
            node.position = position;
        }
        if let Some(config) = patch.config {
            node.config = config;
        }
        if let Some(subtype) = patch.subtype {
            node.subtype = Some(subtype);
        }
        if let Some(name) = patch.display_name {
            node.display_name = name;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Connection operations
    // -----------------------------------------------------------------------

    /// Connect `source` → `target` and return the new connection's ID.
    ///
    /// # Errors
    /// [`EditorError::NotFound`] if either endpoint is missing.
    pub fn add_connection(&mut self, source: &str, target: &str) -> Result<String, EditorError> {
        for endpoint in [source, target] {
            if !self.contains(endpoint) {
                return Err(EditorError::NotFound { id: endpoint.to_owned() });
            }
        }

        let id = self.next_connection_id();
        debug!("connecting '{}' -> '{}' as '{}'", source, target, id);
        self.connections.push(Connection {
            id: id.clone(),
            source: source.to_owned(),
            target: target.to_owned(),
        });
        Ok(id)
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn index_of(&self, id: &str) -> Result<usize, EditorError> {
        self.nodes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| EditorError::NotFound { id: id.to_owned() })
    }

    fn next_connection_id(&mut self) -> String {
        loop {
            let id = format!("conn-{}", self.next_connection);
            self.next_connection += 1;
            if !self.connections.iter().any(|c| c.id == id) {
                return id;
            }
        }
    }
}
