//! One open workflow editor.
//!
//! `EditorSession` owns the graph plus the interaction state around it
//! (selection, drag, automation name) and translates user gestures into
//! graph operations:
//! 1. New steps are placed below the lowest node and chained from it.
//! 2. Deleting a node clears any selection or drag that referenced it.
//! 3. Subtype changes are resolved against the catalog and fail loudly.
//! 4. `save` validates, serializes and hands the definition to a sink.
//!
//! Rejected gestures are logged and, when the user caused them, queued as
//! [`Notice`]s for the UI to display.

use std::sync::Arc;

use catalog::{Catalog, NodeConfig};
use serde_json::{Map, Value};
use tracing::{debug, error, info, instrument, warn};

use crate::config::EditorConfig;
use crate::graph::WorkflowGraph;
use crate::models::{Node, NodePatch, Position};
use crate::serializer::{
    self, action_node_id, AutomationDefinition, ExistingAutomation, TRIGGER_NODE_ID,
};
use crate::sink::{AutomationSink, SaveReceipt};
use crate::EditorError;

// ---------------------------------------------------------------------------
// Lifecycle and notices
// ---------------------------------------------------------------------------

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Editing,
    /// A save is waiting on the sink.
    Saving,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// An in-progress node drag.
#[derive(Debug, Clone, PartialEq)]
struct DragState {
    node_id: String,
    /// Pointer position relative to the node's top-left corner at drag start.
    grab_offset: Position,
}

/// Holds the session in `Saving` while the sink is awaited. Dropping it,
/// including when the save future itself is dropped, returns to `Editing`.
struct SavingGuard<'a> {
    state: &'a mut EditorState,
}

impl<'a> SavingGuard<'a> {
    fn enter(state: &'a mut EditorState) -> Self {
        *state = EditorState::Saving;
        Self { state }
    }
}

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        if *self.state == EditorState::Saving {
            *self.state = EditorState::Editing;
        }
    }
}

// ---------------------------------------------------------------------------
// EditorSession
// ---------------------------------------------------------------------------

pub struct EditorSession {
    catalog: Arc<Catalog>,
    config: EditorConfig,
    graph: WorkflowGraph,
    name: String,
    description: String,
    selected: Option<String>,
    drag: Option<DragState>,
    state: EditorState,
    notices: Vec<Notice>,
    next_action: u64,
}

impl EditorSession {
    /// Open an editor for a new automation: a lone trigger with no subtype.
    pub fn open_new(catalog: Arc<Catalog>, config: EditorConfig) -> Self {
        let graph = WorkflowGraph::with_unset_trigger(TRIGGER_NODE_ID, config.trigger_position);
        info!("opened editor for a new automation");
        Self::with_graph(catalog, config, graph, String::new(), String::new())
    }

    /// Open an editor seeded from an existing automation.
    ///
    /// # Errors
    /// Propagates graph errors from [`serializer::graph_from_definition`].
    pub fn open_existing(
        catalog: Arc<Catalog>,
        config: EditorConfig,
        existing: &ExistingAutomation,
    ) -> Result<Self, EditorError> {
        let graph = serializer::graph_from_definition(existing, &catalog, &config)?;
        info!("opened editor for '{}' ({} nodes)", existing.name, graph.len());
        Ok(Self::with_graph(
            catalog,
            config,
            graph,
            existing.name.clone(),
            existing.description.clone(),
        ))
    }

    fn with_graph(
        catalog: Arc<Catalog>,
        config: EditorConfig,
        graph: WorkflowGraph,
        name: String,
        description: String,
    ) -> Self {
        let next_action = graph.len() as u64;
        Self {
            catalog,
            config,
            graph,
            name,
            description,
            selected: None,
            drag: None,
            state: EditorState::Editing,
            notices: Vec::new(),
            next_action,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn graph(&self) -> &WorkflowGraph {
        &self.graph
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    /// ID of the node being dragged, if any.
    pub fn dragging(&self) -> Option<&str> {
        self.drag.as_ref().map(|d| d.node_id.as_str())
    }

    /// Drain queued notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // -----------------------------------------------------------------------
    // Automation metadata
    // -----------------------------------------------------------------------

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), EditorError> {
        self.ensure_open()?;
        self.name = name.into();
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> Result<(), EditorError> {
        self.ensure_open()?;
        self.description = description.into();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Gestures
    // -----------------------------------------------------------------------

    /// Add a step of `subtype` below the lowest node and chain it from there.
    ///
    /// Returns the new node's ID.
    pub fn add_action(&mut self, subtype: &str) -> Result<String, EditorError> {
        self.ensure_open()?;
        let catalog = Arc::clone(&self.catalog);
        let entry = catalog.step(subtype).map_err(|e| self.reject(e.into()))?;

        let source_id = if self.graph.len() == 1 {
            self.graph.trigger().id.clone()
        } else {
            self.graph.lowest_node().id.clone()
        };
        let position = Position::new(
            self.graph.trigger().position.x,
            self.graph.lowest_node().position.y + self.config.vertical_spacing,
        );

        let id = self.fresh_action_id();
        self.graph
            .add_node(Node::from_entry(id.clone(), entry, position))
            .map_err(|e| self.reject(e))?;
        self.graph
            .add_connection(&source_id, &id)
            .map_err(|e| self.reject(e))?;

        info!("added {} step '{}' after '{}'", entry.id, id, source_id);
        Ok(id)
    }

    /// Move a node. Connections are untouched.
    pub fn reposition(&mut self, id: &str, position: Position) -> Result<(), EditorError> {
        self.ensure_open()?;
        self.graph
            .update_node(id, NodePatch::position(position))
            .map_err(|e| self.reject(e))
    }

    /// Start dragging `id` with the pointer at `pointer`.
    pub fn begin_drag(&mut self, id: &str, pointer: Position) -> Result<(), EditorError> {
        self.ensure_open()?;
        let Some(origin) = self.graph.node(id).map(|n| n.position) else {
            return Err(self.reject(EditorError::NotFound { id: id.to_owned() }));
        };
        let grab_offset = pointer - origin;
        debug!("dragging '{}' (grab offset {:?})", id, grab_offset);
        self.drag = Some(DragState {
            node_id: id.to_owned(),
            grab_offset,
        });
        Ok(())
    }

    /// Follow the pointer with the dragged node. No-op without an active drag.
    pub fn drag_to(&mut self, pointer: Position) -> Result<(), EditorError> {
        let Some(drag) = self.drag.clone() else {
            return Ok(());
        };
        self.reposition(&drag.node_id, pointer - drag.grab_offset)
    }

    /// Finish the active drag, if any.
    pub fn end_drag(&mut self) {
        if let Some(drag) = self.drag.take() {
            debug!("finished dragging '{}'", drag.node_id);
        }
    }

    /// Delete a step and every connection touching it.
    pub fn delete_node(&mut self, id: &str) -> Result<(), EditorError> {
        self.ensure_open()?;
        let (node, dropped) = self.graph.remove_node(id).map_err(|e| self.reject(e))?;

        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        if self.dragging() == Some(id) {
            self.drag = None;
        }
        info!("deleted '{}' ({}) with {} connection(s)", id, node.display_name, dropped);
        Ok(())
    }

    /// Select one node, or clear the selection with `None`.
    pub fn select(&mut self, id: Option<&str>) -> Result<(), EditorError> {
        self.ensure_open()?;
        if let Some(id) = id {
            if !self.graph.contains(id) {
                return Err(self.reject(EditorError::NotFound { id: id.to_owned() }));
            }
        }
        self.selected = id.map(str::to_owned);
        Ok(())
    }

    /// Choose the trigger's subtype. Resets its name and config.
    pub fn set_trigger_subtype(&mut self, subtype: &str) -> Result<(), EditorError> {
        self.ensure_open()?;
        let catalog = Arc::clone(&self.catalog);
        let entry = catalog.trigger(subtype).map_err(|e| self.reject(e.into()))?;
        let trigger_id = self.graph.trigger().id.clone();

        self.graph
            .update_node(
                &trigger_id,
                NodePatch {
                    subtype: Some(entry.id.to_owned()),
                    display_name: Some(entry.name.to_owned()),
                    config: Some(NodeConfig::empty_for(Some(entry.id))),
                    ..NodePatch::default()
                },
            )
            .map_err(|e| self.reject(e))?;
        info!("trigger set to '{}'", entry.id);
        Ok(())
    }

    /// Change a step's subtype. Resets its name and config.
    pub fn set_action_subtype(&mut self, id: &str, subtype: &str) -> Result<(), EditorError> {
        self.ensure_open()?;
        match self.graph.node(id).map(Node::is_trigger) {
            None => return Err(self.reject(EditorError::NotFound { id: id.to_owned() })),
            Some(true) => {
                return Err(self.reject(EditorError::KindMismatch {
                    id: id.to_owned(),
                    expected: "a step",
                }))
            }
            Some(false) => {}
        }

        let catalog = Arc::clone(&self.catalog);
        let entry = catalog.step(subtype).map_err(|e| self.reject(e.into()))?;
        self.graph
            .update_node(
                id,
                NodePatch {
                    kind: Some(entry.kind),
                    subtype: Some(entry.id.to_owned()),
                    display_name: Some(entry.name.to_owned()),
                    config: Some(NodeConfig::empty_for(Some(entry.id))),
                    ..NodePatch::default()
                },
            )
            .map_err(|e| self.reject(e))?;
        info!("step '{}' set to '{}'", id, entry.id);
        Ok(())
    }

    /// Merge form fields into a node's config. `null` clears a field.
    pub fn update_config(
        &mut self,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), EditorError> {
        self.ensure_open()?;
        let Some(mut config) = self.graph.node(id).map(|n| n.config.clone()) else {
            return Err(self.reject(EditorError::NotFound { id: id.to_owned() }));
        };
        config.merge(fields).map_err(|e| self.reject(e.into()))?;

        self.graph
            .update_node(id, NodePatch { config: Some(config), ..NodePatch::default() })
            .map_err(|e| self.reject(e))
    }

    /// Set a node's display name.
    pub fn rename(&mut self, id: &str, name: impl Into<String>) -> Result<(), EditorError> {
        self.ensure_open()?;
        let patch = NodePatch {
            display_name: Some(name.into()),
            ..NodePatch::default()
        };
        self.graph.update_node(id, patch).map_err(|e| self.reject(e))
    }

    // -----------------------------------------------------------------------
    // Save
    // -----------------------------------------------------------------------

    /// Flatten the graph without saving it.
    pub fn to_definition(&self) -> Result<AutomationDefinition, EditorError> {
        serializer::to_definition(&self.graph, &self.name, &self.description, &self.config)
    }

    /// Validate, serialize and submit the automation.
    ///
    /// On success the session closes. On any failure it stays editable with
    /// the graph unchanged, and an error notice is queued. Nothing is retried.
    /// Dropping the returned future mid-submit also leaves the session editable.
    #[instrument(skip(self, sink), fields(automation = %self.name))]
    pub async fn save(&mut self, sink: &dyn AutomationSink) -> Result<SaveReceipt, EditorError> {
        self.ensure_open()?;
        let definition = self.to_definition().map_err(|e| self.reject(e))?;

        info!("saving automation with {} action(s)", definition.actions.len());
        let submitted = {
            let _saving = SavingGuard::enter(&mut self.state);
            sink.submit(&definition).await
        };

        match submitted {
            Ok(receipt) => {
                self.close();
                self.notices.push(Notice {
                    level: NoticeLevel::Info,
                    message: format!("Automation '{}' saved", definition.name),
                });
                info!("saved as {}", receipt.automation_id);
                Ok(receipt)
            }
            Err(e) => Err(self.reject(e.into())),
        }
    }

    /// Close the editor. Every later gesture fails with `SessionClosed`.
    pub fn close(&mut self) {
        if self.state != EditorState::Closed {
            info!("closing editor");
        }
        self.state = EditorState::Closed;
        self.selected = None;
        self.drag = None;
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn ensure_open(&self) -> Result<(), EditorError> {
        match self.state {
            EditorState::Closed => Err(EditorError::SessionClosed),
            EditorState::Editing | EditorState::Saving => Ok(()),
        }
    }

    /// Log a rejected operation and queue a notice when the user caused it.
    fn reject(&mut self, err: EditorError) -> EditorError {
        if err.is_user_facing() {
            warn!("rejected: {}", err);
            self.notices.push(Notice {
                level: NoticeLevel::Error,
                message: err.to_string(),
            });
        } else {
            error!("editor logic error: {}", err);
        }
        err
    }

    fn fresh_action_id(&mut self) -> String {
        loop {
            let id = action_node_id(self.next_action);
            self.next_action += 1;
            if !self.graph.contains(&id) {
                return id;
            }
        }
    }
}
