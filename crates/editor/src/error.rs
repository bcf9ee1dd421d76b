//! Editor-level error types.

use catalog::CatalogError;
use thiserror::Error;

use crate::sink::SinkError;

/// Errors produced by the editor (graph mutations, serialization and save).
#[derive(Debug, Error)]
pub enum EditorError {
    // ------ Graph store errors ------

    /// A node with this ID is already in the graph.
    #[error("duplicate node ID: '{0}'")]
    DuplicateId(String),

    /// The graph already holds its one trigger.
    #[error("an automation can only have one trigger")]
    TriggerAlreadyPresent,

    /// The trigger node is permanent for the lifetime of the graph.
    #[error("the trigger cannot be deleted")]
    CannotDeleteTrigger,

    /// An operation referenced a node that is not in the graph.
    #[error("node '{id}' not found")]
    NotFound { id: String },

    /// The node exists but is the wrong kind for the operation.
    #[error("node '{id}' is not {expected}")]
    KindMismatch {
        id: String,
        expected: &'static str,
    },

    /// Subtype lookup or typed config failure.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    // ------ Serialization errors ------

    /// No trigger subtype has been chosen.
    #[error("choose a trigger before saving")]
    MissingTrigger,

    /// The automation has no name.
    #[error("enter a name for the automation")]
    MissingName,

    /// The connections reachable from the trigger form a cycle.
    #[error("workflow connections contain a cycle")]
    CycleDetected,

    // ------ Session errors ------

    /// The editor has been closed.
    #[error("the editor session is closed")]
    SessionClosed,

    /// The automation service did not accept the save.
    #[error("failed to save automation: {0}")]
    Save(#[from] SinkError),
}

impl EditorError {
    /// `true` for failures the user caused and should be told about.
    ///
    /// The rest are logic errors in the caller: the UI never offers the user
    /// an unknown node id or a closed editor.
    pub fn is_user_facing(&self) -> bool {
        !matches!(
            self,
            Self::DuplicateId(_)
                | Self::NotFound { .. }
                | Self::KindMismatch { .. }
                | Self::SessionClosed
        )
    }

    pub fn is_unknown_subtype(&self) -> bool {
        matches!(self, Self::Catalog(CatalogError::UnknownSubtype { .. }))
    }
}
