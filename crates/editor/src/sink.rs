//! The `AutomationSink` trait: where a saved automation leaves the editor.
//!
//! The automation service (HTTP API and persistence) is an external
//! collaborator; the editor only knows this trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::AutomationDefinition;

/// Errors returned by a sink's `submit` method.
///
/// Neither variant is retried by the editor; the graph is kept so the user
/// can save again.
#[derive(Debug, Error, Clone)]
pub enum SinkError {
    /// The service refused the definition.
    #[error("automation rejected: {0}")]
    Rejected(String),

    /// The service could not be reached or failed while storing.
    #[error("automation service unavailable: {0}")]
    Unavailable(String),
}

/// Acknowledgement returned by a successful save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReceipt {
    pub automation_id: Uuid,
    pub saved_at: DateTime<Utc>,
}

impl SaveReceipt {
    /// A receipt for an automation stored just now under a fresh ID.
    pub fn issue() -> Self {
        Self {
            automation_id: Uuid::new_v4(),
            saved_at: Utc::now(),
        }
    }
}

/// Destination of saved automations.
#[async_trait]
pub trait AutomationSink: Send + Sync {
    /// Store `definition`, producing exactly one success or failure.
    async fn submit(&self, definition: &AutomationDefinition) -> Result<SaveReceipt, SinkError>;
}
