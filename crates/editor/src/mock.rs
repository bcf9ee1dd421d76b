//! `RecordingSink`: a test double for `AutomationSink`.
//!
//! Useful in unit and integration tests where no automation service is
//! available.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};

use crate::sink::{AutomationSink, SaveReceipt, SinkError};
use crate::AutomationDefinition;

/// Behaviour injected into `RecordingSink` at construction time.
pub enum SinkBehaviour {
    /// Accept every definition.
    Accept,
    /// Fail with `SinkError::Rejected`.
    Reject(String),
    /// Fail with `SinkError::Unavailable`.
    Unavailable(String),
    /// Never answer.
    Hang,
}

/// A sink that records every definition it receives and answers with a
/// programmer-specified result.
pub struct RecordingSink {
    pub behaviour: SinkBehaviour,
    /// All definitions submitted (in call order).
    pub calls: Arc<Mutex<Vec<AutomationDefinition>>>,
}

impl RecordingSink {
    fn with(behaviour: SinkBehaviour) -> Self {
        Self {
            behaviour,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a sink that accepts everything.
    pub fn accepting() -> Self {
        Self::with(SinkBehaviour::Accept)
    }

    /// Create a sink that always rejects.
    pub fn rejecting(msg: impl Into<String>) -> Self {
        Self::with(SinkBehaviour::Reject(msg.into()))
    }

    /// Create a sink that is always unreachable.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::with(SinkBehaviour::Unavailable(msg.into()))
    }

    /// Create a sink whose `submit` never completes.
    pub fn hanging() -> Self {
        Self::with(SinkBehaviour::Hang)
    }

    /// Number of times `submit` has been called.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// The most recent submission, if any.
    pub fn last(&self) -> Option<AutomationDefinition> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).last().cloned()
    }
}

#[async_trait]
impl AutomationSink for RecordingSink {
    async fn submit(&self, definition: &AutomationDefinition) -> Result<SaveReceipt, SinkError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(definition.clone());

        match &self.behaviour {
            SinkBehaviour::Accept           => Ok(SaveReceipt::issue()),
            SinkBehaviour::Reject(msg)      => Err(SinkError::Rejected(msg.clone())),
            SinkBehaviour::Unavailable(msg) => Err(SinkError::Unavailable(msg.clone())),
            SinkBehaviour::Hang             => std::future::pending().await,
        }
    }
}
