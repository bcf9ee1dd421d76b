//! `FileSink`: stores saved automations as pretty-printed JSON files.

use std::path::PathBuf;

use async_trait::async_trait;
use editor::{AutomationDefinition, AutomationSink, SaveReceipt, SinkError};
use tracing::info;

/// Writes each submitted definition to `path`, or to stdout when `path` is `None`.
pub struct FileSink {
    path: Option<PathBuf>,
}

impl FileSink {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

#[async_trait]
impl AutomationSink for FileSink {
    async fn submit(&self, definition: &AutomationDefinition) -> Result<SaveReceipt, SinkError> {
        let json = serde_json::to_string_pretty(definition)
            .map_err(|e| SinkError::Rejected(e.to_string()))?;

        match &self.path {
            Some(path) => {
                tokio::fs::write(path, json)
                    .await
                    .map_err(|e| SinkError::Unavailable(format!("{}: {e}", path.display())))?;
                info!("wrote automation to {}", path.display());
            }
            None => println!("{json}"),
        }

        Ok(SaveReceipt::issue())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition() -> AutomationDefinition {
        AutomationDefinition {
            name: "Lead nurture".into(),
            description: String::new(),
            trigger_type: "new_lead".into(),
            trigger_config: Default::default(),
            actions: Vec::new(),
        }
    }

    #[tokio::test]
    async fn writes_definition_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lead-nurture.json");
        let sink = FileSink::new(Some(path.clone()));

        sink.submit(&definition()).await.unwrap();

        let written: AutomationDefinition =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, definition());
    }

    #[tokio::test]
    async fn unwritable_path_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.json");
        let sink = FileSink::new(Some(path));

        let err = sink.submit(&definition()).await.unwrap_err();
        assert!(matches!(err, SinkError::Unavailable(_)));
    }
}
