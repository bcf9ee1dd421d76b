//! Serializable editor gestures.
//!
//! A UI (or a script) drives a session by sending `EditorCommand`s; each one
//! maps onto exactly one [`EditorSession`] operation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::Position;
use crate::session::EditorSession;
use crate::EditorError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditorCommand {
    AddAction { subtype: String },
    DeleteNode { id: String },
    Select { id: Option<String> },
    Reposition { id: String, x: f64, y: f64 },
    BeginDrag { id: String, x: f64, y: f64 },
    DragTo { x: f64, y: f64 },
    EndDrag,
    SetTriggerType { subtype: String },
    SetActionType { id: String, subtype: String },
    UpdateConfig { id: String, fields: Map<String, Value> },
    Rename { id: String, name: String },
    SetName { name: String },
    SetDescription { description: String },
}

impl EditorSession {
    /// Apply one command.
    ///
    /// Returns the ID of the node created by `AddAction`, `None` otherwise.
    pub fn dispatch(&mut self, command: EditorCommand) -> Result<Option<String>, EditorError> {
        match command {
            EditorCommand::AddAction { subtype } => return self.add_action(&subtype).map(Some),
            EditorCommand::DeleteNode { id } => self.delete_node(&id)?,
            EditorCommand::Select { id } => self.select(id.as_deref())?,
            EditorCommand::Reposition { id, x, y } => self.reposition(&id, Position::new(x, y))?,
            EditorCommand::BeginDrag { id, x, y } => self.begin_drag(&id, Position::new(x, y))?,
            EditorCommand::DragTo { x, y } => self.drag_to(Position::new(x, y))?,
            EditorCommand::EndDrag => self.end_drag(),
            EditorCommand::SetTriggerType { subtype } => self.set_trigger_subtype(&subtype)?,
            EditorCommand::SetActionType { id, subtype } => self.set_action_subtype(&id, &subtype)?,
            EditorCommand::UpdateConfig { id, fields } => self.update_config(&id, fields)?,
            EditorCommand::Rename { id, name } => self.rename(&id, name)?,
            EditorCommand::SetName { name } => self.set_name(name)?,
            EditorCommand::SetDescription { description } => self.set_description(description)?,
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use catalog::Catalog;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn commands_parse_from_tagged_json() {
        let script: Vec<EditorCommand> = serde_json::from_value(json!([
            { "op": "set_trigger_type", "subtype": "new_lead" },
            { "op": "add_action", "subtype": "send_email" },
            { "op": "update_config", "id": "action-1", "fields": { "templateId": "welcome" } },
            { "op": "end_drag" }
        ]))
        .unwrap();

        assert_eq!(script.len(), 4);
        assert_eq!(script[3], EditorCommand::EndDrag);
    }

    #[test]
    fn dispatch_drives_the_session() {
        let mut session =
            EditorSession::open_new(Arc::new(Catalog::builtin()), EditorConfig::default());

        let created = session
            .dispatch(EditorCommand::AddAction { subtype: "wait".into() })
            .unwrap();
        assert_eq!(created.as_deref(), Some("action-1"));

        let none = session
            .dispatch(EditorCommand::SetName { name: "Nurture".into() })
            .unwrap();
        assert_eq!(none, None);
        assert_eq!(session.name(), "Nurture");
    }

    #[test]
    fn dispatch_propagates_errors() {
        let mut session =
            EditorSession::open_new(Arc::new(Catalog::builtin()), EditorConfig::default());
        let err = session
            .dispatch(EditorCommand::DeleteNode { id: "trigger".into() })
            .unwrap_err();
        assert!(matches!(err, EditorError::CannotDeleteTrigger));
    }
}
