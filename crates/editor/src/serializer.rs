//! Conversion between the visual graph and the linear automation definition
//! exchanged with the automation service.
//!
//! Outbound: [`to_definition`] flattens the graph into
//! `{ name, description, triggerType, triggerConfig, actions[] }`.
//! Inbound: [`graph_from_definition`] lays an existing automation out as a
//! trigger with its steps chained underneath.

use catalog::{Catalog, NodeConfig, NodeKind};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::EditorConfig;
use crate::graph::WorkflowGraph;
use crate::models::{Node, Position};
use crate::order::execution_order;
use crate::EditorError;

/// ID given to the trigger node of every graph.
pub const TRIGGER_NODE_ID: &str = "trigger";

// ---------------------------------------------------------------------------
// Outbound payload
// ---------------------------------------------------------------------------

/// One step of a saved automation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDefinition {
    /// Catalog subtype of the step.
    pub id: String,
    pub name: String,
    pub config: Map<String, Value>,
}

/// The automation definition handed to the automation service on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationDefinition {
    pub name: String,
    pub description: String,
    pub trigger_type: String,
    pub trigger_config: Map<String, Value>,
    pub actions: Vec<ActionDefinition>,
}

// ---------------------------------------------------------------------------
// Inbound payload
// ---------------------------------------------------------------------------

/// `trigger: { id }`, the nested form of `triggerType`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TriggerRef {
    #[serde(default)]
    pub id: Option<String>,
}

/// A step of an existing automation. The subtype is read from `actionType`,
/// falling back to `id`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingAction {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub action_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub config: Value,
}

impl ExistingAction {
    pub fn subtype(&self) -> Option<&str> {
        non_empty(self.action_type.as_deref()).or_else(|| non_empty(self.id.as_deref()))
    }
}

/// An automation loaded from the automation service, used to seed an editor.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingAutomation {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub trigger_type: Option<String>,
    #[serde(default)]
    pub trigger: Option<TriggerRef>,
    #[serde(default)]
    pub trigger_config: Value,
    #[serde(default, deserialize_with = "null_as_default")]
    pub actions: Vec<ExistingAction>,
}

impl ExistingAutomation {
    pub fn trigger_subtype(&self) -> Option<&str> {
        non_empty(self.trigger_type.as_deref())
            .or_else(|| non_empty(self.trigger.as_ref().and_then(|t| t.id.as_deref())))
    }
}

impl From<AutomationDefinition> for ExistingAutomation {
    fn from(def: AutomationDefinition) -> Self {
        Self {
            name: def.name,
            description: def.description,
            trigger_type: Some(def.trigger_type),
            trigger: None,
            trigger_config: Value::Object(def.trigger_config),
            actions: def
                .actions
                .into_iter()
                .map(|a| ExistingAction {
                    id: Some(a.id),
                    action_type: None,
                    name: Some(a.name),
                    config: Value::Object(a.config),
                })
                .collect(),
        }
    }
}

/// Stored automations may carry an explicit `null` where a value is optional.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Graph -> definition
// ---------------------------------------------------------------------------

/// Flatten `graph` into the definition sent to the automation service.
///
/// Steps without a subtype are left out.
///
/// # Errors
/// - [`EditorError::MissingTrigger`] if the trigger subtype is unset.
/// - [`EditorError::MissingName`] if `name` is blank.
/// - [`EditorError::CycleDetected`] from topological ordering.
pub fn to_definition(
    graph: &WorkflowGraph,
    name: &str,
    description: &str,
    config: &EditorConfig,
) -> Result<AutomationDefinition, EditorError> {
    let trigger = graph.trigger();
    let trigger_type = trigger.subtype().ok_or(EditorError::MissingTrigger)?;

    if name.trim().is_empty() {
        return Err(EditorError::MissingName);
    }

    let actions: Vec<ActionDefinition> = execution_order(graph, config.ordering)?
        .into_iter()
        .filter_map(|node| {
            node.subtype().map(|subtype| ActionDefinition {
                id: subtype.to_owned(),
                name: node.display_name.clone(),
                config: node.config.to_map(),
            })
        })
        .collect();

    debug!("serialized '{}' with {} action(s)", name, actions.len());

    Ok(AutomationDefinition {
        name: name.to_owned(),
        description: description.to_owned(),
        trigger_type: trigger_type.to_owned(),
        trigger_config: trigger.config.to_map(),
        actions,
    })
}

// ---------------------------------------------------------------------------
// Definition -> graph
// ---------------------------------------------------------------------------

/// ID of the `n`th (1-based) step created for an editor.
pub fn action_node_id(n: u64) -> String {
    format!("action-{n}")
}

/// Lay out an existing automation as a graph: the trigger at the configured
/// position, its steps stacked below it and chained trigger → a1 → a2 → ….
///
/// Subtypes missing from the catalog are kept, with untyped config.
pub fn graph_from_definition(
    existing: &ExistingAutomation,
    catalog: &Catalog,
    config: &EditorConfig,
) -> Result<WorkflowGraph, EditorError> {
    let trigger_subtype = existing.trigger_subtype();
    let trigger = Node {
        subtype: trigger_subtype.map(str::to_owned),
        display_name: trigger_subtype
            .and_then(|s| catalog.trigger(s).ok())
            .map_or_else(|| "Trigger".to_owned(), |e| e.name.to_owned()),
        config: NodeConfig::from_value(trigger_subtype, existing.trigger_config.clone()),
        ..Node::unset_trigger(TRIGGER_NODE_ID, config.trigger_position)
    };

    let mut graph = WorkflowGraph::new(trigger)?;
    let mut previous = TRIGGER_NODE_ID.to_owned();

    for (index, action) in existing.actions.iter().enumerate() {
        let id = action_node_id(index as u64 + 1);
        let subtype = action.subtype();
        let entry = subtype.and_then(|s| catalog.get(s)).filter(|e| e.kind.is_step());

        let display_name = action
            .name
            .clone()
            .filter(|n| !n.is_empty())
            .or_else(|| entry.map(|e| e.name.to_owned()))
            .or_else(|| subtype.map(str::to_owned))
            .unwrap_or_else(|| "Action".to_owned());

        let offset = Position::new(0.0, config.vertical_spacing * (index as f64 + 1.0));
        graph.add_node(Node {
            id: id.clone(),
            kind: entry.map_or(NodeKind::Action, |e| e.kind),
            subtype: subtype.map(str::to_owned),
            display_name,
            position: config.trigger_position + offset,
            config: NodeConfig::from_value(subtype, action.config.clone()),
        })?;
        graph.add_connection(&previous, &id)?;
        previous = id;
    }

    debug!(
        "loaded '{}' with {} step(s)",
        existing.name,
        existing.actions.len()
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn load(value: Value) -> WorkflowGraph {
        let existing: ExistingAutomation = serde_json::from_value(value).unwrap();
        graph_from_definition(&existing, &Catalog::builtin(), &EditorConfig::default()).unwrap()
    }

    #[test]
    fn inbound_accepts_nested_trigger_and_action_type() {
        let graph = load(json!({
            "name": "Onboarding",
            "trigger": { "id": "form_submitted" },
            "actions": [
                {
                    "actionType": "send_email",
                    "id": "row-17",
                    "config": { "templateId": "welcome" }
                }
            ]
        }));

        assert_eq!(graph.trigger().subtype(), Some("form_submitted"));
        assert_eq!(graph.trigger().display_name, "Form Submitted");
        let step = graph.node("action-1").unwrap();
        assert_eq!(step.subtype(), Some("send_email"));
        assert_eq!(step.display_name, "Send Email");
    }

    #[test]
    fn loaded_steps_are_stacked_and_chained() {
        let graph = load(json!({
            "triggerType": "new_lead",
            "actions": [{ "id": "send_email" }, { "id": "wait" }, { "id": "create_task" }]
        }));

        let ys: Vec<f64> = graph.nodes().iter().map(|n| n.position.y).collect();
        assert_eq!(ys, vec![100.0, 250.0, 400.0, 550.0]);

        let edges: Vec<_> = graph
            .connections()
            .iter()
            .map(|c| (c.source.as_str(), c.target.as_str()))
            .collect();
        assert_eq!(
            edges,
            vec![("trigger", "action-1"), ("action-1", "action-2"), ("action-2", "action-3")]
        );
    }

    #[test]
    fn unknown_subtypes_load_untyped() {
        let graph = load(json!({
            "triggerType": "ticket_opened",
            "triggerConfig": { "queue": "support" },
            "actions": [{ "id": "send_fax", "config": { "number": "555" } }]
        }));

        assert_eq!(graph.trigger().display_name, "Trigger");
        assert!(!graph.trigger().config.is_typed());
        let step = graph.node("action-1").unwrap();
        assert_eq!(step.display_name, "send_fax");
        assert_eq!(step.config.to_map()["number"], "555");
    }

    #[test]
    fn explicit_nulls_read_as_missing() {
        let existing: ExistingAutomation = serde_json::from_value(json!({
            "name": "Won deals",
            "description": null,
            "triggerType": "deal_closed",
            "actions": null
        }))
        .unwrap();

        assert_eq!(existing.description, "");
        assert!(existing.actions.is_empty());
        assert_eq!(existing.trigger_subtype(), Some("deal_closed"));
    }

    #[test]
    fn new_automation_has_unset_trigger() {
        let graph = load(json!({}));
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.trigger().subtype(), None);

        let err = to_definition(&graph, "Named", "", &EditorConfig::default()).unwrap_err();
        assert!(matches!(err, EditorError::MissingTrigger));
    }

    #[test]
    fn blank_name_is_rejected_after_trigger_check() {
        let graph = load(json!({ "triggerType": "new_lead" }));
        let err = to_definition(&graph, "   ", "", &EditorConfig::default()).unwrap_err();
        assert!(matches!(err, EditorError::MissingName));
    }

    #[test]
    fn steps_without_subtype_are_skipped() {
        let graph = load(json!({
            "triggerType": "new_lead",
            "actions": [{ "name": "Draft" }, { "id": "add_tag", "config": { "tag": "hot" } }]
        }));
        let def = to_definition(&graph, "Tagging", "", &EditorConfig::default()).unwrap();

        assert_eq!(def.actions.len(), 1);
        assert_eq!(def.actions[0].id, "add_tag");
        assert_eq!(def.actions[0].config["tag"], "hot");
    }

    #[test]
    fn definition_uses_camel_case_keys() {
        let graph = load(json!({
            "triggerType": "deal_closed",
            "triggerConfig": { "pipeline": "sales" }
        }));
        let def =
            to_definition(&graph, "Won deals", "notify team", &EditorConfig::default()).unwrap();

        assert_eq!(
            serde_json::to_value(&def).unwrap(),
            json!({
                "name": "Won deals",
                "description": "notify team",
                "triggerType": "deal_closed",
                "triggerConfig": { "pipeline": "sales" },
                "actions": []
            })
        );
    }
}
