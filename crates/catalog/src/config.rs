//! Strongly-typed per-subtype configuration.
//!
//! Each catalog subtype owns a config struct whose fields are the form values
//! the editor collects for it. Keys a struct does not model are kept in its
//! `extra` map so stored configs survive a load/save cycle unchanged. Subtypes
//! missing from the catalog, and stored values that do not fit the typed
//! fields, are carried as [`NodeConfig::Untyped`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::CatalogError;

macro_rules! step_config {
    ($(#[$meta:meta])* $name:ident { $($field:ident),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            $(
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub $field: Option<String>,
            )*
            /// Keys this subtype does not model.
            #[serde(flatten)]
            pub extra: Map<String, Value>,
        }
    };
}

// ---------------------------------------------------------------------------
// Trigger configs
// ---------------------------------------------------------------------------

step_config!(NewLeadConfig { source });
step_config!(DealClosedConfig { pipeline, outcome });
step_config!(DealStageChangedConfig { pipeline, stage });
step_config!(FormSubmittedConfig { form_id });
step_config!(InvoiceOverdueConfig { days_overdue });

// ---------------------------------------------------------------------------
// Action configs
// ---------------------------------------------------------------------------

step_config!(SendEmailConfig { template_id, subject, to });
step_config!(SendNotificationConfig { recipient, message });
step_config!(CreateTaskConfig { title, assignee, due_in_days });
step_config!(AssignOwnerConfig { assignee });
step_config!(UpdateFieldConfig { field, value });
step_config!(AddTagConfig { tag });
step_config!(WebhookConfig { url, method });
step_config!(
    /// Delay before the next step. `days` is kept as entered in the form.
    WaitConfig { days }
);
step_config!(IfElseConfig { field, operator, value });

// ---------------------------------------------------------------------------
// NodeConfig
// ---------------------------------------------------------------------------

macro_rules! node_configs {
    ($($subtype:literal => $variant:ident($ty:ty)),* $(,)?) => {
        /// Configuration of a single node, keyed by its subtype.
        ///
        /// Serialises as the bare config object; the subtype travels in a
        /// sibling field of the surrounding payload.
        #[derive(Debug, Clone, PartialEq, Serialize)]
        #[serde(untagged)]
        pub enum NodeConfig {
            $($variant($ty),)*
            Untyped(Map<String, Value>),
        }

        impl NodeConfig {
            /// An empty config for `subtype`; untyped when the subtype is unset or unknown.
            pub fn empty_for(subtype: Option<&str>) -> Self {
                match subtype {
                    $(Some($subtype) => Self::$variant(<$ty>::default()),)*
                    _ => Self::Untyped(Map::new()),
                }
            }

            /// The catalog subtype a typed variant belongs to.
            pub fn subtype(&self) -> Option<&'static str> {
                match self {
                    $(Self::$variant(_) => Some($subtype),)*
                    Self::Untyped(_) => None,
                }
            }

            fn parse_typed(subtype: &str, value: Value) -> Option<Result<Self, serde_json::Error>> {
                match subtype {
                    $($subtype => Some(serde_json::from_value::<$ty>(value).map(Self::$variant)),)*
                    _ => None,
                }
            }
        }
    };
}

node_configs! {
    "new_lead"           => NewLead(NewLeadConfig),
    "deal_closed"        => DealClosed(DealClosedConfig),
    "deal_stage_changed" => DealStageChanged(DealStageChangedConfig),
    "form_submitted"     => FormSubmitted(FormSubmittedConfig),
    "invoice_overdue"    => InvoiceOverdue(InvoiceOverdueConfig),
    "send_email"         => SendEmail(SendEmailConfig),
    "send_notification"  => SendNotification(SendNotificationConfig),
    "create_task"        => CreateTask(CreateTaskConfig),
    "assign_owner"       => AssignOwner(AssignOwnerConfig),
    "update_field"       => UpdateField(UpdateFieldConfig),
    "add_tag"            => AddTag(AddTagConfig),
    "webhook"            => Webhook(WebhookConfig),
    "wait"               => Wait(WaitConfig),
    "if_else"            => IfElse(IfElseConfig),
}

impl NodeConfig {
    /// Load a stored config value for `subtype`.
    ///
    /// Never fails: `null` and non-object values become an empty config, and
    /// objects that do not fit the typed fields, or would not serialize back
    /// to the same object, are kept untyped.
    pub fn from_value(subtype: Option<&str>, value: Value) -> Self {
        let map = match value {
            Value::Null => return Self::empty_for(subtype),
            Value::Object(map) => map,
            other => {
                warn!(?subtype, "ignoring non-object config: {other}");
                return Self::empty_for(subtype);
            }
        };

        let Some(subtype) = subtype else {
            return Self::Untyped(map);
        };

        match Self::parse_typed(subtype, Value::Object(map.clone())) {
            // Explicit nulls on typed fields would be dropped on the way back out.
            Some(Ok(config)) if config.to_map() == map => config,
            Some(Ok(_)) => {
                debug!(subtype, "config does not survive typing unchanged, keeping it untyped");
                Self::Untyped(map)
            }
            Some(Err(e)) => {
                warn!(
                    "config for '{}' does not fit its typed fields, keeping it untyped: {}",
                    subtype, e
                );
                Self::Untyped(map)
            }
            None => Self::Untyped(map),
        }
    }

    pub fn is_typed(&self) -> bool {
        !matches!(self, Self::Untyped(_))
    }

    /// The config as a JSON object.
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Merge form fields into the config. A `null` value clears the key.
    ///
    /// # Errors
    /// [`CatalogError::InvalidConfig`] if the result no longer fits the typed
    /// fields; the config is left unchanged in that case.
    pub fn merge(&mut self, fields: Map<String, Value>) -> Result<(), CatalogError> {
        let mut map = self.to_map();
        for (key, value) in fields {
            if value.is_null() {
                map.remove(&key);
            } else {
                map.insert(key, value);
            }
        }

        let Some(subtype) = self.subtype() else {
            *self = Self::Untyped(map);
            return Ok(());
        };

        match Self::parse_typed(subtype, Value::Object(map.clone())) {
            Some(Ok(config)) => *self = config,
            Some(Err(source)) => {
                return Err(CatalogError::InvalidConfig {
                    subtype: subtype.to_owned(),
                    source,
                })
            }
            None => *self = Self::Untyped(map),
        }
        Ok(())
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self::Untyped(Map::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn typed_config_round_trips_stored_value() {
        let stored = json!({ "days": "3" });
        let config = NodeConfig::from_value(Some("wait"), stored.clone());

        assert!(matches!(&config, NodeConfig::Wait(w) if w.days.as_deref() == Some("3")));
        assert_eq!(serde_json::to_value(&config).unwrap(), stored);
    }

    #[test]
    fn unmodelled_keys_are_preserved() {
        let stored = json!({ "templateId": "welcome", "cc": "sales@example.com" });
        let config = NodeConfig::from_value(Some("send_email"), stored.clone());

        match &config {
            NodeConfig::SendEmail(email) => {
                assert_eq!(email.template_id.as_deref(), Some("welcome"));
                assert_eq!(email.extra["cc"], "sales@example.com");
            }
            other => panic!("expected SendEmail, got {other:?}"),
        }
        assert_eq!(serde_json::to_value(&config).unwrap(), stored);
    }

    #[test]
    fn mismatched_shape_falls_back_to_untyped() {
        let stored = json!({ "days": 3 });
        let config = NodeConfig::from_value(Some("wait"), stored.clone());
        assert!(!config.is_typed());
        assert_eq!(serde_json::to_value(&config).unwrap(), stored);
    }

    #[test]
    fn null_typed_field_keeps_config_untyped() {
        let stored = json!({ "days": null });
        let config = NodeConfig::from_value(Some("wait"), stored.clone());

        assert!(!config.is_typed());
        assert_eq!(serde_json::to_value(&config).unwrap(), stored);
    }

    #[test]
    fn unknown_subtype_is_untyped() {
        let config = NodeConfig::from_value(Some("send_fax"), json!({ "number": "555" }));
        assert!(matches!(config, NodeConfig::Untyped(ref m) if m["number"] == "555"));
        assert_eq!(NodeConfig::from_value(None, Value::Null), NodeConfig::default());
    }

    #[test]
    fn merge_updates_typed_fields_and_clears_nulls() {
        let mut config = NodeConfig::from_value(
            Some("create_task"),
            json!({ "title": "Call", "assignee": "ana" }),
        );
        config
            .merge(object(json!({ "assignee": null, "dueInDays": "2" })))
            .unwrap();

        assert_eq!(config.to_map(), object(json!({ "title": "Call", "dueInDays": "2" })));
        assert_eq!(config.subtype(), Some("create_task"));
    }

    #[test]
    fn merge_rejects_wrongly_typed_field() {
        let mut config = NodeConfig::empty_for(Some("wait"));
        let err = config.merge(object(json!({ "days": 3 }))).unwrap_err();

        assert!(matches!(
            err,
            CatalogError::InvalidConfig { ref subtype, .. } if subtype == "wait"
        ));
        assert_eq!(config, NodeConfig::empty_for(Some("wait")));
    }
}
