//! Catalog entries and lookup.

use serde::{Deserialize, Serialize};

use crate::CatalogError;

// ---------------------------------------------------------------------------
// NodeKind
// ---------------------------------------------------------------------------

/// The role a node plays in an automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// The single entry-point event of an automation.
    Trigger,
    /// A step executed when the automation fires.
    Action,
    /// A branching step.
    Condition,
}

impl NodeKind {
    /// `true` for every kind that can appear in the flattened step list.
    pub fn is_step(self) -> bool {
        !matches!(self, Self::Trigger)
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trigger   => write!(f, "trigger"),
            Self::Action    => write!(f, "action"),
            Self::Condition => write!(f, "condition"),
        }
    }
}

// ---------------------------------------------------------------------------
// CatalogEntry
// ---------------------------------------------------------------------------

/// Display metadata for one trigger or action subtype.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub description: &'static str,
    pub kind: NodeKind,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Read-only set of catalog entries, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Build a catalog from an explicit list of entries.
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// The catalog shipped with the editor.
    pub fn builtin() -> Self {
        Self::new(crate::builtin::entries())
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, subtype: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.id == subtype)
    }

    /// Resolve a trigger subtype.
    ///
    /// # Errors
    /// [`CatalogError::UnknownSubtype`] if `subtype` is missing or is not a trigger.
    pub fn trigger(&self, subtype: &str) -> Result<&CatalogEntry, CatalogError> {
        match self.get(subtype) {
            Some(entry) if entry.kind == NodeKind::Trigger => Ok(entry),
            _ => Err(CatalogError::UnknownSubtype {
                subtype: subtype.to_owned(),
                expected: "trigger",
            }),
        }
    }

    /// Resolve an action or condition subtype.
    ///
    /// # Errors
    /// [`CatalogError::UnknownSubtype`] if `subtype` is missing or names a trigger.
    pub fn step(&self, subtype: &str) -> Result<&CatalogEntry, CatalogError> {
        match self.get(subtype) {
            Some(entry) if entry.kind.is_step() => Ok(entry),
            _ => Err(CatalogError::UnknownSubtype {
                subtype: subtype.to_owned(),
                expected: "action",
            }),
        }
    }

    pub fn triggers(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(|e| e.kind == NodeKind::Trigger)
    }

    pub fn steps(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(|e| e.kind.is_step())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_lookup_rejects_action_subtype() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.trigger("new_lead").unwrap().name, "New Lead");
        assert!(matches!(
            catalog.trigger("send_email"),
            Err(CatalogError::UnknownSubtype { expected: "trigger", .. })
        ));
    }

    #[test]
    fn step_lookup_accepts_conditions_and_rejects_triggers() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.step("if_else").unwrap().kind, NodeKind::Condition);
        assert!(catalog.step("deal_closed").is_err());
        assert!(catalog.step("does_not_exist").is_err());
    }

    #[test]
    fn builtin_ids_are_unique() {
        let catalog = Catalog::builtin();
        let mut ids: Vec<_> = catalog.entries().iter().map(|e| e.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), catalog.entries().len());
    }
}
