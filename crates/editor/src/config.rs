//! Editor tuning knobs.

use serde::{Deserialize, Serialize};

use crate::models::Position;

/// How steps are ordered when the graph is flattened for saving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOrdering {
    /// Walk connections from the trigger; position only breaks ties.
    #[default]
    Topology,
    /// Sort by vertical canvas position, ignoring connections.
    Vertical,
}

/// Layout and ordering settings for an editor session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EditorConfig {
    /// Vertical gap between a new step and the lowest node on the canvas.
    pub vertical_spacing: f64,
    /// Where the trigger is placed when an editor opens.
    pub trigger_position: Position,
    pub ordering: ActionOrdering,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            vertical_spacing: 150.0,
            trigger_position: Position::new(250.0, 100.0),
            ordering: ActionOrdering::Topology,
        }
    }
}
