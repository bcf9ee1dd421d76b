//! `editor` crate: the workflow graph model behind the visual automation editor.
//!
//! Graph stores, the gesture-level session, step ordering, and the serializer
//! that turns a graph into the definition handed to an [`AutomationSink`].

pub mod models;
pub mod error;
pub mod config;
pub mod graph;
pub mod order;
pub mod serializer;
pub mod sink;
pub mod mock;
pub mod session;
pub mod commands;

pub use models::{Connection, Node, NodePatch, Position};
pub use error::EditorError;
pub use config::{ActionOrdering, EditorConfig};
pub use graph::WorkflowGraph;
pub use serializer::{ActionDefinition, AutomationDefinition, ExistingAutomation};
pub use sink::{AutomationSink, SaveReceipt, SinkError};
pub use session::{EditorSession, EditorState, Notice, NoticeLevel};
pub use commands::EditorCommand;
