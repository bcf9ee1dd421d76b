//! `catalog` crate: the static trigger/action catalog and typed step configuration.
//!
//! Every node placed in the editor references a [`CatalogEntry`] by its
//! subtype id. The editor crate resolves entries through [`Catalog`] and keeps
//! each node's parameters in a [`NodeConfig`].

pub mod error;
pub mod entry;
mod builtin;
pub mod config;

pub use error::CatalogError;
pub use entry::{Catalog, CatalogEntry, NodeKind};
pub use config::NodeConfig;
