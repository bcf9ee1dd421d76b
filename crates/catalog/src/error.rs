//! Catalog-level error type.

use thiserror::Error;

/// Errors returned when resolving subtypes or editing typed configuration.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The subtype is not in the catalog, or names an entry of the wrong kind.
    #[error("unknown {expected} subtype: '{subtype}'")]
    UnknownSubtype {
        subtype: String,
        expected: &'static str,
    },

    /// A configuration edit does not fit the subtype's typed fields.
    #[error("invalid config for '{subtype}': {source}")]
    InvalidConfig {
        subtype: String,
        #[source]
        source: serde_json::Error,
    },
}
