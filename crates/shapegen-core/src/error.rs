//! Error types for the shape generator.

use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, ShapesError>;

/// Failures at the graph-store boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("graph <{graph}> does not exist")]
    NotFound { graph: String },

    #[error("graph <{graph}> already exists")]
    AlreadyExists { graph: String },

    #[error("failed to parse graph <{graph}>: {message}")]
    Parse { graph: String, message: String },

    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Shape generation errors.
///
/// Everything except `ImportFailed` aborts a run before the shapes graph is
/// written. `ImportFailed` is raised after the write and never rolls it back.
#[derive(Debug, Error)]
pub enum ShapesError {
    /// Configuration fault
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Malformed graph identifier
    #[error("{role} graph IRI is invalid: {iri:?}")]
    InvalidGraphIri { role: &'static str, iri: String },

    /// Input graph could not be read
    #[error("input graph <{graph}> is unreachable: {source}")]
    GraphUnreachable {
        graph: String,
        #[source]
        source: StoreError,
    },

    /// Input graph was read but holds no facts
    #[error("input graph <{graph}> is empty")]
    EmptyGraph { graph: String },

    /// `stop` policy hit an existing output graph
    #[error("graph <{graph}> already exists")]
    GraphExists { graph: String },

    /// Reading or writing the shapes graph failed
    #[error("shapes graph store error: {0}")]
    Store(#[from] StoreError),

    /// Registering `owl:imports` in the central catalog failed
    #[error("failed to import <{shapes_graph}> into catalog <{catalog}>: {source}")]
    ImportFailed {
        shapes_graph: String,
        catalog: String,
        #[source]
        source: StoreError,
    },

    /// Prefix table or configuration JSON could not be decoded/encoded
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
