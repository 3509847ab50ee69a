//! Shapegen core: infer SHACL shapes from instance data.
//!
//! A run reads one data graph through a [`GraphStore`], derives a node shape
//! per observed class and a property shape per observed property, and writes
//! the result as a shapes catalog graph.
//!
//! ## Pipeline
//!
//! - `scan`: index the data graph (types, outgoing and incoming facts, labels)
//! - `profile`: cardinality, node kind, datatype and class per property
//! - `synth`: node/property shapes with deterministic UUIDv5 IRIs
//! - `catalog`: reconcile with an existing shapes graph (replace/append/stop)
//! - `engine`: the orchestration, plus the optional `owl:imports` step
//!
//! Parsing RDF files and persisting graphs on disk live in `shapegen-rdf`.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod prefixes;
pub mod profile;
pub mod scan;
pub mod store;
pub mod synth;
pub mod term;
pub mod vocab;

pub use catalog::{CatalogLabel, CatalogState};
pub use config::{ExistingGraphPolicy, ShapesConfig};
pub use engine::{ImportOutcome, RunSummary, ShapesEngine};
pub use error::{Result, ShapesError, StoreError};
pub use prefixes::{PrefixDirectory, PrefixResolver};
pub use store::{GraphStore, MemoryStore, WriteMode};
pub use term::{RdfLiteral, RdfNode, RdfObject, RdfTriple};
