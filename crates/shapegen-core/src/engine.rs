//! One shape-generation run, end to end.
//!
//! validate → scan → existing-graph check → profile → synthesize → merge →
//! write → import. Every failure before the write leaves the store untouched.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::catalog::{plan_merge, CatalogState, MergeContext};
use crate::config::{ExistingGraphPolicy, ShapesConfig};
use crate::error::{Result, ShapesError};
use crate::prefixes::PrefixResolver;
use crate::profile::{profile_classes, ProfileOptions};
use crate::scan::scan_graph;
use crate::store::{GraphStore, WriteMode};
use crate::synth::{provenance_triples, ShapeSynthesizer, ToolIdentity};
use crate::term::{RdfNode, RdfObject, RdfTriple};
use crate::vocab::owl;

/// Result of the optional central-catalog registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImportOutcome {
    Skipped,
    Imported { catalog: String },
    /// The shapes graph was written; only the `owl:imports` link is missing.
    Failed { catalog: String, message: String },
}

impl ImportOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub data_graph: String,
    pub shapes_graph: String,
    /// Distinct classes with at least one member
    pub classes: usize,
    pub node_shapes: usize,
    pub property_shapes: usize,
    pub previous_state: CatalogState,
    pub policy: ExistingGraphPolicy,
    pub triples_written: usize,
    pub import: ImportOutcome,
}

pub struct ShapesEngine {
    config: ShapesConfig,
    prefixes: PrefixResolver,
    tool: ToolIdentity,
}

impl ShapesEngine {
    /// Engine for a validated configuration.
    pub fn new(config: ShapesConfig, prefixes: PrefixResolver) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            prefixes,
            tool: ToolIdentity::default(),
        })
    }

    pub fn run(&self, store: &mut dyn GraphStore, now: DateTime<Utc>) -> Result<RunSummary> {
        let config = &self.config;
        let shapes_iri = config.shapes_graph_iri.as_str();

        let scanned = scan_graph(&*store, &config.data_graph_iri)?;

        let existing = if store.graph_exists(shapes_iri)? {
            match config.existing_graph {
                ExistingGraphPolicy::Stop => {
                    return Err(ShapesError::GraphExists {
                        graph: shapes_iri.to_string(),
                    })
                }
                ExistingGraphPolicy::Replace => Some(Vec::new()),
                ExistingGraphPolicy::Append => Some(store.read_graph(shapes_iri)?),
            }
        } else {
            None
        };

        let ignore = config.ignore_set();
        let profiles = profile_classes(
            &scanned,
            ProfileOptions {
                ignore: &ignore,
                model_rdf_type: config.model_rdf_type,
                inverse: config.inverse_properties,
            },
        );
        let shapes = ShapeSynthesizer::new(
            &config.data_graph_iri,
            shapes_iri,
            &self.prefixes,
            &scanned,
            &ignore,
        )
        .synthesize(&profiles);
        let (node_shapes, property_shapes) = (shapes.node_shapes, shapes.property_shapes);

        let extra = if config.include_provenance {
            provenance_triples(shapes_iri, &self.tool, config, now)?
        } else {
            Vec::new()
        };

        let plan = plan_merge(
            &MergeContext {
                shapes_graph_iri: shapes_iri,
                data_graph_iri: &config.data_graph_iri,
                label: config.label.as_deref(),
                policy: config.existing_graph,
                now,
            },
            existing,
            shapes,
            extra,
        )?;
        store.write_graph(shapes_iri, &plan.triples, plan.mode)?;
        tracing::info!(
            graph = shapes_iri,
            triples = plan.triples.len(),
            "wrote shapes graph"
        );

        let import = if config.import_shapes {
            match self.import_into_catalog(store) {
                Ok(()) => ImportOutcome::Imported {
                    catalog: config.central_catalog_iri.clone(),
                },
                Err(err) => {
                    tracing::warn!(error = %err, "shapes graph written but not imported");
                    ImportOutcome::Failed {
                        catalog: config.central_catalog_iri.clone(),
                        message: err.to_string(),
                    }
                }
            }
        } else {
            ImportOutcome::Skipped
        };

        Ok(RunSummary {
            data_graph: config.data_graph_iri.clone(),
            shapes_graph: config.shapes_graph_iri.clone(),
            classes: profiles.len(),
            node_shapes,
            property_shapes,
            previous_state: plan.previous,
            policy: config.existing_graph,
            triples_written: plan.triples.len(),
            import,
        })
    }

    /// Add `<catalog> owl:imports <shapes>` to the central catalog.
    fn import_into_catalog(&self, store: &mut dyn GraphStore) -> Result<()> {
        let catalog = &self.config.central_catalog_iri;
        let link = RdfTriple::new(
            RdfNode::iri(catalog.as_str()),
            owl::IMPORTS,
            RdfObject::iri(self.config.shapes_graph_iri.as_str()),
        );
        store
            .write_graph(catalog, &[link], WriteMode::Add)
            .map_err(|source| ShapesError::ImportFailed {
                shapes_graph: self.config.shapes_graph_iri.clone(),
                catalog: catalog.clone(),
                source,
            })?;
        Ok(())
    }
}
