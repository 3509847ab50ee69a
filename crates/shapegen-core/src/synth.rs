//! Shape synthesis: class profiles → SHACL node and property shapes.
//!
//! Shape IRIs are minted deterministically under the shapes graph namespace
//! from UUIDv5 (URL namespace) hashes of the data graph, class and property,
//! so rerunning over the same data yields the same shapes while shapes of
//! different data graphs never share a node.

use std::collections::BTreeSet;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::config::ShapesConfig;
use crate::error::Result;
use crate::prefixes::{local_name, split_iri, PrefixResolver};
use crate::profile::{ClassProfile, Direction, PropertyProfile, ValueKind};
use crate::scan::ScannedGraph;
use crate::term::{RdfLiteral, RdfNode, RdfObject, RdfTriple};
use crate::vocab::{prov, rdf, rdfs, sh, shapegen, shui, xsd};

/// Add `/` to a graph IRI unless it already ends with `/` or `#`.
pub fn shapes_namespace(iri: &str) -> String {
    if iri.ends_with('/') || iri.ends_with('#') {
        iri.to_string()
    } else {
        format!("{iri}/")
    }
}

fn uuid5(name: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, name.as_bytes())
}

pub(crate) fn timestamp_literal(now: DateTime<Utc>) -> RdfLiteral {
    RdfLiteral::typed(now.to_rfc3339_opts(SecondsFormat::Secs, true), xsd::DATE_TIME)
}

/// Freshly synthesized shapes, before any catalog metadata is attached.
#[derive(Debug, Clone, Default)]
pub struct ShapeGraph {
    pub triples: Vec<RdfTriple>,
    pub node_shapes: usize,
    pub property_shapes: usize,
}

/// Who produced a shapes graph; recorded in the provenance block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolIdentity {
    pub name: String,
    pub version: String,
    pub iri: String,
}

impl Default for ToolIdentity {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            iri: shapegen::TOOL.to_string(),
        }
    }
}

pub struct ShapeSynthesizer<'a> {
    data_graph: &'a str,
    namespace: String,
    prefixes: &'a PrefixResolver,
    scanned: &'a ScannedGraph,
    ignore: &'a BTreeSet<String>,
}

impl<'a> ShapeSynthesizer<'a> {
    pub fn new(
        data_graph_iri: &'a str,
        shapes_graph_iri: &str,
        prefixes: &'a PrefixResolver,
        scanned: &'a ScannedGraph,
        ignore: &'a BTreeSet<String>,
    ) -> Self {
        Self {
            data_graph: data_graph_iri,
            namespace: shapes_namespace(shapes_graph_iri),
            prefixes,
            scanned,
            ignore,
        }
    }

    pub fn node_shape_iri(&self, class: &str) -> String {
        let key = format!("{} {class}", self.data_graph);
        format!("{}{}", self.namespace, uuid5(&key))
    }

    pub fn property_shape_iri(&self, profile: &PropertyProfile) -> String {
        let key = match profile.direction {
            Direction::Outgoing => {
                format!("{} {} {}", self.data_graph, profile.class, profile.property)
            }
            Direction::Inverse => format!(
                "{} {} {} inverse",
                self.data_graph, profile.class, profile.property
            ),
        };
        format!("{}{}", self.namespace, uuid5(&key))
    }

    /// Display title: the data graph's own label or the local name, plus the
    /// namespace prefix when one is known, e.g. `name (foaf:)`.
    pub fn title(&self, iri: &str) -> String {
        let mut title = self
            .scanned
            .label(iri)
            .unwrap_or_else(|| local_name(iri))
            .to_string();
        if let Some(prefix) = split_iri(iri).and_then(|(ns, _)| self.prefixes.prefix_for(ns)) {
            title.push_str(&format!(" ({prefix}:)"));
        }
        title
    }

    pub fn synthesize(&self, profiles: &[ClassProfile]) -> ShapeGraph {
        let mut out = ShapeGraph::default();
        for class in profiles {
            self.node_shape(class, &mut out);
        }
        tracing::info!(
            node_shapes = out.node_shapes,
            property_shapes = out.property_shapes,
            triples = out.triples.len(),
            "synthesized shapes"
        );
        out
    }

    fn named(&self, out: &mut ShapeGraph, subject: &RdfNode, title: &str) {
        out.triples.push(RdfTriple::new(
            subject.clone(),
            sh::NAME,
            RdfLiteral::lang(title, "en"),
        ));
        out.triples.push(RdfTriple::new(
            subject.clone(),
            rdfs::LABEL,
            RdfLiteral::lang(title, "en"),
        ));
    }

    fn node_shape(&self, class: &ClassProfile, out: &mut ShapeGraph) {
        let shape = RdfNode::Iri(self.node_shape_iri(&class.class));
        out.triples
            .push(RdfTriple::new(shape.clone(), rdf::TYPE, RdfObject::iri(sh::NODE_SHAPE)));
        out.triples.push(RdfTriple::new(
            shape.clone(),
            sh::TARGET_CLASS,
            RdfObject::iri(class.class.as_str()),
        ));
        self.named(out, &shape, &self.title(&class.class));
        out.node_shapes += 1;

        let retained = class
            .property_profiles()
            .filter(|p| !self.ignore.contains(&p.property));
        for (order, profile) in retained.enumerate() {
            let property_shape = self.property_shape(profile, order, out);
            out.triples
                .push(RdfTriple::new(shape.clone(), sh::PROPERTY, property_shape));
        }
    }

    fn property_shape(&self, profile: &PropertyProfile, order: usize, out: &mut ShapeGraph) -> RdfNode {
        let shape = RdfNode::Iri(self.property_shape_iri(profile));
        let mut add = |predicate: &str, object: RdfObject| {
            out.triples
                .push(RdfTriple::new(shape.clone(), predicate, object));
        };

        add(rdf::TYPE, RdfObject::iri(sh::PROPERTY_SHAPE));
        add(sh::PATH, RdfObject::iri(profile.property.as_str()));
        if profile.direction == Direction::Inverse {
            add(
                shui::INVERSE_PATH,
                RdfLiteral::typed("true", xsd::BOOLEAN).into(),
            );
        }
        add(sh::MIN_COUNT, RdfLiteral::integer(profile.min_count).into());
        add(sh::MAX_COUNT, RdfLiteral::integer(profile.max_count).into());
        if let Some(kind) = profile.value_kind {
            let node_kind = match kind {
                ValueKind::Iri => sh::IRI,
                ValueKind::BlankNode => sh::BLANK_NODE,
                ValueKind::Literal => sh::LITERAL,
            };
            add(sh::NODE_KIND, RdfObject::iri(node_kind));
        }
        if let Some(datatype) = &profile.datatype {
            add(sh::DATATYPE, RdfObject::iri(datatype.as_str()));
        }
        if let Some(class) = &profile.class_constraint {
            add(sh::CLASS, RdfObject::iri(class.as_str()));
        }
        add(sh::ORDER, RdfLiteral::integer(order).into());

        let mut title = self.title(&profile.property);
        if profile.direction == Direction::Inverse {
            title.insert_str(0, "← ");
        }
        self.named(out, &shape, &title);
        out.property_shapes += 1;
        shape
    }
}

/// Provenance block: which tool and which configuration produced the graph.
pub fn provenance_triples(
    shapes_graph_iri: &str,
    tool: &ToolIdentity,
    config: &ShapesConfig,
    now: DateTime<Utc>,
) -> Result<Vec<RdfTriple>> {
    let started = timestamp_literal(now);
    let activity = RdfNode::Iri(format!(
        "{}provenance/{}",
        shapes_namespace(shapes_graph_iri),
        uuid5(&format!("{shapes_graph_iri} {}", started.lexical))
    ));
    let configuration = serde_json::to_string(config)?;

    Ok(vec![
        RdfTriple::new(
            RdfNode::iri(shapes_graph_iri),
            prov::WAS_GENERATED_BY,
            activity.clone(),
        ),
        RdfTriple::new(activity.clone(), rdf::TYPE, RdfObject::iri(prov::ACTIVITY)),
        RdfTriple::new(
            activity.clone(),
            prov::WAS_ASSOCIATED_WITH,
            RdfObject::iri(tool.iri.as_str()),
        ),
        RdfTriple::new(
            activity.clone(),
            rdfs::LABEL,
            RdfLiteral::plain(format!("{} {}", tool.name, tool.version)),
        ),
        RdfTriple::new(activity.clone(), prov::STARTED_AT_TIME, started),
        RdfTriple::new(
            activity,
            shapegen::CONFIGURATION,
            RdfLiteral::plain(configuration),
        ),
    ])
}
