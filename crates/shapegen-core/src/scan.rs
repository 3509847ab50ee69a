//! Triple scanner: one full pass over the input graph.
//!
//! Produces the subject → type-set index plus per-subject outgoing and
//! incoming fact indexes that the profiler reads. Subjects without
//! `rdf:type` are indexed but contribute to no class.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Result, ShapesError};
use crate::store::GraphStore;
use crate::term::{RdfNode, RdfObject, RdfTriple};
use crate::vocab::{rdf, rdfs, skos};

/// Indexed view of an instance graph.
#[derive(Debug, Clone, Default)]
pub struct ScannedGraph {
    fact_count: usize,
    types: BTreeMap<RdfNode, BTreeSet<String>>,
    outgoing: BTreeMap<RdfNode, BTreeMap<String, Vec<RdfObject>>>,
    incoming: BTreeMap<RdfNode, BTreeMap<String, Vec<RdfNode>>>,
    labels: BTreeMap<String, String>,
}

/// Read the input graph from `store` and index it.
///
/// Fails with `GraphUnreachable` when the store cannot produce the graph and
/// with `EmptyGraph` when it holds no facts.
pub fn scan_graph(store: &dyn GraphStore, graph: &str) -> Result<ScannedGraph> {
    let triples = store
        .read_graph(graph)
        .map_err(|source| ShapesError::GraphUnreachable {
            graph: graph.to_string(),
            source,
        })?;
    if triples.is_empty() {
        return Err(ShapesError::EmptyGraph {
            graph: graph.to_string(),
        });
    }
    let scanned = ScannedGraph::from_triples(triples);
    tracing::info!(
        graph,
        facts = scanned.fact_count(),
        subjects = scanned.outgoing.len(),
        typed_subjects = scanned.types.len(),
        "scanned input graph"
    );
    Ok(scanned)
}

impl ScannedGraph {
    pub fn from_triples(mut triples: Vec<RdfTriple>) -> Self {
        // A graph is a set; repeated facts must not inflate counts.
        triples.sort();
        triples.dedup();

        let mut out = Self {
            fact_count: triples.len(),
            ..Self::default()
        };
        let mut label_candidates: BTreeMap<String, BTreeSet<(u8, String)>> = BTreeMap::new();

        for triple in triples {
            let RdfTriple {
                subject,
                predicate,
                object,
            } = triple;

            if predicate == rdf::TYPE {
                if let RdfObject::Node(RdfNode::Iri(class)) = &object {
                    out.types
                        .entry(subject.clone())
                        .or_default()
                        .insert(class.clone());
                }
            }

            if let (RdfNode::Iri(iri), RdfObject::Literal(lit)) = (&subject, &object) {
                let rank = match predicate.as_str() {
                    rdfs::LABEL => Some(0),
                    skos::PREF_LABEL => Some(1),
                    _ => None,
                };
                if let Some(rank) = rank.filter(|_| lit.is_untagged_or_en()) {
                    label_candidates
                        .entry(iri.clone())
                        .or_default()
                        .insert((rank, lit.lexical.clone()));
                }
            }

            if let RdfObject::Node(target) = &object {
                out.incoming
                    .entry(target.clone())
                    .or_default()
                    .entry(predicate.clone())
                    .or_default()
                    .push(subject.clone());
            }

            out.outgoing
                .entry(subject)
                .or_default()
                .entry(predicate)
                .or_default()
                .push(object);
        }

        out.labels = label_candidates
            .into_iter()
            .filter_map(|(iri, candidates)| {
                candidates.into_iter().next().map(|(_, label)| (iri, label))
            })
            .collect();
        out
    }

    pub fn fact_count(&self) -> usize {
        self.fact_count
    }

    pub fn is_empty(&self) -> bool {
        self.fact_count == 0
    }

    /// Every class with its population, keyed and ordered by class IRI.
    ///
    /// A subject with several types appears in several populations.
    pub fn class_populations(&self) -> BTreeMap<&str, Vec<&RdfNode>> {
        let mut out: BTreeMap<&str, Vec<&RdfNode>> = BTreeMap::new();
        for (subject, classes) in &self.types {
            for class in classes {
                out.entry(class.as_str()).or_default().push(subject);
            }
        }
        out
    }

    /// Classes asserted for `node`; `None` when untyped.
    pub fn types_of(&self, node: &RdfNode) -> Option<&BTreeSet<String>> {
        self.types.get(node)
    }

    /// Outgoing properties of `node` with their values.
    pub fn outgoing(&self, node: &RdfNode) -> Option<&BTreeMap<String, Vec<RdfObject>>> {
        self.outgoing.get(node)
    }

    pub fn values(&self, node: &RdfNode, property: &str) -> &[RdfObject] {
        self.outgoing
            .get(node)
            .and_then(|props| props.get(property))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Incoming properties of `node` with the subjects pointing at it.
    pub fn incoming(&self, node: &RdfNode) -> Option<&BTreeMap<String, Vec<RdfNode>>> {
        self.incoming.get(node)
    }

    pub fn referrers(&self, node: &RdfNode, property: &str) -> &[RdfNode] {
        self.incoming
            .get(node)
            .and_then(|props| props.get(property))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Human label the data graph itself gives `iri` (untagged or English).
    pub fn label(&self, iri: &str) -> Option<&str> {
        self.labels.get(iri).map(String::as_str)
    }
}
