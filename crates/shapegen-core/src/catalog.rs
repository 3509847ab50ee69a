//! Catalog merger: reconcile synthesized shapes with an existing shapes graph.
//!
//! | policy  | graph absent | graph present                               |
//! |---------|--------------|---------------------------------------------|
//! | replace | fresh write  | discard old graph, fresh write (`created`)  |
//! | append  | fresh write  | merge into old graph (`modified`)           |
//! | stop    | fresh write  | abort with `GraphExists`, nothing written   |
//!
//! Catalog metadata (label, `dcterms:source`, timestamps) hangs off the shapes
//! graph IRI itself, never off individual shapes.
//!
//! ## Label grammar
//!
//! ```text
//! label    := keyword (":" ws* | ws+) iri-list ws*
//! keyword  := "shapes for"            ; ASCII case-insensitive
//! iri-list := iri *( ws* "," ws* iri )
//! iri      := 1*( any char except whitespace and "," ), containing ":"
//! ```
//!
//! Labels are always rendered as `Shapes for: <iri>, <iri>`.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::ExistingGraphPolicy;
use crate::error::{Result, ShapesError};
use crate::store::WriteMode;
use crate::synth::{timestamp_literal, ShapeGraph};
use crate::term::{RdfLiteral, RdfNode, RdfObject, RdfTriple};
use crate::vocab::{dcterms, rdf, rdfs, sh, shui};

/// Parsed canonical catalog label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogLabel {
    graphs: Vec<String>,
}

impl CatalogLabel {
    const KEYWORD: &'static str = "shapes for";

    pub fn for_graph(iri: &str) -> Self {
        Self {
            graphs: vec![iri.to_string()],
        }
    }

    pub fn graphs(&self) -> &[String] {
        &self.graphs
    }

    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let keyword = text.get(..Self::KEYWORD.len())?;
        if !keyword.eq_ignore_ascii_case(Self::KEYWORD) {
            return None;
        }
        let rest = &text[Self::KEYWORD.len()..];
        let rest = match rest.strip_prefix(':') {
            Some(after_colon) => after_colon,
            None if rest.starts_with(char::is_whitespace) => rest,
            None => return None,
        };

        let mut graphs = Vec::new();
        for item in rest.split(',') {
            let item = item.trim();
            if item.is_empty() || item.contains(char::is_whitespace) || !item.contains(':') {
                return None;
            }
            graphs.push(item.to_string());
        }
        Some(Self { graphs })
    }

    /// Add a graph IRI; returns false if it was already listed.
    pub fn push(&mut self, iri: &str) -> bool {
        if self.graphs.iter().any(|g| g == iri) {
            return false;
        }
        self.graphs.push(iri.to_string());
        true
    }
}

impl fmt::Display for CatalogLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shapes for: {}", self.graphs.join(", "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogState {
    Absent,
    Present,
}

/// Inputs the merger needs besides the graphs themselves.
#[derive(Debug, Clone, Copy)]
pub struct MergeContext<'a> {
    pub shapes_graph_iri: &'a str,
    pub data_graph_iri: &'a str,
    /// Explicitly configured label; `None` means the canonical one.
    pub label: Option<&'a str>,
    pub policy: ExistingGraphPolicy,
    pub now: DateTime<Utc>,
}

/// What to write, and how.
#[derive(Debug, Clone)]
pub struct MergePlan {
    pub previous: CatalogState,
    pub mode: WriteMode,
    pub triples: Vec<RdfTriple>,
}

/// Decide how the synthesized shapes land in the shapes graph.
///
/// `existing` is the current content of the shapes graph, `None` if absent.
/// Under `stop` a present graph is an error and nothing is planned.
pub fn plan_merge(
    ctx: &MergeContext<'_>,
    existing: Option<Vec<RdfTriple>>,
    shapes: ShapeGraph,
    extra: Vec<RdfTriple>,
) -> Result<MergePlan> {
    let plan = match (existing, ctx.policy) {
        (None, _) => MergePlan {
            previous: CatalogState::Absent,
            mode: WriteMode::Create,
            triples: fresh_graph(ctx, shapes, extra),
        },
        (Some(_), ExistingGraphPolicy::Stop) => {
            return Err(ShapesError::GraphExists {
                graph: ctx.shapes_graph_iri.to_string(),
            })
        }
        (Some(_), ExistingGraphPolicy::Replace) => MergePlan {
            previous: CatalogState::Present,
            mode: WriteMode::Replace,
            triples: fresh_graph(ctx, shapes, extra),
        },
        (Some(existing), ExistingGraphPolicy::Append) => MergePlan {
            previous: CatalogState::Present,
            // the merged graph is complete, labels may have been rewritten
            mode: WriteMode::Replace,
            triples: appended_graph(ctx, existing, shapes, extra),
        },
    };
    tracing::info!(
        graph = ctx.shapes_graph_iri,
        policy = %ctx.policy,
        previous = ?plan.previous,
        triples = plan.triples.len(),
        "planned catalog write"
    );
    Ok(plan)
}

fn catalog_node(ctx: &MergeContext<'_>) -> RdfNode {
    RdfNode::iri(ctx.shapes_graph_iri)
}

fn fresh_graph(ctx: &MergeContext<'_>, shapes: ShapeGraph, extra: Vec<RdfTriple>) -> Vec<RdfTriple> {
    let catalog = catalog_node(ctx);
    let label = ctx
        .label
        .map(str::to_string)
        .unwrap_or_else(|| CatalogLabel::for_graph(ctx.data_graph_iri).to_string());

    let mut graph: BTreeSet<RdfTriple> = BTreeSet::new();
    graph.insert(RdfTriple::new(
        catalog.clone(),
        rdf::TYPE,
        RdfObject::iri(shui::SHAPE_CATALOG),
    ));
    graph.insert(RdfTriple::new(catalog.clone(), rdfs::LABEL, RdfLiteral::plain(label)));
    graph.insert(RdfTriple::new(
        catalog.clone(),
        dcterms::SOURCE,
        RdfObject::iri(ctx.data_graph_iri),
    ));
    graph.insert(RdfTriple::new(catalog, dcterms::CREATED, timestamp_literal(ctx.now)));
    graph.extend(shapes.triples);
    graph.extend(extra);
    graph.into_iter().collect()
}

fn appended_graph(
    ctx: &MergeContext<'_>,
    existing: Vec<RdfTriple>,
    shapes: ShapeGraph,
    extra: Vec<RdfTriple>,
) -> Vec<RdfTriple> {
    let catalog = catalog_node(ctx);
    let mut graph: BTreeSet<RdfTriple> = existing.into_iter().collect();

    graph.retain(|t| !(t.subject == catalog && t.predicate == dcterms::MODIFIED));
    graph.insert(RdfTriple::new(
        catalog.clone(),
        rdf::TYPE,
        RdfObject::iri(shui::SHAPE_CATALOG),
    ));
    graph.insert(RdfTriple::new(
        catalog.clone(),
        dcterms::SOURCE,
        RdfObject::iri(ctx.data_graph_iri),
    ));
    graph.insert(RdfTriple::new(
        catalog.clone(),
        dcterms::MODIFIED,
        timestamp_literal(ctx.now),
    ));
    reconcile_labels(&mut graph, &catalog, ctx);
    drop_regenerated_shapes(&mut graph, &shapes);

    graph.extend(shapes.triples);
    graph.extend(extra);
    graph.into_iter().collect()
}

/// Remove the previous definition of every shape the new run regenerates,
/// together with the property shapes its node shapes pointed at.
///
/// A shape node only ever carries the constraints of its latest run.
fn drop_regenerated_shapes(graph: &mut BTreeSet<RdfTriple>, shapes: &ShapeGraph) {
    let regenerated: BTreeSet<&RdfNode> = shapes.triples.iter().map(|t| &t.subject).collect();
    let mut stale: BTreeSet<RdfNode> = graph
        .iter()
        .filter(|t| t.predicate == sh::PROPERTY && regenerated.contains(&t.subject))
        .filter_map(|t| match &t.object {
            RdfObject::Node(node) => Some(node.clone()),
            RdfObject::Literal(_) => None,
        })
        .collect();
    stale.extend(regenerated.into_iter().cloned());

    let before = graph.len();
    graph.retain(|t| !stale.contains(&t.subject));
    tracing::debug!(
        shapes = stale.len(),
        triples = before - graph.len(),
        "dropped previous definitions of regenerated shapes"
    );
}

fn move_to_comment(graph: &mut BTreeSet<RdfTriple>, label: &RdfTriple) {
    graph.remove(label);
    graph.insert(RdfTriple::new(
        label.subject.clone(),
        rdfs::COMMENT,
        label.object.clone(),
    ));
}

/// Rewrite the untagged/English catalog labels for an append.
///
/// Labels in other languages are never touched.
fn reconcile_labels(graph: &mut BTreeSet<RdfTriple>, catalog: &RdfNode, ctx: &MergeContext<'_>) {
    let participating: Vec<(RdfTriple, RdfLiteral)> = graph
        .iter()
        .filter(|t| &t.subject == catalog && t.predicate == rdfs::LABEL)
        .filter_map(|t| match &t.object {
            RdfObject::Literal(lit) if lit.is_untagged_or_en() => Some((t.clone(), lit.clone())),
            _ => None,
        })
        .collect();

    if let Some(explicit) = ctx.label {
        let mut present = false;
        for (triple, lit) in &participating {
            if lit.lexical == explicit {
                present = true;
            } else {
                move_to_comment(graph, triple);
            }
        }
        if !present {
            graph.insert(RdfTriple::new(
                catalog.clone(),
                rdfs::LABEL,
                RdfLiteral::plain(explicit),
            ));
        }
        return;
    }

    let mut canonical_found = false;
    for (triple, lit) in participating {
        match CatalogLabel::parse(&lit.lexical) {
            Some(mut parsed) => {
                canonical_found = true;
                if parsed.push(ctx.data_graph_iri) {
                    tracing::debug!(label = %parsed, "extended catalog label");
                    graph.remove(&triple);
                    graph.insert(RdfTriple::new(
                        catalog.clone(),
                        rdfs::LABEL,
                        RdfLiteral {
                            lexical: parsed.to_string(),
                            ..lit
                        },
                    ));
                }
            }
            None => {
                tracing::debug!(label = %lit.lexical, "kept non-canonical catalog label as comment");
                move_to_comment(graph, &triple);
            }
        }
    }
    if !canonical_found {
        graph.insert(RdfTriple::new(
            catalog.clone(),
            rdfs::LABEL,
            RdfLiteral::plain(CatalogLabel::for_graph(ctx.data_graph_iri).to_string()),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SHAPES: &str = "https://example.org/shapes/";

    fn ctx(data: &str, policy: ExistingGraphPolicy) -> MergeContext<'_> {
        MergeContext {
            shapes_graph_iri: SHAPES,
            data_graph_iri: data,
            label: None,
            policy,
            now: Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap(),
        }
    }

    fn catalog_objects(triples: &[RdfTriple], predicate: &str) -> Vec<RdfObject> {
        triples
            .iter()
            .filter(|t| t.subject == RdfNode::iri(SHAPES) && t.predicate == predicate)
            .map(|t| t.object.clone())
            .collect()
    }

    fn labeled(label: RdfLiteral) -> Vec<RdfTriple> {
        vec![
            RdfTriple::new(RdfNode::iri(SHAPES), rdfs::LABEL, label),
            RdfTriple::new(RdfNode::iri(SHAPES), dcterms::SOURCE, RdfObject::iri("urn:g1")),
        ]
    }

    fn shape_triple() -> RdfTriple {
        RdfTriple::new(
            RdfNode::iri(format!("{SHAPES}s1")),
            rdf::TYPE,
            RdfObject::iri(crate::vocab::sh::NODE_SHAPE),
        )
    }

    fn shapes() -> ShapeGraph {
        ShapeGraph {
            triples: vec![shape_triple()],
            node_shapes: 1,
            property_shapes: 0,
        }
    }

    #[test]
    fn parses_canonical_labels() {
        let label = CatalogLabel::parse("Shapes for: urn:g1, https://example.org/g2").unwrap();
        assert_eq!(label.graphs(), ["urn:g1", "https://example.org/g2"]);
        assert_eq!(label.to_string(), "Shapes for: urn:g1, https://example.org/g2");

        assert!(CatalogLabel::parse("shapes FOR:urn:g1").is_some());
        assert!(CatalogLabel::parse("Shapes for urn:g1").is_some());
        assert!(CatalogLabel::parse("Shapes for: my data").is_none());
        assert!(CatalogLabel::parse("Shapes for: urn:g1,").is_none());
        assert!(CatalogLabel::parse("Shapes forever: urn:g1").is_none());
        assert!(CatalogLabel::parse("My shapes").is_none());
    }

    #[test]
    fn push_ignores_duplicates() {
        let mut label = CatalogLabel::for_graph("urn:g1");
        assert!(!label.push("urn:g1"));
        assert!(label.push("urn:g2"));
        assert_eq!(label.to_string(), "Shapes for: urn:g1, urn:g2");
    }

    #[test]
    fn absent_graph_gets_fresh_header() {
        let plan = plan_merge(&ctx("urn:g1", ExistingGraphPolicy::Stop), None, shapes(), vec![])
            .unwrap();
        assert_eq!(plan.previous, CatalogState::Absent);
        assert_eq!(plan.mode, WriteMode::Create);
        assert_eq!(
            catalog_objects(&plan.triples, rdfs::LABEL),
            vec![RdfObject::from(RdfLiteral::plain("Shapes for: urn:g1"))]
        );
        assert_eq!(catalog_objects(&plan.triples, dcterms::CREATED).len(), 1);
        assert!(catalog_objects(&plan.triples, dcterms::MODIFIED).is_empty());
        assert!(plan.triples.contains(&shape_triple()));
    }

    #[test]
    fn stop_refuses_existing_graph() {
        let err = plan_merge(
            &ctx("urn:g2", ExistingGraphPolicy::Stop),
            Some(labeled(RdfLiteral::plain("Shapes for: urn:g1"))),
            shapes(),
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, ShapesError::GraphExists { .. }));
    }

    #[test]
    fn replace_discards_old_content() {
        let plan = plan_merge(
            &ctx("urn:g2", ExistingGraphPolicy::Replace),
            Some(labeled(RdfLiteral::plain("Old"))),
            shapes(),
            vec![],
        )
        .unwrap();
        assert_eq!(plan.mode, WriteMode::Replace);
        assert_eq!(
            catalog_objects(&plan.triples, dcterms::SOURCE),
            vec![RdfObject::iri("urn:g2")]
        );
        assert!(catalog_objects(&plan.triples, rdfs::COMMENT).is_empty());
        assert_eq!(catalog_objects(&plan.triples, dcterms::CREATED).len(), 1);
    }

    #[test]
    fn append_extends_canonical_label_and_sources() {
        let plan = plan_merge(
            &ctx("urn:g2", ExistingGraphPolicy::Append),
            Some(labeled(RdfLiteral::plain("Shapes for: urn:g1"))),
            shapes(),
            vec![],
        )
        .unwrap();
        assert_eq!(
            catalog_objects(&plan.triples, rdfs::LABEL),
            vec![RdfObject::from(RdfLiteral::plain("Shapes for: urn:g1, urn:g2"))]
        );
        assert_eq!(
            catalog_objects(&plan.triples, dcterms::SOURCE),
            vec![RdfObject::iri("urn:g1"), RdfObject::iri("urn:g2")]
        );
        assert_eq!(catalog_objects(&plan.triples, dcterms::MODIFIED).len(), 1);
    }

    #[test]
    fn append_keeps_language_tag_of_english_label() {
        let plan = plan_merge(
            &ctx("urn:g2", ExistingGraphPolicy::Append),
            Some(labeled(RdfLiteral::lang("Shapes for: urn:g1", "en"))),
            shapes(),
            vec![],
        )
        .unwrap();
        assert_eq!(
            catalog_objects(&plan.triples, rdfs::LABEL),
            vec![RdfObject::from(RdfLiteral::lang("Shapes for: urn:g1, urn:g2", "en"))]
        );
    }

    #[test]
    fn append_moves_custom_label_to_comment() {
        let plan = plan_merge(
            &ctx("urn:g2", ExistingGraphPolicy::Append),
            Some(labeled(RdfLiteral::plain("Hand-made shapes"))),
            shapes(),
            vec![],
        )
        .unwrap();
        assert_eq!(
            catalog_objects(&plan.triples, rdfs::COMMENT),
            vec![RdfObject::from(RdfLiteral::plain("Hand-made shapes"))]
        );
        assert_eq!(
            catalog_objects(&plan.triples, rdfs::LABEL),
            vec![RdfObject::from(RdfLiteral::plain("Shapes for: urn:g2"))]
        );
    }

    #[test]
    fn append_leaves_other_languages_alone() {
        let mut existing = labeled(RdfLiteral::lang("Formes pour urn:g1", "fr"));
        existing.push(RdfTriple::new(
            RdfNode::iri(SHAPES),
            rdfs::LABEL,
            RdfLiteral::plain("Shapes for: urn:g1"),
        ));
        let plan = plan_merge(
            &ctx("urn:g2", ExistingGraphPolicy::Append),
            Some(existing),
            shapes(),
            vec![],
        )
        .unwrap();
        let labels = catalog_objects(&plan.triples, rdfs::LABEL);
        assert!(labels.contains(&RdfLiteral::lang("Formes pour urn:g1", "fr").into()));
        assert!(labels.contains(&RdfLiteral::plain("Shapes for: urn:g1, urn:g2").into()));
        assert_eq!(labels.len(), 2);
    }

    #[test]
    fn append_same_source_twice_is_idempotent() {
        let first = plan_merge(
            &ctx("urn:g1", ExistingGraphPolicy::Append),
            Some(labeled(RdfLiteral::plain("Shapes for: urn:g1"))),
            shapes(),
            vec![],
        )
        .unwrap();
        assert_eq!(catalog_objects(&first.triples, dcterms::SOURCE).len(), 1);
        assert_eq!(
            catalog_objects(&first.triples, rdfs::LABEL),
            vec![RdfObject::from(RdfLiteral::plain("Shapes for: urn:g1"))]
        );
    }

    #[test]
    fn explicit_label_on_append_replaces_english_labels() {
        let mut context = ctx("urn:g2", ExistingGraphPolicy::Append);
        context.label = Some("Customer shapes");
        let plan = plan_merge(
            &context,
            Some(labeled(RdfLiteral::plain("Shapes for: urn:g1"))),
            shapes(),
            vec![],
        )
        .unwrap();
        assert_eq!(
            catalog_objects(&plan.triples, rdfs::LABEL),
            vec![RdfObject::from(RdfLiteral::plain("Customer shapes"))]
        );
        assert_eq!(
            catalog_objects(&plan.triples, rdfs::COMMENT),
            vec![RdfObject::from(RdfLiteral::plain("Shapes for: urn:g1"))]
        );
    }

    #[test]
    fn append_redefines_regenerated_shapes() {
        let node = RdfNode::iri(format!("{SHAPES}s1"));
        let old_prop = RdfNode::iri(format!("{SHAPES}p-old"));
        let kept = RdfNode::iri(format!("{SHAPES}other"));
        let mut existing = labeled(RdfLiteral::plain("Shapes for: urn:g1"));
        existing.extend([
            shape_triple(),
            RdfTriple::new(node.clone(), sh::PROPERTY, old_prop.clone()),
            RdfTriple::new(old_prop.clone(), sh::MIN_COUNT, RdfLiteral::integer(1)),
            RdfTriple::new(old_prop.clone(), sh::MAX_COUNT, RdfLiteral::integer(1)),
            RdfTriple::new(kept.clone(), rdf::TYPE, RdfObject::iri(sh::NODE_SHAPE)),
        ]);

        let plan = plan_merge(
            &ctx("urn:g1", ExistingGraphPolicy::Append),
            Some(existing),
            shapes(),
            vec![],
        )
        .unwrap();
        assert!(!plan.triples.iter().any(|t| t.subject == old_prop));
        assert!(!plan.triples.iter().any(|t| t.predicate == sh::PROPERTY));
        assert!(plan.triples.contains(&shape_triple()));
        assert!(plan.triples.iter().any(|t| t.subject == kept));
    }
}
