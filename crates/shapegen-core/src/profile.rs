//! Class and property profiling.
//!
//! Every class observed as an `rdf:type` object gets a `ClassProfile` over
//! exactly the subjects typed with it. Each property those subjects use gets
//! a `PropertyProfile` scoped to that class: the same property under two
//! classes yields two unrelated profiles.
//!
//! Profiles are exact. Cardinality bounds come from counting every member of
//! the population (a member without the property counts 0), and value
//! constraints are only recorded when every observed value agrees:
//!
//! - one value kind → `value_kind`, otherwise nothing beyond cardinality;
//! - literals of one datatype → `datatype`;
//! - IRI/blank-node values all typed with the same single class → `class_constraint`.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::scan::ScannedGraph;
use crate::term::{RdfNode, RdfObject};
use crate::vocab::rdf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Iri,
    BlankNode,
    Literal,
}

impl ValueKind {
    fn of_node(node: &RdfNode) -> Self {
        match node {
            RdfNode::Iri(_) => Self::Iri,
            RdfNode::BlankNode(_) => Self::BlankNode,
        }
    }
}

/// Whether a profile describes facts leaving or entering class members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Outgoing,
    Inverse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyProfile {
    pub class: String,
    pub property: String,
    pub direction: Direction,
    /// Fewest values any member holds (0 if some member lacks the property).
    pub min_count: usize,
    /// Most values any member holds; an upper bound, never an equality.
    pub max_count: usize,
    pub value_kind: Option<ValueKind>,
    pub datatype: Option<String>,
    pub class_constraint: Option<String>,
    /// Total number of values observed across the population.
    pub observed_values: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassProfile {
    pub class: String,
    pub subjects: Vec<RdfNode>,
    pub properties: BTreeMap<String, PropertyProfile>,
    pub inverse_properties: BTreeMap<String, PropertyProfile>,
}

impl ClassProfile {
    pub fn population(&self) -> usize {
        self.subjects.len()
    }

    /// Outgoing profiles followed by inverse ones, each sorted by property IRI.
    pub fn property_profiles(&self) -> impl Iterator<Item = &PropertyProfile> {
        self.properties
            .values()
            .chain(self.inverse_properties.values())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ProfileOptions<'a> {
    pub ignore: &'a BTreeSet<String>,
    /// Profile `rdf:type` like any other property.
    pub model_rdf_type: bool,
    /// Also profile incoming properties.
    pub inverse: bool,
}

impl ProfileOptions<'_> {
    fn retains(&self, property: &str) -> bool {
        if self.ignore.contains(property) {
            return false;
        }
        self.model_rdf_type || property != rdf::TYPE
    }
}

/// Accumulates value characteristics for one (class, property) pair.
#[derive(Debug, Default)]
struct ValueTally<'g> {
    kinds: BTreeSet<ValueKind>,
    datatypes: BTreeSet<&'g str>,
    node_classes: BTreeSet<&'g str>,
    /// Some referenced node was untyped or carried several types.
    node_class_unresolved: bool,
    observed: usize,
}

impl<'g> ValueTally<'g> {
    fn observe_object(&mut self, scanned: &'g ScannedGraph, object: &'g RdfObject) {
        match object {
            RdfObject::Literal(lit) => {
                self.observed += 1;
                self.kinds.insert(ValueKind::Literal);
                self.datatypes.insert(lit.effective_datatype());
            }
            RdfObject::Node(node) => self.observe_node(scanned, node),
        }
    }

    fn observe_node(&mut self, scanned: &'g ScannedGraph, node: &'g RdfNode) {
        self.observed += 1;
        self.kinds.insert(ValueKind::of_node(node));
        match scanned.types_of(node) {
            Some(classes) if classes.len() == 1 => {
                self.node_classes.extend(classes.iter().map(String::as_str));
            }
            _ => self.node_class_unresolved = true,
        }
    }

    fn single_kind(&self) -> Option<ValueKind> {
        if self.kinds.len() == 1 {
            self.kinds.iter().next().copied()
        } else {
            None
        }
    }

    fn datatype(&self) -> Option<String> {
        match (self.single_kind(), self.datatypes.len()) {
            (Some(ValueKind::Literal), 1) => self.datatypes.iter().next().map(|d| d.to_string()),
            _ => None,
        }
    }

    fn class_constraint(&self) -> Option<String> {
        match self.single_kind() {
            Some(ValueKind::Iri | ValueKind::BlankNode)
                if !self.node_class_unresolved && self.node_classes.len() == 1 =>
            {
                self.node_classes.iter().next().map(|c| c.to_string())
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Bounds {
    min: usize,
    max: usize,
}

impl Bounds {
    fn over(counts: impl IntoIterator<Item = usize>) -> Self {
        let mut bounds: Option<Bounds> = None;
        for count in counts {
            bounds = Some(match bounds {
                None => Bounds {
                    min: count,
                    max: count,
                },
                Some(b) => Bounds {
                    min: b.min.min(count),
                    max: b.max.max(count),
                },
            });
        }
        bounds.unwrap_or(Bounds { min: 0, max: 0 })
    }
}

fn finish(
    class: &str,
    property: &str,
    direction: Direction,
    bounds: Bounds,
    tally: &ValueTally<'_>,
) -> PropertyProfile {
    PropertyProfile {
        class: class.to_string(),
        property: property.to_string(),
        direction,
        min_count: bounds.min,
        max_count: bounds.max,
        value_kind: tally.single_kind(),
        datatype: tally.datatype(),
        class_constraint: tally.class_constraint(),
        observed_values: tally.observed,
    }
}

/// Profile one outgoing property over a class population.
pub fn profile_property(
    scanned: &ScannedGraph,
    class: &str,
    population: &[&RdfNode],
    property: &str,
) -> PropertyProfile {
    let mut tally = ValueTally::default();
    let bounds = Bounds::over(population.iter().map(|subject| {
        let values = scanned.values(subject, property);
        for value in values {
            tally.observe_object(scanned, value);
        }
        values.len()
    }));
    finish(class, property, Direction::Outgoing, bounds, &tally)
}

/// Profile one incoming property: the values are the subjects pointing at members.
pub fn profile_inverse_property(
    scanned: &ScannedGraph,
    class: &str,
    population: &[&RdfNode],
    property: &str,
) -> PropertyProfile {
    let mut tally = ValueTally::default();
    let bounds = Bounds::over(population.iter().map(|member| {
        let referrers = scanned.referrers(member, property);
        for referrer in referrers {
            tally.observe_node(scanned, referrer);
        }
        referrers.len()
    }));
    finish(class, property, Direction::Inverse, bounds, &tally)
}

/// Profile one class: its population and every retained property.
pub fn profile_class(
    scanned: &ScannedGraph,
    class: &str,
    population: &[&RdfNode],
    options: ProfileOptions<'_>,
) -> ClassProfile {
    let outgoing: BTreeSet<&str> = population
        .iter()
        .filter_map(|subject| scanned.outgoing(subject))
        .flat_map(|props| props.keys().map(String::as_str))
        .filter(|p| options.retains(p))
        .collect();

    let properties = outgoing
        .into_iter()
        .map(|p| {
            (
                p.to_string(),
                profile_property(scanned, class, population, p),
            )
        })
        .collect();

    let inverse_properties = if options.inverse {
        let incoming: BTreeSet<&str> = population
            .iter()
            .filter_map(|member| scanned.incoming(member))
            .flat_map(|props| props.keys().map(String::as_str))
            .filter(|p| options.retains(p))
            .collect();
        incoming
            .into_iter()
            .map(|p| {
                (
                    p.to_string(),
                    profile_inverse_property(scanned, class, population, p),
                )
            })
            .collect()
    } else {
        BTreeMap::new()
    };

    ClassProfile {
        class: class.to_string(),
        subjects: population.iter().map(|s| (*s).clone()).collect(),
        properties,
        inverse_properties,
    }
}

/// Profile every class in the scanned graph, ordered by class IRI.
pub fn profile_classes(scanned: &ScannedGraph, options: ProfileOptions<'_>) -> Vec<ClassProfile> {
    let profiles: Vec<ClassProfile> = scanned
        .class_populations()
        .into_iter()
        .map(|(class, population)| {
            let profile = profile_class(scanned, class, &population, options);
            tracing::debug!(
                class,
                population = profile.population(),
                properties = profile.properties.len(),
                inverse_properties = profile.inverse_properties.len(),
                "profiled class"
            );
            profile
        })
        .collect();
    tracing::info!(classes = profiles.len(), "profiled classes");
    profiles
}
