//! Graph-store boundary.
//!
//! The engine reads the input graph and reads/writes the shapes graph through
//! `GraphStore`. Both calls are one-shot and blocking; nothing streams.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::StoreError;
use crate::term::RdfTriple;

/// How `write_graph` treats an existing target graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Fail with `AlreadyExists` if the graph exists.
    Create,
    /// Overwrite (or create) the graph.
    Replace,
    /// Union the triples into the graph (or create it).
    Add,
}

pub trait GraphStore {
    fn graph_exists(&self, graph: &str) -> Result<bool, StoreError>;

    /// Every fact of `graph`; `NotFound` when it does not exist.
    fn read_graph(&self, graph: &str) -> Result<Vec<RdfTriple>, StoreError>;

    /// Write `triples` to `graph`; returns whether the graph existed before.
    fn write_graph(
        &mut self,
        graph: &str,
        triples: &[RdfTriple],
        mode: WriteMode,
    ) -> Result<bool, StoreError>;

    fn list_graphs(&self) -> Result<Vec<String>, StoreError>;
}

/// Set-semantics union of two triple collections, sorted.
pub fn union_triples(existing: Vec<RdfTriple>, added: &[RdfTriple]) -> Vec<RdfTriple> {
    let mut set: BTreeSet<RdfTriple> = existing.into_iter().collect();
    set.extend(added.iter().cloned());
    set.into_iter().collect()
}

/// In-process store keyed by graph IRI.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    graphs: BTreeMap<String, BTreeSet<RdfTriple>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a graph directly (replaces any previous content).
    pub fn insert_graph(&mut self, graph: impl Into<String>, triples: Vec<RdfTriple>) {
        self.graphs.insert(graph.into(), triples.into_iter().collect());
    }

    pub fn triple_count(&self, graph: &str) -> usize {
        self.graphs.get(graph).map_or(0, BTreeSet::len)
    }
}

impl GraphStore for MemoryStore {
    fn graph_exists(&self, graph: &str) -> Result<bool, StoreError> {
        Ok(self.graphs.contains_key(graph))
    }

    fn read_graph(&self, graph: &str) -> Result<Vec<RdfTriple>, StoreError> {
        self.graphs
            .get(graph)
            .map(|triples| triples.iter().cloned().collect())
            .ok_or_else(|| StoreError::NotFound {
                graph: graph.to_string(),
            })
    }

    fn write_graph(
        &mut self,
        graph: &str,
        triples: &[RdfTriple],
        mode: WriteMode,
    ) -> Result<bool, StoreError> {
        let existed = self.graphs.contains_key(graph);
        match mode {
            WriteMode::Create if existed => {
                return Err(StoreError::AlreadyExists {
                    graph: graph.to_string(),
                })
            }
            WriteMode::Create | WriteMode::Replace => {
                self.graphs
                    .insert(graph.to_string(), triples.iter().cloned().collect());
            }
            WriteMode::Add => {
                self.graphs
                    .entry(graph.to_string())
                    .or_default()
                    .extend(triples.iter().cloned());
            }
        }
        Ok(existed)
    }

    fn list_graphs(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.graphs.keys().cloned().collect())
    }
}
