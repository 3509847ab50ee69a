//! On-disk graph store: one N-Triples file per named graph.
//!
//! ```text
//! <root>/
//!   graphs.json          graph IRI -> file name
//!   <uuid5(iri)>.nt      graph content, sorted N-Triples
//! ```
//!
//! Writes go through a temp file and a rename, so a graph file is either the
//! old or the new content.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shapegen_core::store::{union_triples, GraphStore, WriteMode};
use shapegen_core::term::{RdfNode, RdfObject, RdfTriple};
use shapegen_core::StoreError;
use uuid::Uuid;

use crate::{parse_rdf, parse_rdf_file, write_ntriples, RdfFormat};

const INDEX_FILE: &str = "graphs.json";
const INDEX_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GraphIndex {
    version: u32,
    graphs: BTreeMap<String, String>,
}

impl Default for GraphIndex {
    fn default() -> Self {
        Self {
            version: INDEX_VERSION,
            graphs: BTreeMap::new(),
        }
    }
}

#[derive(Debug)]
pub struct DirectoryStore {
    root: PathBuf,
    index: GraphIndex,
}

impl DirectoryStore {
    /// Open (or initialize) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        let index_path = root.join(INDEX_FILE);
        let index = if index_path.exists() {
            let text = fs::read_to_string(&index_path)?;
            let index: GraphIndex = serde_json::from_str(&text)
                .map_err(|e| anyhow::anyhow!("corrupt graph index {}: {e}", index_path.display()))?;
            if index.version != INDEX_VERSION {
                return Err(StoreError::Other(anyhow::anyhow!(
                    "unsupported graph index version {} (expected {INDEX_VERSION})",
                    index.version
                )));
            }
            index
        } else {
            GraphIndex::default()
        };
        tracing::debug!(root = %root.display(), graphs = index.graphs.len(), "opened graph store");
        Ok(Self { root, index })
    }

    fn file_name(graph: &str) -> String {
        format!("{}.nt", Uuid::new_v5(&Uuid::NAMESPACE_URL, graph.as_bytes()))
    }

    fn graph_path(&self, graph: &str) -> Option<PathBuf> {
        self.index.graphs.get(graph).map(|file| self.root.join(file))
    }

    fn save_index(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.index).map_err(anyhow::Error::from)?;
        let tmp = self.root.join(format!("{INDEX_FILE}.tmp"));
        fs::write(&tmp, json)?;
        fs::rename(&tmp, self.root.join(INDEX_FILE))?;
        Ok(())
    }

    fn write_file(&self, path: &Path, triples: &[RdfTriple]) -> Result<(), StoreError> {
        let tmp = path.with_extension("nt.tmp");
        {
            let mut out = BufWriter::new(fs::File::create(&tmp)?);
            write_ntriples(triples, &mut out)?;
            std::io::Write::flush(&mut out)?;
        }
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Parse an RDF file and store it as `graph`; returns the number of facts
    /// the graph holds afterwards.
    pub fn load_file(&mut self, graph: &str, path: &Path, mode: WriteMode) -> Result<usize, StoreError> {
        let mut triples = parse_rdf_file(path).map_err(|e| StoreError::Parse {
            graph: graph.to_string(),
            message: format!("{}: {e}", path.display()),
        })?;
        if mode == WriteMode::Add && self.graph_exists(graph)? {
            let existing = self.read_graph(graph)?;
            triples = separate_blank_nodes(triples, &existing);
        }
        self.write_graph(graph, &triples, mode)?;
        let count = self.read_graph(graph)?.len();
        tracing::info!(graph, path = %path.display(), triples = count, "loaded graph");
        Ok(count)
    }

    /// Remove a graph; returns whether it existed.
    pub fn drop_graph(&mut self, graph: &str) -> Result<bool, StoreError> {
        let Some(file) = self.index.graphs.remove(graph) else {
            return Ok(false);
        };
        let path = self.root.join(file);
        if path.exists() {
            fs::remove_file(path)?;
        }
        self.save_index()?;
        Ok(true)
    }
}

fn blank_labels(triple: &RdfTriple) -> impl Iterator<Item = &str> {
    let subject = match &triple.subject {
        RdfNode::BlankNode(label) => Some(label.as_str()),
        RdfNode::Iri(_) => None,
    };
    let object = match &triple.object {
        RdfObject::Node(RdfNode::BlankNode(label)) => Some(label.as_str()),
        _ => None,
    };
    subject.into_iter().chain(object)
}

/// Rename the blank nodes of a file merged into an existing graph.
///
/// Labels are scoped to one file, so each merge gets a fresh `g<n>_` prefix
/// with `n` above every generation already present in the graph.
fn separate_blank_nodes(triples: Vec<RdfTriple>, existing: &[RdfTriple]) -> Vec<RdfTriple> {
    let generation = existing
        .iter()
        .flat_map(blank_labels)
        .filter_map(|label| label.strip_prefix('g')?.split_once('_')?.0.parse::<u64>().ok())
        .max()
        .map_or(1, |n| n + 1);
    let prefix = format!("g{generation}_");

    let relabel = |node: RdfNode| match node {
        RdfNode::BlankNode(label) => RdfNode::BlankNode(format!("{prefix}{label}")),
        iri => iri,
    };
    triples
        .into_iter()
        .map(|t| RdfTriple {
            subject: relabel(t.subject),
            predicate: t.predicate,
            object: match t.object {
                RdfObject::Node(node) => RdfObject::Node(relabel(node)),
                literal => literal,
            },
        })
        .collect()
}

impl GraphStore for DirectoryStore {
    fn graph_exists(&self, graph: &str) -> Result<bool, StoreError> {
        Ok(self.index.graphs.contains_key(graph))
    }

    fn read_graph(&self, graph: &str) -> Result<Vec<RdfTriple>, StoreError> {
        let path = self.graph_path(graph).ok_or_else(|| StoreError::NotFound {
            graph: graph.to_string(),
        })?;
        let bytes = fs::read(&path)?;
        parse_rdf(&bytes, RdfFormat::NTriples).map_err(|e| StoreError::Parse {
            graph: graph.to_string(),
            message: e.to_string(),
        })
    }

    fn write_graph(
        &mut self,
        graph: &str,
        triples: &[RdfTriple],
        mode: WriteMode,
    ) -> Result<bool, StoreError> {
        let existed = self.graph_exists(graph)?;
        let content = match mode {
            WriteMode::Create if existed => {
                return Err(StoreError::AlreadyExists {
                    graph: graph.to_string(),
                })
            }
            WriteMode::Add if existed => union_triples(self.read_graph(graph)?, triples),
            WriteMode::Create | WriteMode::Replace | WriteMode::Add => triples
                .iter()
                .cloned()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
        };

        let file = Self::file_name(graph);
        self.write_file(&self.root.join(&file), &content)?;
        if !existed {
            self.index.graphs.insert(graph.to_string(), file);
            self.save_index()?;
        }
        tracing::debug!(graph, triples = content.len(), ?mode, "wrote graph");
        Ok(existed)
    }

    fn list_graphs(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.index.graphs.keys().cloned().collect())
    }
}
