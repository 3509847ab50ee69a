//! Namespace → prefix resolution for shape titles.
//!
//! Three layers, highest precedence first:
//! 1. project prefixes (configured per run),
//! 2. a remote prefix directory (optional, fetched once),
//! 3. the bundled table shipped with the crate.
//!
//! A directory that cannot be reached is logged and skipped; the bundled
//! table is always available.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::ShapesConfig;
use crate::error::Result;

const BUNDLED_PREFIXES: &str = include_str!("../data/prefixes.json");

/// Source of `prefix -> namespace` entries outside the process (e.g. prefix.cc).
pub trait PrefixDirectory {
    fn fetch(&self) -> anyhow::Result<BTreeMap<String, String>>;
}

type NamespaceIndex = BTreeMap<String, Vec<String>>;

fn invert(entries: &BTreeMap<String, String>) -> NamespaceIndex {
    let mut out: NamespaceIndex = BTreeMap::new();
    for (prefix, namespace) in entries {
        let prefix = prefix.trim();
        let namespace = namespace.trim();
        if prefix.is_empty() || namespace.is_empty() {
            continue;
        }
        out.entry(namespace.to_string())
            .or_default()
            .push(prefix.to_string());
    }
    out
}

#[derive(Debug, Clone, Default)]
pub struct PrefixResolver {
    project: NamespaceIndex,
    directory: NamespaceIndex,
    bundled: NamespaceIndex,
}

impl PrefixResolver {
    /// Resolver with only the bundled table.
    pub fn bundled() -> Result<Self> {
        Self::from_table_json(BUNDLED_PREFIXES)
    }

    /// Resolver from a prefix.cc-style JSON object (`{"prefix": "namespace"}`).
    pub fn from_table_json(json: &str) -> Result<Self> {
        let table: BTreeMap<String, String> = serde_json::from_str(json)?;
        Ok(Self {
            bundled: invert(&table),
            ..Self::default()
        })
    }

    /// Build the resolver a run asks for.
    pub fn for_config(
        config: &ShapesConfig,
        directory: Option<&dyn PrefixDirectory>,
    ) -> Result<Self> {
        let mut resolver = Self::bundled()?;
        if config.remote_prefixes {
            match directory {
                Some(directory) => resolver = resolver.with_directory(directory),
                None => tracing::debug!("remote prefixes requested but no directory configured"),
            }
        }
        Ok(resolver.with_project_prefixes(&config.project_prefixes))
    }

    /// Overlay entries from a remote directory; failures fall back silently.
    pub fn with_directory(mut self, directory: &dyn PrefixDirectory) -> Self {
        match directory.fetch() {
            Ok(entries) => {
                tracing::info!(entries = entries.len(), "fetched remote prefix directory");
                self.directory = invert(&entries);
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "failed to fetch remote prefix directory, using local prefixes"
                );
            }
        }
        self
    }

    pub fn with_project_prefixes(mut self, prefixes: &BTreeMap<String, String>) -> Self {
        self.project = invert(prefixes);
        self
    }

    /// All known prefixes for `namespace`, best candidate first.
    pub fn candidates(&self, namespace: &str) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        [&self.project, &self.directory, &self.bundled]
            .into_iter()
            .filter_map(|index| index.get(namespace))
            .flatten()
            .map(String::as_str)
            .filter(|p| seen.insert(*p))
            .collect()
    }

    pub fn prefix_for(&self, namespace: &str) -> Option<&str> {
        [&self.project, &self.directory, &self.bundled]
            .into_iter()
            .find_map(|index| index.get(namespace).and_then(|p| p.first()))
            .map(String::as_str)
    }
}

fn is_name_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || (!c.is_ascii() && c.is_alphabetic())
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c) || c.is_ascii_digit() || c == '-' || c == '.'
}

/// Split an IRI into namespace and local name.
///
/// The local name is the longest suffix that is a valid XML name; `None` if
/// there is none (e.g. the IRI ends with `/` or `#`).
pub fn split_iri(iri: &str) -> Option<(&str, &str)> {
    let base = iri.rfind(|c: char| !is_name_char(c))?;
    let offset = iri[base..].find(is_name_start_char)?;
    let split = base + offset;
    let (namespace, local) = iri.split_at(split);
    if local.is_empty() {
        None
    } else {
        Some((namespace, local))
    }
}

/// Local name of `iri`, or the IRI itself when it cannot be split.
pub fn local_name(iri: &str) -> &str {
    split_iri(iri).map_or(iri, |(_, local)| local)
}
