//! Run configuration.
//!
//! `ShapesConfig` can be deserialized from JSON (missing fields fall back to
//! defaults) and is serialized verbatim into provenance blocks.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, ShapesError};

/// Default central shapes catalog that `owl:imports` statements are added to.
pub const DEFAULT_CENTRAL_CATALOG: &str = "https://vocab.eccenca.com/shacl/";

/// Default remote prefix directory (prefix.cc JSON dump).
pub const DEFAULT_PREFIX_DIRECTORY: &str = "http://prefix.cc/popular/all.file.json";

/// What to do when the output shapes graph already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExistingGraphPolicy {
    /// Discard the existing graph and write a fresh one.
    Replace,
    /// Add the new shapes next to the existing ones.
    Append,
    /// Abort before writing anything.
    #[default]
    Stop,
}

impl ExistingGraphPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Append => "append",
            Self::Stop => "stop",
        }
    }
}

impl fmt::Display for ExistingGraphPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExistingGraphPolicy {
    type Err = ShapesError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(Self::Replace),
            "append" => Ok(Self::Append),
            "stop" => Ok(Self::Stop),
            other => Err(ShapesError::InvalidConfig(format!(
                "unknown existing-graph policy {other:?} (expected replace, append or stop)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapesConfig {
    /// Input data graph
    pub data_graph_iri: String,
    /// Output SHACL shapes graph
    pub shapes_graph_iri: String,
    /// Catalog label; generated from the data graph IRI when absent
    pub label: Option<String>,
    pub existing_graph: ExistingGraphPolicy,
    /// Add `owl:imports` for the shapes graph to the central catalog
    pub import_shapes: bool,
    pub central_catalog_iri: String,
    /// Overlay the bundled prefix table with the remote prefix directory
    pub remote_prefixes: bool,
    pub prefix_directory_url: String,
    /// Project prefixes (prefix -> namespace); they win over every other source
    pub project_prefixes: BTreeMap<String, String>,
    /// Properties that never get a property shape
    pub ignore_properties: Vec<String>,
    /// Attach a provenance block to the shapes graph
    pub include_provenance: bool,
    /// Profile `rdf:type` like any other property
    pub model_rdf_type: bool,
    /// Also profile incoming properties of class members
    pub inverse_properties: bool,
}

impl Default for ShapesConfig {
    fn default() -> Self {
        Self {
            data_graph_iri: String::new(),
            shapes_graph_iri: String::new(),
            label: None,
            existing_graph: ExistingGraphPolicy::default(),
            import_shapes: false,
            central_catalog_iri: DEFAULT_CENTRAL_CATALOG.to_string(),
            remote_prefixes: false,
            prefix_directory_url: DEFAULT_PREFIX_DIRECTORY.to_string(),
            project_prefixes: BTreeMap::new(),
            ignore_properties: Vec::new(),
            include_provenance: false,
            model_rdf_type: false,
            inverse_properties: false,
        }
    }
}

impl ShapesConfig {
    pub fn new(data_graph_iri: impl Into<String>, shapes_graph_iri: impl Into<String>) -> Self {
        Self {
            data_graph_iri: data_graph_iri.into(),
            shapes_graph_iri: shapes_graph_iri.into(),
            ..Self::default()
        }
    }

    /// Load a JSON config file.
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Check graph identifiers and option values.
    pub fn validate(&self) -> Result<()> {
        if !is_valid_iri(&self.shapes_graph_iri) {
            return Err(ShapesError::InvalidGraphIri {
                role: "shapes",
                iri: self.shapes_graph_iri.clone(),
            });
        }
        if !is_absolute_iri(&self.data_graph_iri) {
            return Err(ShapesError::InvalidGraphIri {
                role: "data",
                iri: self.data_graph_iri.clone(),
            });
        }
        if self.import_shapes && !is_absolute_iri(&self.central_catalog_iri) {
            return Err(ShapesError::InvalidGraphIri {
                role: "central catalog",
                iri: self.central_catalog_iri.clone(),
            });
        }
        if self.data_graph_iri == self.shapes_graph_iri {
            return Err(ShapesError::InvalidConfig(
                "data graph and shapes graph must differ".to_string(),
            ));
        }
        if let Some(label) = &self.label {
            if label.trim().is_empty() {
                return Err(ShapesError::InvalidConfig(
                    "catalog label must not be blank".to_string(),
                ));
            }
        }
        for (prefix, namespace) in &self.project_prefixes {
            if prefix.trim().is_empty() || !is_absolute_iri(namespace) {
                return Err(ShapesError::InvalidConfig(format!(
                    "invalid project prefix {prefix:?} -> {namespace:?}"
                )));
            }
        }
        Ok(())
    }

    /// Ignore-list as a lookup set.
    pub fn ignore_set(&self) -> BTreeSet<String> {
        self.ignore_properties
            .iter()
            .filter_map(|s| normalize_ignore_entry(s))
            .collect()
    }
}

fn normalize_ignore_entry(line: &str) -> Option<String> {
    let line = line.trim();
    let line = line
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .unwrap_or(line)
        .trim();
    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}

/// Parse a newline-delimited ignore-list.
///
/// Blank and whitespace-only lines are skipped; `<...>` brackets are
/// stripped; duplicates collapse while first-seen order is kept.
pub fn parse_ignore_list(text: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for line in text.lines() {
        let Some(entry) = normalize_ignore_entry(line) else {
            continue;
        };
        if seen.insert(entry.clone()) {
            out.push(entry);
        }
    }
    out
}

fn urn_regex() -> &'static Regex {
    static URN: OnceLock<Regex> = OnceLock::new();
    // RFC 2141: "urn:" NID ":" NSS
    URN.get_or_init(|| {
        Regex::new(r"(?i)^urn:[a-z0-9][a-z0-9-]{1,31}:[a-z0-9()+,\-.:=@;$_!*'%/?#]+$")
            .expect("URN regex is valid")
    })
}

/// Strict IRI check used for the output shapes graph.
///
/// Accepts hierarchical URLs (`http`, `https`, `ftp`) that spell out `://`
/// and name a host, and RFC 2141 URNs.
pub fn is_valid_iri(iri: &str) -> bool {
    if iri.is_empty() || iri.chars().any(char::is_whitespace) {
        return false;
    }
    if iri.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("urn:")) {
        return urn_regex().is_match(iri);
    }
    let Some((scheme, rest)) = iri.split_once("://") else {
        return false;
    };
    if rest.is_empty() {
        return false;
    }
    match Url::parse(iri) {
        Ok(url) => {
            url.scheme().eq_ignore_ascii_case(scheme)
                && matches!(url.scheme(), "http" | "https" | "ftp")
                && url.host_str().is_some_and(|h| !h.is_empty())
        }
        Err(_) => false,
    }
}

/// Lenient check: any absolute IRI with a scheme and no whitespace.
pub fn is_absolute_iri(iri: &str) -> bool {
    !iri.is_empty() && !iri.chars().any(char::is_whitespace) && Url::parse(iri).is_ok()
}
