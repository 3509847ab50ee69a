//! RDF boundary for shapegen.
//!
//! - Parses RDF files into the shapegen term model using **Sophia**:
//!   N-Triples (`.nt`), Turtle (`.ttl`), N-Quads (`.nq`), TriG (`.trig`) and
//!   RDF/XML (`.rdf`, `.owl`, `.xml`).
//! - Writes graphs back out as sorted N-Triples.
//! - Provides [`DirectoryStore`], a `GraphStore` that keeps one N-Triples
//!   file per named graph.
//!
//! Quad formats are flattened: graph names in the file are dropped and every
//! statement lands in the graph the caller loads into.

pub mod store;

pub use store::DirectoryStore;

use anyhow::{anyhow, Result};
use shapegen_core::term::{RdfLiteral, RdfNode, RdfObject, RdfTriple};
use shapegen_core::vocab::xsd;
use sophia::api::prelude::*;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfFormat {
    NTriples,
    Turtle,
    NQuads,
    TriG,
    RdfXml,
}

impl RdfFormat {
    /// Guess the serialization from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "nt" | "ntriples" => Ok(Self::NTriples),
            "ttl" | "turtle" => Ok(Self::Turtle),
            "nq" | "nquads" => Ok(Self::NQuads),
            "trig" => Ok(Self::TriG),
            "rdf" | "owl" | "xml" => Ok(Self::RdfXml),
            other => Err(anyhow!("unsupported RDF format: .{other}")),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
struct RdfSinkError {
    message: String,
}

impl From<anyhow::Error> for RdfSinkError {
    fn from(value: anyhow::Error) -> Self {
        Self {
            message: value.to_string(),
        }
    }
}

// ============================================================================
// Term parsing (Sophia display form → shapegen terms)
// ============================================================================

fn unescape_rdf_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn parse_term_display(term: &str) -> Result<RdfObject> {
    let s = term.trim();

    if let Some(iri) = s.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
        return Ok(RdfObject::iri(iri));
    }
    if let Some(label) = s.strip_prefix("_:") {
        return Ok(RdfObject::Node(RdfNode::BlankNode(label.to_string())));
    }
    if !s.starts_with('"') {
        return Err(anyhow!("unsupported RDF term form: {s}"));
    }

    let mut end_quote = None;
    let mut escaped = false;
    for (i, ch) in s.char_indices().skip(1) {
        if ch == '"' && !escaped {
            end_quote = Some(i);
            break;
        }
        escaped = ch == '\\' && !escaped;
    }
    let Some(end) = end_quote else {
        return Err(anyhow!("invalid literal term (missing closing quote): {s}"));
    };

    let lexical = unescape_rdf_string(&s[1..end]);
    let rest = s[end + 1..].trim();
    if let Some(lang) = rest.strip_prefix('@') {
        return Ok(RdfLiteral::lang(lexical, lang).into());
    }
    let datatype = rest
        .strip_prefix("^^")
        .map(str::trim)
        .map(|dt| dt.strip_prefix('<').and_then(|t| t.strip_suffix('>')).unwrap_or(dt))
        .filter(|dt| !dt.is_empty() && *dt != xsd::STRING);
    Ok(match datatype {
        Some(dt) => RdfLiteral::typed(lexical, dt),
        None => RdfLiteral::plain(lexical),
    }
    .into())
}

fn parse_node_term_display(term: &str) -> Result<RdfNode> {
    match parse_term_display(term)? {
        RdfObject::Node(node) => Ok(node),
        RdfObject::Literal(_) => Err(anyhow!("expected IRI/blank node, got literal: {term}")),
    }
}

/// One statement from display-form terms; `None` for non-IRI predicates.
fn statement(s: &str, p: &str, o: &str) -> std::result::Result<Option<RdfTriple>, RdfSinkError> {
    let subject = parse_node_term_display(s)?;
    let RdfNode::Iri(predicate) = parse_node_term_display(p)? else {
        return Ok(None);
    };
    let object = parse_term_display(o)?;
    Ok(Some(RdfTriple::new(subject, predicate, object)))
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse RDF bytes in `format` into triples, in document order.
pub fn parse_rdf(bytes: &[u8], format: RdfFormat) -> Result<Vec<RdfTriple>> {
    let reader = std::io::BufReader::new(std::io::Cursor::new(bytes));
    let mut out: Vec<RdfTriple> = Vec::new();

    match format {
        RdfFormat::NTriples => {
            sophia::turtle::parser::nt::parse_bufread(reader)
                .try_for_each_triple(|t| -> std::result::Result<(), RdfSinkError> {
                    out.extend(statement(
                        &t.s().to_string(),
                        &t.p().to_string(),
                        &t.o().to_string(),
                    )?);
                    Ok(())
                })
                .map_err(|e| anyhow!("failed to parse N-Triples: {e}"))?;
        }
        RdfFormat::Turtle => {
            sophia::turtle::parser::turtle::parse_bufread(reader)
                .try_for_each_triple(|t| -> std::result::Result<(), RdfSinkError> {
                    out.extend(statement(
                        &t.s().to_string(),
                        &t.p().to_string(),
                        &t.o().to_string(),
                    )?);
                    Ok(())
                })
                .map_err(|e| anyhow!("failed to parse Turtle: {e}"))?;
        }
        RdfFormat::NQuads => {
            sophia::turtle::parser::nq::parse_bufread(reader)
                .try_for_each_quad(|q| -> std::result::Result<(), RdfSinkError> {
                    out.extend(statement(
                        &q.s().to_string(),
                        &q.p().to_string(),
                        &q.o().to_string(),
                    )?);
                    Ok(())
                })
                .map_err(|e| anyhow!("failed to parse N-Quads: {e}"))?;
        }
        RdfFormat::TriG => {
            sophia::turtle::parser::trig::parse_bufread(reader)
                .try_for_each_quad(|q| -> std::result::Result<(), RdfSinkError> {
                    out.extend(statement(
                        &q.s().to_string(),
                        &q.p().to_string(),
                        &q.o().to_string(),
                    )?);
                    Ok(())
                })
                .map_err(|e| anyhow!("failed to parse TriG: {e}"))?;
        }
        RdfFormat::RdfXml => {
            sophia::xml::parser::parse_bufread(reader)
                .try_for_each_triple(|t| -> std::result::Result<(), RdfSinkError> {
                    out.extend(statement(
                        &t.s().to_string(),
                        &t.p().to_string(),
                        &t.o().to_string(),
                    )?);
                    Ok(())
                })
                .map_err(|e| anyhow!("failed to parse RDF/XML: {e}"))?;
        }
    }
    Ok(out)
}

pub fn parse_rdf_file(path: &Path) -> Result<Vec<RdfTriple>> {
    let format = RdfFormat::from_path(path)?;
    let bytes = std::fs::read(path)?;
    let triples = parse_rdf(&bytes, format)?;
    tracing::debug!(path = %path.display(), triples = triples.len(), "parsed RDF file");
    Ok(triples)
}

// ============================================================================
// Output
// ============================================================================

/// Write triples as N-Triples, one per line, sorted and deduplicated.
pub fn write_ntriples(triples: &[RdfTriple], out: &mut dyn Write) -> std::io::Result<()> {
    let mut lines: Vec<String> = triples.iter().map(ToString::to_string).collect();
    lines.sort();
    lines.dedup();
    for line in lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

pub fn to_ntriples_string(triples: &[RdfTriple]) -> String {
    let mut buf = Vec::new();
    // writing into a Vec cannot fail
    let _ = write_ntriples(triples, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}
