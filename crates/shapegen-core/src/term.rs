//! RDF term model shared by the scanner, the synthesizer and the stores.
//!
//! Terms render in N-Triples syntax through `Display`, which is also the
//! canonical order-stable form used when graphs are compared or written.

use std::fmt;

use crate::vocab::{rdf, xsd};

/// Subject position: an IRI or a blank node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RdfNode {
    Iri(String),
    BlankNode(String),
}

impl RdfNode {
    pub fn iri(iri: impl Into<String>) -> Self {
        Self::Iri(iri.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RdfLiteral {
    pub lexical: String,
    pub datatype: Option<String>,
    pub language: Option<String>,
}

impl RdfLiteral {
    /// Plain literal without datatype or language tag.
    pub fn plain(lexical: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: None,
        }
    }

    pub fn lang(lexical: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: None,
            language: Some(language.into()),
        }
    }

    pub fn typed(lexical: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            datatype: Some(datatype.into()),
            language: None,
        }
    }

    pub fn integer(value: usize) -> Self {
        Self::typed(value.to_string(), xsd::INTEGER)
    }

    /// The datatype IRI this literal carries under RDF 1.1 rules.
    ///
    /// Untagged literals without a datatype are `xsd:string`; tagged ones are
    /// `rdf:langString`.
    pub fn effective_datatype(&self) -> &str {
        if self.language.is_some() {
            return rdf::LANG_STRING;
        }
        self.datatype.as_deref().unwrap_or(xsd::STRING)
    }

    /// True when the literal has no language tag or is tagged English.
    pub fn is_untagged_or_en(&self) -> bool {
        match &self.language {
            None => true,
            Some(lang) => lang.eq_ignore_ascii_case("en"),
        }
    }
}

/// Object position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RdfObject {
    Node(RdfNode),
    Literal(RdfLiteral),
}

impl RdfObject {
    pub fn iri(iri: impl Into<String>) -> Self {
        Self::Node(RdfNode::Iri(iri.into()))
    }

    pub fn as_node(&self) -> Option<&RdfNode> {
        match self {
            Self::Node(node) => Some(node),
            Self::Literal(_) => None,
        }
    }
}

impl From<RdfNode> for RdfObject {
    fn from(node: RdfNode) -> Self {
        Self::Node(node)
    }
}

impl From<RdfLiteral> for RdfObject {
    fn from(lit: RdfLiteral) -> Self {
        Self::Literal(lit)
    }
}

/// One `(subject, predicate, object)` fact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RdfTriple {
    pub subject: RdfNode,
    pub predicate: String,
    pub object: RdfObject,
}

impl RdfTriple {
    pub fn new(subject: RdfNode, predicate: impl Into<String>, object: impl Into<RdfObject>) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

pub(crate) fn escape_ntriples_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

impl fmt::Display for RdfNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri(iri) => write!(f, "<{iri}>"),
            Self::BlankNode(id) => write!(f, "_:{id}"),
        }
    }
}

impl fmt::Display for RdfLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", escape_ntriples_string(&self.lexical))?;
        if let Some(lang) = &self.language {
            write!(f, "@{lang}")
        } else {
            match self.datatype.as_deref() {
                Some(dt) if dt != xsd::STRING => write!(f, "^^<{dt}>"),
                _ => Ok(()),
            }
        }
    }
}

impl fmt::Display for RdfObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(node) => node.fmt(f),
            Self::Literal(lit) => lit.fmt(f),
        }
    }
}

impl fmt::Display for RdfTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> {} .", self.subject, self.predicate, self.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_datatype_defaults() {
        assert_eq!(RdfLiteral::plain("x").effective_datatype(), xsd::STRING);
        assert_eq!(RdfLiteral::lang("x", "de").effective_datatype(), rdf::LANG_STRING);
        assert_eq!(RdfLiteral::integer(3).effective_datatype(), xsd::INTEGER);
    }

    #[test]
    fn renders_ntriples_line() {
        let t = RdfTriple::new(
            RdfNode::iri("http://example.org/a"),
            "http://example.org/p",
            RdfLiteral::plain("say \"hi\"\n"),
        );
        assert_eq!(
            t.to_string(),
            r#"<http://example.org/a> <http://example.org/p> "say \"hi\"\n" ."#
        );

        let typed = RdfObject::from(RdfLiteral::integer(30));
        assert_eq!(
            typed.to_string(),
            "\"30\"^^<http://www.w3.org/2001/XMLSchema#integer>"
        );
    }

    #[test]
    fn english_tag_is_case_insensitive() {
        assert!(RdfLiteral::lang("x", "EN").is_untagged_or_en());
        assert!(RdfLiteral::plain("x").is_untagged_or_en());
        assert!(!RdfLiteral::lang("x", "fr").is_untagged_or_en());
    }
}
