//! RDF vocabulary constants used by the shape generator.
//!
//! Constants are organized by vocabulary:
//! - `rdf` - RDF vocabulary (http://www.w3.org/1999/02/22-rdf-syntax-ns#)
//! - `rdfs` - RDFS vocabulary (http://www.w3.org/2000/01/rdf-schema#)
//! - `xsd` - XSD vocabulary (http://www.w3.org/2001/XMLSchema#)
//! - `sh` - SHACL vocabulary (http://www.w3.org/ns/shacl#)
//! - `dcterms`, `owl`, `prov`, `skos`, `shui` - catalog metadata

/// RDF vocabulary constants
pub mod rdf {
    /// rdf:type IRI
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

    /// rdf:langString IRI (datatype of language-tagged literals)
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
}

/// RDFS vocabulary constants
pub mod rdfs {
    pub const LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
    pub const COMMENT: &str = "http://www.w3.org/2000/01/rdf-schema#comment";
}

/// XSD vocabulary constants
pub mod xsd {
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
}

/// SHACL vocabulary constants
pub mod sh {
    pub const NODE_SHAPE: &str = "http://www.w3.org/ns/shacl#NodeShape";
    pub const PROPERTY_SHAPE: &str = "http://www.w3.org/ns/shacl#PropertyShape";
    pub const TARGET_CLASS: &str = "http://www.w3.org/ns/shacl#targetClass";
    pub const PROPERTY: &str = "http://www.w3.org/ns/shacl#property";
    pub const PATH: &str = "http://www.w3.org/ns/shacl#path";
    pub const MIN_COUNT: &str = "http://www.w3.org/ns/shacl#minCount";
    pub const MAX_COUNT: &str = "http://www.w3.org/ns/shacl#maxCount";
    pub const DATATYPE: &str = "http://www.w3.org/ns/shacl#datatype";
    pub const CLASS: &str = "http://www.w3.org/ns/shacl#class";
    pub const NODE_KIND: &str = "http://www.w3.org/ns/shacl#nodeKind";
    pub const ORDER: &str = "http://www.w3.org/ns/shacl#order";
    pub const NAME: &str = "http://www.w3.org/ns/shacl#name";

    /// Node kind values
    pub const IRI: &str = "http://www.w3.org/ns/shacl#IRI";
    pub const BLANK_NODE: &str = "http://www.w3.org/ns/shacl#BlankNode";
    pub const LITERAL: &str = "http://www.w3.org/ns/shacl#Literal";
}

/// Dublin Core terms used for catalog metadata
pub mod dcterms {
    pub const CREATED: &str = "http://purl.org/dc/terms/created";
    pub const MODIFIED: &str = "http://purl.org/dc/terms/modified";
    pub const SOURCE: &str = "http://purl.org/dc/terms/source";
}

/// OWL vocabulary constants
pub mod owl {
    pub const IMPORTS: &str = "http://www.w3.org/2002/07/owl#imports";
}

/// PROV-O terms used by the provenance block
pub mod prov {
    pub const ACTIVITY: &str = "http://www.w3.org/ns/prov#Activity";
    pub const WAS_GENERATED_BY: &str = "http://www.w3.org/ns/prov#wasGeneratedBy";
    pub const WAS_ASSOCIATED_WITH: &str = "http://www.w3.org/ns/prov#wasAssociatedWith";
    pub const STARTED_AT_TIME: &str = "http://www.w3.org/ns/prov#startedAtTime";
}

/// SKOS terms consulted when titling shapes
pub mod skos {
    pub const PREF_LABEL: &str = "http://www.w3.org/2004/02/skos/core#prefLabel";
}

/// Shape-catalog UI vocabulary
pub mod shui {
    pub const SHAPE_CATALOG: &str = "https://vocab.eccenca.com/shui/ShapeCatalog";
    pub const INVERSE_PATH: &str = "https://vocab.eccenca.com/shui/inversePath";
}

/// Terms minted by this tool
pub mod shapegen {
    /// Predicate holding the effective run configuration (JSON literal).
    pub const CONFIGURATION: &str = "urn:shapegen:vocab:configuration";

    /// Identity of the generator, referenced from provenance blocks.
    pub const TOOL: &str = "urn:shapegen:tool:generate-shapes";
}
