//! Integration tests for the complete shapegen pipeline
//!
//! These tests run the engine against graphs parsed by `shapegen-rdf` and
//! persisted in a `DirectoryStore`:
//! - Turtle → store → shapes graph
//! - catalog policies across runs (replace / append / stop)
//! - provenance, inverse properties and the central-catalog import
//!
//! Run with: cargo test --test integration_tests

use chrono::{DateTime, TimeZone, Utc};
use shapegen_core::vocab::{dcterms, prov, rdf, rdfs, sh, shui, xsd};
use shapegen_core::{
    CatalogState, ExistingGraphPolicy, GraphStore, PrefixResolver, RdfLiteral, RdfNode, RdfObject,
    RdfTriple, RunSummary, ShapesConfig, ShapesEngine, ShapesError, WriteMode,
};
use shapegen_rdf::{parse_rdf, DirectoryStore, RdfFormat};
use tempfile::tempdir;

const SHAPES: &str = "https://example.org/shapes/";

const PEOPLE_TTL: &str = r#"
@prefix ex: <http://example.org/> .

ex:Alice a ex:Person ;
    ex:age 30 .
ex:Bob a ex:Person .
"#;

const ZOO_TTL: &str = r#"
@prefix ex: <http://example.org/> .
@prefix skos: <http://www.w3.org/2004/02/skos/core#> .

ex:rex a ex:Dog , ex:Pet ;
    ex:name "Rex" ;
    ex:owner ex:carol ;
    ex:tag "t1" , ex:tagA .
ex:tom a ex:Cat , ex:Pet ;
    ex:name "Tom"@en ;
    ex:owner ex:dave ;
    ex:tag "t2" .
ex:carol a ex:Person .
ex:dave a ex:Person .
ex:Dog skos:prefLabel "Hound"@en .
"#;

fn ex(local: &str) -> String {
    format!("http://example.org/{local}")
}

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, hour, 0, 0).unwrap()
}

fn store_with(graph: &str, turtle: &str) -> (DirectoryStore, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let mut store = DirectoryStore::open(dir.path()).unwrap();
    let triples = parse_rdf(turtle.as_bytes(), RdfFormat::Turtle).expect("parse turtle");
    store.write_graph(graph, &triples, WriteMode::Replace).unwrap();
    (store, dir)
}

fn run(
    store: &mut DirectoryStore,
    config: ShapesConfig,
    now: DateTime<Utc>,
) -> shapegen_core::Result<RunSummary> {
    ShapesEngine::new(config, PrefixResolver::bundled()?)?.run(store, now)
}

fn objects(triples: &[RdfTriple], subject: &RdfNode, predicate: &str) -> Vec<RdfObject> {
    triples
        .iter()
        .filter(|t| &t.subject == subject && t.predicate == predicate)
        .map(|t| t.object.clone())
        .collect()
}

fn node_shape(triples: &[RdfTriple], class: &str) -> RdfNode {
    triples
        .iter()
        .find(|t| t.predicate == sh::TARGET_CLASS && t.object == RdfObject::iri(class))
        .map(|t| t.subject.clone())
        .unwrap_or_else(|| panic!("no node shape for {class}"))
}

fn property_shape(triples: &[RdfTriple], class: &str, path: &str) -> Option<RdfNode> {
    let node = node_shape(triples, class);
    objects(triples, &node, sh::PROPERTY)
        .into_iter()
        .filter_map(|o| o.as_node().cloned())
        .find(|shape| objects(triples, shape, sh::PATH) == vec![RdfObject::iri(path)])
}

fn integer(n: usize) -> RdfObject {
    RdfLiteral::integer(n).into()
}

// ============================================================================
// End-to-end inference
// ============================================================================

#[test]
fn test_person_age_scenario() {
    let (mut store, _dir) = store_with("urn:g1", PEOPLE_TTL);
    let summary = run(&mut store, ShapesConfig::new("urn:g1", SHAPES), at(9)).unwrap();
    assert_eq!(summary.node_shapes, 1);
    assert_eq!(summary.property_shapes, 1);

    let shapes = store.read_graph(SHAPES).unwrap();
    let age = property_shape(&shapes, &ex("Person"), &ex("age")).expect("age shape");
    assert_eq!(objects(&shapes, &age, sh::MIN_COUNT), vec![integer(0)]);
    assert_eq!(objects(&shapes, &age, sh::MAX_COUNT), vec![integer(1)]);
    assert_eq!(objects(&shapes, &age, sh::DATATYPE), vec![RdfObject::iri(xsd::INTEGER)]);

    let catalog = RdfNode::iri(SHAPES);
    assert_eq!(
        objects(&shapes, &catalog, rdf::TYPE),
        vec![RdfObject::iri(shui::SHAPE_CATALOG)]
    );
    assert_eq!(
        objects(&shapes, &catalog, dcterms::CREATED),
        vec![RdfLiteral::typed("2026-10-18T09:00:00Z", xsd::DATE_TIME).into()]
    );
}

#[test]
fn test_multi_typed_subjects_profile_each_class() {
    let (mut store, _dir) = store_with("urn:zoo", ZOO_TTL);
    let summary = run(&mut store, ShapesConfig::new("urn:zoo", SHAPES), at(9)).unwrap();
    // Dog, Cat, Pet, Person
    assert_eq!(summary.classes, 4);
    assert_eq!(summary.node_shapes, 4);

    let shapes = store.read_graph(SHAPES).unwrap();
    let dog_name = property_shape(&shapes, &ex("Dog"), &ex("name")).unwrap();
    let pet_name = property_shape(&shapes, &ex("Pet"), &ex("name")).unwrap();
    assert_ne!(dog_name, pet_name);

    // Dog only sees an untagged literal; Pet sees it and an @en literal
    assert_eq!(objects(&shapes, &dog_name, sh::DATATYPE), vec![RdfObject::iri(xsd::STRING)]);
    assert!(objects(&shapes, &pet_name, sh::DATATYPE).is_empty());
    assert_eq!(objects(&shapes, &pet_name, sh::NODE_KIND), vec![RdfObject::iri(sh::LITERAL)]);

    // Person has no properties beyond rdf:type
    let person = node_shape(&shapes, &ex("Person"));
    assert!(objects(&shapes, &person, sh::PROPERTY).is_empty());
}

#[test]
fn test_value_kind_and_class_constraints() {
    let (mut store, _dir) = store_with("urn:zoo", ZOO_TTL);
    run(&mut store, ShapesConfig::new("urn:zoo", SHAPES), at(9)).unwrap();
    let shapes = store.read_graph(SHAPES).unwrap();

    let owner = property_shape(&shapes, &ex("Pet"), &ex("owner")).unwrap();
    assert_eq!(objects(&shapes, &owner, sh::NODE_KIND), vec![RdfObject::iri(sh::IRI)]);
    assert_eq!(objects(&shapes, &owner, sh::CLASS), vec![RdfObject::iri(ex("Person"))]);

    // literal and IRI values mixed: path and cardinality only
    let tag = property_shape(&shapes, &ex("Dog"), &ex("tag")).unwrap();
    assert_eq!(objects(&shapes, &tag, sh::MIN_COUNT), vec![integer(2)]);
    assert_eq!(objects(&shapes, &tag, sh::MAX_COUNT), vec![integer(2)]);
    assert!(objects(&shapes, &tag, sh::NODE_KIND).is_empty());
    assert!(objects(&shapes, &tag, sh::DATATYPE).is_empty());
    assert!(objects(&shapes, &tag, sh::CLASS).is_empty());
}

#[test]
fn test_titles_prefer_data_labels() {
    let (mut store, _dir) = store_with("urn:zoo", ZOO_TTL);
    run(&mut store, ShapesConfig::new("urn:zoo", SHAPES), at(9)).unwrap();
    let shapes = store.read_graph(SHAPES).unwrap();

    let dog = node_shape(&shapes, &ex("Dog"));
    assert_eq!(
        objects(&shapes, &dog, sh::NAME),
        vec![RdfLiteral::lang("Hound (ex:)", "en").into()]
    );
    let cat = node_shape(&shapes, &ex("Cat"));
    assert_eq!(
        objects(&shapes, &cat, rdfs::LABEL),
        vec![RdfLiteral::lang("Cat (ex:)", "en").into()]
    );
}

#[test]
fn test_ignore_list_applies_to_every_class() {
    let (mut store, _dir) = store_with("urn:zoo", ZOO_TTL);
    let mut config = ShapesConfig::new("urn:zoo", SHAPES);
    config.ignore_properties = vec![format!("<{}>", ex("name")), "   ".to_string()];
    run(&mut store, config, at(9)).unwrap();
    let shapes = store.read_graph(SHAPES).unwrap();

    for class in ["Dog", "Cat", "Pet"] {
        assert!(property_shape(&shapes, &ex(class), &ex("name")).is_none());
    }
    assert!(!shapes.iter().any(|t| t.object == RdfObject::iri(ex("name"))));
}

#[test]
fn test_inverse_properties() {
    let (mut store, _dir) = store_with("urn:zoo", ZOO_TTL);
    let mut config = ShapesConfig::new("urn:zoo", SHAPES);
    config.inverse_properties = true;
    run(&mut store, config, at(9)).unwrap();
    let shapes = store.read_graph(SHAPES).unwrap();

    let person = node_shape(&shapes, &ex("Person"));
    let refs = objects(&shapes, &person, sh::PROPERTY);
    assert_eq!(refs.len(), 1);
    let owned_by = refs[0].as_node().unwrap();
    assert_eq!(objects(&shapes, owned_by, sh::PATH), vec![RdfObject::iri(ex("owner"))]);
    assert_eq!(
        objects(&shapes, owned_by, shui::INVERSE_PATH),
        vec![RdfLiteral::typed("true", xsd::BOOLEAN).into()]
    );
    // every referrer is both a Pet and a Dog/Cat, so no single class
    assert!(objects(&shapes, owned_by, sh::CLASS).is_empty());
    assert_eq!(objects(&shapes, owned_by, sh::NODE_KIND), vec![RdfObject::iri(sh::IRI)]);
}

// ============================================================================
// Catalog policies across runs
// ============================================================================

#[test]
fn test_replace_is_idempotent_except_timestamps() {
    let (mut store, _dir) = store_with("urn:zoo", ZOO_TTL);
    let mut config = ShapesConfig::new("urn:zoo", SHAPES);
    config.existing_graph = ExistingGraphPolicy::Replace;

    let strip = |triples: Vec<RdfTriple>| -> Vec<RdfTriple> {
        triples
            .into_iter()
            .filter(|t| t.predicate != dcterms::CREATED)
            .collect()
    };

    run(&mut store, config.clone(), at(9)).unwrap();
    let first = strip(store.read_graph(SHAPES).unwrap());
    run(&mut store, config, at(10)).unwrap();
    let second = strip(store.read_graph(SHAPES).unwrap());
    assert_eq!(first, second);
}

#[test]
fn test_append_across_data_graphs() {
    let (mut store, _dir) = store_with("urn:g1", PEOPLE_TTL);
    let zoo = parse_rdf(ZOO_TTL.as_bytes(), RdfFormat::Turtle).unwrap();
    store.write_graph("urn:g2", &zoo, WriteMode::Create).unwrap();

    run(&mut store, ShapesConfig::new("urn:g1", SHAPES), at(9)).unwrap();

    let mut config = ShapesConfig::new("urn:g2", SHAPES);
    config.existing_graph = ExistingGraphPolicy::Append;
    let summary = run(&mut store, config.clone(), at(10)).unwrap();
    assert_eq!(summary.previous_state, CatalogState::Present);

    let shapes = store.read_graph(SHAPES).unwrap();
    let catalog = RdfNode::iri(SHAPES);
    assert_eq!(
        objects(&shapes, &catalog, rdfs::LABEL),
        vec![RdfLiteral::plain("Shapes for: urn:g1, urn:g2").into()]
    );
    assert_eq!(objects(&shapes, &catalog, dcterms::SOURCE).len(), 2);
    assert_eq!(
        objects(&shapes, &catalog, dcterms::MODIFIED),
        vec![RdfLiteral::typed("2026-10-18T10:00:00Z", xsd::DATE_TIME).into()]
    );

    // a later append replaces the modification time and keeps one source each
    run(&mut store, config, at(11)).unwrap();
    let shapes = store.read_graph(SHAPES).unwrap();
    assert_eq!(objects(&shapes, &catalog, dcterms::MODIFIED).len(), 1);
    assert_eq!(objects(&shapes, &catalog, dcterms::SOURCE).len(), 2);
    assert_eq!(
        objects(&shapes, &catalog, rdfs::LABEL),
        vec![RdfLiteral::plain("Shapes for: urn:g1, urn:g2").into()]
    );
}

#[test]
fn test_stop_keeps_existing_graph() {
    let (mut store, _dir) = store_with("urn:g1", PEOPLE_TTL);
    run(&mut store, ShapesConfig::new("urn:g1", SHAPES), at(9)).unwrap();
    let before = store.read_graph(SHAPES).unwrap().len();

    let err = run(&mut store, ShapesConfig::new("urn:g1", SHAPES), at(10)).unwrap_err();
    assert!(matches!(err, ShapesError::GraphExists { .. }));
    assert_eq!(store.read_graph(SHAPES).unwrap().len(), before);
}

#[test]
fn test_unknown_data_graph_is_unreachable() {
    let (mut store, _dir) = store_with("urn:g1", PEOPLE_TTL);
    let err = run(&mut store, ShapesConfig::new("urn:missing", SHAPES), at(9)).unwrap_err();
    assert!(matches!(err, ShapesError::GraphUnreachable { .. }));
    assert!(!store.graph_exists(SHAPES).unwrap());
}

// ============================================================================
// Provenance and import
// ============================================================================

#[test]
fn test_provenance_and_import() {
    let (mut store, _dir) = store_with("urn:g1", PEOPLE_TTL);
    let mut config = ShapesConfig::new("urn:g1", SHAPES);
    config.include_provenance = true;
    config.import_shapes = true;
    config.central_catalog_iri = "urn:central".to_string();

    let summary = run(&mut store, config.clone(), at(9)).unwrap();
    assert!(!summary.import.is_failure());

    let shapes = store.read_graph(SHAPES).unwrap();
    let activity = objects(&shapes, &RdfNode::iri(SHAPES), prov::WAS_GENERATED_BY);
    assert_eq!(activity.len(), 1);
    let activity = activity[0].as_node().unwrap();
    assert_eq!(
        objects(&shapes, activity, rdf::TYPE),
        vec![RdfObject::iri(prov::ACTIVITY)]
    );

    // importing twice keeps a single owl:imports statement
    config.existing_graph = ExistingGraphPolicy::Replace;
    run(&mut store, config, at(10)).unwrap();
    assert_eq!(store.read_graph("urn:central").unwrap().len(), 1);
}
