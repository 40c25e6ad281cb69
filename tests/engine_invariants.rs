//! Engine Invariant Tests
//!
//! Cross-cutting properties: determinism, dedup idempotence, the `-999`
//! schema-authoring sentinel, and bounded traversal of the self-recursive
//! jCard schema.

use std::path::Path;
use std::sync::Arc;

use rdapval::dataset::{RdapDatasetService, StaticDatasetService};
use rdapval::result::RdapValidatorResults;
use rdapval::schema::{SchemaNode, SchemaStore, SchemaValidator};
use serde_json::json;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn shipped_store() -> Arc<SchemaStore> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("json-schema");
    Arc::new(SchemaStore::load(&dir).unwrap())
}

fn permissive_datasets() -> Arc<dyn RdapDatasetService> {
    Arc::new(StaticDatasetService::permissive())
}

// =============================================================================
// Determinism and Dedup
// =============================================================================

/// Running the same validation twice into one accumulator grows nothing.
#[test]
fn test_dedup_is_idempotent_across_runs() {
    let validator =
        SchemaValidator::new(shipped_store(), "rdap_domain.json", permissive_datasets()).unwrap();
    let content = json!({
        "objectClassName": "domain",
        "ldhName": 42,
        "status": ["nope"]
    })
    .to_string();

    let mut results = RdapValidatorResults::new();
    validator.validate(&content, &mut results);
    let first_len = results.len();
    assert!(first_len > 0);

    validator.validate(&content, &mut results);
    assert_eq!(results.len(), first_len);
}

// =============================================================================
// Schema-authoring Sentinel
// =============================================================================

/// A schema set missing an expected annotation degrades to `-999` and
/// keeps running.
#[test]
fn test_unannotated_schema_yields_sentinel() {
    let dir = TempDir::new().unwrap();
    // deliberately carries no error-code annotations at all
    std::fs::write(
        dir.path().join("bare.json"),
        json!({
            "title": "bare",
            "type": "object",
            "properties": {"name": {"type": "string"}},
            "required": ["name"]
        })
        .to_string(),
    )
    .unwrap();

    let store = Arc::new(SchemaStore::load(dir.path()).unwrap());
    let validator = SchemaValidator::new(store, "bare.json", permissive_datasets()).unwrap();
    let mut results = RdapValidatorResults::new();

    assert!(!validator.validate("{}", &mut results));
    assert_eq!(results.len(), 1);
    assert_eq!(results.all()[0].code, -999);
}

/// The annotated shipped set never needs the sentinel.
#[test]
fn test_shipped_set_is_fully_annotated_for_common_failures() {
    let validator =
        SchemaValidator::new(shipped_store(), "rdap_domain.json", permissive_datasets()).unwrap();
    let content = json!({
        "objectClassName": "domain",
        "ldhName": 42,
        "bogus": true,
        "status": ["nope"],
        "events": [{"eventAction": "registration", "eventDate": "yesterday"}],
        "links": [{"rel": "self"}],
        "rdapConformance": ["rdap_level_1"]
    })
    .to_string();
    let mut results = RdapValidatorResults::new();

    assert!(!validator.validate(&content, &mut results));
    assert!(!results.is_empty());
    assert!(
        !results.contains_code(-999),
        "sentinel emitted: {:?}",
        results.all()
    );
}

// =============================================================================
// Recursive Schema Traversal
// =============================================================================

/// Traversal by id terminates on the shipped set, jCard included, and
/// concretizes nested array positions.
#[test]
fn test_pointer_discovery_over_nested_objects() {
    let store = shipped_store();
    let root = SchemaNode::root(&store, "rdap_domain.json").unwrap();
    let document = json!({
        "objectClassName": "domain",
        "nameservers": [
            {"objectClassName": "nameserver", "ldhName": "ns1.a.example"},
            {"objectClassName": "nameserver", "ldhName": "ns2.a.example"}
        ],
        "entities": [
            {"objectClassName": "entity", "vcardArray": ["vcard", ["x", ["y"]]]}
        ]
    });

    let pointers = root.find_json_pointers_by_schema_id(
        "https://rdap.example.net/json-schema/nameserver_object.json",
        &document,
    );
    assert_eq!(
        pointers.iter().collect::<Vec<_>>(),
        vec!["#/nameservers/0", "#/nameservers/1"]
    );

    let entity_pointers = root.find_json_pointers_by_schema_id(
        "https://rdap.example.net/json-schema/entity_object.json",
        &document,
    );
    assert_eq!(
        entity_pointers.iter().collect::<Vec<_>>(),
        vec!["#/entities/0"]
    );
}

#[test]
fn test_annotation_survey_terminates() {
    let store = shipped_store();
    let root = SchemaNode::root(&store, "rdap_domain.json").unwrap();

    let names = root.find_all_values_of("validationName");
    assert!(names.contains(&"stdRdapLinksValidation".to_string()));
    assert!(names.contains(&"stdRdapEventsValidation".to_string()));
}

// =============================================================================
// Nearest-ancestor Code Discovery
// =============================================================================

/// The bottom-most annotation wins; the root never shadows a closer one.
#[test]
fn test_bottom_most_code_on_shipped_set() {
    let store = shipped_store();
    let root = SchemaNode::root(&store, "rdap_domain.json").unwrap();

    // ldhName has no duplicateKeys of its own, the root provides it
    assert_eq!(
        root.search_bottom_most_error_code("ldhName", "duplicateKeys"),
        Ok(-12201)
    );
    // href carries its own errorCode, nearer than any ancestor's
    assert_eq!(
        root.search_bottom_most_error_code("href", "errorCode"),
        Ok(-10604)
    );
}
