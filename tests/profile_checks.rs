//! Profile Check Tests
//!
//! Drives the engine end to end over captured exchanges: query/label
//! consistency, handle conformance against the EPP ROID registry, and the
//! TIG header rules over redirect chains.

use std::path::Path;
use std::sync::Arc;

use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::StatusCode;
use rdapval::config::RdapValidatorConfig;
use rdapval::dataset::{InvalidValuesSet, RdapDatasetService, RegistrySet, StaticDatasetService};
use rdapval::engine::RdapValidationEngine;
use rdapval::httpdata::HttpData;
use rdapval::schema::SchemaStore;
use serde_json::{json, Value};
use url::Url;

// =============================================================================
// Helper Functions
// =============================================================================

fn shipped_store() -> Arc<SchemaStore> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("json-schema");
    Arc::new(SchemaStore::load(&dir).unwrap())
}

fn datasets_with_roids(roids: &[&str]) -> Arc<dyn RdapDatasetService> {
    Arc::new(StaticDatasetService::new(
        RegistrySet::new(roids.iter().map(|r| r.to_string())),
        InvalidValuesSet::default(),
        InvalidValuesSet::default(),
    ))
}

fn engine(uri: &str, datasets: Arc<dyn RdapDatasetService>) -> RdapValidationEngine {
    let config = RdapValidatorConfig::new(Url::parse(uri).unwrap());
    RdapValidationEngine::new(shipped_store(), datasets, config)
}

fn cors_ok(uri: &str, body: &str) -> HttpData {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static("access-control-allow-origin"),
        HeaderValue::from_static("*"),
    );
    HttpData::new(Url::parse(uri).unwrap(), StatusCode::OK, headers, body)
}

fn valid_domain(handle: &str) -> Value {
    json!({
        "objectClassName": "domain",
        "handle": handle,
        "ldhName": "test.xn--viagnie-eya.example",
        "rdapConformance": ["rdap_level_0"]
    })
}

// =============================================================================
// Query Validation (Response Profile 2.1)
// =============================================================================

/// An A-label query URI demands an ldhName member on the topmost object.
#[test]
fn test_a_label_uri_without_ldh_name() {
    let uri = "https://rdap.example.net/domain/test.xn--viagnie-eya.example";
    let mut document = valid_domain("ABC123-EXMP");
    document.as_object_mut().unwrap().remove("ldhName");
    let engine = engine(uri, datasets_with_roids(&["EXMP"]));

    let results = engine
        .validate_response(&cors_ok(uri, &document.to_string()))
        .unwrap();

    assert_eq!(results.len(), 1, "results: {:?}", results.all());
    let result = &results.all()[0];
    assert_eq!(result.code, -46100);
    assert!(result
        .message
        .contains("The RDAP Query URI contains only A-label or NR-LDH labels"));
    assert!(result.message.contains("RDAP_Response_Profile_2_1"));
}

#[test]
fn test_u_label_uri_without_unicode_name() {
    let uri = "https://rdap.example.net/domain/test.viagénie.example";
    let document = valid_domain("ABC123-EXMP");
    let engine = engine(uri, datasets_with_roids(&["EXMP"]));

    let results = engine
        .validate_response(&cors_ok(uri, &document.to_string()))
        .unwrap();

    assert_eq!(results.len(), 1, "results: {:?}", results.all());
    let result = &results.all()[0];
    assert_eq!(result.code, -46101);
    assert!(result
        .message
        .contains("The RDAP Query URI contains one or more U-label"));
}

#[test]
fn test_consistent_members_pass() {
    let uri = "https://rdap.example.net/domain/test.xn--viagnie-eya.example";
    let document = valid_domain("ABC123-EXMP");
    let engine = engine(uri, datasets_with_roids(&["EXMP"]));

    let results = engine
        .validate_response(&cors_ok(uri, &document.to_string()))
        .unwrap();
    assert!(results.is_empty(), "results: {:?}", results.all());
}

// =============================================================================
// Handle Validation (Response Profile 2.2)
// =============================================================================

/// A handle without the RFC 5730 shape fails on format alone; the ROID
/// lookup is not attempted.
#[test]
fn test_handle_without_hyphen() {
    let uri = "https://rdap.example.net/domain/test.xn--viagnie-eya.example";
    let document = valid_domain("ABCDEF");
    // empty registry: a ROID lookup would also fire, a single result
    // proves it did not
    let engine = engine(uri, datasets_with_roids(&[]));

    let results = engine
        .validate_response(&cors_ok(uri, &document.to_string()))
        .unwrap();

    assert_eq!(results.len(), 1, "results: {:?}", results.all());
    let result = &results.all()[0];
    assert_eq!(result.code, -47102);
    assert_eq!(result.value, "#/handle:ABCDEF");
    assert!(result.message.contains("RFC5730"));
}

#[test]
fn test_handle_with_unknown_roid() {
    let uri = "https://rdap.example.net/domain/test.xn--viagnie-eya.example";
    let document = valid_domain("ABC-BADROID");
    let engine = engine(uri, datasets_with_roids(&["EXMP"]));

    let results = engine
        .validate_response(&cors_ok(uri, &document.to_string()))
        .unwrap();

    assert_eq!(results.len(), 1, "results: {:?}", results.all());
    let result = &results.all()[0];
    assert_eq!(result.code, -47103);
    assert_eq!(result.value, "#/handle:ABC-BADROID");
    assert!(result.message.contains("EPPROID"));
}

// =============================================================================
// TIG Header Checks
// =============================================================================

/// The CORS header must be `*` on every hop; a conformant first hop does
/// not excuse the final one.
#[test]
fn test_cors_missing_on_second_hop() {
    let uri = "https://rdap.example.net/domain/test.xn--viagnie-eya.example";
    let document = valid_domain("ABC123-EXMP");

    let first = cors_ok(
        "https://old.rdap.example.net/domain/test.xn--viagnie-eya.example",
        "",
    );
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static("content-type"),
        HeaderValue::from_static("application/rdap+json"),
    );
    let last = HttpData::new(
        Url::parse(uri).unwrap(),
        StatusCode::OK,
        headers,
        document.to_string(),
    )
    .with_previous(first);

    let engine = engine(uri, datasets_with_roids(&["EXMP"]));
    let results = engine.validate_response(&last).unwrap();

    assert_eq!(results.len(), 1, "results: {:?}", results.all());
    let result = &results.all()[0];
    assert_eq!(result.code, -20500);
    assert_eq!(result.value, last.header_dump());
    assert!(result.message.contains("section 1.13"));
}

#[test]
fn test_http_scheme_rejected() {
    let uri = "http://rdap.example.net/domain/test.xn--viagnie-eya.example";
    let document = valid_domain("ABC123-EXMP");
    let engine = engine(uri, datasets_with_roids(&["EXMP"]));

    let results = engine
        .validate_response(&cors_ok(uri, &document.to_string()))
        .unwrap();

    assert_eq!(results.len(), 1, "results: {:?}", results.all());
    assert_eq!(results.all()[0].code, -20100);
}

// =============================================================================
// Gating
// =============================================================================

/// Domain-gated checks stay quiet on nameserver queries and vice versa.
#[test]
fn test_nameserver_query_gates_domain_checks() {
    let uri = "https://rdap.example.net/nameserver/ns1.test.example";
    let document = json!({
        "objectClassName": "nameserver",
        "ldhName": "ns1.test.example",
        "rdapConformance": ["rdap_level_0"]
    });
    // a handle this malformed would fail the domain handle check
    let engine = engine(uri, datasets_with_roids(&[]));

    let results = engine
        .validate_response(&cors_ok(uri, &document.to_string()))
        .unwrap();
    assert!(results.is_empty(), "results: {:?}", results.all());

    let groups: Vec<&str> = results.groups().collect();
    assert!(groups.contains(&"rdapResponseProfile_4_1_Validation"));
    assert!(!groups.contains(&"rdapResponseProfile_2_1_Validation"));
    assert!(!groups.contains(&"rdapResponseProfile_2_2_Validation"));
}

#[test]
fn test_help_query_runs_header_checks_only() {
    let uri = "https://rdap.example.net/help";
    let body = json!({
        "rdapConformance": ["rdap_level_0"],
        "notices": [{"title": "Usage", "description": ["terms"]}]
    });
    let engine = engine(uri, datasets_with_roids(&[]));

    let results = engine
        .validate_response(&cors_ok(uri, &body.to_string()))
        .unwrap();
    assert!(results.is_empty(), "results: {:?}", results.all());

    let groups: Vec<&str> = results.groups().collect();
    assert!(groups.contains(&"tigSection_1_2_Validation"));
    assert!(groups.contains(&"tigSection_1_13_Validation"));
    assert!(!groups.contains(&"rdapResponseProfile_2_1_Validation"));
}
