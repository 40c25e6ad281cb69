//! Schema validator: the structural entry point
//!
//! `validate` never fails as an operation; malformed input is itself a
//! conformance finding (`duplicateKeys` or `structureInvalid`). Structural
//! failures are handed to the exception parser registry, which translates
//! them into coded results.

use std::sync::Arc;

use jsonschema::Validator;
use regex::Regex;
use serde_json::Value;

use crate::dataset::RdapDatasetService;
use crate::exception::{self, ExceptionParseContext};
use crate::result::{RdapValidationResult, RdapValidatorResults};

use super::dupkeys::find_duplicate_key;
use super::errors::SchemaResult;
use super::loader::SchemaStore;
use super::tree::SchemaNode;

const DUPLICATE_KEY_MESSAGE: &str =
    "The name in the name/value pair of a link structure was found more than once.";

/// Validates RDAP documents against one named schema of the store.
pub struct SchemaValidator {
    schema_name: String,
    store: Arc<SchemaStore>,
    datasets: Arc<dyn RdapDatasetService>,
    validator: Validator,
}

impl SchemaValidator {
    /// Compiles the named schema. Construction fails on a broken schema
    /// set; a constructed validator cannot fault at validation time.
    pub fn new(
        store: Arc<SchemaStore>,
        schema_name: &str,
        datasets: Arc<dyn RdapDatasetService>,
    ) -> SchemaResult<Self> {
        let validator = store.compile(schema_name, &datasets)?;
        Ok(Self {
            schema_name: schema_name.to_string(),
            store,
            datasets,
            validator,
        })
    }

    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    /// The schema's `title`, used in the syntactic-invalidity diagnostic.
    fn schema_title(&self) -> String {
        self.store
            .document(&self.schema_name)
            .ok()
            .and_then(|doc| doc.get("title")?.as_str().map(String::from))
            .unwrap_or_else(|| self.schema_name.clone())
    }

    /// Validates one response body. Returns true iff the document is
    /// structurally conformant; every failure mode appends coded results.
    pub fn validate(&self, content: &str, results: &mut RdapValidatorResults) -> bool {
        let document: Value = match serde_json::from_str(content) {
            Ok(document) => document,
            Err(_) => {
                results.add(self.structure_invalid_result(content));
                return false;
            }
        };

        if let Some(key) = find_duplicate_key(content) {
            results.add(self.duplicate_key_result(&key, content));
            return false;
        }

        let outcome = self.validator.validate(&document);
        match outcome {
            Ok(()) => true,
            Err(errors) => {
                let leaves = exception::leaves_from(errors);
                let mut cx = ExceptionParseContext {
                    store: &self.store,
                    schema_name: &self.schema_name,
                    document: &document,
                    datasets: &self.datasets,
                    results,
                };
                exception::parse_leaves(&leaves, &mut cx);
                false
            }
        }
    }

    fn duplicate_key_result(&self, key: &str, content: &str) -> RdapValidationResult {
        let code = exception::parse_error_code(|| {
            let root = SchemaNode::root(&self.store, &self.schema_name).ok()?;
            root.search_bottom_most_error_code(key, "duplicateKeys").ok()
        });
        RdapValidationResult::new(
            code,
            format!("{}:{}", key, truncated_value(key, content)),
            DUPLICATE_KEY_MESSAGE,
        )
    }

    fn structure_invalid_result(&self, content: &str) -> RdapValidationResult {
        let code = exception::parse_error_code(|| {
            self.store
                .document(&self.schema_name)
                .ok()?
                .get("structureInvalid")?
                .as_i64()
                .map(|code| code as i32)
        });
        RdapValidationResult::new(
            code,
            content,
            format!(
                "The {} structure is not syntactically valid.",
                self.schema_title()
            ),
        )
    }
}

/// First string value paired with `key` in the raw text, `...` when the
/// value is not extractable (non-string, or odd formatting).
fn truncated_value(key: &str, content: &str) -> String {
    let pattern = format!(r#""{}"\s*:\s*"(.*?)""#, regex::escape(key));
    Regex::new(&pattern)
        .ok()
        .and_then(|re| re.captures(content))
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| "...".to_string())
}
