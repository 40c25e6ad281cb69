//! Leaf failures and their categories
//!
//! The generic validator reports a flat stream of leaf errors; each is
//! reduced here to a category tag plus the two locations every parser
//! needs: the JSON Pointer of the offending value and the path of the
//! violated schema.

use jsonschema::error::ValidationErrorKind;
use jsonschema::ValidationError;
use serde_json::Value;

/// What kind of constraint a leaf failure violated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExceptionCategory {
    /// Instance carries properties the schema does not allow
    UnknownKey { keys: Vec<String> },
    /// A required property is absent
    MissingKey { key: String },
    /// Primitive type mismatch
    BasicType,
    /// Value not in the enumerated set
    Enum,
    /// Value differs from the fixed constant
    Const,
    /// Array does not contain the required constant
    ContainsConst,
    /// String fails its pattern
    Regex { pattern: String },
    /// A `format` keyword failed (date-time, ip, hostname, ...)
    Format { format: String },
    /// Array has duplicate items
    UniqueItems,
    /// Number out of its authorized range
    Number,
    /// A property required by a `dependencies` clause is absent
    Dependencies { key: String },
    /// anyOf / oneOf failure; synthesized from the branches
    ComplexType,
    /// Anything the profiles assign no code to
    Other,
}

/// One leaf of the validation failure tree.
#[derive(Debug, Clone)]
pub struct ExceptionNode {
    pub category: ExceptionCategory,
    /// Pointer to the offending instance value, in `#/a/b` form
    pub pointer: String,
    /// Path of the violated schema, as reported by the validator
    pub schema_location: String,
    /// Verbatim validator message
    pub message: String,
}

/// Flattens a validator error stream into parse-ready leaves, preserving
/// the order the validator reports them in.
pub fn leaves_from<'a>(
    errors: impl Iterator<Item = ValidationError<'a>>,
) -> Vec<ExceptionNode> {
    errors.map(|error| from_validation_error(&error)).collect()
}

fn from_validation_error(error: &ValidationError<'_>) -> ExceptionNode {
    let schema_location = error.schema_path.to_string();
    ExceptionNode {
        category: categorize(&error.kind, &schema_location),
        pointer: format!("#{}", error.instance_path),
        schema_location,
        message: error.to_string(),
    }
}

/// A `Required` failure under a `dependencies` clause is a dependency
/// finding, not a plain missing key.
fn is_dependency(schema_location: &str) -> bool {
    schema_location.contains("/dependencies")
}

fn plain_key(property: &Value) -> String {
    match property {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn categorize(kind: &ValidationErrorKind, schema_location: &str) -> ExceptionCategory {
    match kind {
        ValidationErrorKind::AdditionalProperties { unexpected } => ExceptionCategory::UnknownKey {
            keys: unexpected.clone(),
        },
        ValidationErrorKind::Required { property } => {
            let key = plain_key(property);
            if is_dependency(schema_location) {
                ExceptionCategory::Dependencies { key }
            } else {
                ExceptionCategory::MissingKey { key }
            }
        }
        ValidationErrorKind::Type { .. } => ExceptionCategory::BasicType,
        ValidationErrorKind::Enum { .. } => ExceptionCategory::Enum,
        ValidationErrorKind::Constant { .. } => ExceptionCategory::Const,
        ValidationErrorKind::Contains => ExceptionCategory::ContainsConst,
        ValidationErrorKind::Pattern { pattern } => ExceptionCategory::Regex {
            pattern: pattern.to_string(),
        },
        ValidationErrorKind::Format { format } => ExceptionCategory::Format {
            format: format.to_string(),
        },
        ValidationErrorKind::UniqueItems => ExceptionCategory::UniqueItems,
        ValidationErrorKind::Maximum { .. }
        | ValidationErrorKind::Minimum { .. }
        | ValidationErrorKind::ExclusiveMaximum { .. }
        | ValidationErrorKind::ExclusiveMinimum { .. }
        | ValidationErrorKind::MultipleOf { .. } => ExceptionCategory::Number,
        ValidationErrorKind::AnyOf
        | ValidationErrorKind::OneOfNotValid
        | ValidationErrorKind::OneOfMultipleValid => ExceptionCategory::ComplexType,
        _ => ExceptionCategory::Other,
    }
}
