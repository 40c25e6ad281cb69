//! Parser registry: leaf failures to coded results
//!
//! One parser per failure category. All parsers run against every leaf;
//! `matches` is a pure predicate and non-matching parsers do nothing.
//! Error codes are discovered by walking the schema tree upward from the
//! violation; a missing annotation yields the `-999` sentinel and an info
//! log, never a halt.

use std::sync::Arc;

use serde_json::Value;

use crate::dataset::RdapDatasetService;
use crate::formats::{
    FormatValidator, HostNameInUriValidator, IdnHostNameValidator, Ipv4FormatValidator,
    Ipv6FormatValidator,
};
use crate::pointer;
use crate::result::{RdapValidationResult, RdapValidatorResults};
use crate::schema::{SchemaNode, SchemaNodeKind, SchemaStore};

use super::types::{leaves_from, ExceptionCategory, ExceptionNode};

/// Emitted when the schema set lacks an expected annotation.
pub const SENTINEL_CODE: i32 = -999;

/// Combined schemas nested deeper than this are not fanned out further.
const MAX_COMBINED_DEPTH: usize = 3;

/// Everything a parser needs to translate one leaf.
pub struct ExceptionParseContext<'a> {
    pub store: &'a SchemaStore,
    pub schema_name: &'a str,
    pub document: &'a Value,
    pub datasets: &'a Arc<dyn RdapDatasetService>,
    pub results: &'a mut RdapValidatorResults,
}

impl<'a> ExceptionParseContext<'a> {
    fn tree(&self) -> Option<SchemaNode<'a>> {
        SchemaNode::root(self.store, self.schema_name).ok()
    }

    fn add(&mut self, code: i32, value: String, message: String) {
        self.results
            .add(RdapValidationResult::new(code, value, message));
    }

    fn result_value(&self, json_pointer: &str) -> String {
        pointer::result_value(self.document, json_pointer)
    }

    /// The schema associated with a violation pointer, dereferenced. A
    /// root-pointer violation is associated with the root schema itself.
    fn associated_schema(&self, json_pointer: &str) -> Option<SchemaNode<'a>> {
        let root = self.tree()?;
        if json_pointer == "#" {
            return Some(root);
        }
        Some(root.find_associated_schema(json_pointer)?.dereferenced())
    }

    /// Nearest `key` annotation at or above the violated schema, `-999`
    /// when the schema set is out of sync with the parsers.
    fn error_code_near(&self, json_pointer: &str, key: &str) -> i32 {
        parse_error_code(|| {
            let mut current = Some(self.associated_schema(json_pointer)?);
            while let Some(node) = current {
                if let Some(code) = node.error_code(key) {
                    return Some(code);
                }
                current = node.parent().cloned();
            }
            None
        })
    }
}

/// Runs the fallible code lookup, degrading to the sentinel.
pub(crate) fn parse_error_code(lookup: impl FnOnce() -> Option<i32>) -> i32 {
    match lookup() {
        Some(code) => code,
        None => {
            tracing::info!("Can't find the corresponding error in schema, replacing by -999");
            SENTINEL_CODE
        }
    }
}

/// One rule of the registry.
pub trait ExceptionParser {
    /// Pure predicate on the category and shape of the leaf.
    fn matches(&self, leaf: &ExceptionNode) -> bool;

    /// Emits results for a matching leaf. `depth` counts combined-schema
    /// fan-outs and only matters to the complex-type parser.
    fn do_parse(&self, leaf: &ExceptionNode, cx: &mut ExceptionParseContext<'_>, depth: usize);
}

/// The registry, in registration order.
fn registry() -> Vec<Box<dyn ExceptionParser>> {
    vec![
        Box::new(UnknownKeyExceptionParser),
        Box::new(BasicTypeExceptionParser),
        Box::new(EnumExceptionParser),
        Box::new(MissingKeyExceptionParser),
        Box::new(ConstExceptionParser),
        Box::new(ContainsConstExceptionParser),
        Box::new(RegexExceptionParser),
        Box::new(DatetimeExceptionParser),
        Box::new(DependenciesExceptionParser),
        Box::new(HostNameInUriExceptionParser),
        Box::new(Ipv4ExceptionParser),
        Box::new(Ipv6ExceptionParser),
        Box::new(IdnHostNameExceptionParser),
        Box::new(UniqueItemsExceptionParser),
        Box::new(NumberExceptionParser),
        Box::new(ComplexTypeExceptionParser),
    ]
}

/// Fans every leaf out across the whole registry, then runs the shared
/// validation-wrapper pass for each leaf a parser matched.
pub fn parse_leaves(leaves: &[ExceptionNode], cx: &mut ExceptionParseContext<'_>) {
    parse_leaves_at_depth(leaves, cx, 0);
}

fn parse_leaves_at_depth(
    leaves: &[ExceptionNode],
    cx: &mut ExceptionParseContext<'_>,
    depth: usize,
) {
    for leaf in leaves {
        let mut matched = false;
        for parser in registry() {
            if parser.matches(leaf) {
                parser.do_parse(leaf, cx, depth);
                matched = true;
            }
        }
        if matched {
            validation_wrapper_pass(leaf, cx);
        }
    }
}

/// For every ancestor group bearing `validationName`, emits the generic
/// "does not pass X validation" result with that group's wrapper code.
fn validation_wrapper_pass(leaf: &ExceptionNode, cx: &mut ExceptionParseContext<'_>) {
    let Some(root) = cx.tree() else {
        return;
    };
    for validation_node in root.find_validation_nodes(&leaf.pointer, "validationName") {
        if !validation_node.has_parent_validation_code() {
            continue;
        }
        let code = parse_error_code(|| validation_node.parent_validation_code());
        let name = validation_node.validation_name().unwrap_or_default();
        let value = cx.result_value(&leaf.pointer);
        cx.add(
            code,
            value,
            format!(
                "The value for the JSON name value does not pass {} validation [{}].",
                leaf.pointer, name
            ),
        );
    }
}

fn join_pointer(base: &str, key: &str) -> String {
    if base == "#" {
        format!("#/{}", key)
    } else {
        format!("{}/{}", base, key)
    }
}

struct UnknownKeyExceptionParser;

impl ExceptionParser for UnknownKeyExceptionParser {
    fn matches(&self, leaf: &ExceptionNode) -> bool {
        matches!(leaf.category, ExceptionCategory::UnknownKey { .. })
    }

    fn do_parse(&self, leaf: &ExceptionNode, cx: &mut ExceptionParseContext<'_>, _depth: usize) {
        let ExceptionCategory::UnknownKey { keys } = &leaf.category else {
            return;
        };
        let authorized: Vec<String> = cx
            .associated_schema(&leaf.pointer)
            .and_then(|node| node.schema().get("properties")?.as_object().cloned())
            .map(|properties| properties.keys().cloned().collect())
            .unwrap_or_default();
        let code = cx.error_code_near(&leaf.pointer, "unknownKeys");
        for key in keys {
            let offending = join_pointer(&leaf.pointer, key);
            let value = cx.result_value(&offending);
            cx.add(
                code,
                value,
                format!(
                    "The name in the name/value pair is not of: {}.",
                    authorized.join(", ")
                ),
            );
        }
    }
}

struct MissingKeyExceptionParser;

impl ExceptionParser for MissingKeyExceptionParser {
    fn matches(&self, leaf: &ExceptionNode) -> bool {
        matches!(leaf.category, ExceptionCategory::MissingKey { .. })
    }

    fn do_parse(&self, leaf: &ExceptionNode, cx: &mut ExceptionParseContext<'_>, _depth: usize) {
        let ExceptionCategory::MissingKey { key } = &leaf.category else {
            return;
        };
        let code = cx.error_code_near(&leaf.pointer, "missing");
        cx.add(
            code,
            format!("{}:{}", leaf.pointer, key),
            format!("The {} element does not exist.", key),
        );
    }
}

struct BasicTypeExceptionParser;

impl ExceptionParser for BasicTypeExceptionParser {
    fn matches(&self, leaf: &ExceptionNode) -> bool {
        leaf.category == ExceptionCategory::BasicType
    }

    fn do_parse(&self, leaf: &ExceptionNode, cx: &mut ExceptionParseContext<'_>, _depth: usize) {
        // the violated schema's own type, not the type of the schema the
        // pointer resolves to: a combined branch reports its branch type
        let expected = expected_type(leaf)
            .or_else(|| {
                cx.associated_schema(&leaf.pointer)
                    .and_then(|node| node.schema().get("type").cloned())
                    .map(|ty| match ty {
                        Value::String(name) => name,
                        other => other.to_string(),
                    })
            })
            .unwrap_or_else(|| "value of the expected type".to_string());
        let code = cx.error_code_near(&leaf.pointer, "errorCode");
        let value = cx.result_value(&leaf.pointer);
        cx.add(code, value, format!("The JSON value is not a {}.", expected));
    }
}

/// Recovers the expected type from the validator's own diagnostic.
fn expected_type(leaf: &ExceptionNode) -> Option<String> {
    let (_, suffix) = leaf.message.rsplit_once("is not of type ")?;
    let name = suffix.trim().replace('"', "");
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

struct EnumExceptionParser;

impl ExceptionParser for EnumExceptionParser {
    fn matches(&self, leaf: &ExceptionNode) -> bool {
        leaf.category == ExceptionCategory::Enum
    }

    fn do_parse(&self, leaf: &ExceptionNode, cx: &mut ExceptionParseContext<'_>, _depth: usize) {
        let allowed = cx
            .associated_schema(&leaf.pointer)
            .and_then(|node| node.schema().get("enum").cloned())
            .unwrap_or(Value::Null)
            .to_string();
        let code = cx.error_code_near(&leaf.pointer, "errorCode");
        let value = cx.result_value(&leaf.pointer);
        cx.add(
            code,
            value,
            format!("The JSON value is not included in the enumeration {}.", allowed),
        );
    }
}

struct ConstExceptionParser;

impl ExceptionParser for ConstExceptionParser {
    fn matches(&self, leaf: &ExceptionNode) -> bool {
        leaf.category == ExceptionCategory::Const
    }

    fn do_parse(&self, leaf: &ExceptionNode, cx: &mut ExceptionParseContext<'_>, _depth: usize) {
        let expected = cx
            .associated_schema(&leaf.pointer)
            .and_then(|node| node.schema().get("const").cloned())
            .unwrap_or(Value::Null)
            .to_string();
        let code = cx.error_code_near(&leaf.pointer, "errorCode");
        let value = cx.result_value(&leaf.pointer);
        cx.add(code, value, format!("The JSON value is not {}.", expected));
    }
}

struct ContainsConstExceptionParser;

impl ExceptionParser for ContainsConstExceptionParser {
    fn matches(&self, leaf: &ExceptionNode) -> bool {
        leaf.category == ExceptionCategory::ContainsConst
    }

    fn do_parse(&self, leaf: &ExceptionNode, cx: &mut ExceptionParseContext<'_>, _depth: usize) {
        let expected = cx
            .associated_schema(&leaf.pointer)
            .and_then(|node| node.schema().get("contains")?.get("const").cloned())
            .unwrap_or(Value::Null)
            .to_string();
        let code = cx.error_code_near(&leaf.pointer, "errorCode");
        let value = cx.result_value(&leaf.pointer);
        cx.add(
            code,
            value,
            format!(
                "The {} data structure does not include {}.",
                leaf.pointer, expected
            ),
        );
    }
}

struct RegexExceptionParser;

impl ExceptionParser for RegexExceptionParser {
    fn matches(&self, leaf: &ExceptionNode) -> bool {
        matches!(leaf.category, ExceptionCategory::Regex { .. })
    }

    fn do_parse(&self, leaf: &ExceptionNode, cx: &mut ExceptionParseContext<'_>, _depth: usize) {
        let ExceptionCategory::Regex { pattern } = &leaf.category else {
            return;
        };
        let code = cx.error_code_near(&leaf.pointer, "errorCode");
        let value = cx.result_value(&leaf.pointer);
        cx.add(
            code,
            value,
            format!(
                "The value of the JSON string data does not conform to the pattern {}.",
                pattern
            ),
        );
    }
}

struct DatetimeExceptionParser;

impl ExceptionParser for DatetimeExceptionParser {
    fn matches(&self, leaf: &ExceptionNode) -> bool {
        matches!(&leaf.category, ExceptionCategory::Format { format } if format == "date-time")
    }

    fn do_parse(&self, leaf: &ExceptionNode, cx: &mut ExceptionParseContext<'_>, _depth: usize) {
        let code = cx.error_code_near(&leaf.pointer, "errorCode");
        let value = cx.result_value(&leaf.pointer);
        cx.add(
            code,
            value,
            "The JSON value shall be a syntactically valid time and date according to RFC3339."
                .to_string(),
        );
    }
}

struct DependenciesExceptionParser;

impl ExceptionParser for DependenciesExceptionParser {
    fn matches(&self, leaf: &ExceptionNode) -> bool {
        matches!(leaf.category, ExceptionCategory::Dependencies { .. })
    }

    fn do_parse(&self, leaf: &ExceptionNode, cx: &mut ExceptionParseContext<'_>, _depth: usize) {
        let ExceptionCategory::Dependencies { key } = &leaf.category else {
            return;
        };
        let code = cx.error_code_near(&leaf.pointer, "dependencies");
        let value = cx.result_value(&leaf.pointer);
        cx.add(
            code,
            value,
            format!(
                "The {} element does not exist but is required by a dependency.",
                key
            ),
        );
    }
}

/// Shared shape of the format-driven parsers: recover the diagnostic by
/// re-running the format validator on the offending value.
fn parse_format_failure(
    leaf: &ExceptionNode,
    cx: &mut ExceptionParseContext<'_>,
    validator: &dyn FormatValidator,
) {
    let offending = pointer::value_at(cx.document, &leaf.pointer);
    let message = validator.validate(&offending).unwrap_or_else(|| {
        format!(
            "[{}] does not conform to the {} format",
            offending,
            validator.format_name()
        )
    });
    let code = cx.error_code_near(&leaf.pointer, "errorCode");
    let value = cx.result_value(&leaf.pointer);
    cx.add(code, value, message);
}

struct Ipv4ExceptionParser;

impl ExceptionParser for Ipv4ExceptionParser {
    fn matches(&self, leaf: &ExceptionNode) -> bool {
        matches!(&leaf.category, ExceptionCategory::Format { format } if format == "ipv4-validation")
    }

    fn do_parse(&self, leaf: &ExceptionNode, cx: &mut ExceptionParseContext<'_>, _depth: usize) {
        let validator = Ipv4FormatValidator::new(Arc::clone(cx.datasets));
        parse_format_failure(leaf, cx, &validator);
    }
}

struct Ipv6ExceptionParser;

impl ExceptionParser for Ipv6ExceptionParser {
    fn matches(&self, leaf: &ExceptionNode) -> bool {
        matches!(&leaf.category, ExceptionCategory::Format { format } if format == "ipv6-validation")
    }

    fn do_parse(&self, leaf: &ExceptionNode, cx: &mut ExceptionParseContext<'_>, _depth: usize) {
        let validator = Ipv6FormatValidator::new(Arc::clone(cx.datasets));
        parse_format_failure(leaf, cx, &validator);
    }
}

struct IdnHostNameExceptionParser;

impl ExceptionParser for IdnHostNameExceptionParser {
    fn matches(&self, leaf: &ExceptionNode) -> bool {
        matches!(&leaf.category, ExceptionCategory::Format { format } if format == "idn-hostname")
    }

    fn do_parse(&self, leaf: &ExceptionNode, cx: &mut ExceptionParseContext<'_>, _depth: usize) {
        parse_format_failure(leaf, cx, &IdnHostNameValidator);
    }
}

struct HostNameInUriExceptionParser;

impl ExceptionParser for HostNameInUriExceptionParser {
    fn matches(&self, leaf: &ExceptionNode) -> bool {
        matches!(&leaf.category, ExceptionCategory::Format { format } if format == "hostname-in-uri")
    }

    fn do_parse(&self, leaf: &ExceptionNode, cx: &mut ExceptionParseContext<'_>, _depth: usize) {
        parse_format_failure(leaf, cx, &HostNameInUriValidator);
    }
}

struct UniqueItemsExceptionParser;

impl ExceptionParser for UniqueItemsExceptionParser {
    fn matches(&self, leaf: &ExceptionNode) -> bool {
        leaf.category == ExceptionCategory::UniqueItems
    }

    fn do_parse(&self, leaf: &ExceptionNode, cx: &mut ExceptionParseContext<'_>, _depth: usize) {
        let code = cx.error_code_near(&leaf.pointer, "errorCode");
        let value = cx.result_value(&leaf.pointer);
        cx.add(
            code,
            value,
            "The values of the array are not unique.".to_string(),
        );
    }
}

struct NumberExceptionParser;

impl ExceptionParser for NumberExceptionParser {
    fn matches(&self, leaf: &ExceptionNode) -> bool {
        leaf.category == ExceptionCategory::Number
    }

    fn do_parse(&self, leaf: &ExceptionNode, cx: &mut ExceptionParseContext<'_>, _depth: usize) {
        let code = cx.error_code_near(&leaf.pointer, "errorCode");
        let value = cx.result_value(&leaf.pointer);
        cx.add(
            code,
            value,
            "The JSON number is not in the authorized range.".to_string(),
        );
    }
}

/// Re-validates the offending fragment against every alternative of the
/// combined schema and fans the inner failures back through the registry.
/// anyOf and oneOf get the same treatment: one result per failing branch
/// with a matching parser.
struct ComplexTypeExceptionParser;

impl ExceptionParser for ComplexTypeExceptionParser {
    fn matches(&self, leaf: &ExceptionNode) -> bool {
        leaf.category == ExceptionCategory::ComplexType
    }

    fn do_parse(&self, leaf: &ExceptionNode, cx: &mut ExceptionParseContext<'_>, depth: usize) {
        if depth >= MAX_COMBINED_DEPTH {
            return;
        }
        let Some(associated) = cx.associated_schema(&leaf.pointer) else {
            return;
        };
        if associated.kind() != SchemaNodeKind::Combined {
            return;
        }
        let Some(instance) = pointer::query(cx.document, &leaf.pointer) else {
            return;
        };
        for alternative in associated.children() {
            let alternative = alternative.dereferenced();
            let compiled = cx.store.compile_fragment(
                alternative.document_name(),
                alternative.schema(),
                cx.datasets,
            );
            let Ok(validator) = compiled else {
                tracing::info!(
                    pointer = %leaf.pointer,
                    "Can't compile combined alternative schema"
                );
                continue;
            };
            let outcome = validator.validate(instance);
            if let Err(errors) = outcome {
                let inner: Vec<ExceptionNode> = leaves_from(errors)
                    .into_iter()
                    .map(|mut inner_leaf| {
                        inner_leaf.pointer = rebase_pointer(&leaf.pointer, &inner_leaf.pointer);
                        inner_leaf
                    })
                    .collect();
                parse_leaves_at_depth(&inner, cx, depth + 1);
            }
        }
    }
}

/// Rebases a pointer reported against a schema fragment onto the pointer
/// of the fragment's instance.
fn rebase_pointer(base: &str, inner: &str) -> String {
    let relative = inner.strip_prefix('#').unwrap_or(inner);
    if relative.is_empty() {
        base.to_string()
    } else {
        format!("{}{}", base, relative)
    }
}
