//! Response Profile checks
//!
//! Rules over the parsed document plus the query context: label/member
//! consistency between the query URI and the topmost object, and handle
//! conformance against RFC 5730 and the EPP ROID registry.

use std::sync::Arc;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::config::{contains_unicode_label, has_only_ascii_labels, QueryType, RdapValidatorConfig};
use crate::dataset::{DatasetKind, RdapDatasetService};
use crate::pointer;
use crate::result::{RdapValidationResult, RdapValidatorResults};
use crate::schema::{SchemaNode, SchemaStore};

use super::ProfileValidation;

/// `$id` of the shipped domain object schema; handle occurrences are
/// located by concretizing this schema's position in the document.
const DOMAIN_OBJECT_SCHEMA_ID: &str = "https://rdap.example.net/json-schema/rdap_domain.json";
const DOMAIN_SCHEMA_NAME: &str = "rdap_domain.json";

static HANDLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w|_){1,80}-\w{1,8}$").expect("handle pattern"));

/// Query/member consistency: an A-label query demands `ldhName`, a
/// U-label query demands `unicodeName`, on the topmost object.
pub struct QueryValidation<'a> {
    document: &'a Value,
    config: &'a RdapValidatorConfig,
    query_type: QueryType,
    gate: QueryType,
    group: &'static str,
    /// A-label code; the U-label variant is `code - 1`
    pub code: i32,
    pub section_name: &'static str,
}

impl<'a> QueryValidation<'a> {
    pub fn domain(
        document: &'a Value,
        config: &'a RdapValidatorConfig,
        query_type: QueryType,
    ) -> Self {
        Self {
            document,
            config,
            query_type,
            gate: QueryType::Domain,
            group: "rdapResponseProfile_2_1_Validation",
            code: -46100,
            section_name: "2.1",
        }
    }

    pub fn nameserver(
        document: &'a Value,
        config: &'a RdapValidatorConfig,
        query_type: QueryType,
    ) -> Self {
        Self {
            document,
            config,
            query_type,
            gate: QueryType::Nameserver,
            group: "rdapResponseProfile_4_1_Validation",
            code: -49100,
            section_name: "4.1",
        }
    }
}

impl ProfileValidation for QueryValidation<'_> {
    fn group_name(&self) -> &'static str {
        self.group
    }

    fn do_launch(&self) -> bool {
        self.query_type == self.gate
    }

    fn do_validate(&self, results: &mut RdapValidatorResults) -> bool {
        let Some(name) = self.config.queried_name() else {
            return true;
        };
        let mut ok = true;
        if has_only_ascii_labels(&name) && self.document.get("ldhName").is_none() {
            results.add(RdapValidationResult::new(
                self.code,
                self.document.to_string(),
                format!(
                    "The RDAP Query URI contains only A-label or NR-LDH labels, the topmost {} \
                     object does not contain a ldhName member. See section {} of the \
                     RDAP_Response_Profile_2_1.",
                    self.gate, self.section_name
                ),
            ));
            ok = false;
        }
        if contains_unicode_label(&name) && self.document.get("unicodeName").is_none() {
            results.add(RdapValidationResult::new(
                self.code - 1,
                self.document.to_string(),
                format!(
                    "The RDAP Query URI contains one or more U-label, the topmost {} object does \
                     not contain a unicodeName member. See section {} of the \
                     RDAP_Response_Profile_2_1.",
                    self.gate, self.section_name
                ),
            ));
            ok = false;
        }
        ok
    }
}

/// Handle conformance: RFC 5730 shape, then EPP ROID registration of the
/// suffix. The ROID lookup is not attempted on a malformed handle.
pub struct HandleValidation<'a> {
    document: &'a Value,
    store: &'a SchemaStore,
    datasets: &'a Arc<dyn RdapDatasetService>,
    query_type: QueryType,
    gate: QueryType,
    group: &'static str,
    schema_name: &'static str,
    schema_id: &'static str,
    object_name: &'static str,
    /// Format code; the unknown-ROID variant is `code - 1`
    pub code: i32,
}

impl<'a> HandleValidation<'a> {
    pub fn domain(
        document: &'a Value,
        store: &'a SchemaStore,
        datasets: &'a Arc<dyn RdapDatasetService>,
        query_type: QueryType,
    ) -> Self {
        Self {
            document,
            store,
            datasets,
            query_type,
            gate: QueryType::Domain,
            group: "rdapResponseProfile_2_2_Validation",
            schema_name: DOMAIN_SCHEMA_NAME,
            schema_id: DOMAIN_OBJECT_SCHEMA_ID,
            object_name: "domain",
            code: -47102,
        }
    }

    fn validate_handle(
        &self,
        handle_pointer: &str,
        handle: &str,
        results: &mut RdapValidatorResults,
    ) -> bool {
        if !HANDLE_PATTERN.is_match(handle) {
            results.add(RdapValidationResult::new(
                self.code,
                pointer::result_value(self.document, handle_pointer),
                format!(
                    "The handle in the {} object does not comply with the format \
                     (\\w|_){{1,80}}-\\w{{1,8}} specified in RFC5730.",
                    self.object_name
                ),
            ));
            return false;
        }

        let roid = match handle.find('-') {
            Some(index) => &handle[index + 1..],
            None => handle,
        };
        if self.datasets.get(DatasetKind::EppRoid).is_invalid(roid) {
            results.add(RdapValidationResult::new(
                self.code - 1,
                pointer::result_value(self.document, handle_pointer),
                format!(
                    "The globally unique identifier in the {} object handle is not registered \
                     in EPPROID.",
                    self.object_name
                ),
            ));
            return false;
        }
        true
    }
}

impl ProfileValidation for HandleValidation<'_> {
    fn group_name(&self) -> &'static str {
        self.group
    }

    fn do_launch(&self) -> bool {
        self.query_type == self.gate
    }

    fn do_validate(&self, results: &mut RdapValidatorResults) -> bool {
        let Ok(root) = SchemaNode::root(self.store, self.schema_name) else {
            tracing::info!(schema = self.schema_name, "handle check skipped, schema absent");
            return true;
        };
        let pointers = root.find_json_pointers_by_schema_id(self.schema_id, self.document);
        let mut ok = true;
        for object_pointer in pointers.iter() {
            let handle_pointer = if object_pointer == "#" {
                "#/handle".to_string()
            } else {
                format!("{}/handle", object_pointer)
            };
            let Some(handle) =
                pointer::query(self.document, &handle_pointer).and_then(Value::as_str)
            else {
                continue;
            };
            let handle_ok = self.validate_handle(&handle_pointer, handle, results);
            ok = ok && handle_ok;
        }
        ok
    }
}
