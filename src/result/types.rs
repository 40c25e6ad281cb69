//! Single validation result

use serde::Serialize;

/// One conformance finding.
///
/// `code` is the ICANN-assigned identifier of the violated requirement,
/// `value` points a human at the offending data (conventionally
/// `jsonPointer:queryResult`), and `message` cites the governing profile
/// section. Two results are the same finding iff all three fields match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RdapValidationResult {
    /// ICANN-assigned error code (negative; `-999` flags a schema-set bug)
    pub code: i32,
    /// Offending location and value, `pointer:value` by convention
    pub value: String,
    /// Diagnostic citing the profile section
    pub message: String,
}

impl RdapValidationResult {
    /// Creates a result from its three identifying fields.
    pub fn new(code: i32, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            value: value.into(),
            message: message.into(),
        }
    }
}
