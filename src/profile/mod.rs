//! Profile check framework
//!
//! TIG and Response Profile rules that need more than the document shape:
//! reference datasets, HTTP headers, the query URI. Every check is a value
//! object over the run's inputs; the driver launches them in registration
//! order and checks never read each other's results. The only side effect
//! a check may have is appending to the accumulator.

pub mod response;
pub mod tig;

use std::sync::Arc;

use serde_json::Value;

use crate::config::{QueryType, RdapValidatorConfig};
use crate::dataset::RdapDatasetService;
use crate::httpdata::HttpData;
use crate::result::RdapValidatorResults;
use crate::schema::SchemaStore;

pub use response::{HandleValidation, QueryValidation};
pub use tig::{TigValidation1Dot13, TigValidation1Dot2};

/// Contract shared by every profile check.
pub trait ProfileValidation {
    /// Identifier used for logging and report aggregation.
    fn group_name(&self) -> &'static str;

    /// Gate: does this check apply to the current query type?
    fn do_launch(&self) -> bool {
        true
    }

    /// Runs the check. True iff it produced no new results.
    fn do_validate(&self, results: &mut RdapValidatorResults) -> bool;

    /// Gate, group bookkeeping, then the check itself.
    fn validate(&self, results: &mut RdapValidatorResults) -> bool {
        if !self.do_launch() {
            return true;
        }
        tracing::debug!(group = self.group_name(), "launching profile validation");
        results.add_group(self.group_name());
        let ok = self.do_validate(results);
        if !ok {
            results.add_group_error(self.group_name());
        }
        ok
    }
}

/// The run inputs the registry builds its checks over.
pub struct ProfileContext<'a> {
    /// Parsed response document; absent when the body was not JSON
    pub document: Option<&'a Value>,
    pub config: &'a RdapValidatorConfig,
    pub query_type: QueryType,
    pub datasets: &'a Arc<dyn RdapDatasetService>,
    pub http: &'a HttpData,
    pub store: &'a SchemaStore,
}

/// The enumerated rule set, in registration order. Checks over the parsed
/// document are only built when the body parsed.
pub fn registry<'a>(cx: &ProfileContext<'a>) -> Vec<Box<dyn ProfileValidation + 'a>> {
    let mut checks: Vec<Box<dyn ProfileValidation + 'a>> = vec![
        Box::new(TigValidation1Dot2::new(cx.http)),
        Box::new(TigValidation1Dot13::new(cx.http)),
    ];
    if let Some(document) = cx.document {
        checks.push(Box::new(QueryValidation::domain(
            document,
            cx.config,
            cx.query_type,
        )));
        checks.push(Box::new(QueryValidation::nameserver(
            document,
            cx.config,
            cx.query_type,
        )));
        checks.push(Box::new(HandleValidation::domain(
            document,
            cx.store,
            cx.datasets,
            cx.query_type,
        )));
    }
    checks
}

/// Launches every check in order. True iff none produced results.
pub fn run_all(
    checks: &[Box<dyn ProfileValidation + '_>],
    results: &mut RdapValidatorResults,
) -> bool {
    let mut ok = true;
    for check in checks {
        let check_ok = check.validate(results);
        ok = ok && check_ok;
    }
    ok
}
