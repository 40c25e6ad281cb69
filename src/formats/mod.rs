//! Custom `format` keyword validators
//!
//! The RDAP schemas use a handful of formats the generic validator does not
//! ship: dataset-aware IP checks and hostname shapes. Each validator
//! reports a diagnostic string on failure; schema validation only needs the
//! boolean, the exception parsers re-run the validator to recover the
//! message.

mod hostname;
mod ip;

use std::sync::Arc;

use jsonschema::ValidationOptions;

use crate::dataset::RdapDatasetService;

pub use hostname::{HostNameInUriValidator, IdnHostNameValidator};
pub use ip::{Ipv4FormatValidator, Ipv6FormatValidator};

/// One custom `format` implementation.
pub trait FormatValidator: Send + Sync {
    /// The format name as spelled in the schemas.
    fn format_name(&self) -> &'static str;

    /// `None` when `value` conforms, otherwise the diagnostic.
    fn validate(&self, value: &str) -> Option<String>;
}

/// RFC 3339 `date-time`.
#[derive(Debug, Default)]
pub struct DateTimeFormatValidator;

impl FormatValidator for DateTimeFormatValidator {
    fn format_name(&self) -> &'static str {
        "date-time"
    }

    fn validate(&self, value: &str) -> Option<String> {
        match chrono::DateTime::parse_from_rfc3339(value) {
            Ok(_) => None,
            Err(_) => Some(format!(
                "[{}] is not a syntactically valid RFC3339 date-time",
                value
            )),
        }
    }
}

/// Registers every custom format on a validator under construction and
/// turns format validation on.
pub fn apply_custom_formats<'a>(
    options: &'a mut ValidationOptions,
    datasets: &Arc<dyn RdapDatasetService>,
) -> &'a mut ValidationOptions {
    let ipv4 = Ipv4FormatValidator::new(Arc::clone(datasets));
    let ipv6 = Ipv6FormatValidator::new(Arc::clone(datasets));
    let idn = IdnHostNameValidator;
    let host_in_uri = HostNameInUriValidator;
    let date_time = DateTimeFormatValidator;

    options
        .with_format(ipv4.format_name(), move |v| ipv4.validate(v).is_none())
        .with_format(ipv6.format_name(), move |v| ipv6.validate(v).is_none())
        .with_format(idn.format_name(), move |v| idn.validate(v).is_none())
        .with_format(host_in_uri.format_name(), move |v| {
            host_in_uri.validate(v).is_none()
        })
        .with_format(date_time.format_name(), move |v| {
            date_time.validate(v).is_none()
        })
        .should_validate_formats(true)
}
