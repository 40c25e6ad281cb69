//! Hostname shape formats
//!
//! `idn-hostname` accepts both LDH and U-label forms; the check is on label
//! shape, not on punycode round-trips. `hostname-in-uri` applies the same
//! rules to the host of a URI-valued string.

use url::Url;

use super::FormatValidator;

const MAX_NAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

fn label_is_valid(label: &str) -> bool {
    if label.is_empty() || label.len() > MAX_LABEL_LEN {
        return false;
    }
    if label.starts_with('-') || label.ends_with('-') {
        return false;
    }
    label
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || !c.is_ascii())
}

fn hostname_is_valid(name: &str) -> bool {
    let name = name.strip_suffix('.').unwrap_or(name);
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return false;
    }
    name.split('.').all(label_is_valid)
}

/// `idn-hostname` format.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdnHostNameValidator;

impl FormatValidator for IdnHostNameValidator {
    fn format_name(&self) -> &'static str {
        "idn-hostname"
    }

    fn validate(&self, value: &str) -> Option<String> {
        if hostname_is_valid(value) {
            None
        } else {
            Some(format!("[{}] is not a valid idn-hostname", value))
        }
    }
}

/// `hostname-in-uri` format.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostNameInUriValidator;

impl FormatValidator for HostNameInUriValidator {
    fn format_name(&self) -> &'static str {
        "hostname-in-uri"
    }

    fn validate(&self, value: &str) -> Option<String> {
        let error = || Some(format!("[{}] does not contain a valid host name", value));
        let Ok(uri) = Url::parse(value) else {
            return error();
        };
        match uri.host_str() {
            Some(host) if hostname_is_valid(host) => None,
            _ => error(),
        }
    }
}
