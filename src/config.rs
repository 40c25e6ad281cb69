//! Validator configuration and query-type derivation
//!
//! The engine validates exactly one query URI per run. The query type is
//! derived from the URI path (RFC 7482 segment conventions) and gates which
//! profile checks launch.

use std::fmt;

use percent_encoding::percent_decode_str;
use url::Url;

/// RDAP query categories, derived from the query URI path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Domain,
    Nameserver,
    Nameservers,
    Entity,
    Help,
}

impl QueryType {
    /// All query types, in a stable order. Used by gating tests.
    pub const ALL: [QueryType; 5] = [
        QueryType::Help,
        QueryType::Nameservers,
        QueryType::Nameserver,
        QueryType::Entity,
        QueryType::Domain,
    ];

    /// Derives the query type from an RDAP query URI.
    ///
    /// Recognized path shapes: `/domain/<name>`, `/nameserver/<name>`,
    /// `/nameservers?ip=...`, `/entity/<handle>`, `/help`.
    pub fn from_uri(uri: &Url) -> Option<QueryType> {
        let mut segments = uri.path_segments()?;
        segments.find_map(|segment| match segment {
            "domain" => Some(QueryType::Domain),
            "nameserver" => Some(QueryType::Nameserver),
            "nameservers" => Some(QueryType::Nameservers),
            "entity" => Some(QueryType::Entity),
            "help" => Some(QueryType::Help),
            _ => None,
        })
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryType::Domain => "DOMAIN",
            QueryType::Nameserver => "NAMESERVER",
            QueryType::Nameservers => "NAMESERVERS",
            QueryType::Entity => "ENTITY",
            QueryType::Help => "HELP",
        };
        write!(f, "{}", name)
    }
}

/// Configuration consumed by the engine: the query URI and what derives
/// from it.
#[derive(Debug, Clone)]
pub struct RdapValidatorConfig {
    uri: Url,
}

impl RdapValidatorConfig {
    pub fn new(uri: Url) -> Self {
        Self { uri }
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// Query type derived from the URI path, if recognizable.
    pub fn query_type(&self) -> Option<QueryType> {
        QueryType::from_uri(&self.uri)
    }

    /// The queried name: the last path segment, percent-decoded.
    ///
    /// `Url` percent-encodes non-ASCII path input, so U-labels in the
    /// original query only show after decoding.
    pub fn queried_name(&self) -> Option<String> {
        let last = self.uri.path_segments()?.next_back()?;
        if last.is_empty() {
            return None;
        }
        Some(percent_decode_str(last).decode_utf8_lossy().into_owned())
    }
}

/// True iff every label of `name` is an A-label or NR-LDH label, i.e. the
/// whole name is ASCII.
pub fn has_only_ascii_labels(name: &str) -> bool {
    name.is_ascii()
}

/// True iff `name` carries at least one U-label.
pub fn contains_unicode_label(name: &str) -> bool {
    !name.is_ascii()
}
