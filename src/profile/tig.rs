//! Technical Implementation Guide checks
//!
//! These rules inspect the captured HTTP exchange, not the document. Both
//! walk the whole redirect chain: a registry that redirects through a
//! non-conformant hop is still non-conformant.

use crate::httpdata::HttpData;
use crate::result::{RdapValidationResult, RdapValidatorResults};

use super::ProfileValidation;

const CORS_HEADER: &str = "access-control-allow-origin";

/// TIG 1.2: RDAP services are served over HTTPS only.
pub struct TigValidation1Dot2<'a> {
    http: &'a HttpData,
}

impl<'a> TigValidation1Dot2<'a> {
    pub fn new(http: &'a HttpData) -> Self {
        Self { http }
    }
}

impl ProfileValidation for TigValidation1Dot2<'_> {
    fn group_name(&self) -> &'static str {
        "tigSection_1_2_Validation"
    }

    fn do_validate(&self, results: &mut RdapValidatorResults) -> bool {
        let mut ok = true;
        for response in self.http.chain() {
            if response.uri().scheme() != "https" {
                results.add(RdapValidationResult::new(
                    -20100,
                    response.uri().to_string(),
                    "The URL is HTTP, per section 1.2 of the \
                     RDAP_Technical_Implementation_Guide_2_1 shall be HTTPS.",
                ));
                ok = false;
            }
        }
        ok
    }
}

/// TIG 1.13: every response carries `Access-Control-Allow-Origin: *`.
pub struct TigValidation1Dot13<'a> {
    http: &'a HttpData,
}

impl<'a> TigValidation1Dot13<'a> {
    pub fn new(http: &'a HttpData) -> Self {
        Self { http }
    }
}

impl ProfileValidation for TigValidation1Dot13<'_> {
    fn group_name(&self) -> &'static str {
        "tigSection_1_13_Validation"
    }

    fn do_validate(&self, results: &mut RdapValidatorResults) -> bool {
        let mut ok = true;
        for response in self.http.chain() {
            if !response.header_values(CORS_HEADER).contains(&"*") {
                results.add(RdapValidationResult::new(
                    -20500,
                    response.header_dump(),
                    "The HTTP header \"Access-Control-Allow-Origin: *\" is not included in the \
                     HTTP headers. See section 1.13 of the \
                     RDAP_Technical_Implementation_Guide_2_1.",
                ));
                ok = false;
            }
        }
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{HeaderMap, HeaderName, HeaderValue};
    use http::StatusCode;
    use url::Url;

    fn response(uri: &str, cors: Option<&'static str>) -> HttpData {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("content-type"),
            HeaderValue::from_static("application/rdap+json"),
        );
        if let Some(value) = cors {
            headers.insert(
                HeaderName::from_static(CORS_HEADER),
                HeaderValue::from_static(value),
            );
        }
        HttpData::new(Url::parse(uri).unwrap(), StatusCode::OK, headers, "{}")
    }

    #[test]
    fn test_https_chain_passes() {
        let data = response("https://rdap.example/domain/a.example", Some("*"));
        let mut results = RdapValidatorResults::new();
        assert!(TigValidation1Dot2::new(&data).validate(&mut results));
        assert!(results.is_empty());
    }

    #[test]
    fn test_http_hop_fails() {
        let first = response("http://rdap.example/domain/a.example", Some("*"));
        let last = response("https://other.example/domain/a.example", Some("*"))
            .with_previous(first);
        let mut results = RdapValidatorResults::new();

        assert!(!TigValidation1Dot2::new(&last).validate(&mut results));
        assert_eq!(results.len(), 1);
        let result = &results.all()[0];
        assert_eq!(result.code, -20100);
        assert_eq!(result.value, "http://rdap.example/domain/a.example");
    }

    #[test]
    fn test_cors_present_on_whole_chain_passes() {
        let first = response("https://a.example/domain/x.example", Some("*"));
        let last = response("https://b.example/domain/x.example", Some("*")).with_previous(first);
        let mut results = RdapValidatorResults::new();

        assert!(TigValidation1Dot13::new(&last).validate(&mut results));
        assert!(results.is_empty());
    }

    #[test]
    fn test_cors_missing_on_one_hop() {
        // first hop conformant, final hop missing the header
        let first = response("https://a.example/domain/x.example", Some("*"));
        let last = response("https://b.example/domain/x.example", None).with_previous(first);
        let mut results = RdapValidatorResults::new();

        assert!(!TigValidation1Dot13::new(&last).validate(&mut results));
        assert_eq!(results.len(), 1);
        let result = &results.all()[0];
        assert_eq!(result.code, -20500);
        assert_eq!(result.value, last.header_dump());
        assert!(result.message.contains("section 1.13"));
    }

    #[test]
    fn test_cors_any_origin_value_is_not_star() {
        let data = response("https://a.example/help", Some("https://a.example"));
        let mut results = RdapValidatorResults::new();

        assert!(!TigValidation1Dot13::new(&data).validate(&mut results));
        assert_eq!(results.all()[0].code, -20500);
    }
}
