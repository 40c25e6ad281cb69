//! Captured RDAP HTTP exchange
//!
//! The engine never talks to the network; the embedding client hands it the
//! final response together with the redirect chain that produced it. Header
//! checks (CORS, HTTPS-only) walk the chain from the final hop backwards.

use http::{HeaderMap, StatusCode};
use url::Url;

/// One captured HTTP response, linked to the response it was redirected
/// from, if any.
#[derive(Debug, Clone)]
pub struct HttpData {
    uri: Url,
    status: StatusCode,
    headers: HeaderMap,
    body: String,
    previous: Option<Box<HttpData>>,
}

impl HttpData {
    pub fn new(uri: Url, status: StatusCode, headers: HeaderMap, body: impl Into<String>) -> Self {
        Self {
            uri,
            status,
            headers,
            body: body.into(),
            previous: None,
        }
    }

    /// Attaches the response this one was redirected from.
    pub fn with_previous(mut self, previous: HttpData) -> Self {
        self.previous = Some(Box::new(previous));
        self
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// This response followed by every earlier hop of the redirect chain.
    pub fn chain(&self) -> Chain<'_> {
        Chain {
            next: Some(self),
        }
    }

    /// All values of `name`, as UTF-8 strings. Non-UTF-8 values are skipped.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// Deterministic dump of the header map, `name=[v1, v2]` sorted by
    /// name. Used as the result value by header checks.
    pub fn header_dump(&self) -> String {
        let mut names: Vec<&str> = self.headers.keys().map(|n| n.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        names
            .iter()
            .map(|name| format!("{}=[{}]", name, self.header_values(name).join(", ")))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Iterator over a redirect chain, newest hop first.
pub struct Chain<'a> {
    next: Option<&'a HttpData>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a HttpData;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.previous.as_deref();
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{HeaderName, HeaderValue};

    fn response(uri: &str) -> HttpData {
        HttpData::new(
            Url::parse(uri).unwrap(),
            StatusCode::OK,
            HeaderMap::new(),
            "{}",
        )
    }

    #[test]
    fn test_chain_walks_newest_first() {
        let first = response("https://a.example/domain/x.example");
        let second = response("https://b.example/domain/x.example").with_previous(first);

        let hosts: Vec<&str> = second
            .chain()
            .map(|r| r.uri().host_str().unwrap())
            .collect();
        assert_eq!(hosts, vec!["b.example", "a.example"]);
    }

    #[test]
    fn test_header_dump_is_sorted_and_grouped() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("content-type"),
            HeaderValue::from_static("application/rdap+json"),
        );
        headers.append(
            HeaderName::from_static("access-control-allow-origin"),
            HeaderValue::from_static("*"),
        );
        let data = HttpData::new(
            Url::parse("https://rdap.example/help").unwrap(),
            StatusCode::OK,
            headers,
            "{}",
        );

        assert_eq!(
            data.header_dump(),
            "access-control-allow-origin=[*], content-type=[application/rdap+json]"
        );
    }

    #[test]
    fn test_header_values_collects_all() {
        let mut headers = HeaderMap::new();
        headers.append(
            HeaderName::from_static("access-control-allow-origin"),
            HeaderValue::from_static("https://a.example"),
        );
        headers.append(
            HeaderName::from_static("access-control-allow-origin"),
            HeaderValue::from_static("*"),
        );
        let data = HttpData::new(
            Url::parse("https://rdap.example/help").unwrap(),
            StatusCode::OK,
            headers,
            "{}",
        );

        assert_eq!(
            data.header_values("access-control-allow-origin"),
            vec!["https://a.example", "*"]
        );
    }
}
