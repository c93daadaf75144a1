use crate::dispatcher::HeaderVec;
use crate::router::ParamVec;
use may_minihttp::Request;
use serde_json::Value;
use std::io::Read;
use std::sync::Arc;
use tracing::{debug, warn};

/// Body of an incoming request after JSON decoding.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    /// No body, or a body of only whitespace
    #[default]
    Empty,
    /// Body parsed as JSON
    Json(Value),
    /// Body present but not valid JSON; carries the parser message
    Malformed(String),
}

/// Parsed HTTP request data used by `AppService`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRequest {
    /// HTTP method as sent by the client (GET, POST, etc.)
    pub method: String,
    /// Request path with the query string stripped
    pub path: String,
    /// HTTP headers (lowercase names)
    pub headers: HeaderVec,
    /// Parsed query string parameters, in order of appearance
    pub query_params: ParamVec,
    pub body: RequestBody,
}

impl ParsedRequest {
    /// Header value by name, case-insensitive.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Parse query string parameters from a URL path
///
/// Extracts everything after the `?` character and URL-decodes names and
/// values. Repeated names are all kept; lookups take the last one.
pub fn parse_query_params(path: &str) -> ParamVec {
    match path.split_once('?') {
        Some((_, query)) => url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (Arc::<str>::from(&*k), v.into_owned()))
            .collect(),
        None => ParamVec::new(),
    }
}

/// Decode a raw request body.
///
/// Whitespace-only bodies count as absent. Anything else must be JSON; the
/// content type is not consulted.
pub fn parse_body(raw: &str) -> RequestBody {
    if raw.trim().is_empty() {
        return RequestBody::Empty;
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => RequestBody::Json(value),
        Err(e) => RequestBody::Malformed(e.to_string()),
    }
}

/// Parse an incoming HTTP request into a [`ParsedRequest`]
///
/// Headers are copied out first because reading the body consumes the request.
pub fn parse_request(req: Request) -> ParsedRequest {
    let method = req.method().to_string();
    let raw_path = req.path().to_string();
    let path = raw_path.split('?').next().unwrap_or("/").to_string();

    let headers: HeaderVec = req
        .headers()
        .iter()
        .map(|h| {
            (
                Arc::<str>::from(h.name.to_ascii_lowercase()),
                String::from_utf8_lossy(h.value).into_owned(),
            )
        })
        .collect();

    let query_params = parse_query_params(&raw_path);

    let mut raw_body = String::new();
    let body = match req.body().read_to_string(&mut raw_body) {
        Ok(_) => parse_body(&raw_body),
        Err(e) => {
            warn!(method = %method, path = %path, error = %e, "Failed to read request body");
            RequestBody::Malformed(e.to_string())
        }
    };

    debug!(
        method = %method,
        path = %path,
        header_count = headers.len(),
        query_param_count = query_params.len(),
        body_bytes = raw_body.len(),
        "Request parsed"
    );

    ParsedRequest {
        method,
        path,
        headers,
        query_params,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_query_params() {
        let params = parse_query_params("/movies?genre=Sci-Fi&page=2&genre=drama%20x");
        let pairs: Vec<(&str, &str)> = params
            .iter()
            .map(|(k, v)| (&**k, v.as_str()))
            .collect();
        assert_eq!(
            pairs,
            [("genre", "Sci-Fi"), ("page", "2"), ("genre", "drama x")]
        );
    }

    #[test]
    fn test_parse_query_params_without_query() {
        assert!(parse_query_params("/movies").is_empty());
        assert!(parse_query_params("/movies?").is_empty());
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(""), RequestBody::Empty);
        assert_eq!(parse_body(" \r\n"), RequestBody::Empty);
        assert_eq!(
            parse_body(r#"{"title":"x"}"#),
            RequestBody::Json(json!({"title": "x"}))
        );
        assert_eq!(parse_body("[1]"), RequestBody::Json(json!([1])));
        assert!(matches!(parse_body("{title:"), RequestBody::Malformed(_)));
    }

    #[test]
    fn test_header_lookup_case_insensitive() {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("origin"), "http://movies.com".to_string()));
        let req = ParsedRequest {
            method: "GET".into(),
            path: "/movies".into(),
            headers,
            query_params: ParamVec::new(),
            body: RequestBody::Empty,
        };
        assert_eq!(req.header("Origin"), Some("http://movies.com"));
        assert_eq!(req.header("content-type"), None);
    }
}
