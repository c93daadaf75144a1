mod error;

pub use error::CorsConfigError;

use http::Method;
use smallvec::SmallVec;
use tracing::{debug, info};

use crate::dispatcher::HandlerResponse;

/// Origins allowed when no explicit allow-list is configured.
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 4] = [
    "http://localhost:8080",
    "http://localhost:1234",
    "http://movies.com",
    "http://spoiler.com",
];

const ALLOW_ORIGIN_PREFIX: &str = "Access-Control-Allow-Origin: ";

const DEFAULT_ORIGIN_LINES: [&str; 4] = [
    "Access-Control-Allow-Origin: http://localhost:8080",
    "Access-Control-Allow-Origin: http://localhost:1234",
    "Access-Control-Allow-Origin: http://movies.com",
    "Access-Control-Allow-Origin: http://spoiler.com",
];

/// Header line advertising the methods the API accepts.
pub const ALLOW_METHODS: &str = "Access-Control-Allow-Methods: GET, POST, PATCH, DELETE";
/// Header line advertising the request headers the API accepts.
pub const ALLOW_HEADERS: &str = "Access-Control-Allow-Headers: Content-Type";

/// Header lines written on a single response. Never more than three.
pub type CorsHeaders = SmallVec<[&'static str; 3]>;

/// CORS (Cross-Origin Resource Sharing) policy
///
/// Runs in front of the router, so it sees every request, including the ones
/// that end up as 404:
///
/// - `OPTIONS` on any path is answered directly with an empty 200
/// - an `Origin` found in the allow-list is echoed in `Access-Control-Allow-Origin`
/// - an absent or unknown `Origin` gets no `Access-Control-Allow-Origin`, the
///   request itself is still served
/// - `Access-Control-Allow-Methods` and `Access-Control-Allow-Headers` are
///   attached to every response
///
/// Origin comparison is exact and case-sensitive.
///
/// # Header lifetime
///
/// `may_minihttp` only accepts `&'static str` header lines. The echo line for
/// each allowed origin is built and leaked once in [`CorsMiddleware::new`], so
/// the request path never allocates for CORS.
#[derive(Debug, Clone)]
pub struct CorsMiddleware {
    allowed: Vec<AllowedOrigin>,
}

#[derive(Debug, Clone)]
struct AllowedOrigin {
    origin: &'static str,
    header_line: &'static str,
}

impl CorsMiddleware {
    /// Build the policy for the given allow-list.
    ///
    /// Duplicates are collapsed. Surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`CorsConfigError`] if an entry is not a `scheme://host` origin
    /// or contains characters that cannot appear in a header value.
    pub fn new<I, S>(origins: I) -> Result<Self, CorsConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut allowed: Vec<AllowedOrigin> = Vec::new();
        for raw in origins {
            let origin = raw.as_ref().trim();
            validate_origin(origin)?;
            if allowed.iter().any(|a| a.origin == origin) {
                continue;
            }
            let line = format!("{ALLOW_ORIGIN_PREFIX}{origin}").into_boxed_str();
            let header_line: &'static str = Box::leak(line);
            let origin = &header_line[ALLOW_ORIGIN_PREFIX.len()..];
            allowed.push(AllowedOrigin {
                origin,
                header_line,
            });
        }
        info!(
            allowed_origins = ?allowed.iter().map(|a| a.origin).collect::<Vec<_>>(),
            "CORS policy configured"
        );
        Ok(Self { allowed })
    }

    /// Origins in the allow-list, in configuration order.
    pub fn allowed_origins(&self) -> impl Iterator<Item = &str> + '_ {
        self.allowed.iter().map(|a| a.origin)
    }

    /// Whether `origin` is in the allow-list.
    #[must_use]
    pub fn is_allowed(&self, origin: &str) -> bool {
        self.allowed.iter().any(|a| a.origin == origin)
    }

    /// Answer a preflight request.
    ///
    /// Returns an empty 200 for `OPTIONS`, `None` for any other method.
    #[must_use]
    pub fn preflight(&self, method: &Method) -> Option<HandlerResponse> {
        if method == Method::OPTIONS {
            debug!("CORS preflight answered");
            Some(HandlerResponse::empty(200))
        } else {
            None
        }
    }

    /// Header lines to attach to a response for a request carrying `origin`.
    #[must_use]
    pub fn response_headers(&self, origin: Option<&str>) -> CorsHeaders {
        let mut headers = CorsHeaders::new();
        if let Some(origin) = origin {
            match self.allowed.iter().find(|a| a.origin == origin) {
                Some(allowed) => headers.push(allowed.header_line),
                None => debug!(origin = %origin, "Origin not in CORS allow-list"),
            }
        }
        headers.push(ALLOW_METHODS);
        headers.push(ALLOW_HEADERS);
        headers
    }
}

impl Default for CorsMiddleware {
    fn default() -> Self {
        let allowed = DEFAULT_ORIGIN_LINES
            .iter()
            .map(|&line| AllowedOrigin {
                origin: &line[ALLOW_ORIGIN_PREFIX.len()..],
                header_line: line,
            })
            .collect();
        Self { allowed }
    }
}

fn validate_origin(origin: &str) -> Result<(), CorsConfigError> {
    if origin.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return Err(CorsConfigError::InvalidOriginCharacters {
            origin: origin.to_string(),
        });
    }
    match origin.split_once("://") {
        Some((scheme, host)) if !scheme.is_empty() && !host.is_empty() => Ok(()),
        _ => Err(CorsConfigError::InvalidOriginFormat {
            origin: origin.to_string(),
        }),
    }
}
