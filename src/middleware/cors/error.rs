use std::fmt;

/// CORS configuration error
///
/// Returned by [`CorsMiddleware::new`](super::CorsMiddleware::new) when an
/// allow-list entry cannot be echoed back as a header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsConfigError {
    /// The origin is not of the form `scheme://host[:port]`
    InvalidOriginFormat {
        /// The invalid origin string
        origin: String,
    },
    /// The origin contains characters that are not allowed in a header value
    InvalidOriginCharacters {
        /// The invalid origin string
        origin: String,
    },
}

impl fmt::Display for CorsConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorsConfigError::InvalidOriginFormat { origin } => {
                write!(
                    f,
                    "CORS configuration error: Invalid origin format '{origin}'. \
                    Expected format: scheme://host:port (e.g., http://movies.com)"
                )
            }
            CorsConfigError::InvalidOriginCharacters { origin } => {
                write!(
                    f,
                    "CORS configuration error: Origin '{}' contains whitespace or control characters",
                    origin.escape_debug()
                )
            }
        }
    }
}

impl std::error::Error for CorsConfigError {}
