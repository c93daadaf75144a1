mod core;
mod cors;
mod tracing;

pub use core::Middleware;
pub use cors::{
    CorsConfigError, CorsHeaders, CorsMiddleware, ALLOW_HEADERS, ALLOW_METHODS,
    DEFAULT_ALLOWED_ORIGINS,
};
pub use tracing::TracingMiddleware;
