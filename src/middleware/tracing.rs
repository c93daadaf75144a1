use std::time::Duration;

use tracing::{info, warn};

use super::Middleware;
use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Emits one structured log line per handled request.
///
/// 4xx responses are logged at `warn`, everything else at `info`.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn after(&self, req: &HandlerRequest, res: &mut HandlerResponse, latency: Duration) {
        let latency_ms = latency.as_secs_f64() * 1000.0;
        if (400..500).contains(&res.status) {
            warn!(
                request_id = %req.request_id,
                method = %req.method,
                route = %req.path,
                handler = %req.handler_name,
                status = res.status,
                latency_ms,
                "Request rejected"
            );
        } else {
            info!(
                request_id = %req.request_id,
                method = %req.method,
                route = %req.path,
                handler = %req.handler_name,
                status = res.status,
                latency_ms,
                "Request handled"
            );
        }
    }
}
