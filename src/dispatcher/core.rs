//! Dispatcher core module - hot path for request dispatch.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]

use crate::ids::RequestId;
use crate::middleware::Middleware;
use crate::router::{ParamVec, RouteMatch};
use crate::runtime_config::DEFAULT_STACK_SIZE;
use crate::server::RequestBody;
use http::Method;
use may::coroutine;
use may::sync::mpsc;
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage for the hot path. Names are lowercase.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Request data passed to a handler coroutine
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// Unique request ID for tracing and correlation
    pub request_id: RequestId,
    pub method: Method,
    /// Route template the request matched (e.g. `/movies/{id}`)
    pub path: String,
    pub handler_name: String,
    pub path_params: ParamVec,
    pub query_params: ParamVec,
    pub headers: HeaderVec,
    pub body: RequestBody,
    /// Channel for sending the response back to the dispatcher
    pub reply_tx: mpsc::Sender<HandlerResponse>,
}

impl HandlerRequest {
    /// Get a path parameter by name. Last occurrence wins.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name. Last occurrence wins.
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Response data sent back from a handler coroutine.
///
/// A `Value::Null` body is written as an empty body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandlerResponse {
    pub status: u16,
    pub body: Value,
}

impl HandlerResponse {
    #[must_use]
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// JSON response
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        Self::new(status, body)
    }

    /// Status only, empty body
    #[must_use]
    pub fn empty(status: u16) -> Self {
        Self::new(status, Value::Null)
    }

    /// `{"error": message}`
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }))
    }

    /// `{"message": message}`
    #[must_use]
    pub fn message(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "message": message }))
    }
}

/// Type alias for a channel sender that dispatches requests to a handler
pub type HandlerSender = mpsc::Sender<HandlerRequest>;

/// Routes matched requests to registered handler coroutines.
///
/// Each handler runs in its own coroutine and receives requests over a channel;
/// the middleware chain wraps every dispatch.
#[derive(Clone)]
pub struct Dispatcher {
    pub handlers: HashMap<String, HandlerSender>,
    pub middlewares: Vec<Arc<dyn Middleware>>,
    stack_size: usize,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::with_stack_size(DEFAULT_STACK_SIZE)
    }

    /// Dispatcher whose handler coroutines get `stack_size` bytes of stack.
    #[must_use]
    pub fn with_stack_size(stack_size: usize) -> Self {
        Dispatcher {
            handlers: HashMap::new(),
            middlewares: Vec::new(),
            stack_size,
        }
    }

    /// Add middleware to the processing pipeline. Runs in insertion order.
    pub fn add_middleware(&mut self, mw: Arc<dyn Middleware>) {
        self.middlewares.push(mw);
    }

    /// Names of every registered handler.
    #[must_use]
    pub fn handler_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Registers a handler function that will process incoming requests with the given name.
    ///
    /// Spawns a coroutine that drains a channel of requests. Panics inside
    /// `handler_fn` are caught and answered with a 500. Registering the same
    /// name twice replaces the old handler; its coroutine exits once the old
    /// sender is dropped.
    ///
    /// # Safety
    ///
    /// Calls `may::coroutine::Builder::spawn()`, which is unsafe in the `may`
    /// runtime. The caller must ensure:
    /// - the May runtime is configured before the first call
    /// - `handler_fn` sends exactly one response through `reply_tx` per request
    pub unsafe fn register_handler<F>(&mut self, name: &str, handler_fn: F)
    where
        F: Fn(HandlerRequest) + Send + 'static + Clone,
    {
        let (tx, rx) = mpsc::channel::<HandlerRequest>();
        let name = name.to_string();
        let handler_name_for_logging = name.clone();
        let stack_size = self.stack_size;

        // SAFETY: spawn() is unsafe in the may runtime; the closure is Send + 'static
        // and owns everything it touches.
        let spawn_result = unsafe {
            coroutine::Builder::new()
                .name(name.clone())
                .stack_size(stack_size)
                .spawn(move || {
                    debug!(
                        handler_name = %handler_name_for_logging,
                        stack_size = stack_size,
                        "Handler coroutine start"
                    );

                    for req in rx.iter() {
                        let reply_tx = req.reply_tx.clone();
                        let handler_name = req.handler_name.clone();
                        let request_id = req.request_id;
                        let execution_start = Instant::now();

                        if let Err(panic) =
                            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                                handler_fn(req);
                            }))
                        {
                            let message = panic_message(panic.as_ref());
                            error!(
                                request_id = %request_id,
                                handler_name = %handler_name,
                                panic_message = %message,
                                "Handler panicked"
                            );
                            let error_response = HandlerResponse::error(
                                500,
                                &format!("Handler panicked: {message}"),
                            );
                            if reply_tx.send(error_response).is_err() {
                                warn!(request_id = %request_id, "Caller gone before panic response");
                            }
                        } else {
                            debug!(
                                request_id = %request_id,
                                handler_name = %handler_name,
                                execution_time_ms = execution_start.elapsed().as_millis() as u64,
                                "Handler execution complete"
                            );
                        }
                    }
                })
        };

        if let Err(e) = spawn_result {
            error!(
                handler_name = %name,
                error = %e,
                stack_size = stack_size,
                "Failed to spawn handler coroutine"
            );
            return;
        }

        if self.handlers.insert(name.clone(), tx).is_some() {
            warn!(handler_name = %name, "Replaced existing handler - old coroutine will exit");
        } else {
            info!(
                handler_name = %name,
                total_handlers = self.handlers.len(),
                "Handler registered"
            );
        }
    }

    /// Dispatch a request to the handler named by `route_match`.
    ///
    /// Returns `None` if no handler is registered under that name.
    #[must_use]
    pub fn dispatch(
        &self,
        route_match: RouteMatch,
        body: RequestBody,
        headers: HeaderVec,
    ) -> Option<HandlerResponse> {
        let request_id = RequestId::from_header_or_new(
            headers
                .iter()
                .find(|(k, _)| k.as_ref() == "x-request-id")
                .map(|(_, v)| v.as_str()),
        );
        self.dispatch_with_request_id(route_match, body, headers, request_id)
    }

    /// Dispatch with a caller supplied request id (for correlation).
    #[must_use]
    pub fn dispatch_with_request_id(
        &self,
        route_match: RouteMatch,
        body: RequestBody,
        headers: HeaderVec,
        request_id: RequestId,
    ) -> Option<HandlerResponse> {
        let Some(tx) = self.handlers.get(&route_match.handler_name) else {
            error!(
                request_id = %request_id,
                handler_name = %route_match.handler_name,
                available_handlers = ?self.handler_names(),
                "Handler not found"
            );
            return None;
        };

        let RouteMatch {
            route,
            path_params,
            handler_name,
            query_params,
        } = route_match;
        let (reply_tx, reply_rx) = mpsc::channel();
        let request = HandlerRequest {
            request_id,
            method: route.method.clone(),
            path: route.path_pattern.clone(),
            handler_name,
            path_params,
            query_params,
            headers,
            body,
            reply_tx,
        };

        let mut early_resp: Option<HandlerResponse> = None;
        for mw in &self.middlewares {
            if early_resp.is_none() {
                early_resp = mw.before(&request);
                if early_resp.is_some() {
                    debug!(
                        request_id = %request_id,
                        middleware_name = std::any::type_name_of_val(mw.as_ref()),
                        "Middleware returned early response"
                    );
                }
            } else {
                mw.before(&request);
            }
        }

        let (mut resp, latency) = if let Some(r) = early_resp {
            (r, Duration::ZERO)
        } else {
            debug!(
                request_id = %request_id,
                handler_name = %request.handler_name,
                method = %request.method,
                "Request dispatched to handler"
            );

            let start = Instant::now();
            if let Err(e) = tx.send(request.clone()) {
                error!(
                    request_id = %request_id,
                    handler_name = %request.handler_name,
                    error = %e,
                    "Failed to send request to handler"
                );
                return None;
            }

            // may::sync::mpsc has no recv_timeout; handlers always reply or panic.
            let r = match reply_rx.recv() {
                Ok(response) => response,
                Err(e) => {
                    error!(
                        request_id = %request_id,
                        handler_name = %request.handler_name,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        error = %e,
                        "Handler channel closed - handler may have crashed"
                    );
                    return Some(HandlerResponse::error(
                        503,
                        &format!("Handler '{}' is not responding", request.handler_name),
                    ));
                }
            };
            (r, start.elapsed())
        };

        for mw in &self.middlewares {
            mw.after(&request, &mut resp, latency);
        }

        Some(resp)
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}
