use super::request::{parse_request, ParsedRequest};
use super::response::write_handler_response;
use crate::dispatcher::{Dispatcher, HandlerResponse};
use crate::middleware::{CorsMiddleware, TracingMiddleware};
use crate::registry;
use crate::router::{movie_routes, Router};
use crate::store::MovieStore;
use http::Method;
use may_minihttp::{HttpService, Request, Response};
use serde_json::json;
use std::io;
use std::sync::Arc;
use tracing::error;

/// The HTTP service: CORS preflight, routing, dispatch, response.
///
/// Cloned once per connection by `may_minihttp`; every clone shares the same
/// router table, dispatcher and CORS policy.
#[derive(Clone)]
pub struct AppService {
    pub router: Router,
    pub dispatcher: Arc<Dispatcher>,
    pub cors: Arc<CorsMiddleware>,
}

impl AppService {
    pub fn new(router: Router, dispatcher: Arc<Dispatcher>, cors: Arc<CorsMiddleware>) -> Self {
        Self {
            router,
            dispatcher,
            cors,
        }
    }

    /// Wire the movie routes and handlers around `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if a route template fails to compile.
    pub fn with_store(
        store: Arc<MovieStore>,
        cors: CorsMiddleware,
        stack_size: usize,
    ) -> Result<Self, regex::Error> {
        let router = Router::new(movie_routes())?;
        let mut dispatcher = Dispatcher::with_stack_size(stack_size);
        dispatcher.add_middleware(Arc::new(TracingMiddleware));
        // SAFETY: handler coroutines are spawned before the server accepts
        // connections and each registered closure replies exactly once.
        unsafe {
            registry::register_all(&mut dispatcher, store);
        }
        Ok(Self::new(router, Arc::new(dispatcher), Arc::new(cors)))
    }

    /// Produce the response for an already parsed request.
    pub fn handle(&self, req: ParsedRequest) -> HandlerResponse {
        let ParsedRequest {
            method,
            path,
            headers,
            query_params,
            body,
        } = req;

        let Ok(method_parsed) = method.parse::<Method>() else {
            return not_found(&method, &path);
        };

        if let Some(preflight) = self.cors.preflight(&method_parsed) {
            return preflight;
        }

        let Some(mut route_match) = self.router.route(&method_parsed, &path) else {
            return not_found(&method, &path);
        };
        route_match.query_params = query_params;

        match self.dispatcher.dispatch(route_match, body, headers) {
            Some(response) => response,
            None => {
                error!(method = %method, path = %path, "Handler failed or not registered");
                HandlerResponse::json(
                    500,
                    json!({
                        "error": "Handler failed or not registered",
                        "method": method,
                        "path": path
                    }),
                )
            }
        }
    }
}

fn not_found(method: &str, path: &str) -> HandlerResponse {
    HandlerResponse::json(
        404,
        json!({"error": "Not Found", "method": method, "path": path}),
    )
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let parsed = parse_request(req);
        let cors_headers = self.cors.response_headers(parsed.header("origin"));
        let response = self.handle(parsed);
        write_handler_response(res, response.status, &response.body, &cors_headers)
    }
}
