//! # movies-api
//!
//! An in-memory movie catalogue served over HTTP/JSON on the `may` coroutine
//! runtime.
//!
//! ## Architecture
//!
//! - **[`server`]** - `may_minihttp` service: request parsing, response writing
//! - **[`middleware`]** - CORS policy (applied before routing) and request tracing
//! - **[`router`]** - regex-based matching of the five movie routes
//! - **[`dispatcher`]** - coroutine-per-handler dispatch with panic isolation
//! - **[`handlers`]** - the movie endpoints
//! - **[`validator`]** - typed validation of create and patch payloads
//! - **[`store`]** - the lock-protected catalogue shared by all handlers
//! - **[`movie`]** - record and payload types, genres
//! - **[`seed`]** - initial catalogue loading
//! - **[`cli`]**, **[`logging`]**, **[`runtime_config`]** - process setup
//!
//! ## Request flow
//!
//! ```text
//! request -> parse -> CORS preflight? -> router -> dispatcher -> handler
//!                                                      |            |
//!                                                 middleware     store
//!         <- CORS headers + JSON body <-------------------------------
//! ```
//!
//! ## Embedding
//!
//! ```rust,no_run
//! use movies_api::middleware::CorsMiddleware;
//! use movies_api::runtime_config::DEFAULT_STACK_SIZE;
//! use movies_api::server::{AppService, HttpServer};
//! use movies_api::store::MovieStore;
//! use std::sync::Arc;
//!
//! let store = Arc::new(MovieStore::new());
//! let service = AppService::with_store(store, CorsMiddleware::default(), DEFAULT_STACK_SIZE)?;
//! let handle = HttpServer(service).start("127.0.0.1:1234")?;
//! handle.wait_ready()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cli;
pub mod dispatcher;
pub mod handlers;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod movie;
pub mod registry;
pub mod router;
pub mod runtime_config;
pub mod seed;
pub mod server;
pub mod store;
pub mod validator;
