//! Handler registry: binds each route's handler name to its coroutine.

use std::sync::Arc;

use tracing::warn;

use crate::dispatcher::{Dispatcher, HandlerRequest, HandlerResponse};
use crate::handlers::movies;
use crate::router::{CREATE_MOVIE, DELETE_MOVIE, GET_MOVIE, LIST_MOVIES, UPDATE_MOVIE};
use crate::store::MovieStore;

type MovieHandler = fn(&MovieStore, &HandlerRequest) -> HandlerResponse;

const HANDLERS: [(&str, MovieHandler); 5] = [
    (LIST_MOVIES, movies::list_movies),
    (GET_MOVIE, movies::get_movie),
    (CREATE_MOVIE, movies::create_movie),
    (UPDATE_MOVIE, movies::update_movie),
    (DELETE_MOVIE, movies::delete_movie),
];

/// Register every movie handler on `dispatcher`, sharing `store`.
///
/// # Safety
///
/// Spawns coroutines via [`Dispatcher::register_handler`]; the `may` runtime
/// must be configured first.
pub unsafe fn register_all(dispatcher: &mut Dispatcher, store: Arc<MovieStore>) {
    for (name, handler) in HANDLERS {
        let store = Arc::clone(&store);
        // SAFETY: forwarded from the caller's contract.
        unsafe {
            dispatcher.register_handler(name, move |req: HandlerRequest| {
                let response = handler(&store, &req);
                if req.reply_tx.send(response).is_err() {
                    warn!(
                        request_id = %req.request_id,
                        handler_name = %req.handler_name,
                        "Caller gone before response was sent"
                    );
                }
            });
        }
    }
}
