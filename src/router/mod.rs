//! # Router Module
//!
//! Maps `(method, path)` to a handler name and extracts path parameters.
//!
//! The movie API has a fixed table (see [`movie_routes`]):
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | GET | `/movies` | `list_movies` |
//! | GET | `/movies/{id}` | `get_movie` |
//! | POST | `/movies` | `create_movie` |
//! | PATCH | `/movies/{id}` | `update_movie` |
//! | DELETE | `/movies/{id}` | `delete_movie` |
//!
//! ```rust
//! use movies_api::router::{movie_routes, Router};
//! use http::Method;
//!
//! let router = Router::new(movie_routes()).unwrap();
//! let m = router.route(&Method::GET, "/movies/42").unwrap();
//! assert_eq!(m.handler_name, "get_movie");
//! assert_eq!(m.get_path_param("id"), Some("42"));
//! ```

mod core;
mod routes;

pub use core::{ParamVec, RouteMatch, Router, MAX_INLINE_PARAMS};
pub use routes::{
    movie_routes, RouteMeta, CREATE_MOVIE, DELETE_MOVIE, GET_MOVIE, LIST_MOVIES, UPDATE_MOVIE,
};
