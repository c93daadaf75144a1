use http::Method;

pub const LIST_MOVIES: &str = "list_movies";
pub const GET_MOVIE: &str = "get_movie";
pub const CREATE_MOVIE: &str = "create_movie";
pub const UPDATE_MOVIE: &str = "update_movie";
pub const DELETE_MOVIE: &str = "delete_movie";

/// A single entry of the routing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMeta {
    pub method: Method,
    /// Path template, `{name}` marks a parameter segment
    pub path_pattern: String,
    pub handler_name: String,
}

impl RouteMeta {
    pub fn new(method: Method, path_pattern: &str, handler_name: &str) -> Self {
        Self {
            method,
            path_pattern: path_pattern.to_string(),
            handler_name: handler_name.to_string(),
        }
    }
}

/// The fixed movie routing table.
#[must_use]
pub fn movie_routes() -> Vec<RouteMeta> {
    vec![
        RouteMeta::new(Method::GET, "/movies", LIST_MOVIES),
        RouteMeta::new(Method::GET, "/movies/{id}", GET_MOVIE),
        RouteMeta::new(Method::POST, "/movies", CREATE_MOVIE),
        RouteMeta::new(Method::PATCH, "/movies/{id}", UPDATE_MOVIE),
        RouteMeta::new(Method::DELETE, "/movies/{id}", DELETE_MOVIE),
    ]
}
