//! Request handlers. Each is a plain function of the store and the request,
//! registered on the dispatcher by [`crate::registry::register_all`].

pub mod movies;

pub use movies::{create_movie, delete_movie, get_movie, list_movies, update_movie};
