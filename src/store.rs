//! # Movie Store
//!
//! In-memory, insertion-ordered collection of [`Movie`] records.
//!
//! The store is an ordinary value: build one, wrap it in an `Arc` and hand it
//! to the handlers. `may_minihttp` serves connections on several worker
//! threads, so every operation runs under one `RwLock` guard; a find-then-write
//! sequence never releases the guard halfway through, and no guard is held
//! across a coroutine yield.

use crate::ids::new_movie_id;
use crate::movie::{Movie, MovieData, MoviePatch};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info};

/// Store failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No record carries the requested id
    NotFound { id: String },
    /// Two seed records share an id
    DuplicateId { id: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound { id } => write!(f, "movie '{id}' not found"),
            StoreError::DuplicateId { id } => {
                write!(f, "seed dataset contains movie id '{id}' more than once")
            }
        }
    }
}

impl std::error::Error for StoreError {}

#[derive(Debug, Default)]
pub struct MovieStore {
    movies: RwLock<Vec<Movie>>,
}

impl MovieStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a seed dataset, keeping its order.
    pub fn from_seed(movies: Vec<Movie>) -> Result<Self, StoreError> {
        let mut seen = HashSet::with_capacity(movies.len());
        for movie in &movies {
            if !seen.insert(movie.id.as_str()) {
                return Err(StoreError::DuplicateId {
                    id: movie.id.clone(),
                });
            }
        }
        info!(movie_count = movies.len(), "Movie store seeded");
        Ok(Self {
            movies: RwLock::new(movies),
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.movies.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.movies.read().is_empty()
    }

    /// All movies, or only those tagged with `genre` (compared ignoring case).
    #[must_use]
    pub fn list(&self, genre: Option<&str>) -> Vec<Movie> {
        let movies = self.movies.read();
        match genre {
            None => movies.clone(),
            Some(genre) => {
                let wanted = genre.to_lowercase();
                movies
                    .iter()
                    .filter(|m| m.has_genre(&wanted))
                    .cloned()
                    .collect()
            }
        }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<Movie> {
        self.movies.read().iter().find(|m| m.id == id).cloned()
    }

    /// Append a new movie under a freshly generated id.
    pub fn create(&self, data: MovieData) -> Movie {
        let mut movies = self.movies.write();
        let mut id = new_movie_id();
        while movies.iter().any(|m| m.id == id) {
            debug!(id = %id, "Generated movie id collided, retrying");
            id = new_movie_id();
        }
        let movie = Movie::from_data(id, data);
        movies.push(movie.clone());
        info!(id = %movie.id, movie_count = movies.len(), "Movie created");
        movie
    }

    /// Overlay `patch` on the movie with `id`, keeping its position and id.
    pub fn update(&self, id: &str, patch: MoviePatch) -> Result<Movie, StoreError> {
        let mut movies = self.movies.write();
        let movie = movies
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        movie.apply(patch);
        info!(id = %id, "Movie updated");
        Ok(movie.clone())
    }

    /// Remove the movie with `id`; later movies shift down one position.
    pub fn delete(&self, id: &str) -> Result<Movie, StoreError> {
        let mut movies = self.movies.write();
        let idx = movies
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
        let removed = movies.remove(idx);
        info!(id = %id, movie_count = movies.len(), "Movie deleted");
        Ok(removed)
    }
}
