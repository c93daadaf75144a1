//! Movie records and the typed payloads that create or patch them.
//!
//! `MovieData` and `MoviePatch` are only produced by the [`validator`](crate::validator);
//! neither carries an `id`, so a write payload can never choose or change one.

mod genre;

pub use genre::{Genre, UnknownGenre};

use serde::{Deserialize, Serialize};

/// A stored movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: String,
    pub title: String,
    pub year: i32,
    pub director: String,
    /// Running time in minutes
    pub duration: u32,
    #[serde(alias = "rate")]
    pub rating: f64,
    pub poster: String,
    pub genre: Vec<Genre>,
}

/// Every field of a movie except its id, fully validated.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieData {
    pub title: String,
    pub year: i32,
    pub director: String,
    pub duration: u32,
    pub rating: f64,
    pub poster: String,
    pub genre: Vec<Genre>,
}

/// The validated subset of fields supplied to a PATCH.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoviePatch {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub director: Option<String>,
    pub duration: Option<u32>,
    pub rating: Option<f64>,
    pub poster: Option<String>,
    pub genre: Option<Vec<Genre>>,
}

impl MoviePatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == MoviePatch::default()
    }
}

impl Movie {
    #[must_use]
    pub fn from_data(id: String, data: MovieData) -> Self {
        let MovieData {
            title,
            year,
            director,
            duration,
            rating,
            poster,
            genre,
        } = data;
        Self {
            id,
            title,
            year,
            director,
            duration,
            rating,
            poster,
            genre,
        }
    }

    /// Overlay the supplied fields; absent fields and the id are left untouched.
    pub fn apply(&mut self, patch: MoviePatch) {
        let MoviePatch {
            title,
            year,
            director,
            duration,
            rating,
            poster,
            genre,
        } = patch;
        if let Some(title) = title {
            self.title = title;
        }
        if let Some(year) = year {
            self.year = year;
        }
        if let Some(director) = director {
            self.director = director;
        }
        if let Some(duration) = duration {
            self.duration = duration;
        }
        if let Some(rating) = rating {
            self.rating = rating;
        }
        if let Some(poster) = poster {
            self.poster = poster;
        }
        if let Some(genre) = genre {
            self.genre = genre;
        }
    }

    /// True if any of the movie's genres equals `lowercase_filter` ignoring case.
    #[must_use]
    pub fn has_genre(&self, lowercase_filter: &str) -> bool {
        self.genre.iter().any(|g| g.matches(lowercase_filter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Movie {
        Movie {
            id: "1".to_string(),
            title: "Title A".to_string(),
            year: 1994,
            director: "Someone".to_string(),
            duration: 142,
            rating: 9.3,
            poster: "https://example.com/a.jpg".to_string(),
            genre: vec![Genre::Drama],
        }
    }

    #[test]
    fn test_apply_overlays_only_present_fields() {
        let mut movie = sample();
        movie.apply(MoviePatch {
            year: Some(2001),
            genre: Some(vec![Genre::Crime, Genre::Thriller]),
            ..MoviePatch::default()
        });
        assert_eq!(movie.id, "1");
        assert_eq!(movie.title, "Title A");
        assert_eq!(movie.year, 2001);
        assert_eq!(movie.genre, vec![Genre::Crime, Genre::Thriller]);
        assert_eq!(movie.duration, 142);
    }

    #[test]
    fn test_empty_patch_is_noop() {
        let mut movie = sample();
        let patch = MoviePatch::default();
        assert!(patch.is_empty());
        movie.apply(patch);
        assert_eq!(movie, sample());
    }

    #[test]
    fn test_deserialize_accepts_rate_alias() {
        let movie: Movie = serde_json::from_value(serde_json::json!({
            "id": "x",
            "title": "T",
            "year": 2000,
            "director": "D",
            "duration": 90,
            "rate": 6.5,
            "poster": "http://x",
            "genre": ["Comedy"]
        }))
        .unwrap();
        assert_eq!(movie.rating, 6.5);
        let out = serde_json::to_value(&movie).unwrap();
        assert_eq!(out["rating"], 6.5);
        assert!(out.get("rate").is_none());
    }

    #[test]
    fn test_has_genre() {
        let movie = sample();
        assert!(movie.has_genre("drama"));
        assert!(!movie.has_genre("action"));
    }
}
