//! Seed dataset loading.
//!
//! The store starts from `data/movies.json`, compiled into the binary, unless a
//! file is given on the command line.

use crate::movie::Movie;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Dataset bundled with the binary.
pub const BUNDLED_SEED: &str = include_str!("../data/movies.json");

/// Parse a JSON array of movies.
pub fn parse_seed(json: &str) -> Result<Vec<Movie>> {
    serde_json::from_str(json).context("seed dataset is not a JSON array of movies")
}

/// Load the seed from `path`, or the bundled dataset when `path` is `None`.
pub fn load_seed(path: Option<&Path>) -> Result<Vec<Movie>> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read seed file {}", path.display()))?;
            let movies = parse_seed(&content)
                .with_context(|| format!("invalid seed file {}", path.display()))?;
            info!(path = %path.display(), movie_count = movies.len(), "Seed loaded from file");
            Ok(movies)
        }
        None => {
            let movies = parse_seed(BUNDLED_SEED)?;
            info!(movie_count = movies.len(), "Bundled seed loaded");
            Ok(movies)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_bundled_seed_parses_with_unique_ids() {
        let movies = load_seed(None).unwrap();
        assert!(!movies.is_empty());
        assert!(crate::store::MovieStore::from_seed(movies).is_ok());
    }

    #[test]
    fn test_load_seed_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id":"1","title":"Title A","year":1999,"director":"D","duration":90,
                "rating":8,"poster":"http://x","genre":["Drama"]}}]"#
        )
        .unwrap();
        let movies = load_seed(Some(file.path())).unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].id, "1");
    }

    #[test]
    fn test_load_seed_reports_bad_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"not":"an array"}}"#).unwrap();
        let err = load_seed(Some(file.path())).unwrap_err();
        assert!(format!("{err:#}").contains("invalid seed file"));

        let missing = load_seed(Some(Path::new("/definitely/not/here.json"))).unwrap_err();
        assert!(format!("{missing:#}").contains("failed to read seed file"));
    }
}
