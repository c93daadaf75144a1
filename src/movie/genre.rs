use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of genres a movie can be tagged with.
///
/// Parsing from a payload is case-sensitive (`"Drama"`, not `"drama"`); the
/// list filter compares case-insensitively through [`Genre::matches`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Genre {
    Action,
    Adventure,
    Crime,
    Comedy,
    Drama,
    Fantasy,
    Horror,
    Thriller,
    #[serde(rename = "Sci-Fi")]
    SciFi,
}

impl Genre {
    pub const ALL: [Genre; 9] = [
        Genre::Action,
        Genre::Adventure,
        Genre::Crime,
        Genre::Comedy,
        Genre::Drama,
        Genre::Fantasy,
        Genre::Horror,
        Genre::Thriller,
        Genre::SciFi,
    ];

    /// Wire name, exactly as stored and serialized.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Genre::Action => "Action",
            Genre::Adventure => "Adventure",
            Genre::Crime => "Crime",
            Genre::Comedy => "Comedy",
            Genre::Drama => "Drama",
            Genre::Fantasy => "Fantasy",
            Genre::Horror => "Horror",
            Genre::Thriller => "Thriller",
            Genre::SciFi => "Sci-Fi",
        }
    }

    /// Case-insensitive comparison against an already lowercased filter.
    #[must_use]
    pub fn matches(self, lowercase_filter: &str) -> bool {
        self.as_str().to_lowercase() == lowercase_filter
    }

    /// Comma separated list of every wire name, used in validation messages.
    #[must_use]
    pub fn expected_list() -> String {
        Self::ALL
            .iter()
            .map(|g| g.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the [`Genre`] wire names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownGenre(pub String);

impl fmt::Display for UnknownGenre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid genre '{}'. Expected one of: {}",
            self.0,
            Genre::expected_list()
        )
    }
}

impl std::error::Error for UnknownGenre {}

impl FromStr for Genre {
    type Err = UnknownGenre;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Genre::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| UnknownGenre(s.to_string()))
    }
}
