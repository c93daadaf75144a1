//! Identifier generation.
//!
//! Requests are tagged with a ULID so log lines for one request sort together;
//! movies get a random UUID v4 so ids are unguessable and never reused.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Request correlation id, backed by a ULID.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct RequestId(pub ulid::Ulid);

impl RequestId {
    #[must_use]
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    /// Reuse a client supplied `x-request-id` when it is a valid ULID, otherwise mint one.
    #[must_use]
    pub fn from_header_or_new(header_value: Option<&str>) -> Self {
        header_value
            .and_then(|s| s.parse::<RequestId>().ok())
            .unwrap_or_default()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for RequestId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ulid::Ulid::from_string(s).map(RequestId)
    }
}

/// Fresh movie id: 128 random bits in the standard UUID v4 layout.
#[must_use]
pub fn new_movie_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
