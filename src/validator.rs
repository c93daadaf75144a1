//! # Payload Validator
//!
//! Validates JSON write payloads against the movie shape and turns them into
//! typed [`MovieData`] / [`MoviePatch`] values.
//!
//! Every offending field is reported, not just the first one, so a client can
//! fix a payload in a single round trip:
//!
//! ```rust
//! use movies_api::validator::{validate_full, IssueKind};
//! use serde_json::json;
//!
//! let err = validate_full(&json!({ "year": 1800 })).unwrap_err();
//! assert!(err.issues().iter().any(|i| i.field == "title" && i.kind == IssueKind::Missing));
//! assert!(err.issues().iter().any(|i| i.field == "year" && i.kind == IssueKind::TooSmall));
//! ```
//!
//! Unknown keys are ignored. That includes `id`: a PATCH body carrying an id is
//! accepted and the id is dropped.

use crate::movie::{Genre, MovieData, MoviePatch};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

pub const MIN_YEAR: i64 = 1900;
pub const MAX_YEAR: i64 = 2100;
pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 10.0;

/// Why a field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    Missing,
    InvalidType,
    Empty,
    TooSmall,
    TooBig,
    InvalidEnumValue,
    InvalidUrl,
    InvalidJson,
}

/// A single field-level diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    /// Field name, or `genre[<index>]` for a genre element, or `body` for the payload itself
    pub field: String,
    pub kind: IssueKind,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, kind: IssueKind, message: impl Into<String>) -> Self {
        ValidationIssue {
            field: field.into(),
            kind,
            message: message.into(),
        }
    }
}

/// Rejected payload, carrying every issue found.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    issues: Vec<ValidationIssue>,
}

impl ValidationError {
    #[must_use]
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }

    #[must_use]
    pub fn single(field: &str, kind: IssueKind, message: impl Into<String>) -> Self {
        Self::new(vec![ValidationIssue::new(field, kind, message)])
    }

    #[must_use]
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// True if any issue is reported against `field`.
    #[must_use]
    pub fn mentions(&self, field: &str) -> bool {
        self.issues.iter().any(|i| i.field == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation issue(s)", self.issues.len())?;
        for issue in &self.issues {
            write!(f, "; {}: {}", issue.field, issue.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

type Check<T> = fn(&str, &Value, &mut Vec<ValidationIssue>) -> Option<T>;

/// Validate a complete movie payload (POST).
pub fn validate_full(input: &Value) -> Result<MovieData, ValidationError> {
    let obj = as_object(input)?;
    let mut issues = Vec::new();

    let title = required(obj, "title", check_text, &mut issues);
    let year = required(obj, "year", check_year, &mut issues);
    let director = required(obj, "director", check_text, &mut issues);
    let duration = required(obj, "duration", check_duration, &mut issues);
    let rating = required(obj, "rating", check_rating, &mut issues);
    let poster = required(obj, "poster", check_poster, &mut issues);
    let genre = required(obj, "genre", check_genre, &mut issues);

    match (title, year, director, duration, rating, poster, genre) {
        (
            Some(title),
            Some(year),
            Some(director),
            Some(duration),
            Some(rating),
            Some(poster),
            Some(genre),
        ) if issues.is_empty() => Ok(MovieData {
            title,
            year,
            director,
            duration,
            rating,
            poster,
            genre,
        }),
        _ => Err(ValidationError::new(issues)),
    }
}

/// Validate a partial movie payload (PATCH). Absent fields are not checked;
/// an empty object yields an empty patch.
pub fn validate_partial(input: &Value) -> Result<MoviePatch, ValidationError> {
    let obj = as_object(input)?;
    let mut issues = Vec::new();

    let patch = MoviePatch {
        title: optional(obj, "title", check_text, &mut issues),
        year: optional(obj, "year", check_year, &mut issues),
        director: optional(obj, "director", check_text, &mut issues),
        duration: optional(obj, "duration", check_duration, &mut issues),
        rating: optional(obj, "rating", check_rating, &mut issues),
        poster: optional(obj, "poster", check_poster, &mut issues),
        genre: optional(obj, "genre", check_genre, &mut issues),
    };

    if issues.is_empty() {
        Ok(patch)
    } else {
        Err(ValidationError::new(issues))
    }
}

fn as_object(input: &Value) -> Result<&Map<String, Value>, ValidationError> {
    input.as_object().ok_or_else(|| {
        ValidationError::single(
            "body",
            IssueKind::InvalidType,
            format!("Expected a JSON object, received {}", type_name(input)),
        )
    })
}

fn required<T>(
    obj: &Map<String, Value>,
    field: &str,
    check: Check<T>,
    issues: &mut Vec<ValidationIssue>,
) -> Option<T> {
    match obj.get(field) {
        Some(value) => check(field, value, issues),
        None => {
            issues.push(ValidationIssue::new(
                field,
                IssueKind::Missing,
                format!("Movie {field} is required"),
            ));
            None
        }
    }
}

fn optional<T>(
    obj: &Map<String, Value>,
    field: &str,
    check: Check<T>,
    issues: &mut Vec<ValidationIssue>,
) -> Option<T> {
    obj.get(field).and_then(|value| check(field, value, issues))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn invalid_type(field: &str, expected: &str, value: &Value) -> ValidationIssue {
    ValidationIssue::new(
        field,
        IssueKind::InvalidType,
        format!(
            "Movie {field} must be {expected}, received {}",
            type_name(value)
        ),
    )
}

/// Accepts JSON integers and floats with no fractional part (`2020.0`).
fn as_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .map(|f| f as i64)
    })
}

fn check_text(field: &str, value: &Value, issues: &mut Vec<ValidationIssue>) -> Option<String> {
    match value.as_str() {
        Some(s) if s.trim().is_empty() => {
            issues.push(ValidationIssue::new(
                field,
                IssueKind::Empty,
                format!("Movie {field} must not be empty"),
            ));
            None
        }
        Some(s) => Some(s.to_string()),
        None => {
            issues.push(invalid_type(field, "a string", value));
            None
        }
    }
}

fn check_year(field: &str, value: &Value, issues: &mut Vec<ValidationIssue>) -> Option<i32> {
    let Some(year) = as_integer(value) else {
        issues.push(invalid_type(field, "an integer", value));
        return None;
    };
    if year < MIN_YEAR {
        issues.push(ValidationIssue::new(
            field,
            IssueKind::TooSmall,
            format!("Movie {field} must be greater than or equal to {MIN_YEAR}"),
        ));
        return None;
    }
    if year > MAX_YEAR {
        issues.push(ValidationIssue::new(
            field,
            IssueKind::TooBig,
            format!("Movie {field} must be less than or equal to {MAX_YEAR}"),
        ));
        return None;
    }
    i32::try_from(year).ok()
}

fn check_duration(field: &str, value: &Value, issues: &mut Vec<ValidationIssue>) -> Option<u32> {
    let Some(minutes) = as_integer(value) else {
        issues.push(invalid_type(field, "an integer", value));
        return None;
    };
    if minutes <= 0 {
        issues.push(ValidationIssue::new(
            field,
            IssueKind::TooSmall,
            format!("Movie {field} must be a positive number of minutes"),
        ));
        return None;
    }
    match u32::try_from(minutes) {
        Ok(minutes) => Some(minutes),
        Err(_) => {
            issues.push(ValidationIssue::new(
                field,
                IssueKind::TooBig,
                format!("Movie {field} must be less than or equal to {}", u32::MAX),
            ));
            None
        }
    }
}

fn check_rating(field: &str, value: &Value, issues: &mut Vec<ValidationIssue>) -> Option<f64> {
    let Some(rating) = value.as_f64() else {
        issues.push(invalid_type(field, "a number", value));
        return None;
    };
    if rating < MIN_RATING {
        issues.push(ValidationIssue::new(
            field,
            IssueKind::TooSmall,
            format!("Movie {field} must be greater than or equal to {MIN_RATING}"),
        ));
        return None;
    }
    if rating > MAX_RATING {
        issues.push(ValidationIssue::new(
            field,
            IssueKind::TooBig,
            format!("Movie {field} must be less than or equal to {MAX_RATING}"),
        ));
        return None;
    }
    Some(rating)
}

fn check_poster(field: &str, value: &Value, issues: &mut Vec<ValidationIssue>) -> Option<String> {
    let Some(poster) = value.as_str() else {
        issues.push(invalid_type(field, "a string", value));
        return None;
    };
    match url::Url::parse(poster) {
        Ok(_) => Some(poster.to_string()),
        Err(e) => {
            issues.push(ValidationIssue::new(
                field,
                IssueKind::InvalidUrl,
                format!("Poster must be a valid URL ({e})"),
            ));
            None
        }
    }
}

fn check_genre(
    field: &str,
    value: &Value,
    issues: &mut Vec<ValidationIssue>,
) -> Option<Vec<Genre>> {
    let Some(items) = value.as_array() else {
        issues.push(invalid_type(field, "an array of genres", value));
        return None;
    };
    if items.is_empty() {
        issues.push(ValidationIssue::new(
            field,
            IssueKind::TooSmall,
            format!("Movie {field} must contain at least one genre"),
        ));
        return None;
    }

    let before = issues.len();
    let mut genres = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        let path = format!("{field}[{idx}]");
        match item.as_str() {
            Some(name) => match name.parse::<Genre>() {
                Ok(genre) => genres.push(genre),
                Err(e) => issues.push(ValidationIssue::new(
                    path,
                    IssueKind::InvalidEnumValue,
                    e.to_string(),
                )),
            },
            None => issues.push(invalid_type(&path, "a string", item)),
        }
    }

    (issues.len() == before).then_some(genres)
}
