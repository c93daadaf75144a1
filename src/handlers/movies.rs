//! Movie endpoint handlers.
//!
//! Each handler turns a [`HandlerRequest`] into a store call and the store's
//! answer into a [`HandlerResponse`]. None of them touch the network.

use std::borrow::Cow;

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::dispatcher::{HandlerRequest, HandlerResponse};
use crate::server::RequestBody;
use crate::store::{MovieStore, StoreError};
use crate::validator::{validate_full, validate_partial, IssueKind, ValidationError};

pub const MOVIE_NOT_FOUND: &str = "Movie not found";
pub const MOVIE_DELETED: &str = "Movie deleted";

/// `GET /movies[?genre=<name>]`
pub fn list_movies(store: &MovieStore, req: &HandlerRequest) -> HandlerResponse {
    let genre = req.get_query_param("genre").filter(|g| !g.is_empty());
    let movies = store.list(genre);
    debug!(
        request_id = %req.request_id,
        genre = ?genre,
        count = movies.len(),
        "Movies listed"
    );
    to_json(200, &movies)
}

/// `GET /movies/{id}`
pub fn get_movie(store: &MovieStore, req: &HandlerRequest) -> HandlerResponse {
    let id = req.get_path_param("id").unwrap_or_default();
    match store.get(id) {
        Some(movie) => to_json(200, &movie),
        None => {
            debug!(request_id = %req.request_id, movie_id = %id, "Movie not found");
            not_found()
        }
    }
}

/// `POST /movies`
pub fn create_movie(store: &MovieStore, req: &HandlerRequest) -> HandlerResponse {
    let data = match payload(&req.body).and_then(|body| validate_full(&body)) {
        Ok(data) => data,
        Err(e) => return bad_request(req, &e),
    };
    let movie = store.create(data);
    to_json(201, &movie)
}

/// `PATCH /movies/{id}`
///
/// The body is validated before the id is looked up, so a bad body on an
/// unknown id is a 400, not a 404.
pub fn update_movie(store: &MovieStore, req: &HandlerRequest) -> HandlerResponse {
    let patch = match payload(&req.body).and_then(|body| validate_partial(&body)) {
        Ok(patch) => patch,
        Err(e) => return bad_request(req, &e),
    };
    let id = req.get_path_param("id").unwrap_or_default();
    match store.update(id, patch) {
        Ok(movie) => to_json(200, &movie),
        Err(e) => store_error(req, &e),
    }
}

/// `DELETE /movies/{id}`
pub fn delete_movie(store: &MovieStore, req: &HandlerRequest) -> HandlerResponse {
    let id = req.get_path_param("id").unwrap_or_default();
    match store.delete(id) {
        Ok(_) => HandlerResponse::message(200, MOVIE_DELETED),
        Err(e) => store_error(req, &e),
    }
}

/// Body as JSON. An absent body validates as `{}`.
fn payload(body: &RequestBody) -> Result<Cow<'_, Value>, ValidationError> {
    match body {
        RequestBody::Empty => Ok(Cow::Owned(Value::Object(serde_json::Map::new()))),
        RequestBody::Json(value) => Ok(Cow::Borrowed(value)),
        RequestBody::Malformed(reason) => Err(ValidationError::single(
            "body",
            IssueKind::InvalidJson,
            format!("Request body is not valid JSON: {reason}"),
        )),
    }
}

fn bad_request(req: &HandlerRequest, err: &ValidationError) -> HandlerResponse {
    warn!(
        request_id = %req.request_id,
        handler = %req.handler_name,
        error = %err,
        "Payload rejected"
    );
    HandlerResponse::json(400, json!({ "error": err.issues() }))
}

fn store_error(req: &HandlerRequest, err: &StoreError) -> HandlerResponse {
    match err {
        StoreError::NotFound { id } => {
            debug!(request_id = %req.request_id, movie_id = %id, "Movie not found");
            not_found()
        }
        StoreError::DuplicateId { .. } => HandlerResponse::error(500, &err.to_string()),
    }
}

fn not_found() -> HandlerResponse {
    HandlerResponse::message(404, MOVIE_NOT_FOUND)
}

fn to_json<T: serde::Serialize>(status: u16, value: &T) -> HandlerResponse {
    match serde_json::to_value(value) {
        Ok(body) => HandlerResponse::json(status, body),
        Err(e) => HandlerResponse::error(500, &format!("Failed to serialize response: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::RequestId;
    use crate::movie::{Genre, Movie};
    use crate::router::ParamVec;
    use http::Method;
    use may::sync::mpsc;
    use std::sync::Arc;

    fn seeded() -> MovieStore {
        let movie: Movie = serde_json::from_value(json!({
            "id": "1",
            "title": "Title A",
            "year": 1994,
            "director": "Someone",
            "duration": 120,
            "rating": 8.1,
            "poster": "http://posters.example/a.jpg",
            "genre": ["Drama", "Crime"]
        }))
        .unwrap();
        MovieStore::from_seed(vec![movie]).unwrap()
    }

    fn request(
        handler_name: &str,
        id: Option<&str>,
        query: &[(&str, &str)],
        body: RequestBody,
    ) -> HandlerRequest {
        let (reply_tx, _reply_rx) = mpsc::channel();
        let mut path_params = ParamVec::new();
        if let Some(id) = id {
            path_params.push((Arc::from("id"), id.to_string()));
        }
        HandlerRequest {
            request_id: RequestId::new(),
            method: Method::GET,
            path: "/movies".into(),
            handler_name: handler_name.into(),
            path_params,
            query_params: query
                .iter()
                .map(|(k, v)| (Arc::from(*k), (*v).to_string()))
                .collect(),
            headers: Default::default(),
            body,
            reply_tx,
        }
    }

    fn new_movie() -> Value {
        json!({
            "title": "New",
            "year": 2020,
            "director": "D",
            "duration": 100,
            "rating": 7.5,
            "poster": "http://x",
            "genre": ["Action"]
        })
    }

    fn call(
        handler: fn(&MovieStore, &HandlerRequest) -> HandlerResponse,
        store: &MovieStore,
        id: Option<&str>,
        body: RequestBody,
    ) -> HandlerResponse {
        handler(store, &request("test", id, &[], body))
    }

    fn list(store: &MovieStore, genre: &str) -> HandlerResponse {
        list_movies(store, &request(LIST, None, &[("genre", genre)], RequestBody::Empty))
    }

    const LIST: &str = "list_movies";

    #[test]
    fn test_list_with_genre_filter() {
        let store = seeded();
        let res = list(&store, "drama");
        assert_eq!(res.status, 200);
        assert_eq!(res.body.as_array().unwrap().len(), 1);
        assert_eq!(list(&store, "Horror").body, json!([]));
    }

    #[test]
    fn test_list_empty_genre_means_no_filter() {
        let store = seeded();
        assert_eq!(list(&store, "").body.as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_get_found_and_missing() {
        let store = seeded();
        let res = call(get_movie, &store, Some("1"), RequestBody::Empty);
        assert_eq!(res.status, 200);
        assert_eq!(res.body["title"], "Title A");

        let res = call(get_movie, &store, Some("nope"), RequestBody::Empty);
        assert_eq!(res, HandlerResponse::message(404, MOVIE_NOT_FOUND));
    }

    #[test]
    fn test_create_returns_201_with_fresh_id() {
        let store = seeded();
        let res = call(create_movie, &store, None, RequestBody::Json(new_movie()));
        assert_eq!(res.status, 201);
        let id = res.body["id"].as_str().unwrap();
        assert_ne!(id, "1");
        assert_eq!(res.body["genre"], json!(["Action"]));
        assert_eq!(store.len(), 2);
        assert_eq!(serde_json::to_value(store.get(id).unwrap()).unwrap(), res.body);
    }

    #[test]
    fn test_create_ignores_body_id() {
        let store = seeded();
        let mut body = new_movie();
        body["id"] = json!("1");
        let res = call(create_movie, &store, None, RequestBody::Json(body));
        assert_eq!(res.status, 201);
        let id = res.body["id"].as_str().unwrap();
        assert_ne!(id, "1");
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("1").unwrap().title, "Title A");
    }

    #[test]
    fn test_create_missing_title_is_400() {
        let store = seeded();
        let mut body = new_movie();
        body.as_object_mut().unwrap().remove("title");
        let res = call(create_movie, &store, None, RequestBody::Json(body));
        assert_eq!(res.status, 400);
        let issues = res.body["error"].as_array().unwrap();
        assert!(issues
            .iter()
            .any(|i| i["field"] == "title" && i["kind"] == "missing"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_create_empty_body_reports_every_field() {
        let store = seeded();
        let res = call(create_movie, &store, None, RequestBody::Empty);
        assert_eq!(res.status, 400);
        assert_eq!(res.body["error"].as_array().unwrap().len(), 7);
    }

    #[test]
    fn test_malformed_body_is_400() {
        let store = seeded();
        let res = call(create_movie, &store, None, RequestBody::Malformed("eof".into()));
        assert_eq!(res.status, 400);
        assert_eq!(res.body["error"][0]["field"], "body");
        assert_eq!(res.body["error"][0]["kind"], "invalid_json");
    }

    #[test]
    fn test_update_overlays_supplied_fields_and_ignores_id() {
        let store = seeded();
        let body = json!({"id": "hijack", "year": 2001, "genre": ["Sci-Fi"]});
        let res = call(update_movie, &store, Some("1"), RequestBody::Json(body));
        assert_eq!(res.status, 200);
        assert_eq!(res.body["id"], "1");
        assert_eq!(res.body["year"], 2001);
        assert_eq!(res.body["title"], "Title A");
        assert_eq!(store.get("1").unwrap().genre, vec![Genre::SciFi]);
        assert!(store.get("hijack").is_none());
    }

    #[test]
    fn test_update_validates_before_lookup() {
        let store = seeded();
        let bad = RequestBody::Json(json!({"year": 1500}));
        assert_eq!(call(update_movie, &store, Some("missing"), bad).status, 400);

        let good = RequestBody::Json(json!({"year": 2000}));
        assert_eq!(
            call(update_movie, &store, Some("missing"), good),
            HandlerResponse::message(404, MOVIE_NOT_FOUND)
        );
    }

    #[test]
    fn test_delete_then_delete_again() {
        let store = seeded();
        let first = call(delete_movie, &store, Some("1"), RequestBody::Empty);
        assert_eq!(first, HandlerResponse::message(200, MOVIE_DELETED));
        let second = call(delete_movie, &store, Some("1"), RequestBody::Empty);
        assert_eq!(second, HandlerResponse::message(404, MOVIE_NOT_FOUND));
        assert!(store.is_empty());
    }
}
