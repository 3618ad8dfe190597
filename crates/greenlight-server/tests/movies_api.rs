//! End-to-end tests for the movie API, driven through `Application::handle`.

use std::sync::Arc;

use bytes::Bytes;
use http::{header, Method, Request, Response, StatusCode};
use serde_json::{json, Value};

use greenlight_config::GreenlightConfig;
use greenlight_data::InMemoryMovieStore;
use greenlight_server::{Application, EDIT_CONFLICT_MESSAGE, NOT_FOUND_MESSAGE, VERSION};

const CASABLANCA: &str =
    r#"{"title": "Casablanca", "year": 1942, "runtime": "102 mins", "genres": ["drama", "romance", "war"]}"#;

fn app() -> Application {
    Application::new(GreenlightConfig::default(), Arc::new(InMemoryMovieStore::new()))
}

async fn send(app: &Application, method: Method, uri: &str, body: &str) -> Response<Bytes> {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Bytes::copy_from_slice(body.as_bytes()))
        .unwrap();
    app.handle(req).await
}

fn json_body(res: &Response<Bytes>) -> Value {
    serde_json::from_slice(res.body()).unwrap()
}

fn assert_json_response(res: &Response<Bytes>) {
    assert_eq!(res.headers()[header::CONTENT_TYPE], "application/json");
    let body = res.body();
    assert!(body.ends_with(b"\n"));
    assert!(!body.ends_with(b"\n\n"));
}

#[tokio::test]
async fn healthcheck_reports_status() {
    let app = app();
    let res = send(&app, Method::GET, "/v1/healthcheck", "").await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_json_response(&res);
    assert_eq!(
        json_body(&res),
        json!({
            "status": "available",
            "system_info": {"environment": "development", "version": VERSION}
        })
    );
    assert!(std::str::from_utf8(res.body()).unwrap().contains("\n\t\"status\""));
}

#[tokio::test]
async fn create_then_show() {
    let app = app();

    let res = send(&app, Method::POST, "/v1/movies", CASABLANCA).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_json_response(&res);
    assert_eq!(res.headers()[header::LOCATION], "/v1/movies/1");
    assert_eq!(
        json_body(&res),
        json!({
            "movie": {
                "id": 1,
                "title": "Casablanca",
                "year": 1942,
                "runtime": "102 mins",
                "genres": ["drama", "romance", "war"],
                "version": 1
            }
        })
    );

    let res = send(&app, Method::GET, "/v1/movies/1", "").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(&res)["movie"]["title"], "Casablanca");
}

#[tokio::test]
async fn ids_are_assigned_in_sequence() {
    let app = app();
    send(&app, Method::POST, "/v1/movies", CASABLANCA).await;
    let res = send(&app, Method::POST, "/v1/movies", CASABLANCA).await;
    assert_eq!(res.headers()[header::LOCATION], "/v1/movies/2");
}

#[tokio::test]
async fn missing_and_invalid_ids_are_not_found() {
    let app = app();

    for uri in ["/v1/movies/1", "/v1/movies/0", "/v1/movies/-1", "/v1/movies/abc"] {
        let res = send(&app, Method::GET, uri, "").await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(json_body(&res), json!({"error": NOT_FOUND_MESSAGE}), "{uri}");
    }
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = app();
    let res = send(&app, Method::GET, "/v1/actors", "").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_json_response(&res);
}

#[tokio::test]
async fn unsupported_method_lists_allowed() {
    let app = app();
    let res = send(&app, Method::PUT, "/v1/movies/1", CASABLANCA).await;

    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.headers()[header::ALLOW], "GET, PATCH, DELETE");
    assert_eq!(
        json_body(&res),
        json!({"error": "the PUT method is not supported for this resource"})
    );
}

#[tokio::test]
async fn create_with_empty_object_fails_validation() {
    let app = app();
    let res = send(&app, Method::POST, "/v1/movies", "{}").await;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        json_body(&res),
        json!({
            "error": {
                "genres": "must be provided",
                "runtime": "must be provided",
                "title": "must be provided",
                "year": "must be provided"
            }
        })
    );
}

#[tokio::test]
async fn create_with_duplicate_genres_fails_uniqueness_only() {
    let app = app();
    let body = r#"{"title": "Casablanca", "year": 1942, "runtime": "102 mins", "genres": ["drama", "drama"]}"#;
    let res = send(&app, Method::POST, "/v1/movies", body).await;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        json_body(&res),
        json!({"error": {"genres": "must not contain duplicate values"}})
    );
}

#[tokio::test]
async fn empty_genre_list_differs_from_missing_one() {
    let app = app();
    let cases = [
        (
            r#"{"title": "Casablanca", "year": 1942, "runtime": "102 mins", "genres": []}"#,
            "must contain at least 1 genre",
        ),
        (
            r#"{"title": "Casablanca", "year": 1942, "runtime": "102 mins", "genres": null}"#,
            "must be provided",
        ),
        (
            r#"{"title": "Casablanca", "year": 1942, "runtime": "102 mins"}"#,
            "must be provided",
        ),
    ];

    for (body, message) in cases {
        let res = send(&app, Method::POST, "/v1/movies", body).await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY, "{body}");
        assert_eq!(json_body(&res), json!({"error": {"genres": message}}), "{body}");
    }
}

#[tokio::test]
async fn update_to_empty_genre_list_fails_validation() {
    let app = app();
    send(&app, Method::POST, "/v1/movies", CASABLANCA).await;

    let res = send(&app, Method::PATCH, "/v1/movies/1", r#"{"genres": []}"#).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        json_body(&res),
        json!({"error": {"genres": "must contain at least 1 genre"}})
    );
}

#[tokio::test]
async fn decode_failures_are_bad_requests() {
    let app = app();
    let cases = [
        ("", "body must not be empty"),
        ("   \n", "body must not be empty"),
        (
            r#"{"title": "X", "unknown_field": 1}"#,
            r#"body contains unknown key "unknown_field""#,
        ),
        (
            r#"{"title": "A"}{"title": "B"}"#,
            "body must only contain a single JSON value",
        ),
        (
            r#"{"title": 42}"#,
            r#"body contains incorrect JSON type for field "title""#,
        ),
        (r#"{"title": "Casablanca""#, "body contains badly-formed JSON"),
    ];

    for (body, message) in cases {
        let res = send(&app, Method::POST, "/v1/movies", body).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{body:?}");
        assert_eq!(json_body(&res), json!({"error": message}), "{body:?}");
    }
}

#[tokio::test]
async fn malformed_json_reports_offset() {
    let app = app();
    let res = send(&app, Method::POST, "/v1/movies", r#"{"title": }"#).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let message = json_body(&res)["error"].as_str().unwrap().to_string();
    assert!(
        message.starts_with("body contains badly-formed JSON (at character "),
        "{message}"
    );
}

#[tokio::test]
async fn runtime_in_wrong_format_is_bad_request() {
    let app = app();
    let body = r#"{"title": "Casablanca", "year": 1942, "runtime": "102 minutes", "genres": ["drama"]}"#;
    let res = send(&app, Method::POST, "/v1/movies", body).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(&res),
        json!({"error": r#"body contains incorrect JSON type for field "runtime""#})
    );
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let app = app();
    let body = format!(r#"{{"title": "{}"}}"#, "x".repeat(1_048_576));
    let res = send(&app, Method::POST, "/v1/movies", &body).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(&res),
        json!({"error": "body must not be larger than 1048576 bytes"})
    );
}

#[tokio::test]
async fn partial_update_bumps_version() {
    let app = app();
    send(&app, Method::POST, "/v1/movies", CASABLANCA).await;

    let res = send(&app, Method::PATCH, "/v1/movies/1", r#"{"runtime": "103 mins"}"#).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_json_response(&res);

    let movie = &json_body(&res)["movie"];
    assert_eq!(movie["runtime"], "103 mins");
    assert_eq!(movie["year"], 1942);
    assert_eq!(movie["version"], 2);

    let res = send(&app, Method::GET, "/v1/movies/1", "").await;
    assert_eq!(json_body(&res)["movie"]["version"], 2);
}

#[tokio::test]
async fn update_of_missing_movie_is_not_found() {
    let app = app();
    let res = send(&app, Method::PATCH, "/v1/movies/9", r#"{"year": 1950}"#).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_rejects_unknown_keys() {
    let app = app();
    send(&app, Method::POST, "/v1/movies", CASABLANCA).await;

    let res = send(&app, Method::PATCH, "/v1/movies/1", r#"{"rating": 5}"#).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(&res),
        json!({"error": r#"body contains unknown key "rating""#})
    );
}

#[tokio::test]
async fn stale_update_is_an_edit_conflict() {
    let app = app();
    send(&app, Method::POST, "/v1/movies", CASABLANCA).await;

    // A stale version is rejected by the store.
    let mut stale = app.movies().get(1).await.unwrap();
    send(&app, Method::PATCH, "/v1/movies/1", r#"{"year": 1943}"#).await;
    let err = app.movies().update(&mut stale).await.unwrap_err();
    assert_eq!(err, greenlight_data::DataError::EditConflict);

    let res = greenlight_server::ApiError::from(err).into_response();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(json_body(&res), json!({"error": EDIT_CONFLICT_MESSAGE}));
}

#[tokio::test]
async fn delete_removes_movie() {
    let app = app();
    send(&app, Method::POST, "/v1/movies", CASABLANCA).await;

    let res = send(&app, Method::DELETE, "/v1/movies/1", "").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        json_body(&res),
        json!({"message": "movie successfully deleted"})
    );

    let res = send(&app, Method::DELETE, "/v1/movies/1", "").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = send(&app, Method::GET, "/v1/movies/1", "").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
