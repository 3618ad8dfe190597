use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, Response, StatusCode};
use serde_json::json;
use tracing::info;

use greenlight_data::{validate_movie, validate_movie_input, Movie, MovieInput, MovieUpdate};
use greenlight_extract::{write_json, Envelope, ExtractionContext, FromRequest, Id, Json};
use greenlight_validator::Validator;

use crate::{ApiError, Application};

fn check(rules: impl FnOnce(&mut Validator)) -> Result<(), ApiError> {
    let mut v = Validator::new();
    rules(&mut v);
    if v.valid() {
        Ok(())
    } else {
        Err(ApiError::ValidationFailed(v.into_errors()))
    }
}

fn movie_response(
    status: StatusCode,
    movie: &Movie,
    headers: Option<&HeaderMap>,
) -> Result<Response<Bytes>, ApiError> {
    let env = Envelope::wrap("movie", movie)?;
    Ok(write_json(status, &env, headers)?)
}

/// `POST /v1/movies`
///
/// # Errors
///
/// Decode failures, validation failures and store failures.
pub async fn create_movie(
    app: &Application,
    ctx: &ExtractionContext,
) -> Result<Response<Bytes>, ApiError> {
    let Json(input) = Json::<MovieInput>::from_request(ctx)?;
    check(|v| validate_movie_input(v, &input))?;

    let mut movie = Movie::from(input);

    app.movies().insert(&mut movie).await?;
    info!(movie.id = movie.id, "movie created");

    let mut headers = HeaderMap::new();
    let location = HeaderValue::from_str(&format!("/v1/movies/{}", movie.id))
        .map_err(ApiError::internal)?;
    headers.insert(header::LOCATION, location);

    movie_response(StatusCode::CREATED, &movie, Some(&headers))
}

/// `GET /v1/movies/{id}`
///
/// # Errors
///
/// An invalid id or a missing record is reported as not found.
pub async fn show_movie(
    app: &Application,
    ctx: &ExtractionContext,
) -> Result<Response<Bytes>, ApiError> {
    let Id(id) = Id::from_request(ctx)?;
    let movie = app.movies().get(id).await?;
    movie_response(StatusCode::OK, &movie, None)
}

/// `PATCH /v1/movies/{id}`
///
/// Only the fields present in the body change; the merged record must pass
/// the same rules as a new one.
///
/// # Errors
///
/// Not found, decode and validation failures, and an edit conflict if the
/// record changed after it was read.
pub async fn update_movie(
    app: &Application,
    ctx: &ExtractionContext,
) -> Result<Response<Bytes>, ApiError> {
    let Id(id) = Id::from_request(ctx)?;
    let mut movie = app.movies().get(id).await?;

    let Json(update) = Json::<MovieUpdate>::from_request(ctx)?;
    update.apply_to(&mut movie);
    check(|v| validate_movie(v, &movie))?;

    app.movies().update(&mut movie).await?;
    info!(movie.id = movie.id, movie.version = movie.version, "movie updated");

    movie_response(StatusCode::OK, &movie, None)
}

/// `DELETE /v1/movies/{id}`
///
/// # Errors
///
/// An invalid id or a missing record is reported as not found.
pub async fn delete_movie(
    app: &Application,
    ctx: &ExtractionContext,
) -> Result<Response<Bytes>, ApiError> {
    let Id(id) = Id::from_request(ctx)?;
    app.movies().delete(id).await?;
    info!(movie.id = id, "movie deleted");

    let env = Envelope::new().with("message", json!("movie successfully deleted"));
    Ok(write_json(StatusCode::OK, &env, None)?)
}
