//! Endpoint handlers.
//!
//! Each handler reads what it needs from the request's
//! [`ExtractionContext`](greenlight_extract::ExtractionContext) and returns
//! either a complete response or an [`ApiError`](crate::ApiError).

mod healthcheck;
mod movies;

pub use healthcheck::healthcheck;
pub use movies::{create_movie, delete_movie, show_movie, update_movie};
