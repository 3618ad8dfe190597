//! # Greenlight Data
//!
//! The movie domain: the [`Movie`] record, the request shapes that create
//! and patch it, the rules a movie must satisfy, and the [`MovieStore`]
//! that persists it.
//!
//! ## Example
//!
//! ```rust
//! use greenlight_data::{validate_movie, Movie, MovieInput, Runtime};
//! use greenlight_validator::Validator;
//!
//! let input = MovieInput {
//!     title: "Casablanca".into(),
//!     year: 1942,
//!     runtime: Runtime(102),
//!     genres: Some(vec!["drama".into(), "romance".into(), "war".into()]),
//! };
//!
//! let movie = Movie::from(input);
//! let mut v = Validator::new();
//! validate_movie(&mut v, &movie);
//! assert!(v.valid());
//! ```

#![doc(html_root_url = "https://docs.rs/greenlight-data/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod movie;
mod runtime;
mod store;

pub use error::{DataError, DataResult};
pub use movie::{
    validate_movie, validate_movie_at, validate_movie_input, validate_movie_input_at, Movie,
    MovieInput, MovieUpdate, MAX_GENRES, MAX_TITLE_BYTES, MIN_YEAR,
};
pub use runtime::Runtime;
pub use store::{InMemoryMovieStore, MovieStore};
