//! # Greenlight Extract
//!
//! The JSON contract of the Greenlight API: strict request decoding, typed
//! path parameters and enveloped, pretty-printed responses.
//!
//! ## Extractors
//!
//! | Extractor | Source | Description |
//! |-----------|--------|-------------|
//! | [`Json<T>`] | Request body | Strictly decoded JSON, 1 MiB limit |
//! | [`JsonWithLimit<T, N>`] | Request body | Same, with a custom limit |
//! | [`Id`] | URL path | Positive integer `id` parameter |
//!
//! The free functions [`read_json`] and [`read_id_param`] do the same work
//! without the [`FromRequest`] plumbing.
//!
//! ## Example
//!
//! ```rust
//! use greenlight_extract::{read_json, write_json, DecodeError, Envelope};
//! use http::StatusCode;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Deserialize, Serialize)]
//! struct Movie {
//!     title: String,
//! }
//!
//! let movie: Movie = read_json(br#"{"title": "Casablanca"}"#).unwrap();
//!
//! let env = Envelope::wrap("movie", &movie).unwrap();
//! let res = write_json(StatusCode::OK, &env, None).unwrap();
//! assert!(res.body().ends_with(b"}\n"));
//!
//! let err = read_json::<Movie>(b"").unwrap_err();
//! assert_eq!(err, DecodeError::EmptyBody);
//! ```
//!
//! ## Error Handling
//!
//! Decoding yields exactly one [`DecodeError`]; identifier parsing yields
//! [`InvalidIdentifier`]. Both convert into [`ExtractionError`], which knows
//! its conventional status code.

#![doc(html_root_url = "https://docs.rs/greenlight-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod extractor;
mod json;
mod params;
mod path;
mod response;

pub use context::{ExtractionContext, ExtractionContextBuilder};
pub use error::{DecodeError, EncodeError, ExtractionError, InvalidIdentifier};
pub use extractor::FromRequest;
pub use json::{read_json, read_json_with_limit, Json, JsonWithLimit, MAX_BODY_SIZE};
pub use params::Params;
pub use path::{parse_id, read_id_param, Id, ID_PARAM};
pub use response::{write_json, Envelope};
