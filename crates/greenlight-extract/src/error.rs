//! Extraction and encoding error types.
//!
//! Every client-caused failure is a variant of a closed enum so that the
//! failure responder can match on it exhaustively. The `Display` output of
//! each variant is safe to show to clients: it names at most a field or a
//! byte offset, never internal types.

use http::StatusCode;
use thiserror::Error;

/// A classified failure of the JSON decode pipeline.
///
/// # Example
///
/// ```rust
/// use greenlight_extract::DecodeError;
///
/// let err = DecodeError::UnknownField { field: "rating".into() };
/// assert_eq!(err.to_string(), r#"body contains unknown key "rating""#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The body is larger than the configured limit.
    #[error("body must not be larger than {limit} bytes")]
    BodyTooLarge {
        /// Maximum accepted body size in bytes.
        limit: usize,
    },

    /// The body contains a key the destination does not declare.
    #[error("body contains unknown key \"{field}\"")]
    UnknownField {
        /// Path of the offending key, e.g. `rating` or `meta.rating`.
        field: String,
    },

    /// The body is not syntactically valid JSON.
    ///
    /// `offset` is `None` when the body ends in the middle of a value.
    #[error("{}", malformed_message(.offset))]
    MalformedJson {
        /// Byte offset of the syntax error, when known.
        offset: Option<usize>,
    },

    /// The body is empty or contains only whitespace.
    #[error("body must not be empty")]
    EmptyBody,

    /// A JSON value does not fit the destination type.
    #[error("{}", mismatch_message(.field, .offset))]
    TypeMismatch {
        /// Path of the field whose value has the wrong type, when known.
        field: Option<String>,
        /// Byte offset at which the mismatch was detected.
        offset: usize,
    },

    /// More than one JSON value was found in the body.
    #[error("body must only contain a single JSON value")]
    MultipleJsonValues,
}

fn malformed_message(offset: &Option<usize>) -> String {
    match offset {
        Some(offset) => format!("body contains badly-formed JSON (at character {offset})"),
        None => "body contains badly-formed JSON".to_string(),
    }
}

fn mismatch_message(field: &Option<String>, offset: &usize) -> String {
    match field {
        Some(field) => format!("body contains incorrect JSON type for field \"{field}\""),
        None => format!("body contains incorrect JSON type (at character {offset})"),
    }
}

impl DecodeError {
    /// Returns a stable machine-readable code for this error kind.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BodyTooLarge { .. } => "BODY_TOO_LARGE",
            Self::UnknownField { .. } => "UNKNOWN_FIELD",
            Self::MalformedJson { .. } => "MALFORMED_JSON",
            Self::EmptyBody => "EMPTY_BODY",
            Self::TypeMismatch { .. } => "TYPE_MISMATCH",
            Self::MultipleJsonValues => "MULTIPLE_JSON_VALUES",
        }
    }
}

/// The routed `id` parameter is missing, not an integer, or not positive.
///
/// The cases are intentionally indistinguishable: handlers treat all of them
/// as "no such resource".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid id parameter")]
pub struct InvalidIdentifier;

/// Failure to serialize a response body.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The value could not be represented as JSON.
    #[error("failed to encode JSON response: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error returned by [`FromRequest`](crate::FromRequest) implementations.
///
/// # Example
///
/// ```rust
/// use greenlight_extract::{DecodeError, ExtractionError, InvalidIdentifier};
/// use http::StatusCode;
///
/// let err = ExtractionError::from(DecodeError::EmptyBody);
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
///
/// let err = ExtractionError::from(InvalidIdentifier);
/// assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// The request body could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The `id` path parameter is invalid.
    #[error(transparent)]
    InvalidIdentifier(#[from] InvalidIdentifier),
}

impl ExtractionError {
    /// Returns the HTTP status code conventionally used for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Decode(_) => StatusCode::BAD_REQUEST,
            Self::InvalidIdentifier(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Returns the error code suitable for logs and error envelopes.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Decode(err) => err.error_code(),
            Self::InvalidIdentifier(_) => "INVALID_IDENTIFIER",
        }
    }
}
