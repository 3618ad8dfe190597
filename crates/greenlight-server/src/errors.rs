//! Failure responses.
//!
//! Every handler returns `Result<Response<Bytes>, ApiError>`. [`ApiError`]
//! is the one place where failures become status codes and `{"error": ...}`
//! envelopes; server faults are logged here and replaced by a generic
//! message.

use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, Method, Response, StatusCode};
use serde_json::{json, Value};
use thiserror::Error;

use greenlight_data::DataError;
use greenlight_extract::{write_json, DecodeError, EncodeError, Envelope, ExtractionError};
use greenlight_validator::FieldErrors;

/// Message returned for missing resources and invalid identifiers.
pub const NOT_FOUND_MESSAGE: &str = "the requested resource could not be found";

/// Message returned for optimistic-concurrency failures.
pub const EDIT_CONFLICT_MESSAGE: &str =
    "unable to update the record due to an edit conflict, please try again";

/// Message returned for every server fault.
pub const SERVER_ERROR_MESSAGE: &str =
    "the server encountered a problem and could not process your request";

/// Message returned when the client is too slow to send its body.
pub const TIMEOUT_MESSAGE: &str = "the request body was not received in time";

/// A failed request, as seen by the client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The body failed strict decoding.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The `id` path parameter is invalid.
    #[error("invalid id parameter")]
    InvalidIdentifier,

    /// No resource at this path, or no record with this id.
    #[error("resource not found")]
    NotFound,

    /// The path exists but does not support the method.
    #[error("method {method} not allowed")]
    MethodNotAllowed {
        /// The rejected method.
        method: Method,
        /// Methods the path does support.
        allowed: Vec<Method>,
    },

    /// The decoded entity broke one or more rules.
    #[error("validation failed")]
    ValidationFailed(FieldErrors),

    /// The record changed between read and write.
    #[error("edit conflict")]
    EditConflict,

    /// The client did not finish sending the body before the read timeout.
    #[error("request body read timed out")]
    Timeout,

    /// Something failed on the server side. The message is logged, never sent.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Create an internal error.
    pub fn internal(message: impl ToString) -> Self {
        Self::Internal(message.to_string())
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Decode(_) => StatusCode::BAD_REQUEST,
            Self::InvalidIdentifier | Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::ValidationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::EditConflict => StatusCode::CONFLICT,
            Self::Timeout => StatusCode::REQUEST_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the value placed under the envelope's `error` key.
    #[must_use]
    pub fn client_message(&self) -> Value {
        match self {
            Self::Decode(err) => json!(err.to_string()),
            Self::InvalidIdentifier | Self::NotFound => json!(NOT_FOUND_MESSAGE),
            Self::MethodNotAllowed { method, .. } => {
                json!(format!("the {method} method is not supported for this resource"))
            }
            Self::ValidationFailed(errors) => json!(errors),
            Self::EditConflict => json!(EDIT_CONFLICT_MESSAGE),
            Self::Timeout => json!(TIMEOUT_MESSAGE),
            Self::Internal(_) => json!(SERVER_ERROR_MESSAGE),
        }
    }

    /// Renders the error as a JSON response.
    ///
    /// Server faults are logged at `error` level before the generic message
    /// is sent. If the envelope itself cannot be encoded, an empty 500 is
    /// returned.
    #[must_use]
    pub fn into_response(self) -> Response<Bytes> {
        if let Self::Internal(message) = &self {
            greenlight_telemetry::log_server_error!(message);
        }

        let status = self.status_code();
        let mut headers = HeaderMap::new();
        if let Self::MethodNotAllowed { allowed, .. } = &self {
            if let Some(allow) = allow_header(allowed) {
                headers.insert(header::ALLOW, allow);
            }
        }

        let env = Envelope::new().with("error", self.client_message());
        match write_json(status, &env, Some(&headers)) {
            Ok(res) => res,
            Err(err) => {
                greenlight_telemetry::log_server_error!(err);
                let mut res = Response::new(Bytes::new());
                *res.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                res
            }
        }
    }
}

fn allow_header(methods: &[Method]) -> Option<HeaderValue> {
    let joined = methods
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    HeaderValue::from_str(&joined).ok()
}

impl From<ExtractionError> for ApiError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::Decode(err) => Self::Decode(err),
            ExtractionError::InvalidIdentifier(_) => Self::InvalidIdentifier,
        }
    }
}

impl From<DataError> for ApiError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::RecordNotFound => Self::NotFound,
            DataError::EditConflict => Self::EditConflict,
            DataError::Internal(message) => Self::Internal(message),
        }
    }
}

impl From<EncodeError> for ApiError {
    fn from(err: EncodeError) -> Self {
        Self::internal(err)
    }
}

/// Errors that stop the server itself.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the configured address.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        /// Address that could not be bound.
        addr: std::net::SocketAddr,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// I/O error during server operation.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
