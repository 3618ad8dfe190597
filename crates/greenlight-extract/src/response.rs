//! JSON response encoding.
//!
//! Every response body in the service is an [`Envelope`]: a JSON object
//! whose top-level key names what it carries (`movie`, `error`, ...).
//! [`write_json`] renders it tab-indented with a trailing newline.

use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, Response, StatusCode};
use serde::{Serialize, Serializer};
use serde_json::{ser::PrettyFormatter, Map, Value};

use crate::EncodeError;

/// A keyed JSON object wrapping response payloads.
///
/// Keys are emitted in sorted order.
///
/// # Example
///
/// ```rust
/// use greenlight_extract::Envelope;
/// use serde_json::json;
///
/// let env = Envelope::new().with("message", json!("movie successfully deleted"));
/// assert_eq!(
///     serde_json::to_string(&env).unwrap(),
///     r#"{"message":"movie successfully deleted"}"#
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Envelope {
    fields: Map<String, Value>,
}

impl Envelope {
    /// Creates an empty envelope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an envelope holding a single serialized value under `key`.
    ///
    /// # Errors
    ///
    /// Returns an [`EncodeError`] if `value` cannot be represented as JSON.
    pub fn wrap<T: Serialize + ?Sized>(
        key: impl Into<String>,
        value: &T,
    ) -> Result<Self, EncodeError> {
        let mut env = Self::new();
        env.insert(key, value)?;
        Ok(env)
    }

    /// Adds an already-built JSON value.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Serializes `value` and stores it under `key`, replacing any previous
    /// entry.
    ///
    /// # Errors
    ///
    /// Returns an [`EncodeError`] if `value` cannot be represented as JSON.
    pub fn insert<T: Serialize + ?Sized>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<(), EncodeError> {
        let value = serde_json::to_value(value)?;
        self.fields.insert(key.into(), value);
        Ok(())
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns true if the envelope has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Envelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

/// Renders `data` as a JSON response.
///
/// The body is pretty-printed with tab indentation and ends in exactly one
/// newline. Headers from `headers` are copied onto the response before
/// `Content-Type: application/json` is set, so a caller-provided content
/// type is overridden.
///
/// # Errors
///
/// Returns an [`EncodeError`] if `data` fails to serialize. Nothing is
/// built in that case.
///
/// # Example
///
/// ```rust
/// use greenlight_extract::{write_json, Envelope};
/// use http::StatusCode;
/// use serde_json::json;
///
/// let env = Envelope::new().with("status", json!("available"));
/// let res = write_json(StatusCode::OK, &env, None).unwrap();
///
/// assert_eq!(res.status(), StatusCode::OK);
/// assert_eq!(res.headers()["content-type"], "application/json");
/// assert_eq!(res.body().as_ref(), b"{\n\t\"status\": \"available\"\n}\n");
/// ```
pub fn write_json<T: Serialize + ?Sized>(
    status: StatusCode,
    data: &T,
    headers: Option<&HeaderMap>,
) -> Result<Response<Bytes>, EncodeError> {
    let mut body = Vec::with_capacity(128);
    let mut ser =
        serde_json::Serializer::with_formatter(&mut body, PrettyFormatter::with_indent(b"\t"));
    data.serialize(&mut ser)?;
    body.push(b'\n');

    let mut res = Response::new(Bytes::from(body));
    *res.status_mut() = status;

    if let Some(headers) = headers {
        for (name, value) in headers {
            res.headers_mut().append(name, value.clone());
        }
    }
    res.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );

    Ok(res)
}
