//! Strict JSON body decoding.
//!
//! [`read_json`] turns a raw request body into a typed value or exactly one
//! [`DecodeError`]. Checks apply in this order:
//!
//! 1. the body must not exceed [`MAX_BODY_SIZE`];
//! 2. the body must not be empty;
//! 3. the first JSON value must decode into the destination, with every
//!    object key consumed by it;
//! 4. nothing but whitespace may follow that value.
//!
//! Destinations should not use `#[serde(deny_unknown_fields)]`; unknown keys
//! are detected here and reported as [`DecodeError::UnknownField`]. Fields
//! that may be absent should carry `#[serde(default)]` so that decoding and
//! validation remain separate steps.

use serde::de::DeserializeOwned;
use serde_json::error::Category;
use std::ops::Deref;

use crate::{DecodeError, ExtractionContext, ExtractionError, FromRequest};

/// Maximum accepted body size for JSON extraction (1 MiB).
pub const MAX_BODY_SIZE: usize = 1_048_576;

/// Decodes `body` into `T` using the default 1 MiB limit.
///
/// # Example
///
/// ```rust
/// use greenlight_extract::{read_json, DecodeError};
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize)]
/// struct Input {
///     #[serde(default)]
///     title: String,
/// }
///
/// let input: Input = read_json(br#"{"title": "Casablanca"}"#).unwrap();
/// assert_eq!(input.title, "Casablanca");
///
/// let err = read_json::<Input>(br#"{"title": "X", "rating": 5}"#).unwrap_err();
/// assert_eq!(err, DecodeError::UnknownField { field: "rating".into() });
/// ```
pub fn read_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, DecodeError> {
    read_json_with_limit(body, MAX_BODY_SIZE)
}

/// Decodes `body` into `T`, rejecting bodies larger than `limit` bytes.
pub fn read_json_with_limit<T: DeserializeOwned>(
    body: &[u8],
    limit: usize,
) -> Result<T, DecodeError> {
    if body.len() > limit {
        return Err(DecodeError::BodyTooLarge { limit });
    }

    if body.iter().all(|b| is_json_whitespace(*b)) {
        return Err(DecodeError::EmptyBody);
    }

    let mut de = serde_json::Deserializer::from_slice(body);
    let mut unknown: Option<String> = None;

    let decoded = {
        let mut on_ignored = |path: serde_ignored::Path<'_>| {
            if unknown.is_none() {
                unknown = Some(path.to_string());
            }
        };
        let strict = serde_ignored::Deserializer::new(&mut de, &mut on_ignored);
        serde_path_to_error::deserialize::<_, T>(strict)
    };

    // An unknown key seen before a later failure came first in the body.
    if let Some(field) = unknown {
        return Err(DecodeError::UnknownField { field });
    }

    let value = decoded.map_err(|err| classify(body, &err))?;

    de.end().map_err(|_| DecodeError::MultipleJsonValues)?;

    Ok(value)
}

fn is_json_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r')
}

fn classify(body: &[u8], err: &serde_path_to_error::Error<serde_json::Error>) -> DecodeError {
    let inner = err.inner();
    match inner.classify() {
        Category::Syntax => DecodeError::MalformedJson {
            offset: Some(byte_offset(body, inner.line(), inner.column())),
        },
        Category::Eof | Category::Io => DecodeError::MalformedJson { offset: None },
        Category::Data => {
            // Only a path rooted at an object key names a field.
            let path = err.path();
            let field = match path.iter().next() {
                Some(serde_path_to_error::Segment::Map { .. }) => Some(path.to_string()),
                _ => None,
            };
            DecodeError::TypeMismatch {
                field,
                offset: byte_offset(body, inner.line(), inner.column()),
            }
        }
    }
}

/// Converts serde_json's 1-based line and column into a byte offset.
fn byte_offset(body: &[u8], line: usize, column: usize) -> usize {
    let line_start = if line <= 1 {
        0
    } else {
        body.iter()
            .enumerate()
            .filter(|(_, b)| **b == b'\n')
            .nth(line - 2)
            .map_or(0, |(i, _)| i + 1)
    };
    (line_start + column).min(body.len())
}

/// Extractor for strictly decoded JSON request bodies.
///
/// Uses [`read_json`] with the default 1 MiB limit.
///
/// # Example
///
/// ```rust
/// use greenlight_extract::{ExtractionContext, FromRequest, Json};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Input {
///     title: String,
///     year: i32,
/// }
///
/// let ctx = ExtractionContext::builder()
///     .body(r#"{"title": "Casablanca", "year": 1942}"#)
///     .build();
///
/// let Json(input) = Json::<Input>::from_request(&ctx).unwrap();
/// assert_eq!(input.year, 1942);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Consumes the Json and returns the inner value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: DeserializeOwned> FromRequest for Json<T> {
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        Ok(Json(read_json(ctx.body())?))
    }
}

/// JSON extractor with a custom size limit.
///
/// ```rust
/// use greenlight_extract::JsonWithLimit;
///
/// // Accept bodies up to 4 KiB.
/// type SmallJson<T> = JsonWithLimit<T, 4096>;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonWithLimit<T, const LIMIT: usize>(pub T);

impl<T, const LIMIT: usize> JsonWithLimit<T, LIMIT> {
    /// Consumes the `JsonWithLimit` and returns the inner value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, const LIMIT: usize> Deref for JsonWithLimit<T, LIMIT> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: DeserializeOwned, const LIMIT: usize> FromRequest for JsonWithLimit<T, LIMIT> {
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        Ok(JsonWithLimit(read_json_with_limit(ctx.body(), LIMIT)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct MovieInput {
        title: String,
        year: i32,
        runtime: i32,
        genres: Option<Vec<String>>,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Outer {
        inner: Inner,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Inner {
        count: u32,
    }

    #[test]
    fn test_decodes_valid_body() {
        let body = br#"{"title": "Casablanca", "year": 1942, "runtime": 102, "genres": ["drama", "romance", "war"]}"#;
        let input: MovieInput = read_json(body).unwrap();

        assert_eq!(input.title, "Casablanca");
        assert_eq!(input.year, 1942);
        assert_eq!(input.runtime, 102);
        assert_eq!(
            input.genres,
            Some(vec!["drama".into(), "romance".into(), "war".into()])
        );
    }

    #[test]
    fn test_empty_object_decodes_with_defaults() {
        let input: MovieInput = read_json(b"{}").unwrap();
        assert_eq!(input, MovieInput::default());
    }

    #[test]
    fn test_surrounding_whitespace_is_accepted() {
        let input: MovieInput = read_json(b"\n  {\"year\": 2001}\r\n\t ").unwrap();
        assert_eq!(input.year, 2001);
    }

    #[test]
    fn test_body_too_large() {
        let padding = " ".repeat(MAX_BODY_SIZE);
        let body = format!("{{\"title\": \"X\"}}{padding}");

        let err = read_json::<MovieInput>(body.as_bytes()).unwrap_err();
        assert_eq!(err, DecodeError::BodyTooLarge { limit: MAX_BODY_SIZE });
    }

    #[test]
    fn test_body_at_limit_is_accepted() {
        let body = br#"{"title": "X"}"#;
        let input: MovieInput = read_json_with_limit(body, body.len()).unwrap();
        assert_eq!(input.title, "X");

        let err = read_json_with_limit::<MovieInput>(body, body.len() - 1).unwrap_err();
        assert_eq!(
            err,
            DecodeError::BodyTooLarge {
                limit: body.len() - 1
            }
        );
    }

    #[test]
    fn test_unknown_field() {
        let err = read_json::<MovieInput>(br#"{"title": "X", "unknown_field": 1}"#).unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnknownField {
                field: "unknown_field".into()
            }
        );
    }

    #[test]
    fn test_unknown_field_before_type_error_wins() {
        let err =
            read_json::<MovieInput>(br#"{"rating": 5, "year": "nineteen"}"#).unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnknownField {
                field: "rating".into()
            }
        );
    }

    #[test]
    fn test_nested_unknown_field_reports_path() {
        let err = read_json::<Outer>(br#"{"inner": {"count": 1, "extra": true}}"#).unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnknownField {
                field: "inner.extra".into()
            }
        );
    }

    #[test]
    fn test_malformed_json_reports_offset() {
        let err = read_json::<MovieInput>(br#"{"title": "X",, }"#).unwrap_err();
        match err {
            DecodeError::MalformedJson { offset: Some(offset) } => {
                assert!(offset > 0 && offset <= 17, "offset {offset}");
            }
            other => panic!("expected MalformedJson with offset, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_json_on_later_line() {
        let body = b"{\n  \"title\": \"X\"\n  \"year\": 1\n}";
        let err = read_json::<MovieInput>(body).unwrap_err();
        match err {
            DecodeError::MalformedJson { offset: Some(offset) } => {
                assert!(offset > 17, "offset {offset} should be on the third line");
            }
            other => panic!("expected MalformedJson with offset, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(read_json::<MovieInput>(b"").unwrap_err(), DecodeError::EmptyBody);
        assert_eq!(
            read_json::<MovieInput>(b" \n\t ").unwrap_err(),
            DecodeError::EmptyBody
        );
    }

    #[test]
    fn test_truncated_body() {
        let err = read_json::<MovieInput>(br#"{"title": "Casa"#).unwrap_err();
        assert_eq!(err, DecodeError::MalformedJson { offset: None });
    }

    #[test]
    fn test_type_mismatch_names_field() {
        let err = read_json::<MovieInput>(br#"{"title": 123}"#).unwrap_err();
        match err {
            DecodeError::TypeMismatch { field, .. } => assert_eq!(field.as_deref(), Some("title")),
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_type_mismatch_in_nested_field() {
        let err = read_json::<Outer>(br#"{"inner": {"count": -1}}"#).unwrap_err();
        match err {
            DecodeError::TypeMismatch { field, .. } => {
                assert_eq!(field.as_deref(), Some("inner.count"));
            }
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_type_mismatch_at_top_level_reports_offset() {
        let err = read_json::<MovieInput>(br#""Casablanca""#).unwrap_err();
        match err {
            DecodeError::TypeMismatch { field: None, offset } => assert!(offset >= 1),
            other => panic!("expected TypeMismatch without field, got {other:?}"),
        }
    }

    #[test]
    fn test_top_level_array_names_no_field() {
        let err = read_json::<MovieInput>(b"[1,2]").unwrap_err();
        assert_eq!(
            err.to_string(),
            "body contains incorrect JSON type (at character 2)"
        );
        assert_eq!(err, DecodeError::TypeMismatch { field: None, offset: 2 });
    }

    #[test]
    fn test_multiple_json_values() {
        let err = read_json::<MovieInput>(br#"{"title":"A"}{"title":"B"}"#).unwrap_err();
        assert_eq!(err, DecodeError::MultipleJsonValues);
    }

    #[test]
    fn test_trailing_garbage_is_multiple_values() {
        let err = read_json::<MovieInput>(br#"{"title":"A"} :)"#).unwrap_err();
        assert_eq!(err, DecodeError::MultipleJsonValues);
    }

    #[test]
    fn test_json_extractor() {
        let ctx = ExtractionContext::builder()
            .body(r#"{"title": "Vertigo", "year": 1958}"#)
            .build();

        let json = Json::<MovieInput>::from_request(&ctx).unwrap();
        assert_eq!(json.title, "Vertigo");
        assert_eq!(json.into_inner().year, 1958);
    }

    #[test]
    fn test_json_extractor_wraps_decode_error() {
        let ctx = ExtractionContext::builder().build();

        let err = Json::<MovieInput>::from_request(&ctx).unwrap_err();
        assert_eq!(err, ExtractionError::Decode(DecodeError::EmptyBody));
    }

    #[test]
    fn test_json_with_limit_extractor() {
        let ctx = ExtractionContext::builder()
            .body(format!(r#"{{"title": "{}"}}"#, "A".repeat(200)))
            .build();

        let err = JsonWithLimit::<MovieInput, 100>::from_request(&ctx).unwrap_err();
        assert_eq!(err.error_code(), "BODY_TOO_LARGE");

        let ok = JsonWithLimit::<MovieInput, 1024>::from_request(&ctx).unwrap();
        assert_eq!(ok.title.len(), 200);
    }

    #[test]
    fn test_byte_offset() {
        let body = b"ab\ncd\nef";
        assert_eq!(byte_offset(body, 1, 2), 2);
        assert_eq!(byte_offset(body, 2, 1), 4);
        assert_eq!(byte_offset(body, 3, 2), 8);
        assert_eq!(byte_offset(body, 9, 9), body.len());
    }
}
