//! Core extractor trait.
//!
//! The [`FromRequest`] trait is the foundation for all extractors.

use crate::{ExtractionContext, ExtractionError};

/// Trait for types that can be extracted from a request.
///
/// Extraction is synchronous: the server collects the body before handlers
/// run, so extractors only inspect an [`ExtractionContext`].
///
/// # Example
///
/// ```rust
/// use greenlight_extract::{ExtractionContext, ExtractionError, FromRequest, Id, Json};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Rename {
///     title: String,
/// }
///
/// let ctx = ExtractionContext::builder()
///     .path_param("id", "7")
///     .body(r#"{"title": "Vertigo"}"#)
///     .build();
///
/// let (Id(id), Json(rename)) = <(Id, Json<Rename>)>::from_request(&ctx)?;
/// assert_eq!(id, 7);
/// assert_eq!(rename.title, "Vertigo");
/// # Ok::<(), ExtractionError>(())
/// ```
pub trait FromRequest: Sized {
    /// Extracts this type from the request context.
    ///
    /// # Errors
    ///
    /// Returns an [`ExtractionError`] if extraction fails.
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError>;
}

// Extractors run left to right; the first failure is returned.
macro_rules! impl_from_request_for_tuple {
    ($($T:ident),*) => {
        impl<$($T: FromRequest),*> FromRequest for ($($T,)*) {
            fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
                Ok(($($T::from_request(ctx)?,)*))
            }
        }
    };
}

impl_from_request_for_tuple!(T1);
impl_from_request_for_tuple!(T1, T2);
impl_from_request_for_tuple!(T1, T2, T3);
