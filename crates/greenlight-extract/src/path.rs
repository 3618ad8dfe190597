//! Path parameter extraction.
//!
//! Every resource in the service is addressed by a positive integer `id`.

use std::ops::Deref;

use crate::{ExtractionContext, ExtractionError, FromRequest, InvalidIdentifier};

/// Name of the routed identifier parameter.
pub const ID_PARAM: &str = "id";

/// Reads the routed `id` parameter as a positive integer.
///
/// Missing, non-numeric, zero and negative values all produce the same
/// [`InvalidIdentifier`].
///
/// # Example
///
/// ```rust
/// use greenlight_extract::{read_id_param, ExtractionContext, InvalidIdentifier};
///
/// let ctx = ExtractionContext::builder().path_param("id", "42").build();
/// assert_eq!(read_id_param(&ctx), Ok(42));
///
/// let ctx = ExtractionContext::builder().path_param("id", "0").build();
/// assert_eq!(read_id_param(&ctx), Err(InvalidIdentifier));
/// ```
pub fn read_id_param(ctx: &ExtractionContext) -> Result<i64, InvalidIdentifier> {
    ctx.path_params()
        .get(ID_PARAM)
        .ok_or(InvalidIdentifier)
        .and_then(parse_id)
}

/// Parses a base-10 identifier, accepting only values ≥ 1.
pub fn parse_id(raw: &str) -> Result<i64, InvalidIdentifier> {
    match raw.parse::<i64>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(InvalidIdentifier),
    }
}

/// Extractor for the routed `id` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Id(pub i64);

impl Deref for Id {
    type Target = i64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for Id {
    fn from_request(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        Ok(Id(read_id_param(ctx)?))
    }
}
