//! The [`Validator`] accumulator and generic check helpers.

use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;

/// Field name to first error message.
///
/// Ordered so that rendered error envelopes are stable.
pub type FieldErrors = BTreeMap<String, String>;

/// Collects validation failures keyed by field name.
///
/// Only the first message recorded for a field is kept. Later failures for
/// the same field are ignored, so rule sets can list checks from most to
/// least fundamental and the client sees the most useful message.
///
/// Build a fresh `Validator` for every validation pass.
///
/// # Example
///
/// ```rust
/// use greenlight_validator::Validator;
///
/// let mut v = Validator::new();
/// v.check(false, "year", "must be provided");
/// v.check(false, "year", "must be greater than 1888");
///
/// assert_eq!(v.errors()["year"], "must be provided");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    /// Creates an empty validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when no errors have been recorded.
    #[must_use]
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Records `message` under `field` unless the field already has an error.
    pub fn add_error(&mut self, field: &str, message: &str) {
        if !self.errors.contains_key(field) {
            self.errors.insert(field.to_owned(), message.to_owned());
        }
    }

    /// Records `message` under `field` when `condition` is false.
    pub fn check(&mut self, condition: bool, field: &str, message: &str) {
        if !condition {
            self.add_error(field, message);
        }
    }

    /// Returns the recorded errors.
    #[must_use]
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Consumes the validator and returns the recorded errors.
    #[must_use]
    pub fn into_errors(self) -> FieldErrors {
        self.errors
    }
}

/// Returns `true` if no value in `values` appears more than once.
///
/// Empty and single-element slices are trivially unique.
///
/// ```rust
/// use greenlight_validator::unique;
///
/// assert!(unique::<&str>(&[]));
/// assert!(unique(&["a", "b"]));
/// assert!(!unique(&["a", "a"]));
/// ```
pub fn unique<T: Eq + Hash>(values: &[T]) -> bool {
    let mut seen = HashSet::with_capacity(values.len());
    values.iter().all(|value| seen.insert(value))
}

/// Returns `true` if `value` is one of `permitted`.
///
/// ```rust
/// use greenlight_validator::permitted_value;
///
/// assert!(permitted_value(&"staging", &["development", "staging", "production"]));
/// assert!(!permitted_value(&"qa", &["development", "staging", "production"]));
/// ```
pub fn permitted_value<T: PartialEq>(value: &T, permitted: &[T]) -> bool {
    permitted.iter().any(|p| p == value)
}
