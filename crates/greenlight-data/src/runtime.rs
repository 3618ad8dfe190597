//! Movie running time.

use std::fmt;

use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::{Serialize, Serializer};

/// Running time in minutes.
///
/// Serializes as the string `"<n> mins"`. Deserializes from either a JSON
/// integer or that same string form; anything else is a type error.
///
/// ```rust
/// use greenlight_data::Runtime;
///
/// assert_eq!(serde_json::to_string(&Runtime(102)).unwrap(), r#""102 mins""#);
/// assert_eq!(serde_json::from_str::<Runtime>(r#""102 mins""#).unwrap(), Runtime(102));
/// assert_eq!(serde_json::from_str::<Runtime>("102").unwrap(), Runtime(102));
/// assert!(serde_json::from_str::<Runtime>(r#""102 minutes""#).is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Runtime(pub i32);

impl Runtime {
    /// Returns true when no running time has been set.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} mins", self.0)
    }
}

impl Serialize for Runtime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> de::Deserialize<'de> for Runtime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RuntimeVisitor)
    }
}

struct RuntimeVisitor;

const EXPECTED: &str = "an integer or a string of the form \"<n> mins\"";

impl<'de> Visitor<'de> for RuntimeVisitor {
    type Value = Runtime;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(EXPECTED)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Runtime, E> {
        i32::try_from(v)
            .map(Runtime)
            .map_err(|_| E::invalid_value(Unexpected::Signed(v), &self))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Runtime, E> {
        i32::try_from(v)
            .map(Runtime)
            .map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Runtime, E> {
        parse_mins(v)
            .map(Runtime)
            .ok_or_else(|| E::invalid_value(Unexpected::Str(v), &self))
    }
}

fn parse_mins(s: &str) -> Option<i32> {
    let (n, unit) = s.split_once(' ')?;
    if unit != "mins" {
        return None;
    }
    n.parse().ok()
}
