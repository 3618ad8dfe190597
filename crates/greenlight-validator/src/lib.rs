//! # Greenlight Validator
//!
//! Accumulates named field-validation failures.
//!
//! The [`Validator`] is deliberately independent of HTTP and JSON: rule sets
//! call [`Validator::check`] once per rule, then the caller inspects
//! [`Validator::valid`] and hands the [`FieldErrors`] map to whatever renders
//! the failure.
//!
//! ## Example
//!
//! ```rust
//! use greenlight_validator::{unique, Validator};
//!
//! let title = "";
//! let genres = ["drama", "drama"];
//!
//! let mut v = Validator::new();
//! v.check(!title.is_empty(), "title", "must be provided");
//! v.check(title.len() <= 500, "title", "must not be more than 500 bytes long");
//! v.check(unique(&genres), "genres", "must not contain duplicate values");
//!
//! assert!(!v.valid());
//! assert_eq!(v.errors().get("title").map(String::as_str), Some("must be provided"));
//! assert_eq!(v.errors().len(), 2);
//! ```

#![doc(html_root_url = "https://docs.rs/greenlight-validator/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod validator;

pub use validator::{permitted_value, unique, FieldErrors, Validator};
