//! The movie record, its request shapes and its validation rules.

use chrono::{DateTime, Datelike, Utc};
use greenlight_validator::{unique, Validator};
use serde::{Deserialize, Serialize};

use crate::Runtime;

/// Maximum title length in bytes.
pub const MAX_TITLE_BYTES: usize = 500;

/// Earliest accepted release year.
pub const MIN_YEAR: i32 = 1888;

/// Maximum number of genres per movie.
pub const MAX_GENRES: usize = 5;

/// A movie as stored and as rendered to clients.
///
/// `created_at` is server-assigned and never appears in JSON. `year`,
/// `runtime` and `genres` are left out of the output when unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Movie {
    /// Unique identifier, assigned on insert.
    pub id: i64,
    /// Insertion timestamp.
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
    /// Title.
    pub title: String,
    /// Release year.
    #[serde(skip_serializing_if = "is_zero")]
    pub year: i32,
    /// Running time.
    #[serde(skip_serializing_if = "Runtime::is_zero")]
    pub runtime: Runtime,
    /// Genre tags.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    /// Starts at 1 and increases on every successful update.
    pub version: i32,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(n: &i32) -> bool {
    *n == 0
}

/// Body of a create request.
///
/// Every field defaults when absent, so `{}` decodes and is then rejected by
/// [`validate_movie`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MovieInput {
    /// Title.
    pub title: String,
    /// Release year.
    pub year: i32,
    /// Running time.
    pub runtime: Runtime,
    /// Genre tags; `null` is treated like an absent list.
    pub genres: Option<Vec<String>>,
}

impl From<MovieInput> for Movie {
    fn from(input: MovieInput) -> Self {
        Self {
            title: input.title,
            year: input.year,
            runtime: input.runtime,
            genres: input.genres.unwrap_or_default(),
            ..Self::default()
        }
    }
}

/// Body of a partial update request. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MovieUpdate {
    /// New title.
    pub title: Option<String>,
    /// New release year.
    pub year: Option<i32>,
    /// New running time.
    pub runtime: Option<Runtime>,
    /// Replacement genre list.
    pub genres: Option<Vec<String>>,
}

impl MovieUpdate {
    /// Copies every present field onto `movie`.
    pub fn apply_to(self, movie: &mut Movie) {
        if let Some(title) = self.title {
            movie.title = title;
        }
        if let Some(year) = self.year {
            movie.year = year;
        }
        if let Some(runtime) = self.runtime {
            movie.runtime = runtime;
        }
        if let Some(genres) = self.genres {
            movie.genres = genres;
        }
    }
}

/// Checks `movie` against every movie rule, using the current UTC year as
/// the upper bound for `year`.
///
/// ```rust
/// use greenlight_data::{validate_movie, Movie, Runtime};
/// use greenlight_validator::Validator;
///
/// let movie = Movie {
///     title: "Casablanca".into(),
///     year: 1942,
///     runtime: Runtime(102),
///     genres: vec!["drama".into(), "romance".into(), "war".into()],
///     ..Movie::default()
/// };
///
/// let mut v = Validator::new();
/// validate_movie(&mut v, &movie);
/// assert!(v.valid());
/// ```
pub fn validate_movie(v: &mut Validator, movie: &Movie) {
    validate_movie_at(v, movie, Utc::now().year());
}

/// Checks `movie` against every movie rule with an explicit current year.
///
/// A stored movie always carries a genre list, so an empty one fails the
/// count rule rather than the presence rule.
pub fn validate_movie_at(v: &mut Validator, movie: &Movie, current_year: i32) {
    check_movie_fields(
        v,
        MovieFields {
            title: &movie.title,
            year: movie.year,
            runtime: movie.runtime,
            genres: Some(&movie.genres),
        },
        current_year,
    );
}

/// Checks a create request before it becomes a [`Movie`], using the current
/// UTC year.
///
/// Unlike [`validate_movie`], this can tell an absent or `null` genre list
/// (`must be provided`) from an empty one (`must contain at least 1 genre`).
///
/// ```rust
/// use greenlight_data::{validate_movie_input, MovieInput, Runtime};
/// use greenlight_validator::Validator;
///
/// let input = MovieInput {
///     title: "Casablanca".into(),
///     year: 1942,
///     runtime: Runtime(102),
///     genres: Some(vec![]),
/// };
///
/// let mut v = Validator::new();
/// validate_movie_input(&mut v, &input);
/// assert_eq!(v.errors()["genres"], "must contain at least 1 genre");
/// ```
pub fn validate_movie_input(v: &mut Validator, input: &MovieInput) {
    validate_movie_input_at(v, input, Utc::now().year());
}

/// Checks a create request with an explicit current year.
pub fn validate_movie_input_at(v: &mut Validator, input: &MovieInput, current_year: i32) {
    check_movie_fields(
        v,
        MovieFields {
            title: &input.title,
            year: input.year,
            runtime: input.runtime,
            genres: input.genres.as_deref(),
        },
        current_year,
    );
}

struct MovieFields<'a> {
    title: &'a str,
    year: i32,
    runtime: Runtime,
    genres: Option<&'a [String]>,
}

// All rules run; each field keeps its first failure.
fn check_movie_fields(v: &mut Validator, movie: MovieFields<'_>, current_year: i32) {
    v.check(!movie.title.is_empty(), "title", "must be provided");
    v.check(
        movie.title.len() <= MAX_TITLE_BYTES,
        "title",
        "must not be more than 500 bytes long",
    );

    v.check(movie.year != 0, "year", "must be provided");
    v.check(movie.year >= MIN_YEAR, "year", "must be greater than 1888");
    v.check(movie.year <= current_year, "year", "must not be in the future");

    v.check(!movie.runtime.is_zero(), "runtime", "must be provided");
    v.check(movie.runtime.0 > 0, "runtime", "must be a positive integer");

    v.check(movie.genres.is_some(), "genres", "must be provided");
    let genres = movie.genres.unwrap_or_default();
    v.check(!genres.is_empty(), "genres", "must contain at least 1 genre");
    v.check(
        genres.len() <= MAX_GENRES,
        "genres",
        "must not contain more than 5 genres",
    );
    v.check(unique(genres), "genres", "must not contain duplicate values");
}
