//! Movie persistence.
//!
//! Handlers only see the [`MovieStore`] trait. [`InMemoryMovieStore`] is the
//! implementation the binary and the tests run against.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::debug;

use crate::{DataError, DataResult, Movie};

/// Storage for movie records.
#[async_trait]
pub trait MovieStore: Send + Sync {
    /// Stores a new movie, filling in `id`, `created_at` and `version`.
    async fn insert(&self, movie: &mut Movie) -> DataResult<()>;

    /// Fetches the movie with the given id.
    async fn get(&self, id: i64) -> DataResult<Movie>;

    /// Replaces a stored movie if its version still matches `movie.version`,
    /// then increments `movie.version`.
    ///
    /// Returns [`DataError::EditConflict`] if the record changed or vanished
    /// since it was read.
    async fn update(&self, movie: &mut Movie) -> DataResult<()>;

    /// Removes the movie with the given id.
    async fn delete(&self, id: i64) -> DataResult<()>;
}

/// A [`MovieStore`] held in process memory.
#[derive(Debug)]
pub struct InMemoryMovieStore {
    movies: RwLock<BTreeMap<i64, Movie>>,
    next_id: AtomicI64,
}

impl Default for InMemoryMovieStore {
    fn default() -> Self {
        Self {
            movies: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl InMemoryMovieStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored movies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.movies.read().len()
    }

    /// Returns true if no movies are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.movies.read().is_empty()
    }
}

#[async_trait]
impl MovieStore for InMemoryMovieStore {
    async fn insert(&self, movie: &mut Movie) -> DataResult<()> {
        movie.id = self.next_id.fetch_add(1, Ordering::Relaxed);
        movie.created_at = Utc::now();
        movie.version = 1;

        self.movies.write().insert(movie.id, movie.clone());
        debug!(movie_id = movie.id, "movie inserted");
        Ok(())
    }

    async fn get(&self, id: i64) -> DataResult<Movie> {
        if id < 1 {
            return Err(DataError::RecordNotFound);
        }
        self.movies
            .read()
            .get(&id)
            .cloned()
            .ok_or(DataError::RecordNotFound)
    }

    async fn update(&self, movie: &mut Movie) -> DataResult<()> {
        let mut movies = self.movies.write();
        let stored = movies
            .get_mut(&movie.id)
            .filter(|stored| stored.version == movie.version)
            .ok_or(DataError::EditConflict)?;

        movie.version += 1;
        movie.created_at = stored.created_at;
        *stored = movie.clone();

        debug!(movie_id = movie.id, version = movie.version, "movie updated");
        Ok(())
    }

    async fn delete(&self, id: i64) -> DataResult<()> {
        if id < 1 {
            return Err(DataError::RecordNotFound);
        }
        self.movies
            .write()
            .remove(&id)
            .map(|_| debug!(movie_id = id, "movie deleted"))
            .ok_or(DataError::RecordNotFound)
    }
}
