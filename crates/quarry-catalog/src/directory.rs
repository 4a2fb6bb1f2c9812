//! Live field-name directory.

use std::{
    fmt::Display,
    sync::{Arc, PoisonError, RwLock},
};

use tracing::{debug, warn};

/// Fetch attempts per refresh before falling back to an empty list.
pub const REFRESH_ATTEMPTS: usize = 3;

/// The engine's current field names, used to expand dynamic facets and full-text globs.
///
/// Requests take an immutable [`snapshot`](Self::snapshot); a refresh swaps in a new list
/// without disturbing snapshots already handed out.
#[derive(Debug, Default)]
pub struct FieldDirectory {
    /// Current snapshot.
    names: RwLock<Arc<[String]>>,
}

impl FieldDirectory {
    /// Creates a directory holding `names`.
    pub fn new(names: Vec<String>) -> Self {
        Self {
            names: RwLock::new(names.into()),
        }
    }

    /// The current field names.
    pub fn snapshot(&self) -> Arc<[String]> {
        Arc::clone(&self.names.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Installs a new list of field names.
    pub fn replace(&self, names: Vec<String>) {
        *self.names.write().unwrap_or_else(PoisonError::into_inner) = names.into();
    }

    /// Fetches a new list through `fetch`, trying up to [`REFRESH_ATTEMPTS`] times.
    ///
    /// If every attempt fails the directory is emptied. Returns the number of names
    /// installed.
    pub fn refresh<F, E>(&self, mut fetch: F) -> usize
    where
        F: FnMut() -> Result<Vec<String>, E>,
        E: Display,
    {
        for attempt in 1..=REFRESH_ATTEMPTS {
            match fetch() {
                Ok(names) => {
                    let count = names.len();
                    debug!(count, attempt, "field directory refreshed");
                    self.replace(names);
                    return count;
                }
                Err(e) => warn!(attempt, error = %e, "cannot retrieve field names"),
            }
        }
        warn!(
            attempts = REFRESH_ATTEMPTS,
            "giving up on field names, using empty list"
        );
        self.replace(Vec::new());
        0
    }
}
