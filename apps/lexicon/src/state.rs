//! Application state.

use crate::config::Config;
use crate::db::SqliteRepository;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// State shared by every command.
pub struct AppState {
    pub repository: Arc<Mutex<SqliteRepository>>,
    pub config: Config,
}

impl AppState {
    pub fn new(repository: SqliteRepository, config: Config) -> Self {
        Self {
            repository: Arc::new(Mutex::new(repository)),
            config,
        }
    }

    /// Lock the repository. A panic in another holder leaves the connection
    /// usable since every write runs in its own transaction.
    pub fn repository(&self) -> MutexGuard<'_, SqliteRepository> {
        self.repository.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
