//! Durable session storage port

use folio_domain::PersistedSession;

/// Errors that can occur while reading or writing the stored session.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Process-wide durable store holding the single persisted session key.
///
/// Every call is atomic on its own. Callers re-read on every use rather than
/// caching the token, since a logout may happen between any two calls.
pub trait TokenStorage: Send + Sync {
    /// Loads the stored session, `None` if nothing is stored.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or parsed.
    fn load(&self) -> Result<Option<PersistedSession>, StorageError>;

    /// Replaces the stored session.
    ///
    /// # Errors
    /// Returns an error if the store cannot be written.
    fn save(&self, session: &PersistedSession) -> Result<(), StorageError>;

    /// Removes the stored session. Clearing an empty store is not an error.
    ///
    /// # Errors
    /// Returns an error if the store cannot be written.
    fn clear(&self) -> Result<(), StorageError>;

    /// Reads the bearer token, treating an unreadable store as empty.
    fn token(&self) -> Option<String> {
        match self.load() {
            Ok(session) => session.and_then(|s| s.token().map(str::to_owned)),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read stored session");
                None
            }
        }
    }
}
