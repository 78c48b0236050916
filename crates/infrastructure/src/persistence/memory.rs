//! In-memory session storage

use folio_application::ports::{StorageError, TokenStorage};
use folio_domain::PersistedSession;
use parking_lot::Mutex;

/// Keeps the session for the lifetime of the process only.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    session: Mutex<Option<PersistedSession>>,
}

impl MemoryTokenStorage {
    /// Creates an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Result<Option<PersistedSession>, StorageError> {
        Ok(self.session.lock().clone())
    }

    fn save(&self, session: &PersistedSession) -> Result<(), StorageError> {
        *self.session.lock() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.session.lock().take();
        Ok(())
    }
}
