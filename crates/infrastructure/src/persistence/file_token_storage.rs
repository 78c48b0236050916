//! File-based session storage.
//!
//! The session lives in a single JSON document:
//! ```json
//! {
//!   "version": 1,
//!   "state": {
//!     "token": "eyJhbGciOi...",
//!     "user": { "_id": "65f0...", "name": "Ada", "email": "ada@example.com", "role": "client" },
//!     "isAuthenticated": true
//!   }
//! }
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use folio_application::ports::{StorageError, TokenStorage};
use folio_domain::PersistedSession;
use parking_lot::Mutex;
use tracing::{debug, warn};

const APP_DIR: &str = "folio";
const FILE_NAME: &str = "auth-storage.json";

/// Stores the session in a JSON file.
///
/// Writes go to a sibling temp file that is then renamed over the target,
/// so a reader sees either the old document or the new one.
///
/// The file is read on the first load and answered from memory afterwards;
/// save and clear update the file and the cached copy together. File access
/// is blocking. A session written by another process becomes visible after
/// [`reload`](Self::reload).
#[derive(Debug)]
pub struct FileTokenStorage {
    path: PathBuf,
    /// `None` until the file has been read.
    cached: Mutex<Option<Option<PersistedSession>>>,
}

impl FileTokenStorage {
    /// Creates a storage backed by `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: Mutex::new(None),
        }
    }

    /// Drops the cached copy so the next load reads the file again.
    pub fn reload(&self) {
        *self.cached.lock() = None;
    }

    /// `<config dir>/folio/auth-storage.json`, falling back to the current
    /// directory when the platform has no config dir.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join(FILE_NAME)
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| FILE_NAME.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn read_file(&self) -> Result<Option<PersistedSession>, StorageError> {
        let content = match fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::Io(e)),
        };

        let stored: PersistedSession = serde_json::from_slice(&content)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let version = stored.version;
        let migrated = stored.migrate();
        if migrated.is_none() {
            warn!(
                version,
                path = %self.path.display(),
                "stored session was written by a newer version, ignoring it"
            );
        }
        Ok(migrated)
    }
}

impl Default for FileTokenStorage {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Result<Option<PersistedSession>, StorageError> {
        let mut cached = self.cached.lock();
        if let Some(session) = cached.as_ref() {
            return Ok(session.clone());
        }
        let session = self.read_file()?;
        *cached = Some(session.clone());
        Ok(session)
    }

    fn save(&self, session: &PersistedSession) -> Result<(), StorageError> {
        let content = serde_json::to_vec_pretty(session)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let mut cached = self.cached.lock();
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let temp = self.temp_path();
        fs::write(&temp, content)?;
        fs::rename(&temp, &self.path)?;
        *cached = Some(Some(session.clone()));
        debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut cached = self.cached.lock();
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "session cleared"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(StorageError::Io(e)),
        }
        *cached = Some(None);
        Ok(())
    }
}
