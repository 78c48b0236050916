//! Headless navigator

use folio_application::ports::Navigator;
use parking_lot::Mutex;
use tracing::info;

/// Tracks the current route for front ends without a router and logs every
/// navigation.
#[derive(Debug)]
pub struct LoggingNavigator {
    current: Mutex<String>,
}

impl LoggingNavigator {
    /// Starts at `path`.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            current: Mutex::new(path.into()),
        }
    }
}

impl Default for LoggingNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for LoggingNavigator {
    fn current_path(&self) -> String {
        self.current.lock().clone()
    }

    fn navigate(&self, path: &str) {
        let mut current = self.current.lock();
        info!(from = %*current, to = path, "navigating");
        *current = path.to_string();
    }
}
