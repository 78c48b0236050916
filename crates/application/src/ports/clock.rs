//! Clock port for time-related operations

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Port for reading the current time and waiting.
///
/// Retry backoff sleeps through this port so tests can record the requested
/// delays instead of waiting for them.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;

    /// Suspends the caller for `duration`.
    async fn sleep(&self, duration: Duration);
}
