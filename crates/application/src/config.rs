//! Client configuration values.
//!
//! Loading (files, environment) lives in the infrastructure layer; this is
//! only the shape and its defaults.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;

/// Bookstore client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the REST API, including its `/api` prefix.
    pub api_base_url: String,

    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,

    /// Quiet period before a search term is committed.
    pub search_debounce_ms: u64,

    /// Default page size for catalog listings.
    pub page_limit: u32,

    /// Backoff for rate-limited requests.
    pub retry: RetrySettings,

    /// Where the session is persisted. `None` uses the platform config dir.
    pub session_file: Option<PathBuf>,
}

/// Serializable form of [`RetryPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// First backoff delay in milliseconds.
    pub initial_delay_ms: u64,
    /// Backoff cap in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5001/api".to_string(),
            request_timeout_ms: 15_000,
            search_debounce_ms: 500,
            page_limit: folio_domain::DEFAULT_PAGE_LIMIT,
            retry: RetrySettings::default(),
            session_file: None,
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 1000,
            max_delay_ms: 10_000,
        }
    }
}

impl ClientConfig {
    /// Request timeout as a `Duration`.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Search debounce as a `Duration`.
    #[must_use]
    pub const fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// Builds the retry policy from the settings.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::builder()
            .max_retries(self.retry.max_retries)
            .initial_delay(Duration::from_millis(self.retry.initial_delay_ms))
            .max_delay(Duration::from_millis(self.retry.max_delay_ms))
            .build()
    }
}
