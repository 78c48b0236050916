//! Observable state types for front-end binding.
//!
//! `CatalogState` is what a catalog view renders; `ApiErrorKind` lets the
//! view pick wording and a retry affordance without inspecting error values.

use serde::{Deserialize, Serialize};

use crate::book::Book;
use crate::pagination::PaginationMeta;
use crate::query::QueryFilters;

/// State owned by the catalog sync engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogState {
    /// Items on the committed page.
    pub items: Vec<Book>,
    /// A load or mutation is in flight.
    pub loading: bool,
    /// Last user-facing error.
    pub error: Option<String>,
    /// Pagination of the committed page.
    pub pagination: PaginationMeta,
    /// Filters of the last successful load (or the last explicit `set_filters`).
    pub filters: QueryFilters,
}

impl CatalogState {
    /// Initial state for a catalog with the given filters.
    #[must_use]
    pub fn with_filters(filters: QueryFilters) -> Self {
        Self {
            filters,
            ..Self::default()
        }
    }

    /// Finds an item on the current page.
    #[must_use]
    pub fn item(&self, id: &str) -> Option<&Book> {
        self.items.iter().find(|b| b.id == id)
    }
}

/// Categories of API failures for user-facing display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// Rejected locally before any request was made.
    Validation,

    /// The session is missing or no longer valid (HTTP 401).
    Auth,

    /// The backend kept rate limiting after all retries (HTTP 429).
    RateLimit,

    /// No response was received (connection failure or timeout).
    Network,

    /// Any other non-success response.
    Server,

    /// The requested item does not exist (HTTP 404).
    NotFound,
}

impl ApiErrorKind {
    /// Returns user-friendly suggestions for this error type.
    #[must_use]
    pub const fn suggestions(&self) -> &[&'static str] {
        match self {
            Self::Validation => &["Check the highlighted fields and try again"],
            Self::Auth => &["Your session has ended", "Sign in again to continue"],
            Self::RateLimit => &[
                "The server is receiving too many requests",
                "Wait a few seconds before retrying",
            ],
            Self::Network => &[
                "Check your internet connection",
                "Verify the server is running",
                "Try again in a moment",
            ],
            Self::Server => &[
                "The server could not complete the request",
                "Try again later",
            ],
            Self::NotFound => &[
                "The book may have been removed",
                "Refresh the catalog to see current items",
            ],
        }
    }

    /// Returns a human-readable title for this error type.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Validation => "Invalid Input",
            Self::Auth => "Authentication Required",
            Self::RateLimit => "Too Many Requests",
            Self::Network => "Network Unreachable",
            Self::Server => "Server Error",
            Self::NotFound => "Not Found",
        }
    }

    /// Whether a view should offer a "retry" affordance.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimit | Self::Network | Self::Server)
    }
}
