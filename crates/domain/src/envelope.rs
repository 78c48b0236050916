//! Response envelopes used by the REST backend.

use serde::{Deserialize, Serialize};

use crate::book::Book;
use crate::pagination::PaginationMeta;
use crate::user::User;

/// Standard `{ success, data, message, pagination }` wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Whether the backend considers the call successful.
    #[serde(default)]
    pub success: bool,
    /// Payload. A missing key deserializes as `None`.
    pub data: Option<T>,
    /// Backend-provided message.
    #[serde(default)]
    pub message: Option<String>,
    /// Present on list responses.
    #[serde(default)]
    pub pagination: Option<PaginationMeta>,
}

/// Body returned by login and register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthPayload {
    /// Whether authentication succeeded.
    #[serde(default)]
    pub success: bool,
    /// Bearer token.
    #[serde(default)]
    pub token: Option<String>,
    /// Authenticated user.
    #[serde(default)]
    pub user: Option<User>,
    /// Backend-provided message.
    #[serde(default)]
    pub message: Option<String>,
}

/// Body returned by `GET /health` (not enveloped).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Overall status, `OK` when serving.
    pub status: String,
    /// Database connection state.
    #[serde(default)]
    pub database: String,
}

impl HealthStatus {
    /// Whether the backend reports itself healthy with a connected database.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok") && self.database == "connected"
    }
}

/// One page of catalog results.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BookPage {
    /// Items on this page.
    pub items: Vec<Book>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}
