//! Application error types

use folio_domain::{ApiErrorKind, DomainError};
use thiserror::Error;

use crate::ports::TransportError;

/// Every failure an API operation can surface.
///
/// The `Display` text is the library-level message. Backend-provided
/// messages are carried separately and take precedence in
/// [`ApiError::user_message`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Rejected locally; no request was sent.
    #[error("{0}")]
    Validation(#[from] DomainError),

    /// HTTP 401. The stored session has already been cleared.
    #[error("Request failed with status code 401")]
    Unauthorized {
        /// Backend message.
        message: Option<String>,
    },

    /// HTTP 429 on every attempt.
    #[error("Request failed with status code 429 after {attempts} attempts")]
    RateLimited {
        /// Attempts made, including the first.
        attempts: u32,
        /// Backend message from the last attempt.
        message: Option<String>,
    },

    /// No response was received.
    #[error("Network unreachable: {0}")]
    Network(#[from] TransportError),

    /// HTTP 404.
    #[error("Request failed with status code 404")]
    NotFound {
        /// Backend message.
        message: Option<String>,
    },

    /// Any other non-2xx status.
    #[error("Request failed with status code {status}")]
    Server {
        /// HTTP status.
        status: u16,
        /// Backend message.
        message: Option<String>,
    },

    /// 2xx response whose envelope reported `success: false`.
    #[error("The server rejected the request")]
    Rejected {
        /// Backend message.
        message: Option<String>,
    },

    /// The request could not be built.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The response body did not have the expected shape.
    #[error("Invalid response: {0}")]
    Decode(String),

    /// The session could not be written to durable storage.
    #[error("Could not save session: {0}")]
    Storage(String),
}

impl ApiError {
    /// Classifies a non-success HTTP status other than 429.
    #[must_use]
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        match status {
            401 => Self::Unauthorized { message },
            404 => Self::NotFound { message },
            _ => Self::Server { status, message },
        }
    }

    /// Display category.
    #[must_use]
    pub const fn kind(&self) -> ApiErrorKind {
        match self {
            Self::Validation(_) | Self::InvalidRequest(_) => ApiErrorKind::Validation,
            Self::Unauthorized { .. } => ApiErrorKind::Auth,
            Self::RateLimited { .. } => ApiErrorKind::RateLimit,
            Self::Network(_) => ApiErrorKind::Network,
            Self::NotFound { .. } => ApiErrorKind::NotFound,
            Self::Server { .. } | Self::Rejected { .. } | Self::Decode(_) | Self::Storage(_) => {
                ApiErrorKind::Server
            }
        }
    }

    /// Backend-provided message, if the backend sent a non-empty one.
    #[must_use]
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { message }
            | Self::RateLimited { message, .. }
            | Self::NotFound { message }
            | Self::Server { message, .. }
            | Self::Rejected { message } => {
                message.as_deref().filter(|m| !m.trim().is_empty())
            }
            Self::Validation(_)
            | Self::Network(_)
            | Self::InvalidRequest(_)
            | Self::Decode(_)
            | Self::Storage(_) => {
                None
            }
        }
    }

    /// Single user-facing message: the backend message, else the
    /// library-level message, else `fallback`.
    ///
    /// Only `Rejected` without a backend message has no library-level text
    /// worth showing.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        if let Some(message) = self.backend_message() {
            return message.to_string();
        }
        match self {
            Self::Rejected { .. } => fallback.to_string(),
            other => other.to_string(),
        }
    }

    /// Returns true for `NotFound`.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
