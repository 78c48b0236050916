//! Domain error types

use thiserror::Error;

/// Domain-level errors raised by client-side validation.
///
/// These never reach the network layer: an operation that fails validation
/// returns before any request is built.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Password and confirmation differ.
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// Password is shorter than the accepted minimum.
    #[error("Password must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum accepted length.
        min: usize,
    },

    /// A required field is missing or blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// A filter value cannot be used in a query.
    #[error("invalid filter: {0}")]
    InvalidFilter(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
