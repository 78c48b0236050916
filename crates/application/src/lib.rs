//! Folio Application - Client use cases
//!
//! This crate holds the client-side behavior of the bookstore: the API
//! client with its retry and session rules, the session manager, and the
//! catalog sync engine. It depends only on the domain crate and reaches the
//! outside world through the traits in [`ports`].

pub mod api;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod debounce;
pub mod error;
pub mod ports;
pub mod retry;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ApiClient, ClientEvent};
pub use auth::{SESSION_EXPIRED, SessionManager};
pub use catalog::{AUTH_REQUIRED, CatalogSync, LoadOutcome};
pub use config::{ClientConfig, RetrySettings};
pub use debounce::Debouncer;
pub use error::{ApiError, ApiResult};
pub use retry::{RetryPolicy, RetryPolicyBuilder};
