//! Backend API access
//!
//! [`ApiClient`] owns every cross-cutting HTTP concern and implements the
//! gateway ports on top of it.

mod auth;
mod books;
mod client;
mod events;

pub use client::ApiClient;
pub use events::ClientEvent;
