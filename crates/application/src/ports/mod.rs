//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod clock;
mod gateway;
mod navigator;
mod token_storage;
mod transport;

pub use clock::Clock;
pub use gateway::{AuthGateway, BookGateway, TokenSource};
pub use navigator::{LOGIN_PATH, Navigator};
pub use token_storage::{StorageError, TokenStorage};
pub use transport::{HttpMethod, OutboundRequest, RawResponse, Transport, TransportError};
