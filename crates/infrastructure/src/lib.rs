//! Folio Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus configuration loading and the
//! [`FolioClient`] bootstrap.

pub mod adapters;
pub mod client;
pub mod config;
pub mod persistence;

pub use adapters::{LoggingNavigator, ReqwestTransport, SystemClock};
pub use client::{ConnectError, FolioClient};
pub use config::{ConfigError, default_config_path, load_config};
pub use persistence::{FileTokenStorage, MemoryTokenStorage};
