//! Catalog data sync.

mod sync;

pub use sync::{AUTH_REQUIRED, CatalogSync, LoadOutcome};
