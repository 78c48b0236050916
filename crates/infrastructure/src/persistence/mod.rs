//! Durable session storage implementations.

mod file_token_storage;
mod memory;

pub use file_token_storage::FileTokenStorage;
pub use memory::MemoryTokenStorage;
