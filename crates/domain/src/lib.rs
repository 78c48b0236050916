//! Folio Domain - Core bookstore types
//!
//! This crate defines the domain model for the Folio bookstore client.
//! All types here are pure Rust with no I/O dependencies.

pub mod book;
pub mod cart;
pub mod envelope;
pub mod error;
pub mod pagination;
pub mod query;
mod record;
pub mod session;
pub mod state;
pub mod user;

pub use book::{Book, BookDraft, BookPatch};
pub use cart::{Cart, CartItem};
pub use envelope::{ApiEnvelope, AuthPayload, BookPage, HealthStatus};
pub use error::{DomainError, DomainResult};
pub use pagination::PaginationMeta;
pub use query::{DEFAULT_PAGE_LIMIT, FiltersPatch, QueryFilters, SortField, SortOrder};
pub use session::{PersistedSession, SessionSnapshot, SessionState};
pub use state::{ApiErrorKind, CatalogState};
pub use user::{
    LoginCredentials, MIN_PASSWORD_LENGTH, PasswordChange, ProfileUpdate, RegisterCredentials, User,
    UserRole,
};
