//! Backend gateway ports
//!
//! The session manager and catalog sync engine talk to the backend only
//! through these traits. `ApiClient` implements them; tests substitute fakes.

use async_trait::async_trait;
use folio_domain::{
    AuthPayload, Book, BookDraft, BookPage, BookPatch, LoginCredentials, PasswordChange,
    ProfileUpdate, QueryFilters, RegisterCredentials, User,
};

use crate::error::ApiError;

/// Catalog endpoints.
#[async_trait]
pub trait BookGateway: Send + Sync {
    /// `GET /books` with the given filters.
    async fn list_books(&self, filters: &QueryFilters) -> Result<BookPage, ApiError>;

    /// `GET /books/:id`.
    async fn get_book(&self, id: &str) -> Result<Book, ApiError>;

    /// `POST /books`.
    async fn create_book(&self, draft: &BookDraft) -> Result<Book, ApiError>;

    /// `PUT /books/:id`.
    async fn update_book(&self, id: &str, patch: &BookPatch) -> Result<Book, ApiError>;

    /// `DELETE /books/:id`.
    async fn delete_book(&self, id: &str) -> Result<(), ApiError>;
}

/// Authentication endpoints.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// `POST /auth/login`.
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthPayload, ApiError>;

    /// `POST /auth/register`.
    async fn register(&self, credentials: &RegisterCredentials) -> Result<AuthPayload, ApiError>;

    /// `GET /auth/profile`.
    async fn profile(&self) -> Result<User, ApiError>;

    /// `PUT /auth/profile`.
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError>;

    /// `PUT /auth/password`. A 401 here means the current password was wrong
    /// and does not end the session.
    async fn change_password(&self, change: &PasswordChange) -> Result<(), ApiError>;
}

/// Answers "is there a token right now?", re-reading on every call.
pub trait TokenSource: Send + Sync {
    /// Current bearer token.
    fn current_token(&self) -> Option<String>;
}
