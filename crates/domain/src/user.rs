//! Users, roles and credentials.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::record::document_id;

/// Minimum accepted password length for registration.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Role of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular customer (default).
    #[default]
    Client,
    /// Merchant managing their catalog.
    Merchant,
    /// Administrator.
    Admin,
}

impl UserRole {
    /// Wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Merchant => "merchant",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user profile as returned by the auth endpoints.
///
/// Decoding accepts the key as `_id`, `id` or both; encoding writes `_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UserRecord")]
pub struct User {
    /// Server-assigned identifier.
    #[serde(rename = "_id")]
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Role.
    pub role: UserRole,
}

#[derive(Deserialize)]
struct UserRecord {
    #[serde(rename = "_id", default)]
    stored_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    name: String,
    email: String,
    #[serde(default)]
    role: UserRole,
}

impl TryFrom<UserRecord> for User {
    type Error = DomainError;

    fn try_from(record: UserRecord) -> DomainResult<Self> {
        Ok(Self {
            id: document_id(record.stored_id, record.id)?,
            name: record.name,
            email: record.email,
            role: record.role,
        })
    }
}

impl User {
    /// Returns true if the user has exactly `role`.
    #[must_use]
    pub fn has_role(&self, role: UserRole) -> bool {
        self.role == role
    }

    /// Merchants and admins may create, edit and delete catalog items.
    #[must_use]
    pub const fn can_manage_catalog(&self) -> bool {
        matches!(self.role, UserRole::Merchant | UserRole::Admin)
    }
}

/// Credentials for `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCredentials {
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
}

impl LoginCredentials {
    /// Creates login credentials.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Credentials for `POST /auth/register`.
///
/// `confirm_password` is checked locally and never sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCredentials {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
    /// Password confirmation.
    #[serde(skip_serializing)]
    pub confirm_password: String,
    /// Requested role; the backend decides whether to honour it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}

impl RegisterCredentials {
    /// Checks password confirmation, then password length.
    ///
    /// # Errors
    ///
    /// Returns `PasswordMismatch` or `PasswordTooShort`.
    pub fn validate(&self) -> DomainResult<()> {
        if self.password != self.confirm_password {
            return Err(DomainError::PasswordMismatch);
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(DomainError::PasswordTooShort {
                min: MIN_PASSWORD_LENGTH,
            });
        }
        Ok(())
    }
}

/// Body of `PUT /auth/profile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    /// New display name.
    pub name: String,
    /// New email address.
    pub email: String,
}

impl ProfileUpdate {
    /// Checks that neither field is blank.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` naming the first blank field.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::MissingField("name"));
        }
        if self.email.trim().is_empty() {
            return Err(DomainError::MissingField("email"));
        }
        Ok(())
    }
}

/// Body of `PUT /auth/password`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    /// Password currently in use.
    pub current_password: String,
    /// Replacement password.
    pub new_password: String,
}

impl PasswordChange {
    /// Checks the current password is present and the new one long enough.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` or `PasswordTooShort`.
    pub fn validate(&self) -> DomainResult<()> {
        if self.current_password.is_empty() {
            return Err(DomainError::MissingField("currentPassword"));
        }
        if self.new_password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(DomainError::PasswordTooShort {
                min: MIN_PASSWORD_LENGTH,
            });
        }
        Ok(())
    }
}
