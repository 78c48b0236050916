//! Session state and its durable form.
//!
//! Only the token and user (plus the authenticated flag derived from them)
//! survive a restart. Loading and error flags are transient.

use serde::{Deserialize, Serialize};

use crate::user::User;

/// In-memory session state observed by the front end.
///
/// `is_authenticated == true` implies `token.is_some()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Current user.
    pub user: Option<User>,
    /// Bearer token.
    pub token: Option<String>,
    /// Whether a valid session is held.
    pub is_authenticated: bool,
    /// A login/register/profile call is in flight.
    pub is_loading: bool,
    /// Last user-facing error.
    pub error: Option<String>,
}

impl SessionState {
    /// Authenticated state for `user` holding `token`.
    #[must_use]
    pub const fn authenticated(user: User, token: String) -> Self {
        Self {
            user: Some(user),
            token: Some(token),
            is_authenticated: true,
            is_loading: false,
            error: None,
        }
    }

    /// Rebuilds state from a persisted snapshot. Transient flags reset.
    #[must_use]
    pub fn from_persisted(persisted: &PersistedSession) -> Self {
        let snapshot = &persisted.state;
        let is_authenticated = snapshot.is_authenticated && snapshot.token.is_some();
        Self {
            user: snapshot.user.clone().filter(|_| is_authenticated),
            token: snapshot.token.clone().filter(|_| is_authenticated),
            is_authenticated,
            is_loading: false,
            error: None,
        }
    }

    /// Durable form of this state.
    #[must_use]
    pub fn to_persisted(&self) -> PersistedSession {
        PersistedSession::new(SessionSnapshot {
            token: self.token.clone(),
            user: self.user.clone(),
            is_authenticated: self.is_authenticated,
        })
    }
}

/// The persisted fields of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Bearer token.
    pub token: Option<String>,
    /// Current user.
    pub user: Option<User>,
    /// Authenticated flag at the time of writing.
    #[serde(default)]
    pub is_authenticated: bool,
}

/// Version-tagged envelope stored under the single durable session key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    /// Schema version of `state`.
    #[serde(default)]
    pub version: u32,
    /// Persisted fields.
    pub state: SessionSnapshot,
}

impl PersistedSession {
    /// Current schema version.
    pub const CURRENT_VERSION: u32 = 1;

    /// Wraps a snapshot at the current version.
    #[must_use]
    pub const fn new(state: SessionSnapshot) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            state,
        }
    }

    /// Brings an older snapshot up to the current version.
    ///
    /// Version 0 has the same shape as version 1. Snapshots written by a newer
    /// client cannot be interpreted and yield `None`.
    #[must_use]
    pub fn migrate(self) -> Option<Self> {
        match self.version {
            0 | Self::CURRENT_VERSION => Some(Self {
                version: Self::CURRENT_VERSION,
                state: self.state,
            }),
            _ => None,
        }
    }

    /// Token held by the snapshot, if any.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.state.token.as_deref().filter(|t| !t.is_empty())
    }
}
