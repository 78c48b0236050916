//! Session manager: the auth store.
//!
//! Holds the current `SessionState` in a `watch` channel so any number of
//! observers can follow it. The durable copy in [`TokenStorage`] is written
//! before an authenticated state is published, so `is_authenticated` never
//! outruns the stored token.

use std::sync::{Arc, Weak};

use folio_domain::{
    LoginCredentials, PasswordChange, ProfileUpdate, RegisterCredentials, SessionState, User,
    UserRole,
};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::ClientEvent;
use crate::error::{ApiError, ApiResult};
use crate::ports::{AuthGateway, TokenSource, TokenStorage};

const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed";
const PROFILE_FAILED: &str = "Failed to load profile";
const PROFILE_UPDATE_FAILED: &str = "Failed to update profile";
const PASSWORD_CHANGE_FAILED: &str = "Failed to change password";

/// Error recorded when the backend ends the session.
pub const SESSION_EXPIRED: &str = "Your session has expired. Please sign in again.";

/// Explicitly constructed replacement for a global auth store.
pub struct SessionManager {
    gateway: Arc<dyn AuthGateway>,
    storage: Arc<dyn TokenStorage>,
    state: watch::Sender<SessionState>,
}

impl SessionManager {
    /// Creates an unauthenticated manager. Call [`restore`](Self::restore) to
    /// rehydrate a stored session.
    #[must_use]
    pub fn new(gateway: Arc<dyn AuthGateway>, storage: Arc<dyn TokenStorage>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            gateway,
            storage,
            state,
        }
    }

    /// Rehydrates from durable storage.
    ///
    /// Only token and user come back; loading and error flags start fresh.
    /// An unreadable or newer-versioned store is treated as empty.
    pub fn restore(&self) -> SessionState {
        let restored = match self.storage.load() {
            Ok(Some(persisted)) => match persisted.migrate() {
                Some(persisted) => SessionState::from_persisted(&persisted),
                None => {
                    warn!("stored session has an unknown version, ignoring it");
                    SessionState::default()
                }
            },
            Ok(None) => SessionState::default(),
            Err(e) => {
                warn!(error = %e, "failed to read stored session");
                SessionState::default()
            }
        };
        debug!(authenticated = restored.is_authenticated, "session restored");
        self.state.send_replace(restored.clone());
        restored
    }

    /// Exchanges credentials for a session.
    ///
    /// # Errors
    ///
    /// Returns the API error after recording its message in the state, so a
    /// form can branch on it.
    pub async fn login(&self, credentials: &LoginCredentials) -> ApiResult<User> {
        self.begin();
        let result = self.gateway.login(credentials).await;
        self.finish_exchange(result, LOGIN_FAILED)
    }

    /// Creates an account and signs in.
    ///
    /// Password confirmation and length are checked before any request is
    /// made. A local validation failure records the error without touching
    /// the current session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for rejected input, otherwise the API
    /// error, after recording its message in the state.
    pub async fn register(&self, credentials: &RegisterCredentials) -> ApiResult<User> {
        if let Err(e) = credentials.validate() {
            let err = ApiError::Validation(e);
            let message = err.user_message(REGISTRATION_FAILED);
            self.state.send_modify(|state| {
                state.is_loading = false;
                state.error = Some(message);
            });
            return Err(err);
        }

        self.begin();
        let result = self.gateway.register(credentials).await;
        self.finish_exchange(result, REGISTRATION_FAILED)
    }

    /// Ends the session: clears durable storage and resets the state in one
    /// update.
    pub fn logout(&self) {
        self.teardown(None);
        info!("logged out");
    }

    /// Tears the session down after the backend rejected it.
    pub fn expire(&self) {
        self.teardown(Some(SESSION_EXPIRED.to_string()));
        warn!("session expired");
    }

    /// Reloads the signed-in user's profile and persists it.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` if there is no session, otherwise the
    /// API error after recording its message.
    pub async fn refresh_profile(&self) -> ApiResult<User> {
        if !self.state.borrow().is_authenticated {
            return Err(ApiError::Unauthorized { message: None });
        }

        match self.gateway.profile().await {
            Ok(user) => {
                let mut updated = self.snapshot();
                if !updated.is_authenticated {
                    // Logged out while the request was in flight.
                    return Ok(user);
                }
                updated.user = Some(user.clone());
                updated.error = None;
                self.persist(&updated)?;
                self.state.send_replace(updated);
                Ok(user)
            }
            Err(e) => {
                let message = e.user_message(PROFILE_FAILED);
                if matches!(e, ApiError::Unauthorized { .. }) {
                    self.teardown(Some(message));
                } else {
                    self.state.send_modify(|state| state.error = Some(message));
                }
                Err(e)
            }
        }
    }

    /// Saves new profile fields for the signed-in user and persists the
    /// returned user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` if there is no session,
    /// `ApiError::Validation` for blank fields, otherwise the API error after
    /// recording its message.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<User> {
        if !self.state.borrow().is_authenticated {
            return Err(ApiError::Unauthorized { message: None });
        }
        if let Err(e) = update.validate() {
            return Err(self.record_failure(ApiError::Validation(e), PROFILE_UPDATE_FAILED));
        }

        self.begin();
        match self.gateway.update_profile(update).await {
            Ok(user) => {
                let mut updated = self.snapshot();
                updated.is_loading = false;
                if !updated.is_authenticated {
                    self.state.send_replace(updated);
                    return Ok(user);
                }
                updated.user = Some(user.clone());
                if let Err(e) = self.persist(&updated) {
                    return Err(self.record_failure(e, PROFILE_UPDATE_FAILED));
                }
                info!(user = %user.email, "profile updated");
                self.state.send_replace(updated);
                Ok(user)
            }
            Err(e) if matches!(e, ApiError::Unauthorized { .. }) => {
                self.teardown(Some(e.user_message(PROFILE_UPDATE_FAILED)));
                Err(e)
            }
            Err(e) => {
                warn!(error = %e, "profile update failed");
                Err(self.record_failure(e, PROFILE_UPDATE_FAILED))
            }
        }
    }

    /// Changes the signed-in user's password. The session is kept whatever
    /// the outcome.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` if there is no session,
    /// `ApiError::Validation` for rejected input, otherwise the API error
    /// after recording its message.
    pub async fn change_password(&self, change: &PasswordChange) -> ApiResult<()> {
        if !self.state.borrow().is_authenticated {
            return Err(ApiError::Unauthorized { message: None });
        }
        if let Err(e) = change.validate() {
            return Err(self.record_failure(ApiError::Validation(e), PASSWORD_CHANGE_FAILED));
        }

        self.begin();
        match self.gateway.change_password(change).await {
            Ok(()) => {
                info!("password changed");
                self.state.send_modify(|state| state.is_loading = false);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "password change failed");
                Err(self.record_failure(e, PASSWORD_CHANGE_FAILED))
            }
        }
    }

    /// Clears the recorded error, if any.
    pub fn clear_error(&self) {
        self.state.send_if_modified(|state| state.error.take().is_some());
    }

    /// Current state.
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Follows state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Whether the signed-in user has `role`.
    #[must_use]
    pub fn has_role(&self, role: UserRole) -> bool {
        self.state
            .borrow()
            .user
            .as_ref()
            .is_some_and(|user| user.has_role(role))
    }

    /// Tears the session down whenever the API client reports that the
    /// backend rejected it.
    ///
    /// The task holds only a weak reference and ends when the manager is
    /// dropped or the client goes away.
    pub fn watch_client_events(
        self: &Arc<Self>,
        mut events: broadcast::Receiver<ClientEvent>,
    ) -> JoinHandle<()> {
        let manager: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            loop {
                let expired = match events.recv().await {
                    Ok(ClientEvent::SessionExpired) => true,
                    Ok(_) => false,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "client events lagged, checking stored session");
                        manager
                            .upgrade()
                            .is_some_and(|m| m.storage.token().is_none() && m.state.borrow().is_authenticated)
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                if !expired {
                    continue;
                }
                let Some(manager) = manager.upgrade() else {
                    break;
                };
                if manager.state.borrow().is_authenticated {
                    manager.expire();
                }
            }
        })
    }

    fn begin(&self) {
        self.state.send_modify(|state| {
            state.is_loading = true;
            state.error = None;
        });
    }

    fn finish_exchange(
        &self,
        result: ApiResult<folio_domain::AuthPayload>,
        fallback: &str,
    ) -> ApiResult<User> {
        let outcome = result.and_then(|payload| match (payload.user, payload.token) {
            (Some(user), Some(token)) if !token.is_empty() => {
                let state = SessionState::authenticated(user.clone(), token);
                self.persist(&state)?;
                Ok((user, state))
            }
            _ => Err(ApiError::Rejected {
                message: payload.message,
            }),
        });

        match outcome {
            Ok((user, state)) => {
                info!(user = %user.email, role = ?user.role, "signed in");
                self.state.send_replace(state);
                Ok(user)
            }
            Err(e) => {
                warn!(error = %e, "credential exchange failed");
                self.teardown(Some(e.user_message(fallback)));
                Err(e)
            }
        }
    }

    fn record_failure(&self, error: ApiError, fallback: &str) -> ApiError {
        let message = error.user_message(fallback);
        self.state.send_modify(|state| {
            state.is_loading = false;
            state.error = Some(message);
        });
        error
    }

    fn persist(&self, state: &SessionState) -> ApiResult<()> {
        self.storage
            .save(&state.to_persisted())
            .map_err(|e| ApiError::Storage(e.to_string()))
    }

    fn teardown(&self, error: Option<String>) {
        self.state.send_modify(|state| {
            if let Err(e) = self.storage.clear() {
                warn!(error = %e, "failed to clear stored session");
            }
            *state = SessionState {
                error,
                ..SessionState::default()
            };
        });
    }
}

impl TokenSource for SessionManager {
    fn current_token(&self) -> Option<String> {
        self.storage.token()
    }
}
