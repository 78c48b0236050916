//! In-memory port fakes shared by the unit tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use folio_domain::{
    AuthPayload, Book, BookDraft, BookPage, BookPatch, LoginCredentials, PaginationMeta,
    PasswordChange, PersistedSession, ProfileUpdate, QueryFilters, RegisterCredentials,
    SessionSnapshot, User, UserRole,
};
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::error::{ApiError, ApiResult};
use crate::ports::{
    AuthGateway, BookGateway, Clock, Navigator, OutboundRequest, RawResponse, StorageError,
    TokenSource, TokenStorage, Transport, TransportError,
};

#[derive(Default)]
pub(crate) struct MemoryStorage {
    session: Mutex<Option<PersistedSession>>,
}

impl MemoryStorage {
    pub(crate) fn with_token(token: &str) -> Self {
        let session = PersistedSession::new(SessionSnapshot {
            token: Some(token.to_string()),
            user: Some(user("u1", UserRole::Client)),
            is_authenticated: true,
        });
        Self {
            session: Mutex::new(Some(session)),
        }
    }

    pub(crate) fn stored(&self) -> Option<PersistedSession> {
        self.session.lock().clone()
    }
}

impl TokenStorage for MemoryStorage {
    fn load(&self) -> Result<Option<PersistedSession>, StorageError> {
        Ok(self.session.lock().clone())
    }

    fn save(&self, session: &PersistedSession) -> Result<(), StorageError> {
        *self.session.lock() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.session.lock() = None;
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct RecordingClock {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingClock {
    pub(crate) fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().clone()
    }
}

#[async_trait]
impl Clock for RecordingClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().push(duration);
    }
}

pub(crate) struct RecordingNavigator {
    current: Mutex<String>,
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub(crate) fn at(path: &str) -> Self {
        Self {
            current: Mutex::new(path.to_string()),
            visited: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn visited(&self) -> Vec<String> {
        self.visited.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn current_path(&self) -> String {
        self.current.lock().clone()
    }

    fn navigate(&self, path: &str) {
        *self.current.lock() = path.to_string();
        self.visited.lock().push(path.to_string());
    }
}

/// Replays canned responses in order and records every request.
pub(crate) struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
    requests: Mutex<Vec<OutboundRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new(responses: Vec<Result<RawResponse, TransportError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &OutboundRequest) -> Result<RawResponse, TransportError> {
        self.requests.lock().push(request.clone());
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Other("no scripted response".to_string())))
    }
}

/// Token source whose answer the test flips directly.
#[derive(Default)]
pub(crate) struct StaticTokens {
    token: Mutex<Option<String>>,
}

impl StaticTokens {
    pub(crate) fn with(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }

    pub(crate) fn revoke(&self) {
        *self.token.lock() = None;
    }
}

impl TokenSource for StaticTokens {
    fn current_token(&self) -> Option<String> {
        self.token.lock().clone()
    }
}

/// One scripted gateway answer, optionally held until the test releases it.
pub(crate) struct Step<T> {
    gate: Option<Arc<Notify>>,
    result: ApiResult<T>,
}

impl<T> Step<T> {
    pub(crate) fn now(result: ApiResult<T>) -> Self {
        Self { gate: None, result }
    }

    pub(crate) fn gated(result: ApiResult<T>) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        (
            Self {
                gate: Some(gate.clone()),
                result,
            },
            gate,
        )
    }

    async fn resolve(self) -> ApiResult<T> {
        if let Some(gate) = self.gate {
            gate.notified().await;
        }
        self.result
    }
}

fn pop<T>(queue: &Mutex<VecDeque<Step<T>>>) -> Step<T> {
    queue
        .lock()
        .pop_front()
        .unwrap_or_else(|| Step::now(Err(ApiError::InvalidRequest("unscripted call".to_string()))))
}

/// Catalog gateway fake: scripted per endpoint, records arguments.
#[derive(Default)]
pub(crate) struct FakeBooks {
    lists: Mutex<VecDeque<Step<BookPage>>>,
    creates: Mutex<VecDeque<Step<Book>>>,
    updates: Mutex<VecDeque<Step<Book>>>,
    deletes: Mutex<VecDeque<Step<()>>>,
    list_calls: Mutex<Vec<QueryFilters>>,
    mutation_calls: Mutex<Vec<String>>,
}

impl FakeBooks {
    pub(crate) fn on_list(&self, step: Step<BookPage>) -> &Self {
        self.lists.lock().push_back(step);
        self
    }

    pub(crate) fn on_create(&self, step: Step<Book>) -> &Self {
        self.creates.lock().push_back(step);
        self
    }

    pub(crate) fn on_update(&self, step: Step<Book>) -> &Self {
        self.updates.lock().push_back(step);
        self
    }

    pub(crate) fn on_delete(&self, step: Step<()>) -> &Self {
        self.deletes.lock().push_back(step);
        self
    }

    pub(crate) fn list_calls(&self) -> Vec<QueryFilters> {
        self.list_calls.lock().clone()
    }

    pub(crate) fn mutation_calls(&self) -> Vec<String> {
        self.mutation_calls.lock().clone()
    }
}

#[async_trait]
impl BookGateway for FakeBooks {
    async fn list_books(&self, filters: &QueryFilters) -> ApiResult<BookPage> {
        self.list_calls.lock().push(filters.clone());
        let step = pop(&self.lists);
        step.resolve().await
    }

    async fn get_book(&self, id: &str) -> ApiResult<Book> {
        self.mutation_calls.lock().push(format!("get {id}"));
        Err(ApiError::NotFound { message: None })
    }

    async fn create_book(&self, draft: &BookDraft) -> ApiResult<Book> {
        self.mutation_calls.lock().push(format!("create {}", draft.title));
        let step = pop(&self.creates);
        step.resolve().await
    }

    async fn update_book(&self, id: &str, _patch: &BookPatch) -> ApiResult<Book> {
        self.mutation_calls.lock().push(format!("update {id}"));
        let step = pop(&self.updates);
        step.resolve().await
    }

    async fn delete_book(&self, id: &str) -> ApiResult<()> {
        self.mutation_calls.lock().push(format!("delete {id}"));
        let step = pop(&self.deletes);
        step.resolve().await
    }
}

/// Auth gateway fake.
#[derive(Default)]
pub(crate) struct FakeAuth {
    logins: Mutex<VecDeque<ApiResult<AuthPayload>>>,
    registers: Mutex<VecDeque<ApiResult<AuthPayload>>>,
    profiles: Mutex<VecDeque<ApiResult<User>>>,
    profile_updates: Mutex<VecDeque<ApiResult<User>>>,
    password_changes: Mutex<VecDeque<ApiResult<()>>>,
    calls: Mutex<Vec<&'static str>>,
}

impl FakeAuth {
    pub(crate) fn on_login(&self, result: ApiResult<AuthPayload>) -> &Self {
        self.logins.lock().push_back(result);
        self
    }

    pub(crate) fn on_register(&self, result: ApiResult<AuthPayload>) -> &Self {
        self.registers.lock().push_back(result);
        self
    }

    pub(crate) fn on_profile(&self, result: ApiResult<User>) -> &Self {
        self.profiles.lock().push_back(result);
        self
    }

    pub(crate) fn on_update_profile(&self, result: ApiResult<User>) -> &Self {
        self.profile_updates.lock().push_back(result);
        self
    }

    pub(crate) fn on_change_password(&self, result: ApiResult<()>) -> &Self {
        self.password_changes.lock().push_back(result);
        self
    }

    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }

    fn next<T>(queue: &Mutex<VecDeque<ApiResult<T>>>) -> ApiResult<T> {
        queue
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::InvalidRequest("unscripted call".to_string())))
    }
}

#[async_trait]
impl AuthGateway for FakeAuth {
    async fn login(&self, _credentials: &LoginCredentials) -> ApiResult<AuthPayload> {
        self.calls.lock().push("login");
        Self::next(&self.logins)
    }

    async fn register(&self, credentials: &RegisterCredentials) -> ApiResult<AuthPayload> {
        self.calls.lock().push("register");
        credentials.validate()?;
        Self::next(&self.registers)
    }

    async fn profile(&self) -> ApiResult<User> {
        self.calls.lock().push("profile");
        Self::next(&self.profiles)
    }

    async fn update_profile(&self, _update: &ProfileUpdate) -> ApiResult<User> {
        self.calls.lock().push("update_profile");
        Self::next(&self.profile_updates)
    }

    async fn change_password(&self, _change: &PasswordChange) -> ApiResult<()> {
        self.calls.lock().push("change_password");
        Self::next(&self.password_changes)
    }
}

pub(crate) fn user(id: &str, role: UserRole) -> User {
    User {
        id: id.to_string(),
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        role,
    }
}

pub(crate) fn auth_ok(token: &str) -> AuthPayload {
    AuthPayload {
        success: true,
        token: Some(token.to_string()),
        user: Some(user("u1", UserRole::Client)),
        message: None,
    }
}

pub(crate) fn page_of(ids: &[&str]) -> BookPage {
    let items: Vec<Book> = ids
        .iter()
        .map(|id| Book::new(*id, format!("Title {id}"), "Author"))
        .collect();
    let total = items.len() as u64;
    BookPage {
        items,
        pagination: PaginationMeta {
            page: 1,
            limit: 10,
            total,
            pages: 1,
        },
    }
}
