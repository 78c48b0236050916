//! Wires the adapters into a ready-to-use client.

use std::sync::Arc;

use folio_application::ports::{Navigator, TokenStorage};
use folio_application::{ApiClient, ApiError, CatalogSync, ClientConfig, SessionManager};
use folio_domain::HealthStatus;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::info;
use url::Url;

use crate::adapters::{LoggingNavigator, ReqwestTransport, SystemClock};
use crate::persistence::FileTokenStorage;

/// Errors while bootstrapping the client.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// `api_base_url` could not be parsed.
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    /// The HTTP transport or API client could not be created.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl From<folio_application::ports::TransportError> for ConnectError {
    fn from(error: folio_application::ports::TransportError) -> Self {
        Self::Api(ApiError::Network(error))
    }
}

/// The assembled client: API access, session and catalog engine.
pub struct FolioClient {
    api: Arc<ApiClient>,
    session: Arc<SessionManager>,
    catalog: CatalogSync,
    watchdog: JoinHandle<()>,
}

impl FolioClient {
    /// Builds the client with file-backed session storage.
    ///
    /// The stored session is restored before this returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the transport cannot be
    /// created.
    pub fn connect(config: &ClientConfig) -> Result<Self, ConnectError> {
        let storage: Arc<dyn TokenStorage> = Arc::new(
            config
                .session_file
                .clone()
                .map_or_else(FileTokenStorage::default, FileTokenStorage::new),
        );
        Self::with_storage(config, storage, Arc::new(LoggingNavigator::default()))
    }

    /// Builds the client around the given storage and navigator.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the transport cannot be
    /// created.
    pub fn with_storage(
        config: &ClientConfig,
        storage: Arc<dyn TokenStorage>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ConnectError> {
        let base_url = Url::parse(&config.api_base_url)?;
        let transport = Arc::new(ReqwestTransport::new()?);

        let api = Arc::new(
            ApiClient::new(base_url, transport, storage.clone(), navigator, Arc::new(SystemClock::new()))?
                .with_retry_policy(config.retry_policy())
                .with_timeout(config.request_timeout()),
        );

        let session = Arc::new(SessionManager::new(api.clone(), storage));
        let restored = session.restore();
        let watchdog = session.watch_client_events(api.subscribe());

        let catalog = CatalogSync::new(
            api.clone(),
            session.clone(),
            config.page_limit,
            config.search_debounce(),
        );

        info!(
            base_url = %config.api_base_url,
            authenticated = restored.is_authenticated,
            "client ready"
        );

        Ok(Self {
            api,
            session,
            catalog,
            watchdog,
        })
    }

    /// The API client.
    #[must_use]
    pub const fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    /// The session manager.
    #[must_use]
    pub const fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// The catalog engine.
    #[must_use]
    pub const fn catalog(&self) -> &CatalogSync {
        &self.catalog
    }

    /// `GET /health`.
    ///
    /// # Errors
    ///
    /// Returns the API error if the backend cannot be reached.
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.api.health().await
    }
}

impl Drop for FolioClient {
    fn drop(&mut self) {
        self.catalog.unmount();
        self.watchdog.abort();
    }
}
