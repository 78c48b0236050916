//! The single choke point for backend calls.

use std::sync::Arc;
use std::time::Duration;

use folio_domain::HealthStatus;
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;
use tracing::{debug, warn};
use url::Url;

use crate::api::events::ClientEvent;
use crate::error::{ApiError, ApiResult};
use crate::ports::{Clock, HttpMethod, Navigator, OutboundRequest, RawResponse, TokenStorage, Transport};
use crate::retry::RetryPolicy;

const EVENT_CAPACITY: usize = 64;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// How a 401 response is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnauthorizedPolicy {
    /// The session is invalid: clear it and send the user to login.
    ExpireSession,
    /// Credential exchange: a 401 means wrong credentials, not a dead session.
    Report,
}

/// HTTP client for the bookstore API.
///
/// Attaches the bearer token read from storage at send time, strips empty
/// query parameters, retries HTTP 429 with exponential backoff and tears the
/// session down on HTTP 401. Network failures are surfaced immediately.
pub struct ApiClient {
    base_url: Url,
    transport: Arc<dyn Transport>,
    storage: Arc<dyn TokenStorage>,
    navigator: Arc<dyn Navigator>,
    clock: Arc<dyn Clock>,
    retry: RetryPolicy,
    timeout: Duration,
    events: broadcast::Sender<ClientEvent>,
}

impl ApiClient {
    /// Creates a client with the default retry policy and a 15 second timeout.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` if `base_url` cannot carry paths.
    pub fn new(
        base_url: Url,
        transport: Arc<dyn Transport>,
        storage: Arc<dyn TokenStorage>,
        navigator: Arc<dyn Navigator>,
        clock: Arc<dyn Clock>,
    ) -> ApiResult<Self> {
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidRequest(format!(
                "base URL cannot carry paths: {base_url}"
            )));
        }
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            base_url,
            transport,
            storage,
            navigator,
            clock,
            retry: RetryPolicy::default(),
            timeout: DEFAULT_TIMEOUT,
            events,
        })
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replaces the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Subscribes to diagnostic events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    /// The configured retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Sends a request and decodes the 2xx body as `T`.
    ///
    /// `path` is relative to the base URL. Parameters that are `None` or
    /// empty are not sent.
    ///
    /// # Errors
    ///
    /// Returns the classified `ApiError` for any non-2xx status, transport
    /// failure or undecodable body.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        params: &[(&str, Option<String>)],
        body: Option<serde_json::Value>,
    ) -> ApiResult<T> {
        self.execute(method, path, params, body, UnauthorizedPolicy::ExpireSession)
            .await
    }

    /// `GET /health`. The health body is not wrapped in an envelope.
    ///
    /// # Errors
    ///
    /// Returns the classified `ApiError` if the backend cannot be reached or
    /// answers with a non-2xx status.
    pub async fn health(&self) -> ApiResult<HealthStatus> {
        self.request(HttpMethod::Get, "health", &[], None).await
    }

    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        params: &[(&str, Option<String>)],
        body: Option<serde_json::Value>,
        on_unauthorized: UnauthorizedPolicy,
    ) -> ApiResult<T> {
        let url = self.endpoint(path, params)?;
        let mut retries = 0;

        loop {
            let request = self.build_request(method, url.clone(), body.clone());
            let authenticated = request.header("authorization").is_some();
            debug!(%method, %url, attempt = retries + 1, authenticated, "sending request");
            self.emit(ClientEvent::RequestStarted {
                method,
                url: url.to_string(),
                attempt: retries + 1,
                authenticated,
            });

            let response = match self.transport.send(&request).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(%method, %url, error = %e, "request failed without a response");
                    self.emit(ClientEvent::NetworkFailed {
                        url: url.to_string(),
                        error: e.to_string(),
                    });
                    return Err(ApiError::Network(e));
                }
            };

            debug!(%method, %url, status = response.status, "response received");
            self.emit(ClientEvent::ResponseReceived {
                method,
                url: url.to_string(),
                status: response.status,
            });

            if response.status == 429 {
                if self.retry.should_retry(retries) {
                    let delay = self.retry.delay_for_attempt(retries);
                    retries += 1;
                    warn!(%url, retry = retries, delay_ms = delay.as_millis(), "rate limited, backing off");
                    self.emit(ClientEvent::RetryScheduled {
                        url: url.to_string(),
                        retry: retries,
                        delay,
                    });
                    self.clock.sleep(delay).await;
                    continue;
                }
                return Err(ApiError::RateLimited {
                    attempts: retries + 1,
                    message: backend_message(&response),
                });
            }

            return self.classify(response, on_unauthorized);
        }
    }

    fn classify<T: DeserializeOwned>(
        &self,
        response: RawResponse,
        on_unauthorized: UnauthorizedPolicy,
    ) -> ApiResult<T> {
        if response.is_success() {
            return decode(&response.body);
        }

        let message = backend_message(&response);
        if response.status == 401 && on_unauthorized == UnauthorizedPolicy::ExpireSession {
            self.expire_session();
        }
        Err(ApiError::from_status(response.status, message))
    }

    fn expire_session(&self) {
        warn!("session rejected by server, clearing stored token");
        if let Err(e) = self.storage.clear() {
            warn!(error = %e, "failed to clear stored session");
        }
        self.emit(ClientEvent::SessionExpired);
        if self.navigator.redirect_to_login() {
            debug!("redirected to login");
        }
    }

    fn build_request(
        &self,
        method: HttpMethod,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> OutboundRequest {
        let mut headers = vec![("Accept".to_string(), "application/json".to_string())];
        if let Some(token) = self.storage.token() {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }
        OutboundRequest {
            method,
            url,
            headers,
            body,
            timeout: self.timeout,
        }
    }

    fn endpoint(&self, path: &str, params: &[(&str, Option<String>)]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| ApiError::InvalidRequest(format!("invalid base URL: {}", self.base_url)))?;
            segments.pop_if_empty();
            segments.extend(path.split('/').filter(|s| !s.is_empty()));
        }

        let mut kept = params
            .iter()
            .filter_map(|(key, value)| {
                value
                    .as_deref()
                    .filter(|v| !v.is_empty())
                    .map(|v| (*key, v))
            })
            .peekable();
        if kept.peek().is_some() {
            url.query_pairs_mut().extend_pairs(kept);
        }
        Ok(url)
    }

    fn emit(&self, event: ClientEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    let body = if body.is_empty() { b"null".as_slice() } else { body };
    serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Extracts `message` (or `error`) from a JSON error body.
fn backend_message(response: &RawResponse) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(&response.body).ok()?;
    value
        .get("message")
        .or_else(|| value.get("error"))
        .and_then(serde_json::Value::as_str)
        .filter(|m| !m.trim().is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::testing::{MemoryStorage, RecordingClock, RecordingNavigator, ScriptedTransport};
    use crate::ports::TransportError;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct Harness {
        transport: Arc<ScriptedTransport>,
        storage: Arc<MemoryStorage>,
        navigator: Arc<RecordingNavigator>,
        clock: Arc<RecordingClock>,
        client: ApiClient,
    }

    fn harness(responses: Vec<Result<RawResponse, TransportError>>) -> Harness {
        let transport = Arc::new(ScriptedTransport::new(responses));
        let storage = Arc::new(MemoryStorage::with_token("T"));
        let navigator = Arc::new(RecordingNavigator::at("/books"));
        let clock = Arc::new(RecordingClock::default());
        let client = ApiClient::new(
            Url::parse("http://localhost:5001/api").unwrap(),
            transport.clone(),
            storage.clone(),
            navigator.clone(),
            clock.clone(),
        )
        .unwrap();
        Harness {
            transport,
            storage,
            navigator,
            clock,
            client,
        }
    }

    fn ok_body() -> RawResponse {
        RawResponse::json(200, &json!({"success": true, "data": []}))
    }

    #[tokio::test]
    async fn test_strips_empty_params_and_keeps_api_prefix() {
        let h = harness(vec![Ok(ok_body())]);
        let params = [
            ("page", Some("2".to_string())),
            ("search", Some(String::new())),
            ("available", None),
            ("sortBy", Some("title".to_string())),
        ];

        let _: serde_json::Value = h
            .client
            .request(HttpMethod::Get, "/books", &params, None)
            .await
            .unwrap();

        let sent = h.transport.requests();
        assert_eq!(
            sent[0].url.as_str(),
            "http://localhost:5001/api/books?page=2&sortBy=title"
        );
    }

    #[tokio::test]
    async fn test_no_params_means_no_query_string() {
        let h = harness(vec![Ok(ok_body())]);
        let _: serde_json::Value = h
            .client
            .request(HttpMethod::Get, "books/abc123", &[], None)
            .await
            .unwrap();
        assert_eq!(
            h.transport.requests()[0].url.as_str(),
            "http://localhost:5001/api/books/abc123"
        );
    }

    #[tokio::test]
    async fn test_bearer_token_read_at_send_time() {
        let h = harness(vec![Ok(ok_body()), Ok(ok_body())]);

        let _: serde_json::Value = h.client.request(HttpMethod::Get, "books", &[], None).await.unwrap();
        h.storage.clear().unwrap();
        let _: serde_json::Value = h.client.request(HttpMethod::Get, "books", &[], None).await.unwrap();

        let sent = h.transport.requests();
        assert_eq!(sent[0].header("Authorization"), Some("Bearer T"));
        assert_eq!(sent[1].header("Authorization"), None);
    }

    #[tokio::test]
    async fn test_rate_limit_retries_three_times_then_surfaces() {
        let limited = || Ok(RawResponse::json(429, &json!({"message": "Slow down"})));
        let h = harness(vec![limited(), limited(), limited(), limited(), limited()]);

        let result: ApiResult<serde_json::Value> =
            h.client.request(HttpMethod::Get, "books", &[], None).await;

        assert_eq!(
            result.unwrap_err(),
            ApiError::RateLimited {
                attempts: 4,
                message: Some("Slow down".to_string())
            }
        );
        assert_eq!(h.transport.requests().len(), 4);
        assert_eq!(
            h.clock.sleeps(),
            vec![
                Duration::from_millis(1000),
                Duration::from_millis(2000),
                Duration::from_millis(4000)
            ]
        );
    }

    #[tokio::test]
    async fn test_rate_limit_recovers() {
        let h = harness(vec![
            Ok(RawResponse::json(429, &json!({}))),
            Ok(ok_body()),
        ]);
        let mut events = h.client.subscribe();

        let value: serde_json::Value = h.client.request(HttpMethod::Get, "books", &[], None).await.unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(h.clock.sleeps(), vec![Duration::from_millis(1000)]);

        let mut saw_retry = false;
        while let Ok(event) = events.try_recv() {
            if let ClientEvent::RetryScheduled { retry, delay, .. } = event {
                assert_eq!((retry, delay), (1, Duration::from_millis(1000)));
                saw_retry = true;
            }
        }
        assert!(saw_retry);
    }

    #[tokio::test]
    async fn test_delays_respect_cap() {
        let limited = || Ok(RawResponse::json(429, &json!({})));
        let h = harness((0..7).map(|_| limited()).collect());
        let client = h.client.with_retry_policy(RetryPolicy::builder().max_retries(6).build());

        let result: ApiResult<serde_json::Value> = client.request(HttpMethod::Get, "books", &[], None).await;
        assert!(matches!(result, Err(ApiError::RateLimited { attempts: 7, .. })));
        let sleeps = h.clock.sleeps();
        assert_eq!(sleeps.len(), 6);
        assert!(sleeps.iter().all(|d| *d <= Duration::from_millis(10_000)));
        assert_eq!(sleeps[5], Duration::from_millis(10_000));
    }

    #[tokio::test]
    async fn test_unauthorized_clears_token_and_redirects() {
        let h = harness(vec![Ok(RawResponse::json(401, &json!({"message": "Token expired"})))]);
        let mut events = h.client.subscribe();

        let result: ApiResult<serde_json::Value> =
            h.client.request(HttpMethod::Get, "books", &[], None).await;

        assert_eq!(
            result.unwrap_err(),
            ApiError::Unauthorized {
                message: Some("Token expired".to_string())
            }
        );
        assert_eq!(h.storage.token(), None);
        assert_eq!(h.navigator.visited(), vec!["/login".to_string()]);
        assert!(h.clock.sleeps().is_empty(), "401 is never retried");

        let mut expired = false;
        while let Ok(event) = events.try_recv() {
            expired |= event == ClientEvent::SessionExpired;
        }
        assert!(expired);
    }

    #[tokio::test]
    async fn test_unauthorized_on_login_view_does_not_navigate() {
        let h = harness(vec![Ok(RawResponse::json(401, &json!({})))]);
        h.navigator.navigate("/login");

        let _: ApiResult<serde_json::Value> = h.client.request(HttpMethod::Get, "auth/profile", &[], None).await;
        assert_eq!(h.navigator.visited(), vec!["/login".to_string()]);
    }

    #[tokio::test]
    async fn test_credential_exchange_keeps_session_on_401() {
        let h = harness(vec![Ok(RawResponse::json(401, &json!({"message": "Invalid credentials"})))]);

        let result: ApiResult<serde_json::Value> = h
            .client
            .execute(HttpMethod::Post, "auth/login", &[], None, UnauthorizedPolicy::Report)
            .await;

        assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
        assert_eq!(h.storage.token().as_deref(), Some("T"));
        assert!(h.navigator.visited().is_empty());
    }

    #[tokio::test]
    async fn test_network_failure_is_not_retried() {
        let h = harness(vec![
            Err(TransportError::ConnectionFailed("refused".to_string())),
            Ok(ok_body()),
        ]);

        let result: ApiResult<serde_json::Value> =
            h.client.request(HttpMethod::Get, "books", &[], None).await;

        let err = result.unwrap_err();
        assert_eq!(err.kind(), folio_domain::ApiErrorKind::Network);
        assert_eq!(h.transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_timeout_is_network_error() {
        let h = harness(vec![Err(TransportError::Timeout { timeout_ms: 15_000 })]);
        let result: ApiResult<serde_json::Value> =
            h.client.request(HttpMethod::Get, "books", &[], None).await;
        assert!(matches!(result, Err(ApiError::Network(TransportError::Timeout { .. }))));
        assert_eq!(h.transport.requests()[0].timeout, Duration::from_secs(15));
    }

    #[tokio::test]
    async fn test_error_statuses_are_classified() {
        let h = harness(vec![
            Ok(RawResponse::json(404, &json!({"success": false, "message": "Book not found"}))),
            Ok(RawResponse::json(500, &json!({"error": "Route exploded"}))),
            Ok(RawResponse {
                status: 502,
                body: b"<html>bad gateway</html>".to_vec(),
            }),
        ]);

        let not_found: ApiResult<serde_json::Value> =
            h.client.request(HttpMethod::Get, "books/x", &[], None).await;
        assert_eq!(
            not_found.unwrap_err(),
            ApiError::NotFound {
                message: Some("Book not found".to_string())
            }
        );

        let server: ApiResult<serde_json::Value> =
            h.client.request(HttpMethod::Get, "books", &[], None).await;
        assert_eq!(server.unwrap_err().user_message("x"), "Route exploded");

        let gateway: ApiResult<serde_json::Value> =
            h.client.request(HttpMethod::Get, "books", &[], None).await;
        assert_eq!(
            gateway.unwrap_err(),
            ApiError::Server {
                status: 502,
                message: None
            }
        );
    }

    #[tokio::test]
    async fn test_undecodable_success_body() {
        let h = harness(vec![Ok(RawResponse {
            status: 200,
            body: b"not json".to_vec(),
        })]);
        let result: ApiResult<serde_json::Value> =
            h.client.request(HttpMethod::Get, "books", &[], None).await;
        assert!(matches!(result, Err(ApiError::Decode(_))));
    }

    #[tokio::test]
    async fn test_health_is_unwrapped() {
        let h = harness(vec![Ok(RawResponse::json(
            200,
            &json!({"status": "OK", "database": "connected"}),
        ))]);
        let health = h.client.health().await.unwrap();
        assert!(health.is_healthy());
        assert_eq!(h.transport.requests()[0].url.path(), "/api/health");
    }

    #[test]
    fn test_rejects_non_hierarchical_base() {
        let transport = Arc::new(ScriptedTransport::new(vec![]));
        let result = ApiClient::new(
            Url::parse("mailto:books@example.com").unwrap(),
            transport,
            Arc::new(MemoryStorage::default()),
            Arc::new(RecordingNavigator::at("/")),
            Arc::new(RecordingClock::default()),
        );
        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
    }
}
