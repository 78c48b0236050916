//! Diagnostic events emitted by the API client.

use std::time::Duration;

use crate::ports::HttpMethod;

/// Something observable happened on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// An attempt is about to be sent.
    RequestStarted {
        /// Method.
        method: HttpMethod,
        /// Absolute URL.
        url: String,
        /// 1-based attempt number.
        attempt: u32,
        /// Whether a bearer token was attached.
        authenticated: bool,
    },

    /// A response arrived.
    ResponseReceived {
        /// Method.
        method: HttpMethod,
        /// Absolute URL.
        url: String,
        /// HTTP status.
        status: u16,
    },

    /// A rate-limited attempt will be retried after `delay`.
    RetryScheduled {
        /// Absolute URL.
        url: String,
        /// 1-based number of the retry about to happen.
        retry: u32,
        /// Backoff delay.
        delay: Duration,
    },

    /// No response was received.
    NetworkFailed {
        /// Absolute URL.
        url: String,
        /// Transport error text.
        error: String,
    },

    /// The backend rejected the session; the stored token has been cleared.
    SessionExpired,
}
