//! System clock adapter

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use folio_application::ports::Clock;

/// Wall-clock time and tokio timers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Creates a new system clock.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock() {
        let clock = SystemClock::new();
        assert!(clock.now().timestamp() > 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_uses_tokio_time() {
        let start = tokio::time::Instant::now();
        SystemClock::new().sleep(Duration::from_secs(4)).await;
        assert_eq!(start.elapsed(), Duration::from_secs(4));
    }
}
