//! Fixed inter-request pacing for NCBI E-utilities compliance.
//!
//! NCBI allows 3 requests/second without an API key and 10/second with
//! one. Violations can result in IP blocking, so every outbound request
//! acquires the limiter first.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::debug;

/// Enforces a minimum interval between consecutive outbound requests.
///
/// The limiter remembers when the last request was released and sleeps
/// out the remainder of the interval before releasing the next one. It
/// is `Clone` and shares its state across clones, so one client's
/// requests are paced no matter which task issues them.
#[derive(Clone)]
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl RateLimiter {
    /// Create a limiter allowing `rate` requests per second.
    ///
    /// # Example
    ///
    /// ```
    /// use pubmed_search::rate_limit::RateLimiter;
    ///
    /// // NCBI rate limit without an API key
    /// let limiter = RateLimiter::new(3.0);
    /// ```
    pub fn new(rate: f64) -> Self {
        let rate = rate.max(0.001);
        Self {
            min_interval: Duration::from_secs_f64(1.0 / rate),
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// Wait until the next request may be issued.
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                debug!(wait_ms = wait.as_millis() as u64, "pacing outbound request");
                sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }
}
