//! Bounded fixed-interval retry for outbound E-utilities requests.

use std::future::Future;
use std::time::Duration;

use tokio_retry::strategy::FixedInterval;
use tokio_retry::RetryIf;
use tracing::warn;

use crate::error::{PubMedError, Result};

/// Retry budget applied to every outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total number of attempts, first try included
    pub max_attempts: u32,
    /// Fixed pause between attempts
    pub delay: Duration,
}

impl Default for RetryConfig {
    /// Three attempts with a one-second pause between them.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

/// Which failures a retried operation is allowed to swallow.
///
/// Search retries transport failures only; fetch retries any failure.
/// The asymmetry is inherited protocol behavior, kept explicit here so
/// each call site states which scope it runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RetryPolicy {
    /// Retry HTTP-layer failures; propagate everything else immediately.
    Transport,
    /// Retry every failure.
    AnyFailure,
}

impl RetryPolicy {
    fn should_retry(self, err: &PubMedError) -> bool {
        match self {
            RetryPolicy::Transport => err.is_transport(),
            RetryPolicy::AnyFailure => true,
        }
    }
}

/// Run `operation` under `config`, retrying failures admitted by `policy`.
///
/// The first attempt happens immediately; each retry waits the fixed
/// configured delay. Once the attempt budget is exhausted (or a failure
/// outside the policy occurs) the error propagates unmodified.
pub(crate) async fn with_retry<T, F, Fut>(
    config: &RetryConfig,
    policy: RetryPolicy,
    label: &'static str,
    operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let retries = config.max_attempts.saturating_sub(1) as usize;
    let strategy = FixedInterval::new(config.delay).take(retries);

    RetryIf::spawn(strategy, operation, |err: &PubMedError| {
        let retry = policy.should_retry(err);
        if retry {
            warn!(operation = label, error = %err, "request failed, retrying");
        }
        retry
    })
    .await
}
