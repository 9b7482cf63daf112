//! Opt-in retries for client calls
//!
//! The client never retries on its own. Wrap a call in [`with_retry`] to
//! repeat it while the failure looks transient: connection failures and
//! timeouts, 5xx answers, and 429s (which wait as long as the server asked).
//! Everything else, including every 4xx the API uses for bad input, fails on
//! the first attempt.

use crate::error::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// How often to repeat a failed call and how long to wait in between
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Extra attempts after the first one
    pub max_retries: u32,

    /// Wait before the first retry; doubles for each one after
    pub base_delay: Duration,

    /// Cap for any single wait, including a server's Retry-After
    pub max_delay: Duration,

    /// Lengthen each backoff by a random amount, up to a quarter
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Single attempt
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// How long to wait before retrying after `err` on retry number `attempt`
    /// (zero-based), or `None` if `err` will not go away by itself
    pub fn delay_for(&self, err: &Error, attempt: u32) -> Option<Duration> {
        match err {
            Error::RateLimited(secs) => Some(Duration::from_secs(*secs).min(self.max_delay)),
            Error::Transport(e) if e.is_connect() || e.is_timeout() => Some(self.backoff(attempt)),
            // 501 means the endpoint does not exist; asking again will not help
            Error::UnexpectedServer { status, .. } if (500..=599).contains(status) && *status != 501 => {
                Some(self.backoff(attempt))
            }
            _ => None,
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        let delay = self.base_delay.saturating_mul(factor).min(self.max_delay);
        if self.jitter {
            delay + delay.mul_f64(0.25 * random_unit())
        } else {
            delay
        }
    }
}

/// Uniform value in [0, 1) from std's randomly seeded hasher
fn random_unit() -> f64 {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};

    let bits = RandomState::new().build_hasher().finish();
    (bits >> 11) as f64 / (1u64 << 53) as f64
}

/// Run `call` until it succeeds, fails permanently, or runs out of retries.
///
/// The error from the last attempt is returned.
pub async fn with_retry<F, Fut, T>(config: &RetryConfig, operation: &str, mut call: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;

    loop {
        let err = match call().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        let Some(wait) = config.delay_for(&err, attempt) else {
            debug!(operation, error = %err, "Not retrying");
            return Err(err);
        };

        if attempt >= config.max_retries {
            warn!(operation, attempts = attempt + 1, error = %err, "Retries exhausted");
            return Err(err);
        }

        warn!(
            operation,
            retry = attempt + 1,
            of = config.max_retries,
            wait_ms = wait.as_millis() as u64,
            error = %err,
            "Call failed, retrying"
        );

        sleep(wait).await;
        attempt += 1;
    }
}
