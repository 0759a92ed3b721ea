use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// How a failed attempt should be followed up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// The remote signalled "too many requests"; wait longer, growing per attempt
    RateLimited,
    /// Network or API hiccup; wait a short fixed delay
    Transient,
    /// Retrying cannot help (e.g. missing credential)
    Abort,
}

/// Retry behaviour for a single queued translation
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first one)
    pub max_attempts: u32,
    /// Rate-limit wait unit; after attempt `n` fails the wait is `step * (n + 1)`
    pub rate_limit_step: Duration,
    /// Fixed wait after any other retryable failure
    pub transient_delay: Duration,
    /// Upper bound for one remote call
    pub attempt_timeout: Duration,
}

impl RetryPolicy {
    /// Preset: 3 attempts, 2s/3s rate-limit waits, 500ms transient waits
    pub fn standard() -> Self {
        Self {
            max_attempts: 3,
            rate_limit_step: Duration::from_secs(1),
            transient_delay: Duration::from_millis(500),
            attempt_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_rate_limit_step(mut self, step: Duration) -> Self {
        self.rate_limit_step = step;
        self
    }

    pub fn with_transient_delay(mut self, delay: Duration) -> Self {
        self.transient_delay = delay;
        self
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Wait before the next attempt after `attempt` (1-based) failed
    pub fn delay_after(&self, attempt: u32, backoff: Backoff) -> Duration {
        match backoff {
            Backoff::RateLimited => self.rate_limit_step * (attempt + 1),
            Backoff::Transient => self.transient_delay,
            Backoff::Abort => Duration::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

/// Execute an async operation with classified retries
///
/// `classify` decides for each error whether to back off as a rate limit,
/// as a transient failure, or to give up immediately. No wait is spent after
/// the final attempt.
///
/// # Returns
/// The result of the operation, or the last error if all attempts failed
///
/// # Panics
/// Panics if `policy.max_attempts` is 0
pub async fn with_backoff<T, E, F, Fut, C>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
    classify: C,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    C: Fn(&E) -> Backoff,
{
    assert!(
        policy.max_attempts >= 1,
        "RetryPolicy.max_attempts must be >= 1, got {}",
        policy.max_attempts
    );

    let mut attempt = 1;
    loop {
        let error = match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!(
                        "{}: Succeeded on attempt {}/{}",
                        operation_name, attempt, policy.max_attempts
                    );
                }
                return Ok(result);
            }
            Err(e) => e,
        };

        let backoff = classify(&error);
        if backoff == Backoff::Abort {
            debug!(
                "{}: Error is not retryable, failing immediately: {}",
                operation_name, error
            );
            return Err(error);
        }

        if attempt >= policy.max_attempts {
            warn!(
                "{}: All {} attempts failed. Last error: {}",
                operation_name, policy.max_attempts, error
            );
            return Err(error);
        }

        let delay = policy.delay_after(attempt, backoff);
        if backoff == Backoff::RateLimited {
            warn!(
                "{}: Rate limited on attempt {}/{}, waiting {:?}",
                operation_name, attempt, policy.max_attempts, delay
            );
        } else {
            warn!(
                "{}: Attempt {}/{} failed ({}), retrying in {:?}",
                operation_name, attempt, policy.max_attempts, error, delay
            );
        }
        sleep(delay).await;
        attempt += 1;
    }
}
