use std::future::Future;

use locator_core::{ConfigError, FetchError, FetchOutcome, RetryPolicy};
use locator_logging::{locator_debug, locator_warn};

/// Runs fallible calls under a validated [`RetryPolicy`].
///
/// Transient failures are retried after `policy.backoff` until
/// `policy.max_attempts` calls have been made; anything else fails at once.
/// The pause is a `tokio` sleep, so only the calling task waits.
#[derive(Debug, Clone, Copy)]
pub struct Retrier {
    policy: RetryPolicy,
}

impl Retrier {
    pub fn new(policy: RetryPolicy) -> Result<Self, ConfigError> {
        policy.validate()?;
        Ok(Self { policy })
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> FetchOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let max_attempts = self.policy.max_attempts;
        let mut attempts = 0;
        loop {
            attempts += 1;
            let err = match operation().await {
                Ok(value) => {
                    if attempts > 1 {
                        locator_debug!("{label}: succeeded on attempt {attempts}/{max_attempts}");
                    }
                    return FetchOutcome::Success(value);
                }
                Err(err) => err,
            };

            if !err.is_transient() {
                locator_debug!("{label}: giving up after non-transient failure: {err}");
                return FetchOutcome::Failure {
                    reason: err,
                    attempts,
                };
            }
            if attempts >= max_attempts {
                locator_warn!("{label}: {attempts} attempt(s) exhausted, last error: {err}");
                return FetchOutcome::Failure {
                    reason: err,
                    attempts,
                };
            }

            locator_warn!(
                "{label}: attempt {attempts}/{max_attempts} failed ({err}); retrying in {:?}",
                self.policy.backoff
            );
            tokio::time::sleep(self.policy.backoff).await;
        }
    }
}

/// One-shot form of [`Retrier::run`]. An invalid policy is reported before
/// `operation` is ever called.
pub async fn fetch_with_retry<T, F, Fut>(
    policy: RetryPolicy,
    label: &str,
    operation: F,
) -> Result<FetchOutcome<T>, ConfigError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let retrier = Retrier::new(policy)?;
    Ok(retrier.run(label, operation).await)
}
