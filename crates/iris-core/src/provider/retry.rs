//! Retry policy for rate-limited requests.
//!
//! Each exchange is classified into an [`AttemptOutcome`]. Only
//! `RateLimited` (HTTP 429) is retried by default; every other error status is
//! terminal on the first attempt so auth and bad-request failures surface
//! immediately.

use super::adapter::RequestSpec;
use super::transport::{HttpReply, Transport};
use crate::clock::Clock;
use crate::config::{BackoffKind, RetryConfig};
use crate::error::{TaskError, TaskResult};
use std::time::Duration;

/// Result of one HTTP exchange, as seen by the retry loop.
#[derive(Debug)]
pub enum AttemptOutcome {
    /// 2xx with a JSON body
    Success(serde_json::Value),
    /// HTTP 429, with the server's `Retry-After` hint if any
    RateLimited(Option<Duration>),
    /// Anything else; `terminal` failures are never retried
    Failure { cause: TaskError, terminal: bool },
}

impl AttemptOutcome {
    /// Classify a transport result.
    ///
    /// 5xx replies are non-terminal only when `retry_server_errors` is set.
    pub fn classify(result: TaskResult<HttpReply>, retry_server_errors: bool) -> Self {
        let reply = match result {
            Ok(reply) => reply,
            Err(cause) => {
                return AttemptOutcome::Failure {
                    cause,
                    terminal: true,
                };
            }
        };

        match reply.status {
            429 => AttemptOutcome::RateLimited(reply.retry_after),
            200..=299 => match serde_json::from_str(&reply.body) {
                Ok(document) => AttemptOutcome::Success(document),
                Err(e) => AttemptOutcome::Failure {
                    cause: TaskError::Request {
                        message: format!("Response body is not valid JSON: {e}"),
                        status_code: Some(reply.status),
                    },
                    terminal: true,
                },
            },
            status => AttemptOutcome::Failure {
                cause: TaskError::Request {
                    message: format!("HTTP {status}: {}", reply.body.trim()),
                    status_code: Some(status),
                },
                terminal: !(retry_server_errors && (500..=599).contains(&status)),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Success(_))
    }
}

/// The resolved outcome of a request after retries, plus how many
/// exchanges it took.
///
/// `outcome` is always `Success` or a terminal `Failure`.
#[derive(Debug)]
pub struct FinalAttempt {
    pub outcome: AttemptOutcome,
    pub attempts: u32,
}

impl FinalAttempt {
    pub fn into_result(self) -> TaskResult<serde_json::Value> {
        match self.outcome {
            AttemptOutcome::Success(document) => Ok(document),
            AttemptOutcome::Failure { cause, .. } => Err(cause),
            AttemptOutcome::RateLimited(_) => Err(TaskError::RetryExhausted {
                attempts: self.attempts,
            }),
        }
    }
}

/// Bounded retry with fixed or exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub wait: Duration,
    pub backoff: BackoffKind,
    pub max_wait: Duration,
    pub respect_retry_after: bool,
    pub retry_server_errors: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            wait: Duration::from_millis(config.wait_ms),
            backoff: config.backoff,
            max_wait: Duration::from_millis(config.max_wait_ms),
            respect_retry_after: config.respect_retry_after,
            retry_server_errors: config.retry_server_errors,
        }
    }

    /// Wait before retry number `retry` (0-based), given the server's hint.
    ///
    /// A `Retry-After` hint can only lengthen the configured backoff, never
    /// shorten it, and is capped at `max_wait`.
    pub fn wait_for(&self, retry: u32, hint: Option<Duration>) -> Duration {
        let backoff = match self.backoff {
            BackoffKind::Fixed => self.wait,
            BackoffKind::Exponential => backoff_duration(retry, self.wait, self.max_wait),
        };
        match hint.filter(|_| self.respect_retry_after) {
            Some(hint) => hint.max(backoff).min(self.max_wait.max(backoff)),
            None => backoff,
        }
    }

    /// Send `request` until it succeeds, fails terminally, or the budget runs out.
    ///
    /// No wait follows the last allowed attempt.
    pub async fn execute(
        &self,
        request: &RequestSpec,
        transport: &dyn Transport,
        clock: &dyn Clock,
    ) -> FinalAttempt {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let outcome =
                AttemptOutcome::classify(transport.send(request).await, self.retry_server_errors);

            let wait = match outcome {
                AttemptOutcome::RateLimited(hint) if attempt < self.max_attempts => {
                    let wait = self.wait_for(attempt - 1, hint);
                    tracing::warn!(
                        "Rate limited (attempt {attempt}/{}), retrying in {wait:?}",
                        self.max_attempts
                    );
                    wait
                }
                AttemptOutcome::RateLimited(_) => {
                    return FinalAttempt {
                        outcome: AttemptOutcome::Failure {
                            cause: TaskError::RetryExhausted { attempts: attempt },
                            terminal: true,
                        },
                        attempts: attempt,
                    };
                }
                AttemptOutcome::Failure {
                    cause,
                    terminal: false,
                } if attempt < self.max_attempts => {
                    let wait = self.wait_for(attempt - 1, None);
                    tracing::warn!(
                        "{cause} (attempt {attempt}/{}), retrying in {wait:?}",
                        self.max_attempts
                    );
                    wait
                }
                AttemptOutcome::Failure { cause, .. } => {
                    return FinalAttempt {
                        outcome: AttemptOutcome::Failure {
                            cause,
                            terminal: true,
                        },
                        attempts: attempt,
                    };
                }
                success @ AttemptOutcome::Success(_) => {
                    return FinalAttempt {
                        outcome: success,
                        attempts: attempt,
                    };
                }
            };

            clock.sleep(wait).await;
        }
    }
}

/// Calculate exponential backoff duration for a given retry.
///
/// Uses `base * 2^retry` with a cap.
pub fn backoff_duration(retry: u32, base: Duration, cap: Duration) -> Duration {
    let base_ms = base.as_millis().min(u64::MAX as u128) as u64;
    let delay = base_ms.saturating_mul(2u64.saturating_pow(retry));
    Duration::from_millis(delay).min(cap)
}
