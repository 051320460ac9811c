//! Retry with exponential backoff, modelled as an explicit state machine:
//!
//! `Attempting(n)` → `Succeeded(value)` | `Retrying { next: n + 1, delay }` | `Failed(error)`
//!
//! Attempts are counted from 1. After a failed attempt `n` the wait is
//! `base_delay * 2^(n - 1)`, so the default policy sleeps 1s, 2s, 4s.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::llm_client::LlmError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts allowed after the first one.
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

/// Driver state. Terminal states carry the outcome of the last attempt.
#[derive(Debug)]
pub enum RetryState<T> {
    Attempting(u32),
    Retrying { next: u32, delay: Duration },
    Succeeded(T),
    Failed(LlmError),
}

impl RetryPolicy {
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Backoff after failed attempt `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay.saturating_mul(1u32 << exponent)
    }

    /// Next state after attempt `attempt` finished with `outcome`.
    pub fn transition<T>(&self, attempt: u32, outcome: Result<T, LlmError>) -> RetryState<T> {
        match outcome {
            Ok(value) => RetryState::Succeeded(value),
            Err(e) => {
                warn!("LLM call attempt {attempt} failed: {e}");
                if attempt >= self.max_attempts() {
                    RetryState::Failed(e)
                } else {
                    RetryState::Retrying {
                        next: attempt + 1,
                        delay: self.delay_after(attempt),
                    }
                }
            }
        }
    }

    /// Every wait the policy would perform if all attempts failed.
    pub fn schedule(&self) -> Vec<Duration> {
        (1..self.max_attempts()).map(|a| self.delay_after(a)).collect()
    }

    /// Drives `operation` through the state machine. The closure receives the
    /// 1-based attempt number. On exhaustion the last error is wrapped in
    /// `LlmError::Exhausted`.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, LlmError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, LlmError>>,
    {
        let mut state = RetryState::Attempting(1);
        loop {
            state = match state {
                RetryState::Attempting(attempt) => {
                    let outcome = operation(attempt).await;
                    self.transition(attempt, outcome)
                }
                RetryState::Retrying { next, delay } => {
                    warn!("Retrying after {}ms (attempt {next})", delay.as_millis());
                    tokio::time::sleep(delay).await;
                    RetryState::Attempting(next)
                }
                RetryState::Succeeded(value) => return Ok(value),
                RetryState::Failed(last) => {
                    return Err(LlmError::exhausted(self.max_attempts(), last));
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_default_schedule_is_1_2_4_seconds() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 4);
        assert_eq!(
            policy.schedule(),
            vec![
                Duration::from_millis(1000),
                Duration::from_millis(2000),
                Duration::from_millis(4000)
            ]
        );
    }

    fn unavailable() -> LlmError {
        LlmError::Api {
            status: 503,
            message: "unavailable".to_string(),
        }
    }

    #[test]
    fn test_transitions() {
        let policy = RetryPolicy::default();
        assert!(matches!(
            policy.transition(1, Ok::<_, LlmError>("done")),
            RetryState::Succeeded("done")
        ));
        assert!(matches!(
            policy.transition::<()>(1, Err(unavailable())),
            RetryState::Retrying { next: 2, delay } if delay == Duration::from_millis(1000)
        ));
        assert!(matches!(
            policy.transition::<()>(3, Err(unavailable())),
            RetryState::Retrying { next: 4, delay } if delay == Duration::from_millis(4000)
        ));
        assert!(matches!(
            policy.transition::<()>(4, Err(unavailable())),
            RetryState::Failed(LlmError::Api { status: 503, .. })
        ));
    }

    #[test]
    fn test_zero_retries_fails_after_first_attempt() {
        let policy = RetryPolicy {
            max_retries: 0,
            base_delay: Duration::from_millis(10),
        };
        assert!(matches!(
            policy.transition::<()>(1, Err(unavailable())),
            RetryState::Failed(_)
        ));
        assert!(policy.schedule().is_empty());
    }

    #[test]
    fn test_delay_does_not_overflow() {
        let policy = RetryPolicy::default();
        assert!(policy.delay_after(200) >= policy.delay_after(31));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_succeeds_on_third_attempt() {
        let calls = AtomicU32::new(0);
        let result = RetryPolicy::default()
            .run(|attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 3 {
                        Err(unavailable())
                    } else {
                        Ok(attempt)
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_exhaustion_wraps_last_error() {
        let err = RetryPolicy::default()
            .run(|attempt| async move {
                Err::<(), _>(LlmError::Api {
                    status: 429,
                    message: format!("slow down #{attempt}"),
                })
            })
            .await
            .unwrap_err();
        match err {
            LlmError::Exhausted { attempts, last, .. } => {
                assert_eq!(attempts, 4);
                assert!(last.to_string().contains("slow down #4"));
            }
            other => panic!("expected Exhausted, got {other}"),
        }
    }
}
