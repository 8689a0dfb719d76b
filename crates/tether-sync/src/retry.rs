//! Bounded exponential backoff around a fallible async operation.
//!
//! The wrapper is a pure function over `(operation, policy, sleep)`: tests
//! inject a recording sleeper and assert attempt counts and backoff values
//! without waiting on real time.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Classifies an error for the retry loop.
///
/// Non-retryable errors (bad credentials, missing file) surface immediately
/// instead of burning the whole backoff budget on an unrecoverable failure.
pub trait RetryClass {
    fn is_retryable(&self) -> bool;
}

/// Retry tuning: attempt ceiling and the base of the doubling backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(3),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Backoff before the retry that follows `attempt` (1-based):
    /// base, 2*base, 4*base, ...; with the default base: 3, 6, 12, 24, 48 s.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

/// Terminal outcome of a retried operation.
#[derive(Debug, Error)]
pub enum RetryError<E>
where
    E: std::error::Error,
{
    /// Every attempt failed with a retryable error.
    #[error("Gave up after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: E,
    },

    /// A non-retryable error ended the loop early.
    #[error(transparent)]
    Fatal(E),
}

/// Run `op` until it succeeds, a non-retryable error occurs, or
/// `policy.max_attempts` is reached. Sleeps `policy.delay_for_attempt(n)`
/// between attempts using the injected `sleep`.
///
/// `op` receives the 1-based attempt number.
pub async fn retry_with_backoff<T, E, Op, Fut, Sleep, SleepFut>(
    policy: &RetryPolicy,
    mut sleep: Sleep,
    mut op: Op,
) -> Result<T, RetryError<E>>
where
    Op: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RetryClass + std::error::Error,
    Sleep: FnMut(Duration) -> SleepFut,
    SleepFut: Future<Output = ()>,
{
    let mut attempt: u32 = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_retryable() => {
                tracing::warn!(error = %err, attempt, "Attempt failed with non-retryable error");
                return Err(RetryError::Fatal(err));
            }
            Err(err) if attempt >= policy.max_attempts => {
                tracing::error!(error = %err, attempt, "Retries exhausted");
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    source: err,
                });
            }
            Err(err) => {
                let backoff = policy.delay_for_attempt(attempt);
                tracing::warn!(
                    error = %err,
                    attempt,
                    backoff_secs = backoff.as_secs(),
                    "Attempt failed, backing off before retry"
                );
                sleep(backoff).await;
                attempt += 1;
            }
        }
    }
}

/// [`retry_with_backoff`] with the real clock.
pub async fn retry<T, E, Op, Fut>(policy: &RetryPolicy, op: Op) -> Result<T, RetryError<E>>
where
    Op: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RetryClass + std::error::Error,
{
    retry_with_backoff(policy, tokio::time::sleep, op).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[derive(Debug, thiserror::Error)]
    enum TestError {
        #[error("transient failure")]
        Transient,
        #[error("permanent failure")]
        Permanent,
    }

    impl RetryClass for TestError {
        fn is_retryable(&self) -> bool {
            matches!(self, TestError::Transient)
        }
    }

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_secs(3))
    }

    #[test]
    fn test_backoff_schedule_doubles() {
        let policy = RetryPolicy::default();
        let delays: Vec<u64> = (1..=5)
            .map(|n| policy.delay_for_attempt(n).as_secs())
            .collect();
        assert_eq!(delays, vec![3, 6, 12, 24, 48]);
    }

    #[tokio::test]
    async fn test_permanent_transient_failure_exhausts_attempts() {
        let calls = Cell::new(0u32);
        let sleeps = RefCell::new(Vec::new());

        let result: Result<(), _> = retry_with_backoff(
            &policy(5),
            |d| {
                sleeps.borrow_mut().push(d);
                async {}
            },
            |_| {
                calls.set(calls.get() + 1);
                async { Err(TestError::Transient) }
            },
        )
        .await;

        assert!(matches!(
            result,
            Err(RetryError::Exhausted { attempts: 5, .. })
        ));
        assert_eq!(calls.get(), 5);
        let secs: Vec<u64> = sleeps.borrow().iter().map(Duration::as_secs).collect();
        assert_eq!(secs, vec![3, 6, 12, 24]);
    }

    #[tokio::test]
    async fn test_success_on_later_attempt_stops_retrying() {
        let calls = Cell::new(0u32);
        let sleeps = RefCell::new(Vec::new());

        let result = retry_with_backoff(
            &policy(5),
            |d| {
                sleeps.borrow_mut().push(d);
                async {}
            },
            |attempt| {
                calls.set(calls.get() + 1);
                async move {
                    if attempt < 4 {
                        Err(TestError::Transient)
                    } else {
                        Ok("done")
                    }
                }
            },
        )
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.get(), 4);
        let secs: Vec<u64> = sleeps.borrow().iter().map(Duration::as_secs).collect();
        assert_eq!(secs, vec![3, 6, 12]);
    }

    #[tokio::test]
    async fn test_immediate_success_never_sleeps() {
        let sleeps = RefCell::new(Vec::new());

        let result: Result<i32, RetryError<TestError>> = retry_with_backoff(
            &policy(5),
            |d| {
                sleeps.borrow_mut().push(d);
                async {}
            },
            |_| async { Ok(7) },
        )
        .await;

        assert_eq!(result.unwrap(), 7);
        assert!(sleeps.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_two_attempts_single_sleep() {
        let calls = Cell::new(0u32);
        let sleeps = RefCell::new(Vec::new());

        let result: Result<(), _> = retry_with_backoff(
            &policy(2),
            |d| {
                sleeps.borrow_mut().push(d);
                async {}
            },
            |_| {
                calls.set(calls.get() + 1);
                async { Err(TestError::Transient) }
            },
        )
        .await;

        assert!(matches!(
            result,
            Err(RetryError::Exhausted { attempts: 2, .. })
        ));
        assert_eq!(calls.get(), 2);
        let secs: Vec<u64> = sleeps.borrow().iter().map(Duration::as_secs).collect();
        assert_eq!(secs, vec![3]);
    }

    #[tokio::test]
    async fn test_non_retryable_fails_fast() {
        let calls = Cell::new(0u32);
        let sleeps = RefCell::new(Vec::new());

        let result: Result<(), _> = retry_with_backoff(
            &policy(5),
            |d| {
                sleeps.borrow_mut().push(d);
                async {}
            },
            |_| {
                calls.set(calls.get() + 1);
                async { Err(TestError::Permanent) }
            },
        )
        .await;

        assert!(matches!(result, Err(RetryError::Fatal(_))));
        assert_eq!(calls.get(), 1);
        assert!(sleeps.borrow().is_empty());
    }
}
