//! Capped-exponential-backoff retry policy shared by the Blob Adapter (C5)
//! and Model Adapter (C6).
//!
//! Both adapters need the same shape of retry: an initial delay, a
//! doubling factor, a cap, and a maximum try count, plus jitter so that
//! concurrently retrying tasks don't thunder against the same upstream at
//! once (spec.md §7: "Backoff is exponential with jitter"). This lives in
//! `subgen-models` rather than being duplicated per-adapter.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::debug;

/// `{initial_delay, factor, max_delay, max_retries}` (spec.md §4.4/§4.5).
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub initial_delay: Duration,
    pub factor: f64,
    pub max_delay: Duration,
    pub max_retries: u32,
}

impl RetryPolicy {
    pub fn new(initial_delay: Duration, factor: f64, max_delay: Duration, max_retries: u32) -> Self {
        Self { initial_delay, factor, max_delay, max_retries }
    }

    /// Delay before retry attempt `attempt` (1-based), with up to ±25% full
    /// jitter applied on top of the capped exponential base.
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base_ms = self.initial_delay.as_millis() as f64 * self.factor.powi(attempt as i32 - 1);
        let capped_ms = base_ms.min(self.max_delay.as_millis() as f64);
        let jitter = rand::thread_rng().gen_range(0.75..=1.25);
        Duration::from_millis((capped_ms * jitter).max(0.0) as u64)
    }
}

/// Outcome of a retried operation: either the attempt number that
/// succeeded, or that every attempt was exhausted.
#[derive(Debug)]
pub enum Outcome<T, E> {
    Success(T),
    Exhausted { error: E, attempts: u32 },
}

impl<T, E> Outcome<T, E> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

/// Run `operation` up to `policy.max_retries + 1` times, sleeping between
/// attempts per [`RetryPolicy::delay_for_attempt`]. `should_retry` lets the
/// caller stop early on a fault kind that is fatal rather than transient
/// (e.g. an `AuthFault` should never be retried even if attempts remain).
pub async fn retry_with_backoff<F, Fut, T, E>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
    should_retry: impl Fn(&E) -> bool,
) -> Outcome<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Outcome::Success(value),
            Err(e) => {
                if attempt >= policy.max_retries || !should_retry(&e) {
                    return Outcome::Exhausted { error: e, attempts: attempt + 1 };
                }
                attempt += 1;
                let delay = policy.delay_for_attempt(attempt);
                debug!(operation_name, attempt, ?delay, error = %e, "retrying after transient failure");
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy() -> RetryPolicy {
        RetryPolicy::new(Duration::from_millis(1), 2.0, Duration::from_millis(30), 5)
    }

    #[test]
    fn delay_grows_and_caps() {
        let p = policy();
        assert!(p.delay_for_attempt(1) <= Duration::from_millis(2));
        assert!(p.delay_for_attempt(10) <= Duration::from_millis(38)); // capped + jitter
    }

    #[tokio::test]
    async fn succeeds_immediately_without_retry() {
        let calls = AtomicU32::new(0);
        let outcome = retry_with_backoff(
            &policy(),
            "test",
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, String>(7) }
            },
            |_| true,
        )
        .await;
        assert!(outcome.is_success());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_until_success_within_budget() {
        let calls = AtomicU32::new(0);
        let outcome = retry_with_backoff(
            &policy(),
            "test",
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move { if n < 2 { Err("flaky") } else { Ok(42) } }
            },
            |_| true,
        )
        .await;
        assert!(outcome.is_success());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausts_after_max_retries() {
        let outcome = retry_with_backoff(
            &policy(),
            "test",
            || async { Err::<i32, _>("always fails") },
            |_| true,
        )
        .await;
        match outcome {
            Outcome::Exhausted { attempts, .. } => assert_eq!(attempts, 6), // 1 + max_retries
            Outcome::Success(_) => panic!("expected exhaustion"),
        }
    }

    #[tokio::test]
    async fn stops_early_when_should_retry_returns_false() {
        let calls = AtomicU32::new(0);
        let outcome = retry_with_backoff(
            &policy(),
            "test",
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<i32, _>("fatal") }
            },
            |_| false,
        )
        .await;
        assert!(!outcome.is_success());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
