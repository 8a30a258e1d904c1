use std::fmt::Display;
use std::future::Future;

use tokio::time::Instant;

use crate::config::RetryPolicy;

/// Why a bounded call gave up.
#[derive(Debug)]
pub(crate) enum Exhausted<E> {
    /// The last attempt failed with a permanent error, or attempts ran out.
    Failed { error: E, attempts: u32 },
    /// The deadline passed during an attempt or would pass during backoff.
    Deadline { attempts: u32 },
}

/// Run one call under the deadline.
pub(crate) async fn bounded<T, Fut>(deadline: Instant, call: Fut) -> Option<T>
where
    Fut: Future<Output = T>,
{
    tokio::time::timeout_at(deadline, call).await.ok()
}

/// Run `call` until it succeeds, fails permanently, runs out of attempts,
/// or the deadline passes. No attempt and no backoff sleep extends past
/// `deadline`.
pub(crate) async fn with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    deadline: Instant,
    operation: &'static str,
    is_transient: impl Fn(&E) -> bool,
    mut call: F,
) -> Result<(T, u32), Exhausted<E>>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max = policy.attempts();
    let mut attempt = 1;
    loop {
        let Some(result) = bounded(deadline, call()).await else {
            return Err(Exhausted::Deadline { attempts: attempt });
        };
        match result {
            Ok(value) => return Ok((value, attempt)),
            Err(error) if attempt < max && is_transient(&error) => {
                let delay = policy.backoff(attempt);
                if Instant::now() + delay >= deadline {
                    tracing::warn!(operation, attempt, %error, "transient failure; deadline leaves no room to retry");
                    return Err(Exhausted::Deadline { attempts: attempt });
                }
                tracing::warn!(operation, attempt, %error, ?delay, "transient failure; retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(error) => {
                return Err(Exhausted::Failed {
                    error,
                    attempts: attempt,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn fast() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            initial_backoff_ms: 1,
            max_backoff_ms: 2,
        }
    }

    fn far() -> Instant {
        Instant::now() + Duration::from_secs(5)
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let (value, attempts) = with_retry(&fast(), far(), "test", |_: &String| true, move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err("down".to_string())
            } else {
                Ok(7)
            }
        })
        .await
        .unwrap();
        assert_eq!(value, 7);
        assert_eq!(attempts, 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let err = with_retry(&fast(), far(), "test", |_: &String| true, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>("down".to_string())
        })
        .await
        .unwrap_err();
        assert!(matches!(err, Exhausted::Failed { attempts: 3, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let err = with_retry(&fast(), far(), "test", |_: &String| false, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>("gone".to_string())
        })
        .await
        .unwrap_err();
        assert!(matches!(err, Exhausted::Failed { attempts: 1, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn backoff_never_outlives_deadline() {
        let slow = RetryPolicy {
            max_attempts: 5,
            initial_backoff_ms: 10_000,
            max_backoff_ms: 10_000,
        };
        let deadline = Instant::now() + Duration::from_millis(50);
        let started = Instant::now();
        let err = with_retry(&slow, deadline, "test", |_: &String| true, move || async move {
            Err::<(), _>("down".to_string())
        })
        .await
        .unwrap_err();
        assert!(matches!(err, Exhausted::Deadline { attempts: 1 }));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn slow_call_is_cut_at_deadline() {
        let deadline = Instant::now() + Duration::from_millis(20);
        let err = with_retry(&fast(), deadline, "test", |_: &String| true, move || async move {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<_, String>(())
        })
        .await
        .unwrap_err();
        assert!(matches!(err, Exhausted::Deadline { attempts: 1 }));
    }
}
