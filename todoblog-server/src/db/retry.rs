//! Bounded retry with exponential backoff for connection setup

use std::future::Future;

use todoblog_core::RetryPolicy;

use super::error::{is_transient, DbError};

/// Run `op` until it succeeds, fails permanently, or the retry budget runs out.
///
/// Only transient errors (see [`is_transient`]) consume the budget; anything
/// else is returned on the first failure.
pub async fn with_retry<T, F, Fut>(
    context: &str,
    policy: &RetryPolicy,
    mut op: F,
) -> Result<T, DbError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if !is_transient(&e) => return Err(DbError::Sqlx(e)),
            Err(e) if attempt >= policy.max_retries => {
                if policy.max_retries == 0 {
                    return Err(DbError::Sqlx(e));
                }
                return Err(DbError::RetriesExhausted {
                    context: context.to_owned(),
                    attempts: attempt + 1,
                    source: e,
                });
            }
            Err(e) => {
                let delay = policy.delay_for(attempt);
                attempt += 1;
                tracing::warn!(
                    context,
                    attempt,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "transient database error, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    const POLICY: RetryPolicy = RetryPolicy {
        max_retries: 3,
        base_delay_ms: 1_000,
        max_delay_ms: 30_000,
    };

    #[tokio::test(start_paused = true)]
    async fn retries_transient_errors_with_backoff() {
        let calls = &AtomicU32::new(0);
        let start = tokio::time::Instant::now();

        let result = with_retry("todos", &POLICY, || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(sqlx::Error::PoolTimedOut)
            } else {
                Ok(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 1s + 2s of backoff
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_errors_do_not_retry() {
        let calls = &AtomicU32::new(0);

        let result: Result<(), _> = with_retry("todos", &POLICY, || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(sqlx::Error::Configuration("password authentication failed".into()))
        })
        .await;

        assert!(matches!(result, Err(DbError::Sqlx(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_budget() {
        let calls = &AtomicU32::new(0);

        let result: Result<(), _> = with_retry("blog", &POLICY, || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(sqlx::Error::PoolTimedOut)
        })
        .await;

        assert!(matches!(
            result,
            Err(DbError::RetriesExhausted { attempts: 4, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn no_retry_policy_fails_fast() {
        let result: Result<(), _> =
            with_retry("todos", &RetryPolicy::NONE, || async { Err(sqlx::Error::PoolTimedOut) })
                .await;
        assert!(matches!(result, Err(DbError::Sqlx(sqlx::Error::PoolTimedOut))));
    }
}
