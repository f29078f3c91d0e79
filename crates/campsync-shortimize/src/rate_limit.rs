//! Retry with exponential backoff and jitter for Shortimize requests.
//!
//! Transient failures (429, 5xx, network errors) are retried. A 429 waits at
//! least as long as the provider's `Retry-After`. Everything else is returned
//! on the first failure.

use std::future::Future;
use std::time::Duration;

use crate::error::ShortimizeError;

const MAX_DELAY_MS: u64 = 60_000;

/// Returns `true` if `err` is worth retrying after a delay.
fn is_retriable(err: &ShortimizeError) -> bool {
    match err {
        ShortimizeError::RateLimited { .. } | ShortimizeError::ServerError { .. } => true,
        ShortimizeError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
        ShortimizeError::Deserialize { .. }
        | ShortimizeError::UnexpectedStatus { .. }
        | ShortimizeError::InvalidBaseUrl { .. } => false,
    }
}

/// Delay before retry number `attempt` (1-based).
///
/// `backoff_base_ms * 2^(attempt-1)` with ±25 % jitter, capped at 60 s, and
/// never shorter than a 429's `Retry-After`.
fn backoff_delay_ms(attempt: u32, backoff_base_ms: u64, err: &ShortimizeError) -> u64 {
    let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
    let capped = computed.min(MAX_DELAY_MS);
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let jittered = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;

    match err {
        ShortimizeError::RateLimited { retry_after_secs } => {
            jittered.max(retry_after_secs.saturating_mul(1_000).min(MAX_DELAY_MS))
        }
        _ => jittered,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on
/// transient errors. The last error is returned once retries run out.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ShortimizeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ShortimizeError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let delay_ms = backoff_delay_ms(attempt, backoff_base_ms, &err);
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient Shortimize error, retrying after backoff"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn server_error() -> ShortimizeError {
        ShortimizeError::ServerError {
            status: 503,
            url: "https://api.shortimize.com/videos".to_owned(),
        }
    }

    #[tokio::test]
    async fn retries_on_server_error_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                if cc.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(server_error())
                } else {
                    Ok::<u32, ShortimizeError>(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&calls);
        let result = retry_with_backoff(2, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err::<u32, ShortimizeError>(server_error())
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(result, Err(ShortimizeError::ServerError { .. })));
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err::<u32, ShortimizeError>(ShortimizeError::UnexpectedStatus {
                    status: 401,
                    url: "https://api.shortimize.com/videos".to_owned(),
                })
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(
            result,
            Err(ShortimizeError::UnexpectedStatus { status: 401, .. })
        ));
    }

    #[test]
    fn rate_limit_delay_respects_retry_after() {
        let err = ShortimizeError::RateLimited {
            retry_after_secs: 3,
        };
        assert!(backoff_delay_ms(1, 10, &err) >= 3_000);
    }

    #[test]
    fn delay_is_capped() {
        let delay = backoff_delay_ms(10, 30_000, &server_error());
        assert!(delay <= MAX_DELAY_MS + MAX_DELAY_MS / 4);
    }
}
