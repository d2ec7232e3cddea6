//! Retry with exponential backoff for transient transport failures.

use std::future::Future;

use anyhow::Result;
use tracing::debug;

use sui_mirror_types::RetryConfig;

/// Whether an error looks transient (rate limiting, timeouts, dropped connections).
pub fn should_retry_error(error: &anyhow::Error) -> bool {
    let s = format!("{:#}", error).to_ascii_lowercase();
    s.contains("429")
        || s.contains("too many")
        || s.contains("timed out")
        || s.contains("timeout")
        || s.contains("connection")
        || s.contains("transport")
}

/// Run `f` until it succeeds, the error is not transient, or retries run out.
pub async fn with_retries<T, F, Fut>(config: RetryConfig, mut f: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0usize;
    let mut backoff = config.initial_backoff;

    loop {
        match f().await {
            Ok(v) => return Ok(v),
            Err(e) => {
                if attempt >= config.retries || !should_retry_error(&e) {
                    return Err(e);
                }
                attempt += 1;
                debug!(attempt, ?backoff, error = %e, "retrying after transient error");
                tokio::time::sleep(backoff).await;
                backoff = std::cmp::min(backoff * 2, config.max_backoff);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_should_retry_error() {
        assert!(should_retry_error(&anyhow!("Request rejected `429`")));
        assert!(should_retry_error(&anyhow!("Connection reset by peer")));
        assert!(!should_retry_error(&anyhow!("JSON-RPC error -32602: invalid params")));
    }

    #[tokio::test]
    async fn test_retries_transient_then_succeeds() {
        let calls = AtomicUsize::new(0);
        let result = with_retries(RetryConfig::new(3, 1, 2), || async {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(anyhow!("request timed out"))
            } else {
                Ok(7)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_no_retries_gives_up_immediately() {
        let calls = AtomicUsize::new(0);
        let result: Result<()> = with_retries(RetryConfig::none(), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(anyhow!("connection refused"))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_permanent_error_not_retried() {
        let calls = AtomicUsize::new(0);
        let result: Result<()> = with_retries(RetryConfig::new(5, 1, 2), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(anyhow!("invalid params"))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
