use std::future::Future;
use std::time::Duration;

use searchnav_core::{NavError, NavResult};

/// Bounds a provider call. There is no retry; callers treat an elapsed
/// timeout like any other provider failure and degrade to partial results.
pub async fn with_timeout<T, F>(secs: u64, what: &str, fut: F) -> NavResult<T>
where
    F: Future<Output = NavResult<T>>,
{
    match tokio::time::timeout(Duration::from_secs(secs), fut).await {
        Ok(result) => result,
        Err(_) => Err(NavError::Provider(format!(
            "{what} timed out after {secs}s"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_timeout_elapses() {
        let err = with_timeout(0, "slow call", async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(())
        })
        .await
        .unwrap_err();
        assert!(matches!(err, NavError::Provider(_)));
        assert!(err.to_string().contains("slow call"));
    }

    #[tokio::test]
    async fn test_timeout_passes_through() {
        let value = with_timeout(5, "fast call", async { Ok(42) }).await.unwrap();
        assert_eq!(value, 42);
    }
}
