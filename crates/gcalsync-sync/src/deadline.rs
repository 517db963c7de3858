//! Bounded remote calls.

use std::future::Future;
use std::time::Duration;

use gcalsync_providers::{ProviderError, ProviderResult};

/// Runs `call`, failing with a network error if it does not finish within
/// `timeout`.
pub(crate) async fn with_timeout<T>(
    timeout: Duration,
    call: impl Future<Output = ProviderResult<T>>,
) -> ProviderResult<T> {
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::network(format!(
            "request timed out after {}s",
            timeout.as_secs_f64()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcalsync_providers::ProviderErrorCode;

    #[tokio::test(start_paused = true)]
    async fn slow_calls_become_network_errors() {
        let err = with_timeout(Duration::from_secs(5), async {
            std::future::pending::<ProviderResult<()>>().await
        })
        .await
        .unwrap_err();

        assert_eq!(err.code(), ProviderErrorCode::NetworkError);
        assert!(err.message().contains("timed out after 5s"));
    }

    #[tokio::test]
    async fn fast_calls_pass_through() {
        let value = with_timeout(Duration::from_secs(5), async { Ok(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }
}
