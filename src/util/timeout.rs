//! Timeout and cancellation helpers.

use std::future::Future;
use std::time::Duration;

use crate::context::RunContext;
use crate::error::CadreError;

/// Wrap a future with a timeout.
pub async fn with_timeout<T>(
    duration: Duration,
    future: impl Future<Output = Result<T, CadreError>>,
) -> Result<T, CadreError> {
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(CadreError::Timeout(duration.as_millis() as u64)),
    }
}

/// Race a future against the run's cancellation token and deadline.
///
/// Cancellation wins over completion when both are ready.
pub async fn guard<T>(
    ctx: &RunContext,
    future: impl Future<Output = Result<T, CadreError>>,
) -> Result<T, CadreError> {
    let bounded = async {
        match ctx.deadline() {
            Some(deadline) => {
                let budget = deadline.saturating_duration_since(tokio::time::Instant::now());
                match tokio::time::timeout_at(deadline, future).await {
                    Ok(result) => result,
                    Err(_) => Err(CadreError::Timeout(budget.as_millis() as u64)),
                }
            }
            None => future.await,
        }
    };

    tokio::select! {
        biased;
        _ = ctx.cancellation_token().cancelled() => Err(CadreError::Cancelled),
        result = bounded => result,
    }
}
