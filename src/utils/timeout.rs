//! Deadline helper for store calls.

use crate::error::AppError;
use serde_json::json;
use std::future::Future;
use std::time::Duration;

/// Runs `fut`, failing with [`AppError::Unavailable`] if it does not finish within `limit`.
///
/// Nothing is assumed about whether a timed-out write was committed.
pub async fn with_timeout<T, F>(limit: Duration, operation: &'static str, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(AppError::unavailable(
            "Store operation timed out",
            json!({ "operation": operation, "timeout_ms": limit.as_millis() as u64 }),
        )),
    }
}
