use super::models::ComponentStatus;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

/// Runs a component probe, turning errors and timeouts into an error status
pub async fn run_health_check<F>(
    checker_name: &'static str,
    check: F,
    timeout_secs: f64,
) -> ComponentStatus
where
    F: Future<Output = Result<(), String>>,
{
    let timeout_duration =
        Duration::try_from_secs_f64(timeout_secs).unwrap_or_else(|_| Duration::from_secs(2));
    match timeout(timeout_duration, check).await {
        Ok(Ok(())) => ComponentStatus::ok(),
        Ok(Err(err)) => ComponentStatus::error(format!(
            "{} health check failed: {}",
            checker_name, err
        )),
        Err(_) => ComponentStatus::error(format!(
            "{} health check timed out after {} seconds",
            checker_name, timeout_secs
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::health::models::HealthStatusType;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_run_health_check_successful_within_timeout() {
        let result = run_health_check(
            "FastSuccess",
            async {
                sleep(Duration::from_millis(50)).await;
                Ok(())
            },
            0.1,
        )
        .await;
        assert_eq!(result.status, HealthStatusType::Ok);
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_run_health_check_times_out() {
        let result = run_health_check(
            "SlowChecker",
            async {
                sleep(Duration::from_millis(200)).await;
                Ok(())
            },
            0.1,
        )
        .await;
        assert_eq!(result.status, HealthStatusType::Error);
        assert_eq!(
            result.error,
            Some("SlowChecker health check timed out after 0.1 seconds".to_string())
        );
    }

    #[tokio::test]
    async fn test_run_health_check_fails_within_timeout() {
        let result = run_health_check(
            "FastFailure",
            async { Err("mock failure".to_string()) },
            0.1,
        )
        .await;
        assert_eq!(result.status, HealthStatusType::Error);
        assert_eq!(
            result.error,
            Some("FastFailure health check failed: mock failure".to_string())
        );
    }
}
