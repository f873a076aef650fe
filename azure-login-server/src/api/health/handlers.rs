use super::checkers::run_health_check;
use super::models::{ComponentHealth, HealthResponse, HealthStatusType, LivenessResponse};
use crate::openapi::HEALTH_TAG;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use log::{debug, info};

/// Liveness check handler
#[utoipa::path(
    get,
    path = "/health",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Service is running", body = LivenessResponse)
    )
)]
pub async fn health_check() -> impl IntoResponse {
    Json(LivenessResponse {
        status: HealthStatusType::Ok,
    })
}

/// Readiness check handler, probing the account and token stores
#[utoipa::path(
    get,
    path = "/ready",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Service is ready", body = HealthResponse),
        (status = 503, description = "Service is not ready", body = HealthResponse)
    )
)]
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let timeout_secs = state.config.healthcheck_timeout;
    let (account_store, token_store) = tokio::join!(
        run_health_check("Account store", state.stores.accounts.health_check(), timeout_secs),
        run_health_check("Token store", state.stores.tokens.health_check(), timeout_secs),
    );

    let components = ComponentHealth {
        account_store,
        token_store,
    };
    let all_healthy = components.account_store.is_ok() && components.token_store.is_ok();

    if all_healthy {
        debug!("Readiness check passed for all components");
    } else {
        let issues: Vec<&str> = [&components.account_store, &components.token_store]
            .into_iter()
            .filter_map(|c| c.error.as_deref())
            .collect();
        info!("Readiness check failed: {}", issues.join(", "));
    }

    HealthResponse {
        status: if all_healthy {
            HealthStatusType::Ok
        } else {
            HealthStatusType::Error
        },
        components,
        status_code: if all_healthy {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        },
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
}
