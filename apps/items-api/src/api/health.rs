//! Readiness endpoint

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use axum_helpers::{HealthCheckFuture, run_health_checks};
use database::elasticsearch::check_health_detailed;
use serde_json::Value;

use crate::state::AppState;

/// Create a readiness router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(readiness_check))
        .with_state(state)
}

/// Readiness check - verifies the Elasticsearch cluster answers and is not red
async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![(
        "elasticsearch",
        Box::pin(async {
            let health = check_health_detailed(&state.es).await;
            if health.healthy {
                Ok(())
            } else {
                Err(health
                    .message
                    .unwrap_or_else(|| "cluster unavailable".to_string()))
            }
        }),
    )];

    match run_health_checks(checks).await {
        Ok(response) | Err(response) => response,
    }
}
