use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use diesel::prelude::*;
use std::sync::Arc;

use fairway_shared::{HealthCheck, HealthResponse, HealthStatus};

use crate::AppState;

/// Deep health check: configuration and the database must both pass for a
/// 200 "healthy"; a broker outage only degrades (publishes are
/// fire-and-forget).
pub async fn health_check(State(state): State<Arc<AppState>>) -> Response {
    let mut checks = Vec::with_capacity(3);

    checks.push(match state.config.validate() {
        Ok(()) => HealthCheck {
            name: "config".to_string(),
            status: HealthStatus::Healthy,
            message: None,
        },
        Err(e) => HealthCheck {
            name: "config".to_string(),
            status: HealthStatus::Unhealthy,
            message: Some(e),
        },
    });

    checks.push(match check_database(&state) {
        Ok(()) => HealthCheck {
            name: "database".to_string(),
            status: HealthStatus::Healthy,
            message: None,
        },
        Err(e) => HealthCheck {
            name: "database".to_string(),
            status: HealthStatus::Unhealthy,
            message: Some(e),
        },
    });

    checks.push(if state.rabbitmq.is_connected() {
        HealthCheck {
            name: "rabbitmq".to_string(),
            status: HealthStatus::Healthy,
            message: None,
        }
    } else {
        HealthCheck {
            name: "rabbitmq".to_string(),
            status: HealthStatus::Degraded,
            message: Some("channel not connected".to_string()),
        }
    });

    let response = HealthResponse::healthy("fairway-safety", env!("CARGO_PKG_VERSION"))
        .with_checks(checks);

    let status = match response.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status, Json(response)).into_response()
}

fn check_database(state: &AppState) -> Result<(), String> {
    let mut conn = state.db.get().map_err(|e| format!("pool: {e}"))?;
    diesel::sql_query("SELECT 1")
        .execute(&mut conn)
        .map_err(|e| format!("query: {e}"))?;
    Ok(())
}

/// Returns Prometheus metrics.
pub async fn metrics(State(state): State<Arc<AppState>>) -> String {
    state.metrics_handle.render()
}
