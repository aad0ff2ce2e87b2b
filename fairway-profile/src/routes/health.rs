use axum::Json;
use fairway_shared::types::api::HealthResponse;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy("fairway-profile", env!("CARGO_PKG_VERSION")))
}
