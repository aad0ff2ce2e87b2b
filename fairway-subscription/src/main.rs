use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod models;
mod routes;
mod schema;
mod services;

use config::AppConfig;
use fairway_shared::clients::db::{create_pool, DbPool};
use fairway_shared::clients::redis::RedisClient;

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub redis: RedisClient,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fairway_shared::middleware::init_tracing("fairway-subscription");

    let config = AppConfig::load()?;
    let port = config.port;

    let db = create_pool(&config.database_url)?;
    let redis = RedisClient::connect(&config.redis_url).await?;

    let state = Arc::new(AppState { db, config, redis });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/subscription", get(routes::subscription::get_subscription))
        .route("/usage", get(routes::subscription::get_usage))
        // Internal service-to-service endpoints (no auth)
        .route("/internal/likes/consume", post(routes::internal::consume_like))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "fairway-subscription starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
