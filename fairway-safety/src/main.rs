use axum::routing::{delete, get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod events;
mod models;
mod routes;
mod schema;

use config::AppConfig;
use fairway_shared::clients::db::{create_pool, DbPool};
use fairway_shared::clients::rabbitmq::RabbitMQClient;
use fairway_shared::middleware::{init_metrics, metrics_middleware};

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub rabbitmq: RabbitMQClient,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fairway_shared::middleware::init_tracing("fairway-safety");

    let config = AppConfig::load()?;
    let port = config.port;

    let db = create_pool(&config.database_url)?;
    let rabbitmq = RabbitMQClient::connect(&config.rabbitmq_url).await?;
    let metrics_handle = init_metrics();

    let state = Arc::new(AppState { db, config, rabbitmq, metrics_handle });

    let admin_routes = Router::new()
        .route("/reports", get(routes::admin_routes::list_reports))
        .route("/reports/:id", get(routes::admin_routes::get_report).patch(routes::admin_routes::update_report))
        .route("/stats", get(routes::admin_routes::get_stats))
        .route("/audit-log", get(routes::admin_routes::get_audit_log));

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        .route("/report", post(routes::user_routes::create_report))
        .route("/block", post(routes::user_routes::create_block))
        .route("/block/:blocked_id", delete(routes::user_routes::remove_block))
        .route("/blocked-users", get(routes::user_routes::list_blocked))
        .route("/blocked-users/check", post(routes::user_routes::check_blocked))
        // Internal service-to-service endpoints (no auth)
        .route("/internal/blocked-ids/:user_id", get(routes::internal::get_blocked_ids))
        .nest("/admin", admin_routes)
        .layer(axum::middleware::from_fn(metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "fairway-safety starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
