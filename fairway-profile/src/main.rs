use axum::routing::{get, patch, post};
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

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub rabbitmq: RabbitMQClient,
    pub http_client: reqwest::Client,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fairway_shared::middleware::init_tracing("fairway-profile");

    let config = AppConfig::load()?;
    let port = config.port;

    let db = create_pool(&config.database_url)?;
    let rabbitmq = RabbitMQClient::connect(&config.rabbitmq_url).await?;
    let http_client = reqwest::Client::new();

    let state = Arc::new(AppState { db, config, rabbitmq, http_client });

    let admin_routes = Router::new()
        .route("/users", get(routes::admin::list_users))
        .route("/users/:id", patch(routes::admin::update_user));

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/profiles", post(routes::profile::create_profile))
        .route("/me", get(routes::profile::get_profile).patch(routes::profile::update_profile))
        .route("/profiles/:id", get(routes::profile::get_public_profile))
        .route("/discover", get(routes::profile::discover))
        .nest("/admin", admin_routes)
        // Internal service-to-service endpoints (no auth)
        .route("/internal/profiles/batch", post(routes::internal::batch_profiles))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "fairway-profile starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
