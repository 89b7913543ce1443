//! StaffNet Backend
//!
//! Staff directory, task proof-of-work review and team chat over a REST API
//! with SQLite persistence and Server-Sent Events change notifications.

mod api;
mod auth;
mod authz;
mod config;
mod db;
mod errors;
mod events;
mod join;
mod models;
mod service;
mod workflow;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::{MemoryStore, Repository, Store};
use events::EventBus;
use service::Dashboard;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<Dashboard>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(config.log_json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!config.log_json).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("Starting StaffNet Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.allow_seed {
        tracing::warn!("GET /api/seed is enabled and wipes all data (STAFFNET_ALLOW_SEED)");
    }

    // Initialize database
    let store: Arc<dyn Store> = if config.db_path.as_os_str() == db::IN_MEMORY_PATH {
        tracing::warn!("Using in-memory store; data is lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        let pool = db::init_database(&config.db_path).await?;
        Arc::new(Repository::new(pool))
    };
    let dashboard = Arc::new(Dashboard::new(store, EventBus::new(config.event_capacity)));

    if config.seed_on_start && dashboard.seed_if_empty().await? {
        tracing::info!("Seeded empty database with default roles and admin user");
    }

    let state = AppState {
        dashboard,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Session
        .route("/login", post(api::login))
        // Staff
        .route("/staff", get(api::list_staff).post(api::create_staff))
        .route(
            "/staff/{id}",
            get(api::get_staff)
                .put(api::update_staff)
                .delete(api::fire_staff),
        )
        .route("/roles", get(api::list_roles).post(api::create_role))
        // Tasks
        .route("/tasks", get(api::list_tasks).post(api::create_task))
        .route("/tasks/{id}", get(api::get_task))
        .route("/tasks/{id}/proof", post(api::submit_proof))
        .route("/tasks/{id}/review", post(api::review_task))
        .route("/tasks/{id}/complete", post(api::complete_task))
        .route("/tasks/{id}/status", put(api::update_task_status))
        // Chat
        .route("/chat", get(api::list_messages).post(api::send_message))
        // Dashboard
        .route("/audit-logs", get(api::list_audit_logs))
        .route("/stats", get(api::get_stats))
        .route("/revision", get(api::get_revision))
        .route("/events", get(api::stream_events))
        .route("/seed", get(api::seed));

    // Health check (no session required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
