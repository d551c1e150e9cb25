use axum::http::HeaderValue;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod chain;
mod config;
mod constants;
mod crypto;
mod error;
mod models;
mod services;
mod utils;

use config::Config;
use constants::API_VERSION;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tango_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!("Starting Tango Backend Server");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("Network: {} ({})", config.network.name(), config.algod_url);
    tracing::info!("API Version: {}", API_VERSION);
    tracing::info!(
        "Tango app {} / Ijarah app {}",
        config.contract_app_id,
        config.staking_app_id
    );

    let app_state = api::AppState::from_config(&config)?;
    if let Err(e) = app_state.algod.health().await {
        tracing::warn!("algod not reachable at startup: {}", e);
    }

    // Build router
    let app = build_router(app_state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: api::AppState) -> Router {
    // CORS configuration
    let cors = cors_from_config(&state.config);

    Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/api/v1/network", get(api::network::get_network_info))
        // Games
        .route("/api/v1/games", post(api::game::create_game))
        .route("/api/v1/games/{id}", get(api::game::get_game))
        .route("/api/v1/games/{id}/join", post(api::game::join_game))
        .route("/api/v1/games/{id}/status", get(api::game::get_game_status))
        .route("/api/v1/games/{id}/winner", get(api::game::get_winner))
        // Contract administration
        .route("/api/v1/contract/state", get(api::game::get_contract_state))
        .route("/api/v1/contract/owner", post(api::game::transfer_ownership))
        // Game room
        .route("/api/v1/room/{id}", get(api::room::get_room))
        .route("/api/v1/room/{id}/move", post(api::room::submit_move))
        // Staking
        .route("/api/v1/stake/estimate", get(api::stake::get_estimate))
        .route("/api/v1/stake/deposit", post(api::stake::deposit))
        .route("/api/v1/stake/claim", post(api::stake::claim))
        .route("/api/v1/stake/withdraw", post(api::stake::withdraw))
        .route("/api/v1/stake/{address}", get(api::stake::get_account))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_from_config(config: &Config) -> CorsLayer {
    let raw = config.cors_allowed_origins.trim();
    if raw.is_empty() || raw == "*" {
        return CorsLayer::very_permissive();
    }

    let allowed: Vec<HeaderValue> = raw
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<HeaderValue>().ok())
        .collect();

    if allowed.is_empty() {
        tracing::warn!("No valid CORS origins parsed; falling back to permissive");
        return CorsLayer::very_permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}
