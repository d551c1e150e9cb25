use axum::{extract::State, Json};
use serde::Serialize;
use super::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub network: String,
    pub node: String,
    pub signer: String,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let node_status = match state.algod.health().await {
        Ok(()) => "connected".to_string(),
        Err(e) => {
            tracing::warn!("algod health check failed: {}", e);
            "unreachable".to_string()
        }
    };

    let signer_status = if state.signer.is_some() {
        "connected".to_string()
    } else {
        "not connected".to_string()
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        network: state.config.network.name().to_string(),
        node: node_status,
        signer: signer_status,
    })
}
