use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{parse_address, AppState};
use crate::constants::{MSG_GAME_CREATED, MSG_GAME_JOINED, MSG_OWNERSHIP_TRANSFERRED};
use crate::error::Result;
use crate::models::{ApiResponse, Game, TxReceipt, Winner};
use crate::services::onchain::{ContractState, CreatedGame};

#[derive(Debug, Serialize)]
pub struct GameStatusResponse {
    pub game_id: u64,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct WinnerResponse {
    pub game_id: u64,
    pub winner: Winner,
}

#[derive(Debug, Deserialize)]
pub struct TransferOwnershipRequest {
    pub new_owner: String,
}

/// POST /api/v1/games
pub async fn create_game(State(state): State<AppState>) -> Result<Json<ApiResponse<CreatedGame>>> {
    let signer = state.require_signer()?;
    let _guard = state
        .pending
        .begin(format!("{}:games:create", signer.address()))
        .await?;
    let created = state.contract.create_game(signer.as_ref()).await?;
    Ok(Json(ApiResponse::with_message(created, MSG_GAME_CREATED)))
}

/// POST /api/v1/games/{id}/join
pub async fn join_game(
    State(state): State<AppState>,
    Path(game_id): Path<u64>,
) -> Result<Json<ApiResponse<TxReceipt>>> {
    let signer = state.require_signer()?;
    let _guard = state
        .pending
        .begin(format!("{}:games:{}", signer.address(), game_id))
        .await?;
    let receipt = state.contract.join_game(signer.as_ref(), game_id).await?;
    Ok(Json(ApiResponse::with_message(receipt, MSG_GAME_JOINED)))
}

/// GET /api/v1/games/{id}
pub async fn get_game(
    State(state): State<AppState>,
    Path(game_id): Path<u64>,
) -> Result<Json<ApiResponse<Game>>> {
    let game = state.contract.get_game(game_id).await?;
    Ok(Json(ApiResponse::success(game)))
}

/// GET /api/v1/games/{id}/status
pub async fn get_game_status(
    State(state): State<AppState>,
    Path(game_id): Path<u64>,
) -> Result<Json<ApiResponse<GameStatusResponse>>> {
    let status = state.contract.get_game_status(game_id).await?;
    Ok(Json(ApiResponse::success(GameStatusResponse { game_id, status })))
}

/// GET /api/v1/games/{id}/winner
pub async fn get_winner(
    State(state): State<AppState>,
    Path(game_id): Path<u64>,
) -> Result<Json<ApiResponse<WinnerResponse>>> {
    let winner = state.contract.get_winner(game_id).await?;
    Ok(Json(ApiResponse::success(WinnerResponse { game_id, winner })))
}

/// GET /api/v1/contract/state
pub async fn get_contract_state(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ContractState>>> {
    let contract_state = state.contract.read_global_state().await?;
    Ok(Json(ApiResponse::success(contract_state)))
}

/// POST /api/v1/contract/owner
pub async fn transfer_ownership(
    State(state): State<AppState>,
    Json(req): Json<TransferOwnershipRequest>,
) -> Result<Json<ApiResponse<TxReceipt>>> {
    let new_owner = parse_address(&req.new_owner)?;
    let signer = state.require_signer()?;
    let _guard = state
        .pending
        .begin(format!("{}:contract:owner", signer.address()))
        .await?;
    let receipt = state
        .contract
        .transfer_ownership(signer.as_ref(), new_owner)
        .await?;
    Ok(Json(ApiResponse::with_message(receipt, MSG_OWNERSHIP_TRANSFERRED)))
}
