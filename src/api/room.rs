use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{parse_address, AppState};
use crate::constants::{ERROR_MESSAGES, MSG_MOVE_SUBMITTED};
use crate::error::{AppError, Result};
use crate::models::{ApiResponse, Move, TxReceipt};
use crate::services::{MoveSubmitter, RoomView, RoomViewModel, TangoSession};

#[derive(Debug, Deserialize)]
pub struct RoomQuery {
    pub viewer: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitMoveRequest {
    #[serde(rename = "move")]
    pub move_code: Option<u64>,
    #[serde(default)]
    pub random: bool,
}

#[derive(Debug, Serialize)]
pub struct SubmitMoveResponse {
    pub receipt: TxReceipt,
    pub submitted: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<RoomView>,
}

/// Move code to send: the explicit one, or a random playable move.
fn requested_move(req: &SubmitMoveRequest) -> Result<u64> {
    match (req.move_code, req.random) {
        (Some(code), _) => Ok(code),
        (None, true) => Ok(Move::random().code()),
        (None, false) => Err(AppError::InvalidInput(ERROR_MESSAGES.invalid_move.to_string())),
    }
}

/// GET /api/v1/room/{id}?viewer=
pub async fn get_room(
    State(state): State<AppState>,
    Path(game_id): Path<u64>,
    Query(query): Query<RoomQuery>,
) -> Result<Json<ApiResponse<RoomView>>> {
    let viewer = match query.viewer.as_deref().filter(|v| !v.trim().is_empty()) {
        Some(raw) => Some(parse_address(raw)?),
        None => None,
    };
    let room = RoomViewModel::new(game_id, viewer, state.games.clone(), None);
    room.refresh().await?;
    let view = room
        .view()
        .await
        .ok_or_else(|| AppError::NotFound(ERROR_MESSAGES.game_not_found.to_string()))?;
    Ok(Json(ApiResponse::success(view)))
}

/// POST /api/v1/room/{id}/move
pub async fn submit_move(
    State(state): State<AppState>,
    Path(game_id): Path<u64>,
    Json(req): Json<SubmitMoveRequest>,
) -> Result<Json<ApiResponse<SubmitMoveResponse>>> {
    let code = requested_move(&req)?;
    let mv = Move::playable(code)?;
    let signer = state.require_signer()?;
    let viewer = signer.address();
    let _guard = state
        .pending
        .begin(format!("{}:room:{}", viewer, game_id))
        .await?;

    let submitter: Arc<dyn MoveSubmitter> =
        Arc::new(TangoSession::new(state.contract.clone(), signer));
    let room = RoomViewModel::new(game_id, Some(viewer), state.games.clone(), Some(submitter));
    let receipt = room.submit_move(code).await?;

    Ok(Json(ApiResponse::with_message(
        SubmitMoveResponse {
            receipt,
            submitted: mv.label(),
            room: room.view().await,
        },
        MSG_MOVE_SUBMITTED,
    )))
}
