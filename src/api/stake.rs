use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{parse_address, AppState};
use crate::constants::{MSG_REWARDS_CLAIMED, MSG_STAKE_STARTED, MSG_WITHDRAWN};
use crate::error::Result;
use crate::models::staking::DURATIONS;
use crate::models::{ApiResponse, DurationOption, RewardEstimate, StakingSnapshot, TxReceipt};
use crate::services::StakingViewModel;

#[derive(Debug, Deserialize)]
pub struct EstimateQuery {
    pub amount: Option<String>,
    pub days: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct EstimateResponse {
    #[serde(flatten)]
    pub estimate: RewardEstimate,
    pub durations: &'static [DurationOption],
}

#[derive(Debug, Deserialize)]
pub struct DepositRequest {
    /// Amount in ALGO.
    pub amount: f64,
}

/// Staking confirmation plus the refreshed account view.
#[derive(Debug, Serialize)]
pub struct StakeActionResponse {
    pub receipt: TxReceipt,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<StakingSnapshot>,
}

const DEFAULT_DURATION_DAYS: u32 = 30;

fn estimate_from_query(query: &EstimateQuery) -> EstimateResponse {
    // Unparseable amounts estimate to zero rather than failing.
    let amount = query
        .amount
        .as_deref()
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .unwrap_or(0.0);
    let days = query.days.unwrap_or(DEFAULT_DURATION_DAYS);
    EstimateResponse {
        estimate: StakingViewModel::estimate(amount, days),
        durations: &DURATIONS,
    }
}

/// GET /api/v1/stake/{address}
pub async fn get_account(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<ApiResponse<StakingSnapshot>>> {
    let address = parse_address(&address)?;
    let view = StakingViewModel::observer(state.staking.clone(), address);
    let snapshot = view.refresh().await?;
    Ok(Json(ApiResponse::success(snapshot)))
}

/// GET /api/v1/stake/estimate?amount=&days=
pub async fn get_estimate(Query(query): Query<EstimateQuery>) -> Json<ApiResponse<EstimateResponse>> {
    Json(ApiResponse::success(estimate_from_query(&query)))
}

/// POST /api/v1/stake/deposit
pub async fn deposit(
    State(state): State<AppState>,
    Json(req): Json<DepositRequest>,
) -> Result<Json<ApiResponse<StakeActionResponse>>> {
    let view = StakingViewModel::connected(state.staking.clone(), state.signer.clone())?;
    let signer = state.require_signer()?;
    let _guard = state
        .pending
        .begin(format!("{}:stake", signer.address()))
        .await?;
    let receipt = view.stake(req.amount).await?;
    Ok(Json(ApiResponse::with_message(
        StakeActionResponse {
            receipt,
            account: view.snapshot().await,
        },
        MSG_STAKE_STARTED,
    )))
}

/// POST /api/v1/stake/claim
pub async fn claim(State(state): State<AppState>) -> Result<Json<ApiResponse<StakeActionResponse>>> {
    let view = StakingViewModel::connected(state.staking.clone(), state.signer.clone())?;
    let signer = state.require_signer()?;
    let _guard = state
        .pending
        .begin(format!("{}:stake", signer.address()))
        .await?;
    let receipt = view.claim_rewards().await?;
    Ok(Json(ApiResponse::with_message(
        StakeActionResponse {
            receipt,
            account: view.snapshot().await,
        },
        MSG_REWARDS_CLAIMED,
    )))
}

/// POST /api/v1/stake/withdraw
pub async fn withdraw(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<StakeActionResponse>>> {
    let view = StakingViewModel::connected(state.staking.clone(), state.signer.clone())?;
    let signer = state.require_signer()?;
    let _guard = state
        .pending
        .begin(format!("{}:stake", signer.address()))
        .await?;
    let receipt = view.withdraw().await?;
    Ok(Json(ApiResponse::with_message(
        StakeActionResponse {
            receipt,
            account: view.snapshot().await,
        },
        MSG_WITHDRAWN,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_defaults_to_thirty_days() {
        let response = estimate_from_query(&EstimateQuery {
            amount: Some("365".to_string()),
            days: None,
        });
        assert_eq!(response.estimate.days, 30);
        assert!((response.estimate.estimated_rewards - 0.9).abs() < 1e-9);
        assert_eq!(response.durations.len(), 4);
    }

    #[test]
    fn garbage_amount_estimates_zero() {
        let response = estimate_from_query(&EstimateQuery {
            amount: Some("lots".to_string()),
            days: Some(365),
        });
        assert_eq!(response.estimate.estimated_rewards, 0.0);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["annual_rate_percent"], 3.0);
    }
}
