use axum::{extract::State, Json};
use serde::Serialize;

use super::AppState;
use crate::chain::Address;
use crate::config::Config;
use crate::error::Result;
use crate::models::ApiResponse;

#[derive(Debug, Serialize)]
pub struct NetworkInfo {
    pub network: &'static str,
    pub algod_url: String,
    pub contract_app_id: u64,
    pub contract_app_address: String,
    pub staking_app_id: u64,
    pub staking_app_address: String,
    pub supported_wallets: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signer_address: Option<Address>,
    pub fixture_games: bool,
}

fn network_info(config: &Config, signer_address: Option<Address>) -> NetworkInfo {
    NetworkInfo {
        network: config.network.name(),
        algod_url: config.algod_url.clone(),
        contract_app_id: config.contract_app_id,
        contract_app_address: config.contract_app_address.clone(),
        staking_app_id: config.staking_app_id,
        staking_app_address: config.staking_app_address.clone(),
        supported_wallets: config.network.supported_wallets().to_vec(),
        signer_address,
        fixture_games: config.use_fixture_games,
    }
}

/// GET /api/v1/network
pub async fn get_network_info(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<NetworkInfo>>> {
    let signer_address = state.signer.as_ref().map(|s| s.address());
    Ok(Json(ApiResponse::success(network_info(
        &state.config,
        signer_address,
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Network;

    #[test]
    fn localnet_info_lists_kmd_only() {
        let mut config = Config {
            host: "127.0.0.1".to_string(),
            port: 3000,
            environment: "development".to_string(),
            network: Network::LocalNet,
            algod_url: "http://localhost:4001".to_string(),
            algod_token: "a".repeat(64),
            confirmation_rounds: 4,
            kmd_url: "http://localhost:4002".to_string(),
            kmd_token: "a".repeat(64),
            kmd_wallet_name: None,
            kmd_wallet_password: None,
            signer_address: None,
            contract_app_id: 1,
            contract_app_address: String::new(),
            staking_app_id: 2,
            staking_app_address: String::new(),
            use_fixture_games: true,
            cors_allowed_origins: "*".to_string(),
        };
        let info = network_info(&config, None);
        assert_eq!(info.network, "LocalNet");
        assert_eq!(info.supported_wallets, vec!["KMD"]);

        config.network = Network::TestNet;
        let value = serde_json::to_value(network_info(&config, None)).unwrap();
        assert_eq!(value["supported_wallets"].as_array().unwrap().len(), 3);
        assert!(value.get("signer_address").is_none());
    }
}
