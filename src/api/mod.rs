// src/api/mod.rs

pub mod game;
pub mod health;
pub mod network;
pub mod room;
pub mod stake;

use std::sync::Arc;

use crate::chain::{Address, AlgodClient, KmdSigner, TransactionSigner};
use crate::config::Config;
use crate::constants::ERROR_MESSAGES;
use crate::error::{AppError, Result};
use crate::services::{
    FixtureGames, GameReader, IjarahContract, PendingOperations, StakingLedger, TangoContract,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub algod: AlgodClient,
    pub contract: Arc<TangoContract>,
    /// Read port used by the room: the contract, or fixtures in dev mode.
    pub games: Arc<dyn GameReader>,
    pub staking: Arc<dyn StakingLedger>,
    /// Connected signer; `None` when no wallet is configured.
    pub signer: Option<Arc<dyn TransactionSigner>>,
    pub pending: PendingOperations,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self> {
        let algod = AlgodClient::new(config.algod_url.clone(), config.algod_token.clone());
        let contract = Arc::new(TangoContract::from_config(config, algod.clone()));
        let staking = Arc::new(IjarahContract::from_config(config, algod.clone())?);

        let games: Arc<dyn GameReader> = if config.use_fixture_games {
            tracing::warn!("Room reads served from fixture games");
            Arc::new(FixtureGames::new()) as Arc<dyn GameReader>
        } else {
            contract.clone() as Arc<dyn GameReader>
        };

        Ok(Self {
            config: config.clone(),
            algod,
            contract,
            games,
            staking,
            signer: signer_from_config(config)?,
            pending: PendingOperations::new(),
        })
    }

    pub fn require_signer(&self) -> Result<Arc<dyn TransactionSigner>> {
        self.signer.clone().ok_or(AppError::NotConnected)
    }
}

fn signer_from_config(config: &Config) -> Result<Option<Arc<dyn TransactionSigner>>> {
    let (Some(wallet_name), Some(address)) = (&config.kmd_wallet_name, &config.signer_address)
    else {
        tracing::info!("No signer configured; mutating endpoints are disabled");
        return Ok(None);
    };
    let address: Address = address
        .parse()
        .map_err(|e| AppError::Config(format!("SIGNER_ADDRESS: {e}")))?;
    tracing::info!("Using KMD wallet '{}' for {}", wallet_name, address);
    Ok(Some(Arc::new(KmdSigner::new(
        config.kmd_url.clone(),
        config.kmd_token.clone(),
        wallet_name.clone(),
        config.kmd_wallet_password.clone().unwrap_or_default(),
        address,
    ))))
}

pub fn parse_address(raw: &str) -> Result<Address> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::InvalidInput(ERROR_MESSAGES.invalid_address.to_string()))
}
