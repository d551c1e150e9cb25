use serde::Serialize;
use std::env;
use std::str::FromStr;

use crate::chain::Address;
use crate::constants::{
    DEFAULT_CONFIRMATION_ROUNDS, DEFAULT_CONTRACT_APP_ADDRESS, DEFAULT_CONTRACT_APP_ID,
    DEFAULT_STAKING_APP_ADDRESS, DEFAULT_STAKING_APP_ID,
};
use crate::utils::is_env_flag_enabled;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Network {
    TestNet,
    MainNet,
    LocalNet,
}

/// Default endpoints of one network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkProfile {
    pub algod_server: &'static str,
    pub algod_port: &'static str,
    pub algod_token: String,
    pub kmd_server: &'static str,
    pub kmd_port: &'static str,
}

impl Network {
    pub fn name(self) -> &'static str {
        match self {
            Network::TestNet => "TestNet",
            Network::MainNet => "MainNet",
            Network::LocalNet => "LocalNet",
        }
    }

    pub fn profile(self) -> NetworkProfile {
        match self {
            Network::TestNet => NetworkProfile {
                algod_server: "https://testnet-api.algonode.cloud",
                algod_port: "",
                algod_token: String::new(),
                kmd_server: "",
                kmd_port: "",
            },
            Network::MainNet => NetworkProfile {
                algod_server: "https://mainnet-api.algonode.cloud",
                algod_port: "",
                algod_token: String::new(),
                kmd_server: "",
                kmd_port: "",
            },
            Network::LocalNet => NetworkProfile {
                algod_server: "http://localhost",
                algod_port: "4001",
                algod_token: "a".repeat(64),
                kmd_server: "http://localhost",
                kmd_port: "4002",
            },
        }
    }

    /// Wallets a user can connect with on this network.
    pub fn supported_wallets(self) -> &'static [&'static str] {
        match self {
            Network::LocalNet => &["KMD"],
            Network::TestNet | Network::MainNet => &["DEFLY", "PERA", "EXODUS"],
        }
    }
}

impl FromStr for Network {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "testnet" => Ok(Network::TestNet),
            "mainnet" => Ok(Network::MainNet),
            "localnet" | "local" | "sandbox" => Ok(Network::LocalNet),
            other => anyhow::bail!("Unknown ALGOD_NETWORK '{other}' (use testnet, mainnet or localnet)"),
        }
    }
}

/// Joins a server and an optional port the way the wallet SDKs do.
pub fn endpoint(server: &str, port: &str) -> String {
    let server = server.trim().trim_end_matches('/');
    let port = port.trim();
    if port.is_empty() {
        server.to_string()
    } else {
        format!("{server}:{port}")
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,
    pub environment: String,

    // Network
    pub network: Network,
    pub algod_url: String,
    pub algod_token: String,
    pub confirmation_rounds: u64,

    // Signer (KMD)
    pub kmd_url: String,
    pub kmd_token: String,
    pub kmd_wallet_name: Option<String>,
    pub kmd_wallet_password: Option<String>,
    pub signer_address: Option<String>,

    // Contracts
    pub contract_app_id: u64,
    pub contract_app_address: String,
    pub staking_app_id: u64,
    pub staking_app_address: String,

    // Development
    pub use_fixture_games: bool,

    // CORS
    pub cors_allowed_origins: String,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let network: Network = var_or("ALGOD_NETWORK", "testnet").parse()?;
        let profile = network.profile();

        Ok(Config {
            host: var_or("HOST", "0.0.0.0"),
            port: var_or("PORT", "3000").parse()?,
            environment: var_or("ENVIRONMENT", "development"),

            network,
            algod_url: endpoint(
                &var_or("ALGOD_SERVER", profile.algod_server),
                &env::var("ALGOD_PORT").unwrap_or_else(|_| profile.algod_port.to_string()),
            ),
            algod_token: env::var("ALGOD_TOKEN").unwrap_or(profile.algod_token),
            confirmation_rounds: var_or(
                "CONFIRMATION_ROUNDS",
                &DEFAULT_CONFIRMATION_ROUNDS.to_string(),
            )
            .parse()?,

            kmd_url: endpoint(
                &var_or("KMD_SERVER", profile.kmd_server),
                &env::var("KMD_PORT").unwrap_or_else(|_| profile.kmd_port.to_string()),
            ),
            kmd_token: env::var("KMD_TOKEN").unwrap_or_else(|_| "a".repeat(64)),
            kmd_wallet_name: env::var("KMD_WALLET_NAME").ok(),
            kmd_wallet_password: env::var("KMD_WALLET_PASSWORD").ok(),
            signer_address: env::var("SIGNER_ADDRESS").ok(),

            contract_app_id: var_or("CONTRACT_APP_ID", &DEFAULT_CONTRACT_APP_ID.to_string())
                .parse()?,
            contract_app_address: var_or("CONTRACT_APP_ADDRESS", DEFAULT_CONTRACT_APP_ADDRESS),
            staking_app_id: var_or("STAKING_APP_ID", &DEFAULT_STAKING_APP_ID.to_string())
                .parse()?,
            staking_app_address: var_or("STAKING_APP_ADDRESS", DEFAULT_STAKING_APP_ADDRESS),

            use_fixture_games: is_env_flag_enabled("USE_FIXTURE_GAMES"),

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string()),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.port == 0 {
            anyhow::bail!("PORT must be > 0");
        }
        if self.algod_url.trim().is_empty() {
            anyhow::bail!("ALGOD_SERVER is empty");
        }
        if self.contract_app_id == 0 {
            anyhow::bail!("CONTRACT_APP_ID is not configured");
        }
        if self.staking_app_id == 0 {
            anyhow::bail!("STAKING_APP_ID is not configured");
        }
        self.contract_app_address
            .parse::<Address>()
            .map_err(|e| anyhow::anyhow!("CONTRACT_APP_ADDRESS: {e}"))?;
        self.staking_app_address
            .parse::<Address>()
            .map_err(|e| anyhow::anyhow!("STAKING_APP_ADDRESS: {e}"))?;
        if let Some(addr) = &self.signer_address {
            addr.parse::<Address>()
                .map_err(|e| anyhow::anyhow!("SIGNER_ADDRESS: {e}"))?;
        }
        if self.confirmation_rounds == 0 {
            anyhow::bail!("CONFIRMATION_ROUNDS must be > 0");
        }

        if self.use_fixture_games && self.environment != "development" {
            tracing::warn!("Fixture games enabled outside development");
        }
        if self.network != Network::LocalNet && self.algod_token == "a".repeat(64) {
            tracing::warn!("Detected LocalNet algod token used against {}", self.network.name());
        }
        if self.has_signer_config() && self.network != Network::LocalNet {
            tracing::warn!("KMD signer configured on {}; KMD is meant for LocalNet", self.network.name());
        }
        if self.cors_allowed_origins.trim().is_empty() {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty; requests may be blocked");
        }

        Ok(())
    }

    pub fn has_signer_config(&self) -> bool {
        self.kmd_wallet_name.is_some() && self.signer_address.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            host: "127.0.0.1".to_string(),
            port: 3000,
            environment: "development".to_string(),
            network: Network::TestNet,
            algod_url: "https://testnet-api.algonode.cloud".to_string(),
            algod_token: String::new(),
            confirmation_rounds: 4,
            kmd_url: String::new(),
            kmd_token: String::new(),
            kmd_wallet_name: None,
            kmd_wallet_password: None,
            signer_address: None,
            contract_app_id: DEFAULT_CONTRACT_APP_ID,
            contract_app_address: DEFAULT_CONTRACT_APP_ADDRESS.to_string(),
            staking_app_id: DEFAULT_STAKING_APP_ID,
            staking_app_address: DEFAULT_STAKING_APP_ADDRESS.to_string(),
            use_fixture_games: false,
            cors_allowed_origins: "*".to_string(),
        }
    }

    #[test]
    fn network_parses_case_insensitively() {
        assert_eq!("TestNet".parse::<Network>().unwrap(), Network::TestNet);
        assert_eq!("LOCALNET".parse::<Network>().unwrap(), Network::LocalNet);
        assert!("devnet".parse::<Network>().is_err());
    }

    #[test]
    fn localnet_profile_uses_local_ports() {
        let profile = Network::LocalNet.profile();
        assert_eq!(endpoint(profile.algod_server, profile.algod_port), "http://localhost:4001");
        assert_eq!(profile.algod_token.len(), 64);
        assert_eq!(Network::LocalNet.supported_wallets(), &["KMD"]);
        assert_eq!(Network::MainNet.supported_wallets().len(), 3);
    }

    #[test]
    fn endpoint_skips_empty_port() {
        assert_eq!(
            endpoint("https://testnet-api.algonode.cloud/", ""),
            "https://testnet-api.algonode.cloud"
        );
    }

    #[test]
    fn validate_accepts_defaults_and_rejects_bad_addresses() {
        assert!(sample().validate().is_ok());

        let mut bad = sample();
        bad.contract_app_address = "not-an-address".to_string();
        assert!(bad.validate().is_err());

        let mut zero = sample();
        zero.contract_app_id = 0;
        assert!(zero.validate().is_err());
    }
}
