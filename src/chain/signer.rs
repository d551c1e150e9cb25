use base64::Engine;
use reqwest::Response;
use serde::{de::DeserializeOwned, Deserialize};

use crate::chain::address::Address;
use crate::chain::transaction::Transaction;
use crate::error::{AppError, Result};

const KMD_TOKEN_HEADER: &str = "X-KMD-API-Token";

/// Signing capability supplied from outside (wallet, KMD, ...).
#[async_trait::async_trait]
pub trait TransactionSigner: Send + Sync {
    /// Account the signer signs for.
    fn address(&self) -> Address;

    /// Signs `txns[i]` for every `i` in `indexes`, returning encoded signed
    /// transactions in the same order.
    async fn sign_transactions(
        &self,
        txns: &[Transaction],
        indexes: &[usize],
    ) -> Result<Vec<Vec<u8>>>;
}

/// Signer backed by a KMD wallet (LocalNet development).
pub struct KmdSigner {
    base_url: String,
    token: String,
    wallet_name: String,
    wallet_password: String,
    address: Address,
    client: reqwest::Client,
}

impl KmdSigner {
    pub fn new(
        base_url: String,
        token: String,
        wallet_name: String,
        wallet_password: String,
        address: Address,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            wallet_name,
            wallet_password,
            address,
            client: reqwest::Client::new(),
        }
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: serde_json::Value) -> Result<T> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .header(KMD_TOKEN_HEADER, &self.token)
            .json(&body)
            .send()
            .await?;
        read_kmd(response).await
    }

    async fn wallet_id(&self) -> Result<String> {
        let response = self
            .client
            .get(format!("{}/v1/wallets", self.base_url))
            .header(KMD_TOKEN_HEADER, &self.token)
            .send()
            .await?;
        let listing: WalletList = read_kmd(response).await?;
        listing
            .wallets
            .into_iter()
            .find(|w| w.name == self.wallet_name)
            .map(|w| w.id)
            .ok_or(AppError::NotConnected)
    }

    async fn open_handle(&self) -> Result<String> {
        let wallet_id = self.wallet_id().await?;
        let init: WalletHandle = self
            .post(
                "/v1/wallet/init",
                serde_json::json!({
                    "wallet_id": wallet_id,
                    "wallet_password": self.wallet_password,
                }),
            )
            .await?;
        Ok(init.wallet_handle_token)
    }

    async fn release_handle(&self, handle: &str) {
        let released: Result<serde_json::Value> = self
            .post(
                "/v1/wallet/release",
                serde_json::json!({ "wallet_handle_token": handle }),
            )
            .await;
        if let Err(e) = released {
            tracing::warn!("Failed to release KMD wallet handle: {}", e);
        }
    }

    async fn sign_one(&self, handle: &str, txn: &Transaction) -> Result<Vec<u8>> {
        let signed: SignResponse = self
            .post("/v1/transaction/sign", sign_request(handle, &self.wallet_password, txn)?)
            .await?;
        base64::engine::general_purpose::STANDARD
            .decode(signed.signed_transaction.as_bytes())
            .map_err(|e| AppError::RemoteFailure(format!("KMD returned invalid base64: {e}")))
    }
}

fn sign_request(handle: &str, password: &str, txn: &Transaction) -> Result<serde_json::Value> {
    Ok(serde_json::json!({
        "wallet_handle_token": handle,
        "wallet_password": password,
        "transaction": base64::engine::general_purpose::STANDARD.encode(txn.encode()?),
    }))
}

#[async_trait::async_trait]
impl TransactionSigner for KmdSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign_transactions(
        &self,
        txns: &[Transaction],
        indexes: &[usize],
    ) -> Result<Vec<Vec<u8>>> {
        let handle = self.open_handle().await?;
        let mut signed = Vec::with_capacity(indexes.len());
        let mut failure = None;
        for &index in indexes {
            let Some(txn) = txns.get(index) else {
                failure = Some(AppError::Internal(format!("No transaction at index {index}")));
                break;
            };
            match self.sign_one(&handle, txn).await {
                Ok(bytes) => signed.push(bytes),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }
        self.release_handle(&handle).await;
        match failure {
            Some(e) => Err(e),
            None => Ok(signed),
        }
    }
}

async fn read_kmd<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        let message = serde_json::from_str::<KmdError>(&text)
            .map(|e| e.message)
            .unwrap_or(text);
        return Err(AppError::remote(message));
    }
    serde_json::from_str(&text)
        .map_err(|e| AppError::RemoteFailure(format!("Unexpected KMD response: {e}")))
}

#[derive(Debug, Deserialize)]
struct KmdError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct WalletList {
    #[serde(default)]
    wallets: Vec<WalletEntry>,
}

#[derive(Debug, Deserialize)]
struct WalletEntry {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct WalletHandle {
    wallet_handle_token: String,
}

#[derive(Debug, Deserialize)]
struct SignResponse {
    signed_transaction: String,
}
