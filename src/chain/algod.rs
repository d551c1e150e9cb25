use base64::Engine;
use reqwest::{header::CONTENT_TYPE, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::chain::address::Address;
use crate::chain::transaction::SuggestedParams;
use crate::error::{AppError, Result};

const API_TOKEN_HEADER: &str = "X-Algo-API-Token";

fn decode_b64(value: &str) -> Result<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(value.as_bytes())
        .map_err(|e| AppError::RemoteFailure(format!("Invalid base64 from node: {e}")))
}

fn box_name_param(name: &[u8]) -> String {
    format!(
        "b64:{}",
        base64::engine::general_purpose::STANDARD.encode(name)
    )
}

/// Algorand node (algod v2) REST client
#[derive(Clone)]
pub struct AlgodClient {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl AlgodClient {
    pub fn new(base_url: String, token: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(self.url(path))
            .header(API_TOKEN_HEADER, &self.token)
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(self.url(path))
            .header(API_TOKEN_HEADER, &self.token)
    }

    /// Liveness probe
    pub async fn health(&self) -> Result<()> {
        let response = self.get("/health").send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }

    pub async fn suggested_params(&self) -> Result<SuggestedParams> {
        let response = self.get("/v2/transactions/params").send().await?;
        read_json(response).await
    }

    pub async fn account_information(&self, address: &Address) -> Result<AccountInformation> {
        let response = self
            .get(&format!("/v2/accounts/{address}"))
            .send()
            .await?;
        read_json(response).await
    }

    pub async fn application_info(&self, app_id: u64) -> Result<ApplicationInfo> {
        let response = self
            .get(&format!("/v2/applications/{app_id}"))
            .send()
            .await?;
        read_json(response).await
    }

    /// Box contents, or `None` when the box does not exist.
    pub async fn application_box(&self, app_id: u64, name: &[u8]) -> Result<Option<Vec<u8>>> {
        let mut url = Url::parse(&self.url(&format!("/v2/applications/{app_id}/box")))
            .map_err(|e| AppError::Config(format!("Invalid algod URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("name", &box_name_param(name));

        let response = self
            .client
            .get(url)
            .header(API_TOKEN_HEADER, &self.token)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body: BoxResponse = read_json(response).await?;
        decode_b64(&body.value).map(Some)
    }

    /// Submits one signed transaction or a concatenated signed group.
    pub async fn send_raw_transaction(&self, signed: &[u8]) -> Result<String> {
        tracing::debug!("Submitting {} signed bytes", signed.len());
        let response = self
            .post("/v2/transactions")
            .header(CONTENT_TYPE, "application/x-binary")
            .body(signed.to_vec())
            .send()
            .await?;
        let body: SendResponse = read_json(response).await?;
        Ok(body.tx_id)
    }

    pub async fn pending_transaction(&self, tx_id: &str) -> Result<PendingTransaction> {
        let response = self
            .get(&format!("/v2/transactions/pending/{tx_id}"))
            .send()
            .await?;
        read_json(response).await
    }

    pub async fn status(&self) -> Result<NodeStatus> {
        let response = self.get("/v2/status").send().await?;
        read_json(response).await
    }

    pub async fn status_after_block(&self, round: u64) -> Result<NodeStatus> {
        let response = self
            .get(&format!("/v2/status/wait-for-block-after/{round}"))
            .send()
            .await?;
        read_json(response).await
    }

    /// Polls until `tx_id` is confirmed or `max_rounds` rounds pass.
    pub async fn wait_for_confirmation(
        &self,
        tx_id: &str,
        max_rounds: u64,
    ) -> Result<PendingTransaction> {
        let start = self.status().await?.last_round;
        let mut current = start;
        while current < start + max_rounds.max(1) {
            let pending = self.pending_transaction(tx_id).await?;
            if pending.confirmed_round.unwrap_or(0) > 0 {
                tracing::info!(
                    "Transaction {} confirmed in round {}",
                    tx_id,
                    pending.confirmed_round.unwrap_or(0)
                );
                return Ok(pending);
            }
            if !pending.pool_error.is_empty() {
                return Err(AppError::remote(&pending.pool_error));
            }
            current = self.status_after_block(current).await?.last_round.max(current + 1);
        }
        Err(AppError::RemoteFailure(format!(
            "Transaction {tx_id} not confirmed after {max_rounds} rounds"
        )))
    }

    /// Runs unsigned transactions through the node's simulator.
    pub async fn simulate(&self, request: Vec<u8>) -> Result<SimulateResponse> {
        let response = self
            .post("/v2/transactions/simulate?format=json")
            .header(CONTENT_TYPE, "application/msgpack")
            .body(request)
            .send()
            .await?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }
    response
        .json()
        .await
        .map_err(|e| AppError::RemoteFailure(format!("Unexpected node response: {e}")))
}

async fn error_from_response(response: Response) -> AppError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<NodeError>(&text)
        .map(|e| e.message)
        .unwrap_or_else(|_| format!("HTTP {status}: {text}"));
    tracing::debug!("algod error ({}): {}", status, message);
    AppError::remote(message)
}

#[derive(Debug, Deserialize)]
struct NodeError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct BoxResponse {
    value: String,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(rename = "txId")]
    tx_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeStatus {
    #[serde(rename = "last-round")]
    pub last_round: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountInformation {
    pub address: String,
    pub amount: u64,
    #[serde(rename = "min-balance", default)]
    pub min_balance: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PendingTransaction {
    #[serde(rename = "confirmed-round")]
    pub confirmed_round: Option<u64>,
    #[serde(rename = "pool-error", default)]
    pub pool_error: String,
    #[serde(default)]
    pub logs: Vec<String>,
}

impl PendingTransaction {
    pub fn decoded_logs(&self) -> Result<Vec<Vec<u8>>> {
        self.logs.iter().map(|l| decode_b64(l)).collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationInfo {
    pub id: u64,
    pub params: ApplicationParams,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationParams {
    #[serde(rename = "global-state", default)]
    pub global_state: Vec<TealKeyValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TealKeyValue {
    pub key: String,
    pub value: TealValue,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TealValue {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub bytes: String,
    #[serde(default)]
    pub uint: u64,
}

impl TealKeyValue {
    pub fn decoded_key(&self) -> Result<String> {
        let raw = decode_b64(&self.key)?;
        String::from_utf8(raw)
            .map_err(|e| AppError::RemoteFailure(format!("Global key is not UTF-8: {e}")))
    }

    pub fn decoded_bytes(&self) -> Result<Vec<u8>> {
        decode_b64(&self.value.bytes)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulateResponse {
    #[serde(rename = "txn-groups", default)]
    pub txn_groups: Vec<SimulateGroup>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulateGroup {
    #[serde(rename = "failure-message", default)]
    pub failure_message: Option<String>,
    #[serde(rename = "txn-results", default)]
    pub txn_results: Vec<SimulateTxnResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulateTxnResult {
    #[serde(rename = "txn-result")]
    pub txn_result: PendingTransaction,
}

impl SimulateResponse {
    /// Logs of the first transaction, or the failure message if the group failed.
    pub fn first_logs(&self) -> std::result::Result<Vec<Vec<u8>>, String> {
        let group = self
            .txn_groups
            .first()
            .ok_or_else(|| "Simulation returned no groups".to_string())?;
        if let Some(message) = group.failure_message.as_ref().filter(|m| !m.is_empty()) {
            return Err(message.clone());
        }
        let result = group
            .txn_results
            .first()
            .ok_or_else(|| "Simulation returned no results".to_string())?;
        result.txn_result.decoded_logs().map_err(|e| e.to_string())
    }
}
