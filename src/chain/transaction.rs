use rmpv::Value;
use serde::Deserialize;

use crate::chain::address::Address;
use crate::constants::{MIN_FEE, VALIDITY_WINDOW_ROUNDS};
use crate::crypto::hash::sha512_256_prefixed;
use crate::error::{AppError, Result};

use base64::Engine;
use data_encoding::BASE32_NOPAD;

/// Signature plus envelope overhead added on top of the unsigned size.
const SIGNATURE_OVERHEAD_BYTES: u64 = 75;

/// `GET /v2/transactions/params` as returned by algod.
#[derive(Debug, Clone, Deserialize)]
pub struct SuggestedParams {
    #[serde(rename = "fee")]
    pub fee_per_byte: u64,
    #[serde(rename = "min-fee", default = "default_min_fee")]
    pub min_fee: u64,
    #[serde(rename = "last-round")]
    pub last_round: u64,
    #[serde(rename = "genesis-id")]
    pub genesis_id: String,
    #[serde(rename = "genesis-hash")]
    pub genesis_hash: String,
}

fn default_min_fee() -> u64 {
    MIN_FEE
}

impl SuggestedParams {
    pub fn genesis_hash_bytes(&self) -> Result<[u8; 32]> {
        let raw = base64::engine::general_purpose::STANDARD
            .decode(self.genesis_hash.as_bytes())
            .map_err(|e| AppError::RemoteFailure(format!("Invalid genesis hash: {e}")))?;
        raw.try_into()
            .map_err(|_| AppError::RemoteFailure("Genesis hash must be 32 bytes".to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionKind {
    Payment {
        receiver: Address,
        amount: u64,
    },
    /// NoOp application call.
    ApplicationCall {
        app_id: u64,
        args: Vec<Vec<u8>>,
        boxes: Vec<Vec<u8>>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub sender: Address,
    pub fee: u64,
    pub first_valid: u64,
    pub last_valid: u64,
    pub genesis_id: String,
    pub genesis_hash: [u8; 32],
    pub group: Option<[u8; 32]>,
    pub kind: TransactionKind,
}

impl Transaction {
    fn from_params(sender: Address, kind: TransactionKind, params: &SuggestedParams) -> Result<Self> {
        let mut txn = Self {
            sender,
            fee: params.min_fee,
            first_valid: params.last_round,
            last_valid: params.last_round + VALIDITY_WINDOW_ROUNDS,
            genesis_id: params.genesis_id.clone(),
            genesis_hash: params.genesis_hash_bytes()?,
            group: None,
            kind,
        };
        if params.fee_per_byte > 0 {
            let size = txn.encode()?.len() as u64 + SIGNATURE_OVERHEAD_BYTES;
            txn.fee = (params.fee_per_byte * size).max(params.min_fee);
        }
        Ok(txn)
    }

    pub fn payment(
        sender: Address,
        receiver: Address,
        amount: u64,
        params: &SuggestedParams,
    ) -> Result<Self> {
        Self::from_params(sender, TransactionKind::Payment { receiver, amount }, params)
    }

    pub fn app_call(
        sender: Address,
        app_id: u64,
        args: Vec<Vec<u8>>,
        boxes: Vec<Vec<u8>>,
        params: &SuggestedParams,
    ) -> Result<Self> {
        Self::from_params(
            sender,
            TransactionKind::ApplicationCall { app_id, args, boxes },
            params,
        )
    }

    pub fn with_flat_fee(mut self, fee: u64) -> Self {
        self.fee = fee;
        self
    }

    /// Canonical form: keys sorted, zero values omitted.
    pub fn to_msgpack_value(&self) -> Value {
        let mut fields: Vec<(&'static str, Value)> = vec![
            ("fee", Value::from(self.fee)),
            ("fv", Value::from(self.first_valid)),
            ("gh", Value::Binary(self.genesis_hash.to_vec())),
            ("lv", Value::from(self.last_valid)),
            ("snd", Value::Binary(self.sender.as_bytes().to_vec())),
        ];
        if !self.genesis_id.is_empty() {
            fields.push(("gen", Value::from(self.genesis_id.as_str())));
        }
        if let Some(group) = self.group {
            fields.push(("grp", Value::Binary(group.to_vec())));
        }

        match &self.kind {
            TransactionKind::Payment { receiver, amount } => {
                fields.push(("type", Value::from("pay")));
                if *amount > 0 {
                    fields.push(("amt", Value::from(*amount)));
                }
                if !receiver.is_zero() {
                    fields.push(("rcv", Value::Binary(receiver.as_bytes().to_vec())));
                }
            }
            TransactionKind::ApplicationCall { app_id, args, boxes } => {
                fields.push(("type", Value::from("appl")));
                if *app_id > 0 {
                    fields.push(("apid", Value::from(*app_id)));
                }
                if !args.is_empty() {
                    let encoded = args.iter().map(|a| Value::Binary(a.clone())).collect();
                    fields.push(("apaa", Value::Array(encoded)));
                }
                if !boxes.is_empty() {
                    // Box index 0 refers to the called app itself and is omitted.
                    let refs = boxes
                        .iter()
                        .map(|name| {
                            Value::Map(vec![(Value::from("n"), Value::Binary(name.clone()))])
                        })
                        .collect();
                    fields.push(("apbx", Value::Array(refs)));
                }
            }
        }

        fields.retain(|(_, v)| !matches!(v, Value::Integer(i) if i.as_u64() == Some(0)));
        fields.sort_by(|a, b| a.0.cmp(b.0));
        Value::Map(
            fields
                .into_iter()
                .map(|(k, v)| (Value::from(k), v))
                .collect(),
        )
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        write_msgpack(&self.to_msgpack_value())
    }

    /// Bytes a signer signs: `"TX"` followed by the canonical encoding.
    pub fn bytes_to_sign(&self) -> Result<Vec<u8>> {
        let mut out = b"TX".to_vec();
        out.extend_from_slice(&self.encode()?);
        Ok(out)
    }

    pub fn raw_id(&self) -> Result<[u8; 32]> {
        Ok(sha512_256_prefixed(b"TX", &self.encode()?))
    }

    pub fn id(&self) -> Result<String> {
        Ok(BASE32_NOPAD.encode(&self.raw_id()?))
    }
}

pub fn write_msgpack(value: &Value) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    rmpv::encode::write_value(&mut buf, value)
        .map_err(|e| AppError::Internal(format!("msgpack encode failed: {e}")))?;
    Ok(buf)
}

/// Computes the group id over `txns` and stamps it on each of them.
pub fn assign_group_id(txns: &mut [Transaction]) -> Result<[u8; 32]> {
    if txns.is_empty() {
        return Err(AppError::Internal("Cannot group zero transactions".to_string()));
    }
    let mut ids = Vec::with_capacity(txns.len());
    for txn in txns.iter_mut() {
        txn.group = None;
        ids.push(Value::Binary(txn.raw_id()?.to_vec()));
    }
    let list = Value::Map(vec![(Value::from("txlist"), Value::Array(ids))]);
    let group = sha512_256_prefixed(b"TG", &write_msgpack(&list)?);
    for txn in txns.iter_mut() {
        txn.group = Some(group);
    }
    Ok(group)
}

/// Body for `POST /v2/transactions/simulate` with unsigned transactions.
pub fn simulate_request(txns: &[Transaction]) -> Result<Vec<u8>> {
    let wrapped = txns
        .iter()
        .map(|t| Value::Map(vec![(Value::from("txn"), t.to_msgpack_value())]))
        .collect();
    let request = Value::Map(vec![
        (Value::from("allow-empty-signatures"), Value::Boolean(true)),
        (
            Value::from("txn-groups"),
            Value::Array(vec![Value::Map(vec![(
                Value::from("txns"),
                Value::Array(wrapped),
            )])]),
        ),
    ]);
    write_msgpack(&request)
}
