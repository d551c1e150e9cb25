use serde::Serialize;
use std::sync::Arc;

use crate::chain::abi::{
    decode_string, decode_uint64, encode_call, extract_return, method_by_name, AbiArg, Method,
    TANGO_METHODS,
};
use crate::chain::algod::TealKeyValue;
use crate::chain::transaction::{assign_group_id, simulate_request};
use crate::chain::{Address, AlgodClient, Transaction, TransactionSigner};
use crate::config::Config;
use crate::constants::{
    ERROR_MESSAGES, GAME_BOX_PREFIX, GLOBAL_KEY_GAME_COUNTER, GLOBAL_KEY_OWNER,
    METHOD_CREATE_GAME, METHOD_JOIN_GAME, METHOD_SUBMIT_MOVE, METHOD_TRANSFER_OWNERSHIP,
};
use crate::crypto::hash::sha512_256_hex;
use crate::error::{AppError, Result};
use crate::models::{Game, GameStatus, Move, TxReceipt, Winner};
use crate::services::room::{GameReader, MoveSubmitter};

/// Box key of a game: `b"games"` followed by the big-endian id.
pub fn game_box_name(game_id: u64) -> Vec<u8> {
    let mut name = GAME_BOX_PREFIX.to_vec();
    name.extend_from_slice(&game_id.to_be_bytes());
    name
}

/// Box references a call needs: the game box for methods keyed by game id.
fn boxes_for(method: &Method, args: &[AbiArg]) -> Vec<Vec<u8>> {
    match args.first() {
        Some(AbiArg::Uint64(game_id)) if method.reads_game_box() => vec![game_box_name(*game_id)],
        _ => Vec::new(),
    }
}

/// Confirmed transaction and the logs it emitted.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub tx_id: String,
    pub confirmed_round: u64,
    pub sender: Address,
    pub logs: Vec<Vec<u8>>,
}

impl Invocation {
    pub fn return_value(&self) -> Option<&[u8]> {
        extract_return(&self.logs)
    }

    pub fn return_string(&self) -> Option<String> {
        self.return_value().and_then(|v| decode_string(v).ok())
    }

    pub fn receipt(&self, return_message: Option<String>) -> TxReceipt {
        TxReceipt {
            tx_id: self.tx_id.clone(),
            confirmed_round: self.confirmed_round,
            sender: self.sender,
            return_message,
        }
    }
}

/// Build → sign → submit → wait. No retries.
#[derive(Clone)]
pub struct OnchainInvoker {
    algod: AlgodClient,
    confirmation_rounds: u64,
}

/// Node-side reads: boxes, global state and simulated readonly calls.
#[derive(Clone)]
pub struct OnchainReader {
    algod: AlgodClient,
}

impl OnchainInvoker {
    pub fn new(algod: AlgodClient, confirmation_rounds: u64) -> Self {
        Self {
            algod,
            confirmation_rounds,
        }
    }

    pub async fn app_call(
        &self,
        sender: Address,
        app_id: u64,
        method: &Method,
        args: &[AbiArg],
        boxes: Vec<Vec<u8>>,
    ) -> Result<Transaction> {
        let params = self.algod.suggested_params().await?;
        let app_args = encode_call(method, args)?;
        tracing::debug!("Built {} call to app {}", method.signature(), app_id);
        Transaction::app_call(sender, app_id, app_args, boxes, &params)
    }

    pub async fn invoke(&self, signer: &dyn TransactionSigner, txn: Transaction) -> Result<Invocation> {
        self.invoke_group(signer, vec![txn], 0).await
    }

    /// Submits `txns` atomically (grouped when more than one) and waits for
    /// `txns[watch]`, whose logs are returned.
    pub async fn invoke_group(
        &self,
        signer: &dyn TransactionSigner,
        mut txns: Vec<Transaction>,
        watch: usize,
    ) -> Result<Invocation> {
        if txns.is_empty() {
            return Err(AppError::InvalidInput(
                "No on-chain calls to execute".to_string(),
            ));
        }
        if txns.len() > 1 {
            assign_group_id(&mut txns)?;
        }
        let tx_id = txns
            .get(watch)
            .ok_or_else(|| AppError::Internal(format!("No transaction at index {watch}")))?
            .id()?;

        let indexes: Vec<usize> = (0..txns.len()).collect();
        let signed = signer.sign_transactions(&txns, &indexes).await?.concat();
        tracing::debug!(
            "Submitting {} txn(s), payload sha512/256 {}",
            txns.len(),
            sha512_256_hex(&signed)
        );
        self.algod.send_raw_transaction(&signed).await?;

        let pending = self
            .algod
            .wait_for_confirmation(&tx_id, self.confirmation_rounds)
            .await?;
        Ok(Invocation {
            tx_id,
            confirmed_round: pending.confirmed_round.unwrap_or(0),
            sender: signer.address(),
            logs: pending.decoded_logs()?,
        })
    }
}

impl OnchainReader {
    pub fn new(algod: AlgodClient) -> Self {
        Self { algod }
    }

    pub async fn read_box(&self, app_id: u64, name: &[u8]) -> Result<Option<Vec<u8>>> {
        self.algod.application_box(app_id, name).await
    }

    pub async fn global_state(&self, app_id: u64) -> Result<Vec<TealKeyValue>> {
        Ok(self.algod.application_info(app_id).await?.params.global_state)
    }

    /// Runs a call through the simulator as `sender` and returns the raw ABI
    /// return value.
    pub async fn simulate_call(
        &self,
        sender: Address,
        app_id: u64,
        method: &Method,
        args: &[AbiArg],
        boxes: Vec<Vec<u8>>,
    ) -> Result<Vec<u8>> {
        let params = self.algod.suggested_params().await?;
        let txn = Transaction::app_call(sender, app_id, encode_call(method, args)?, boxes, &params)?;
        let response = self.algod.simulate(simulate_request(&[txn])?).await?;
        let logs = response.first_logs().map_err(|e| AppError::remote(e))?;
        extract_return(&logs)
            .map(|v| v.to_vec())
            .ok_or_else(|| {
                AppError::RemoteFailure(format!("{} returned no value", method.name))
            })
    }
}

// ==================== TANGO CONTRACT ====================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractState {
    pub app_id: u64,
    pub owner: Option<Address>,
    pub game_counter: u64,
}

pub fn parse_global_state(app_id: u64, entries: &[TealKeyValue]) -> Result<ContractState> {
    let mut state = ContractState {
        app_id,
        owner: None,
        game_counter: 0,
    };
    for entry in entries {
        match entry.decoded_key()?.as_str() {
            GLOBAL_KEY_OWNER => state.owner = Some(Address::from_slice(&entry.decoded_bytes()?)?),
            GLOBAL_KEY_GAME_COUNTER => state.game_counter = entry.value.uint,
            _ => {}
        }
    }
    Ok(state)
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedGame {
    pub game_id: u64,
    pub receipt: TxReceipt,
}

/// Contract-call layer for the Tango application.
pub struct TangoContract {
    app_id: u64,
    reader: OnchainReader,
    invoker: OnchainInvoker,
}

impl TangoContract {
    pub fn new(app_id: u64, algod: AlgodClient, confirmation_rounds: u64) -> Self {
        Self {
            app_id,
            reader: OnchainReader::new(algod.clone()),
            invoker: OnchainInvoker::new(algod, confirmation_rounds),
        }
    }

    pub fn from_config(config: &Config, algod: AlgodClient) -> Self {
        Self::new(config.contract_app_id, algod, config.confirmation_rounds)
    }

    async fn call(
        &self,
        signer: &dyn TransactionSigner,
        name: &str,
        args: &[AbiArg],
    ) -> Result<Invocation> {
        let method = method_by_name(&TANGO_METHODS, name)?;
        let txn = self
            .invoker
            .app_call(signer.address(), self.app_id, &method, args, boxes_for(&method, args))
            .await?;
        self.invoker.invoke(signer, txn).await
    }

    pub async fn read_global_state(&self) -> Result<ContractState> {
        let entries = self.reader.global_state(self.app_id).await?;
        parse_global_state(self.app_id, &entries)
    }

    pub async fn create_game(&self, signer: &dyn TransactionSigner) -> Result<CreatedGame> {
        // The new box is keyed by the next counter value.
        let next_id = self.read_global_state().await?.game_counter + 1;
        let method = method_by_name(&TANGO_METHODS, METHOD_CREATE_GAME)?;
        let txn = self
            .invoker
            .app_call(
                signer.address(),
                self.app_id,
                &method,
                &[],
                vec![game_box_name(next_id)],
            )
            .await?;
        let invocation = self.invoker.invoke(signer, txn).await?;

        let game_id = match invocation.return_value() {
            Some(value) => decode_uint64(value)?,
            None => {
                tracing::warn!("create_game returned no value; reading game_counter");
                self.read_global_state().await?.game_counter
            }
        };
        tracing::info!("Game {} created by {}", game_id, invocation.sender);
        Ok(CreatedGame {
            game_id,
            receipt: invocation.receipt(None),
        })
    }

    pub async fn join_game(&self, signer: &dyn TransactionSigner, game_id: u64) -> Result<TxReceipt> {
        let game = self.get_game(game_id).await?;
        if game.has_opponent() {
            return Err(AppError::InvalidInput(ERROR_MESSAGES.game_full.to_string()));
        }
        if game.status != GameStatus::Waiting {
            return Err(AppError::InvalidInput(ERROR_MESSAGES.game_not_waiting.to_string()));
        }
        if game.player1 == signer.address() {
            return Err(AppError::InvalidInput(ERROR_MESSAGES.same_player.to_string()));
        }

        let invocation = self
            .call(signer, METHOD_JOIN_GAME, &[AbiArg::Uint64(game_id)])
            .await?;
        tracing::info!("{} joined game {}", invocation.sender, game_id);
        Ok(invocation.receipt(invocation.return_string()))
    }

    pub async fn submit_move(
        &self,
        signer: &dyn TransactionSigner,
        game_id: u64,
        mv: Move,
    ) -> Result<TxReceipt> {
        if !mv.is_submitted() {
            return Err(AppError::InvalidInput(ERROR_MESSAGES.invalid_move.to_string()));
        }
        let invocation = self
            .call(
                signer,
                METHOD_SUBMIT_MOVE,
                &[AbiArg::Uint64(game_id), AbiArg::Uint64(mv.code())],
            )
            .await?;
        Ok(invocation.receipt(invocation.return_string()))
    }

    pub async fn get_game(&self, game_id: u64) -> Result<Game> {
        let not_found = || AppError::NotFound(ERROR_MESSAGES.game_not_found.to_string());
        if game_id == 0 {
            return Err(not_found());
        }
        let data = self
            .reader
            .read_box(self.app_id, &game_box_name(game_id))
            .await?
            .ok_or_else(not_found)?;
        Game::from_box(game_id, &data)
    }

    pub async fn get_game_status(&self, game_id: u64) -> Result<String> {
        Ok(self.get_game(game_id).await?.status_message().to_string())
    }

    pub async fn get_winner(&self, game_id: u64) -> Result<Winner> {
        self.get_game(game_id)
            .await?
            .winner()
            .ok_or_else(|| AppError::InvalidInput(ERROR_MESSAGES.game_not_finished.to_string()))
    }

    pub async fn transfer_ownership(
        &self,
        signer: &dyn TransactionSigner,
        new_owner: Address,
    ) -> Result<TxReceipt> {
        if new_owner.is_zero() {
            return Err(AppError::InvalidInput(ERROR_MESSAGES.invalid_address.to_string()));
        }
        let state = self.read_global_state().await?;
        if state.owner != Some(signer.address()) {
            return Err(AppError::InvalidInput(ERROR_MESSAGES.not_owner.to_string()));
        }
        let invocation = self
            .call(signer, METHOD_TRANSFER_OWNERSHIP, &[AbiArg::Address(new_owner)])
            .await?;
        tracing::info!("Ownership of app {} transferred to {}", self.app_id, new_owner);
        Ok(invocation.receipt(invocation.return_string()))
    }
}

#[async_trait::async_trait]
impl GameReader for TangoContract {
    async fn load_game(&self, game_id: u64) -> Result<Game> {
        self.get_game(game_id).await
    }
}

/// The contract bound to the connected signer, as the room's write port.
pub struct TangoSession {
    contract: Arc<TangoContract>,
    signer: Arc<dyn TransactionSigner>,
}

impl TangoSession {
    pub fn new(contract: Arc<TangoContract>, signer: Arc<dyn TransactionSigner>) -> Self {
        Self { contract, signer }
    }
}

#[async_trait::async_trait]
impl MoveSubmitter for TangoSession {
    fn viewer(&self) -> Address {
        self.signer.address()
    }

    async fn submit_move(&self, game_id: u64, mv: Move) -> Result<TxReceipt> {
        self.contract
            .submit_move(self.signer.as_ref(), game_id, mv)
            .await
    }
}
