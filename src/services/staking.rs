use std::sync::Arc;
use tokio::sync::Mutex;

use crate::chain::abi::{decode_uint64_tuple, encode_call, method_by_name, AbiArg, IJARAH_METHODS};
use crate::chain::{Address, AlgodClient, Transaction, TransactionSigner};
use crate::config::Config;
use crate::constants::{
    ERROR_MESSAGES, GROUPED_APP_CALL_FEE, IJARAH_BOX_PREFIX, METHOD_CLAIM_UJRAH,
    METHOD_GET_MY_IJARAH_INFO, METHOD_LEASE_VALIDATION_RIGHTS, METHOD_TERMINATE_LEASE,
    MIN_LEASE_DEPOSIT,
};
use crate::error::{AppError, Result};
use crate::models::staking::algo_to_micro;
use crate::models::{IjarahInfo, RewardEstimate, StakingSnapshot, TxReceipt};
use crate::services::onchain::{OnchainInvoker, OnchainReader};
use crate::utils::now_unix;

/// Lease box of an account: `ijarah_` followed by its address text.
pub fn ijarah_box_name(address: &Address) -> Vec<u8> {
    format!("{IJARAH_BOX_PREFIX}{address}").into_bytes()
}

/// Node-facing side of the staking flow.
#[async_trait::async_trait]
pub trait StakingLedger: Send + Sync {
    /// Spendable balance in microAlgos.
    async fn balance(&self, address: &Address) -> Result<u64>;

    /// Active lease of `address`, if any.
    async fn lease(&self, address: &Address) -> Result<Option<IjarahInfo>>;

    async fn deposit(&self, signer: &dyn TransactionSigner, amount: u64) -> Result<TxReceipt>;

    async fn claim(&self, signer: &dyn TransactionSigner) -> Result<TxReceipt>;

    async fn terminate(&self, signer: &dyn TransactionSigner, principal: u64) -> Result<TxReceipt>;
}

/// Ijarah staking application.
pub struct IjarahContract {
    app_id: u64,
    app_address: Address,
    algod: AlgodClient,
    reader: OnchainReader,
    invoker: OnchainInvoker,
}

impl IjarahContract {
    pub fn new(app_id: u64, app_address: Address, algod: AlgodClient, confirmation_rounds: u64) -> Self {
        Self {
            app_id,
            app_address,
            reader: OnchainReader::new(algod.clone()),
            invoker: OnchainInvoker::new(algod.clone(), confirmation_rounds),
            algod,
        }
    }

    pub fn from_config(config: &Config, algod: AlgodClient) -> Result<Self> {
        let app_address = config
            .staking_app_address
            .parse()
            .map_err(|e| AppError::Config(format!("STAKING_APP_ADDRESS: {e}")))?;
        Ok(Self::new(
            config.staking_app_id,
            app_address,
            algod,
            config.confirmation_rounds,
        ))
    }

    /// Single flat-fee call carrying the sender's lease box.
    async fn call(
        &self,
        signer: &dyn TransactionSigner,
        name: &str,
        args: &[AbiArg],
    ) -> Result<TxReceipt> {
        let sender = signer.address();
        let method = method_by_name(&IJARAH_METHODS, name)?;
        let params = self.algod.suggested_params().await?;
        let txn = Transaction::app_call(
            sender,
            self.app_id,
            encode_call(&method, args)?,
            vec![ijarah_box_name(&sender)],
            &params,
        )?
        .with_flat_fee(GROUPED_APP_CALL_FEE);
        let invocation = self.invoker.invoke(signer, txn).await?;
        Ok(invocation.receipt(invocation.return_string()))
    }
}

#[async_trait::async_trait]
impl StakingLedger for IjarahContract {
    async fn balance(&self, address: &Address) -> Result<u64> {
        Ok(self.algod.account_information(address).await?.amount)
    }

    async fn lease(&self, address: &Address) -> Result<Option<IjarahInfo>> {
        let box_name = ijarah_box_name(address);
        if self.reader.read_box(self.app_id, &box_name).await?.is_none() {
            return Ok(None);
        }
        let method = method_by_name(&IJARAH_METHODS, METHOD_GET_MY_IJARAH_INFO)?;
        let value = self
            .reader
            .simulate_call(*address, self.app_id, &method, &[], vec![box_name])
            .await?;
        let [principal, start_time, unclaimed] = decode_uint64_tuple::<3>(&value)?;
        Ok((principal > 0).then_some(IjarahInfo {
            principal,
            start_time,
            unclaimed,
        }))
    }

    async fn deposit(&self, signer: &dyn TransactionSigner, amount: u64) -> Result<TxReceipt> {
        let sender = signer.address();
        let method = method_by_name(&IJARAH_METHODS, METHOD_LEASE_VALIDATION_RIGHTS)?;
        let params = self.algod.suggested_params().await?;

        let payment = Transaction::payment(sender, self.app_address, amount, &params)?;
        let app_call = Transaction::app_call(
            sender,
            self.app_id,
            encode_call(&method, &[])?,
            vec![ijarah_box_name(&sender)],
            &params,
        )?
        .with_flat_fee(GROUPED_APP_CALL_FEE);

        let invocation = self
            .invoker
            .invoke_group(signer, vec![payment, app_call], 1)
            .await?;
        tracing::info!("Lease of {} microAlgos started by {}", amount, sender);
        Ok(invocation.receipt(invocation.return_string()))
    }

    async fn claim(&self, signer: &dyn TransactionSigner) -> Result<TxReceipt> {
        self.call(signer, METHOD_CLAIM_UJRAH, &[]).await
    }

    async fn terminate(&self, signer: &dyn TransactionSigner, principal: u64) -> Result<TxReceipt> {
        self.call(signer, METHOD_TERMINATE_LEASE, &[AbiArg::Uint64(principal)])
            .await
    }
}

#[derive(Default)]
struct StakingState {
    balance: u64,
    lease: Option<IjarahInfo>,
    loaded: bool,
    processing: bool,
}

/// Staking page state for one account: idle or processing.
pub struct StakingViewModel {
    ledger: Arc<dyn StakingLedger>,
    address: Address,
    signer: Option<Arc<dyn TransactionSigner>>,
    state: Mutex<StakingState>,
}

impl StakingViewModel {
    /// Read-only view of `address`.
    pub fn observer(ledger: Arc<dyn StakingLedger>, address: Address) -> Self {
        Self {
            ledger,
            address,
            signer: None,
            state: Mutex::new(StakingState::default()),
        }
    }

    /// View of the signer's own account; `None` means no wallet is connected.
    pub fn connected(
        ledger: Arc<dyn StakingLedger>,
        signer: Option<Arc<dyn TransactionSigner>>,
    ) -> Result<Self> {
        let signer = signer.ok_or(AppError::NotConnected)?;
        Ok(Self {
            ledger,
            address: signer.address(),
            signer: Some(signer),
            state: Mutex::new(StakingState::default()),
        })
    }

    pub fn estimate(amount: f64, days: u32) -> RewardEstimate {
        RewardEstimate::compute(amount, days)
    }

    pub async fn is_processing(&self) -> bool {
        self.state.lock().await.processing
    }

    /// Last loaded account view, without touching the node.
    pub async fn snapshot(&self) -> Option<StakingSnapshot> {
        let state = self.state.lock().await;
        state
            .loaded
            .then(|| StakingSnapshot::new(self.address, state.balance, state.lease, now_unix()))
    }

    pub async fn refresh(&self) -> Result<StakingSnapshot> {
        let balance = self.ledger.balance(&self.address).await?;
        let lease = self.ledger.lease(&self.address).await?;
        let mut state = self.state.lock().await;
        state.balance = balance;
        state.lease = lease;
        state.loaded = true;
        Ok(StakingSnapshot::new(self.address, balance, lease, now_unix()))
    }

    async fn ensure_loaded(&self) -> Result<()> {
        if !self.state.lock().await.loaded {
            self.refresh().await?;
        }
        Ok(())
    }

    fn signer(&self) -> Result<Arc<dyn TransactionSigner>> {
        self.signer.clone().ok_or(AppError::NotConnected)
    }

    async fn begin(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.processing {
            return Err(AppError::OperationInProgress);
        }
        state.processing = true;
        Ok(())
    }

    /// Clears the processing flag and reloads after a confirmed action.
    async fn finish(&self, result: Result<TxReceipt>, action: &str) -> Result<TxReceipt> {
        self.state.lock().await.processing = false;
        match result {
            Ok(receipt) => {
                if let Err(e) = self.refresh().await {
                    tracing::warn!("Refresh after {} failed: {}", action, e);
                }
                Ok(receipt)
            }
            Err(e) => {
                tracing::error!("{} for {} failed: {}", action, self.address, e);
                Err(e)
            }
        }
    }

    /// Starts a lease of `amount_algo` ALGO.
    pub async fn stake(&self, amount_algo: f64) -> Result<TxReceipt> {
        let signer = self.signer()?;
        let amount = algo_to_micro(amount_algo);
        if amount < MIN_LEASE_DEPOSIT {
            return Err(AppError::InvalidInput(ERROR_MESSAGES.minimum_stake.to_string()));
        }
        self.ensure_loaded().await?;
        if amount > self.state.lock().await.balance {
            return Err(AppError::InsufficientFunds);
        }

        self.begin().await?;
        let result = self.ledger.deposit(signer.as_ref(), amount).await;
        self.finish(result, "Stake").await
    }

    pub async fn claim_rewards(&self) -> Result<TxReceipt> {
        let signer = self.signer()?;
        self.ensure_loaded().await?;
        let unclaimed = self
            .state
            .lock()
            .await
            .lease
            .map(|l| l.unclaimed)
            .unwrap_or(0);
        if unclaimed == 0 {
            return Err(AppError::InvalidInput(ERROR_MESSAGES.no_rewards.to_string()));
        }

        self.begin().await?;
        let result = self.ledger.claim(signer.as_ref()).await;
        self.finish(result, "Claim").await
    }

    /// Ends the lease, withdrawing the full principal.
    pub async fn withdraw(&self) -> Result<TxReceipt> {
        let signer = self.signer()?;
        self.ensure_loaded().await?;
        let principal = self
            .state
            .lock()
            .await
            .lease
            .map(|l| l.principal)
            .unwrap_or(0);
        if principal == 0 {
            return Err(AppError::InvalidInput(ERROR_MESSAGES.no_active_stake.to_string()));
        }

        self.begin().await?;
        let result = self.ledger.terminate(signer.as_ref(), principal).await;
        self.finish(result, "Withdraw").await
    }
}
