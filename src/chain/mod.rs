pub mod abi;
pub mod address;
pub mod algod;
pub mod signer;
pub mod transaction;

pub use address::Address;
pub use algod::AlgodClient;
pub use signer::{KmdSigner, TransactionSigner};
pub use transaction::{SuggestedParams, Transaction};
