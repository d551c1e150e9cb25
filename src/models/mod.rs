// src/models/mod.rs
pub mod game;
pub mod response;
pub mod staking;

pub use game::{judge, Game, GameStatus, Judgement, Move, Outcome, Role, Winner};
pub use response::{ApiResponse, TxReceipt};
pub use staking::{DurationOption, IjarahInfo, RewardEstimate, StakingSnapshot};
