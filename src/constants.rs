/// Application constants

// Default deployments (TestNet)
pub const DEFAULT_CONTRACT_APP_ID: u64 = 748_969_226;
pub const DEFAULT_CONTRACT_APP_ADDRESS: &str =
    "DHGTKVJVMIJ3KZHUXQFJTJK3CZ5ULIWIV2VJIKFGIA44E4PKGVDM4JAZPY";
pub const DEFAULT_STAKING_APP_ID: u64 = 749_014_050;
pub const DEFAULT_STAKING_APP_ADDRESS: &str =
    "D4V44T2PXCDL3RZHAAQAWVYK3OZHERJ3JVIGRWS24CMMITGVPPYT2RAGU4";

// Tango ABI methods
pub const METHOD_CREATE_GAME: &str = "create_game";
pub const METHOD_JOIN_GAME: &str = "join_game";
pub const METHOD_SUBMIT_MOVE: &str = "submit_move";
pub const METHOD_GET_GAME: &str = "get_game";
pub const METHOD_GET_GAME_STATUS: &str = "get_game_status";
pub const METHOD_GET_WINNER: &str = "get_winner";
pub const METHOD_TRANSFER_OWNERSHIP: &str = "transfer_ownership";

// Ijarah ABI methods
pub const METHOD_LEASE_VALIDATION_RIGHTS: &str = "lease_validation_rights";
pub const METHOD_CLAIM_UJRAH: &str = "claim_ujrah";
pub const METHOD_TERMINATE_LEASE: &str = "terminate_lease";
pub const METHOD_GET_MY_IJARAH_INFO: &str = "get_my_ijarah_info";

// Box storage
pub const GAME_BOX_PREFIX: &[u8] = b"games";
pub const IJARAH_BOX_PREFIX: &str = "ijarah_";
pub const GAME_BOX_SIZE: usize = 32 + 32 + 8 + 8 + 8 + 32;

// Global state keys
pub const GLOBAL_KEY_OWNER: &str = "owner";
pub const GLOBAL_KEY_GAME_COUNTER: &str = "game_counter";

// Game enumerations
pub const GAME_STATUS_WAITING: u64 = 0;
pub const GAME_STATUS_ONGOING: u64 = 1;
pub const GAME_STATUS_FINISHED: u64 = 2;

pub const MOVE_NONE: u64 = 0;
pub const MOVE_ROCK: u64 = 1;
pub const MOVE_PAPER: u64 = 2;
pub const MOVE_SCISSORS: u64 = 3;

// Transaction fees and limits (microAlgos)
pub const MIN_FEE: u64 = 1_000;
pub const GROUPED_APP_CALL_FEE: u64 = 2_000;
pub const MIN_ACCOUNT_BALANCE: u64 = 100_000;
pub const VALIDITY_WINDOW_ROUNDS: u64 = 1_000;
pub const DEFAULT_CONFIRMATION_ROUNDS: u64 = 4;

// Ijarah staking
pub const ANNUAL_UJRAH_RATE_BP: u64 = 300;
pub const SECONDS_PER_YEAR: u64 = 31_557_600;
pub const BASIS_POINTS_DIVISOR: u64 = 10_000;
pub const MICROALGOS_PER_ALGO: u64 = 1_000_000;
pub const MIN_LEASE_DEPOSIT: u64 = 1_000_000;
pub const ESTIMATE_ANNUAL_RATE_PERCENT: f64 = 3.0;

// API version
pub const API_VERSION: &str = "v1";

pub struct ErrorMessages {
    pub wallet_not_connected: &'static str,
    pub insufficient_balance: &'static str,
    pub transaction_failed: &'static str,
    pub transaction_rejected: &'static str,
    pub transaction_cancelled: &'static str,
    pub operation_in_progress: &'static str,
    pub game_not_found: &'static str,
    pub game_full: &'static str,
    pub game_not_waiting: &'static str,
    pub game_not_ongoing: &'static str,
    pub game_not_finished: &'static str,
    pub invalid_move: &'static str,
    pub move_already_submitted: &'static str,
    pub not_a_player: &'static str,
    pub same_player: &'static str,
    pub not_owner: &'static str,
    pub invalid_address: &'static str,
    pub minimum_stake: &'static str,
    pub no_rewards: &'static str,
    pub no_active_stake: &'static str,
}

pub const ERROR_MESSAGES: ErrorMessages = ErrorMessages {
    wallet_not_connected: "Please connect your wallet to continue",
    insufficient_balance: "Insufficient balance for transaction",
    transaction_failed: "Transaction failed. Please try again.",
    transaction_rejected: "Transaction was rejected in wallet",
    transaction_cancelled: "Transaction was cancelled",
    operation_in_progress: "Another transaction is still processing",
    game_not_found: "Game not found or does not exist",
    game_full: "This game already has two players",
    game_not_waiting: "Game is not waiting for a player",
    game_not_ongoing: "Game is not ongoing",
    game_not_finished: "Game not finished yet",
    invalid_move: "Invalid move. Choose Rock, Paper, or Scissors.",
    move_already_submitted: "You have already submitted your move",
    not_a_player: "You are not a player in this game",
    same_player: "Cannot play against yourself",
    not_owner: "Only owner can transfer ownership",
    invalid_address: "Invalid address format",
    minimum_stake: "Minimum stake is 1 ALGO",
    no_rewards: "No rewards available to claim yet",
    no_active_stake: "No active stake to withdraw",
};

pub const MSG_GAME_CREATED: &str = "Game created! Share the Game ID with your opponent.";
pub const MSG_GAME_JOINED: &str = "Successfully joined the game!";
pub const MSG_MOVE_SUBMITTED: &str = "Move submitted! Waiting for opponent...";
pub const MSG_OWNERSHIP_TRANSFERRED: &str = "Ownership transferred successfully!";
pub const MSG_STAKE_STARTED: &str = "Staking successful! Your lease has started.";
pub const MSG_REWARDS_CLAIMED: &str = "Rewards claimed successfully!";
pub const MSG_WITHDRAWN: &str = "Withdrawal successful! Funds returned to your wallet.";
