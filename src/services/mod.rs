// All service modules
pub mod fixtures;
pub mod onchain;
pub mod pending;
pub mod room;
pub mod staking;

// Re-export for convenience
pub use fixtures::FixtureGames;
pub use onchain::{TangoContract, TangoSession};
pub use pending::PendingOperations;
pub use room::{GameReader, MoveSubmitter, RoomView, RoomViewModel};
pub use staking::{IjarahContract, StakingLedger, StakingViewModel};
