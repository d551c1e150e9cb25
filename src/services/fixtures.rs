use std::collections::HashMap;

use crate::chain::Address;
use crate::constants::ERROR_MESSAGES;
use crate::error::{AppError, Result};
use crate::models::{Game, GameStatus, Move};
use crate::services::room::GameReader;

pub const PLAYER_ONE: Address = Address([1u8; 32]);
pub const PLAYER_TWO: Address = Address([2u8; 32]);

/// In-memory games for tests and `USE_FIXTURE_GAMES` development mode:
/// 1 is in progress, 2 is finished (player 1 won), 3 waits for a second player.
pub struct FixtureGames {
    games: HashMap<u64, Game>,
}

impl FixtureGames {
    pub fn new() -> Self {
        let games = [
            Game {
                id: 1,
                player1: PLAYER_ONE,
                player2: PLAYER_TWO,
                move1: Move::Rock,
                move2: Move::None,
                status: GameStatus::Ongoing,
                winner: None,
            },
            Game {
                id: 2,
                player1: PLAYER_ONE,
                player2: PLAYER_TWO,
                move1: Move::Rock,
                move2: Move::Scissors,
                status: GameStatus::Finished,
                winner: Some(PLAYER_ONE),
            },
            Game {
                id: 3,
                player1: PLAYER_ONE,
                player2: Address::ZERO,
                move1: Move::None,
                move2: Move::None,
                status: GameStatus::Waiting,
                winner: None,
            },
        ]
        .into_iter()
        .map(|g| (g.id, g))
        .collect();
        Self { games }
    }
}

impl Default for FixtureGames {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl GameReader for FixtureGames {
    async fn load_game(&self, game_id: u64) -> Result<Game> {
        self.games
            .get(&game_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(ERROR_MESSAGES.game_not_found.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Winner;

    #[tokio::test]
    async fn fixtures_cover_each_status() {
        let fixtures = FixtureGames::new();
        assert_eq!(fixtures.load_game(1).await.unwrap().status, GameStatus::Ongoing);
        let finished = fixtures.load_game(2).await.unwrap();
        assert_eq!(finished.winner(), Some(Winner::Player(PLAYER_ONE)));
        assert!(!fixtures.load_game(3).await.unwrap().has_opponent());
        assert!(matches!(fixtures.load_game(4).await, Err(AppError::NotFound(_))));
    }
}
