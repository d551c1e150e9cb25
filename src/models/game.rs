use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::chain::abi::{decode_address, decode_uint64};
use crate::chain::Address;
use crate::constants::{
    ERROR_MESSAGES, GAME_BOX_SIZE, GAME_STATUS_FINISHED, GAME_STATUS_ONGOING, GAME_STATUS_WAITING,
    MOVE_NONE, MOVE_PAPER, MOVE_ROCK, MOVE_SCISSORS,
};
use crate::error::{AppError, Result};

// ==================== MOVE ====================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Move {
    None,
    Rock,
    Paper,
    Scissors,
}

impl Move {
    pub const PLAYABLE: [Move; 3] = [Move::Rock, Move::Paper, Move::Scissors];

    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            MOVE_NONE => Some(Move::None),
            MOVE_ROCK => Some(Move::Rock),
            MOVE_PAPER => Some(Move::Paper),
            MOVE_SCISSORS => Some(Move::Scissors),
            _ => None,
        }
    }

    /// A move a player may submit: Rock, Paper or Scissors.
    pub fn playable(code: u64) -> Result<Self> {
        match Move::from_code(code) {
            Some(m) if m.is_submitted() => Ok(m),
            _ => Err(AppError::InvalidInput(ERROR_MESSAGES.invalid_move.to_string())),
        }
    }

    pub fn random() -> Self {
        let index = rand::rng().random_range(0..Self::PLAYABLE.len());
        Self::PLAYABLE[index]
    }

    pub fn code(self) -> u64 {
        match self {
            Move::None => MOVE_NONE,
            Move::Rock => MOVE_ROCK,
            Move::Paper => MOVE_PAPER,
            Move::Scissors => MOVE_SCISSORS,
        }
    }

    pub fn is_submitted(self) -> bool {
        self != Move::None
    }

    pub fn label(self) -> &'static str {
        match self {
            Move::None => "Not Submitted",
            Move::Rock => "Rock",
            Move::Paper => "Paper",
            Move::Scissors => "Scissors",
        }
    }

    /// Rock → Scissors → Paper → Rock.
    pub fn beats(self, other: Move) -> bool {
        matches!(
            (self, other),
            (Move::Rock, Move::Scissors) | (Move::Paper, Move::Rock) | (Move::Scissors, Move::Paper)
        )
    }
}

// ==================== STATUS ====================
/// Ordered: a game only ever moves forward through these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    Waiting,
    Ongoing,
    Finished,
}

impl GameStatus {
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            GAME_STATUS_WAITING => Some(GameStatus::Waiting),
            GAME_STATUS_ONGOING => Some(GameStatus::Ongoing),
            GAME_STATUS_FINISHED => Some(GameStatus::Finished),
            _ => None,
        }
    }

    pub fn code(self) -> u64 {
        match self {
            GameStatus::Waiting => GAME_STATUS_WAITING,
            GameStatus::Ongoing => GAME_STATUS_ONGOING,
            GameStatus::Finished => GAME_STATUS_FINISHED,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GameStatus::Waiting => "Waiting for Player 2",
            GameStatus::Ongoing => "Game in Progress",
            GameStatus::Finished => "Game Finished",
        }
    }
}

// ==================== ROLES & RESULTS ====================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Player1,
    Player2,
    Spectator,
}

impl Role {
    pub fn is_player(self) -> bool {
        self != Role::Spectator
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Win,
    Lose,
    Draw,
    Undetermined,
}

/// Result of a finished round, independent of who is looking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Judgement {
    Draw,
    Player1Wins,
    Player2Wins,
}

/// Same rule the contract applies; `None` until both moves are in.
pub fn judge(move1: Move, move2: Move) -> Option<Judgement> {
    if !move1.is_submitted() || !move2.is_submitted() {
        return None;
    }
    if move1 == move2 {
        Some(Judgement::Draw)
    } else if move1.beats(move2) {
        Some(Judgement::Player1Wins)
    } else {
        Some(Judgement::Player2Wins)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "address", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Winner {
    Draw,
    Player(Address),
}

// ==================== GAME ====================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Game {
    pub id: u64,
    pub player1: Address,
    pub player2: Address,
    pub move1: Move,
    pub move2: Move,
    pub status: GameStatus,
    /// Only set once the game is finished; the zero address means a draw.
    pub winner: Option<Address>,
}

impl Game {
    /// Decodes the `(address,address,uint64,uint64,uint64,address)` box record.
    pub fn from_box(id: u64, data: &[u8]) -> Result<Self> {
        if data.len() != GAME_BOX_SIZE {
            return Err(AppError::RemoteFailure(format!(
                "Game record has {} bytes, expected {}",
                data.len(),
                GAME_BOX_SIZE
            )));
        }
        let player1 = decode_address(&data[0..32])?;
        let player2 = decode_address(&data[32..64])?;
        let move1_code = decode_uint64(&data[64..72])?;
        let move2_code = decode_uint64(&data[72..80])?;
        let status_code = decode_uint64(&data[80..88])?;
        let winner = decode_address(&data[88..120])?;

        let move1 = Move::from_code(move1_code)
            .ok_or_else(|| AppError::RemoteFailure(format!("Unknown move code {move1_code}")))?;
        let move2 = Move::from_code(move2_code)
            .ok_or_else(|| AppError::RemoteFailure(format!("Unknown move code {move2_code}")))?;
        let status = GameStatus::from_code(status_code)
            .ok_or_else(|| AppError::RemoteFailure(format!("Unknown status code {status_code}")))?;

        Ok(Self {
            id,
            player1,
            player2,
            move1,
            move2,
            status,
            winner: (status == GameStatus::Finished).then_some(winner),
        })
    }

    pub fn has_opponent(&self) -> bool {
        !self.player2.is_zero()
    }

    pub fn winner(&self) -> Option<Winner> {
        let winner = self.winner?;
        Some(if winner.is_zero() {
            Winner::Draw
        } else {
            Winner::Player(winner)
        })
    }

    /// Move slot belonging to `role`, if it is a player.
    pub fn move_of(&self, role: Role) -> Option<Move> {
        match role {
            Role::Player1 => Some(self.move1),
            Role::Player2 => Some(self.move2),
            Role::Spectator => None,
        }
    }

    /// Wording of the contract's `get_game_status`.
    pub fn status_message(&self) -> &'static str {
        match self.status {
            GameStatus::Waiting => "Waiting for player 2",
            GameStatus::Ongoing => "Game ongoing",
            GameStatus::Finished => match self.winner() {
                Some(Winner::Player(_)) => "Game finished - Winner declared!",
                _ => "Game finished - Draw!",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: u64, move1: u64, move2: u64, winner: Address) -> Vec<u8> {
        let mut data = Vec::with_capacity(GAME_BOX_SIZE);
        data.extend_from_slice(&[1u8; 32]);
        data.extend_from_slice(&[2u8; 32]);
        data.extend_from_slice(&move1.to_be_bytes());
        data.extend_from_slice(&move2.to_be_bytes());
        data.extend_from_slice(&status.to_be_bytes());
        data.extend_from_slice(winner.as_bytes());
        data
    }

    #[test]
    fn judge_is_draw_on_equal_moves() {
        for m in Move::PLAYABLE {
            assert_eq!(judge(m, m), Some(Judgement::Draw));
        }
    }

    #[test]
    fn judge_is_antisymmetric_with_exactly_one_winner() {
        for a in Move::PLAYABLE {
            for b in Move::PLAYABLE {
                if a == b {
                    continue;
                }
                assert!(a.beats(b) ^ b.beats(a), "{a:?} vs {b:?}");
                let forward = judge(a, b).unwrap();
                let backward = judge(b, a).unwrap();
                match forward {
                    Judgement::Player1Wins => assert_eq!(backward, Judgement::Player2Wins),
                    Judgement::Player2Wins => assert_eq!(backward, Judgement::Player1Wins),
                    Judgement::Draw => panic!("distinct moves cannot draw"),
                }
            }
        }
    }

    #[test]
    fn judge_waits_for_both_moves() {
        assert_eq!(judge(Move::Rock, Move::None), None);
        assert_eq!(judge(Move::None, Move::None), None);
    }

    #[test]
    fn playable_accepts_only_one_to_three() {
        assert_eq!(Move::playable(1).unwrap(), Move::Rock);
        assert_eq!(Move::playable(3).unwrap(), Move::Scissors);
        assert!(matches!(Move::playable(0), Err(AppError::InvalidInput(_))));
        assert!(matches!(Move::playable(4), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn random_move_is_always_playable() {
        for _ in 0..32 {
            assert!(Move::random().is_submitted());
        }
    }

    #[test]
    fn status_order_is_forward_only() {
        assert!(GameStatus::Waiting < GameStatus::Ongoing);
        assert!(GameStatus::Ongoing < GameStatus::Finished);
        assert_eq!(GameStatus::from_code(2), Some(GameStatus::Finished));
        assert_eq!(GameStatus::from_code(3), None);
    }

    #[test]
    fn from_box_hides_winner_until_finished() {
        let ongoing = Game::from_box(1, &record(1, 1, 0, Address::ZERO)).unwrap();
        assert_eq!(ongoing.status, GameStatus::Ongoing);
        assert_eq!(ongoing.move1, Move::Rock);
        assert_eq!(ongoing.winner, None);
        assert_eq!(ongoing.status_message(), "Game ongoing");

        let finished = Game::from_box(2, &record(2, 1, 3, Address([1u8; 32]))).unwrap();
        assert_eq!(finished.winner(), Some(Winner::Player(Address([1u8; 32]))));
        assert_eq!(finished.status_message(), "Game finished - Winner declared!");

        let draw = Game::from_box(3, &record(2, 2, 2, Address::ZERO)).unwrap();
        assert_eq!(draw.winner(), Some(Winner::Draw));
        assert_eq!(draw.status_message(), "Game finished - Draw!");
    }

    #[test]
    fn from_box_rejects_bad_records() {
        assert!(Game::from_box(1, &[0u8; 10]).is_err());
        assert!(Game::from_box(1, &record(7, 0, 0, Address::ZERO)).is_err());
        assert!(Game::from_box(1, &record(1, 9, 0, Address::ZERO)).is_err());
    }

    #[test]
    fn labels_match_room_wording() {
        assert_eq!(Move::None.label(), "Not Submitted");
        assert_eq!(Move::Paper.label(), "Paper");
        assert_eq!(GameStatus::Waiting.label(), "Waiting for Player 2");
    }
}
