//! Game-room view-model.
//!
//! Holds a possibly stale snapshot of one game plus the viewer's address and
//! derives everything the room needs to render: the viewer's seat, whether a
//! move may be submitted and, once finished, the local win/lose/draw mirror of
//! the contract's rule. Reads and writes go through the [`GameReader`] and
//! [`MoveSubmitter`] ports so the contract adapter and the fixture source are
//! interchangeable.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::chain::Address;
use crate::constants::ERROR_MESSAGES;
use crate::error::{AppError, Result};
use crate::models::{judge, Game, GameStatus, Judgement, Move, Outcome, Role, TxReceipt};
use crate::utils::format_address;

/// Read port: current snapshot of a game, or `NotFound`.
#[async_trait::async_trait]
pub trait GameReader: Send + Sync {
    async fn load_game(&self, game_id: u64) -> Result<Game>;
}

/// Write port: sends a move on behalf of the connected account.
#[async_trait::async_trait]
pub trait MoveSubmitter: Send + Sync {
    /// Account the move is sent from.
    fn viewer(&self) -> Address;

    async fn submit_move(&self, game_id: u64, mv: Move) -> Result<TxReceipt>;
}

pub fn viewer_role(game: &Game, viewer: &Address) -> Role {
    if *viewer == game.player1 {
        Role::Player1
    } else if !viewer.is_zero() && *viewer == game.player2 {
        Role::Player2
    } else {
        Role::Spectator
    }
}

pub fn can_submit_move(game: &Game, role: Role) -> bool {
    game.status == GameStatus::Ongoing
        && game.move_of(role).is_some_and(|mv| !mv.is_submitted())
}

/// Local mirror of the contract's rule; never authoritative.
pub fn compute_outcome(game: &Game, role: Role) -> Outcome {
    if game.status != GameStatus::Finished {
        return Outcome::Undetermined;
    }
    match (judge(game.move1, game.move2), role) {
        (Some(Judgement::Draw), _) => Outcome::Draw,
        (Some(Judgement::Player1Wins), Role::Player1) => Outcome::Win,
        (Some(Judgement::Player1Wins), Role::Player2) => Outcome::Lose,
        (Some(Judgement::Player2Wins), Role::Player1) => Outcome::Lose,
        (Some(Judgement::Player2Wins), Role::Player2) => Outcome::Win,
        _ => Outcome::Undetermined,
    }
}

/// Why a viewer may not move right now.
fn submit_blocker(game: &Game, role: Role) -> AppError {
    if !role.is_player() {
        AppError::InvalidInput(ERROR_MESSAGES.not_a_player.to_string())
    } else if game.status != GameStatus::Ongoing {
        AppError::InvalidInput(ERROR_MESSAGES.game_not_ongoing.to_string())
    } else {
        AppError::InvalidInput(ERROR_MESSAGES.move_already_submitted.to_string())
    }
}

fn outcome_text(outcome: Outcome) -> Option<&'static str> {
    match outcome {
        Outcome::Win => Some("YOU WIN!"),
        Outcome::Lose => Some("YOU LOSE!"),
        Outcome::Draw => Some("DRAW!"),
        Outcome::Undetermined => None,
    }
}

fn waiting_banner(game: &Game, role: Role, can_submit: bool) -> Option<&'static str> {
    if can_submit || game.status == GameStatus::Finished {
        return None;
    }
    match game.move_of(role) {
        None => Some("Spectating..."),
        Some(mv) if mv.is_submitted() => Some("Waiting for opponent..."),
        Some(_) => Some("Game is full"),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerSeat {
    pub address: Address,
    pub display: String,
    pub is_you: bool,
    pub move_label: &'static str,
}

/// Everything the room renders for one viewer.
#[derive(Debug, Clone, Serialize)]
pub struct RoomView {
    pub game: Game,
    pub role: Role,
    pub status_label: &'static str,
    pub player1: PlayerSeat,
    pub player2: PlayerSeat,
    pub can_submit_move: bool,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_text: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<&'static str>,
    pub processing: bool,
}

impl RoomView {
    pub fn build(game: &Game, viewer: Option<&Address>, processing: bool) -> Self {
        let role = viewer
            .map(|v| viewer_role(game, v))
            .unwrap_or(Role::Spectator);
        let can_submit = can_submit_move(game, role);
        let outcome = compute_outcome(game, role);
        Self {
            game: game.clone(),
            role,
            status_label: game.status.label(),
            player1: PlayerSeat {
                address: game.player1,
                display: format_address(&game.player1),
                is_you: role == Role::Player1,
                move_label: game.move1.label(),
            },
            player2: PlayerSeat {
                address: game.player2,
                display: format_address(&game.player2),
                is_you: role == Role::Player2,
                move_label: game.move2.label(),
            },
            can_submit_move: can_submit,
            outcome,
            result_text: outcome_text(outcome),
            banner: waiting_banner(game, role, can_submit),
            processing,
        }
    }
}

#[derive(Default)]
struct RoomState {
    snapshot: Option<Game>,
    processing: bool,
}

pub struct RoomViewModel {
    game_id: u64,
    viewer: Option<Address>,
    reader: Arc<dyn GameReader>,
    submitter: Option<Arc<dyn MoveSubmitter>>,
    state: Mutex<RoomState>,
}

impl RoomViewModel {
    /// `submitter` is `None` when no wallet is connected.
    pub fn new(
        game_id: u64,
        viewer: Option<Address>,
        reader: Arc<dyn GameReader>,
        submitter: Option<Arc<dyn MoveSubmitter>>,
    ) -> Self {
        Self {
            game_id,
            viewer,
            reader,
            submitter,
            state: Mutex::new(RoomState::default()),
        }
    }

    pub fn game_id(&self) -> u64 {
        self.game_id
    }

    pub async fn snapshot(&self) -> Option<Game> {
        self.state.lock().await.snapshot.clone()
    }

    pub async fn is_processing(&self) -> bool {
        self.state.lock().await.processing
    }

    /// Fetches a fresh snapshot, replacing the held one.
    ///
    /// A snapshot whose status is behind the held one comes from a lagging
    /// node and is dropped.
    pub async fn refresh(&self) -> Result<Game> {
        let fresh = self.reader.load_game(self.game_id).await?;
        let mut state = self.state.lock().await;
        match &state.snapshot {
            Some(held) if fresh.status < held.status => {
                tracing::warn!(
                    "Ignoring stale snapshot of game {} ({:?} < {:?})",
                    self.game_id,
                    fresh.status,
                    held.status
                );
                Ok(held.clone())
            }
            _ => {
                state.snapshot = Some(fresh.clone());
                Ok(fresh)
            }
        }
    }

    pub async fn view(&self) -> Option<RoomView> {
        let state = self.state.lock().await;
        state
            .snapshot
            .as_ref()
            .map(|game| RoomView::build(game, self.viewer.as_ref(), state.processing))
    }

    /// Validates and sends a move given as its numeric code.
    ///
    /// Codes outside 1..=3 fail before any remote call. On success the
    /// viewer's own slot is set locally until the next refresh.
    pub async fn submit_move(&self, code: u64) -> Result<TxReceipt> {
        let mv = Move::playable(code)?;
        let submitter = self.submitter.clone().ok_or(AppError::NotConnected)?;

        if self.state.lock().await.snapshot.is_none() {
            self.refresh().await?;
        }

        let role = {
            let mut state = self.state.lock().await;
            if state.processing {
                return Err(AppError::OperationInProgress);
            }
            let game = state
                .snapshot
                .as_ref()
                .ok_or_else(|| AppError::NotFound(ERROR_MESSAGES.game_not_found.to_string()))?;
            let role = viewer_role(game, &submitter.viewer());
            if !can_submit_move(game, role) {
                return Err(submit_blocker(game, role));
            }
            state.processing = true;
            role
        };

        tracing::info!(
            "Submitting {} for game {} as {:?}",
            mv.label(),
            self.game_id,
            role
        );
        let result = submitter.submit_move(self.game_id, mv).await;

        let mut state = self.state.lock().await;
        state.processing = false;
        match result {
            Ok(receipt) => {
                if let Some(game) = state.snapshot.as_mut() {
                    match role {
                        Role::Player1 => game.move1 = mv,
                        Role::Player2 => game.move2 = mv,
                        Role::Spectator => {}
                    }
                }
                Ok(receipt)
            }
            Err(e) => {
                tracing::error!("Move submission for game {} failed: {}", self.game_id, e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures::{FixtureGames, PLAYER_ONE, PLAYER_TWO};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    fn game(status: GameStatus, move1: Move, move2: Move) -> Game {
        Game {
            id: 9,
            player1: PLAYER_ONE,
            player2: PLAYER_TWO,
            move1,
            move2,
            status,
            winner: None,
        }
    }

    struct CountingSubmitter {
        viewer: Address,
        calls: AtomicUsize,
        fail_with: Option<&'static str>,
    }

    impl CountingSubmitter {
        fn new(viewer: Address) -> Self {
            Self {
                viewer,
                calls: AtomicUsize::new(0),
                fail_with: None,
            }
        }
    }

    #[async_trait::async_trait]
    impl MoveSubmitter for CountingSubmitter {
        fn viewer(&self) -> Address {
            self.viewer
        }

        async fn submit_move(&self, _game_id: u64, _mv: Move) -> Result<TxReceipt> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(message) = self.fail_with {
                return Err(AppError::remote(message));
            }
            Ok(TxReceipt {
                tx_id: "TXID".to_string(),
                confirmed_round: 10,
                sender: self.viewer,
                return_message: Some("Move submitted! Waiting for opponent...".to_string()),
            })
        }
    }

    /// Holds the submission open until released.
    struct GatedSubmitter {
        viewer: Address,
        entered: Notify,
        release: Notify,
    }

    #[async_trait::async_trait]
    impl MoveSubmitter for GatedSubmitter {
        fn viewer(&self) -> Address {
            self.viewer
        }

        async fn submit_move(&self, _game_id: u64, _mv: Move) -> Result<TxReceipt> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(TxReceipt {
                tx_id: "GATED".to_string(),
                confirmed_round: 1,
                sender: self.viewer,
                return_message: None,
            })
        }
    }

    struct SequenceReader {
        snapshots: std::sync::Mutex<Vec<Game>>,
    }

    #[async_trait::async_trait]
    impl GameReader for SequenceReader {
        async fn load_game(&self, _game_id: u64) -> Result<Game> {
            let mut snapshots = self.snapshots.lock().unwrap();
            Ok(if snapshots.len() > 1 {
                snapshots.remove(0)
            } else {
                snapshots[0].clone()
            })
        }
    }

    fn room(game_id: u64, submitter: Arc<CountingSubmitter>) -> RoomViewModel {
        RoomViewModel::new(
            game_id,
            Some(submitter.viewer),
            Arc::new(FixtureGames::new()),
            Some(submitter as Arc<dyn MoveSubmitter>),
        )
    }

    #[test]
    fn cannot_submit_unless_ongoing() {
        for status in [GameStatus::Waiting, GameStatus::Finished] {
            for role in [Role::Player1, Role::Player2, Role::Spectator] {
                assert!(!can_submit_move(&game(status, Move::None, Move::None), role));
            }
        }
        assert!(can_submit_move(
            &game(GameStatus::Ongoing, Move::None, Move::None),
            Role::Player2
        ));
        assert!(!can_submit_move(
            &game(GameStatus::Ongoing, Move::None, Move::None),
            Role::Spectator
        ));
    }

    #[test]
    fn player_who_moved_cannot_move_again() {
        let g = game(GameStatus::Ongoing, Move::Rock, Move::None);
        assert_eq!(viewer_role(&g, &PLAYER_ONE), Role::Player1);
        assert!(!can_submit_move(&g, Role::Player1));
        assert!(can_submit_move(&g, Role::Player2));
        assert_eq!(compute_outcome(&g, Role::Player1), Outcome::Undetermined);
    }

    #[test]
    fn finished_rock_beats_scissors() {
        let g = game(GameStatus::Finished, Move::Rock, Move::Scissors);
        assert_eq!(compute_outcome(&g, Role::Player1), Outcome::Win);
        assert_eq!(compute_outcome(&g, Role::Player2), Outcome::Lose);
        assert_eq!(compute_outcome(&g, Role::Spectator), Outcome::Undetermined);
    }

    #[test]
    fn finished_equal_moves_draw_for_everyone() {
        let g = game(GameStatus::Finished, Move::Paper, Move::Paper);
        assert_eq!(compute_outcome(&g, Role::Player1), Outcome::Draw);
        assert_eq!(compute_outcome(&g, Role::Player2), Outcome::Draw);
        assert_eq!(compute_outcome(&g, Role::Spectator), Outcome::Draw);
    }

    #[test]
    fn waiting_game_treats_strangers_as_spectators() {
        let mut g = game(GameStatus::Waiting, Move::None, Move::None);
        g.player2 = Address::ZERO;
        let stranger = Address([9u8; 32]);
        let role = viewer_role(&g, &stranger);
        assert_eq!(role, Role::Spectator);
        assert!(!can_submit_move(&g, role));
        // The empty seat never matches the zero address.
        assert_eq!(viewer_role(&g, &Address::ZERO), Role::Spectator);
    }

    #[test]
    fn viewer_role_ignores_address_case() {
        let g = game(GameStatus::Ongoing, Move::None, Move::None);
        let lowered: Address = PLAYER_TWO.to_string().to_lowercase().parse().unwrap();
        assert_eq!(viewer_role(&g, &lowered), Role::Player2);
    }

    #[test]
    fn room_view_banners_follow_seat() {
        let g = game(GameStatus::Ongoing, Move::Rock, Move::None);
        let mine = RoomView::build(&g, Some(&PLAYER_ONE), false);
        assert_eq!(mine.banner, Some("Waiting for opponent..."));
        assert!(mine.player1.is_you);
        assert_eq!(mine.player2.move_label, "Not Submitted");

        let watcher = RoomView::build(&g, None, false);
        assert_eq!(watcher.banner, Some("Spectating..."));

        let finished = game(GameStatus::Finished, Move::Rock, Move::Scissors);
        let view = RoomView::build(&finished, Some(&PLAYER_ONE), false);
        assert_eq!(view.banner, None);
        assert_eq!(view.result_text, Some("YOU WIN!"));
    }

    #[tokio::test]
    async fn load_missing_game_is_not_found() {
        let submitter = Arc::new(CountingSubmitter::new(PLAYER_ONE));
        let vm = room(42, submitter);
        assert!(matches!(vm.refresh().await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn out_of_range_moves_never_reach_the_submitter() {
        let submitter = Arc::new(CountingSubmitter::new(PLAYER_TWO));
        let vm = room(1, submitter.clone());
        vm.refresh().await.unwrap();
        for code in [0, 4] {
            assert!(matches!(
                vm.submit_move(code).await,
                Err(AppError::InvalidInput(_))
            ));
        }
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn successful_move_updates_own_slot_optimistically() {
        let submitter = Arc::new(CountingSubmitter::new(PLAYER_TWO));
        let vm = room(1, submitter.clone());
        vm.refresh().await.unwrap();

        let receipt = vm.submit_move(2).await.unwrap();
        assert_eq!(receipt.sender, PLAYER_TWO);
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 1);

        let snapshot = vm.snapshot().await.unwrap();
        assert_eq!(snapshot.move2, Move::Paper);
        assert_eq!(snapshot.move1, Move::Rock);
        assert!(!vm.is_processing().await);

        // Second attempt is blocked locally.
        assert!(vm.submit_move(1).await.is_err());
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 1);

        // Refresh discards the optimistic slot.
        let fresh = vm.refresh().await.unwrap();
        assert_eq!(fresh.move2, Move::None);
    }

    #[tokio::test]
    async fn player_who_already_moved_is_rejected_without_remote_call() {
        let submitter = Arc::new(CountingSubmitter::new(PLAYER_ONE));
        let vm = room(1, submitter.clone());
        let err = vm.submit_move(3).await.unwrap_err();
        assert_eq!(err.user_message(), ERROR_MESSAGES.move_already_submitted);
        assert_eq!(submitter.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn spectator_and_disconnected_viewers_cannot_move() {
        let stranger = Arc::new(CountingSubmitter::new(Address([9u8; 32])));
        let vm = room(1, stranger.clone());
        assert!(matches!(
            vm.submit_move(1).await,
            Err(AppError::InvalidInput(_))
        ));
        assert_eq!(stranger.calls.load(Ordering::SeqCst), 0);

        let disconnected =
            RoomViewModel::new(1, None, Arc::new(FixtureGames::new()), None);
        assert!(matches!(
            disconnected.submit_move(1).await,
            Err(AppError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn remote_failures_keep_their_category_and_clear_processing() {
        let mut failing = CountingSubmitter::new(PLAYER_TWO);
        failing.fail_with = Some("transaction rejected by user");
        let submitter = Arc::new(failing);
        let vm = room(1, submitter.clone());

        assert!(matches!(vm.submit_move(1).await, Err(AppError::Rejected)));
        assert!(!vm.is_processing().await);
        assert_eq!(vm.snapshot().await.unwrap().move2, Move::None);
    }

    #[tokio::test]
    async fn concurrent_submission_is_refused_while_processing() {
        let submitter = Arc::new(GatedSubmitter {
            viewer: PLAYER_TWO,
            entered: Notify::new(),
            release: Notify::new(),
        });
        let vm = Arc::new(RoomViewModel::new(
            1,
            Some(PLAYER_TWO),
            Arc::new(FixtureGames::new()),
            Some(submitter.clone() as Arc<dyn MoveSubmitter>),
        ));
        vm.refresh().await.unwrap();

        let first = tokio::spawn({
            let vm = vm.clone();
            async move { vm.submit_move(1).await }
        });
        submitter.entered.notified().await;

        assert!(vm.is_processing().await);
        assert!(matches!(
            vm.submit_move(2).await,
            Err(AppError::OperationInProgress)
        ));

        submitter.release.notify_one();
        let receipt = first.await.unwrap().unwrap();
        assert_eq!(receipt.tx_id, "GATED");
        assert_eq!(vm.snapshot().await.unwrap().move2, Move::Rock);
    }

    #[tokio::test]
    async fn refresh_ignores_status_regression() {
        let reader = Arc::new(SequenceReader {
            snapshots: std::sync::Mutex::new(vec![
                game(GameStatus::Finished, Move::Rock, Move::Paper),
                game(GameStatus::Ongoing, Move::Rock, Move::None),
            ]),
        });
        let vm = RoomViewModel::new(9, Some(PLAYER_ONE), reader, None);
        assert_eq!(vm.refresh().await.unwrap().status, GameStatus::Finished);
        assert_eq!(vm.refresh().await.unwrap().status, GameStatus::Finished);
        let view = vm.view().await.unwrap();
        assert_eq!(view.outcome, Outcome::Lose);
    }
}
