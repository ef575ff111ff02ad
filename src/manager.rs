// src/manager.rs
use crate::command::{CommandManager, MoveCommand};
use crate::error::{GameError, PersistError};
use crate::game::{Game, GameState, MoveResult};
use crate::persist;
use crate::piece::PieceKind;
use crate::spot::Spot;

/// Change events for a front-end, drained with [`GameManager::take_notifications`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    BoardUpdated,
    /// A pawn on this square waits for [`GameManager::promote_pawn`].
    PromotionRequested(Spot),
    GameStateChanged(GameState),
    LogsUpdated,
}

/// One game plus its undo/redo history. Front-ends talk to this instead of `Game`.
#[derive(Debug, Default)]
pub struct GameManager {
    game: Game,
    history: CommandManager,
    notifications: Vec<Notification>,
}

impl GameManager {
    pub fn new() -> Self { GameManager::default() }

    pub fn game(&self) -> &Game { &self.game }

    /// Mutable access for queries that refresh cached legal moves.
    pub fn game_mut(&mut self) -> &mut Game { &mut self.game }

    pub fn set_player_names(&mut self, white: &str, black: &str) -> Result<(), GameError> {
        self.game.set_player_names(white, black)
    }

    pub fn start_new_game(&mut self) -> Result<(), GameError> {
        let snapshot = self.mark();
        self.game.start_new_game()?;
        self.history.reset();
        self.publish(snapshot, true);
        Ok(())
    }

    pub fn move_piece(&mut self, from: &str, to: &str) -> MoveResult {
        let snapshot = self.mark();
        let result = self.history.invoke(MoveCommand::new(from, to), &mut self.game);
        self.publish(snapshot, result.is_success());
        result
    }

    /// Completes a pending promotion. `kind` is a piece name such as "QUEEN" or a letter such as "n".
    pub fn promote_pawn(&mut self, kind: &str) -> Result<String, GameError> {
        let kind: PieceKind = kind.parse()?;
        let snapshot = self.mark();
        let square = self.game.promote_pawn(kind)?;
        self.history.record_promotion(kind);
        self.publish(snapshot, true);
        Ok(square)
    }

    pub fn undo(&mut self) -> bool {
        let snapshot = self.mark();
        let undone = self.history.undo(&mut self.game);
        self.publish(snapshot, undone);
        undone
    }

    pub fn redo(&mut self) -> bool {
        let snapshot = self.mark();
        let redone = self.history.redo(&mut self.game);
        self.publish(snapshot, redone);
        redone
    }

    pub fn can_undo(&self) -> bool { self.history.can_undo() }
    pub fn can_redo(&self) -> bool { self.history.can_redo() }

    pub fn export_game(&self) -> String { self.game.export_game() }

    pub fn import_game(&mut self, text: &str) -> Result<(), GameError> {
        let snapshot = self.mark();
        self.game.import_game(text)?;
        self.history.reset();
        self.publish(snapshot, true);
        Ok(())
    }

    pub fn save_game(&self, filename: &str) -> Result<String, PersistError> {
        persist::save_game(&self.game, filename)
    }

    pub fn load_game(&mut self, filename: &str) -> Result<(), PersistError> {
        let snapshot = self.mark();
        self.game = persist::load_game(filename)?;
        self.history.reset();
        self.publish(snapshot, true);
        Ok(())
    }

    pub fn export_to_file(&self, filename: &str) -> Result<String, PersistError> {
        persist::export_to_file(&self.game, filename)
    }

    pub fn import_from_file(&mut self, filename: &str) -> Result<(), PersistError> {
        let snapshot = self.mark();
        persist::import_from_file(&mut self.game, filename)?;
        self.history.reset();
        self.publish(snapshot, true);
        Ok(())
    }

    /// Pending notifications, oldest first. The queue is left empty.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    // --- Notification helpers ---

    fn mark(&self) -> (GameState, usize) {
        (self.game.game_state(), self.game.log().len())
    }

    fn publish(&mut self, (state_before, log_len_before): (GameState, usize), board_changed: bool) {
        if board_changed {
            self.notifications.push(Notification::BoardUpdated);
        }
        if let Some(spot) = self.game.pending_promotion() {
            if board_changed {
                self.notifications.push(Notification::PromotionRequested(spot));
            }
        }
        let state = self.game.game_state();
        if state != state_before {
            self.notifications.push(Notification::GameStateChanged(state));
        }
        if self.game.log().len() != log_len_before {
            self.notifications.push(Notification::LogsUpdated);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Color;

    fn manager() -> GameManager {
        let mut manager = GameManager::new();
        manager.set_player_names("Ana", "Rui").unwrap();
        manager.start_new_game().unwrap();
        manager.take_notifications();
        manager
    }

    #[test]
    fn moves_publish_board_and_log_updates() {
        let mut manager = manager();
        assert_eq!(manager.move_piece("e2", "e4"), MoveResult::Valid);
        assert_eq!(manager.take_notifications(), vec![Notification::BoardUpdated, Notification::LogsUpdated]);

        assert_eq!(manager.move_piece("e2", "e4"), MoveResult::InvalidOrigin);
        assert_eq!(manager.take_notifications(), vec![Notification::LogsUpdated]);
        assert!(manager.take_notifications().is_empty());
    }

    #[test]
    fn promotion_is_requested_and_recorded_for_redo() {
        let mut manager = manager();
        manager.import_game("WHITE,Pb7,Ke1,kh8").unwrap();
        manager.take_notifications();

        assert_eq!(manager.move_piece("b7", "b8"), MoveResult::Promotion);
        let square = Spot::from_notation("b8").unwrap();
        assert!(manager.take_notifications().contains(&Notification::PromotionRequested(square)));

        assert!(matches!(manager.promote_pawn("king"), Err(GameError::InvalidPromotion(_))));
        assert_eq!(manager.promote_pawn("n").unwrap(), "b8");
        let after = manager.export_game();
        let log_len = manager.game().log().len();

        assert!(manager.undo());
        assert_eq!(manager.export_game(), "WHITE,Pb7,Ke1,kh8");
        assert!(manager.redo());
        assert_eq!(manager.export_game(), after);
        assert!(after.contains("Nb8"));
        assert_eq!(manager.game().log().len(), log_len);
    }

    #[test]
    fn loaded_save_can_finish_a_pending_promotion() {
        let path = std::env::temp_dir().join(format!("chess_rules_{}_pending", std::process::id()));
        let mut manager = manager();
        manager.import_game("WHITE,Pb7,Ke1,kh8").unwrap();
        assert_eq!(manager.move_piece("b7", "b8"), MoveResult::Promotion);
        let written = manager.save_game(path.to_str().unwrap()).unwrap();

        let mut restored = GameManager::new();
        restored.load_game(&written).unwrap();
        assert_eq!(restored.game().pending_promotion(), Spot::from_notation("b8"));
        assert_eq!(restored.move_piece("e1", "e2"), MoveResult::InvalidMove);
        assert_eq!(restored.promote_pawn("q").unwrap(), "b8");
        assert_eq!(restored.game().piece_at(0, 1).as_deref(), Some("Qb8"));
        assert_eq!(restored.game().current_player_color(), Color::Black);

        std::fs::remove_file(&written).ok();
    }

    #[test]
    fn import_resets_history_and_reports_terminal_state() {
        let mut manager = manager();
        manager.move_piece("e2", "e4");
        assert!(manager.can_undo());

        manager.import_game("WHITE,kh8,Qg7,Kg6").unwrap();
        assert!(!manager.can_undo());
        assert!(manager.take_notifications()
            .contains(&Notification::GameStateChanged(GameState::CheckmateCurrentWins)));
        assert!(manager.import_game("WHITE,Qg7").is_err());
        assert_eq!(manager.game().game_state(), GameState::CheckmateCurrentWins);
    }
}
