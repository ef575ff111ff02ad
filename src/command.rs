// src/command.rs
use crate::game::{Game, GameState, MoveResult};
use crate::movegen;
use crate::piece::{Color, Piece, PieceId, PieceKind};
use crate::spot::Spot;

/// What a move did to the board beyond relocating the mover.
#[derive(Debug, Clone)]
enum MoveKind {
    Plain { captured: Option<PieceId> },
    Castling { rook: PieceId, rook_from: Spot, rook_moved: bool },
    EnPassant { captured: PieceId, captured_at: Spot },
    /// The pawn as it was before moving; the roster slot holds the promoted piece afterwards.
    Promotion { pawn: Piece, captured: Option<PieceId> },
}

// Everything needed to put the game back exactly as it was before `execute`.
#[derive(Debug, Clone)]
struct MoveRecord {
    mover: PieceId,
    start: Spot,
    end: Spot,
    mover_moved: bool,
    kind: MoveKind,
    turn_before: Color,
    state_before: GameState,
    last_move_before: Option<(Spot, Spot)>,
    result: MoveResult,
}

/// A reversible move request.
#[derive(Debug, Clone)]
pub struct MoveCommand {
    from: String,
    to: String,
    promotion: Option<PieceKind>,
    record: Option<MoveRecord>,
}

impl MoveCommand {
    pub fn new(from: &str, to: &str) -> Self {
        MoveCommand { from: from.to_string(), to: to.to_string(), promotion: None, record: None }
    }

    pub fn from(&self) -> &str { &self.from }
    pub fn to(&self) -> &str { &self.to }
    pub fn promotion_choice(&self) -> Option<PieceKind> { self.promotion }

    /// Result of the last successful execution.
    pub fn result(&self) -> Option<MoveResult> { self.record.as_ref().map(|r| r.result) }

    /// Remembers which piece the pawn became, so a redo can replay the promotion.
    pub fn set_promotion_choice(&mut self, kind: PieceKind) { self.promotion = Some(kind); }

    /// Plays the move through `game`. On success the command becomes undoable.
    pub fn execute(&mut self, game: &mut Game) -> MoveResult {
        self.record = None;
        let (Some(start), Some(end)) = (Spot::from_notation(&self.from), Spot::from_notation(&self.to)) else {
            return game.move_piece(&self.from, &self.to);
        };
        let Some(mover) = game.board().id_at(start).filter(|_| start.is_valid() && end.is_valid()) else {
            return game.move_piece(&self.from, &self.to);
        };

        let board = game.board();
        let before = board.piece(mover).clone();
        let captured = board.id_at(end);
        let en_passant = movegen::en_passant_victim(board, mover, end)
            .and_then(|id| board.piece(id).spot().map(|at| (id, at)));
        let castling = movegen::castling_rook(board, start, end)
            .map(|(rook, rook_from, _)| (rook, rook_from, board.piece(rook).has_moved()));
        let last_move_before = board.last_move();
        let turn_before = game.current_player_color();
        let state_before = game.game_state();

        let mut result = game.move_piece(&self.from, &self.to);
        if !result.is_success() {
            return result;
        }

        let kind = if let Some((captured, captured_at)) = en_passant {
            MoveKind::EnPassant { captured, captured_at }
        } else if let Some((rook, rook_from, rook_moved)) = castling {
            MoveKind::Castling { rook, rook_from, rook_moved }
        } else if before.kind() == PieceKind::Pawn && end.row == before.color().promotion_row() {
            MoveKind::Promotion { pawn: before.clone(), captured }
        } else {
            MoveKind::Plain { captured }
        };

        if result == MoveResult::Promotion {
            if let Some(choice) = self.promotion {
                if game.promote_pawn(choice).is_ok() {
                    result = game_result_after_promotion(game);
                }
            }
        }

        self.record = Some(MoveRecord {
            mover,
            start,
            end,
            mover_moved: before.has_moved(),
            kind,
            turn_before,
            state_before,
            last_move_before,
            result,
        });
        result
    }

    /// Reverts the last execution. False if there is nothing to revert.
    pub fn undo(&mut self, game: &mut Game) -> bool {
        let Some(record) = self.record.take() else { return false; };
        let board = game.board_mut();
        let mover = record.mover;

        match record.kind {
            MoveKind::Plain { captured } => {
                board.force_move(mover, record.start);
                if let Some(id) = captured { board.revive(id, record.end); }
            }
            MoveKind::Castling { rook, rook_from, rook_moved } => {
                board.force_move(mover, record.start);
                board.force_move(rook, rook_from);
                board.set_moved(rook, rook_moved);
            }
            MoveKind::EnPassant { captured, captured_at } => {
                board.force_move(mover, record.start);
                board.revive(captured, captured_at);
            }
            MoveKind::Promotion { pawn, captured } => {
                board.replace_piece(mover, pawn);
                board.force_move(mover, record.start);
                if let Some(id) = captured { board.revive(id, record.end); }
            }
        }
        board.set_moved(mover, record.mover_moved);
        board.set_last_move(record.last_move_before);

        game.set_pending_promotion(None);
        game.set_turn(record.turn_before);
        game.set_game_state(record.state_before);
        true
    }
}

fn game_result_after_promotion(game: &Game) -> MoveResult {
    match game.game_state() {
        GameState::CheckmateCurrentWins => MoveResult::CheckmateCurrentWins,
        GameState::CheckmateEnemyWins => MoveResult::CheckmateEnemyWins,
        GameState::Stalemate => MoveResult::Stalemate,
        _ => MoveResult::Promotion,
    }
}

/// Undo/redo stacks of executed moves.
#[derive(Debug, Clone, Default)]
pub struct CommandManager {
    done: Vec<MoveCommand>,
    undone: Vec<MoveCommand>,
}

impl CommandManager {
    pub fn new() -> Self { CommandManager::default() }

    /// Executes a command; successful ones go on the undo stack and clear the redo stack.
    pub fn invoke(&mut self, mut command: MoveCommand, game: &mut Game) -> MoveResult {
        let result = command.execute(game);
        if result.is_success() {
            self.done.push(command);
            self.undone.clear();
        }
        result
    }

    pub fn undo(&mut self, game: &mut Game) -> bool {
        let Some(mut command) = self.done.pop() else { return false; };
        if command.undo(game) {
            self.undone.push(command);
            true
        } else {
            false
        }
    }

    /// Replays the last undone move. The log keeps the lines of the original play only.
    pub fn redo(&mut self, game: &mut Game) -> bool {
        let Some(mut command) = self.undone.pop() else { return false; };
        let log_len = game.log().len();
        let result = command.execute(game);
        game.log_mut().truncate(log_len);
        if result.is_success() {
            self.done.push(command);
            true
        } else {
            false
        }
    }

    /// Attaches a promotion choice to the most recent move.
    pub fn record_promotion(&mut self, kind: PieceKind) {
        if let Some(last) = self.done.last_mut() {
            last.set_promotion_choice(kind);
        }
    }

    pub fn can_undo(&self) -> bool { !self.done.is_empty() }
    pub fn can_redo(&self) -> bool { !self.undone.is_empty() }

    /// Executed moves, oldest first.
    pub fn history(&self) -> &[MoveCommand] { &self.done }

    pub fn reset(&mut self) {
        self.done.clear();
        self.undone.clear();
    }
}
