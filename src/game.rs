// src/game.rs
use crate::attack::{is_in_check, king_under_attack};
use crate::board::{Board, MoveOutcome};
use crate::error::GameError;
use crate::log::EventLog;
use crate::movegen;
use crate::piece::{Color, Piece, PieceId, PieceKind};
use crate::player::Player;
use crate::spot::{Spot, BOARD_SIZE};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GameState {
    NotStarted,
    Running,
    /// The side to move when the game ended is the winner.
    CheckmateCurrentWins,
    /// The side not to move when the game ended is the winner.
    CheckmateEnemyWins,
    Stalemate,
}

impl GameState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GameState::CheckmateCurrentWins | GameState::CheckmateEnemyWins | GameState::Stalemate)
    }
}

/// Outcome tag of one move attempt.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MoveResult {
    InvalidMove,
    InvalidOrigin,
    OutOfBounds,
    Capture,
    Promotion,
    Castling,
    EnPassant,
    Valid,
    CheckmateCurrentWins,
    CheckmateEnemyWins,
    Stalemate,
}

impl MoveResult {
    /// True if the move was physically executed.
    pub fn is_success(&self) -> bool {
        !matches!(self, MoveResult::InvalidMove | MoveResult::InvalidOrigin | MoveResult::OutOfBounds)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, MoveResult::CheckmateCurrentWins | MoveResult::CheckmateEnemyWins | MoveResult::Stalemate)
    }
}

impl fmt::Display for MoveResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            MoveResult::InvalidMove => "invalid move",
            MoveResult::InvalidOrigin => "invalid origin",
            MoveResult::OutOfBounds => "out of bounds",
            MoveResult::Capture => "capture",
            MoveResult::Promotion => "promotion",
            MoveResult::Castling => "castling",
            MoveResult::EnPassant => "en passant",
            MoveResult::Valid => "valid move",
            MoveResult::CheckmateCurrentWins | MoveResult::CheckmateEnemyWins => "checkmate",
            MoveResult::Stalemate => "stalemate",
        };
        write!(f, "{}", text)
    }
}

/// Turn owner and move orchestrator for one game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    board: Board,
    turn: Color,
    state: GameState,
    /// Pawn that reached the last rank and waits for `promote_pawn`.
    pending_promotion: Option<PieceId>,
    white_name: Option<String>,
    black_name: Option<String>,
    log: EventLog,
}

impl Default for Game {
    fn default() -> Self { Game::new() }
}

impl Game {
    /// A game with no pieces in the `NotStarted` state.
    pub fn new() -> Self {
        Game {
            board: Board::new(),
            turn: Color::White,
            state: GameState::NotStarted,
            pending_promotion: None,
            white_name: None,
            black_name: None,
            log: EventLog::new(),
        }
    }

    // --- Players ---

    pub fn set_player_names(&mut self, white: &str, black: &str) -> Result<(), GameError> {
        if white.trim().is_empty() { return Err(GameError::InvalidPlayerName(Color::White)); }
        if black.trim().is_empty() { return Err(GameError::InvalidPlayerName(Color::Black)); }
        self.white_name = Some(white.trim().to_string());
        self.black_name = Some(black.trim().to_string());
        Ok(())
    }

    pub fn player_name(&self, color: Color) -> Option<&str> {
        match color {
            Color::White => self.white_name.as_deref(),
            Color::Black => self.black_name.as_deref(),
        }
    }

    pub fn player(&self, color: Color) -> Player {
        Player::from_board(&self.board, color, self.player_name(color))
    }

    pub fn current_player_color(&self) -> Color { self.turn }

    pub fn current_player_name(&self) -> String {
        self.player(self.turn).display_name().to_string()
    }

    pub fn enemy_player_name(&self) -> String {
        self.player(self.turn.opponent()).display_name().to_string()
    }

    // --- Lifecycle ---

    /// Starts a fresh game. Both player names must be set first.
    pub fn start_new_game(&mut self) -> Result<(), GameError> {
        if self.white_name.is_none() || self.black_name.is_none() {
            return Err(GameError::MissingPlayerNames);
        }
        self.reset_game();
        Ok(())
    }

    /// Back to the opening position with White to move. Names are kept.
    pub fn reset_game(&mut self) {
        self.board = Board::initial();
        self.turn = Color::White;
        self.pending_promotion = None;
        self.state = GameState::Running;
    }

    pub fn game_state(&self) -> GameState { self.state }

    pub fn board(&self) -> &Board { &self.board }

    pub fn board_size(&self) -> i8 { BOARD_SIZE }

    pub fn log(&self) -> &EventLog { &self.log }

    pub fn pending_promotion(&self) -> Option<Spot> {
        self.pending_promotion.and_then(|id| self.board.piece(id).spot())
    }

    pub(crate) fn board_mut(&mut self) -> &mut Board { &mut self.board }
    pub(crate) fn set_game_state(&mut self, state: GameState) { self.state = state; }
    pub(crate) fn set_turn(&mut self, turn: Color) { self.turn = turn; }
    pub(crate) fn set_pending_promotion(&mut self, id: Option<PieceId>) { self.pending_promotion = id; }
    pub(crate) fn log_mut(&mut self) -> &mut EventLog { &mut self.log }

    /// Text rendering of the board, or `None` before a game exists.
    pub fn query_board(&self) -> Option<String> {
        if self.state == GameState::NotStarted && self.board.pieces().next().is_none() {
            return None;
        }
        Some(self.board.to_string())
    }

    // --- Moves ---

    fn move_lock_reason(&self) -> Option<&'static str> {
        if self.pending_promotion.is_some() { return Some("a pawn promotion is pending"); }
        match self.state {
            GameState::NotStarted => Some("the game has not started"),
            state if state.is_terminal() => Some("the game is over"),
            _ => None,
        }
    }

    /// Plays `from -> to` for the side to move (square notation, e.g. "e2", "e4").
    ///
    /// Board and turn are untouched unless the result is a success. A pawn reaching the
    /// last rank returns `Promotion` and keeps the turn until [`Game::promote_pawn`].
    pub fn move_piece(&mut self, from: &str, to: &str) -> MoveResult {
        if let Some(reason) = self.move_lock_reason() {
            self.log.add(format!("Move rejected: {} ({} to {})", reason, from, to));
            return MoveResult::InvalidMove;
        }

        let (start, end) = match (Spot::from_notation(from), Spot::from_notation(to)) {
            (Some(start), Some(end)) if start.is_valid() && end.is_valid() => (start, end),
            _ => {
                self.log.add(format!("Out of bounds: {} or {} is outside board", from, to));
                return MoveResult::OutOfBounds;
            }
        };

        let mover = match self.board.id_at(start) {
            Some(id) if self.board.piece(id).color() == self.turn => id,
            _ => {
                self.log.add(format!("Invalid origin: {} - No piece or wrong player", from));
                return MoveResult::InvalidOrigin;
            }
        };
        let mover_kind = self.board.piece(mover).kind();

        let executed = if let Some(victim) = movegen::en_passant_victim(&self.board, mover, end) {
            match self.board.move_piece(start, end) {
                MoveOutcome::Blocked => None,
                _ => {
                    self.board.kill(victim);
                    Some(MoveResult::EnPassant)
                }
            }
        } else if let Some((rook, _, rook_to)) = movegen::castling_rook(&self.board, start, end) {
            match self.board.move_piece(start, end) {
                MoveOutcome::Blocked => None,
                _ => {
                    self.board.force_move(rook, rook_to);
                    Some(MoveResult::Castling)
                }
            }
        } else {
            match self.board.move_piece(start, end) {
                MoveOutcome::Blocked => None,
                MoveOutcome::Moved => Some(MoveResult::Valid),
                MoveOutcome::MovedAndCaptured(_) => Some(MoveResult::Capture),
            }
        };

        let Some(outcome) = executed else {
            self.log.add(format!("Invalid move: {} to {}", from, to));
            return MoveResult::InvalidMove;
        };

        if mover_kind == PieceKind::Pawn && end.row == self.turn.promotion_row() {
            self.pending_promotion = Some(mover);
            self.log.add(format!("Promotion pending: {} to {}", start, end));
            return MoveResult::Promotion;
        }

        let result = self.finish_ply(outcome);
        let line = self.describe(result, start, end);
        self.log.add(line);
        result
    }

    /// Replaces the pending pawn with a new piece of `kind` and completes the ply.
    /// Returns the promotion square in notation.
    pub fn promote_pawn(&mut self, kind: PieceKind) -> Result<String, GameError> {
        if self.state != GameState::Running {
            return Err(GameError::NotRunning);
        }
        let id = self.pending_promotion.ok_or(GameError::NoPendingPromotion)?;
        if !kind.is_promotion_target() {
            return Err(GameError::InvalidPromotion(kind.name().to_string()));
        }
        let pawn = self.board.piece(id);
        let color = pawn.color();
        let spot = pawn.spot().ok_or(GameError::NoPendingPromotion)?;

        // Promoted pieces never castle.
        self.board.replace_piece(id, Piece::new(kind, color).with_moved(true));
        self.pending_promotion = None;

        let result = self.finish_ply(MoveResult::Promotion);
        let mut line = format!("Pawn promoted to {} at {}", kind.name(), spot);
        if result.is_terminal() {
            line = format!("{}. {}", line, self.terminal_message(result));
        }
        self.log.add(line);
        Ok(spot.to_notation())
    }

    /// Checks the side about to move for mate/stalemate; sets the terminal state or flips the turn.
    fn finish_ply(&mut self, outcome: MoveResult) -> MoveResult {
        if self.is_checkmate(false) {
            self.state = GameState::CheckmateCurrentWins;
            MoveResult::CheckmateCurrentWins
        } else if self.is_stalemate(false) {
            self.state = GameState::Stalemate;
            MoveResult::Stalemate
        } else {
            self.turn = self.turn.opponent();
            outcome
        }
    }

    fn terminal_message(&self, result: MoveResult) -> String {
        match result {
            MoveResult::CheckmateCurrentWins => format!("CHECKMATE! {} wins", self.current_player_name()),
            MoveResult::CheckmateEnemyWins => format!("CHECKMATE! {} wins", self.enemy_player_name()),
            _ => "STALEMATE! Game ends in draw".to_string(),
        }
    }

    fn describe(&self, result: MoveResult, start: Spot, end: Spot) -> String {
        match result {
            MoveResult::Capture => format!("Capture: {} takes {}", start, end),
            MoveResult::EnPassant => format!("En Passant: {} takes {}", start, end),
            MoveResult::Castling => {
                // Turn has already passed to the opponent.
                let side = if end.col > start.col { "kingside" } else { "queenside" };
                format!("{} castles {}", self.turn.opponent(), side)
            }
            MoveResult::Valid => format!("Valid move: {} to {}", start, end),
            terminal if terminal.is_terminal() => self.terminal_message(terminal),
            other => format!("{}: {} to {}", other, start, end),
        }
    }

    // --- Check / mate / stalemate ---

    fn target_color(&self, for_current_turn: bool) -> Color {
        if for_current_turn { self.turn } else { self.turn.opponent() }
    }

    /// Attack report for the king of `color` at its current square (zero if absent).
    pub fn king_under_attack(&self, color: Color) -> crate::attack::AttackReport {
        self.board.find_king(color)
            .and_then(|id| self.board.piece(id).spot())
            .map(|spot| king_under_attack(&self.board, spot, color))
            .unwrap_or_default()
    }

    /// Recomputes every alive piece of `color` and reports whether any can move.
    fn side_has_moves(&mut self, color: Color) -> bool {
        let player = self.player(color);
        for &id in player.alive() {
            if !self.board.calculate_legal_moves(id).is_empty() {
                return true;
            }
        }
        false
    }

    /// Mate test for the side to move (`true`) or the other side (`false`).
    pub fn is_checkmate(&mut self, for_current_turn: bool) -> bool {
        let color = self.target_color(for_current_turn);
        if self.player(color).king(&self.board).is_none() {
            debug_assert!(self.state == GameState::NotStarted, "{} king missing from roster", color);
            return false;
        }
        if !self.king_under_attack(color).is_attacked() {
            return false;
        }
        !self.side_has_moves(color)
    }

    /// Stalemate test for the side to move (`true`) or the other side (`false`).
    pub fn is_stalemate(&mut self, for_current_turn: bool) -> bool {
        let color = self.target_color(for_current_turn);
        if self.player(color).king(&self.board).is_none() {
            return false;
        }
        if self.king_under_attack(color).is_attacked() {
            return false;
        }
        !self.side_has_moves(color)
    }

    // --- Queries ---

    /// Notation of the piece on (row, col), e.g. `Ke1*`.
    pub fn piece_at(&self, row: i8, col: i8) -> Option<String> {
        self.board.piece_at(Spot::new(row, col)).map(|p| p.to_string())
    }

    pub fn legal_destinations(&mut self, row: i8, col: i8) -> Vec<String> {
        match self.board.id_at(Spot::new(row, col)) {
            Some(id) => self.board.calculate_legal_moves(id).iter().map(Spot::to_notation).collect(),
            None => Vec::new(),
        }
    }

    pub fn has_moves(&mut self, row: i8, col: i8) -> bool {
        !self.legal_destinations(row, col).is_empty()
    }

    /// Whether the piece on `from` can legally reach (row, col), using its cached moves.
    pub fn has_move(&self, from: Spot, row: i8, col: i8) -> bool {
        self.board.piece_at(from)
            .map_or(false, |p| p.legal_moves().contains(&Spot::new(row, col)))
    }

    pub fn legal_moves_string(&mut self, row: i8, col: i8) -> String {
        let Some(id) = self.board.id_at(Spot::new(row, col)) else {
            return "No piece at this position.".to_string();
        };
        let moves: Vec<String> = self.board.calculate_legal_moves(id).iter().map(Spot::to_notation).collect();
        format!("{} legal moves: {}", self.board.piece(id), moves.join(" ")).trim_end().to_string()
    }

    /// Every legal (from, to) pair for the side to move.
    pub fn all_legal_moves(&self) -> Vec<(Spot, Spot)> {
        movegen::all_legal_moves(&self.board, self.turn)
    }

    // --- Text export / import ---

    /// `WHITE,Ke1*,Rh1*,kc8`: side to move, then every living piece in roster order.
    pub fn export_game(&self) -> String {
        let mut tokens = vec![self.turn.side_token().to_string()];
        tokens.extend(self.board.pieces().filter(|(_, p)| p.is_alive()).map(|(_, p)| p.to_string()));
        tokens.join(",")
    }

    /// Rebuilds the position from an exported line and recomputes the terminal state.
    /// A pawn of the side to move standing on its last rank becomes the pending promotion.
    /// Nothing changes if the text is rejected.
    pub fn import_game(&mut self, text: &str) -> Result<(), GameError> {
        let mut parts = text.split(',').map(str::trim).filter(|s| !s.is_empty());
        let side = parts.next().ok_or_else(|| GameError::MalformedImport(text.to_string()))?;
        let turn = match side.to_ascii_uppercase().as_str() {
            "WHITE" => Color::White,
            "BLACK" => Color::Black,
            _ => return Err(GameError::MalformedImport(side.to_string())),
        };

        let mut board = Board::new();
        for token in parts {
            let (piece, spot) = Piece::from_token(token)?;
            if board.add_piece(piece, spot).is_none() {
                return Err(GameError::OccupiedSquare(spot.to_notation()));
            }
        }
        for color in [Color::White, Color::Black] {
            let kings = board.pieces()
                .filter(|(_, p)| p.color() == color && p.kind() == PieceKind::King)
                .count();
            match kings {
                0 => return Err(GameError::MissingKing(color)),
                1 => {}
                _ => return Err(GameError::DuplicateKing(color)),
            }
        }

        // A pawn of the side to move on its last rank was exported mid-promotion.
        let promoting = board.pieces()
            .find(|(_, p)| p.color() == turn && p.kind() == PieceKind::Pawn
                && p.spot().is_some_and(|s| s.row == turn.promotion_row()))
            .map(|(id, _)| id);

        let previous_board = std::mem::replace(&mut self.board, board);
        let previous = (self.turn, self.state, self.pending_promotion);
        self.turn = turn;
        self.pending_promotion = promoting;
        self.state = GameState::Running;

        if promoting.is_some() {
            return Ok(());
        }
        if self.is_checkmate(false) {
            self.state = GameState::CheckmateCurrentWins;
        } else if is_in_check(&self.board, turn.opponent()) {
            // The side to move could take the king.
            self.board = previous_board;
            (self.turn, self.state, self.pending_promotion) = previous;
            return Err(GameError::OpponentInCheck(turn.opponent()));
        } else if self.is_checkmate(true) {
            self.state = GameState::CheckmateEnemyWins;
        } else if self.is_stalemate(false) || self.is_stalemate(true) {
            self.state = GameState::Stalemate;
        }
        match self.state {
            GameState::CheckmateCurrentWins => {
                let line = self.terminal_message(MoveResult::CheckmateCurrentWins);
                self.log.add(line);
            }
            GameState::CheckmateEnemyWins => {
                let line = self.terminal_message(MoveResult::CheckmateEnemyWins);
                self.log.add(line);
            }
            GameState::Stalemate => self.log.add("STALEMATE! Game ends in draw"),
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> Game {
        let mut game = Game::new();
        game.set_player_names("Ana", "Rui").unwrap();
        game.start_new_game().unwrap();
        game
    }

    #[test]
    fn start_requires_names() {
        let mut game = Game::new();
        assert_eq!(game.start_new_game(), Err(GameError::MissingPlayerNames));
        assert_eq!(game.set_player_names("  ", "Rui"), Err(GameError::InvalidPlayerName(Color::White)));
        assert_eq!(game.set_player_names("Ana", ""), Err(GameError::InvalidPlayerName(Color::Black)));
        assert_eq!(game.game_state(), GameState::NotStarted);
        assert_eq!(game.move_piece("e2", "e4"), MoveResult::InvalidMove);
        assert!(game.query_board().is_none());
    }

    #[test]
    fn rejected_moves_keep_turn_and_board() {
        let mut game = started();
        let before = game.export_game();
        assert_eq!(game.move_piece("e2", "e5"), MoveResult::InvalidMove);
        assert_eq!(game.move_piece("e7", "e5"), MoveResult::InvalidOrigin);
        assert_eq!(game.move_piece("e3", "e4"), MoveResult::InvalidOrigin);
        assert_eq!(game.move_piece("i2", "e4"), MoveResult::OutOfBounds);
        assert_eq!(game.move_piece("e2", "e9"), MoveResult::OutOfBounds);
        assert_eq!(game.move_piece("??", "e4"), MoveResult::OutOfBounds);
        assert_eq!(game.current_player_color(), Color::White);
        assert_eq!(game.export_game(), before);
    }

    #[test]
    fn valid_move_flips_turn_and_logs() {
        let mut game = started();
        assert_eq!(game.move_piece("e2", "e4"), MoveResult::Valid);
        assert_eq!(game.current_player_color(), Color::Black);
        assert_eq!(game.log().last_message(), Some("Valid move: e2 to e4"));
        assert_eq!(game.piece_at(4, 4).as_deref(), Some("Pe4"));
        assert_eq!(game.move_piece("d7", "d5"), MoveResult::Valid);
        assert_eq!(game.move_piece("e4", "d5"), MoveResult::Capture);
        assert_eq!(game.log().last_message(), Some("Capture: e4 takes d5"));
        assert_eq!(game.player(Color::Black).captured().len(), 1);
    }

    #[test]
    fn fools_mate_ends_the_game() {
        let mut game = started();
        game.move_piece("f2", "f3");
        game.move_piece("e7", "e5");
        game.move_piece("g2", "g4");
        assert_eq!(game.move_piece("d8", "h4"), MoveResult::CheckmateCurrentWins);
        assert_eq!(game.game_state(), GameState::CheckmateCurrentWins);
        assert_eq!(game.current_player_color(), Color::Black);
        assert_eq!(game.log().last_message(), Some("CHECKMATE! Rui wins"));
        assert_eq!(game.move_piece("a2", "a3"), MoveResult::InvalidMove);
    }

    #[test]
    fn promotion_holds_the_turn_until_completed() {
        let mut game = Game::new();
        game.import_game("WHITE,Pe7,Ka1,ka8").unwrap();
        assert_eq!(game.move_piece("e7", "e8"), MoveResult::Promotion);
        assert_eq!(game.current_player_color(), Color::White);
        assert_eq!(game.pending_promotion(), Spot::from_notation("e8"));
        assert_eq!(game.move_piece("a1", "a2"), MoveResult::InvalidMove);
        assert_eq!(game.promote_pawn(PieceKind::King), Err(GameError::InvalidPromotion("KING".into())));

        assert_eq!(game.promote_pawn(PieceKind::Queen).unwrap(), "e8");
        assert_eq!(game.piece_at(0, 4).as_deref(), Some("Qe8"));
        assert_eq!(game.current_player_color(), Color::Black);
        assert_eq!(game.promote_pawn(PieceKind::Queen), Err(GameError::NoPendingPromotion));
        assert_eq!(game.log().last_message(), Some("Pawn promoted to QUEEN at e8"));
    }

    #[test]
    fn import_rejects_bad_positions_without_mutation() {
        let mut game = Game::new();
        game.import_game("WHITE,Ke1,ke8").unwrap();
        let before = game.export_game();
        assert_eq!(game.import_game("WHITE,Ke1"), Err(GameError::MissingKing(Color::Black)));
        assert_eq!(game.import_game("WHITE,Ke1,Kd1,ke8"), Err(GameError::DuplicateKing(Color::White)));
        assert_eq!(game.import_game("WHITE,Ke1,ke1"), Err(GameError::OccupiedSquare("e1".into())));
        assert!(matches!(game.import_game("PURPLE,Ke1,ke8"), Err(GameError::MalformedImport(_))));
        assert!(matches!(game.import_game("WHITE,Ke1,xe8"), Err(GameError::MalformedImport(_))));
        assert_eq!(game.export_game(), before);
    }

    #[test]
    fn import_rejects_a_capturable_king() {
        let mut game = started();
        let before = game.export_game();
        assert_eq!(game.import_game("WHITE,ke8,Qe6,Ke1"), Err(GameError::OpponentInCheck(Color::Black)));
        assert_eq!(game.export_game(), before);
        assert_eq!(game.game_state(), GameState::Running);

        // A mated side not to move is still a finished game.
        game.import_game("WHITE,kh8,Qg7,Kg6").unwrap();
        assert_eq!(game.game_state(), GameState::CheckmateCurrentWins);
    }

    #[test]
    fn export_during_promotion_reimports_as_pending() {
        let mut game = started();
        game.import_game("WHITE,Ra7,Pb7,Ka1,kh7").unwrap();
        // The pawn leaves the rank and uncovers the rook.
        assert_eq!(game.move_piece("b7", "b8"), MoveResult::Promotion);
        let text = game.export_game();

        let mut copy = Game::new();
        copy.import_game(&text).unwrap();
        assert_eq!(copy.pending_promotion(), Spot::from_notation("b8"));
        assert_eq!(copy.game_state(), GameState::Running);
        assert_eq!(copy.promote_pawn(PieceKind::Queen).unwrap(), "b8");
        assert_eq!(copy.current_player_color(), Color::Black);
    }

    #[test]
    fn import_accepts_the_legacy_multiline_layout() {
        let mut game = Game::new();
        game.import_game("BLACK,\nKe1*, Rh1*, ke8*").unwrap();
        assert_eq!(game.current_player_color(), Color::Black);
        assert_eq!(game.export_game(), "BLACK,Ke1*,Rh1*,ke8*");
    }

    #[test]
    fn legal_moves_string_lists_destinations() {
        let mut game = started();
        assert_eq!(game.board_size(), 8);
        assert_eq!(game.legal_moves_string(6, 4), "Pe2* legal moves: e3 e4");
        assert_eq!(game.legal_moves_string(4, 4), "No piece at this position.");
        assert!(game.has_move(Spot::new(6, 4), 4, 4));
        assert!(!game.has_moves(7, 0));
    }
}
