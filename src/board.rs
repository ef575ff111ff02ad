// src/board.rs
use crate::movegen;
use crate::piece::{Color, Piece, PieceId, PieceKind};
use crate::spot::{Spot, BOARD_SIZE};
use serde::{Deserialize, Serialize};
use std::fmt;

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook, PieceKind::Knight, PieceKind::Bishop, PieceKind::Queen,
    PieceKind::King, PieceKind::Bishop, PieceKind::Knight, PieceKind::Rook,
];

/// Result of a validated [`Board::move_piece`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Blocked,
    Moved,
    MovedAndCaptured(PieceId),
}

/// 8x8 grid plus the roster of every piece created for this game.
///
/// The roster owns the pieces; grid cells only hold roster indices. A cell holds an id
/// exactly when that piece is alive and its stored spot is that cell. Captured pieces
/// stay in the roster so history can bring them back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    grid: [[Option<PieceId>; BOARD_SIZE as usize]; BOARD_SIZE as usize],
    roster: Vec<Piece>,
    last_move: Option<(Spot, Spot)>,
}

impl Default for Board {
    fn default() -> Self { Board::new() }
}

impl Board {
    /// An empty board with no pieces.
    pub fn new() -> Self {
        Board {
            grid: [[None; BOARD_SIZE as usize]; BOARD_SIZE as usize],
            roster: Vec::new(),
            last_move: None,
        }
    }

    /// The standard opening position.
    pub fn initial() -> Self {
        let mut board = Board::new();
        for col in 0..BOARD_SIZE {
            board.add_piece(Piece::new(PieceKind::Pawn, Color::White), Spot::new(6, col));
            board.add_piece(Piece::new(PieceKind::Pawn, Color::Black), Spot::new(1, col));
        }
        for (col, kind) in BACK_RANK.iter().enumerate() {
            board.add_piece(Piece::new(*kind, Color::White), Spot::new(7, col as i8));
        }
        for (col, kind) in BACK_RANK.iter().enumerate() {
            board.add_piece(Piece::new(*kind, Color::Black), Spot::new(0, col as i8));
        }
        board
    }

    // --- Queries ---

    pub fn piece(&self, id: PieceId) -> &Piece { &self.roster[id.0] }

    pub(crate) fn piece_mut(&mut self, id: PieceId) -> &mut Piece { &mut self.roster[id.0] }

    /// Every piece ever added, alive or captured, in insertion order.
    pub fn pieces(&self) -> impl Iterator<Item = (PieceId, &Piece)> + '_ {
        self.roster.iter().enumerate().map(|(i, p)| (PieceId(i), p))
    }

    /// Alive pieces of one color, in insertion order.
    pub fn alive_ids(&self, color: Color) -> Vec<PieceId> {
        self.pieces()
            .filter(|(_, p)| p.is_alive() && p.color() == color)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn id_at(&self, spot: Spot) -> Option<PieceId> {
        if !spot.is_valid() { return None; }
        let (row, col) = spot.cell();
        self.grid[row][col]
    }

    pub fn piece_at(&self, spot: Spot) -> Option<&Piece> {
        self.id_at(spot).map(|id| self.piece(id))
    }

    pub fn is_empty(&self, spot: Spot) -> bool { self.id_at(spot).is_none() }

    /// Finds the alive king of `color`.
    pub fn find_king(&self, color: Color) -> Option<PieceId> {
        self.pieces()
            .find(|(_, p)| p.is_alive() && p.color() == color && p.kind() == PieceKind::King)
            .map(|(id, _)| id)
    }

    pub fn last_move(&self) -> Option<(Spot, Spot)> { self.last_move }

    pub(crate) fn set_last_move(&mut self, last_move: Option<(Spot, Spot)>) { self.last_move = last_move; }

    /// Deep copy for "what-if" simulation. Shares nothing with `self`.
    pub fn snapshot(&self) -> Board { self.clone() }

    // --- Raw placement ---

    /// Registers a new piece in the roster and puts it on `spot`.
    /// Returns `None` without touching anything if the spot is invalid or taken.
    pub fn add_piece(&mut self, mut piece: Piece, spot: Spot) -> Option<PieceId> {
        if !spot.is_valid() || !self.is_empty(spot) { return None; }
        let id = PieceId(self.roster.len());
        piece.set_spot(Some(spot));
        piece.set_alive(true);
        self.roster.push(piece);
        let (row, col) = spot.cell();
        self.grid[row][col] = Some(id);
        Some(id)
    }

    /// Puts a roster piece on `spot`, leaving its previous cell if it had one.
    /// Fails with no mutation if the spot is invalid or occupied.
    pub fn place(&mut self, id: PieceId, spot: Spot) -> bool {
        if !spot.is_valid() || !self.is_empty(spot) { return false; }
        self.lift(id);
        let (row, col) = spot.cell();
        self.grid[row][col] = Some(id);
        self.roster[id.0].set_spot(Some(spot));
        true
    }

    /// Clears a cell and unbinds its occupant's position. Aliveness is left to the caller.
    pub fn remove_at(&mut self, spot: Spot) -> Option<PieceId> {
        let id = self.id_at(spot)?;
        let (row, col) = spot.cell();
        self.grid[row][col] = None;
        self.roster[id.0].set_spot(None);
        Some(id)
    }

    /// Takes a piece off the grid. Returns false if it was not on the grid.
    pub(crate) fn lift(&mut self, id: PieceId) -> bool {
        match self.roster[id.0].spot() {
            Some(spot) if self.id_at(spot) == Some(id) => self.remove_at(spot).is_some(),
            _ => false,
        }
    }

    /// Marks a piece captured and takes it off the grid.
    pub(crate) fn kill(&mut self, id: PieceId) {
        self.lift(id);
        self.roster[id.0].set_alive(false);
    }

    /// Brings a captured piece back onto `spot`.
    pub(crate) fn revive(&mut self, id: PieceId, spot: Spot) -> bool {
        if !self.place(id, spot) { return false; }
        self.roster[id.0].set_alive(true);
        true
    }

    /// Swaps the piece stored in a roster slot, keeping the slot's position and aliveness.
    pub(crate) fn replace_piece(&mut self, id: PieceId, mut piece: Piece) {
        let current = &self.roster[id.0];
        piece.set_spot(current.spot());
        piece.set_alive(current.is_alive());
        self.roster[id.0] = piece;
    }

    pub(crate) fn set_moved(&mut self, id: PieceId, moved: bool) {
        self.roster[id.0].set_moved(moved);
    }

    // --- Movement ---

    /// Recomputes and caches the legal destinations of a piece.
    pub fn calculate_legal_moves(&mut self, id: PieceId) -> &[Spot] {
        let moves = movegen::legal_destinations(self, id);
        self.roster[id.0].set_legal_moves(moves);
        self.roster[id.0].legal_moves()
    }

    /// Moves the occupant of `start` to `end` if `end` is one of its legal destinations.
    /// An enemy on `end` is captured. Special-move side effects (rook relocation,
    /// en passant removal) are the caller's job.
    pub fn move_piece(&mut self, start: Spot, end: Spot) -> MoveOutcome {
        if !start.is_valid() || !end.is_valid() { return MoveOutcome::Blocked; }
        let Some(id) = self.id_at(start) else { return MoveOutcome::Blocked; };
        if !self.calculate_legal_moves(id).contains(&end) {
            return MoveOutcome::Blocked;
        }

        let captured = self.remove_at(end);
        if let Some(captured_id) = captured {
            self.roster[captured_id.0].set_alive(false);
        }
        self.relocate(id, start, end);
        self.last_move = Some((start, end));

        match captured {
            Some(captured_id) => MoveOutcome::MovedAndCaptured(captured_id),
            None => MoveOutcome::Moved,
        }
    }

    /// Unconditional relocation. Only for simulation on snapshots and for replaying
    /// moves whose legality is already established. Does not touch the last-move record.
    pub fn force_move(&mut self, id: PieceId, target: Spot) {
        if !target.is_valid() { return; }
        let Some(origin) = self.roster[id.0].spot() else { return; };
        if origin == target { return; }
        if let Some(occupant) = self.remove_at(target) {
            self.roster[occupant.0].set_alive(false);
        }
        self.relocate(id, origin, target);
    }

    fn relocate(&mut self, id: PieceId, from: Spot, to: Spot) {
        let (fr, fc) = from.cell();
        if self.grid[fr][fc] == Some(id) {
            self.grid[fr][fc] = None;
        }
        let (tr, tc) = to.cell();
        self.grid[tr][tc] = Some(id);
        let piece = &mut self.roster[id.0];
        piece.set_spot(Some(to));
        if piece.kind().tracks_moved() {
            piece.set_moved(true);
        }
    }
}

// Each cell shows the occupant's notation or the empty square's coordinate.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let spot = Spot::new(row, col);
                let content = match self.piece_at(spot) {
                    Some(piece) => piece.to_string(),
                    None => spot.to_notation(),
                };
                write!(f, "{:<6}", content)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Spot { Spot::from_notation(s).unwrap() }

    #[test]
    fn initial_position_layout() {
        let board = Board::initial();
        assert_eq!(board.pieces().count(), 32);
        assert_eq!(board.piece_at(sq("e1")).unwrap().to_string(), "Ke1*");
        assert_eq!(board.piece_at(sq("d8")).unwrap().to_string(), "qd8");
        assert_eq!(board.piece_at(sq("a2")).unwrap().to_string(), "Pa2*");
        assert!(board.is_empty(sq("e4")));
    }

    #[test]
    fn add_piece_rejects_occupied_and_invalid_spots() {
        let mut board = Board::new();
        assert!(board.add_piece(Piece::new(PieceKind::King, Color::White), sq("e1")).is_some());
        assert!(board.add_piece(Piece::new(PieceKind::Queen, Color::White), sq("e1")).is_none());
        assert!(board.add_piece(Piece::new(PieceKind::Queen, Color::White), Spot::new(8, 0)).is_none());
        assert_eq!(board.pieces().count(), 1);
    }

    #[test]
    fn move_piece_validates_and_captures() {
        let mut board = Board::new();
        board.add_piece(Piece::new(PieceKind::King, Color::White).with_moved(true), sq("a1"));
        board.add_piece(Piece::new(PieceKind::King, Color::Black).with_moved(true), sq("h8"));
        let rook = board.add_piece(Piece::new(PieceKind::Rook, Color::White), sq("d1")).unwrap();
        let knight = board.add_piece(Piece::new(PieceKind::Knight, Color::Black), sq("d5")).unwrap();

        assert_eq!(board.move_piece(sq("d1"), sq("e2")), MoveOutcome::Blocked);
        assert_eq!(board.move_piece(sq("d1"), sq("d6")), MoveOutcome::Blocked);
        assert_eq!(board.move_piece(sq("d1"), sq("d5")), MoveOutcome::MovedAndCaptured(knight));

        assert!(!board.piece(knight).is_alive());
        assert_eq!(board.piece(knight).spot(), None);
        assert_eq!(board.id_at(sq("d5")), Some(rook));
        assert!(board.piece(rook).has_moved());
        assert_eq!(board.last_move(), Some((sq("d1"), sq("d5"))));
    }

    #[test]
    fn snapshot_does_not_alias_live_board() {
        let board = Board::initial();
        let mut copy = board.snapshot();
        let pawn = copy.id_at(sq("e2")).unwrap();
        copy.force_move(pawn, sq("e4"));
        assert!(board.piece_at(sq("e4")).is_none());
        assert!(!board.piece(pawn).has_moved());
        assert!(copy.piece(pawn).has_moved());
    }

    #[test]
    fn remove_and_replace_keep_grid_consistent() {
        let mut board = Board::initial();
        let pawn = board.remove_at(sq("e2")).unwrap();
        assert!(board.piece(pawn).spot().is_none());
        assert!(board.piece(pawn).is_alive());
        assert!(board.place(pawn, sq("e3")));
        board.replace_piece(pawn, Piece::new(PieceKind::Queen, Color::White));
        assert_eq!(board.piece_at(sq("e3")).unwrap().to_string(), "Qe3");
    }

    #[test]
    fn display_lists_pieces_and_empty_squares() {
        let text = Board::initial().to_string();
        let first_line = text.lines().next().unwrap();
        assert!(first_line.starts_with("ra8*  nb8"));
        assert!(text.lines().nth(3).unwrap().starts_with("a5    b5"));
    }
}
