// src/attack.rs
use crate::board::Board;
use crate::piece::{Color, PieceKind};
use crate::spot::Spot;

// Directions for sliding piece attacks: (dr, dc, is_diagonal)
pub(crate) const DIRECTIONS: [(i8, i8, bool); 8] = [
    ( 1,  0, false), (-1,  0, false), ( 0,  1, false), ( 0, -1, false), // Orthogonal
    ( 1,  1, true),  ( 1, -1, true),  (-1,  1, true),  (-1, -1, true),  // Diagonal
];

pub(crate) const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (2, 1), (2, -1), (-2, 1), (-2, -1),
    (1, 2), (1, -2), (-1, 2), (-1, -2),
];

pub(crate) const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    ( 0, -1),          ( 0, 1),
    ( 1, -1), ( 1, 0), ( 1, 1),
];

/// Who attacks a square, from the point of view of a king of a given color.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttackReport {
    /// Number of attacking pieces.
    pub count: usize,
    /// Attacker squares, plus the ray squares between a slider and the target.
    pub squares: Vec<Spot>,
}

impl AttackReport {
    pub fn is_attacked(&self) -> bool { self.count > 0 }
}

/// Counts enemy attacks on a king of `color` standing on `king_spot`.
///
/// `king_spot` may be hypothetical (e.g. a castling transit square); the board is
/// never modified. Sliders attack only through the first piece on each ray. An
/// adjacent enemy king counts as an attacker, which keeps kings apart.
pub fn king_under_attack(board: &Board, king_spot: Spot, color: Color) -> AttackReport {
    let mut report = AttackReport::default();
    let enemy = color.opponent();

    for &(dr, dc, is_diagonal) in DIRECTIONS.iter() {
        let mut path = Vec::new();
        let mut current = king_spot.offset(dr, dc);
        let mut distance = 1;
        while current.is_valid() {
            path.push(current);
            if let Some(piece) = board.piece_at(current) {
                if piece.color() == enemy {
                    let attacks = match piece.kind() {
                        PieceKind::Queen => true,
                        PieceKind::Rook => !is_diagonal,
                        PieceKind::Bishop => is_diagonal,
                        // A pawn hits the two squares diagonally ahead of it.
                        PieceKind::Pawn => is_diagonal && distance == 1
                            && current.row + enemy.forward() == king_spot.row,
                        PieceKind::Knight | PieceKind::King => false,
                    };
                    if attacks {
                        report.count += 1;
                        report.squares.extend(path.iter().copied());
                    }
                }
                break; // first blocker ends the ray, friend or foe
            }
            current = current.offset(dr, dc);
            distance += 1;
        }
    }

    for &(dr, dc) in KNIGHT_OFFSETS.iter() {
        let from = king_spot.offset(dr, dc);
        if let Some(piece) = board.piece_at(from) {
            if piece.color() == enemy && piece.kind() == PieceKind::Knight {
                report.count += 1;
                report.squares.push(from);
            }
        }
    }

    for &(dr, dc) in KING_OFFSETS.iter() {
        let from = king_spot.offset(dr, dc);
        if let Some(piece) = board.piece_at(from) {
            if piece.color() == enemy && piece.kind() == PieceKind::King {
                report.count += 1;
                report.squares.push(from);
            }
        }
    }

    report
}

/// True if the alive king of `color` is attacked. A board without that king is never in check.
pub fn is_in_check(board: &Board, color: Color) -> bool {
    board.find_king(color)
        .and_then(|id| board.piece(id).spot())
        .map_or(false, |spot| king_under_attack(board, spot, color).is_attacked())
}
