// src/player.rs
use crate::board::Board;
use crate::piece::{Color, PieceId, PieceKind};

/// One side's pieces split into alive and captured. A view rebuilt from the board on
/// demand; the board stays the source of truth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    color: Color,
    name: Option<String>,
    alive: Vec<PieceId>,
    captured: Vec<PieceId>,
}

impl Player {
    pub fn from_board(board: &Board, color: Color, name: Option<&str>) -> Self {
        let mut alive = Vec::new();
        let mut captured = Vec::new();
        for (id, piece) in board.pieces().filter(|(_, p)| p.color() == color) {
            if piece.is_alive() { alive.push(id); } else { captured.push(id); }
        }
        Player { color, name: name.map(str::to_string), alive, captured }
    }

    pub fn color(&self) -> Color { self.color }

    /// The player's name, or the color name when none was given.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.color.name())
    }

    pub fn alive(&self) -> &[PieceId] { &self.alive }
    pub fn captured(&self) -> &[PieceId] { &self.captured }

    pub fn king(&self, board: &Board) -> Option<PieceId> {
        self.alive.iter().copied().find(|&id| board.piece(id).kind() == PieceKind::King)
    }

    /// Notation letters of captured pieces, e.g. "p n".
    pub fn captured_symbols(&self, board: &Board) -> String {
        self.captured.iter()
            .map(|&id| board.piece(id).symbol().to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spot::Spot;

    #[test]
    fn view_splits_alive_and_captured() {
        let mut board = Board::initial();
        let e2 = Spot::from_notation("e2").unwrap();
        let pawn = board.id_at(e2).unwrap();
        board.kill(pawn);

        let white = Player::from_board(&board, Color::White, Some("Ana"));
        assert_eq!(white.alive().len(), 15);
        assert_eq!(white.captured(), &[pawn]);
        assert_eq!(white.captured_symbols(&board), "P");
        assert_eq!(white.display_name(), "Ana");
        assert!(white.king(&board).is_some());

        let black = Player::from_board(&board, Color::Black, None);
        assert_eq!(black.alive().len(), 16);
        assert_eq!(black.display_name(), "Black");
    }
}
