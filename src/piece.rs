// src/piece.rs
use crate::error::GameError;
use crate::spot::Spot;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

lazy_static! {
    // <kind><file><rank>[*], e.g. "Ke1*", "pd5"
    static ref PIECE_TOKEN: Regex = Regex::new(r"^([KQRBNPkqrbnp])([a-z])(\d+)(\*?)$").unwrap();
}

// --- Enums and Basic Structs ---
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Color { White, Black }

impl Color {
    pub fn opponent(&self) -> Color {
        match self { Color::White => Color::Black, Color::Black => Color::White }
    }
    /// Row delta of a pawn step. White travels towards row 0.
    #[inline(always)]
    pub fn forward(&self) -> i8 {
        match self { Color::White => -1, Color::Black => 1 }
    }
    /// Row a pawn of this color promotes on.
    #[inline(always)]
    pub fn promotion_row(&self) -> i8 {
        match self { Color::White => 0, Color::Black => 7 }
    }
    pub fn name(&self) -> &'static str {
        match self { Color::White => "White", Color::Black => "Black" }
    }
    /// Side-to-move token of the text export format.
    pub fn side_token(&self) -> &'static str {
        match self { Color::White => "WHITE", Color::Black => "BLACK" }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PieceKind { Pawn, Knight, Bishop, Rook, Queen, King }

impl PieceKind {
    /// Uppercase notation letter.
    pub fn symbol(&self) -> char {
        match self {
            PieceKind::Pawn => 'P', PieceKind::Knight => 'N', PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R', PieceKind::Queen => 'Q', PieceKind::King => 'K',
        }
    }

    pub fn from_symbol(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'P' => Some(PieceKind::Pawn), 'N' => Some(PieceKind::Knight), 'B' => Some(PieceKind::Bishop),
            'R' => Some(PieceKind::Rook), 'Q' => Some(PieceKind::Queen), 'K' => Some(PieceKind::King),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PieceKind::Pawn => "PAWN", PieceKind::Knight => "KNIGHT", PieceKind::Bishop => "BISHOP",
            PieceKind::Rook => "ROOK", PieceKind::Queen => "QUEEN", PieceKind::King => "KING",
        }
    }

    /// Kinds whose "has moved" flag matters (castling, pawn double step).
    pub fn tracks_moved(&self) -> bool {
        matches!(self, PieceKind::King | PieceKind::Rook | PieceKind::Pawn)
    }

    pub fn is_promotion_target(&self) -> bool {
        matches!(self, PieceKind::Queen | PieceKind::Rook | PieceKind::Bishop | PieceKind::Knight)
    }
}

/// Accepts full names in any case (`QUEEN`, `knight`) or single letters (`q`, `N`).
impl FromStr for PieceKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let upper = trimmed.to_ascii_uppercase();
        let kind = match upper.as_str() {
            "PAWN" => Some(PieceKind::Pawn),
            "KNIGHT" => Some(PieceKind::Knight),
            "BISHOP" => Some(PieceKind::Bishop),
            "ROOK" => Some(PieceKind::Rook),
            "QUEEN" => Some(PieceKind::Queen),
            "KING" => Some(PieceKind::King),
            _ if upper.chars().count() == 1 => upper.chars().next().and_then(PieceKind::from_symbol),
            _ => None,
        };
        kind.ok_or_else(|| GameError::InvalidPromotion(trimmed.to_string()))
    }
}

/// Index of a piece in its board's roster. Stable for the lifetime of the board.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(pub(crate) usize);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Piece {
    kind: PieceKind,
    color: Color,
    spot: Option<Spot>, // None while captured or not yet placed
    alive: bool,
    moved: bool,
    // Last computed legal destinations; stale until recomputed.
    #[serde(skip)]
    legal_moves: Vec<Spot>,
}

impl Piece {
    pub fn new(kind: PieceKind, color: Color) -> Self {
        Piece { kind, color, spot: None, alive: true, moved: false, legal_moves: Vec::new() }
    }

    pub fn kind(&self) -> PieceKind { self.kind }
    pub fn color(&self) -> Color { self.color }
    pub fn spot(&self) -> Option<Spot> { self.spot }
    pub fn is_alive(&self) -> bool { self.alive }
    pub fn has_moved(&self) -> bool { self.moved }
    pub fn legal_moves(&self) -> &[Spot] { &self.legal_moves }
    pub fn has_moves(&self) -> bool { !self.legal_moves.is_empty() }

    pub fn is_enemy(&self, other: &Piece) -> bool { self.color != other.color }

    pub(crate) fn set_spot(&mut self, spot: Option<Spot>) { self.spot = spot; }
    pub(crate) fn set_alive(&mut self, alive: bool) { self.alive = alive; }
    pub(crate) fn set_legal_moves(&mut self, moves: Vec<Spot>) { self.legal_moves = moves; }

    pub fn set_moved(&mut self, moved: bool) { self.moved = moved; }

    /// Builder used when constructing positions by hand.
    pub fn with_moved(mut self, moved: bool) -> Self {
        self.moved = moved;
        self
    }

    /// Colored notation letter: uppercase for White, lowercase for Black.
    pub fn symbol(&self) -> char {
        match self.color {
            Color::White => self.kind.symbol(),
            Color::Black => self.kind.symbol().to_ascii_lowercase(),
        }
    }

    /// `*` suffix for King/Rook/Pawn that have never moved.
    fn unmoved_marker(&self) -> &'static str {
        if self.kind.tracks_moved() && !self.moved { "*" } else { "" }
    }

    /// Parses a text-format token such as `Ke1*` into a piece and the square it stands on.
    /// For King, Rook and Pawn a missing `*` means the piece has already moved.
    pub fn from_token(token: &str) -> Result<(Piece, Spot), GameError> {
        let token = token.trim();
        let caps = PIECE_TOKEN.captures(token)
            .ok_or_else(|| GameError::MalformedImport(token.to_string()))?;
        let symbol = caps[1].chars().next()
            .ok_or_else(|| GameError::MalformedImport(token.to_string()))?;
        let kind = PieceKind::from_symbol(symbol)
            .ok_or_else(|| GameError::MalformedImport(token.to_string()))?;
        let color = if symbol.is_ascii_uppercase() { Color::White } else { Color::Black };
        let spot = Spot::from_notation(&format!("{}{}", &caps[2], &caps[3]))
            .filter(Spot::is_valid)
            .ok_or_else(|| GameError::MalformedImport(token.to_string()))?;
        let unmoved = !caps[4].is_empty();
        Ok((Piece::new(kind, color).with_moved(!unmoved), spot))
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.spot {
            Some(spot) => write!(f, "{}{}{}", self.symbol(), spot, self.unmoved_marker()),
            None => write!(f, "{}", self.symbol()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip_keeps_unmoved_marker() {
        let (mut king, spot) = Piece::from_token("Ke1*").unwrap();
        assert_eq!(king.kind(), PieceKind::King);
        assert_eq!(king.color(), Color::White);
        assert!(!king.has_moved());
        king.set_spot(Some(spot));
        assert_eq!(king.to_string(), "Ke1*");

        let (mut rook, spot) = Piece::from_token("ra8").unwrap();
        assert!(rook.has_moved());
        rook.set_spot(Some(spot));
        assert_eq!(rook.to_string(), "ra8");
    }

    #[test]
    fn marker_only_for_tracked_kinds() {
        let (mut queen, spot) = Piece::from_token("Qd1*").unwrap();
        queen.set_spot(Some(spot));
        assert_eq!(queen.to_string(), "Qd1");
    }

    #[test]
    fn bad_tokens_are_rejected() {
        assert!(Piece::from_token("Xe1").is_err());
        assert!(Piece::from_token("Ke9").is_err());
        assert!(Piece::from_token("Kz1").is_err());
        assert!(Piece::from_token("K").is_err());
    }

    #[test]
    fn promotion_kind_names() {
        assert_eq!("QUEEN".parse::<PieceKind>().unwrap(), PieceKind::Queen);
        assert_eq!("knight".parse::<PieceKind>().unwrap(), PieceKind::Knight);
        assert_eq!("r".parse::<PieceKind>().unwrap(), PieceKind::Rook);
        assert!("dragon".parse::<PieceKind>().is_err());
    }
}
