// src/spot.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Side length of the board. Row 0 is rank 8, column 0 is file `a`.
pub const BOARD_SIZE: i8 = 8;

/// A board coordinate. May lie off the board; check with [`Spot::is_valid`].
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Spot {
    pub row: i8,
    pub col: i8,
}

impl Spot {
    pub const fn new(row: i8, col: i8) -> Self { Spot { row, col } }

    #[inline(always)]
    pub fn is_valid(&self) -> bool {
        (0..BOARD_SIZE).contains(&self.row) && (0..BOARD_SIZE).contains(&self.col)
    }

    /// Shifts by a (row, col) delta. The result is not bounds-checked.
    #[inline(always)]
    pub fn offset(&self, dr: i8, dc: i8) -> Spot {
        Spot::new(self.row.saturating_add(dr), self.col.saturating_add(dc))
    }

    /// Grid cell as (row, col). Only meaningful for valid spots.
    #[inline(always)]
    pub(crate) fn cell(&self) -> (usize, usize) {
        (self.row as usize, self.col as usize)
    }

    /// Parses square notation such as `e4`. Well-formed input outside the board
    /// (`i9`, `a0`) still parses, so callers can tell "off the board" apart from
    /// "not a square at all" if they want to.
    pub fn from_notation(s: &str) -> Option<Spot> {
        let s = s.trim();
        let mut chars = s.chars();
        let file_char = chars.next()?;
        if !file_char.is_ascii_lowercase() { return None; }
        let rank_str = chars.as_str();
        if rank_str.is_empty() || !rank_str.chars().all(|c| c.is_ascii_digit()) { return None; }
        let rank: i32 = rank_str.parse().ok()?;
        let col = file_char as i32 - 'a' as i32;
        let row = BOARD_SIZE as i32 - rank;
        let row = i8::try_from(row).ok()?;
        let col = i8::try_from(col).ok()?;
        Some(Spot::new(row, col))
    }

    pub fn to_notation(&self) -> String {
        if !self.is_valid() { return "??".to_string(); }
        let file_char = (b'a' + self.col as u8) as char;
        let rank = BOARD_SIZE - self.row;
        format!("{}{}", file_char, rank)
    }
}

impl fmt::Display for Spot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_notation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notation_maps_rank_eight_to_row_zero() {
        assert_eq!(Spot::from_notation("a8"), Some(Spot::new(0, 0)));
        assert_eq!(Spot::from_notation("h1"), Some(Spot::new(7, 7)));
        assert_eq!(Spot::from_notation("e4"), Some(Spot::new(4, 4)));
        assert_eq!(Spot::new(4, 4).to_notation(), "e4");
    }

    #[test]
    fn off_board_squares_parse_but_are_invalid() {
        let spot = Spot::from_notation("i9").unwrap();
        assert!(!spot.is_valid());
        assert!(!Spot::from_notation("a0").unwrap().is_valid());
        assert!(Spot::from_notation("").is_none());
        assert!(Spot::from_notation("4e").is_none());
        assert!(Spot::from_notation("E4").is_none());
    }

    #[test]
    fn offset_does_not_wrap() {
        let corner = Spot::new(0, 7);
        assert!(!corner.offset(-1, 0).is_valid());
        assert!(!corner.offset(0, 1).is_valid());
        assert_eq!(corner.offset(1, -1), Spot::new(1, 6));
    }
}
