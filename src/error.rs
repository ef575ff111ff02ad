// src/error.rs
use crate::piece::Color;
use std::error::Error;
use std::fmt;
use std::io;

// --- Custom Error Types ---

/// Caller-contract and input errors. Illegal moves are not errors; they come back as
/// [`crate::game::MoveResult`] values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    InvalidPlayerName(Color),
    MissingPlayerNames,
    NoPendingPromotion,
    InvalidPromotion(String),
    MissingKing(Color),
    DuplicateKing(Color),
    MalformedImport(String),
    OccupiedSquare(String),
    OpponentInCheck(Color),
    NotRunning,
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::InvalidPlayerName(color) => write!(f, "The {} player's name cannot be empty.", color),
            GameError::MissingPlayerNames => write!(f, "Player names must be set before starting the game."),
            GameError::NoPendingPromotion => write!(f, "There is no pawn waiting for promotion."),
            GameError::InvalidPromotion(kind) => write!(f, "Invalid promotion piece: '{}'. Use QUEEN, ROOK, BISHOP or KNIGHT.", kind),
            GameError::MissingKing(color) => write!(f, "Position has no {} king.", color),
            GameError::DuplicateKing(color) => write!(f, "Position has more than one {} king.", color),
            GameError::MalformedImport(token) => write!(f, "Malformed game text near '{}'.", token),
            GameError::OccupiedSquare(square) => write!(f, "Square {} is listed twice in the game text.", square),
            GameError::OpponentInCheck(color) => write!(f, "The {} king is in check but it is not their move.", color),
            GameError::NotRunning => write!(f, "The game is not running."),
        }
    }
}
impl Error for GameError {}

#[derive(Debug)]
pub enum PersistError {
    Serialization(serde_json::Error),
    Io(String, io::Error),
    VersionMismatch { found: u32, expected: u32 },
    Game(GameError),
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistError::Serialization(e) => write!(f, "Serialization error: {}", e),
            PersistError::Io(file, e) => write!(f, "I/O error with file '{}': {}", file, e),
            PersistError::VersionMismatch { found, expected } => {
                write!(f, "Saved game has format version {}, this build reads version {}.", found, expected)
            }
            PersistError::Game(e) => write!(f, "Invalid game data: {}", e),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PersistError::Serialization(e) => Some(e),
            PersistError::Io(_, e) => Some(e),
            PersistError::Game(e) => Some(e),
            PersistError::VersionMismatch { .. } => None,
        }
    }
}

// Automatic conversions for convenience
impl From<serde_json::Error> for PersistError {
    fn from(e: serde_json::Error) -> Self { PersistError::Serialization(e) }
}
impl From<GameError> for PersistError {
    fn from(e: GameError) -> Self { PersistError::Game(e) }
}
