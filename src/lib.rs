// src/lib.rs
//! Two-player chess rules engine: move legality, check/mate/stalemate detection,
//! special moves, undo/redo and a text import/export format.

pub mod attack;
pub mod board;
pub mod command;
pub mod error;
pub mod game;
pub mod log;
pub mod manager;
pub mod movegen;
pub mod persist;
pub mod piece;
pub mod player;
pub mod spot;

pub use board::{Board, MoveOutcome};
pub use command::{CommandManager, MoveCommand};
pub use error::{GameError, PersistError};
pub use game::{Game, GameState, MoveResult};
pub use log::{EventLog, LogEntry};
pub use manager::{GameManager, Notification};
pub use piece::{Color, Piece, PieceId, PieceKind};
pub use player::Player;
pub use spot::{Spot, BOARD_SIZE};
