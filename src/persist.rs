// src/persist.rs
use crate::error::PersistError;
use crate::game::{Game, GameState};
use crate::piece::Color;
use serde::{Deserialize, Serialize};
use std::fs;

pub const SAVE_FORMAT_VERSION: u32 = 1;
pub const SAVE_EXTENSION: &str = "json";
pub const EXPORT_EXTENSION: &str = "txt";
pub const DEFAULT_SAVE_FILENAME: &str = "chess_save.json";
pub const DEFAULT_EXPORT_FILENAME: &str = "chess_game.txt";

#[derive(Debug, Serialize, Deserialize)]
struct SaveFile {
    version: u32,
    game: Game,
}

/// Appends `.ext` unless the name already ends with it.
pub fn with_extension(filename: &str, ext: &str) -> String {
    let suffix = format!(".{}", ext);
    if filename.to_ascii_lowercase().ends_with(&suffix) {
        filename.to_string()
    } else {
        format!("{}{}", filename, suffix)
    }
}

/// Writes the whole game (board, names, state, log) as versioned JSON.
/// Returns the file name actually written.
pub fn save_game(game: &Game, filename: &str) -> Result<String, PersistError> {
    let filename = with_extension(filename, SAVE_EXTENSION);
    let save = SaveFile { version: SAVE_FORMAT_VERSION, game: game.clone() };
    let json_data = serde_json::to_string_pretty(&save)?;
    fs::write(&filename, json_data)
        .map_err(|e| PersistError::Io(filename.clone(), e))?;
    Ok(filename)
}

/// Reads a save file. The position is rebuilt through the text import so a hand-edited
/// save goes through the same validation as an import.
pub fn load_game(filename: &str) -> Result<Game, PersistError> {
    let filename = with_extension(filename, SAVE_EXTENSION);
    let json_data = fs::read_to_string(&filename)
        .map_err(|e| PersistError::Io(filename.clone(), e))?;
    let save: SaveFile = serde_json::from_str(&json_data)?;
    if save.version != SAVE_FORMAT_VERSION {
        return Err(PersistError::VersionMismatch { found: save.version, expected: SAVE_FORMAT_VERSION });
    }

    let saved = save.game;
    let mut game = Game::new();
    if let (Some(white), Some(black)) = (saved.player_name(Color::White), saved.player_name(Color::Black)) {
        game.set_player_names(white, black)?;
    }
    if saved.game_state() != GameState::NotStarted {
        game.import_game(&saved.export_game())?;
    }
    *game.log_mut() = saved.log().clone();
    Ok(game)
}

/// Writes the one-line text export. Returns the file name actually written.
pub fn export_to_file(game: &Game, filename: &str) -> Result<String, PersistError> {
    let filename = with_extension(filename, EXPORT_EXTENSION);
    fs::write(&filename, game.export_game())
        .map_err(|e| PersistError::Io(filename.clone(), e))?;
    Ok(filename)
}

/// Replaces the position of `game` with the one stored in a text export.
pub fn import_from_file(game: &mut Game, filename: &str) -> Result<(), PersistError> {
    let filename = with_extension(filename, EXPORT_EXTENSION);
    let text = fs::read_to_string(&filename)
        .map_err(|e| PersistError::Io(filename.clone(), e))?;
    game.import_game(&text)?;
    Ok(())
}
