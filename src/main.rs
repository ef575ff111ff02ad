// src/main.rs
use chess_rules::persist::{DEFAULT_EXPORT_FILENAME, DEFAULT_SAVE_FILENAME};
use chess_rules::{Color, GameError, GameManager, GameState, MoveResult, PersistError, Spot};
use lazy_static::lazy_static;
use regex::Regex;
use std::error::Error;
use std::fmt;
use std::io::{self, Write};

// --- Constants ---
const LOG_LINES_SHOWN: usize = 3;

lazy_static! {
    // "e2e4", "e2 e4", "e2-e4"
    static ref MOVE_INPUT: Regex = Regex::new(r"^([a-zA-Z]\d+)\s*[- ]?\s*([a-zA-Z]\d+)$").unwrap();
}

// --- Input Parsing ---

#[derive(Debug)]
enum UserInput {
    Move(String, String),
    Command(Command),
}

#[derive(Debug)]
enum Command {
    Moves(String),
    Undo, Redo, Log, New, Help, Quit,
    Export(String),
    Import(String),
    Save(String),
    Load(String),
}

#[derive(Debug)]
enum CommandError {
    UnknownCommand(String),
    MissingArgument(String),
    InvalidArgument(String),
    Game(GameError),
    Persist(PersistError),
    IoError(io::Error),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::UnknownCommand(cmd) => write!(f, "Unknown command: '{}'. Type 'help' for commands.", cmd),
            CommandError::MissingArgument(cmd) => write!(f, "Missing argument for command: '{}'", cmd),
            CommandError::InvalidArgument(arg) => write!(f, "Invalid argument: '{}'", arg),
            CommandError::Game(e) => write!(f, "{}", e),
            CommandError::Persist(e) => write!(f, "{}", e),
            CommandError::IoError(e) => write!(f, "Input/Output error: {}", e),
        }
    }
}
impl Error for CommandError {}

impl From<GameError> for CommandError {
    fn from(e: GameError) -> Self { CommandError::Game(e) }
}
impl From<PersistError> for CommandError {
    fn from(e: PersistError) -> Self { CommandError::Persist(e) }
}
impl From<io::Error> for CommandError {
    fn from(e: io::Error) -> Self { CommandError::IoError(e) }
}

/// Parses a line into a move or a command.
fn parse_user_input(input: &str) -> Result<UserInput, CommandError> {
    let trimmed_input = input.trim();
    if let Some(caps) = MOVE_INPUT.captures(trimmed_input) {
        return Ok(UserInput::Move(caps[1].to_lowercase(), caps[2].to_lowercase()));
    }

    let mut parts = trimmed_input.splitn(2, char::is_whitespace);
    let command_word = parts.next().unwrap_or("").to_lowercase();
    let argument = parts.next().unwrap_or("").trim();
    let file_or = |default: &str| if argument.is_empty() { default.to_string() } else { argument.to_string() };

    let command = match command_word.as_str() {
        "moves" if argument.is_empty() => return Err(CommandError::MissingArgument(command_word)),
        "moves" => Command::Moves(argument.to_lowercase()),
        "undo" => Command::Undo,
        "redo" => Command::Redo,
        "log" => Command::Log,
        "new" => Command::New,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "export" => Command::Export(file_or(DEFAULT_EXPORT_FILENAME)),
        "import" => Command::Import(file_or(DEFAULT_EXPORT_FILENAME)),
        "save" => Command::Save(file_or(DEFAULT_SAVE_FILENAME)),
        "load" => Command::Load(file_or(DEFAULT_SAVE_FILENAME)),
        _ => return Err(CommandError::UnknownCommand(trimmed_input.to_string())),
    };
    Ok(UserInput::Command(command))
}

/// Reads one trimmed line. `None` on end of input.
fn read_line(prompt: &str) -> Result<Option<String>, CommandError> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn ask_player_names(manager: &mut GameManager) -> Result<bool, CommandError> {
    loop {
        let Some(white) = read_line("White player's name: ")? else { return Ok(false) };
        let Some(black) = read_line("Black player's name: ")? else { return Ok(false) };
        match manager.set_player_names(&white, &black) {
            Ok(()) => return Ok(true),
            Err(e) => println!("Error: {}", e),
        }
    }
}

/// Asks until a valid promotion piece is chosen. Returns false on end of input.
fn prompt_promotion(manager: &mut GameManager) -> Result<bool, CommandError> {
    loop {
        let Some(choice) = read_line("Promote pawn to? (q=Queen, r=Rook, b=Bishop, n=Knight): ")? else {
            return Ok(false);
        };
        match manager.promote_pawn(&choice) {
            Ok(square) => {
                println!("Pawn promoted at {}.", square);
                return Ok(true);
            }
            Err(e) => println!("Invalid choice: {}", e),
        }
    }
}

fn print_status(manager: &GameManager) {
    let game = manager.game();
    println!("------------------------------------------");
    if let Some(board) = game.query_board() {
        println!("{}", board);
    }
    for color in [Color::White, Color::Black] {
        let player = game.player(color);
        let captured = player.captured_symbols(game.board());
        if !captured.is_empty() {
            println!("{} lost: {}", player.display_name(), captured);
        }
    }
    let recent: Vec<_> = game.log().newest_first().take(LOG_LINES_SHOWN).collect();
    for entry in recent.into_iter().rev() {
        println!("  {}", entry);
    }
}

fn describe_result(result: MoveResult) -> Option<&'static str> {
    match result {
        MoveResult::InvalidMove => Some("Illegal move."),
        MoveResult::InvalidOrigin => Some("No piece of yours on that square."),
        MoveResult::OutOfBounds => Some("Square is outside the board."),
        _ => None,
    }
}

// --- Main Game Loop ---

fn main() -> Result<(), Box<dyn Error>> {
    println!("==============================");
    println!("|        Rust Chess          |");
    println!("==============================");

    let mut manager = GameManager::new();
    if !ask_player_names(&mut manager)? {
        println!("\nEnd of input detected. Quitting.");
        return Ok(());
    }
    manager.start_new_game()?;
    print_help();

    'game_loop: loop {
        print_status(&manager);
        // A loaded save can hold a promotion that was never completed.
        if manager.game().game_state() == GameState::Running && manager.game().pending_promotion().is_some() {
            if !prompt_promotion(&mut manager)? {
                println!("\nEnd of input during promotion. Quitting game.");
                break 'game_loop;
            }
            manager.take_notifications();
            continue 'game_loop;
        }
        let game = manager.game();
        let prompt = match game.game_state() {
            GameState::CheckmateCurrentWins => format!("\n=== GAME OVER: {} wins by checkmate. ===\nCommand: ", game.current_player_name()),
            GameState::CheckmateEnemyWins => format!("\n=== GAME OVER: {} wins by checkmate. ===\nCommand: ", game.enemy_player_name()),
            GameState::Stalemate => "\n=== GAME OVER: Draw by stalemate. ===\nCommand: ".to_string(),
            _ => format!("\n{} ({})'s turn. Enter move (e.g. e2e4) or command: ",
                game.current_player_name(), game.current_player_color()),
        };

        let Some(input) = read_line(&prompt)? else {
            println!("\nEnd of input detected. Quitting game.");
            break 'game_loop;
        };
        if input.is_empty() { continue 'game_loop; }

        let outcome = match parse_user_input(&input) {
            Ok(UserInput::Move(from, to)) => {
                let result = manager.move_piece(&from, &to);
                if let Some(message) = describe_result(result) {
                    println!("Error: {}", message);
                }
                if result == MoveResult::Promotion && !prompt_promotion(&mut manager)? {
                    println!("\nEnd of input during promotion. Quitting game.");
                    break 'game_loop;
                }
                Ok(false)
            }
            Ok(UserInput::Command(command)) => run_command(&mut manager, command),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(true) => break 'game_loop,
            Ok(false) => {}
            Err(e) => println!("Error: {}", e),
        }
        // Front-end redraws every turn; queued notifications are not needed here.
        manager.take_notifications();
    }

    println!("\nGame session finished.");
    Ok(())
}

/// Runs a non-move command. `Ok(true)` means quit.
fn run_command(manager: &mut GameManager, command: Command) -> Result<bool, CommandError> {
    match command {
        Command::Moves(square) => {
            let spot = Spot::from_notation(&square).filter(Spot::is_valid)
                .ok_or_else(|| CommandError::InvalidArgument(square.clone()))?;
            println!("{}", manager.game_mut().legal_moves_string(spot.row, spot.col));
        }
        Command::Undo => if !manager.undo() { println!("Nothing to undo."); },
        Command::Redo => if !manager.redo() { println!("Nothing to redo."); },
        Command::Log => {
            for entry in manager.game().log().entries() {
                println!("{}", entry);
            }
        }
        Command::New => {
            manager.start_new_game()?;
            println!("New game started.");
        }
        Command::Help => print_help(),
        Command::Quit => {
            println!("Exiting game.");
            return Ok(true);
        }
        Command::Export(file) => {
            let written = manager.export_to_file(&file)?;
            println!("Position exported to '{}'.", written);
        }
        Command::Import(file) => {
            manager.import_from_file(&file)?;
            println!("Position imported from '{}'.", file);
        }
        Command::Save(file) => {
            let written = manager.save_game(&file)?;
            println!("Game saved to '{}'.", written);
        }
        Command::Load(file) => {
            manager.load_game(&file)?;
            println!("Game loaded from '{}'.", file);
        }
    }
    Ok(false)
}

/// Prints available commands.
fn print_help() {
    println!("\nAvailable Commands:");
    println!("  <move>         Enter a move as two squares (e.g., e2e4, e2 e4, e2-e4).");
    println!("                 Castle by moving the king two squares (e1g1). You will be");
    println!("                 prompted for a piece when a pawn reaches the last rank.");
    println!("  moves <sq>     List legal destinations of the piece on <sq>.");
    println!("  undo / redo    Take back or replay a move.");
    println!("  log            Show the full game log.");
    println!("  export [file]  Write the position as text (default: {}).", DEFAULT_EXPORT_FILENAME);
    println!("  import [file]  Read a position written by export.");
    println!("  save [file]    Save the whole game (default: {}).", DEFAULT_SAVE_FILENAME);
    println!("  load [file]    Load a saved game.");
    println!("  new            Start a new game with the same players.");
    println!("  help           Show this help message.");
    println!("  quit / exit    Exit the game.");
    println!();
}
