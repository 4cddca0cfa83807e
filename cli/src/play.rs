use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use slidemash_core::{Direction, GameBoard, GameError, MoveOutcome};
use std::io::{self, Write};

use crate::settings::{Action, KeyMap};

/// Runs the interactive game until the player quits.
pub(crate) fn run(board: &mut GameBoard, keys: &KeyMap) -> anyhow::Result<()> {
    let mut stdout = io::stdout();
    let screen = GameScreen::enter(&mut stdout)?;
    let result = event_loop(board, keys, &mut stdout);
    drop(screen);

    if result.is_ok() {
        println!("{board}");
        println!("Final score: {}", board.score());
    }
    result
}

/// Raw mode on the alternate screen, restored when dropped so early returns leave a usable terminal.
struct GameScreen;

impl GameScreen {
    fn enter(out: &mut impl Write) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let screen = Self;
        execute!(out, EnterAlternateScreen, Hide)?;
        Ok(screen)
    }
}

impl Drop for GameScreen {
    fn drop(&mut self) {
        if let Err(err) = terminal::disable_raw_mode() {
            log::warn!("Could not leave raw mode: {}", err);
        }
        if let Err(err) = execute!(io::stdout(), Show, LeaveAlternateScreen) {
            log::warn!("Could not restore the screen: {}", err);
        }
    }
}

fn event_loop(board: &mut GameBoard, keys: &KeyMap, out: &mut impl Write) -> anyhow::Result<()> {
    let mut game_over = !board.has_move();
    let mut status = String::from("Make a move");

    loop {
        draw(out, board, &status)?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(());
        }
        let Some(name) = key_name(key.code) else {
            continue;
        };
        let Some(action) = keys.action_for(&name) else {
            log::debug!("Unbound key {}", name);
            continue;
        };

        status = match action {
            Action::Quit => return Ok(()),
            Action::Restart => {
                board.reset(true)?;
                game_over = false;
                String::from("New game")
            }
            Action::Move(_) if game_over => String::from("Game over, restart or quit"),
            Action::Move(direction) => apply_move(board, direction, &mut game_over)?,
        };
    }
}

/// Plays `direction` and describes what happened. Only unexpected board errors are returned.
pub(crate) fn apply_move(
    board: &mut GameBoard,
    direction: Direction,
    game_over: &mut bool,
) -> anyhow::Result<String> {
    Ok(match board.move_tiles(direction) {
        Ok(MoveOutcome::Moved { gained: 0 }) => format!("Moved {direction}"),
        Ok(MoveOutcome::Moved { gained }) => format!("Moved {direction}, +{gained}"),
        Ok(MoveOutcome::GameOver { .. }) => {
            *game_over = true;
            format!("Game over! Final score {}", board.score())
        }
        Err(GameError::InvalidMove(_)) => format!("Cannot move {direction}"),
        Err(err @ GameError::TileOverflow(_)) => format!("Cannot move {direction}: {err}"),
        Err(err) => return Err(err.into()),
    })
}

/// Name used for `code` in the key map.
fn key_name(code: KeyCode) -> Option<String> {
    let name = match code {
        KeyCode::Char(c) => return Some(c.to_ascii_lowercase().to_string()),
        KeyCode::Up => "up",
        KeyCode::Down => "down",
        KeyCode::Left => "left",
        KeyCode::Right => "right",
        KeyCode::Esc => "esc",
        KeyCode::Enter => "enter",
        KeyCode::Backspace => "backspace",
        KeyCode::Tab => "tab",
        _ => return None,
    };
    Some(name.to_string())
}

fn draw(out: &mut impl Write, board: &GameBoard, status: &str) -> io::Result<()> {
    queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    queue!(out, Print(format!("Score: {}", board.score())), Print("\r\n"))?;
    for line in board.pretty().lines() {
        queue!(out, Print(line), Print("\r\n"))?;
    }
    queue!(out, Print(status), Print("\r\n"))?;
    out.flush()
}
