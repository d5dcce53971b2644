use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::snake::Direction::{self, *};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Turn(Direction),
    TogglePause,
    Start,
    Restart,
    Quit,
}

/// Maps a key press to a game command. Keys without a binding give `None`.
pub fn command_for(ev: &KeyEvent) -> Option<Command> {
    if is_ctrl_c(ev) {
        return Some(Command::Quit);
    }

    let cmd = match ev.code {
        KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Up => Command::Turn(Up),
        KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => Command::Turn(Left),
        KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Down => Command::Turn(Down),
        KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => Command::Turn(Right),
        KeyCode::Char(' ') | KeyCode::Esc => Command::TogglePause,
        KeyCode::Enter => Command::Start,
        KeyCode::Char('r') | KeyCode::Char('R') => Command::Restart,
        KeyCode::Char('q') | KeyCode::Char('Q') => Command::Quit,
        _ => return None,
    };

    Some(cmd)
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}
