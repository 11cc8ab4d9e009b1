use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::geometry::Direction::{self, *};

/// A decoded key press. Anything else the terminal reports is "no input".
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Arrow(Direction),
    Enter,
    Esc,
    CtrlC,
}

pub fn decode(ev: &KeyEvent) -> Option<Key> {
    if ev.kind == KeyEventKind::Release {
        return None;
    }

    match ev.code {
        KeyCode::Char('c') if ev.modifiers.contains(KeyModifiers::CONTROL) => Some(Key::CtrlC),
        KeyCode::Char(ch) if !ch.is_control() => Some(Key::Char(ch.to_ascii_lowercase())),
        KeyCode::Up => Some(Key::Arrow(Up)),
        KeyCode::Down => Some(Key::Arrow(Down)),
        KeyCode::Left => Some(Key::Arrow(Left)),
        KeyCode::Right => Some(Key::Arrow(Right)),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Esc => Some(Key::Esc),
        _ => None,
    }
}

/// What a key means while a game is on screen.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Steer(Direction),
    TogglePause,
    Save,
    Load,
    Restart,
    Menu,
    Quit,
}

pub fn steering(key: Key) -> Option<Direction> {
    match key {
        Key::Arrow(dir) => Some(dir),
        Key::Char('w') => Some(Up),
        Key::Char('a') => Some(Left),
        Key::Char('s') => Some(Down),
        Key::Char('d') => Some(Right),
        _ => None,
    }
}

/// What a key means on the main menu, which lists `items` entries.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MenuCommand {
    Previous,
    Next,
    Activate,
    /// Jump straight to an entry by its zero-based index.
    Pick(usize),
    Quit,
}

pub fn menu_command(key: Key, items: usize) -> Option<MenuCommand> {
    if let Key::Char(ch) = key {
        if let Some(n) = ch.to_digit(10) {
            let n = n as usize;
            return (1..=items).contains(&n).then(|| MenuCommand::Pick(n - 1));
        }
    }

    match key {
        Key::CtrlC | Key::Esc | Key::Char('q') => Some(MenuCommand::Quit),
        Key::Enter | Key::Char(' ') => Some(MenuCommand::Activate),
        _ => match steering(key)? {
            Up => Some(MenuCommand::Previous),
            Down => Some(MenuCommand::Next),
            Left | Right => None,
        },
    }
}

pub fn play_command(key: Key, paused: bool, game_over: bool) -> Option<Command> {
    if key == Key::CtrlC {
        return Some(Command::Quit);
    }

    if game_over {
        return match key {
            Key::Char('r') => Some(Command::Restart),
            Key::Char('q') | Key::Esc => Some(Command::Menu),
            _ => None,
        };
    }

    if paused {
        return match key {
            Key::Char('p') | Key::Esc => Some(Command::TogglePause),
            Key::Char('s') => Some(Command::Save),
            Key::Char('l') => Some(Command::Load),
            Key::Char('q') => Some(Command::Menu),
            _ => None,
        };
    }

    match key {
        Key::Char('p') | Key::Esc => Some(Command::TogglePause),
        _ => steering(key).map(Command::Steer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent { code, modifiers, kind: KeyEventKind::Press, state: KeyEventState::NONE }
    }

    #[test]
    fn decodes_arrows_and_letters() {
        assert_eq!(decode(&press(KeyCode::Left, KeyModifiers::NONE)), Some(Key::Arrow(Left)));
        assert_eq!(decode(&press(KeyCode::Char('W'), KeyModifiers::SHIFT)), Some(Key::Char('w')));
        assert_eq!(decode(&press(KeyCode::Char('c'), KeyModifiers::CONTROL)), Some(Key::CtrlC));
    }

    #[test]
    fn unknown_keys_are_no_input() {
        assert_eq!(decode(&press(KeyCode::F(5), KeyModifiers::NONE)), None);
        assert_eq!(decode(&press(KeyCode::Tab, KeyModifiers::NONE)), None);

        let mut release = press(KeyCode::Up, KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert_eq!(decode(&release), None);
    }

    #[test]
    fn keys_depend_on_game_phase() {
        let s = Key::Char('s');
        assert_eq!(play_command(s, false, false), Some(Command::Steer(Down)));
        assert_eq!(play_command(s, true, false), Some(Command::Save));
        assert_eq!(play_command(s, false, true), None);

        assert_eq!(play_command(Key::Char('r'), false, true), Some(Command::Restart));
        assert_eq!(play_command(Key::Char('r'), false, false), None);
        assert_eq!(play_command(Key::Arrow(Up), true, false), None);
        assert_eq!(play_command(Key::CtrlC, true, true), Some(Command::Quit));
    }

    #[test]
    fn menu_keys() {
        assert_eq!(menu_command(Key::Esc, 7), Some(MenuCommand::Quit));
        assert_eq!(menu_command(Key::Char('q'), 7), Some(MenuCommand::Quit));
        assert_eq!(menu_command(Key::Char(' '), 7), Some(MenuCommand::Activate));
        assert_eq!(menu_command(Key::Char('3'), 7), Some(MenuCommand::Pick(2)));
        assert_eq!(menu_command(Key::Char('8'), 7), None);
        assert_eq!(menu_command(Key::Char('0'), 7), None);
        assert_eq!(menu_command(Key::Char('w'), 7), Some(MenuCommand::Previous));
        assert_eq!(menu_command(Key::Arrow(Down), 7), Some(MenuCommand::Next));
        assert_eq!(menu_command(Key::Char('d'), 7), None);
    }
}
