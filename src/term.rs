use crate::{Coords, TermInt};
use crate::game::Snapshot;
use crate::geometry::{Direction, Position};
use crate::input::{self, Key};
use std::{io::{self, Stdout, Write, stdout}, time::Duration};

use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, read, poll};

const WALL_CHAR: char = '#';
const SNAKE_BODY_CHARS: [char; 2] = ['O', 'o'];
const DEAD_SNAKE_CHAR: char = 'X';
const HUD_WIDTH: usize = 60;
const CONTROLS: &str = "Arrows/WASD move  P pause  Ctrl+C quit";

pub struct TermManager {
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
    screen: Vec<char>,
    current_msg: Option<Message>,
}

struct Message {
    top_left: Coords,
    width: TermInt,
    height: TermInt,
}

/// Lays out one full frame, board rows first and the status lines below.
pub fn compose(snap: &Snapshot, status: Option<&str>) -> Vec<String> {
    let (w, h) = (snap.board.width(), snap.board.height());
    let mut grid: Vec<Vec<char>> = (0..h)
        .map(|y| {
            (0..w)
                .map(|x| if x == 0 || y == 0 || x == w - 1 || y == h - 1 { WALL_CHAR } else { ' ' })
                .collect()
        })
        .collect();

    let mut put = |pos: Position, ch: char| {
        if pos.x >= 0 && pos.y >= 0 && pos.x < w && pos.y < h {
            grid[pos.y as usize][pos.x as usize] = ch;
        }
    };

    for (pos, kind) in &snap.foods {
        put(*pos, kind.glyph());
    }

    // Tail first so the head wins if anything overlaps
    for (i, pos) in snap.snake.iter().enumerate().rev() {
        let ch = if snap.game_over {
            DEAD_SNAKE_CHAR
        } else if i == 0 {
            head_char(snap.heading)
        } else {
            SNAKE_BODY_CHARS[((i as u64 + snap.tick_count) % 2) as usize]
        };
        put(*pos, ch);
    }

    let mut rows: Vec<String> = grid.into_iter().map(|row| row.into_iter().collect()).collect();

    let bonus = match snap.bonus_remaining {
        Some(ticks) => format!("Bonus $ on the board, {ticks} ticks left"),
        None => String::new(),
    };
    let modes = format!(
        "{} | {} | speed {}",
        if snap.modes.easy { "easy" } else { "normal" },
        if snap.modes.wrap { "wrap-around" } else { "walls" },
        snap.modes.speed.label(),
    );
    let hud = [
        format!(
            "Score: {:>6}  High: {:>6}  Level: {:>3}  Length: {:>3}",
            snap.score,
            snap.high_score.max(snap.score),
            snap.level,
            snap.snake.len()
        ),
        modes,
        bonus,
        status.unwrap_or(CONTROLS).to_string(),
    ];
    rows.extend(hud.into_iter().map(|line| format!("{line:<HUD_WIDTH$}")));
    rows
}

fn head_char(direction: Direction) -> char {
    match direction {
        Direction::Up => '^',
        Direction::Down => 'v',
        Direction::Left => '<',
        Direction::Right => '>',
    }
}

impl TermManager {
    pub fn new() -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let stdout = stdout();
        let screen = vec![' '; width as usize * height as usize];
        Ok(TermManager { width, height, stdout, screen, current_msg: None })
    }

    pub fn setup(&mut self) -> io::Result<()> {
        execute!(self.stdout, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking)
    }

    pub fn restore(&mut self) -> io::Result<()> {
        terminal::disable_raw_mode()?;
        execute!(self.stdout, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)
    }

    pub fn read_key_blocking(&self) -> io::Result<Key> {
        loop {
            if let Event::Key(ev) = read()? {
                if let Some(key) = input::decode(&ev) {
                    return Ok(key);
                }
            }
        }
    }

    /// Drains whatever keys are already waiting, without blocking.
    pub fn read_key_events_queue(&self) -> io::Result<Vec<Key>> {
        let mut keys = vec![];

        while poll(Duration::ZERO)? {
            if let Event::Key(ev) = read()? {
                keys.extend(input::decode(&ev));
            }
        }

        Ok(keys)
    }

    /// Brings the screen in line with `rows`, touching only cells that changed.
    pub fn draw_rows(&mut self, rows: &[String]) -> io::Result<()> {
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let pos = (x as TermInt, y as TermInt);
                if self.cell(pos) != Some(ch) {
                    self.print_at(pos, ch)?;
                }
            }
        }

        self.flush()
    }

    pub fn draw(&mut self, snap: &Snapshot, status: Option<&str>) -> io::Result<()> {
        self.draw_rows(&compose(snap, status))
    }

    /// Shows a framed box of centered lines over the board.
    pub fn show_message(&mut self, lines: &[&str]) -> io::Result<()> {
        if self.has_message() {
            self.hide_message()?;
        }

        let msg_height = (lines.len() + 2) as TermInt;
        let msg_width = (lines.iter().map(|x| x.chars().count()).max().unwrap_or(0) + 4) as TermInt;
        let center = (HUD_WIDTH as TermInt / 2, crate::geometry::BOARD_HEIGHT as TermInt / 2);
        let top_left = (center.0.saturating_sub(msg_width / 2), center.1.saturating_sub(msg_height / 2));

        for y_diff in 0..msg_height {
            let y = top_left.1 + y_diff;
            let line = match y_diff {
                0 => format!("+{}+", "-".repeat(msg_width as usize - 2)),
                d if d == msg_height - 1 => format!("+{}+", "-".repeat(msg_width as usize - 2)),
                d => format!("|{: ^width$}|", lines[d as usize - 1], width = msg_width as usize - 2),
            };
            for (x_diff, ch) in line.chars().enumerate() {
                self.print_at_no_save((top_left.0 + x_diff as TermInt, y), ch)?;
            }
        }

        self.current_msg = Some(Message { top_left, width: msg_width, height: msg_height });
        self.flush()
    }

    pub fn hide_message(&mut self) -> io::Result<()> {
        let Some(msg) = self.current_msg.take() else {
            return Ok(());
        };
        let (left, top) = msg.top_left;

        // Repaint what the box covered from the screen buffer
        for y in top..top + msg.height {
            for x in left..left + msg.width {
                let pos = (x, y);
                if let Some(ch) = self.cell(pos) {
                    self.print_at_no_save(pos, ch)?;
                }
            }
        }

        self.flush()
    }

    pub fn print_at(&mut self, pos: Coords, ch: char) -> io::Result<()> {
        let Some(idx) = self.index(pos) else {
            return Ok(());
        };
        self.screen[idx] = ch;

        // Cells under a message box are only remembered until it goes away
        if self.current_msg.as_ref().map_or(false, |msg| msg.covers(pos)) {
            return Ok(());
        }
        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(ch))
    }

    pub fn clear(&mut self) -> io::Result<()> {
        self.current_msg = None;
        execute!(self.stdout, terminal::Clear(ClearType::All))?;
        self.screen = vec![' '; self.width as usize * self.height as usize];
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }

    pub fn has_message(&self) -> bool {
        self.current_msg.is_some()
    }

    ///////////////////////////////////////////////////////////////////////////

    fn index(&self, pos: Coords) -> Option<usize> {
        if pos.0 < self.width && pos.1 < self.height {
            Some(self.width as usize * pos.1 as usize + pos.0 as usize)
        } else {
            None
        }
    }

    fn cell(&self, pos: Coords) -> Option<char> {
        self.index(pos).map(|idx| self.screen[idx])
    }

    fn print_at_no_save(&mut self, pos: Coords, ch: char) -> io::Result<()> {
        // Box frames bypass the screen buffer
        if self.index(pos).is_none() {
            return Ok(());
        }
        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(ch))
    }
}

impl Message {
    fn covers(&self, pos: Coords) -> bool {
        let (x, y) = self.top_left;
        pos.0 >= x && pos.0 < x + self.width && pos.1 >= y && pos.1 < y + self.height
    }
}
