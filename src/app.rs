use std::{io, thread::sleep};

use anyhow::Context;
use tracing::{info, warn};

use crate::config::Settings;
use crate::game::{Game, Modes, TickOutcome, EASY_MODE_PENALTY};
use crate::input::{self, Command, MenuCommand};
use crate::scores::{FileScoreStore, ScoreStore};
use crate::term::TermManager;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum MenuItem {
    NewGame,
    Continue,
    Leaderboard,
    ToggleEasy,
    ToggleWrap,
    CycleSpeed,
    Quit,
}

const MENU: [MenuItem; 7] = [
    MenuItem::NewGame,
    MenuItem::Continue,
    MenuItem::Leaderboard,
    MenuItem::ToggleEasy,
    MenuItem::ToggleWrap,
    MenuItem::CycleSpeed,
    MenuItem::Quit,
];

impl MenuItem {
    fn label(self, modes: &Modes) -> String {
        let on_off = |flag: bool| if flag { "on" } else { "off" };
        match self {
            MenuItem::NewGame => "New game".to_string(),
            MenuItem::Continue => "Continue saved game".to_string(),
            MenuItem::Leaderboard => "Leaderboard".to_string(),
            MenuItem::ToggleEasy => format!("Easy mode: {}", on_off(modes.easy)),
            MenuItem::ToggleWrap => format!("Wrap-around: {}", on_off(modes.wrap)),
            MenuItem::CycleSpeed => format!("Speed: {}", modes.speed.label()),
            MenuItem::Quit => "Quit".to_string(),
        }
    }
}

/// What to do once a game screen is left.
enum Flow {
    Menu,
    Quit,
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Overlay {
    None,
    Paused,
    GameOver,
}

const PAUSE_LINES: [&str; 5] = ["Paused", "", "P or Esc to resume", "S save   L load", "Q main menu"];

pub struct App {
    term: TermManager,
    settings: Settings,
    modes: Modes,
    game: Game<FileScoreStore>,
    selected: usize,
}

impl App {
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let store = FileScoreStore::open(&settings.score_file);
        let modes = settings.modes();
        let game = Game::new(modes, store)?;
        let term = TermManager::new().context("reading terminal size")?;

        Ok(App { term, settings, modes, game, selected: 0 })
    }

    pub fn initialize(&mut self) -> io::Result<()> {
        self.term.setup()?;
        self.term.clear()
    }

    pub fn restore(&mut self) -> io::Result<()> {
        self.term.restore()
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        loop {
            let flow = match self.main_menu()? {
                MenuItem::NewGame => {
                    self.game.reconfigure(self.modes)?;
                    self.play()?
                }
                MenuItem::Continue => match self.game.load_from(&self.settings.save_file) {
                    Ok(()) => {
                        self.modes = self.game.state().modes;
                        self.play()?
                    }
                    Err(err) => {
                        warn!(%err, "could not continue saved game");
                        let reason = err.to_string();
                        self.notice(&["No saved game could be loaded", "", reason.as_str(), "", "Press any key"])?;
                        Flow::Menu
                    }
                },
                MenuItem::Leaderboard => {
                    self.show_leaderboard()?;
                    Flow::Menu
                }
                MenuItem::Quit => Flow::Quit,
                // Toggles are applied inside the menu
                _ => Flow::Menu,
            };

            if let Flow::Quit = flow {
                info!("quitting");
                return Ok(());
            }
        }
    }

    ///////////////////////////////////////////////////////////////////////////

    fn main_menu(&mut self) -> anyhow::Result<MenuItem> {
        self.term.clear()?;

        loop {
            let mut lines = vec!["SNAKE".to_string(), String::new()];
            for (i, item) in MENU.iter().enumerate() {
                let marker = if i == self.selected { ">>" } else { "  " };
                lines.push(format!("{marker} {}. {:<22}", i + 1, item.label(&self.modes)));
            }
            lines.push(String::new());
            lines.push(format!("High score: {}", self.game.store().best()));
            lines.push("Arrows or W/S, Enter to select".to_string());

            let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
            self.term.show_message(&refs)?;

            let chosen = match input::menu_command(self.term.read_key_blocking()?, MENU.len()) {
                Some(MenuCommand::Quit) => Some(MenuItem::Quit),
                Some(MenuCommand::Activate) => Some(MENU[self.selected]),
                Some(MenuCommand::Pick(index)) => {
                    self.selected = index;
                    Some(MENU[index])
                }
                Some(MenuCommand::Previous) => {
                    self.selected = (self.selected + MENU.len() - 1) % MENU.len();
                    None
                }
                Some(MenuCommand::Next) => {
                    self.selected = (self.selected + 1) % MENU.len();
                    None
                }
                None => None,
            };

            match chosen {
                Some(MenuItem::ToggleEasy) => self.modes.easy = !self.modes.easy,
                Some(MenuItem::ToggleWrap) => self.modes.wrap = !self.modes.wrap,
                Some(MenuItem::CycleSpeed) => self.modes.speed = self.modes.speed.next(),
                Some(item) => {
                    self.term.hide_message()?;
                    return Ok(item);
                }
                None => {}
            }
        }
    }

    fn play(&mut self) -> anyhow::Result<Flow> {
        self.term.clear()?;
        let mut status: Option<String> = None;
        let mut overlay = Overlay::None;

        loop {
            for key in self.term.read_key_events_queue()? {
                let state = self.game.state();
                let Some(command) = input::play_command(key, state.paused, state.game_over) else {
                    continue;
                };

                match command {
                    Command::Steer(dir) => {
                        self.game.steer(dir);
                    }
                    Command::TogglePause => {
                        self.game.toggle_pause();
                        status = None;
                    }
                    Command::Save => status = Some(self.save()),
                    Command::Load => status = Some(self.load()),
                    Command::Restart => {
                        self.game.reset()?;
                        status = None;
                    }
                    Command::Menu => return Ok(Flow::Menu),
                    Command::Quit => return Ok(Flow::Quit),
                }
            }

            match self.game.tick()? {
                TickOutcome::SoftReset => status = Some(format!("Crashed! -{EASY_MODE_PENALTY} points")),
                TickOutcome::GameOver => status = None,
                _ => {}
            }

            self.render(status.as_deref(), &mut overlay)?;
            sleep(self.game.tick_interval());
        }
    }

    fn render(&mut self, status: Option<&str>, overlay: &mut Overlay) -> io::Result<()> {
        let snap = self.game.snapshot();
        self.term.draw(&snap, status)?;

        let wanted = if snap.game_over {
            Overlay::GameOver
        } else if snap.paused {
            Overlay::Paused
        } else {
            Overlay::None
        };
        if wanted == *overlay {
            return Ok(());
        }

        self.term.hide_message()?;
        match wanted {
            Overlay::Paused => self.term.show_message(&PAUSE_LINES)?,
            Overlay::GameOver => {
                let score = format!("Final score: {}", snap.score);
                let level = format!("Level reached: {}", snap.level);
                let record = if snap.score > 0 && snap.score >= snap.high_score { "*** NEW HIGH SCORE! ***" } else { "" };
                self.term.show_message(&["GAME OVER!", "", score.as_str(), level.as_str(), record, "", "R to restart, Q for the menu"])?;
            }
            Overlay::None => {}
        }
        *overlay = wanted;
        Ok(())
    }

    fn save(&mut self) -> String {
        match self.game.save_to(&self.settings.save_file) {
            Ok(()) => format!("Game saved to {}", self.settings.save_file),
            Err(err) => {
                warn!(%err, "save failed");
                format!("Save failed: {err}")
            }
        }
    }

    fn load(&mut self) -> String {
        match self.game.load_from(&self.settings.save_file) {
            Ok(()) => {
                self.modes = self.game.state().modes;
                "Game loaded".to_string()
            }
            Err(err) => {
                warn!(%err, "load failed, keeping current game");
                format!("Load failed: {err}")
            }
        }
    }

    fn show_leaderboard(&mut self) -> anyhow::Result<()> {
        let entries = self.game.store_mut().load().to_vec();

        let mut lines = vec!["LEADERBOARD (Top 10)".to_string(), String::new(), "Rank   Score   Date & Time".to_string()];
        if entries.is_empty() {
            lines.push("No scores recorded yet.".to_string());
        }
        for (rank, entry) in entries.iter().enumerate() {
            lines.push(format!("{:>4}  {:>6}   {:<16}", rank + 1, entry.score, entry.timestamp));
        }
        lines.push(String::new());
        lines.push("Press any key to return".to_string());

        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        self.notice(&refs)
    }

    fn notice(&mut self, lines: &[&str]) -> anyhow::Result<()> {
        self.term.clear()?;
        self.term.show_message(lines)?;
        self.term.read_key_blocking()?;
        self.term.hide_message()?;
        Ok(())
    }
}
