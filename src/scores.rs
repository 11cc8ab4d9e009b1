use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{info, warn};

pub const LEADERBOARD_CAPACITY: usize = 10;
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Where finished games are reported. Injected into the game rather than
/// reached through any global.
pub trait ScoreStore {
    fn record(&mut self, score: u32);

    /// Highest recorded score, 0 when nothing has been recorded.
    fn best(&self) -> u32;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreEntry {
    pub score: u32,
    pub timestamp: String,
}

impl ScoreEntry {
    fn parse(line: &str) -> Option<ScoreEntry> {
        let line = line.trim_end();
        let (score, timestamp) = match line.split_once(' ') {
            Some((score, rest)) => (score, rest),
            None => (line, ""),
        };
        let score = score.parse().ok()?;
        Some(ScoreEntry { score, timestamp: timestamp.to_string() })
    }
}

/// Top scores, highest first, never longer than [`LEADERBOARD_CAPACITY`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Leaderboard {
    entries: Vec<ScoreEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Leaderboard::default()
    }

    pub fn from_entries(mut entries: Vec<ScoreEntry>) -> Self {
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(LEADERBOARD_CAPACITY);
        Leaderboard { entries }
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn submit(&mut self, score: u32, timestamp: String) {
        self.entries.push(ScoreEntry { score, timestamp });
        // Stable, so equal scores keep their submission order
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(LEADERBOARD_CAPACITY);
    }

    pub fn parse(text: &str) -> Self {
        let entries = text.lines().filter_map(ScoreEntry::parse).collect();
        Leaderboard::from_entries(entries)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            let _ = writeln!(out, "{} {}", entry.score, entry.timestamp);
        }
        out
    }
}

impl ScoreStore for Leaderboard {
    fn record(&mut self, score: u32) {
        self.submit(score, Local::now().format(TIMESTAMP_FORMAT).to_string());
    }

    fn best(&self) -> u32 {
        self.entries.first().map_or(0, |entry| entry.score)
    }
}

/// Leaderboard persisted to a text file, one `<score> <timestamp>` per line.
/// Persistence is best-effort: an unreadable file reads as an empty board and
/// a failed write only logs.
#[derive(Debug)]
pub struct FileScoreStore {
    path: PathBuf,
    board: Leaderboard,
}

impl FileScoreStore {
    pub fn open(path: impl AsRef<Path>) -> Self {
        let mut store = FileScoreStore { path: path.as_ref().to_path_buf(), board: Leaderboard::new() };
        store.load();
        store
    }

    /// Re-reads the file, replacing whatever was cached.
    pub fn load(&mut self) -> &[ScoreEntry] {
        self.board = match fs::read_to_string(&self.path) {
            Ok(text) => Leaderboard::parse(&text),
            Err(err) => {
                if self.path.exists() {
                    warn!(path = %self.path.display(), %err, "score file unreadable, starting empty");
                }
                Leaderboard::new()
            }
        };
        self.board.entries()
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        self.board.entries()
    }

    fn persist(&self) {
        if let Err(err) = fs::write(&self.path, self.board.render()) {
            warn!(path = %self.path.display(), %err, "could not write score file");
        }
    }
}

impl ScoreStore for FileScoreStore {
    fn record(&mut self, score: u32) {
        self.board.record(score);
        self.persist();
        info!(score, "score recorded");
    }

    fn best(&self) -> u32 {
        self.board.best()
    }
}
