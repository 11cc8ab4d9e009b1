use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::codec;
use crate::error::{CodecError, GameError, LoadError};
use crate::food::{self, FoodKind, TimedFood, TimerEvent, BONUS_RULES, HAZARD_RULES, HAZARD_SHRINK, REGULAR_POINTS};
use crate::geometry::{Board, Direction, Position};
use crate::scores::ScoreStore;
use crate::snake::Snake;

pub const FOODS_PER_LEVEL: u32 = 5;
pub const EASY_MODE_PENALTY: u32 = 25;

const BASE_INTERVAL_MS: f64 = 150.0;
const MIN_INTERVAL_MS: f64 = 50.0;
const LEVEL_STEP_MS: f64 = 5.0;
// Terminal cells are roughly twice as tall as they are wide
const VERTICAL_FACTOR: f64 = 1.8;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedTier {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl SpeedTier {
    pub fn factor(self) -> f64 {
        match self {
            SpeedTier::Slow => 1.5,
            SpeedTier::Normal => 1.0,
            SpeedTier::Fast => 0.7,
        }
    }

    pub fn next(self) -> SpeedTier {
        match self {
            SpeedTier::Slow => SpeedTier::Normal,
            SpeedTier::Normal => SpeedTier::Fast,
            SpeedTier::Fast => SpeedTier::Slow,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SpeedTier::Slow => "slow",
            SpeedTier::Normal => "normal",
            SpeedTier::Fast => "fast",
        }
    }
}

/// Rules fixed for the length of a session.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Modes {
    pub easy: bool,
    pub wrap: bool,
    pub speed: SpeedTier,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Foods {
    /// Always on the board.
    pub regular: Position,
    pub bonus: TimedFood,
    pub hazard: TimedFood,
}

#[derive(Copy, Clone, Debug)]
enum Slot {
    Bonus,
    Hazard,
}

impl Foods {
    pub fn new(regular: Position) -> Self {
        Foods { regular, bonus: TimedFood::new(BONUS_RULES), hazard: TimedFood::new(HAZARD_RULES) }
    }

    pub fn occupies(&self, pos: Position) -> bool {
        self.regular == pos || self.bonus.is_at(pos) || self.hazard.is_at(pos)
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut TimedFood {
        match slot {
            Slot::Bonus => &mut self.bonus,
            Slot::Hazard => &mut self.hazard,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    pub board: Board,
    pub snake: Snake,
    pub food: Foods,
    pub score: u32,
    /// Session cache of the score store's best.
    pub high_score: u32,
    pub foods_eaten: u32,
    pub level: u32,
    pub game_over: bool,
    pub paused: bool,
    pub modes: Modes,
    /// Only drives the body animation.
    pub tick_count: u64,
}

impl GameState {
    pub fn is_occupied(&self, pos: Position) -> bool {
        self.snake.occupies(pos) || self.food.occupies(pos)
    }
}

pub fn level_for(foods_eaten: u32) -> u32 {
    foods_eaten / FOODS_PER_LEVEL + 1
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Paused or over, nothing happened.
    Idle,
    Moved,
    Ate(FoodKind),
    /// Easy mode turned a crash into a penalty.
    SoftReset,
    GameOver,
}

/// Read-only view handed to the renderer.
#[derive(Clone, Debug)]
pub struct Snapshot<'a> {
    pub board: Board,
    pub snake: &'a VecDeque<Position>,
    pub heading: Direction,
    pub foods: Vec<(Position, FoodKind)>,
    pub score: u32,
    pub high_score: u32,
    pub level: u32,
    pub game_over: bool,
    pub paused: bool,
    pub tick_count: u64,
    pub bonus_remaining: Option<u32>,
    pub modes: Modes,
}

pub struct Game<S: ScoreStore> {
    state: GameState,
    store: S,
    rng: StdRng,
}

impl<S: ScoreStore> Game<S> {
    pub fn new(modes: Modes, store: S) -> Result<Self, GameError> {
        Self::with_rng(modes, store, StdRng::from_entropy())
    }

    pub fn with_seed(modes: Modes, store: S, seed: u64) -> Result<Self, GameError> {
        Self::with_rng(modes, store, StdRng::seed_from_u64(seed))
    }

    fn with_rng(modes: Modes, store: S, mut rng: StdRng) -> Result<Self, GameError> {
        let state = fresh_state(&mut rng, modes, store.best())?;
        Ok(Game { state, store, rng })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access for scripted setups.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn reset(&mut self) -> Result<(), GameError> {
        self.state = fresh_state(&mut self.rng, self.state.modes, self.store.best())?;
        info!(modes = ?self.state.modes, "new game");
        Ok(())
    }

    pub fn reconfigure(&mut self, modes: Modes) -> Result<(), GameError> {
        self.state.modes = modes;
        self.reset()
    }

    /// Requests a heading change for the next tick. Invalid turns are dropped.
    pub fn steer(&mut self, direction: Direction) -> bool {
        if self.state.game_over || self.state.paused {
            return false;
        }

        // Across an edge the neck is only adjacent once wrapped
        let snake = &self.state.snake;
        if self.state.modes.wrap && snake.len() > 1 && self.state.board.wrap(snake.head() + direction) == snake.body()[1] {
            return false;
        }
        self.state.snake.set_direction(direction)
    }

    pub fn toggle_pause(&mut self) {
        if !self.state.game_over {
            self.state.paused = !self.state.paused;
        }
    }

    pub fn tick(&mut self) -> Result<TickOutcome, GameError> {
        if self.state.game_over || self.state.paused {
            return Ok(TickOutcome::Idle);
        }
        self.state.tick_count += 1;

        let mut head = self.state.snake.next_head();
        if self.state.modes.wrap {
            head = self.state.board.wrap(head);
        }

        self.advance_timers(head)?;

        let out_of_bounds = !self.state.modes.wrap && !self.state.board.in_interior(head);
        if out_of_bounds || self.state.snake.hits_self(head) {
            return self.crash(head);
        }

        let state = &mut self.state;
        let eaten = if state.food.bonus.is_at(head) {
            Some(FoodKind::Bonus)
        } else if state.food.hazard.is_at(head) {
            Some(FoodKind::Hazard)
        } else if state.food.regular == head {
            Some(FoodKind::Regular)
        } else {
            None
        };

        let grow = match eaten {
            Some(FoodKind::Bonus) => {
                state.score = state.score.saturating_add(state.food.bonus.rules().points);
                state.foods_eaten = state.foods_eaten.saturating_add(1);
                state.food.bonus.deactivate();
                true
            }
            Some(FoodKind::Hazard) => {
                state.score = state.score.saturating_sub(state.food.hazard.rules().points);
                state.food.hazard.deactivate();
                state.snake.shrink(HAZARD_SHRINK);
                false
            }
            Some(FoodKind::Regular) => {
                state.score = state.score.saturating_add(REGULAR_POINTS);
                state.foods_eaten = state.foods_eaten.saturating_add(1);
                true
            }
            None => false,
        };

        state.snake.advance(head, grow);
        state.level = level_for(state.foods_eaten);

        // Relocated after the move so it never lands under the new head
        if matches!(eaten, Some(FoodKind::Bonus | FoodKind::Regular)) {
            self.state.food.regular = place_food(&mut self.rng, &self.state)?;
        }
        if eaten == Some(FoodKind::Regular) {
            self.roll_spawn(Slot::Bonus, None)?;
            self.roll_spawn(Slot::Hazard, None)?;
        }

        Ok(match eaten {
            Some(kind) => {
                debug!(?kind, score = self.state.score, len = self.state.snake.len(), "food eaten");
                TickOutcome::Ate(kind)
            }
            None => TickOutcome::Moved,
        })
    }

    /// Advisory delay before the next tick.
    pub fn tick_interval(&self) -> Duration {
        let level_ms = BASE_INTERVAL_MS - LEVEL_STEP_MS * self.state.level as f64;
        let mut ms = level_ms.max(MIN_INTERVAL_MS);
        if self.state.snake.direction().is_vertical() {
            ms *= VERTICAL_FACTOR;
        }
        ms *= self.state.modes.speed.factor();
        Duration::from_millis(ms.round() as u64)
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        let state = &self.state;
        let mut foods = vec![(state.food.regular, FoodKind::Regular)];
        foods.extend(state.food.bonus.position().map(|pos| (pos, FoodKind::Bonus)));
        foods.extend(state.food.hazard.position().map(|pos| (pos, FoodKind::Hazard)));

        Snapshot {
            board: state.board,
            snake: state.snake.body(),
            heading: state.snake.direction(),
            foods,
            score: state.score,
            high_score: state.high_score,
            level: state.level,
            game_over: state.game_over,
            paused: state.paused,
            tick_count: state.tick_count,
            bonus_remaining: state.food.bonus.remaining(),
            modes: state.modes,
        }
    }

    pub fn save_string(&self) -> String {
        codec::encode(&self.state)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> io::Result<()> {
        fs::write(path.as_ref(), self.save_string())?;
        info!(path = %path.as_ref().display(), score = self.state.score, "game saved");
        Ok(())
    }

    /// Replaces the whole state with the decoded one. On error nothing changes.
    pub fn load_str(&mut self, text: &str) -> Result<(), CodecError> {
        let mut state = codec::decode(text)?;
        state.high_score = self.store.best();
        self.state = state;
        Ok(())
    }

    pub fn load_from(&mut self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        let text = fs::read_to_string(path.as_ref())?;
        self.load_str(&text)?;
        info!(path = %path.as_ref().display(), score = self.state.score, "game loaded");
        Ok(())
    }

    ///////////////////////////////////////////////////////////////////////////

    fn advance_timers(&mut self, head: Position) -> Result<(), GameError> {
        for slot in [Slot::Bonus, Slot::Hazard] {
            let event = self.state.food.slot_mut(slot).tick();
            match event {
                TimerEvent::Ready => self.roll_spawn(slot, Some(head))?,
                TimerEvent::Expired(at) => debug!(?slot, x = at.x, y = at.y, "food expired"),
                TimerEvent::Idle => {}
            }
        }
        Ok(())
    }

    fn roll_spawn(&mut self, slot: Slot, avoid: Option<Position>) -> Result<(), GameError> {
        if !self.state.food.slot_mut(slot).roll(&mut self.rng) {
            return Ok(());
        }

        let state = &self.state;
        let at = food::free_cell(&mut self.rng, &state.board, |pos| state.is_occupied(pos) || Some(pos) == avoid)?;
        self.state.food.slot_mut(slot).activate(at);
        Ok(())
    }

    fn crash(&mut self, head: Position) -> Result<TickOutcome, GameError> {
        let state = &mut self.state;

        if state.modes.easy {
            state.score = state.score.saturating_sub(EASY_MODE_PENALTY);
            state.snake = Snake::new(state.board.center(), Direction::Right);
            state.food = Foods::new(state.board.center());
            state.food.regular = place_food(&mut self.rng, state)?;
            info!(x = head.x, y = head.y, score = state.score, "crashed in easy mode, penalty applied");
            return Ok(TickOutcome::SoftReset);
        }

        state.game_over = true;
        if state.score > state.high_score {
            state.high_score = state.score;
        }
        if state.score > 0 {
            self.store.record(state.score);
        }
        info!(x = head.x, y = head.y, score = state.score, level = state.level, "game over");
        Ok(TickOutcome::GameOver)
    }
}

fn place_food(rng: &mut StdRng, state: &GameState) -> Result<Position, GameError> {
    food::free_cell(rng, &state.board, |pos| state.is_occupied(pos))
}

fn fresh_state(rng: &mut StdRng, modes: Modes, high_score: u32) -> Result<GameState, GameError> {
    let board = Board::default();
    let center = board.center();
    let mut state = GameState {
        board,
        snake: Snake::new(center, Direction::Right),
        // Placeholder until a free cell is drawn
        food: Foods::new(center),
        score: 0,
        high_score,
        foods_eaten: 0,
        level: 1,
        game_over: false,
        paused: false,
        modes,
        tick_count: 0,
    };
    state.food.regular = place_food(rng, &state)?;
    Ok(state)
}
