use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::error::GameError;
use crate::geometry::{Board, Position};

pub const REGULAR_POINTS: u32 = 10;

pub const BONUS_RULES: FoodRules = FoodRules {
    kind: FoodKind::Bonus,
    points: 50,
    spawn_chance: 20,
    lifetime: Some(30),
    cooldown: 20,
};

pub const HAZARD_RULES: FoodRules = FoodRules {
    kind: FoodKind::Hazard,
    points: 20,
    spawn_chance: 15,
    lifetime: None,
    cooldown: 40,
};

/// Segments lost when the head lands on a hazard.
pub const HAZARD_SHRINK: usize = 3;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FoodKind {
    Regular,
    Bonus,
    Hazard,
}

impl FoodKind {
    pub fn glyph(self) -> char {
        match self {
            FoodKind::Regular => '*',
            FoodKind::Bonus => '$',
            FoodKind::Hazard => '%',
        }
    }
}

/// Per-kind constants of a food that comes and goes on its own timers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FoodRules {
    pub kind: FoodKind,
    /// Points awarded (bonus) or taken away (hazard) on pickup.
    pub points: u32,
    /// Percent chance per ready tick of spawning.
    pub spawn_chance: u32,
    /// Ticks the food stays on the board uncollected; `None` stays forever.
    pub lifetime: Option<u32>,
    /// Ticks after deactivation during which no spawn is attempted.
    pub cooldown: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Presence {
    Cooling(u32),
    Ready,
    Active { at: Position, remaining: Option<u32> },
}

impl Presence {
    fn cooling(ticks: u32) -> Self {
        if ticks == 0 {
            Presence::Ready
        } else {
            Presence::Cooling(ticks)
        }
    }
}

/// What a timer step asks of the caller.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    Idle,
    /// Eligible to spawn this tick.
    Ready,
    Expired(Position),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimedFood {
    rules: FoodRules,
    presence: Presence,
}

impl TimedFood {
    pub fn new(rules: FoodRules) -> Self {
        TimedFood { rules, presence: Presence::cooling(rules.cooldown) }
    }

    pub fn with_presence(rules: FoodRules, presence: Presence) -> Self {
        TimedFood { rules, presence }
    }

    pub fn rules(&self) -> &FoodRules {
        &self.rules
    }

    pub fn presence(&self) -> Presence {
        self.presence
    }

    pub fn position(&self) -> Option<Position> {
        match self.presence {
            Presence::Active { at, .. } => Some(at),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.position().is_some()
    }

    pub fn is_at(&self, pos: Position) -> bool {
        self.position() == Some(pos)
    }

    pub fn is_ready(&self) -> bool {
        self.presence == Presence::Ready
    }

    /// Ticks left before an active food expires.
    pub fn remaining(&self) -> Option<u32> {
        match self.presence {
            Presence::Active { remaining, .. } => remaining,
            _ => None,
        }
    }

    /// Ticks left before spawning becomes possible; zero once ready or active.
    pub fn cooldown_left(&self) -> u32 {
        match self.presence {
            Presence::Cooling(n) => n,
            _ => 0,
        }
    }

    /// Runs the lifetime/cooldown countdown for one tick.
    pub fn tick(&mut self) -> TimerEvent {
        match self.presence {
            Presence::Active { at, remaining: Some(n) } => {
                if n <= 1 {
                    self.deactivate();
                    TimerEvent::Expired(at)
                } else {
                    self.presence = Presence::Active { at, remaining: Some(n - 1) };
                    TimerEvent::Idle
                }
            }
            Presence::Active { remaining: None, .. } => TimerEvent::Idle,
            Presence::Cooling(n) => {
                self.presence = Presence::cooling(n.saturating_sub(1));
                TimerEvent::Idle
            }
            Presence::Ready => TimerEvent::Ready,
        }
    }

    pub fn roll<R: Rng>(&self, rng: &mut R) -> bool {
        self.is_ready() && rng.gen_range(0..100) < self.rules.spawn_chance
    }

    pub fn activate(&mut self, at: Position) {
        self.presence = Presence::Active { at, remaining: self.rules.lifetime };
        debug!(kind = ?self.rules.kind, x = at.x, y = at.y, "food spawned");
    }

    /// Removes the food from the board and restarts its cooldown.
    pub fn deactivate(&mut self) {
        self.presence = Presence::cooling(self.rules.cooldown);
    }
}

/// Picks a uniformly random interior cell for which `blocked` is false.
/// Fails instead of spinning when the interior is full.
pub fn free_cell<R, F>(rng: &mut R, board: &Board, blocked: F) -> Result<Position, GameError>
where
    R: Rng,
    F: Fn(Position) -> bool,
{
    let choices: Vec<Position> = board.interior().filter(|pos| !blocked(*pos)).collect();
    choices.choose(rng).copied().ok_or(GameError::NoFreeCell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const ALWAYS: FoodRules = FoodRules {
        kind: FoodKind::Bonus,
        points: 50,
        spawn_chance: 100,
        lifetime: Some(4),
        cooldown: 3,
    };

    #[test]
    fn starts_cooling_then_becomes_ready() {
        let mut food = TimedFood::new(ALWAYS);

        for _ in 0..3 {
            assert_eq!(food.tick(), TimerEvent::Idle);
        }
        assert!(food.is_ready());
        assert_eq!(food.tick(), TimerEvent::Ready);
    }

    #[test]
    fn expires_after_exactly_its_lifetime() {
        let mut food = TimedFood::with_presence(ALWAYS, Presence::Ready);
        food.activate(Position::new(3, 3));

        for _ in 0..3 {
            assert_eq!(food.tick(), TimerEvent::Idle);
            assert!(food.is_active());
        }
        assert_eq!(food.tick(), TimerEvent::Expired(Position::new(3, 3)));
        assert!(!food.is_active());
        assert_eq!(food.cooldown_left(), 3);
    }

    #[test]
    fn hazard_never_expires() {
        let mut food = TimedFood::with_presence(HAZARD_RULES, Presence::Ready);
        food.activate(Position::new(3, 3));

        for _ in 0..500 {
            assert_eq!(food.tick(), TimerEvent::Idle);
        }
        assert!(food.is_at(Position::new(3, 3)));
    }

    #[test]
    fn zero_cooldown_goes_straight_to_ready() {
        let rules = FoodRules { cooldown: 0, ..ALWAYS };
        let mut food = TimedFood::with_presence(rules, Presence::Ready);
        food.activate(Position::new(1, 1));
        food.deactivate();
        assert!(food.is_ready());
    }

    #[test]
    fn roll_requires_ready() {
        let mut rng = StdRng::seed_from_u64(7);
        let cooling = TimedFood::new(ALWAYS);
        let ready = TimedFood::with_presence(ALWAYS, Presence::Ready);
        let never = TimedFood::with_presence(FoodRules { spawn_chance: 0, ..ALWAYS }, Presence::Ready);

        assert!(!cooling.roll(&mut rng));
        assert!(ready.roll(&mut rng));
        assert!(!never.roll(&mut rng));
    }

    #[test]
    fn free_cell_skips_blocked_cells() {
        let mut rng = StdRng::seed_from_u64(1);
        let board = Board::new(5, 5);
        let open = Position::new(2, 3);

        for _ in 0..20 {
            assert_eq!(free_cell(&mut rng, &board, |pos| pos != open), Ok(open));
        }
    }

    #[test]
    fn free_cell_fails_on_full_board() {
        let mut rng = StdRng::seed_from_u64(1);
        let board = Board::new(5, 5);
        assert_eq!(free_cell(&mut rng, &board, |_| true), Err(GameError::NoFreeCell));
    }
}
