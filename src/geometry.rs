use std::ops::Add;

use Direction::*;

pub const BOARD_WIDTH: i32 = 30;
pub const BOARD_HEIGHT: i32 = 20;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }
}

impl Add<Direction> for Position {
    type Output = Position;

    fn add(self, dir: Direction) -> Position {
        let (dx, dy) = dir.delta();
        Position::new(self.x + dx, self.y + dy)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    /// Inverse of [`Direction::delta`]. Anything other than a unit vector
    /// along one axis (the zero vector included) has no heading.
    pub fn from_delta(dx: i32, dy: i32) -> Option<Direction> {
        match (dx, dy) {
            (0, -1) => Some(Up),
            (0, 1) => Some(Down),
            (-1, 0) => Some(Left),
            (1, 0) => Some(Right),
            _ => None,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Up | Down)
    }
}

/// The playing field. The outermost ring of cells is wall; only the
/// interior is walkable.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Board {
    width: i32,
    height: i32,
}

impl Board {
    pub const fn new(width: i32, height: i32) -> Self {
        Board { width, height }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn center(&self) -> Position {
        Position::new(self.width / 2, self.height / 2)
    }

    pub fn in_interior(&self, pos: Position) -> bool {
        pos.x >= 1 && pos.x <= self.width - 2 && pos.y >= 1 && pos.y <= self.height - 2
    }

    /// Folds a position back into the interior, so leaving through one wall
    /// re-enters next to the opposite one. The wall ring itself is never
    /// returned.
    pub fn wrap(&self, pos: Position) -> Position {
        Position::new(wrap_axis(pos.x, self.width - 2), wrap_axis(pos.y, self.height - 2))
    }

    pub fn interior(&self) -> impl Iterator<Item = Position> + '_ {
        (1..self.height - 1).flat_map(move |y| (1..self.width - 1).map(move |x| Position::new(x, y)))
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new(BOARD_WIDTH, BOARD_HEIGHT)
    }
}

// Interior coordinates run 1..=span
fn wrap_axis(value: i32, span: i32) -> i32 {
    (value - 1).rem_euclid(span) + 1
}
