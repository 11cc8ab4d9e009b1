use std::collections::VecDeque;

use crate::geometry::{Direction, Position};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snake {
    // Head first
    body: VecDeque<Position>,
    direction: Direction,
}

impl Snake {
    pub fn new(head: Position, direction: Direction) -> Self {
        Snake { body: VecDeque::from([head]), direction }
    }

    /// Rebuilds a snake from persisted parts. An empty body is not a snake.
    pub fn from_parts(body: Vec<Position>, direction: Direction) -> Option<Self> {
        if body.is_empty() {
            return None;
        }
        Some(Snake { body: body.into(), direction })
    }

    pub fn body(&self) -> &VecDeque<Position> {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn head(&self) -> Position {
        self.body[0]
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Changes the heading unless doing so would fold the head back onto the
    /// neck. Returns whether the change was accepted; a rejected change is
    /// not an error.
    pub fn set_direction(&mut self, new_direction: Direction) -> bool {
        if self.body.len() > 1 {
            let neck = self.body[1];
            if self.head() + new_direction == neck || new_direction == self.direction.opposite() {
                return false;
            }
        }

        self.direction = new_direction;
        true
    }

    pub fn next_head(&self) -> Position {
        self.head() + self.direction
    }

    pub fn advance(&mut self, new_head: Position, grow: bool) {
        self.body.push_front(new_head);
        if !grow {
            self.body.pop_back();
        }
    }

    pub fn hits_self(&self, pos: Position) -> bool {
        self.body.iter().skip(1).any(|segment| *segment == pos)
    }

    pub fn occupies(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    pub fn shrink(&mut self, n: usize) {
        let keep = self.body.len().saturating_sub(n).max(1);
        self.body.truncate(keep);
    }
}
