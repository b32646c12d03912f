use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{Direction, Layout, Position};

/// How a finished game ended.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Lose,
}

/// A ghost and its current mood.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Ghost {
    pub(crate) position: Position,
    pub(crate) start: Position,
    pub(crate) heading: Direction,
    pub(crate) scared_timer: u32,
}

impl Ghost {
    pub(crate) fn new(start: Position) -> Self {
        Self {
            position: start,
            start,
            heading: Direction::Stop,
            scared_timer: 0,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn heading(&self) -> Direction {
        self.heading
    }

    /// Turns left before the ghost stops being edible.
    pub fn scared_timer(&self) -> u32 {
        self.scared_timer
    }

    pub fn is_scared(&self) -> bool {
        self.scared_timer > 0
    }

    /// Send the ghost home after being eaten.
    pub(crate) fn respawn(&mut self) {
        self.position = self.start;
        self.heading = Direction::Stop;
        self.scared_timer = 0;
    }
}

/// Full game state. The board geometry lives in the [`Layout`].
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct GridState {
    pub(crate) pacman: Position,
    pub(crate) ghosts: Vec<Ghost>,
    pub(crate) food: BTreeSet<Position>,
    pub(crate) capsules: BTreeSet<Position>,
    pub(crate) score: i32,
    pub(crate) outcome: Option<Outcome>,
    pub(crate) turn: u32,
}

impl GridState {
    /// Starting state for a layout.
    pub fn new(layout: &Layout) -> Self {
        Self {
            pacman: layout.pacman_start(),
            ghosts: layout.ghost_starts().iter().copied().map(Ghost::new).collect(),
            food: layout.food().iter().copied().collect(),
            capsules: layout.capsules().iter().copied().collect(),
            score: 0,
            outcome: None,
            turn: 0,
        }
    }

    pub fn pacman(&self) -> Position {
        self.pacman
    }

    pub fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }

    pub fn has_food(&self, pos: Position) -> bool {
        self.food.contains(&pos)
    }

    pub fn food_left(&self) -> usize {
        self.food.len()
    }

    pub fn has_capsule(&self, pos: Position) -> bool {
        self.capsules.contains(&pos)
    }

    pub fn capsules_left(&self) -> usize {
        self.capsules.len()
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_win(&self) -> bool {
        self.outcome == Some(Outcome::Win)
    }

    pub fn is_lose(&self) -> bool {
        self.outcome == Some(Outcome::Lose)
    }

    /// Number of pacman moves made so far.
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// Manhattan distance from pacman to the closest food, if any is left.
    pub fn nearest_food_distance(&self) -> Option<usize> {
        self.food.iter().map(|&f| self.pacman.distance(f)).min()
    }
}
