//! Ghostplan Grid - a ghost-chasing grid game
//!
//! Pacman collects food on a walled board while ghosts wander at random.
//! The game implements `ghostplan_core::Environment` so planners can
//! simulate it, and an optional successor budget makes `step` fail once
//! a planner has used up its allowance for the current decision.

mod budget;
mod direction;
mod evaluation;
mod game_impl;
mod layout;
mod state;

pub use budget::SuccessorBudget;
pub use direction::Direction;
pub use evaluation::ScoreEvaluator;
pub use game_impl::{
    GhostGame, FOOD_REWARD, GHOST_REWARD, LOSE_PENALTY, SCARED_TIME, TIME_PENALTY, WIN_REWARD,
};
pub use layout::{Layout, Position};
pub use state::{Ghost, GridState, Outcome};
