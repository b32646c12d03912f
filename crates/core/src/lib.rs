//! Ghostplan Core - environment abstractions shared by planners and games
//!
//! # Types
//!
//! - [`Environment`] - Legal actions, terminal check and stochastic stepping
//! - [`Evaluator`] - Scores a state relative to a reference state
//! - [`Agent`] - Picks an action at a decision point
//! - [`StepFailure`] - The environment could not produce a successor

mod agent;
mod environment;
mod error;

pub use agent::Agent;
pub use environment::{Environment, Evaluator};
pub use error::{GhostplanError, Result, StepFailure};
