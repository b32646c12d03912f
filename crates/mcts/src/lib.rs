//! Monte Carlo Tree Search for ghostplan environments.
//!
//! This crate provides a generic UCT implementation that can be used with
//! any environment implementing the `ghostplan_core::Environment` trait.
//!
//! # Features
//!
//! - **Generic**: Works with any `Environment` and `Evaluator`
//! - **UCT Selection**: Unvisited children first, then mean reward plus an
//!   exploration bonus
//! - **Bounded Rollouts**: Uniformly random playouts of at most
//!   `rollout_depth` steps, scored against the search's root state
//! - **Abort-aware**: A failed environment step ends the search and the
//!   best action found so far is returned
//! - **Explicit Budgets**: Simulation cap and optional wall-clock limit
//! - **Reproducible**: All randomness comes from one caller-supplied RNG
//!
//! # Example
//!
//! ```
//! use ghostplan_grid::{GhostGame, Layout, ScoreEvaluator};
//! use ghostplan_mcts::{Mcts, MctsConfig};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let game = GhostGame::new(Layout::test_classic());
//! let state = game.initial_state();
//!
//! let config = MctsConfig::with_simulations(200);
//! let rng = ChaCha8Rng::seed_from_u64(42);
//! let mut mcts = Mcts::new(config, ScoreEvaluator, rng);
//!
//! let result = mcts.search(&game, &state).expect("pacman can move");
//! println!("Best action: {:?}", result.best_action);
//! println!("Simulations: {}", result.simulations);
//! ```

pub mod config;
mod node;
pub mod rollout;
pub mod search;
pub mod tree;
pub mod uct;

pub use config::{FinalSelection, MctsConfig};
pub use node::{Node, NodeId, NodeStats};
pub use rollout::{RolloutOutcome, RolloutPolicy};
pub use search::{Mcts, SearchResult, StopReason};
pub use tree::Tree;
