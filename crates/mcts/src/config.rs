//! MCTS configuration parameters.
//!
//! These parameters control the behavior of the Monte Carlo Tree Search algorithm.

use std::time::Duration;

use ghostplan_core::{GhostplanError, Result};

/// Rule used to pick the root child once simulation stops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FinalSelection {
    /// Same UCT score used while descending, exploration bonus included.
    ///
    /// An unvisited root child scores infinity, so if the last round was
    /// aborted after expanding the root, its fresh child is returned with no
    /// evidence behind it. Prefer [`FinalSelection::MostVisited`] with
    /// [`MctsConfig::until_exhausted`], where every search ends on an
    /// aborted round.
    #[default]
    Uct,

    /// Child with the most visits.
    MostVisited,

    /// Child with the highest mean reward among visited children.
    BestMean,
}

/// MCTS configuration parameters.
#[derive(Clone, Debug)]
pub struct MctsConfig {
    /// UCT exploration constant (`c` in `mean + c * sqrt(2 ln N(p) / N(c))`).
    pub exploration: f64,

    /// Maximum number of random steps in one rollout.
    pub rollout_depth: usize,

    /// Upper bound on completed simulation rounds per search.
    ///
    /// `None` keeps simulating until the environment refuses to produce a
    /// successor. Only use that with an environment that is guaranteed to
    /// fail eventually, such as one with a successor budget.
    pub max_simulations: Option<usize>,

    /// Wall-clock budget, checked between simulation rounds.
    pub time_limit: Option<Duration>,

    /// How the returned action is chosen among the root's children.
    pub final_selection: FinalSelection,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            exploration: 1.0,
            rollout_depth: 5,
            max_simulations: Some(1000),
            time_limit: None,
            final_selection: FinalSelection::Uct,
        }
    }
}

impl MctsConfig {
    /// Create a new config capped at the specified number of simulations.
    pub fn with_simulations(num_simulations: usize) -> Self {
        Self {
            max_simulations: Some(num_simulations),
            ..Default::default()
        }
    }

    /// Create a config with no simulation cap.
    ///
    /// The search ends only when the environment fails a step (or the time
    /// limit, if one is added, runs out).
    pub fn until_exhausted() -> Self {
        Self {
            max_simulations: None,
            ..Default::default()
        }
    }

    /// Add a wall-clock budget.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Change the final action rule.
    pub fn with_final_selection(mut self, selection: FinalSelection) -> Self {
        self.final_selection = selection;
        self
    }

    /// Check the parameters are usable.
    ///
    /// # Errors
    /// Returns `GhostplanError::InvalidConfig` if the exploration constant
    /// is negative or not finite, or the simulation cap is zero.
    pub fn validate(&self) -> Result<()> {
        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(GhostplanError::InvalidConfig(format!(
                "exploration constant must be finite and non-negative, got {}",
                self.exploration
            )));
        }
        if self.max_simulations == Some(0) {
            return Err(GhostplanError::InvalidConfig(
                "max_simulations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
