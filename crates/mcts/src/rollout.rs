//! Bounded random rollouts (the default policy).
//!
//! A rollout plays uniformly random legal actions from a frontier state and
//! scores wherever it stops against the reference state of the search.

use ghostplan_core::{Environment, Evaluator, StepFailure};
use rand::Rng;
use tracing::trace;

/// Reward and length of one finished rollout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RolloutOutcome {
    /// Evaluator score of the final state relative to the reference state.
    pub reward: f64,

    /// Number of successful steps taken.
    pub steps: usize,
}

/// Uniformly random rollout policy with a fixed depth bound.
#[derive(Clone, Copy, Debug)]
pub struct RolloutPolicy {
    max_depth: usize,
}

impl RolloutPolicy {
    /// Create a new rollout policy.
    ///
    /// # Arguments
    /// * `max_depth` - Maximum random steps in one rollout
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Maximum random steps in one rollout.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Perform a random rollout from `start`.
    ///
    /// Stops early on a terminal state. A failed step aborts the rollout and
    /// is returned to the caller; no partial reward is produced.
    pub fn rollout<E, V, R>(
        &self,
        env: &E,
        evaluator: &V,
        reference: &E::State,
        start: &E::State,
        rng: &mut R,
    ) -> Result<RolloutOutcome, StepFailure>
    where
        E: Environment,
        V: Evaluator<E> + ?Sized,
        R: Rng + ?Sized,
    {
        let mut state = start.clone();
        let mut steps = 0;

        while steps < self.max_depth && !env.is_terminal(&state) {
            let legal_actions = env.legal_actions(&state);
            if legal_actions.is_empty() {
                break;
            }

            let action = legal_actions[rng.gen_range(0..legal_actions.len())];
            state = env.step(&state, action, rng).map_err(|failure| {
                trace!(steps, "rollout aborted by step failure");
                failure
            })?;
            steps += 1;
        }

        let reward = evaluator.evaluate(env, reference, &state);
        trace!(steps, reward, "rollout finished");

        Ok(RolloutOutcome { reward, steps })
    }
}

impl Default for RolloutPolicy {
    fn default() -> Self {
        Self::new(5)
    }
}
