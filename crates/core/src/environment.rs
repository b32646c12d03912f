use std::fmt::Debug;
use std::hash::Hash;

use rand::Rng;

use crate::StepFailure;

/// A turn-based, possibly stochastic environment a planner can simulate.
///
/// This is the whole surface the planners rely on: enumerate the legal
/// actions of a state, ask whether it is terminal, and step it forward.
/// Nothing else about the world (board geometry, opponents, scoring) leaks
/// through.
pub trait Environment {
    /// A snapshot of the world. Stepping never mutates a state in place.
    type State: Clone;

    /// An action the controlled agent can take.
    type Action: Clone + Copy + Eq + Hash + Debug;

    /// Returns all legal actions from the given state.
    ///
    /// Must be non-empty for non-terminal states. The order must be stable
    /// for a given state, since planners draw uniform choices by index.
    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Returns true if the state is a win or a loss.
    fn is_terminal(&self, state: &Self::State) -> bool;

    /// Applies an action, returning a successor state.
    ///
    /// Stochastic environments draw their randomness from `rng`, so the same
    /// input may yield different successors across calls. `Err(StepFailure)`
    /// is a first-class outcome meaning no successor could be produced.
    fn step<R: Rng + ?Sized>(
        &self,
        state: &Self::State,
        action: Self::Action,
        rng: &mut R,
    ) -> Result<Self::State, StepFailure>;
}

/// Scores a reachable state against a fixed reference state.
///
/// Higher is better. The reference stays the same for the duration of one
/// planning call so rewards from different simulations share a baseline.
pub trait Evaluator<E: Environment> {
    fn evaluate(&self, env: &E, reference: &E::State, candidate: &E::State) -> f64;
}

impl<E: Environment, V: Evaluator<E> + ?Sized> Evaluator<E> for &V {
    fn evaluate(&self, env: &E, reference: &E::State, candidate: &E::State) -> f64 {
        (**self).evaluate(env, reference, candidate)
    }
}
