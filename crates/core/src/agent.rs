use crate::{Environment, Result};

/// Something that picks the next action at a decision point.
///
/// Each call is independent: no session state is required between calls.
pub trait Agent<E: Environment> {
    /// Select the action to play from `state`.
    ///
    /// # Errors
    /// Returns [`crate::GhostplanError::NoLegalActions`] if `state` offers
    /// nothing to play.
    fn select_action(&mut self, env: &E, state: &E::State) -> Result<E::Action>;
}
