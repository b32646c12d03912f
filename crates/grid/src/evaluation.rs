use ghostplan_core::Evaluator;

use crate::{GhostGame, GridState};

/// Score gained since the reference state.
///
/// Wins and losses are already reflected in the score through the
/// end-of-game bonus and penalty.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScoreEvaluator;

impl Evaluator<GhostGame> for ScoreEvaluator {
    fn evaluate(&self, _env: &GhostGame, reference: &GridState, candidate: &GridState) -> f64 {
        f64::from(candidate.score() - reference.score())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Layout;

    #[test]
    fn test_score_delta() {
        let game = GhostGame::new(Layout::test_classic());
        let reference = game.initial_state();
        let mut candidate = reference.clone();
        candidate.score = 42;

        assert_eq!(ScoreEvaluator.evaluate(&game, &reference, &candidate), 42.0);
        assert_eq!(ScoreEvaluator.evaluate(&game, &candidate, &reference), -42.0);
        assert_eq!(ScoreEvaluator.evaluate(&game, &reference, &reference), 0.0);
    }
}
