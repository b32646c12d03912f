//! Property-based tests for the MCTS implementation.
//!
//! These tests check the search tree invariants on the grid game:
//! - Every node has exactly one child per tried action
//! - A child never has more visits than its parent
//! - Root visits equal the number of completed simulations
//! - Same seed, same search

use ghostplan_core::{Environment, GhostplanError};
use ghostplan_grid::{Direction, GhostGame, GridState, Layout, ScoreEvaluator};
use ghostplan_mcts::{Mcts, MctsConfig, StopReason, Tree};
use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// =============================================================================
// Strategies for generating test inputs
// =============================================================================

fn arb_seed() -> impl Strategy<Value = u64> {
    any::<u64>()
}

/// Small simulation counts keep the suite fast
fn arb_simulations() -> impl Strategy<Value = usize> {
    1usize..150
}

fn arb_layout() -> impl Strategy<Value = Layout> {
    prop_oneof![
        Just(Layout::test_classic()),
        Just(Layout::small_classic()),
        Just(Layout::open_hunt()),
    ]
}

/// Generate a position by playing random moves from the start
fn arb_position() -> impl Strategy<Value = (GhostGame, GridState)> {
    (arb_layout(), 0usize..30, arb_seed()).prop_map(|(layout, num_moves, seed)| {
        let game = GhostGame::new(layout);
        let mut state = game.initial_state();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        for _ in 0..num_moves {
            if game.is_terminal(&state) {
                break;
            }
            let actions = game.legal_actions(&state);
            let action = actions[rng.gen_range(0..actions.len())];
            state = game.step(&state, action, &mut rng).unwrap();
        }

        (game, state)
    })
}

fn create_mcts(config: MctsConfig, seed: u64) -> Mcts<GhostGame, ScoreEvaluator, ChaCha8Rng> {
    Mcts::new(config, ScoreEvaluator, ChaCha8Rng::seed_from_u64(seed))
}

fn check_tree(tree: &Tree<Direction>) -> Result<(), TestCaseError> {
    for id in tree.ids() {
        let node = tree.get(id);
        prop_assert_eq!(node.tried_actions.len(), node.children.len());

        for &child in &node.children {
            let child_node = tree.get(child);
            prop_assert_eq!(child_node.parent, Some(id));
            let action = child_node.action.expect("non-root nodes have an action");
            prop_assert!(node.tried_actions.contains(&action));
        }

        if let Some(parent) = node.parent {
            prop_assert!(node.stats.visit_count <= tree.get(parent).stats.visit_count);
        }
    }
    Ok(())
}

// =============================================================================
// Tree invariants
// =============================================================================

proptest! {
    #[test]
    fn prop_tree_invariants_hold(
        seed in arb_seed(),
        simulations in arb_simulations(),
        (game, state) in arb_position(),
    ) {
        let mut mcts = create_mcts(MctsConfig::with_simulations(simulations), seed);

        match mcts.search(&game, &state) {
            Ok(result) => {
                check_tree(mcts.tree())?;
                prop_assert!(game.legal_actions(&state).contains(&result.best_action));
            }
            Err(err) => {
                prop_assert!(game.is_terminal(&state));
                prop_assert_eq!(err, GhostplanError::NoLegalActions);
            }
        }
    }

    #[test]
    fn prop_root_visits_count_completed_simulations(
        seed in arb_seed(),
        simulations in arb_simulations(),
        budget in 0usize..400,
        (game, state) in arb_position(),
    ) {
        prop_assume!(!game.is_terminal(&state));
        let game = GhostGame::new(game.layout().clone()).with_budget(budget);
        let mut mcts = create_mcts(MctsConfig::with_simulations(simulations), seed);

        let result = mcts.search(&game, &state).unwrap();

        let root = mcts.tree().root();
        prop_assert_eq!(root.stats.visit_count as usize, result.simulations);
        prop_assert!(result.simulations <= simulations);
        match result.stop_reason {
            StopReason::SimulationLimit => prop_assert_eq!(result.simulations, simulations),
            StopReason::StepFailure => prop_assert_eq!(game.budget().remaining(), Some(0)),
            other => prop_assert!(false, "unexpected stop reason {:?}", other),
        }
        prop_assert_eq!(result.fallback, root.children.is_empty());
        check_tree(mcts.tree())?;
    }

    #[test]
    fn prop_rollouts_never_exceed_depth(
        seed in arb_seed(),
        simulations in 1usize..60,
        (game, state) in arb_position(),
    ) {
        prop_assume!(!game.is_terminal(&state));
        game.reset_budget();
        let mut mcts = create_mcts(MctsConfig::with_simulations(simulations), seed);

        let result = mcts.search(&game, &state).unwrap();

        // Each round: descent to the parent, one expansion, at most 5 rollout steps
        let max_depth = mcts.tree().ids().map(|id| mcts.tree().depth(id)).max().unwrap_or(0);
        let bound = simulations * (max_depth + 5);
        prop_assert!(game.budget().used() <= bound);
        prop_assert_eq!(result.simulations, simulations);
    }

    #[test]
    fn prop_deterministic(
        seed in arb_seed(),
        simulations in arb_simulations(),
        (game, state) in arb_position(),
    ) {
        prop_assume!(!game.is_terminal(&state));

        let run = || {
            let mut mcts = create_mcts(MctsConfig::with_simulations(simulations), seed);
            let result = mcts.search(&game, &state).unwrap();
            (result.best_action, result.visit_counts, mcts.tree().len())
        };

        prop_assert_eq!(run(), run());
    }
}
