//! Monte Carlo Tree Search driver.
//!
//! Implements UCT search: repeated tree policy (selection + expansion),
//! bounded random rollout and backpropagation, until the environment
//! refuses a step or a configured budget runs out.

use crate::{
    config::{FinalSelection, MctsConfig},
    node::NodeId,
    rollout::RolloutPolicy,
    tree::Tree,
    uct,
};
use ghostplan_core::{Agent, Environment, Evaluator, GhostplanError, Result, StepFailure};
use rand::Rng;
use std::marker::PhantomData;
use std::time::Instant;
use tracing::{debug, trace, warn};

/// Why the simulation loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The environment failed a step during tree policy, expansion or rollout.
    StepFailure,

    /// `max_simulations` rounds completed.
    SimulationLimit,

    /// The wall-clock budget ran out.
    TimeLimit,

    /// The root state was already terminal; nothing was simulated.
    TerminalRoot,
}

/// Result of an MCTS search.
#[derive(Clone, Debug)]
pub struct SearchResult<A> {
    /// Action chosen for the root state.
    pub best_action: A,

    /// Visit count for each expanded root action, in expansion order.
    pub visit_counts: Vec<(A, u32)>,

    /// Mean reward for each expanded root action, in expansion order.
    pub mean_rewards: Vec<(A, f64)>,

    /// Completed (non-aborted) simulation rounds.
    pub simulations: usize,

    /// What ended the simulation loop.
    pub stop_reason: StopReason,

    /// True if the root had no children and `best_action` was drawn
    /// uniformly from the legal actions instead.
    pub fallback: bool,
}

impl<A: Copy> SearchResult<A> {
    /// Get the chosen action.
    pub fn best(&self) -> A {
        self.best_action
    }

    /// Sum of root child visits.
    pub fn total_visits(&self) -> u32 {
        self.visit_counts.iter().map(|(_, c)| *c).sum()
    }
}

/// Monte Carlo Tree Search with UCT selection.
///
/// Generic over:
/// - `E`: The environment being planned in
/// - `V`: The evaluator scoring rollout end states
/// - `R`: The random number generator driving every random choice
pub struct Mcts<E: Environment, V: Evaluator<E>, R: Rng> {
    config: MctsConfig,
    evaluator: V,
    rng: R,
    rollout: RolloutPolicy,
    tree: Tree<E::Action>,
    _env: PhantomData<E>,
}

impl<E, V, R> Mcts<E, V, R>
where
    E: Environment,
    V: Evaluator<E>,
    R: Rng,
{
    /// Create a new MCTS instance.
    pub fn new(config: MctsConfig, evaluator: V, rng: R) -> Self {
        let rollout = RolloutPolicy::new(config.rollout_depth);
        Self {
            config,
            evaluator,
            rng,
            rollout,
            tree: Tree::new(),
            _env: PhantomData,
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Tree built by the most recent search.
    pub fn tree(&self) -> &Tree<E::Action> {
        &self.tree
    }

    /// Run MCTS from the given state, returning search results.
    ///
    /// The tree from any previous call is discarded first.
    ///
    /// # Errors
    /// Returns `GhostplanError::NoLegalActions` if `state` has no legal
    /// actions, or `GhostplanError::InvalidConfig` for an unusable config.
    pub fn search(&mut self, env: &E, state: &E::State) -> Result<SearchResult<E::Action>> {
        self.config.validate()?;
        self.tree.clear();

        let legal_actions = env.legal_actions(state);
        if legal_actions.is_empty() {
            return Err(GhostplanError::NoLegalActions);
        }

        if env.is_terminal(state) {
            debug!("root state is terminal, skipping simulation");
            return Ok(self.extract_results(&legal_actions, 0, StopReason::TerminalRoot));
        }

        let started = Instant::now();
        let mut simulations = 0;

        let stop_reason = loop {
            if self
                .config
                .max_simulations
                .is_some_and(|max| simulations >= max)
            {
                break StopReason::SimulationLimit;
            }
            if self
                .config
                .time_limit
                .is_some_and(|limit| started.elapsed() >= limit)
            {
                break StopReason::TimeLimit;
            }

            match self.simulate(env, state) {
                Ok(reward) => {
                    simulations += 1;
                    trace!(simulations, reward, "simulation complete");
                }
                Err(StepFailure) => break StopReason::StepFailure,
            }
        };

        debug!(
            simulations,
            nodes = self.tree.len(),
            ?stop_reason,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search finished"
        );

        Ok(self.extract_results(&legal_actions, simulations, stop_reason))
    }

    /// Run a single simulation: tree policy -> rollout -> backpropagate.
    ///
    /// Rewards are measured against `root_state`, not the frontier state.
    fn simulate(&mut self, env: &E, root_state: &E::State) -> std::result::Result<f64, StepFailure> {
        let (frontier, frontier_state) = self.tree_policy(env, root_state)?;

        let outcome = self.rollout.rollout(
            env,
            &self.evaluator,
            root_state,
            &frontier_state,
            &mut self.rng,
        )?;

        self.backpropagate(frontier, outcome.reward);
        Ok(outcome.reward)
    }

    /// Descend from the root until a terminal state or a node that still
    /// has untried actions, which is expanded and returned.
    fn tree_policy(
        &mut self,
        env: &E,
        root_state: &E::State,
    ) -> std::result::Result<(NodeId, E::State), StepFailure> {
        let mut node = NodeId::ROOT;
        let mut state = root_state.clone();

        while !env.is_terminal(&state) {
            let legal_actions = env.legal_actions(&state);

            if !self.tree.is_fully_expanded(node, &legal_actions) {
                let untried = self.tree.untried_actions(node, &legal_actions);
                // Empty when the legal set shrank since earlier visits; the
                // node is then treated as fully expanded.
                if !untried.is_empty() {
                    return self.expand(env, node, &state, &untried);
                }
            }

            let selected = uct::select_child(&self.tree, node, self.config.exploration)
                .and_then(|child| self.tree.get(child).action.map(|a| (child, a)));
            let Some((child, action)) = selected else {
                break;
            };

            state = env.step(&state, action, &mut self.rng)?;
            node = child;
        }

        Ok((node, state))
    }

    /// Expand `node` with one uniformly chosen untried action.
    ///
    /// The child is only created once the step succeeds.
    fn expand(
        &mut self,
        env: &E,
        node: NodeId,
        state: &E::State,
        untried: &[E::Action],
    ) -> std::result::Result<(NodeId, E::State), StepFailure> {
        let action = untried[self.rng.gen_range(0..untried.len())];
        let next_state = env.step(state, action, &mut self.rng)?;
        let child = self.tree.add_child(node, action);
        Ok((child, next_state))
    }

    /// Add one visit and `reward` to every node from `frontier` up to the root.
    fn backpropagate(&mut self, frontier: NodeId, reward: f64) {
        let mut current = Some(frontier);

        while let Some(id) = current {
            let node = self.tree.get_mut(id);
            node.stats.record(reward);
            current = node.parent;
        }
    }

    /// Extract search results from root node.
    fn extract_results(
        &mut self,
        legal_actions: &[E::Action],
        simulations: usize,
        stop_reason: StopReason,
    ) -> SearchResult<E::Action> {
        let root = self.tree.root();

        let mut visit_counts = Vec::with_capacity(root.children.len());
        let mut mean_rewards = Vec::with_capacity(root.children.len());
        for &id in &root.children {
            let child = self.tree.get(id);
            if let Some(action) = child.action {
                visit_counts.push((action, child.stats.visit_count));
                mean_rewards.push((action, child.stats.mean_reward()));
            }
        }

        let chosen = match self.config.final_selection {
            FinalSelection::Uct => {
                uct::select_child(&self.tree, NodeId::ROOT, self.config.exploration)
            }
            FinalSelection::MostVisited => uct::most_visited_child(&self.tree, NodeId::ROOT),
            FinalSelection::BestMean => uct::best_mean_child(&self.tree, NodeId::ROOT),
        }
        .and_then(|id| self.tree.get(id).action);

        let (best_action, fallback) = match chosen {
            Some(action) => (action, false),
            None => {
                let action = legal_actions[self.rng.gen_range(0..legal_actions.len())];
                warn!(
                    ?action,
                    ?stop_reason,
                    "root has no children, falling back to a random legal action"
                );
                (action, true)
            }
        };

        SearchResult {
            best_action,
            visit_counts,
            mean_rewards,
            simulations,
            stop_reason,
            fallback,
        }
    }
}

impl<E, V, R> Agent<E> for Mcts<E, V, R>
where
    E: Environment,
    V: Evaluator<E>,
    R: Rng,
{
    fn select_action(&mut self, env: &E, state: &E::State) -> Result<E::Action> {
        self.search(env, state).map(|result| result.best_action)
    }
}
