//! Implementation of the ghostplan Environment trait for the grid game.

use std::sync::Arc;

use ghostplan_core::{Environment, StepFailure};
use rand::Rng;

use crate::{Direction, Ghost, GridState, Layout, Outcome, Position, SuccessorBudget};

/// Points lost on every pacman move, including `Stop`.
pub const TIME_PENALTY: i32 = 1;
/// Points for one food pellet.
pub const FOOD_REWARD: i32 = 10;
/// Bonus for clearing the board.
pub const WIN_REWARD: i32 = 500;
/// Penalty for touching a ghost that is not scared.
pub const LOSE_PENALTY: i32 = 500;
/// Points for eating a scared ghost.
pub const GHOST_REWARD: i32 = 200;
/// Turns ghosts stay scared after a capsule is eaten.
pub const SCARED_TIME: u32 = 40;

/// Pacman against randomly wandering ghosts.
///
/// Pacman moves first each turn; then, unless the game ended, every ghost
/// picks uniformly among its legal moves without turning back (unless it
/// is in a dead end).
#[derive(Clone, Debug)]
pub struct GhostGame {
    layout: Arc<Layout>,
    budget: SuccessorBudget,
}

impl GhostGame {
    /// Create a game with an unlimited successor budget.
    pub fn new(layout: Layout) -> Self {
        Self {
            layout: Arc::new(layout),
            budget: SuccessorBudget::unlimited(),
        }
    }

    /// Limit how many successors may be generated between budget resets.
    pub fn with_budget(mut self, limit: usize) -> Self {
        self.budget = SuccessorBudget::new(limit);
        self
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn budget(&self) -> &SuccessorBudget {
        &self.budget
    }

    /// Refill the successor budget, typically before each decision.
    pub fn reset_budget(&self) {
        self.budget.reset();
    }

    pub fn initial_state(&self) -> GridState {
        GridState::new(&self.layout)
    }

    /// Draw the board with the state's contents.
    pub fn render(&self, state: &GridState) -> String {
        let mut out = String::new();
        for row in 0..self.layout.height() {
            for col in 0..self.layout.width() {
                let pos = Position::new(row, col);
                let ghost = state.ghosts.iter().find(|g| g.position == pos);
                let cell = if self.layout.is_wall(pos) {
                    '%'
                } else if let Some(ghost) = ghost {
                    if ghost.is_scared() {
                        'S'
                    } else {
                        'G'
                    }
                } else if pos == state.pacman {
                    'P'
                } else if state.has_capsule(pos) {
                    'o'
                } else if state.has_food(pos) {
                    '.'
                } else {
                    ' '
                };
                out.push(cell);
            }
            out.push('\n');
        }
        out.push_str(&format!("Score: {}  Turn: {}", state.score, state.turn));
        if let Some(outcome) = state.outcome {
            out.push_str(&format!("  {:?}", outcome));
        }
        out
    }

    fn is_legal(&self, state: &GridState, action: Direction) -> bool {
        self.layout.neighbor(state.pacman, action).is_some()
    }

    /// Apply pacman's move and the ghosts' replies.
    fn advance<R: Rng + ?Sized>(
        &self,
        state: &GridState,
        action: Direction,
        rng: &mut R,
    ) -> GridState {
        let mut next = state.clone();
        next.turn += 1;
        next.score -= TIME_PENALTY;
        if let Some(pos) = self.layout.neighbor(state.pacman, action) {
            next.pacman = pos;
        }

        if next.food.remove(&next.pacman) {
            next.score += FOOD_REWARD;
            if next.food.is_empty() {
                next.score += WIN_REWARD;
                next.outcome = Some(Outcome::Win);
                return next;
            }
        }

        if next.capsules.remove(&next.pacman) {
            for ghost in &mut next.ghosts {
                ghost.scared_timer = SCARED_TIME;
            }
        }

        resolve_collisions(&mut next);
        if next.outcome.is_some() {
            return next;
        }

        for ghost in &mut next.ghosts {
            let heading = self.ghost_move(ghost, rng);
            if let Some(pos) = self.layout.neighbor(ghost.position, heading) {
                ghost.position = pos;
            }
            ghost.heading = heading;
        }
        resolve_collisions(&mut next);

        for ghost in &mut next.ghosts {
            ghost.scared_timer = ghost.scared_timer.saturating_sub(1);
        }
        next
    }

    /// Uniform choice among the ghost's moves, never reversing unless forced.
    fn ghost_move<R: Rng + ?Sized>(&self, ghost: &Ghost, rng: &mut R) -> Direction {
        let moves: Vec<Direction> = Direction::MOVES
            .into_iter()
            .filter(|&d| self.layout.neighbor(ghost.position, d).is_some())
            .collect();

        let forward: Vec<Direction> = moves
            .iter()
            .copied()
            .filter(|&d| ghost.heading == Direction::Stop || d != ghost.heading.reverse())
            .collect();

        let options = if forward.is_empty() { moves } else { forward };
        if options.is_empty() {
            return Direction::Stop;
        }
        options[rng.gen_range(0..options.len())]
    }
}

/// Settle every ghost sharing pacman's cell.
fn resolve_collisions(state: &mut GridState) {
    let pacman = state.pacman;
    for ghost in &mut state.ghosts {
        if ghost.position != pacman {
            continue;
        }
        if ghost.is_scared() {
            state.score += GHOST_REWARD;
            ghost.respawn();
        } else {
            state.score -= LOSE_PENALTY;
            state.outcome = Some(Outcome::Lose);
            return;
        }
    }
}

impl Environment for GhostGame {
    type State = GridState;
    type Action = Direction;

    fn legal_actions(&self, state: &GridState) -> Vec<Direction> {
        if self.is_terminal(state) {
            return Vec::new();
        }
        Direction::ALL
            .into_iter()
            .filter(|&d| self.is_legal(state, d))
            .collect()
    }

    fn is_terminal(&self, state: &GridState) -> bool {
        state.outcome.is_some()
    }

    fn step<R: Rng + ?Sized>(
        &self,
        state: &GridState,
        action: Direction,
        rng: &mut R,
    ) -> Result<GridState, StepFailure> {
        if self.is_terminal(state) || !self.is_legal(state, action) {
            return Err(StepFailure);
        }
        self.budget.try_consume()?;
        Ok(self.advance(state, action, rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn game(text: &str) -> GhostGame {
        GhostGame::new(Layout::parse(text).unwrap())
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn test_legal_actions() {
        let game = GhostGame::new(Layout::test_classic());
        let state = game.initial_state();

        // Bottom-left corner: walls to the west and south
        assert_eq!(
            game.legal_actions(&state),
            vec![Direction::North, Direction::East, Direction::Stop]
        );
        assert!(!game.is_terminal(&state));
    }

    #[test]
    fn test_eat_last_food_wins() {
        let game = game("%%%%\n%P.%\n%%%%");
        let state = game.initial_state();

        let next = game.step(&state, Direction::East, &mut rng()).unwrap();

        assert!(next.is_win());
        assert_eq!(next.score(), -TIME_PENALTY + FOOD_REWARD + WIN_REWARD);
        assert_eq!(next.food_left(), 0);
        assert!(game.is_terminal(&next));
        assert!(game.legal_actions(&next).is_empty());
    }

    #[test]
    fn test_eat_food_without_winning() {
        let game = game("%%%%%\n%P..%\n%%%%%");
        let next = game
            .step(&game.initial_state(), Direction::East, &mut rng())
            .unwrap();

        assert_eq!(next.score(), FOOD_REWARD - TIME_PENALTY);
        assert_eq!(next.food_left(), 1);
        assert_eq!(next.turn(), 1);
        assert_eq!(next.outcome(), None);
    }

    #[test]
    fn test_ghost_catches_pacman() {
        // The ghost can only move west, onto pacman
        let game = game("%%%%%\n%P G%\n%%%%%");
        let next = game
            .step(&game.initial_state(), Direction::East, &mut rng())
            .unwrap();

        assert!(next.is_lose());
        assert_eq!(next.score(), -TIME_PENALTY - LOSE_PENALTY);
        assert_eq!(game.step(&next, Direction::Stop, &mut rng()), Err(StepFailure));
    }

    #[test]
    fn test_walking_into_ghost_loses() {
        let game = game("%%%%\n%PG%\n%%%%");
        let next = game
            .step(&game.initial_state(), Direction::East, &mut rng())
            .unwrap();

        assert!(next.is_lose());
        assert_eq!(next.pacman(), Position::new(1, 2));
    }

    #[test]
    fn test_capsule_scares_ghosts() {
        // Ghost sits in a sealed pocket and cannot move
        let game = game("%%%%%%\n%Po%G%\n%%%%%%");
        let next = game
            .step(&game.initial_state(), Direction::East, &mut rng())
            .unwrap();

        assert_eq!(next.capsules_left(), 0);
        assert_eq!(next.score(), -TIME_PENALTY);
        assert_eq!(next.ghosts()[0].scared_timer(), SCARED_TIME - 1);
        assert_eq!(next.ghosts()[0].heading(), Direction::Stop);
    }

    #[test]
    fn test_eating_scared_ghost() {
        let game = game("%%%%%%\n%P %G%\n%%%%%%");
        let mut state = game.initial_state();
        state.ghosts[0].position = Position::new(1, 2);
        state.ghosts[0].scared_timer = 5;

        let next = game.step(&state, Direction::East, &mut rng()).unwrap();

        assert_eq!(next.outcome(), None);
        assert_eq!(next.score(), GHOST_REWARD - TIME_PENALTY);
        assert_eq!(next.ghosts()[0].position(), Position::new(1, 4));
        assert!(!next.ghosts()[0].is_scared());
    }

    #[test]
    fn test_ghost_does_not_reverse() {
        // Pacman is sealed in; the ghost roams a dead-end corridor
        let game = game("%%%%%%%\n%P%G  %\n%%%%%%%");
        let mut state = game.initial_state();
        state.ghosts[0].position = Position::new(1, 4);
        state.ghosts[0].heading = Direction::East;

        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let next = game.step(&state, Direction::Stop, &mut rng).unwrap();
            assert_eq!(next.ghosts()[0].position(), Position::new(1, 5));

            // Dead end: the only way out is back
            let after = game.step(&next, Direction::Stop, &mut rng).unwrap();
            assert_eq!(after.ghosts()[0].position(), Position::new(1, 4));
            assert_eq!(after.ghosts()[0].heading(), Direction::West);
        }
    }

    #[test]
    fn test_illegal_action_fails() {
        let game = GhostGame::new(Layout::test_classic());
        let state = game.initial_state();

        assert_eq!(
            game.step(&state, Direction::West, &mut rng()),
            Err(StepFailure)
        );
        assert_eq!(game.budget().used(), 0);
    }

    #[test]
    fn test_budget_exhaustion() {
        let game = GhostGame::new(Layout::test_classic()).with_budget(2);
        let state = game.initial_state();
        let mut rng = rng();

        assert!(game.step(&state, Direction::Stop, &mut rng).is_ok());
        assert!(game.step(&state, Direction::Stop, &mut rng).is_ok());
        assert_eq!(
            game.step(&state, Direction::Stop, &mut rng),
            Err(StepFailure)
        );

        game.reset_budget();
        assert!(game.step(&state, Direction::North, &mut rng).is_ok());
    }

    #[test]
    fn test_render() {
        let game = game("%%%%%\n%P.o%\n%%%%%");
        let rendered = game.render(&game.initial_state());
        assert_eq!(rendered, "%%%%%\n%P.o%\n%%%%%\nScore: 0  Turn: 0");
    }
}
