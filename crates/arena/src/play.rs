//! Whole-game driver: the MCTS agent plays one game and the turns are recorded.

use anyhow::{Context, Result};
use ghostplan_core::Environment;
use ghostplan_grid::{Direction, GhostGame, Layout, Outcome, ScoreEvaluator};
use ghostplan_mcts::{Mcts, MctsConfig, SearchResult, StopReason};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use tracing::{debug, info};

/// Settings shared by every game of a run.
#[derive(Clone, Debug)]
pub struct MatchSettings {
    pub layout_name: String,
    pub layout: Layout,
    pub search: MctsConfig,
    pub successor_budget: Option<usize>,
    pub max_turns: u32,
    pub verbose: bool,
}

/// One decision in a game.
#[derive(Serialize, Deserialize, Debug)]
pub struct TurnRecord {
    /// Action pacman took.
    pub action: Direction,

    /// Root visit counts: {action: visits}.
    pub visit_counts: HashMap<Direction, u32>,

    /// Completed simulation rounds behind the decision.
    pub simulations: usize,

    /// What ended the search.
    pub stop_reason: String,

    /// True if the action was a random fallback.
    pub fallback: bool,

    /// Score after the world step.
    pub score: i32,
}

/// A complete game.
#[derive(Serialize, Deserialize, Debug)]
pub struct GameRecord {
    pub turns: Vec<TurnRecord>,

    /// `None` if the turn limit was hit first.
    pub outcome: Option<Outcome>,

    pub score: i32,

    pub metadata: HashMap<String, serde_json::Value>,
}

fn stop_reason_name(reason: StopReason) -> &'static str {
    match reason {
        StopReason::StepFailure => "step_failure",
        StopReason::SimulationLimit => "simulation_limit",
        StopReason::TimeLimit => "time_limit",
        StopReason::TerminalRoot => "terminal_root",
    }
}

fn turn_record(result: &SearchResult<Direction>, score: i32) -> TurnRecord {
    TurnRecord {
        action: result.best_action,
        visit_counts: result.visit_counts.iter().copied().collect(),
        simulations: result.simulations,
        stop_reason: stop_reason_name(result.stop_reason).to_string(),
        fallback: result.fallback,
        score,
    }
}

/// Play a single game. The planner and the world draw from separate
/// streams, both derived from `seed`.
pub fn play_game(settings: &MatchSettings, seed: u64) -> Result<GameRecord> {
    let mut game = GhostGame::new(settings.layout.clone());
    if let Some(limit) = settings.successor_budget {
        game = game.with_budget(limit);
    }

    let planner_rng = ChaCha8Rng::seed_from_u64(seed);
    let mut world_rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(1));
    let mut agent = Mcts::new(settings.search.clone(), ScoreEvaluator, planner_rng);

    let mut state = game.initial_state();
    let mut turns = Vec::new();

    while !game.is_terminal(&state) && state.turn() < settings.max_turns {
        game.reset_budget();
        let result = agent
            .search(&game, &state)
            .with_context(|| format!("Search failed on turn {}", state.turn()))?;

        // The real move must not be refused because planning used the budget up
        game.reset_budget();
        state = game
            .step(&state, result.best_action, &mut world_rng)
            .with_context(|| format!("Could not apply {} on turn {}", result.best_action, state.turn()))?;

        debug!(
            turn = state.turn(),
            action = %result.best_action,
            simulations = result.simulations,
            score = state.score(),
            "turn played"
        );
        if settings.verbose {
            info!("seed {}\n{}", seed, game.render(&state));
        }

        turns.push(turn_record(&result, state.score()));
    }

    let mut metadata = HashMap::new();
    metadata.insert("seed".to_string(), serde_json::json!(seed));
    metadata.insert("layout".to_string(), serde_json::json!(settings.layout_name));
    metadata.insert("turns".to_string(), serde_json::json!(state.turn()));
    metadata.insert(
        "max_simulations".to_string(),
        serde_json::json!(settings.search.max_simulations),
    );
    metadata.insert(
        "successor_budget".to_string(),
        serde_json::json!(settings.successor_budget),
    );

    Ok(GameRecord {
        turns,
        outcome: state.outcome(),
        score: state.score(),
        metadata,
    })
}

/// Save each game to a separate MessagePack file in `dir`.
pub fn write_records(dir: &Path, records: &[GameRecord]) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {:?}", dir))?;

    for (i, record) in records.iter().enumerate() {
        let filename = dir.join(format!("game_{:06}.msgpack", i));
        let file =
            File::create(&filename).with_context(|| format!("Failed to create file: {:?}", filename))?;
        let mut writer = BufWriter::new(file);
        // Named fields so structs are maps, not arrays
        rmp_serde::encode::write_named(&mut writer, record)
            .with_context(|| format!("Failed to serialize game {}", i))?;
    }
    Ok(())
}

/// Aggregate results of a run.
#[derive(Debug, Default, PartialEq)]
pub struct Summary {
    pub games: usize,
    pub wins: usize,
    pub losses: usize,
    pub unfinished: usize,
    pub mean_score: f64,
    pub mean_turns: f64,
}

impl Summary {
    pub fn from_records(records: &[GameRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }
        let n = records.len() as f64;
        let count = |outcome: Option<Outcome>| records.iter().filter(|r| r.outcome == outcome).count();
        Self {
            games: records.len(),
            wins: count(Some(Outcome::Win)),
            losses: count(Some(Outcome::Lose)),
            unfinished: count(None),
            mean_score: records.iter().map(|r| r.score as f64).sum::<f64>() / n,
            mean_turns: records.iter().map(|r| r.turns.len() as f64).sum::<f64>() / n,
        }
    }

    pub fn win_rate(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.wins as f64 / self.games as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(layout: &str, simulations: usize, max_turns: u32) -> MatchSettings {
        MatchSettings {
            layout_name: layout.to_string(),
            layout: Layout::named(layout).unwrap(),
            search: MctsConfig::with_simulations(simulations),
            successor_budget: None,
            max_turns,
            verbose: false,
        }
    }

    fn record(outcome: Option<Outcome>, score: i32, turns: usize) -> GameRecord {
        GameRecord {
            turns: (0..turns)
                .map(|_| TurnRecord {
                    action: Direction::Stop,
                    visit_counts: HashMap::new(),
                    simulations: 0,
                    stop_reason: "simulation_limit".to_string(),
                    fallback: false,
                    score,
                })
                .collect(),
            outcome,
            score,
            metadata: HashMap::new(),
        }
    }

    #[test]
    fn test_play_game() {
        let record = play_game(&settings("testClassic", 30, 12), 7).unwrap();

        assert!(!record.turns.is_empty());
        assert!(record.turns.len() <= 12);
        for turn in &record.turns {
            assert_eq!(turn.simulations, 30);
            assert_eq!(turn.visit_counts.values().sum::<u32>(), 30);
            assert_eq!(turn.stop_reason, "simulation_limit");
        }
        assert_eq!(record.score, record.turns.last().unwrap().score);
        if record.outcome.is_none() {
            assert_eq!(record.turns.len(), 12);
        }
        assert_eq!(record.metadata["seed"], serde_json::json!(7));
    }

    #[test]
    fn test_play_game_is_reproducible() {
        let settings = settings("smallClassic", 20, 15);
        let a = play_game(&settings, 99).unwrap();
        let b = play_game(&settings, 99).unwrap();

        let actions = |r: &GameRecord| r.turns.iter().map(|t| t.action).collect::<Vec<_>>();
        assert_eq!(actions(&a), actions(&b));
        assert_eq!(a.score, b.score);
        assert_eq!(a.outcome, b.outcome);
    }

    #[test]
    fn test_until_exhausted_stops_on_budget() {
        let mut settings = settings("testClassic", 1, 3);
        settings.search = MctsConfig::until_exhausted();
        settings.successor_budget = Some(60);

        let record = play_game(&settings, 3).unwrap();
        for turn in &record.turns {
            assert_eq!(turn.stop_reason, "step_failure");
            assert!(turn.simulations < 60);
        }
    }

    #[test]
    fn test_record_serializes_named() {
        let record = play_game(&settings("testClassic", 10, 2), 1).unwrap();
        let bytes = rmp_serde::to_vec_named(&record).unwrap();
        let decoded: GameRecord = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(decoded.turns.len(), record.turns.len());
        assert_eq!(decoded.score, record.score);
    }

    #[test]
    fn test_summary() {
        let records = vec![
            record(Some(Outcome::Win), 520, 10),
            record(Some(Outcome::Lose), -480, 4),
            record(None, 30, 6),
            record(Some(Outcome::Win), 530, 8),
        ];
        let summary = Summary::from_records(&records);

        assert_eq!(summary.games, 4);
        assert_eq!(summary.wins, 2);
        assert_eq!(summary.losses, 1);
        assert_eq!(summary.unfinished, 1);
        assert!((summary.mean_score - 150.0).abs() < 1e-9);
        assert!((summary.mean_turns - 7.0).abs() < 1e-9);
        assert!((summary.win_rate() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_summary_empty() {
        assert_eq!(Summary::from_records(&[]), Summary::default());
        assert_eq!(Summary::default().win_rate(), 0.0);
    }
}
