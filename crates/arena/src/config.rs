//! Arena configuration.
//!
//! Values come from, in increasing priority: built-in defaults, a TOML
//! file, `GHOSTPLAN_<SECTION>_<KEY>` environment variables, and finally
//! command-line flags (applied by the caller).

use anyhow::{Context, Result};
use ghostplan_mcts::{FinalSelection, MctsConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "ghostplan.toml";

/// Complete arena configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArenaConfig {
    pub search: SearchSection,
    pub game: GameSection,
    pub run: RunSection,
}

/// Final action rule, as written in config files.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinalSelectionName {
    #[default]
    Uct,
    MostVisited,
    BestMean,
}

impl From<FinalSelectionName> for FinalSelection {
    fn from(name: FinalSelectionName) -> Self {
        match name {
            FinalSelectionName::Uct => FinalSelection::Uct,
            FinalSelectionName::MostVisited => FinalSelection::MostVisited,
            FinalSelectionName::BestMean => FinalSelection::BestMean,
        }
    }
}

impl std::str::FromStr for FinalSelectionName {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "uct" => Ok(Self::Uct),
            "most_visited" => Ok(Self::MostVisited),
            "best_mean" => Ok(Self::BestMean),
            other => Err(format!("unknown final selection {:?}", other)),
        }
    }
}

/// `[search]` section: planner parameters.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchSection {
    pub exploration: f64,
    pub rollout_depth: usize,
    pub max_simulations: usize,
    /// Ignore `max_simulations` and simulate until the environment fails.
    pub until_exhausted: bool,
    pub time_limit_ms: Option<u64>,
    pub final_selection: FinalSelectionName,
}

impl Default for SearchSection {
    fn default() -> Self {
        let mcts = MctsConfig::default();
        Self {
            exploration: mcts.exploration,
            rollout_depth: mcts.rollout_depth,
            max_simulations: mcts.max_simulations.unwrap_or(1000),
            until_exhausted: false,
            time_limit_ms: None,
            final_selection: FinalSelectionName::Uct,
        }
    }
}

impl SearchSection {
    /// Build the planner configuration.
    pub fn to_mcts_config(&self) -> MctsConfig {
        MctsConfig {
            exploration: self.exploration,
            rollout_depth: self.rollout_depth,
            max_simulations: (!self.until_exhausted).then_some(self.max_simulations),
            time_limit: self.time_limit_ms.map(Duration::from_millis),
            final_selection: self.final_selection.into(),
        }
    }
}

/// `[game]` section: which board and how much simulation it allows.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameSection {
    pub layout: String,
    /// Successors the planner may generate per decision.
    pub successor_budget: Option<usize>,
    /// Games still running after this many turns are scored as unfinished.
    pub max_turns: u32,
}

impl Default for GameSection {
    fn default() -> Self {
        Self {
            layout: "smallClassic".to_string(),
            successor_budget: None,
            max_turns: 500,
        }
    }
}

/// `[run]` section: how many games and how to seed them.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunSection {
    pub games: usize,
    pub seed: u64,
    pub log_level: String,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            games: 10,
            seed: 42,
            log_level: "info".to_string(),
        }
    }
}

/// Load configuration from `path`, or from [`DEFAULT_CONFIG_FILE`] if it
/// exists, or fall back to defaults. Environment overrides are applied last.
///
/// Also returns the file that was read, if any. Nothing is logged here
/// because the log level is itself part of the configuration.
pub fn load_config(path: Option<&Path>) -> Result<(ArenaConfig, Option<PathBuf>)> {
    let source = match path {
        Some(path) => Some(path.to_path_buf()),
        None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.exists()),
    };
    let config = match &source {
        Some(path) => load_from_path(path)?,
        None => ArenaConfig::default(),
    };

    Ok((apply_overrides(config, |key| std::env::var(key).ok()), source))
}

/// Load configuration from a specific path.
pub fn load_from_path(path: &Path) -> Result<ArenaConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Parse configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ArenaConfig> {
    Ok(toml::from_str(content)?)
}

/// Macro to reduce override boilerplate
macro_rules! override_field {
    // String field
    ($lookup:expr, $config:expr, $section:ident . $field:ident, $key:expr) => {
        if let Some(v) = $lookup($key) {
            $config.$section.$field = v;
        }
    };
    // Parseable field
    ($lookup:expr, $config:expr, $section:ident . $field:ident, $key:expr, parse) => {
        if let Some(v) = $lookup($key).and_then(|s| s.parse().ok()) {
            $config.$section.$field = v;
        }
    };
    // Optional parseable field
    ($lookup:expr, $config:expr, $section:ident . $field:ident, $key:expr, optional_parse) => {
        if let Some(v) = $lookup($key).and_then(|s| s.parse().ok()) {
            $config.$section.$field = Some(v);
        }
    };
}

/// Apply `GHOSTPLAN_<SECTION>_<KEY>` overrides using `lookup` to read them.
///
/// Values that fail to parse are ignored.
pub fn apply_overrides<F>(mut config: ArenaConfig, lookup: F) -> ArenaConfig
where
    F: Fn(&str) -> Option<String>,
{
    override_field!(lookup, config, search.exploration, "GHOSTPLAN_SEARCH_EXPLORATION", parse);
    override_field!(lookup, config, search.rollout_depth, "GHOSTPLAN_SEARCH_ROLLOUT_DEPTH", parse);
    override_field!(
        lookup,
        config,
        search.max_simulations,
        "GHOSTPLAN_SEARCH_MAX_SIMULATIONS",
        parse
    );
    override_field!(
        lookup,
        config,
        search.until_exhausted,
        "GHOSTPLAN_SEARCH_UNTIL_EXHAUSTED",
        parse
    );
    override_field!(
        lookup,
        config,
        search.time_limit_ms,
        "GHOSTPLAN_SEARCH_TIME_LIMIT_MS",
        optional_parse
    );
    override_field!(
        lookup,
        config,
        search.final_selection,
        "GHOSTPLAN_SEARCH_FINAL_SELECTION",
        parse
    );

    override_field!(lookup, config, game.layout, "GHOSTPLAN_GAME_LAYOUT");
    override_field!(
        lookup,
        config,
        game.successor_budget,
        "GHOSTPLAN_GAME_SUCCESSOR_BUDGET",
        optional_parse
    );
    override_field!(lookup, config, game.max_turns, "GHOSTPLAN_GAME_MAX_TURNS", parse);

    override_field!(lookup, config, run.games, "GHOSTPLAN_RUN_GAMES", parse);
    override_field!(lookup, config, run.seed, "GHOSTPLAN_RUN_SEED", parse);
    override_field!(lookup, config, run.log_level, "GHOSTPLAN_RUN_LOG_LEVEL");

    config
}
