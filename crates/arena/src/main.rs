//! Play grid games with the MCTS agent.
//!
//! Runs independent games in parallel, prints a summary and optionally
//! saves every game in MessagePack format.

mod config;
mod play;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::{ArenaConfig, FinalSelectionName};
use ghostplan_grid::{GhostGame, Layout};
use play::{play_game, write_records, GameRecord, MatchSettings, Summary};
use rayon::prelude::*;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

/// Ghostplan arena: MCTS pacman games.
#[derive(Parser)]
#[command(name = "ghostplan-arena")]
#[command(about = "Play grid games with an MCTS planner and record them")]
struct Cli {
    /// TOML config file (defaults to ./ghostplan.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level; RUST_LOG takes precedence.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play games and print the results.
    Play {
        /// Layout name (testClassic, smallClassic, openHunt).
        #[arg(short, long)]
        layout: Option<String>,

        /// Number of games to play.
        #[arg(short, long)]
        games: Option<usize>,

        /// Random seed for reproducibility.
        #[arg(long)]
        seed: Option<u64>,

        /// Number of MCTS simulations per move.
        #[arg(short, long, conflicts_with = "until_exhausted")]
        simulations: Option<usize>,

        /// Simulate until the successor budget runs out.
        #[arg(long)]
        until_exhausted: bool,

        /// Successors the planner may generate per move.
        #[arg(short, long)]
        budget: Option<usize>,

        /// Wall-clock limit per move in milliseconds.
        #[arg(long)]
        time_limit_ms: Option<u64>,

        /// Final action rule: uct, most_visited or best_mean.
        #[arg(long)]
        final_selection: Option<FinalSelectionName>,

        /// Turn limit per game.
        #[arg(long)]
        max_turns: Option<u32>,

        /// Output directory for game files.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the board after every move.
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print a layout.
    Show {
        #[arg(short, long, default_value = "smallClassic")]
        layout: String,
    },
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Options from the `play` subcommand that override the config file.
#[derive(Default)]
struct PlayOverrides {
    layout: Option<String>,
    games: Option<usize>,
    seed: Option<u64>,
    simulations: Option<usize>,
    until_exhausted: bool,
    budget: Option<usize>,
    time_limit_ms: Option<u64>,
    final_selection: Option<FinalSelectionName>,
    max_turns: Option<u32>,
}

fn apply_cli(mut config: ArenaConfig, cli: PlayOverrides) -> ArenaConfig {
    if let Some(layout) = cli.layout {
        config.game.layout = layout;
    }
    if let Some(games) = cli.games {
        config.run.games = games;
    }
    if let Some(seed) = cli.seed {
        config.run.seed = seed;
    }
    if let Some(simulations) = cli.simulations {
        config.search.max_simulations = simulations;
        config.search.until_exhausted = false;
    }
    if cli.until_exhausted {
        config.search.until_exhausted = true;
    }
    if cli.budget.is_some() {
        config.game.successor_budget = cli.budget;
    }
    if cli.time_limit_ms.is_some() {
        config.search.time_limit_ms = cli.time_limit_ms;
    }
    if let Some(selection) = cli.final_selection {
        config.search.final_selection = selection;
    }
    if let Some(max_turns) = cli.max_turns {
        config.game.max_turns = max_turns;
    }
    config
}

fn build_settings(config: &ArenaConfig, verbose: bool) -> Result<MatchSettings> {
    let layout = Layout::named(&config.game.layout)
        .with_context(|| format!("Unknown layout {:?}", config.game.layout))?;
    let search = config.search.to_mcts_config();
    search.validate().context("Invalid search configuration")?;

    if search.max_simulations.is_none()
        && search.time_limit.is_none()
        && config.game.successor_budget.is_none()
    {
        anyhow::bail!("--until-exhausted needs a successor budget or a time limit to stop");
    }

    Ok(MatchSettings {
        layout_name: config.game.layout.clone(),
        layout,
        search,
        successor_budget: config.game.successor_budget,
        max_turns: config.game.max_turns,
        verbose,
    })
}

/// Run the play command.
fn cmd_play(config: &ArenaConfig, output: Option<PathBuf>, verbose: bool) -> Result<()> {
    let settings = build_settings(config, verbose)?;
    let games = config.run.games;
    let seed = config.run.seed;

    let budget = match settings.search.max_simulations {
        Some(n) => format!("{} simulations/move", n),
        None => "until exhausted".to_string(),
    };
    println!("Playing {} games on {} ({})", games, settings.layout_name, budget);
    println!("Seed: {}", seed);

    let start = Instant::now();

    let records: Vec<GameRecord> = (0..games)
        .into_par_iter()
        .map(|i| {
            let game_seed = seed.wrapping_add(i as u64 * 1000);
            play_game(&settings, game_seed).with_context(|| format!("Game {} failed", i))
        })
        .collect::<Result<_>>()?;

    for (i, record) in records.iter().enumerate() {
        let outcome = match record.outcome {
            Some(outcome) => format!("{:?}", outcome),
            None => "Unfinished".to_string(),
        };
        println!(
            "Game {}/{}: {} score {} in {} turns",
            i + 1,
            games,
            outcome,
            record.score,
            record.turns.len()
        );
    }

    if let Some(dir) = &output {
        write_records(dir, &records)?;
        info!("Saved {} games to {:?}", records.len(), dir);
    }

    let summary = Summary::from_records(&records);
    let elapsed = start.elapsed();

    println!("\n================================================");
    println!("Completed in {:.2}s", elapsed.as_secs_f64());
    println!(
        "Wins: {}  Losses: {}  Unfinished: {}",
        summary.wins, summary.losses, summary.unfinished
    );
    println!("Win rate: {:.1}%", summary.win_rate() * 100.0);
    println!("Average score: {:.1}", summary.mean_score);
    println!("Average game length: {:.1} turns", summary.mean_turns);
    if let Some(dir) = &output {
        println!("Files saved to: {:?}", dir);
    }

    Ok(())
}

fn cmd_show(name: &str) -> Result<()> {
    let layout = Layout::named(name).with_context(|| format!("Unknown layout {:?}", name))?;
    let game = GhostGame::new(layout);
    println!("{}", name);
    println!("{}", game.render(&game.initial_state()));
    println!(
        "{}x{}, {} food, {} capsules, {} ghosts",
        game.layout().width(),
        game.layout().height(),
        game.layout().food().len(),
        game.layout().capsules().len(),
        game.layout().ghost_starts().len()
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, source) = config::load_config(cli.config.as_deref())?;
    let level = cli.log_level.clone().unwrap_or_else(|| config.run.log_level.clone());
    init_tracing(&level);
    match &source {
        Some(path) => info!("Loaded config from {}", path.display()),
        None => debug!(
            "No {} found, using built-in defaults",
            config::DEFAULT_CONFIG_FILE
        ),
    }

    match cli.command {
        Commands::Play {
            layout,
            games,
            seed,
            simulations,
            until_exhausted,
            budget,
            time_limit_ms,
            final_selection,
            max_turns,
            output,
            verbose,
        } => {
            let overrides = PlayOverrides {
                layout,
                games,
                seed,
                simulations,
                until_exhausted,
                budget,
                time_limit_ms,
                final_selection,
                max_turns,
            };
            let config = apply_cli(config, overrides);
            cmd_play(&config, output, verbose)
        }
        Commands::Show { layout } => cmd_show(&layout),
    }
}
