mod scenario;

use std::path::{Path, PathBuf};

use actor_ai::journal_file::{load_journal_from_file, save_journal_to_file};
use actor_ai::replay::replay_director;
use actor_ai::{Director, InputJournal};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scenario::Scenario;
use tracing::info;
use tracing_subscriber::EnvFilter;

const BUILD_ID: &str = concat!("scriptctl-", env!("CARGO_PKG_VERSION"));

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a TOML scenario against the stock roster
    Run {
        scenario: PathBuf,
        /// Also write the run as a hash-chained JSONL journal
        #[arg(short, long)]
        journal: Option<PathBuf>,
        /// Print the in-game event log as JSON lines
        #[arg(long)]
        events: bool,
    },
    /// Replay a JSONL journal and print its final snapshot
    Replay {
        journal: PathBuf,
        #[arg(long)]
        events: bool,
    },
    /// Show the roster as it stands after initialization
    Actors {
        #[arg(short, long, default_value_t = 0)]
        seed: u64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()))
        .with_writer(std::io::stderr)
        .init();

    match Args::parse().command {
        Command::Run { scenario, journal, events } => run(&scenario, journal.as_deref(), events),
        Command::Replay { journal, events } => replay(&journal, events),
        Command::Actors { seed } => actors(seed),
    }
}

fn run(path: &Path, journal_path: Option<&Path>, events: bool) -> Result<()> {
    let scenario = Scenario::load(path)?;
    let journal = scenario.to_journal(BUILD_ID);
    info!(seed = journal.seed, ticks = journal.run_ticks, inputs = journal.inputs.len(), "running scenario");

    if let Some(journal_path) = journal_path {
        save_journal_to_file(journal_path, &journal)
            .with_context(|| format!("Failed to write journal: {}", journal_path.display()))?;
        println!("Journal written to {}", journal_path.display());
    }
    finish(&journal, events)
}

fn replay(path: &Path, events: bool) -> Result<()> {
    let loaded = load_journal_from_file(path)
        .with_context(|| format!("Failed to load journal file: {}", path.display()))?;
    if !loaded.sealed {
        println!("Journal has no end marker; replaying up to its last input.");
    }
    finish(&loaded.journal, events)
}

fn finish(journal: &InputJournal, events: bool) -> Result<()> {
    let director = replay_director(journal).context("Replay failed during execution")?;

    if events {
        for event in director.log() {
            println!("{}", serde_json::to_string(event)?);
        }
    }
    println!("Replay complete.");
    println!("Final Tick: {}", director.current_tick());
    println!("Events: {}", director.log().len());
    println!("Snapshot Hash: {:016x}", director.snapshot_hash());
    print_roster(&director);
    Ok(())
}

fn actors(seed: u64) -> Result<()> {
    let director = Director::with_default_scripts(seed).context("Failed to initialize the roster")?;
    print_roster(&director);
    Ok(())
}

fn print_roster(director: &Director) {
    println!("{:<4} {:<16} {:>4} {:>6} {:>5} {:>8} {:>6}", "id", "name", "set", "goal", "hp", "mode", "state");
    for actor in director.world().actors.values() {
        let mode = actor.animation_mode.map_or_else(|| "-".to_string(), |mode| mode.0.to_string());
        let state = director
            .query_animation_state(actor.id)
            .map_or_else(|_| "-".to_string(), |quad| quad.state.to_string());
        let status = if actor.retired { " (retired)" } else { "" };
        println!(
            "{:<4} {:<16} {:>4} {:>6} {:>5} {:>8} {:>6}{}",
            actor.id.to_string(),
            actor.name,
            actor.set.to_string(),
            actor.goal.to_string(),
            actor.hp,
            mode,
            state,
            status
        );
    }
}
