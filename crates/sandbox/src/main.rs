//! Sandbox host: runs a guard NPC's behavior against a scripted encounter
//! and logs the stack every tick.
//!
//! Run with: `cargo run -p sandbox -- --ticks 80 -v`
mod actions;
mod npc;
mod scenario;

use std::path::{Path, PathBuf};

use action_stack::{ActorBinding, BehaviorConfig, BehaviorRoot};
use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use actions::Patrol;
use npc::{Npc, NpcQuery};
use scenario::Scenario;

/// Drive a guard NPC through a scripted encounter
#[derive(Parser)]
#[command(name = "sandbox")]
#[command(version)]
struct Cli {
    /// Number of ticks to simulate
    #[arg(long, default_value_t = 80)]
    ticks: u32,

    /// Seconds per tick
    #[arg(long, default_value_t = 0.25)]
    interval: f32,

    /// RON behavior config; BEHAVIOR_* environment variables are used otherwise
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the actor binding policy (live or cached)
    #[arg(long, value_parser = parse_binding)]
    binding: Option<ActorBinding>,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Show transition logs
    #[arg(short, long)]
    verbose: bool,
}

fn parse_binding(value: &str) -> Result<ActorBinding, String> {
    value
        .parse()
        .map_err(|_| format!("unknown binding `{value}`, expected `live` or `cached`"))
}

fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = setup_logging(cli.verbose, cli.log_file.as_deref())?;

    let mut config = match &cli.config {
        Some(path) => BehaviorConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => BehaviorConfig::from_env(),
    };
    if let Some(binding) = cli.binding {
        config.actor_binding = binding;
    }
    config.validate()?;

    run(&cli, config);
    Ok(())
}

fn run(cli: &Cli, config: BehaviorConfig) {
    let scenario = Scenario::encounter();
    let mut npc = Npc::guard(1);
    let mut behavior = BehaviorRoot::new(Patrol, config);

    info!(behavior = behavior.name(), ticks = cli.ticks, "simulation started");

    for tick in 0..cli.ticks {
        for event in scenario.events_at(tick) {
            Scenario::apply(&mut npc, &event);
            info!(tick, event = ?event, health = npc.health, "world event");
            behavior.on_event(&mut npc, &event);
        }

        behavior.update(&mut npc, cli.interval);

        info!(
            tick,
            stack = %behavior.debug_string(),
            position = npc.position,
            hurry = ?behavior.query(&npc, &NpcQuery::ShouldHurry),
            "tick"
        );

        if behavior.is_empty() {
            info!(tick, "behavior finished");
            return;
        }
    }

    info!(active = %behavior.full_name(), "out of ticks, ending behavior");
    behavior.clear(&mut npc);
}

/// Setup logging to stderr and, optionally, to a file.
///
/// The returned guard flushes the file writer when dropped.
fn setup_logging(verbose: bool, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .context("log file path has no file name")?;
            std::fs::create_dir_all(dir)?;

            let file_appender = tracing_appender::rolling::never(dir, name);
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking_file)
                .with_ansi(false)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    if let Some(path) = log_file {
        info!("Log file: {}", path.display());
    }

    Ok(guard)
}
