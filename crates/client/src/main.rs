//! `battle`: run deterministic two-combatant battles from the terminal.
//!
//! ```bash
//! battle fight roster.json --seed 42
//! battle fight roster.json --auto --interval-ms 300 --persist
//! battle resume saved.json --seed 42
//! battle records
//! battle replay knight:archer:000000000000002a
//! ```
//!
//! Settings not given on the command line come from the environment (a
//! `.env` file is loaded first), see [`battle_runtime::RuntimeConfig`]. Logs
//! go to stderr and follow `RUST_LOG`.

mod commands;
mod render;
mod roster;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use battle_runtime::RuntimeConfig;
use commands::{Fight, Records, Replay, Resume};

/// Deterministic two-combatant battles
#[derive(Parser)]
#[command(name = "battle")]
#[command(about = "Deterministic two-combatant battles", long_about = None)]
#[command(version)]
struct Cli {
    /// Data directory for stored records (overrides SAVE_DATA_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Start a battle from a roster file
    Fight(Fight),

    /// Resume a saved battle state
    Resume(Resume),

    /// List stored battle records
    Records(Records),

    /// Replay a stored record and verify it
    Replay(Replay),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (for SAVE_DATA_DIR and other env vars)
    let _ = dotenvy::dotenv();
    setup_logging();

    let cli = Cli::parse();
    let mut runtime = RuntimeConfig::from_env();
    if let Some(dir) = cli.data_dir {
        runtime.save_data_dir = Some(dir);
    }

    match cli.command {
        Command::Fight(cmd) => cmd.execute(runtime).await,
        Command::Resume(cmd) => cmd.execute(runtime).await,
        Command::Records(cmd) => cmd.execute(runtime),
        Command::Replay(cmd) => cmd.execute(runtime),
    }
}

fn setup_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
