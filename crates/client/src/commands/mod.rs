//! Subcommands of the `battle` binary.

mod fight;
mod records;
mod replay;
mod resume;

pub use fight::Fight;
pub use records::Records;
pub use replay::Replay;
pub use resume::Resume;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tracing::{info, warn};

use battle_core::{BattleConfig, Phase, StopReason};
use battle_runtime::{
    AutoBattle, BattleSession, Event, FileRecordRepository, PersistenceEvent, PersistenceWorker,
    RuntimeConfig, Topic,
};

use crate::render::{self, Names, Report};

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Battle log and a one-line result
    Text,
    /// Full JSON report
    Json,
}

/// Overrides of the battle config loaded from the environment.
#[derive(Args, Debug)]
pub struct BattleArgs {
    /// Base seed for every roll (default: BATTLE_SEED or 0)
    #[arg(long, value_name = "SEED", conflicts_with = "random_seed")]
    seed: Option<u64>,

    /// Draw a random seed; it is logged so the battle can be replayed
    #[arg(long)]
    random_seed: bool,

    /// Turn cap of the battle
    #[arg(long, value_name = "TURNS")]
    max_turns: Option<u32>,

    /// Arena cells (at least 2)
    #[arg(long, value_name = "CELLS")]
    arena_size: Option<u32>,

    /// Cells per movement turn (at least 1)
    #[arg(long, value_name = "CELLS")]
    move_step: Option<u32>,
}

impl BattleArgs {
    pub fn apply(&self, mut config: BattleConfig) -> BattleConfig {
        if self.random_seed {
            config = config.with_seed(rand::random());
        } else if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(max_turns) = self.max_turns {
            config = config.with_max_turns(max_turns);
        }
        if let Some(size) = self.arena_size {
            config = config.with_arena_size(size);
        }
        if let Some(step) = self.move_step {
            config = config.with_move_step(step);
        }
        config
    }
}

/// How a session is played and reported.
#[derive(Args, Debug)]
pub struct PlayArgs {
    /// Pace turns on a timer and print them as they resolve
    #[arg(long)]
    auto: bool,

    /// Delay between auto-battle turns (default: AUTO_BATTLE_INTERVAL_MS)
    #[arg(long, value_name = "MS", requires = "auto")]
    interval_ms: Option<u64>,

    /// Write the final battle state to this file
    #[arg(long, value_name = "PATH")]
    save_state: Option<PathBuf>,

    /// Store the battle record (same as ENABLE_PERSISTENCE=true)
    #[arg(long)]
    persist: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

/// Plays `session` to its end and prints the outcome.
pub(crate) async fn play(
    mut session: BattleSession,
    args: &PlayArgs,
    runtime: &RuntimeConfig,
) -> Result<()> {
    let persistence = if args.persist || runtime.enable_persistence {
        let dir = runtime.records_dir();
        let repository = FileRecordRepository::new(&dir)
            .with_context(|| format!("Failed to open record store: {}", dir.display()))?;
        info!(dir = %dir.display(), "persisting battle records");
        let (handle, task) = PersistenceWorker::spawn(
            runtime.persistence.clone(),
            Arc::new(repository),
            Some(session.events().clone()),
        );
        session = session.with_persistence(handle.clone());
        Some((handle, task))
    } else {
        None
    };
    let mut storage = session.subscribe(Topic::Persistence);

    let names = Names::of(session.state());
    let (session, stop) = if args.auto {
        let interval = args
            .interval_ms
            .map(Duration::from_millis)
            .unwrap_or(runtime.auto_battle_interval);
        run_paced(session, interval, args.format == OutputFormat::Text, &names).await?
    } else {
        if session.state().phase == Phase::Ready {
            session.start();
        }
        let stop = session.run_to_completion();
        (session, Some(stop))
    };

    if let Some(path) = &args.save_state {
        session
            .save_state(path)
            .with_context(|| format!("Failed to save state: {}", path.display()))?;
        info!(path = %path.display(), "battle state saved");
    }

    let state = session.state();
    let record = session.record();
    match args.format {
        OutputFormat::Text => {
            if !args.auto {
                for entry in &state.battle_log {
                    println!("{}", render::log_line(entry));
                }
            }
            let stop = stop.unwrap_or(StopReason::Idle);
            println!("{}", render::summary(state.result.as_ref(), stop, state.turn));
            if let Some(record) = record {
                println!("record {} ({} turns)", record.id, record.len());
            }
        }
        OutputFormat::Json => {
            let report = Report {
                stop,
                result: state.result.as_ref(),
                turn: state.turn,
                record_id: record.map(|r| r.id.as_str()),
                digest: record.map(|r| r.digest()).transpose()?,
                battle_log: &state.battle_log,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    drop(session);

    if let Some((handle, task)) = persistence {
        handle.flush().await?;
        handle.shutdown().await;
        task.await?;
    }
    while let Ok(event) = storage.try_recv() {
        match event {
            Event::Persistence(PersistenceEvent::Saved { record_id }) => {
                info!(record = %record_id, "battle record stored")
            }
            Event::Persistence(PersistenceEvent::Failed { record_id, error }) => {
                warn!(record = %record_id, %error, "battle record not stored")
            }
            _ => {}
        }
    }
    Ok(())
}

/// Runs the auto battle while printing turns. Ctrl-C stops it.
async fn run_paced(
    session: BattleSession,
    interval: Duration,
    print: bool,
    names: &Names,
) -> Result<(BattleSession, Option<StopReason>)> {
    let mut turns = session.subscribe(Topic::Turn);
    let mut auto = AutoBattle::new(interval).spawn(session);

    let show = |event: Event| {
        if let (true, Event::Turn(turn)) = (print, event) {
            println!("{}", render::turn_line(&turn, names));
        }
    };

    let joined = loop {
        tokio::select! {
            joined = auto.join() => break joined?,
            event = turns.recv() => {
                if let Ok(event) = event {
                    show(event);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                warn!("interrupted, stopping after the current turn");
                auto.stop();
            }
        }
    };
    while let Ok(event) = turns.try_recv() {
        show(event);
    }
    Ok(joined)
}
