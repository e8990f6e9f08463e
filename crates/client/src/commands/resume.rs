//! Continue a battle from a saved state file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use battle_runtime::{BattleSession, EventBus, RuntimeConfig};

use super::{BattleArgs, PlayArgs, play};

/// Resume a battle written with `--save-state`
///
/// Pass the seed the battle was started with; rolls depend on it.
#[derive(Parser, Debug)]
pub struct Resume {
    /// State file to resume
    #[arg(value_name = "STATE")]
    state: PathBuf,

    #[command(flatten)]
    battle: BattleArgs,

    #[command(flatten)]
    play: PlayArgs,
}

impl Resume {
    pub async fn execute(self, runtime: RuntimeConfig) -> Result<()> {
        let config = self.battle.apply(runtime.battle.clone());
        let session = BattleSession::restore(&self.state, config)
            .with_context(|| format!("Failed to resume {}", self.state.display()))?
            .with_events(EventBus::with_capacity(runtime.event_buffer_size));
        info!(
            phase = %session.state().phase,
            turn = session.state().turn,
            "battle resumed"
        );

        play(session, &self.play, &runtime).await
    }
}
