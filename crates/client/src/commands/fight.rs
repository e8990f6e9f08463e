//! Start a new battle from a roster file.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use battle_core::BattleEngine;
use battle_runtime::{BattleSession, EventBus, RuntimeConfig, SystemClock};

use super::{BattleArgs, PlayArgs, play};
use crate::roster::Roster;

/// Start a battle between the two combatants of a roster
#[derive(Parser, Debug)]
pub struct Fight {
    /// Roster JSON with a `challenger` and an `opponent`
    #[arg(value_name = "ROSTER")]
    roster: PathBuf,

    #[command(flatten)]
    battle: BattleArgs,

    #[command(flatten)]
    play: PlayArgs,
}

impl Fight {
    pub async fn execute(self, runtime: RuntimeConfig) -> Result<()> {
        let (challenger, opponent) = Roster::load(&self.roster)?.into_combatants()?;
        let config = self.battle.apply(runtime.battle.clone());
        info!(
            seed = config.seed,
            max_turns = config.max_turns,
            challenger = %challenger.name,
            opponent = %opponent.name,
            "starting battle"
        );

        let engine = BattleEngine::new(config).with_clock(SystemClock);
        let mut session = BattleSession::from_engine(engine)
            .with_events(EventBus::with_capacity(runtime.event_buffer_size));
        session.initialize(challenger, opponent)?;

        play(session, &self.play, &runtime).await
    }
}
