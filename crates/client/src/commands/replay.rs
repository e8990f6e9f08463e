//! Re-run a stored battle record and check that it reproduces.

use anyhow::{Context, Result, bail};
use clap::Parser;

use battle_runtime::{FileRecordRepository, RecordRepository, RuntimeConfig};

use super::OutputFormat;

/// Replay a stored battle record and verify its digest
#[derive(Parser, Debug)]
pub struct Replay {
    /// Record id, as listed by `battle records`
    #[arg(value_name = "RECORD")]
    id: String,

    /// Show a single turn instead of the whole battle
    #[arg(short, long, value_name = "TURN")]
    turn: Option<u32>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl Replay {
    pub fn execute(self, runtime: RuntimeConfig) -> Result<()> {
        let repository = FileRecordRepository::new(runtime.records_dir())?;
        let record = repository
            .load(&self.id)?
            .with_context(|| format!("Record not found: {}", self.id))?;

        let replayed = record.replay()?;
        let (stored, fresh) = (record.digest()?, replayed.digest()?);
        if stored != fresh {
            bail!(
                "Replay of {} diverged: stored digest {stored}, replayed {fresh}",
                self.id
            );
        }

        if let Some(number) = self.turn {
            let turn = record
                .turn(number)
                .with_context(|| format!("Record {} has no turn {number}", self.id))?;
            match self.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(turn)?),
                OutputFormat::Text => println!(
                    "turn {}: {} -> {} [{}] {} damage, {} HP {} -> {}",
                    turn.turn,
                    turn.attacker_name,
                    turn.defender_name,
                    turn.action,
                    turn.total_damage,
                    turn.defender_name,
                    turn.defender_hp_before,
                    turn.defender_hp_after
                ),
            }
            return Ok(());
        }

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&record)?),
            OutputFormat::Text => {
                let winner = record.winner_id.as_deref().unwrap_or("none");
                println!(
                    "{}: {} turns, winner {winner}, seed {}",
                    record.id,
                    record.len(),
                    record.config.seed
                );
                if record.is_resumed() {
                    println!(
                        "resumed after turn {}, {} first",
                        record.start_turn, record.first_attacker
                    );
                }
                println!("replay matches (sha256 {stored})");
            }
        }
        Ok(())
    }
}
