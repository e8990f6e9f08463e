//! Payloads carried by the event bus.

use serde::{Deserialize, Serialize};

use battle_core::{AttackResult, BattleResult, Phase, StopReason};

/// Published once per resolved turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnEvent {
    pub result: AttackResult,
    pub challenger_hp: u32,
    pub opponent_hp: u32,
}

/// Phase transitions of a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LifecycleEvent {
    PhaseChanged { from: Phase, to: Phase },
    Finished { result: BattleResult },
    Stopped { reason: StopReason },
}

/// Outcome of handing a finished record to storage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PersistenceEvent {
    Saved {
        #[serde(rename = "recordId")]
        record_id: String,
    },
    Failed {
        #[serde(rename = "recordId")]
        record_id: String,
        error: String,
    },
}
