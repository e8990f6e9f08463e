//! Turn-indexed battle history for deterministic replay.
//!
//! A [`BattleRecord`] is built by the engine as turns resolve. Records are
//! append-only: once a [`TurnRecord`] is pushed it is never touched again.

use sha2::{Digest, Sha256};

use crate::ability::SkillDescriptor;
use crate::combat::DamageResult;
use crate::combatant::Combatant;
use crate::config::BattleConfig;
use crate::engine::{self, BattleEngine, EngineError};
use crate::state::{BattleState, Phase, Side};

/// What the attacker did with its turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TurnAction {
    /// One or more damage calculations.
    Strike,
    /// Out of range: the turn was spent moving.
    Move,
    /// Defender HP set to 0 by an execute ability.
    Execute,
}

/// A position change on the arena.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    pub combatant_id: String,
    pub from: u32,
    pub to: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifestealRecord {
    /// Sum of the lifesteal amounts of every strike.
    pub amount: u32,
    /// HP actually restored after capping at max HP.
    pub healed: u32,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRecord {
    pub turn: u32,
    pub attacker: Side,
    pub attacker_id: String,
    pub attacker_name: String,
    pub defender_id: String,
    pub defender_name: String,
    pub action: TurnAction,
    /// Damage breakdown of every strike, in order.
    pub strikes: Vec<DamageResult>,
    pub total_damage: u32,
    pub attacker_hp_before: u32,
    pub attacker_hp_after: u32,
    pub defender_hp_before: u32,
    pub defender_hp_after: u32,
    pub lifesteal: Option<LifestealRecord>,
    pub skill: Option<SkillDescriptor>,
    pub movement: Option<Movement>,
    pub attacker_position: Option<u32>,
    pub defender_position: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleRecord {
    pub id: String,
    /// Config the battle was played with.
    pub config: BattleConfig,
    /// Snapshot taken before the first recorded turn.
    pub challenger: Combatant,
    pub opponent: Combatant,
    /// Turn counter when recording began. 0 unless the battle was resumed.
    pub start_turn: u32,
    /// Side that attacks in the first recorded turn.
    pub first_attacker: Side,
    turns: Vec<TurnRecord>,
    pub winner_id: Option<String>,
}

impl BattleRecord {
    pub(crate) fn new(challenger: Combatant, opponent: Combatant, config: &BattleConfig) -> Self {
        Self::resumed(challenger, opponent, config, 0, Side::Challenger)
    }

    /// Record of a battle picked up after `start_turn` turns, `first_attacker`
    /// to move.
    pub(crate) fn resumed(
        challenger: Combatant,
        opponent: Combatant,
        config: &BattleConfig,
        start_turn: u32,
        first_attacker: Side,
    ) -> Self {
        let mut id = record_id(&challenger.id, &opponent.id, config.seed);
        if start_turn > 0 || first_attacker != Side::Challenger {
            id.push_str(&format!("@{start_turn}"));
        }
        Self {
            id,
            config: config.clone(),
            challenger,
            opponent,
            start_turn,
            first_attacker,
            turns: Vec::new(),
            winner_id: None,
        }
    }

    /// Whether the record starts mid-battle.
    pub fn is_resumed(&self) -> bool {
        self.start_turn > 0 || self.first_attacker != Side::Challenger
    }

    pub(crate) fn push(&mut self, turn: TurnRecord) {
        self.turns.push(turn);
    }

    pub(crate) fn set_winner(&mut self, winner_id: String) {
        self.winner_id.get_or_insert(winner_id);
    }

    pub fn turns(&self) -> &[TurnRecord] {
        &self.turns
    }

    /// Record of turn `number`, if it was recorded.
    pub fn turn(&self, number: u32) -> Option<&TurnRecord> {
        self.turns
            .binary_search_by_key(&number, |t| t.turn)
            .ok()
            .map(|index| &self.turns[index])
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Hex SHA-256 of the record's JSON form.
    ///
    /// Two records with equal digests describe the same battle.
    pub fn digest(&self) -> Result<String, serde_json::Error> {
        let bytes = serde_json::to_vec(self)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }

    /// Re-runs the battle from the recorded snapshots and config.
    ///
    /// A record of a battle that ran to victory or to the turn cap replays to
    /// itself. Resumed records restart at their starting turn and attacker.
    pub fn replay(&self) -> Result<BattleRecord, EngineError> {
        if !self.is_resumed() {
            let simulation =
                engine::simulate(self.challenger.clone(), self.opponent.clone(), &self.config)?;
            return Ok(simulation.record);
        }

        let state = BattleState {
            phase: Phase::Fighting,
            turn: self.start_turn,
            challenger: Some(self.challenger.clone()),
            opponent: Some(self.opponent.clone()),
            current_attacker: self.first_attacker,
            ..BattleState::new()
        };
        let mut engine = BattleEngine::from_state(state, self.config.clone())?;
        engine.run_to_completion();
        engine.take_record().ok_or(EngineError::MissingCombatant {
            side: Side::Challenger,
        })
    }
}

/// `"{challenger}:{opponent}:{seed as 16 hex digits}"`, suffixed with
/// `@{turn}` for resumed records.
pub fn record_id(challenger_id: &str, opponent_id: &str, seed: u64) -> String {
    format!("{challenger_id}:{opponent_id}:{seed:016x}")
}
