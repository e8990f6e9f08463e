//! Battle state owned by a [`BattleEngine`](crate::engine::BattleEngine).
//!
//! Serialized with camelCase keys. The top-level keys of [`BattleState`] are
//! all required, see [`crate::codec`].

mod log;

pub use log::{BattleLogEntry, BuffEvent, LogEvent, LogKind};

use crate::combatant::Combatant;

/// Lifecycle phase: `setup → ready → fighting → finished`.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    /// Combatants are being chosen. No attacks.
    #[default]
    Setup,
    /// Both combatants selected, battle not started.
    Ready,
    /// Attacks permitted.
    Fighting,
    /// Terminal.
    Finished,
}

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Side {
    #[default]
    Challenger,
    Opponent,
}

impl Side {
    pub const fn other(self) -> Self {
        match self {
            Self::Challenger => Self::Opponent,
            Self::Opponent => Self::Challenger,
        }
    }

    /// 0 for the challenger, 1 for the opponent.
    pub const fn index(self) -> u32 {
        match self {
            Self::Challenger => 0,
            Self::Opponent => 1,
        }
    }
}

/// Final outcome, set exactly once when a combatant is defeated.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleResult {
    pub winner: Side,
    pub winner_name: String,
    pub total_turns: u32,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BattleState {
    pub phase: Phase,
    /// Resolved turns so far.
    pub turn: u32,
    pub challenger: Option<Combatant>,
    pub opponent: Option<Combatant>,
    pub current_attacker: Side,
    pub battle_log: Vec<BattleLogEntry>,
    pub result: Option<BattleResult>,
    pub is_auto_battle: bool,
}

impl BattleState {
    /// Fresh `setup` state.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn combatant(&self, side: Side) -> Option<&Combatant> {
        match side {
            Side::Challenger => self.challenger.as_ref(),
            Side::Opponent => self.opponent.as_ref(),
        }
    }

    /// Mutable `(attacker, defender)` pair for a turn of `attacker`.
    pub(crate) fn pair_mut(&mut self, attacker: Side) -> Option<(&mut Combatant, &mut Combatant)> {
        let challenger = self.challenger.as_mut()?;
        let opponent = self.opponent.as_mut()?;
        Some(match attacker {
            Side::Challenger => (challenger, opponent),
            Side::Opponent => (opponent, challenger),
        })
    }

    /// Whether both combatants carry an arena position.
    pub fn is_arena_mode(&self) -> bool {
        matches!(
            (&self.challenger, &self.opponent),
            (Some(c), Some(o)) if c.position.is_some() && o.position.is_some()
        )
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn last_entry(&self) -> Option<&BattleLogEntry> {
        self.battle_log.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::CombatantStats;
    use std::str::FromStr;

    #[test]
    fn phase_parses_lowercase_names() {
        assert_eq!(Phase::from_str("fighting"), Ok(Phase::Fighting));
        assert!(Phase::from_str("Fighting").is_err());
        assert!(Phase::from_str("paused").is_err());
        assert_eq!(Phase::Finished.to_string(), "finished");
    }

    #[test]
    fn sides_alternate() {
        assert_eq!(Side::Challenger.other(), Side::Opponent);
        assert_eq!(Side::Opponent.other().other(), Side::Opponent);
        assert_eq!(Side::Opponent.index(), 1);
    }

    #[test]
    fn pair_mut_orders_attacker_first() {
        let mut state = BattleState::new();
        assert!(state.pair_mut(Side::Challenger).is_none());

        state.challenger =
            Some(Combatant::new("c", "C", CombatantStats::new(1, 1, 1), 10).unwrap());
        state.opponent = Some(Combatant::new("o", "O", CombatantStats::new(1, 1, 1), 10).unwrap());

        let (attacker, defender) = state.pair_mut(Side::Opponent).unwrap();
        assert_eq!(attacker.id, "o");
        assert_eq!(defender.id, "c");
        assert!(!state.is_arena_mode());
    }

    #[test]
    fn fresh_state_serializes_every_top_level_key() {
        let value = serde_json::to_value(BattleState::new()).unwrap();
        let object = value.as_object().unwrap();
        for key in [
            "phase",
            "turn",
            "challenger",
            "opponent",
            "currentAttacker",
            "battleLog",
            "result",
            "isAutoBattle",
        ] {
            assert!(object.contains_key(key), "missing {key}");
        }
        assert_eq!(object["phase"], "setup");
        assert!(object["challenger"].is_null());
    }
}
