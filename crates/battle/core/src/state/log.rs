//! Battle log entries.
//!
//! Each entry carries a sequence id, the clock timestamp, a human readable
//! message and a typed payload. Serialized, the payload is flattened next to
//! the common fields and discriminated by `type`:
//!
//! ```json
//! { "id": 2, "timestamp": 2, "message": "Alpha deals 40 damage to Beta",
//!   "type": "damage", "attackerId": "a", "defenderId": "b", "damage": 40,
//!   "isCrit": false, "hasLifesteal": false, "lifestealAmount": 0 }
//! ```

use crate::ability::SkillDescriptor;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleLogEntry {
    /// 1-based position in the log.
    pub id: u64,
    pub timestamp: u64,
    pub message: String,
    #[serde(flatten)]
    pub event: LogEvent,
}

impl BattleLogEntry {
    pub fn kind(&self) -> LogKind {
        self.event.kind()
    }
}

/// Typed payload of a log entry.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogEvent {
    #[serde(rename_all = "camelCase")]
    Attack {
        attacker_id: String,
        defender_id: String,
    },
    #[serde(rename_all = "camelCase")]
    Damage {
        attacker_id: String,
        defender_id: String,
        damage: u32,
        is_crit: bool,
        has_lifesteal: bool,
        lifesteal_amount: u32,
    },
    #[serde(rename_all = "camelCase")]
    Victory { winner_id: String, loser_id: String },
    #[serde(rename_all = "camelCase")]
    Skill {
        combatant_id: String,
        skill: SkillDescriptor,
    },
    #[serde(rename_all = "camelCase")]
    Buff {
        combatant_id: String,
        buff_id: String,
        event: BuffEvent,
    },
    /// Arena movement, regular or ability-driven.
    #[serde(rename_all = "camelCase")]
    Move {
        combatant_id: String,
        from: u32,
        to: u32,
    },
}

impl LogEvent {
    pub fn kind(&self) -> LogKind {
        match self {
            Self::Attack { .. } => LogKind::Attack,
            Self::Damage { .. } => LogKind::Damage,
            Self::Victory { .. } => LogKind::Victory,
            Self::Skill { .. } => LogKind::Skill,
            Self::Buff { .. } => LogKind::Buff,
            Self::Move { .. } => LogKind::Move,
        }
    }
}

/// Discriminant of [`LogEvent`], handy for filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum LogKind {
    Attack,
    Damage,
    Victory,
    Skill,
    Buff,
    Move,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BuffEvent {
    Applied,
    Expired,
}
