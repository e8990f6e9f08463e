//! Snapshot of one fighter: stats, HP, buffs, abilities and arena position.

use arrayvec::ArrayVec;

use crate::ability::{AbilityDefinition, AbilityState};
use crate::buff::Buffs;
use crate::config::BattleConfig;
use crate::error::{BattleError, ErrorSeverity};
use crate::stats::{CombatantStats, EffectiveStats, EquipmentBonuses};

/// Equipped ability slots.
pub type AbilitySlots = ArrayVec<AbilityState, { BattleConfig::MAX_ABILITIES }>;

/// Errors raised while building a combatant.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CombatantError {
    #[error("combatant id must not be empty")]
    EmptyId,

    #[error("combatant {id} must have a positive max HP")]
    ZeroMaxHp { id: String },

    #[error("combatant {id} cannot equip more than {max} abilities")]
    TooManyAbilities { id: String, max: usize },
}

impl BattleError for CombatantError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyId => "COMBATANT_EMPTY_ID",
            Self::ZeroMaxHp { .. } => "COMBATANT_ZERO_MAX_HP",
            Self::TooManyAbilities { .. } => "COMBATANT_TOO_MANY_ABILITIES",
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Combatant {
    pub id: String,
    pub name: String,
    pub base_stats: CombatantStats,
    pub equipment: EquipmentBonuses,
    pub current_hp: u32,
    pub max_hp: u32,
    pub buffs: Buffs,
    /// Attack range override (arena mode).
    pub effective_range: Option<u32>,
    /// Arena cell (arena mode).
    pub position: Option<u32>,
    pub abilities: AbilitySlots,
}

impl Combatant {
    /// Creates a combatant at full HP with sanitized stats.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        base_stats: CombatantStats,
        max_hp: u32,
    ) -> Result<Self, CombatantError> {
        let id = id.into();
        if id.is_empty() {
            return Err(CombatantError::EmptyId);
        }
        if max_hp == 0 {
            return Err(CombatantError::ZeroMaxHp { id });
        }

        Ok(Self {
            id,
            name: name.into(),
            base_stats: base_stats.sanitized(),
            equipment: EquipmentBonuses::none(),
            current_hp: max_hp,
            max_hp,
            buffs: Buffs::empty(),
            effective_range: None,
            position: None,
            abilities: ArrayVec::new(),
        })
    }

    #[must_use]
    pub fn with_equipment(mut self, equipment: EquipmentBonuses) -> Self {
        self.equipment = equipment;
        self
    }

    #[must_use]
    pub fn with_position(mut self, position: u32) -> Self {
        self.position = Some(position);
        self
    }

    #[must_use]
    pub fn with_range(mut self, range: u32) -> Self {
        self.effective_range = Some(range);
        self
    }

    /// Sets current HP, capped at max HP.
    #[must_use]
    pub fn with_hp(mut self, hp: u32) -> Self {
        self.current_hp = hp.min(self.max_hp);
        self
    }

    #[must_use]
    pub fn with_buffs(mut self, buffs: Buffs) -> Self {
        self.buffs = buffs;
        self
    }

    /// Equips abilities in order, each ready to trigger.
    pub fn with_abilities(
        mut self,
        abilities: impl IntoIterator<Item = AbilityDefinition>,
    ) -> Result<Self, CombatantError> {
        for definition in abilities {
            self.abilities
                .try_push(AbilityState::ready(definition))
                .map_err(|_| CombatantError::TooManyAbilities {
                    id: self.id.clone(),
                    max: BattleConfig::MAX_ABILITIES,
                })?;
        }
        Ok(self)
    }

    pub fn is_defeated(&self) -> bool {
        self.current_hp == 0
    }

    pub fn effective_stats(&self) -> EffectiveStats {
        EffectiveStats::compute(&self.base_stats, &self.equipment, self.buffs.as_slice())
    }

    /// Strike range in cells, never below 1.
    pub fn attack_range(&self) -> u32 {
        self.effective_range
            .or(self.equipment.weapon_range)
            .unwrap_or(1)
            .max(1)
    }

    /// Removes HP, flooring at 0. Returns the HP actually removed.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let before = self.current_hp;
        self.current_hp = before.saturating_sub(amount);
        before - self.current_hp
    }

    /// Restores HP, capped at max HP. Returns the HP actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.current_hp;
        self.current_hp = before.saturating_add(amount).min(self.max_hp);
        self.current_hp - before
    }

    /// Decrements every ability cooldown except the slot that just triggered.
    pub(crate) fn tick_cooldowns(&mut self, skip_slot: Option<usize>) {
        for (slot, ability) in self.abilities.iter_mut().enumerate() {
            if Some(slot) != skip_slot {
                ability.tick();
            }
        }
    }
}
