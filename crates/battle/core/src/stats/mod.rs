//! Combatant stats: base values, equipment bonuses and effective values.
//!
//! ```text
//! [ CombatantStats (base, immutable) ]
//!      + EquipmentBonuses (flat)
//!      + active buffs (flat and percentage)
//!      ↓  ModifierStack: (base + Σ flat) × (1 + Σ percent / 100)
//! [ EffectiveStats (clamped) ]
//! ```

pub mod bonus;

pub use bonus::{Modifier, ModifierStack};

use crate::buff::ActiveBuff;

/// Stat targeted by a buff or an equipment bonus.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum StatKind {
    Atk,
    Def,
    Spd,
    CritChance,
    CritDamage,
    ArmorPen,
    Lifesteal,
}

/// Base combat stats of a combatant.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatantStats {
    pub atk: u32,
    pub def: u32,
    pub spd: u32,
    /// Probability of a critical hit, in `[0, 1]`.
    pub crit_chance: f64,
    /// Damage multiplier on a critical hit, `>= 1`.
    pub crit_damage: f64,
    /// Percentage of the defender's defense ignored, in `[0, 100]`.
    pub armor_pen: f64,
    /// Percentage of dealt damage healed back, in `[0, 100]`.
    pub lifesteal: f64,
}

impl CombatantStats {
    /// Upper bound of the crit multiplier after sanitizing.
    pub const MAX_CRIT_DAMAGE: f64 = 100.0;

    /// Plain stats: no crits, no penetration, no lifesteal.
    pub const fn new(atk: u32, def: u32, spd: u32) -> Self {
        Self {
            atk,
            def,
            spd,
            crit_chance: 0.0,
            crit_damage: 1.0,
            armor_pen: 0.0,
            lifesteal: 0.0,
        }
    }

    #[must_use]
    pub const fn with_crit(mut self, chance: f64, damage: f64) -> Self {
        self.crit_chance = chance;
        self.crit_damage = damage;
        self
    }

    #[must_use]
    pub const fn with_armor_pen(mut self, armor_pen: f64) -> Self {
        self.armor_pen = armor_pen;
        self
    }

    #[must_use]
    pub const fn with_lifesteal(mut self, lifesteal: f64) -> Self {
        self.lifesteal = lifesteal;
        self
    }

    /// Returns a copy with every ratio clamped into its legal range.
    ///
    /// NaN collapses to the lower bound of the range.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        Self {
            atk: self.atk,
            def: self.def,
            spd: self.spd,
            crit_chance: clamp_ratio(self.crit_chance, 0.0, 1.0),
            crit_damage: clamp_ratio(self.crit_damage, 1.0, Self::MAX_CRIT_DAMAGE),
            armor_pen: clamp_ratio(self.armor_pen, 0.0, 100.0),
            lifesteal: clamp_ratio(self.lifesteal, 0.0, 100.0),
        }
    }

    fn value(&self, stat: StatKind) -> f64 {
        match stat {
            StatKind::Atk => f64::from(self.atk),
            StatKind::Def => f64::from(self.def),
            StatKind::Spd => f64::from(self.spd),
            StatKind::CritChance => self.crit_chance,
            StatKind::CritDamage => self.crit_damage,
            StatKind::ArmorPen => self.armor_pen,
            StatKind::Lifesteal => self.lifesteal,
        }
    }
}

impl Default for CombatantStats {
    fn default() -> Self {
        Self::new(0, 0, 0)
    }
}

/// Flat bonuses contributed by equipped gear (weapons, gems).
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentBonuses {
    pub atk: i32,
    pub def: i32,
    pub spd: i32,
    pub crit_chance: f64,
    pub crit_damage: f64,
    pub armor_pen: f64,
    pub lifesteal: f64,
    /// Attack range granted by the equipped weapon (arena mode).
    pub weapon_range: Option<u32>,
}

impl EquipmentBonuses {
    pub fn none() -> Self {
        Self::default()
    }

    fn flat(&self, stat: StatKind) -> f64 {
        match stat {
            StatKind::Atk => f64::from(self.atk),
            StatKind::Def => f64::from(self.def),
            StatKind::Spd => f64::from(self.spd),
            StatKind::CritChance => self.crit_chance,
            StatKind::CritDamage => self.crit_damage,
            StatKind::ArmorPen => self.armor_pen,
            StatKind::Lifesteal => self.lifesteal,
        }
    }
}

/// Stats after equipment and buffs, clamped to their legal ranges.
///
/// Recomputed whenever needed; never stored in the battle state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectiveStats {
    pub atk: u32,
    pub def: u32,
    pub spd: u32,
    pub crit_chance: f64,
    pub crit_damage: f64,
    pub armor_pen: f64,
    pub lifesteal: f64,
}

impl EffectiveStats {
    /// Computes effective stats in the fixed order
    /// `(base + equipment + Σ flat buffs) × (1 + Σ percent buffs / 100)`.
    pub fn compute(
        base: &CombatantStats,
        equipment: &EquipmentBonuses,
        buffs: &[ActiveBuff],
    ) -> Self {
        let resolve = |stat: StatKind| -> f64 {
            let mut stack = ModifierStack::new();
            stack.add(Modifier::Flat(equipment.flat(stat)));
            stack.extend(
                buffs
                    .iter()
                    .filter(|buff| buff.stat == stat)
                    .map(ActiveBuff::modifier),
            );
            stack.apply(base.value(stat))
        };

        Self {
            atk: floor_non_negative(resolve(StatKind::Atk)),
            def: floor_non_negative(resolve(StatKind::Def)),
            spd: floor_non_negative(resolve(StatKind::Spd)),
            crit_chance: clamp_ratio(resolve(StatKind::CritChance), 0.0, 1.0),
            crit_damage: clamp_ratio(
                resolve(StatKind::CritDamage),
                1.0,
                CombatantStats::MAX_CRIT_DAMAGE,
            ),
            armor_pen: clamp_ratio(resolve(StatKind::ArmorPen), 0.0, 100.0),
            lifesteal: clamp_ratio(resolve(StatKind::Lifesteal), 0.0, 100.0),
        }
    }

    pub fn get(&self, stat: StatKind) -> f64 {
        match stat {
            StatKind::Atk => f64::from(self.atk),
            StatKind::Def => f64::from(self.def),
            StatKind::Spd => f64::from(self.spd),
            StatKind::CritChance => self.crit_chance,
            StatKind::CritDamage => self.crit_damage,
            StatKind::ArmorPen => self.armor_pen,
            StatKind::Lifesteal => self.lifesteal,
        }
    }
}

fn clamp_ratio(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

fn floor_non_negative(value: f64) -> u32 {
    if value.is_nan() || value <= 0.0 {
        0
    } else {
        // `as` saturates at u32::MAX
        value.floor() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buff::{ActiveBuff, BuffKind, StackRule};

    fn buff(id: &str, stat: StatKind, value: f64, percent: bool) -> ActiveBuff {
        ActiveBuff {
            id: id.to_string(),
            name: id.to_string(),
            kind: if value >= 0.0 {
                BuffKind::Buff
            } else {
                BuffKind::Debuff
            },
            stat,
            value,
            is_percentage: percent,
            remaining_duration: 2,
            stack_rule: StackRule::Replace,
            stacks: 1,
        }
    }

    #[test]
    fn sanitized_clamps_ratios() {
        let stats = CombatantStats::new(10, 5, 3)
            .with_crit(1.7, 0.5)
            .with_armor_pen(150.0)
            .with_lifesteal(f64::NAN)
            .sanitized();

        assert_eq!(stats.crit_chance, 1.0);
        assert_eq!(stats.crit_damage, 1.0);
        assert_eq!(stats.armor_pen, 100.0);
        assert_eq!(stats.lifesteal, 0.0);

        let huge = CombatantStats::new(1, 0, 0).with_crit(0.5, 1.0e9).sanitized();
        assert_eq!(huge.crit_damage, CombatantStats::MAX_CRIT_DAMAGE);
    }

    #[test]
    fn no_modifiers_returns_base() {
        let base = CombatantStats::new(50, 10, 7).with_crit(0.25, 1.5);
        let effective = EffectiveStats::compute(&base, &EquipmentBonuses::none(), &[]);
        assert_eq!(effective.atk, 50);
        assert_eq!(effective.def, 10);
        assert_eq!(effective.crit_chance, 0.25);
        assert_eq!(effective.crit_damage, 1.5);
    }

    #[test]
    fn equipment_and_flat_buffs_apply_before_percentages() {
        let base = CombatantStats::new(40, 0, 0);
        let equipment = EquipmentBonuses {
            atk: 10,
            ..EquipmentBonuses::none()
        };
        let buffs = [
            buff("rage", StatKind::Atk, 50.0, true),
            buff("whetstone", StatKind::Atk, 10.0, false),
        ];

        // (40 + 10 + 10) × 1.5
        let effective = EffectiveStats::compute(&base, &equipment, &buffs);
        assert_eq!(effective.atk, 90);
    }

    #[test]
    fn debuffs_never_push_stats_below_zero() {
        let base = CombatantStats::new(5, 5, 5);
        let buffs = [buff("sunder", StatKind::Def, -20.0, false)];
        let effective = EffectiveStats::compute(&base, &EquipmentBonuses::none(), &buffs);
        assert_eq!(effective.def, 0);
    }

    #[test]
    fn stacked_add_buff_contributes_value_times_stacks() {
        let base = CombatantStats::new(10, 0, 0);
        let mut stacked = buff("frenzy", StatKind::Atk, 3.0, false);
        stacked.stacks = 3;
        let effective = EffectiveStats::compute(&base, &EquipmentBonuses::none(), &[stacked]);
        assert_eq!(effective.atk, 19);
    }
}
