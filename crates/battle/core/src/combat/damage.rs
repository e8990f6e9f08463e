//! Damage calculation and application.

use crate::combatant::Combatant;
use crate::stats::EffectiveStats;

/// Full breakdown of one strike.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageResult {
    pub base_damage: u32,
    pub crit_bonus: u32,
    pub is_crit: bool,
    /// `1.0` when the strike is not critical.
    pub crit_multiplier: f64,
    pub final_damage: u32,
    pub effective_defense: u32,
    pub armor_pen_percent: f64,
    pub defender_original_def: u32,
    /// HP the attacker is entitled to heal. Capping at max HP happens in
    /// [`apply_heal`].
    pub lifesteal_amount: u32,
}

/// Calculate the outcome of a single strike.
///
/// # Formula
///
/// ```text
/// effective_defense = floor(def × (1 − armor_pen / 100))
/// base_damage       = max(atk − effective_defense, 1)
/// is_crit           = crit_roll < crit_chance
/// crit_bonus        = floor(base_damage × (crit_damage − 1))   if crit
/// final_damage      = base_damage + crit_bonus
/// lifesteal_amount  = floor(final_damage × lifesteal / 100)
/// ```
///
/// `crit_roll` is a uniform draw in `[0, 1)`.
pub fn calculate_damage(
    attacker: &EffectiveStats,
    defender: &EffectiveStats,
    crit_roll: f64,
) -> DamageResult {
    let armor_pen_percent = attacker.armor_pen;
    let effective_defense = floor_u32(f64::from(defender.def) * (1.0 - armor_pen_percent / 100.0));

    let base_damage = attacker.atk.saturating_sub(effective_defense).max(1);

    let is_crit = crit_roll < attacker.crit_chance;
    let (crit_bonus, crit_multiplier) = if is_crit {
        let bonus = floor_u32(f64::from(base_damage) * (attacker.crit_damage - 1.0));
        (bonus, attacker.crit_damage)
    } else {
        (0, 1.0)
    };
    let final_damage = base_damage.saturating_add(crit_bonus);

    let lifesteal_amount = if attacker.lifesteal > 0.0 {
        floor_u32(f64::from(final_damage) * attacker.lifesteal / 100.0).min(final_damage)
    } else {
        0
    };

    DamageResult {
        base_damage,
        crit_bonus,
        is_crit,
        crit_multiplier,
        final_damage,
        effective_defense,
        armor_pen_percent,
        defender_original_def: defender.def,
        lifesteal_amount,
    }
}

/// Applies a strike to the defender. Returns the HP actually removed.
pub fn apply_damage(defender: &mut Combatant, damage: &DamageResult) -> u32 {
    defender.take_damage(damage.final_damage)
}

/// Heals the attacker by the strike's lifesteal, capped at max HP.
///
/// Returns the HP actually restored.
pub fn apply_heal(attacker: &mut Combatant, damage: &DamageResult) -> u32 {
    attacker.heal(damage.lifesteal_amount)
}

fn floor_u32(value: f64) -> u32 {
    if value.is_nan() || value <= 0.0 {
        0
    } else {
        value.floor() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{CombatantStats, EquipmentBonuses};

    fn effective(stats: CombatantStats) -> EffectiveStats {
        EffectiveStats::compute(&stats.sanitized(), &EquipmentBonuses::none(), &[])
    }

    #[test]
    fn plain_strike_subtracts_defense() {
        let attacker = effective(CombatantStats::new(50, 0, 0));
        let defender = effective(CombatantStats::new(0, 10, 0));
        let result = calculate_damage(&attacker, &defender, 0.5);

        assert_eq!(result.effective_defense, 10);
        assert_eq!(result.base_damage, 40);
        assert!(!result.is_crit);
        assert_eq!(result.crit_multiplier, 1.0);
        assert_eq!(result.final_damage, 40);
        assert_eq!(result.lifesteal_amount, 0);
    }

    #[test]
    fn overwhelming_defense_still_deals_one() {
        let attacker = effective(CombatantStats::new(3, 0, 0));
        let defender = effective(CombatantStats::new(0, 500, 0));
        assert_eq!(calculate_damage(&attacker, &defender, 0.0).final_damage, 1);
    }

    #[test]
    fn armor_pen_reduces_defense() {
        let attacker = effective(CombatantStats::new(30, 0, 0).with_armor_pen(50.0));
        let defender = effective(CombatantStats::new(0, 25, 0));
        let result = calculate_damage(&attacker, &defender, 0.9);

        // floor(25 × 0.5) = 12
        assert_eq!(result.effective_defense, 12);
        assert_eq!(result.defender_original_def, 25);
        assert_eq!(result.final_damage, 18);
    }

    #[test]
    fn crit_adds_floored_bonus() {
        let attacker = effective(CombatantStats::new(25, 0, 0).with_crit(0.5, 1.5));
        let defender = effective(CombatantStats::new(0, 0, 0));

        let crit = calculate_damage(&attacker, &defender, 0.49);
        assert!(crit.is_crit);
        assert_eq!(crit.crit_bonus, 12);
        assert_eq!(crit.final_damage, 37);
        assert_eq!(crit.crit_multiplier, 1.5);

        let normal = calculate_damage(&attacker, &defender, 0.5);
        assert!(!normal.is_crit);
        assert_eq!(normal.final_damage, 25);
    }

    #[test]
    fn lifesteal_heal_is_capped_at_max_hp() {
        let attacker_stats = effective(CombatantStats::new(40, 0, 0).with_lifesteal(50.0));
        let defender_stats = effective(CombatantStats::new(0, 0, 0));
        let result = calculate_damage(&attacker_stats, &defender_stats, 0.9);
        assert_eq!(result.lifesteal_amount, 20);

        let mut attacker = Combatant::new("a", "A", CombatantStats::new(40, 0, 0), 100)
            .unwrap()
            .with_hp(90);
        let mut defender = Combatant::new("d", "D", CombatantStats::new(0, 0, 0), 30).unwrap();

        assert_eq!(apply_damage(&mut defender, &result), 30);
        assert_eq!(defender.current_hp, 0);
        assert_eq!(apply_heal(&mut attacker, &result), 10);
        assert_eq!(attacker.current_hp, 100);
    }
}
