//! Property tests for damage resolution and full-battle termination.

use battle_core::{
    BattleConfig, Combatant, CombatantStats, EffectiveStats, EquipmentBonuses, Phase, StopReason,
    calculate_damage, simulate,
};
use proptest::prelude::*;

fn effective(stats: CombatantStats) -> EffectiveStats {
    EffectiveStats::compute(&stats.sanitized(), &EquipmentBonuses::none(), &[])
}

fn attacker_stats() -> impl Strategy<Value = CombatantStats> {
    (
        0u32..10_000,
        0.0f64..=1.0,
        1.0f64..10.0,
        0.0f64..=100.0,
        0.0f64..=100.0,
    )
        .prop_map(|(atk, crit_chance, crit_damage, armor_pen, lifesteal)| {
            CombatantStats::new(atk, 0, 0)
                .with_crit(crit_chance, crit_damage)
                .with_armor_pen(armor_pen)
                .with_lifesteal(lifesteal)
        })
}

proptest! {
    #[test]
    fn every_hit_deals_at_least_one(
        attacker in attacker_stats(),
        def in 0u32..20_000,
        roll in 0.0f64..1.0,
    ) {
        let result = calculate_damage(
            &effective(attacker),
            &effective(CombatantStats::new(0, def, 0)),
            roll,
        );
        prop_assert!(result.final_damage >= 1);
        prop_assert!(result.effective_defense <= def);
    }

    #[test]
    fn crit_never_lowers_damage(
        attacker in attacker_stats(),
        def in 0u32..20_000,
        roll in 0.0f64..1.0,
    ) {
        let result = calculate_damage(
            &effective(attacker),
            &effective(CombatantStats::new(0, def, 0)),
            roll,
        );
        if result.is_crit {
            prop_assert!(result.final_damage >= result.base_damage);
        } else {
            prop_assert_eq!(result.final_damage, result.base_damage);
            prop_assert_eq!(result.crit_bonus, 0);
        }
    }

    #[test]
    fn lifesteal_is_bounded_by_damage(
        attacker in attacker_stats(),
        def in 0u32..20_000,
        roll in 0.0f64..1.0,
    ) {
        let result = calculate_damage(
            &effective(attacker),
            &effective(CombatantStats::new(0, def, 0)),
            roll,
        );
        prop_assert!(result.lifesteal_amount <= result.final_damage);
        if attacker.lifesteal == 0.0 {
            prop_assert_eq!(result.lifesteal_amount, 0);
        }
    }

    #[test]
    fn full_simulation_respects_turn_cap(
        a in attacker_stats(),
        b in attacker_stats(),
        def_a in 0u32..200,
        def_b in 0u32..200,
        hp_a in 1u32..2_000,
        hp_b in 1u32..2_000,
        max_turns in 1u32..300,
        seed in any::<u64>(),
    ) {
        let challenger = Combatant::new("a", "A", CombatantStats { def: def_a, ..a }, hp_a).unwrap();
        let opponent = Combatant::new("b", "B", CombatantStats { def: def_b, ..b }, hp_b).unwrap();
        let config = BattleConfig::new().with_seed(seed).with_max_turns(max_turns);

        let simulation = simulate(challenger, opponent, &config).unwrap();
        prop_assert!(simulation.state.turn <= max_turns);
        match simulation.stop {
            StopReason::Victory => prop_assert_eq!(simulation.state.phase, Phase::Finished),
            StopReason::TurnCap => {
                prop_assert_eq!(simulation.state.turn, max_turns);
                prop_assert_eq!(simulation.state.phase, Phase::Fighting);
            }
            StopReason::Idle => prop_assert!(false, "simulation never started"),
        }
    }
}
