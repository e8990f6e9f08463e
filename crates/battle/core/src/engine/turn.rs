//! Resolution of a single turn.
//!
//! Order within a turn:
//!
//! 1. range check (arena mode only)
//! 2. ability selection for the movement or strike window
//! 3. movement, or one or two strikes, or an execute
//! 4. cooldown tick on both combatants (the triggered slot keeps its reset)
//! 5. buff tick on both combatants, expiries logged
//! 6. turn counter and attacker toggle
//! 7. victory, always the last log entry of the battle
//! 8. turn record

use super::{AttackResult, BattleEngine};
use crate::ability::{self, ResolveContext, ResolvePhase, SideEffect, SkillDescriptor};
use crate::arena::ArenaView;
use crate::buff::BuffKind;
use crate::combat::{DamageResult, apply_damage, apply_heal, calculate_damage};
use crate::combatant::Combatant;
use crate::env::{RngOracle, compute_seed, rng::context};
use crate::record::{LifestealRecord, Movement, TurnAction, TurnRecord};
use crate::state::{BattleLogEntry, BattleResult, BuffEvent, LogEvent, Phase};

/// Log entries produced during a turn, flushed once the turn is resolved.
#[derive(Default)]
struct TurnLog {
    entries: Vec<(LogEvent, String)>,
}

impl TurnLog {
    fn push(&mut self, event: LogEvent, message: String) {
        self.entries.push((event, message));
    }

    fn skill(&mut self, attacker: &Combatant, skill: &SkillDescriptor) {
        self.push(
            LogEvent::Skill {
                combatant_id: attacker.id.clone(),
                skill: skill.clone(),
            },
            format!("{} uses {}", attacker.name, skill.name),
        );
    }

    fn buff(&mut self, target: &Combatant, buff_id: &str, buff_name: &str, event: BuffEvent) {
        let message = match event {
            BuffEvent::Applied => format!("{buff_name} applied to {}", target.name),
            BuffEvent::Expired => format!("{buff_name} on {} expired", target.name),
        };
        self.push(
            LogEvent::Buff {
                combatant_id: target.id.clone(),
                buff_id: buff_id.to_string(),
                event,
            },
            message,
        );
    }

    fn movement(&mut self, mover: &Combatant, from: u32, to: u32) {
        self.push(
            LogEvent::Move {
                combatant_id: mover.id.clone(),
                from,
                to,
            },
            format!("{} moves from {from} to {to}", mover.name),
        );
    }

    fn attack(&mut self, attacker: &Combatant, defender: &Combatant) {
        self.push(
            LogEvent::Attack {
                attacker_id: attacker.id.clone(),
                defender_id: defender.id.clone(),
            },
            format!("{} attacks {}", attacker.name, defender.name),
        );
    }

    fn damage(
        &mut self,
        attacker: &Combatant,
        defender: &Combatant,
        damage: u32,
        is_crit: bool,
        lifesteal_amount: u32,
    ) {
        let mut message = format!("{} deals {damage} damage to {}", attacker.name, defender.name);
        if is_crit {
            message.insert_str(0, "Critical hit! ");
        }
        if lifesteal_amount > 0 {
            message.push_str(&format!(" and drains {lifesteal_amount} HP"));
        }
        self.push(
            LogEvent::Damage {
                attacker_id: attacker.id.clone(),
                defender_id: defender.id.clone(),
                damage,
                is_crit,
                has_lifesteal: lifesteal_amount > 0,
                lifesteal_amount,
            },
            message,
        );
    }
}

struct Strike {
    damage: DamageResult,
    healed: u32,
}

fn strike(
    attacker: &mut Combatant,
    defender: &mut Combatant,
    crit_roll: f64,
    log: &mut TurnLog,
) -> Strike {
    let damage = calculate_damage(&attacker.effective_stats(), &defender.effective_stats(), crit_roll);
    apply_damage(defender, &damage);
    let healed = apply_heal(attacker, &damage);

    log.attack(attacker, defender);
    log.damage(
        attacker,
        defender,
        damage.final_damage,
        damage.is_crit,
        damage.lifesteal_amount,
    );
    Strike { damage, healed }
}

fn relocate(combatant: &mut Combatant, from: u32, to: u32, log: &mut TurnLog) -> Movement {
    combatant.position = Some(to);
    log.movement(combatant, from, to);
    Movement {
        combatant_id: combatant.id.clone(),
        from,
        to,
    }
}

impl BattleEngine {
    pub(super) fn resolve_turn(&mut self) -> Option<AttackResult> {
        let side = self.state.current_attacker;
        let turn = self.state.turn + 1;
        let arena_mode = self.state.is_arena_mode();
        let battle_seed = self.config.seed;
        let arena_size = self.config.arena_size;
        let move_step = self.config.move_step;
        let rng: &dyn RngOracle = self.rng.as_ref();
        let seed_for = |context: u32| compute_seed(battle_seed, turn, side.index(), context);

        let (attacker, defender) = self.state.pair_mut(side)?;
        let attacker_hp_before = attacker.current_hp;
        let defender_hp_before = defender.current_hp;
        let mut log = TurnLog::default();

        let view = match (arena_mode, attacker.position, defender.position) {
            (true, Some(a), Some(d)) => Some(ArenaView::new(arena_size, a, d)),
            _ => None,
        };
        let in_range = view.is_none_or(|v| v.in_range(attacker.attack_range()));

        // 1. Ability selection
        let ctx = ResolveContext {
            phase: if in_range {
                ResolvePhase::Strike
            } else {
                ResolvePhase::Movement
            },
            attacker_hp: attacker.current_hp,
            attacker_max_hp: attacker.max_hp,
            defender_hp: defender.current_hp,
            defender_max_hp: defender.max_hp,
            arena: view,
            move_step,
        };
        let selection = ability::select(&attacker.abilities, &ctx, |slot| {
            rng.roll_percent(seed_for(context::ABILITY_BASE + slot as u32))
        });

        let mut triggered_slot = None;
        let mut side_effect = None;
        let mut skill = None;
        if let Some((slot, resolution)) = selection {
            let state = &mut attacker.abilities[slot];
            state.current_cooldown = resolution.cooldown_after;
            let definition = state.definition.clone();
            triggered_slot = Some(slot);
            side_effect = resolution.side_effect;

            if let Some(effect) = side_effect {
                let descriptor = SkillDescriptor::new(&definition, effect);
                tracing::debug!(
                    turn,
                    attacker = %attacker.id,
                    ability = %definition.id,
                    kind = %definition.kind,
                    "ability triggered"
                );
                log.skill(attacker, &descriptor);
                skill = Some(descriptor);
            }

            if let Some(buff) = definition.applies {
                let target: &mut Combatant = match buff.kind {
                    BuffKind::Buff => &mut *attacker,
                    BuffKind::Debuff => &mut *defender,
                };
                let (id, name) = (buff.id.clone(), buff.name.clone());
                if target.buffs.apply(buff).is_stored() {
                    log.buff(target, &id, &name, BuffEvent::Applied);
                }
            }
        }

        // 2. Movement, strikes or execute
        let mut strikes = Vec::new();
        let mut movement = None;
        let action = if !in_range {
            match (side_effect, view) {
                (Some(SideEffect::LeapStrike { from, to }), _) => {
                    movement = Some(relocate(attacker, from, to, &mut log));
                    let roll = rng.unit(seed_for(context::CRIT));
                    strikes.push(strike(attacker, defender, roll, &mut log));
                    TurnAction::Strike
                }
                (Some(SideEffect::DoubleMove { from, to }), _) => {
                    movement = Some(relocate(attacker, from, to, &mut log));
                    TurnAction::Move
                }
                (_, Some(view)) => {
                    let to = view.advance_attacker(move_step);
                    movement = Some(relocate(attacker, view.attacker, to, &mut log));
                    TurnAction::Move
                }
                (_, None) => TurnAction::Move,
            }
        } else if let Some(SideEffect::Execute { hp_removed }) = side_effect {
            defender.take_damage(hp_removed);
            log.attack(attacker, defender);
            log.damage(attacker, defender, hp_removed, false, 0);
            TurnAction::Execute
        } else {
            let roll = rng.unit(seed_for(context::CRIT));
            strikes.push(strike(attacker, defender, roll, &mut log));

            if !defender.is_defeated() {
                match side_effect {
                    Some(SideEffect::DoubleAttack) => {
                        let roll = rng.unit(seed_for(context::CRIT_SECOND_STRIKE));
                        strikes.push(strike(attacker, defender, roll, &mut log));
                    }
                    Some(SideEffect::Knockback { from, to }) => {
                        movement = Some(relocate(defender, from, to, &mut log));
                    }
                    Some(SideEffect::Retreat { from, to }) => {
                        movement = Some(relocate(attacker, from, to, &mut log));
                    }
                    _ => {}
                }
            }
            TurnAction::Strike
        };

        // 3. Cooldowns and buffs tick once per turn
        attacker.tick_cooldowns(triggered_slot);
        defender.tick_cooldowns(None);
        for combatant in [&mut *attacker, &mut *defender] {
            for expired in combatant.buffs.tick() {
                log.buff(combatant, &expired.id, &expired.name, BuffEvent::Expired);
            }
        }

        // 4. Victory
        let total_damage = defender_hp_before - defender.current_hp;
        let finished = defender.is_defeated();
        let result = finished.then(|| BattleResult {
            winner: side,
            winner_name: attacker.name.clone(),
            total_turns: turn,
        });
        if finished {
            log.push(
                LogEvent::Victory {
                    winner_id: attacker.id.clone(),
                    loser_id: defender.id.clone(),
                },
                format!("{} wins!", attacker.name),
            );
        }

        let lifesteal_amount: u32 = strikes.iter().map(|s| s.damage.lifesteal_amount).sum();
        let lifesteal = (lifesteal_amount > 0).then(|| LifestealRecord {
            amount: lifesteal_amount,
            healed: strikes.iter().map(|s| s.healed).sum(),
        });

        let turn_record = TurnRecord {
            turn,
            attacker: side,
            attacker_id: attacker.id.clone(),
            attacker_name: attacker.name.clone(),
            defender_id: defender.id.clone(),
            defender_name: defender.name.clone(),
            action,
            strikes: strikes.iter().map(|s| s.damage).collect(),
            total_damage,
            attacker_hp_before,
            attacker_hp_after: attacker.current_hp,
            defender_hp_before,
            defender_hp_after: defender.current_hp,
            lifesteal,
            skill: skill.clone(),
            movement: movement.clone(),
            attacker_position: attacker.position,
            defender_position: defender.position,
        };
        let defender_hp = defender.current_hp;
        let winner_id = finished.then(|| attacker.id.clone());

        // 5. Commit
        self.state.turn = turn;
        self.state.current_attacker = side.other();
        for (event, message) in log.entries {
            let entry = BattleLogEntry {
                id: self.state.battle_log.len() as u64 + 1,
                timestamp: self.clock.now(),
                message,
                event,
            };
            self.state.battle_log.push(entry);
        }
        if let Some(result) = result {
            tracing::debug!(turn, winner = %result.winner_name, "battle finished");
            self.state.result = Some(result);
            self.state.phase = Phase::Finished;
        }
        if let Some(record) = self.record.as_mut() {
            record.push(turn_record);
            if let Some(winner_id) = winner_id {
                record.set_winner(winner_id);
            }
        }

        Some(AttackResult {
            attacker: side,
            turn,
            damage: total_damage,
            is_critical: strikes.iter().any(|s| s.damage.is_crit),
            lifesteal_heal: lifesteal.map(|l| l.healed),
            skill,
            movement,
            defender_hp,
            finished,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::{AbilityDefinition, AbilityKind, Trigger};
    use crate::buff::ActiveBuff;
    use crate::config::BattleConfig;
    use crate::state::{LogKind, Side};
    use crate::stats::{CombatantStats, StatKind};

    fn fighter(id: &str, stats: CombatantStats, hp: u32) -> Combatant {
        Combatant::new(id, id.to_uppercase(), stats, hp).unwrap()
    }

    fn fighting(challenger: Combatant, opponent: Combatant) -> BattleEngine {
        let mut engine = BattleEngine::new(BattleConfig::new().with_seed(42));
        engine.initialize(challenger, opponent).unwrap();
        assert!(engine.start_battle());
        engine
    }

    fn ability(kind: AbilityKind, trigger: Trigger, cooldown: u32) -> AbilityDefinition {
        AbilityDefinition::new(format!("{kind}"), format!("{kind}"), kind, trigger, cooldown)
    }

    fn kinds(engine: &BattleEngine) -> Vec<LogKind> {
        engine.state().battle_log.iter().map(|e| e.kind()).collect()
    }

    #[test]
    fn fifty_attack_against_ten_defense() {
        let a = fighter("a", CombatantStats::new(50, 0, 0), 100);
        let b = fighter("b", CombatantStats::new(0, 10, 0), 100);
        let mut engine = fighting(a, b);

        let first = engine.execute_attack().unwrap();
        assert_eq!(first.attacker, Side::Challenger);
        assert_eq!(first.damage, 40);
        assert!(!first.is_critical);
        assert_eq!(first.defender_hp, 60);
        assert_eq!(engine.state().phase, Phase::Fighting);

        // B retaliates for the 1 damage floor.
        let second = engine.execute_attack().unwrap();
        assert_eq!(second.damage, 1);

        engine.execute_attack();
        engine.execute_attack();
        let last = engine.execute_attack().unwrap();
        assert!(last.finished);
        assert_eq!(last.defender_hp, 0);

        let state = engine.state();
        assert_eq!(state.phase, Phase::Finished);
        let result = state.result.as_ref().unwrap();
        assert_eq!(result.winner, Side::Challenger);
        assert_eq!(result.winner_name, "A");
        assert_eq!(result.total_turns, 5);
        assert_eq!(state.turn, 5);
        assert_eq!(state.last_entry().unwrap().kind(), LogKind::Victory);
        assert_eq!(engine.record().unwrap().winner_id.as_deref(), Some("a"));
    }

    #[test]
    fn no_entries_after_finish() {
        let a = fighter("a", CombatantStats::new(100, 0, 0), 10);
        let b = fighter("b", CombatantStats::new(0, 0, 0), 10);
        let mut engine = fighting(a, b);

        assert!(engine.execute_attack().unwrap().finished);
        let snapshot = engine.state().clone();
        assert!(engine.execute_attack().is_none());
        assert_eq!(engine.state(), &snapshot);
    }

    #[test]
    fn attacker_alternates_every_turn() {
        let a = fighter("a", CombatantStats::new(2, 0, 0), 500);
        let b = fighter("b", CombatantStats::new(2, 0, 0), 500);
        let mut engine = fighting(a, b);

        let mut previous = None;
        for _ in 0..20 {
            let expected = engine.state().current_attacker;
            let result = engine.execute_attack().unwrap();
            assert_eq!(result.attacker, expected);
            assert_ne!(Some(result.attacker), previous);
            assert_eq!(engine.state().current_attacker, expected.other());
            previous = Some(result.attacker);
        }
    }

    #[test]
    fn out_of_range_turn_is_a_movement_step() {
        let a = fighter("a", CombatantStats::new(10, 0, 0), 50).with_position(0);
        let b = fighter("b", CombatantStats::new(10, 0, 0), 50).with_position(7);
        let mut engine = fighting(a, b);

        let first = engine.execute_attack().unwrap();
        assert_eq!(first.damage, 0);
        assert_eq!(
            first.movement,
            Some(Movement {
                combatant_id: "a".into(),
                from: 0,
                to: 1
            })
        );

        let second = engine.execute_attack().unwrap();
        assert_eq!(second.movement.map(|m| m.to), Some(6));
        assert_eq!(kinds(&engine), [LogKind::Move, LogKind::Move]);

        let record = engine.record().unwrap();
        assert_eq!(record.turn(1).unwrap().action, TurnAction::Move);
        assert_eq!(record.turn(2).unwrap().attacker_position, Some(6));
        assert_eq!(record.turn(2).unwrap().defender_position, Some(1));
    }

    #[test]
    fn weapon_range_allows_strikes_from_afar() {
        let a = fighter("a", CombatantStats::new(10, 0, 0), 50)
            .with_position(0)
            .with_range(3);
        let b = fighter("b", CombatantStats::new(10, 0, 0), 50).with_position(3);
        let mut engine = fighting(a, b);

        assert_eq!(engine.execute_attack().unwrap().damage, 10);
    }

    #[test]
    fn leap_strike_closes_distance_and_hits() {
        let a = fighter("a", CombatantStats::new(10, 0, 0), 50)
            .with_position(0)
            .with_abilities([ability(AbilityKind::LeapStrike, Trigger::Always, 3)])
            .unwrap();
        let b = fighter("b", CombatantStats::new(10, 0, 0), 50).with_position(6);
        let mut engine = fighting(a, b);

        let result = engine.execute_attack().unwrap();
        assert_eq!(result.movement.as_ref().map(|m| (m.from, m.to)), Some((0, 5)));
        assert_eq!(result.damage, 10);
        assert_eq!(result.skill.as_ref().unwrap().kind, AbilityKind::LeapStrike);
        assert_eq!(
            kinds(&engine),
            [LogKind::Skill, LogKind::Move, LogKind::Attack, LogKind::Damage]
        );
        assert_eq!(
            engine.record().unwrap().turn(1).unwrap().action,
            TurnAction::Strike
        );
    }

    #[test]
    fn double_move_covers_two_steps() {
        let a = fighter("a", CombatantStats::new(10, 0, 0), 50)
            .with_position(0)
            .with_abilities([ability(AbilityKind::DoubleMove, Trigger::Always, 3)])
            .unwrap();
        let b = fighter("b", CombatantStats::new(10, 0, 0), 50).with_position(7);
        let mut engine = fighting(a, b);

        let result = engine.execute_attack().unwrap();
        assert_eq!(result.movement.map(|m| m.to), Some(2));
        assert_eq!(result.damage, 0);
    }

    #[test]
    fn knockback_pushes_defender_after_strike() {
        let knockback = ability(AbilityKind::Knockback, Trigger::Always, 3).with_magnitude(2);
        let a = fighter("a", CombatantStats::new(10, 0, 0), 50)
            .with_position(2)
            .with_abilities([knockback])
            .unwrap();
        let b = fighter("b", CombatantStats::new(10, 0, 0), 50).with_position(3);
        let mut engine = fighting(a, b);

        let result = engine.execute_attack().unwrap();
        assert_eq!(result.damage, 10);
        assert_eq!(
            result.movement,
            Some(Movement {
                combatant_id: "b".into(),
                from: 3,
                to: 5
            })
        );
        assert_eq!(engine.state().opponent.as_ref().unwrap().position, Some(5));
    }

    #[test]
    fn double_attack_strikes_twice_and_ticks_once() {
        let rage = ActiveBuff::new("rage", "Rage", BuffKind::Buff, StatKind::Spd, 1.0, 2);
        let a = fighter("a", CombatantStats::new(20, 0, 0), 100)
            .with_buffs(vec![rage].into())
            .with_abilities([ability(AbilityKind::DoubleAttack, Trigger::Always, 5)])
            .unwrap();
        let b = fighter("b", CombatantStats::new(0, 0, 0), 100);
        let mut engine = fighting(a, b);

        let result = engine.execute_attack().unwrap();
        assert_eq!(result.damage, 40);
        assert_eq!(result.defender_hp, 60);
        assert_eq!(engine.state().turn, 1);

        let challenger = engine.state().challenger.as_ref().unwrap();
        assert_eq!(challenger.buffs.get("rage").unwrap().remaining_duration, 1);
        assert_eq!(engine.record().unwrap().turn(1).unwrap().strikes.len(), 2);
    }

    #[test]
    fn double_attack_skips_second_strike_on_dead_defender() {
        let a = fighter("a", CombatantStats::new(20, 0, 0), 100)
            .with_abilities([ability(AbilityKind::DoubleAttack, Trigger::Always, 5)])
            .unwrap();
        let b = fighter("b", CombatantStats::new(0, 0, 0), 15);
        let mut engine = fighting(a, b);

        let result = engine.execute_attack().unwrap();
        assert!(result.finished);
        assert_eq!(result.damage, 15);
        assert_eq!(engine.record().unwrap().turn(1).unwrap().strikes.len(), 1);
    }

    #[test]
    fn execute_bypasses_damage() {
        let execute = ability(AbilityKind::Execute, Trigger::DefenderHpBelow { percent: 50 }, 4);
        let a = fighter("a", CombatantStats::new(1, 0, 0), 100)
            .with_abilities([execute])
            .unwrap();
        let b = fighter("b", CombatantStats::new(0, 500, 0), 100).with_hp(40);
        let mut engine = fighting(a, b);

        let result = engine.execute_attack().unwrap();
        assert!(result.finished);
        assert_eq!(result.damage, 40);
        let turn = engine.record().unwrap().turn(1).unwrap().clone();
        assert_eq!(turn.action, TurnAction::Execute);
        assert!(turn.strikes.is_empty());
    }

    #[test]
    fn triggered_ability_waits_out_its_cooldown() {
        let a = fighter("a", CombatantStats::new(1, 0, 0), 1000)
            .with_abilities([ability(AbilityKind::DoubleAttack, Trigger::Always, 2)])
            .unwrap();
        let b = fighter("b", CombatantStats::new(1, 0, 0), 1000);
        let mut engine = fighting(a, b);

        let triggered_turns: Vec<u32> = (0..10)
            .filter_map(|_| engine.execute_attack())
            .filter(|r| r.skill.is_some())
            .map(|r| r.turn)
            .collect();
        assert_eq!(triggered_turns, [1, 5, 9]);
    }

    #[test]
    fn ability_buff_lands_on_target_and_expires() {
        let sunder = ActiveBuff::new("sunder", "Sunder", BuffKind::Debuff, StatKind::Def, -5.0, 1);
        let a = fighter("a", CombatantStats::new(30, 0, 0), 100)
            .with_abilities([ability(AbilityKind::DoubleAttack, Trigger::Always, 3).with_buff(sunder)])
            .unwrap();
        let b = fighter("b", CombatantStats::new(0, 10, 0), 100);
        let mut engine = fighting(a, b);

        let result = engine.execute_attack().unwrap();
        assert_eq!(result.damage, 50);
        assert_eq!(
            kinds(&engine),
            [
                LogKind::Skill,
                LogKind::Buff,
                LogKind::Attack,
                LogKind::Damage,
                LogKind::Attack,
                LogKind::Damage,
                LogKind::Buff,
            ]
        );
        let log = &engine.state().battle_log;
        assert!(matches!(
            &log[1].event,
            LogEvent::Buff { combatant_id, event: BuffEvent::Applied, .. } if combatant_id == "b"
        ));
        assert!(matches!(
            &log[6].event,
            LogEvent::Buff { event: BuffEvent::Expired, .. }
        ));
        assert!(engine.state().opponent.as_ref().unwrap().buffs.is_empty());

        let ids: Vec<u64> = log.iter().map(|e| e.id).collect();
        assert_eq!(ids, (1..=7).collect::<Vec<_>>());
    }

    #[test]
    fn lifesteal_heal_is_reported() {
        let a = fighter("a", CombatantStats::new(20, 0, 0).with_lifesteal(50.0), 100).with_hp(50);
        let b = fighter("b", CombatantStats::new(0, 0, 0), 100);
        let mut engine = fighting(a, b);

        let result = engine.execute_attack().unwrap();
        assert_eq!(result.lifesteal_heal, Some(10));
        assert_eq!(engine.state().challenger.as_ref().unwrap().current_hp, 60);
        let turn = engine.record().unwrap().turn(1).unwrap().clone();
        assert_eq!(turn.attacker_hp_before, 50);
        assert_eq!(turn.attacker_hp_after, 60);
    }

    #[test]
    fn retreat_steps_back_after_strike() {
        let retreat = ability(AbilityKind::Retreat, Trigger::Always, 3).with_magnitude(2);
        let a = fighter("a", CombatantStats::new(10, 0, 0), 50)
            .with_position(4)
            .with_abilities([retreat])
            .unwrap();
        let b = fighter("b", CombatantStats::new(10, 0, 0), 50).with_position(5);
        let mut engine = fighting(a, b);

        let result = engine.execute_attack().unwrap();
        assert_eq!(result.damage, 10);
        assert_eq!(
            result.movement,
            Some(Movement {
                combatant_id: "a".into(),
                from: 4,
                to: 2
            })
        );
        assert_eq!(engine.state().challenger.as_ref().unwrap().position, Some(2));
        assert_eq!(
            kinds(&engine),
            [LogKind::Skill, LogKind::Attack, LogKind::Damage, LogKind::Move]
        );
    }

    #[test]
    fn retreat_stops_at_the_arena_edge() {
        let retreat = ability(AbilityKind::Retreat, Trigger::Always, 3).with_magnitude(3);
        let a = fighter("a", CombatantStats::new(10, 0, 0), 50)
            .with_position(1)
            .with_abilities([retreat])
            .unwrap();
        let b = fighter("b", CombatantStats::new(10, 0, 0), 50).with_position(2);
        let mut engine = fighting(a, b);

        let result = engine.execute_attack().unwrap();
        assert_eq!(result.movement.map(|m| (m.from, m.to)), Some((1, 0)));
        assert_eq!(engine.state().challenger.as_ref().unwrap().position, Some(0));
    }

    #[test]
    fn retreat_is_skipped_on_a_killing_blow() {
        let retreat = ability(AbilityKind::Retreat, Trigger::Always, 3).with_magnitude(2);
        let a = fighter("a", CombatantStats::new(100, 0, 0), 50)
            .with_position(4)
            .with_abilities([retreat])
            .unwrap();
        let b = fighter("b", CombatantStats::new(10, 0, 0), 10).with_position(5);
        let mut engine = fighting(a, b);

        let result = engine.execute_attack().unwrap();
        assert!(result.finished);
        assert!(result.movement.is_none());
        assert_eq!(engine.state().challenger.as_ref().unwrap().position, Some(4));
        assert_eq!(
            kinds(&engine),
            [LogKind::Skill, LogKind::Attack, LogKind::Damage, LogKind::Victory]
        );
    }

    #[test]
    fn attacker_hp_threshold_is_strict() {
        let first_turn = |hp: u32| {
            let rally = ability(
                AbilityKind::DoubleAttack,
                Trigger::AttackerHpBelow { percent: 50 },
                0,
            );
            let a = fighter("a", CombatantStats::new(10, 0, 0), 100)
                .with_hp(hp)
                .with_abilities([rally])
                .unwrap();
            let b = fighter("b", CombatantStats::new(0, 0, 0), 100);
            fighting(a, b).execute_attack().unwrap()
        };

        let below = first_turn(49);
        assert_eq!(below.damage, 20);
        assert_eq!(below.skill.map(|s| s.kind), Some(AbilityKind::DoubleAttack));

        let at = first_turn(50);
        assert_eq!(at.damage, 10);
        assert!(at.skill.is_none());
    }
}
