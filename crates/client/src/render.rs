//! Text and JSON output of a battle.

use serde::Serialize;

use battle_core::{BattleLogEntry, BattleResult, BattleState, Side, StopReason};
use battle_runtime::TurnEvent;

/// Ids and display names of both sides, captured before the session moves.
#[derive(Clone, Debug)]
pub struct Names {
    challenger: (String, String),
    opponent: (String, String),
}

impl Names {
    pub fn of(state: &BattleState) -> Self {
        let pair = |side: Side| {
            state.combatant(side).map_or_else(
                || (String::new(), side.to_string()),
                |c| (c.id.clone(), c.name.clone()),
            )
        };
        Self {
            challenger: pair(Side::Challenger),
            opponent: pair(Side::Opponent),
        }
    }

    fn get(&self, side: Side) -> &str {
        match side {
            Side::Challenger => &self.challenger.1,
            Side::Opponent => &self.opponent.1,
        }
    }

    fn by_id<'a>(&'a self, id: &'a str) -> &'a str {
        if id == self.challenger.0 {
            &self.challenger.1
        } else if id == self.opponent.0 {
            &self.opponent.1
        } else {
            id
        }
    }
}

pub fn log_line(entry: &BattleLogEntry) -> String {
    format!("#{:<4} [{}] {}", entry.id, entry.kind(), entry.message)
}

pub fn turn_line(event: &TurnEvent, names: &Names) -> String {
    let result = &event.result;
    let attacker = names.get(result.attacker);
    let defender = names.get(result.attacker.other());

    let mut line = format!("turn {:>3}: ", result.turn);
    if let Some(skill) = &result.skill {
        line.push_str(&format!("{attacker} uses {}. ", skill.name));
    }
    match (&result.movement, result.damage) {
        (Some(movement), 0) => line.push_str(&format!(
            "{} moves {} -> {}",
            names.by_id(&movement.combatant_id),
            movement.from,
            movement.to
        )),
        _ => {
            line.push_str(&format!("{attacker} hits {defender} for {}", result.damage));
            if result.is_critical {
                line.push_str(" (critical)");
            }
        }
    }
    if let Some(healed) = result.lifesteal_heal {
        line.push_str(&format!(", heals {healed}"));
    }
    line.push_str(&format!(
        " | {} {} HP, {} {} HP",
        names.challenger.1, event.challenger_hp, names.opponent.1, event.opponent_hp
    ));
    line
}

pub fn summary(result: Option<&BattleResult>, stop: StopReason, turn: u32) -> String {
    match (result, stop) {
        (Some(result), _) => format!(
            "{} wins after {} turns",
            result.winner_name, result.total_turns
        ),
        (None, StopReason::TurnCap) => format!("no winner after {turn} turns (turn cap)"),
        (None, _) => format!("battle stopped at turn {turn}"),
    }
}

/// JSON document printed with `--format json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report<'a> {
    pub stop: Option<StopReason>,
    pub result: Option<&'a BattleResult>,
    pub turn: u32,
    pub record_id: Option<&'a str>,
    pub digest: Option<String>,
    pub battle_log: &'a [BattleLogEntry],
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::{AttackResult, Combatant, CombatantStats, Movement};

    fn names() -> Names {
        let state = BattleState {
            challenger: Some(Combatant::new("k", "Knight", CombatantStats::new(1, 1, 1), 10).unwrap()),
            opponent: Some(Combatant::new("a", "Archer", CombatantStats::new(1, 1, 1), 10).unwrap()),
            ..BattleState::new()
        };
        Names::of(&state)
    }

    fn event(damage: u32, movement: Option<Movement>) -> TurnEvent {
        TurnEvent {
            result: AttackResult {
                attacker: Side::Opponent,
                turn: 4,
                damage,
                is_critical: damage > 20,
                lifesteal_heal: None,
                skill: None,
                movement,
                defender_hp: 10,
                finished: false,
            },
            challenger_hp: 10,
            opponent_hp: 7,
        }
    }

    #[test]
    fn strike_line_names_both_sides() {
        assert_eq!(
            turn_line(&event(25, None), &names()),
            "turn   4: Archer hits Knight for 25 (critical) | Knight 10 HP, Archer 7 HP"
        );
    }

    #[test]
    fn movement_line_uses_the_mover_name() {
        let movement = Movement {
            combatant_id: "a".into(),
            from: 6,
            to: 5,
        };
        assert!(turn_line(&event(0, Some(movement)), &names()).starts_with("turn   4: Archer moves 6 -> 5"));
    }

    #[test]
    fn summary_without_winner_mentions_the_cap() {
        assert_eq!(
            summary(None, StopReason::TurnCap, 50),
            "no winner after 50 turns (turn cap)"
        );
    }
}
