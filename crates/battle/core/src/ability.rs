//! Equipped special abilities and their resolution.
//!
//! An ability is evaluated against a [`ResolveContext`] describing the turn
//! (movement or strike, HP of both sides, arena positions). Resolution is a
//! pure decision: it reports whether the ability triggers, the side effect to
//! apply and the cooldown the ability ends up with. The engine applies the
//! side effect.
//!
//! # Cooldowns
//!
//! - `current_cooldown > 0` never triggers
//! - a triggered ability resets to its definition's `cooldown`
//! - every other equipped ability (both combatants) ticks down by one per
//!   resolved turn, floored at 0
//!
//! # Evaluation windows
//!
//! `double_move` and `leap_strike` are only evaluated on turns that start out
//! of range. `knockback`, `retreat`, `double_attack` and `execute` are only
//! evaluated on strike turns. Positional kinds never trigger outside arena
//! mode.

use crate::arena::ArenaView;
use crate::buff::ActiveBuff;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AbilityKind {
    Knockback,
    Retreat,
    DoubleMove,
    DoubleAttack,
    Execute,
    LeapStrike,
}

impl AbilityKind {
    /// Whether the side effect moves a combatant on the arena.
    pub const fn is_positional(&self) -> bool {
        matches!(
            self,
            Self::Knockback | Self::Retreat | Self::DoubleMove | Self::LeapStrike
        )
    }

    const fn window(&self) -> ResolvePhase {
        match self {
            Self::DoubleMove | Self::LeapStrike => ResolvePhase::Movement,
            Self::Knockback | Self::Retreat | Self::DoubleAttack | Self::Execute => {
                ResolvePhase::Strike
            }
        }
    }
}

/// Condition that must hold, on top of cooldown readiness, for an ability to
/// trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trigger {
    /// Triggers whenever the cooldown is ready.
    Always,
    /// Triggers when a `0..100` roll is below `percent`.
    Chance { percent: u32 },
    /// Triggers when the defender's HP is strictly below `percent` % of max.
    DefenderHpBelow { percent: u32 },
    /// Triggers when the attacker's HP is strictly below `percent` % of max.
    AttackerHpBelow { percent: u32 },
}

impl Trigger {
    fn is_met(&self, ctx: &ResolveContext, roll_percent: u32) -> bool {
        match *self {
            Trigger::Always => true,
            Trigger::Chance { percent } => roll_percent < percent,
            Trigger::DefenderHpBelow { percent } => {
                below_percent(ctx.defender_hp, ctx.defender_max_hp, percent)
            }
            Trigger::AttackerHpBelow { percent } => {
                below_percent(ctx.attacker_hp, ctx.attacker_max_hp, percent)
            }
        }
    }
}

fn below_percent(hp: u32, max_hp: u32, percent: u32) -> bool {
    u64::from(hp) * 100 < u64::from(max_hp) * u64::from(percent)
}

/// Static description of an ability.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityDefinition {
    pub id: String,
    pub name: String,
    pub kind: AbilityKind,
    pub trigger: Trigger,
    /// Cooldown (in turns) applied when the ability triggers.
    pub cooldown: u32,
    /// Cells moved by positional kinds. Ignored by the others.
    pub magnitude: u32,
    /// Buff applied when the ability triggers: `buff` kinds land on the
    /// attacker, `debuff` kinds on the defender.
    pub applies: Option<ActiveBuff>,
}

impl AbilityDefinition {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: AbilityKind,
        trigger: Trigger,
        cooldown: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            trigger,
            cooldown,
            magnitude: 1,
            applies: None,
        }
    }

    #[must_use]
    pub fn with_magnitude(mut self, magnitude: u32) -> Self {
        self.magnitude = magnitude;
        self
    }

    #[must_use]
    pub fn with_buff(mut self, buff: ActiveBuff) -> Self {
        self.applies = Some(buff);
        self
    }
}

/// An equipped ability with its live cooldown.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityState {
    pub definition: AbilityDefinition,
    pub current_cooldown: u32,
}

impl AbilityState {
    /// Equips an ability ready to trigger.
    pub fn ready(definition: AbilityDefinition) -> Self {
        Self {
            definition,
            current_cooldown: 0,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.current_cooldown == 0
    }

    /// Per-turn cooldown decrement, floored at 0.
    pub fn tick(&mut self) {
        self.current_cooldown = self.current_cooldown.saturating_sub(1);
    }
}

/// Which part of the turn abilities are evaluated for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolvePhase {
    /// The turn started out of range.
    Movement,
    /// A strike is about to resolve.
    Strike,
}

/// Snapshot of the turn an ability is evaluated against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolveContext {
    pub phase: ResolvePhase,
    pub attacker_hp: u32,
    pub attacker_max_hp: u32,
    pub defender_hp: u32,
    pub defender_max_hp: u32,
    pub arena: Option<ArenaView>,
    /// Cells covered by a regular movement step.
    pub move_step: u32,
}

/// Concrete effect of a triggered ability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SideEffect {
    /// Defender pushed away after the strike.
    Knockback { from: u32, to: u32 },
    /// Attacker steps away after the strike.
    Retreat { from: u32, to: u32 },
    /// Attacker covers twice its regular step.
    DoubleMove { from: u32, to: u32 },
    /// Attacker jumps next to the defender and strikes this turn.
    LeapStrike { from: u32, to: u32 },
    /// A second strike within the same turn.
    DoubleAttack,
    /// Defender HP set to 0, bypassing damage calculation.
    Execute { hp_removed: u32 },
}

/// Outcome of evaluating one ability.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub triggered: bool,
    pub side_effect: Option<SideEffect>,
    pub cooldown_after: u32,
}

impl Resolution {
    fn idle(state: &AbilityState) -> Self {
        Self {
            triggered: false,
            side_effect: None,
            cooldown_after: state.current_cooldown,
        }
    }
}

/// Decides whether `state` triggers in `ctx`.
///
/// `roll_percent` is only consulted by [`Trigger::Chance`].
pub fn resolve(state: &AbilityState, ctx: &ResolveContext, roll_percent: u32) -> Resolution {
    let definition = &state.definition;

    if !state.is_ready() || definition.kind.window() != ctx.phase {
        return Resolution::idle(state);
    }
    if definition.kind.is_positional() && ctx.arena.is_none() {
        return Resolution::idle(state);
    }
    if !definition.trigger.is_met(ctx, roll_percent) {
        return Resolution::idle(state);
    }

    let Some(side_effect) = side_effect(definition, ctx) else {
        return Resolution::idle(state);
    };

    Resolution {
        triggered: true,
        side_effect: Some(side_effect),
        cooldown_after: definition.cooldown,
    }
}

fn side_effect(definition: &AbilityDefinition, ctx: &ResolveContext) -> Option<SideEffect> {
    let steps = definition.magnitude.max(1);
    match definition.kind {
        AbilityKind::Knockback => ctx.arena.map(|view| SideEffect::Knockback {
            from: view.defender,
            to: view.knockback_defender(steps),
        }),
        AbilityKind::Retreat => ctx.arena.map(|view| SideEffect::Retreat {
            from: view.attacker,
            to: view.retreat_attacker(steps),
        }),
        AbilityKind::DoubleMove => ctx.arena.map(|view| SideEffect::DoubleMove {
            from: view.attacker,
            to: view.advance_attacker(ctx.move_step.saturating_mul(2)),
        }),
        AbilityKind::LeapStrike => ctx.arena.map(|view| SideEffect::LeapStrike {
            from: view.attacker,
            to: view.leap_target(),
        }),
        AbilityKind::DoubleAttack => Some(SideEffect::DoubleAttack),
        AbilityKind::Execute => Some(SideEffect::Execute {
            hp_removed: ctx.defender_hp,
        }),
    }
}

/// Evaluates abilities in equipped order and returns the first that triggers.
///
/// `roll_for_slot` supplies the chance roll of a given slot index.
pub fn select<'a>(
    abilities: impl IntoIterator<Item = &'a AbilityState>,
    ctx: &ResolveContext,
    mut roll_for_slot: impl FnMut(usize) -> u32,
) -> Option<(usize, Resolution)> {
    abilities
        .into_iter()
        .enumerate()
        .map(|(slot, state)| (slot, resolve(state, ctx, roll_for_slot(slot))))
        .find(|(_, resolution)| resolution.triggered)
}

/// Public description of a triggered ability, carried by log entries, attack
/// results and turn records.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillDescriptor {
    pub ability_id: String,
    pub name: String,
    pub kind: AbilityKind,
    pub effect: SideEffect,
}

impl SkillDescriptor {
    pub fn new(definition: &AbilityDefinition, effect: SideEffect) -> Self {
        Self {
            ability_id: definition.id.clone(),
            name: definition.name.clone(),
            kind: definition.kind,
            effect,
        }
    }
}
