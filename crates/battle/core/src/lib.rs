//! Deterministic two-combatant battle engine.
//!
//! `battle-core` holds the combat rules (damage, buffs, abilities, arena
//! movement), the battle state machine and the JSON codec. It is pure and
//! synchronous: randomness comes from a seeded [`env::RngOracle`] and log
//! timestamps from an injected [`env::Clock`], so any battle can be replayed
//! from its seed and starting combatants. All state mutation flows through
//! [`engine::BattleEngine`].
pub mod ability;
pub mod arena;
pub mod buff;
pub mod codec;
pub mod combat;
pub mod combatant;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod record;
pub mod state;
pub mod stats;

pub use ability::{
    AbilityDefinition, AbilityKind, AbilityState, Resolution, ResolveContext, ResolvePhase,
    SideEffect, SkillDescriptor, Trigger,
};
pub use arena::{ArenaError, ArenaView};
pub use buff::{ActiveBuff, BuffApplication, BuffKind, Buffs, StackRule};
pub use codec::{CodecError, deserialize, serialize};
pub use combat::{DamageResult, calculate_damage};
pub use combatant::{Combatant, CombatantError};
pub use config::BattleConfig;
pub use engine::{AttackResult, BattleEngine, EngineError, Simulation, StopReason, simulate};
pub use env::{Clock, LogicalClock, PcgRng, RngOracle};
pub use error::{BattleError, ErrorSeverity};
pub use record::{BattleRecord, LifestealRecord, Movement, TurnAction, TurnRecord};
pub use state::{
    BattleLogEntry, BattleResult, BattleState, BuffEvent, LogEvent, LogKind, Phase, Side,
};
pub use stats::{CombatantStats, EffectiveStats, EquipmentBonuses, StatKind};
