//! Battle state machine.
//!
//! The [`BattleEngine`] is the only writer of its [`BattleState`]. Phases move
//! linearly through `setup → ready → fighting → finished`; [`BattleEngine::reset`]
//! discards the state instead of transitioning it.
//!
//! Illegal calls are silent: [`BattleEngine::execute_attack`] outside `fighting`
//! returns `None` and [`BattleEngine::start_battle`] outside `ready` returns
//! `false`. Only bad input (combatants, arena positions) is an error.

mod turn;

use crate::ability::SkillDescriptor;
use crate::arena::{self, ArenaError};
use crate::combatant::Combatant;
use crate::config::BattleConfig;
use crate::env::{Clock, LogicalClock, PcgRng, RngOracle};
use crate::error::{BattleError, ErrorSeverity};
use crate::record::{BattleRecord, Movement};
use crate::state::{BattleState, Phase, Side};

/// Errors surfaced while setting up a battle.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("combatants can only be selected during setup (phase: {phase})")]
    SelectionClosed { phase: Phase },

    #[error("combatant {id} is already defeated")]
    DefeatedCombatant { id: String },

    #[error("both combatants use id {id}")]
    DuplicateId { id: String },

    #[error("no {side} selected")]
    MissingCombatant { side: Side },

    #[error("combatant {id} has {current_hp} HP, above its max of {max_hp}")]
    HpAboveMax {
        id: String,
        current_hp: u32,
        max_hp: u32,
    },

    #[error("finished battle has no result")]
    MissingResult,

    #[error("invalid arena: {0}")]
    InvalidArena(#[from] ArenaError),
}

impl BattleError for EngineError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::SelectionClosed { .. } => ErrorSeverity::Recoverable,
            Self::DefeatedCombatant { .. }
            | Self::DuplicateId { .. }
            | Self::MissingCombatant { .. }
            | Self::HpAboveMax { .. }
            | Self::MissingResult
            | Self::InvalidArena(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::SelectionClosed { .. } => "ENGINE_SELECTION_CLOSED",
            Self::DefeatedCombatant { .. } => "ENGINE_DEFEATED_COMBATANT",
            Self::DuplicateId { .. } => "ENGINE_DUPLICATE_ID",
            Self::MissingCombatant { .. } => "ENGINE_MISSING_COMBATANT",
            Self::HpAboveMax { .. } => "ENGINE_HP_ABOVE_MAX",
            Self::MissingResult => "ENGINE_MISSING_RESULT",
            Self::InvalidArena(_) => "ENGINE_INVALID_ARENA",
        }
    }
}

/// Outcome of one resolved turn, returned by [`BattleEngine::execute_attack`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackResult {
    pub attacker: Side,
    pub turn: u32,
    /// Total HP removed from the defender this turn. 0 on a movement turn.
    pub damage: u32,
    /// Whether any strike of the turn was critical.
    pub is_critical: bool,
    /// HP restored to the attacker, when the attacker has lifesteal.
    pub lifesteal_heal: Option<u32>,
    pub skill: Option<SkillDescriptor>,
    pub movement: Option<Movement>,
    pub defender_hp: u32,
    pub finished: bool,
}

/// Why a full simulation stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StopReason {
    /// A combatant was defeated.
    Victory,
    /// `max_turns` turns resolved without a winner.
    TurnCap,
    /// The engine was not in the `fighting` phase.
    Idle,
}

/// Result of [`simulate`].
#[derive(Clone, Debug, PartialEq)]
pub struct Simulation {
    pub record: BattleRecord,
    pub state: BattleState,
    pub stop: StopReason,
}

pub struct BattleEngine {
    state: BattleState,
    config: BattleConfig,
    record: Option<BattleRecord>,
    rng: Box<dyn RngOracle>,
    clock: Box<dyn Clock>,
}

impl BattleEngine {
    /// Creates an engine in the `setup` phase.
    pub fn new(config: BattleConfig) -> Self {
        Self {
            state: BattleState::new(),
            config,
            record: None,
            rng: Box::new(PcgRng),
            clock: Box::new(LogicalClock::new()),
        }
    }

    #[must_use]
    pub fn with_rng(mut self, rng: impl RngOracle + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Resumes a previously serialized state.
    ///
    /// In `ready` and `fighting` the record restarts empty, with the state's
    /// combatants as snapshots and the state's turn and attacker as its
    /// starting point. A finished state has nothing left to record.
    /// Log timestamps continue after the newest entry.
    pub fn from_state(state: BattleState, config: BattleConfig) -> Result<Self, EngineError> {
        validate_state(&state, &config)?;

        let last_timestamp = state.last_entry().map_or(0, |entry| entry.timestamp);
        let record = match (&state.challenger, &state.opponent, state.phase) {
            (Some(challenger), Some(opponent), Phase::Ready | Phase::Fighting) => {
                Some(BattleRecord::resumed(
                    challenger.clone(),
                    opponent.clone(),
                    &config,
                    state.turn,
                    state.current_attacker,
                ))
            }
            _ => None,
        };

        Ok(Self {
            state,
            config,
            record,
            rng: Box::new(PcgRng),
            clock: Box::new(LogicalClock::starting_after(last_timestamp)),
        })
    }

    /// Sets both combatants at once and moves to `ready`.
    ///
    /// Allowed during `setup` and `ready`.
    pub fn initialize(
        &mut self,
        challenger: Combatant,
        opponent: Combatant,
    ) -> Result<(), EngineError> {
        if !matches!(self.state.phase, Phase::Setup | Phase::Ready) {
            return Err(EngineError::SelectionClosed {
                phase: self.state.phase,
            });
        }
        self.validate_pair(&challenger, &opponent)?;

        self.state.challenger = Some(challenger);
        self.state.opponent = Some(opponent);
        self.enter_ready();
        Ok(())
    }

    pub fn select_challenger(&mut self, challenger: Combatant) -> Result<(), EngineError> {
        self.select(Side::Challenger, challenger)
    }

    pub fn select_opponent(&mut self, opponent: Combatant) -> Result<(), EngineError> {
        self.select(Side::Opponent, opponent)
    }

    fn select(&mut self, side: Side, combatant: Combatant) -> Result<(), EngineError> {
        if self.state.phase != Phase::Setup {
            return Err(EngineError::SelectionClosed {
                phase: self.state.phase,
            });
        }
        if combatant.is_defeated() {
            return Err(EngineError::DefeatedCombatant { id: combatant.id });
        }

        match side {
            Side::Challenger => self.state.challenger = Some(combatant),
            Side::Opponent => self.state.opponent = Some(combatant),
        }

        if let (Some(challenger), Some(opponent)) = (&self.state.challenger, &self.state.opponent)
        {
            if let Err(err) = self.validate_pair(challenger, opponent) {
                // Keep the earlier pick, drop the one that conflicts.
                match side {
                    Side::Challenger => self.state.challenger = None,
                    Side::Opponent => self.state.opponent = None,
                }
                return Err(err);
            }
            self.enter_ready();
        }
        Ok(())
    }

    fn validate_pair(&self, challenger: &Combatant, opponent: &Combatant) -> Result<(), EngineError> {
        for combatant in [challenger, opponent] {
            if combatant.is_defeated() {
                return Err(EngineError::DefeatedCombatant {
                    id: combatant.id.clone(),
                });
            }
        }
        if challenger.id == opponent.id {
            return Err(EngineError::DuplicateId {
                id: challenger.id.clone(),
            });
        }
        arena::validate_positions(challenger.position, opponent.position, self.config.arena_size)?;
        Ok(())
    }

    fn enter_ready(&mut self) {
        self.state.phase = Phase::Ready;
        self.state.turn = 0;
        self.state.current_attacker = Side::Challenger;
        self.record = match (&self.state.challenger, &self.state.opponent) {
            (Some(challenger), Some(opponent)) => Some(BattleRecord::new(
                challenger.clone(),
                opponent.clone(),
                &self.config,
            )),
            _ => None,
        };
        tracing::debug!(arena = self.state.is_arena_mode(), "battle ready");
    }

    /// `ready → fighting`. Returns `false` in any other phase.
    pub fn start_battle(&mut self) -> bool {
        if self.state.phase != Phase::Ready {
            return false;
        }
        self.state.phase = Phase::Fighting;
        tracing::debug!(seed = self.config.seed, "battle started");
        true
    }

    /// Presentation flag only; resolution is unaffected.
    pub fn set_auto_battle(&mut self, enabled: bool) {
        self.state.is_auto_battle = enabled;
    }

    /// Resolves one turn for the current attacker.
    ///
    /// Returns `None`, without touching the state, outside `fighting`.
    pub fn execute_attack(&mut self) -> Option<AttackResult> {
        if self.state.phase != Phase::Fighting {
            return None;
        }
        self.resolve_turn()
    }

    /// Resolves turns until a combatant falls or `max_turns` is reached.
    pub fn run_to_completion(&mut self) -> StopReason {
        loop {
            if let Some(stop) = self.stop_reason() {
                return stop;
            }
            self.execute_attack();
        }
    }

    /// Why no further turn may resolve, or `None` while the battle can go on.
    ///
    /// Logs a warning when the turn cap is the reason.
    pub fn stop_reason(&self) -> Option<StopReason> {
        match self.state.phase {
            Phase::Finished => Some(StopReason::Victory),
            Phase::Setup | Phase::Ready => Some(StopReason::Idle),
            Phase::Fighting if self.state.turn >= self.config.max_turns => {
                tracing::warn!(
                    max_turns = self.config.max_turns,
                    "turn cap reached without a winner"
                );
                Some(StopReason::TurnCap)
            }
            Phase::Fighting => None,
        }
    }

    /// Discards the battle and returns to a fresh `setup` state.
    pub fn reset(&mut self) {
        self.state = BattleState::new();
        self.record = None;
        tracing::debug!("battle reset");
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn record(&self) -> Option<&BattleRecord> {
        self.record.as_ref()
    }

    pub fn take_record(&mut self) -> Option<BattleRecord> {
        self.record.take()
    }

    pub fn into_state(self) -> BattleState {
        self.state
    }
}

/// Checks that a deserialized state is one the engine could have produced.
fn validate_state(state: &BattleState, config: &BattleConfig) -> Result<(), EngineError> {
    if state.phase != Phase::Setup {
        for side in [Side::Challenger, Side::Opponent] {
            if state.combatant(side).is_none() {
                return Err(EngineError::MissingCombatant { side });
            }
        }
    }
    for combatant in [&state.challenger, &state.opponent].into_iter().flatten() {
        if combatant.current_hp > combatant.max_hp {
            return Err(EngineError::HpAboveMax {
                id: combatant.id.clone(),
                current_hp: combatant.current_hp,
                max_hp: combatant.max_hp,
            });
        }
        // Only a finished battle may hold a defeated combatant.
        if state.phase != Phase::Finished && combatant.is_defeated() {
            return Err(EngineError::DefeatedCombatant {
                id: combatant.id.clone(),
            });
        }
    }
    if state.phase == Phase::Finished && state.result.is_none() {
        return Err(EngineError::MissingResult);
    }
    if let (Some(challenger), Some(opponent)) = (&state.challenger, &state.opponent) {
        arena::validate_positions(challenger.position, opponent.position, config.arena_size)?;
    }
    Ok(())
}

/// Plays a whole battle without pacing, bounded by `config.max_turns`.
pub fn simulate(
    challenger: Combatant,
    opponent: Combatant,
    config: &BattleConfig,
) -> Result<Simulation, EngineError> {
    let mut engine = BattleEngine::new(config.clone());
    engine.initialize(challenger, opponent)?;
    engine.start_battle();
    let stop = engine.run_to_completion();

    let record = engine
        .take_record()
        .ok_or(EngineError::MissingCombatant {
            side: Side::Challenger,
        })?;
    Ok(Simulation {
        record,
        state: engine.into_state(),
        stop,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::LogKind;
    use crate::stats::CombatantStats;

    fn fighter(id: &str, stats: CombatantStats, hp: u32) -> Combatant {
        Combatant::new(id, id.to_uppercase(), stats, hp).unwrap()
    }

    fn fighting(challenger: Combatant, opponent: Combatant) -> BattleEngine {
        let mut engine = BattleEngine::new(BattleConfig::new().with_seed(42));
        engine.initialize(challenger, opponent).unwrap();
        assert!(engine.start_battle());
        engine
    }

    fn state_with(challenger: Combatant, opponent: Combatant) -> BattleState {
        BattleState {
            phase: Phase::Fighting,
            challenger: Some(challenger),
            opponent: Some(opponent),
            ..BattleState::new()
        }
    }

    #[test]
    fn illegal_transitions_are_silent() {
        let mut engine = BattleEngine::new(BattleConfig::new());
        assert!(!engine.start_battle());
        assert!(engine.execute_attack().is_none());
        assert!(engine.state().battle_log.is_empty());

        engine
            .initialize(
                fighter("a", CombatantStats::new(5, 0, 0), 10),
                fighter("b", CombatantStats::new(5, 0, 0), 10),
            )
            .unwrap();
        assert!(engine.execute_attack().is_none());
        assert!(engine.start_battle());
        assert!(!engine.start_battle());
    }

    #[test]
    fn selecting_both_sides_makes_engine_ready() {
        let mut engine = BattleEngine::new(BattleConfig::new());
        engine
            .select_opponent(fighter("b", CombatantStats::new(1, 1, 1), 10))
            .unwrap();
        assert_eq!(engine.state().phase, Phase::Setup);
        assert!(engine.record().is_none());

        engine
            .select_challenger(fighter("a", CombatantStats::new(1, 1, 1), 10))
            .unwrap();
        assert_eq!(engine.state().phase, Phase::Ready);
        assert_eq!(engine.record().unwrap().challenger.id, "a");

        let err = engine
            .select_challenger(fighter("c", CombatantStats::new(1, 1, 1), 10))
            .unwrap_err();
        assert_eq!(err, EngineError::SelectionClosed { phase: Phase::Ready });
        assert!(err.severity().is_recoverable());
    }

    #[test]
    fn rejects_invalid_pairs() {
        let mut engine = BattleEngine::new(BattleConfig::new());
        let fresh = |id: &str| fighter(id, CombatantStats::new(1, 1, 1), 10);

        let err = engine
            .initialize(fresh("a"), fresh("b").with_hp(0))
            .unwrap_err();
        assert_eq!(err, EngineError::DefeatedCombatant { id: "b".into() });

        let err = engine.initialize(fresh("a"), fresh("a")).unwrap_err();
        assert_eq!(err.error_code(), "ENGINE_DUPLICATE_ID");

        let err = engine
            .initialize(fresh("a").with_position(3), fresh("b").with_position(3))
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidArena(ArenaError::SameCell { position: 3 })
        );

        let err = engine
            .initialize(fresh("a").with_position(0), fresh("b"))
            .unwrap_err();
        assert_eq!(err, EngineError::InvalidArena(ArenaError::MissingPosition));
        assert_eq!(engine.state().phase, Phase::Setup);

        engine
            .select_challenger(fresh("a").with_position(0))
            .unwrap();
        assert!(engine
            .select_opponent(fresh("b").with_position(9))
            .is_err());
        assert!(engine.state().opponent.is_none());
        assert!(engine.state().challenger.is_some());
    }

    #[test]
    fn stalemate_stops_at_turn_cap() {
        let stats = CombatantStats::new(10, 0, 0).with_lifesteal(100.0);
        let config = BattleConfig::new().with_max_turns(50);
        let simulation = simulate(fighter("a", stats, 1000), fighter("b", stats, 1000), &config).unwrap();

        assert_eq!(simulation.stop, StopReason::TurnCap);
        assert_eq!(simulation.state.turn, 50);
        assert_eq!(simulation.state.phase, Phase::Fighting);
        assert_eq!(simulation.record.len(), 50);
        assert!(simulation.record.winner_id.is_none());
    }

    #[test]
    fn simulate_runs_to_victory() {
        let a = fighter("a", CombatantStats::new(25, 5, 0).with_crit(0.3, 2.0), 120);
        let b = fighter("b", CombatantStats::new(20, 8, 0).with_crit(0.2, 1.5), 110);
        let config = BattleConfig::new().with_seed(7);
        let simulation = simulate(a, b, &config).unwrap();

        assert_eq!(simulation.stop, StopReason::Victory);
        let result = simulation.state.result.as_ref().unwrap();
        assert_eq!(result.total_turns as usize, simulation.record.len());
        assert_eq!(
            simulation.state.last_entry().unwrap().kind(),
            LogKind::Victory
        );

        let replayed = simulation.record.replay().unwrap();
        assert_eq!(replayed, simulation.record);
        assert_eq!(
            replayed.digest().unwrap(),
            simulation.record.digest().unwrap()
        );
    }

    #[test]
    fn resumed_engine_continues_identically() {
        let a = fighter("a", CombatantStats::new(18, 4, 0).with_crit(0.4, 1.8), 150);
        let b = fighter("b", CombatantStats::new(15, 6, 0).with_crit(0.5, 1.5), 150);
        let config = BattleConfig::new().with_seed(99);

        let mut original = BattleEngine::new(config.clone());
        original.initialize(a, b).unwrap();
        original.start_battle();
        for _ in 0..3 {
            original.execute_attack();
        }

        let mut resumed = BattleEngine::from_state(original.state().clone(), config).unwrap();
        assert_eq!(original.run_to_completion(), StopReason::Victory);
        assert_eq!(resumed.run_to_completion(), StopReason::Victory);
        assert_eq!(resumed.state(), original.state());
    }

    #[test]
    fn from_state_requires_combatants_after_setup() {
        let mut state = BattleState::new();
        state.phase = Phase::Fighting;
        let err = BattleEngine::from_state(state, BattleConfig::new())
            .err()
            .unwrap();
        assert_eq!(
            err,
            EngineError::MissingCombatant {
                side: Side::Challenger
            }
        );
    }

    #[test]
    fn reset_returns_to_setup() {
        let mut engine = fighting(
            fighter("a", CombatantStats::new(5, 0, 0), 10),
            fighter("b", CombatantStats::new(5, 0, 0), 10),
        );
        engine.set_auto_battle(true);
        engine.execute_attack();

        engine.reset();
        assert_eq!(engine.state(), &BattleState::new());
        assert!(engine.record().is_none());
        assert_eq!(engine.run_to_completion(), StopReason::Idle);
    }

    #[test]
    fn resumed_record_replays_to_the_same_digest() {
        let a = fighter("a", CombatantStats::new(18, 4, 0).with_crit(0.4, 1.8), 150);
        let b = fighter("b", CombatantStats::new(15, 6, 0).with_crit(0.5, 1.5), 150);
        let config = BattleConfig::new().with_seed(99);

        let mut original = BattleEngine::new(config.clone());
        original.initialize(a, b).unwrap();
        original.start_battle();
        for _ in 0..3 {
            original.execute_attack();
        }

        let mut resumed = BattleEngine::from_state(original.state().clone(), config).unwrap();
        assert_eq!(resumed.run_to_completion(), StopReason::Victory);
        let record = resumed.record().unwrap();
        assert_eq!(record.start_turn, 3);
        assert_eq!(record.first_attacker, Side::Opponent);
        assert_eq!(record.turns()[0].turn, 4);
        assert_eq!(record.turns()[0].attacker, Side::Opponent);
        assert_ne!(record.id, original.record().unwrap().id);

        let replayed = record.replay().unwrap();
        assert_eq!(&replayed, record);
        assert_eq!(replayed.digest().unwrap(), record.digest().unwrap());

        original.run_to_completion();
        assert_eq!(record.turns(), &original.record().unwrap().turns()[3..]);
    }

    #[test]
    fn finished_state_resumes_without_record() {
        let mut engine = fighting(
            fighter("a", CombatantStats::new(100, 0, 0), 10),
            fighter("b", CombatantStats::new(0, 0, 0), 10),
        );
        assert!(engine.execute_attack().unwrap().finished);

        let resumed =
            BattleEngine::from_state(engine.state().clone(), BattleConfig::new().with_seed(42))
                .unwrap();
        assert!(resumed.record().is_none());
        assert_eq!(resumed.stop_reason(), Some(StopReason::Victory));
    }

    #[test]
    fn from_state_rejects_defeated_combatant_before_finish() {
        for phase in [Phase::Ready, Phase::Fighting] {
            let state = BattleState {
                phase,
                ..state_with(
                    fighter("a", CombatantStats::new(5, 0, 0), 10).with_hp(0),
                    fighter("b", CombatantStats::new(5, 0, 0), 10),
                )
            };
            let err = BattleEngine::from_state(state, BattleConfig::new())
                .err()
                .unwrap();
            assert_eq!(err, EngineError::DefeatedCombatant { id: "a".into() });
        }
    }

    #[test]
    fn from_state_rejects_hp_above_max() {
        let mut opponent = fighter("b", CombatantStats::new(5, 0, 0), 10);
        opponent.current_hp = 11;
        let state = state_with(fighter("a", CombatantStats::new(5, 0, 0), 10), opponent);

        let err = BattleEngine::from_state(state, BattleConfig::new())
            .err()
            .unwrap();
        assert_eq!(
            err,
            EngineError::HpAboveMax {
                id: "b".into(),
                current_hp: 11,
                max_hp: 10
            }
        );
        assert_eq!(err.error_code(), "ENGINE_HP_ABOVE_MAX");
    }

    #[test]
    fn from_state_rejects_finished_without_result() {
        let state = BattleState {
            phase: Phase::Finished,
            turn: 1,
            ..state_with(
                fighter("a", CombatantStats::new(5, 0, 0), 10),
                fighter("b", CombatantStats::new(5, 0, 0), 10).with_hp(0),
            )
        };
        let err = BattleEngine::from_state(state, BattleConfig::new())
            .err()
            .unwrap();
        assert_eq!(err, EngineError::MissingResult);
    }
}
