//! A battle engine wired to the event bus and the persistence worker.

use std::fs;
use std::path::Path;

use battle_core::{
    AttackResult, BattleConfig, BattleEngine, BattleRecord, BattleState, Combatant, Phase, Side,
    StopReason, codec,
};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::events::{Event, EventBus, LifecycleEvent, PersistenceEvent, Topic, TurnEvent};
use crate::workers::PersistenceHandle;

/// Owns one [`BattleEngine`] and reports what it does.
///
/// Every turn goes out on [`Topic::Turn`], every phase change on
/// [`Topic::Lifecycle`]. When a battle ends its record is queued on the
/// persistence worker without waiting; storage failures are published on
/// [`Topic::Persistence`] and never reach the battle.
pub struct BattleSession {
    engine: BattleEngine,
    events: EventBus,
    persistence: Option<PersistenceHandle>,
}

impl BattleSession {
    pub fn new(config: BattleConfig) -> Self {
        Self::from_engine(BattleEngine::new(config))
    }

    pub fn from_engine(engine: BattleEngine) -> Self {
        Self {
            engine,
            events: EventBus::new(),
            persistence: None,
        }
    }

    /// Resumes a state written by [`Self::save_state`].
    pub fn restore(path: impl AsRef<Path>, config: BattleConfig) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        let state = codec::deserialize(&text)?;
        let engine = BattleEngine::from_state(state, config)?;
        info!(path = %path.as_ref().display(), "battle state restored");
        Ok(Self::from_engine(engine))
    }

    #[must_use]
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    #[must_use]
    pub fn with_persistence(mut self, handle: PersistenceHandle) -> Self {
        self.persistence = Some(handle);
        self
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.events.subscribe(topic)
    }

    pub fn engine(&self) -> &BattleEngine {
        &self.engine
    }

    pub fn state(&self) -> &BattleState {
        self.engine.state()
    }

    pub fn record(&self) -> Option<&BattleRecord> {
        self.engine.record()
    }

    pub fn initialize(&mut self, challenger: Combatant, opponent: Combatant) -> Result<()> {
        let from = self.state().phase;
        self.engine.initialize(challenger, opponent)?;
        self.phase_changed(from);
        Ok(())
    }

    pub fn start(&mut self) -> bool {
        let from = self.state().phase;
        let started = self.engine.start_battle();
        if started {
            self.phase_changed(from);
        }
        started
    }

    pub fn set_auto_battle(&mut self, enabled: bool) {
        self.engine.set_auto_battle(enabled);
    }

    /// Resolves one turn. `None` outside the `fighting` phase.
    pub fn step(&mut self) -> Option<AttackResult> {
        let result = self.engine.execute_attack()?;
        let state = self.engine.state();
        self.events.publish(TurnEvent {
            result: result.clone(),
            challenger_hp: hp(state, Side::Challenger),
            opponent_hp: hp(state, Side::Opponent),
        });
        if result.finished {
            self.finish();
        }
        Some(result)
    }

    /// Resolves turns until the battle ends or the configured cap is hit.
    pub fn run_to_completion(&mut self) -> StopReason {
        let reason = loop {
            if let Some(stop) = self.engine.stop_reason() {
                break stop;
            }
            self.step();
        };
        self.events.publish(LifecycleEvent::Stopped { reason });
        reason
    }

    pub fn reset(&mut self) {
        let from = self.state().phase;
        self.engine.reset();
        self.phase_changed(from);
    }

    /// The current state as codec JSON.
    pub fn snapshot(&self) -> Result<String> {
        Ok(codec::serialize(self.state())?)
    }

    /// Writes [`Self::snapshot`] to `path` through a temporary file.
    pub fn save_state(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, self.snapshot()?)?;
        fs::rename(&temp_path, path)?;
        debug!(path = %path.display(), "battle state saved");
        Ok(())
    }

    fn phase_changed(&self, from: Phase) {
        let to = self.state().phase;
        if from != to {
            self.events.publish(LifecycleEvent::PhaseChanged { from, to });
        }
    }

    fn finish(&self) {
        self.phase_changed(Phase::Fighting);
        if let Some(result) = self.state().result.clone() {
            info!(
                winner = %result.winner_name,
                turns = result.total_turns,
                "battle finished"
            );
            self.events.publish(LifecycleEvent::Finished { result });
        }

        let (Some(handle), Some(record)) = (&self.persistence, self.engine.record()) else {
            return;
        };
        if let Err(err) = handle.submit(record.clone()) {
            warn!(record = %record.id, error = %err, "battle record not queued");
            self.events.publish(PersistenceEvent::Failed {
                record_id: record.id.clone(),
                error: err.to_string(),
            });
        }
    }
}

fn hp(state: &BattleState, side: Side) -> u32 {
    state.combatant(side).map_or(0, |c| c.current_hp)
}
