//! Async runtime around the deterministic battle engine.
//!
//! `battle-core` resolves turns; this crate paces and reports them. Modules are
//! organized by responsibility:
//! - [`session`] wraps an engine and publishes what it does
//! - [`auto`] drives a session on a timer
//! - [`events`] provides the topic-based event bus
//! - [`repository`] stores finished battle records
//! - [`workers`] hosts the background persistence worker
//! - [`config`] loads runtime settings from the environment
pub mod auto;
pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod repository;
pub mod session;
pub mod workers;

pub use auto::{AutoBattle, AutoBattleHandle};
pub use clock::SystemClock;
pub use config::RuntimeConfig;
pub use error::{Result, RuntimeError};
pub use events::{Event, EventBus, LifecycleEvent, PersistenceEvent, Topic, TurnEvent};
pub use repository::{
    FileRecordRepository, InMemoryRecordRepository, RecordRepository, RepositoryError,
};
pub use session::BattleSession;
pub use workers::{PersistenceConfig, PersistenceError, PersistenceHandle, PersistenceWorker};
