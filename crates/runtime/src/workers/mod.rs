//! Background workers that back the session runtime.
//!
//! The persistence worker takes finished battle records off the session's
//! hands so a slow or failing store never stalls a battle.

mod persistence;

pub use persistence::{
    Command, PersistenceConfig, PersistenceError, PersistenceHandle, PersistenceWorker,
};
