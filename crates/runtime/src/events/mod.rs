//! Topic-based event bus for session events.
//!
//! Events are published to topics and consumers subscribe only to the topics
//! they need. Publishing is best-effort: an event with no subscriber is
//! dropped.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{LifecycleEvent, PersistenceEvent, TurnEvent};
