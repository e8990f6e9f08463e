//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::types::{LifecycleEvent, PersistenceEvent, TurnEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Resolved turns
    Turn,
    /// Phase changes and battle end
    Lifecycle,
    /// Record storage outcomes
    Persistence,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Turn(TurnEvent),
    Lifecycle(LifecycleEvent),
    Persistence(PersistenceEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Turn(_) => Topic::Turn,
            Event::Lifecycle(_) => Topic::Lifecycle,
            Event::Persistence(_) => Topic::Persistence,
        }
    }
}

/// Topic-based event bus.
///
/// Every topic owns its own broadcast channel, created up front, so
/// subscribing never fails. Clones share the channels.
#[derive(Clone)]
pub struct EventBus {
    turn: broadcast::Sender<Event>,
    lifecycle: broadcast::Sender<Event>,
    persistence: broadcast::Sender<Event>,
}

impl EventBus {
    pub const DEFAULT_CAPACITY: usize = 100;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates a bus with `capacity` buffered events per topic.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            turn: broadcast::channel(capacity).0,
            lifecycle: broadcast::channel(capacity).0,
            persistence: broadcast::channel(capacity).0,
        }
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Turn => &self.turn,
            Topic::Lifecycle => &self.lifecycle,
            Topic::Persistence => &self.persistence,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: impl Into<Event>) {
        let event = event.into();
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl From<TurnEvent> for Event {
    fn from(event: TurnEvent) -> Self {
        Event::Turn(event)
    }
}

impl From<LifecycleEvent> for Event {
    fn from(event: LifecycleEvent) -> Self {
        Event::Lifecycle(event)
    }
}

impl From<PersistenceEvent> for Event {
    fn from(event: PersistenceEvent) -> Self {
        Event::Persistence(event)
    }
}
