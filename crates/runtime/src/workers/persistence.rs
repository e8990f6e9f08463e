//! Persistence worker for finished battle records.
//!
//! Sessions submit records through a [`PersistenceHandle`]; the worker writes
//! them to a [`RecordRepository`] with exponential backoff and reports the
//! outcome on the [`Topic::Persistence`](crate::events::Topic) topic. Failures
//! are logged and published, never propagated back into the battle.

use std::sync::Arc;

use battle_core::BattleRecord;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Duration, sleep};
use tracing::{debug, info, warn};

use crate::events::{EventBus, PersistenceEvent};
use crate::repository::{RecordRepository, RepositoryError};

/// Result type for persistence operations
pub type Result<T> = std::result::Result<T, PersistenceError>;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("persistence queue is full")]
    QueueFull,

    #[error("persistence worker has stopped")]
    WorkerStopped,

    #[error("failed to save record {id} after {attempts} attempts: {source}")]
    SaveFailed {
        id: String,
        attempts: u32,
        #[source]
        source: RepositoryError,
    },
}

#[derive(Debug, Clone)]
pub struct PersistenceConfig {
    /// Records buffered between the session and the worker.
    pub queue_capacity: usize,
    /// Attempts per record before giving up.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each further attempt.
    pub base_delay: Duration,
}

impl PersistenceConfig {
    pub const DEFAULT_QUEUE_CAPACITY: usize = 32;
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    pub const DEFAULT_BASE_DELAY_MS: u64 = 100;

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    #[must_use]
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            queue_capacity: Self::DEFAULT_QUEUE_CAPACITY,
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(Self::DEFAULT_BASE_DELAY_MS),
        }
    }
}

/// Commands that can be sent to the persistence worker
pub enum Command {
    Save(Box<BattleRecord>),
    /// Replies once every previously queued record has been handled.
    Flush(oneshot::Sender<()>),
    Shutdown,
}

/// Cloneable sender side of the worker.
#[derive(Clone)]
pub struct PersistenceHandle {
    tx: mpsc::Sender<Command>,
}

impl PersistenceHandle {
    /// Queues a record without waiting.
    pub fn submit(&self, record: BattleRecord) -> Result<()> {
        self.tx
            .try_send(Command::Save(Box::new(record)))
            .map_err(|err| match err {
                mpsc::error::TrySendError::Full(_) => PersistenceError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => PersistenceError::WorkerStopped,
            })
    }

    /// Waits until every record queued so far has been saved or given up on.
    pub async fn flush(&self) -> Result<()> {
        let (reply, done) = oneshot::channel();
        self.tx
            .send(Command::Flush(reply))
            .await
            .map_err(|_| PersistenceError::WorkerStopped)?;
        done.await.map_err(|_| PersistenceError::WorkerStopped)
    }

    pub async fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown).await;
    }
}

/// Background worker that writes finished records.
pub struct PersistenceWorker {
    config: PersistenceConfig,
    repository: Arc<dyn RecordRepository>,
    events: Option<EventBus>,
    command_rx: mpsc::Receiver<Command>,
}

impl PersistenceWorker {
    pub fn new(
        config: PersistenceConfig,
        repository: Arc<dyn RecordRepository>,
        events: Option<EventBus>,
    ) -> (Self, PersistenceHandle) {
        let (tx, command_rx) = mpsc::channel(config.queue_capacity.max(1));
        let worker = Self {
            config,
            repository,
            events,
            command_rx,
        };
        (worker, PersistenceHandle { tx })
    }

    /// Creates a worker and runs it on the current tokio runtime.
    pub fn spawn(
        config: PersistenceConfig,
        repository: Arc<dyn RecordRepository>,
        events: Option<EventBus>,
    ) -> (PersistenceHandle, JoinHandle<()>) {
        let (worker, handle) = Self::new(config, repository, events);
        (handle, tokio::spawn(worker.run()))
    }

    /// Main worker loop
    pub async fn run(mut self) {
        info!(
            max_attempts = self.config.max_attempts,
            "PersistenceWorker started"
        );

        while let Some(command) = self.command_rx.recv().await {
            match command {
                Command::Save(record) => self.handle_save(&record).await,
                Command::Flush(reply) => {
                    let _ = reply.send(());
                }
                Command::Shutdown => {
                    info!("PersistenceWorker shutting down");
                    break;
                }
            }
        }

        debug!("PersistenceWorker stopped");
    }

    async fn handle_save(&self, record: &BattleRecord) {
        let event = match self.save_with_retry(record).await {
            Ok(()) => PersistenceEvent::Saved {
                record_id: record.id.clone(),
            },
            Err(err) => {
                warn!(record = %record.id, error = %err, "dropping battle record");
                PersistenceEvent::Failed {
                    record_id: record.id.clone(),
                    error: err.to_string(),
                }
            }
        };
        if let Some(events) = &self.events {
            events.publish(event);
        }
    }

    /// Saves a record with exponential backoff retry
    async fn save_with_retry(&self, record: &BattleRecord) -> Result<()> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            match self.repository.save(record) {
                Ok(()) => {
                    if attempt > 0 {
                        info!("Record {} saved after {} retries", record.id, attempt);
                    }
                    return Ok(());
                }
                Err(source) if attempt + 1 >= max_attempts => {
                    return Err(PersistenceError::SaveFailed {
                        id: record.id.clone(),
                        attempts: max_attempts,
                        source,
                    });
                }
                Err(err) => {
                    let delay = self.config.base_delay * (1 << attempt.min(16));
                    warn!(
                        "Failed to save record {} (attempt {}/{}): {}. Retrying in {:?}...",
                        record.id,
                        attempt + 1,
                        max_attempts,
                        err,
                        delay
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
