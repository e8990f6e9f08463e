//! Paced auto battle on a tokio interval.

use std::time::Duration;

use battle_core::{Phase, StopReason};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

use crate::events::LifecycleEvent;
use crate::session::BattleSession;

/// Resolves one turn per tick until the battle ends, the turn cap is hit, or
/// the driver is stopped.
#[derive(Clone, Copy, Debug)]
pub struct AutoBattle {
    interval: Duration,
}

/// Running auto battle. Dropping it lets the battle play out.
pub struct AutoBattleHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<(BattleSession, Option<StopReason>)>,
}

impl AutoBattleHandle {
    /// Halts after the turn in progress, if any.
    pub fn stop(&self) {
        let _ = self.stop.send(true);
    }

    /// Waits for the driver and hands the session back.
    ///
    /// The reason is `None` when the driver was stopped before the battle
    /// ended. Cancel-safe; must not be awaited again once it has returned.
    pub async fn join(
        &mut self,
    ) -> Result<(BattleSession, Option<StopReason>), tokio::task::JoinError> {
        (&mut self.task).await
    }
}

impl AutoBattle {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Moves the session onto a background task.
    pub fn spawn(self, mut session: BattleSession) -> AutoBattleHandle {
        let (stop, stop_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            let reason = self.run(&mut session, stop_rx).await;
            (session, reason)
        });
        AutoBattleHandle { stop, task }
    }

    /// Drives `session` on the current task.
    ///
    /// A session still in `ready` is started first. Stopping leaves the
    /// battle in `fighting` and clears the auto-battle flag.
    pub async fn run(
        &self,
        session: &mut BattleSession,
        mut stop: watch::Receiver<bool>,
    ) -> Option<StopReason> {
        session.set_auto_battle(true);
        if session.state().phase == Phase::Ready {
            session.start();
        }
        info!(interval_ms = self.interval.as_millis() as u64, "auto battle started");

        let mut ticker = interval(self.interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        let max_turns = session.engine().config().max_turns;
        let mut stoppable = true;
        let reason = loop {
            match session.state().phase {
                Phase::Finished => break StopReason::Victory,
                Phase::Setup | Phase::Ready => break StopReason::Idle,
                Phase::Fighting => {}
            }
            if session.state().turn >= max_turns {
                break StopReason::TurnCap;
            }

            tokio::select! {
                _ = ticker.tick() => {}
                changed = stop.changed(), if stoppable => {
                    match changed {
                        Ok(()) if *stop.borrow() => {
                            debug!(turn = session.state().turn, "auto battle stopped");
                            session.set_auto_battle(false);
                            return None;
                        }
                        Ok(()) => {}
                        // Handle dropped; play on.
                        Err(_) => stoppable = false,
                    }
                    continue;
                }
            }
            session.step();
        };

        session.events().publish(LifecycleEvent::Stopped { reason });
        Some(reason)
    }
}
