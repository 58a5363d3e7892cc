use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::controller::FeedController;
use crate::error::FeedError;

const INTENT_CAPACITY: usize = 32;
/// Shortest passive refresh period; `interval_at` rejects a zero period.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// User intents forwarded by the presentation layer. Indices refer to rows of
/// the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Refresh,
    Pin(usize),
    Delete(usize),
    Unpin,
}

pub struct ControllerHandle {
    intents: mpsc::Sender<Intent>,
    cancel_tx: broadcast::Sender<()>,
    join: JoinHandle<()>,
}

impl ControllerHandle {
    pub async fn send(&self, intent: Intent) -> Result<(), FeedError> {
        self.intents
            .send(intent)
            .await
            .map_err(|_| FeedError::ChannelClosed)
    }

    pub async fn refresh(&self) -> Result<(), FeedError> {
        self.send(Intent::Refresh).await
    }

    pub async fn pin(&self, index: usize) -> Result<(), FeedError> {
        self.send(Intent::Pin(index)).await
    }

    pub async fn delete(&self, index: usize) -> Result<(), FeedError> {
        self.send(Intent::Delete(index)).await
    }

    pub async fn unpin(&self) -> Result<(), FeedError> {
        self.send(Intent::Unpin).await
    }

    /// Stops the loop. An operation still in flight is dropped, so its
    /// result is never applied.
    pub async fn stop(self) -> Result<(), FeedError> {
        let _ = self.cancel_tx.send(());
        self.join.await.map_err(FeedError::from)
    }
}

async fn apply(controller: &mut FeedController, intent: Intent) {
    let result = match intent {
        Intent::Refresh => {
            let outcome = controller.advance_page().await;
            debug!(?outcome, "manual refresh");
            Ok(())
        }
        Intent::Pin(index) => controller.pin(index).await.map(|_| ()),
        Intent::Delete(index) => controller.delete(index).map(|_| ()),
        Intent::Unpin => controller.unpin().await,
    };
    if let Err(err) = result {
        warn!(?intent, error = %err, "intent failed");
    }
}

/// Runs the controller on its own task: starts it, then handles intents and
/// the passive refresh timer one at a time, so two advances never overlap.
///
/// Subscribe with [`FeedController::subscribe`] before calling this to see
/// the events emitted during start-up. A zero `interval` is raised to one
/// millisecond.
pub fn spawn_controller(mut controller: FeedController, interval: Duration) -> ControllerHandle {
    let interval = interval.max(MIN_INTERVAL);
    let (intent_tx, mut intent_rx) = mpsc::channel(INTENT_CAPACITY);
    let (cancel_tx, mut cancel_rx) = broadcast::channel(1);

    let join = tokio::spawn(async move {
        tokio::select! {
            biased;
            _ = cancel_rx.recv() => {
                info!("controller shutdown requested during start-up");
                return;
            }
            state = controller.start() => {
                info!(?state, "controller started");
            }
        }

        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = cancel_rx.recv() => {
                    info!("controller shutdown requested");
                    break;
                }
                intent = intent_rx.recv() => {
                    let Some(intent) = intent else {
                        debug!("all controller handles dropped");
                        break;
                    };
                    tokio::select! {
                        biased;
                        _ = cancel_rx.recv() => {
                            info!(?intent, "shutdown while handling intent, result dropped");
                            break;
                        }
                        _ = apply(&mut controller, intent) => {}
                    }
                    // The passive timer waits a full interval after a manual refresh.
                    if intent == Intent::Refresh {
                        ticker.reset();
                    }
                }
                _ = ticker.tick() => {
                    tokio::select! {
                        biased;
                        _ = cancel_rx.recv() => {
                            info!("shutdown during passive refresh, result dropped");
                            break;
                        }
                        outcome = controller.advance_page() => {
                            debug!(?outcome, "passive refresh");
                        }
                    }
                }
            }
        }
    });

    ControllerHandle {
        intents: intent_tx,
        cancel_tx,
        join,
    }
}
