use std::sync::Arc;

use log::warn;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::clock::Clock;
use crate::store::RoutineStore;

use super::engine::StatusSnapshot;

/// Tick-driven re-evaluation for one mounted routine display. Each tick
/// re-derives the snapshot from the store and publishes it when it
/// changed; `stop` cancels and joins so no evaluation outlives the
/// hosting view.
pub struct StatusMonitor {
    routine_id: String,
    updates: watch::Receiver<StatusSnapshot>,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl StatusMonitor {
    pub fn start(
        routine_id: String,
        store: Arc<dyn RoutineStore>,
        clock: Arc<dyn Clock>,
        mut ticks: broadcast::Receiver<()>,
    ) -> Self {
        let initial = match store.routine(&routine_id) {
            Some(routine) => StatusSnapshot::derive(&routine, clock.time_of_day()),
            None => StatusSnapshot::placeholder(&routine_id),
        };
        let (tx, rx) = watch::channel(initial);
        let cancel = CancellationToken::new();

        let loop_cancel = cancel.clone();
        let loop_id = routine_id.clone();
        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    tick = ticks.recv() => match tick {
                        // A lagged receiver just coalesced some ticks;
                        // the next derivation is current either way.
                        Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {
                            let Some(routine) = store.routine(&loop_id) else {
                                warn!("routine {loop_id} no longer in store, stopping monitor");
                                break;
                            };
                            let snapshot = StatusSnapshot::derive(&routine, clock.time_of_day());
                            tx.send_if_modified(|current| {
                                if *current == snapshot {
                                    false
                                } else {
                                    *current = snapshot;
                                    true
                                }
                            });
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                    _ = loop_cancel.cancelled() => break,
                }
            }
        });

        Self {
            routine_id,
            updates: rx,
            cancel,
            handle: Some(handle),
        }
    }

    pub fn routine_id(&self) -> &str {
        &self.routine_id
    }

    /// Latest-value stream of snapshots; intermediate values coalesce.
    pub fn subscribe(&self) -> watch::Receiver<StatusSnapshot> {
        self.updates.clone()
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.updates.borrow().clone()
    }

    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for StatusMonitor {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
