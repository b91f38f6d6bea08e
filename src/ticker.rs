use std::time::Duration;

use log::info;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

const DEFAULT_TICK_INTERVAL_SECS: u64 = 1;
const TICK_CHANNEL_CAPACITY: usize = 8;

/// One shared interval task driving every mounted status monitor, instead
/// of each display owning its own timer. Subscribers that fall behind lag
/// on the broadcast channel and simply coalesce the missed ticks.
pub struct SharedTicker {
    tx: broadcast::Sender<()>,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl SharedTicker {
    pub fn start() -> Self {
        Self::with_period(Duration::from_secs(DEFAULT_TICK_INTERVAL_SECS))
    }

    pub fn with_period(period: Duration) -> Self {
        let (tx, _) = broadcast::channel(TICK_CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();

        let loop_tx = tx.clone();
        let loop_cancel = cancel.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        // Err just means nobody is subscribed right now.
                        let _ = loop_tx.send(());
                    }
                    _ = loop_cancel.cancelled() => {
                        info!("shared ticker shutting down");
                        break;
                    }
                }
            }
        });

        Self {
            tx,
            cancel,
            handle: Some(handle),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for SharedTicker {
    fn drop(&mut self) {
        // Covers callers that drop without stop(); the task exits on its
        // next select pass.
        self.cancel.cancel();
    }
}
