use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;

use routinely::clock::{Clock, SystemClock};
use routinely::models::Routine;
use routinely::status::StatusMonitor;
use routinely::store::{InMemoryRoutineStore, RoutineStore};
use routinely::ticker::SharedTicker;

/// Headless driver: watches every routine in the given JSON file and
/// logs each status transition until Ctrl-C. Useful for eyeballing the
/// engine against a real day without a frontend.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let path = std::env::args()
        .nth(1)
        .context("usage: routinely <routines.json>")?;
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read routine list from {path}"))?;
    let routines: Vec<Routine> =
        serde_json::from_str(&raw).context("routine list is not valid JSON")?;
    info!("watching {} routines from {path}", routines.len());

    let store: Arc<dyn RoutineStore> = Arc::new(InMemoryRoutineStore::new(routines.clone()));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let ticker = SharedTicker::start();

    let mut monitors = Vec::new();
    let mut printers = Vec::new();
    for routine in &routines {
        let monitor = StatusMonitor::start(
            routine.id.clone(),
            store.clone(),
            clock.clone(),
            ticker.subscribe(),
        );
        let mut updates = monitor.subscribe();
        let title = routine.title.clone();
        printers.push(tokio::spawn(async move {
            loop {
                let snapshot = updates.borrow_and_update().clone();
                info!(
                    "{title}: {} (badge {:?}, urgency {})",
                    snapshot.label,
                    snapshot.badge,
                    snapshot.urgency.as_str()
                );
                if updates.changed().await.is_err() {
                    break;
                }
            }
        }));
        monitors.push(monitor);
    }

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;
    info!("shutting down");

    for monitor in monitors {
        monitor.stop().await;
    }
    ticker.stop().await;
    for printer in printers {
        let _ = printer.await;
    }
    Ok(())
}
