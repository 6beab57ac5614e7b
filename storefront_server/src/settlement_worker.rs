use std::time::Duration;

use chrono::Utc;
use log::*;
use storefront_engine::{OrderFlowApi, OrderFlowConfig, SqliteDatabase};
use tokio::{task::JoinHandle, time::MissedTickBehavior};

/// Starts the settlement worker. Do not await the returned JoinHandle, as it will run indefinitely.
///
/// Each tick settles whatever batches have fallen due. The batches live in the database, so anything that was
/// scheduled before a restart is picked up on the first tick after it.
pub fn start_settlement_worker(db: SqliteDatabase, config: OrderFlowConfig, poll_interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(poll_interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let api = OrderFlowApi::new(db, config);
        info!("🕰️ Settlement worker started. Polling every {}s", poll_interval.as_secs());
        loop {
            timer.tick().await;
            trace!("🕰️ Looking for due settlements");
            match api.process_due_settlements(Utc::now()).await {
                Ok(summary) if summary.is_empty() => {},
                Ok(summary) => {
                    info!(
                        "🕰️ Settlement pass: {} settled, {} void, {} skipped, {} failed. {} credited in total.",
                        summary.settled, summary.voided, summary.skipped, summary.failed, summary.credited
                    );
                },
                Err(e) => {
                    error!("🕰️ Error running the settlement job: {e}");
                },
            }
        }
    })
}
