// src/scheduler.rs
//! Fixed-interval poll loop. A cycle-level failure is logged, forwarded
//! best-effort to the admin chat, and the loop keeps going — the process
//! never exits after a successful startup.

use std::time::Duration;

use chrono::Utc;
use tracing::{error, info};

use crate::pipeline::Pipeline;

pub async fn run_forever(mut pipeline: Pipeline, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        // First tick fires immediately, so the first cycle starts at boot.
        ticker.tick().await;
        info!("checking feeds");

        if let Err(e) = pipeline.run_cycle(Utc::now()).await {
            error!(error = %e, "cycle failed");
            pipeline.publisher().notify_admin(&e.to_string()).await;
        }

        info!(secs = interval.as_secs(), "sleeping until next cycle");
    }
}
