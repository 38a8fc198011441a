//! Drive a load run from the terminal

use crate::formatter::{OutputFormatter, RecentRate, RunSummary, StopCause};
use anyhow::{Context, Result};
use std::time::Duration;
use stress_engine::{EngineConfig, LoadEngine};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

/// How long to run and how often to report
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub duration: Option<Duration>,
    pub interval: Duration,
}

async fn until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Start the engine, print live statistics until Ctrl+C or the duration
/// elapses, then stop and summarise.
pub async fn run_load(
    engine: &LoadEngine,
    config: EngineConfig,
    options: RunOptions,
    formatter: &OutputFormatter,
) -> Result<RunSummary> {
    let plan = engine
        .start(config)
        .context("Failed to start load engine")?;

    formatter.print_status("🚀 Starting stress test...");
    formatter.print_status("💡 Press Ctrl+C to stop the test at any time");

    let deadline = options.duration.map(|d| Instant::now() + d);
    let stop_at_deadline = until(deadline);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(stop_at_deadline, ctrl_c);

    let mut ticker = tokio::time::interval_at(Instant::now() + options.interval, options.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut recent = RecentRate::new();

    let stopped_by = loop {
        tokio::select! {
            result = &mut ctrl_c => {
                if let Err(e) = result {
                    debug!("Ctrl+C handler failed: {}", e);
                }
                formatter.end_live();
                formatter.print_status("🛑 Stopping test...");
                break StopCause::Interrupted;
            }
            _ = &mut stop_at_deadline => {
                formatter.end_live();
                formatter.print_status(&format!(
                    "⏰ Duration limit ({}s) reached",
                    options.duration.map(|d| d.as_secs()).unwrap_or_default()
                ));
                break StopCause::DurationElapsed;
            }
            _ = ticker.tick() => {
                let snapshot = engine.stats_snapshot();
                let rate = recent.update(&snapshot);
                formatter.print_live(&snapshot, rate);
            }
        }
    };

    let stop = engine.stop().await;
    info!("Run ended ({:?}) after {:?}", stopped_by, stop.stop_latency);

    Ok(RunSummary {
        config,
        plan,
        stopped_by,
        stats: engine.stats_snapshot(),
        stop,
    })
}
