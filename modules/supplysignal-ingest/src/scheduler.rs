use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::pipeline::{IngestionPipeline, IngestionReport};

/// Periodic trigger for ingestion runs.
///
/// Ticks do not wait for the previous run: each run is spawned on its own,
/// so a slow run can overlap the next one. `stop` halts the timer only;
/// runs already in flight finish on their own.
pub struct IngestionScheduler {
    pipeline: Arc<IngestionPipeline>,
    interval: Duration,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl IngestionScheduler {
    pub fn new(pipeline: Arc<IngestionPipeline>, interval: Duration) -> Self {
        Self {
            pipeline,
            interval,
            timer: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start the timer. The first run fires immediately. Returns `false` and
    /// does nothing if already running. Must be called inside a Tokio runtime.
    pub fn start(&self) -> bool {
        let mut timer = self.timer.lock().unwrap_or_else(|p| p.into_inner());
        if timer.as_ref().is_some_and(|h| !h.is_finished()) {
            warn!("Ingestion scheduler already running");
            return false;
        }

        let pipeline = self.pipeline.clone();
        let period = self.interval;
        *timer = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let pipeline = pipeline.clone();
                tokio::spawn(async move {
                    let report = pipeline.run().await;
                    info!(
                        processed = report.processed,
                        stored = report.stored,
                        errors = report.errors,
                        "Scheduled ingestion finished"
                    );
                });
            }
        }));
        info!(interval_secs = period.as_secs(), "Ingestion scheduler started");
        true
    }

    /// Halt the timer. Returns `false` if it was not running.
    pub fn stop(&self) -> bool {
        let mut timer = self.timer.lock().unwrap_or_else(|p| p.into_inner());
        match timer.take() {
            Some(handle) => {
                handle.abort();
                info!("Ingestion scheduler stopped");
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.timer
            .lock()
            .map(|t| t.as_ref().is_some_and(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    /// One run, independent of the timer.
    pub async fn run_once(&self) -> IngestionReport {
        self.pipeline.run().await
    }
}

impl Drop for IngestionScheduler {
    fn drop(&mut self) {
        if let Ok(mut timer) = self.timer.lock() {
            if let Some(handle) = timer.take() {
                handle.abort();
            }
        }
    }
}
