// Ingestion pipeline: fetch -> classify -> store -> refresh hub status.
//
// Counters move per item, never per stage. A failing item is counted and
// skipped; nothing aborts a run.

pub mod stats;

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, warn};

use supplysignal_common::{ProcessedEvent, RawSignal, ShippingSignal};
use supplysignal_store::{DisruptionStore, StoreResult};

use crate::classifier::EventClassifier;
use crate::fetchers::SignalFetcher;
use stats::RunCounters;
pub use stats::IngestionStats;

/// Hub status implied by a vessel's delay at that hub.
pub fn hub_status_for_delay(delay_hours: f64) -> &'static str {
    if delay_hours >= 24.0 {
        "congested"
    } else if delay_hours >= 12.0 {
        "delayed"
    } else {
        "operational"
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionReport {
    pub processed: u32,
    pub stored: u32,
    pub errors: u32,
    pub events: Vec<ProcessedEvent>,
    #[serde(skip)]
    pub stats: IngestionStats,
}

pub struct IngestionPipeline {
    fetchers: Vec<Arc<dyn SignalFetcher>>,
    classifier: EventClassifier,
    store: DisruptionStore,
    concurrency: usize,
}

enum ItemOutcome {
    NoEvent,
    Stored(ProcessedEvent),
    Failed,
}

impl IngestionPipeline {
    pub fn new(
        fetchers: Vec<Arc<dyn SignalFetcher>>,
        classifier: EventClassifier,
        store: DisruptionStore,
    ) -> Self {
        Self {
            fetchers,
            classifier,
            store,
            concurrency: 8,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn store(&self) -> &DisruptionStore {
        &self.store
    }

    pub async fn run(&self) -> IngestionReport {
        let started = Instant::now();
        let mut stats = IngestionStats::default();

        // Fetchers never fail; each one is independent.
        let batches = join_all(self.fetchers.iter().map(|f| async move {
            let signals = f.fetch().await;
            (f.kind(), signals)
        }))
        .await;
        let mut signals = Vec::new();
        for (kind, batch) in batches {
            stats.record_fetched(kind, batch.len());
            signals.extend(batch);
        }
        info!(
            fetched = signals.len(),
            backend = self.classifier.backend_name(),
            "Signals fetched, classifying"
        );

        let counters = RunCounters::default();
        let outcomes: Vec<ItemOutcome> = stream::iter(signals.iter())
            .map(|signal| self.process_item(signal, &counters))
            .boxed()
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let events: Vec<ProcessedEvent> = outcomes
            .into_iter()
            .filter_map(|o| match o {
                ItemOutcome::Stored(event) => Some(event),
                ItemOutcome::NoEvent | ItemOutcome::Failed => None,
            })
            .collect();

        stats.hubs_updated = self.refresh_hubs(&signals).await;
        counters.write_into(&mut stats);
        stats.duration_ms = started.elapsed().as_millis() as u64;

        info!(
            processed = stats.processed,
            stored = stats.stored,
            errors = stats.errors,
            hubs_updated = stats.hubs_updated,
            "Ingestion run complete"
        );

        IngestionReport {
            processed: stats.processed,
            stored: stats.stored,
            errors: stats.errors,
            events,
            stats,
        }
    }

    async fn process_item(&self, signal: &RawSignal, counters: &RunCounters) -> ItemOutcome {
        RunCounters::bump(&counters.processed);
        let Some(event) = self.classifier.classify(signal).await else {
            return ItemOutcome::NoEvent;
        };
        RunCounters::bump(&counters.classified);

        match self.persist(&event).await {
            Ok(links) => {
                RunCounters::bump(&counters.stored);
                RunCounters::add(&counters.links_created, links as u32);
                ItemOutcome::Stored(event)
            }
            Err(e) => {
                RunCounters::bump(&counters.errors);
                warn!(
                    signal = signal.label().as_str(),
                    error = %e,
                    "Failed to store disruption, skipping item"
                );
                ItemOutcome::Failed
            }
        }
    }

    async fn persist(&self, event: &ProcessedEvent) -> StoreResult<usize> {
        let id = self.store.store_disruption(event).await?;
        self.store.link_disruption_to_shipments(id, event).await
    }

    async fn refresh_hubs(&self, signals: &[RawSignal]) -> u32 {
        let mut updated = 0;
        for ShippingSignal {
            location,
            delay_hours,
            ..
        } in signals.iter().filter_map(|s| match s {
            RawSignal::Shipping(s) => Some(s),
            _ => None,
        }) {
            match self
                .store
                .update_port_status(location, hub_status_for_delay(*delay_hours))
                .await
            {
                Ok(n) => updated += n as u32,
                Err(e) => warn!(location = location.as_str(), error = %e, "Hub status refresh failed"),
            }
        }
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hub_status_thresholds_are_inclusive() {
        assert_eq!(hub_status_for_delay(0.0), "operational");
        assert_eq!(hub_status_for_delay(11.9), "operational");
        assert_eq!(hub_status_for_delay(12.0), "delayed");
        assert_eq!(hub_status_for_delay(24.0), "congested");
    }
}
