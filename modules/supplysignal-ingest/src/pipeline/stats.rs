use std::sync::atomic::{AtomicU32, Ordering};

use serde::Serialize;

use supplysignal_common::SignalKind;

/// Stats from one ingestion run.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionStats {
    pub news_fetched: u32,
    pub weather_fetched: u32,
    pub shipping_fetched: u32,
    pub processed: u32,
    pub classified: u32,
    pub stored: u32,
    pub links_created: u32,
    pub errors: u32,
    pub hubs_updated: u32,
    pub duration_ms: u64,
}

impl IngestionStats {
    pub fn record_fetched(&mut self, kind: SignalKind, count: usize) {
        let count = count as u32;
        match kind {
            SignalKind::News => self.news_fetched += count,
            SignalKind::Weather => self.weather_fetched += count,
            SignalKind::Shipping => self.shipping_fetched += count,
        }
    }

    pub fn fetched(&self) -> u32 {
        self.news_fetched + self.weather_fetched + self.shipping_fetched
    }
}

impl std::fmt::Display for IngestionStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Ingestion Run Complete ===")?;
        writeln!(f, "Signals fetched:    {}", self.fetched())?;
        writeln!(f, "  News:     {}", self.news_fetched)?;
        writeln!(f, "  Weather:  {}", self.weather_fetched)?;
        writeln!(f, "  Shipping: {}", self.shipping_fetched)?;
        writeln!(f, "Processed:          {}", self.processed)?;
        writeln!(f, "Classified:         {}", self.classified)?;
        writeln!(f, "Stored:             {}", self.stored)?;
        writeln!(f, "Shipment links:     {}", self.links_created)?;
        writeln!(f, "Errors:             {}", self.errors)?;
        writeln!(f, "Hubs updated:       {}", self.hubs_updated)?;
        let processed = self.processed.max(1);
        writeln!(
            f,
            "Classification rate: {:.0}%",
            self.classified as f64 / processed as f64 * 100.0
        )?;
        writeln!(f, "Duration:           {}ms", self.duration_ms)
    }
}

/// Per-item counters shared by concurrently running items.
#[derive(Default)]
pub(crate) struct RunCounters {
    pub processed: AtomicU32,
    pub classified: AtomicU32,
    pub stored: AtomicU32,
    pub links_created: AtomicU32,
    pub errors: AtomicU32,
}

impl RunCounters {
    pub fn bump(counter: &AtomicU32) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(counter: &AtomicU32, n: u32) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    pub fn write_into(&self, stats: &mut IngestionStats) {
        stats.processed = self.processed.load(Ordering::Relaxed);
        stats.classified = self.classified.load(Ordering::Relaxed);
        stats.stored = self.stored.load(Ordering::Relaxed);
        stats.links_created = self.links_created.load(Ordering::Relaxed);
        stats.errors = self.errors.load(Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_per_source_counts() {
        let mut stats = IngestionStats::default();
        stats.record_fetched(SignalKind::News, 5);
        stats.record_fetched(SignalKind::Weather, 10);
        stats.processed = 15;
        stats.classified = 3;
        let text = stats.to_string();
        assert!(text.contains("Signals fetched:    15"));
        assert!(text.contains("Weather:  10"));
        assert!(text.contains("Classification rate: 20%"));
    }
}
