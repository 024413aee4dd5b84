use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use supplysignal_common::{RawSignal, ShippingSignal, SignalKind, VesselStatus};

use super::SignalFetcher;

/// Tracked vessels: (id, current location, status).
const VESSELS: &[(&str, &str, VesselStatus)] = &[
    ("MSC-AURORA", "Shanghai", VesselStatus::Berthed),
    ("MAERSK-ELBA", "Singapore", VesselStatus::Anchored),
    ("CMA-CGM-TAGE", "Rotterdam", VesselStatus::Departed),
    ("EVERGREEN-EVER-ACE", "Los Angeles", VesselStatus::InTransit),
    ("HAPAG-BERLIN", "Hamburg", VesselStatus::Berthed),
    ("COSCO-PRIDE", "Busan", VesselStatus::Anchored),
    ("ONE-HARMONY", "Hong Kong", VesselStatus::InTransit),
    ("ZIM-ANTWERP", "Antwerp", VesselStatus::Departed),
];

/// (ETA hours, delay hours) bounds for a vessel status, inclusive.
fn bounds(status: VesselStatus) -> ((i64, i64), (f64, f64)) {
    match status {
        VesselStatus::Berthed => ((1, 24), (0.0, 0.0)),
        VesselStatus::Anchored => ((12, 60), (6.0, 30.0)),
        VesselStatus::Departed => ((24, 192), (2.0, 14.0)),
        VesselStatus::InTransit => ((48, 384), (12.0, 60.0)),
    }
}

/// Simulated AIS-style vessel feed. There is no live shipping source.
pub struct ShippingFetcher {
    rng: Mutex<StdRng>,
}

impl ShippingFetcher {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Deterministic feed for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn generate(&self) -> Vec<RawSignal> {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let now = Utc::now();
        VESSELS
            .iter()
            .map(|(vessel_id, location, status)| {
                let ((eta_lo, eta_hi), (delay_lo, delay_hi)) = bounds(*status);
                let eta_hours = rng.random_range(eta_lo..=eta_hi);
                let delay_hours = if delay_hi > delay_lo {
                    rng.random_range(delay_lo..=delay_hi).round()
                } else {
                    delay_lo
                };
                RawSignal::Shipping(ShippingSignal {
                    vessel_id: vessel_id.to_string(),
                    location: location.to_string(),
                    status: *status,
                    eta: now + Duration::hours(eta_hours),
                    delay_hours,
                })
            })
            .collect()
    }
}

impl Default for ShippingFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignalFetcher for ShippingFetcher {
    fn kind(&self) -> SignalKind {
        SignalKind::Shipping
    }

    async fn fetch(&self) -> Vec<RawSignal> {
        let signals = self.generate();
        info!(count = signals.len(), "Generated shipping signals");
        signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_vessel_respects_its_status_bounds() {
        let fetcher = ShippingFetcher::with_seed(7);
        for _ in 0..50 {
            let now = Utc::now();
            for signal in fetcher.fetch().await {
                let RawSignal::Shipping(s) = signal else {
                    panic!("expected shipping signal");
                };
                let ((eta_lo, eta_hi), (delay_lo, delay_hi)) = bounds(s.status);
                assert!(s.delay_hours >= delay_lo && s.delay_hours <= delay_hi);
                let eta = (s.eta - now).num_minutes() as f64 / 60.0;
                assert!(eta >= eta_lo as f64 - 0.1 && eta <= eta_hi as f64 + 0.1);
            }
        }
    }

    #[tokio::test]
    async fn berthed_vessels_are_never_delayed() {
        let fetcher = ShippingFetcher::with_seed(1);
        let signals = fetcher.fetch().await;
        assert_eq!(signals.len(), VESSELS.len());
        for signal in signals {
            if let RawSignal::Shipping(s) = signal {
                if s.status == VesselStatus::Berthed {
                    assert_eq!(s.delay_hours, 0.0);
                }
            }
        }
    }

    #[test]
    fn same_seed_same_feed() {
        let delays = |seed| {
            ShippingFetcher::with_seed(seed)
                .generate()
                .into_iter()
                .map(|s| match s {
                    RawSignal::Shipping(s) => s.delay_hours,
                    _ => -1.0,
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(delays(42), delays(42));
    }
}
