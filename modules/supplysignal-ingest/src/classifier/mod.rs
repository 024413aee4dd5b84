// Event classification.
//
// EventClassifier owns the materiality gate and delegates everything that
// passes it to one ClassificationBackend, chosen once at construction.

pub mod ai;
mod prompts;
pub mod simulated;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use ai_client::Claude;
use supplysignal_common::{Config, ProcessedEvent, RawSignal};

pub use ai::AiBackend;
pub use simulated::SimulatedBackend;

/// Weather below this risk level is never classified.
pub const WEATHER_MIN_RISK_LEVEL: u8 = 3;
/// Shipping delays below this many hours are never classified.
pub const SHIPPING_MIN_DELAY_HOURS: f64 = 12.0;

#[async_trait]
pub trait ClassificationBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Turn one signal into an event, or `None` when it describes no
    /// disruption. Backends recover from their own failures.
    async fn classify(&self, signal: &RawSignal) -> Option<ProcessedEvent>;
}

/// Cheap pre-filter applied before any backend call.
pub fn is_material(signal: &RawSignal) -> bool {
    match signal {
        RawSignal::News(_) => true,
        RawSignal::Weather(w) => w.risk_level >= WEATHER_MIN_RISK_LEVEL,
        RawSignal::Shipping(s) => s.delay_hours >= SHIPPING_MIN_DELAY_HOURS,
    }
}

#[derive(Clone)]
pub struct EventClassifier {
    backend: Arc<dyn ClassificationBackend>,
}

impl EventClassifier {
    pub fn new(backend: Arc<dyn ClassificationBackend>) -> Self {
        Self { backend }
    }

    pub fn simulated() -> Self {
        Self::new(Arc::new(SimulatedBackend::new()))
    }

    /// AI-backed when an Anthropic key is configured, simulated otherwise.
    pub fn from_config(config: &Config) -> Self {
        match config.anthropic_api_key.as_deref() {
            Some(key) => {
                let claude = Claude::new(key, &config.classifier_model)
                    .with_timeout(Duration::from_secs(config.http_timeout_secs.max(30)));
                info!(model = config.classifier_model.as_str(), "Using AI classification backend");
                Self::new(Arc::new(AiBackend::new(Arc::new(claude))))
            }
            None => {
                info!("No ANTHROPIC_API_KEY set, using simulated classification backend");
                Self::simulated()
            }
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub async fn classify(&self, signal: &RawSignal) -> Option<ProcessedEvent> {
        if !is_material(signal) {
            debug!(signal = signal.label().as_str(), "Below materiality threshold, skipping");
            return None;
        }
        self.backend.classify(signal).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{shipping_signal, weather_signal, ScriptedGenerator};

    #[tokio::test]
    async fn low_risk_weather_never_reaches_backend() {
        let generator = Arc::new(ScriptedGenerator::new());
        let classifier = EventClassifier::new(Arc::new(AiBackend::new(generator.clone())));
        assert!(classifier.classify(&weather_signal("Hamburg", 2)).await.is_none());
        assert_eq!(generator.calls(), 0);

        let simulated = EventClassifier::simulated();
        for _ in 0..20 {
            assert!(simulated.classify(&weather_signal("Hamburg", 2)).await.is_none());
        }
    }

    #[tokio::test]
    async fn short_shipping_delay_never_reaches_backend() {
        let generator = Arc::new(ScriptedGenerator::new());
        let classifier = EventClassifier::new(Arc::new(AiBackend::new(generator.clone())));
        assert!(classifier.classify(&shipping_signal("Busan", 5.0)).await.is_none());
        assert_eq!(generator.calls(), 0);
        assert!(EventClassifier::simulated()
            .classify(&shipping_signal("Busan", 5.0))
            .await
            .is_none());
    }

    #[test]
    fn gate_boundaries_are_inclusive() {
        assert!(is_material(&weather_signal("Dubai", 3)));
        assert!(is_material(&shipping_signal("Dubai", 12.0)));
        assert!(!is_material(&shipping_signal("Dubai", 11.9)));
    }

    #[test]
    fn backend_follows_credentials() {
        assert_eq!(EventClassifier::from_config(&Config::default()).backend_name(), "simulated");
        let config = Config {
            anthropic_api_key: Some("sk-ant-test".into()),
            ..Config::default()
        };
        assert_eq!(EventClassifier::from_config(&config).backend_name(), "ai");
    }
}
