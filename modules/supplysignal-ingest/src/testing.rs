// Test doubles for the ingestion pipeline.
//
// - StaticFetcher (SignalFetcher): returns a fixed batch, counts calls
// - ScriptedGenerator (ContentGenerator): queued responses, counts calls
// - FailingRepository (DisruptionRepository): every write fails
// - FixedBackend (ClassificationBackend): classifies every signal the same way
//
// Plus constructors for the three signal kinds.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use ai_client::{AiError, ContentGenerator};
use supplysignal_common::{
    Disruption, DisruptionStatus, EventType, LocationType, NewsSignal, PortHub, ProcessedEvent,
    RawSignal, Severity, ShipmentDisruptionLink, ShippingSignal, SignalKind, VesselStatus,
    WeatherSignal,
};
use supplysignal_store::{DisruptionRepository, StoreError, StoreResult};

use crate::classifier::ClassificationBackend;
use crate::fetchers::SignalFetcher;

// ---------------------------------------------------------------------------
// Signal constructors
// ---------------------------------------------------------------------------

pub fn news_signal(title: &str) -> RawSignal {
    RawSignal::News(NewsSignal {
        title: title.to_string(),
        description: None,
        published_at: Utc::now(),
        url: "https://example.com/article".to_string(),
        source: "test-wire".to_string(),
    })
}

pub fn weather_signal(location: &str, risk_level: u8) -> RawSignal {
    RawSignal::Weather(WeatherSignal {
        location: location.to_string(),
        temperature: 18.0,
        humidity: 70.0,
        wind_speed: 12.0,
        conditions: "Rain".to_string(),
        risk_level,
    })
}

pub fn shipping_signal(location: &str, delay_hours: f64) -> RawSignal {
    RawSignal::Shipping(ShippingSignal {
        vessel_id: "TEST-VESSEL".to_string(),
        location: location.to_string(),
        status: VesselStatus::Anchored,
        eta: Utc::now() + Duration::hours(24),
        delay_hours,
    })
}

// ---------------------------------------------------------------------------
// StaticFetcher
// ---------------------------------------------------------------------------

pub struct StaticFetcher {
    kind: SignalKind,
    signals: Vec<RawSignal>,
    calls: AtomicUsize,
}

impl StaticFetcher {
    pub fn new(kind: SignalKind, signals: Vec<RawSignal>) -> Self {
        Self {
            kind,
            signals,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn empty(kind: SignalKind) -> Self {
        Self::new(kind, Vec::new())
    }

    pub fn fetch_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SignalFetcher for StaticFetcher {
    fn kind(&self) -> SignalKind {
        self.kind
    }

    async fn fetch(&self) -> Vec<RawSignal> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.signals.clone()
    }
}

// ---------------------------------------------------------------------------
// ScriptedGenerator
// ---------------------------------------------------------------------------

/// Replays queued responses in order; answers `null` once the queue is empty.
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String, AiError>>>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn respond(self, text: &str) -> Self {
        self.push(Ok(text.to_string()));
        self
    }

    pub fn fail(self, error: AiError) -> Self {
        self.push(Err(error));
        self
    }

    fn push(&self, response: Result<String, AiError>) {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(response);
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate_content(&self, _prompt: &str) -> Result<String, AiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .ok()
            .and_then(|mut q| q.pop_front())
            .unwrap_or_else(|| Ok("null".to_string()))
    }
}

// ---------------------------------------------------------------------------
// FixedBackend
// ---------------------------------------------------------------------------

/// Classifies every signal as a medium congestion event at the signal's
/// location, with no randomness.
pub struct FixedBackend;

#[async_trait]
impl ClassificationBackend for FixedBackend {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn classify(&self, signal: &RawSignal) -> Option<ProcessedEvent> {
        let location = match signal {
            RawSignal::News(n) => n.title.clone(),
            RawSignal::Weather(w) => w.location.clone(),
            RawSignal::Shipping(s) => s.location.clone(),
        };
        Some(
            ProcessedEvent::new(
                EventType::Congestion,
                LocationType::Port,
                location,
                Severity::Medium,
                signal.label(),
                "fixed",
                signal.to_value(),
            )
            .with_confidence(0.75),
        )
    }
}

// ---------------------------------------------------------------------------
// FailingRepository
// ---------------------------------------------------------------------------

/// Reads succeed with nothing; every write fails with a storage error.
#[derive(Default)]
pub struct FailingRepository {
    attempts: AtomicUsize,
}

impl FailingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    fn fail<T>(&self) -> StoreResult<T> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Storage("connection refused".into()))
    }
}

#[async_trait]
impl DisruptionRepository for FailingRepository {
    async fn insert_disruption(&self, _disruption: &Disruption) -> StoreResult<()> {
        self.fail()
    }

    async fn find_disruption(&self, _id: Uuid) -> StoreResult<Option<Disruption>> {
        Ok(None)
    }

    async fn disruptions_by_status(&self, _status: DisruptionStatus) -> StoreResult<Vec<Disruption>> {
        Ok(Vec::new())
    }

    async fn update_disruption_status(
        &self,
        _id: Uuid,
        _status: DisruptionStatus,
        _end_time: Option<DateTime<Utc>>,
    ) -> StoreResult<bool> {
        self.fail()
    }

    async fn delete_disruption(&self, _id: Uuid) -> StoreResult<bool> {
        self.fail()
    }

    async fn insert_links(&self, _links: &[ShipmentDisruptionLink]) -> StoreResult<usize> {
        self.fail()
    }

    async fn links_for_disruption(&self, _id: Uuid) -> StoreResult<Vec<ShipmentDisruptionLink>> {
        Ok(Vec::new())
    }

    async fn port_hubs(&self) -> StoreResult<Vec<PortHub>> {
        Ok(Vec::new())
    }

    async fn update_port_hub_status(&self, _id: Uuid, _status: &str) -> StoreResult<()> {
        self.fail()
    }
}
