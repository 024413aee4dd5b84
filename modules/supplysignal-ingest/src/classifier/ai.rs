use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{debug, warn};

use ai_client::{extract_json_object, strip_code_blocks, ContentGenerator};
use supplysignal_common::{
    AffectedShipment, EventType, LocationType, ProcessedEvent, RawSignal, Severity,
    SupplySignalError,
};

use super::prompts::classification_prompt;
use super::simulated::SimulatedBackend;
use super::ClassificationBackend;

/// Model answers carry their own confidence; this is used when they omit it.
const DEFAULT_MODEL_CONFIDENCE: f64 = 0.7;

/// What the model must return. Missing required fields fail deserialization,
/// and the prompt embeds the JSON schema derived from this type.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(super) struct Extraction {
    #[serde(rename = "type")]
    event_type: EventType,
    location_type: LocationType,
    /// Name or UN/LOCODE of the affected location.
    location_id: String,
    severity: Severity,
    /// One sentence describing the disruption.
    description: String,
    /// RFC 3339 timestamp.
    #[schemars(with = "String")]
    start_time: DateTime<Utc>,
    /// RFC 3339 timestamp, or null while ongoing.
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    end_time: Option<DateTime<Utc>>,
    /// Between 0 and 1.
    #[serde(default)]
    confidence: Option<f64>,
    /// Known shipments the event affects, if any are named in the signal.
    #[serde(default)]
    affected_shipments: Option<Vec<AffectedShipment>>,
}

enum Answer {
    NoEvent,
    Event(Extraction),
}

fn parse_answer(response: &str) -> Result<Answer, SupplySignalError> {
    let cleaned = strip_code_blocks(response).trim();
    if cleaned.eq_ignore_ascii_case("null") {
        return Ok(Answer::NoEvent);
    }
    let json = extract_json_object(cleaned)
        .ok_or_else(|| SupplySignalError::ClassificationInvalid("no JSON object in response".into()))?;
    let extraction: Extraction = serde_json::from_str(json)
        .map_err(|e| SupplySignalError::ClassificationInvalid(e.to_string()))?;
    if extraction.location_id.trim().is_empty() || extraction.description.trim().is_empty() {
        return Err(SupplySignalError::ClassificationInvalid(
            "empty locationId or description".into(),
        ));
    }
    Ok(Answer::Event(extraction))
}

/// Classifies through a text-generation model, falling back to the
/// simulated backend whenever the model call or its answer is unusable.
pub struct AiBackend {
    generator: Arc<dyn ContentGenerator>,
    fallback: SimulatedBackend,
}

impl AiBackend {
    pub fn new(generator: Arc<dyn ContentGenerator>) -> Self {
        Self {
            generator,
            fallback: SimulatedBackend::new(),
        }
    }

    pub fn with_fallback(mut self, fallback: SimulatedBackend) -> Self {
        self.fallback = fallback;
        self
    }
}

#[async_trait]
impl ClassificationBackend for AiBackend {
    fn name(&self) -> &'static str {
        "ai"
    }

    async fn classify(&self, signal: &RawSignal) -> Option<ProcessedEvent> {
        let prompt = classification_prompt(signal);
        let response = match self.generator.generate_content(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    generator = self.generator.name(),
                    signal = signal.label().as_str(),
                    error = %e,
                    "Classification request failed, using simulated backend"
                );
                return self.fallback.classify(signal).await;
            }
        };

        match parse_answer(&response) {
            Ok(Answer::NoEvent) => {
                debug!(signal = signal.label().as_str(), "Model reported no disruption");
                None
            }
            Ok(Answer::Event(x)) => {
                let mut event = ProcessedEvent::new(
                    x.event_type,
                    x.location_type,
                    x.location_id.trim(),
                    x.severity,
                    x.description,
                    self.generator.name(),
                    signal.to_value(),
                )
                .with_start_time(x.start_time)
                .with_end_time(x.end_time)
                .with_confidence(x.confidence.unwrap_or(DEFAULT_MODEL_CONFIDENCE));
                if let Some(affected) = x.affected_shipments {
                    event = event.with_affected_shipments(affected);
                }
                Some(event)
            }
            Err(e) => {
                warn!(
                    signal = signal.label().as_str(),
                    error = %e,
                    "Unusable classification, using simulated backend"
                );
                self.fallback.classify(signal).await
            }
        }
    }
}
