use std::sync::Mutex;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use supplysignal_common::{
    EventType, LocationType, NewsSignal, ProcessedEvent, RawSignal, Severity, ShippingSignal,
    WeatherSignal,
};

use super::ClassificationBackend;
use crate::fetchers::MONITORED_HUBS;

pub const NEWS_EVENT_PROBABILITY: f64 = 0.2;
pub const MIN_CONFIDENCE: f64 = 0.60;
pub const MAX_CONFIDENCE: f64 = 0.85;

const SOURCE: &str = "simulated-classifier";

const NEWS_KEYWORDS: &[(&str, EventType)] = &[
    ("strike", EventType::Strike),
    ("walkout", EventType::Strike),
    ("union", EventType::Strike),
    ("storm", EventType::Weather),
    ("typhoon", EventType::Weather),
    ("hurricane", EventType::Weather),
    ("flood", EventType::Weather),
    ("congestion", EventType::Congestion),
    ("queue", EventType::Congestion),
    ("backlog", EventType::Congestion),
    ("tension", EventType::Geopolitical),
    ("sanction", EventType::Geopolitical),
    ("conflict", EventType::Geopolitical),
    ("cyber", EventType::Technical),
    ("outage", EventType::Technical),
    ("system", EventType::Technical),
];

/// Severity band for a weather risk level.
pub fn weather_severity(risk_level: u8) -> Severity {
    if risk_level >= 5 {
        Severity::Critical
    } else if risk_level >= 4 {
        Severity::High
    } else {
        Severity::Medium
    }
}

/// Severity band for a vessel delay in hours.
pub fn shipping_severity(delay_hours: f64) -> Severity {
    if delay_hours > 48.0 {
        Severity::Critical
    } else if delay_hours > 24.0 {
        Severity::High
    } else {
        Severity::Medium
    }
}

/// Deterministic-shape classifier that needs no external service.
pub struct SimulatedBackend {
    rng: Mutex<StdRng>,
}

impl SimulatedBackend {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut rng)
    }

    fn confidence(&self) -> f64 {
        self.with_rng(|rng| rng.random_range(MIN_CONFIDENCE..=MAX_CONFIDENCE))
    }

    fn classify_news(&self, signal: &RawSignal, news: &NewsSignal) -> Option<ProcessedEvent> {
        if !self.with_rng(|rng| rng.random_bool(NEWS_EVENT_PROBABILITY)) {
            return None;
        }
        let text = format!(
            "{} {}",
            news.title,
            news.description.as_deref().unwrap_or_default()
        )
        .to_ascii_lowercase();

        let event_type = NEWS_KEYWORDS
            .iter()
            .find(|(keyword, _)| text.contains(keyword))
            .map(|(_, t)| *t)
            .unwrap_or(EventType::Other);
        let location = MONITORED_HUBS
            .iter()
            .map(|(name, _, _)| *name)
            .find(|name| text.contains(&name.to_ascii_lowercase()));
        let severity = if ["closure", "shutdown", "suspend"].iter().any(|k| text.contains(k)) {
            Severity::High
        } else {
            Severity::Medium
        };

        let (location_type, location_id) = match location {
            Some(name) => (LocationType::Port, name.to_string()),
            None => (LocationType::Route, "global".to_string()),
        };

        Some(
            ProcessedEvent::new(
                event_type,
                location_type,
                location_id,
                severity,
                news.title.clone(),
                SOURCE,
                signal.to_value(),
            )
            .with_start_time(news.published_at)
            .with_confidence(self.confidence()),
        )
    }

    fn classify_weather(&self, signal: &RawSignal, weather: &WeatherSignal) -> ProcessedEvent {
        ProcessedEvent::new(
            EventType::Weather,
            LocationType::Port,
            weather.location.clone(),
            weather_severity(weather.risk_level),
            format!(
                "{} at {} (wind {:.0} m/s, {:.0}°C)",
                weather.conditions, weather.location, weather.wind_speed, weather.temperature
            ),
            SOURCE,
            signal.to_value(),
        )
        .with_confidence(self.confidence())
    }

    fn classify_shipping(&self, signal: &RawSignal, shipping: &ShippingSignal) -> ProcessedEvent {
        ProcessedEvent::new(
            EventType::Congestion,
            LocationType::Port,
            shipping.location.clone(),
            shipping_severity(shipping.delay_hours),
            format!(
                "Vessel {} {} at {} with {:.0}h delay",
                shipping.vessel_id, shipping.status, shipping.location, shipping.delay_hours
            ),
            SOURCE,
            signal.to_value(),
        )
        .with_end_time(Some(shipping.eta))
        .with_confidence(self.confidence())
    }
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClassificationBackend for SimulatedBackend {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn classify(&self, signal: &RawSignal) -> Option<ProcessedEvent> {
        match signal {
            RawSignal::News(news) => self.classify_news(signal, news),
            RawSignal::Weather(weather) => Some(self.classify_weather(signal, weather)),
            RawSignal::Shipping(shipping) => Some(self.classify_shipping(signal, shipping)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{news_signal, shipping_signal, weather_signal};

    #[test]
    fn weather_bands() {
        assert_eq!(weather_severity(3), Severity::Medium);
        assert_eq!(weather_severity(4), Severity::High);
        assert_eq!(weather_severity(5), Severity::Critical);
    }

    #[test]
    fn shipping_bands_are_strict() {
        assert_eq!(shipping_severity(24.0), Severity::Medium);
        assert_eq!(shipping_severity(24.5), Severity::High);
        assert_eq!(shipping_severity(48.0), Severity::High);
        assert_eq!(shipping_severity(49.0), Severity::Critical);
    }

    #[tokio::test]
    async fn shipping_event_carries_location_and_confidence_range() {
        let backend = SimulatedBackend::with_seed(3);
        let event = backend.classify(&shipping_signal("Singapore", 30.0)).await.unwrap();
        assert_eq!(event.event_type, EventType::Congestion);
        assert_eq!(event.location_id, "Singapore");
        assert_eq!(event.severity, Severity::High);
        assert!((MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&event.confidence()));
    }

    #[tokio::test]
    async fn news_emits_roughly_one_in_five() {
        let backend = SimulatedBackend::with_seed(11);
        let signal = news_signal("Dock strike at Rotterdam");
        let mut hits = 0;
        for _ in 0..2000 {
            if let Some(event) = backend.classify(&signal).await {
                assert_eq!(event.event_type, EventType::Strike);
                assert_eq!(event.location_id, "Rotterdam");
                hits += 1;
            }
        }
        assert!((300..=500).contains(&hits), "hits = {hits}");
    }

    #[tokio::test]
    async fn weather_event_uses_banded_severity() {
        let backend = SimulatedBackend::with_seed(5);
        let event = backend.classify(&weather_signal("Shanghai", 5)).await.unwrap();
        assert_eq!(event.severity, Severity::Critical);
        assert_eq!(event.event_type, EventType::Weather);
    }
}
