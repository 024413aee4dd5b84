use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use rand::Rng;
use serde::Deserialize;
use tracing::{debug, info, warn};

use supplysignal_common::{RawSignal, SignalKind, WeatherSignal};

use super::SignalFetcher;
use crate::infra::{FetchError, HttpClient};

/// Hubs whose local weather is polled on every run: (name, lat, lon).
pub const MONITORED_HUBS: &[(&str, f64, f64)] = &[
    ("Shanghai", 31.2304, 121.4737),
    ("Singapore", 1.2644, 103.8220),
    ("Rotterdam", 51.9244, 4.4777),
    ("Los Angeles", 33.7405, -118.2720),
    ("Hamburg", 53.5461, 9.9661),
    ("Dubai", 25.0118, 55.0613),
    ("Busan", 35.1028, 129.0403),
    ("Hong Kong", 22.3193, 114.1694),
    ("Antwerp", 51.2637, 4.3998),
    ("New York", 40.6681, -74.0451),
];

const SIMULATED_CONDITIONS: &[&str] = &[
    "Clear", "Clouds", "Rain", "Fog", "Snow", "Thunderstorm", "Storm", "Typhoon",
];

/// Derive a 1-5 risk level from a reading.
pub fn weather_risk_level(temperature: f64, wind_speed: f64, conditions: &str) -> u8 {
    let conditions = conditions.to_ascii_lowercase();
    let mut level: i32 = 1;
    if ["storm", "hurricane", "typhoon", "tornado"]
        .iter()
        .any(|c| conditions.contains(c))
    {
        level += 2;
    }
    if ["snow", "blizzard", "fog"].iter().any(|c| conditions.contains(c)) {
        level += 1;
    }
    if wind_speed >= 15.0 {
        level += 1;
    }
    if wind_speed >= 25.0 {
        level += 1;
    }
    if temperature < -10.0 || temperature > 40.0 {
        level += 1;
    }
    level.clamp(1, 5) as u8
}

#[derive(Deserialize)]
struct CurrentWeather {
    main: MainReading,
    #[serde(default)]
    wind: WindReading,
    #[serde(default)]
    weather: Vec<Condition>,
}

#[derive(Deserialize)]
struct MainReading {
    temp: f64,
    humidity: f64,
}

#[derive(Deserialize, Default)]
struct WindReading {
    #[serde(default)]
    speed: f64,
}

#[derive(Deserialize)]
struct Condition {
    main: String,
    #[serde(default)]
    description: String,
}

impl CurrentWeather {
    fn into_signal(self, location: &str) -> RawSignal {
        let conditions = self
            .weather
            .first()
            .map(|c| {
                if c.description.is_empty() {
                    c.main.clone()
                } else {
                    format!("{} ({})", c.main, c.description)
                }
            })
            .unwrap_or_else(|| "Unknown".to_string());
        RawSignal::Weather(WeatherSignal {
            location: location.to_string(),
            temperature: self.main.temp,
            humidity: self.main.humidity,
            wind_speed: self.wind.speed,
            risk_level: weather_risk_level(self.main.temp, self.wind.speed, &conditions),
            conditions,
        })
    }
}

/// A plausible random reading for one hub.
pub fn simulated_reading(location: &str) -> RawSignal {
    let mut rng = rand::rng();
    let conditions = SIMULATED_CONDITIONS[rng.random_range(0..SIMULATED_CONDITIONS.len())];
    let temperature = rng.random_range(-15.0..45.0_f64).round();
    let wind_speed = rng.random_range(0.0..30.0_f64).round();
    RawSignal::Weather(WeatherSignal {
        location: location.to_string(),
        temperature,
        humidity: rng.random_range(30.0..95.0_f64).round(),
        wind_speed,
        conditions: conditions.to_string(),
        risk_level: weather_risk_level(temperature, wind_speed, conditions),
    })
}

pub struct WeatherFetcher {
    http: Arc<HttpClient>,
    base_url: String,
    api_key: Option<String>,
}

impl WeatherFetcher {
    pub fn new(http: Arc<HttpClient>, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key,
        }
    }

    async fn fetch_hub(&self, api_key: &str, name: &str, lat: f64, lon: f64) -> Result<RawSignal, FetchError> {
        let url = format!("{}/weather", self.base_url.trim_end_matches('/'));
        let (lat, lon) = (lat.to_string(), lon.to_string());
        let reading: CurrentWeather = self
            .http
            .get_json(
                &url,
                &[
                    ("lat", lat.as_str()),
                    ("lon", lon.as_str()),
                    ("units", "metric"),
                    ("appid", api_key),
                ],
            )
            .await?;
        Ok(reading.into_signal(name))
    }
}

#[async_trait]
impl SignalFetcher for WeatherFetcher {
    fn kind(&self) -> SignalKind {
        SignalKind::Weather
    }

    async fn fetch(&self) -> Vec<RawSignal> {
        let Some(api_key) = self.api_key.as_deref() else {
            info!("No weather API key configured, using simulated readings");
            return MONITORED_HUBS
                .iter()
                .map(|(name, _, _)| simulated_reading(name))
                .collect();
        };

        // One failing hub is replaced on its own; the rest stay live.
        let readings = join_all(MONITORED_HUBS.iter().map(|(name, lat, lon)| async move {
            match self.fetch_hub(api_key, name, *lat, *lon).await {
                Ok(signal) => {
                    debug!(hub = *name, "Fetched live weather");
                    (signal, true)
                }
                Err(e) => {
                    warn!(hub = *name, error = %e, "Weather fetch failed, simulating reading");
                    (simulated_reading(name), false)
                }
            }
        }))
        .await;

        let live = readings.iter().filter(|(_, live)| *live).count();
        info!(live, simulated = readings.len() - live, "Fetched weather signals");
        readings.into_iter().map(|(signal, _)| signal).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn calm_reading_is_level_one() {
        assert_eq!(weather_risk_level(20.0, 3.0, "Clear"), 1);
    }

    #[test]
    fn storm_and_wind_stack() {
        // 1 + 2 (storm) + 1 (>=15) + 1 (>=25)
        assert_eq!(weather_risk_level(20.0, 26.0, "Thunderstorm"), 5);
        // 1 + 1 (fog) + 1 (cold)
        assert_eq!(weather_risk_level(-12.0, 2.0, "Fog"), 3);
    }

    #[test]
    fn level_is_clamped_to_five() {
        assert_eq!(weather_risk_level(45.0, 40.0, "Typhoon with snow"), 5);
    }

    #[test]
    fn live_reading_parses() {
        let raw = r#"{"main":{"temp":12.5,"humidity":80},"wind":{"speed":16.0},"weather":[{"main":"Rain","description":"heavy rain"}]}"#;
        let parsed: CurrentWeather = serde_json::from_str(raw).unwrap();
        match parsed.into_signal("Hamburg") {
            RawSignal::Weather(w) => {
                assert_eq!(w.location, "Hamburg");
                assert_eq!(w.conditions, "Rain (heavy rain)");
                assert_eq!(w.risk_level, 2);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn simulated_levels_stay_in_range() {
        for _ in 0..200 {
            match simulated_reading("Busan") {
                RawSignal::Weather(w) => assert!((1..=5).contains(&w.risk_level)),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn every_hub_is_reported_even_when_unreachable() {
        let http = Arc::new(HttpClient::new(Duration::from_secs(1), 1, Duration::ZERO).unwrap());
        let fetcher = WeatherFetcher::new(http, "http://127.0.0.1:9", Some("key".into()));
        let signals = fetcher.fetch().await;
        assert_eq!(signals.len(), MONITORED_HUBS.len());
    }
}
