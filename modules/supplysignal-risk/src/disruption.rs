use serde::{Deserialize, Serialize};
use tracing::warn;

use supplysignal_common::{DisruptionStatus, LinkedDisruption, Severity};

use crate::scored::{clamp_score, Scored};

/// Score returned when a disruption cannot be scored at all.
pub const DISRUPTION_FALLBACK_SCORE: f64 = 15.0;

/// Disruption category as understood by the scorer.
///
/// Accepts both the scenario vocabulary (`port_closure`, `carrier_strike`, ...)
/// and the classifier's event types (`strike`, `weather`, ...), which alias
/// onto the closest category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisruptionCategory {
    PortClosure,
    PoliticalUnrest,
    CarrierStrike,
    InfrastructureFailure,
    WeatherEvent,
    BorderDelay,
    FuelSpike,
    Unknown,
    Other,
}

impl DisruptionCategory {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return DisruptionCategory::Unknown;
        };
        match raw.to_ascii_lowercase().as_str() {
            "port_closure" => DisruptionCategory::PortClosure,
            "political_unrest" | "geopolitical" => DisruptionCategory::PoliticalUnrest,
            "carrier_strike" | "strike" => DisruptionCategory::CarrierStrike,
            "infrastructure_failure" | "technical" => DisruptionCategory::InfrastructureFailure,
            "weather_event" | "weather" => DisruptionCategory::WeatherEvent,
            "border_delay" => DisruptionCategory::BorderDelay,
            "fuel_spike" => DisruptionCategory::FuelSpike,
            "unknown" => DisruptionCategory::Unknown,
            _ => DisruptionCategory::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DisruptionCategory::PortClosure => "port_closure",
            DisruptionCategory::PoliticalUnrest => "political_unrest",
            DisruptionCategory::CarrierStrike => "carrier_strike",
            DisruptionCategory::InfrastructureFailure => "infrastructure_failure",
            DisruptionCategory::WeatherEvent => "weather_event",
            DisruptionCategory::BorderDelay => "border_delay",
            DisruptionCategory::FuelSpike => "fuel_spike",
            DisruptionCategory::Unknown => "unknown",
            DisruptionCategory::Other => "other",
        }
    }

    pub fn base_score(&self) -> f64 {
        match self {
            DisruptionCategory::PortClosure => 30.0,
            DisruptionCategory::PoliticalUnrest => 28.0,
            DisruptionCategory::CarrierStrike => 25.0,
            DisruptionCategory::InfrastructureFailure => 22.0,
            DisruptionCategory::WeatherEvent => 20.0,
            DisruptionCategory::BorderDelay => 18.0,
            DisruptionCategory::FuelSpike => 15.0,
            DisruptionCategory::Unknown => 10.0,
            DisruptionCategory::Other => 15.0,
        }
    }
}

/// The disruption record as seen through a shipment link. Fields are loose
/// strings because scenario-synthesized disruptions and stored ones use
/// different vocabularies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisruptionDetails {
    #[serde(rename = "type")]
    pub category: Option<String>,
    pub severity: Option<String>,
    pub status: Option<String>,
}

/// One (shipment, disruption) pairing handed to the scorer.
///
/// `disruption` is the nested record; pairings without it, or whose record
/// has no category or severity, are skipped by `enhanced_shipment_risk`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisruptionInput {
    pub disruption: Option<DisruptionDetails>,
    pub impact_delay_hours: Option<f64>,
    pub reroute_needed: Option<bool>,
    pub extra_cost: Option<f64>,
}

impl DisruptionInput {
    pub fn new(category: &str, severity: &str, status: &str) -> Self {
        Self {
            disruption: Some(DisruptionDetails {
                category: Some(category.to_string()),
                severity: Some(severity.to_string()),
                status: Some(status.to_string()),
            }),
            ..Self::default()
        }
    }

    pub fn with_impact(mut self, delay_hours: f64, reroute_needed: bool, extra_cost: f64) -> Self {
        self.impact_delay_hours = Some(delay_hours);
        self.reroute_needed = Some(reroute_needed);
        self.extra_cost = Some(extra_cost);
        self
    }

    /// Whether the nested record carries a category and a severity.
    pub fn is_complete(&self) -> bool {
        fn present(field: &Option<String>) -> bool {
            field.as_deref().is_some_and(|s| !s.trim().is_empty())
        }
        self.disruption
            .as_ref()
            .is_some_and(|d| present(&d.category) && present(&d.severity))
    }

    pub fn is_active(&self) -> bool {
        self.disruption
            .as_ref()
            .and_then(|d| d.status.as_deref())
            .and_then(|s| s.parse::<DisruptionStatus>().ok())
            == Some(DisruptionStatus::Active)
    }
}

impl From<&LinkedDisruption> for DisruptionInput {
    fn from(linked: &LinkedDisruption) -> Self {
        Self {
            disruption: linked.disruption.as_ref().map(|d| DisruptionDetails {
                category: Some(d.event_type.as_str().to_string()),
                severity: Some(d.severity.as_str().to_string()),
                status: Some(d.status.as_str().to_string()),
            }),
            impact_delay_hours: Some(linked.link.impact_delay_hours),
            reroute_needed: Some(linked.link.reroute_needed),
            extra_cost: Some(linked.link.extra_cost),
        }
    }
}

// Missing or unrecognised severity scores as `low`.
fn severity_score(raw: Option<&str>) -> f64 {
    match raw.and_then(|s| s.parse::<Severity>().ok()) {
        Some(Severity::Critical) => 25.0,
        Some(Severity::High) => 20.0,
        Some(Severity::Medium) => 15.0,
        Some(Severity::Low) | None => 10.0,
    }
}

// Missing or unrecognised status contributes nothing.
fn status_score(raw: Option<&str>) -> f64 {
    match raw.and_then(|s| s.parse::<DisruptionStatus>().ok()) {
        Some(DisruptionStatus::Active) => 20.0,
        Some(DisruptionStatus::Monitoring) => 10.0,
        Some(DisruptionStatus::Resolved) | None => 0.0,
    }
}

fn impact_hours_band(hours: f64) -> f64 {
    if hours > 72.0 {
        20.0
    } else if hours > 48.0 {
        15.0
    } else if hours > 24.0 {
        10.0
    } else if hours > 0.0 {
        5.0
    } else {
        0.0
    }
}

fn extra_cost_band(cost: f64) -> f64 {
    if cost > 5_000.0 {
        10.0
    } else if cost > 1_000.0 {
        5.0
    } else {
        0.0
    }
}

/// Score one disruption pairing, reporting whether the fallback was used.
pub fn disruption_risk_scored(input: &DisruptionInput) -> Scored {
    let hours = input.impact_delay_hours.unwrap_or(0.0);
    let cost = input.extra_cost.unwrap_or(0.0);
    if !hours.is_finite() || !cost.is_finite() {
        let scored = Scored::Fallback {
            value: DISRUPTION_FALLBACK_SCORE,
            reason: "non-finite impact fields",
        };
        if let Some(cause) = scored.cause() {
            warn!(
                impact_delay_hours = hours,
                extra_cost = cost,
                error = %cause,
                "Using fallback disruption score"
            );
        }
        return scored;
    }

    let details = input.disruption.clone().unwrap_or_default();
    let raw = DisruptionCategory::parse(details.category.as_deref()).base_score()
        + severity_score(details.severity.as_deref())
        + status_score(details.status.as_deref())
        + impact_hours_band(hours)
        + if input.reroute_needed.unwrap_or(false) { 15.0 } else { 0.0 }
        + extra_cost_band(cost);

    Scored::Computed {
        value: clamp_score(raw),
    }
}

/// Risk contributed by one disruption pairing, in [0, 100]. Never fails.
pub fn disruption_risk(input: &DisruptionInput) -> f64 {
    disruption_risk_scored(input).value()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worst_case_port_closure_caps_at_hundred() {
        let input = DisruptionInput::new("port_closure", "critical", "active").with_impact(80.0, true, 6000.0);
        // 30 + 25 + 20 + 20 + 15 + 10 = 120
        assert_eq!(disruption_risk(&input), 100.0);
    }

    #[test]
    fn monitoring_weather_event_sums_components() {
        let input = DisruptionInput::new("weather_event", "medium", "monitoring").with_impact(30.0, false, 1500.0);
        // 20 + 15 + 10 + 10 + 0 + 5
        assert_eq!(disruption_risk(&input), 60.0);
    }

    #[test]
    fn event_types_alias_onto_categories() {
        assert_eq!(DisruptionCategory::parse(Some("strike")), DisruptionCategory::CarrierStrike);
        assert_eq!(DisruptionCategory::parse(Some("Weather")), DisruptionCategory::WeatherEvent);
        assert_eq!(DisruptionCategory::parse(Some("geopolitical")), DisruptionCategory::PoliticalUnrest);
        assert_eq!(DisruptionCategory::parse(Some("congestion")), DisruptionCategory::Other);
        assert_eq!(DisruptionCategory::parse(None), DisruptionCategory::Unknown);
        assert_eq!(DisruptionCategory::parse(Some("  ")), DisruptionCategory::Unknown);
    }

    #[test]
    fn empty_input_defaults_safely() {
        // unknown 10 + low 10 + no status 0
        assert_eq!(disruption_risk(&DisruptionInput::default()), 20.0);
    }

    #[test]
    fn garbage_fields_default_safely() {
        let input = DisruptionInput::new("meteor", "apocalyptic", "pending");
        // other 15 + low 10 + 0
        assert_eq!(disruption_risk(&input), 25.0);
    }

    #[test]
    fn non_finite_impact_uses_fallback() {
        let input = DisruptionInput::new("port_closure", "high", "active").with_impact(f64::NAN, false, 0.0);
        let scored = disruption_risk_scored(&input);
        assert!(scored.is_fallback());
        assert_eq!(scored.value(), DISRUPTION_FALLBACK_SCORE);
        assert!(matches!(
            scored.cause(),
            Some(supplysignal_common::SupplySignalError::UnexpectedComputation(_))
        ));
    }

    #[test]
    fn impact_bands() {
        assert_eq!(impact_hours_band(0.0), 0.0);
        assert_eq!(impact_hours_band(0.5), 5.0);
        assert_eq!(impact_hours_band(25.0), 10.0);
        assert_eq!(impact_hours_band(49.0), 15.0);
        assert_eq!(impact_hours_band(73.0), 20.0);
        assert_eq!(extra_cost_band(1000.0), 0.0);
        assert_eq!(extra_cost_band(1000.01), 5.0);
        assert_eq!(extra_cost_band(5000.01), 10.0);
    }

    #[test]
    fn all_inputs_stay_in_bounds() {
        let categories = [None, Some("port_closure"), Some("fuel_spike"), Some("???")];
        let severities = [None, Some("critical"), Some("low"), Some("bogus")];
        let statuses = [None, Some("active"), Some("resolved"), Some("bogus")];
        let hours = [None, Some(-10.0), Some(0.0), Some(100.0), Some(f64::INFINITY)];
        let costs = [None, Some(-1.0), Some(2_000.0), Some(1e12), Some(f64::NAN)];
        for c in categories {
            for s in severities {
                for st in statuses {
                    for h in hours {
                        for cost in costs {
                            for reroute in [None, Some(true), Some(false)] {
                                let input = DisruptionInput {
                                    disruption: Some(DisruptionDetails {
                                        category: c.map(String::from),
                                        severity: s.map(String::from),
                                        status: st.map(String::from),
                                    }),
                                    impact_delay_hours: h,
                                    reroute_needed: reroute,
                                    extra_cost: cost,
                                };
                                let v = disruption_risk(&input);
                                assert!((0.0..=100.0).contains(&v));
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn is_active_reads_nested_status() {
        assert!(DisruptionInput::new("x", "low", "active").is_active());
        assert!(!DisruptionInput::new("x", "low", "resolved").is_active());
        assert!(!DisruptionInput::default().is_active());
    }
}
