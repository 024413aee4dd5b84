use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- Enums ---

/// Error returned when a string does not name a variant of a closed enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

macro_rules! closed_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Strike,
    Weather,
    Congestion,
    Geopolitical,
    Technical,
    Other,
}

closed_enum!(EventType, "event type", {
    Strike => "strike",
    Weather => "weather",
    Congestion => "congestion",
    Geopolitical => "geopolitical",
    Technical => "technical",
    Other => "other",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LocationType {
    Port,
    Warehouse,
    Route,
    Supplier,
    Customer,
}

closed_enum!(LocationType, "location type", {
    Port => "port",
    Warehouse => "warehouse",
    Route => "route",
    Supplier => "supplier",
    Customer => "customer",
});

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

closed_enum!(Severity, "severity", {
    Low => "low",
    Medium => "medium",
    High => "high",
    Critical => "critical",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DisruptionStatus {
    Active,
    Monitoring,
    Resolved,
}

closed_enum!(DisruptionStatus, "disruption status", {
    Active => "active",
    Monitoring => "monitoring",
    Resolved => "resolved",
});

impl DisruptionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DisruptionStatus::Resolved)
    }
}

/// Transport mode of a route leg. Unrecognised modes deserialize to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    Sea,
    Air,
    Road,
    Rail,
    #[serde(other)]
    Other,
}

closed_enum!(TransportMode, "transport mode", {
    Sea => "sea",
    Air => "air",
    Road => "road",
    Rail => "rail",
    Other => "other",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CongestionLevel {
    Low,
    Medium,
    High,
}

closed_enum!(CongestionLevel, "congestion level", {
    Low => "low",
    Medium => "medium",
    High => "high",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VesselStatus {
    Berthed,
    Anchored,
    Departed,
    InTransit,
}

closed_enum!(VesselStatus, "vessel status", {
    Berthed => "berthed",
    Anchored => "anchored",
    Departed => "departed",
    InTransit => "in_transit",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    News,
    Weather,
    Shipping,
}

closed_enum!(SignalKind, "signal kind", {
    News => "news",
    Weather => "weather",
    Shipping => "shipping",
});

// --- Raw Signals ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsSignal {
    pub title: String,
    pub description: Option<String>,
    pub published_at: DateTime<Utc>,
    pub url: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSignal {
    pub location: String,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Relative humidity, percent.
    pub humidity: f64,
    /// Metres per second.
    pub wind_speed: f64,
    pub conditions: String,
    /// 1 (benign) to 5 (severe).
    pub risk_level: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingSignal {
    pub vessel_id: String,
    pub location: String,
    pub status: VesselStatus,
    pub eta: DateTime<Utc>,
    pub delay_hours: f64,
}

/// One unit of raw external data. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawSignal {
    News(NewsSignal),
    Weather(WeatherSignal),
    Shipping(ShippingSignal),
}

impl RawSignal {
    pub fn kind(&self) -> SignalKind {
        match self {
            RawSignal::News(_) => SignalKind::News,
            RawSignal::Weather(_) => SignalKind::Weather,
            RawSignal::Shipping(_) => SignalKind::Shipping,
        }
    }

    /// Short human-readable label for logs.
    pub fn label(&self) -> String {
        match self {
            RawSignal::News(n) => n.title.clone(),
            RawSignal::Weather(w) => format!("{} ({})", w.location, w.conditions),
            RawSignal::Shipping(s) => format!("{} @ {}", s.vessel_id, s.location),
        }
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

// --- Processed Events ---

/// Impact of an event on one named shipment, as reported by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AffectedShipment {
    #[schemars(with = "String")]
    pub shipment_id: Uuid,
    #[serde(default)]
    pub impact_delay_hours: Option<f64>,
    #[serde(default)]
    pub reroute_needed: Option<bool>,
    #[serde(default)]
    pub extra_cost: Option<f64>,
}

/// Clamp a confidence into [0, 1]. Non-finite values collapse to 0.
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// A structured disruption extracted from exactly one raw signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedEvent {
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub location_type: LocationType,
    pub location_id: String,
    pub severity: Severity,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    confidence: f64,
    pub source: String,
    pub raw_data: serde_json::Value,
    pub affected_shipments: Option<Vec<AffectedShipment>>,
}

impl ProcessedEvent {
    pub fn new(
        event_type: EventType,
        location_type: LocationType,
        location_id: impl Into<String>,
        severity: Severity,
        description: impl Into<String>,
        source: impl Into<String>,
        raw_data: serde_json::Value,
    ) -> Self {
        Self {
            event_type,
            location_type,
            location_id: location_id.into(),
            severity,
            description: description.into(),
            start_time: Utc::now(),
            end_time: None,
            confidence: 0.5,
            source: source.into(),
            raw_data,
            affected_shipments: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = clamp_confidence(confidence);
        self
    }

    pub fn with_start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = start_time;
        self
    }

    pub fn with_end_time(mut self, end_time: Option<DateTime<Utc>>) -> Self {
        self.end_time = end_time;
        self
    }

    pub fn with_affected_shipments(mut self, shipments: Vec<AffectedShipment>) -> Self {
        self.affected_shipments = (!shipments.is_empty()).then_some(shipments);
        self
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }
}

// --- Persisted Records ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disruption {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub location_type: LocationType,
    pub location: String,
    pub severity: Severity,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: DisruptionStatus,
}

impl Disruption {
    /// A fresh active disruption built from a classified event.
    pub fn from_event(event: &ProcessedEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type: event.event_type,
            location_type: event.location_type,
            location: event.location_id.clone(),
            severity: event.severity,
            description: event.description.clone(),
            start_time: event.start_time,
            end_time: event.end_time,
            status: DisruptionStatus::Active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentDisruptionLink {
    pub shipment_id: Uuid,
    pub disruption_id: Uuid,
    pub impact_delay_hours: f64,
    pub reroute_needed: bool,
    pub extra_cost: f64,
}

impl ShipmentDisruptionLink {
    /// Absent impact fields default to 0 / false.
    pub fn from_affected(disruption_id: Uuid, affected: &AffectedShipment) -> Self {
        Self {
            shipment_id: affected.shipment_id,
            disruption_id,
            impact_delay_hours: affected.impact_delay_hours.unwrap_or(0.0),
            reroute_needed: affected.reroute_needed.unwrap_or(false),
            extra_cost: affected.extra_cost.unwrap_or(0.0),
        }
    }
}

/// A link joined with its disruption. `disruption` is `None` when the link
/// points at a record that no longer resolves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedDisruption {
    pub link: ShipmentDisruptionLink,
    pub disruption: Option<Disruption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub shipment_id: Uuid,
    pub mode: TransportMode,
    /// Hours.
    pub travel_time_est: f64,
    pub cost_est: f64,
    pub from_location_type: LocationType,
    pub to_location_type: LocationType,
    pub sequence_number: u32,
}

impl Route {
    pub fn touches(&self, location_type: LocationType) -> bool {
        self.from_location_type == location_type || self.to_location_type == location_type
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    pub id: Uuid,
    pub reference: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortHub {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub country: String,
    pub status: String,
    pub congestion_level: CongestionLevel,
}

impl PortHub {
    /// Case-insensitive substring match of `needle` against name or code, in
    /// either direction ("Port of Rotterdam" matches "rotterdam" and vice versa).
    /// A blank name or code never matches.
    pub fn matches_location(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return false;
        }
        let name = self.name.trim().to_lowercase();
        let code = self.code.trim().to_lowercase();
        let by_name = !name.is_empty() && (name.contains(&needle) || needle.contains(&name));
        by_name || (!code.is_empty() && code == needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_enums_parse_case_insensitively() {
        assert_eq!("CRITICAL".parse::<Severity>(), Ok(Severity::Critical));
        assert_eq!(" port ".parse::<LocationType>(), Ok(LocationType::Port));
        assert_eq!("in_transit".parse::<VesselStatus>(), Ok(VesselStatus::InTransit));
        assert!("volcano".parse::<EventType>().is_err());
    }

    #[test]
    fn severity_orders_low_to_critical() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn unknown_transport_mode_deserializes_to_other() {
        let mode: TransportMode = serde_json::from_str("\"pipeline\"").unwrap();
        assert_eq!(mode, TransportMode::Other);
    }

    #[test]
    fn confidence_is_clamped() {
        let event = ProcessedEvent::new(
            EventType::Strike,
            LocationType::Port,
            "Rotterdam",
            Severity::High,
            "Dock workers strike",
            "test",
            serde_json::Value::Null,
        );
        assert_eq!(event.clone().with_confidence(1.7).confidence(), 1.0);
        assert_eq!(event.clone().with_confidence(-0.3).confidence(), 0.0);
        assert_eq!(event.with_confidence(f64::NAN).confidence(), 0.0);
    }

    #[test]
    fn empty_affected_list_is_none() {
        let event = ProcessedEvent::new(
            EventType::Weather,
            LocationType::Port,
            "Shanghai",
            Severity::Medium,
            "Typhoon",
            "test",
            serde_json::Value::Null,
        )
        .with_affected_shipments(Vec::new());
        assert!(event.affected_shipments.is_none());
    }

    #[test]
    fn link_defaults_absent_impact_fields() {
        let disruption_id = Uuid::new_v4();
        let affected = AffectedShipment {
            shipment_id: Uuid::new_v4(),
            impact_delay_hours: None,
            reroute_needed: None,
            extra_cost: Some(250.0),
        };
        let link = ShipmentDisruptionLink::from_affected(disruption_id, &affected);
        assert_eq!(link.impact_delay_hours, 0.0);
        assert!(!link.reroute_needed);
        assert_eq!(link.extra_cost, 250.0);
    }

    #[test]
    fn hub_matches_location_both_directions() {
        let hub = PortHub {
            id: Uuid::new_v4(),
            name: "Rotterdam".into(),
            code: "NLRTM".into(),
            country: "NL".into(),
            status: "operational".into(),
            congestion_level: CongestionLevel::Low,
        };
        assert!(hub.matches_location("Port of Rotterdam"));
        assert!(hub.matches_location("rotter"));
        assert!(hub.matches_location("nlrtm"));
        assert!(!hub.matches_location("Hamburg"));
        assert!(!hub.matches_location("  "));
    }

    #[test]
    fn blank_hub_name_matches_nothing() {
        let hub = PortHub {
            id: Uuid::new_v4(),
            name: "   ".into(),
            code: "".into(),
            country: "NL".into(),
            status: "operational".into(),
            congestion_level: CongestionLevel::Low,
        };
        assert!(!hub.matches_location("Rotterdam"));
        assert!(!hub.matches_location("Port of Singapore"));
    }

    #[test]
    fn raw_signal_serializes_with_kind_tag() {
        let signal = RawSignal::Weather(WeatherSignal {
            location: "Singapore".into(),
            temperature: 31.0,
            humidity: 80.0,
            wind_speed: 4.0,
            conditions: "Rain".into(),
            risk_level: 2,
        });
        let value = signal.to_value();
        assert_eq!(value["kind"], "weather");
        assert_eq!(value["riskLevel"], 2);
        assert_eq!(signal.kind(), SignalKind::Weather);
    }
}
