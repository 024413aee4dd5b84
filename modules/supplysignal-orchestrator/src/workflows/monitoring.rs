use serde::Serialize;
use uuid::Uuid;

use supplysignal_common::{CongestionLevel, Severity};

use crate::capabilities::assessment::AssessmentSummary;
use crate::capabilities::collection::CollectedData;

/// Weather readings at or above this level raise an alert.
pub const WEATHER_ALERT_MIN_RISK: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    HighRiskShipment,
    SevereWeather,
    PortCongestion,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub severity: Severity,
    pub message: String,
    pub actionable: bool,
}

impl Alert {
    fn new(alert_type: AlertType, severity: Severity, message: String, actionable: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            alert_type,
            severity,
            message,
            actionable,
        }
    }
}

/// Threshold rules over a fresh snapshot: every high-risk shipment, every
/// weather location at risk level 4 or more, every highly congested port.
pub fn derive_alerts(data: &CollectedData, assessment: &AssessmentSummary) -> Vec<Alert> {
    let mut alerts = Vec::new();

    for a in assessment.high_risk_shipments() {
        alerts.push(Alert::new(
            AlertType::HighRiskShipment,
            Severity::High,
            format!(
                "Shipment {} at risk {:.0} ({} active disruption(s))",
                a.reference, a.score.total_risk, a.score.active_disruptions
            ),
            true,
        ));
    }

    for w in data.weather.iter().filter(|w| w.risk_level >= WEATHER_ALERT_MIN_RISK) {
        let severity = if w.risk_level >= 5 {
            Severity::Critical
        } else {
            Severity::High
        };
        alerts.push(Alert::new(
            AlertType::SevereWeather,
            severity,
            format!(
                "{} weather risk {} ({}, wind {:.0} m/s)",
                w.location, w.risk_level, w.conditions, w.wind_speed
            ),
            false,
        ));
    }

    for hub in data
        .hubs
        .iter()
        .filter(|h| h.congestion_level == CongestionLevel::High)
    {
        alerts.push(Alert::new(
            AlertType::PortCongestion,
            Severity::High,
            format!("{} ({}) is {}", hub.name, hub.code, hub.status),
            true,
        ));
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::assessment::assess;
    use crate::capabilities::collection::ShipmentSnapshot;
    use chrono::Utc;
    use supplysignal_common::{LocationType, PortHub, Route, Shipment, TransportMode, WeatherSignal};
    use supplysignal_risk::DisruptionInput;

    fn weather(location: &str, risk_level: u8) -> WeatherSignal {
        WeatherSignal {
            location: location.into(),
            temperature: 20.0,
            humidity: 80.0,
            wind_speed: 18.0,
            conditions: "Thunderstorm".into(),
            risk_level,
        }
    }

    fn hub(name: &str, congestion_level: CongestionLevel) -> PortHub {
        PortHub {
            id: Uuid::new_v4(),
            name: name.into(),
            code: name[..3].to_uppercase(),
            country: "XX".into(),
            status: "congested".into(),
            congestion_level,
        }
    }

    fn hot_shipment() -> ShipmentSnapshot {
        let id = Uuid::new_v4();
        ShipmentSnapshot {
            shipment: Shipment {
                id,
                reference: "HOT-1".into(),
                status: "in_transit".into(),
            },
            routes: vec![Route {
                shipment_id: id,
                mode: TransportMode::Sea,
                travel_time_est: 80.0,
                cost_est: 500.0,
                from_location_type: LocationType::Port,
                to_location_type: LocationType::Customer,
                sequence_number: 1,
            }],
            disruptions: vec![DisruptionInput::new("port_closure", "critical", "active")
                .with_impact(80.0, true, 6_000.0)],
        }
    }

    #[test]
    fn each_rule_fires_independently() {
        let data = CollectedData {
            shipments: vec![hot_shipment()],
            active_disruptions: Vec::new(),
            hubs: vec![hub("Shanghai", CongestionLevel::High), hub("Rotterdam", CongestionLevel::Low)],
            weather: vec![weather("Busan", 5), weather("Dubai", 4), weather("Hamburg", 3)],
            collected_at: Utc::now(),
        };
        let assessment = assess(&data.shipments, None);
        let alerts = derive_alerts(&data, &assessment);

        let types: Vec<_> = alerts.iter().map(|a| a.alert_type).collect();
        assert_eq!(
            types,
            vec![
                AlertType::HighRiskShipment,
                AlertType::SevereWeather,
                AlertType::SevereWeather,
                AlertType::PortCongestion,
            ]
        );
        assert_eq!(alerts[1].severity, Severity::Critical);
        assert_eq!(alerts[2].severity, Severity::High);
        assert!(alerts[0].actionable && alerts[3].actionable);
        assert!(!alerts[1].actionable);
    }

    #[test]
    fn quiet_snapshot_has_no_alerts() {
        let data = CollectedData {
            shipments: Vec::new(),
            active_disruptions: Vec::new(),
            hubs: vec![hub("Rotterdam", CongestionLevel::Medium)],
            weather: vec![weather("Hamburg", 2)],
            collected_at: Utc::now(),
        };
        assert!(derive_alerts(&data, &assess(&[], None)).is_empty());
    }
}
