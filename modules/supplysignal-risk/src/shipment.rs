use serde::Serialize;
use tracing::{debug, warn};

use supplysignal_common::{Route, SupplySignalError};

use crate::disruption::{disruption_risk, DisruptionInput};
use crate::policy::{RiskLevel, RiskLevelPolicy};
use crate::route::{route_factors, route_risk, RouteFactors};
use crate::scored::clamp_score;

/// Mean risk over a shipment's route legs. Zero when it has none.
pub fn shipment_risk(routes: &[Route]) -> f64 {
    if routes.is_empty() {
        return 0.0;
    }
    let sum: f64 = routes.iter().map(route_risk).sum();
    clamp_score(sum / routes.len() as f64)
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskBreakdown {
    pub transport_mode: f64,
    pub travel_time: f64,
    pub cost: f64,
    pub location_type: f64,
    pub disruption_impact: f64,
}

/// Aggregated risk for one shipment. Derived on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskScore {
    pub base_risk: f64,
    pub disruption_risk: f64,
    pub total_risk: f64,
    pub risk_level: RiskLevel,
    pub disruption_count: usize,
    pub active_disruptions: usize,
    pub breakdown: RiskBreakdown,
    /// Set when the combined score could not be computed and only the
    /// route-based risk is reported.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub fallback: bool,
}

fn mean_factors(routes: &[Route]) -> RouteFactors {
    if routes.is_empty() {
        return RouteFactors::default();
    }
    let n = routes.len() as f64;
    let sum = routes
        .iter()
        .map(route_factors)
        .fold(RouteFactors::default(), |acc, f| RouteFactors {
            transport_mode: acc.transport_mode + f.transport_mode,
            travel_time: acc.travel_time + f.travel_time,
            cost: acc.cost + f.cost,
            location_type: acc.location_type + f.location_type,
        });
    RouteFactors {
        transport_mode: sum.transport_mode / n,
        travel_time: sum.travel_time / n,
        cost: sum.cost / n,
        location_type: sum.location_type / n,
    }
}

fn base_only(base_risk: f64, factors: RouteFactors, fallback: bool) -> RiskScore {
    RiskScore {
        base_risk,
        disruption_risk: 0.0,
        total_risk: base_risk,
        risk_level: RiskLevelPolicy::ASSESSMENT.level(base_risk),
        disruption_count: 0,
        active_disruptions: 0,
        breakdown: RiskBreakdown {
            transport_mode: factors.transport_mode,
            travel_time: factors.travel_time,
            cost: factors.cost,
            location_type: factors.location_type,
            disruption_impact: 0.0,
        },
        fallback,
    }
}

/// Combine route risk with the disruptions linked to the shipment.
///
/// Pairings without a nested disruption record, or whose record lacks a
/// category or severity, are skipped and not counted.
/// With no valid disruptions the result is exactly `shipment_risk(routes)`;
/// otherwise `total = round(base * 0.4 + disruption * 0.6)`.
pub fn enhanced_shipment_risk(routes: &[Route], disruptions: &[DisruptionInput]) -> RiskScore {
    let base_risk = shipment_risk(routes);
    let factors = mean_factors(routes);

    let valid: Vec<&DisruptionInput> = disruptions
        .iter()
        .filter(|d| {
            if d.disruption.is_none() {
                debug!("Skipping disruption link without a disruption record");
                return false;
            }
            if !d.is_complete() {
                debug!("Skipping disruption record without category or severity");
                return false;
            }
            true
        })
        .collect();

    if valid.is_empty() {
        return base_only(base_risk, factors, false);
    }

    let disruption_mean =
        valid.iter().map(|d| disruption_risk(d)).sum::<f64>() / valid.len() as f64;
    let combined = (base_risk * 0.4 + disruption_mean * 0.6).round();
    if !combined.is_finite() || !disruption_mean.is_finite() {
        let cause = SupplySignalError::UnexpectedComputation(format!(
            "combined risk from base {base_risk} and disruption mean {disruption_mean}"
        ));
        warn!(error = %cause, "Reporting base risk only");
        return base_only(base_risk, factors, true);
    }

    let total_risk = clamp_score(combined);
    RiskScore {
        base_risk,
        disruption_risk: disruption_mean,
        total_risk,
        risk_level: RiskLevelPolicy::ASSESSMENT.level(total_risk),
        disruption_count: valid.len(),
        active_disruptions: valid.iter().filter(|d| d.is_active()).count(),
        breakdown: RiskBreakdown {
            transport_mode: factors.transport_mode,
            travel_time: factors.travel_time,
            cost: factors.cost,
            location_type: factors.location_type,
            disruption_impact: disruption_mean,
        },
        fallback: false,
    }
}
