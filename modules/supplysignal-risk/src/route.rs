use serde::Serialize;

use supplysignal_common::{LocationType, Route, TransportMode};

use crate::scored::clamp_score;

/// Per-factor contributions to a single route's risk.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteFactors {
    pub transport_mode: f64,
    pub travel_time: f64,
    pub cost: f64,
    pub location_type: f64,
}

impl RouteFactors {
    pub fn total(&self) -> f64 {
        self.transport_mode + self.travel_time + self.cost + self.location_type
    }
}

fn mode_base(mode: TransportMode) -> f64 {
    match mode {
        TransportMode::Sea => 25.0,
        TransportMode::Road => 20.0,
        TransportMode::Air => 15.0,
        TransportMode::Rail => 10.0,
        TransportMode::Other => 15.0,
    }
}

fn travel_time_band(hours: f64) -> f64 {
    if hours > 72.0 {
        20.0
    } else if hours > 48.0 {
        15.0
    } else if hours > 24.0 {
        10.0
    } else {
        0.0
    }
}

// Expensive legs tend to be premium services; very cheap ones are the
// fragile end of the market.
fn cost_adjustment(cost: f64) -> f64 {
    if cost > 10_000.0 {
        -10.0
    } else if cost < 1_000.0 {
        10.0
    } else {
        0.0
    }
}

fn endpoint_adjustment(route: &Route) -> f64 {
    let mut adj = 0.0;
    if route.touches(LocationType::Port) {
        adj += 5.0;
    }
    if route.touches(LocationType::Warehouse) {
        adj -= 5.0;
    }
    adj
}

pub fn route_factors(route: &Route) -> RouteFactors {
    RouteFactors {
        transport_mode: mode_base(route.mode),
        travel_time: travel_time_band(route.travel_time_est),
        cost: cost_adjustment(route.cost_est),
        location_type: endpoint_adjustment(route),
    }
}

/// Risk of one route leg, in [0, 100].
pub fn route_risk(route: &Route) -> f64 {
    clamp_score(route_factors(route).total())
}
