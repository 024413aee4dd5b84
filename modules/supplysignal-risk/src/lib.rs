//! Pure risk scoring over routes and linked disruptions.
//!
//! Every public scorer returns a value in [0, 100]. Inputs that cannot be
//! scored (non-finite numbers) produce a documented fallback instead of an
//! error; the `Scored` variants say which one you got.

pub mod disruption;
pub mod policy;
pub mod route;
pub mod scored;
pub mod shipment;

pub use disruption::{
    disruption_risk, disruption_risk_scored, DisruptionCategory, DisruptionDetails,
    DisruptionInput, DISRUPTION_FALLBACK_SCORE,
};
pub use policy::{RiskLevel, RiskLevelPolicy};
pub use route::{route_factors, route_risk, RouteFactors};
pub use scored::{clamp_score, Scored};
pub use shipment::{enhanced_shipment_risk, shipment_risk, RiskBreakdown, RiskScore};
