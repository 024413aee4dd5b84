use std::collections::HashSet;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use supplysignal_risk::RiskLevel;

use super::assessment::AssessmentSummary;
use super::simulation::SimulationResult;
use super::{Capability, RECOMMENDATION, RISK_ASSESSMENT};
use crate::context::WorkflowContext;
use crate::error::{OrchestratorError, OrchestratorResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipment_id: Option<Uuid>,
    pub priority: Priority,
    pub category: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_cost_impact: Option<f64>,
}

impl Recommendation {
    fn new(priority: Priority, category: &str, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            shipment_id: None,
            priority,
            category: category.to_string(),
            title: title.into(),
            description: description.into(),
            estimated_cost_impact: None,
        }
    }

    fn for_shipment(mut self, shipment_id: Uuid) -> Self {
        self.shipment_id = Some(shipment_id);
        self
    }

    fn with_cost(mut self, cost: f64) -> Self {
        self.estimated_cost_impact = Some(cost);
        self
    }
}

fn from_assessment(summary: &AssessmentSummary, out: &mut Vec<Recommendation>) {
    for a in &summary.assessments {
        match a.score.risk_level {
            RiskLevel::High if a.score.active_disruptions > 0 => out.push(
                Recommendation::new(
                    Priority::High,
                    "reroute",
                    format!("Reroute {}", a.reference),
                    format!(
                        "Risk {:.0} with {} active disruption(s); move to an unaffected route",
                        a.score.total_risk, a.score.active_disruptions
                    ),
                )
                .for_shipment(a.shipment_id),
            ),
            RiskLevel::High => out.push(
                Recommendation::new(
                    Priority::High,
                    "alternative_carrier",
                    format!("Review carrier for {}", a.reference),
                    format!(
                        "Route risk {:.0} is high without active disruptions; consider a lower-risk mode or carrier",
                        a.score.total_risk
                    ),
                )
                .for_shipment(a.shipment_id),
            ),
            RiskLevel::Medium => {
                out.push(
                    Recommendation::new(
                        Priority::Medium,
                        "monitor",
                        format!("Monitor {}", a.reference),
                        format!("Risk {:.0}; track for escalation", a.score.total_risk),
                    )
                    .for_shipment(a.shipment_id),
                );
                if a.score.disruption_count > 0 {
                    out.push(
                        Recommendation::new(
                            Priority::Medium,
                            "buffer_stock",
                            format!("Add buffer stock for {}", a.reference),
                            "Linked disruptions may delay delivery; hold safety stock downstream",
                        )
                        .for_shipment(a.shipment_id),
                    );
                }
            }
            RiskLevel::Low => {}
        }
    }
}

fn from_simulation(sim: &SimulationResult, out: &mut Vec<Recommendation>) {
    for impact in sim.impacts.iter().filter(|i| i.reroute_needed) {
        out.push(
            Recommendation::new(
                Priority::High,
                "reroute",
                format!("Prepare reroute for {}", impact.reference),
                format!(
                    "Under {} this shipment is delayed {:.0}h and needs rerouting",
                    sim.scenario, impact.delay_hours
                ),
            )
            .for_shipment(impact.shipment_id)
            .with_cost(impact.extra_cost),
        );
    }
    if sim.impacts.is_empty() {
        return;
    }

    let (category, title) = match sim.params.category.as_str() {
        "port_closure" => ("diversify_ports", "Qualify alternative ports"),
        "weather_event" => ("adjust_schedules", "Adjust sailing schedules"),
        "political_unrest" => ("diversify_suppliers", "Diversify supplier regions"),
        _ => ("contingency_plan", "Prepare a contingency plan"),
    };
    let priority = if sim.params.reroute_needed() {
        Priority::High
    } else {
        Priority::Medium
    };
    out.push(
        Recommendation::new(
            priority,
            category,
            title,
            format!(
                "{} would affect {} of {} shipments, adding {:.0}h of delay in total",
                sim.scenario,
                sim.impacts.len(),
                sim.shipments_evaluated,
                sim.total_delay_hours
            ),
        )
        .with_cost(sim.total_extra_cost),
    );
}

/// Recommendations from the current assessment and every simulation in the
/// context. One entry per (category, shipment); highest priority first.
pub fn recommend(assessment: Option<&AssessmentSummary>, simulations: &[SimulationResult]) -> Vec<Recommendation> {
    let mut all = Vec::new();
    if let Some(summary) = assessment {
        from_assessment(summary, &mut all);
    }
    for sim in simulations {
        from_simulation(sim, &mut all);
    }

    let mut seen = HashSet::new();
    all.retain(|r| seen.insert((r.category.clone(), r.shipment_id)));
    // stable, so generation order survives within a priority
    all.sort_by(|a, b| b.priority.cmp(&a.priority));
    all
}

/// Input is ignored. Needs an assessment or at least one simulation.
pub struct RecommendationEngine;

#[async_trait]
impl Capability for RecommendationEngine {
    fn name(&self) -> &'static str {
        RECOMMENDATION
    }

    async fn execute(&self, _input: &Value, ctx: &mut WorkflowContext) -> OrchestratorResult<Value> {
        if ctx.assessment.is_none() && ctx.simulations.is_empty() {
            return Err(OrchestratorError::MissingPrerequisite {
                capability: RECOMMENDATION,
                requires: RISK_ASSESSMENT,
            });
        }

        let recommendations = recommend(ctx.assessment.as_ref(), &ctx.simulations);
        let high = recommendations
            .iter()
            .filter(|r| r.priority == Priority::High)
            .count();
        info!(total = recommendations.len(), high, "Recommendations generated");

        let output = json!({
            "recommendations": recommendations.len(),
            "highPriority": high,
        });
        ctx.recommendations = recommendations;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::assessment::assess;
    use crate::capabilities::collection::ShipmentSnapshot;
    use crate::capabilities::simulation::{simulate, Scenario};
    use supplysignal_common::{LocationType, Route, Shipment, TransportMode};
    use supplysignal_risk::DisruptionInput;

    fn snapshot(reference: &str, mode: TransportMode, hours: f64, disruptions: Vec<DisruptionInput>) -> ShipmentSnapshot {
        let id = Uuid::new_v4();
        ShipmentSnapshot {
            shipment: Shipment {
                id,
                reference: reference.into(),
                status: "in_transit".into(),
            },
            routes: vec![Route {
                shipment_id: id,
                mode,
                travel_time_est: hours,
                cost_est: 500.0,
                from_location_type: LocationType::Port,
                to_location_type: LocationType::Customer,
                sequence_number: 1,
            }],
            disruptions,
        }
    }

    #[test]
    fn high_risk_with_active_disruption_is_rerouted() {
        let strike = DisruptionInput::new("carrier_strike", "critical", "active").with_impact(80.0, true, 6_000.0);
        let fleet = vec![
            snapshot("HOT", TransportMode::Sea, 80.0, vec![strike]),
            snapshot("CALM", TransportMode::Rail, 5.0, Vec::new()),
        ];
        let recs = recommend(Some(&assess(&fleet, None)), &[]);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].category, "reroute");
        assert_eq!(recs[0].priority, Priority::High);
        assert_eq!(recs[0].shipment_id, Some(fleet[0].shipment.id));
    }

    #[test]
    fn medium_risk_with_disruption_adds_buffer_stock() {
        let watch = DisruptionInput::new("fuel_spike", "low", "monitoring");
        // base 60, disruption 15 + 10 + 10 = 35, blended round(24 + 21) = 45
        let fleet = vec![snapshot("MID", TransportMode::Sea, 80.0, vec![watch])];
        let recs = recommend(Some(&assess(&fleet, None)), &[]);
        let categories: Vec<_> = recs.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(categories, vec!["monitor", "buffer_stock"]);
    }

    #[test]
    fn scenario_reroutes_are_deduplicated_per_shipment() {
        let fleet = vec![snapshot("SEA", TransportMode::Sea, 80.0, Vec::new())];
        let sims = vec![
            simulate(&Scenario::PortClosure, &fleet),
            simulate(&Scenario::GeopoliticalCrisis, &fleet),
        ];
        let assessment = assess(&fleet, sims.first());
        let recs = recommend(Some(&assessment), &sims);

        let reroutes = recs.iter().filter(|r| r.category == "reroute").count();
        assert_eq!(reroutes, 1);
        assert!(recs.iter().any(|r| r.category == "diversify_ports"));
        assert!(recs.iter().any(|r| r.category == "diversify_suppliers"));
        assert!(recs.windows(2).all(|w| w[0].priority >= w[1].priority));
    }

    #[test]
    fn weather_scenario_adjusts_schedules_without_reroute() {
        let fleet = vec![snapshot("SEA", TransportMode::Sea, 10.0, Vec::new())];
        let sim = simulate(&Scenario::WeatherEvent, &fleet);
        let recs = recommend(None, std::slice::from_ref(&sim));
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].category, "adjust_schedules");
        assert_eq!(recs[0].priority, Priority::Medium);
        assert_eq!(recs[0].estimated_cost_impact, Some(1_200.0));
    }

    #[tokio::test]
    async fn needs_assessment_or_simulation() {
        let mut ctx = WorkflowContext::default();
        let err = RecommendationEngine.execute(&json!({}), &mut ctx).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::MissingPrerequisite { .. }));
    }
}
