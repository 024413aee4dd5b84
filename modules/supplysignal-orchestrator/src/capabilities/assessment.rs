use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use supplysignal_risk::{enhanced_shipment_risk, RiskLevel, RiskLevelPolicy, RiskScore};

use super::collection::ShipmentSnapshot;
use super::simulation::SimulationResult;
use super::{field, Capability, DATA_COLLECTION, RISK_ASSESSMENT, SCENARIO_SIMULATION};
use crate::context::WorkflowContext;
use crate::error::{OrchestratorError, OrchestratorResult};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentAssessment {
    pub shipment_id: Uuid,
    pub reference: String,
    pub score: RiskScore,
    /// Level under the display policy, for dashboards.
    pub display_level: RiskLevel,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentSummary {
    pub assessments: Vec<ShipmentAssessment>,
    pub average_risk: f64,
    pub overall_level: RiskLevel,
    pub high_risk: usize,
    pub medium_risk: usize,
    pub low_risk: usize,
    /// Scenario whose synthesized disruptions were included, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
}

impl AssessmentSummary {
    pub fn high_risk_shipments(&self) -> impl Iterator<Item = &ShipmentAssessment> {
        self.assessments
            .iter()
            .filter(|a| a.score.risk_level == RiskLevel::High)
    }
}

/// Score every shipment, optionally adding one scenario's synthesized
/// disruptions to the ones already linked.
pub fn assess(shipments: &[ShipmentSnapshot], scenario: Option<&SimulationResult>) -> AssessmentSummary {
    let assessments: Vec<ShipmentAssessment> = shipments
        .iter()
        .map(|s| {
            let mut disruptions = s.disruptions.clone();
            if let Some(extra) = scenario.and_then(|sim| sim.disruption_for(s.shipment.id)) {
                disruptions.push(extra);
            }
            let score = enhanced_shipment_risk(&s.routes, &disruptions);
            ShipmentAssessment {
                shipment_id: s.shipment.id,
                reference: s.shipment.reference.clone(),
                display_level: RiskLevelPolicy::DISPLAY.level(score.total_risk),
                score,
            }
        })
        .collect();

    let average_risk = if assessments.is_empty() {
        0.0
    } else {
        assessments.iter().map(|a| a.score.total_risk).sum::<f64>() / assessments.len() as f64
    };
    let count = |level: RiskLevel| {
        assessments
            .iter()
            .filter(|a| a.score.risk_level == level)
            .count()
    };

    AssessmentSummary {
        high_risk: count(RiskLevel::High),
        medium_risk: count(RiskLevel::Medium),
        low_risk: count(RiskLevel::Low),
        overall_level: RiskLevelPolicy::ASSESSMENT.level(average_risk),
        average_risk,
        scenario: scenario.map(|s| s.scenario.clone()),
        assessments,
    }
}

/// Input: `{"useScenario": bool?}`. With `useScenario`, the most recent
/// simulation in the context is folded into every score.
pub struct RiskAssessment;

#[async_trait]
impl Capability for RiskAssessment {
    fn name(&self) -> &'static str {
        RISK_ASSESSMENT
    }

    async fn execute(&self, input: &Value, ctx: &mut WorkflowContext) -> OrchestratorResult<Value> {
        let use_scenario: bool = field(input, "useScenario")?.unwrap_or(false);
        let data = ctx
            .collected
            .as_ref()
            .ok_or(OrchestratorError::MissingPrerequisite {
                capability: RISK_ASSESSMENT,
                requires: DATA_COLLECTION,
            })?;
        let scenario = if use_scenario {
            Some(ctx.simulations.last().ok_or(OrchestratorError::MissingPrerequisite {
                capability: RISK_ASSESSMENT,
                requires: SCENARIO_SIMULATION,
            })?)
        } else {
            None
        };

        let summary = assess(&data.shipments, scenario);
        info!(
            shipments = summary.assessments.len(),
            average_risk = summary.average_risk,
            overall = %summary.overall_level,
            high = summary.high_risk,
            "Risk assessed"
        );
        let output = json!({
            "shipmentsAssessed": summary.assessments.len(),
            "averageRisk": summary.average_risk,
            "overallLevel": summary.overall_level,
            "highRisk": summary.high_risk,
            "mediumRisk": summary.medium_risk,
            "lowRisk": summary.low_risk,
        });
        ctx.assessment = Some(summary);
        Ok(output)
    }
}
