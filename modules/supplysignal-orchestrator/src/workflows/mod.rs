// Named workflows.
//
// A workflow is planned into an ordered list of (capability, input) steps
// before anything runs. Every capability is resolved up front, so a bad step
// fails the invocation without side effects. Steps then execute strictly in
// order over one shared context, and the workflow builds its summary from
// whatever the steps left there.

pub mod monitoring;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::capabilities::assessment::AssessmentSummary;
use crate::capabilities::simulation::Scenario;
use crate::capabilities::{
    CapabilityRegistry, DATA_COLLECTION, RECOMMENDATION, RISK_ASSESSMENT, SCENARIO_SIMULATION,
};
use crate::context::WorkflowContext;
use crate::error::{OrchestratorError, OrchestratorResult};

pub use monitoring::{derive_alerts, Alert, AlertType};

pub const FULL_RISK_ASSESSMENT: &str = "full_risk_assessment";
pub const SCENARIO_SIMULATION_WORKFLOW: &str = "scenario_simulation";
pub const STRATEGIC_PLANNING: &str = "strategic_planning";
pub const REAL_TIME_MONITORING: &str = "real_time_monitoring";
pub const CUSTOM_WORKFLOW: &str = "custom_workflow";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Step {
    pub capability: String,
    #[serde(default)]
    pub input: Value,
}

impl Step {
    fn new(capability: &str, input: Value) -> Self {
        Self {
            capability: capability.to_string(),
            input,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workflow {
    FullRiskAssessment,
    ScenarioSimulation,
    StrategicPlanning,
    RealTimeMonitoring,
    Custom,
}

impl Workflow {
    pub const ALL: &'static [Workflow] = &[
        Workflow::FullRiskAssessment,
        Workflow::ScenarioSimulation,
        Workflow::StrategicPlanning,
        Workflow::RealTimeMonitoring,
        Workflow::Custom,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Workflow::FullRiskAssessment => FULL_RISK_ASSESSMENT,
            Workflow::ScenarioSimulation => SCENARIO_SIMULATION_WORKFLOW,
            Workflow::StrategicPlanning => STRATEGIC_PLANNING,
            Workflow::RealTimeMonitoring => REAL_TIME_MONITORING,
            Workflow::Custom => CUSTOM_WORKFLOW,
        }
    }

    pub fn from_name(name: &str) -> OrchestratorResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|w| w.name() == name)
            .ok_or_else(|| OrchestratorError::UnknownWorkflow(name.to_string()))
    }

    /// Expand the request input into the ordered step list.
    pub fn plan(&self, input: &Value) -> OrchestratorResult<Vec<Step>> {
        match self {
            Workflow::FullRiskAssessment => Ok(vec![
                Step::new(DATA_COLLECTION, collect_input(input, false)),
                Step::new(RISK_ASSESSMENT, json!({})),
                Step::new(RECOMMENDATION, json!({})),
            ]),
            Workflow::ScenarioSimulation => {
                let scenario = scenario_input(input)?;
                Ok(vec![
                    Step::new(DATA_COLLECTION, json!({"includeWeather": false})),
                    Step::new(SCENARIO_SIMULATION, scenario),
                    Step::new(RISK_ASSESSMENT, json!({"useScenario": true})),
                    Step::new(RECOMMENDATION, json!({})),
                ])
            }
            Workflow::StrategicPlanning => {
                let mut steps = vec![Step::new(DATA_COLLECTION, json!({"includeWeather": false}))];
                for scenario in strategic_scenarios(input)? {
                    steps.push(Step::new(SCENARIO_SIMULATION, scenario));
                }
                steps.push(Step::new(RECOMMENDATION, json!({})));
                Ok(steps)
            }
            Workflow::RealTimeMonitoring => Ok(vec![
                Step::new(DATA_COLLECTION, collect_input(input, true)),
                Step::new(RISK_ASSESSMENT, json!({})),
            ]),
            Workflow::Custom => {
                let steps: Vec<Step> = match input.get("steps") {
                    Some(v) => serde_json::from_value(v.clone())?,
                    None => return Err(OrchestratorError::InvalidInput("steps: missing".into())),
                };
                if steps.is_empty() {
                    return Err(OrchestratorError::InvalidInput("steps: empty".into()));
                }
                Ok(steps)
            }
        }
    }

    /// Result payload built from the finished context.
    pub fn summarize(&self, ctx: &WorkflowContext) -> OrchestratorResult<Value> {
        let summary = match self {
            Workflow::FullRiskAssessment => {
                let assessment = require_assessment(self.name(), ctx)?;
                json!({
                    "shipmentsAssessed": assessment.assessments.len(),
                    "averageRisk": assessment.average_risk,
                    "overallLevel": assessment.overall_level,
                    "highRisk": assessment.high_risk,
                    "mediumRisk": assessment.medium_risk,
                    "lowRisk": assessment.low_risk,
                    "recommendationCount": ctx.recommendations.len(),
                    "assessments": assessment.assessments,
                    "recommendations": ctx.recommendations,
                })
            }
            Workflow::ScenarioSimulation => json!({
                "simulation": ctx.simulations.last(),
                "assessment": require_assessment(self.name(), ctx)?,
                "recommendationCount": ctx.recommendations.len(),
                "recommendations": ctx.recommendations,
            }),
            Workflow::StrategicPlanning => json!({
                "scenariosEvaluated": ctx.simulations.len(),
                "totalDelayHours": ctx.simulations.iter().map(|s| s.total_delay_hours).sum::<f64>(),
                "totalExtraCost": ctx.simulations.iter().map(|s| s.total_extra_cost).sum::<f64>(),
                "scenarios": ctx.simulations,
                "recommendationCount": ctx.recommendations.len(),
                "recommendations": ctx.recommendations,
            }),
            Workflow::RealTimeMonitoring => {
                let assessment = require_assessment(self.name(), ctx)?;
                let data = ctx.collected.as_ref().ok_or(OrchestratorError::MissingPrerequisite {
                    capability: REAL_TIME_MONITORING,
                    requires: DATA_COLLECTION,
                })?;
                let alerts = derive_alerts(data, assessment);
                json!({
                    "overallLevel": assessment.overall_level,
                    "averageRisk": assessment.average_risk,
                    "activeDisruptions": data.active_disruptions.len(),
                    "alertCount": alerts.len(),
                    "actionableCount": alerts.iter().filter(|a| a.actionable).count(),
                    "alerts": alerts,
                })
            }
            Workflow::Custom => json!({
                "stepCount": ctx.steps.len(),
                "steps": ctx.steps,
            }),
        };
        Ok(summary)
    }
}

/// Plan, resolve and execute one workflow.
pub async fn run(
    registry: &CapabilityRegistry,
    workflow: Workflow,
    input: &Value,
) -> OrchestratorResult<Value> {
    let steps = workflow.plan(input)?;
    let resolved = steps
        .into_iter()
        .map(|s| -> OrchestratorResult<_> { Ok((registry.get(&s.capability)?, s.input)) })
        .collect::<OrchestratorResult<Vec<_>>>()?;

    let mut ctx = WorkflowContext::new(input.clone());
    for (capability, step_input) in resolved {
        debug!(workflow = workflow.name(), capability = capability.name(), "Executing step");
        let output = capability.execute(&step_input, &mut ctx).await?;
        ctx.record(capability.name(), output);
    }
    workflow.summarize(&ctx)
}

// --- Input helpers ---

fn collect_input(input: &Value, include_weather: bool) -> Value {
    json!({
        "shipmentIds": input.get("shipmentIds").cloned().unwrap_or(Value::Null),
        "includeWeather": include_weather,
    })
}

/// Scenario for the single-scenario workflow. Port closure when unnamed.
fn scenario_input(input: &Value) -> OrchestratorResult<Value> {
    let mut scenario = match input {
        Value::Object(_) => input.clone(),
        Value::Null => json!({}),
        _ => return Err(OrchestratorError::InvalidInput("expected an object".into())),
    };
    if scenario.get("scenario").is_none() {
        scenario["scenario"] = json!("port_closure");
    }
    serde_json::from_value::<Scenario>(scenario.clone())?;
    Ok(scenario)
}

/// `scenarios` entries may be bare names or full scenario objects. The
/// canonical three when absent.
fn strategic_scenarios(input: &Value) -> OrchestratorResult<Vec<Value>> {
    let Some(list) = input.get("scenarios").filter(|v| !v.is_null()) else {
        return Scenario::canonical()
            .iter()
            .map(|s| serde_json::to_value(s).map_err(OrchestratorError::from))
            .collect();
    };
    let Value::Array(entries) = list else {
        return Err(OrchestratorError::InvalidInput("scenarios: expected a list".into()));
    };
    entries
        .iter()
        .map(|entry| -> OrchestratorResult<Value> {
            let scenario = match entry {
                Value::String(name) => json!({"scenario": name}),
                other => other.clone(),
            };
            serde_json::from_value::<Scenario>(scenario.clone())?;
            Ok(scenario)
        })
        .collect()
}

fn require_assessment<'a>(
    workflow: &'static str,
    ctx: &'a WorkflowContext,
) -> OrchestratorResult<&'a AssessmentSummary> {
    ctx.assessment
        .as_ref()
        .ok_or(OrchestratorError::MissingPrerequisite {
            capability: workflow,
            requires: RISK_ASSESSMENT,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capabilities(steps: &[Step]) -> Vec<&str> {
        steps.iter().map(|s| s.capability.as_str()).collect()
    }

    #[test]
    fn names_round_trip_and_unknown_is_rejected() {
        for w in Workflow::ALL {
            assert_eq!(Workflow::from_name(w.name()).unwrap(), *w);
        }
        assert!(matches!(
            Workflow::from_name("unknown_x"),
            Err(OrchestratorError::UnknownWorkflow(name)) if name == "unknown_x"
        ));
    }

    #[test]
    fn scenario_workflow_defaults_to_port_closure() {
        let steps = Workflow::ScenarioSimulation.plan(&Value::Null).unwrap();
        assert_eq!(
            capabilities(&steps),
            vec![DATA_COLLECTION, SCENARIO_SIMULATION, RISK_ASSESSMENT, RECOMMENDATION]
        );
        assert_eq!(steps[1].input["scenario"], "port_closure");

        let err = Workflow::ScenarioSimulation
            .plan(&json!({"scenario": "asteroid"}))
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidInput(_)));
    }

    #[test]
    fn strategic_planning_runs_canonical_scenarios_by_default() {
        let steps = Workflow::StrategicPlanning.plan(&json!({})).unwrap();
        assert_eq!(steps.len(), 5);
        assert_eq!(steps[1].input["scenario"], "port_closure");
        assert_eq!(steps[3].input["scenario"], "geopolitical_crisis");

        let steps = Workflow::StrategicPlanning
            .plan(&json!({"scenarios": ["weather_event", {"scenario": "custom", "name": "canal"}]}))
            .unwrap();
        assert_eq!(
            capabilities(&steps),
            vec![DATA_COLLECTION, SCENARIO_SIMULATION, SCENARIO_SIMULATION, RECOMMENDATION]
        );
    }

    #[test]
    fn custom_workflow_needs_steps() {
        assert!(Workflow::Custom.plan(&json!({})).is_err());
        assert!(Workflow::Custom.plan(&json!({"steps": []})).is_err());
        let steps = Workflow::Custom
            .plan(&json!({"steps": [{"capability": "data_collection"}]}))
            .unwrap();
        assert_eq!(steps[0].input, Value::Null);
    }
}
