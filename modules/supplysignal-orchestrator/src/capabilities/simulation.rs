use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use supplysignal_common::{LocationType, Severity, TransportMode};
use supplysignal_risk::DisruptionInput;

use super::collection::ShipmentSnapshot;
use super::{Capability, DATA_COLLECTION, SCENARIO_SIMULATION};
use crate::context::WorkflowContext;
use crate::error::{OrchestratorError, OrchestratorResult};

fn default_category() -> String {
    "other".to_string()
}

fn default_severity() -> Severity {
    Severity::Medium
}

fn one() -> f64 {
    1.0
}

fn default_base_delay() -> f64 {
    24.0
}

fn default_base_cost() -> f64 {
    1_000.0
}

/// Caller-defined scenario. Unset fields take neutral defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomScenario {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_severity")]
    pub severity: Severity,
    #[serde(default = "one")]
    pub delay_multiplier: f64,
    #[serde(default = "one")]
    pub cost_multiplier: f64,
    #[serde(default = "default_base_delay")]
    pub base_delay_hours: f64,
    #[serde(default = "default_base_cost")]
    pub base_cost: f64,
    /// Affected shipments. Every shipment when absent.
    #[serde(default)]
    pub shipment_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scenario", rename_all = "snake_case")]
pub enum Scenario {
    PortClosure,
    WeatherEvent,
    GeopoliticalCrisis,
    Custom(CustomScenario),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioParams {
    pub category: String,
    pub severity: Severity,
    pub delay_multiplier: f64,
    pub cost_multiplier: f64,
    pub base_delay_hours: f64,
    pub base_cost: f64,
}

impl ScenarioParams {
    fn fixed(category: &str, severity: Severity, delay_x: f64, cost_x: f64, delay: f64, cost: f64) -> Self {
        Self {
            category: category.to_string(),
            severity,
            delay_multiplier: delay_x,
            cost_multiplier: cost_x,
            base_delay_hours: delay,
            base_cost: cost,
        }
    }

    pub fn delay_hours(&self) -> f64 {
        self.base_delay_hours * self.delay_multiplier
    }

    pub fn extra_cost(&self) -> f64 {
        self.base_cost * self.cost_multiplier
    }

    pub fn reroute_needed(&self) -> bool {
        self.severity == Severity::Critical
    }
}

impl Scenario {
    /// The canonical scenarios run by strategic planning.
    pub fn canonical() -> Vec<Scenario> {
        vec![
            Scenario::PortClosure,
            Scenario::WeatherEvent,
            Scenario::GeopoliticalCrisis,
        ]
    }

    pub fn name(&self) -> String {
        match self {
            Scenario::PortClosure => "port_closure".into(),
            Scenario::WeatherEvent => "weather_event".into(),
            Scenario::GeopoliticalCrisis => "geopolitical_crisis".into(),
            Scenario::Custom(c) => c.name.clone().unwrap_or_else(|| "custom".into()),
        }
    }

    pub fn params(&self) -> ScenarioParams {
        match self {
            Scenario::PortClosure => {
                ScenarioParams::fixed("port_closure", Severity::Critical, 2.0, 1.5, 48.0, 2_000.0)
            }
            Scenario::WeatherEvent => {
                ScenarioParams::fixed("weather_event", Severity::High, 1.5, 1.2, 24.0, 1_000.0)
            }
            Scenario::GeopoliticalCrisis => {
                ScenarioParams::fixed("political_unrest", Severity::Critical, 2.5, 2.0, 72.0, 5_000.0)
            }
            Scenario::Custom(c) => ScenarioParams {
                category: c.category.clone(),
                severity: c.severity,
                delay_multiplier: c.delay_multiplier,
                cost_multiplier: c.cost_multiplier,
                base_delay_hours: c.base_delay_hours,
                base_cost: c.base_cost,
            },
        }
    }

    pub fn affects(&self, snapshot: &ShipmentSnapshot) -> bool {
        match self {
            Scenario::PortClosure => snapshot.routes.iter().any(|r| r.touches(LocationType::Port)),
            Scenario::WeatherEvent => snapshot.routes.iter().any(|r| r.mode == TransportMode::Sea),
            Scenario::GeopoliticalCrisis => true,
            Scenario::Custom(c) => c
                .shipment_ids
                .as_ref()
                .map_or(true, |ids| ids.contains(&snapshot.shipment.id)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioImpact {
    pub shipment_id: Uuid,
    pub reference: String,
    pub delay_hours: f64,
    pub extra_cost: f64,
    pub reroute_needed: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub scenario: String,
    pub params: ScenarioParams,
    pub shipments_evaluated: usize,
    pub impacts: Vec<ScenarioImpact>,
    pub total_delay_hours: f64,
    pub total_extra_cost: f64,
}

impl SimulationResult {
    /// The synthesized disruption a shipment would see under this scenario.
    pub fn disruption_for(&self, shipment_id: Uuid) -> Option<DisruptionInput> {
        self.impacts
            .iter()
            .find(|i| i.shipment_id == shipment_id)
            .map(|i| {
                DisruptionInput::new(&self.params.category, self.params.severity.as_str(), "active")
                    .with_impact(i.delay_hours, i.reroute_needed, i.extra_cost)
            })
    }
}

/// Run one scenario against a shipment set.
pub fn simulate(scenario: &Scenario, shipments: &[ShipmentSnapshot]) -> SimulationResult {
    let params = scenario.params();
    let impacts: Vec<ScenarioImpact> = shipments
        .iter()
        .filter(|s| scenario.affects(s))
        .map(|s| ScenarioImpact {
            shipment_id: s.shipment.id,
            reference: s.shipment.reference.clone(),
            delay_hours: params.delay_hours(),
            extra_cost: params.extra_cost(),
            reroute_needed: params.reroute_needed(),
        })
        .collect();

    SimulationResult {
        scenario: scenario.name(),
        shipments_evaluated: shipments.len(),
        total_delay_hours: impacts.iter().map(|i| i.delay_hours).sum(),
        total_extra_cost: impacts.iter().map(|i| i.extra_cost).sum(),
        impacts,
        params,
    }
}

/// Input: a scenario object, e.g. `{"scenario": "port_closure"}` or
/// `{"scenario": "custom", "category": "border_delay", ...}`.
pub struct ScenarioSimulation;

#[async_trait]
impl Capability for ScenarioSimulation {
    fn name(&self) -> &'static str {
        SCENARIO_SIMULATION
    }

    async fn execute(&self, input: &Value, ctx: &mut WorkflowContext) -> OrchestratorResult<Value> {
        let scenario: Scenario = serde_json::from_value(input.clone())?;
        let data = ctx
            .collected
            .as_ref()
            .ok_or(OrchestratorError::MissingPrerequisite {
                capability: SCENARIO_SIMULATION,
                requires: DATA_COLLECTION,
            })?;

        let result = simulate(&scenario, &data.shipments);
        info!(
            scenario = result.scenario.as_str(),
            affected = result.impacts.len(),
            total_delay_hours = result.total_delay_hours,
            total_extra_cost = result.total_extra_cost,
            "Scenario simulated"
        );
        let summary = json!({
            "scenario": result.scenario,
            "affectedShipments": result.impacts.len(),
            "totalDelayHours": result.total_delay_hours,
            "totalExtraCost": result.total_extra_cost,
        });
        ctx.simulations.push(result);
        Ok(summary)
    }
}
