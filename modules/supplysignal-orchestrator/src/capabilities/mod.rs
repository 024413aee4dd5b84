// Sub-capabilities composed by workflows.
//
// Each capability takes a JSON input plus the shared workflow context,
// stores its typed result in the context and returns a JSON summary of the
// step. Workflows and custom step lists resolve them by name through the
// registry.

pub mod assessment;
pub mod collection;
pub mod recommendation;
pub mod simulation;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use supplysignal_ingest::SignalFetcher;
use supplysignal_store::{DisruptionRepository, ShipmentSource};

use crate::context::WorkflowContext;
use crate::error::{OrchestratorError, OrchestratorResult};

pub use assessment::RiskAssessment;
pub use collection::DataCollection;
pub use recommendation::RecommendationEngine;
pub use simulation::ScenarioSimulation;

pub const DATA_COLLECTION: &str = "data_collection";
pub const RISK_ASSESSMENT: &str = "risk_assessment";
pub const SCENARIO_SIMULATION: &str = "scenario_simulation";
pub const RECOMMENDATION: &str = "recommendation";

#[async_trait]
pub trait Capability: Send + Sync {
    fn name(&self) -> &'static str;

    async fn execute(&self, input: &Value, ctx: &mut WorkflowContext) -> OrchestratorResult<Value>;
}

/// Fixed set of capabilities, created once at startup.
#[derive(Clone, Default)]
pub struct CapabilityRegistry {
    capabilities: BTreeMap<&'static str, Arc<dyn Capability>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The four standard capabilities over the given data sources.
    pub fn standard(
        shipments: Arc<dyn ShipmentSource>,
        repository: Arc<dyn DisruptionRepository>,
        weather: Arc<dyn SignalFetcher>,
    ) -> Self {
        Self::new()
            .register(Arc::new(DataCollection::new(shipments, repository, weather)))
            .register(Arc::new(RiskAssessment))
            .register(Arc::new(ScenarioSimulation))
            .register(Arc::new(RecommendationEngine))
    }

    pub fn register(mut self, capability: Arc<dyn Capability>) -> Self {
        self.capabilities.insert(capability.name(), capability);
        self
    }

    pub fn get(&self, name: &str) -> OrchestratorResult<Arc<dyn Capability>> {
        self.capabilities
            .get(name)
            .cloned()
            .ok_or_else(|| OrchestratorError::UnknownCapability(name.to_string()))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.capabilities.keys().copied().collect()
    }
}

/// Read an optional field from a step input, rejecting wrong types.
pub(crate) fn field<T: serde::de::DeserializeOwned>(
    input: &Value,
    key: &str,
) -> OrchestratorResult<Option<T>> {
    match input.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => serde_json::from_value(v.clone())
            .map(Some)
            .map_err(|e| OrchestratorError::InvalidInput(format!("{key}: {e}"))),
    }
}
