use serde::Serialize;
use serde_json::Value;

use crate::capabilities::assessment::AssessmentSummary;
use crate::capabilities::collection::CollectedData;
use crate::capabilities::recommendation::Recommendation;
use crate::capabilities::simulation::SimulationResult;

/// Output of one executed step, kept in execution order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    pub step: usize,
    pub capability: String,
    pub output: Value,
}

/// State accumulated across the steps of one workflow invocation.
///
/// Each capability reads what earlier steps left here and writes its own
/// typed result back. Nothing in it outlives the invocation.
#[derive(Debug, Default)]
pub struct WorkflowContext {
    pub input: Value,
    pub collected: Option<CollectedData>,
    pub assessment: Option<AssessmentSummary>,
    pub simulations: Vec<SimulationResult>,
    pub recommendations: Vec<Recommendation>,
    pub steps: Vec<StepRecord>,
}

impl WorkflowContext {
    pub fn new(input: Value) -> Self {
        Self {
            input,
            ..Self::default()
        }
    }

    pub fn record(&mut self, capability: &str, output: Value) {
        let step = self.steps.len() + 1;
        self.steps.push(StepRecord {
            step,
            capability: capability.to_string(),
            output,
        });
    }
}
