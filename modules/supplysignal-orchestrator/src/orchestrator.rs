use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::capabilities::CapabilityRegistry;
use crate::history::{RunHistory, WorkflowRun};
use crate::workflows::{self, Workflow};

pub const AGENT_TYPE: &str = "workflow_orchestrator";
pub const SUCCESS_CONFIDENCE: f64 = 0.9;
pub const FAILURE_CONFIDENCE: f64 = 0.1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRequest {
    pub workflow: String,
    #[serde(default)]
    pub input_data: Value,
}

impl WorkflowRequest {
    pub fn new(workflow: impl Into<String>, input_data: Value) -> Self {
        Self {
            workflow: workflow.into(),
            input_data,
        }
    }
}

/// Uniform envelope returned for every request, including failed ones.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResponse {
    pub agent_id: String,
    pub agent_type: String,
    pub timestamp: DateTime<Utc>,
    pub data: Value,
    pub confidence: f64,
}

impl AgentResponse {
    pub fn is_error(&self) -> bool {
        self.data.get("error").is_some()
    }
}

/// Dispatches named workflows over a fixed capability registry and keeps a
/// log of every invocation.
pub struct WorkflowOrchestrator {
    agent_id: String,
    registry: CapabilityRegistry,
    history: RunHistory,
}

impl WorkflowOrchestrator {
    pub fn new(registry: CapabilityRegistry) -> Self {
        Self {
            agent_id: format!("orchestrator-{}", Uuid::new_v4()),
            registry,
            history: RunHistory::new(),
        }
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub async fn process(&self, request: WorkflowRequest) -> AgentResponse {
        let started = Instant::now();
        let start_time = Utc::now();

        let outcome = match Workflow::from_name(&request.workflow) {
            Ok(workflow) => workflows::run(&self.registry, workflow, &request.input_data).await,
            Err(e) => Err(e),
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(data) => {
                info!(workflow = request.workflow.as_str(), elapsed_ms, "Workflow completed");
                self.history.record(WorkflowRun::completed(
                    &request.workflow,
                    start_time,
                    elapsed_ms,
                    data.clone(),
                ));
                self.respond(data, SUCCESS_CONFIDENCE)
            }
            Err(e) => {
                warn!(workflow = request.workflow.as_str(), error = %e, elapsed_ms, "Workflow failed");
                self.history.record(WorkflowRun::failed(
                    &request.workflow,
                    start_time,
                    elapsed_ms,
                    e.to_string(),
                ));
                self.respond(
                    json!({
                        "error": e.to_string(),
                        "workflow": request.workflow,
                    }),
                    FAILURE_CONFIDENCE,
                )
            }
        }
    }

    fn respond(&self, data: Value, confidence: f64) -> AgentResponse {
        AgentResponse {
            agent_id: self.agent_id.clone(),
            agent_type: AGENT_TYPE.to_string(),
            timestamp: Utc::now(),
            data,
            confidence,
        }
    }

    pub fn available_workflows(&self) -> Vec<&'static str> {
        Workflow::ALL.iter().map(Workflow::name).collect()
    }

    pub fn capabilities(&self) -> Vec<&'static str> {
        self.registry.names()
    }

    pub fn history(&self) -> Vec<WorkflowRun> {
        self.history.snapshot()
    }

    pub fn history_for(&self, workflow: &str) -> Vec<WorkflowRun> {
        self.history.for_workflow(workflow)
    }
}
