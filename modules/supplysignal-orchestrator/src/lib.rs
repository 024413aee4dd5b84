//! Workflow orchestration over collected supply-chain data: risk
//! assessment, scenario simulation, recommendations and monitoring alerts.

pub mod capabilities;
pub mod context;
pub mod error;
pub mod history;
pub mod orchestrator;
pub mod workflows;

pub use capabilities::{Capability, CapabilityRegistry};
pub use context::WorkflowContext;
pub use error::{OrchestratorError, OrchestratorResult};
pub use history::{RunHistory, RunStatus, WorkflowRun};
pub use orchestrator::{AgentResponse, WorkflowOrchestrator, WorkflowRequest};
pub use workflows::{Alert, AlertType, Workflow};
