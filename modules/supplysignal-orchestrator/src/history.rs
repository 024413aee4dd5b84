use std::fmt;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Failed,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Completed => f.write_str("completed"),
            RunStatus::Failed => f.write_str("failed"),
        }
    }
}

/// One workflow invocation, successful or not.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRun {
    pub workflow_id: Uuid,
    pub workflow_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub execution_time_ms: u64,
    pub status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl WorkflowRun {
    pub fn completed(name: &str, start_time: DateTime<Utc>, execution_time_ms: u64, result: Value) -> Self {
        Self::finished(name, start_time, execution_time_ms, RunStatus::Completed, Some(result), None)
    }

    pub fn failed(name: &str, start_time: DateTime<Utc>, execution_time_ms: u64, error: String) -> Self {
        Self::finished(name, start_time, execution_time_ms, RunStatus::Failed, None, Some(error))
    }

    fn finished(
        name: &str,
        start_time: DateTime<Utc>,
        execution_time_ms: u64,
        status: RunStatus,
        result: Option<Value>,
        error_message: Option<String>,
    ) -> Self {
        Self {
            workflow_id: Uuid::new_v4(),
            workflow_name: name.to_string(),
            start_time,
            end_time: Utc::now(),
            execution_time_ms,
            status,
            result,
            error_message,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }
}

/// Append-only log of workflow runs, shared by concurrent invocations.
#[derive(Debug, Default)]
pub struct RunHistory {
    runs: RwLock<Vec<WorkflowRun>>,
}

impl RunHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, run: WorkflowRun) {
        self.runs
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .push(run);
    }

    /// Copy of every run, oldest first.
    pub fn snapshot(&self) -> Vec<WorkflowRun> {
        self.runs.read().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn for_workflow(&self, name: &str) -> Vec<WorkflowRun> {
        self.runs
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .iter()
            .filter(|r| r.workflow_name == name)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.runs.read().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn records_in_order_and_filters_by_name() {
        let history = RunHistory::new();
        history.record(WorkflowRun::completed("a", Utc::now(), 3, json!({})));
        history.record(WorkflowRun::failed("b", Utc::now(), 1, "boom".into()));
        history.record(WorkflowRun::completed("a", Utc::now(), 2, json!({})));

        let all = history.snapshot();
        assert_eq!(all.len(), 3);
        assert_eq!(all[1].status, RunStatus::Failed);
        assert_eq!(all[1].error_message.as_deref(), Some("boom"));
        assert!(all[1].result.is_none());
        assert_eq!(history.for_workflow("a").len(), 2);
        assert!(all.iter().all(|r| r.end_time >= r.start_time));
    }

    #[tokio::test]
    async fn concurrent_appends_are_all_kept() {
        let history = Arc::new(RunHistory::new());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let history = history.clone();
                tokio::spawn(async move {
                    history.record(WorkflowRun::completed(&format!("w{i}"), Utc::now(), 0, json!(i)));
                })
            })
            .collect();
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(history.len(), 16);
    }
}
