use std::sync::Arc;

use serde_json::{json, Value};

use supplysignal_common::{
    AffectedShipment, EventType, LocationType, ProcessedEvent, Severity, SignalKind,
};
use supplysignal_ingest::testing::{weather_signal, StaticFetcher};
use supplysignal_orchestrator::{
    CapabilityRegistry, RunStatus, WorkflowOrchestrator, WorkflowRequest,
};
use supplysignal_store::{demo, DisruptionStore, MemoryStore, ShipmentSource};

fn orchestrator_over(store: Arc<MemoryStore>) -> WorkflowOrchestrator {
    let weather = Arc::new(StaticFetcher::new(
        SignalKind::Weather,
        vec![weather_signal("Busan", 5), weather_signal("Hamburg", 2)],
    ));
    WorkflowOrchestrator::new(CapabilityRegistry::standard(store.clone(), store, weather))
}

fn orchestrator() -> WorkflowOrchestrator {
    orchestrator_over(Arc::new(demo::seeded_store()))
}

async fn run(o: &WorkflowOrchestrator, workflow: &str, input: Value) -> supplysignal_orchestrator::AgentResponse {
    o.process(WorkflowRequest::new(workflow, input)).await
}

#[tokio::test]
async fn unknown_workflow_fails_softly_and_is_logged() {
    let o = orchestrator();
    let response = run(&o, "unknown_x", Value::Null).await;

    assert_eq!(response.confidence, 0.1);
    assert!(response.is_error());
    assert!(response.data["error"].as_str().unwrap().contains("unknown_x"));
    assert_eq!(response.agent_type, "workflow_orchestrator");

    let history = o.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, RunStatus::Failed);
    assert_eq!(history[0].workflow_name, "unknown_x");
    assert!(history[0].error_message.is_some());
}

#[tokio::test]
async fn lists_five_workflows() {
    let o = orchestrator();
    assert_eq!(
        o.available_workflows(),
        vec![
            "full_risk_assessment",
            "scenario_simulation",
            "strategic_planning",
            "real_time_monitoring",
            "custom_workflow",
        ]
    );
    assert_eq!(o.capabilities().len(), 4);
}

#[tokio::test]
async fn full_risk_assessment_over_demo_fleet() {
    let o = orchestrator();
    let response = run(&o, "full_risk_assessment", json!({})).await;

    assert_eq!(response.confidence, 0.9);
    let data = &response.data;
    assert_eq!(data["shipmentsAssessed"], 4);
    // SHP-1001 and SHP-1003 are medium on route risk alone, the rest low
    assert_eq!(data["highRisk"], 0);
    assert_eq!(data["mediumRisk"], 2);
    assert_eq!(data["lowRisk"], 2);
    assert_eq!(data["overallLevel"], "medium");
    assert_eq!(data["recommendationCount"], 2);

    let history = o.history_for("full_risk_assessment");
    assert_eq!(history.len(), 1);
    assert!(history[0].is_completed());
}

#[tokio::test]
async fn linked_disruptions_drive_recommendations_until_resolved() {
    let store = Arc::new(demo::seeded_store());
    let target = store
        .shipments()
        .await
        .unwrap()
        .into_iter()
        .find(|s| s.reference == "SHP-1003")
        .unwrap();

    let disruptions = DisruptionStore::new(store.clone());
    let event = ProcessedEvent::new(
        EventType::Strike,
        LocationType::Port,
        "Rotterdam",
        Severity::Critical,
        "Dock workers strike",
        "test",
        Value::Null,
    )
    .with_affected_shipments(vec![AffectedShipment {
        shipment_id: target.id,
        impact_delay_hours: Some(80.0),
        reroute_needed: Some(true),
        extra_cost: Some(6_000.0),
    }]);
    let id = disruptions.store_disruption(&event).await.unwrap();
    disruptions.link_disruption_to_shipments(id, &event).await.unwrap();

    let o = orchestrator_over(store.clone());
    let before = run(&o, "full_risk_assessment", json!({"shipmentIds": [target.id]})).await;
    assert_eq!(before.data["shipmentsAssessed"], 1);
    assert_eq!(before.data["highRisk"], 1);
    assert_eq!(before.data["assessments"][0]["score"]["totalRisk"], 84.0);
    assert_eq!(before.data["recommendations"][0]["category"], "reroute");

    disruptions.resolve_disruption(id).await.unwrap();
    let after = run(&o, "full_risk_assessment", json!({"shipmentIds": [target.id]})).await;
    // resolved status drops 20 points from the disruption score: round(24 + 57)
    assert_eq!(after.data["assessments"][0]["score"]["totalRisk"], 81.0);
    assert_eq!(after.data["recommendations"][0]["category"], "alternative_carrier");
}

#[tokio::test]
async fn port_closure_scenario_reassesses_with_synthesized_disruptions() {
    let o = orchestrator();
    let response = run(&o, "scenario_simulation", json!({"scenario": "port_closure"})).await;

    assert_eq!(response.confidence, 0.9);
    let data = &response.data;
    assert_eq!(data["simulation"]["scenario"], "port_closure");
    assert_eq!(data["simulation"]["impacts"].as_array().unwrap().len(), 2);
    assert_eq!(data["assessment"]["highRisk"], 2);
    assert_eq!(data["assessment"]["scenario"], "port_closure");

    let categories: Vec<&str> = data["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["category"].as_str().unwrap())
        .collect();
    assert_eq!(categories.iter().filter(|c| **c == "reroute").count(), 2);
    assert!(categories.contains(&"diversify_ports"));
}

#[tokio::test]
async fn bad_scenario_is_a_failed_run() {
    let o = orchestrator();
    let response = run(&o, "scenario_simulation", json!({"scenario": "meteor"})).await;
    assert_eq!(response.confidence, 0.1);
    assert_eq!(o.history()[0].status, RunStatus::Failed);
}

#[tokio::test]
async fn strategic_planning_aggregates_canonical_scenarios() {
    let o = orchestrator();
    let response = run(&o, "strategic_planning", Value::Null).await;

    let data = &response.data;
    assert_eq!(data["scenariosEvaluated"], 3);
    // port closure 2 x 96h, weather 2 x 36h, geopolitical 4 x 180h
    assert_eq!(data["totalDelayHours"], 984.0);
    // one reroute per shipment plus one plan per scenario
    assert_eq!(data["recommendationCount"], 7);
}

#[tokio::test]
async fn monitoring_raises_weather_and_congestion_alerts() {
    let o = orchestrator();
    let response = run(&o, "real_time_monitoring", json!({})).await;

    let data = &response.data;
    assert_eq!(data["alertCount"], 2);
    assert_eq!(data["actionableCount"], 1);
    let types: Vec<&str> = data["alerts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["type"].as_str().unwrap())
        .collect();
    assert_eq!(types, vec!["severe_weather", "port_congestion"]);
    assert_eq!(data["alerts"][0]["severity"], "critical");
}

#[tokio::test]
async fn custom_workflow_runs_steps_in_order() {
    let o = orchestrator();
    let response = run(
        &o,
        "custom_workflow",
        json!({"steps": [
            {"capability": "data_collection", "input": {"includeWeather": false}},
            {"capability": "scenario_simulation", "input": {"scenario": "weather_event"}},
            {"capability": "risk_assessment", "input": {"useScenario": true}},
        ]}),
    )
    .await;

    assert_eq!(response.confidence, 0.9);
    let steps = response.data["steps"].as_array().unwrap();
    let names: Vec<&str> = steps.iter().map(|s| s["capability"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["data_collection", "scenario_simulation", "risk_assessment"]);
    assert_eq!(steps[0]["output"]["weatherReadings"], 0);
    assert_eq!(steps[1]["output"]["affectedShipments"], 2);
}

#[tokio::test]
async fn custom_workflow_with_unknown_capability_fails_whole() {
    let o = orchestrator();
    let response = run(
        &o,
        "custom_workflow",
        json!({"steps": [
            {"capability": "data_collection"},
            {"capability": "teleport"},
        ]}),
    )
    .await;

    assert_eq!(response.confidence, 0.1);
    assert!(response.data["error"].as_str().unwrap().contains("teleport"));
    let history = o.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, RunStatus::Failed);
}

#[tokio::test]
async fn out_of_order_custom_steps_fail_on_missing_prerequisite() {
    let o = orchestrator();
    let response = run(
        &o,
        "custom_workflow",
        json!({"steps": [{"capability": "risk_assessment"}]}),
    )
    .await;
    assert_eq!(response.confidence, 0.1);
    assert!(response.data["error"]
        .as_str()
        .unwrap()
        .contains("requires data_collection"));
}
