use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use supplysignal_common::{Disruption, PortHub, RawSignal, Route, Shipment, WeatherSignal};
use supplysignal_ingest::SignalFetcher;
use supplysignal_risk::DisruptionInput;
use supplysignal_store::{DisruptionRepository, DisruptionStore, ShipmentSource};

use super::{field, Capability, DATA_COLLECTION};
use crate::context::WorkflowContext;
use crate::error::OrchestratorResult;

/// One shipment with everything needed to score it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentSnapshot {
    pub shipment: Shipment,
    pub routes: Vec<Route>,
    pub disruptions: Vec<DisruptionInput>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectedData {
    pub shipments: Vec<ShipmentSnapshot>,
    pub active_disruptions: Vec<Disruption>,
    pub hubs: Vec<PortHub>,
    pub weather: Vec<WeatherSignal>,
    pub collected_at: DateTime<Utc>,
}

/// Snapshots shipments, routes, linked disruptions, hubs and current
/// weather.
///
/// Input: `{"shipmentIds": [uuid, ...]?, "includeWeather": bool?}`.
pub struct DataCollection {
    shipments: Arc<dyn ShipmentSource>,
    store: DisruptionStore,
    weather: Arc<dyn SignalFetcher>,
}

impl DataCollection {
    pub fn new(
        shipments: Arc<dyn ShipmentSource>,
        repository: Arc<dyn DisruptionRepository>,
        weather: Arc<dyn SignalFetcher>,
    ) -> Self {
        Self {
            shipments,
            store: DisruptionStore::new(repository),
            weather,
        }
    }

    pub async fn collect(
        &self,
        only: Option<&[Uuid]>,
        include_weather: bool,
    ) -> OrchestratorResult<CollectedData> {
        let mut snapshots = Vec::new();
        for shipment in self.shipments.shipments().await? {
            if only.is_some_and(|ids| !ids.contains(&shipment.id)) {
                continue;
            }
            let routes = self.shipments.routes_for(shipment.id).await?;
            let disruptions = self
                .shipments
                .disruptions_for(shipment.id)
                .await?
                .iter()
                .map(DisruptionInput::from)
                .collect();
            snapshots.push(ShipmentSnapshot {
                shipment,
                routes,
                disruptions,
            });
        }

        let weather = if include_weather {
            self.weather
                .fetch()
                .await
                .into_iter()
                .filter_map(|s| match s {
                    RawSignal::Weather(w) => Some(w),
                    _ => None,
                })
                .collect()
        } else {
            Vec::new()
        };

        Ok(CollectedData {
            shipments: snapshots,
            active_disruptions: self.store.get_active_disruptions().await?,
            hubs: self.store.repository().port_hubs().await?,
            weather,
            collected_at: Utc::now(),
        })
    }
}

#[async_trait]
impl Capability for DataCollection {
    fn name(&self) -> &'static str {
        DATA_COLLECTION
    }

    async fn execute(&self, input: &Value, ctx: &mut WorkflowContext) -> OrchestratorResult<Value> {
        let only: Option<Vec<Uuid>> = field(input, "shipmentIds")?;
        let include_weather: bool = field(input, "includeWeather")?.unwrap_or(true);

        let data = self.collect(only.as_deref(), include_weather).await?;
        info!(
            shipments = data.shipments.len(),
            active_disruptions = data.active_disruptions.len(),
            hubs = data.hubs.len(),
            weather = data.weather.len(),
            "Collected supply chain data"
        );
        let summary = json!({
            "shipments": data.shipments.len(),
            "activeDisruptions": data.active_disruptions.len(),
            "hubs": data.hubs.len(),
            "weatherReadings": data.weather.len(),
            "collectedAt": data.collected_at,
        });
        ctx.collected = Some(data);
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use supplysignal_common::SignalKind;
    use supplysignal_ingest::testing::{weather_signal, StaticFetcher};
    use supplysignal_store::demo;

    fn collection() -> DataCollection {
        let store = Arc::new(demo::seeded_store());
        DataCollection::new(
            store.clone(),
            store,
            Arc::new(StaticFetcher::new(
                SignalKind::Weather,
                vec![weather_signal("Busan", 4)],
            )),
        )
    }

    #[tokio::test]
    async fn collects_every_shipment_with_routes() {
        let mut ctx = WorkflowContext::default();
        let summary = collection().execute(&json!({}), &mut ctx).await.unwrap();
        assert_eq!(summary["shipments"], 4);
        let data = ctx.collected.unwrap();
        assert!(data.shipments.iter().all(|s| !s.routes.is_empty()));
        assert_eq!(data.hubs.len(), 10);
        assert_eq!(data.weather.len(), 1);
    }

    #[tokio::test]
    async fn shipment_filter_and_weather_toggle() {
        let c = collection();
        let all = c.collect(None, false).await.unwrap();
        let first = all.shipments[0].shipment.id;

        let mut ctx = WorkflowContext::default();
        c.execute(
            &json!({"shipmentIds": [first], "includeWeather": false}),
            &mut ctx,
        )
        .await
        .unwrap();
        let data = ctx.collected.unwrap();
        assert_eq!(data.shipments.len(), 1);
        assert!(data.weather.is_empty());
    }

    #[tokio::test]
    async fn malformed_filter_is_invalid_input() {
        let mut ctx = WorkflowContext::default();
        let err = collection()
            .execute(&json!({"shipmentIds": "all"}), &mut ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::OrchestratorError::InvalidInput(_)));
    }
}
