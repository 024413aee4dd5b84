// Persistence contracts consumed by the disruption store and the risk
// workflows.
//
// DisruptionRepository: create/find/update for disruptions, links and hubs.
// ShipmentSource: read-only view of shipments and their route legs.
//
// Both are implemented by MemoryStore (tests, no-database mode) and PgStore.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use supplysignal_common::{
    Disruption, DisruptionStatus, LinkedDisruption, PortHub, Route, Shipment,
    ShipmentDisruptionLink,
};

use crate::error::StoreResult;

#[async_trait]
pub trait DisruptionRepository: Send + Sync {
    async fn insert_disruption(&self, disruption: &Disruption) -> StoreResult<()>;

    async fn find_disruption(&self, id: Uuid) -> StoreResult<Option<Disruption>>;

    async fn disruptions_by_status(&self, status: DisruptionStatus) -> StoreResult<Vec<Disruption>>;

    /// Returns `false` when no disruption has this id.
    async fn update_disruption_status(
        &self,
        id: Uuid,
        status: DisruptionStatus,
        end_time: Option<DateTime<Utc>>,
    ) -> StoreResult<bool>;

    /// Deletes the disruption and every link pointing at it.
    async fn delete_disruption(&self, id: Uuid) -> StoreResult<bool>;

    /// Upserts one row per (shipment, disruption) pair. Returns rows written.
    async fn insert_links(&self, links: &[ShipmentDisruptionLink]) -> StoreResult<usize>;

    async fn links_for_disruption(&self, id: Uuid) -> StoreResult<Vec<ShipmentDisruptionLink>>;

    async fn port_hubs(&self) -> StoreResult<Vec<PortHub>>;

    async fn update_port_hub_status(&self, id: Uuid, status: &str) -> StoreResult<()>;
}

#[async_trait]
pub trait ShipmentSource: Send + Sync {
    async fn shipments(&self) -> StoreResult<Vec<Shipment>>;

    /// Route legs ordered by `sequence_number`.
    async fn routes_for(&self, shipment_id: Uuid) -> StoreResult<Vec<Route>>;

    /// Every link for the shipment joined with its disruption, if it resolves.
    async fn disruptions_for(&self, shipment_id: Uuid) -> StoreResult<Vec<LinkedDisruption>>;
}
