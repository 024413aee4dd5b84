//! Process-local repository backed by lock-guarded vectors.
//!
//! Used by tests and by the binary when no `DATABASE_URL` is configured.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use supplysignal_common::{
    Disruption, DisruptionStatus, LinkedDisruption, PortHub, Route, Shipment,
    ShipmentDisruptionLink,
};

use crate::error::{StoreError, StoreResult};
use crate::repository::{DisruptionRepository, ShipmentSource};

#[derive(Default)]
struct State {
    disruptions: Vec<Disruption>,
    links: Vec<ShipmentDisruptionLink>,
    hubs: Vec<PortHub>,
    shipments: Vec<Shipment>,
    routes: Vec<Route>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hubs(self, hubs: Vec<PortHub>) -> Self {
        if let Ok(mut state) = self.state.write() {
            state.hubs.extend(hubs);
        }
        self
    }

    pub fn with_shipment(self, shipment: Shipment, routes: Vec<Route>) -> Self {
        if let Ok(mut state) = self.state.write() {
            state.shipments.push(shipment);
            state.routes.extend(routes);
        }
        self
    }

    pub fn link_count(&self) -> usize {
        self.state.read().map(|s| s.links.len()).unwrap_or(0)
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|e| StoreError::Storage(format!("memory store lock poisoned: {e}")))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|e| StoreError::Storage(format!("memory store lock poisoned: {e}")))
    }
}

#[async_trait]
impl DisruptionRepository for MemoryStore {
    async fn insert_disruption(&self, disruption: &Disruption) -> StoreResult<()> {
        let mut state = self.write()?;
        if state.disruptions.iter().any(|d| d.id == disruption.id) {
            return Err(StoreError::Storage(format!(
                "duplicate disruption id {}",
                disruption.id
            )));
        }
        state.disruptions.push(disruption.clone());
        Ok(())
    }

    async fn find_disruption(&self, id: Uuid) -> StoreResult<Option<Disruption>> {
        Ok(self.read()?.disruptions.iter().find(|d| d.id == id).cloned())
    }

    async fn disruptions_by_status(&self, status: DisruptionStatus) -> StoreResult<Vec<Disruption>> {
        Ok(self
            .read()?
            .disruptions
            .iter()
            .filter(|d| d.status == status)
            .cloned()
            .collect())
    }

    async fn update_disruption_status(
        &self,
        id: Uuid,
        status: DisruptionStatus,
        end_time: Option<DateTime<Utc>>,
    ) -> StoreResult<bool> {
        let mut state = self.write()?;
        match state.disruptions.iter_mut().find(|d| d.id == id) {
            Some(d) => {
                d.status = status;
                d.end_time = end_time;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_disruption(&self, id: Uuid) -> StoreResult<bool> {
        let mut state = self.write()?;
        let before = state.disruptions.len();
        state.disruptions.retain(|d| d.id != id);
        state.links.retain(|l| l.disruption_id != id);
        Ok(state.disruptions.len() != before)
    }

    /// Both ends must exist, as the Postgres foreign keys require. Nothing is
    /// written when any link is rejected.
    async fn insert_links(&self, links: &[ShipmentDisruptionLink]) -> StoreResult<usize> {
        let mut state = self.write()?;
        for link in links {
            if !state.shipments.iter().any(|s| s.id == link.shipment_id) {
                return Err(StoreError::Storage(format!(
                    "link names unknown shipment {}",
                    link.shipment_id
                )));
            }
            if !state.disruptions.iter().any(|d| d.id == link.disruption_id) {
                return Err(StoreError::Storage(format!(
                    "link names unknown disruption {}",
                    link.disruption_id
                )));
            }
        }
        for link in links {
            state
                .links
                .retain(|l| !(l.shipment_id == link.shipment_id && l.disruption_id == link.disruption_id));
            state.links.push(link.clone());
        }
        Ok(links.len())
    }

    async fn links_for_disruption(&self, id: Uuid) -> StoreResult<Vec<ShipmentDisruptionLink>> {
        Ok(self
            .read()?
            .links
            .iter()
            .filter(|l| l.disruption_id == id)
            .cloned()
            .collect())
    }

    async fn port_hubs(&self) -> StoreResult<Vec<PortHub>> {
        Ok(self.read()?.hubs.clone())
    }

    async fn update_port_hub_status(&self, id: Uuid, status: &str) -> StoreResult<()> {
        let mut state = self.write()?;
        if let Some(hub) = state.hubs.iter_mut().find(|h| h.id == id) {
            hub.status = status.to_string();
        }
        Ok(())
    }
}

#[async_trait]
impl ShipmentSource for MemoryStore {
    async fn shipments(&self) -> StoreResult<Vec<Shipment>> {
        Ok(self.read()?.shipments.clone())
    }

    async fn routes_for(&self, shipment_id: Uuid) -> StoreResult<Vec<Route>> {
        let mut routes: Vec<Route> = self
            .read()?
            .routes
            .iter()
            .filter(|r| r.shipment_id == shipment_id)
            .cloned()
            .collect();
        routes.sort_by_key(|r| r.sequence_number);
        Ok(routes)
    }

    async fn disruptions_for(&self, shipment_id: Uuid) -> StoreResult<Vec<LinkedDisruption>> {
        let state = self.read()?;
        Ok(state
            .links
            .iter()
            .filter(|l| l.shipment_id == shipment_id)
            .map(|link| LinkedDisruption {
                link: link.clone(),
                disruption: state
                    .disruptions
                    .iter()
                    .find(|d| d.id == link.disruption_id)
                    .cloned(),
            })
            .collect())
    }
}
