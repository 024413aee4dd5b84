use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use supplysignal_common::{
    Disruption, DisruptionStatus, ProcessedEvent, ShipmentDisruptionLink,
};

use crate::error::{StoreError, StoreResult};
use crate::repository::DisruptionRepository;

/// Persists classified events as disruptions and maintains their links.
///
/// Write failures are returned to the caller unchanged; this type never
/// swallows a storage error.
#[derive(Clone)]
pub struct DisruptionStore {
    repo: Arc<dyn DisruptionRepository>,
}

impl DisruptionStore {
    pub fn new(repo: Arc<dyn DisruptionRepository>) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &Arc<dyn DisruptionRepository> {
        &self.repo
    }

    /// Create an active disruption from the event. Returns its id.
    pub async fn store_disruption(&self, event: &ProcessedEvent) -> StoreResult<Uuid> {
        let disruption = Disruption::from_event(event);
        self.repo.insert_disruption(&disruption).await?;
        info!(
            disruption_id = %disruption.id,
            event_type = %disruption.event_type,
            severity = %disruption.severity,
            location = disruption.location.as_str(),
            "Stored disruption"
        );
        Ok(disruption.id)
    }

    /// One link per affected shipment. No-op when the event names none.
    pub async fn link_disruption_to_shipments(
        &self,
        disruption_id: Uuid,
        event: &ProcessedEvent,
    ) -> StoreResult<usize> {
        let Some(affected) = event.affected_shipments.as_deref() else {
            return Ok(0);
        };
        if affected.is_empty() {
            return Ok(0);
        }

        let links: Vec<ShipmentDisruptionLink> = affected
            .iter()
            .map(|a| ShipmentDisruptionLink::from_affected(disruption_id, a))
            .collect();
        let written = self.repo.insert_links(&links).await?;
        debug!(%disruption_id, links = written, "Linked disruption to shipments");
        Ok(written)
    }

    /// Best-effort status update for every hub whose name or code matches
    /// `location_id`. Returns how many hubs were updated; zero is not an error.
    pub async fn update_port_status(&self, location_id: &str, status: &str) -> StoreResult<usize> {
        let hubs = self.repo.port_hubs().await?;
        let mut updated = 0;
        for hub in hubs.iter().filter(|h| h.matches_location(location_id)) {
            match self.repo.update_port_hub_status(hub.id, status).await {
                Ok(()) => updated += 1,
                Err(e) => warn!(hub = hub.name.as_str(), error = %e, "Failed to update hub status"),
            }
        }
        if updated > 0 {
            debug!(location_id, status, updated, "Updated hub status");
        }
        Ok(updated)
    }

    pub async fn get_active_disruptions(&self) -> StoreResult<Vec<Disruption>> {
        self.repo.disruptions_by_status(DisruptionStatus::Active).await
    }

    /// Mark a disruption resolved and stamp `end_time = now`.
    ///
    /// Resolving an already-resolved disruption succeeds and overwrites
    /// `end_time` with the latest call's timestamp.
    pub async fn resolve_disruption(&self, id: Uuid) -> StoreResult<Disruption> {
        let now = Utc::now();
        if !self
            .repo
            .update_disruption_status(id, DisruptionStatus::Resolved, Some(now))
            .await?
        {
            return Err(StoreError::NotFound(id));
        }
        info!(disruption_id = %id, "Resolved disruption");
        self.repo
            .find_disruption(id)
            .await?
            .ok_or(StoreError::NotFound(id))
    }

    /// Delete the disruption together with its shipment links.
    pub async fn delete_disruption(&self, id: Uuid) -> StoreResult<bool> {
        self.repo.delete_disruption(id).await
    }
}
