//! Postgres-backed repository.
//!
//! Queries are checked at runtime (`sqlx::query`, not the `query!` macros) so
//! the crate builds without a live database. Enum columns are stored as their
//! snake_case text form.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use supplysignal_common::{
    CongestionLevel, Disruption, DisruptionStatus, EventType, LinkedDisruption, LocationType,
    PortHub, Route, Severity, Shipment, ShipmentDisruptionLink, TransportMode,
};

use crate::error::{StoreError, StoreResult};
use crate::repository::{DisruptionRepository, ShipmentSource};

const SCHEMA: &str = include_str!("../migrations/0001_init.sql");

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Apply the embedded schema. Idempotent.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        info!("Disruption schema applied");
        Ok(())
    }
}

fn parse<T: FromStr>(column: &str, raw: &str) -> StoreResult<T>
where
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e| StoreError::Decode(format!("{column}: {e}")))
}

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

#[derive(sqlx::FromRow)]
struct DisruptionRow {
    id: Uuid,
    #[sqlx(rename = "type")]
    event_type: String,
    location_type: String,
    location: String,
    severity: String,
    description: String,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    status: String,
}

impl TryFrom<DisruptionRow> for Disruption {
    type Error = StoreError;

    fn try_from(row: DisruptionRow) -> StoreResult<Self> {
        Ok(Disruption {
            id: row.id,
            event_type: parse::<EventType>("type", &row.event_type)?,
            location_type: parse::<LocationType>("location_type", &row.location_type)?,
            location: row.location,
            severity: parse::<Severity>("severity", &row.severity)?,
            description: row.description,
            start_time: row.start_time,
            end_time: row.end_time,
            status: parse::<DisruptionStatus>("status", &row.status)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct LinkRow {
    shipment_id: Uuid,
    disruption_id: Uuid,
    impact_delay_hours: f64,
    reroute_needed: bool,
    extra_cost: f64,
}

impl From<LinkRow> for ShipmentDisruptionLink {
    fn from(row: LinkRow) -> Self {
        ShipmentDisruptionLink {
            shipment_id: row.shipment_id,
            disruption_id: row.disruption_id,
            impact_delay_hours: row.impact_delay_hours,
            reroute_needed: row.reroute_needed,
            extra_cost: row.extra_cost,
        }
    }
}

#[derive(sqlx::FromRow)]
struct HubRow {
    id: Uuid,
    name: String,
    code: String,
    country: String,
    status: String,
    congestion_level: String,
}

#[derive(sqlx::FromRow)]
struct RouteRow {
    shipment_id: Uuid,
    sequence_number: i32,
    mode: String,
    travel_time_est: f64,
    cost_est: f64,
    from_location_type: String,
    to_location_type: String,
}

const DISRUPTION_COLUMNS: &str =
    "id, type, location_type, location, severity, description, start_time, end_time, status";

// ---------------------------------------------------------------------------
// DisruptionRepository
// ---------------------------------------------------------------------------

#[async_trait]
impl DisruptionRepository for PgStore {
    async fn insert_disruption(&self, d: &Disruption) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO disruptions (id, type, location_type, location, severity, description, start_time, end_time, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(d.id)
        .bind(d.event_type.as_str())
        .bind(d.location_type.as_str())
        .bind(&d.location)
        .bind(d.severity.as_str())
        .bind(&d.description)
        .bind(d.start_time)
        .bind(d.end_time)
        .bind(d.status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_disruption(&self, id: Uuid) -> StoreResult<Option<Disruption>> {
        let row = sqlx::query_as::<_, DisruptionRow>(&format!(
            "SELECT {DISRUPTION_COLUMNS} FROM disruptions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Disruption::try_from).transpose()
    }

    async fn disruptions_by_status(&self, status: DisruptionStatus) -> StoreResult<Vec<Disruption>> {
        let rows = sqlx::query_as::<_, DisruptionRow>(&format!(
            "SELECT {DISRUPTION_COLUMNS} FROM disruptions WHERE status = $1 ORDER BY start_time DESC"
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Disruption::try_from).collect()
    }

    async fn update_disruption_status(
        &self,
        id: Uuid,
        status: DisruptionStatus,
        end_time: Option<DateTime<Utc>>,
    ) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE disruptions SET status = $2, end_time = $3 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .bind(end_time)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_disruption(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM disruptions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_links(&self, links: &[ShipmentDisruptionLink]) -> StoreResult<usize> {
        let mut tx = self.pool.begin().await?;
        for link in links {
            sqlx::query(
                r#"
                INSERT INTO shipment_disruptions (shipment_id, disruption_id, impact_delay_hours, reroute_needed, extra_cost)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (shipment_id, disruption_id) DO UPDATE
                SET impact_delay_hours = EXCLUDED.impact_delay_hours,
                    reroute_needed = EXCLUDED.reroute_needed,
                    extra_cost = EXCLUDED.extra_cost
                "#,
            )
            .bind(link.shipment_id)
            .bind(link.disruption_id)
            .bind(link.impact_delay_hours)
            .bind(link.reroute_needed)
            .bind(link.extra_cost)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(links.len())
    }

    async fn links_for_disruption(&self, id: Uuid) -> StoreResult<Vec<ShipmentDisruptionLink>> {
        let rows = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT shipment_id, disruption_id, impact_delay_hours, reroute_needed, extra_cost
            FROM shipment_disruptions WHERE disruption_id = $1
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn port_hubs(&self) -> StoreResult<Vec<PortHub>> {
        let rows = sqlx::query_as::<_, HubRow>(
            "SELECT id, name, code, country, status, congestion_level FROM port_hubs ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|row| {
                Ok(PortHub {
                    id: row.id,
                    name: row.name,
                    code: row.code,
                    country: row.country,
                    status: row.status,
                    congestion_level: parse::<CongestionLevel>(
                        "congestion_level",
                        &row.congestion_level,
                    )?,
                })
            })
            .collect()
    }

    async fn update_port_hub_status(&self, id: Uuid, status: &str) -> StoreResult<()> {
        sqlx::query("UPDATE port_hubs SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ShipmentSource
// ---------------------------------------------------------------------------

#[async_trait]
impl ShipmentSource for PgStore {
    async fn shipments(&self) -> StoreResult<Vec<Shipment>> {
        let rows = sqlx::query_as::<_, (Uuid, String, String)>(
            "SELECT id, reference, status FROM shipments ORDER BY reference",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(id, reference, status)| Shipment {
                id,
                reference,
                status,
            })
            .collect())
    }

    async fn routes_for(&self, shipment_id: Uuid) -> StoreResult<Vec<Route>> {
        let rows = sqlx::query_as::<_, RouteRow>(
            r#"
            SELECT shipment_id, sequence_number, mode, travel_time_est, cost_est,
                   from_location_type, to_location_type
            FROM routes WHERE shipment_id = $1 ORDER BY sequence_number
            "#,
        )
        .bind(shipment_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|row| {
                Ok(Route {
                    shipment_id: row.shipment_id,
                    // Unknown modes score as "other" rather than failing the read.
                    mode: row.mode.parse().unwrap_or(TransportMode::Other),
                    travel_time_est: row.travel_time_est,
                    cost_est: row.cost_est,
                    from_location_type: parse::<LocationType>(
                        "from_location_type",
                        &row.from_location_type,
                    )?,
                    to_location_type: parse::<LocationType>(
                        "to_location_type",
                        &row.to_location_type,
                    )?,
                    sequence_number: u32::try_from(row.sequence_number).map_err(|_| {
                        StoreError::Decode(format!("negative sequence_number {}", row.sequence_number))
                    })?,
                })
            })
            .collect()
    }

    async fn disruptions_for(&self, shipment_id: Uuid) -> StoreResult<Vec<LinkedDisruption>> {
        let links = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT shipment_id, disruption_id, impact_delay_hours, reroute_needed, extra_cost
            FROM shipment_disruptions WHERE shipment_id = $1
            "#,
        )
        .bind(shipment_id)
        .fetch_all(&self.pool)
        .await?;

        let mut joined = Vec::with_capacity(links.len());
        for row in links {
            let link: ShipmentDisruptionLink = row.into();
            let disruption = self.find_disruption(link.disruption_id).await?;
            joined.push(LinkedDisruption { link, disruption });
        }
        Ok(joined)
    }
}
