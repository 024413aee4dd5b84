//! Fixed reference data for running without a database: the ten monitored
//! hubs and a handful of shipments spanning every transport mode.

use uuid::Uuid;

use supplysignal_common::{
    CongestionLevel, LocationType, PortHub, Route, Shipment, TransportMode,
};

use crate::memory::MemoryStore;

const HUBS: &[(&str, &str, &str, CongestionLevel)] = &[
    ("Shanghai", "CNSHA", "CN", CongestionLevel::High),
    ("Singapore", "SGSIN", "SG", CongestionLevel::Medium),
    ("Rotterdam", "NLRTM", "NL", CongestionLevel::Low),
    ("Los Angeles", "USLAX", "US", CongestionLevel::Medium),
    ("Hamburg", "DEHAM", "DE", CongestionLevel::Low),
    ("Dubai", "AEJEA", "AE", CongestionLevel::Low),
    ("Busan", "KRPUS", "KR", CongestionLevel::Medium),
    ("Hong Kong", "HKHKG", "HK", CongestionLevel::Medium),
    ("Antwerp", "BEANR", "BE", CongestionLevel::Low),
    ("New York", "USNYC", "US", CongestionLevel::Low),
];

pub fn hubs() -> Vec<PortHub> {
    HUBS.iter()
        .map(|(name, code, country, congestion)| PortHub {
            id: Uuid::new_v4(),
            name: name.to_string(),
            code: code.to_string(),
            country: country.to_string(),
            status: "operational".to_string(),
            congestion_level: *congestion,
        })
        .collect()
}

fn leg(
    shipment_id: Uuid,
    seq: u32,
    mode: TransportMode,
    hours: f64,
    cost: f64,
    from: LocationType,
    to: LocationType,
) -> Route {
    Route {
        shipment_id,
        mode,
        travel_time_est: hours,
        cost_est: cost,
        from_location_type: from,
        to_location_type: to,
        sequence_number: seq,
    }
}

pub fn shipments() -> Vec<(Shipment, Vec<Route>)> {
    use LocationType::*;
    use TransportMode::*;

    let specs: Vec<(&str, Vec<(TransportMode, f64, f64, LocationType, LocationType)>)> = vec![
        (
            "SHP-1001",
            vec![
                (Road, 6.0, 800.0, Supplier, Port),
                (Sea, 480.0, 14_000.0, Port, Port),
                (Rail, 30.0, 2_500.0, Port, Warehouse),
            ],
        ),
        (
            "SHP-1002",
            vec![
                (Air, 14.0, 9_000.0, Supplier, Warehouse),
                (Road, 4.0, 400.0, Warehouse, Customer),
            ],
        ),
        (
            "SHP-1003",
            vec![(Sea, 80.0, 500.0, Port, Customer)],
        ),
        (
            "SHP-1004",
            vec![
                (Rail, 60.0, 3_000.0, Supplier, Warehouse),
                (Road, 12.0, 900.0, Warehouse, Customer),
            ],
        ),
    ];

    specs
        .into_iter()
        .map(|(reference, legs)| {
            let id = Uuid::new_v4();
            let routes = legs
                .into_iter()
                .enumerate()
                .map(|(i, (mode, hours, cost, from, to))| {
                    leg(id, i as u32 + 1, mode, hours, cost, from, to)
                })
                .collect();
            (
                Shipment {
                    id,
                    reference: reference.to_string(),
                    status: "in_transit".to_string(),
                },
                routes,
            )
        })
        .collect()
}

/// An in-memory store seeded with the demo hubs and shipments.
pub fn seeded_store() -> MemoryStore {
    shipments()
        .into_iter()
        .fold(MemoryStore::new().with_hubs(hubs()), |store, (shipment, routes)| {
            store.with_shipment(shipment, routes)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{DisruptionRepository, ShipmentSource};

    #[tokio::test]
    async fn seeded_store_has_ten_hubs_and_routes_for_every_shipment() {
        let store = seeded_store();
        assert_eq!(store.port_hubs().await.unwrap().len(), 10);
        let shipments = store.shipments().await.unwrap();
        assert_eq!(shipments.len(), 4);
        for s in shipments {
            assert!(!store.routes_for(s.id).await.unwrap().is_empty());
        }
    }
}
