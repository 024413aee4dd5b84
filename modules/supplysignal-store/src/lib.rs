pub mod demo;
pub mod disruption_store;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod repository;

pub use disruption_store::DisruptionStore;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use repository::{DisruptionRepository, ShipmentSource};
