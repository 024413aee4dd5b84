//! Signal ingestion: fetch raw signals, classify them into disruption events,
//! persist what was found and refresh hub status.

pub mod classifier;
pub mod deps;
pub mod fetchers;
pub mod infra;
pub mod pipeline;
pub mod scheduler;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use classifier::{is_material, AiBackend, ClassificationBackend, EventClassifier, SimulatedBackend};
pub use deps::IngestDeps;
pub use fetchers::{NewsFetcher, ShippingFetcher, SignalFetcher, WeatherFetcher};
pub use infra::{FetchError, HttpClient};
pub use pipeline::{hub_status_for_delay, IngestionPipeline, IngestionReport, IngestionStats};
pub use scheduler::IngestionScheduler;
