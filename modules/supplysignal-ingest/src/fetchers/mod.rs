// Signal sources.
//
// Every fetcher degrades to simulated data instead of failing, so a run
// always sees well-formed input even with no credentials or no network.

pub mod news;
pub mod shipping;
pub mod weather;

use async_trait::async_trait;

use supplysignal_common::{RawSignal, SignalKind};

pub use news::NewsFetcher;
pub use shipping::ShippingFetcher;
pub use weather::{weather_risk_level, WeatherFetcher, MONITORED_HUBS};

#[async_trait]
pub trait SignalFetcher: Send + Sync {
    fn kind(&self) -> SignalKind;

    /// Fetch the current batch. Never fails; upstream problems are logged
    /// and replaced by simulated signals.
    async fn fetch(&self) -> Vec<RawSignal>;
}
