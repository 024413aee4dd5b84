use std::sync::Arc;

use typed_builder::TypedBuilder;

use ai_client::ContentGenerator;
use supplysignal_common::Config;
use supplysignal_store::{DisruptionRepository, DisruptionStore};

use crate::classifier::{AiBackend, EventClassifier};
use crate::fetchers::{NewsFetcher, ShippingFetcher, SignalFetcher, WeatherFetcher};
use crate::infra::{FetchError, HttpClient};
use crate::pipeline::IngestionPipeline;
use crate::scheduler::IngestionScheduler;

/// Long-lived resources needed to assemble the ingestion side.
///
/// `generator` overrides the config-driven backend choice; tests use it to
/// inject a scripted model.
#[derive(Clone, TypedBuilder)]
pub struct IngestDeps {
    pub config: Config,
    pub repository: Arc<dyn DisruptionRepository>,
    #[builder(default, setter(strip_option))]
    pub generator: Option<Arc<dyn ContentGenerator>>,
}

impl IngestDeps {
    pub fn build_classifier(&self) -> EventClassifier {
        match &self.generator {
            Some(generator) => EventClassifier::new(Arc::new(AiBackend::new(generator.clone()))),
            None => EventClassifier::from_config(&self.config),
        }
    }

    pub fn build_fetchers(&self, http: Arc<HttpClient>) -> Vec<Arc<dyn SignalFetcher>> {
        vec![
            Arc::new(NewsFetcher::new(
                http.clone(),
                &self.config.news_api_url,
                self.config.news_api_key.clone(),
            )),
            Arc::new(WeatherFetcher::new(
                http,
                &self.config.weather_api_url,
                self.config.weather_api_key.clone(),
            )),
            Arc::new(ShippingFetcher::new()),
        ]
    }

    pub fn build_store(&self) -> DisruptionStore {
        DisruptionStore::new(self.repository.clone())
    }

    pub fn build_pipeline(&self) -> Result<IngestionPipeline, FetchError> {
        let http = Arc::new(HttpClient::from_config(&self.config)?);
        Ok(IngestionPipeline::new(
            self.build_fetchers(http),
            self.build_classifier(),
            self.build_store(),
        )
        .with_concurrency(self.config.ingest_concurrency))
    }

    pub fn build_scheduler(&self) -> Result<IngestionScheduler, FetchError> {
        Ok(IngestionScheduler::new(
            Arc::new(self.build_pipeline()?),
            self.config.ingest_interval(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedGenerator;
    use supplysignal_store::MemoryStore;

    #[test]
    fn injected_generator_wins_over_config() {
        let deps = IngestDeps::builder()
            .config(Config::default())
            .repository(Arc::new(MemoryStore::new()))
            .generator(Arc::new(ScriptedGenerator::new()))
            .build();
        assert_eq!(deps.build_classifier().backend_name(), "ai");
    }

    #[test]
    fn scheduler_uses_configured_interval() {
        let config = Config {
            ingest_interval_minutes: 5,
            ..Config::default()
        };
        let deps = IngestDeps::builder()
            .config(config)
            .repository(Arc::new(MemoryStore::new()))
            .build();
        let scheduler = deps.build_scheduler().unwrap();
        assert_eq!(scheduler.interval().as_secs(), 300);
        assert_eq!(deps.build_fetchers(Arc::new(HttpClient::from_config(&deps.config).unwrap())).len(), 3);
    }
}
