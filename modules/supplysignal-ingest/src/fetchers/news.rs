use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use supplysignal_common::{NewsSignal, RawSignal, SignalKind, SupplySignalError};

use super::SignalFetcher;
use crate::infra::{FetchError, HttpClient};

const QUERY: &str = "(port OR shipping OR freight OR \"supply chain\") AND \
(strike OR closure OR congestion OR storm OR disruption OR delay)";
const PAGE_SIZE: &str = "20";

/// Headlines served when the news API is unreachable or unconfigured.
const SIMULATED_HEADLINES: &[(&str, &str, &str)] = &[
    (
        "Dock workers announce 48-hour strike at Port of Rotterdam",
        "Union leaders confirmed industrial action affecting container terminals.",
        "Maritime Daily",
    ),
    (
        "Typhoon warning issued for Shanghai shipping lanes",
        "Authorities advise vessels to seek shelter as the storm approaches.",
        "Asia Freight News",
    ),
    (
        "Record vessel queue builds outside Los Angeles",
        "Over 30 container ships are waiting for berths amid peak season congestion.",
        "Logistics Today",
    ),
    (
        "Cyber incident disrupts terminal operating system in Antwerp",
        "Gate transactions are suspended while engineers restore systems.",
        "Port Technology",
    ),
    (
        "Red Sea tensions push carriers to reroute around the Cape",
        "Several alliances have suspended Suez transits citing security risk.",
        "Global Trade Review",
    ),
];

#[derive(Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Article {
    title: Option<String>,
    description: Option<String>,
    published_at: Option<DateTime<Utc>>,
    url: Option<String>,
    source: Option<ArticleSource>,
}

#[derive(Deserialize)]
struct ArticleSource {
    name: Option<String>,
}

impl Article {
    fn into_signal(self) -> Option<RawSignal> {
        let title = self.title.filter(|t| !t.trim().is_empty())?;
        Some(RawSignal::News(NewsSignal {
            title,
            description: self.description,
            published_at: self.published_at.unwrap_or_else(Utc::now),
            url: self.url.unwrap_or_default(),
            source: self
                .source
                .and_then(|s| s.name)
                .unwrap_or_else(|| "unknown".to_string()),
        }))
    }
}

pub struct NewsFetcher {
    http: Arc<HttpClient>,
    base_url: String,
    api_key: Option<String>,
}

impl NewsFetcher {
    pub fn new(http: Arc<HttpClient>, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key,
        }
    }

    async fn fetch_live(&self, api_key: &str) -> Result<Vec<RawSignal>, FetchError> {
        let url = format!("{}/everything", self.base_url.trim_end_matches('/'));
        let response: NewsApiResponse = self
            .http
            .get_json(
                &url,
                &[
                    ("q", QUERY),
                    ("language", "en"),
                    ("sortBy", "publishedAt"),
                    ("pageSize", PAGE_SIZE),
                    ("apiKey", api_key),
                ],
            )
            .await?;
        Ok(response
            .articles
            .into_iter()
            .filter_map(Article::into_signal)
            .collect())
    }
}

/// The fixed simulated news batch, newest first.
pub fn simulated_news() -> Vec<RawSignal> {
    let now = Utc::now();
    SIMULATED_HEADLINES
        .iter()
        .enumerate()
        .map(|(i, (title, description, source))| {
            RawSignal::News(NewsSignal {
                title: title.to_string(),
                description: Some(description.to_string()),
                published_at: now - Duration::hours(i as i64),
                url: format!("https://example.com/news/{}", i + 1),
                source: source.to_string(),
            })
        })
        .collect()
}

#[async_trait]
impl SignalFetcher for NewsFetcher {
    fn kind(&self) -> SignalKind {
        SignalKind::News
    }

    async fn fetch(&self) -> Vec<RawSignal> {
        let Some(api_key) = self.api_key.as_deref() else {
            info!("No news API key configured, using simulated headlines");
            return simulated_news();
        };

        match self.fetch_live(api_key).await {
            Ok(signals) => {
                info!(count = signals.len(), "Fetched news signals");
                signals
            }
            Err(e) => {
                let err = SupplySignalError::SourceUnavailable {
                    source_name: "news".into(),
                    reason: e.to_string(),
                };
                warn!(error = %err, "Falling back to simulated headlines");
                simulated_news()
            }
        }
    }
}
