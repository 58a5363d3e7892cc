use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, warn};
use url::Url;

use crate::article::{ArticleRecord, NewsApiResponse};
use crate::config::ApiConfig;
use crate::data::FeedData;
use crate::error::{ConfigError, FeedError};

/// Where batches come from. The HTTP client is the production source; tests
/// plug in their own.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn fetch_articles(&self) -> Result<Vec<ArticleRecord>, FeedError>;
}

/// Remote news API: one unauthenticated GET with `apiKey` and `pageSize`.
#[derive(Debug, Clone)]
pub struct NewsApiClient {
    client: Client,
    url: Url,
    api_key: String,
    page_size: u32,
    timeout: Duration,
}

impl NewsApiClient {
    pub fn new(client: Client, api: &ApiConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            client,
            url: api.url()?,
            api_key: api.api_key.clone(),
            page_size: api.page_size,
            timeout: api.request_timeout(),
        })
    }
}

#[async_trait]
impl ArticleSource for NewsApiClient {
    async fn fetch_articles(&self) -> Result<Vec<ArticleRecord>, FeedError> {
        let response = self
            .client
            .get(self.url.clone())
            .query(&[
                ("apiKey", self.api_key.clone()),
                ("pageSize", self.page_size.to_string()),
            ])
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;
        let bytes = response.bytes().await?;
        let payload: NewsApiResponse = serde_json::from_slice(&bytes)?;
        Ok(payload.into_batch())
    }
}

/// Pulls a batch from the source and replaces the stored pending batch with it.
#[derive(Clone)]
pub struct FeedFetcher {
    source: Arc<dyn ArticleSource>,
    data: FeedData,
}

impl FeedFetcher {
    pub fn new(source: Arc<dyn ArticleSource>, data: FeedData) -> Self {
        Self { source, data }
    }

    /// On success the stored batch is overwritten wholesale, dropping any
    /// unread tail of the previous one. On failure the store is not touched.
    pub async fn fetch_batch(&self) -> Result<Vec<ArticleRecord>, FeedError> {
        let batch = match self.source.fetch_articles().await {
            Ok(batch) => batch,
            Err(err) => {
                warn!(error = %err, "failed to fetch news batch");
                return Err(err);
            }
        };
        if let Err(err) = self.data.save_batch(&batch).await {
            warn!(error = %err, "failed to store fetched batch");
            return Err(err);
        }
        info!(len = batch.len(), "fetched news batch");
        Ok(batch)
    }
}
