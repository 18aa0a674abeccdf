pub mod bestjobs;
pub mod ejobs;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

pub use bestjobs::BestJobsProvider;
pub use ejobs::EJobsProvider;

use crate::error::AppError;

/// Pause between consecutive requests to the same provider API.
pub const PAGE_DELAY: Duration = Duration::from_secs(5);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Trait that all job board providers implement.
///
/// A provider fetches raw listings from its API, advertises the columns the
/// downstream projection expects, and knows how to build a direct link to
/// each listing.
#[async_trait]
pub trait JobProvider: Send + Sync {
    type Listing;

    /// Short name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Columns the downstream projection expects from this provider.
    fn required_columns(&self) -> &'static [&'static str];

    /// Fetch all listings from the provider API.
    async fn fetch_jobs(&self) -> Result<Vec<Self::Listing>, AppError>;

    /// Build a direct link to a listing. Pure string formatting, no I/O.
    fn job_link(&self, listing: &Self::Listing) -> String;
}

/// Fetches a URL and decodes the response body as JSON.
///
/// Implemented by the reqwest-backed client in production and by scripted
/// fakes in tests, keeping pagination logic independent of the transport.
#[async_trait]
pub trait JsonFetcher: Send + Sync {
    async fn get_json(&self, url: &str) -> Result<Value, AppError>;
}

/// reqwest-backed fetcher shared by both providers.
pub struct HttpJsonFetcher {
    client: reqwest::Client,
}

impl HttpJsonFetcher {
    pub fn new() -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl JsonFetcher for HttpJsonFetcher {
    async fn get_json(&self, url: &str) -> Result<Value, AppError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let data = response.json().await?;
        Ok(data)
    }
}
