use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AppError;
use crate::models::listing::BestJobsListing;
use crate::providers::{HttpJsonFetcher, JobProvider, JsonFetcher, PAGE_DELAY};

const BASE_URL: &str = "https://api.bestjobs.eu/v1/jobs";

/// Probe size of the initial count request.
const INITIAL_LIMIT: u32 = 24;

/// BestJobs fetches in two phases: a small probe request to learn the total
/// listing count, then one request sized to fetch everything at once.
pub struct BestJobsProvider {
    fetcher: Box<dyn JsonFetcher>,
    remote: bool,
    page_delay: Duration,
}

impl BestJobsProvider {
    pub fn new(remote: bool) -> Result<Self, AppError> {
        Ok(Self {
            fetcher: Box::new(HttpJsonFetcher::new()?),
            remote,
            page_delay: PAGE_DELAY,
        })
    }

    #[cfg(test)]
    pub(crate) fn with_fetcher(fetcher: Box<dyn JsonFetcher>, remote: bool) -> Self {
        Self {
            fetcher,
            remote,
            page_delay: Duration::ZERO,
        }
    }
}

#[async_trait]
impl JobProvider for BestJobsProvider {
    type Listing = BestJobsListing;

    fn name(&self) -> &'static str {
        "bestjobs"
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &["id", "slug", "title", "companyName", "active", "ownApplyUrl"]
    }

    async fn fetch_jobs(&self) -> Result<Vec<BestJobsListing>, AppError> {
        tracing::info!("Starting BestJobs API request...");

        // Initial request to learn the total listing count
        let url = format!(
            "{BASE_URL}?offset=0&limit={INITIAL_LIMIT}&remote={}",
            if self.remote { 1 } else { 0 }
        );
        tracing::info!("Making initial request to: {url}");
        let result = self.fetcher.get_json(&url).await?;

        let total = result.get("total").and_then(Value::as_u64).ok_or(
            AppError::MissingField {
                provider: self.name(),
                field: "total",
            },
        )?;
        tracing::info!("Found {total} total jobs, fetching all...");

        tokio::time::sleep(self.page_delay).await;

        // The full request always asks for remote listings, whatever the
        // configured flag says.
        let url = format!("{BASE_URL}?offset=0&limit={total}&remote=1");
        tracing::info!("Making full request to: {url}");
        let result = self.fetcher.get_json(&url).await?;

        let items = result.get("items").ok_or(AppError::MissingField {
            provider: self.name(),
            field: "items",
        })?;
        let items = items.as_array().ok_or_else(|| AppError::Malformed {
            provider: self.name(),
            detail: "'items' is not an array".to_string(),
        })?;

        let jobs = parse_listings(items, self.name())?;
        tracing::info!("Retrieved {} jobs from BestJobs", jobs.len());
        Ok(jobs)
    }

    fn job_link(&self, listing: &BestJobsListing) -> String {
        format!("https://www.bestjobs.eu/loc-de-munca/{}", listing.slug)
    }
}

/// Parse raw items into typed listings.
///
/// Items that do not deserialize are logged and skipped. A non-empty array
/// from which nothing parses is a malformed response.
fn parse_listings(items: &[Value], provider: &'static str) -> Result<Vec<BestJobsListing>, AppError> {
    let mut listings = Vec::with_capacity(items.len());
    for raw in items {
        match serde_json::from_value::<BestJobsListing>(raw.clone()) {
            Ok(listing) => listings.push(listing),
            Err(e) => tracing::warn!("Skipping unparsable BestJobs item: {e}"),
        }
    }
    if listings.is_empty() && !items.is_empty() {
        return Err(AppError::Malformed {
            provider,
            detail: format!("none of {} items could be parsed", items.len()),
        });
    }
    Ok(listings)
}
