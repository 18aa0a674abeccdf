use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AppError;
use crate::models::listing::EJobsListing;
use crate::providers::{HttpJsonFetcher, JobProvider, JsonFetcher, PAGE_DELAY};

const BASE_URL: &str = "https://api.ejobs.ro/jobs";

const PAGE_SIZE: u32 = 100;

/// City and career-level filters applied to every request.
const QUERY_FILTERS: &str = "filters.cities=381&filters.cities=1&filters.careerLevels=10&filters.careerLevels=3&filters.careerLevels=4&sort=suitability";

/// eJobs paginates: pages are fetched in order until the API stops
/// announcing more, accumulating listings along the way.
pub struct EJobsProvider {
    fetcher: Box<dyn JsonFetcher>,
    page_delay: Duration,
}

impl EJobsProvider {
    pub fn new() -> Result<Self, AppError> {
        Ok(Self {
            fetcher: Box::new(HttpJsonFetcher::new()?),
            page_delay: PAGE_DELAY,
        })
    }

    #[cfg(test)]
    pub(crate) fn with_fetcher(fetcher: Box<dyn JsonFetcher>) -> Self {
        Self {
            fetcher,
            page_delay: Duration::ZERO,
        }
    }
}

#[async_trait]
impl JobProvider for EJobsProvider {
    type Listing = EJobsListing;

    fn name(&self) -> &'static str {
        "ejobs"
    }

    fn required_columns(&self) -> &'static [&'static str] {
        &["id", "title", "slug", "creationDate", "expirationDate", "externalUrl"]
    }

    async fn fetch_jobs(&self) -> Result<Vec<EJobsListing>, AppError> {
        tracing::info!("Starting eJobs API request...");
        let mut page = 1u32;
        let mut raw_jobs: Vec<Value> = Vec::new();

        loop {
            let url = format!("{BASE_URL}?page={page}&pageSize={PAGE_SIZE}&{QUERY_FILTERS}");
            tracing::info!("Fetching eJobs page {page}...");
            let response = self.fetcher.get_json(&url).await?;

            let jobs = match response.get("jobs") {
                Some(value) => value.as_array().ok_or_else(|| AppError::Malformed {
                    provider: self.name(),
                    detail: "'jobs' is not an array".to_string(),
                })?,
                // A first page without listings means the response shape is
                // wrong; further in, it just ends the pagination early.
                None if page == 1 => {
                    return Err(AppError::MissingField {
                        provider: self.name(),
                        field: "jobs",
                    });
                }
                None => {
                    tracing::warn!("'jobs' key missing on page {page}, stopping pagination");
                    break;
                }
            };

            raw_jobs.extend(jobs.iter().cloned());
            tracing::info!(
                "Added {} jobs from page {page}, total so far: {}",
                jobs.len(),
                raw_jobs.len()
            );

            if !response
                .get("morePagesFollow")
                .and_then(Value::as_bool)
                .unwrap_or(false)
            {
                break;
            }

            page += 1;
            tokio::time::sleep(self.page_delay).await;
        }

        let listings = parse_listings(&raw_jobs, self.name())?;
        tracing::info!("Retrieved {} total jobs from eJobs", listings.len());
        Ok(listings)
    }

    fn job_link(&self, listing: &EJobsListing) -> String {
        format!(
            "https://www.ejobs.ro/user/locuri-de-munca/{}/{}",
            listing.slug, listing.id
        )
    }
}

/// Parse accumulated raw jobs into typed listings, skipping what does not
/// deserialize. Nothing parsable out of a non-empty batch is malformed.
fn parse_listings(items: &[Value], provider: &'static str) -> Result<Vec<EJobsListing>, AppError> {
    let mut listings = Vec::with_capacity(items.len());
    for raw in items {
        match serde_json::from_value::<EJobsListing>(raw.clone()) {
            Ok(listing) => listings.push(listing),
            Err(e) => tracing::warn!("Skipping unparsable eJobs item: {e}"),
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
