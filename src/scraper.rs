use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::filters::{filter_jobs_by_banned_words, load_banned_words};
use crate::models::listing::EJobsListing;
use crate::models::row::{BestJobsRow, EJobsRow, ExternalRow, JobsSnapshot};
use crate::providers::{BestJobsProvider, EJobsProvider, JobProvider};
use crate::rate_limit::{check_last_run, update_timestamp};
use crate::storage::JobCache;

/// Orchestrates both providers into a single snapshot: fetch, sort, filter,
/// link, project, and derive the external table.
pub struct Scraper {
    bestjobs: BestJobsProvider,
    ejobs: EJobsProvider,
    banned_words_file: PathBuf,
}

impl Scraper {
    pub fn new(
        bestjobs: BestJobsProvider,
        ejobs: EJobsProvider,
        banned_words_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            bestjobs,
            ejobs,
            banned_words_file: banned_words_file.into(),
        }
    }

    /// Run the full scraping pipeline. Any provider failure aborts the run.
    pub async fn scrape(&self) -> Result<JobsSnapshot, AppError> {
        tracing::info!("Starting job scraping process...");
        tracing::debug!(
            "Expecting columns {:?} from {}",
            self.bestjobs.required_columns(),
            self.bestjobs.name()
        );
        tracing::debug!(
            "Expecting columns {:?} from {}",
            self.ejobs.required_columns(),
            self.ejobs.name()
        );

        let bjobs = self.bestjobs.fetch_jobs().await?;
        tracing::info!("Processed {} BestJobs entries", bjobs.len());

        let mut ejobs = self.ejobs.fetch_jobs().await?;
        if ejobs.is_empty() {
            tracing::warn!("No eJobs data retrieved");
        }
        sort_by_creation_date(&mut ejobs);
        tracing::info!("Processed {} eJobs entries", ejobs.len());

        let banned_words = load_banned_words(&self.banned_words_file);
        let initial_bjobs = bjobs.len();
        let initial_ejobs = ejobs.len();
        let bjobs = filter_jobs_by_banned_words(bjobs, &banned_words, |job| job.title.as_str());
        let ejobs = filter_jobs_by_banned_words(ejobs, &banned_words, |job| job.title.as_str());
        tracing::info!(
            "BestJobs: {initial_bjobs} -> {} jobs after filtering",
            bjobs.len()
        );
        tracing::info!(
            "eJobs: {initial_ejobs} -> {} jobs after filtering",
            ejobs.len()
        );

        let bestjobs_rows: Vec<BestJobsRow> = bjobs
            .iter()
            .map(|job| BestJobsRow {
                title: job.title.clone(),
                company_name: job.company_name.clone(),
                own_apply_url: job.own_apply_url.clone(),
                link: self.bestjobs.job_link(job),
            })
            .collect();

        let ejobs_rows: Vec<EJobsRow> = ejobs
            .iter()
            .map(|job| EJobsRow {
                title: job.title.clone(),
                creation_date: job.creation_date.clone(),
                expiration_date: job.expiration_date.clone(),
                own_apply_url: job.external_url.clone(),
                link: self.ejobs.job_link(job),
            })
            .collect();

        let external = derive_external(&ejobs_rows, &bestjobs_rows);
        match &external {
            Some(rows) => tracing::info!("Created external jobs table with {} entries", rows.len()),
            None => tracing::info!("No external job URLs found"),
        }

        tracing::info!(
            "Job scraping completed, final counts - BestJobs: {}, eJobs: {}",
            bestjobs_rows.len(),
            ejobs_rows.len()
        );

        Ok(JobsSnapshot {
            bestjobs: bestjobs_rows,
            ejobs: ejobs_rows,
            external,
        })
    }
}

/// Stable sort by creation date, listings without a date last.
fn sort_by_creation_date(jobs: &mut [EJobsListing]) {
    jobs.sort_by(|a, b| match (&a.creation_date, &b.creation_date) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Collect listings that can be applied to outside the boards, eJobs rows
/// first, each table keeping its internal order. External rows carry no
/// link column. None when no listing has an apply URL.
fn derive_external(ejobs: &[EJobsRow], bestjobs: &[BestJobsRow]) -> Option<Vec<ExternalRow>> {
    let mut rows: Vec<ExternalRow> = Vec::new();

    for job in ejobs {
        if let Some(url) = &job.own_apply_url
            && !url.is_empty()
        {
            rows.push(ExternalRow {
                title: job.title.clone(),
                creation_date: job.creation_date.clone(),
                expiration_date: job.expiration_date.clone(),
                own_apply_url: url.clone(),
                company_name: None,
            });
        }
    }

    for job in bestjobs {
        if let Some(url) = &job.own_apply_url
            && !url.is_empty()
        {
            rows.push(ExternalRow {
                title: job.title.clone(),
                creation_date: None,
                expiration_date: None,
                own_apply_url: url.clone(),
                company_name: job.company_name.clone(),
            });
        }
    }

    if rows.is_empty() { None } else { Some(rows) }
}

/// Run the rate-gated scrape, falling back to the cache inside the cooldown.
///
/// A due gate scrapes, saves, and only then records the timestamp, so a
/// failed run stays due. Returns None when the gate is closed and no cache
/// exists.
pub async fn scrape_or_load(
    scraper: &Scraper,
    cache: &JobCache,
    timestamp_file: &Path,
) -> Result<Option<JobsSnapshot>, AppError> {
    if check_last_run(timestamp_file) {
        tracing::info!("24+ hours since the last run, scraping...");
        let snapshot = scraper.scrape().await?;
        cache.save(&snapshot)?;
        update_timestamp(timestamp_file);
        tracing::info!("Scraping completed successfully");
        return Ok(Some(snapshot));
    }

    if let Some(snapshot) = cache.load()? {
        tracing::info!("Cache files found, loading cached data");
        Ok(Some(snapshot))
    } else {
        tracing::info!("No cache files found; run the scraper again once the cooldown expires");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};
    use tempfile::TempDir;

    use super::*;
    use crate::providers::testing::FakeFetcher;

    fn sample_bjobs_items() -> Value {
        json!([
            {
                "id": 1,
                "slug": "python-developer",
                "title": "Python Developer",
                "companyName": "Tech Corp",
                "active": true,
                "ownApplyUrl": "https://techcorp.com/apply"
            },
            {
                "id": 2,
                "slug": "sales-representative",
                "title": "Sales Representative",
                "companyName": "Sales Inc",
                "active": true,
                "ownApplyUrl": ""
            },
            {
                "id": 3,
                "slug": "software-engineer",
                "title": "Software Engineer",
                "companyName": "Dev Company",
                "active": true,
                "ownApplyUrl": null
            }
        ])
    }

    fn sample_ejobs_jobs() -> Value {
        json!([
            {
                "id": 101,
                "title": "Backend Developer",
                "slug": "backend-developer",
                "creationDate": "2024-01-01",
                "expirationDate": "2024-02-01",
                "externalUrl": "https://company.com/jobs"
            },
            {
                "id": 102,
                "title": "Marketing Manager",
                "slug": "marketing-manager",
                "creationDate": "2024-01-02",
                "expirationDate": "2024-02-02",
                "externalUrl": ""
            },
            {
                "id": 103,
                "title": "DevOps Engineer",
                "slug": "devops-engineer",
                "creationDate": "2024-01-03",
                "expirationDate": "2024-02-03",
                "externalUrl": null
            }
        ])
    }

    fn scraper_with(
        bjobs_responses: Vec<Result<Value, AppError>>,
        ejobs_responses: Vec<Result<Value, AppError>>,
        banned_words_file: &Path,
    ) -> Scraper {
        let bestjobs =
            BestJobsProvider::with_fetcher(Box::new(FakeFetcher::new(bjobs_responses)), false);
        let ejobs = EJobsProvider::with_fetcher(Box::new(FakeFetcher::new(ejobs_responses)));
        Scraper::new(bestjobs, ejobs, banned_words_file)
    }

    fn default_scraper(banned_words_file: &Path) -> Scraper {
        scraper_with(
            vec![
                Ok(json!({"total": 3})),
                Ok(json!({"items": sample_bjobs_items()})),
            ],
            vec![Ok(json!({"jobs": sample_ejobs_jobs(), "morePagesFollow": false}))],
            banned_words_file,
        )
    }

    #[tokio::test]
    async fn pipeline_projects_links_and_derives_external() {
        let dir = TempDir::new().unwrap();
        let scraper = default_scraper(&dir.path().join("missing_banned_words.txt"));

        let snapshot = scraper.scrape().await.unwrap();

        assert_eq!(snapshot.bestjobs.len(), 3);
        assert_eq!(snapshot.bestjobs[0].title, "Python Developer");
        assert_eq!(
            snapshot.bestjobs[0].link,
            "https://www.bestjobs.eu/loc-de-munca/python-developer"
        );

        assert_eq!(snapshot.ejobs.len(), 3);
        assert_eq!(
            snapshot.ejobs[0].own_apply_url.as_deref(),
            Some("https://company.com/jobs")
        );
        assert_eq!(
            snapshot.ejobs[0].link,
            "https://www.ejobs.ro/user/locuri-de-munca/backend-developer/101"
        );

        // One eJobs listing and one BestJobs listing carry an apply URL;
        // the eJobs row comes first.
        let external = snapshot.external.unwrap();
        assert_eq!(external.len(), 2);
        assert_eq!(external[0].title, "Backend Developer");
        assert_eq!(external[0].creation_date.as_deref(), Some("2024-01-01"));
        assert_eq!(external[0].company_name, None);
        assert_eq!(external[1].title, "Python Developer");
        assert_eq!(external[1].creation_date, None);
        assert_eq!(external[1].company_name.as_deref(), Some("Tech Corp"));
    }

    #[tokio::test]
    async fn banned_words_filter_applies_to_both_tables() {
        let dir = TempDir::new().unwrap();
        let banned = dir.path().join("banned_words.txt");
        std::fs::write(&banned, "sales\nmarketing\n").unwrap();
        let scraper = default_scraper(&banned);

        let snapshot = scraper.scrape().await.unwrap();

        let bjobs_titles: Vec<&str> = snapshot.bestjobs.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(bjobs_titles, ["Python Developer", "Software Engineer"]);
        let ejobs_titles: Vec<&str> = snapshot.ejobs.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(ejobs_titles, ["Backend Developer", "DevOps Engineer"]);
    }

    #[tokio::test]
    async fn ejobs_rows_are_sorted_by_creation_date() {
        let dir = TempDir::new().unwrap();
        let jobs = json!([
            {"id": 1, "title": "Third", "slug": "third", "creationDate": "2024-01-03"},
            {"id": 2, "title": "Dateless", "slug": "dateless"},
            {"id": 3, "title": "First", "slug": "first", "creationDate": "2024-01-01"}
        ]);
        let scraper = scraper_with(
            vec![Ok(json!({"total": 0})), Ok(json!({"items": []}))],
            vec![Ok(json!({"jobs": jobs, "morePagesFollow": false}))],
            &dir.path().join("missing.txt"),
        );

        let snapshot = scraper.scrape().await.unwrap();

        let titles: Vec<&str> = snapshot.ejobs.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["First", "Third", "Dateless"]);
    }

    #[tokio::test]
    async fn external_is_none_without_apply_urls() {
        let dir = TempDir::new().unwrap();
        let scraper = scraper_with(
            vec![
                Ok(json!({"total": 1})),
                Ok(json!({"items": [
                    {"id": 3, "slug": "software-engineer", "title": "Software Engineer",
                     "companyName": "Dev Company", "active": true, "ownApplyUrl": null}
                ]})),
            ],
            vec![Ok(json!({"jobs": [
                {"id": 102, "title": "QA Engineer", "slug": "qa", "externalUrl": ""}
            ], "morePagesFollow": false}))],
            &dir.path().join("missing.txt"),
        );

        let snapshot = scraper.scrape().await.unwrap();
        assert!(snapshot.external.is_none());
    }

    #[tokio::test]
    async fn provider_failure_aborts_the_scrape() {
        let dir = TempDir::new().unwrap();
        let scraper = scraper_with(
            vec![Err(AppError::Io(std::io::Error::other("connection refused")))],
            vec![Ok(json!({"jobs": [], "morePagesFollow": false}))],
            &dir.path().join("missing.txt"),
        );

        assert!(scraper.scrape().await.is_err());
    }

    #[tokio::test]
    async fn scrape_or_load_scrapes_when_due() {
        let dir = TempDir::new().unwrap();
        let cache = JobCache::new(dir.path().join("cache"));
        let timestamp_file = dir.path().join("last_run.txt");
        let scraper = default_scraper(&dir.path().join("missing.txt"));

        let snapshot = scrape_or_load(&scraper, &cache, &timestamp_file)
            .await
            .unwrap()
            .expect("due gate should produce a snapshot");

        assert_eq!(snapshot.bestjobs.len(), 3);
        assert!(cache.files_exist());
        assert!(timestamp_file.exists());
        assert!(!check_last_run(&timestamp_file));
    }

    #[tokio::test]
    async fn scrape_or_load_uses_the_cache_inside_the_cooldown() {
        let dir = TempDir::new().unwrap();
        let cache = JobCache::new(dir.path().join("cache"));
        let timestamp_file = dir.path().join("last_run.txt");

        // First pass scrapes and caches; the second scraper has no scripted
        // responses, so any fetch attempt would panic.
        let scraper = default_scraper(&dir.path().join("missing.txt"));
        scrape_or_load(&scraper, &cache, &timestamp_file)
            .await
            .unwrap();

        let gated = scraper_with(Vec::new(), Vec::new(), &dir.path().join("missing.txt"));
        let snapshot = scrape_or_load(&gated, &cache, &timestamp_file)
            .await
            .unwrap()
            .expect("cache should satisfy a gated call");

        assert_eq!(snapshot.bestjobs.len(), 3);
        assert_eq!(snapshot.ejobs.len(), 3);
    }

    #[tokio::test]
    async fn scrape_or_load_returns_none_when_gated_without_cache() {
        let dir = TempDir::new().unwrap();
        let cache = JobCache::new(dir.path().join("cache"));
        let timestamp_file = dir.path().join("last_run.txt");
        update_timestamp(&timestamp_file);

        let scraper = scraper_with(Vec::new(), Vec::new(), &dir.path().join("missing.txt"));
        let result = scrape_or_load(&scraper, &cache, &timestamp_file)
            .await
            .unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn failed_scrape_leaves_the_timestamp_untouched() {
        let dir = TempDir::new().unwrap();
        let cache = JobCache::new(dir.path().join("cache"));
        let timestamp_file = dir.path().join("last_run.txt");

        let scraper = scraper_with(
            vec![Err(AppError::Io(std::io::Error::other("connection refused")))],
            vec![Ok(json!({"jobs": [], "morePagesFollow": false}))],
            &dir.path().join("missing.txt"),
        );

        let result = scrape_or_load(&scraper, &cache, &timestamp_file).await;

        assert!(result.is_err());
        assert!(!timestamp_file.exists());
        assert!(!cache.files_exist());
    }
}
