use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local};
use tokio::task::JoinHandle;

use crate::rate_limit::{check_last_run, update_timestamp};
use crate::scraper::Scraper;
use crate::storage::JobCache;

/// Lifecycle states of the background scrape task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeState {
    Idle,
    Running,
    Completed,
    Failed,
}

impl ScrapeState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrapeState::Idle => "idle",
            ScrapeState::Running => "running",
            ScrapeState::Completed => "completed",
            ScrapeState::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone)]
struct StatusInner {
    state: ScrapeState,
    progress: String,
    error: Option<String>,
    started_at: Option<DateTime<Local>>,
    finished_at: Option<DateTime<Local>>,
}

/// Thread-safe scraper status.
///
/// The lock is held only for field access, never across I/O or awaits.
pub struct ScraperStatus {
    inner: Mutex<StatusInner>,
}

impl ScraperStatus {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StatusInner {
                state: ScrapeState::Idle,
                progress: String::new(),
                error: None,
                started_at: None,
                finished_at: None,
            }),
        }
    }

    /// Reset to a fresh running state: start time now, no error, no finish
    /// time.
    fn begin_run(&self, progress: &str) {
        let mut inner = self.lock();
        inner.state = ScrapeState::Running;
        inner.progress = progress.to_string();
        inner.error = None;
        inner.started_at = Some(Local::now());
        inner.finished_at = None;
    }

    /// Set the state and progress message.
    ///
    /// The start time is kept from the first transition into Running; the
    /// finish time is recorded once, on the transition into Completed or
    /// Failed.
    pub fn set_status(&self, state: ScrapeState, progress: &str) {
        let mut inner = self.lock();
        inner.state = state;
        inner.progress = progress.to_string();
        match state {
            ScrapeState::Running if inner.started_at.is_none() => {
                inner.started_at = Some(Local::now());
            }
            ScrapeState::Completed | ScrapeState::Failed if inner.finished_at.is_none() => {
                inner.finished_at = Some(Local::now());
            }
            _ => {}
        }
    }

    /// Record a failure with its error text.
    pub fn set_error(&self, error: &str) {
        let mut inner = self.lock();
        inner.state = ScrapeState::Failed;
        inner.error = Some(error.to_string());
        if inner.finished_at.is_none() {
            inner.finished_at = Some(Local::now());
        }
    }

    /// Owned point-in-time copy of the status.
    pub fn snapshot(&self) -> StatusSnapshot {
        let inner = self.lock();
        StatusSnapshot {
            state: inner.state,
            progress: inner.progress.clone(),
            error: inner.error.clone(),
            started_at: inner.started_at,
            finished_at: inner.finished_at,
        }
    }

    // The fields stay valid even if a writer panicked mid-update.
    fn lock(&self) -> MutexGuard<'_, StatusInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Point-in-time copy of the scraper status.
#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    pub state: ScrapeState,
    pub progress: String,
    pub error: Option<String>,
    pub started_at: Option<DateTime<Local>>,
    pub finished_at: Option<DateTime<Local>>,
}

impl StatusSnapshot {
    /// Wall-clock duration of the run, once both ends are known.
    pub fn duration(&self) -> Option<chrono::Duration> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }
}

/// Runs the scrape pipeline in a background task, at most one at a time.
///
/// The rate gate is checked before spawning, and the timestamp is updated
/// only after a successful save, so a failed run leaves the gate due.
pub struct BackgroundScraper {
    scraper: Arc<Scraper>,
    cache: Arc<JobCache>,
    timestamp_file: PathBuf,
    status: Arc<ScraperStatus>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl BackgroundScraper {
    pub fn new(scraper: Scraper, cache: JobCache, timestamp_file: impl Into<PathBuf>) -> Self {
        Self {
            scraper: Arc::new(scraper),
            cache: Arc::new(cache),
            timestamp_file: timestamp_file.into(),
            status: Arc::new(ScraperStatus::new()),
            handle: Mutex::new(None),
        }
    }

    /// Whether the rate gate allows a scrape right now.
    pub fn should_run(&self) -> bool {
        check_last_run(&self.timestamp_file)
    }

    /// Start the background scrape if the gate is open and no task is
    /// already in flight. Returns whether a new task was spawned.
    pub fn start(&self) -> bool {
        if !self.should_run() {
            self.status.set_status(
                ScrapeState::Idle,
                "Rate limit not reached - using cached data",
            );
            tracing::info!("Skipping scrape, 24 hours not elapsed");
            return false;
        }

        let mut handle = self.handle.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(task) = handle.as_ref()
            && !task.is_finished()
        {
            tracing::info!("Background scrape already running");
            return false;
        }

        tracing::info!("Starting background scraping task...");
        self.status.begin_run("Initializing scraper...");

        let scraper = Arc::clone(&self.scraper);
        let cache = Arc::clone(&self.cache);
        let status = Arc::clone(&self.status);
        let timestamp_file = self.timestamp_file.clone();

        *handle = Some(tokio::spawn(async move {
            scrape_worker(scraper, cache, status, timestamp_file).await;
        }));
        true
    }

    /// Current status, without blocking on the worker.
    pub fn status(&self) -> StatusSnapshot {
        self.status.snapshot()
    }

    /// Wait for the current background task, if any, to finish.
    pub async fn wait_for_completion(&self) {
        let handle = {
            let mut guard = self.handle.lock().unwrap_or_else(|e| e.into_inner());
            guard.take()
        };
        if let Some(task) = handle {
            if let Err(e) = task.await {
                tracing::error!("Background scrape task panicked: {e}");
            }
        }
    }
}

async fn scrape_worker(
    scraper: Arc<Scraper>,
    cache: Arc<JobCache>,
    status: Arc<ScraperStatus>,
    timestamp_file: PathBuf,
) {
    status.set_status(ScrapeState::Running, "Starting job scraping...");

    status.set_status(ScrapeState::Running, "Fetching jobs from providers...");
    let snapshot = match scraper.scrape().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::error!("Background scrape failed: {e}");
            status.set_error(&e.to_string());
            return;
        }
    };

    status.set_status(ScrapeState::Running, "Saving jobs to CSV...");
    if let Err(e) = cache.save(&snapshot) {
        tracing::error!("Background scrape failed to save: {e}");
        status.set_error(&e.to_string());
        return;
    }

    status.set_status(ScrapeState::Running, "Updating timestamp...");
    update_timestamp(&timestamp_file);

    let external_count = snapshot.external.as_ref().map_or(0, Vec::len);
    status.set_status(
        ScrapeState::Completed,
        &format!(
            "Successfully scraped {} BestJobs and {} eJobs",
            snapshot.bestjobs.len(),
            snapshot.ejobs.len()
        ),
    );
    tracing::info!(
        "Background scrape completed: {} BestJobs, {} eJobs, {external_count} external",
        snapshot.bestjobs.len(),
        snapshot.ejobs.len()
    );
}
