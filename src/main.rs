mod background;
mod config;
mod error;
mod filters;
mod models;
mod providers;
mod rate_limit;
mod scraper;
mod storage;

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::background::{BackgroundScraper, ScrapeState};
use crate::config::{Command, Config};
use crate::models::row::JobsSnapshot;
use crate::providers::{BestJobsProvider, EJobsProvider};
use crate::scraper::{Scraper, scrape_or_load};
use crate::storage::JobCache;

const STATUS_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("jobber=info")),
        )
        .init();

    let config = Config::parse();

    match config.resolved_command() {
        Command::Scrape { background } => {
            let scraper = build_scraper(&config)?;
            let cache = JobCache::new(&config.cache_dir);
            if background {
                run_background(scraper, cache, &config).await
            } else {
                run_foreground(scraper, cache, &config).await
            }
        }
        Command::Show => show_cache(&config),
    }
}

fn build_scraper(config: &Config) -> anyhow::Result<Scraper> {
    let bestjobs = BestJobsProvider::new(config.remote)?;
    let ejobs = EJobsProvider::new()?;
    Ok(Scraper::new(bestjobs, ejobs, &config.banned_words))
}

async fn run_foreground(scraper: Scraper, cache: JobCache, config: &Config) -> anyhow::Result<()> {
    match scrape_or_load(&scraper, &cache, &config.timestamp_file).await? {
        Some(snapshot) => {
            print_summary(&snapshot);
            Ok(())
        }
        None => {
            tracing::info!("No data available; run again once the cooldown has expired");
            Ok(())
        }
    }
}

async fn run_background(scraper: Scraper, cache: JobCache, config: &Config) -> anyhow::Result<()> {
    let background = BackgroundScraper::new(scraper, cache, &config.timestamp_file);

    if !background.start() {
        let status = background.status();
        tracing::info!("Background scrape not started: {}", status.progress);
        return Ok(());
    }

    let mut last_progress = String::new();
    loop {
        let status = background.status();
        if status.progress != last_progress {
            tracing::info!("Scraper: {}", status.progress);
            last_progress = status.progress;
        }
        if status.state != ScrapeState::Running {
            break;
        }
        tokio::time::sleep(STATUS_POLL_INTERVAL).await;
    }

    background.wait_for_completion().await;

    let status = background.status();
    tracing::info!("Scraper finished with status: {}", status.state.as_str());
    match status.state {
        ScrapeState::Failed => anyhow::bail!(
            "background scrape failed: {}",
            status.error.unwrap_or_else(|| "unknown error".to_string())
        ),
        _ => {
            if let Some(duration) = status.duration() {
                tracing::info!("Completed in {}s", duration.num_seconds());
            }
            Ok(())
        }
    }
}

fn show_cache(config: &Config) -> anyhow::Result<()> {
    let cache = JobCache::new(&config.cache_dir);
    match cache.load()? {
        Some(snapshot) => {
            print_summary(&snapshot);
            Ok(())
        }
        None => {
            tracing::info!("No cached data found in {}", config.cache_dir.display());
            Ok(())
        }
    }
}

fn print_summary(snapshot: &JobsSnapshot) {
    tracing::info!("BestJobs listings: {}", snapshot.bestjobs.len());
    tracing::info!("eJobs listings: {}", snapshot.ejobs.len());
    match &snapshot.external {
        Some(external) => tracing::info!("External listings: {}", external.len()),
        None => tracing::info!("No external job URLs found"),
    }
}
