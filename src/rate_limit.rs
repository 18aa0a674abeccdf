use std::path::Path;
use std::str::FromStr;

use chrono::{Duration, Local, NaiveDateTime};

/// Minimum time between scraper runs.
const COOLDOWN_HOURS: i64 = 24;

/// Written form of the last-run timestamp. `NaiveDateTime`'s `Display` uses
/// a space separator that its own parser rejects, so the format is explicit.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Check whether the cooldown has elapsed since the last recorded run.
///
/// An absent, unreadable, or unparsable timestamp file counts as due: a
/// gate that cannot be read must not block scraping. A timestamp in the
/// future counts as not due.
pub fn check_last_run(timestamp_file: &Path) -> bool {
    if !timestamp_file.exists() {
        return true;
    }

    let contents = match std::fs::read_to_string(timestamp_file) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::warn!("Error reading timestamp file: {e}");
            return true;
        }
    };

    let last_run = match NaiveDateTime::from_str(contents.trim()) {
        Ok(last_run) => last_run,
        Err(e) => {
            tracing::warn!("Error parsing timestamp file: {e}");
            return true;
        }
    };

    let elapsed = Local::now().naive_local() - last_run;
    if elapsed >= Duration::hours(COOLDOWN_HOURS) {
        true
    } else {
        let hours_elapsed = elapsed.num_seconds() as f64 / 3600.0;
        let hours_remaining = COOLDOWN_HOURS as f64 - hours_elapsed;
        tracing::info!(
            "Scraper last ran {hours_elapsed:.1}h ago, {hours_remaining:.1}h left before the next run"
        );
        false
    }
}

/// Record the current local time as the last run.
///
/// Write failures are logged, not raised; the gate then simply reports due
/// again on the next check.
pub fn update_timestamp(timestamp_file: &Path) {
    let stamp = Local::now().naive_local().format(TIMESTAMP_FORMAT).to_string();
    if let Err(e) = std::fs::write(timestamp_file, stamp) {
        tracing::error!("Error writing timestamp file: {e}");
    }
}
