use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::models::row::{BestJobsRow, EJobsRow, ExternalRow, JobsSnapshot};

const BJOBS_FILE: &str = "bjobs.csv";
const EJOBS_FILE: &str = "ejobs.csv";
const EXTERNAL_FILE: &str = "externalJobs.csv";

/// CSV-backed cache of the last successful scrape.
///
/// `bjobs.csv` and `ejobs.csv` together form the snapshot;
/// `externalJobs.csv` exists only when the scrape found externally
/// applicable listings.
pub struct JobCache {
    cache_dir: PathBuf,
}

impl JobCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// Both required tables are present.
    pub fn files_exist(&self) -> bool {
        self.cache_dir.join(BJOBS_FILE).exists() && self.cache_dir.join(EJOBS_FILE).exists()
    }

    /// Write the snapshot, creating the cache directory if needed. The
    /// external table is written only when the snapshot carries one.
    pub fn save(&self, snapshot: &JobsSnapshot) -> Result<(), AppError> {
        std::fs::create_dir_all(&self.cache_dir)?;

        write_csv(
            &self.cache_dir.join(BJOBS_FILE),
            &BestJobsRow::HEADERS,
            &snapshot.bestjobs,
        )?;
        write_csv(
            &self.cache_dir.join(EJOBS_FILE),
            &EJobsRow::HEADERS,
            &snapshot.ejobs,
        )?;

        if let Some(external) = &snapshot.external {
            write_csv(
                &self.cache_dir.join(EXTERNAL_FILE),
                &ExternalRow::HEADERS,
                external,
            )?;
        }

        tracing::info!(
            "Cached {} BestJobs and {} eJobs rows in {}",
            snapshot.bestjobs.len(),
            snapshot.ejobs.len(),
            self.cache_dir.display()
        );
        Ok(())
    }

    /// Load the cached snapshot, or None when the required tables are
    /// absent. A missing external table means no externally applicable
    /// listings, not an error.
    pub fn load(&self) -> Result<Option<JobsSnapshot>, AppError> {
        if !self.files_exist() {
            return Ok(None);
        }

        let bestjobs = read_csv(&self.cache_dir.join(BJOBS_FILE))?;
        let ejobs = read_csv(&self.cache_dir.join(EJOBS_FILE))?;

        let external_path = self.cache_dir.join(EXTERNAL_FILE);
        let external = if external_path.exists() {
            Some(read_csv(&external_path)?)
        } else {
            None
        };

        Ok(Some(JobsSnapshot {
            bestjobs,
            ejobs,
            external,
        }))
    }
}

/// Write one table. The header row is written explicitly so that empty
/// tables still produce a well-formed file.
fn write_csv<T: Serialize>(path: &Path, headers: &[&str], rows: &[T]) -> Result<(), AppError> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(headers)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, AppError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}
