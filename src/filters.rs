use std::path::Path;

/// Load banned words from a newline-delimited file.
///
/// Lines are trimmed and blank lines skipped. A missing or unreadable file
/// yields an empty list, which turns filtering into a no-op.
pub fn load_banned_words(path: &Path) -> Vec<String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let words: Vec<String> = contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect();
            tracing::info!("Loaded {} banned words", words.len());
            words
        }
        Err(e) => {
            tracing::error!("Could not read banned words file {}: {e}", path.display());
            Vec::new()
        }
    }
}

/// Drop listings whose title contains any banned word, case-insensitively.
///
/// Matching is plain substring containment on the lowercased title. Empty
/// input or an empty word list passes through unchanged.
pub fn filter_jobs_by_banned_words<T>(
    jobs: Vec<T>,
    banned_words: &[String],
    title: impl Fn(&T) -> &str,
) -> Vec<T> {
    if jobs.is_empty() || banned_words.is_empty() {
        return jobs;
    }

    let lowered: Vec<String> = banned_words.iter().map(|word| word.to_lowercase()).collect();
    let before = jobs.len();
    let kept: Vec<T> = jobs
        .into_iter()
        .filter(|job| {
            let title = title(job).to_lowercase();
            !lowered.iter().any(|word| title.contains(word.as_str()))
        })
        .collect();

    let dropped = before - kept.len();
    if dropped > 0 {
        tracing::info!("Filtered out {dropped} jobs containing banned words");
    }
    kept
}
