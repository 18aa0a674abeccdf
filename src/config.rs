use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "jobber", about = "Job board scraper with rate-limited CSV caching")]
pub struct Config {
    /// Directory holding the cached CSV tables
    #[arg(long, env = "JOBBER_CACHE_DIR", default_value = "data/cache")]
    pub cache_dir: PathBuf,

    /// Newline-delimited file of banned title words
    #[arg(long, env = "JOBBER_BANNED_WORDS", default_value = "data/banned_words.txt")]
    pub banned_words: PathBuf,

    /// File recording when the scraper last ran
    #[arg(long, env = "JOBBER_TIMESTAMP_FILE", default_value = "last_run.txt")]
    pub timestamp_file: PathBuf,

    /// Ask BestJobs for remote listings only in the initial count request
    #[arg(long, env = "JOBBER_REMOTE")]
    pub remote: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(clap::Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the rate-gated scrape, loading cached data inside the cooldown
    /// (default when no subcommand given)
    Scrape {
        /// Run the scrape as a background task and poll its status
        #[arg(long)]
        background: bool,
    },
    /// Print a summary of the cached tables
    Show,
}

impl Config {
    /// Resolve the command, defaulting to Scrape if none specified.
    pub fn resolved_command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Scrape { background: false })
    }
}
