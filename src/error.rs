#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("'{field}' key not found in {provider} API response")]
    MissingField {
        provider: &'static str,
        field: &'static str,
    },

    #[error("Malformed {provider} API response: {detail}")]
    Malformed {
        provider: &'static str,
        detail: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
