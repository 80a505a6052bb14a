//! Error types for novelpub operations.

use thiserror::Error;

/// Errors that can occur while packaging a novel or scraping the catalog.
///
/// A cover that cannot be downloaded is not an error: the exporter logs it and
/// carries on without a cover. Everything listed here aborts the run.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("Invalid novel record: {0}")]
    InvalidRecord(String),

    #[error("Fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Archive assembly failed: {0}")]
    Archive(String),

    #[error("Scrape failed: {0}")]
    Scrape(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn fetch(url: &str, message: impl Into<String>) -> Self {
        Error::Fetch {
            url: url.to_string(),
            message: message.into(),
        }
    }
}
