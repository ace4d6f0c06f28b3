//! Error types for the scraping pipeline.
//!
//! Per-school failures are ordinary values here: a missing table or a label
//! conflict aborts one school identifier and the run moves on to the next.

use crate::page::Page;

/// Error type for scraping and extraction operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The server answered with a non-success status after retries.
    #[error("{url} gave status code {status}")]
    Transport { url: String, status: u16 },

    /// The HTTP request itself failed (connect, timeout, TLS).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// A tag or table a fixer or the disambiguator relies on is absent.
    ///
    /// Fatal for the school being processed, never silently mislabeled.
    #[error("school {school}, page {page}: expected {what} not found")]
    MissingStructure {
        school: u32,
        page: Page,
        what: &'static str,
    },

    /// The merger found one label carrying two different values.
    #[error("school {school}: label {label:?} has conflicting values {first:?} vs {second:?}")]
    LabelConflict {
        school: u32,
        label: String,
        first: String,
        second: String,
    },

    /// Configuration could not be read or is malformed.
    #[error("config error: {0}")]
    Config(String),

    /// An identifier range that runs backwards.
    #[error("invalid school id range: start {start} > end {end}")]
    InvalidRange { start: u32, end: u32 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Result type alias for scraping operations.
pub type Result<T> = std::result::Result<T, Error>;
