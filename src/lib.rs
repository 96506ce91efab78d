//! Jobtrawl: a crawl-and-classify engine for paginated listing sites
//!
//! This crate crawls a paginated job-listing site for one scope (city),
//! deduplicates the discovered items, cross-references them against
//! independently-paginated filter dimensions to attach classification labels,
//! and enriches each item from its detail page under bounded concurrency.

pub mod classify;
pub mod config;
pub mod crawler;
pub mod enrich;
pub mod model;
pub mod output;
pub mod pipeline;

use thiserror::Error;

/// Main error type for jobtrawl operations
#[derive(Debug, Error)]
pub enum TrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Enrichment error: {0}")]
    Enrich(#[from] EnrichError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Unknown filter dimension: {0}")]
    UnknownDimension(String),

    #[error("Worker pool limit must be at least 1")]
    ZeroConcurrency,
}

/// Transport-level fetch errors
///
/// Parse failures are not represented here: malformed markup yields empty
/// extractions rather than errors.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },
}

impl FetchError {
    /// Whether a retry may succeed: timeouts and server errors are
    /// transient, everything else is permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Timeout { .. } => true,
            FetchError::Status { status, .. } => *status >= 500,
            FetchError::Http { .. } => false,
        }
    }

    /// The URL the failed request was addressed to.
    pub fn url(&self) -> &str {
        match self {
            FetchError::Http { url, .. }
            | FetchError::Timeout { url }
            | FetchError::Status { url, .. } => url,
        }
    }
}

/// Detail enrichment errors
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("Failed to fetch detail page for item {id}: {source}")]
    Detail {
        id: String,
        #[source]
        source: FetchError,
    },
}

/// Result type alias for jobtrawl operations
pub type Result<T> = std::result::Result<T, TrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use classify::{ClassificationMaps, FilterDimension, FilterValue, NOT_FOUND_LABEL};
pub use config::Config;
pub use crawler::{DedupStore, Paginator, TerminationMode, WorkerPool};
pub use model::{DetailRecord, ItemReference, Query};
pub use pipeline::{Pipeline, PipelineState, RunReport};
