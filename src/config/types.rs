use crate::crawler::TerminationMode;
use crate::ConfigError;
use serde::Deserialize;

/// Main configuration structure for jobtrawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub site: SiteConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default, rename = "dimension")]
    pub dimensions: Vec<DimensionConfig>,
}

impl Config {
    /// Restricts classification to a named subset of the configured
    /// dimensions
    ///
    /// Useful to skip an expensive cross-reference crawl (each dimension
    /// costs one full listing crawl per filter value). Naming a dimension
    /// the configuration does not define is an error; an empty selection
    /// keeps every configured dimension.
    pub fn select_dimensions(&mut self, names: &[String]) -> Result<(), ConfigError> {
        if names.is_empty() {
            return Ok(());
        }

        for name in names {
            if !self.dimensions.iter().any(|d| &d.name == name) {
                return Err(ConfigError::UnknownDimension(name.clone()));
            }
        }

        self.dimensions.retain(|d| names.contains(&d.name));
        Ok(())
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum concurrent listing-page fetches (also the batch width of one
    /// pagination round)
    #[serde(rename = "listing-concurrency")]
    pub listing_concurrency: u32,

    /// Maximum concurrent detail-page fetches during enrichment
    #[serde(rename = "detail-concurrency")]
    pub detail_concurrency: u32,

    /// Pagination termination strategy
    #[serde(rename = "termination-mode", default)]
    pub termination_mode: TerminationMode,

    /// Hard cap on pages fetched per query; backstop only, termination is
    /// normally decided by the termination mode
    #[serde(rename = "max-pages")]
    pub max_pages: Option<u32>,

    /// Retries for transient fetch failures (timeouts, 5xx)
    #[serde(rename = "fetch-retries", default = "default_fetch_retries")]
    pub fetch_retries: u32,

    /// Delay between retries, in milliseconds
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_fetch_retries() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    500
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Root URL of the listing site
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// City/scope path segment the crawl is limited to
    pub scope: String,

    /// Whether listing pages expose a next-page affordance. When false, a
    /// non-empty page is taken to mean more pages may exist.
    #[serde(rename = "has-next-affordance", default = "default_true")]
    pub has_next_affordance: bool,
}

fn default_true() -> bool {
    true
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the final enriched-results document
    #[serde(rename = "results-path")]
    pub results_path: String,

    /// Path of the intermediate listing snapshot (two-phase mode)
    #[serde(rename = "listing-path")]
    pub listing_path: String,
}

/// One classification dimension: a closed, site-defined set of filter values
#[derive(Debug, Clone, Deserialize)]
pub struct DimensionConfig {
    /// Dimension name used as the classification key (e.g. "seniority")
    pub name: String,

    /// Query parameter the site expects for this dimension
    pub param: String,

    /// Ordered `(id, label)` filter values
    #[serde(default)]
    pub values: Vec<FilterValueConfig>,
}

/// A single site-defined filter value
#[derive(Debug, Clone, Deserialize)]
pub struct FilterValueConfig {
    /// Value id as the site's filter parameter expects it
    pub id: String,

    /// Human-readable label recorded in the classification maps
    pub label: String,
}
