//! Configuration module for jobtrawl
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, including the injected filter-dimension tables.

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, DimensionConfig, FilterValueConfig, OutputConfig, SiteConfig,
    UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
