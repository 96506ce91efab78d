//! Crawler module: transport, listing pages, pagination, concurrency
//!
//! This module contains the crawl engine core:
//! - HTTP fetching with retry and error classification
//! - Listing page parsing and the continuation signal
//! - The bounded, order-preserving worker pool
//! - Pagination with explicit termination modes
//! - The deduplication store

mod dedup;
mod fetcher;
mod listing;
mod paginator;
mod pool;

pub use dedup::DedupStore;
pub use fetcher::{build_http_client, fetch_document, RetryPolicy};
pub use listing::{parse_listing_page, ListingPage, ListingSource, SiteClient};
pub use paginator::{Paginator, TerminationMode};
pub use pool::WorkerPool;
