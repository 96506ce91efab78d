//! Pipeline driver
//!
//! Orchestrates one crawl run as a strict sequence of phases: crawl the
//! listing, build the classification maps, enrich every item through the
//! worker pool, assemble the final record set. Phases never restart within
//! a run; each phase's output is the next phase's input.

use crate::classify::{build_classification_maps, FilterDimension, NOT_FOUND_LABEL};
use crate::config::Config;
use crate::crawler::{DedupStore, Paginator, SiteClient, WorkerPool};
use crate::enrich::Enricher;
use crate::model::DetailRecord;
use crate::output::{CrawlOutput, ListingSnapshot};
use crate::{ConfigError, TrawlError};
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;

/// Pipeline phases, strictly sequential within one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    CrawlingListing,
    BuildingClassifications,
    Enriching,
    Done,
    Failed,
}

/// Per-run counters, reported once the pipeline settles
///
/// The final output is best-effort; these counters are how partial coverage
/// stays visible.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub scope: String,
    /// Unique items discovered by the listing crawl
    pub discovered: usize,
    /// Items successfully enriched into the final output
    pub enriched: usize,
    /// Items dropped on detail-fetch failure
    pub dropped: usize,
    /// Items left at "Not Found", per dimension
    pub unresolved: BTreeMap<String, usize>,
}

/// One configured crawl run
pub struct Pipeline {
    config: Config,
    client: SiteClient,
    listing_pool: WorkerPool,
    detail_pool: WorkerPool,
}

impl Pipeline {
    /// Validates the run configuration and prepares the HTTP client
    ///
    /// Configuration errors surface here, before any network activity.
    pub fn new(config: Config) -> crate::Result<Self> {
        let fail = |err: ConfigError| {
            tracing::error!("Pipeline state: {:?} ({})", PipelineState::Failed, err);
            TrawlError::from(err)
        };

        if config.site.scope.trim().is_empty() {
            return Err(fail(ConfigError::Validation(
                "scope cannot be empty".to_string(),
            )));
        }

        let listing_pool = WorkerPool::new(config.crawler.listing_concurrency as usize)
            .map_err(fail)?;
        let detail_pool =
            WorkerPool::new(config.crawler.detail_concurrency as usize).map_err(fail)?;
        let client = SiteClient::new(&config)?;

        Ok(Self {
            config,
            client,
            listing_pool,
            detail_pool,
        })
    }

    /// Runs the full pipeline: listing crawl through enrichment
    pub async fn run(&self) -> crate::Result<(CrawlOutput, RunReport)> {
        let snapshot = self.crawl_listing().await?;
        self.enrich_snapshot(snapshot).await
    }

    /// Listing phase: paginate the unfiltered listing into a snapshot
    ///
    /// The snapshot can be persisted and fed back through
    /// [`Pipeline::enrich_snapshot`] to re-run enrichment without
    /// re-crawling.
    pub async fn crawl_listing(&self) -> crate::Result<ListingSnapshot> {
        self.transition(PipelineState::CrawlingListing);

        let mut store = DedupStore::new();
        let paginator = Paginator::new(
            &self.client,
            self.listing_pool,
            self.config.crawler.termination_mode,
            self.config.crawler.max_pages,
        );
        let pages = paginator
            .crawl(&self.config.site.scope, None, &mut store)
            .await;

        tracing::info!(
            "Listing crawl: {} unique items over {} pages",
            store.len(),
            pages
        );

        Ok(ListingSnapshot {
            scope: self.config.site.scope.clone(),
            total: store.len(),
            items: store.into_values(),
        })
    }

    /// Classification and enrichment phases, from a listing snapshot
    pub async fn enrich_snapshot(
        &self,
        snapshot: ListingSnapshot,
    ) -> crate::Result<(CrawlOutput, RunReport)> {
        self.transition(PipelineState::BuildingClassifications);

        let dimensions: Vec<FilterDimension> = self
            .config
            .dimensions
            .iter()
            .map(FilterDimension::from_config)
            .collect();

        let maps = build_classification_maps(
            &self.client,
            &self.config.site.scope,
            &dimensions,
            self.listing_pool,
            self.config.crawler.termination_mode,
            self.config.crawler.max_pages,
        )
        .await;

        self.transition(PipelineState::Enriching);

        let dimension_names: Vec<String> =
            dimensions.iter().map(|d| d.name.clone()).collect();
        let enricher = Enricher::new(&self.client, &maps, dimension_names.clone());

        let tasks: Vec<_> = snapshot
            .items
            .iter()
            .map(|item| enricher.enrich(item))
            .collect();
        let results = self.detail_pool.run(tasks).await;

        let discovered = snapshot.items.len();
        let records: Vec<DetailRecord> = results.into_iter().flatten().collect();
        let dropped = discovered - records.len();

        let mut unresolved = BTreeMap::new();
        for name in &dimension_names {
            let count = records
                .iter()
                .filter(|record| {
                    record.classifications.get(name).map(String::as_str)
                        == Some(NOT_FOUND_LABEL)
                })
                .count();
            unresolved.insert(name.clone(), count);
        }

        self.transition(PipelineState::Done);
        tracing::info!(
            "Enrichment: {} of {} items enriched, {} dropped",
            records.len(),
            discovered,
            dropped
        );

        let output = CrawlOutput {
            scope: snapshot.scope.clone(),
            crawled_at: Utc::now(),
            total_items: records.len(),
            items: records,
        };
        let report = RunReport {
            scope: snapshot.scope,
            discovered,
            enriched: output.total_items,
            dropped,
            unresolved,
        };

        Ok((output, report))
    }

    fn transition(&self, state: PipelineState) {
        tracing::info!("Pipeline state: {:?}", state);
    }
}
