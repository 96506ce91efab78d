//! Filter cross-reference: id→label maps per classification dimension
//!
//! The listing site exposes classification facets (seniority level,
//! industry) only as listing filters, never on detail pages. To label items
//! we re-crawl the listing once per filter value and record which ids each
//! value surfaced.

use crate::config::DimensionConfig;
use crate::crawler::{DedupStore, ListingSource, Paginator, TerminationMode, WorkerPool};
use crate::model::Filter;
use std::collections::HashMap;

/// Label reported for an item a dimension's crawls never surfaced
pub const NOT_FOUND_LABEL: &str = "Not Found";

/// A single site-defined filter value
#[derive(Debug, Clone)]
pub struct FilterValue {
    pub id: String,
    pub label: String,
}

/// One classification dimension: a closed, ordered set of filter values
#[derive(Debug, Clone)]
pub struct FilterDimension {
    pub name: String,
    /// Query parameter the site expects for this dimension
    pub param: String,
    pub values: Vec<FilterValue>,
}

impl FilterDimension {
    pub fn from_config(config: &DimensionConfig) -> Self {
        Self {
            name: config.name.clone(),
            param: config.param.clone(),
            values: config
                .values
                .iter()
                .map(|value| FilterValue {
                    id: value.id.clone(),
                    label: value.label.clone(),
                })
                .collect(),
        }
    }
}

/// Per-dimension id→label maps, built once per run and read-only afterwards
#[derive(Debug, Default)]
pub struct ClassificationMaps {
    maps: HashMap<String, HashMap<String, String>>,
}

impl ClassificationMaps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a label for an item under a dimension, last-write-wins
    ///
    /// A correctly-filtered site assigns each item exactly one value per
    /// dimension; a conflicting re-assignment indicates site-side ambiguity
    /// and simply overwrites.
    pub fn record(&mut self, dimension: &str, item_id: &str, label: &str) {
        self.maps
            .entry(dimension.to_string())
            .or_default()
            .insert(item_id.to_string(), label.to_string());
    }

    /// The label for an item under a dimension, `"Not Found"` when the
    /// dimension's crawls never surfaced the id
    pub fn label_for(&self, dimension: &str, item_id: &str) -> &str {
        self.maps
            .get(dimension)
            .and_then(|map| map.get(item_id))
            .map(String::as_str)
            .unwrap_or(NOT_FOUND_LABEL)
    }

    /// Number of ids resolved under a dimension
    pub fn resolved_count(&self, dimension: &str) -> usize {
        self.maps.get(dimension).map(HashMap::len).unwrap_or(0)
    }
}

/// Crawls the listing once per filter value and records every discovered
/// item id under that value's label
///
/// This is O(dimensions × values × pages) full listing crawls — the dominant
/// cost of the whole pipeline — and must complete before enrichment starts,
/// since enrichment does pure local lookups with no network fallback. Each
/// value's crawl uses a fresh store so pagination for one value is never cut
/// short by items already seen under a sibling value. Fetch failures degrade
/// a value's coverage (logged) but never abort the build.
pub async fn build_classification_maps<S: ListingSource>(
    source: &S,
    scope: &str,
    dimensions: &[FilterDimension],
    pool: WorkerPool,
    mode: TerminationMode,
    max_pages: Option<u32>,
) -> ClassificationMaps {
    let mut maps = ClassificationMaps::new();

    for dimension in dimensions {
        tracing::info!(
            "Building '{}' classification ({} filter values)",
            dimension.name,
            dimension.values.len()
        );

        for value in &dimension.values {
            let paginator = Paginator::new(source, pool, mode, max_pages);
            let mut store = DedupStore::new();
            let filter = Filter {
                param: dimension.param.clone(),
                value: value.id.clone(),
            };

            let pages = paginator.crawl(scope, Some(&filter), &mut store).await;
            tracing::debug!(
                "Filter {}={} ('{}'): {} items over {} pages",
                dimension.param,
                value.id,
                value.label,
                store.len(),
                pages
            );

            for item in store.values() {
                maps.record(&dimension.name, &item.id, &value.label);
            }
        }

        tracing::info!(
            "Dimension '{}' resolved {} items",
            dimension.name,
            maps.resolved_count(&dimension.name)
        );
    }

    maps
}
