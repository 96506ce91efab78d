//! Core data types shared across the crawl pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

/// A unique listing discovered on a listing page.
///
/// The `id` is the item's identity: two references with the same id are the
/// same item even when their URLs carry different tracking parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemReference {
    pub id: String,
    pub title: String,
    pub url: String,
}

impl ItemReference {
    /// Builds a reference from a listing anchor, deriving the id from the
    /// detail URL.
    ///
    /// Returns `None` when no id can be derived (a URL without a usable
    /// path segment).
    pub fn from_listing(title: &str, url: &str) -> Option<Self> {
        let id = derive_item_id(url)?;
        Some(Self {
            id,
            title: title.trim().to_string(),
            url: url.to_string(),
        })
    }
}

/// Derives the canonical item id from a detail URL.
///
/// The id is the last non-empty path segment; query string and fragment are
/// ignored so tracking parameters never produce distinct ids for the same
/// item.
pub fn derive_item_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .map(|segment| segment.to_string())
}

/// A filter applied to a listing query: one value of one dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    /// Query parameter the site expects for this dimension.
    pub param: String,
    /// Site-defined value id.
    pub value: String,
}

/// One listing-page request: scope, optional filter, page number.
///
/// Built by the paginator, consumed by the listing fetcher, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub scope: String,
    pub filter: Option<Filter>,
    pub page: u32,
}

impl Query {
    pub fn new(scope: &str, filter: Option<&Filter>, page: u32) -> Self {
        Self {
            scope: scope.to_string(),
            filter: filter.cloned(),
            page,
        }
    }
}

/// Structured location extracted from a detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub city: Option<String>,
    pub suburb: Option<String>,
    pub region: Option<String>,
}

/// A fully-enriched item: one per successfully fetched detail page.
///
/// Never mutated after construction. Every configured classification
/// dimension is present in `classifications`, with the literal label
/// `"Not Found"` when the cross-reference crawl did not resolve the item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub id: String,
    pub title: String,
    pub url: String,
    /// ISO `YYYY-MM-DD` when the site's date text parsed, raw text otherwise.
    pub listed_date: Option<String>,
    pub organization: Option<String>,
    pub organization_id: Option<String>,
    pub location: Location,
    pub employment_types: Vec<String>,
    pub work_style: Option<String>,
    pub description: String,
    pub salary: Option<String>,
    pub hard_skills: Vec<String>,
    pub soft_skills: Vec<String>,
    pub classifications: BTreeMap<String, String>,
}
