//! Listing page fetching and parsing
//!
//! Builds listing URLs from a [`Query`], extracts item references from the
//! returned markup, and derives the continuation signal. The paginator and
//! classification builder are generic over [`ListingSource`] so tests can
//! script page sequences without a network.

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_document, RetryPolicy};
use crate::model::{ItemReference, Query};
use crate::{ConfigError, FetchError};
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

/// One fetched listing page: the advertised items and whether more pages
/// likely exist
#[derive(Debug, Clone)]
pub struct ListingPage {
    pub items: Vec<ItemReference>,
    pub has_more: bool,
}

/// Source of listing pages, one query at a time
#[allow(async_fn_in_trait)] // callers never spawn these futures
pub trait ListingSource {
    async fn fetch_page(&self, query: &Query) -> Result<ListingPage, FetchError>;
}

/// Item cards on a listing page
const ITEM_SELECTOR: &str = "article.job-card";
/// Detail link inside an item card; its text is the listing title
const LINK_SELECTOR: &str = "a.job-card__link";
/// Next-page affordance
const NEXT_SELECTOR: &str = "a[rel=\"next\"], .pagination__next a";

/// HTTP-backed site access: listing pages and detail pages
pub struct SiteClient {
    client: Client,
    base_url: Url,
    has_next_affordance: bool,
    retry: RetryPolicy,
}

impl SiteClient {
    /// Builds a client from the run configuration
    pub fn new(config: &Config) -> crate::Result<Self> {
        let base_url = Url::parse(&config.site.base_url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid base_url '{}': {}", config.site.base_url, e))
        })?;

        let client = build_http_client(&config.user_agent)?;

        Ok(Self {
            client,
            base_url,
            has_next_affordance: config.site.has_next_affordance,
            retry: RetryPolicy::new(
                config.crawler.fetch_retries,
                config.crawler.retry_delay_ms,
            ),
        })
    }

    /// Builds the listing URL for a query: `<base>/<scope>/jobs?page=N`
    /// plus the filter parameter when one applies
    pub fn listing_url(&self, query: &Query) -> String {
        let mut url = self.base_url.clone();

        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&query.scope).push("jobs");
        }

        url.query_pairs_mut()
            .append_pair("page", &query.page.to_string());

        if let Some(filter) = &query.filter {
            url.query_pairs_mut()
                .append_pair(&filter.param, &filter.value);
        }

        url.to_string()
    }

    /// Fetches one detail page body
    pub async fn fetch_detail(&self, url: &str) -> Result<String, FetchError> {
        fetch_document(&self.client, url, &self.retry).await
    }
}

impl ListingSource for SiteClient {
    async fn fetch_page(&self, query: &Query) -> Result<ListingPage, FetchError> {
        let url = self.listing_url(query);
        let body = fetch_document(&self.client, &url, &self.retry).await?;
        Ok(parse_listing_page(
            &body,
            &self.base_url,
            self.has_next_affordance,
        ))
    }
}

/// Parses listing markup into item references and a continuation signal
///
/// `has_more` comes from the next-page affordance when the site exposes one;
/// otherwise a non-empty page is taken to mean more pages may exist.
/// Malformed markup yields an empty page, never an error.
pub fn parse_listing_page(html: &str, base_url: &Url, has_next_affordance: bool) -> ListingPage {
    let document = Html::parse_document(html);
    let mut items = Vec::new();

    if let (Ok(item_selector), Ok(link_selector)) =
        (Selector::parse(ITEM_SELECTOR), Selector::parse(LINK_SELECTOR))
    {
        for card in document.select(&item_selector) {
            let Some(link) = card.select(&link_selector).next() else {
                continue;
            };
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            let Ok(detail_url) = base_url.join(href.trim()) else {
                tracing::debug!("Skipping unresolvable listing href: {}", href);
                continue;
            };

            let title = link.text().collect::<String>();
            if let Some(item) = ItemReference::from_listing(&title, detail_url.as_str()) {
                items.push(item);
            } else {
                tracing::debug!("Skipping listing link without a usable id: {}", detail_url);
            }
        }
    }

    let has_more = if has_next_affordance {
        Selector::parse(NEXT_SELECTOR)
            .map(|selector| document.select(&selector).next().is_some())
            .unwrap_or(false)
    } else {
        !items.is_empty()
    };

    ListingPage { items, has_more }
}
