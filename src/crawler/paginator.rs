//! Pagination driver with explicit termination modes
//!
//! Walks increasing page numbers for one query, fetching batches of
//! consecutive pages through the worker pool and aggregating serially into
//! the dedup store once each batch settles. The batch width equals the
//! pool's concurrency limit, so width 1 gives plain sequential pagination.

use crate::crawler::dedup::DedupStore;
use crate::crawler::listing::ListingSource;
use crate::crawler::pool::WorkerPool;
use crate::model::{Filter, Query};
use serde::Deserialize;

/// When to stop walking page numbers
///
/// Both modes additionally stop on `has_more = false` and on fetch errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TerminationMode {
    /// Stop when a page yields no items at all. Vulnerable to sites that
    /// re-serve the last page indefinitely instead of returning an empty
    /// one; only safe where that behavior has been confirmed absent.
    EmptyPage,

    /// Stop when a page yields no items that are not already in the store.
    /// Canonical mode; terminates even against last-page re-serving.
    #[default]
    NoNewItems,
}

/// Drives a [`ListingSource`] across page numbers for one query
pub struct Paginator<'a, S: ListingSource> {
    source: &'a S,
    pool: WorkerPool,
    mode: TerminationMode,
    max_pages: Option<u32>,
}

impl<'a, S: ListingSource> Paginator<'a, S> {
    pub fn new(
        source: &'a S,
        pool: WorkerPool,
        mode: TerminationMode,
        max_pages: Option<u32>,
    ) -> Self {
        Self {
            source,
            pool,
            mode,
            max_pages,
        }
    }

    /// Crawls every page of `scope` + `filter` into `store`
    ///
    /// Each round fetches one batch of consecutive page numbers through the
    /// pool, then inserts the settled results in page order. A page signals
    /// continuation only when it advanced per the termination mode *and*
    /// reported `has_more`; a failed fetch signals no continuation. The loop
    /// stops once an entire batch goes without a continuation signal — a
    /// mixed batch still advances, since concurrent fetches of a paginated
    /// resource are not guaranteed monotonically decreasing content.
    ///
    /// Returns the number of pages fetched.
    pub async fn crawl(
        &self,
        scope: &str,
        filter: Option<&Filter>,
        store: &mut DedupStore,
    ) -> u32 {
        let width = self.pool.limit() as u32;
        let last_allowed = self.max_pages.unwrap_or(u32::MAX);
        let mut next_page: u32 = 1;
        let mut fetched: u32 = 0;

        loop {
            if next_page > last_allowed {
                tracing::warn!(
                    "Stopping at max-pages cap ({}) for scope '{}'",
                    last_allowed,
                    scope
                );
                break;
            }

            let batch_end = next_page
                .saturating_add(width)
                .min(last_allowed.saturating_add(1));
            let queries: Vec<Query> = (next_page..batch_end)
                .map(|page| Query::new(scope, filter, page))
                .collect();

            let tasks: Vec<_> = queries
                .iter()
                .map(|query| self.source.fetch_page(query))
                .collect();
            let results = self.pool.run(tasks).await;
            fetched += results.len() as u32;

            // Serial aggregation: the store is only ever written here, after
            // the whole batch has settled.
            let mut any_continue = false;
            for (query, result) in queries.iter().zip(results) {
                let Some(page) = result else {
                    // Fetch failure, already logged by the pool; treated as
                    // the end of this page's pagination.
                    continue;
                };

                let total = page.items.len();
                let mut fresh = 0usize;
                for item in page.items {
                    if store.insert(item) {
                        fresh += 1;
                    }
                }

                let advanced = match self.mode {
                    TerminationMode::EmptyPage => total > 0,
                    TerminationMode::NoNewItems => fresh > 0,
                };

                tracing::debug!(
                    "Page {} ({}): {} items, {} new, has_more={}",
                    query.page,
                    scope,
                    total,
                    fresh,
                    page.has_more
                );

                if advanced && page.has_more {
                    any_continue = true;
                }
            }

            if !any_continue {
                break;
            }
            next_page = batch_end;
        }

        fetched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::listing::ListingPage;
    use crate::model::ItemReference;
    use crate::FetchError;
    use std::cell::Cell;

    /// Scripted page sequence; pages beyond the script are empty with no
    /// continuation signal.
    struct FakeSource {
        pages: Vec<Result<ListingPage, ()>>,
        calls: Cell<u32>,
    }

    impl FakeSource {
        fn new(pages: Vec<Result<ListingPage, ()>>) -> Self {
            Self {
                pages,
                calls: Cell::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.get()
        }
    }

    impl ListingSource for FakeSource {
        async fn fetch_page(&self, query: &Query) -> Result<ListingPage, FetchError> {
            self.calls.set(self.calls.get() + 1);
            let index = (query.page - 1) as usize;
            match self.pages.get(index) {
                Some(Ok(page)) => Ok(page.clone()),
                Some(Err(())) => Err(FetchError::Status {
                    url: format!("fake://page/{}", query.page),
                    status: 500,
                }),
                None => Ok(page_of(&[], false)),
            }
        }
    }

    fn item(id: &str) -> ItemReference {
        ItemReference {
            id: id.to_string(),
            title: id.to_uppercase(),
            url: format!("https://example.com/job/{}", id),
        }
    }

    fn page_of(ids: &[&str], has_more: bool) -> ListingPage {
        ListingPage {
            items: ids.iter().map(|id| item(id)).collect(),
            has_more,
        }
    }

    fn sequential() -> WorkerPool {
        WorkerPool::new(1).unwrap()
    }

    fn ids(store: &DedupStore) -> Vec<&str> {
        store.values().iter().map(|i| i.id.as_str()).collect()
    }

    /// The re-serving site: [A,B], [B,C], [C,C], []. No-new-items mode must
    /// stop as soon as a page contributes nothing new.
    fn reserving_pages() -> Vec<Result<ListingPage, ()>> {
        vec![
            Ok(page_of(&["a", "b"], true)),
            Ok(page_of(&["b", "c"], true)),
            Ok(page_of(&["c", "c"], true)),
            Ok(page_of(&[], false)),
        ]
    }

    #[tokio::test]
    async fn test_no_new_items_mode_terminates_early() {
        let source = FakeSource::new(reserving_pages());
        let pool = sequential();
        let paginator = Paginator::new(&source, pool, TerminationMode::NoNewItems, None);

        let mut store = DedupStore::new();
        paginator.crawl("testcity", None, &mut store).await;

        assert_eq!(ids(&store), vec!["a", "b", "c"]);
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn test_empty_page_mode_runs_to_the_empty_page() {
        let source = FakeSource::new(reserving_pages());
        let pool = sequential();
        let paginator = Paginator::new(&source, pool, TerminationMode::EmptyPage, None);

        let mut store = DedupStore::new();
        paginator.crawl("testcity", None, &mut store).await;

        assert_eq!(ids(&store), vec!["a", "b", "c"]);
        assert_eq!(source.calls(), 4);
    }

    #[tokio::test]
    async fn test_no_new_items_defends_against_endless_reserving() {
        // Page 4 onwards would re-serve [c] with has_more=true forever;
        // empty-page mode would never stop here.
        let mut pages = vec![
            Ok(page_of(&["a", "b"], true)),
            Ok(page_of(&["b", "c"], true)),
        ];
        pages.extend((0..20).map(|_| Ok(page_of(&["c"], true))));

        let source = FakeSource::new(pages);
        let pool = sequential();
        let paginator = Paginator::new(&source, pool, TerminationMode::NoNewItems, None);

        let mut store = DedupStore::new();
        paginator.crawl("testcity", None, &mut store).await;

        assert_eq!(ids(&store), vec!["a", "b", "c"]);
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn test_stops_on_has_more_false() {
        let source = FakeSource::new(vec![Ok(page_of(&["a", "b"], false))]);
        let pool = sequential();
        let paginator = Paginator::new(&source, pool, TerminationMode::NoNewItems, None);

        let mut store = DedupStore::new();
        paginator.crawl("testcity", None, &mut store).await;

        assert_eq!(ids(&store), vec!["a", "b"]);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_fetch_error_ends_the_query() {
        let source = FakeSource::new(vec![
            Ok(page_of(&["a", "b"], true)),
            Err(()),
            Ok(page_of(&["z"], true)), // must never be reached
        ]);
        let pool = sequential();
        let paginator = Paginator::new(&source, pool, TerminationMode::NoNewItems, None);

        let mut store = DedupStore::new();
        paginator.crawl("testcity", None, &mut store).await;

        assert_eq!(ids(&store), vec!["a", "b"]);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_mixed_batch_still_advances() {
        // Width 2: page 1 is empty but page 2 has fresh content, so the
        // batch must advance to pages 3-4 before stopping.
        let source = FakeSource::new(vec![
            Ok(page_of(&[], true)),
            Ok(page_of(&["a"], true)),
            Ok(page_of(&[], false)),
            Ok(page_of(&[], false)),
        ]);
        let pool = WorkerPool::new(2).unwrap();
        let paginator = Paginator::new(&source, pool, TerminationMode::NoNewItems, None);

        let mut store = DedupStore::new();
        paginator.crawl("testcity", None, &mut store).await;

        assert_eq!(ids(&store), vec!["a"]);
        assert_eq!(source.calls(), 4);
    }

    #[tokio::test]
    async fn test_max_pages_caps_the_walk() {
        // Every page has fresh content and claims more; only the cap stops us.
        let pages: Vec<Result<ListingPage, ()>> = (0..50)
            .map(|n| {
                let id = format!("item-{}", n);
                Ok(page_of(&[id.as_str()], true))
            })
            .collect();

        let source = FakeSource::new(pages);
        let pool = sequential();
        let paginator = Paginator::new(&source, pool, TerminationMode::NoNewItems, Some(3));

        let mut store = DedupStore::new();
        let fetched = paginator.crawl("testcity", None, &mut store).await;

        assert_eq!(fetched, 3);
        assert_eq!(store.len(), 3);
    }
}
