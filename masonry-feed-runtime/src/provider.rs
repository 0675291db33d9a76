//! Search providers: where pages of items come from.

use std::{
    collections::VecDeque,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use futures_util::{FutureExt, future::BoxFuture};
use masonry_feed::{FetchError, Item, PageResponse};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

/// Supplies pages of items for a query.
///
/// `page` is 1-based. The returned future must not borrow from `self`; it is
/// spawned onto the runtime and may outlive the call.
pub trait SearchProvider<P>: Send + Sync + 'static {
    /// Fetches one page.
    fn fetch(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> BoxFuture<'static, Result<PageResponse<P>, FetchError>>;
}

impl<P, T> SearchProvider<P> for Arc<T>
where
    T: SearchProvider<P> + ?Sized,
{
    fn fetch(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> BoxFuture<'static, Result<PageResponse<P>, FetchError>> {
        (**self).fetch(query, page, page_size)
    }
}

/// Serves pages out of a fixed catalog keyed by exact query.
///
/// Unknown queries yield a single empty page. Failures queued with
/// [`fail_next`](Self::fail_next) are returned in order before any further
/// page is served.
pub struct InMemoryProvider<P> {
    catalog: FxHashMap<String, Vec<Item<P>>>,
    failures: Mutex<VecDeque<FetchError>>,
    latency: Option<Duration>,
    calls: AtomicUsize,
}

impl<P> Default for InMemoryProvider<P> {
    fn default() -> Self {
        Self {
            catalog: FxHashMap::default(),
            failures: Mutex::new(VecDeque::new()),
            latency: None,
            calls: AtomicUsize::new(0),
        }
    }
}

impl<P> InMemoryProvider<P> {
    /// Creates an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the full result list for `query`.
    pub fn with_query(mut self, query: impl Into<String>, items: Vec<Item<P>>) -> Self {
        self.catalog.insert(query.into(), items);
        self
    }

    /// Delays every response by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Makes the next fetch fail with `error`.
    pub fn fail_next(&self, error: FetchError) {
        self.failures.lock().push_back(error);
    }

    /// Number of fetches served so far, failures included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl<P: Clone> InMemoryProvider<P> {
    fn page(&self, query: &str, page: u32, page_size: u32) -> PageResponse<P> {
        let Some(items) = self.catalog.get(query) else {
            return PageResponse::new(Vec::new(), false);
        };
        let size = page_size as usize;
        let start = (page.saturating_sub(1) as usize).saturating_mul(size);
        let end = start.saturating_add(size).min(items.len());
        let slice = items.get(start..end).unwrap_or_default();
        PageResponse::new(slice.to_vec(), end < items.len())
    }
}

impl<P> SearchProvider<P> for InMemoryProvider<P>
where
    P: Clone + Send + Sync + 'static,
{
    fn fetch(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> BoxFuture<'static, Result<PageResponse<P>, FetchError>> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let result = match self.failures.lock().pop_front() {
            Some(error) => Err(error),
            None => Ok(self.page(query, page, page_size)),
        };
        match self.latency {
            Some(latency) => async move {
                tokio::time::sleep(latency).await;
                result
            }
            .boxed(),
            None => futures_util::future::ready(result).boxed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn catalog(count: u64) -> Vec<Item<()>> {
        (0..count).map(|id| Item::new(id, 300, 200, ())).collect()
    }

    #[tokio::test]
    async fn pages_slice_the_catalog() {
        let provider = InMemoryProvider::new().with_query("sea", catalog(5));

        let first = provider.fetch("sea", 1, 2).await.expect("in-memory fetch");
        assert_eq!(first.items.len(), 2);
        assert!(first.has_next_page);

        let last = provider.fetch("sea", 3, 2).await.expect("in-memory fetch");
        assert_eq!(last.items.len(), 1);
        assert_eq!(last.items[0].id.0, 4);
        assert!(!last.has_next_page);

        let beyond = provider.fetch("sea", 9, 2).await.expect("in-memory fetch");
        assert!(beyond.items.is_empty());
        assert!(!beyond.has_next_page);
        assert_eq!(provider.calls(), 3);
    }

    #[rstest]
    #[case(1, 2, 2, true)]
    #[case(2, 2, 2, true)]
    #[case(3, 2, 1, false)]
    #[case(9, 2, 0, false)]
    #[case(1, 40, 5, false)]
    #[case(0, 2, 2, true)]
    fn page_slicing(
        #[case] page: u32,
        #[case] page_size: u32,
        #[case] expected_len: usize,
        #[case] expected_more: bool,
    ) {
        let provider = InMemoryProvider::new().with_query("sea", catalog(5));
        let response = provider.page("sea", page, page_size);
        assert_eq!(response.items.len(), expected_len);
        assert_eq!(response.has_next_page, expected_more);
    }

    #[tokio::test]
    async fn unknown_query_is_empty() {
        let provider = InMemoryProvider::<()>::new();
        let page = provider.fetch("nothing", 1, 40).await.expect("in-memory fetch");
        assert!(page.items.is_empty());
        assert!(!page.has_next_page);
    }

    #[tokio::test]
    async fn queued_failures_come_first() {
        let provider = InMemoryProvider::new().with_query("sea", catalog(3));
        provider.fail_next(FetchError::api(500, "boom"));

        let failed = provider.fetch("sea", 1, 40).await;
        assert_eq!(failed, Err(FetchError::api(500, "boom")));

        let recovered = provider.fetch("sea", 1, 40).await.expect("in-memory fetch");
        assert_eq!(recovered.items.len(), 3);
    }
}
