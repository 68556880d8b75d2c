//! Paginator service
//!
//! Wraps a [`PageFetcher`] with navigation, a per-index page cache and
//! change callbacks. Concurrent requests for the same index share one
//! in-flight fetch.
//!
//! Every navigation takes a ticket. A completed fetch only replaces the
//! current page when no newer navigation has been applied in the meantime,
//! and [`Paginator::reload`] starts a new generation so fetches issued
//! before it are neither cached nor applied.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bc_core::error::ConsoleError;
use bc_core::listeners::{ListenerGuard, Listeners};
use bc_core::pagination::{Page, PageRequest, MAX_PAGE_SIZE};
use bc_core::result::ConsoleResult;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;

/// Source of pages for a paginator
#[async_trait]
pub trait PageFetcher<T>: Send + Sync {
    async fn fetch(&self, request: PageRequest) -> ConsoleResult<Page<T>>;
}

/// What listeners see when the current page changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSnapshot {
    pub index: u32,
    pub size: u32,
    pub total_count: u64,
    pub total_pages: u32,
    pub rows: usize,
}

impl PageSnapshot {
    fn of<T>(page: &Page<T>) -> Self {
        Self {
            index: page.index,
            size: page.size,
            total_count: page.total_count,
            total_pages: page.total_pages(),
            rows: page.len(),
        }
    }
}

type SharedFetch<T> = Shared<BoxFuture<'static, ConsoleResult<Page<T>>>>;

struct InFlight<T> {
    id: u64,
    generation: u64,
    future: SharedFetch<T>,
}

/// Identifies the fetch a caller is waiting on
#[derive(Debug, Clone, Copy)]
struct FetchKey {
    id: u64,
    generation: u64,
}

struct State<T> {
    /// Filter, sort and size; the index is ignored
    request: PageRequest,
    current: Option<Page<T>>,
    cache: HashMap<u32, Page<T>>,
    in_flight: HashMap<u32, InFlight<T>>,
    generation: u64,
    next_fetch: u64,
    issued: u64,
    applied: u64,
    last_error: Option<ConsoleError>,
}

impl<T> State<T> {
    fn ticket(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    fn current_index(&self) -> u32 {
        self.current.as_ref().map(|p| p.index).unwrap_or(0)
    }
}

struct Inner<T> {
    fetcher: Arc<dyn PageFetcher<T>>,
    max_page_size: u32,
    state: Mutex<State<T>>,
    listeners: Listeners<PageSnapshot>,
}

/// Navigable, cached view over a paged collection
pub struct Paginator<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Paginator<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Paginator<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a paginator; nothing is fetched until the first navigation
    pub fn new(fetcher: Arc<dyn PageFetcher<T>>, request: PageRequest) -> Self {
        Self::with_max_page_size(fetcher, request, MAX_PAGE_SIZE)
    }

    /// Like [`Paginator::new`], with page sizes capped at `max_page_size`
    pub fn with_max_page_size(
        fetcher: Arc<dyn PageFetcher<T>>,
        mut request: PageRequest,
        max_page_size: u32,
    ) -> Self {
        let max_page_size = max_page_size.clamp(1, MAX_PAGE_SIZE);
        request.size = request.size.clamp(1, max_page_size);
        Self {
            inner: Arc::new(Inner {
                fetcher,
                max_page_size,
                state: Mutex::new(State {
                    request,
                    current: None,
                    cache: HashMap::new(),
                    in_flight: HashMap::new(),
                    generation: 0,
                    next_fetch: 0,
                    issued: 0,
                    applied: 0,
                    last_error: None,
                }),
                listeners: Listeners::new(),
            }),
        }
    }

    /// Navigate to `index`, from the cache when possible
    pub async fn get(&self, index: u32) -> ConsoleResult<Page<T>> {
        let (ticket, key, future) = {
            let mut state = self.inner.state.lock();
            let ticket = state.ticket();
            if let Some(page) = state.cache.get(&index).cloned() {
                state.applied = ticket;
                state.current = Some(page.clone());
                state.last_error = None;
                drop(state);
                tracing::debug!(index, "page served from cache");
                self.inner.listeners.notify(&PageSnapshot::of(&page));
                return Ok(page);
            }
            let (key, future) = self.start_fetch(&mut state, index);
            (ticket, key, future)
        };

        let result = future.await;
        self.complete(index, ticket, key, result)
    }

    pub async fn go_to(&self, index: u32) -> ConsoleResult<Page<T>> {
        self.get(index).await
    }

    /// Next page; stays put on the last page
    pub async fn next(&self) -> ConsoleResult<Page<T>> {
        let target = {
            let state = self.inner.state.lock();
            match &state.current {
                Some(page) if page.has_next() => page.index + 1,
                Some(page) => return Ok(page.clone()),
                None => 0,
            }
        };
        self.get(target).await
    }

    /// Previous page; stays put on the first page
    pub async fn prev(&self) -> ConsoleResult<Page<T>> {
        let target = {
            let state = self.inner.state.lock();
            match &state.current {
                Some(page) if page.has_previous() => page.index - 1,
                Some(page) => return Ok(page.clone()),
                None => 0,
            }
        };
        self.get(target).await
    }

    /// Re-fetch the current index, bypassing the cache
    pub async fn refresh(&self) -> ConsoleResult<Page<T>> {
        let (index, ticket, key, future) = {
            let mut state = self.inner.state.lock();
            let index = state.current_index();
            let ticket = state.ticket();
            let (key, future) = self.start_fetch(&mut state, index);
            (index, ticket, key, future)
        };

        let result = future.await;
        self.complete(index, ticket, key, result)
    }

    /// Drop every cached page and fetch the first one again
    pub async fn reload(&self) -> ConsoleResult<Page<T>> {
        let (ticket, key, future) = {
            let mut state = self.inner.state.lock();
            state.generation += 1;
            state.cache.clear();
            state.in_flight.clear();
            tracing::debug!(generation = state.generation, "reloading");
            let ticket = state.ticket();
            let (key, future) = self.start_fetch(&mut state, 0);
            (ticket, key, future)
        };

        let result = future.await;
        self.complete(0, ticket, key, result)
    }

    /// Replace the filter and reload
    pub async fn set_query(&self, q: Option<String>) -> ConsoleResult<Page<T>> {
        {
            let mut state = self.inner.state.lock();
            state.request.q = q.filter(|q| !q.is_empty());
        }
        self.reload().await
    }

    /// Replace the sort and reload
    pub async fn set_sort(&self, sort: Option<String>) -> ConsoleResult<Page<T>> {
        {
            let mut state = self.inner.state.lock();
            state.request.sort = sort.filter(|s| !s.is_empty());
        }
        self.reload().await
    }

    /// Change the page length and reload
    pub async fn set_page_size(&self, size: u32) -> ConsoleResult<Page<T>> {
        {
            let mut state = self.inner.state.lock();
            state.request.size = size.clamp(1, self.inner.max_page_size);
        }
        self.reload().await
    }

    /// Whether `index` is cached for the current filter
    pub fn has(&self, index: u32) -> bool {
        self.inner.state.lock().cache.contains_key(&index)
    }

    pub fn current(&self) -> Option<Page<T>> {
        self.inner.state.lock().current.clone()
    }

    /// Borrow the current page without cloning it.
    ///
    /// `f` runs under the paginator's lock and must not call back into it.
    pub fn with_current<R>(&self, f: impl FnOnce(Option<&Page<T>>) -> R) -> R {
        let state = self.inner.state.lock();
        f(state.current.as_ref())
    }

    /// Mutate the current rows in place.
    ///
    /// `f` returns whether it changed anything; listeners are notified only
    /// then. Returns false when there is no current page.
    pub fn patch(&self, f: impl FnOnce(&mut Vec<T>) -> bool) -> bool {
        let snapshot = {
            let mut state = self.inner.state.lock();
            let Some(page) = state.current.as_mut() else {
                return false;
            };
            if !f(&mut page.data) {
                return false;
            }
            let page = page.clone();
            if state.cache.contains_key(&page.index) {
                state.cache.insert(page.index, page.clone());
            }
            PageSnapshot::of(&page)
        };
        self.inner.listeners.notify(&snapshot);
        true
    }

    pub fn request(&self) -> PageRequest {
        let state = self.inner.state.lock();
        state.request.at(state.current_index())
    }

    pub fn is_loading(&self) -> bool {
        !self.inner.state.lock().in_flight.is_empty()
    }

    /// Error of the last failed navigation, cleared by the next success
    pub fn last_error(&self) -> Option<ConsoleError> {
        self.inner.state.lock().last_error.clone()
    }

    /// Call `callback` whenever the current page changes
    pub fn on_update<F>(&self, callback: F) -> ListenerGuard
    where
        F: Fn(&PageSnapshot) + Send + Sync + 'static,
    {
        self.inner.listeners.register(callback)
    }

    /// Join the in-flight fetch for `index` or start a new one
    fn start_fetch(&self, state: &mut State<T>, index: u32) -> (FetchKey, SharedFetch<T>) {
        if let Some(existing) = state.in_flight.get(&index) {
            if existing.generation == state.generation {
                tracing::debug!(index, "joining in-flight fetch");
                let key = FetchKey {
                    id: existing.id,
                    generation: existing.generation,
                };
                return (key, existing.future.clone());
            }
        }

        state.next_fetch += 1;
        let key = FetchKey {
            id: state.next_fetch,
            generation: state.generation,
        };
        let fetcher = self.inner.fetcher.clone();
        let request = state.request.at(index);
        tracing::debug!(index, size = request.size, "fetching page");
        let future = async move { fetcher.fetch(request).await }
            .boxed()
            .shared();
        state.in_flight.insert(
            index,
            InFlight {
                id: key.id,
                generation: key.generation,
                future: future.clone(),
            },
        );
        (key, future)
    }

    fn complete(
        &self,
        index: u32,
        ticket: u64,
        key: FetchKey,
        result: ConsoleResult<Page<T>>,
    ) -> ConsoleResult<Page<T>> {
        let snapshot = {
            let mut state = self.inner.state.lock();
            if state.in_flight.get(&index).map(|f| f.id) == Some(key.id) {
                state.in_flight.remove(&index);
            }

            let fresh_generation = key.generation == state.generation;
            let newest = ticket > state.applied;
            match &result {
                Ok(_) if !fresh_generation => {
                    tracing::debug!(index, "discarding page fetched before reload");
                    None
                }
                Ok(page) => {
                    state.cache.insert(index, page.clone());
                    if newest {
                        state.applied = ticket;
                        state.current = Some(page.clone());
                        state.last_error = None;
                        Some(PageSnapshot::of(page))
                    } else {
                        tracing::debug!(index, "newer navigation already applied");
                        None
                    }
                }
                Err(err) => {
                    tracing::warn!(index, error = %err, "page fetch failed");
                    if fresh_generation && newest {
                        state.last_error = Some(err.clone());
                    }
                    None
                }
            }
        };

        if let Some(snapshot) = snapshot {
            self.inner.listeners.notify(&snapshot);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::Notify;

    use super::*;

    /// 120 numbered rows; fetches for gated indices wait for a notify
    struct FakeFetcher {
        total: u64,
        calls: Mutex<HashMap<u32, usize>>,
        gates: Mutex<HashMap<u32, Arc<Notify>>>,
        failing: AtomicUsize,
    }

    impl FakeFetcher {
        fn new(total: u64) -> Arc<Self> {
            Arc::new(Self {
                total,
                calls: Mutex::new(HashMap::new()),
                gates: Mutex::new(HashMap::new()),
                failing: AtomicUsize::new(0),
            })
        }

        fn calls(&self, index: u32) -> usize {
            self.calls.lock().get(&index).copied().unwrap_or(0)
        }

        fn total_calls(&self) -> usize {
            self.calls.lock().values().sum()
        }

        fn gate(&self, index: u32) -> Arc<Notify> {
            self.gates
                .lock()
                .entry(index)
                .or_insert_with(|| Arc::new(Notify::new()))
                .clone()
        }

        fn fail_next(&self, count: usize) {
            self.failing.store(count, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl PageFetcher<u64> for FakeFetcher {
        async fn fetch(&self, request: PageRequest) -> ConsoleResult<Page<u64>> {
            *self.calls.lock().entry(request.index).or_insert(0) += 1;

            let gate = self.gates.lock().get(&request.index).cloned();
            match gate {
                Some(gate) => gate.notified().await,
                None => tokio::task::yield_now().await,
            }

            if self
                .failing
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(ConsoleError::Http {
                    status: 503,
                    message: "unavailable".into(),
                });
            }

            let start = request.index as u64 * request.size as u64;
            let end = (start + request.size as u64).min(self.total);
            let data = (start..end).collect();
            Ok(Page::new(data, request.index, request.size, self.total))
        }
    }

    fn paginator(fetcher: &Arc<FakeFetcher>, size: u32) -> Paginator<u64> {
        Paginator::new(fetcher.clone(), PageRequest::new(0, size))
    }

    #[tokio::test]
    async fn test_get_scenario() {
        let fetcher = FakeFetcher::new(120);
        let pages = paginator(&fetcher, 25);

        let page = pages.get(2).await.unwrap();
        assert_eq!(page.index, 2);
        assert_eq!(page.len(), 25);
        assert_eq!(page.total_count, 120);
        assert_eq!(page.total_pages(), 5);
        assert_eq!(page.data[0], 50);
        assert!(pages.has(2));
        assert!(!pages.has(1));
    }

    #[tokio::test]
    async fn test_concurrent_get_shares_fetch() {
        let fetcher = FakeFetcher::new(120);
        let pages = paginator(&fetcher, 25);

        let (a, b) = tokio::join!(pages.get(1), pages.get(1));
        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(fetcher.calls(1), 1);
        assert!(!pages.is_loading());
    }

    #[tokio::test]
    async fn test_cached_get_does_not_fetch() {
        let fetcher = FakeFetcher::new(120);
        let pages = paginator(&fetcher, 25);

        pages.get(0).await.unwrap();
        pages.get(1).await.unwrap();
        pages.get(0).await.unwrap();
        assert_eq!(fetcher.calls(0), 1);
        assert_eq!(pages.current().unwrap().index, 0);
    }

    #[tokio::test]
    async fn test_refresh_keeps_index() {
        let fetcher = FakeFetcher::new(120);
        let pages = paginator(&fetcher, 25);

        pages.get(3).await.unwrap();
        let page = pages.refresh().await.unwrap();
        assert_eq!(page.index, 3);
        assert_eq!(fetcher.calls(3), 2);
        assert_eq!(fetcher.total_calls(), 2);
    }

    #[tokio::test]
    async fn test_reload_resets_and_discards_cache() {
        let fetcher = FakeFetcher::new(120);
        let pages = paginator(&fetcher, 25);

        pages.get(0).await.unwrap();
        pages.get(3).await.unwrap();
        let page = pages.reload().await.unwrap();
        assert_eq!(page.index, 0);
        assert!(pages.has(0));
        assert!(!pages.has(3));
        assert_eq!(fetcher.calls(0), 2);
    }

    #[tokio::test]
    async fn test_next_and_prev_stop_at_bounds() {
        let fetcher = FakeFetcher::new(50);
        let pages = paginator(&fetcher, 25);

        assert_eq!(pages.next().await.unwrap().index, 0);
        assert_eq!(pages.next().await.unwrap().index, 1);
        assert_eq!(pages.next().await.unwrap().index, 1);
        assert_eq!(fetcher.calls(1), 1);

        assert_eq!(pages.prev().await.unwrap().index, 0);
        assert_eq!(pages.prev().await.unwrap().index, 0);
        assert_eq!(fetcher.total_calls(), 2);
    }

    #[tokio::test]
    async fn test_failure_keeps_current_page() {
        let fetcher = FakeFetcher::new(120);
        let pages = paginator(&fetcher, 25);

        pages.get(1).await.unwrap();
        fetcher.fail_next(1);
        let err = pages.get(2).await.unwrap_err();
        assert_eq!(err.status_code(), Some(503));
        assert_eq!(pages.current().unwrap().index, 1);
        assert!(pages.last_error().is_some());
        assert!(!pages.has(2));

        pages.get(2).await.unwrap();
        assert!(pages.last_error().is_none());
        assert_eq!(fetcher.calls(2), 2);
    }

    #[tokio::test]
    async fn test_late_completion_does_not_replace_newer_navigation() {
        let fetcher = FakeFetcher::new(120);
        let pages = paginator(&fetcher, 25);
        let slow = fetcher.gate(1);
        let fast = fetcher.gate(2);

        let release = async {
            tokio::task::yield_now().await;
            fast.notify_one();
            for _ in 0..5 {
                tokio::task::yield_now().await;
            }
            slow.notify_one();
        };
        let (first, second, _) = tokio::join!(pages.get(1), pages.get(2), release);

        assert_eq!(first.unwrap().index, 1);
        assert_eq!(second.unwrap().index, 2);
        assert_eq!(pages.current().unwrap().index, 2);
        assert!(pages.has(1));
    }

    #[tokio::test]
    async fn test_completion_before_reload_is_not_cached() {
        let fetcher = FakeFetcher::new(120);
        let pages = paginator(&fetcher, 25);
        let slow = fetcher.gate(4);

        let release = async {
            tokio::task::yield_now().await;
            slow.notify_one();
        };
        let (stale, reloaded, _) = tokio::join!(pages.get(4), pages.reload(), release);

        assert!(stale.is_ok());
        assert_eq!(reloaded.unwrap().index, 0);
        assert_eq!(pages.current().unwrap().index, 0);
        assert!(!pages.has(4));
    }

    #[tokio::test]
    async fn test_on_update_and_patch() {
        let fetcher = FakeFetcher::new(120);
        let pages = paginator(&fetcher, 25);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        let guard = pages.on_update(move |snapshot| sink.lock().push(*snapshot));

        pages.get(1).await.unwrap();
        assert!(pages.patch(|rows| {
            rows[0] = 999;
            true
        }));
        assert!(!pages.patch(|_| false));
        assert_eq!(pages.with_current(|page| page.map(|p| p.data[0])), Some(999));
        assert_eq!(seen.lock().len(), 2);
        assert_eq!(seen.lock()[0].index, 1);
        assert_eq!(seen.lock()[0].total_pages, 5);

        drop(guard);
        pages.get(2).await.unwrap();
        assert_eq!(seen.lock().len(), 2);

        // patched rows survive a cached revisit
        pages.get(1).await.unwrap();
        assert_eq!(pages.current().unwrap().data[0], 999);
    }

    #[tokio::test]
    async fn test_set_query_reloads() {
        let fetcher = FakeFetcher::new(120);
        let pages = paginator(&fetcher, 25);

        pages.get(2).await.unwrap();
        pages.set_query(Some("status==BUILDING".into())).await.unwrap();
        assert_eq!(pages.request().q.as_deref(), Some("status==BUILDING"));
        assert_eq!(pages.current().unwrap().index, 0);
        assert!(!pages.has(2));

        pages.set_page_size(500).await.unwrap();
        assert_eq!(pages.request().size, MAX_PAGE_SIZE);
    }

    #[tokio::test]
    async fn test_configured_max_page_size_caps_requests() {
        let fetcher = FakeFetcher::new(120);
        let pages = Paginator::with_max_page_size(fetcher.clone(), PageRequest::new(0, 150), 100);
        assert_eq!(pages.request().size, 100);

        pages.set_page_size(25).await.unwrap();
        assert_eq!(pages.request().size, 25);

        let page = pages.set_page_size(150).await.unwrap();
        assert_eq!(pages.request().size, 100);
        assert_eq!(page.len(), 100);
        assert_eq!(page.total_pages(), 2);
    }

    #[tokio::test]
    async fn test_is_loading_while_fetch_in_flight() {
        let fetcher = FakeFetcher::new(120);
        let pages = paginator(&fetcher, 25);
        let gate = fetcher.gate(1);
        assert!(!pages.is_loading());

        let observer = pages.clone();
        let check = async {
            tokio::task::yield_now().await;
            let loading = observer.is_loading();
            gate.notify_one();
            loading
        };
        let (page, loading) = tokio::join!(pages.get(1), check);

        assert!(loading);
        assert_eq!(page.unwrap().index, 1);
        assert!(!pages.is_loading());
    }
}
