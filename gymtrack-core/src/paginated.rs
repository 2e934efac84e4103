//! Paginated collection cache.
//!
//! Fetches the whole filtered, sorted collection once per dataset identity,
//! keeps it in memory and serves fixed-size pages by slicing locally. Memory
//! is traded for round-trips: page navigation never reaches the store.
//!
//! Fetches are tagged with a generation number. When loads overlap, only the
//! most recently issued one may update the cache; an older response arriving
//! late is dropped.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::pager::{PageBounds, Pager};
use crate::query::QueryDescriptor;
use crate::store::DocumentStore;

/// Snapshot of the cache handed to presentation layers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView<T> {
    pub data: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
    pub total_docs: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

impl<T> PageView<T> {
    /// Convert the page items, keeping the metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageView<U> {
        PageView {
            data: self.data.into_iter().map(f).collect(),
            loading: self.loading,
            error: self.error,
            total_docs: self.total_docs,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}

struct CacheState<T> {
    descriptor: Option<QueryDescriptor>,
    pager: Pager<T>,
    loading: bool,
    error: Option<String>,
    /// Generation of the most recently issued fetch
    issued: u64,
}

impl<T> CacheState<T> {
    /// Start a fetch and return its generation.
    fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.loading = true;
        self.issued
    }
}

impl<T: Clone> CacheState<T> {
    fn view(&self) -> PageView<T> {
        PageView {
            data: self.pager.visible().to_vec(),
            loading: self.loading,
            error: self.error.clone(),
            total_docs: self.pager.total_count(),
            page: self.pager.page(),
            page_size: self.pager.page_size(),
            total_pages: self.pager.total_pages(),
        }
    }
}

/// Page-at-a-time access to a remote collection.
///
/// Cloning yields another handle to the same cache.
pub struct PaginatedCollection<T> {
    store: Arc<dyn DocumentStore>,
    state: Arc<Mutex<CacheState<T>>>,
}

impl<T> Clone for PaginatedCollection<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> PaginatedCollection<T>
where
    T: DeserializeOwned + Clone + Send + 'static,
{
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_bounds(store, PageBounds::Tolerant)
    }

    /// Create a cache whose navigation follows `bounds`.
    pub fn with_bounds(store: Arc<dyn DocumentStore>, bounds: PageBounds) -> Self {
        Self {
            store,
            state: Arc::new(Mutex::new(CacheState {
                descriptor: None,
                pager: Pager::default().with_bounds(bounds),
                loading: false,
                error: None,
                issued: 0,
            })),
        }
    }

    /// Point the cache at `descriptor`.
    ///
    /// A new dataset identity (path, filters, order field) triggers exactly
    /// one fetch and rewinds to page 0. The same identity with a different
    /// page size only re-slices. Returns whether a fetch was issued.
    pub async fn load(&self, descriptor: QueryDescriptor) -> bool {
        let generation = {
            let mut state = self.state.lock().await;
            let current = state
                .descriptor
                .as_ref()
                .filter(|current| current.same_dataset(&descriptor))
                .map(|current| current.page_size);
            if let Some(page_size) = current {
                if page_size != descriptor.page_size {
                    state.pager.set_page_size(descriptor.page_size);
                    state.descriptor = Some(descriptor);
                }
                return false;
            }
            // The requested page size holds even if the fetch fails.
            if state.pager.page_size() != descriptor.page_size.max(1) {
                state.pager.set_page_size(descriptor.page_size);
            }
            state.descriptor = Some(descriptor.clone());
            state.issue()
        };

        self.fetch(descriptor, generation).await;
        true
    }

    /// Re-fetch the current dataset. Returns false when nothing was loaded yet.
    pub async fn refresh(&self) -> bool {
        let pending = {
            let mut state = self.state.lock().await;
            match state.descriptor.clone() {
                Some(descriptor) => Some((descriptor, state.issue())),
                None => None,
            }
        };
        match pending {
            Some((descriptor, generation)) => {
                self.fetch(descriptor, generation).await;
                true
            }
            None => false,
        }
    }

    async fn fetch(&self, descriptor: QueryDescriptor, generation: u64) {
        tracing::debug!(
            path = %descriptor.path,
            filters = descriptor.filters.len(),
            generation,
            "fetching collection"
        );

        let result = self
            .store
            .query(&descriptor.to_query())
            .await
            .and_then(|docs| {
                docs.iter()
                    .map(|doc| doc.decode::<T>())
                    .collect::<Result<Vec<T>, _>>()
            });

        let mut state = self.state.lock().await;
        if generation != state.issued {
            tracing::debug!(
                path = %descriptor.path,
                generation,
                latest = state.issued,
                "discarding stale fetch result"
            );
            return;
        }

        state.loading = false;
        match result {
            Ok(items) => {
                tracing::debug!(path = %descriptor.path, total = items.len(), "collection cached");
                state.pager.replace(items);
                state.error = None;
            }
            Err(err) => {
                tracing::warn!(path = %descriptor.path, error = %err, "collection fetch failed");
                state.error = Some(err.to_string());
            }
        }
    }

    /// Move to page `n`. Under the tolerant policy an index past the end yields an empty page.
    pub async fn go_to_page(&self, n: usize) -> PageView<T> {
        let mut state = self.state.lock().await;
        state.pager.go_to_page(n);
        state.view()
    }

    pub async fn next_page(&self) -> PageView<T> {
        let mut state = self.state.lock().await;
        state.pager.next_page();
        state.view()
    }

    pub async fn prev_page(&self) -> PageView<T> {
        let mut state = self.state.lock().await;
        state.pager.prev_page();
        state.view()
    }

    /// Current page and metadata.
    pub async fn view(&self) -> PageView<T> {
        self.state.lock().await.view()
    }

    /// The whole cached dataset, in store order.
    pub async fn items(&self) -> Vec<T> {
        self.state.lock().await.pager.items().to_vec()
    }

    /// The descriptor the cache currently points at.
    pub async fn descriptor(&self) -> Option<QueryDescriptor> {
        self.state.lock().await.descriptor.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde::Deserialize;
    use serde_json::{json, Value};
    use tokio::sync::Notify;

    use crate::document::{Document, Fields};
    use crate::error::{Result, StoreError};
    use crate::query::{CollectionQuery, Filter, FilterOp};
    use crate::store::MemoryStore;

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct Visit {
        id: String,
        seq: u32,
        branch: String,
    }

    /// Counts reads, can be switched to fail, can hold a collection's reads until released.
    struct ScriptedStore {
        inner: MemoryStore,
        reads: AtomicUsize,
        failing: AtomicBool,
        gate: Notify,
        gated_branch: Option<&'static str>,
    }

    impl ScriptedStore {
        async fn seeded(total: u32) -> Self {
            let inner = MemoryStore::new();
            for seq in 0..total {
                let branch = if seq % 2 == 0 { "North" } else { "South" };
                let Value::Object(fields) = json!({ "seq": seq, "branch": branch }) else {
                    unreachable!()
                };
                inner.put("history", format!("v{seq:03}"), fields).await;
            }
            Self {
                inner,
                reads: AtomicUsize::new(0),
                failing: AtomicBool::new(false),
                gate: Notify::new(),
                gated_branch: None,
            }
        }
    }

    #[async_trait]
    impl DocumentStore for ScriptedStore {
        async fn query(&self, query: &CollectionQuery) -> Result<Vec<Document>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if let Some(branch) = self.gated_branch {
                if query.filters.iter().any(|f| f.value == json!(branch)) {
                    self.gate.notified().await;
                }
            }
            if self.failing.load(Ordering::SeqCst) {
                return Err(StoreError::backend("permission denied"));
            }
            self.inner.query(query).await
        }

        async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
            self.inner.get(collection, id).await
        }

        async fn insert(&self, collection: &str, fields: Fields) -> Result<Document> {
            self.inner.insert(collection, fields).await
        }

        async fn update(&self, collection: &str, id: &str, patch: Fields) -> Result<Document> {
            self.inner.update(collection, id, patch).await
        }

        async fn delete(&self, collection: &str, id: &str) -> Result<()> {
            self.inner.delete(collection, id).await
        }
    }

    fn history(page_size: usize) -> QueryDescriptor {
        QueryDescriptor::new("history", "seq").page_size(page_size)
    }

    #[tokio::test]
    async fn pages_forty_five_items_locally() {
        let store = Arc::new(ScriptedStore::seeded(45).await);
        let cache: PaginatedCollection<Visit> = PaginatedCollection::new(store.clone());

        assert!(cache.load(history(20)).await);
        let view = cache.view().await;
        assert_eq!(view.total_docs, 45);
        assert_eq!(view.total_pages, 3);
        assert_eq!(view.page, 0);
        assert_eq!(view.data.len(), 20);
        // Most recent first.
        assert_eq!(view.data[0].seq, 44);

        assert_eq!(cache.next_page().await.data.len(), 20);
        assert_eq!(cache.next_page().await.data.len(), 5);
        assert!(cache.go_to_page(3).await.data.is_empty());
        assert_eq!(cache.go_to_page(0).await.data[0].seq, 44);

        assert_eq!(store.reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn same_descriptor_does_not_refetch() {
        let store = Arc::new(ScriptedStore::seeded(5).await);
        let cache: PaginatedCollection<Visit> = PaginatedCollection::new(store.clone());

        assert!(cache.load(history(2)).await);
        cache.go_to_page(1).await;
        assert!(!cache.load(history(2)).await);

        assert_eq!(store.reads.load(Ordering::SeqCst), 1);
        assert_eq!(cache.view().await.page, 1);
    }

    #[tokio::test]
    async fn page_size_change_reslices_without_fetch() {
        let store = Arc::new(ScriptedStore::seeded(10).await);
        let cache: PaginatedCollection<Visit> = PaginatedCollection::new(store.clone());

        cache.load(history(5)).await;
        cache.go_to_page(1).await;
        assert!(!cache.load(history(3)).await);

        let view = cache.view().await;
        assert_eq!(view.page, 0);
        assert_eq!(view.page_size, 3);
        assert_eq!(view.total_pages, 4);
        assert_eq!(store.reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn filter_change_fetches_once_and_rewinds() {
        let store = Arc::new(ScriptedStore::seeded(6).await);
        let cache: PaginatedCollection<Visit> = PaginatedCollection::new(store.clone());

        cache
            .load(history(1).filter(Filter::new("seq", FilterOp::Ge, 0)))
            .await;
        cache.go_to_page(4).await;

        // Different filter, identical result set.
        assert!(cache
            .load(history(1).filter(Filter::new("seq", FilterOp::Gt, -1)))
            .await);

        assert_eq!(store.reads.load(Ordering::SeqCst), 2);
        let view = cache.view().await;
        assert_eq!(view.page, 0);
        assert_eq!(view.total_docs, 6);
    }

    #[tokio::test]
    async fn failure_keeps_previous_page() {
        let store = Arc::new(ScriptedStore::seeded(8).await);
        let cache: PaginatedCollection<Visit> = PaginatedCollection::new(store.clone());

        cache.load(history(3)).await;
        cache.go_to_page(1).await;
        let before = cache.view().await;
        assert!(before.error.is_none());

        store.failing.store(true, Ordering::SeqCst);
        assert!(cache.load(history(3).filter(Filter::eq("branch", "North"))).await);

        let after = cache.view().await;
        assert_eq!(after.data, before.data);
        assert_eq!(after.page, 1);
        assert!(!after.loading);
        assert!(after.error.as_deref().unwrap().contains("permission denied"));

        // Recovery clears the error.
        store.failing.store(false, Ordering::SeqCst);
        assert!(cache.refresh().await);
        let recovered = cache.view().await;
        assert!(recovered.error.is_none());
        assert_eq!(recovered.total_docs, 4);
    }

    #[tokio::test]
    async fn failed_dataset_change_still_applies_page_size() {
        let store = Arc::new(ScriptedStore::seeded(10).await);
        let cache: PaginatedCollection<Visit> = PaginatedCollection::new(store.clone());
        cache.load(history(5)).await;

        store.failing.store(true, Ordering::SeqCst);
        let north = history(3).filter(Filter::eq("branch", "North"));
        assert!(cache.load(north.clone()).await);

        let view = cache.view().await;
        assert!(view.error.is_some());
        assert_eq!(view.page_size, 3);
        assert_eq!(view.total_pages, 4);
        assert_eq!(view.data.len(), 3);

        store.failing.store(false, Ordering::SeqCst);
        assert!(!cache.load(north.clone()).await);
        assert_eq!(cache.view().await.page_size, 3);
        assert_eq!(cache.descriptor().await, Some(north));

        assert!(cache.refresh().await);
        let view = cache.view().await;
        assert!(view.error.is_none());
        assert_eq!(view.page_size, 3);
        assert_eq!(view.total_docs, 5);
        assert!(view.data.iter().all(|v| v.branch == "North"));
    }

    #[tokio::test]
    async fn queued_loads_leave_descriptor_and_data_in_agreement() {
        let store = Arc::new(ScriptedStore::seeded(6).await);
        let cache: PaginatedCollection<Visit> = PaginatedCollection::new(store.clone());
        let north = history(10).filter(Filter::eq("branch", "North"));
        let south = history(10).filter(Filter::eq("branch", "South"));

        let guard = cache.state.lock().await;
        let first = {
            let cache = cache.clone();
            let north = north.clone();
            tokio::spawn(async move { cache.load(north).await })
        };
        let second = {
            let cache = cache.clone();
            let south = south.clone();
            tokio::spawn(async move { cache.load(south).await })
        };
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
        drop(guard);

        assert!(first.await.unwrap());
        assert!(second.await.unwrap());

        assert_eq!(cache.descriptor().await, Some(south));
        let view = cache.view().await;
        assert!(!view.loading);
        assert_eq!(view.total_docs, 3);
        assert!(view.data.iter().all(|v| v.branch == "South"));
    }

    #[tokio::test]
    async fn decode_failure_is_a_fetch_failure() {
        #[derive(Debug, Clone, Deserialize)]
        #[allow(dead_code)]
        struct Strict {
            missing_field: String,
        }

        let store = Arc::new(ScriptedStore::seeded(2).await);
        let cache: PaginatedCollection<Strict> = PaginatedCollection::new(store);
        cache.load(history(2)).await;

        let view = cache.view().await;
        assert!(view.error.is_some());
        assert_eq!(view.total_docs, 0);
    }

    #[tokio::test]
    async fn stale_response_does_not_overwrite_newer() {
        let mut store = ScriptedStore::seeded(6).await;
        store.gated_branch = Some("North");
        let store = Arc::new(store);
        let cache: PaginatedCollection<Visit> = PaginatedCollection::new(store.clone());

        let slow = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.load(history(10).filter(Filter::eq("branch", "North"))).await })
        };
        // Let the slow read reach the gate.
        while store.reads.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        assert!(cache.view().await.loading);

        cache.load(history(10).filter(Filter::eq("branch", "South"))).await;
        assert!(cache.view().await.data.iter().all(|v| v.branch == "South"));

        store.gate.notify_one();
        slow.await.unwrap();

        let view = cache.view().await;
        assert!(!view.loading);
        assert_eq!(view.total_docs, 3);
        assert!(view.data.iter().all(|v| v.branch == "South"));
    }

    #[tokio::test]
    async fn clamp_bounds_option() {
        let store = Arc::new(ScriptedStore::seeded(45).await);
        let cache: PaginatedCollection<Visit> =
            PaginatedCollection::with_bounds(store, PageBounds::Clamp);

        cache.load(history(20)).await;
        let view = cache.go_to_page(9).await;
        assert_eq!(view.page, 2);
        assert_eq!(view.data.len(), 5);
    }

    #[tokio::test]
    async fn refresh_before_load_is_noop() {
        let store = Arc::new(ScriptedStore::seeded(1).await);
        let cache: PaginatedCollection<Visit> = PaginatedCollection::new(store.clone());
        assert!(!cache.refresh().await);
        assert_eq!(store.reads.load(Ordering::SeqCst), 0);
    }
}
