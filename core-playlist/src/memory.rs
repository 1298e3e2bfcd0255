//! In-memory [`OrderedStore`].
//!
//! Behaves like the remote service (same bounds rules, same error kinds) but
//! keeps everything in a map. Counts every call and can be told to fail the
//! next call of a given kind, either before or after applying it, which is
//! how tests reproduce half-finished compound edits and lost responses.

use async_trait::async_trait;
use bridge_traits::error::RemoteResult;
use bridge_traits::{
    Clock, CollectionHandle, ItemReference, OrderedStore, RemoteError, SystemClock, Visibility,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Prefix for generated collection locators.
pub const DEFAULT_LOCATOR_BASE: &str = "https://youtube.com/playlist?list=";

/// The store primitives, for counters and fault injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreCall {
    CreateCollection,
    FetchCollection,
    SearchCollections,
    ListCollections,
    LatestCollection,
    ListItems,
    InsertAt,
    DeleteAt,
    DeleteCollection,
}

impl StoreCall {
    pub fn is_mutation(self) -> bool {
        matches!(
            self,
            StoreCall::CreateCollection
                | StoreCall::InsertAt
                | StoreCall::DeleteAt
                | StoreCall::DeleteCollection
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FaultMode {
    /// Fail without touching state.
    Reject,
    /// Apply the call, then report failure.
    ApplyThenFail,
}

#[derive(Debug)]
struct StoredCollection {
    handle: CollectionHandle,
    visibility: Visibility,
    items: Vec<ItemReference>,
}

#[derive(Debug, Default)]
struct MemoryState {
    collections: Vec<StoredCollection>,
    labels: HashMap<String, String>,
    calls: HashMap<StoreCall, usize>,
    faults: HashMap<StoreCall, VecDeque<(FaultMode, RemoteError)>>,
}

impl MemoryState {
    fn collection(&self, collection_id: &str) -> RemoteResult<&StoredCollection> {
        self.collections
            .iter()
            .find(|c| c.handle.id == collection_id)
            .ok_or_else(|| missing(collection_id))
    }

    fn collection_mut(&mut self, collection_id: &str) -> RemoteResult<&mut StoredCollection> {
        self.collections
            .iter_mut()
            .find(|c| c.handle.id == collection_id)
            .ok_or_else(|| missing(collection_id))
    }

    fn label_for(&self, item_id: &str) -> String {
        self.labels
            .get(item_id)
            .cloned()
            .unwrap_or_else(|| item_id.to_string())
    }

    /// Record the call and pop any queued fault for it.
    fn enter(&mut self, call: StoreCall) -> Option<(FaultMode, RemoteError)> {
        *self.calls.entry(call).or_insert(0) += 1;
        self.faults.get_mut(&call).and_then(VecDeque::pop_front)
    }
}

fn missing(collection_id: &str) -> RemoteError {
    RemoteError::not_found(format!("Playlist {} not found", collection_id))
}

/// Reference implementation of the remote ordered store.
pub struct InMemoryOrderedStore {
    state: Mutex<MemoryState>,
    clock: Arc<dyn Clock>,
    locator_base: String,
}

impl Default for InMemoryOrderedStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryOrderedStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            clock,
            locator_base: DEFAULT_LOCATOR_BASE.to_string(),
        }
    }

    /// Create a populated collection directly; not counted as a call.
    pub async fn seed<S: AsRef<str>>(&self, title: &str, item_ids: &[S]) -> CollectionHandle {
        let mut state = self.state.lock().await;
        let handle = self.new_handle(title);
        let items = item_ids
            .iter()
            .map(|id| ItemReference::new(id.as_ref(), state.label_for(id.as_ref())))
            .collect();
        state.collections.push(StoredCollection {
            handle: handle.clone(),
            visibility: Visibility::Private,
            items,
        });
        handle
    }

    /// Title the store assigns when `item_id` is inserted. Defaults to the id.
    pub async fn register_label(&self, item_id: impl Into<String>, label: impl Into<String>) {
        self.state
            .lock()
            .await
            .labels
            .insert(item_id.into(), label.into());
    }

    /// Fail the next `call` with `error` without applying it.
    pub async fn fail_next(&self, call: StoreCall, error: RemoteError) {
        self.push_fault(call, FaultMode::Reject, error).await;
    }

    /// Apply the next `call`, then report `error` as if the response was lost.
    pub async fn fail_next_after_apply(&self, call: StoreCall, error: RemoteError) {
        self.push_fault(call, FaultMode::ApplyThenFail, error).await;
    }

    async fn push_fault(&self, call: StoreCall, mode: FaultMode, error: RemoteError) {
        self.state
            .lock()
            .await
            .faults
            .entry(call)
            .or_default()
            .push_back((mode, error));
    }

    pub async fn call_count(&self, call: StoreCall) -> usize {
        self.state
            .lock()
            .await
            .calls
            .get(&call)
            .copied()
            .unwrap_or(0)
    }

    pub async fn total_calls(&self) -> usize {
        self.state.lock().await.calls.values().sum()
    }

    /// Calls that could change remote state, failed ones included.
    pub async fn mutation_count(&self) -> usize {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .filter(|(call, _)| call.is_mutation())
            .map(|(_, count)| count)
            .sum()
    }

    pub async fn reset_counters(&self) {
        self.state.lock().await.calls.clear();
    }

    /// Current contents of a collection, without counting a call.
    pub async fn snapshot(&self, collection_id: &str) -> Option<Vec<ItemReference>> {
        let state = self.state.lock().await;
        state
            .collection(collection_id)
            .ok()
            .map(|collection| collection.items.clone())
    }

    pub async fn visibility_of(&self, collection_id: &str) -> Option<Visibility> {
        let state = self.state.lock().await;
        state.collection(collection_id).ok().map(|c| c.visibility)
    }

    fn new_handle(&self, title: &str) -> CollectionHandle {
        let id = format!("PL{}", Uuid::new_v4().simple());
        CollectionHandle {
            locator: format!("{}{}", self.locator_base, id),
            id,
            title: title.to_string(),
            created_at: self.clock.now(),
        }
    }
}

/// Run `apply` unless a `Reject` fault is queued; surface any queued error.
fn run<T>(
    fault: Option<(FaultMode, RemoteError)>,
    apply: impl FnOnce() -> RemoteResult<T>,
) -> RemoteResult<T> {
    match fault {
        None => apply(),
        Some((FaultMode::Reject, error)) => Err(error),
        Some((FaultMode::ApplyThenFail, error)) => {
            apply()?;
            Err(error)
        }
    }
}

#[async_trait]
impl OrderedStore for InMemoryOrderedStore {
    async fn create_collection(
        &self,
        title: &str,
        visibility: Visibility,
    ) -> RemoteResult<CollectionHandle> {
        let mut state = self.state.lock().await;
        let fault = state.enter(StoreCall::CreateCollection);
        let handle = self.new_handle(title);

        run(fault, || {
            state.collections.push(StoredCollection {
                handle: handle.clone(),
                visibility,
                items: Vec::new(),
            });
            debug!(collection_id = %handle.id, "Created in-memory collection");
            Ok(handle)
        })
    }

    async fn fetch_collection(&self, collection_id: &str) -> RemoteResult<CollectionHandle> {
        let mut state = self.state.lock().await;
        let fault = state.enter(StoreCall::FetchCollection);

        run(fault, || {
            state
                .collection(collection_id)
                .map(|collection| collection.handle.clone())
        })
    }

    async fn search_collections(&self, query: &str) -> RemoteResult<Vec<CollectionHandle>> {
        let mut state = self.state.lock().await;
        let fault = state.enter(StoreCall::SearchCollections);
        let needle = query.trim().to_lowercase();

        run(fault, || {
            let mut matches: Vec<&StoredCollection> = state
                .collections
                .iter()
                .filter(|c| c.handle.title.to_lowercase().contains(&needle))
                .collect();
            // Exact title matches first, otherwise creation order.
            matches.sort_by_key(|c| c.handle.title.to_lowercase() != needle);
            Ok(matches.into_iter().map(|c| c.handle.clone()).collect())
        })
    }

    async fn list_collections(&self) -> RemoteResult<Vec<CollectionHandle>> {
        let mut state = self.state.lock().await;
        let fault = state.enter(StoreCall::ListCollections);

        run(fault, || {
            Ok(state.collections.iter().map(|c| c.handle.clone()).collect())
        })
    }

    async fn latest_collection(&self) -> RemoteResult<Option<CollectionHandle>> {
        let mut state = self.state.lock().await;
        let fault = state.enter(StoreCall::LatestCollection);

        run(fault, || Ok(state.collections.last().map(|c| c.handle.clone())))
    }

    async fn list_items(&self, collection_id: &str) -> RemoteResult<Vec<ItemReference>> {
        let mut state = self.state.lock().await;
        let fault = state.enter(StoreCall::ListItems);

        run(fault, || {
            state
                .collection(collection_id)
                .map(|collection| collection.items.clone())
        })
    }

    async fn insert_at(
        &self,
        collection_id: &str,
        item_id: &str,
        position: Option<usize>,
    ) -> RemoteResult<ItemReference> {
        let mut state = self.state.lock().await;
        let fault = state.enter(StoreCall::InsertAt);
        let item = ItemReference::new(item_id, state.label_for(item_id));

        run(fault, || {
            let collection = state.collection_mut(collection_id)?;
            let len = collection.items.len();
            match position {
                None => collection.items.push(item.clone()),
                Some(position) if position <= len => {
                    collection.items.insert(position, item.clone())
                }
                Some(position) => {
                    return Err(RemoteError::out_of_range(format!(
                        "Position {} out of range for playlist of length {}",
                        position, len
                    )));
                }
            }
            Ok(item)
        })
    }

    async fn delete_at(&self, collection_id: &str, position: usize) -> RemoteResult<()> {
        let mut state = self.state.lock().await;
        let fault = state.enter(StoreCall::DeleteAt);

        run(fault, || {
            let collection = state.collection_mut(collection_id)?;
            if position >= collection.items.len() {
                return Err(RemoteError::out_of_range(format!(
                    "Position {} out of range for playlist of length {}",
                    position,
                    collection.items.len()
                )));
            }
            collection.items.remove(position);
            Ok(())
        })
    }

    async fn delete_collection(&self, collection_id: &str) -> RemoteResult<()> {
        let mut state = self.state.lock().await;
        let fault = state.enter(StoreCall::DeleteCollection);

        run(fault, || {
            let before = state.collections.len();
            state.collections.retain(|c| c.handle.id != collection_id);
            if state.collections.len() == before {
                return Err(missing(collection_id));
            }
            Ok(())
        })
    }
}
