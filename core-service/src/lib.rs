//! Core service façade and bootstrap helpers.
//!
//! This crate wires a remote ordered store into the playlist core and exposes
//! the collection-level operations a front end needs: attach, create, search,
//! delete, link-based edits and bulk generation. Desktop apps typically enable
//! the `desktop-shims` feature, which supplies a reqwest-backed HTTP client so
//! [`bootstrap_desktop`] only needs the service URL and a credential.

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use bridge_traits::{CollectionHandle, ItemReference, OrderedStore, Visibility};
use core_playlist::{BulkInsertReport, CollectionSession};
use core_runtime::config::CoreConfig;
use provider_playlist_api::{extract_video_id, PlaylistApiConnector};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

/// A session shared between tasks. Holding the lock serializes edits.
pub type SharedSession = Arc<Mutex<CollectionSession>>;

/// Aggregated handle to the dependencies the core requires.
pub struct CoreDependencies {
    pub store: Arc<dyn OrderedStore>,
}

impl CoreDependencies {
    /// Construct a dependency bundle from an explicit store.
    pub fn new(store: Arc<dyn OrderedStore>) -> Self {
        Self { store }
    }

    /// Build the REST-backed store described by `config`.
    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(Arc::new(PlaylistApiConnector::from_config(config)))
    }
}

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    deps: Arc<CoreDependencies>,
    default_visibility: Visibility,
}

impl CoreService {
    /// Create a new service from the provided dependencies.
    pub fn new(deps: CoreDependencies) -> Self {
        Self {
            deps: Arc::new(deps),
            default_visibility: Visibility::default(),
        }
    }

    /// Create a service talking to the playlist API described by `config`.
    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(CoreDependencies::from_config(config))
            .with_default_visibility(config.default_visibility)
    }

    pub fn with_default_visibility(mut self, visibility: Visibility) -> Self {
        self.default_visibility = visibility;
        self
    }

    /// Access the dependencies being used by the service.
    pub fn dependencies(&self) -> Arc<CoreDependencies> {
        Arc::clone(&self.deps)
    }

    fn store(&self) -> Arc<dyn OrderedStore> {
        Arc::clone(&self.deps.store)
    }

    /// Open a session on an existing collection.
    pub async fn attach(&self, collection_id: &str) -> Result<CollectionSession> {
        Ok(CollectionSession::attach(self.store(), collection_id).await?)
    }

    /// Open a session that several tasks can edit in turn.
    pub async fn attach_shared(&self, collection_id: &str) -> Result<SharedSession> {
        let session = self.attach(collection_id).await?;
        Ok(Arc::new(Mutex::new(session)))
    }

    /// Find collections whose title matches `query`.
    pub async fn search_collections(&self, query: &str) -> Result<Vec<CollectionHandle>> {
        Ok(self.deps.store.search_collections(query).await?)
    }

    /// Every collection the caller owns, oldest first.
    pub async fn list_collections(&self) -> Result<Vec<CollectionHandle>> {
        Ok(self.deps.store.list_collections().await?)
    }

    /// The most recently created collection, if there is one.
    pub async fn latest_collection(&self) -> Result<Option<CollectionHandle>> {
        Ok(self.deps.store.latest_collection().await?)
    }

    /// Open a session on the collection titled `title`.
    ///
    /// A case-insensitive exact title match wins over the store's ranking.
    #[instrument(skip(self))]
    pub async fn attach_by_title(&self, title: &str) -> Result<CollectionSession> {
        let found = self.search_collections(title).await?;
        let chosen = found
            .iter()
            .find(|handle| handle.title.eq_ignore_ascii_case(title))
            .or_else(|| found.first())
            .ok_or_else(|| CoreError::CollectionNotFound {
                title: title.to_string(),
            })?;

        self.attach(&chosen.id).await
    }

    /// Create an empty collection. `None` uses the configured default visibility.
    pub async fn create_collection(
        &self,
        title: &str,
        visibility: Option<Visibility>,
    ) -> Result<CollectionSession> {
        let visibility = visibility.unwrap_or(self.default_visibility);
        Ok(CollectionSession::create_new(self.store(), title, visibility).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_collection(&self, collection_id: &str) -> Result<()> {
        self.deps.store.delete_collection(collection_id).await?;
        info!("Deleted collection");
        Ok(())
    }

    /// Insert the video behind `link` at `position` (`None` appends).
    pub async fn insert_link(
        &self,
        session: &mut CollectionSession,
        link: &str,
        position: Option<usize>,
    ) -> Result<ItemReference> {
        let video_id = extract_video_id(link)?;
        Ok(session.insert(&video_id, position).await?)
    }

    /// Replace the item at `position` with the video behind `link`.
    pub async fn replace_with_link(
        &self,
        session: &mut CollectionSession,
        position: usize,
        link: &str,
    ) -> Result<ItemReference> {
        let video_id = extract_video_id(link)?;
        Ok(session.replace(position, &video_id).await?)
    }

    /// Create a collection and append `item_ids` to it in order.
    ///
    /// Item failures do not abort the run; they are listed in the report.
    #[instrument(skip(self, item_ids), fields(count = item_ids.len()))]
    pub async fn generate_collection(
        &self,
        title: &str,
        visibility: Option<Visibility>,
        item_ids: Vec<String>,
    ) -> Result<(CollectionSession, BulkInsertReport)> {
        let mut session = self.create_collection(title, visibility).await?;
        let report = session.append_all(item_ids).await;

        if !report.is_complete() {
            warn!(
                collection_id = %session.collection_id(),
                failed = report.failed.len(),
                skipped = report.skipped.len(),
                "Generated collection is incomplete"
            );
        }
        Ok((session, report))
    }
}

/// Convenience bootstrapper for desktop hosts.
///
/// ```ignore
/// let core = core_service::bootstrap_desktop("http://localhost:8000", token)?;
/// let mut session = core.attach_by_title("Road trip").await?;
/// ```
#[cfg(feature = "desktop-shims")]
pub fn bootstrap_desktop(
    api_base_url: impl Into<String>,
    access_token: impl Into<String>,
) -> Result<CoreService> {
    let config = CoreConfig::builder()
        .api_base_url(api_base_url)
        .access_token(access_token)
        .build()
        .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;
    Ok(CoreService::from_config(&config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_playlist::memory::InMemoryOrderedStore;
    use core_playlist::PlaylistError;

    fn service() -> (Arc<InMemoryOrderedStore>, CoreService) {
        let store = Arc::new(InMemoryOrderedStore::new());
        let service = CoreService::new(CoreDependencies::new(store.clone()));
        (store, service)
    }

    #[tokio::test]
    async fn test_create_uses_default_visibility() {
        let (store, service) = service();
        let service = service.with_default_visibility(Visibility::Unlisted);

        let session = service.create_collection("Mix", None).await.unwrap();
        assert_eq!(
            store.visibility_of(session.collection_id()).await,
            Some(Visibility::Unlisted)
        );

        let session = service
            .create_collection("Mix 2", Some(Visibility::Public))
            .await
            .unwrap();
        assert_eq!(
            store.visibility_of(session.collection_id()).await,
            Some(Visibility::Public)
        );
    }

    #[tokio::test]
    async fn test_attach_by_title_prefers_exact_match() {
        let (store, service) = service();
        store.seed("Summer hits extended", &["A"]).await;
        let exact = store.seed("Summer Hits", &["B", "C"]).await;

        let session = service.attach_by_title("summer hits").await.unwrap();
        assert_eq!(session.collection_id(), exact.id);
        assert_eq!(session.len(), 2);
    }

    #[tokio::test]
    async fn test_attach_by_title_without_match() {
        let (_store, service) = service();
        let err = service.attach_by_title("Nope").await.unwrap_err();
        assert!(matches!(err, CoreError::CollectionNotFound { title } if title == "Nope"));
    }

    #[tokio::test]
    async fn test_list_and_latest_collections() {
        let (store, service) = service();
        assert_eq!(service.latest_collection().await.unwrap(), None);

        store.seed("Older", &["A"]).await;
        let session = service.create_collection("Newer", None).await.unwrap();

        let latest = service.latest_collection().await.unwrap().unwrap();
        assert_eq!(latest.id, session.collection_id());

        let titles: Vec<String> = service
            .list_collections()
            .await
            .unwrap()
            .into_iter()
            .map(|h| h.title)
            .collect();
        assert_eq!(titles, ["Older", "Newer"]);
    }

    #[tokio::test]
    async fn test_insert_link() {
        let (_store, service) = service();
        let mut session = service.create_collection("Links", None).await.unwrap();

        let item = service
            .insert_link(&mut session, "https://youtu.be/dQw4w9WgXcQ", None)
            .await
            .unwrap();
        assert_eq!(item.id, "dQw4w9WgXcQ");

        let err = service
            .insert_link(&mut session, "https://vimeo.com/1", None)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::VideoLink(_)));
        assert_eq!(session.len(), 1);

        service
            .replace_with_link(&mut session, 0, "https://www.youtube.com/watch?v=9bZkp7q19f0")
            .await
            .unwrap();
        assert_eq!(session.get(0).unwrap().id, "9bZkp7q19f0");
    }

    #[tokio::test]
    async fn test_delete_collection() {
        let (store, service) = service();
        let handle = store.seed("Old", &["A"]).await;

        service.delete_collection(&handle.id).await.unwrap();

        let err = service.attach(&handle.id).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Playlist(PlaylistError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_shared_session_serializes_edits() {
        let (store, service) = service();
        let handle = store.seed("Shared", &[] as &[&str]).await;
        let shared = service.attach_shared(&handle.id).await.unwrap();

        let mut tasks = Vec::new();
        for i in 0..4 {
            let shared = Arc::clone(&shared);
            tasks.push(tokio::spawn(async move {
                let mut session = shared.lock().await;
                session.append(&format!("item-{}", i)).await.map(|_| ())
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let session = shared.lock().await;
        assert_eq!(session.len(), 4);
        assert_eq!(
            store.snapshot(&handle.id).await.unwrap(),
            session.items().to_vec()
        );
    }
}
