//! Playlist API connector implementation
//!
//! Implements the `OrderedStore` trait against the playlist REST service.

use async_trait::async_trait;
use bridge_traits::error::RemoteResult;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bridge_traits::store::{CollectionHandle, ItemReference, OrderedStore, Visibility};
use core_runtime::config::CoreConfig;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::{PlaylistApiError, Result};
use crate::types::{
    CreatePlaylistRequest, DeleteItemRequest, InsertItemRequest, ItemsResponse,
    PlaylistItemResource, PlaylistResource,
};

/// Default per-request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Playlist API connector
///
/// Implements `OrderedStore` for the playlist service.
///
/// # Features
///
/// - One HTTP request per store operation, never retried
/// - Bearer authentication on every request
/// - Status codes classified into `RemoteErrorKind`s
///
/// # Example
///
/// ```ignore
/// use provider_playlist_api::PlaylistApiConnector;
/// use bridge_traits::OrderedStore;
///
/// let connector = PlaylistApiConnector::from_config(&config);
/// let items = connector.list_items("PL123").await?;
/// ```
pub struct PlaylistApiConnector {
    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,

    /// Service base URL without trailing slash
    base_url: String,

    /// Bearer credential
    access_token: String,

    timeout: Duration,
}

impl PlaylistApiConnector {
    /// Create a new connector
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client implementation
    /// * `base_url` - Service root, e.g. `http://localhost:8000`
    /// * `access_token` - Bearer credential from the authentication service
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        base_url: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Build a connector from validated core configuration.
    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(
            Arc::clone(&config.http_client),
            config.api_base_url.clone(),
            config.access_token.clone(),
        )
        .with_timeout(config.request_timeout)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn playlists_url(&self) -> String {
        format!("{}/playlists", self.base_url)
    }

    fn playlist_url(&self, collection_id: &str) -> String {
        format!("{}/playlists/{}", self.base_url, collection_id)
    }

    fn latest_url(&self) -> String {
        format!("{}/playlists/latest", self.base_url)
    }

    fn items_url(&self, collection_id: &str) -> String {
        format!("{}/playlists/{}/items", self.base_url, collection_id)
    }

    fn request(&self, method: HttpMethod, url: String) -> HttpRequest {
        HttpRequest::new(method, url)
            .bearer_token(&self.access_token)
            .header("Accept", "application/json")
            .timeout(self.timeout)
    }

    /// Send one request; non-2xx statuses become errors.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = request.method;
        let response = self.http_client.execute(request).await?;

        if response.is_success() {
            debug!(status = response.status, method = method.as_str(), "API request succeeded");
            Ok(response)
        } else {
            let error = PlaylistApiError::from_response(&response);
            warn!(status = response.status, method = method.as_str(), error = %error, "API request failed");
            Err(error)
        }
    }

    fn parse<T: DeserializeOwned>(response: &HttpResponse, what: &str) -> Result<T> {
        serde_json::from_slice(&response.body)
            .map_err(|e| PlaylistApiError::ParseError(format!("Failed to parse {}: {}", what, e)))
    }

    /// Convert a playlist resource into a handle.
    fn convert_playlist(resource: PlaylistResource) -> Result<CollectionHandle> {
        let created_at = resource.created_at_utc().ok_or_else(|| {
            PlaylistApiError::ParseError(format!(
                "Invalid created_at timestamp '{}' for playlist {}",
                resource.created_at, resource.id
            ))
        })?;

        Ok(CollectionHandle {
            id: resource.id,
            title: resource.playlist_title,
            locator: resource.link,
            created_at,
        })
    }

    fn convert_item(item: PlaylistItemResource) -> ItemReference {
        ItemReference::new(item.video_id, item.video_title)
    }

    async fn create(&self, title: &str, visibility: Visibility) -> Result<CollectionHandle> {
        let body = CreatePlaylistRequest {
            title,
            privacy_status: visibility.as_str(),
        };
        let request = self.request(HttpMethod::Post, self.playlists_url()).json(&body)?;
        let response = self.send(request).await?;

        Self::parse(&response, "created playlist")
            .and_then(Self::convert_playlist)
            .map_err(PlaylistApiError::for_mutation_reply)
    }

    async fn fetch(&self, collection_id: &str) -> Result<CollectionHandle> {
        let request = self.request(HttpMethod::Get, self.playlist_url(collection_id));
        let response = self.send(request).await?;

        Self::convert_playlist(Self::parse(&response, "playlist")?)
    }

    /// `GET /playlists`, with 404 meaning there is nothing to list.
    async fn list_playlists(&self, request: HttpRequest, what: &str) -> Result<Vec<CollectionHandle>> {
        let response = match self.send(request).await {
            Ok(response) => response,
            Err(PlaylistApiError::NotFound(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let playlists: Vec<PlaylistResource> = Self::parse(&response, what)?;
        playlists.into_iter().map(Self::convert_playlist).collect()
    }

    async fn search(&self, query: &str) -> Result<Vec<CollectionHandle>> {
        let request = self
            .request(HttpMethod::Get, self.playlists_url())
            .query_param("query_str", query);
        self.list_playlists(request, "playlist search results").await
    }

    async fn list_all(&self) -> Result<Vec<CollectionHandle>> {
        let request = self.request(HttpMethod::Get, self.playlists_url());
        self.list_playlists(request, "playlists").await
    }

    async fn latest(&self) -> Result<Option<CollectionHandle>> {
        let request = self.request(HttpMethod::Get, self.latest_url());
        let response = match self.send(request).await {
            Ok(response) => response,
            Err(PlaylistApiError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        Self::convert_playlist(Self::parse(&response, "latest playlist")?).map(Some)
    }

    async fn items(&self, collection_id: &str) -> Result<Vec<ItemReference>> {
        let request = self.request(HttpMethod::Get, self.items_url(collection_id));
        let response = self.send(request).await?;

        let items: ItemsResponse = Self::parse(&response, "playlist items")?;
        Ok(items.into_items().into_iter().map(Self::convert_item).collect())
    }

    async fn insert(
        &self,
        collection_id: &str,
        item_id: &str,
        position: Option<usize>,
    ) -> Result<ItemReference> {
        let body = InsertItemRequest {
            video_id: item_id,
            pos: position,
        };
        let request = self
            .request(HttpMethod::Post, self.items_url(collection_id))
            .json(&body)?;
        let response = self
            .send(request)
            .await
            .map_err(PlaylistApiError::for_item_position)?;

        if response.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(ItemReference::new(item_id, ""));
        }
        Self::parse(&response, "inserted item")
            .map(Self::convert_item)
            .map_err(PlaylistApiError::for_mutation_reply)
    }

    async fn delete_item(&self, collection_id: &str, position: usize) -> Result<()> {
        let request = self
            .request(HttpMethod::Delete, self.items_url(collection_id))
            .json(&DeleteItemRequest { pos: position })?;
        self.send(request)
            .await
            .map_err(PlaylistApiError::for_item_position)?;
        Ok(())
    }

    async fn delete(&self, collection_id: &str) -> Result<()> {
        let request = self.request(HttpMethod::Delete, self.playlist_url(collection_id));
        self.send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl OrderedStore for PlaylistApiConnector {
    #[instrument(skip(self))]
    async fn create_collection(
        &self,
        title: &str,
        visibility: Visibility,
    ) -> RemoteResult<CollectionHandle> {
        let handle = self.create(title, visibility).await?;
        info!(collection_id = %handle.id, "Created playlist");
        Ok(handle)
    }

    #[instrument(skip(self))]
    async fn fetch_collection(&self, collection_id: &str) -> RemoteResult<CollectionHandle> {
        Ok(self.fetch(collection_id).await?)
    }

    #[instrument(skip(self))]
    async fn search_collections(&self, query: &str) -> RemoteResult<Vec<CollectionHandle>> {
        let found = self.search(query).await?;
        debug!(matches = found.len(), "Searched playlists");
        Ok(found)
    }

    #[instrument(skip(self))]
    async fn list_collections(&self) -> RemoteResult<Vec<CollectionHandle>> {
        let all = self.list_all().await?;
        debug!(count = all.len(), "Listed playlists");
        Ok(all)
    }

    #[instrument(skip(self))]
    async fn latest_collection(&self) -> RemoteResult<Option<CollectionHandle>> {
        Ok(self.latest().await?)
    }

    #[instrument(skip(self))]
    async fn list_items(&self, collection_id: &str) -> RemoteResult<Vec<ItemReference>> {
        let items = self.items(collection_id).await?;
        debug!(count = items.len(), "Listed playlist items");
        Ok(items)
    }

    #[instrument(skip(self))]
    async fn insert_at(
        &self,
        collection_id: &str,
        item_id: &str,
        position: Option<usize>,
    ) -> RemoteResult<ItemReference> {
        Ok(self.insert(collection_id, item_id, position).await?)
    }

    #[instrument(skip(self))]
    async fn delete_at(&self, collection_id: &str, position: usize) -> RemoteResult<()> {
        Ok(self.delete_item(collection_id, position).await?)
    }

    #[instrument(skip(self))]
    async fn delete_collection(&self, collection_id: &str) -> RemoteResult<()> {
        self.delete(collection_id).await?;
        info!("Deleted playlist");
        Ok(())
    }
}
