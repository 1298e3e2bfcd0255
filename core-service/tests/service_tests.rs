//! End-to-end tests through the REST connector.
//!
//! A fake playlist service implements `HttpClient`, so these tests exercise
//! the real request building, status mapping, ordering engine and sessions:
//! - Generating and editing a collection over HTTP
//! - Authorization failures surfacing as remote errors
//! - Divergence after a failed insert leg, and recovery

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, RemoteErrorKind};
use bridge_traits::{HttpClient, HttpMethod, HttpRequest, HttpResponse, Visibility};
use bytes::Bytes;
use core_playlist::{PlaylistError, SyncState};
use core_runtime::config::CoreConfig;
use core_service::{CoreError, CoreService};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;

const BASE_URL: &str = "http://fake.api";
const TOKEN: &str = "secret-token";

// ============================================================================
// Fake playlist service
// ============================================================================

#[derive(Default)]
struct FakeState {
    playlists: Vec<(String, String, Vec<String>)>,
    next_id: usize,
    fail_next_insert: Option<u16>,
    garble_next_insert_reply: bool,
    requests: Vec<(HttpMethod, String)>,
}

#[derive(Default)]
struct FakePlaylistApi {
    state: AsyncMutex<FakeState>,
}

fn respond(status: u16, body: Value) -> bridge_traits::error::Result<HttpResponse> {
    Ok(HttpResponse {
        status,
        headers: HashMap::new(),
        body: Bytes::from(body.to_string()),
    })
}

fn playlist_json(id: &str, title: &str) -> Value {
    json!({
        "id": id,
        "playlist_title": title,
        "link": format!("https://youtube.com/playlist?list={}", id),
        "created_at": "2024-06-01T10:00:00"
    })
}

fn item_json(video_id: &str) -> Value {
    json!({"video_id": video_id, "video_title": format!("Video {}", video_id)})
}

impl FakePlaylistApi {
    async fn fail_next_insert(&self, status: u16) {
        self.state.lock().await.fail_next_insert = Some(status);
    }

    async fn garble_next_insert_reply(&self) {
        self.state.lock().await.garble_next_insert_reply = true;
    }

    async fn item_ids(&self, playlist_id: &str) -> Vec<String> {
        let state = self.state.lock().await;
        state
            .playlists
            .iter()
            .find(|(id, _, _)| id == playlist_id)
            .map(|(_, _, items)| items.clone())
            .unwrap_or_default()
    }

    async fn request_count(&self) -> usize {
        self.state.lock().await.requests.len()
    }
}

#[async_trait]
impl HttpClient for FakePlaylistApi {
    async fn execute(&self, request: HttpRequest) -> bridge_traits::error::Result<HttpResponse> {
        let mut state = self.state.lock().await;
        state.requests.push((request.method, request.url.clone()));

        let expected = format!("Bearer {}", TOKEN);
        if request.headers.get("Authorization") != Some(&expected) {
            return respond(401, json!({"detail": "Could not validate credentials"}));
        }

        let path = request
            .url
            .strip_prefix(BASE_URL)
            .ok_or_else(|| BridgeError::OperationFailed("unexpected host".to_string()))?
            .to_string();
        let body: Value = request
            .body
            .as_ref()
            .map(|b| serde_json::from_slice(b).unwrap())
            .unwrap_or(Value::Null);
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

        match (request.method, segments.as_slice()) {
            (HttpMethod::Post, ["playlists"]) => {
                state.next_id += 1;
                let id = format!("PL{}", state.next_id);
                let title = body["title"].as_str().unwrap().to_string();
                state.playlists.push((id.clone(), title.clone(), Vec::new()));
                respond(201, playlist_json(&id, &title))
            }
            (HttpMethod::Get, ["playlists"]) => {
                let query = request
                    .query
                    .iter()
                    .find(|(k, _)| k == "query_str")
                    .map(|(_, v)| v.to_lowercase())
                    .unwrap_or_default();
                let found: Vec<Value> = state
                    .playlists
                    .iter()
                    .filter(|(_, title, _)| title.to_lowercase().contains(&query))
                    .map(|(id, title, _)| playlist_json(id, title))
                    .collect();
                if found.is_empty() {
                    respond(404, json!({"detail": "No playlists found"}))
                } else {
                    respond(200, Value::Array(found))
                }
            }
            (HttpMethod::Get, ["playlists", "latest"]) => match state.playlists.last() {
                Some((id, title, _)) => respond(200, playlist_json(id, title)),
                None => respond(404, json!({"detail": "No playlists found"})),
            },
            (method, ["playlists", id, rest @ ..]) => {
                let id = id.to_string();
                let Some(index) = state.playlists.iter().position(|(pid, _, _)| *pid == id) else {
                    return respond(404, json!({"detail": "Playlist not found"}));
                };
                match (method, rest) {
                    (HttpMethod::Get, []) => {
                        let (id, title, _) = &state.playlists[index];
                        respond(200, playlist_json(id, title))
                    }
                    (HttpMethod::Delete, []) => {
                        state.playlists.remove(index);
                        respond(204, Value::Null)
                    }
                    (HttpMethod::Get, ["items"]) => {
                        let items: Vec<Value> =
                            state.playlists[index].2.iter().map(|v| item_json(v)).collect();
                        respond(200, Value::Array(items))
                    }
                    (HttpMethod::Post, ["items"]) => {
                        if let Some(status) = state.fail_next_insert.take() {
                            return respond(status, json!({"detail": "Injected failure"}));
                        }
                        let video_id = body["video_id"].as_str().unwrap().to_string();
                        let items = &mut state.playlists[index].2;
                        match body["pos"].as_u64().map(|p| p as usize) {
                            None => items.push(video_id.clone()),
                            Some(pos) if pos <= items.len() => items.insert(pos, video_id.clone()),
                            Some(_) => {
                                return respond(400, json!({"detail": "Position out of range"}))
                            }
                        }
                        if std::mem::take(&mut state.garble_next_insert_reply) {
                            return Ok(HttpResponse {
                                status: 201,
                                headers: HashMap::new(),
                                body: Bytes::from_static(b"<html>created</html>"),
                            });
                        }
                        respond(201, item_json(&video_id))
                    }
                    (HttpMethod::Delete, ["items"]) => {
                        let pos = body["pos"].as_u64().unwrap() as usize;
                        let items = &mut state.playlists[index].2;
                        if pos >= items.len() {
                            return respond(400, json!({"detail": "Position out of range"}));
                        }
                        items.remove(pos);
                        respond(200, json!({}))
                    }
                    _ => respond(405, json!({"detail": "Method Not Allowed"})),
                }
            }
            _ => respond(404, json!({"detail": "Not Found"})),
        }
    }
}

fn service_with(api: Arc<FakePlaylistApi>, token: &str) -> CoreService {
    let config = CoreConfig::builder()
        .api_base_url(BASE_URL)
        .access_token(token)
        .default_visibility(Visibility::Unlisted)
        .http_client(api)
        .build()
        .expect("valid config");
    CoreService::from_config(&config)
}

fn ids(items: &[bridge_traits::ItemReference]) -> Vec<String> {
    items.iter().map(|i| i.id.clone()).collect()
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_generate_and_edit_over_http() {
    let api = Arc::new(FakePlaylistApi::default());
    let service = service_with(api.clone(), TOKEN);

    let (mut session, report) = service
        .generate_collection(
            "Road trip",
            None,
            vec!["aaa".to_string(), "bbb".to_string(), "ccc".to_string(), "ddd".to_string()],
        )
        .await
        .unwrap();
    assert!(report.is_complete());
    assert_eq!(report.inserted[0].label, "Video aaa");

    session.move_item(0, 2).await.unwrap();
    session.move_item(3, 1).await.unwrap();
    session.replace(0, "xxx").await.unwrap();
    session.remove(3).await.unwrap();

    let id = session.collection_id().to_string();
    assert_eq!(ids(session.items()), ["xxx", "ddd", "ccc"]);
    assert_eq!(api.item_ids(&id).await, ["xxx", "ddd", "ccc"]);

    let reattached = service.attach_by_title("road TRIP").await.unwrap();
    assert_eq!(ids(reattached.items()), ["xxx", "ddd", "ccc"]);
    assert_eq!(reattached.handle().locator, format!("https://youtube.com/playlist?list={}", id));
}

#[tokio::test]
async fn test_bad_credential_is_unauthorized() {
    let api = Arc::new(FakePlaylistApi::default());
    let service = service_with(api, "wrong-token");

    let err = service.create_collection("Nope", None).await.unwrap_err();

    match err {
        CoreError::Playlist(PlaylistError::Remote(remote)) => {
            assert_eq!(remote.kind, RemoteErrorKind::Unauthorized);
            assert!(remote.message.contains("Could not validate credentials"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_half_applied_replace_over_http() {
    let api = Arc::new(FakePlaylistApi::default());
    let service = service_with(api.clone(), TOKEN);
    let (mut session, _) = service
        .generate_collection(
            "Divergence",
            Some(Visibility::Private),
            vec!["A".to_string(), "B".to_string(), "C".to_string()],
        )
        .await
        .unwrap();
    let id = session.collection_id().to_string();

    api.fail_next_insert(500).await;
    let err = service
        .replace_with_link(&mut session, 1, "https://youtu.be/XXXXXXXXXXX")
        .await
        .unwrap_err();

    assert!(err.requires_rehydrate());
    assert!(matches!(
        err,
        CoreError::Playlist(PlaylistError::PartialFailure { ref lost_item, .. }) if lost_item.id == "B"
    ));
    assert_eq!(api.item_ids(&id).await, ["A", "C"]);
    assert_eq!(session.state(), SyncState::Diverged);

    let before = api.request_count().await;
    assert!(session.append("D").await.is_err());
    assert_eq!(api.request_count().await, before);

    session.rehydrate().await.unwrap();
    session.insert("B", Some(1)).await.unwrap();
    assert_eq!(api.item_ids(&id).await, ["A", "B", "C"]);
    assert_eq!(ids(session.items()), ["A", "B", "C"]);
}

#[tokio::test]
async fn test_unreadable_insert_reply_diverges_session() {
    let api = Arc::new(FakePlaylistApi::default());
    let service = service_with(api.clone(), TOKEN);
    let (mut session, _) = service
        .generate_collection("Garbled", None, vec!["A".to_string()])
        .await
        .unwrap();
    let id = session.collection_id().to_string();

    api.garble_next_insert_reply().await;
    let err = session.append("B").await.unwrap_err();

    assert!(matches!(
        err,
        PlaylistError::Remote(ref e) if e.kind == RemoteErrorKind::Unconfirmed
    ));
    assert!(!err.is_retryable());
    assert!(err.requires_rehydrate());
    assert_eq!(session.state(), SyncState::Diverged);
    assert_eq!(api.item_ids(&id).await, ["A", "B"]);

    let before = api.request_count().await;
    assert!(matches!(
        session.append("B").await,
        Err(PlaylistError::StaleSession { .. })
    ));
    assert_eq!(api.request_count().await, before);

    session.rehydrate().await.unwrap();
    assert_eq!(ids(session.items()), ["A", "B"]);
    assert_eq!(api.item_ids(&id).await, ["A", "B"]);
}

#[tokio::test]
async fn test_unreadable_reply_on_replace_insert_leg() {
    let api = Arc::new(FakePlaylistApi::default());
    let service = service_with(api.clone(), TOKEN);
    let (mut session, _) = service
        .generate_collection(
            "Garbled replace",
            None,
            vec!["A".to_string(), "B".to_string(), "C".to_string()],
        )
        .await
        .unwrap();
    let id = session.collection_id().to_string();

    api.garble_next_insert_reply().await;
    let err = session.replace(1, "X").await.unwrap_err();

    match &err {
        PlaylistError::PartialFailure { lost_item, source, .. } => {
            assert_eq!(lost_item.id, "B");
            assert!(source.outcome_unknown());
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!err.is_retryable());
    assert_eq!(session.state(), SyncState::Diverged);
    assert_eq!(ids(session.items()), ["A", "B", "C"]);

    session.rehydrate().await.unwrap();
    assert_eq!(ids(session.items()), ["A", "X", "C"]);
    assert_eq!(api.item_ids(&id).await, ["A", "X", "C"]);
}

#[tokio::test]
async fn test_latest_and_all_collections_over_http() {
    let api = Arc::new(FakePlaylistApi::default());
    let service = service_with(api, TOKEN);
    assert_eq!(service.latest_collection().await.unwrap(), None);
    assert!(service.list_collections().await.unwrap().is_empty());

    service.create_collection("Monday", None).await.unwrap();
    let newest = service.create_collection("Tuesday", None).await.unwrap();

    let latest = service.latest_collection().await.unwrap().unwrap();
    assert_eq!(latest.id, newest.collection_id());
    assert_eq!(latest.title, "Tuesday");
    assert_eq!(service.list_collections().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_server_rejected_position_keeps_session_usable() {
    let api = Arc::new(FakePlaylistApi::default());
    let service = service_with(api.clone(), TOKEN);
    let (mut session, _) = service
        .generate_collection("Race", None, vec!["A".to_string(), "B".to_string()])
        .await
        .unwrap();
    let id = session.collection_id().to_string();

    // Another client shortens the playlist behind this session's back.
    api.state.lock().await.playlists[0].2.pop();

    let err = session.remove(1).await.unwrap_err();
    assert!(matches!(
        err,
        PlaylistError::Remote(ref e) if e.kind == RemoteErrorKind::OutOfRange
    ));
    assert!(session.is_synced());

    session.rehydrate().await.unwrap();
    assert_eq!(ids(session.items()), ["A"]);
    assert_eq!(api.item_ids(&id).await, ["A"]);
}

#[tokio::test]
async fn test_delete_collection_over_http() {
    let api = Arc::new(FakePlaylistApi::default());
    let service = service_with(api.clone(), TOKEN);
    let session = service.create_collection("Temp", None).await.unwrap();
    let id = session.collection_id().to_string();
    session.discard();

    service.delete_collection(&id).await.unwrap();

    let err = service.attach(&id).await.unwrap_err();
    assert!(matches!(err, CoreError::Playlist(PlaylistError::NotFound { .. })));
    assert!(matches!(
        service.attach_by_title("Temp").await,
        Err(CoreError::CollectionNotFound { .. })
    ));
}

#[cfg(feature = "desktop-shims")]
#[test]
fn test_bootstrap_desktop_rejects_bad_url() {
    let result = core_service::bootstrap_desktop("ftp://example.com", TOKEN);
    assert!(matches!(result, Err(CoreError::InitializationFailed(_))));

    assert!(core_service::bootstrap_desktop("http://localhost:8000", TOKEN).is_ok());
}
