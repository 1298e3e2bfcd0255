//! Playlist API request and response types

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Playlist resource as returned by `/playlists` and `/playlists/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistResource {
    pub id: String,

    pub playlist_title: String,

    /// Shareable URL
    pub link: String,

    /// Creation time; the service may omit the UTC offset
    pub created_at: String,
}

impl PlaylistResource {
    /// Parse `created_at`, treating offset-less timestamps as UTC.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&self.created_at) {
            return Some(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&self.created_at, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| Utc.from_utc_datetime(&naive))
    }
}

/// One playlist entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItemResource {
    pub video_id: String,

    #[serde(default)]
    pub video_title: String,
}

/// Item listing, either a bare array or wrapped in `items`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ItemsResponse {
    List(Vec<PlaylistItemResource>),
    Wrapped { items: Vec<PlaylistItemResource> },
}

impl ItemsResponse {
    pub fn into_items(self) -> Vec<PlaylistItemResource> {
        match self {
            ItemsResponse::List(items) | ItemsResponse::Wrapped { items } => items,
        }
    }
}

/// `POST /playlists`
#[derive(Debug, Serialize)]
pub struct CreatePlaylistRequest<'a> {
    pub title: &'a str,
    pub privacy_status: &'a str,
}

/// `POST /playlists/{id}/items`; `pos: null` appends.
#[derive(Debug, Serialize)]
pub struct InsertItemRequest<'a> {
    pub video_id: &'a str,
    pub pos: Option<usize>,
}

/// `DELETE /playlists/{id}/items`
#[derive(Debug, Serialize)]
pub struct DeleteItemRequest {
    pub pos: usize,
}

/// Error body: `{"detail": "..."}` or a validation list.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub detail: ErrorDetail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Validation(Vec<ValidationIssue>),
    Other(serde_json::Value),
}

#[derive(Debug, Deserialize)]
pub struct ValidationIssue {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub loc: Vec<serde_json::Value>,

    #[serde(default)]
    pub msg: Option<String>,
}

impl ErrorDetail {
    pub fn to_message(&self) -> String {
        match self {
            ErrorDetail::Message(message) => message.clone(),
            ErrorDetail::Validation(issues) => issues
                .iter()
                .map(|issue| {
                    let field = issue
                        .loc
                        .last()
                        .map(|loc| match loc {
                            serde_json::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .unwrap_or_else(|| "request".to_string());
                    format!("Expected {} for {}.", issue.kind, field)
                })
                .collect::<Vec<_>>()
                .join(" "),
            ErrorDetail::Other(value) => value.to_string(),
        }
    }
}
