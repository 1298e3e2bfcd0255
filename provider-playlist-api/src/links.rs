//! Video link parsing
//!
//! Item ids handed to the playlist service are bare YouTube video ids. Users
//! paste links, so this module extracts the id from the usual URL shapes:
//!
//! - `https://youtu.be/<id>`
//! - `https://www.youtube.com/watch?v=<id>`
//! - `/watch/<id>`, `/embed/<id>`, `/v/<id>`, `/e/<id>`, `/shorts/<id>`, `/live/<id>`
//! - `/oembed?url=<watch url>` and `/attribution_link?u=<path or url>`

use reqwest::Url;
use thiserror::Error;

const SHORT_HOSTS: &[&str] = &["youtu.be", "www.youtu.be"];

const VIDEO_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "youtube-nocookie.com",
    "www.youtube-nocookie.com",
];

const ID_PATH_PREFIXES: &[&str] = &["watch", "embed", "v", "e", "shorts", "live"];

/// Nested links (`oembed`, `attribution_link`) are followed at most this deep.
const MAX_NESTING: usize = 2;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VideoLinkError {
    #[error("Video link is empty")]
    Empty,

    #[error("Could not parse '{0}' as a URL. Please try a different link format")]
    Malformed(String),

    #[error("'{0}' is not a YouTube link. Please try a different link format")]
    UnsupportedHost(String),

    #[error("Could not identify a video id in '{0}'. Please try a different link format")]
    MissingId(String),
}

/// Extract the video id from a YouTube link.
pub fn extract_video_id(link: &str) -> Result<String, VideoLinkError> {
    extract_nested(link, 0)
}

fn extract_nested(link: &str, depth: usize) -> Result<String, VideoLinkError> {
    let trimmed = link.trim();
    if trimmed.is_empty() {
        return Err(VideoLinkError::Empty);
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };
    let url = Url::parse(&candidate).map_err(|_| VideoLinkError::Malformed(trimmed.to_string()))?;
    let host = url
        .host_str()
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let missing = || VideoLinkError::MissingId(trimmed.to_string());

    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    if SHORT_HOSTS.contains(&host.as_str()) {
        return segments
            .first()
            .map(|id| id.to_string())
            .ok_or_else(missing);
    }

    if !VIDEO_HOSTS.contains(&host.as_str()) {
        return Err(VideoLinkError::UnsupportedHost(trimmed.to_string()));
    }

    match segments.as_slice() {
        ["watch"] => query_value(&url, "v").ok_or_else(missing),
        [prefix, id, ..] if ID_PATH_PREFIXES.contains(prefix) => Ok(id.to_string()),
        ["oembed"] if depth < MAX_NESTING => {
            let inner = query_value(&url, "url").ok_or_else(missing)?;
            extract_nested(&inner, depth + 1)
        }
        ["attribution_link"] if depth < MAX_NESTING => {
            let inner = query_value(&url, "u").ok_or_else(missing)?;
            if inner.starts_with('/') {
                extract_nested(&format!("https://www.youtube.com{}", inner), depth + 1)
            } else {
                extract_nested(&inner, depth + 1)
            }
        }
        _ => Err(missing()),
    }
}

fn query_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, v)| k == key && !v.is_empty())
        .map(|(_, v)| v.into_owned())
}
