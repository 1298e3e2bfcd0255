//! Error types for the playlist API provider

use bridge_traits::error::{BridgeError, RemoteError, RemoteErrorKind};
use bridge_traits::HttpResponse;
use thiserror::Error;

use crate::types::ErrorBody;

/// Playlist API provider errors
#[derive(Error, Debug)]
pub enum PlaylistApiError {
    /// Credential missing, invalid or expired (401)
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Caller may not access the playlist (403)
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Playlist not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request rejected as malformed (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Position outside the playlist (400 from an item endpoint)
    #[error("Position out of range: {0}")]
    OutOfRange(String),

    /// Resource already exists (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Request body failed validation (422)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Too many requests (429)
    #[error("Rate limit exceeded: {message}")]
    RateLimitExceeded {
        message: String,
        retry_after_seconds: Option<u64>,
    },

    /// Any other non-success status
    #[error("Playlist API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// A mutation returned 2xx but its body could not be decoded
    #[error("Request was accepted but its response could not be read: {0}")]
    UnconfirmedMutation(String),

    /// Transport failure
    #[error(transparent)]
    BridgeError(#[from] BridgeError),
}

/// Result type for playlist API operations
pub type Result<T> = std::result::Result<T, PlaylistApiError>;

impl PlaylistApiError {
    /// Classify a non-success response by status code.
    pub fn from_response(response: &HttpResponse) -> Self {
        let message = error_message(response);

        match response.status {
            400 => PlaylistApiError::BadRequest(message),
            401 => PlaylistApiError::AuthenticationFailed(message),
            403 => PlaylistApiError::Forbidden(message),
            404 => PlaylistApiError::NotFound(message),
            409 => PlaylistApiError::Conflict(message),
            422 => PlaylistApiError::Validation(message),
            429 => PlaylistApiError::RateLimitExceeded {
                message,
                retry_after_seconds: response
                    .header("Retry-After")
                    .and_then(|value| value.trim().parse().ok()),
            },
            status_code => PlaylistApiError::ApiError {
                status_code,
                message,
            },
        }
    }

    /// On the item endpoints the service answers 400 for a position outside
    /// the playlist.
    pub fn for_item_position(self) -> Self {
        match self {
            PlaylistApiError::BadRequest(message) => PlaylistApiError::OutOfRange(message),
            other => other,
        }
    }

    /// A decode failure on a mutation reply means the change may have landed.
    pub fn for_mutation_reply(self) -> Self {
        match self {
            PlaylistApiError::ParseError(message) => PlaylistApiError::UnconfirmedMutation(message),
            other => other,
        }
    }

    pub fn remote_kind(&self) -> RemoteErrorKind {
        match self {
            PlaylistApiError::AuthenticationFailed(_) => RemoteErrorKind::Unauthorized,
            PlaylistApiError::Forbidden(_) => RemoteErrorKind::Forbidden,
            PlaylistApiError::BadRequest(_) => RemoteErrorKind::InvalidArgument,
            PlaylistApiError::NotFound(_) => RemoteErrorKind::NotFound,
            PlaylistApiError::OutOfRange(_) => RemoteErrorKind::OutOfRange,
            PlaylistApiError::Conflict(_) => RemoteErrorKind::Conflict,
            PlaylistApiError::Validation(_) => RemoteErrorKind::InvalidArgument,
            PlaylistApiError::RateLimitExceeded { .. } => RemoteErrorKind::RateLimited,
            PlaylistApiError::ApiError { status_code, .. } if *status_code >= 500 => {
                RemoteErrorKind::Server
            }
            PlaylistApiError::ApiError { .. } => RemoteErrorKind::InvalidArgument,
            PlaylistApiError::ParseError(_) => RemoteErrorKind::Parse,
            PlaylistApiError::UnconfirmedMutation(_) => RemoteErrorKind::Unconfirmed,
            PlaylistApiError::BridgeError(BridgeError::Timeout(_)) => RemoteErrorKind::Timeout,
            PlaylistApiError::BridgeError(_) => RemoteErrorKind::Transport,
        }
    }
}

/// Pull a readable message out of a `{"detail": ...}` body, falling back to
/// the raw text.
fn error_message(response: &HttpResponse) -> String {
    match serde_json::from_slice::<ErrorBody>(&response.body) {
        Ok(body) => body.detail.to_message(),
        Err(_) => {
            let text = response.text_lossy();
            if text.trim().is_empty() {
                format!("HTTP {}", response.status)
            } else {
                text
            }
        }
    }
}

impl From<PlaylistApiError> for RemoteError {
    fn from(error: PlaylistApiError) -> Self {
        match error {
            PlaylistApiError::BridgeError(e) => RemoteError::from(e),
            other => RemoteError::new(other.remote_kind(), other.to_string()),
        }
    }
}
