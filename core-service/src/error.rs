use bridge_traits::RemoteError;
use core_playlist::PlaylistError;
use provider_playlist_api::VideoLinkError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error(transparent)]
    Playlist(#[from] PlaylistError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Invalid video link: {0}")]
    VideoLink(#[from] VideoLinkError),

    #[error("No collection titled '{title}'")]
    CollectionNotFound { title: String },
}

impl CoreError {
    /// Whether the session involved must be rehydrated before further edits.
    pub fn requires_rehydrate(&self) -> bool {
        match self {
            CoreError::Playlist(e) => e.requires_rehydrate(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
