use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("Bridge operation timed out: {0}")]
    Timeout(String),
}

pub type Result<T> = std::result::Result<T, BridgeError>;

/// Status classification attached to every failure reported by an
/// [`OrderedStore`](crate::store::OrderedStore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteErrorKind {
    /// Collection (or other addressed resource) does not exist
    NotFound,
    /// Caller is authenticated but may not touch the collection
    Forbidden,
    /// Credential missing, invalid or expired
    Unauthorized,
    /// Position outside the remote collection's bounds
    OutOfRange,
    /// Request rejected by the store's validation
    InvalidArgument,
    /// Resource already exists
    Conflict,
    /// Store asked the client to slow down
    RateLimited,
    /// Store failed internally (5xx)
    Server,
    /// Request timed out or was cancelled in flight
    Timeout,
    /// Connection-level failure
    Transport,
    /// Response could not be decoded
    Parse,
    /// Store accepted a mutation but its reply could not be read
    Unconfirmed,
}

impl RemoteErrorKind {
    /// Whether the store may have applied the request even though the client
    /// saw a failure.
    pub fn outcome_unknown(self) -> bool {
        matches!(self, Self::Timeout | Self::Transport | Self::Unconfirmed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Forbidden => "forbidden",
            Self::Unauthorized => "unauthorized",
            Self::OutOfRange => "out_of_range",
            Self::InvalidArgument => "invalid_argument",
            Self::Conflict => "conflict",
            Self::RateLimited => "rate_limited",
            Self::Server => "server",
            Self::Timeout => "timeout",
            Self::Transport => "transport",
            Self::Parse => "parse",
            Self::Unconfirmed => "unconfirmed",
        }
    }
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single remote store call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Remote store error ({kind}): {message}")]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub message: String,
}

impl RemoteError {
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::NotFound, message)
    }

    pub fn out_of_range(message: impl Into<String>) -> Self {
        Self::new(RemoteErrorKind::OutOfRange, message)
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == RemoteErrorKind::NotFound
    }

    pub fn outcome_unknown(&self) -> bool {
        self.kind.outcome_unknown()
    }
}

impl From<BridgeError> for RemoteError {
    fn from(error: BridgeError) -> Self {
        match error {
            BridgeError::Timeout(msg) => RemoteError::new(RemoteErrorKind::Timeout, msg),
            other => RemoteError::new(RemoteErrorKind::Transport, other.to_string()),
        }
    }
}

pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_display() {
        let error = RemoteError::new(RemoteErrorKind::Forbidden, "not your playlist");
        assert_eq!(
            error.to_string(),
            "Remote store error (forbidden): not your playlist"
        );
    }

    #[test]
    fn test_outcome_unknown_kinds() {
        assert!(RemoteErrorKind::Timeout.outcome_unknown());
        assert!(RemoteErrorKind::Transport.outcome_unknown());
        assert!(RemoteErrorKind::Unconfirmed.outcome_unknown());
        assert!(!RemoteErrorKind::Parse.outcome_unknown());
        assert!(!RemoteErrorKind::OutOfRange.outcome_unknown());
        assert!(!RemoteErrorKind::Server.outcome_unknown());
    }

    #[test]
    fn test_bridge_error_conversion() {
        let timeout: RemoteError = BridgeError::Timeout("30s elapsed".to_string()).into();
        assert_eq!(timeout.kind, RemoteErrorKind::Timeout);

        let failed: RemoteError = BridgeError::OperationFailed("refused".to_string()).into();
        assert_eq!(failed.kind, RemoteErrorKind::Transport);
    }
}
