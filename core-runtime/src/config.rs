//! # Core Configuration Module
//!
//! Builder-based configuration for the playlist core.
//!
//! ## Overview
//!
//! [`CoreConfig`] carries the remote service location, the caller's bearer
//! credential (supplied by the authentication collaborator), request timeouts
//! and the injected [`HttpClient`]. The builder fails fast with actionable
//! messages when something required is missing or out of range.
//!
//! When the `desktop-shims` feature is enabled a reqwest-backed client is
//! injected automatically if none was provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::time::Duration;
//!
//! let config = CoreConfig::builder()
//!     .api_base_url("https://playlists.example.com")
//!     .access_token(token)
//!     .request_timeout(Duration::from_secs(20))
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use crate::logging::redact_if_sensitive;
use bridge_traits::{HttpClient, Visibility};
use std::sync::Arc;
use std::time::Duration;

/// Base URL of the playlist service when none is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Per-request timeout when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const MAX_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Core configuration for the playlist core.
#[derive(Clone)]
pub struct CoreConfig {
    /// Base URL of the remote playlist service, without trailing slash
    pub api_base_url: String,

    /// Bearer credential sent with every request
    pub access_token: String,

    /// Timeout applied to each individual remote call
    pub request_timeout: Duration,

    /// Visibility used when a collection is created without an explicit one
    pub default_visibility: Visibility,

    /// HTTP transport
    pub http_client: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("api_base_url", &self.api_base_url)
            .field(
                "access_token",
                &redact_if_sensitive("access_token", &self.access_token),
            )
            .field("request_timeout", &self.request_timeout)
            .field("default_visibility", &self.default_visibility)
            .field("http_client", &"HttpClient { ... }")
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// This checks:
    /// - Base URL is non-empty and uses http or https
    /// - Access token is non-empty
    /// - Request timeout is between 1 second and 5 minutes
    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(Error::Config("API base URL cannot be empty".to_string()));
        }

        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            return Err(Error::Config(format!(
                "API base URL must start with http:// or https://, got '{}'",
                self.api_base_url
            )));
        }

        if self.access_token.trim().is_empty() {
            return Err(Error::Config(
                "Access token cannot be empty. Log in through the authentication service first."
                    .to_string(),
            ));
        }

        if self.request_timeout < Duration::from_secs(1) {
            return Err(Error::Config(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }

        if self.request_timeout > MAX_REQUEST_TIMEOUT {
            return Err(Error::Config(
                "Request timeout exceeds maximum of 300 seconds".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client(timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::with_timeout(timeout)?);
    Ok(client)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client(_timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    Err(Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "No HTTP client implementation provided. \
                 Desktop: enable the 'desktop-shims' feature to use the default ReqwestHttpClient. \
                 Other hosts: inject an HttpClient with .http_client()."
            .to_string(),
    })
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    api_base_url: Option<String>,
    access_token: Option<String>,
    request_timeout: Option<Duration>,
    default_visibility: Option<Visibility>,
    http_client: Option<Arc<dyn HttpClient>>,
}

impl CoreConfigBuilder {
    /// Sets the playlist service base URL. A trailing slash is dropped.
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.api_base_url = Some(url.trim_end_matches('/').to_string());
        self
    }

    /// Sets the bearer credential.
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn default_visibility(mut self, visibility: Visibility) -> Self {
        self.default_visibility = Some(visibility);
        self
    }

    /// Injects an HTTP client implementation.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] when the access token is missing or a value is invalid
    /// - [`Error::CapabilityMissing`] when no HTTP client was injected and no
    ///   desktop default is available
    pub fn build(self) -> Result<CoreConfig> {
        let access_token = self.access_token.ok_or_else(|| {
            Error::Config("Access token is required. Use .access_token() to set it.".to_string())
        })?;

        let request_timeout = self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client(request_timeout)?,
        };

        let config = CoreConfig {
            api_base_url: self
                .api_base_url
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            access_token,
            request_timeout,
            default_visibility: self.default_visibility.unwrap_or_default(),
            http_client,
        };

        config.validate()?;

        Ok(config)
    }
}
