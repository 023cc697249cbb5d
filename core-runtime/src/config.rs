//! # Core Configuration Module
//!
//! Provides configuration management for the Linkup client core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds all necessary dependencies and settings for the core.
//! It enforces fail-fast validation so that the media uploader never sends a
//! request with a missing cloud name or upload preset.
//!
//! ## Required Settings
//!
//! - [`MediaHostConfig`] - media host (cloud name + upload preset), usually
//!   read from the environment with [`MediaHostConfig::from_env`]
//!
//! ## Bridges (with platform defaults)
//!
//! - `HttpClient` - HTTP operations (desktop default: reqwest)
//! - `SecureStore` - credential token persistence (desktop default: OS keychain)
//! - `Clock` - time source (default: [`SystemClock`])
//!
//! When the `desktop-shims` feature is enabled, desktop-ready defaults for
//! `HttpClient` and `SecureStore` are injected automatically if not provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{CoreConfig, MediaHostConfig};
//!
//! let config = CoreConfig::builder()
//!     .media(MediaHostConfig::from_env()?)
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::CoreConfig;
//!
//! // Missing media configuration is reported before anything is wired up
//! let config = CoreConfig::builder()
//!     .build()
//!     .expect("Should fail - missing media host configuration");
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{Clock, HttpClient, SecureStore, SystemClock};
use std::sync::Arc;
use std::time::Duration;

/// Environment variable holding the media host cloud name.
pub const CLOUD_NAME_ENV: &str = "CLOUDINARY_CLOUD_NAME";

/// Environment variable holding the unsigned upload preset.
pub const UPLOAD_PRESET_ENV: &str = "CLOUDINARY_UPLOAD_PRESET";

/// Media host API origin.
pub const DEFAULT_MEDIA_API_BASE: &str = "https://api.cloudinary.com";

/// Upper bound for a single upload request.
pub const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Secure-store key under which the session token lives.
pub const DEFAULT_CREDENTIAL_KEY: &str = "token";

/// Media host (Cloudinary) configuration.
///
/// Both identifiers are configuration constants, never user input.
///
/// # Example
///
/// ```
/// use core_runtime::config::MediaHostConfig;
///
/// let config = MediaHostConfig::new("demo-cloud", "avatars");
/// assert_eq!(
///     config.upload_url(),
///     "https://api.cloudinary.com/v1_1/demo-cloud/upload"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaHostConfig {
    /// Cloud name identifying the destination account
    pub cloud_name: String,

    /// Upload preset (server-side profile controlling asset processing)
    pub upload_preset: String,

    /// API origin, overridable for staging hosts and tests
    pub api_base: String,

    /// Timeout applied to each upload request
    pub upload_timeout: Duration,
}

impl MediaHostConfig {
    pub fn new(cloud_name: impl Into<String>, upload_preset: impl Into<String>) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            upload_preset: upload_preset.into(),
            api_base: DEFAULT_MEDIA_API_BASE.to_string(),
            upload_timeout: DEFAULT_UPLOAD_TIMEOUT,
        }
    }

    /// Reads [`CLOUD_NAME_ENV`] and [`UPLOAD_PRESET_ENV`] from the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` naming the variable if either is unset or blank.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    Error::Config(format!(
                        "{} is not set. The media uploader needs it to build upload requests.",
                        key
                    ))
                })
        };

        let config = Self::new(required(CLOUD_NAME_ENV)?, required(UPLOAD_PRESET_ENV)?);
        config.validate()?;
        Ok(config)
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_upload_timeout(mut self, timeout: Duration) -> Self {
        self.upload_timeout = timeout;
        self
    }

    /// Upload endpoint: `{api_base}/v1_1/{cloud_name}/upload`
    pub fn upload_url(&self) -> String {
        format!(
            "{}/v1_1/{}/upload",
            self.api_base.trim_end_matches('/'),
            self.cloud_name
        )
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.cloud_name.trim().is_empty() {
            return Err(Error::Config("Media cloud name cannot be empty".to_string()));
        }

        if self.cloud_name.contains(['/', '?', '#']) || self.cloud_name.contains(char::is_whitespace) {
            return Err(Error::Config(format!(
                "Media cloud name '{}' is not a valid path segment",
                self.cloud_name
            )));
        }

        if self.upload_preset.trim().is_empty() {
            return Err(Error::Config("Upload preset cannot be empty".to_string()));
        }

        if !(self.api_base.starts_with("https://") || self.api_base.starts_with("http://")) {
            return Err(Error::Config(format!(
                "Media API base '{}' must be an http(s) URL",
                self.api_base
            )));
        }

        if self.upload_timeout.is_zero() {
            return Err(Error::Config(
                "Upload timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// Core configuration for the Linkup client core.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Media host used for avatar uploads
    pub media: MediaHostConfig,

    /// HTTP client for the media host
    pub http_client: Arc<dyn HttpClient>,

    /// Storage for the session credential token
    pub secure_store: Arc<dyn SecureStore>,

    /// Time source for cache-busting timestamps
    pub clock: Arc<dyn Clock>,

    /// Key of the credential token inside `secure_store`
    pub credential_key: String,

    /// Capacity of the event bus channel
    pub event_buffer_size: usize,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("media", &self.media)
            .field("http_client", &"HttpClient { ... }")
            .field("secure_store", &"SecureStore { ... }")
            .field("clock", &"Clock { ... }")
            .field("credential_key", &self.credential_key)
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        self.media.validate()?;

        if self.credential_key.trim().is_empty() {
            return Err(Error::Config("Credential key cannot be empty".to_string()));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn http_client_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "HttpClient implementation is required for media uploads. \
                 Desktop: enable the 'desktop-shims' feature to use the default ReqwestHttpClient. \
                 Web: inject a fetch-based client."
            .to_string(),
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn secure_store_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "SecureStore".to_string(),
        message: "SecureStore implementation is required for the session token. \
                 Desktop: enable the 'desktop-shims' feature to use the default KeyringSecureStore. \
                 Web: inject a localStorage-backed store."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client(media: &MediaHostConfig) -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client = ReqwestHttpClient::try_with_timeout(media.upload_timeout)
        .map_err(|e| Error::Internal(format!("Failed to create default HttpClient: {}", e)))?;
    Ok(Arc::new(client))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client(_media: &MediaHostConfig) -> Result<Arc<dyn HttpClient>> {
    Err(http_client_missing_error())
}

#[cfg(feature = "desktop-shims")]
fn provide_default_secure_store() -> Result<Arc<dyn SecureStore>> {
    use bridge_desktop::KeyringSecureStore;

    Ok(Arc::new(KeyringSecureStore::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_secure_store() -> Result<Arc<dyn SecureStore>> {
    Err(secure_store_missing_error())
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    media: Option<MediaHostConfig>,
    http_client: Option<Arc<dyn HttpClient>>,
    secure_store: Option<Arc<dyn SecureStore>>,
    clock: Option<Arc<dyn Clock>>,
    credential_key: Option<String>,
    event_buffer_size: Option<usize>,
}

impl CoreConfigBuilder {
    /// Sets the media host configuration (required).
    pub fn media(mut self, media: MediaHostConfig) -> Self {
        self.media = Some(media);
        self
    }

    /// Sets the HTTP client implementation.
    ///
    /// If not provided, the desktop default (reqwest-based) will be used when
    /// the `desktop-shims` feature is enabled.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the secure store holding the session token.
    pub fn secure_store(mut self, store: Arc<dyn SecureStore>) -> Self {
        self.secure_store = Some(store);
        self
    }

    /// Sets the clock. Defaults to [`SystemClock`].
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Sets the secure-store key of the credential token.
    ///
    /// Default: [`DEFAULT_CREDENTIAL_KEY`]
    pub fn credential_key(mut self, key: impl Into<String>) -> Self {
        self.credential_key = Some(key.into());
        self
    }

    /// Sets the event bus capacity.
    ///
    /// Default: [`DEFAULT_EVENT_BUFFER_SIZE`]
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Errors
    ///
    /// - `Error::Config` if the media configuration is missing or invalid
    /// - `Error::CapabilityMissing` if a bridge is missing and no platform
    ///   default is compiled in
    pub fn build(self) -> Result<CoreConfig> {
        let media = self.media.ok_or_else(|| {
            Error::Config(
                "Media host configuration is required. Use .media() or MediaHostConfig::from_env()."
                    .to_string(),
            )
        })?;
        media.validate()?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client(&media)?,
        };

        let secure_store = match self.secure_store {
            Some(store) => store,
            None => provide_default_secure_store()?,
        };

        let config = CoreConfig {
            media,
            http_client,
            secure_store,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            credential_key: self
                .credential_key
                .unwrap_or_else(|| DEFAULT_CREDENTIAL_KEY.to_string()),
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::{BridgeError, HttpRequest, HttpResponse};
    use std::collections::HashMap;

    struct MockHttpClient;

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn execute(
            &self,
            _request: HttpRequest,
        ) -> std::result::Result<HttpResponse, BridgeError> {
            Err(BridgeError::NotAvailable("mock".to_string()))
        }
    }

    struct MockSecureStore;

    #[async_trait]
    impl SecureStore for MockSecureStore {
        async fn set_secret(
            &self,
            _key: &str,
            _value: &[u8],
        ) -> std::result::Result<(), BridgeError> {
            Ok(())
        }

        async fn get_secret(
            &self,
            _key: &str,
        ) -> std::result::Result<Option<Vec<u8>>, BridgeError> {
            Ok(None)
        }

        async fn delete_secret(&self, _key: &str) -> std::result::Result<(), BridgeError> {
            Ok(())
        }
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_media_config_from_lookup() {
        let config = MediaHostConfig::from_lookup(env(&[
            (CLOUD_NAME_ENV, "linkup"),
            (UPLOAD_PRESET_ENV, " avatars "),
        ]))
        .unwrap();

        assert_eq!(config.cloud_name, "linkup");
        assert_eq!(config.upload_preset, "avatars");
        assert_eq!(config.api_base, DEFAULT_MEDIA_API_BASE);
        assert_eq!(config.upload_timeout, DEFAULT_UPLOAD_TIMEOUT);
    }

    #[test]
    fn test_media_config_missing_cloud_name_fails_fast() {
        let err = MediaHostConfig::from_lookup(env(&[(UPLOAD_PRESET_ENV, "avatars")])).unwrap_err();
        match err {
            Error::Config(msg) => assert!(msg.contains(CLOUD_NAME_ENV)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_media_config_blank_preset_fails_fast() {
        let err = MediaHostConfig::from_lookup(env(&[
            (CLOUD_NAME_ENV, "linkup"),
            (UPLOAD_PRESET_ENV, "   "),
        ]))
        .unwrap_err();
        match err {
            Error::Config(msg) => assert!(msg.contains(UPLOAD_PRESET_ENV)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_upload_url() {
        let config = MediaHostConfig::new("demo", "preset");
        assert_eq!(
            config.upload_url(),
            "https://api.cloudinary.com/v1_1/demo/upload"
        );

        let config = config.with_api_base("http://127.0.0.1:8080/");
        assert_eq!(config.upload_url(), "http://127.0.0.1:8080/v1_1/demo/upload");
    }

    #[test]
    fn test_media_config_validation() {
        assert!(MediaHostConfig::new("demo", "preset").validate().is_ok());
        assert!(MediaHostConfig::new("de/mo", "preset").validate().is_err());
        assert!(MediaHostConfig::new("de mo", "preset").validate().is_err());
        assert!(MediaHostConfig::new("demo", "preset")
            .with_api_base("ftp://example.com")
            .validate()
            .is_err());
        assert!(MediaHostConfig::new("demo", "preset")
            .with_upload_timeout(Duration::ZERO)
            .validate()
            .is_err());
    }

    #[test]
    fn test_builder_requires_media() {
        let result = CoreConfig::builder()
            .http_client(Arc::new(MockHttpClient))
            .secure_store(Arc::new(MockSecureStore))
            .build();

        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_builder_defaults() {
        let config = CoreConfig::builder()
            .media(MediaHostConfig::new("demo", "preset"))
            .http_client(Arc::new(MockHttpClient))
            .secure_store(Arc::new(MockSecureStore))
            .build()
            .unwrap();

        assert_eq!(config.credential_key, DEFAULT_CREDENTIAL_KEY);
        assert_eq!(config.event_buffer_size, DEFAULT_EVENT_BUFFER_SIZE);
        assert!(config.clock.unix_timestamp_millis() > 0);
    }

    #[test]
    fn test_builder_rejects_empty_credential_key() {
        let result = CoreConfig::builder()
            .media(MediaHostConfig::new("demo", "preset"))
            .http_client(Arc::new(MockHttpClient))
            .secure_store(Arc::new(MockSecureStore))
            .credential_key("")
            .build();

        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_debug_hides_bridges() {
        let config = CoreConfig::builder()
            .media(MediaHostConfig::new("demo", "preset"))
            .http_client(Arc::new(MockHttpClient))
            .secure_store(Arc::new(MockSecureStore))
            .build()
            .unwrap();

        let debug = format!("{:?}", config);
        assert!(debug.contains("HttpClient { ... }"));
        assert!(debug.contains("demo"));
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_missing_http_client_is_reported() {
        let result = CoreConfig::builder()
            .media(MediaHostConfig::new("demo", "preset"))
            .secure_store(Arc::new(MockSecureStore))
            .build();

        match result {
            Err(Error::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "HttpClient")
            }
            other => panic!("expected CapabilityMissing, got {other:?}"),
        }
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_missing_secure_store_is_reported() {
        let result = CoreConfig::builder()
            .media(MediaHostConfig::new("demo", "preset"))
            .http_client(Arc::new(MockHttpClient))
            .build();

        match result {
            Err(Error::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "SecureStore")
            }
            other => panic!("expected CapabilityMissing, got {other:?}"),
        }
    }
}
