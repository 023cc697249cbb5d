//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP, secure
//! storage, clock) into the Linkup client core: the session store, the
//! guarded navigator and the avatar uploader. Desktop apps typically enable
//! the `desktop-shims` feature, which fills missing bridges with the
//! reqwest and keychain adapters from `bridge-desktop`.
//!
//! Outcomes the user should hear about (a failed avatar upload, mostly) are
//! published on the [`EventBus`]; subscribe with
//! [`LinkupCore::subscribe_events`] and render them as notifications.

pub mod error;

pub use error::{CoreError, Result};

use std::collections::BTreeMap;
use std::sync::Arc;

use bridge_traits::{http::HttpClient, storage::SecureStore, time::Clock, SystemClock};
use core_auth::{CredentialProvider, CredentialToken, SessionStore};
use core_media::{AvatarUrl, MediaUploader, OwnerId, UploadError, UploadFile};
use core_router::{Navigation, Navigator, RouteTable};
use core_runtime::config::{CoreConfig, MediaHostConfig, DEFAULT_CREDENTIAL_KEY};
use core_runtime::events::{CoreEvent, EventBus, Receiver, UploadEvent, DEFAULT_EVENT_BUFFER_SIZE};
use tracing::{info, warn};

/// Aggregated handle to all bridge dependencies the core requires.
#[derive(Clone)]
pub struct CoreDependencies {
    pub http_client: Arc<dyn HttpClient>,
    pub secure_store: Arc<dyn SecureStore>,
    pub clock: Arc<dyn Clock>,
}

impl CoreDependencies {
    /// Construct a dependency bundle; the clock defaults to [`SystemClock`].
    pub fn new(http_client: Arc<dyn HttpClient>, secure_store: Arc<dyn SecureStore>) -> Self {
        Self {
            http_client,
            secure_store,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl From<&CoreConfig> for CoreDependencies {
    fn from(config: &CoreConfig) -> Self {
        Self {
            http_client: Arc::clone(&config.http_client),
            secure_store: Arc::clone(&config.secure_store),
            clock: Arc::clone(&config.clock),
        }
    }
}

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct LinkupCore {
    session: Arc<SessionStore>,
    navigator: Navigator,
    uploader: Arc<MediaUploader>,
    event_bus: EventBus,
}

impl LinkupCore {
    /// Create a core with the standard route table and default settings.
    pub fn new(deps: CoreDependencies, media: MediaHostConfig) -> Result<Self> {
        Self::assemble(
            deps,
            media,
            RouteTable::linkup()?,
            DEFAULT_CREDENTIAL_KEY,
            DEFAULT_EVENT_BUFFER_SIZE,
        )
    }

    /// Create a core from a validated [`CoreConfig`].
    pub fn from_config(config: CoreConfig) -> Result<Self> {
        Self::from_config_with_routes(config, RouteTable::linkup()?)
    }

    /// Create a core with a host-supplied route table.
    pub fn from_config_with_routes(config: CoreConfig, routes: RouteTable) -> Result<Self> {
        config.validate()?;
        let deps = CoreDependencies::from(&config);
        Self::assemble(
            deps,
            config.media,
            routes,
            &config.credential_key,
            config.event_buffer_size,
        )
    }

    fn assemble(
        deps: CoreDependencies,
        media: MediaHostConfig,
        routes: RouteTable,
        credential_key: &str,
        event_buffer_size: usize,
    ) -> Result<Self> {
        let event_bus = EventBus::new(event_buffer_size);

        let session = Arc::new(
            SessionStore::new(deps.secure_store)
                .with_key(credential_key)
                .with_event_bus(event_bus.clone()),
        );

        let credentials: Arc<dyn CredentialProvider> = session.clone();
        let navigator =
            Navigator::new(Arc::new(routes), credentials).with_event_bus(event_bus.clone());

        let uploader = Arc::new(MediaUploader::new(deps.http_client, media, deps.clock)?);

        Ok(Self {
            session,
            navigator,
            uploader,
            event_bus,
        })
    }

    /// Restore a session left by a previous run.
    ///
    /// Returns `true` if a stored token was found.
    pub async fn start(&self) -> Result<bool> {
        let restored = self.session.restore().await?;
        info!(restored, "Linkup core started");
        Ok(restored)
    }

    /// Run a route transition through the guard.
    pub fn navigate(&self, path: &str) -> Result<Navigation> {
        Ok(self.navigator.navigate(path)?)
    }

    /// Navigate to a named route.
    pub fn navigate_named(&self, name: &str, params: &BTreeMap<String, String>) -> Result<Navigation> {
        Ok(self.navigator.navigate_named(name, params)?)
    }

    /// Store the token returned by the login endpoint.
    pub async fn sign_in(&self, token: &str) -> Result<()> {
        let token = CredentialToken::new(token)?;
        self.session.sign_in(token).await?;
        Ok(())
    }

    /// Forget the stored token.
    pub async fn sign_out(&self) -> Result<()> {
        self.session.sign_out().await?;
        Ok(())
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.has_token()
    }

    /// Current token, for attaching to backend requests.
    pub fn credentials(&self) -> Arc<dyn CredentialProvider> {
        self.session.clone()
    }

    /// Replace `owner_id`'s avatar with `file`.
    ///
    /// Failures are returned and also published as
    /// [`UploadEvent::Failed`] so the host can notify the user.
    pub async fn upload_avatar(&self, owner_id: &str, file: UploadFile) -> Result<AvatarUrl> {
        let result = self.try_upload(owner_id, file).await;

        match &result {
            Ok(url) => self.publish(UploadEvent::Completed {
                owner_id: owner_id.to_string(),
                url: url.to_string(),
            }),
            Err(e) => {
                warn!(owner_id, error = %e, "Avatar upload failed");
                self.publish(UploadEvent::Failed {
                    owner_id: owner_id.to_string(),
                    message: e.to_string(),
                });
            }
        }

        Ok(result?)
    }

    async fn try_upload(
        &self,
        owner_id: &str,
        file: UploadFile,
    ) -> std::result::Result<AvatarUrl, UploadError> {
        let owner = OwnerId::new(owner_id)?;
        self.publish(UploadEvent::Started {
            owner_id: owner_id.to_string(),
        });
        self.uploader.upload(file, &owner).await
    }

    pub fn routes(&self) -> &RouteTable {
        self.navigator.table()
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn subscribe_events(&self) -> Receiver<CoreEvent> {
        self.event_bus.subscribe()
    }

    fn publish(&self, event: UploadEvent) {
        let _ = self.event_bus.emit(CoreEvent::Upload(event));
    }
}

/// Build a core for a desktop host.
///
/// Reads the media host settings from the environment and uses the default
/// desktop bridges (reqwest, OS keychain), then restores any stored session.
///
/// ```no_run
/// # #[cfg(feature = "desktop-shims")]
/// # async fn example() -> core_service::Result<()> {
/// let core = core_service::bootstrap_desktop().await?;
/// let nav = core.navigate("/me")?;
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "desktop-shims")]
pub async fn bootstrap_desktop() -> Result<LinkupCore> {
    let media = MediaHostConfig::from_env()?;
    let config = CoreConfig::builder().media(media).build()?;
    let core = LinkupCore::from_config(config)?;
    core.start().await?;
    Ok(core)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_desktop::MemorySecureStore;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::http::{HttpRequest, HttpResponse};
    use bytes::Bytes;
    use core_runtime::events::{NavigationEvent, SessionEvent};
    use mockall::mock;
    use std::collections::HashMap;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    fn core_with(http: MockHttpClient, store: MemorySecureStore) -> LinkupCore {
        let deps = CoreDependencies::new(Arc::new(http), Arc::new(store));
        LinkupCore::new(deps, MediaHostConfig::new("linkup", "avatars")).unwrap()
    }

    fn ok_upload() -> BridgeResult<HttpResponse> {
        Ok(HttpResponse {
            status: 200,
            headers: HashMap::new(),
            body: Bytes::from_static(
                br#"{"secure_url":"https://res.cloudinary.com/linkup/image/upload/avatar_42.png"}"#,
            ),
        })
    }

    #[tokio::test]
    async fn test_sign_in_opens_protected_routes() {
        let core = core_with(MockHttpClient::new(), MemorySecureStore::new());

        let before = core.navigate("/me").unwrap();
        assert_eq!(before.destination().unwrap().route.name, "login");

        core.sign_in("abc123").await.unwrap();
        assert!(core.is_signed_in());

        let after = core.navigate("/me").unwrap();
        assert!(matches!(after, Navigation::Allowed(_)));

        core.sign_out().await.unwrap();
        assert!(!core.is_signed_in());
    }

    #[tokio::test]
    async fn test_start_restores_stored_session() {
        let store = MemorySecureStore::new();
        store.set_secret("token", b"abc123").await.unwrap();

        let core = core_with(MockHttpClient::new(), store);
        assert!(core.start().await.unwrap());

        let nav = core.navigate("/login").unwrap();
        assert_eq!(nav.destination().unwrap().route.name, "home");
    }

    #[tokio::test]
    async fn test_empty_sign_in_token_is_rejected() {
        let core = core_with(MockHttpClient::new(), MemorySecureStore::new());
        let result = core.sign_in("").await;
        assert!(matches!(result, Err(CoreError::Auth(_))));
    }

    #[tokio::test]
    async fn test_upload_success_emits_completed() {
        let mut http = MockHttpClient::new();
        http.expect_execute().times(1).returning(|_| ok_upload());
        let core = core_with(http, MemorySecureStore::new());
        let mut events = core.subscribe_events();

        let url = core
            .upload_avatar("42", UploadFile::new(vec![1u8, 2, 3]))
            .await
            .unwrap();

        assert_eq!(
            url.base_url(),
            "https://res.cloudinary.com/linkup/image/upload/avatar_42.png"
        );
        assert_eq!(
            events.recv().await.unwrap(),
            CoreEvent::Upload(UploadEvent::Started {
                owner_id: "42".to_string()
            })
        );
        let completed = events.recv().await.unwrap();
        assert!(matches!(
            completed,
            CoreEvent::Upload(UploadEvent::Completed { ref url, .. }) if url.contains("?t=")
        ));
    }

    #[tokio::test]
    async fn test_upload_failure_is_returned_and_published() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .returning(|_| Err(BridgeError::ConnectionFailed("offline".to_string())));
        let core = core_with(http, MemorySecureStore::new());
        let mut events = core.subscribe_events();

        let result = core
            .upload_avatar("42", UploadFile::new(vec![1u8]))
            .await;
        assert!(matches!(
            result,
            Err(CoreError::Upload(UploadError::Network(_)))
        ));

        events.recv().await.unwrap(); // Started
        let failed = events.recv().await.unwrap();
        assert!(failed.is_user_visible());
        assert_eq!(
            failed.severity(),
            core_runtime::events::EventSeverity::Error
        );
    }

    #[tokio::test]
    async fn test_invalid_owner_fails_without_network() {
        let mut http = MockHttpClient::new();
        http.expect_execute().times(0);
        let core = core_with(http, MemorySecureStore::new());
        let mut events = core.subscribe_events();

        let result = core.upload_avatar("", UploadFile::new(vec![1u8])).await;
        assert!(matches!(
            result,
            Err(CoreError::Upload(UploadError::InvalidOwner(_)))
        ));
        assert!(matches!(
            events.recv().await.unwrap(),
            CoreEvent::Upload(UploadEvent::Failed { .. })
        ));
    }

    #[tokio::test]
    async fn test_session_and_navigation_share_the_bus() {
        let core = core_with(MockHttpClient::new(), MemorySecureStore::new());
        let mut events = core.subscribe_events();

        core.navigate("/search").unwrap();
        core.sign_in("abc123").await.unwrap();

        assert!(matches!(
            events.recv().await.unwrap(),
            CoreEvent::Navigation(NavigationEvent::Redirected { .. })
        ));
        assert_eq!(
            events.recv().await.unwrap(),
            CoreEvent::Session(SessionEvent::SignedIn)
        );
    }

    #[test]
    fn test_from_config_builds_standard_routes() {
        let store = MemorySecureStore::new();
        let config = CoreConfig::builder()
            .media(MediaHostConfig::new("linkup", "avatars"))
            .http_client(Arc::new(MockHttpClient::new()))
            .secure_store(Arc::new(store))
            .credential_key("linkup.token")
            .build()
            .unwrap();

        let core = LinkupCore::from_config(config).unwrap();
        assert_eq!(core.routes().len(), 11);
        assert!(!core.is_signed_in());
    }
}
