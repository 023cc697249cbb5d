//! Session Token Storage
//!
//! Persists the single credential token in the platform secure store and
//! keeps an in-memory copy for the navigation guard.
//!
//! ## Security Features
//!
//! - The token value is never logged or included in error messages
//! - Storage goes through the `SecureStore` bridge (Keychain, DPAPI, libsecret)
//! - Unreadable stored values are erased rather than trusted
//!
//! ## Example
//!
//! ```no_run
//! use core_auth::{CredentialProvider, CredentialToken, SessionStore};
//! use std::sync::Arc;
//! # use bridge_traits::storage::SecureStore;
//! # async fn example(secure_store: Arc<dyn SecureStore>) -> core_auth::Result<()> {
//! let session = SessionStore::new(secure_store);
//!
//! // Pick up a token left by a previous run
//! session.restore().await?;
//!
//! if !session.has_token() {
//!     session.sign_in(CredentialToken::new("abc123")?).await?;
//! }
//!
//! session.sign_out().await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::types::{CredentialProvider, CredentialToken};
use bridge_traits::storage::SecureStore;
use core_runtime::config::DEFAULT_CREDENTIAL_KEY;
use core_runtime::events::{CoreEvent, EventBus, SessionEvent};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Owner of the client's credential token.
///
/// Writes go to the secure store first and to the cache only once they have
/// succeeded, so the cache never claims a session the store does not hold.
pub struct SessionStore {
    secure_store: Arc<dyn SecureStore>,
    key: String,
    cache: RwLock<Option<CredentialToken>>,
    event_bus: Option<EventBus>,
}

impl SessionStore {
    /// Create a session store using the default storage key (`"token"`).
    pub fn new(secure_store: Arc<dyn SecureStore>) -> Self {
        debug!("Initializing SessionStore");
        Self {
            secure_store,
            key: DEFAULT_CREDENTIAL_KEY.to_string(),
            cache: RwLock::new(None),
            event_bus: None,
        }
    }

    /// Use a different secure-store key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Publish session changes on `event_bus`.
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// The secure-store key holding the token.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load a previously stored token into memory.
    ///
    /// Returns `true` if a token was found. Blank values count as absent;
    /// values that are not valid UTF-8 are erased.
    pub async fn restore(&self) -> Result<bool> {
        let data = self
            .secure_store
            .get_secret(&self.key)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to read token from secure storage");
                AuthError::SecureStorageUnavailable(e.to_string())
            })?;

        let token = match data {
            None => None,
            Some(bytes) => match String::from_utf8(bytes) {
                Ok(value) => CredentialToken::from_stored(value),
                Err(_) => {
                    warn!("Stored token is not valid UTF-8, discarding it");
                    if let Err(e) = self.secure_store.delete_secret(&self.key).await {
                        warn!(error = %e, "Failed to delete unreadable token");
                    }
                    None
                }
            },
        };

        let restored = token.is_some();
        self.replace_cached(token);

        if restored {
            info!("Session restored from secure storage");
            self.publish(SessionEvent::Restored);
        } else {
            debug!("No stored session found");
        }

        Ok(restored)
    }

    /// Persist `token` and make it the current credential.
    pub async fn sign_in(&self, token: CredentialToken) -> Result<()> {
        self.secure_store
            .set_secret(&self.key, token.expose().as_bytes())
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to store token in secure storage");
                AuthError::SecureStorageUnavailable(e.to_string())
            })?;

        self.replace_cached(Some(token));
        info!("Signed in");
        self.publish(SessionEvent::SignedIn);

        Ok(())
    }

    /// Remove the stored token. Signing out without a session succeeds.
    pub async fn sign_out(&self) -> Result<()> {
        self.secure_store
            .delete_secret(&self.key)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to delete token from secure storage");
                AuthError::SecureStorageUnavailable(e.to_string())
            })?;

        self.replace_cached(None);
        info!("Signed out");
        self.publish(SessionEvent::SignedOut);

        Ok(())
    }

    fn replace_cached(&self, token: Option<CredentialToken>) {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        *cache = token;
    }

    fn publish(&self, event: SessionEvent) {
        if let Some(bus) = &self.event_bus {
            // No subscribers is fine.
            let _ = bus.emit(CoreEvent::Session(event));
        }
    }
}

impl CredentialProvider for SessionStore {
    fn current_token(&self) -> Option<CredentialToken> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("key", &self.key)
            .field("has_token", &self.has_token())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_desktop::MemorySecureStore;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use mockall::mock;

    mock! {
        pub Store {}

        #[async_trait]
        impl SecureStore for Store {
            async fn set_secret(&self, key: &str, value: &[u8]) -> BridgeResult<()>;
            async fn get_secret(&self, key: &str) -> BridgeResult<Option<Vec<u8>>>;
            async fn delete_secret(&self, key: &str) -> BridgeResult<()>;
        }
    }

    fn token(value: &str) -> CredentialToken {
        CredentialToken::new(value).unwrap()
    }

    #[tokio::test]
    async fn test_sign_in_persists_and_caches() {
        let store = MemorySecureStore::new();
        let session = SessionStore::new(Arc::new(store.clone()));

        session.sign_in(token("abc123")).await.unwrap();

        assert!(session.has_token());
        assert_eq!(session.current_token().unwrap().expose(), "abc123");
        assert_eq!(
            store.get_secret("token").await.unwrap(),
            Some(b"abc123".to_vec())
        );
    }

    #[tokio::test]
    async fn test_sign_out_clears_store_and_cache() {
        let store = MemorySecureStore::new();
        let session = SessionStore::new(Arc::new(store.clone()));

        session.sign_in(token("abc123")).await.unwrap();
        session.sign_out().await.unwrap();

        assert!(!session.has_token());
        assert!(store.is_empty().await);

        // Idempotent
        session.sign_out().await.unwrap();
    }

    #[tokio::test]
    async fn test_restore_picks_up_previous_session() {
        let store = MemorySecureStore::new();
        store.set_secret("token", b"abc123").await.unwrap();

        let session = SessionStore::new(Arc::new(store));
        assert!(!session.has_token(), "cache starts empty");

        assert!(session.restore().await.unwrap());
        assert_eq!(session.current_token().unwrap().expose(), "abc123");
    }

    #[tokio::test]
    async fn test_restore_treats_empty_value_as_absent() {
        let store = MemorySecureStore::new();
        store.set_secret("token", b"").await.unwrap();

        let session = SessionStore::new(Arc::new(store));
        assert!(!session.restore().await.unwrap());
        assert!(!session.has_token());
    }

    #[tokio::test]
    async fn test_restore_discards_non_utf8_value() {
        let store = MemorySecureStore::new();
        store.set_secret("token", &[0xff, 0xfe, 0x00]).await.unwrap();

        let session = SessionStore::new(Arc::new(store.clone()));
        assert!(!session.restore().await.unwrap());
        assert!(store.get_secret("token").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_custom_key() {
        let store = MemorySecureStore::new();
        let session = SessionStore::new(Arc::new(store.clone())).with_key("linkup.session");

        session.sign_in(token("abc123")).await.unwrap();

        assert_eq!(session.key(), "linkup.session");
        assert!(store.get_secret("token").await.unwrap().is_none());
        assert!(store.has_secret("linkup.session").await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_write_keeps_previous_state() {
        let mut store = MockStore::new();
        store
            .expect_set_secret()
            .returning(|_, _| Err(BridgeError::NotAvailable("keychain locked".to_string())));

        let session = SessionStore::new(Arc::new(store));
        let result = session.sign_in(token("abc123")).await;

        assert!(matches!(
            result,
            Err(AuthError::SecureStorageUnavailable(_))
        ));
        assert!(!session.has_token());
    }

    #[tokio::test]
    async fn test_restore_failure_is_reported() {
        let mut store = MockStore::new();
        store
            .expect_get_secret()
            .withf(|key| key == "token")
            .returning(|_| Err(BridgeError::OperationFailed("dbus gone".to_string())));

        let session = SessionStore::new(Arc::new(store));
        assert!(session.restore().await.is_err());
    }

    #[tokio::test]
    async fn test_session_events_are_published() {
        let bus = EventBus::new(8);
        let mut events = bus.subscribe();
        let session = SessionStore::new(Arc::new(MemorySecureStore::new())).with_event_bus(bus);

        session.sign_in(token("abc123")).await.unwrap();
        session.sign_out().await.unwrap();

        assert_eq!(
            events.recv().await.unwrap(),
            CoreEvent::Session(SessionEvent::SignedIn)
        );
        assert_eq!(
            events.recv().await.unwrap(),
            CoreEvent::Session(SessionEvent::SignedOut)
        );
    }

    #[test]
    fn test_debug_does_not_leak_token() {
        let session = SessionStore::new(Arc::new(MemorySecureStore::new()));
        let debug = format!("{:?}", session);
        assert!(debug.contains("has_token: false"));
    }
}
