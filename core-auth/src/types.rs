use crate::error::{AuthError, Result};
use std::fmt;

/// Opaque credential issued by the backend at login.
///
/// The client never looks inside the value. A token is either present or
/// absent; an empty string is never a token.
///
/// # Examples
///
/// ```
/// use core_auth::CredentialToken;
///
/// let token = CredentialToken::new("abc123").unwrap();
/// assert_eq!(token.expose(), "abc123");
/// assert_eq!(format!("{:?}", token), "CredentialToken([REDACTED])");
///
/// assert!(CredentialToken::new("").is_err());
/// // Any other string is a token, whitespace included.
/// assert!(CredentialToken::new(" ").is_ok());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialToken(String);

impl CredentialToken {
    /// Wrap a token value, rejecting only the empty string.
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(AuthError::InvalidToken(
                "token must not be empty".to_string(),
            ));
        }
        Ok(Self(value))
    }

    /// Interpret a value read back from storage.
    ///
    /// An empty value counts as "no token" rather than as an error.
    pub fn from_stored(value: impl Into<String>) -> Option<Self> {
        Self::new(value).ok()
    }

    /// The raw token value, for attaching to outgoing requests.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CredentialToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialToken([REDACTED])")
    }
}

/// Read-only access to the current credential.
///
/// Implementations must answer from memory; callers invoke this on every
/// route transition.
pub trait CredentialProvider: Send + Sync {
    /// The token currently held, if any.
    fn current_token(&self) -> Option<CredentialToken>;

    /// Whether a token is currently held.
    fn has_token(&self) -> bool {
        self.current_token().is_some()
    }
}

/// A provider with a fixed answer.
///
/// Useful for hosts that manage the token themselves, and for tests.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    token: Option<CredentialToken>,
}

impl StaticCredentials {
    /// No token present.
    pub fn anonymous() -> Self {
        Self { token: None }
    }

    /// A fixed token.
    pub fn with_token(token: CredentialToken) -> Self {
        Self { token: Some(token) }
    }

    /// Build from a raw value as a host would read it from storage.
    ///
    /// `None` and `Some("")` both mean anonymous.
    pub fn from_raw(value: Option<&str>) -> Self {
        Self {
            token: value.and_then(CredentialToken::from_stored),
        }
    }
}

impl CredentialProvider for StaticCredentials {
    fn current_token(&self) -> Option<CredentialToken> {
        self.token.clone()
    }
}

impl<P: CredentialProvider + ?Sized> CredentialProvider for std::sync::Arc<P> {
    fn current_token(&self) -> Option<CredentialToken> {
        (**self).current_token()
    }

    fn has_token(&self) -> bool {
        (**self).has_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_rejects_only_empty_value() {
        assert!(matches!(
            CredentialToken::new(""),
            Err(AuthError::InvalidToken(_))
        ));
        assert_eq!(CredentialToken::new("   ").unwrap().expose(), "   ");
        assert!(CredentialToken::new("abc123").is_ok());
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = CredentialToken::new("super-secret").unwrap();
        let debug = format!("{:?}", token);

        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_static_credentials() {
        assert!(!StaticCredentials::anonymous().has_token());
        assert!(!StaticCredentials::default().has_token());

        let provider = StaticCredentials::with_token(CredentialToken::new("abc123").unwrap());
        assert!(provider.has_token());
        assert_eq!(provider.current_token().unwrap().expose(), "abc123");
    }

    #[test]
    fn test_empty_raw_value_is_anonymous() {
        assert!(!StaticCredentials::from_raw(None).has_token());
        assert!(!StaticCredentials::from_raw(Some("")).has_token());
        assert!(StaticCredentials::from_raw(Some("  ")).has_token());
        assert!(StaticCredentials::from_raw(Some("abc123")).has_token());
    }

    #[test]
    fn test_arc_provider_delegates() {
        let provider: std::sync::Arc<dyn CredentialProvider> =
            std::sync::Arc::new(StaticCredentials::from_raw(Some("abc123")));
        assert!(provider.has_token());
    }
}
