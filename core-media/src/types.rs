//! Upload inputs, results and media-host wire types

use crate::error::{Result, UploadError};
use bytes::Bytes;
use serde::Deserialize;
use std::fmt;

/// Prefix of the public id every avatar is stored under.
pub const AVATAR_PUBLIC_ID_PREFIX: &str = "avatar_";

/// File name sent when the host did not supply one.
pub const DEFAULT_FILE_NAME: &str = "upload";

/// Identifier of the user an avatar belongs to.
///
/// Uploads for the same owner overwrite one another on the media host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OwnerId(String);

impl OwnerId {
    /// Rejects empty ids, which would collapse every owner onto `avatar_`.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(UploadError::InvalidOwner(
                "owner id must not be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Public id of this owner's avatar on the media host.
    ///
    /// ```
    /// use core_media::OwnerId;
    ///
    /// assert_eq!(OwnerId::new("42").unwrap().public_id(), "avatar_42");
    /// ```
    pub fn public_id(&self) -> String {
        format!("{}{}", AVATAR_PUBLIC_ID_PREFIX, self.0)
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A local file picked by the user.
#[derive(Clone)]
pub struct UploadFile {
    pub bytes: Bytes,
    pub file_name: String,
    pub mime_type: Option<String>,
}

impl UploadFile {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            file_name: DEFAULT_FILE_NAME.to_string(),
            mime_type: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Check the file can be sent as a multipart part.
    ///
    /// # Errors
    ///
    /// - [`UploadError::EmptyFile`] when there are no bytes
    /// - [`UploadError::InvalidFile`] when `mime_type` is not `type/subtype`
    ///   with optional `; key=value` parameters
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(UploadError::EmptyFile);
        }
        if let Some(mime) = &self.mime_type {
            if !is_valid_mime(mime) {
                return Err(UploadError::InvalidFile(format!(
                    "invalid content type '{}'",
                    mime
                )));
            }
        }
        Ok(())
    }
}

// RFC 6838 restricted-name characters.
fn is_mime_token(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || "!#$&-^_.+".contains(c))
}

fn is_valid_mime(value: &str) -> bool {
    let mut sections = value.split(';');
    let essence = sections.next().unwrap_or_default().trim();
    let valid_essence = match essence.split_once('/') {
        Some((kind, subtype)) => is_mime_token(kind) && is_mime_token(subtype),
        None => false,
    };

    valid_essence
        && sections.all(|param| match param.trim().split_once('=') {
            Some((key, value)) => is_mime_token(key.trim()) && !value.trim().is_empty(),
            None => false,
        })
}

impl fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadFile")
            .field("len", &self.bytes.len())
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

/// URL of a freshly stored avatar.
///
/// The `Display` form appends `?t=<millis>` so clients holding the previous
/// image under the same URL fetch the new one.
///
/// ```
/// use core_media::AvatarUrl;
///
/// let url = AvatarUrl::new("https://res.cloudinary.com/demo/image/upload/avatar_42.png", 1700000000000);
/// assert_eq!(
///     url.to_string(),
///     "https://res.cloudinary.com/demo/image/upload/avatar_42.png?t=1700000000000"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarUrl {
    base_url: String,
    cache_buster: i64,
}

impl AvatarUrl {
    pub fn new(base_url: impl Into<String>, cache_buster: i64) -> Self {
        Self {
            base_url: base_url.into(),
            cache_buster,
        }
    }

    /// The stored asset URL without the cache buster.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Milliseconds since the Unix epoch at upload time.
    pub fn cache_buster(&self) -> i64 {
        self.cache_buster
    }
}

impl fmt::Display for AvatarUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}?t={}", self.base_url, self.cache_buster)
    }
}

impl From<AvatarUrl> for String {
    fn from(url: AvatarUrl) -> Self {
        url.to_string()
    }
}

/// Successful upload response; only `secure_url` is used.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UploadResponse {
    #[serde(default)]
    pub secure_url: Option<String>,
    #[serde(default)]
    pub public_id: Option<String>,
    #[serde(default)]
    pub version: Option<u64>,
}

/// Error response: `{"error": {"message": "..."}}`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_id_validation() {
        assert!(matches!(OwnerId::new(""), Err(UploadError::InvalidOwner(_))));
        assert!(OwnerId::new("  ").is_err());
        assert_eq!(OwnerId::new("42").unwrap().as_str(), "42");
    }

    #[test]
    fn test_upload_file_defaults() {
        let file = UploadFile::new(vec![1u8, 2, 3]);
        assert_eq!(file.file_name, "upload");
        assert_eq!(file.mime_type, None);
        assert_eq!(file.len(), 3);

        let file = file.with_file_name("me.png").with_mime_type("image/png");
        assert_eq!(file.file_name, "me.png");
        assert_eq!(file.mime_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn test_upload_file_validation() {
        assert!(UploadFile::new(vec![1u8]).validate().is_ok());
        assert!(matches!(
            UploadFile::new(Bytes::new()).validate(),
            Err(UploadError::EmptyFile)
        ));

        for ok in ["image/png", "image/svg+xml", "text/plain; charset=utf-8"] {
            assert!(
                UploadFile::new(vec![1u8]).with_mime_type(ok).validate().is_ok(),
                "{ok}"
            );
        }
        for bad in ["not a mime", "image", "image/", "/png", "image/png; charset"] {
            assert!(
                matches!(
                    UploadFile::new(vec![1u8]).with_mime_type(bad).validate(),
                    Err(UploadError::InvalidFile(_))
                ),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_upload_file_debug_omits_bytes() {
        let file = UploadFile::new(Bytes::from_static(b"secret-pixels"));
        assert!(!format!("{:?}", file).contains("secret-pixels"));
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{"public_id":"avatar_42","version":1712,"secure_url":"https://res.cloudinary.com/x.png","bytes":12}"#;
        let parsed: UploadResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.secure_url.as_deref(), Some("https://res.cloudinary.com/x.png"));
        assert_eq!(parsed.version, Some(1712));

        let parsed: UploadResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.secure_url.is_none());

        let err: ErrorResponse =
            serde_json::from_str(r#"{"error":{"message":"Invalid image file"}}"#).unwrap();
        assert_eq!(err.error.message, "Invalid image file");
    }
}
