//! Error types for avatar uploads

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Upload failures.
///
/// Every variant propagates to the caller; an upload never "succeeds" with a
/// URL it could not actually read from the media host.
#[derive(Error, Debug)]
pub enum UploadError {
    /// The request never produced a response (DNS, TLS, timeout, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// The media host answered with a non-2xx status
    #[error("Upload rejected (HTTP {status}): {message}")]
    HttpStatus { status: u16, message: String },

    /// The response body was not the JSON we expect
    #[error("Malformed upload response: {0}")]
    MalformedResponse(String),

    #[error("Invalid owner id: {0}")]
    InvalidOwner(String),

    #[error("Refusing to upload an empty file")]
    EmptyFile,

    /// The file part cannot be encoded, e.g. its content type does not parse
    #[error("Invalid upload file: {0}")]
    InvalidFile(String),

    #[error("Media host configuration error: {0}")]
    Config(String),
}

impl UploadError {
    /// HTTP status code, if the host answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            UploadError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<BridgeError> for UploadError {
    fn from(error: BridgeError) -> Self {
        match error {
            BridgeError::Timeout => UploadError::Network("request timed out".to_string()),
            other => UploadError::Network(other.to_string()),
        }
    }
}

impl From<core_runtime::Error> for UploadError {
    fn from(error: core_runtime::Error) -> Self {
        UploadError::Config(error.to_string())
    }
}

/// Result type for upload operations
pub type Result<T> = std::result::Result<T, UploadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_display() {
        let err = UploadError::HttpStatus {
            status: 400,
            message: "Upload preset not found".to_string(),
        };
        assert_eq!(err.to_string(), "Upload rejected (HTTP 400): Upload preset not found");
        assert_eq!(err.status(), Some(400));
        assert_eq!(UploadError::EmptyFile.status(), None);
    }

    #[test]
    fn test_bridge_errors_are_network_errors() {
        assert!(matches!(
            UploadError::from(BridgeError::Timeout),
            UploadError::Network(_)
        ));
        assert!(matches!(
            UploadError::from(BridgeError::ConnectionFailed("refused".to_string())),
            UploadError::Network(_)
        ));
    }
}
