//! HTTP Client Abstraction
//!
//! Provides async HTTP operations, including `multipart/form-data` bodies for
//! file uploads. Requests are executed exactly once; retry policy belongs to
//! callers, not to the bridge.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::Result;

/// HTTP method types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Value carried by a single multipart field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartValue {
    /// Plain text field
    Text(String),
    /// Binary file field
    File {
        bytes: Bytes,
        file_name: String,
        mime_type: Option<String>,
    },
}

/// A named multipart field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartPart {
    pub name: String,
    pub value: PartValue,
}

/// Ordered `multipart/form-data` body.
///
/// Fields are kept in insertion order; adapters must emit them in that order.
///
/// # Example
///
/// ```
/// use bridge_traits::http::MultipartForm;
/// use bytes::Bytes;
///
/// let form = MultipartForm::new()
///     .file("file", Bytes::from_static(b"\x89PNG"), "avatar.png", Some("image/png".to_string()))
///     .text("overwrite", "true");
///
/// assert_eq!(form.text_value("overwrite"), Some("true"));
/// assert_eq!(form.parts().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    parts: Vec<MultipartPart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text field
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(MultipartPart {
            name: name.into(),
            value: PartValue::Text(value.into()),
        });
        self
    }

    /// Append a binary file field
    pub fn file(
        mut self,
        name: impl Into<String>,
        bytes: Bytes,
        file_name: impl Into<String>,
        mime_type: Option<String>,
    ) -> Self {
        self.parts.push(MultipartPart {
            name: name.into(),
            value: PartValue::File {
                bytes,
                file_name: file_name.into(),
                mime_type,
            },
        });
        self
    }

    pub fn parts(&self) -> &[MultipartPart] {
        &self.parts
    }

    /// Look up the first part with the given name
    pub fn part(&self, name: &str) -> Option<&MultipartPart> {
        self.parts.iter().find(|p| p.name == name)
    }

    /// Value of the first text field with the given name
    pub fn text_value(&self, name: &str) -> Option<&str> {
        match self.part(name).map(|p| &p.value) {
            Some(PartValue::Text(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn into_parts(self) -> Vec<MultipartPart> {
        self.parts
    }
}

/// Request payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// Raw bytes, content type taken from headers
    Raw(Bytes),
    /// `multipart/form-data`; the adapter generates the boundary header
    Multipart(MultipartForm),
}

/// HTTP request builder
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<RequestBody>,
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn body(mut self, body: Bytes) -> Self {
        self.body = Some(RequestBody::Raw(body));
        self
    }

    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = Some(RequestBody::Multipart(form));
        self
    }

    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Multipart body, if this request carries one
    pub fn multipart_form(&self) -> Option<&MultipartForm> {
        match &self.body {
            Some(RequestBody::Multipart(form)) => Some(form),
            _ => None,
        }
    }
}

/// HTTP response
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl HttpResponse {
    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Async HTTP client trait
///
/// This trait abstracts HTTP operations to allow platform-specific implementations.
/// Implementations should handle:
/// - TLS certificate validation
/// - Connection pooling and keep-alive
/// - Per-request timeouts (`HttpRequest::timeout`)
/// - Encoding `RequestBody::Multipart` as `multipart/form-data`
///
/// A request is sent once. Non-2xx statuses are returned as ordinary
/// responses; only transport failures become errors.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, MultipartForm};
///
/// async fn send_form(client: &dyn HttpClient, form: MultipartForm) -> Result<u16> {
///     let request = HttpRequest::new(HttpMethod::Post, "https://api.example.com/upload")
///         .multipart(form);
///
///     Ok(client.execute(request).await?.status)
/// }
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Network connection fails
    /// - TLS validation fails
    /// - Request times out
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_request_builder() {
        let request = HttpRequest::new(HttpMethod::Get, "https://example.com")
            .header("User-Agent", "test")
            .timeout(Duration::from_secs(30));

        assert_eq!(request.url, "https://example.com");
        assert_eq!(request.headers.get("User-Agent"), Some(&"test".to_string()));
        assert!(request.body.is_none());
        assert_eq!(request.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_multipart_request_keeps_field_order() {
        let form = MultipartForm::new()
            .file("file", Bytes::from_static(b"abc"), "a.png", None)
            .text("upload_preset", "preset")
            .text("public_id", "avatar_1");

        let request = HttpRequest::new(HttpMethod::Post, "https://example.com/upload")
            .multipart(form);

        let form = request.multipart_form().unwrap();
        let names: Vec<&str> = form.parts().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["file", "upload_preset", "public_id"]);
        assert_eq!(form.text_value("public_id"), Some("avatar_1"));
        // file parts are not text
        assert_eq!(form.text_value("file"), None);
    }

    #[test]
    fn test_http_response_status_checks() {
        let response = HttpResponse {
            status: 200,
            headers: HashMap::new(),
            body: Bytes::from("test"),
        };

        assert!(response.is_success());

        let response = HttpResponse {
            status: 401,
            headers: HashMap::new(),
            body: Bytes::new(),
        };
        assert!(!response.is_success());
    }
}
