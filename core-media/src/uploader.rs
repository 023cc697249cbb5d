//! Avatar uploads to the media host
//!
//! One `POST {api_base}/v1_1/{cloud_name}/upload` per call with a
//! `multipart/form-data` body:
//!
//! | field           | value                          |
//! |-----------------|--------------------------------|
//! | `file`          | the image bytes                |
//! | `upload_preset` | `MediaHostConfig::upload_preset` |
//! | `public_id`     | `avatar_{owner_id}`            |
//! | `overwrite`     | `true`                         |
//!
//! The stored asset URL comes back as `secure_url`; the caller receives it with
//! a `?t=<millis>` cache buster taken when the call started. There is no retry.

use crate::error::{Result, UploadError};
use crate::types::{AvatarUrl, ErrorResponse, OwnerId, UploadFile, UploadResponse};
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, MultipartForm};
use bridge_traits::time::Clock;
use core_runtime::config::MediaHostConfig;
use core_runtime::logging::strip_path;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};

/// Uploads profile images for a configured media host.
pub struct MediaUploader {
    http_client: Arc<dyn HttpClient>,
    config: MediaHostConfig,
    clock: Arc<dyn Clock>,
}

impl MediaUploader {
    /// Create an uploader.
    ///
    /// # Errors
    ///
    /// [`UploadError::Config`] if the cloud name or upload preset is blank.
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        config: MediaHostConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            http_client,
            config,
            clock,
        })
    }

    pub fn config(&self) -> &MediaHostConfig {
        &self.config
    }

    /// Upload `file` as the avatar of `owner`.
    ///
    /// Uploading twice for the same owner replaces the stored image; the
    /// returned base URL stays the same and only the cache buster changes.
    /// Concurrent uploads for one owner race, and the last write wins.
    ///
    /// # Errors
    ///
    /// - [`UploadError::EmptyFile`] or [`UploadError::InvalidFile`] before any
    ///   network I/O
    /// - [`UploadError::Network`] when no response arrives (including timeouts)
    /// - [`UploadError::HttpStatus`] for non-2xx answers
    /// - [`UploadError::MalformedResponse`] when `secure_url` is missing or empty
    pub async fn upload(&self, file: UploadFile, owner: &OwnerId) -> Result<AvatarUrl> {
        file.validate()?;

        let public_id = owner.public_id();
        let span = info_span!("avatar_upload", public_id = %public_id);

        async move {
            let cache_buster = self.clock.unix_timestamp_millis();
            debug!(
                bytes = file.len(),
                file_name = strip_path(&file.file_name),
                mime_type = ?file.mime_type,
                "Uploading avatar"
            );

            let request = self.build_request(file, public_id);
            let response = self.http_client.execute(request).await.map_err(|e| {
                warn!(error = %e, "Avatar upload failed before a response arrived");
                UploadError::from(e)
            })?;

            let base_url = Self::parse_response(&response)?;
            info!(url = %base_url, "Avatar uploaded");

            Ok(AvatarUrl::new(base_url, cache_buster))
        }
        .instrument(span)
        .await
    }

    fn build_request(&self, file: UploadFile, public_id: String) -> HttpRequest {
        let form = MultipartForm::new()
            .file("file", file.bytes, file.file_name, file.mime_type)
            .text("upload_preset", self.config.upload_preset.clone())
            .text("public_id", public_id)
            .text("overwrite", "true");

        HttpRequest::new(HttpMethod::Post, self.config.upload_url())
            .multipart(form)
            .timeout(self.config.upload_timeout)
    }

    fn parse_response(response: &HttpResponse) -> Result<String> {
        if !response.is_success() {
            let message = serde_json::from_slice::<ErrorResponse>(&response.body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| "no error details".to_string());
            warn!(status = response.status, message = %message, "Media host rejected upload");
            return Err(UploadError::HttpStatus {
                status: response.status,
                message,
            });
        }

        let parsed: UploadResponse = serde_json::from_slice(&response.body).map_err(|e| {
            warn!(error = %e, "Upload response is not valid JSON");
            UploadError::MalformedResponse(format!("invalid JSON: {}", e))
        })?;

        debug!(
            public_id = ?parsed.public_id,
            version = ?parsed.version,
            "Media host accepted upload"
        );

        match parsed.secure_url {
            Some(url) if !url.trim().is_empty() => Ok(url),
            _ => {
                warn!("Upload response has no secure_url");
                Err(UploadError::MalformedResponse(
                    "response has no secure_url".to_string(),
                ))
            }
        }
    }
}
