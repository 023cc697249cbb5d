//! # Media Module
//!
//! Uploads profile images to the configured media host (Cloudinary) and hands
//! back a cache-busted URL to store on the user's profile.
//!
//! ## Overview
//!
//! - [`MediaUploader`]: one multipart `POST` per call, no retry
//! - [`OwnerId`]: whose avatar is being replaced (`public_id = avatar_{id}`)
//! - [`AvatarUrl`]: `secure_url` plus a `?t=<millis>` cache buster
//! - [`UploadError`]: network, HTTP status and malformed-response failures
//!
//! ```no_run
//! use core_media::{MediaUploader, OwnerId, UploadFile};
//! use core_runtime::config::MediaHostConfig;
//! use bridge_traits::{HttpClient, SystemClock};
//! use std::sync::Arc;
//!
//! # async fn example(http: Arc<dyn HttpClient>) -> core_media::Result<()> {
//! let uploader = MediaUploader::new(
//!     http,
//!     MediaHostConfig::new("linkup", "avatars"),
//!     Arc::new(SystemClock),
//! )?;
//!
//! let url = uploader
//!     .upload(UploadFile::new(std::fs::read("me.png").unwrap()), &OwnerId::new("42")?)
//!     .await?;
//! println!("{url}");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod types;
pub mod uploader;

pub use error::{Result, UploadError};
pub use types::{AvatarUrl, OwnerId, UploadFile, AVATAR_PUBLIC_ID_PREFIX, DEFAULT_FILE_NAME};
pub use uploader::MediaUploader;
