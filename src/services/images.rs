// ABOUTME: Base64 image decoding, format sniffing, and media file storage
// ABOUTME: Rejects empty, undecodable, or unrecognized images as field validation errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram

//! Image boundary
//!
//! Clients send images as `data:image/<fmt>;base64,<payload>` or bare base64.
//! The format comes from magic bytes; a `jpeg`/`jpg` data-URI header is trusted
//! only when sniffing finds nothing.

use std::path::{Component, Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::MediaConfig;
use crate::errors::{AppError, AppResult};

/// Recognized image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG
    Png,
    /// JPEG
    Jpeg,
    /// GIF87a / GIF89a
    Gif,
    /// RIFF WEBP
    Webp,
    /// Windows bitmap
    Bmp,
}

impl ImageFormat {
    /// File extension for stored files
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Webp => "webp",
            Self::Bmp => "bmp",
        }
    }

    /// Identify a format from leading bytes
    #[must_use]
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n', ..] => Some(Self::Png),
            [0xff, 0xd8, 0xff, ..] => Some(Self::Jpeg),
            [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some(Self::Gif),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(Self::Webp),
            [b'B', b'M', ..] => Some(Self::Bmp),
            _ => None,
        }
    }
}

/// Decoded image ready to be stored
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Raw file bytes
    pub bytes: Vec<u8>,
    /// Detected format
    pub format: ImageFormat,
}

/// Decode a base64 image payload
///
/// # Errors
///
/// Returns a field `ValidationError` on `field` for empty, non-base64, or
/// unrecognized data
pub fn decode_image(field: &str, data: &str) -> AppResult<DecodedImage> {
    let data = data.trim();
    if data.is_empty() {
        return Err(AppError::field(field, "Image is required."));
    }

    let (header, payload) = match data.split_once("base64,") {
        Some((header, payload)) => (Some(header), payload),
        None => (None, data),
    };

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|_| AppError::field(field, "Image data is not valid base64."))?;
    if bytes.is_empty() {
        return Err(AppError::field(field, "Image is required."));
    }

    let format = ImageFormat::sniff(&bytes)
        .or_else(|| {
            header
                .filter(|h| h.contains("jpeg") || h.contains("jpg"))
                .map(|_| ImageFormat::Jpeg)
        })
        .ok_or_else(|| AppError::field(field, "Unable to determine the image format."))?;

    Ok(DecodedImage { bytes, format })
}

/// Writes decoded images under the media root and maps them to public URLs
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    url_prefix: String,
}

impl MediaStore {
    /// Create a store rooted at `root`, publishing files under `url_prefix`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.into(),
        }
    }

    /// Create a store from configuration
    #[must_use]
    pub fn from_config(config: &MediaConfig) -> Self {
        Self::new(config.root.clone(), config.url.clone())
    }

    /// Directory files are written under
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// URL prefix files are served from
    #[must_use]
    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Write an image under `kind/` with a random name and return its URL
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the directory or file cannot be written
    pub async fn save(&self, kind: &str, image: &DecodedImage) -> AppResult<String> {
        let relative = format!("{kind}/{}.{}", Uuid::new_v4(), image.format.extension());
        let path = self.root.join(&relative);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::storage(format!("Failed to create media directory: {e}")))?;
        }
        tokio::fs::write(&path, &image.bytes)
            .await
            .map_err(|e| AppError::storage(format!("Failed to write image: {e}")))?;

        debug!(path = %path.display(), bytes = image.bytes.len(), "Stored image");
        Ok(format!("{}{relative}", self.url_prefix))
    }

    /// Delete the file behind a URL produced by [`Self::save`]
    ///
    /// Failures are logged and otherwise ignored.
    pub async fn remove(&self, url: &str) {
        let Some(path) = self.path_for(url) else {
            warn!(url, "Refusing to remove media outside the media root");
            return;
        };
        if let Err(e) = tokio::fs::remove_file(&path).await {
            warn!(path = %path.display(), error = %e, "Failed to remove media file");
        }
    }

    /// Filesystem path for a media URL, if it lies under this store
    #[must_use]
    pub fn path_for(&self, url: &str) -> Option<PathBuf> {
        let relative = Path::new(url.strip_prefix(&self.url_prefix)?);
        relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
            .then(|| self.root.join(relative))
    }
}
