//! Media upload and deletion ports.

use async_trait::async_trait;

use crate::area::{AreaId, Media, MediaKind};
use crate::error::{BoardError, Result};

/// Raw bytes picked by the user for an area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaBlob {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub file_name: Option<String>,
}

impl MediaBlob {
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Kind of media, or `UploadFailed` for anything that is neither an
    /// image nor a video.
    pub fn kind(&self) -> Result<MediaKind> {
        validate_content_type(&self.content_type)
    }
}

/// Accepts `image/*` and `video/*` only.
pub fn validate_content_type(content_type: &str) -> Result<MediaKind> {
    if content_type.starts_with("image/") || content_type.starts_with("video/") {
        Ok(MediaKind::from_content_type(content_type))
    } else {
        Err(BoardError::upload_failed(format!(
            "unsupported content type '{}', expected image/* or video/*",
            content_type
        )))
    }
}

/// Turns a blob into a locator the board can store.
#[async_trait]
pub trait MediaUploader: Send + Sync {
    async fn upload(&self, area: AreaId, blob: MediaBlob) -> Result<Media>;
}

/// Removes a provider-hosted asset.
#[async_trait]
pub trait MediaDeleter: Send + Sync {
    async fn delete(&self, provider_id: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_content_type() {
        assert_eq!(validate_content_type("image/jpeg").unwrap(), MediaKind::Image);
        assert_eq!(validate_content_type("video/mp4").unwrap(), MediaKind::Video);
        assert!(matches!(
            validate_content_type("application/pdf"),
            Err(BoardError::UploadFailed(_))
        ));
    }
}
