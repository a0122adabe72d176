//! Inline `data:` URL media for local-only boards.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;

use photoboard_core::area::{AreaId, Media, MediaLocator};
use photoboard_core::error::{BoardError, Result};
use photoboard_core::export::{FetchedMedia, MediaFetcher};
use photoboard_core::media::{MediaBlob, MediaUploader};

/// `data:{content_type};base64,{payload}`
pub fn encode_data_url(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", content_type, BASE64_STANDARD.encode(bytes))
}

/// Splits a base64 data URL back into content type and bytes.
pub fn decode_data_url(data_url: &str) -> Result<FetchedMedia> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| BoardError::io("not a data URL"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| BoardError::io("data URL has no payload"))?;
    let content_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| BoardError::io("only base64 data URLs are supported"))?;
    let bytes = BASE64_STANDARD
        .decode(payload)
        .map_err(|e| BoardError::io(format!("invalid base64 payload: {}", e)))?;
    Ok(FetchedMedia {
        bytes,
        content_type: content_type.to_string(),
    })
}

/// Stores uploads inside the board document itself.
#[derive(Debug, Default, Clone)]
pub struct InlineMediaUploader;

#[async_trait]
impl MediaUploader for InlineMediaUploader {
    async fn upload(&self, area: AreaId, blob: MediaBlob) -> Result<Media> {
        let kind = blob.kind()?;
        tracing::debug!(
            "[InlineMedia] Encoding {} bytes of {} for area {}",
            blob.bytes.len(),
            blob.content_type,
            area
        );
        Ok(Media::inline(encode_data_url(&blob.content_type, &blob.bytes), kind))
    }
}

/// Reads inline locators. Hosted locators are rejected.
#[derive(Debug, Default, Clone)]
pub struct InlineMediaFetcher;

#[async_trait]
impl MediaFetcher for InlineMediaFetcher {
    async fn fetch(&self, locator: &MediaLocator) -> Result<FetchedMedia> {
        match locator {
            MediaLocator::Inline { data_url } => decode_data_url(data_url),
            MediaLocator::Remote { url, .. } => Err(BoardError::io(format!(
                "cannot fetch hosted media '{}' without a media host",
                url
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use photoboard_core::area::MediaKind;

    #[tokio::test]
    async fn test_upload_then_fetch() {
        let blob = MediaBlob::new(vec![0xde, 0xad, 0xbe, 0xef], "video/mp4");
        let media = InlineMediaUploader.upload(1, blob).await.unwrap();
        assert_eq!(media.kind, MediaKind::Video);
        assert!(media.locator.href().starts_with("data:video/mp4;base64,"));

        let fetched = InlineMediaFetcher.fetch(&media.locator).await.unwrap();
        assert_eq!(fetched.bytes, vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(fetched.content_type, "video/mp4");
    }

    #[tokio::test]
    async fn test_upload_rejects_non_media() {
        let blob = MediaBlob::new(b"%PDF".to_vec(), "application/pdf");
        let err = InlineMediaUploader.upload(1, blob).await.unwrap_err();
        assert!(matches!(err, BoardError::UploadFailed(_)));
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(decode_data_url("https://x").is_err());
        assert!(decode_data_url("data:image/png,raw").is_err());
        assert!(decode_data_url("data:image/png;base64,@@@").is_err());
    }
}
