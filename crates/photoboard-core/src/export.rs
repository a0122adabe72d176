//! Bundling every attached media item into one archive.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::area::{AreaCollection, AreaId, MediaLocator};
use crate::error::Result;

/// Bytes fetched for one locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedMedia {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Reads the bytes behind a locator.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    async fn fetch(&self, locator: &MediaLocator) -> Result<FetchedMedia>;
}

/// Destination of exported files.
pub trait ArchiveSink: Send {
    fn add_file(&mut self, name: &str, bytes: &[u8]) -> Result<()>;

    /// Finalizes the archive and returns where it was written.
    fn finish(&mut self) -> Result<String>;
}

/// One area whose media could not be exported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFailure {
    pub area_id: AreaId,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub written: Vec<String>,
    pub failures: Vec<ExportFailure>,
    pub archive: Option<String>,
}

impl ExportReport {
    pub fn is_empty(&self) -> bool {
        self.written.is_empty() && self.failures.is_empty()
    }
}

/// File extension for a media content type: the MIME subtype, except
/// `quicktime` and `x-matroska`. A type without a subtype becomes `png`.
pub fn extension_for_content_type(content_type: &str) -> &str {
    let subtype = content_type
        .split_once('/')
        .map(|(_, subtype)| subtype.split(';').next().unwrap_or("").trim())
        .unwrap_or("");

    match subtype {
        "" => "png",
        "quicktime" => "mov",
        "x-matroska" => "mkv",
        other => other,
    }
}

/// `{stem}.{ext}`, then `{stem}_{id}.{ext}`, then `{stem}_{id}_{n}.{ext}`
/// until one is not taken.
fn unique_file_name(
    used_names: &mut HashSet<String>,
    stem: &str,
    area_id: AreaId,
    extension: &str,
) -> String {
    let mut candidate = format!("{}.{}", stem, extension);
    let mut attempt = 0u32;
    while used_names.contains(&candidate) {
        attempt += 1;
        candidate = if attempt == 1 {
            format!("{}_{}.{}", stem, area_id, extension)
        } else {
            format!("{}_{}_{}.{}", stem, area_id, attempt, extension)
        };
    }
    used_names.insert(candidate.clone());
    candidate
}

/// Replaces every non-alphanumeric character with `_`.
pub fn safe_file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// `PhotoBoard_{date}.zip`, `date` formatted as `YYYY-MM-DD`.
pub fn archive_name(date: &str) -> String {
    format!("PhotoBoard_{}.zip", date)
}

/// Writes one file per area that has media.
///
/// A failed fetch or a rejected file is recorded in the report and the
/// export continues with the next area. The sink is only finalized when at least one file was
/// written.
pub async fn export_collection(
    collection: &AreaCollection,
    fetcher: &dyn MediaFetcher,
    sink: &mut dyn ArchiveSink,
) -> Result<ExportReport> {
    let mut report = ExportReport::default();
    let mut used_names = HashSet::new();

    for area in collection.with_media() {
        let Some(media) = &area.media else {
            continue;
        };

        let fetched = match fetcher.fetch(&media.locator).await {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::warn!("[Export] Skipping area {}: {}", area.id, e);
                report.failures.push(ExportFailure {
                    area_id: area.id,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let stem = safe_file_stem(&area.name);
        let extension = extension_for_content_type(&fetched.content_type);
        let file_name = unique_file_name(&mut used_names, &stem, area.id, extension);

        if let Err(e) = sink.add_file(&file_name, &fetched.bytes) {
            tracing::warn!("[Export] Could not add '{}': {}", file_name, e);
            report.failures.push(ExportFailure {
                area_id: area.id,
                reason: e.to_string(),
            });
            continue;
        }
        report.written.push(file_name);
    }

    if !report.written.is_empty() {
        report.archive = Some(sink.finish()?);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::{Media, MediaKind};
    use crate::error::BoardError;

    struct MockFetcher;

    #[async_trait]
    impl MediaFetcher for MockFetcher {
        async fn fetch(&self, locator: &MediaLocator) -> Result<FetchedMedia> {
            match locator {
                MediaLocator::Inline { .. } => Ok(FetchedMedia {
                    bytes: vec![1, 2, 3],
                    content_type: locator.inline_content_type().unwrap_or("").to_string(),
                }),
                MediaLocator::Remote { .. } => Err(BoardError::io("host unreachable")),
            }
        }
    }

    /// Rejects duplicate names like a zip writer does.
    #[derive(Default)]
    struct MemorySink {
        files: Vec<(String, Vec<u8>)>,
        reject: Option<String>,
        finished: bool,
    }

    impl ArchiveSink for MemorySink {
        fn add_file(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
            if self.files.iter().any(|(existing, _)| existing == name) {
                return Err(BoardError::io(format!("duplicate file name: {}", name)));
            }
            if self.reject.as_deref() == Some(name) {
                return Err(BoardError::io("disk full"));
            }
            self.files.push((name.to_string(), bytes.to_vec()));
            Ok(())
        }

        fn finish(&mut self) -> Result<String> {
            self.finished = true;
            Ok("memory.zip".to_string())
        }
    }

    #[test]
    fn test_extension_for_content_type() {
        assert_eq!(extension_for_content_type("video/quicktime"), "mov");
        assert_eq!(extension_for_content_type("video/x-matroska"), "mkv");
        assert_eq!(extension_for_content_type("image/jpeg"), "jpeg");
        assert_eq!(extension_for_content_type("video/ogg"), "ogg");
        assert_eq!(extension_for_content_type("image/png"), "png");
        assert_eq!(extension_for_content_type("application/octet-stream"), "octet-stream");
        assert_eq!(extension_for_content_type("image/svg+xml; charset=utf-8"), "svg+xml");
        assert_eq!(extension_for_content_type(""), "png");
        assert_eq!(extension_for_content_type("image"), "png");
        assert_eq!(extension_for_content_type("image/"), "png");
    }

    #[test]
    fn test_extension_for_unlisted_types() {
        assert_eq!(extension_for_content_type("image/avif"), "avif");
        assert_eq!(extension_for_content_type("video/x-msvideo"), "x-msvideo");
    }

    #[test]
    fn test_safe_file_stem() {
        assert_eq!(safe_file_stem("Front door / 2"), "Front_door___2");
        assert_eq!(archive_name("2024-03-01"), "PhotoBoard_2024-03-01.zip");
    }

    #[tokio::test]
    async fn test_export_skips_failures_and_dedupes_names() {
        let mut collection = AreaCollection::create(3).unwrap();
        for id in [1, 2] {
            let area = collection.get_mut(id).unwrap();
            area.name = "Same".to_string();
            area.media = Some(Media::inline(
                "data:video/quicktime;base64,AAAA",
                MediaKind::Video,
            ));
        }
        collection.get_mut(3).unwrap().media = Some(Media::remote(
            "https://cdn.example/x.png",
            "x",
            MediaKind::Image,
        ));

        let mut sink = MemorySink::default();
        let report = export_collection(&collection, &MockFetcher, &mut sink)
            .await
            .unwrap();

        assert_eq!(report.written, vec!["Same.mov", "Same_2.mov"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].area_id, 3);
        assert_eq!(report.archive.as_deref(), Some("memory.zip"));
        assert!(sink.finished);
    }

    #[tokio::test]
    async fn test_export_fallback_name_avoids_existing_names() {
        let mut collection = AreaCollection::create(3).unwrap();
        for (id, name) in [(1, "X"), (2, "X_3"), (3, "X")] {
            let area = collection.get_mut(id).unwrap();
            area.name = name.to_string();
            area.media = Some(Media::inline("data:image/png;base64,AAAA", MediaKind::Image));
        }

        let mut sink = MemorySink::default();
        let report = export_collection(&collection, &MockFetcher, &mut sink)
            .await
            .unwrap();

        assert!(report.failures.is_empty());
        assert_eq!(report.written, vec!["X.png", "X_3.png", "X_3_2.png"]);
        assert_eq!(sink.files.len(), 3);
    }

    #[tokio::test]
    async fn test_export_records_rejected_file_and_continues() {
        let mut collection = AreaCollection::create(2).unwrap();
        for id in [1, 2] {
            collection.get_mut(id).unwrap().media =
                Some(Media::inline("data:image/webp;base64,AAAA", MediaKind::Image));
        }

        let mut sink = MemorySink {
            reject: Some("Area_1.webp".to_string()),
            ..MemorySink::default()
        };
        let report = export_collection(&collection, &MockFetcher, &mut sink)
            .await
            .unwrap();

        assert_eq!(report.written, vec!["Area_2.webp"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].area_id, 1);
        assert!(report.failures[0].reason.contains("disk full"));
        assert!(sink.finished);
    }

    #[tokio::test]
    async fn test_export_without_media_does_not_finish() {
        let collection = AreaCollection::create(2).unwrap();
        let mut sink = MemorySink::default();
        let report = export_collection(&collection, &MockFetcher, &mut sink)
            .await
            .unwrap();
        assert!(report.is_empty());
        assert!(!sink.finished);
    }
}
