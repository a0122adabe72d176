//! Zip archive sink for exports.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use photoboard_core::error::{BoardError, Result};
use photoboard_core::export::{ArchiveSink, archive_name};

pub struct ZipArchiveSink {
    writer: Option<ZipWriter<File>>,
    path: PathBuf,
}

impl ZipArchiveSink {
    /// Creates `dir/PhotoBoard_{date}.zip`.
    pub fn create(dir: &Path, date: NaiveDate) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(archive_name(&date.format("%Y-%m-%d").to_string()));
        let file = File::create(&path)?;
        Ok(Self {
            writer: Some(ZipWriter::new(file)),
            path,
        })
    }

    /// Same as [`create`](Self::create) with today's local date.
    pub fn for_today(dir: &Path) -> Result<Self> {
        Self::create(dir, chrono::Local::now().date_naive())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn writer(&mut self) -> Result<&mut ZipWriter<File>> {
        self.writer
            .as_mut()
            .ok_or_else(|| BoardError::internal("archive already finished"))
    }
}

fn zip_error(err: zip::result::ZipError) -> BoardError {
    BoardError::io(format!("zip: {}", err))
}

impl ArchiveSink for ZipArchiveSink {
    fn add_file(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let writer = self.writer()?;
        writer.start_file(name, options).map_err(zip_error)?;
        writer.write_all(bytes)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<String> {
        let writer = self
            .writer
            .take()
            .ok_or_else(|| BoardError::internal("archive already finished"))?;
        writer.finish().map_err(zip_error)?;
        tracing::info!("[Export] Wrote {}", self.path.display());
        Ok(self.path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn test_archive_name_and_contents() {
        let temp_dir = TempDir::new().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mut sink = ZipArchiveSink::create(temp_dir.path(), date).unwrap();

        sink.add_file("Area_1.png", &[1, 2, 3]).unwrap();
        let written = sink.finish().unwrap();
        assert!(written.ends_with("PhotoBoard_2024-03-01.zip"));
        assert!(sink.finish().is_err());

        let file = File::open(temp_dir.path().join("PhotoBoard_2024-03-01.zip")).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        let mut entry = archive.by_name("Area_1.png").unwrap();
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
    }
}
