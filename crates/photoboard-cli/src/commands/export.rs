use std::path::PathBuf;

use anyhow::Result;

use photoboard_core::config::BoardConfig;
use photoboard_core::export::export_collection;
use photoboard_infrastructure::{InlineMediaFetcher, ZipArchiveSink};

use super::board::open_local;

pub async fn run(config: &BoardConfig, out: Option<PathBuf>) -> Result<()> {
    let (board, paths) = open_local(config).await?;
    let collection = board.snapshot();
    board.shutdown().await;

    if collection.with_media().next().is_none() {
        println!("📭 Nothing to export: no area has media yet");
        return Ok(());
    }

    let dir = out.unwrap_or_else(|| paths.export_dir());
    println!("📦 Exporting to {}...", dir.display());
    let mut sink = ZipArchiveSink::for_today(&dir)?;
    let report = export_collection(&collection, &InlineMediaFetcher, &mut sink).await?;

    for failure in &report.failures {
        println!("  ⚠️  Area {}: {}", failure.area_id, failure.reason);
    }
    match &report.archive {
        Some(archive) => {
            for name in &report.written {
                println!("  ✓ {}", name);
            }
            println!("✅ Exported {} file(s) to {}", report.written.len(), archive);
        }
        None => {
            // The archive was never finalized; do not leave a broken zip behind
            let _ = std::fs::remove_file(sink.path());
            anyhow::bail!("No media could be exported");
        }
    }

    Ok(())
}
