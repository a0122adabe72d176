use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};

use photoboard_application::{BoardDependencies, BoardService};
use photoboard_core::area::{AreaCollection, AreaId, grid_columns_for};
use photoboard_core::config::{BoardConfig, SyncMode};
use photoboard_core::media::MediaBlob;
use photoboard_core::role::{Role, status_message};
use photoboard_core::sync::SyncState;
use photoboard_infrastructure::{BoardPaths, InlineMediaUploader, TieredBoardRepository};

/// Starts a local-only board over the configured data directory.
pub async fn open_local(config: &BoardConfig) -> Result<(BoardService, BoardPaths)> {
    if config.mode == SyncMode::Synced {
        bail!(
            "config.toml selects synced mode, but this CLI only edits the local board. \
             Try `photoboard sync-demo` to see synced boards in action."
        );
    }

    let paths = BoardPaths::from_config(config)?;
    let repository = Arc::new(TieredBoardRepository::from_paths(&paths, config)?);
    let board = BoardService::start(BoardDependencies {
        mode: SyncMode::Local,
        repository,
        uploader: Arc::new(InlineMediaUploader),
        channel: None,
        deleter: None,
    })
    .await
    .context("Failed to open the board")?;
    Ok((board, paths))
}

async fn close(board: BoardService) -> Result<()> {
    board.flush().await?;
    board.shutdown().await;
    Ok(())
}

pub fn print_board(collection: &AreaCollection, status: SyncState, role: Role) {
    println!("📋 {} area(s), {} column(s), {}", collection.len(), grid_columns_for(collection.len()), status);
    for area in collection {
        let media = match &area.media {
            Some(media) => format!("🖼️  {}", media.kind.as_str()),
            None => "(empty)".to_string(),
        };
        println!("  [{}] {:<20} {}", area.id, area.name, media);
    }
    println!("💡 {}", status_message(role, collection.len()));
}

pub async fn show(config: &BoardConfig, role: Role) -> Result<()> {
    let (board, _) = open_local(config).await?;
    print_board(&board.snapshot(), board.status(), role);
    close(board).await
}

pub async fn create(config: &BoardConfig, role: Role, count: usize) -> Result<()> {
    let (board, _) = open_local(config).await?;
    let collection = board.create_areas(role, count).await?;
    println!("✅ Created {} area(s)", collection.len());
    close(board).await
}

pub async fn rename(config: &BoardConfig, role: Role, id: AreaId, name: &str) -> Result<()> {
    let (board, _) = open_local(config).await?;
    let stored = board.rename_area(role, id, name).await?;
    println!("✅ Area {} is now \"{}\"", id, stored);
    close(board).await
}

pub async fn attach(config: &BoardConfig, id: AreaId, file: &Path) -> Result<()> {
    let bytes = std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let mut blob = MediaBlob::new(bytes, content_type_for(file));
    if let Some(name) = file.file_name() {
        blob = blob.with_file_name(name.to_string_lossy());
    }

    let (board, _) = open_local(config).await?;
    let media = board.attach_media(id, blob).await?;
    println!("✅ Attached {} to area {}", media.kind.as_str(), id);
    close(board).await
}

pub async fn clear(config: &BoardConfig, id: AreaId) -> Result<()> {
    let (board, _) = open_local(config).await?;
    board.clear_media(id).await?;
    println!("🧹 Cleared area {}", id);
    close(board).await
}

pub async fn reset(config: &BoardConfig, role: Role) -> Result<()> {
    let (board, _) = open_local(config).await?;
    board.reset(role).await?;
    println!("🗑️  Board reset");
    close(board).await
}

/// Content type from the file extension. Unknown extensions are rejected
/// by the uploader.
fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "ogv" => "video/ogg",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        _ => "application/octet-stream",
    }
}
