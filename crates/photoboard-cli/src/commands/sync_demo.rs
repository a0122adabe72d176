//! Two devices sharing one in-process hub.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::broadcast;

use photoboard_application::{BoardDependencies, BoardService};
use photoboard_core::area::AreaCollection;
use photoboard_core::config::{BoardConfig, SyncMode};
use photoboard_core::media::MediaBlob;
use photoboard_core::reconcile::MutationPlan;
use photoboard_core::role::Role;
use photoboard_core::sync::SyncState;
use photoboard_infrastructure::{BoardPaths, MemoryMediaHost, RemoteHub, TieredBoardRepository};

use super::board::print_board;

const WAIT: Duration = Duration::from_secs(5);

async fn start_device(
    dir: &Path,
    hub: &Arc<RemoteHub>,
    host: &Arc<MemoryMediaHost>,
) -> Result<BoardService> {
    let paths = BoardPaths::with_data_dir(dir.to_path_buf());
    let repository = Arc::new(TieredBoardRepository::from_paths(&paths, &BoardConfig::default())?);
    let board = BoardService::start(BoardDependencies {
        mode: SyncMode::Synced,
        repository,
        uploader: host.clone(),
        channel: Some(hub.clone()),
        deleter: Some(host.clone()),
    })
    .await?;

    let mut status = board.watch_status();
    tokio::time::timeout(WAIT, status.wait_for(|s| *s == SyncState::Live))
        .await
        .context("device did not go live")??;
    Ok(board)
}

async fn wait_until<F>(board: &BoardService, predicate: F) -> Result<()>
where
    F: Fn(&AreaCollection) -> bool,
{
    let mut collection = board.watch_collection();
    tokio::time::timeout(WAIT, collection.wait_for(|c| predicate(c)))
        .await
        .context("devices did not converge")??;
    Ok(())
}

fn describe(plan: &MutationPlan) -> String {
    match plan {
        MutationPlan::ClearToEmpty { version } => format!("clear (v{})", version),
        MutationPlan::FullRebuild { collection, .. } => {
            format!("rebuild {} area(s) (v{})", collection.len(), collection.version())
        }
        MutationPlan::Patch { directives, version } => {
            format!("patch {} area(s) (v{})", directives.len(), version)
        }
        MutationPlan::Stale { incoming, applied } => {
            format!("stale v{} ignored (applied v{})", incoming, applied)
        }
    }
}

fn drain(plans: &mut broadcast::Receiver<MutationPlan>) {
    while let Ok(plan) = plans.try_recv() {
        println!("    ↳ {}", describe(&plan));
    }
}

pub async fn run(config: &BoardConfig, areas: usize) -> Result<()> {
    let paths = BoardPaths::from_config(config)?;
    let demo_dir = paths.data_dir().join("sync-demo");
    let hub = Arc::new(RemoteHub::new());
    let host = Arc::new(MemoryMediaHost::new());

    println!("🔌 Starting two devices on a shared hub...");
    let admin = start_device(&demo_dir.join("admin"), &hub, &host).await?;
    let viewer = start_device(&demo_dir.join("viewer"), &hub, &host).await?;
    let mut viewer_plans = viewer.subscribe_plans();

    admin.create_areas(Role::Admin, areas).await?;
    admin.rename_area(Role::Admin, 1, "Stage").await?;
    wait_until(&viewer, |c| {
        c.len() == areas && c.get(1).is_some_and(|a| a.name == "Stage")
    })
    .await?;
    println!("\n👀 Viewer after the admin created and renamed:");
    drain(&mut viewer_plans);

    let blob = MediaBlob::new(vec![0x89, 0x50, 0x4e, 0x47], "image/png").with_file_name("demo.png");
    viewer.attach_media(areas as u32, blob).await?;
    wait_until(&admin, |c| c.get(areas as u32).is_some_and(|a| a.has_media())).await?;

    println!("\n🖥️  Admin board:");
    print_board(&admin.snapshot(), admin.status(), Role::Admin);
    println!("\n📱 Viewer board:");
    print_board(&viewer.snapshot(), viewer.status(), Role::User);
    drain(&mut viewer_plans);

    admin.reset(Role::Admin).await?;
    admin.flush().await?;
    wait_until(&viewer, |c| c.is_empty()).await?;
    println!("\n🗑️  Reset by admin, viewer now shows:");
    drain(&mut viewer_plans);
    print_board(&viewer.snapshot(), viewer.status(), Role::User);

    admin.shutdown().await;
    viewer.shutdown().await;
    std::fs::remove_dir_all(&demo_dir)
        .with_context(|| format!("Failed to remove {}", demo_dir.display()))?;
    println!("\n✅ Demo finished ({} hosted asset(s) left)", host.asset_count());
    Ok(())
}
