use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use photoboard_core::area::AreaId;
use photoboard_core::config::BoardConfig;
use photoboard_core::role::Role;

mod commands;

#[derive(Parser)]
#[command(name = "photoboard")]
#[command(about = "PhotoBoard CLI - area-based photo/video board", long_about = None)]
struct Cli {
    /// Act as this role
    #[arg(long, value_enum, global = true, default_value = "user")]
    role: RoleArg,

    /// Override the data directory from config.toml
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Admin,
    User,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Admin => Role::Admin,
            RoleArg::User => Role::User,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show the board and its sync state
    Show,
    /// Replace the board with COUNT fresh areas (admin)
    Create { count: usize },
    /// Rename an area (admin)
    Rename { id: AreaId, name: String },
    /// Attach an image or video file to an area
    Attach { id: AreaId, file: PathBuf },
    /// Remove the media of an area
    Clear { id: AreaId },
    /// Delete the board everywhere (admin)
    Reset,
    /// Write every attached media file into a dated zip archive
    Export {
        /// Directory for the archive (defaults to <data-dir>/exports)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Run two synced boards against an in-process hub and print what each sees
    SyncDemo {
        #[arg(long, default_value_t = 3)]
        areas: usize,
    },
}

fn init_tracing(config: &BoardConfig) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = photoboard_infrastructure::config_service::load_config()?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = Some(data_dir);
    }
    init_tracing(&config);
    let role = Role::from(cli.role);

    match cli.command {
        Commands::Show => commands::board::show(&config, role).await?,
        Commands::Create { count } => commands::board::create(&config, role, count).await?,
        Commands::Rename { id, name } => commands::board::rename(&config, role, id, &name).await?,
        Commands::Attach { id, file } => commands::board::attach(&config, id, &file).await?,
        Commands::Clear { id } => commands::board::clear(&config, id).await?,
        Commands::Reset => commands::board::reset(&config, role).await?,
        Commands::Export { out } => commands::export::run(&config, out).await?,
        Commands::SyncDemo { areas } => commands::sync_demo::run(&config, areas).await?,
    }

    Ok(())
}
