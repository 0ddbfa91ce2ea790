pub mod cli;
pub mod core;
pub mod providers;
pub mod server;
pub mod store;
pub mod sync;

use crate::core::SnapshotStore;
use crate::core::config::AppConfig;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Sync,
    Show,
    Seed,
    Serve,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let data_dir = config.data_dir()?;
    info!("Using data directory {}", data_dir.display());
    let store: Arc<dyn SnapshotStore> =
        Arc::new(store::DiskStore::new(data_dir, config.files.clone()));
    let fetcher = Arc::new(providers::BonbastProvider::new(&config.provider.base_url)?);
    let snapshot_sync = sync::SnapshotSync::new(fetcher, store, config.tz()?);

    match command {
        AppCommand::Sync => cli::sync::run(&snapshot_sync).await,
        AppCommand::Show => cli::show::run(snapshot_sync.store().as_ref()),
        AppCommand::Seed => cli::sync::seed(&snapshot_sync),
        AppCommand::Serve => {
            let state = Arc::new(server::AppState::new(snapshot_sync));
            server::serve(state, &config.server.bind).await
        }
    }
}
