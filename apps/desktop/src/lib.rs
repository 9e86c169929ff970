//! Application core of the card catalog and collection manager.
//!
//! Everything the presentation layer needs goes through [`commands`]; the
//! remaining modules are the import pipeline, the local store, the asset
//! cache and the gallery query engine.

pub mod assets;
pub mod commands;
pub mod db;
pub mod importer;
pub mod query;
pub mod state;

#[cfg(test)]
pub(crate) mod testutil;

use std::path::PathBuf;

pub use state::AppState;

const APP_DIR: &str = "cardvault";
const DB_FILE: &str = "cardvault.sqlite3";

/// Platform data directory for the application.
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Open the store and asset cache under the default data directory,
/// creating both on first run.
pub fn init() -> anyhow::Result<AppState> {
    init_at(default_data_dir())
}

pub fn init_at(data_dir: PathBuf) -> anyhow::Result<AppState> {
    std::fs::create_dir_all(&data_dir)?;
    let repository = db::SqliteRepository::open(data_dir.join(DB_FILE))?;
    let assets = assets::AssetCache::new(&data_dir);
    tracing::info!("store opened at {}", data_dir.display());
    Ok(AppState::new(repository, assets))
}
