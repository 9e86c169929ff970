//! Shared application state handed to the boundary operations.

use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;

use crate::assets::AssetCache;
use crate::db::SqliteRepository;
use crate::importer::{CatalogImporter, ProgressEvent, ProgressSink};

/// Capacity of the progress broadcast channel. Slow subscribers lose old
/// events rather than stalling an import.
const PROGRESS_CAPACITY: usize = 256;

pub struct AppState {
    pub repository: Arc<Mutex<SqliteRepository>>,
    pub assets: Arc<AssetCache>,
    pub importer: Arc<CatalogImporter>,
    progress: broadcast::Sender<ProgressEvent>,
}

impl AppState {
    pub fn new(repository: SqliteRepository, assets: AssetCache) -> Self {
        Self::with_importer(repository, assets, CatalogImporter::default())
    }

    pub fn with_importer(
        repository: SqliteRepository,
        assets: AssetCache,
        importer: CatalogImporter,
    ) -> Self {
        let (progress, _) = broadcast::channel(PROGRESS_CAPACITY);
        Self {
            repository: Arc::new(Mutex::new(repository)),
            assets: Arc::new(assets),
            importer: Arc::new(importer),
            progress,
        }
    }

    /// Subscribe to import progress events.
    pub fn subscribe_progress(&self) -> broadcast::Receiver<ProgressEvent> {
        self.progress.subscribe()
    }

    pub(crate) fn progress_sink(&self) -> ProgressSink {
        ProgressSink::new(self.progress.clone())
    }
}
