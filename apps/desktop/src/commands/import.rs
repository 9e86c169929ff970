//! Catalog synchronization commands.
//!
//! Syncs are blocking end to end, so they run on a dedicated thread and
//! hold the repository lock for the whole run. Two syncs requested at once
//! therefore execute one after the other.

use std::sync::Arc;

use crate::state::AppState;

use super::OpResult;

pub async fn run_card_sync(state: &AppState) -> OpResult {
    let repository = Arc::clone(&state.repository);
    let assets = Arc::clone(&state.assets);
    let importer = Arc::clone(&state.importer);
    let sink = state.progress_sink();

    let outcome = tokio::task::spawn_blocking(move || {
        let repo = repository.lock().expect("repository lock");
        importer.sync_cards(&repo, &assets, &sink)
    })
    .await;

    match outcome {
        Ok(Ok(report)) => OpResult::ok(format!(
            "Import finished. {} new cards imported, {} skipped, {} processed.",
            report.imported, report.skipped, report.processed
        )),
        Ok(Err(e)) => OpResult::fail(format!("Import error: {e}")),
        Err(e) => OpResult::fail(format!("Import task failed: {e}")),
    }
}

pub async fn run_set_sync(state: &AppState) -> OpResult {
    let repository = Arc::clone(&state.repository);
    let importer = Arc::clone(&state.importer);
    let sink = state.progress_sink();

    let outcome = tokio::task::spawn_blocking(move || {
        let repo = repository.lock().expect("repository lock");
        importer.sync_sets(&repo, &sink)
    })
    .await;

    match outcome {
        Ok(Ok(report)) => OpResult::ok(format!(
            "Set import finished. {} new printings, {} already known.",
            report.imported, report.skipped
        )),
        Ok(Err(e)) => OpResult::fail(format!("Import error: {e}")),
        Err(e) => OpResult::fail(format!("Import task failed: {e}")),
    }
}
