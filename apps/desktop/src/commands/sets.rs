//! Set registry commands.

use tracing::warn;

use crate::db::{SetPage, SetRepository, SetSummary};
use crate::state::AppState;

/// Autocomplete lookup over set names and codes. Blank queries return
/// nothing rather than the whole registry.
pub async fn search_sets(state: &AppState, query: &str) -> Vec<SetSummary> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }
    let repo = state.repository.lock().expect("repository lock");
    repo.search_sets(query).unwrap_or_else(|e| {
        warn!("set search failed for {query:?}: {e}");
        Vec::new()
    })
}

pub async fn list_sets(state: &AppState, page: u32, limit: u32) -> SetPage {
    let repo = state.repository.lock().expect("repository lock");
    repo.list_sets(page, limit).unwrap_or_else(|e| {
        warn!("failed to list sets: {e}");
        SetPage {
            sets: Vec::new(),
            total: 0,
        }
    })
}
