//! Card gallery and artwork commands.

use std::path::{Component, Path};

use tracing::warn;

use crate::db::{ArtworkChoice, CatalogRepository};
use crate::query::{self, ArtworkPage, ArtworkPageRequest};
use crate::state::AppState;

pub async fn list_artworks(state: &AppState, request: ArtworkPageRequest) -> ArtworkPage {
    let repo = state.repository.lock().expect("repository lock");
    query::list_artworks(&repo, &request)
}

pub async fn list_distinct_card_types(state: &AppState) -> Vec<String> {
    let repo = state.repository.lock().expect("repository lock");
    repo.distinct_card_types().unwrap_or_else(|e| {
        warn!("failed to list card types: {e}");
        Vec::new()
    })
}

pub async fn list_alternate_artworks(state: &AppState, card_id: i64) -> Vec<ArtworkChoice> {
    let repo = state.repository.lock().expect("repository lock");
    repo.alternate_artworks(card_id).unwrap_or_else(|e| {
        warn!("failed to list artworks for card {card_id}: {e}");
        Vec::new()
    })
}

/// Serve the bytes of a stored asset. Only plain relative paths under the
/// data directory are accepted.
pub async fn read_artwork(state: &AppState, relative_path: &str) -> Option<Vec<u8>> {
    let path = Path::new(relative_path);
    if path
        .components()
        .any(|part| !matches!(part, Component::Normal(_)))
    {
        warn!("rejected asset path {relative_path:?}");
        return None;
    }
    std::fs::read(state.assets.resolve(relative_path)).ok()
}
