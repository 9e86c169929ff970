//! Gallery query engine.
//!
//! Produces the deduplicated artwork view: one row per distinct artwork
//! (main image plus alternates), deterministically ordered, then paginated.
//! Page totals are computed over the expanded artwork set, not the raw card
//! count.

use serde::{Deserialize, Serialize};
use tracing::warn;

use cardvault_core::ordering::compare_artwork_rows;
use cardvault_core::types::ArtworkRow;

use crate::db::{ArtworkFilter, ArtworkQueryRepository, DbError, SqliteRepository};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArtworkPageRequest {
    pub page: u32,
    pub limit: u32,
    #[serde(default)]
    pub card_type: Option<String>,
    #[serde(default)]
    pub search_term: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArtworkPage {
    pub cards: Vec<ArtworkRow>,
    pub total_pages: u32,
    pub current_page: u32,
    pub total_cards: usize,
}

impl ArtworkPage {
    fn empty(page: u32) -> Self {
        Self {
            cards: Vec::new(),
            total_pages: 1,
            current_page: page.max(1),
            total_cards: 0,
        }
    }
}

/// Interactive read path: storage errors degrade to an empty page.
pub fn list_artworks(repo: &SqliteRepository, request: &ArtworkPageRequest) -> ArtworkPage {
    match list_artworks_inner(repo, request) {
        Ok(page) => page,
        Err(e) => {
            warn!("artwork listing failed: {e}");
            ArtworkPage::empty(request.page)
        }
    }
}

fn list_artworks_inner(
    repo: &SqliteRepository,
    request: &ArtworkPageRequest,
) -> Result<ArtworkPage, DbError> {
    let page = request.page.max(1);
    let limit = request.limit.max(1) as usize;

    let filter = ArtworkFilter {
        card_type: normalize(request.card_type.as_deref()),
        search: normalize(request.search_term.as_deref()),
    };

    let mut rows = repo.artwork_rows(&filter)?;
    rows.sort_by(compare_artwork_rows);

    let total_cards = rows.len();
    let total_pages = (total_cards.div_ceil(limit)).max(1) as u32;
    let offset = (page as usize - 1) * limit;
    let cards = rows.into_iter().skip(offset).take(limit).collect();

    Ok(ArtworkPage {
        cards,
        total_pages,
        current_page: page,
        total_cards,
    })
}

fn normalize(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
