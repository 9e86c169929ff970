//! Core types for the card catalog and collection domain.

use serde::{Deserialize, Serialize};

/// Inventory status of a collection lot.
///
/// Stored as its capitalized name in the database, matching the remote
/// presentation contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectionStatus {
    Owned,
    Wanted,
    Trade,
}

impl CollectionStatus {
    pub const ALL: [CollectionStatus; 3] = [Self::Owned, Self::Wanted, Self::Trade];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owned => "Owned",
            Self::Wanted => "Wanted",
            Self::Trade => "Trade",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Owned" => Some(Self::Owned),
            "Wanted" => Some(Self::Wanted),
            "Trade" => Some(Self::Trade),
            _ => None,
        }
    }
}

/// One displayable artwork in the unified gallery projection.
///
/// A card with a primary artwork contributes one "main" row; every alternate
/// artwork with `release_order > 0` contributes an "alternate" row. The
/// `display_id` is the stable synthetic key the presentation layer uses to
/// correlate selection state across re-fetches.
#[derive(Debug, Clone, Serialize)]
pub struct ArtworkRow {
    pub card_id: i64,
    pub name: String,
    pub localized_name: Option<String>,
    pub card_type: String,
    pub attribute: Option<String>,
    pub race: Option<String>,
    pub level_rank_link: Option<i64>,
    pub atk: Option<i64>,
    pub def: Option<i64>,
    pub scale: Option<i64>,
    pub description: String,
    pub artwork_path: String,
    pub display_id: String,
    /// Database id of the alternate artwork; `None` for the primary.
    pub artwork_id: Option<i64>,
    pub owned_count: i64,
    pub wanted_count: i64,
    pub trade_count: i64,
}

/// One stored inventory lot for a printing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionItem {
    pub id: i64,
    pub printing_id: i64,
    pub status: CollectionStatus,
    pub quantity: i64,
    pub condition: Option<String>,
    pub storage_location: Option<String>,
    pub acquisition_date: Option<String>,
    pub acquisition_price: Option<f64>,
    pub notes: Option<String>,
}

/// A desired collection lot submitted by the presentation layer.
///
/// Lots with a non-positive `id` are client-temporary and get inserted as new
/// rows; positive ids refer to persisted rows and are updated in place, or
/// deleted when `delete` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionItemInput {
    #[serde(default)]
    pub id: i64,
    pub status: CollectionStatus,
    pub quantity: i64,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub storage_location: Option<String>,
    #[serde(default)]
    pub acquisition_date: Option<String>,
    #[serde(default)]
    pub acquisition_price: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub delete: bool,
}
