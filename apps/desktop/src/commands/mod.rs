//! Boundary operations consumed by the presentation layer.
//!
//! Write operations report through a small result envelope instead of
//! returning `Result`: the caller always gets something renderable, and
//! failures carry a human-readable message. List operations degrade to
//! empty collections with the failure logged.

mod cards;
mod collection;
mod import;
mod printings;
mod sets;

use serde::Serialize;

pub use cards::{list_alternate_artworks, list_artworks, list_distinct_card_types, read_artwork};
pub use collection::{
    adjust_quantity, list_collection_items, reconcile_collection_items,
    update_collection_item_details, QuantityResult,
};
pub use import::{run_card_sync, run_set_sync};
pub use printings::{
    create_printing, delete_printing, link_printing_artwork, list_printings_for_card,
    update_printing, CreatePrintingRequest, CreatePrintingResult, UpdatePrintingRequest,
};
pub use sets::{list_sets, search_sets};

/// Result envelope for write operations.
#[derive(Debug, Clone, Serialize)]
pub struct OpResult {
    pub success: bool,
    pub message: String,
}

impl OpResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
