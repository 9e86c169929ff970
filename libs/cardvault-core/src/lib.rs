//! Core card-catalog library shared by the desktop application.
//!
//! Provides:
//! - Shared domain types (collection status, artwork rows, collection lots)
//! - The deterministic card-game gallery ordering
//! - Asset file-name sanitization and the artwork display-id codec

pub mod error;
pub mod naming;
pub mod ordering;
pub mod types;

pub use error::ParseError;
pub use naming::{asset_file_name, sanitize_asset_name, ArtworkKey};
pub use ordering::{card_type_rank, compare_artwork_rows};
pub use types::{ArtworkRow, CollectionItem, CollectionItemInput, CollectionStatus};
