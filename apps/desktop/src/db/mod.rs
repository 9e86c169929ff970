//! Local persistence layer.

mod error;
mod repository;
mod schema;

pub use error::{is_unique_violation, DbError};
pub use repository::{
    ArtworkChoice, ArtworkFilter, ArtworkQueryRepository, CatalogRepository, CollectionDetails,
    CollectionRepository, NewArtwork, NewCard, NewPrinting, NewSet, PrintingRepository,
    PrintingRow, PrintingUpdate, RegistryRepository, SetPage, SetRepository, SetRow, SetSummary,
    SqliteRepository,
};
