//! SQLite-backed storage for the card catalog and the user collection.
//!
//! A single [`SqliteRepository`] owns the connection and implements one
//! trait per concern so callers only see the operations they need.

use std::collections::HashSet;
use std::path::Path;

use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use cardvault_core::error::ParseError;
use cardvault_core::naming::ArtworkKey;
use cardvault_core::types::{ArtworkRow, CollectionItem, CollectionItemInput, CollectionStatus};

use super::error::DbError;
use super::schema::SCHEMA;

type Result<T> = std::result::Result<T, DbError>;

/// A card as produced by the import pipeline, ready for insertion.
#[derive(Debug, Clone)]
pub struct NewCard {
    pub name: String,
    pub localized_name: Option<String>,
    pub external_id: Option<i64>,
    pub passcode: Option<String>,
    pub card_type: String,
    pub attribute: Option<String>,
    pub race: Option<String>,
    pub level_rank_link: Option<i64>,
    pub atk: Option<i64>,
    pub def: Option<i64>,
    pub scale: Option<i64>,
    pub description: String,
    pub main_artwork_path: Option<String>,
    pub first_release_tcg: Option<String>,
    pub first_release_ocg: Option<String>,
    pub is_token: bool,
    pub is_skill_card: bool,
}

#[derive(Debug, Clone)]
pub struct NewArtwork {
    pub card_id: i64,
    pub name: String,
    pub image_path: String,
    pub release_order: i64,
}

#[derive(Debug, Clone)]
pub struct NewSet {
    pub name: String,
    pub code: String,
    pub release_date_tcg_na: Option<String>,
    pub total_cards: Option<i64>,
    pub set_type: String,
}

#[derive(Debug, Clone)]
pub struct NewPrinting {
    pub card_id: i64,
    pub set_id: i64,
    pub card_number: String,
    pub rarity: String,
    pub language: String,
    pub edition: Option<String>,
    pub artwork_variant_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct PrintingUpdate {
    pub printing_id: i64,
    pub set_id: i64,
    pub card_number: String,
    pub rarity: String,
    pub language: String,
    pub edition: Option<String>,
}

/// One printing of a card with its set context and per-status quantities.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PrintingRow {
    pub printing_id: i64,
    pub card_id: i64,
    pub card_name: String,
    pub card_type: String,
    pub set_id: i64,
    pub set_name: String,
    pub set_code: String,
    pub card_number: String,
    pub rarity: String,
    pub edition: Option<String>,
    pub language: String,
    pub artwork_id: Option<i64>,
    pub artwork_path: Option<String>,
    pub owned_count: i64,
    pub wanted_count: i64,
    pub trade_count: i64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SetSummary {
    pub id: i64,
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SetRow {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub release_date_tcg_na: Option<String>,
    pub release_date_tcg_eu: Option<String>,
    pub release_date_ocg: Option<String>,
    pub total_cards: Option<i64>,
    pub set_type: Option<String>,
    pub printing_count: i64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SetPage {
    pub sets: Vec<SetRow>,
    pub total: usize,
}

/// An alternate artwork offered when linking a printing to a variant.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ArtworkChoice {
    pub id: i64,
    pub name: String,
}

/// Free-text details carried by a collection row, edited separately from
/// its quantity.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct CollectionDetails {
    pub condition: Option<String>,
    pub storage_location: Option<String>,
    pub acquisition_date: Option<String>,
    pub acquisition_price: Option<f64>,
    pub notes: Option<String>,
}

/// Filters applied to the artwork gallery before expansion and ordering.
#[derive(Debug, Clone, Default)]
pub struct ArtworkFilter {
    pub card_type: Option<String>,
    pub search: Option<String>,
}

pub trait CatalogRepository {
    fn existing_external_ids(&self) -> Result<HashSet<i64>>;
    fn card_id_by_external(&self, external_id: i64) -> Result<Option<i64>>;
    fn insert_card(&self, card: &NewCard) -> Result<i64>;
    fn insert_alternate_artwork(&self, artwork: &NewArtwork) -> Result<()>;
    fn link_card_archetype(&self, card_id: i64, archetype_id: i64) -> Result<()>;
    fn distinct_card_types(&self) -> Result<Vec<String>>;
    fn alternate_artworks(&self, card_id: i64) -> Result<Vec<ArtworkChoice>>;
    fn card_count(&self) -> Result<i64>;
}

pub trait RegistryRepository {
    fn find_or_create_archetype(&self, name: &str) -> Result<Option<i64>>;
    fn find_or_create_set(&self, set: &NewSet) -> Result<i64>;
    fn find_set(&self, code: &str, name: &str) -> Result<Option<i64>>;
    fn find_set_by_code(&self, code: &str) -> Result<Option<i64>>;
}

pub trait ArtworkQueryRepository {
    fn artwork_rows(&self, filter: &ArtworkFilter) -> Result<Vec<ArtworkRow>>;
}

pub trait PrintingRepository {
    fn printings_for_card(&self, card_id: i64) -> Result<Vec<PrintingRow>>;
    fn find_printing(
        &self,
        card_id: i64,
        set_id: i64,
        card_number: &str,
        rarity: &str,
    ) -> Result<Option<i64>>;
    fn create_printing(&self, printing: &NewPrinting) -> Result<i64>;
    fn update_printing(&self, update: &PrintingUpdate) -> Result<bool>;
    fn delete_printing(&self, printing_id: i64) -> Result<bool>;
    fn link_artwork(&self, printing_id: i64, artwork_id: Option<i64>) -> Result<bool>;
}

pub trait CollectionRepository {
    fn collection_items(&self, printing_id: i64) -> Result<Vec<CollectionItem>>;
    fn reconcile_items(&self, printing_id: i64, items: &[CollectionItemInput]) -> Result<()>;
    fn adjust_quantity(
        &self,
        printing_id: i64,
        status: CollectionStatus,
        delta: i64,
    ) -> Result<i64>;
    /// Returns `None` when no row exists for the printing and status,
    /// `Some(changed)` otherwise.
    fn update_item_details(
        &self,
        printing_id: i64,
        status: CollectionStatus,
        details: &CollectionDetails,
    ) -> Result<Option<bool>>;
}

pub trait SetRepository {
    fn search_sets(&self, query: &str) -> Result<Vec<SetSummary>>;
    fn list_sets(&self, page: u32, limit: u32) -> Result<SetPage>;
}

pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Run `f` inside a single transaction. Any error rolls back every
    /// statement issued by `f`.
    pub fn with_transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
    {
        let tx = self.conn.unchecked_transaction()?;
        let value = f(self)?;
        tx.commit()?;
        Ok(value)
    }
}

impl CatalogRepository for SqliteRepository {
    fn existing_external_ids(&self) -> Result<HashSet<i64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT external_id FROM cards WHERE external_id IS NOT NULL")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<HashSet<i64>>>()?;
        Ok(ids)
    }

    fn card_id_by_external(&self, external_id: i64) -> Result<Option<i64>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM cards WHERE external_id = ?1",
                [external_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn insert_card(&self, card: &NewCard) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO cards (
                name, localized_name, external_id, passcode, card_type,
                attribute, race, level_rank_link, atk, def, scale,
                description, main_artwork_path, first_release_tcg,
                first_release_ocg, is_token, is_skill_card
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            params![
                card.name,
                card.localized_name,
                card.external_id,
                card.passcode,
                card.card_type,
                card.attribute,
                card.race,
                card.level_rank_link,
                card.atk,
                card.def,
                card.scale,
                card.description,
                card.main_artwork_path,
                card.first_release_tcg,
                card.first_release_ocg,
                card.is_token,
                card.is_skill_card,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn insert_alternate_artwork(&self, artwork: &NewArtwork) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO alternate_artworks (card_id, name, image_path, release_order)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                artwork.card_id,
                artwork.name,
                artwork.image_path,
                artwork.release_order
            ],
        )?;
        Ok(())
    }

    fn link_card_archetype(&self, card_id: i64, archetype_id: i64) -> Result<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO card_archetypes (card_id, archetype_id) VALUES (?1, ?2)",
            params![card_id, archetype_id],
        )?;
        Ok(())
    }

    fn distinct_card_types(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT card_type FROM cards ORDER BY card_type ASC")?;
        let types = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(types)
    }

    fn alternate_artworks(&self, card_id: i64) -> Result<Vec<ArtworkChoice>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name FROM alternate_artworks
             WHERE card_id = ?1
             ORDER BY release_order ASC, name ASC",
        )?;
        let choices = stmt
            .query_map([card_id], |row| {
                Ok(ArtworkChoice {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(choices)
    }

    fn card_count(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM cards", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl RegistryRepository for SqliteRepository {
    fn find_or_create_archetype(&self, name: &str) -> Result<Option<i64>> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }
        if let Some(id) = self
            .conn
            .query_row("SELECT id FROM archetypes WHERE name = ?1", [name], |row| {
                row.get(0)
            })
            .optional()?
        {
            return Ok(Some(id));
        }
        match self
            .conn
            .execute("INSERT INTO archetypes (name) VALUES (?1)", [name])
        {
            Ok(_) => Ok(Some(self.conn.last_insert_rowid())),
            Err(e) if super::error::is_unique_violation(&e) => {
                // Another statement in the same batch created it first.
                let id = self.conn.query_row(
                    "SELECT id FROM archetypes WHERE name = ?1",
                    [name],
                    |row| row.get(0),
                )?;
                Ok(Some(id))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn find_or_create_set(&self, set: &NewSet) -> Result<i64> {
        if let Some(id) = self.find_set(&set.code, &set.name)? {
            return Ok(id);
        }
        self.conn.execute(
            "INSERT INTO sets (name, code, release_date_tcg_na, total_cards, set_type)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                set.name,
                set.code,
                set.release_date_tcg_na,
                set.total_cards,
                set.set_type
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn find_set(&self, code: &str, name: &str) -> Result<Option<i64>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM sets WHERE code = ?1 AND name = ?2",
                params![code, name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn find_set_by_code(&self, code: &str) -> Result<Option<i64>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM sets WHERE code = ?1 ORDER BY id ASC LIMIT 1",
                [code],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }
}

/// Subselect summing quantities for one status over a card's printings
/// that carry the given artwork binding.
fn status_sum(status: &str, artwork_clause: &str) -> String {
    format!(
        "(SELECT COALESCE(SUM(ci.quantity), 0)
            FROM printings p
            LEFT JOIN collection_items ci
              ON ci.printing_id = p.id AND ci.status = '{status}'
           WHERE p.card_id = c.id AND {artwork_clause})"
    )
}

impl ArtworkQueryRepository for SqliteRepository {
    fn artwork_rows(&self, filter: &ArtworkFilter) -> Result<Vec<ArtworkRow>> {
        let mut where_sql = String::new();
        let mut params: Vec<String> = Vec::new();
        if let Some(card_type) = &filter.card_type {
            where_sql.push_str(" AND c.card_type = ?");
            params.push(card_type.clone());
        }
        if let Some(search) = &filter.search {
            where_sql.push_str(
                " AND (LOWER(c.name) LIKE LOWER(?) OR LOWER(COALESCE(c.localized_name, '')) LIKE LOWER(?))",
            );
            let pattern = format!("%{search}%");
            params.push(pattern.clone());
            params.push(pattern);
        }

        let mut rows = Vec::new();

        // Primary artworks: one row per card with a main image. Quantities
        // only count printings not bound to an alternate artwork.
        let main_sql = format!(
            "SELECT c.id, c.name, c.localized_name, c.card_type, c.attribute, c.race,
                    c.level_rank_link, c.atk, c.def, c.scale, c.description,
                    c.main_artwork_path,
                    {owned}, {wanted}, {trade}
             FROM cards c
             WHERE c.main_artwork_path IS NOT NULL AND c.main_artwork_path != ''{where_sql}",
            owned = status_sum("Owned", "p.artwork_variant_id IS NULL"),
            wanted = status_sum("Wanted", "p.artwork_variant_id IS NULL"),
            trade = status_sum("Trade", "p.artwork_variant_id IS NULL"),
        );
        let mut stmt = self.conn.prepare(&main_sql)?;
        let main_rows = stmt.query_map(params_from_iter(params.iter()), |row| {
            let card_id: i64 = row.get(0)?;
            Ok(ArtworkRow {
                card_id,
                name: row.get(1)?,
                localized_name: row.get(2)?,
                card_type: row.get(3)?,
                attribute: row.get(4)?,
                race: row.get(5)?,
                level_rank_link: row.get(6)?,
                atk: row.get(7)?,
                def: row.get(8)?,
                scale: row.get(9)?,
                description: row.get(10)?,
                artwork_path: row.get(11)?,
                display_id: ArtworkKey::Main { card_id }.to_string(),
                artwork_id: None,
                owned_count: row.get(12)?,
                wanted_count: row.get(13)?,
                trade_count: row.get(14)?,
            })
        })?;
        for row in main_rows {
            rows.push(row?);
        }

        // Alternate artworks expand into their own gallery rows. A
        // release_order of zero marks the primary image already covered
        // above, so it is excluded here.
        let alt_sql = format!(
            "SELECT c.id, c.name, c.localized_name, c.card_type, c.attribute, c.race,
                    c.level_rank_link, c.atk, c.def, c.scale, c.description,
                    aa.image_path, aa.id,
                    {owned}, {wanted}, {trade}
             FROM alternate_artworks aa
             JOIN cards c ON aa.card_id = c.id
             WHERE aa.image_path IS NOT NULL AND aa.image_path != ''
               AND aa.release_order > 0{where_sql}",
            owned = status_sum("Owned", "p.artwork_variant_id = aa.id"),
            wanted = status_sum("Wanted", "p.artwork_variant_id = aa.id"),
            trade = status_sum("Trade", "p.artwork_variant_id = aa.id"),
        );
        let mut stmt = self.conn.prepare(&alt_sql)?;
        let alt_rows = stmt.query_map(params_from_iter(params.iter()), |row| {
            let card_id: i64 = row.get(0)?;
            let artwork_id: i64 = row.get(12)?;
            Ok(ArtworkRow {
                card_id,
                name: row.get(1)?,
                localized_name: row.get(2)?,
                card_type: row.get(3)?,
                attribute: row.get(4)?,
                race: row.get(5)?,
                level_rank_link: row.get(6)?,
                atk: row.get(7)?,
                def: row.get(8)?,
                scale: row.get(9)?,
                description: row.get(10)?,
                artwork_path: row.get(11)?,
                display_id: ArtworkKey::Alternate {
                    card_id,
                    artwork_id,
                }
                .to_string(),
                artwork_id: Some(artwork_id),
                owned_count: row.get(13)?,
                wanted_count: row.get(14)?,
                trade_count: row.get(15)?,
            })
        })?;
        for row in alt_rows {
            rows.push(row?);
        }

        Ok(rows)
    }
}

impl PrintingRepository for SqliteRepository {
    fn printings_for_card(&self, card_id: i64) -> Result<Vec<PrintingRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.id, c.id, c.name, c.card_type,
                    s.id, s.name, s.code,
                    p.card_number, p.rarity, p.edition, p.language,
                    p.artwork_variant_id,
                    COALESCE(
                        p.image_path_override,
                        (SELECT aa.image_path FROM alternate_artworks aa
                          WHERE aa.id = p.artwork_variant_id),
                        c.main_artwork_path
                    ),
                    (SELECT COALESCE(SUM(ci.quantity), 0) FROM collection_items ci
                      WHERE ci.printing_id = p.id AND ci.status = 'Owned'),
                    (SELECT COALESCE(SUM(ci.quantity), 0) FROM collection_items ci
                      WHERE ci.printing_id = p.id AND ci.status = 'Wanted'),
                    (SELECT COALESCE(SUM(ci.quantity), 0) FROM collection_items ci
                      WHERE ci.printing_id = p.id AND ci.status = 'Trade')
             FROM printings p
             JOIN cards c ON p.card_id = c.id
             JOIN sets s ON p.set_id = s.id
             WHERE p.card_id = ?1
             ORDER BY s.release_date_tcg_na DESC, s.release_date_ocg DESC,
                      s.name ASC, p.card_number ASC, p.rarity ASC",
        )?;
        let printings = stmt
            .query_map([card_id], |row| {
                Ok(PrintingRow {
                    printing_id: row.get(0)?,
                    card_id: row.get(1)?,
                    card_name: row.get(2)?,
                    card_type: row.get(3)?,
                    set_id: row.get(4)?,
                    set_name: row.get(5)?,
                    set_code: row.get(6)?,
                    card_number: row.get(7)?,
                    rarity: row.get(8)?,
                    edition: row.get(9)?,
                    language: row.get(10)?,
                    artwork_id: row.get(11)?,
                    artwork_path: row.get(12)?,
                    owned_count: row.get(13)?,
                    wanted_count: row.get(14)?,
                    trade_count: row.get(15)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(printings)
    }

    fn find_printing(
        &self,
        card_id: i64,
        set_id: i64,
        card_number: &str,
        rarity: &str,
    ) -> Result<Option<i64>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM printings
                 WHERE card_id = ?1 AND set_id = ?2 AND card_number = ?3 AND rarity = ?4",
                params![card_id, set_id, card_number, rarity],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn create_printing(&self, printing: &NewPrinting) -> Result<i64> {
        if let Some(artwork_id) = printing.artwork_variant_id {
            self.check_artwork_owner(artwork_id, printing.card_id)?;
        }
        self.conn.execute(
            "INSERT INTO printings (card_id, set_id, card_number, rarity, language, edition, artwork_variant_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                printing.card_id,
                printing.set_id,
                printing.card_number,
                printing.rarity,
                printing.language,
                printing.edition,
                printing.artwork_variant_id,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_printing(&self, update: &PrintingUpdate) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE printings
             SET set_id = ?1, card_number = ?2, rarity = ?3, language = ?4, edition = ?5
             WHERE id = ?6",
            params![
                update.set_id,
                update.card_number,
                update.rarity,
                update.language,
                update.edition,
                update.printing_id,
            ],
        )?;
        Ok(changed > 0)
    }

    fn delete_printing(&self, printing_id: i64) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM printings WHERE id = ?1", [printing_id])?;
        Ok(changed > 0)
    }

    fn link_artwork(&self, printing_id: i64, artwork_id: Option<i64>) -> Result<bool> {
        if let Some(artwork_id) = artwork_id {
            let card_id: Option<i64> = self
                .conn
                .query_row(
                    "SELECT card_id FROM printings WHERE id = ?1",
                    [printing_id],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(card_id) = card_id else {
                return Ok(false);
            };
            self.check_artwork_owner(artwork_id, card_id)?;
        }
        let changed = self.conn.execute(
            "UPDATE printings SET artwork_variant_id = ?1 WHERE id = ?2",
            params![artwork_id, printing_id],
        )?;
        Ok(changed > 0)
    }
}

impl SqliteRepository {
    /// A printing may only reference an artwork of its own card.
    fn check_artwork_owner(&self, artwork_id: i64, card_id: i64) -> Result<()> {
        let owner: Option<i64> = self
            .conn
            .query_row(
                "SELECT card_id FROM alternate_artworks WHERE id = ?1",
                [artwork_id],
                |row| row.get(0),
            )
            .optional()?;
        match owner {
            Some(owner) if owner == card_id => Ok(()),
            Some(_) => Err(DbError::InvalidData(format!(
                "artwork {artwork_id} belongs to a different card"
            ))),
            None => Err(DbError::InvalidData(format!(
                "artwork {artwork_id} does not exist"
            ))),
        }
    }
}

impl CollectionRepository for SqliteRepository {
    fn collection_items(&self, printing_id: i64) -> Result<Vec<CollectionItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, printing_id, status, quantity, condition, storage_location,
                    acquisition_date, acquisition_price, notes
             FROM collection_items
             WHERE printing_id = ?1
             ORDER BY status ASC, id ASC",
        )?;
        let items = stmt
            .query_map([printing_id], |row| {
                let status: String = row.get(2)?;
                // A status outside the known set is corrupt data, not a
                // default; misreporting it as Owned would skew inventory.
                let status = CollectionStatus::from_str(&status).ok_or_else(|| {
                    rusqlite::Error::FromSqlConversionFailure(
                        2,
                        rusqlite::types::Type::Text,
                        Box::new(ParseError::UnknownStatus(status.clone())),
                    )
                })?;
                Ok(CollectionItem {
                    id: row.get(0)?,
                    printing_id: row.get(1)?,
                    status,
                    quantity: row.get(3)?,
                    condition: row.get(4)?,
                    storage_location: row.get(5)?,
                    acquisition_date: row.get(6)?,
                    acquisition_price: row.get(7)?,
                    notes: row.get(8)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    fn reconcile_items(&self, printing_id: i64, items: &[CollectionItemInput]) -> Result<()> {
        self.with_transaction(|repo| {
            let mut stmt = repo
                .conn
                .prepare("SELECT id FROM collection_items WHERE printing_id = ?1")?;
            let stored = stmt
                .query_map([printing_id], |row| row.get(0))?
                .collect::<rusqlite::Result<HashSet<i64>>>()?;

            let mut surviving: HashSet<i64> = HashSet::new();
            for item in items {
                if item.delete {
                    if item.id > 0 {
                        repo.conn.execute(
                            "DELETE FROM collection_items WHERE id = ?1 AND printing_id = ?2",
                            params![item.id, printing_id],
                        )?;
                    }
                    continue;
                }
                if item.id > 0 {
                    surviving.insert(item.id);
                    repo.conn.execute(
                        "UPDATE collection_items
                         SET status = ?1, quantity = ?2, condition = ?3,
                             storage_location = ?4, acquisition_date = ?5,
                             acquisition_price = ?6, notes = ?7
                         WHERE id = ?8 AND printing_id = ?9",
                        params![
                            item.status.as_str(),
                            item.quantity,
                            item.condition,
                            item.storage_location,
                            item.acquisition_date,
                            item.acquisition_price,
                            item.notes,
                            item.id,
                            printing_id,
                        ],
                    )?;
                } else {
                    repo.conn.execute(
                        "INSERT INTO collection_items
                            (printing_id, status, quantity, condition, storage_location,
                             acquisition_date, acquisition_price, notes)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                        params![
                            printing_id,
                            item.status.as_str(),
                            item.quantity,
                            item.condition,
                            item.storage_location,
                            item.acquisition_date,
                            item.acquisition_price,
                            item.notes,
                        ],
                    )?;
                }
            }

            // Stored rows absent from the desired list are removed.
            for id in stored {
                if !surviving.contains(&id) {
                    repo.conn
                        .execute("DELETE FROM collection_items WHERE id = ?1", [id])?;
                }
            }
            Ok(())
        })
    }

    fn adjust_quantity(
        &self,
        printing_id: i64,
        status: CollectionStatus,
        delta: i64,
    ) -> Result<i64> {
        let existing: Option<(i64, i64)> = self
            .conn
            .query_row(
                "SELECT id, quantity FROM collection_items
                 WHERE printing_id = ?1 AND status = ?2
                 ORDER BY id ASC LIMIT 1",
                params![printing_id, status.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match existing {
            Some((id, quantity)) => {
                let new_quantity = (quantity + delta).max(0);
                // An Owned row at zero disappears; other statuses keep the
                // zero-quantity row so its details survive.
                if new_quantity == 0 && status == CollectionStatus::Owned {
                    self.conn
                        .execute("DELETE FROM collection_items WHERE id = ?1", [id])?;
                } else {
                    self.conn.execute(
                        "UPDATE collection_items SET quantity = ?1 WHERE id = ?2",
                        params![new_quantity, id],
                    )?;
                }
                Ok(new_quantity)
            }
            None if delta > 0 => {
                let condition = (status == CollectionStatus::Owned).then_some("Near Mint");
                self.conn.execute(
                    "INSERT INTO collection_items (printing_id, status, quantity, condition)
                     VALUES (?1, ?2, 1, ?3)",
                    params![printing_id, status.as_str(), condition],
                )?;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn update_item_details(
        &self,
        printing_id: i64,
        status: CollectionStatus,
        details: &CollectionDetails,
    ) -> Result<Option<bool>> {
        let id: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM collection_items
                 WHERE printing_id = ?1 AND status = ?2
                 ORDER BY id ASC LIMIT 1",
                params![printing_id, status.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(id) = id else {
            return Ok(None);
        };
        let changed = self.conn.execute(
            "UPDATE collection_items
             SET condition = ?1, storage_location = ?2, acquisition_date = ?3,
                 acquisition_price = ?4, notes = ?5
             WHERE id = ?6",
            params![
                details.condition,
                details.storage_location,
                details.acquisition_date,
                details.acquisition_price,
                details.notes,
                id,
            ],
        )?;
        Ok(Some(changed > 0))
    }
}

impl SetRepository for SqliteRepository {
    fn search_sets(&self, query: &str) -> Result<Vec<SetSummary>> {
        let pattern = format!("%{query}%");
        let mut stmt = self.conn.prepare(
            "SELECT id, name, code FROM sets
             WHERE name LIKE ?1 OR code LIKE ?1
             ORDER BY release_date_tcg_na DESC, name ASC
             LIMIT 10",
        )?;
        let sets = stmt
            .query_map([&pattern], |row| {
                Ok(SetSummary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    code: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(sets)
    }

    fn list_sets(&self, page: u32, limit: u32) -> Result<SetPage> {
        let page = page.max(1);
        let limit = limit.max(1);
        // Plain `!=` so NULL set_type rows are excluded too; the listing
        // only shows sets with a known, non-hidden category.
        let total: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sets WHERE set_type != 'hidden'",
            [],
            |row| row.get(0),
        )?;
        let mut stmt = self.conn.prepare(
            "SELECT s.id, s.name, s.code, s.release_date_tcg_na, s.release_date_tcg_eu,
                    s.release_date_ocg, s.total_cards, s.set_type,
                    (SELECT COUNT(*) FROM printings p WHERE p.set_id = s.id)
             FROM sets s
             WHERE s.set_type != 'hidden'
             ORDER BY s.release_date_tcg_na ASC, s.name ASC
             LIMIT ?1 OFFSET ?2",
        )?;
        let offset = i64::from(page - 1) * i64::from(limit);
        let sets = stmt
            .query_map(params![limit, offset], |row| {
                Ok(SetRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    code: row.get(2)?,
                    release_date_tcg_na: row.get(3)?,
                    release_date_tcg_eu: row.get(4)?,
                    release_date_ocg: row.get(5)?,
                    total_cards: row.get(6)?,
                    set_type: row.get(7)?,
                    printing_count: row.get(8)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(SetPage {
            sets,
            total: total as usize,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{card, owned_item, repo, seed_card, seed_printing, seed_set};
    use pretty_assertions::assert_eq;

    #[test]
    fn a_failed_transaction_rolls_back_every_statement() {
        let repo = repo();
        let result: Result<()> = repo.with_transaction(|repo| {
            repo.insert_card(&card("Ephemeral"))?;
            Err(DbError::InvalidData("forced failure".into()))
        });
        assert!(result.is_err());
        assert_eq!(repo.card_count().unwrap(), 0);
    }

    #[test]
    fn find_or_create_archetype_dedupes() {
        let repo = repo();
        let first = repo.find_or_create_archetype("Dark Magician").unwrap();
        let second = repo.find_or_create_archetype("Dark Magician").unwrap();
        assert_eq!(first, second);
        assert!(first.is_some());
    }

    #[test]
    fn blank_archetype_yields_none() {
        let repo = repo();
        assert_eq!(repo.find_or_create_archetype("   ").unwrap(), None);
    }

    #[test]
    fn sets_are_keyed_by_code_and_name() {
        let repo = repo();
        let a = seed_set(&repo, "LOB", "Legend of Blue Eyes");
        let same = seed_set(&repo, "LOB", "Legend of Blue Eyes");
        let other = seed_set(&repo, "LOB", "Legend of Blue Eyes Reprint");
        assert_eq!(a, same);
        assert_ne!(a, other);
    }

    #[test]
    fn reconcile_replaces_the_stored_collection() {
        let repo = repo();
        let card = seed_card(&repo, "Sangan");
        let set = seed_set(&repo, "MRD", "Metal Raiders");
        let printing = seed_printing(&repo, card, set, "MRD-069");

        repo.reconcile_items(
            printing,
            &[owned_item(1), owned_item(2), owned_item(3)],
        )
        .unwrap();
        let stored = repo.collection_items(printing).unwrap();
        assert_eq!(stored.len(), 3);

        // Keep the first row (updated), drop the rest, add one new row.
        let mut kept = owned_item(5);
        kept.id = stored[0].id;
        let added = owned_item(1);
        repo.reconcile_items(printing, &[kept, added]).unwrap();

        let after = repo.collection_items(printing).unwrap();
        assert_eq!(after.len(), 2);
        assert_eq!(after[0].id, stored[0].id);
        assert_eq!(after[0].quantity, 5);
        assert!(after.iter().all(|item| item.id != stored[1].id));
    }

    #[test]
    fn reconcile_honors_explicit_deletes() {
        let repo = repo();
        let card = seed_card(&repo, "Kuriboh");
        let set = seed_set(&repo, "MRD", "Metal Raiders");
        let printing = seed_printing(&repo, card, set, "MRD-071");

        repo.reconcile_items(printing, &[owned_item(1)]).unwrap();
        let stored = repo.collection_items(printing).unwrap();

        let mut doomed = owned_item(1);
        doomed.id = stored[0].id;
        doomed.delete = true;
        repo.reconcile_items(printing, &[doomed]).unwrap();
        assert!(repo.collection_items(printing).unwrap().is_empty());
    }

    #[test]
    fn adjust_quantity_floors_at_zero() {
        let repo = repo();
        let card = seed_card(&repo, "Jinzo");
        let set = seed_set(&repo, "PSV", "Pharaoh's Servant");
        let printing = seed_printing(&repo, card, set, "PSV-000");

        // No row and a decrement: nothing is created.
        let quantity = repo
            .adjust_quantity(printing, CollectionStatus::Owned, -1)
            .unwrap();
        assert_eq!(quantity, 0);
        assert!(repo.collection_items(printing).unwrap().is_empty());
    }

    #[test]
    fn owned_row_at_zero_is_deleted() {
        let repo = repo();
        let card = seed_card(&repo, "Raigeki");
        let set = seed_set(&repo, "LOB", "Legend of Blue Eyes");
        let printing = seed_printing(&repo, card, set, "LOB-053");

        repo.adjust_quantity(printing, CollectionStatus::Owned, 1)
            .unwrap();
        let quantity = repo
            .adjust_quantity(printing, CollectionStatus::Owned, -1)
            .unwrap();
        assert_eq!(quantity, 0);
        assert!(repo.collection_items(printing).unwrap().is_empty());
    }

    #[test]
    fn non_owned_row_at_zero_is_kept() {
        let repo = repo();
        let card = seed_card(&repo, "Mirror Force");
        let set = seed_set(&repo, "MRD", "Metal Raiders");
        let printing = seed_printing(&repo, card, set, "MRD-138");

        repo.adjust_quantity(printing, CollectionStatus::Trade, 1)
            .unwrap();
        let quantity = repo
            .adjust_quantity(printing, CollectionStatus::Trade, -1)
            .unwrap();
        assert_eq!(quantity, 0);

        let items = repo.collection_items(printing).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 0);
        assert_eq!(items[0].status, CollectionStatus::Trade);
    }

    #[test]
    fn first_owned_copy_gets_a_default_condition() {
        let repo = repo();
        let card = seed_card(&repo, "Pot of Greed");
        let set = seed_set(&repo, "LOB", "Legend of Blue Eyes");
        let printing = seed_printing(&repo, card, set, "LOB-119");

        repo.adjust_quantity(printing, CollectionStatus::Owned, 1)
            .unwrap();
        repo.adjust_quantity(printing, CollectionStatus::Wanted, 1)
            .unwrap();

        let items = repo.collection_items(printing).unwrap();
        let owned = items
            .iter()
            .find(|i| i.status == CollectionStatus::Owned)
            .unwrap();
        let wanted = items
            .iter()
            .find(|i| i.status == CollectionStatus::Wanted)
            .unwrap();
        assert_eq!(owned.condition.as_deref(), Some("Near Mint"));
        assert_eq!(wanted.condition, None);
    }

    #[test]
    fn update_item_details_requires_an_existing_row() {
        let repo = repo();
        let card = seed_card(&repo, "Exodia the Forbidden One");
        let set = seed_set(&repo, "LOB", "Legend of Blue Eyes");
        let printing = seed_printing(&repo, card, set, "LOB-124");

        let details = CollectionDetails {
            condition: Some("Played".into()),
            notes: Some("left arm missing".into()),
            ..Default::default()
        };
        assert_eq!(
            repo.update_item_details(printing, CollectionStatus::Owned, &details)
                .unwrap(),
            None
        );

        repo.adjust_quantity(printing, CollectionStatus::Owned, 1)
            .unwrap();
        assert_eq!(
            repo.update_item_details(printing, CollectionStatus::Owned, &details)
                .unwrap(),
            Some(true)
        );
        let items = repo.collection_items(printing).unwrap();
        assert_eq!(items[0].condition.as_deref(), Some("Played"));
        assert_eq!(items[0].notes.as_deref(), Some("left arm missing"));
    }

    #[test]
    fn deleting_a_printing_cascades_to_collection_items() {
        let repo = repo();
        let card = seed_card(&repo, "Summoned Skull");
        let set = seed_set(&repo, "MRD", "Metal Raiders");
        let printing = seed_printing(&repo, card, set, "MRD-003");

        repo.adjust_quantity(printing, CollectionStatus::Owned, 1)
            .unwrap();
        assert!(repo.delete_printing(printing).unwrap());
        assert!(repo.collection_items(printing).unwrap().is_empty());
    }

    #[test]
    fn linking_an_artwork_of_another_card_is_rejected() {
        let repo = repo();
        let card = seed_card(&repo, "Dark Magician");
        let other = seed_card(&repo, "Dark Magician Girl");
        let set = seed_set(&repo, "LOB", "Legend of Blue Eyes");
        let printing = seed_printing(&repo, card, set, "LOB-005");

        repo.insert_alternate_artwork(&NewArtwork {
            card_id: other,
            name: "Artwork 2".into(),
            image_path: "card_images/artworks_alternates/dmg_2.jpg".into(),
            release_order: 1,
        })
        .unwrap();
        let foreign = repo.alternate_artworks(other).unwrap()[0].id;

        let err = repo.link_artwork(printing, Some(foreign)).unwrap_err();
        assert!(matches!(err, DbError::InvalidData(_)));

        // Unlinking is always allowed.
        assert!(repo.link_artwork(printing, None).unwrap());
    }

    #[test]
    fn linking_a_matching_artwork_succeeds() {
        let repo = repo();
        let card = seed_card(&repo, "Blue-Eyes White Dragon");
        let set = seed_set(&repo, "LOB", "Legend of Blue Eyes");
        let printing = seed_printing(&repo, card, set, "LOB-001");

        repo.insert_alternate_artwork(&NewArtwork {
            card_id: card,
            name: "Artwork 2".into(),
            image_path: "card_images/artworks_alternates/bewd_2.jpg".into(),
            release_order: 1,
        })
        .unwrap();
        let artwork = repo.alternate_artworks(card).unwrap()[0].id;

        assert!(repo.link_artwork(printing, Some(artwork)).unwrap());
        let printings = repo.printings_for_card(card).unwrap();
        assert_eq!(printings[0].artwork_id, Some(artwork));
    }

    #[test]
    fn duplicate_printing_violates_uniqueness() {
        let repo = repo();
        let card = seed_card(&repo, "Time Wizard");
        let set = seed_set(&repo, "MRD", "Metal Raiders");
        seed_printing(&repo, card, set, "MRD-065");

        let err = repo
            .create_printing(&NewPrinting {
                card_id: card,
                set_id: set,
                card_number: "MRD-065".into(),
                rarity: "Common".into(),
                language: "EN".into(),
                edition: None,
                artwork_variant_id: None,
            })
            .unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[test]
    fn update_printing_reports_missing_ids() {
        let repo = repo();
        let set = seed_set(&repo, "MRD", "Metal Raiders");
        let update = PrintingUpdate {
            printing_id: 9999,
            set_id: set,
            card_number: "MRD-000".into(),
            rarity: "Common".into(),
            language: "EN".into(),
            edition: None,
        };
        assert!(!repo.update_printing(&update).unwrap());
    }

    #[test]
    fn list_sets_excludes_hidden_sets_and_counts_printings() {
        let repo = repo();
        let card = seed_card(&repo, "Gemini Elf");
        let visible = seed_set(&repo, "LON", "Labyrinth of Nightmare");
        seed_printing(&repo, card, visible, "LON-000");
        repo.conn
            .execute(
                "INSERT INTO sets (name, code, set_type) VALUES ('Internal', 'INT', 'hidden')",
                [],
            )
            .unwrap();

        let page = repo.list_sets(1, 20).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.sets.len(), 1);
        assert_eq!(page.sets[0].code, "LON");
        assert_eq!(page.sets[0].printing_count, 1);
    }

    #[test]
    fn sets_without_a_type_are_not_listed() {
        let repo = repo();
        seed_set(&repo, "LOB", "Legend of Blue Eyes");
        repo.conn
            .execute("INSERT INTO sets (name, code) VALUES ('Typeless', 'TPL')", [])
            .unwrap();

        let page = repo.list_sets(1, 20).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.sets.len(), 1);
        assert_eq!(page.sets[0].code, "LOB");
    }

    #[test]
    fn corrupt_status_rows_surface_as_errors() {
        let repo = repo();
        let card = seed_card(&repo, "Witch of the Black Forest");
        let set = seed_set(&repo, "MRD", "Metal Raiders");
        let printing = seed_printing(&repo, card, set, "MRD-116");
        repo.conn
            .execute(
                "INSERT INTO collection_items (printing_id, status, quantity)
                 VALUES (?1, 'Sold', 1)",
                [printing],
            )
            .unwrap();

        assert!(repo.collection_items(printing).is_err());
    }

    #[test]
    fn search_sets_matches_name_and_code() {
        let repo = repo();
        seed_set(&repo, "SDK", "Starter Deck Kaiba");
        seed_set(&repo, "SDY", "Starter Deck Yugi");
        seed_set(&repo, "MRL", "Magic Ruler");

        let by_name = repo.search_sets("Starter").unwrap();
        assert_eq!(by_name.len(), 2);
        let by_code = repo.search_sets("MRL").unwrap();
        assert_eq!(by_code.len(), 1);
        assert_eq!(by_code[0].name, "Magic Ruler");
    }
}
