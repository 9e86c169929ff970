//! SQLite schema for the local catalog and collection store.
//!
//! Tables are created idempotently on startup. Singleton numeric stats on
//! cards use `-1` as the marker for "unknown" (e.g. `atk` of a card whose
//! value is `?`), while `NULL` means the stat does not apply at all.

pub const SCHEMA: &str = "
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS cards (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    localized_name TEXT,
    external_id INTEGER UNIQUE,
    passcode TEXT,
    card_type TEXT NOT NULL,
    attribute TEXT,
    race TEXT,
    level_rank_link INTEGER,
    atk INTEGER,
    def INTEGER,
    scale INTEGER,
    description TEXT NOT NULL,
    main_artwork_path TEXT,
    first_release_tcg TEXT,
    first_release_ocg TEXT,
    is_token INTEGER NOT NULL DEFAULT 0,
    is_skill_card INTEGER NOT NULL DEFAULT 0,
    is_collectible_only INTEGER NOT NULL DEFAULT 0,
    is_exclusive_media INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS archetypes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS card_archetypes (
    card_id INTEGER NOT NULL,
    archetype_id INTEGER NOT NULL,
    PRIMARY KEY (card_id, archetype_id),
    FOREIGN KEY (card_id) REFERENCES cards(id) ON DELETE CASCADE,
    FOREIGN KEY (archetype_id) REFERENCES archetypes(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS sets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    code TEXT NOT NULL,
    release_date_tcg_na TEXT,
    release_date_tcg_eu TEXT,
    release_date_ocg TEXT,
    total_cards INTEGER,
    set_type TEXT
);

CREATE TABLE IF NOT EXISTS alternate_artworks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    card_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    image_path TEXT NOT NULL,
    release_order INTEGER,
    UNIQUE (card_id, name),
    FOREIGN KEY (card_id) REFERENCES cards(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS printings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    card_id INTEGER NOT NULL,
    set_id INTEGER NOT NULL,
    card_number TEXT NOT NULL,
    rarity TEXT NOT NULL,
    edition TEXT,
    language TEXT NOT NULL,
    artwork_variant_id INTEGER,
    errata_version INTEGER NOT NULL DEFAULT 0,
    image_path_override TEXT,
    price_eur REAL,
    price_usd REAL,
    FOREIGN KEY (card_id) REFERENCES cards(id) ON DELETE CASCADE,
    FOREIGN KEY (set_id) REFERENCES sets(id) ON DELETE CASCADE,
    FOREIGN KEY (artwork_variant_id) REFERENCES alternate_artworks(id) ON DELETE SET NULL
);

CREATE TABLE IF NOT EXISTS collection_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    printing_id INTEGER NOT NULL,
    status TEXT NOT NULL,
    quantity INTEGER NOT NULL DEFAULT 1,
    condition TEXT,
    storage_location TEXT,
    acquisition_date TEXT,
    acquisition_price REAL,
    notes TEXT,
    FOREIGN KEY (printing_id) REFERENCES printings(id) ON DELETE CASCADE
);

-- Secondary taxonomy and history tables. Carried by the store for
-- completeness; the core flows never write them.
CREATE TABLE IF NOT EXISTS card_errata (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    card_id INTEGER NOT NULL,
    errata_date TEXT,
    description TEXT,
    FOREIGN KEY (card_id) REFERENCES cards(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS characters (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS card_character_usage (
    card_id INTEGER NOT NULL,
    character_id INTEGER NOT NULL,
    PRIMARY KEY (card_id, character_id),
    FOREIGN KEY (card_id) REFERENCES cards(id) ON DELETE CASCADE,
    FOREIGN KEY (character_id) REFERENCES characters(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS banlists (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    format TEXT,
    effective_date TEXT
);

CREATE TABLE IF NOT EXISTS banlist_cards (
    banlist_id INTEGER NOT NULL,
    card_id INTEGER NOT NULL,
    restriction TEXT NOT NULL,
    PRIMARY KEY (banlist_id, card_id),
    FOREIGN KEY (banlist_id) REFERENCES banlists(id) ON DELETE CASCADE,
    FOREIGN KEY (card_id) REFERENCES cards(id) ON DELETE CASCADE
);

-- NULL columns would make every row distinct in a plain UNIQUE constraint,
-- so the identity of a printing is enforced through coalesced expressions.
CREATE UNIQUE INDEX IF NOT EXISTS idx_printings_identity
    ON printings(set_id, card_number, language, rarity,
                 COALESCE(edition, ''), COALESCE(artwork_variant_id, 0),
                 errata_version);

CREATE INDEX IF NOT EXISTS idx_cards_external_id ON cards(external_id);
CREATE INDEX IF NOT EXISTS idx_cards_card_type ON cards(card_type);
CREATE INDEX IF NOT EXISTS idx_printings_card_id ON printings(card_id);
CREATE INDEX IF NOT EXISTS idx_printings_set_id ON printings(set_id);
CREATE INDEX IF NOT EXISTS idx_alternate_artworks_card_id ON alternate_artworks(card_id);
CREATE INDEX IF NOT EXISTS idx_collection_items_printing_id ON collection_items(printing_id);
";
