//! Shared fixtures for in-memory store tests.

use tokio::sync::broadcast;

use cardvault_core::types::{CollectionItemInput, CollectionStatus};

use crate::assets::AssetCache;
use crate::db::{
    CatalogRepository, NewCard, NewPrinting, NewSet, PrintingRepository, RegistryRepository,
    SqliteRepository,
};
use crate::importer::{ApiCard, ProgressSink};
use crate::state::AppState;

pub(crate) fn repo() -> SqliteRepository {
    SqliteRepository::open_in_memory().unwrap()
}

pub(crate) fn app_state() -> AppState {
    let dir = tempfile::tempdir().unwrap();
    AppState::new(repo(), AssetCache::new(dir.keep()))
}

pub(crate) fn progress_sink() -> ProgressSink {
    let (tx, _rx) = broadcast::channel(16);
    ProgressSink::new(tx)
}

pub(crate) fn card(name: &str) -> NewCard {
    NewCard {
        name: name.to_string(),
        localized_name: None,
        external_id: None,
        passcode: None,
        card_type: "Effect Monster".to_string(),
        attribute: Some("DARK".to_string()),
        race: Some("Fiend".to_string()),
        level_rank_link: Some(4),
        atk: Some(1200),
        def: Some(1000),
        scale: None,
        description: "A test card.".to_string(),
        main_artwork_path: Some(format!(
            "card_images/artworks_main/{}_1.jpg",
            name.to_lowercase().replace(' ', "_")
        )),
        first_release_tcg: None,
        first_release_ocg: None,
        is_token: false,
        is_skill_card: false,
    }
}

pub(crate) fn seed_card(repo: &SqliteRepository, name: &str) -> i64 {
    repo.insert_card(&card(name)).unwrap()
}

pub(crate) fn seed_set(repo: &SqliteRepository, code: &str, name: &str) -> i64 {
    repo.find_or_create_set(&NewSet {
        name: name.to_string(),
        code: code.to_string(),
        release_date_tcg_na: None,
        total_cards: None,
        set_type: "Booster".to_string(),
    })
    .unwrap()
}

pub(crate) fn seed_printing(
    repo: &SqliteRepository,
    card_id: i64,
    set_id: i64,
    card_number: &str,
) -> i64 {
    repo.create_printing(&NewPrinting {
        card_id,
        set_id,
        card_number: card_number.to_string(),
        rarity: "Common".to_string(),
        language: "EN".to_string(),
        edition: None,
        artwork_variant_id: None,
    })
    .unwrap()
}

pub(crate) fn owned_item(quantity: i64) -> CollectionItemInput {
    CollectionItemInput {
        id: 0,
        delete: false,
        status: CollectionStatus::Owned,
        quantity,
        condition: Some("Near Mint".to_string()),
        storage_location: None,
        acquisition_date: None,
        acquisition_price: None,
        notes: None,
    }
}

pub(crate) fn api_card(id: i64, name: &str) -> ApiCard {
    ApiCard {
        id,
        name: name.to_string(),
        fname: None,
        card_type: "Effect Monster".to_string(),
        attribute: Some("DARK".to_string()),
        race: Some("Fiend".to_string()),
        level: Some(4),
        linkval: None,
        atk: Some(1200),
        def: Some(1000),
        scale: None,
        desc: "A test card.".to_string(),
        archetype: None,
        misc_info: Vec::new(),
        card_images: Vec::new(),
        card_sets: Vec::new(),
    }
}
