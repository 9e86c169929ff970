//! Import pipeline reconciling remote catalog snapshots against the local
//! store. Fetching and persistence are blocking; callers run a sync on a
//! dedicated thread and hold the repository for the whole run, which keeps
//! imports strictly sequential.

mod api;
mod progress;

use std::sync::OnceLock;
use std::time::Duration;

use tracing::{error, warn};

use crate::assets::{AssetCache, BUCKET_ALTERNATES, BUCKET_MAIN};
use crate::db::{
    is_unique_violation, CatalogRepository, DbError, NewArtwork, NewCard, NewPrinting, NewSet,
    PrintingRepository, RegistryRepository, SqliteRepository,
};

pub use api::{ApiCard, ApiCardImage, ApiMiscInfo, ApiPrintingEntry, ApiSet};
pub use api::{parse_card_snapshot, parse_set_snapshot};
pub use progress::{ProgressEvent, ProgressSink, CRITICAL_ERROR_MARKER, PROGRESS_INTERVAL};

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("remote returned HTTP {0}")]
    Http(u16),

    #[error("unexpected payload shape: {0}")]
    Shape(String),

    #[error("database error: {0}")]
    Database(#[from] DbError),
}

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub card_endpoint: String,
    pub set_endpoint: String,
    /// Pause between per-set detail fetches, to stay polite with the remote.
    pub set_delay: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            card_endpoint: "https://db.ygoprodeck.com/api/v7/cardinfo.php".into(),
            set_endpoint: "https://db.ygoprodeck.com/api/v7/cardsets.php".into(),
            set_delay: Duration::from_millis(50),
        }
    }
}

/// Outcome counters for one sync run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct SyncReport {
    pub imported: usize,
    pub skipped: usize,
    pub processed: usize,
}

pub struct CatalogImporter {
    options: SyncOptions,
    // Built lazily, on the blocking import thread.
    client: OnceLock<reqwest::blocking::Client>,
}

impl CatalogImporter {
    pub fn new(options: SyncOptions) -> Self {
        Self {
            options,
            client: OnceLock::new(),
        }
    }

    fn client(&self) -> &reqwest::blocking::Client {
        self.client.get_or_init(reqwest::blocking::Client::new)
    }

    fn fetch_text(&self, url: &str) -> Result<String, SyncError> {
        let response = self.client().get(url).send()?;
        if !response.status().is_success() {
            return Err(SyncError::Http(response.status().as_u16()));
        }
        Ok(response.text()?)
    }

    fn fetch_cards(&self) -> Result<Vec<ApiCard>, SyncError> {
        let body = self.fetch_text(&self.options.card_endpoint)?;
        api::parse_card_snapshot(&body)
    }

    fn fetch_sets(&self) -> Result<Vec<ApiSet>, SyncError> {
        let body = self.fetch_text(&self.options.set_endpoint)?;
        api::parse_set_snapshot(&body)
    }

    fn fetch_cards_in_set(&self, set_name: &str) -> Result<Vec<ApiCard>, SyncError> {
        let response = self
            .client()
            .get(&self.options.card_endpoint)
            .query(&[("cardset", set_name)])
            .send()?;
        if !response.status().is_success() {
            return Err(SyncError::Http(response.status().as_u16()));
        }
        api::parse_card_snapshot(&response.text()?)
    }

    /// Full card catalog sync: fetch the remote snapshot and import every
    /// card not yet present locally.
    pub fn sync_cards(
        &self,
        repo: &SqliteRepository,
        assets: &AssetCache,
        progress: &ProgressSink,
    ) -> Result<SyncReport, SyncError> {
        progress.send("Starting card catalog import...", None, None);
        progress.send("Fetching cards from the remote catalog...", None, None);
        let outcome = self
            .fetch_cards()
            .and_then(|cards| self.import_cards(repo, assets, &cards, progress));
        match outcome {
            Ok(report) => {
                progress.send(
                    format!(
                        "Import finished. {} new cards imported, {} skipped, {} processed.",
                        report.imported, report.skipped, report.processed
                    ),
                    Some(report.processed),
                    Some(report.processed),
                );
                Ok(report)
            }
            Err(e) => {
                progress.send(format!("{CRITICAL_ERROR_MARKER}: {e}"), None, None);
                Err(e)
            }
        }
    }

    /// Import an already-fetched card snapshot inside one transaction.
    ///
    /// Cards whose external id is already stored are skipped without
    /// touching the network or the asset cache. A uniqueness conflict on
    /// insert counts the card as skipped; any other per-card failure is
    /// logged and leaves the rest of the batch intact.
    pub fn import_cards(
        &self,
        repo: &SqliteRepository,
        assets: &AssetCache,
        cards: &[ApiCard],
        progress: &ProgressSink,
    ) -> Result<SyncReport, SyncError> {
        let total = cards.len();
        progress.send(
            format!("{total} cards in the remote snapshot."),
            Some(0),
            Some(total),
        );
        let existing = repo.existing_external_ids()?;
        progress.send(
            format!("{} cards already present locally.", existing.len()),
            None,
            None,
        );

        let mut report = SyncReport::default();
        repo.with_transaction(|repo| {
            for card in cards {
                report.processed += 1;
                if report.processed % PROGRESS_INTERVAL == 0 || report.processed == total {
                    progress.send(
                        format!("Processing: {} ({}/{})", card.name, report.processed, total),
                        Some(report.processed),
                        Some(total),
                    );
                }
                if existing.contains(&card.id) {
                    report.skipped += 1;
                    continue;
                }
                match import_one(repo, assets, card) {
                    Ok(()) => report.imported += 1,
                    Err(DbError::Sqlite(e)) if is_unique_violation(&e) => {
                        warn!(
                            "conflict importing {:?} (external id {}), counted as skipped",
                            card.name, card.id
                        );
                        report.skipped += 1;
                    }
                    Err(e) => {
                        error!(
                            "failed to import {:?} (external id {}): {e}",
                            card.name, card.id
                        );
                    }
                }
            }
            Ok(())
        })?;
        Ok(report)
    }

    /// Set and printing sync: refresh the set registry, then walk every set
    /// and register the printings of cards already in the catalog.
    pub fn sync_sets(
        &self,
        repo: &SqliteRepository,
        progress: &ProgressSink,
    ) -> Result<SyncReport, SyncError> {
        progress.send("Starting set and printing import...", None, None);
        match self.sync_sets_inner(repo, progress) {
            Ok(report) => {
                progress.send(
                    format!(
                        "Printing import finished. {} new printings, {} already known.",
                        report.imported, report.skipped
                    ),
                    Some(report.processed),
                    Some(report.processed),
                );
                Ok(report)
            }
            Err(e) => {
                progress.send(format!("{CRITICAL_ERROR_MARKER}: {e}"), None, None);
                Err(e)
            }
        }
    }

    fn sync_sets_inner(
        &self,
        repo: &SqliteRepository,
        progress: &ProgressSink,
    ) -> Result<SyncReport, SyncError> {
        progress.send("Fetching the full set list...", None, None);
        let sets = self.fetch_sets()?;
        let total = sets.len();
        progress.send(format!("{total} sets to process."), Some(0), Some(total));

        repo.with_transaction(|repo| {
            for set in &sets {
                repo.find_or_create_set(&NewSet {
                    name: set.set_name.clone(),
                    code: set.set_code.clone(),
                    release_date_tcg_na: set.tcg_date.clone(),
                    total_cards: set.num_of_cards,
                    set_type: "Unknown".to_string(),
                })?;
            }
            Ok(())
        })?;
        progress.send("Set registry updated.", None, None);

        let mut report = SyncReport::default();
        for set in &sets {
            report.processed += 1;
            progress.send(
                format!("Processing set: {}", set.set_name),
                Some(report.processed),
                Some(total),
            );

            let Some(set_id) = repo.find_set(&set.set_code, &set.set_name)? else {
                continue;
            };

            let cards = match self.fetch_cards_in_set(&set.set_name) {
                Ok(cards) => cards,
                Err(e) => {
                    // One unreachable or empty set never aborts the run.
                    warn!("skipping set {:?}: {e}", set.set_name);
                    continue;
                }
            };

            let result = repo.with_transaction(|repo| {
                for card in &cards {
                    let Some(card_id) = repo.card_id_by_external(card.id)? else {
                        continue;
                    };
                    let Some(entry) = card.card_sets.iter().find(|s| s.set_name == set.set_name)
                    else {
                        continue;
                    };
                    if repo
                        .find_printing(card_id, set_id, &entry.set_code, &entry.set_rarity)?
                        .is_some()
                    {
                        report.skipped += 1;
                        continue;
                    }
                    repo.create_printing(&NewPrinting {
                        card_id,
                        set_id,
                        card_number: entry.set_code.clone(),
                        rarity: entry.set_rarity.clone(),
                        language: "EN".to_string(),
                        edition: None,
                        artwork_variant_id: None,
                    })?;
                    report.imported += 1;
                }
                Ok(())
            });
            if let Err(e) = result {
                error!("failed to import printings for set {:?}: {e}", set.set_name);
            }

            std::thread::sleep(self.options.set_delay);
        }
        Ok(report)
    }
}

impl Default for CatalogImporter {
    fn default() -> Self {
        Self::new(SyncOptions::default())
    }
}

fn import_one(
    repo: &SqliteRepository,
    assets: &AssetCache,
    card: &ApiCard,
) -> Result<(), DbError> {
    let main_artwork_path = card
        .card_images
        .first()
        .and_then(|image| assets.fetch_and_cache(&image.image_url, &card.name, image.id, BUCKET_MAIN));
    let card_id = repo.insert_card(&map_card(card, main_artwork_path))?;

    if let Some(name) = card.archetype.as_deref() {
        if let Some(archetype_id) = repo.find_or_create_archetype(name)? {
            repo.link_card_archetype(card_id, archetype_id)?;
        }
    }

    // Cards with a single image only get the main artwork; variants are
    // registered when more than one image ships in the payload.
    if card.card_images.len() > 1 {
        for (index, image) in card.card_images.iter().enumerate() {
            let bucket = if index == 0 { BUCKET_MAIN } else { BUCKET_ALTERNATES };
            if let Some(path) = assets.fetch_and_cache(&image.image_url, &card.name, image.id, bucket)
            {
                repo.insert_alternate_artwork(&NewArtwork {
                    card_id,
                    name: artwork_display_name(image.id, index == 0),
                    image_path: path,
                    release_order: index as i64,
                })?;
            }
        }
    }
    Ok(())
}

fn artwork_display_name(asset_id: i64, primary: bool) -> String {
    if primary {
        format!("Artwork {asset_id} (primary)")
    } else {
        format!("Artwork {asset_id}")
    }
}

/// Map a remote card payload onto the local row shape. The passcode is the
/// first eight digits of the external id; level and link rating share one
/// column since a card never has both.
fn map_card(card: &ApiCard, main_artwork_path: Option<String>) -> NewCard {
    let type_lower = card.card_type.to_lowercase();
    let misc = card.misc_info.first();
    NewCard {
        name: card.name.clone(),
        localized_name: card.fname.clone(),
        external_id: Some(card.id),
        passcode: Some(card.id.to_string().chars().take(8).collect()),
        card_type: card.card_type.clone(),
        attribute: card.attribute.clone(),
        race: card.race.clone(),
        level_rank_link: card.level.or(card.linkval),
        atk: card.atk,
        def: card.def,
        scale: card.scale,
        description: card.desc.clone(),
        main_artwork_path,
        first_release_tcg: misc.and_then(|m| m.tcg_date.clone()),
        first_release_ocg: misc.and_then(|m| m.ocg_date.clone()),
        is_token: type_lower.contains("token"),
        is_skill_card: type_lower.contains("skill card"),
    }
}
