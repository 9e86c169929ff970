//! Printing management commands.

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::db::{
    DbError, NewPrinting, NewSet, PrintingRepository, PrintingRow, PrintingUpdate,
    RegistryRepository,
};
use crate::state::AppState;

use super::OpResult;

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePrintingRequest {
    pub card_id: i64,
    pub set_code: String,
    #[serde(default)]
    pub set_name: Option<String>,
    pub card_number: String,
    pub rarity: String,
    pub language: String,
    #[serde(default)]
    pub edition: Option<String>,
    #[serde(default)]
    pub artwork_variant_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatePrintingResult {
    pub success: bool,
    pub message: String,
    pub new_printing_id: Option<i64>,
}

impl CreatePrintingResult {
    fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            new_printing_id: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePrintingRequest {
    pub printing_id: i64,
    pub set_id: i64,
    pub card_number: String,
    pub rarity: String,
    pub language: String,
    #[serde(default)]
    pub edition: Option<String>,
}

pub async fn list_printings_for_card(state: &AppState, card_id: i64) -> Vec<PrintingRow> {
    let repo = state.repository.lock().expect("repository lock");
    repo.printings_for_card(card_id).unwrap_or_else(|e| {
        warn!("failed to list printings for card {card_id}: {e}");
        Vec::new()
    })
}

/// Create a printing, registering the set on the fly when the code is not
/// yet known. Unknown codes require a set name.
pub async fn create_printing(state: &AppState, request: CreatePrintingRequest) -> CreatePrintingResult {
    if request.card_id <= 0
        || request.set_code.trim().is_empty()
        || request.card_number.trim().is_empty()
        || request.rarity.trim().is_empty()
        || request.language.trim().is_empty()
    {
        return CreatePrintingResult::fail("Missing required fields to create the printing.");
    }

    let repo = state.repository.lock().expect("repository lock");
    let set_id = match repo.find_set_by_code(request.set_code.trim()) {
        Ok(Some(id)) => id,
        Ok(None) => {
            let Some(name) = request
                .set_name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
            else {
                return CreatePrintingResult::fail("A set name is required to register a new set.");
            };
            match repo.find_or_create_set(&NewSet {
                name: name.to_string(),
                code: request.set_code.trim().to_string(),
                release_date_tcg_na: None,
                total_cards: None,
                set_type: "Unknown".to_string(),
            }) {
                Ok(id) => id,
                Err(e) => {
                    error!("failed to register set {:?}: {e}", request.set_code);
                    return CreatePrintingResult::fail(format!("Database error: {e}"));
                }
            }
        }
        Err(e) => {
            error!("failed to look up set {:?}: {e}", request.set_code);
            return CreatePrintingResult::fail(format!("Database error: {e}"));
        }
    };

    let printing = NewPrinting {
        card_id: request.card_id,
        set_id,
        card_number: request.card_number.trim().to_string(),
        rarity: request.rarity.trim().to_string(),
        language: request.language.trim().to_string(),
        edition: request.edition.clone(),
        artwork_variant_id: request.artwork_variant_id,
    };
    match repo.create_printing(&printing) {
        Ok(id) => CreatePrintingResult {
            success: true,
            message: "Printing created.".into(),
            new_printing_id: Some(id),
        },
        Err(e) if e.is_unique_violation() => {
            CreatePrintingResult::fail("This printing (same set, number, rarity) already exists.")
        }
        Err(DbError::InvalidData(message)) => CreatePrintingResult::fail(message),
        Err(e) => {
            error!("failed to create printing: {e}");
            CreatePrintingResult::fail(format!("Database error: {e}"))
        }
    }
}

pub async fn update_printing(state: &AppState, request: UpdatePrintingRequest) -> OpResult {
    if request.printing_id <= 0
        || request.set_id <= 0
        || request.card_number.trim().is_empty()
        || request.rarity.trim().is_empty()
        || request.language.trim().is_empty()
    {
        return OpResult::fail("Missing required fields to update the printing.");
    }
    let repo = state.repository.lock().expect("repository lock");
    let update = PrintingUpdate {
        printing_id: request.printing_id,
        set_id: request.set_id,
        card_number: request.card_number.trim().to_string(),
        rarity: request.rarity.trim().to_string(),
        language: request.language.trim().to_string(),
        edition: request.edition.clone(),
    };
    match repo.update_printing(&update) {
        Ok(true) => OpResult::ok("Printing updated."),
        Ok(false) => OpResult::fail("No printing found with this id."),
        Err(e) => {
            error!("failed to update printing {}: {e}", request.printing_id);
            OpResult::fail(format!("Database error: {e}"))
        }
    }
}

/// Deleting a printing also removes its collection rows through the
/// cascade.
pub async fn delete_printing(state: &AppState, printing_id: i64) -> OpResult {
    if printing_id <= 0 {
        return OpResult::fail("Invalid printing id.");
    }
    let repo = state.repository.lock().expect("repository lock");
    match repo.delete_printing(printing_id) {
        Ok(true) => OpResult::ok("Printing deleted."),
        Ok(false) => OpResult::fail("No printing found with this id."),
        Err(e) => {
            error!("failed to delete printing {printing_id}: {e}");
            OpResult::fail(format!("Database error: {e}"))
        }
    }
}

/// Bind a printing to one of its card's alternate artworks, or back to the
/// main artwork with `None`.
pub async fn link_printing_artwork(
    state: &AppState,
    printing_id: i64,
    artwork_id: Option<i64>,
) -> OpResult {
    if printing_id <= 0 {
        return OpResult::fail("Invalid printing id.");
    }
    let repo = state.repository.lock().expect("repository lock");
    match repo.link_artwork(printing_id, artwork_id) {
        Ok(true) => OpResult::ok("Artwork linked."),
        Ok(false) => OpResult::fail("No printing found with this id."),
        Err(DbError::InvalidData(message)) => OpResult::fail(message),
        Err(e) => {
            error!("failed to link artwork for printing {printing_id}: {e}");
            OpResult::fail(format!("Database error: {e}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{app_state, seed_card, seed_set};
    use pretty_assertions::assert_eq;

    fn valid_request(card_id: i64) -> CreatePrintingRequest {
        CreatePrintingRequest {
            card_id,
            set_code: "MRD".into(),
            set_name: Some("Metal Raiders".into()),
            card_number: "MRD-003".into(),
            rarity: "Ultra Rare".into(),
            language: "EN".into(),
            edition: None,
            artwork_variant_id: None,
        }
    }

    #[tokio::test]
    async fn missing_fields_fail_before_storage() {
        let state = app_state();
        let mut request = valid_request(1);
        request.card_number = "  ".into();
        let result = create_printing(&state, request).await;
        assert!(!result.success);
        assert_eq!(result.new_printing_id, None);
    }

    #[tokio::test]
    async fn unknown_set_code_without_a_name_is_rejected() {
        let state = app_state();
        let card = {
            let repo = state.repository.lock().unwrap();
            seed_card(&repo, "Summoned Skull")
        };
        let mut request = valid_request(card);
        request.set_name = None;
        let result = create_printing(&state, request).await;
        assert!(!result.success);
        assert!(result.message.contains("set name"));
    }

    #[tokio::test]
    async fn creating_registers_the_set_on_the_fly() {
        let state = app_state();
        let card = {
            let repo = state.repository.lock().unwrap();
            seed_card(&repo, "Summoned Skull")
        };
        let result = create_printing(&state, valid_request(card)).await;
        assert!(result.success, "{}", result.message);
        assert!(result.new_printing_id.is_some());

        let printings = list_printings_for_card(&state, card).await;
        assert_eq!(printings.len(), 1);
        assert_eq!(printings[0].set_code, "MRD");
    }

    #[tokio::test]
    async fn duplicate_printings_fail_with_a_clear_message() {
        let state = app_state();
        let card = {
            let repo = state.repository.lock().unwrap();
            seed_card(&repo, "Summoned Skull")
        };
        let first = create_printing(&state, valid_request(card)).await;
        assert!(first.success);
        let second = create_printing(&state, valid_request(card)).await;
        assert!(!second.success);
        assert!(second.message.contains("already exists"));
    }

    #[tokio::test]
    async fn updating_a_missing_printing_reports_not_found() {
        let state = app_state();
        let set = {
            let repo = state.repository.lock().unwrap();
            seed_set(&repo, "MRD", "Metal Raiders")
        };
        let result = update_printing(
            &state,
            UpdatePrintingRequest {
                printing_id: 424242,
                set_id: set,
                card_number: "MRD-000".into(),
                rarity: "Common".into(),
                language: "EN".into(),
                edition: None,
            },
        )
        .await;
        assert!(!result.success);
        assert!(result.message.contains("No printing"));
    }
}
