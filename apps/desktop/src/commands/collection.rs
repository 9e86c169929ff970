//! Collection editing commands.

use serde::Serialize;
use tracing::{error, warn};

use cardvault_core::types::{CollectionItem, CollectionItemInput, CollectionStatus};

use crate::db::{CollectionDetails, CollectionRepository};
use crate::state::AppState;

use super::OpResult;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct QuantityResult {
    pub success: bool,
    pub quantity: i64,
}

pub async fn list_collection_items(state: &AppState, printing_id: i64) -> Vec<CollectionItem> {
    let repo = state.repository.lock().expect("repository lock");
    repo.collection_items(printing_id).unwrap_or_else(|e| {
        warn!("failed to list collection items for printing {printing_id}: {e}");
        Vec::new()
    })
}

/// Replace the stored rows of a printing with the desired list: rows with a
/// known id are updated, unknown ids are inserted, stored rows missing from
/// the list (or flagged for deletion) are removed. All of it in one
/// transaction.
pub async fn reconcile_collection_items(
    state: &AppState,
    printing_id: i64,
    items: Vec<CollectionItemInput>,
) -> OpResult {
    if printing_id <= 0 {
        return OpResult::fail("Invalid printing id.");
    }
    if items.iter().any(|item| item.quantity < 0) {
        return OpResult::fail("Quantities must be zero or positive.");
    }
    let repo = state.repository.lock().expect("repository lock");
    match repo.reconcile_items(printing_id, &items) {
        Ok(()) => OpResult::ok("Collection saved."),
        Err(e) => {
            error!("failed to reconcile collection for printing {printing_id}: {e}");
            OpResult::fail(format!("Database error: {e}"))
        }
    }
}

/// Single-step quantity change. The delta is restricted to one unit in
/// either direction; quantities never go below zero.
pub async fn adjust_quantity(
    state: &AppState,
    printing_id: i64,
    status: CollectionStatus,
    delta: i64,
) -> QuantityResult {
    if printing_id <= 0 || !matches!(delta, -1 | 1) {
        return QuantityResult {
            success: false,
            quantity: 0,
        };
    }
    let repo = state.repository.lock().expect("repository lock");
    match repo.adjust_quantity(printing_id, status, delta) {
        Ok(quantity) => QuantityResult {
            success: true,
            quantity,
        },
        Err(e) => {
            error!("failed to adjust quantity for printing {printing_id}: {e}");
            QuantityResult {
                success: false,
                quantity: 0,
            }
        }
    }
}

pub async fn update_collection_item_details(
    state: &AppState,
    printing_id: i64,
    status: CollectionStatus,
    details: CollectionDetails,
) -> OpResult {
    if printing_id <= 0 {
        return OpResult::fail("Invalid printing id.");
    }
    let repo = state.repository.lock().expect("repository lock");
    match repo.update_item_details(printing_id, status, &details) {
        Ok(None) => OpResult::fail("No item to update. Change the quantity first."),
        Ok(Some(true)) => OpResult::ok("Details saved."),
        Ok(Some(false)) => OpResult::fail("No modification detected."),
        Err(e) => {
            error!("failed to update details for printing {printing_id}: {e}");
            OpResult::fail(format!("Database error: {e}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{app_state, owned_item, seed_card, seed_printing, seed_set};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn invalid_printing_ids_are_rejected() {
        let state = app_state();
        let result = reconcile_collection_items(&state, 0, vec![owned_item(1)]).await;
        assert!(!result.success);

        let result = adjust_quantity(&state, -5, CollectionStatus::Owned, 1).await;
        assert!(!result.success);
    }

    #[tokio::test]
    async fn deltas_beyond_one_unit_are_rejected() {
        let state = app_state();
        let result = adjust_quantity(&state, 1, CollectionStatus::Owned, 3).await;
        assert!(!result.success);
    }

    #[tokio::test]
    async fn negative_quantities_are_rejected_before_storage() {
        let state = app_state();
        let mut item = owned_item(1);
        item.quantity = -2;
        let result = reconcile_collection_items(&state, 1, vec![item]).await;
        assert!(!result.success);
    }

    #[tokio::test]
    async fn quantity_round_trip_through_the_envelope() {
        let state = app_state();
        let printing = {
            let repo = state.repository.lock().unwrap();
            let card = seed_card(&repo, "Sangan");
            let set = seed_set(&repo, "MRD", "Metal Raiders");
            seed_printing(&repo, card, set, "MRD-069")
        };

        let up = adjust_quantity(&state, printing, CollectionStatus::Owned, 1).await;
        assert!(up.success);
        assert_eq!(up.quantity, 1);

        let down = adjust_quantity(&state, printing, CollectionStatus::Owned, -1).await;
        assert!(down.success);
        assert_eq!(down.quantity, 0);
        assert!(list_collection_items(&state, printing).await.is_empty());
    }

    #[tokio::test]
    async fn details_without_a_row_ask_for_a_quantity_first() {
        let state = app_state();
        let printing = {
            let repo = state.repository.lock().unwrap();
            let card = seed_card(&repo, "Kuriboh");
            let set = seed_set(&repo, "MRD", "Metal Raiders");
            seed_printing(&repo, card, set, "MRD-071")
        };

        let result = update_collection_item_details(
            &state,
            printing,
            CollectionStatus::Owned,
            CollectionDetails::default(),
        )
        .await;
        assert!(!result.success);
        assert!(result.message.contains("quantity"));
    }
}
