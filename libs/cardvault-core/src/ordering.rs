//! Deterministic gallery ordering.
//!
//! Encodes the browsing convention of the source game: normal monsters first,
//! ascending through effect variants, extra-deck monsters, spells, traps and
//! finally skill cards and tokens. Ties break on level, attack, defense, name
//! and artwork path so a page renders identically across fetches.

use std::cmp::Ordering;

use crate::types::ArtworkRow;

/// Numeric rank for a named card type. Unrecognized types sort last.
pub fn card_type_rank(card_type: &str) -> u32 {
    match card_type {
        "Normal Monster" => 1,
        "Normal Tuner Monster" => 2,
        "Pendulum Normal Monster" => 3,
        "Ritual Monster" => 10,
        "Ritual Effect Monster" => 11,
        "Flip Effect Monster" => 20,
        "Toon Monster" => 21,
        "Spirit Monster" => 22,
        "Union Effect Monster" => 23,
        "Gemini Monster" => 24,
        "Tuner Monster" => 25,
        "Pendulum Effect Monster" => 26,
        "Pendulum Flip Effect Monster" => 27,
        "Pendulum Tuner Effect Monster" => 28,
        "Effect Monster" => 29,
        "Fusion Monster" => 100,
        "Pendulum Effect Fusion Monster" => 101,
        "Synchro Monster" => 110,
        "Synchro Tuner Monster" => 111,
        "Synchro Pendulum Effect Monster" => 112,
        "XYZ Monster" => 120,
        "XYZ Pendulum Effect Monster" => 121,
        "Link Monster" => 130,
        "Spell Card" => 200,
        "Continuous Spell Card" => 201,
        "Equip Spell Card" => 202,
        "Field Spell Card" => 203,
        "Quick-Play Spell Card" => 204,
        "Ritual Spell Card" => 205,
        "Trap Card" => 300,
        "Continuous Trap Card" => 301,
        "Counter Trap Card" => 302,
        "Skill Card" => 400,
        "Token" => 401,
        _ => 999,
    }
}

/// The `-1` sentinel means "unknown/variable" and sorts as the maximum;
/// a missing stat sorts below zero.
fn stat_sort_value(stat: Option<i64>) -> i64 {
    match stat {
        Some(-1) => 9999,
        Some(v) => v,
        None => -2,
    }
}

/// Defense grouping: unknown defense first, then real/missing values, with
/// link monsters always grouped as if they had no defense, after the rest.
fn def_class(card_type: &str, def: Option<i64>) -> u8 {
    if card_type.contains("Link Monster") {
        2
    } else if def == Some(-1) {
        0
    } else {
        1
    }
}

/// Total order over gallery rows. Applied identically regardless of filters.
pub fn compare_artwork_rows(a: &ArtworkRow, b: &ArtworkRow) -> Ordering {
    card_type_rank(&a.card_type)
        .cmp(&card_type_rank(&b.card_type))
        .then_with(|| {
            b.level_rank_link
                .unwrap_or(-1)
                .cmp(&a.level_rank_link.unwrap_or(-1))
        })
        .then_with(|| stat_sort_value(b.atk).cmp(&stat_sort_value(a.atk)))
        .then_with(|| def_class(&a.card_type, a.def).cmp(&def_class(&b.card_type, b.def)))
        .then_with(|| stat_sort_value(b.def).cmp(&stat_sort_value(a.def)))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.artwork_path.cmp(&b.artwork_path))
}
