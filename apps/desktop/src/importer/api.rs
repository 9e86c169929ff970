//! Typed view of the remote catalog payloads.

use serde::Deserialize;

use super::SyncError;

#[derive(Debug, Clone, Deserialize)]
pub struct ApiCard {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub fname: Option<String>,
    #[serde(rename = "type")]
    pub card_type: String,
    #[serde(default)]
    pub attribute: Option<String>,
    #[serde(default)]
    pub race: Option<String>,
    #[serde(default)]
    pub level: Option<i64>,
    #[serde(default)]
    pub linkval: Option<i64>,
    #[serde(default)]
    pub atk: Option<i64>,
    #[serde(default)]
    pub def: Option<i64>,
    #[serde(default)]
    pub scale: Option<i64>,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub archetype: Option<String>,
    #[serde(default)]
    pub misc_info: Vec<ApiMiscInfo>,
    #[serde(default)]
    pub card_images: Vec<ApiCardImage>,
    #[serde(default)]
    pub card_sets: Vec<ApiPrintingEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiMiscInfo {
    #[serde(default)]
    pub tcg_date: Option<String>,
    #[serde(default)]
    pub ocg_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiCardImage {
    pub id: i64,
    pub image_url: String,
}

/// One set entry attached to a card payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiPrintingEntry {
    pub set_name: String,
    pub set_code: String,
    pub set_rarity: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSet {
    pub set_name: String,
    pub set_code: String,
    #[serde(default)]
    pub tcg_date: Option<String>,
    #[serde(default)]
    pub num_of_cards: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct CardSnapshot {
    data: Vec<ApiCard>,
}

/// Card payloads arrive wrapped in a `data` envelope.
pub fn parse_card_snapshot(body: &str) -> Result<Vec<ApiCard>, SyncError> {
    let snapshot: CardSnapshot =
        serde_json::from_str(body).map_err(|e| SyncError::Shape(e.to_string()))?;
    Ok(snapshot.data)
}

/// The set listing is a bare JSON array.
pub fn parse_set_snapshot(body: &str) -> Result<Vec<ApiSet>, SyncError> {
    serde_json::from_str(body).map_err(|e| SyncError::Shape(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_a_minimal_card_snapshot() {
        let body = r#"{"data":[{"id":46986414,"name":"Dark Magician","type":"Normal Monster",
            "desc":"The ultimate wizard.","atk":2500,"def":2100,"level":7,
            "race":"Spellcaster","attribute":"DARK"}]}"#;
        let cards = parse_card_snapshot(body).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].name, "Dark Magician");
        assert_eq!(cards[0].level, Some(7));
        assert!(cards[0].card_images.is_empty());
    }

    #[test]
    fn missing_envelope_is_a_shape_error() {
        let err = parse_card_snapshot(r#"[{"id":1}]"#).unwrap_err();
        assert!(matches!(err, SyncError::Shape(_)));
    }

    #[test]
    fn set_snapshot_is_a_bare_array() {
        let body = r#"[{"set_name":"Metal Raiders","set_code":"MRD",
            "tcg_date":"2002-06-26","num_of_cards":144}]"#;
        let sets = parse_set_snapshot(body).unwrap();
        assert_eq!(sets[0].set_code, "MRD");
        assert_eq!(sets[0].num_of_cards, Some(144));
    }
}
