//! Asset file naming and the artwork display-id codec.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Lowercase a display name and replace anything outside `[a-z0-9_.-]`
/// with `_`, producing a filesystem-safe stem.
pub fn sanitize_asset_name(name: &str) -> String {
    name.chars()
        .map(|c| c.to_ascii_lowercase())
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Deterministic cache file name for an external asset.
///
/// The external asset id makes the name unique; the same id always maps to
/// the same file, which is what makes the cache idempotent.
pub fn asset_file_name(display_name: &str, asset_id: i64, extension: &str) -> String {
    format!("{}_{}{}", sanitize_asset_name(display_name), asset_id, extension)
}

/// Synthetic identity of one displayable artwork.
///
/// Rendered as `main:<cardId>` or `alt:<cardId>:<artworkId>`; the
/// presentation layer treats it as an opaque selection key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtworkKey {
    Main { card_id: i64 },
    Alternate { card_id: i64, artwork_id: i64 },
}

impl fmt::Display for ArtworkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Main { card_id } => write!(f, "main:{card_id}"),
            Self::Alternate {
                card_id,
                artwork_id,
            } => write!(f, "alt:{card_id}:{artwork_id}"),
        }
    }
}

impl FromStr for ArtworkKey {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseError::MalformedKey(s.to_string());
        let mut parts = s.split(':');
        match parts.next() {
            Some("main") => {
                let card_id = parts
                    .next()
                    .and_then(|v| v.parse().ok())
                    .ok_or_else(malformed)?;
                if parts.next().is_some() {
                    return Err(malformed());
                }
                Ok(Self::Main { card_id })
            }
            Some("alt") => {
                let card_id = parts
                    .next()
                    .and_then(|v| v.parse().ok())
                    .ok_or_else(malformed)?;
                let artwork_id = parts
                    .next()
                    .and_then(|v| v.parse().ok())
                    .ok_or_else(malformed)?;
                if parts.next().is_some() {
                    return Err(malformed());
                }
                Ok(Self::Alternate {
                    card_id,
                    artwork_id,
                })
            }
            _ => Err(malformed()),
        }
    }
}
