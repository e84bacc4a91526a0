use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest Runescape 3 catalogue category id
pub const MAX_CATEGORY_ID: u8 = 43;

/// Identifies the series a set of observations or social events belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKey {
    Item(u32),
    Category(u8),
}

impl SeriesKey {
    /// Build a category key, rejecting ids outside the catalogue
    pub fn category(id: u32) -> Result<Self, Error> {
        Ok(SeriesKey::Category(confirm_item_category(id)?))
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesKey::Item(id) => write!(f, "item:{}", id),
            SeriesKey::Category(id) => write!(f, "category:{}", id),
        }
    }
}

/// Verify a catalogue category id (0..=43)
pub fn confirm_item_category(id: u32) -> Result<u8, Error> {
    if id > MAX_CATEGORY_ID as u32 {
        return Err(Error::InvalidInput(format!(
            "Unsupported category id {}: categories must be between 0 and {}, inclusive",
            id, MAX_CATEGORY_ID
        )));
    }
    Ok(id as u8)
}
