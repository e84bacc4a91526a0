pub mod enrich;
pub mod features;
pub mod inspect;

use crate::error::Error;
use crate::models::{PriceObservation, SeriesKey};
use crate::services::{resolve_item_ids, PriceSource};

/// Resolve requested ids and load each item's history
///
/// Items without data are reported and skipped.
pub(crate) fn load_requested_series(
    source: &dyn PriceSource,
    items: &[u32],
    categories: &[u32],
) -> Result<Vec<(SeriesKey, Vec<PriceObservation>)>, Error> {
    let item_ids = resolve_item_ids(source, items, categories)?;
    if item_ids.is_empty() {
        return Err(Error::InvalidInput(
            "No items requested: pass --items and/or --categories".to_string(),
        ));
    }

    println!("📥 Loading price history for {} items...", item_ids.len());

    let mut series = Vec::with_capacity(item_ids.len());
    for item_id in item_ids {
        match source.price_history(item_id) {
            Ok(observations) => series.push((SeriesKey::Item(item_id), observations)),
            Err(e) => eprintln!("⚠️  Skipping item {}: {}", item_id, e),
        }
    }
    Ok(series)
}
