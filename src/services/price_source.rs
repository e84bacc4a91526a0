//! Raw data input boundary
//!
//! Price history, social posts and the item catalogue are read from JSON
//! documents laid out on disk in the shapes the Weird Gloop and Runescape
//! catalogue endpoints return:
//!
//! ```text
//! <dir>/prices/<item_id>.json   {"4151": [{"id": "4151", "price": .., "volume": .., "timestamp": ..}]}
//! <dir>/social/page-<n>.json    {"data": [{"title": .., "dateAdded": ..}], "pagination": {"has_more": bool}}
//! <dir>/catalogue.json          {"0": [item ids], "1": [...], ...}
//! ```

use crate::error::Error;
use crate::models::{confirm_item_category, PriceObservation, SocialPost};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Upper bound on social pages followed through `has_more`
pub const MAX_SOCIAL_PAGES: usize = 100;

/// Item ids per catalogue category
pub type Catalogue = BTreeMap<u8, Vec<u32>>;

/// Supplies raw observations and social posts
pub trait PriceSource {
    /// Ordered price history of one item
    ///
    /// Fails with `EmptySeries` when the item has no observations.
    fn price_history(&self, item_id: u32) -> Result<Vec<PriceObservation>, Error>;

    /// Every social post, in feed order
    fn social_posts(&self) -> Result<Vec<SocialPost>, Error>;

    /// Category to item id mapping
    fn catalogue(&self) -> Result<Catalogue, Error>;

    /// Items with stored price history
    fn available_items(&self) -> Result<Vec<u32>, Error>;
}

#[derive(Debug, Deserialize)]
struct SocialPage {
    data: Vec<SocialPost>,
    pagination: Pagination,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    has_more: bool,
}

/// Parse a price history document and return the series for `item_id` in
/// document order
///
/// Out-of-order timestamps are logged and left in place; enrichment rejects
/// such a series with `InvalidInput`.
pub fn parse_price_history(json: &str, item_id: u32) -> Result<Vec<PriceObservation>, Error> {
    let mut doc: HashMap<String, Vec<PriceObservation>> = serde_json::from_str(json)
        .map_err(|e| Error::Parse(format!("Failed to parse price history for item {}: {}", item_id, e)))?;

    let mut observations = doc.remove(&item_id.to_string()).unwrap_or_default();
    if observations.is_empty() {
        return Err(Error::EmptySeries(format!("No price observations for item {}", item_id)));
    }

    if let Some(pos) = observations.windows(2).position(|w| w[1].timestamp <= w[0].timestamp) {
        warn!(
            "Price history for item {} is not strictly increasing at index {}",
            item_id,
            pos + 1
        );
    }
    Ok(observations)
}

/// Reads raw data from a directory of JSON documents
#[derive(Debug, Clone)]
pub struct JsonDirSource {
    root: PathBuf,
}

impl JsonDirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn prices_dir(&self) -> PathBuf {
        self.root.join("prices")
    }

    fn read(&self, path: &Path) -> Result<String, Error> {
        std::fs::read_to_string(path).map_err(|e| Error::Io(format!("Failed to read {}: {}", path.display(), e)))
    }
}

impl PriceSource for JsonDirSource {
    fn price_history(&self, item_id: u32) -> Result<Vec<PriceObservation>, Error> {
        let path = self.prices_dir().join(format!("{}.json", item_id));
        if !path.exists() {
            return Err(Error::EmptySeries(format!(
                "No price history for item {} ({} not found)",
                item_id,
                path.display()
            )));
        }

        let observations = parse_price_history(&self.read(&path)?, item_id)?;
        debug!("Loaded {} observations for item {}", observations.len(), item_id);
        Ok(observations)
    }

    fn social_posts(&self) -> Result<Vec<SocialPost>, Error> {
        let social_dir = self.root.join("social");
        let mut posts = Vec::new();

        for page in 1..=MAX_SOCIAL_PAGES {
            let path = social_dir.join(format!("page-{}.json", page));
            if !path.exists() {
                if page == 1 {
                    info!("No social feed found in {}", social_dir.display());
                    return Ok(posts);
                }
                return Err(Error::Io(format!(
                    "Social page {} announced by has_more but {} is missing",
                    page,
                    path.display()
                )));
            }

            let doc: SocialPage = serde_json::from_str(&self.read(&path)?)
                .map_err(|e| Error::Parse(format!("Failed to parse {}: {}", path.display(), e)))?;
            posts.extend(doc.data);

            if !doc.pagination.has_more {
                break;
            }
            if page == MAX_SOCIAL_PAGES {
                warn!("Stopped reading social feed after {} pages", MAX_SOCIAL_PAGES);
            }
        }

        info!("Loaded {} social posts", posts.len());
        Ok(posts)
    }

    fn catalogue(&self) -> Result<Catalogue, Error> {
        let path = self.root.join("catalogue.json");
        if !path.exists() {
            return Ok(Catalogue::new());
        }

        let raw: BTreeMap<String, Vec<u32>> = serde_json::from_str(&self.read(&path)?)
            .map_err(|e| Error::Parse(format!("Failed to parse {}: {}", path.display(), e)))?;

        let mut catalogue = Catalogue::new();
        for (category, items) in raw {
            let id: u32 = category
                .trim()
                .parse()
                .map_err(|e| Error::Parse(format!("Invalid category key '{}': {}", category, e)))?;
            catalogue.insert(confirm_item_category(id)?, items);
        }
        Ok(catalogue)
    }

    fn available_items(&self) -> Result<Vec<u32>, Error> {
        let dir = self.prices_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let entries = std::fs::read_dir(&dir)
            .map_err(|e| Error::Io(format!("Failed to read {}: {}", dir.display(), e)))?;

        let mut items = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(id) = path.file_stem().and_then(|s| s.to_str()).and_then(|s| s.parse().ok()) {
                items.push(id);
            }
        }
        items.sort_unstable();
        Ok(items)
    }
}

/// Union of individually requested items and every item of the requested
/// categories, sorted and deduplicated
pub fn resolve_item_ids(source: &dyn PriceSource, items: &[u32], categories: &[u32]) -> Result<Vec<u32>, Error> {
    let mut all: BTreeSet<u32> = items.iter().copied().collect();

    if !categories.is_empty() {
        let catalogue = source.catalogue()?;
        for category in categories {
            let id = confirm_item_category(*category)?;
            match catalogue.get(&id) {
                Some(members) => all.extend(members.iter().copied()),
                None => warn!("Category {} has no items in the catalogue", id),
            }
        }
    }

    Ok(all.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EnrichConfig, SeriesKey};
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, contents: &str) {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_parse_price_history() {
        let json = r#"{"4151": [
            {"id": "4151", "price": 10, "volume": 5, "timestamp": 1704067200000},
            {"id": "4151", "price": 20, "timestamp": 1704153600000}
        ]}"#;
        let obs = parse_price_history(json, 4151).unwrap();
        assert_eq!(obs.len(), 2);
        assert_eq!(obs[0].price, 10.0);
        assert_eq!(obs[0].volume, Some(5.0));
        assert_eq!(obs[1].price, 20.0);
    }

    #[test]
    fn test_parse_price_history_keeps_unsorted_order() {
        let json = r#"{"4151": [
            {"id": "4151", "price": 20, "timestamp": 1704153600000},
            {"id": "4151", "price": 10, "timestamp": 1704067200000}
        ]}"#;
        let obs = parse_price_history(json, 4151).unwrap();
        assert_eq!(obs[0].price, 20.0);
        assert_eq!(obs[1].price, 10.0);

        let result = crate::services::enrich(SeriesKey::Item(4151), &obs, &EnrichConfig::default(), &[]);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_parse_price_history_missing_item() {
        let result = parse_price_history(r#"{"1": []}"#, 4151);
        assert!(matches!(result, Err(Error::EmptySeries(_))));
    }

    #[test]
    fn test_parse_price_history_malformed() {
        assert!(matches!(parse_price_history("not json", 1), Err(Error::Parse(_))));
    }

    #[test]
    fn test_json_dir_source_prices() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "prices/2.json",
            r#"{"2": [{"id": "2", "price": 250, "timestamp": 1704067200000}]}"#,
        );
        write(tmp.path(), "prices/notes.txt", "ignored");

        let source = JsonDirSource::new(tmp.path());
        assert_eq!(source.price_history(2).unwrap().len(), 1);
        assert!(matches!(source.price_history(3), Err(Error::EmptySeries(_))));
        assert_eq!(source.available_items().unwrap(), vec![2]);
    }

    #[test]
    fn test_social_pagination() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "social/page-1.json",
            r#"{"data": [{"title": "Boss", "dateAdded": "2024-01-01T00:00:00Z"}], "pagination": {"has_more": true}}"#,
        );
        write(
            tmp.path(),
            "social/page-2.json",
            r#"{"data": [{"title": null, "dateAdded": "2024-01-02T00:00:00Z"}], "pagination": {"has_more": false}}"#,
        );
        // Never read because page 2 ends the feed
        write(tmp.path(), "social/page-3.json", "garbage");

        let posts = JsonDirSource::new(tmp.path()).social_posts().unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[1].title, None);
    }

    #[test]
    fn test_social_missing_announced_page() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "social/page-1.json",
            r#"{"data": [], "pagination": {"has_more": true}}"#,
        );
        assert!(JsonDirSource::new(tmp.path()).social_posts().is_err());
    }

    #[test]
    fn test_social_absent_feed() {
        let tmp = TempDir::new().unwrap();
        assert!(JsonDirSource::new(tmp.path()).social_posts().unwrap().is_empty());
    }

    #[test]
    fn test_resolve_item_ids() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "catalogue.json", r#"{"1": [30, 10], "2": [20, 5]}"#);
        let source = JsonDirSource::new(tmp.path());

        let ids = resolve_item_ids(&source, &[10, 99], &[1, 2, 3]).unwrap();
        assert_eq!(ids, vec![5, 10, 20, 30, 99]);

        let result = resolve_item_ids(&source, &[], &[44]);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_catalogue_rejects_bad_category() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "catalogue.json", r#"{"50": [1]}"#);
        assert!(JsonDirSource::new(tmp.path()).catalogue().is_err());
    }
}
