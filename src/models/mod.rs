mod enrich_config;
mod observation;
mod series_key;
mod social;
pub mod indicators;

pub use enrich_config::{EnrichConfig, FeatureConfig, PartialWindowPolicy};
pub use observation::{EnrichedObservation, PriceObservation};
pub use series_key::{confirm_item_category, SeriesKey, MAX_CATEGORY_ID};
pub use social::{SocialPost, SocialUpdateEvent, UpdateFlags, UpdateKind};
