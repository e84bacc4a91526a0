pub mod batch;
pub mod csv_export;
pub mod enricher;
pub mod feature_builder;
pub mod price_source;
pub mod social_aggregator;

pub use batch::{enrich_batch, ItemOutcome};
pub use csv_export::{export_enriched, export_features, export_path, export_time_series, ExportStats};
pub use enricher::{enrich, SeriesEnricher};
pub use feature_builder::{build_features, FeatureRow, FeatureTable};
pub use price_source::{resolve_item_ids, JsonDirSource, PriceSource};
pub use social_aggregator::{SocialTable, DEFAULT_DECAY_WINDOWS};
