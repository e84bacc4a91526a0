//! Concurrent enrichment across independent items
//!
//! Each item is enriched on its own blocking task. A failure is reported for
//! that item alone and never aborts the rest of the batch.

use crate::error::Error;
use crate::models::{EnrichConfig, EnrichedObservation, PriceObservation, SeriesKey, SocialUpdateEvent};
use crate::services::enricher::enrich;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of enriching one item
#[derive(Debug)]
pub struct ItemOutcome {
    pub key: SeriesKey,
    pub result: Result<Vec<EnrichedObservation>, Error>,
}

impl ItemOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Enrich every series concurrently; outcomes keep the input order
pub async fn enrich_batch(
    series: Vec<(SeriesKey, Vec<PriceObservation>)>,
    config: EnrichConfig,
    events: Vec<SocialUpdateEvent>,
) -> Vec<ItemOutcome> {
    let config = Arc::new(config);
    let events = Arc::new(events);

    let handles: Vec<_> = series
        .into_iter()
        .map(|(key, observations)| {
            let config = Arc::clone(&config);
            let events = Arc::clone(&events);
            let handle = tokio::task::spawn_blocking(move || enrich(key, &observations, &config, &events));
            (key, handle)
        })
        .collect();

    let mut outcomes = Vec::with_capacity(handles.len());
    for (key, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(Error::Other(format!("Enrichment task for {} failed: {}", key, e))),
        };

        if let Err(e) = &result {
            warn!("Skipping {}: {}", key, e);
        }
        outcomes.push(ItemOutcome { key, result });
    }

    let succeeded = outcomes.iter().filter(|o| o.is_ok()).count();
    info!("Enriched {}/{} series", succeeded, outcomes.len());

    outcomes
}
