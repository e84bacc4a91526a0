//! Series enrichment
//!
//! Turns the ordered price history of one item (or category) into enriched
//! observations carrying:
//! - First difference of the price (absent for the first observation)
//! - Moving average over the configured window
//! - Social update flag joined by nearest timestamp
//!
//! Enrichment is a pure function of its inputs: the same observations, config
//! and events always produce identical output.

use crate::error::Error;
use crate::models::indicators::{calculate_diff, calculate_sma};
use crate::models::{EnrichConfig, EnrichedObservation, PriceObservation, SeriesKey, SocialUpdateEvent};
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

/// Enriches price series with a fixed configuration
#[derive(Debug, Clone)]
pub struct SeriesEnricher {
    config: EnrichConfig,
}

impl SeriesEnricher {
    /// Create an enricher, rejecting invalid configuration up front
    pub fn new(config: EnrichConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EnrichConfig {
        &self.config
    }

    /// Enrich one series; see [`enrich`]
    pub fn enrich(
        &self,
        key: SeriesKey,
        observations: &[PriceObservation],
        events: &[SocialUpdateEvent],
    ) -> Result<Vec<EnrichedObservation>, Error> {
        enrich(key, observations, &self.config, events)
    }
}

/// Enrich an ordered price series
///
/// # Arguments
/// * `key` - Series the observations belong to, used to select social events
/// * `observations` - Prices with strictly increasing timestamps
/// * `config` - Window size, join tolerance and partial window policy
/// * `events` - Social updates in any order; events for other series are ignored
///
/// # Returns
/// * One enriched record per observation, in input order. An empty series
///   yields an empty result.
///
/// # Errors
/// * `InvalidInput` for a zero window, a negative tolerance, non-increasing
///   timestamps, or a negative or non-finite price
pub fn enrich(
    key: SeriesKey,
    observations: &[PriceObservation],
    config: &EnrichConfig,
    events: &[SocialUpdateEvent],
) -> Result<Vec<EnrichedObservation>, Error> {
    config.validate()?;
    validate_series(key, observations)?;

    if observations.is_empty() {
        return Ok(Vec::new());
    }

    let prices: Vec<f64> = observations.iter().map(|o| o.price).collect();
    let diffs = calculate_diff(&prices, 1);
    let moving_averages = calculate_sma(&prices, config.window_size, config.partial_window_policy);

    let social = SocialIndex::new(key, events);

    let enriched: Vec<EnrichedObservation> = observations
        .iter()
        .enumerate()
        .map(|(t, obs)| {
            let nearest = social.nearest_within(obs.timestamp, config.social_join_tolerance);
            EnrichedObservation {
                observation: obs.clone(),
                date: obs.date(),
                weekday: obs.is_weekday(),
                diff: diffs[t],
                moving_average: moving_averages[t],
                social_update: nearest.is_some(),
                social_description: nearest.map(|e| e.description.clone()),
            }
        })
        .collect();

    debug!(
        "Enriched {} observations for {} ({} social matches)",
        enriched.len(),
        key,
        enriched.iter().filter(|e| e.social_update).count()
    );

    Ok(enriched)
}

/// Check ordering and price invariants of a series
pub fn validate_series(key: SeriesKey, observations: &[PriceObservation]) -> Result<(), Error> {
    for (i, obs) in observations.iter().enumerate() {
        if !obs.price.is_finite() || obs.price < 0.0 {
            return Err(Error::InvalidInput(format!(
                "{}: price at index {} must be a non-negative number, got {}",
                key, i, obs.price
            )));
        }
        if i > 0 && obs.timestamp <= observations[i - 1].timestamp {
            return Err(Error::InvalidInput(format!(
                "{}: timestamps must be strictly increasing (index {} at {} follows {})",
                key,
                i,
                obs.timestamp,
                observations[i - 1].timestamp
            )));
        }
    }
    Ok(())
}

/// Social events applicable to one series, sorted by timestamp
struct SocialIndex<'a> {
    events: Vec<&'a SocialUpdateEvent>,
}

impl<'a> SocialIndex<'a> {
    fn new(key: SeriesKey, events: &'a [SocialUpdateEvent]) -> Self {
        let mut events: Vec<&SocialUpdateEvent> = events.iter().filter(|e| e.applies_to(key)).collect();
        // Stable sort keeps input order among equal timestamps
        events.sort_by_key(|e| e.timestamp);
        Self { events }
    }

    /// Nearest event with `|event - at| <= tolerance`; ties go to the earlier event
    fn nearest_within(&self, at: DateTime<Utc>, tolerance: Duration) -> Option<&'a SocialUpdateEvent> {
        let idx = self.events.partition_point(|e| e.timestamp < at);

        let before = idx.checked_sub(1).map(|i| self.events[i]);
        let after = self.events.get(idx).copied();

        let nearest = match (before, after) {
            (Some(b), Some(a)) => {
                if at - b.timestamp <= a.timestamp - at {
                    Some(b)
                } else {
                    Some(a)
                }
            }
            (Some(b), None) => Some(b),
            (None, Some(a)) => Some(a),
            (None, None) => None,
        }?;

        if (nearest.timestamp - at).abs() <= tolerance {
            Some(nearest)
        } else {
            None
        }
    }
}
