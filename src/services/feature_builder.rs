//! Multi-lag feature tables
//!
//! Builds per-item feature tables for time series models:
//! - `diff_{k}`: price difference at each configured lag
//! - `ma_{w}`: moving average at each configured window (prefix policy)
//! - `diff_ma_{w}`: day-over-day change of each moving average
//!
//! Rows whose moving averages have not moved yet are most likely still on the
//! initial exchange-set price and are dropped by the clean filter.

use crate::error::Error;
use crate::models::indicators::{calculate_diff, calculate_diff_opt, calculate_sma};
use crate::models::{FeatureConfig, PartialWindowPolicy, PriceObservation, SeriesKey};
use crate::services::enricher::validate_series;
use crate::services::social_aggregator::{DailySocialRow, SocialTable};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

/// One feature row per retained observation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    pub observation: PriceObservation,
    pub date: NaiveDate,
    pub weekday: bool,
    /// Values aligned with `FeatureTable::columns`
    pub values: Vec<Option<f64>>,
    /// Social features for the row's calendar date, if joined
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social: Option<DailySocialRow>,
}

/// Feature table for one or more items
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureTable {
    pub columns: Vec<String>,
    pub rows: Vec<FeatureRow>,
    /// Decayed social column names, empty until social features are joined
    pub social_columns: Vec<String>,
}

impl FeatureTable {
    /// Column index by name
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Values of one column across all rows
    pub fn column_values(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.column(name)?;
        Some(self.rows.iter().map(|r| r.values[idx]).collect())
    }

    /// Append another table built with the same config
    pub fn extend(&mut self, other: FeatureTable) -> Result<(), Error> {
        if self.columns.is_empty() && self.rows.is_empty() {
            *self = other;
            return Ok(());
        }
        if self.columns != other.columns {
            return Err(Error::InvalidInput(format!(
                "Cannot merge feature tables with different columns: {:?} vs {:?}",
                self.columns, other.columns
            )));
        }
        self.rows.extend(other.rows);
        Ok(())
    }

    /// Left join daily social features by calendar date
    pub fn attach_social(&mut self, social: &SocialTable) {
        self.social_columns = social.decay_columns.clone();
        for row in &mut self.rows {
            row.social = social.get(row.date).cloned();
        }
    }

    /// Distinct calendar dates present in the table, sorted
    pub fn dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.rows.iter().map(|r| r.date).collect();
        dates.sort();
        dates.dedup();
        dates
    }
}

/// Column names produced by a config, in output order
pub fn feature_columns(config: &FeatureConfig) -> Vec<String> {
    let mut columns = Vec::new();
    columns.extend(config.diff_lags.iter().map(|k| format!("diff_{}", k)));
    columns.extend(config.ma_windows.iter().map(|w| format!("ma_{}", w)));
    columns.extend(config.ma_windows.iter().map(|w| format!("diff_ma_{}", w)));
    columns
}

/// Build the feature table for one item's ordered price history
pub fn build_features(
    key: SeriesKey,
    observations: &[PriceObservation],
    config: &FeatureConfig,
) -> Result<FeatureTable, Error> {
    config.validate()?;
    validate_series(key, observations)?;

    let columns = feature_columns(config);
    let prices: Vec<f64> = observations.iter().map(|o| o.price).collect();

    let diffs: Vec<Vec<Option<f64>>> = config
        .diff_lags
        .iter()
        .map(|lag| calculate_diff(&prices, *lag))
        .collect();
    let mas: Vec<Vec<Option<f64>>> = config
        .ma_windows
        .iter()
        .map(|w| calculate_sma(&prices, *w, PartialWindowPolicy::ComputeOverPrefix))
        .collect();
    let diff_mas: Vec<Vec<Option<f64>>> = mas.iter().map(|ma| calculate_diff_opt(ma)).collect();

    let mut rows = Vec::with_capacity(observations.len());
    for (t, obs) in observations.iter().enumerate() {
        let diff_values: Vec<Option<f64>> = diffs.iter().map(|d| d[t]).collect();
        let diff_ma_values: Vec<Option<f64>> = diff_mas.iter().map(|d| d[t]).collect();

        if config.drop_unclean && !is_clean(&diff_values, &diff_ma_values) {
            continue;
        }

        let mut values = diff_values;
        values.extend(mas.iter().map(|ma| ma[t]));
        values.extend(diff_ma_values);

        rows.push(FeatureRow {
            observation: obs.clone(),
            date: obs.date(),
            weekday: obs.is_weekday(),
            values,
            social: None,
        });
    }

    debug!(
        "Built {} feature rows for {} ({} dropped)",
        rows.len(),
        key,
        observations.len() - rows.len()
    );

    Ok(FeatureTable {
        columns,
        rows,
        social_columns: Vec::new(),
    })
}

/// All lag diffs present, all moving average changes present and non-zero
fn is_clean(diffs: &[Option<f64>], diff_mas: &[Option<f64>]) -> bool {
    diffs.iter().all(Option::is_some) && diff_mas.iter().all(|d| matches!(d, Some(v) if *v != 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn series(prices: &[f64]) -> Vec<PriceObservation> {
        prices
            .iter()
            .enumerate()
            .map(|(i, p)| {
                PriceObservation::new(
                    2,
                    Utc.timestamp_millis_opt(1_704_067_200_000 + i as i64 * 86_400_000).unwrap(),
                    *p,
                )
            })
            .collect()
    }

    fn small_config(drop_unclean: bool) -> FeatureConfig {
        FeatureConfig {
            diff_lags: vec![1, 2],
            ma_windows: vec![2],
            drop_unclean,
        }
    }

    #[test]
    fn test_feature_columns() {
        let columns = feature_columns(&FeatureConfig::default());
        assert_eq!(
            columns,
            vec![
                "diff_1", "diff_7", "diff_14", "diff_30", "ma_7", "ma_14", "ma_30", "diff_ma_7", "diff_ma_14",
                "diff_ma_30"
            ]
        );
    }

    #[test]
    fn test_build_features_without_filter() {
        let table = build_features(SeriesKey::Item(2), &series(&[10.0, 20.0, 30.0, 40.0]), &small_config(false)).unwrap();
        assert_eq!(table.rows.len(), 4);
        assert_eq!(table.column_values("diff_1").unwrap(), vec![None, Some(10.0), Some(10.0), Some(10.0)]);
        assert_eq!(table.column_values("diff_2").unwrap(), vec![None, None, Some(20.0), Some(20.0)]);
        assert_eq!(table.column_values("ma_2").unwrap(), vec![Some(10.0), Some(15.0), Some(25.0), Some(35.0)]);
        assert_eq!(table.column_values("diff_ma_2").unwrap(), vec![None, Some(5.0), Some(10.0), Some(10.0)]);
    }

    #[test]
    fn test_clean_filter_drops_short_history() {
        let table = build_features(SeriesKey::Item(2), &series(&[10.0, 20.0, 30.0, 40.0]), &small_config(true)).unwrap();
        // First two rows miss diff_2
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].observation.price, 30.0);
    }

    #[test]
    fn test_clean_filter_drops_flat_moving_average() {
        // Initial exchange price held for several days before trading starts
        let table = build_features(
            SeriesKey::Item(2),
            &series(&[100.0, 100.0, 100.0, 100.0, 110.0, 120.0]),
            &small_config(true),
        )
        .unwrap();
        let prices: Vec<f64> = table.rows.iter().map(|r| r.observation.price).collect();
        assert_eq!(prices, vec![110.0, 120.0]);
    }

    #[test]
    fn test_rejects_zero_lag() {
        let config = FeatureConfig {
            diff_lags: vec![0],
            ..FeatureConfig::default()
        };
        let result = build_features(SeriesKey::Item(2), &series(&[1.0]), &config);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_extend_requires_same_columns() {
        let a = build_features(SeriesKey::Item(2), &series(&[1.0, 2.0]), &small_config(false)).unwrap();
        let b = build_features(SeriesKey::Item(2), &series(&[1.0, 2.0]), &FeatureConfig::default()).unwrap();

        let mut merged = FeatureTable::default();
        merged.extend(a.clone()).unwrap();
        merged.extend(a).unwrap();
        assert_eq!(merged.rows.len(), 4);
        assert!(merged.extend(b).is_err());
    }

    #[test]
    fn test_attach_social() {
        let mut table = build_features(SeriesKey::Item(2), &series(&[1.0, 2.0, 3.0]), &small_config(false)).unwrap();
        let social = SocialTable::build(&[], &[table.rows[0].date, table.rows[1].date], &[7]);
        table.attach_social(&social);

        assert_eq!(table.social_columns.len(), 6);
        assert!(table.rows[0].social.is_some());
        assert!(table.rows[1].social.is_some());
        // Third date lies outside the social table
        assert!(table.rows[2].social.is_none());
        assert_eq!(table.dates().len(), 3);
    }
}
