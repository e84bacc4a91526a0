use crate::error::Error;
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// How moving averages behave before a full window of prices exists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartialWindowPolicy {
    /// Average whatever prefix is available (t < W-1 uses t+1 prices)
    #[default]
    ComputeOverPrefix,
    /// Leave the moving average empty until W prices exist
    Withhold,
}

impl PartialWindowPolicy {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "prefix" | "compute_over_prefix" => Ok(PartialWindowPolicy::ComputeOverPrefix),
            "withhold" => Ok(PartialWindowPolicy::Withhold),
            _ => Err(format!("Invalid partial window policy: {}. Valid options: prefix, withhold", s)),
        }
    }
}

/// Configuration for a single-series enrichment run
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichConfig {
    /// Moving average window, must be at least 1
    pub window_size: usize,

    /// Maximum distance between an observation and a social event for them to
    /// be joined; the boundary is inclusive
    pub social_join_tolerance: Duration,

    pub partial_window_policy: PartialWindowPolicy,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            window_size: 7,
            social_join_tolerance: Duration::hours(12),
            partial_window_policy: PartialWindowPolicy::ComputeOverPrefix,
        }
    }
}

impl EnrichConfig {
    pub fn new(window_size: usize, social_join_tolerance: Duration, partial_window_policy: PartialWindowPolicy) -> Self {
        Self {
            window_size,
            social_join_tolerance,
            partial_window_policy,
        }
    }

    /// Build a config from a tolerance in whole hours, rejecting values chrono
    /// cannot represent
    pub fn from_hours(
        window_size: usize,
        tolerance_hours: i64,
        partial_window_policy: PartialWindowPolicy,
    ) -> Result<Self, Error> {
        let social_join_tolerance = Duration::try_hours(tolerance_hours).ok_or_else(|| {
            Error::InvalidInput(format!(
                "social_join_tolerance of {} hours is out of range",
                tolerance_hours
            ))
        })?;
        let config = Self::new(window_size, social_join_tolerance, partial_window_policy);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.window_size < 1 {
            return Err(Error::InvalidInput(format!(
                "window_size must be >= 1, got {}",
                self.window_size
            )));
        }
        if self.social_join_tolerance < Duration::zero() {
            return Err(Error::InvalidInput(format!(
                "social_join_tolerance must not be negative, got {}",
                self.social_join_tolerance
            )));
        }
        Ok(())
    }
}

/// Configuration for the multi-lag feature table
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureConfig {
    /// Lags for `diff_{k}` columns
    pub diff_lags: Vec<usize>,

    /// Windows for `ma_{w}` and `diff_ma_{w}` columns
    pub ma_windows: Vec<usize>,

    /// Drop rows with missing lag diffs or a flat moving average
    pub drop_unclean: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            diff_lags: vec![1, 7, 14, 30],
            ma_windows: vec![7, 14, 30],
            drop_unclean: true,
        }
    }
}

impl FeatureConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(lag) = self.diff_lags.iter().find(|lag| **lag == 0) {
            return Err(Error::InvalidInput(format!("diff lag must be >= 1, got {}", lag)));
        }
        if let Some(window) = self.ma_windows.iter().find(|w| **w == 0) {
            return Err(Error::InvalidInput(format!("moving average window must be >= 1, got {}", window)));
        }
        Ok(())
    }

    /// Parse a comma-separated list of positive integers ("1,7,14,30")
    pub fn parse_list(s: &str) -> Result<Vec<usize>, String> {
        s.split(',')
            .map(|part| {
                part.trim()
                    .parse::<usize>()
                    .map_err(|e| format!("Invalid number '{}': {}", part.trim(), e))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_str() {
        assert_eq!(PartialWindowPolicy::from_str("prefix").unwrap(), PartialWindowPolicy::ComputeOverPrefix);
        assert_eq!(PartialWindowPolicy::from_str("WITHHOLD").unwrap(), PartialWindowPolicy::Withhold);
        assert!(PartialWindowPolicy::from_str("drop").is_err());
    }

    #[test]
    fn test_enrich_config_default() {
        let config = EnrichConfig::default();
        assert_eq!(config.window_size, 7);
        assert_eq!(config.partial_window_policy, PartialWindowPolicy::ComputeOverPrefix);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_enrich_config_rejects_zero_window() {
        let config = EnrichConfig { window_size: 0, ..EnrichConfig::default() };
        assert!(matches!(config.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_enrich_config_rejects_negative_tolerance() {
        let config = EnrichConfig {
            social_join_tolerance: Duration::seconds(-1),
            ..EnrichConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_hours() {
        let config = EnrichConfig::from_hours(3, 24, PartialWindowPolicy::Withhold).unwrap();
        assert_eq!(config.window_size, 3);
        assert_eq!(config.social_join_tolerance, Duration::hours(24));
        assert_eq!(config.partial_window_policy, PartialWindowPolicy::Withhold);
    }

    #[test]
    fn test_from_hours_rejects_out_of_range_tolerance() {
        let result = EnrichConfig::from_hours(7, i64::MAX / 2, PartialWindowPolicy::ComputeOverPrefix);
        assert!(matches!(result, Err(Error::InvalidInput(_))));

        let result = EnrichConfig::from_hours(7, -1, PartialWindowPolicy::ComputeOverPrefix);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_feature_config() {
        let config = FeatureConfig::default();
        assert_eq!(config.diff_lags, vec![1, 7, 14, 30]);
        assert!(config.validate().is_ok());

        let bad = FeatureConfig { ma_windows: vec![7, 0], ..FeatureConfig::default() };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(FeatureConfig::parse_list("1, 7,14").unwrap(), vec![1, 7, 14]);
        assert!(FeatureConfig::parse_list("1,x").is_err());
    }
}
