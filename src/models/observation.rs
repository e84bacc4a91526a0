use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// A single Grand Exchange price point for one item
///
/// Wire format follows the Weird Gloop history endpoint:
/// `{"id": "4151", "price": 1500000, "volume": 12000, "timestamp": 1700000000000}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    /// Runescape item id
    #[serde(rename = "id", deserialize_with = "de_item_id")]
    pub item_id: u32,

    /// Observation time (unix milliseconds on the wire)
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    /// Price in coins
    pub price: f64,

    /// Traded volume, not reported for older history
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl PriceObservation {
    pub fn new(item_id: u32, timestamp: DateTime<Utc>, price: f64) -> Self {
        Self {
            item_id,
            timestamp,
            price,
            volume: None,
        }
    }

    pub fn with_volume(item_id: u32, timestamp: DateTime<Utc>, price: f64, volume: f64) -> Self {
        Self {
            item_id,
            timestamp,
            price,
            volume: Some(volume),
        }
    }

    /// Calendar date (UTC) of the observation
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// Monday through Friday
    pub fn is_weekday(&self) -> bool {
        !matches!(self.timestamp.weekday(), Weekday::Sat | Weekday::Sun)
    }
}

/// The API reports ids as strings ("4151") but older dumps use numbers
fn de_item_id<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Num(u32),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Num(n) => Ok(n),
        RawId::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Price observation with derived modeling features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedObservation {
    #[serde(flatten)]
    pub observation: PriceObservation,

    /// Calendar date (UTC)
    pub date: NaiveDate,

    /// Monday through Friday
    pub weekday: bool,

    /// price[t] - price[t-1], absent for the first observation
    pub diff: Option<f64>,

    /// Rolling mean of the configured window, absent only when withheld
    pub moving_average: Option<f64>,

    /// A social update for this series lies within the join tolerance
    pub social_update: bool,

    /// Description of the nearest matching social update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_deserialize_string_id() {
        let json = r#"{"id": "4151", "price": 1500000, "volume": 12000, "timestamp": 1700000000000}"#;
        let obs: PriceObservation = serde_json::from_str(json).unwrap();
        assert_eq!(obs.item_id, 4151);
        assert_eq!(obs.price, 1_500_000.0);
        assert_eq!(obs.volume, Some(12000.0));
        assert_eq!(obs.timestamp.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_deserialize_numeric_id_without_volume() {
        let json = r#"{"id": 2, "price": 250, "timestamp": 1700000000000}"#;
        let obs: PriceObservation = serde_json::from_str(json).unwrap();
        assert_eq!(obs.item_id, 2);
        assert_eq!(obs.volume, None);
    }

    #[test]
    fn test_weekday() {
        // 2024-01-06 is a Saturday, 2024-01-08 a Monday
        let saturday = PriceObservation::new(1, Utc.with_ymd_and_hms(2024, 1, 6, 0, 0, 0).unwrap(), 1.0);
        let monday = PriceObservation::new(1, Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap(), 1.0);
        assert!(!saturday.is_weekday());
        assert!(monday.is_weekday());
        assert_eq!(monday.date(), NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
    }
}
