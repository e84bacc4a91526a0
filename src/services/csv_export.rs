//! CSV export of enriched series and feature tables
//!
//! Absent values are written as empty cells. Prices and averages use two
//! decimals, decayed social features four.

use crate::error::Error;
use crate::models::{EnrichedObservation, PriceObservation, UpdateKind};
use crate::services::feature_builder::FeatureTable;
use chrono::{NaiveDate, Utc};
use csv::Writer;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Statistics for an export operation
#[derive(Debug)]
pub struct ExportStats {
    pub path: PathBuf,
    pub records: usize,
    pub bytes_written: u64,
}

/// `ge-prices-YYYY-MM-DD.csv` for the given day
pub fn export_filename(date: NaiveDate) -> String {
    format!("ge-prices-{}.csv", date.format("%Y-%m-%d"))
}

/// Path of today's export file inside `folder`
pub fn export_path(folder: &Path) -> PathBuf {
    folder.join(export_filename(Utc::now().date_naive()))
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    value.map_or(String::new(), |v| format!("{:.*}", precision, v))
}

fn fmt_bool(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

fn observation_fields(obs: &PriceObservation) -> [String; 4] {
    [
        obs.item_id.to_string(),
        obs.timestamp.timestamp_millis().to_string(),
        format!("{:.2}", obs.price),
        fmt_opt(obs.volume, 0),
    ]
}

/// Write enriched observations to any writer
pub fn write_enriched<W: Write>(writer: W, records: &[EnrichedObservation]) -> Result<usize, Error> {
    let mut writer = Writer::from_writer(writer);

    writer.write_record([
        "id",
        "timestamp",
        "price",
        "volume",
        "date",
        "weekday",
        "diff",
        "moving_average",
        "social_update",
        "social_description",
    ])?;

    for record in records {
        let [id, timestamp, price, volume] = observation_fields(&record.observation);
        writer.write_record([
            id,
            timestamp,
            price,
            volume,
            record.date.format("%Y-%m-%d").to_string(),
            fmt_bool(record.weekday).to_string(),
            fmt_opt(record.diff, 2),
            fmt_opt(record.moving_average, 2),
            fmt_bool(record.social_update).to_string(),
            record.social_description.clone().unwrap_or_default(),
        ])?;
    }

    writer.flush()?;
    Ok(records.len())
}

/// Write the stripped `(id, price, date)` series to any writer
pub fn write_time_series<W: Write>(writer: W, observations: &[PriceObservation]) -> Result<usize, Error> {
    let mut writer = Writer::from_writer(writer);

    writer.write_record(["id", "price", "date"])?;
    for obs in observations {
        writer.write_record([
            obs.item_id.to_string(),
            format!("{:.2}", obs.price),
            obs.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(observations.len())
}

/// Write a feature table to any writer
///
/// Social flag and decay columns are only written once social features have
/// been attached to the table.
pub fn write_features<W: Write>(writer: W, table: &FeatureTable) -> Result<usize, Error> {
    let mut writer = Writer::from_writer(writer);
    let with_social = !table.social_columns.is_empty();

    let mut header: Vec<String> = ["id", "timestamp", "price", "volume", "date", "weekday"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    header.extend(table.columns.iter().cloned());
    if with_social {
        header.extend(UpdateKind::ALL.iter().map(|k| k.column().to_string()));
        header.extend(table.social_columns.iter().cloned());
    }
    writer.write_record(&header)?;

    for row in &table.rows {
        let mut fields: Vec<String> = observation_fields(&row.observation).into();
        fields.push(row.date.format("%Y-%m-%d").to_string());
        fields.push(fmt_bool(row.weekday).to_string());
        fields.extend(row.values.iter().map(|v| fmt_opt(*v, 2)));

        if with_social {
            match &row.social {
                Some(social) => {
                    fields.extend(UpdateKind::ALL.iter().map(|k| fmt_bool(social.flags.get(*k)).to_string()));
                    fields.extend(social.decayed.iter().map(|v| format!("{:.4}", v)));
                }
                None => {
                    fields.extend(std::iter::repeat(String::new()).take(UpdateKind::ALL.len() + table.social_columns.len()));
                }
            }
        }

        writer.write_record(&fields)?;
    }

    writer.flush()?;
    Ok(table.rows.len())
}

fn create_export_file(path: &Path) -> Result<std::fs::File, Error> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::Io(format!("Failed to create {}: {}", parent.display(), e)))?;
    }
    std::fs::File::create(path).map_err(|e| Error::Io(format!("Failed to create {}: {}", path.display(), e)))
}

fn finish(path: &Path, records: usize) -> ExportStats {
    let bytes_written = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    info!("Exported {} records to {} ({} bytes)", records, path.display(), bytes_written);
    ExportStats {
        path: path.to_path_buf(),
        records,
        bytes_written,
    }
}

/// Export enriched observations to `path`
pub fn export_enriched(path: &Path, records: &[EnrichedObservation]) -> Result<ExportStats, Error> {
    let file = create_export_file(path)?;
    let count = write_enriched(file, records)?;
    Ok(finish(path, count))
}

/// Export the stripped `(id, price, date)` series to `path`
pub fn export_time_series(path: &Path, observations: &[PriceObservation]) -> Result<ExportStats, Error> {
    let file = create_export_file(path)?;
    let count = write_time_series(file, observations)?;
    Ok(finish(path, count))
}

/// Export a feature table to `path`
pub fn export_features(path: &Path, table: &FeatureTable) -> Result<ExportStats, Error> {
    let file = create_export_file(path)?;
    let count = write_features(file, table)?;
    Ok(finish(path, count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EnrichConfig, FeatureConfig, SeriesKey, SocialUpdateEvent};
    use crate::services::enricher::enrich;
    use crate::services::feature_builder::build_features;
    use crate::services::social_aggregator::SocialTable;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn series() -> Vec<PriceObservation> {
        vec![
            PriceObservation::with_volume(4151, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(), 10.0, 300.0),
            PriceObservation::new(4151, Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(), 12.5),
        ]
    }

    #[test]
    fn test_export_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(export_filename(date), "ge-prices-2024-03-09.csv");
    }

    #[test]
    fn test_write_enriched() {
        let events = vec![SocialUpdateEvent::global(
            Utc.with_ymd_and_hms(2024, 1, 2, 1, 0, 0).unwrap(),
            "Boss, part 2",
        )];
        let records = enrich(SeriesKey::Item(4151), &series(), &EnrichConfig::default(), &events).unwrap();

        let mut buf = Vec::new();
        assert_eq!(write_enriched(&mut buf, &records).unwrap(), 2);
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "id,timestamp,price,volume,date,weekday,diff,moving_average,social_update,social_description"
        );
        assert_eq!(lines[1], "4151,1704067200000,10.00,300,2024-01-01,1,,10.00,0,");
        assert_eq!(lines[2], "4151,1704153600000,12.50,,2024-01-02,1,2.50,11.25,1,\"Boss, part 2\"");
    }

    #[test]
    fn test_write_time_series() {
        let mut buf = Vec::new();
        assert_eq!(write_time_series(&mut buf, &series()).unwrap(), 2);
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines, vec!["id,price,date", "4151,10.00,2024-01-01 00:00:00", "4151,12.50,2024-01-02 00:00:00"]);
    }

    #[test]
    fn test_write_features_with_social() {
        let config = FeatureConfig {
            diff_lags: vec![1],
            ma_windows: vec![2],
            drop_unclean: false,
        };
        let mut table = build_features(SeriesKey::Item(4151), &series(), &config).unwrap();
        table.attach_social(&SocialTable::build(&[], &table.dates(), &[7]));

        let mut buf = Vec::new();
        write_features(&mut buf, &table).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("id,timestamp,price,volume,date,weekday,diff_1,ma_2,diff_ma_2,launch_update"));
        assert!(lines[0].ends_with("general_update_7_ma"));
        assert_eq!(lines.len(), 3);
        let header_len = lines[0].split(',').count();
        assert_eq!(lines[1].split(',').count(), header_len);
    }

    #[test]
    fn test_export_enriched_creates_folder() {
        let tmp = TempDir::new().unwrap();
        let records = enrich(SeriesKey::Item(4151), &series(), &EnrichConfig::default(), &[]).unwrap();
        let path = export_path(&tmp.path().join("nested"));

        let stats = export_enriched(&path, &records).unwrap();
        assert_eq!(stats.records, 2);
        assert!(stats.bytes_written > 0);
        assert!(path.exists());
    }
}
