use crate::error::Error;
use crate::models::{EnrichConfig, EnrichedObservation, PartialWindowPolicy, PriceObservation, SeriesKey, SocialUpdateEvent};
use crate::services::{
    enrich_batch, export_enriched, export_path, export_time_series, ItemOutcome, JsonDirSource, PriceSource,
};
use crate::utils::{get_data_dir, get_export_dir};
use serde_json::json;
use std::path::PathBuf;

/// Arguments of the `enrich` command
pub struct EnrichArgs {
    pub items: Vec<u32>,
    pub categories: Vec<u32>,
    pub data_dir: Option<PathBuf>,
    pub window: usize,
    pub tolerance_hours: i64,
    pub policy: String,
    pub social: bool,
    pub output: Option<PathBuf>,
    pub json: bool,
    pub series_only: bool,
}

pub fn run(args: EnrichArgs) {
    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run_enrich(&args, config) {
        eprintln!("\n❌ Enrichment failed: {}", e);
        std::process::exit(1);
    }
}

fn build_config(args: &EnrichArgs) -> Result<EnrichConfig, Error> {
    let policy = PartialWindowPolicy::from_str(&args.policy).map_err(Error::InvalidInput)?;
    EnrichConfig::from_hours(args.window, args.tolerance_hours, policy)
}

/// Split batch outcomes into enriched series (input order kept) and a failure count
fn split_outcomes(outcomes: Vec<ItemOutcome>) -> (Vec<(SeriesKey, Vec<EnrichedObservation>)>, usize) {
    let mut enriched = Vec::with_capacity(outcomes.len());
    let mut failed = 0;
    for outcome in outcomes {
        match outcome.result {
            Ok(records) => enriched.push((outcome.key, records)),
            Err(e) => {
                eprintln!("⚠️  {} skipped: {}", outcome.key, e);
                failed += 1;
            }
        }
    }
    (enriched, failed)
}

fn run_enrich(args: &EnrichArgs, config: EnrichConfig) -> Result<(), Error> {
    let data_dir = args.data_dir.clone().unwrap_or_else(get_data_dir);
    println!("📁 Data directory: {}", data_dir.display());
    let source = JsonDirSource::new(data_dir);

    let series = super::load_requested_series(&source, &args.items, &args.categories)?;
    if series.is_empty() {
        return Err(Error::EmptySeries("None of the requested items has price history".to_string()));
    }

    let folder = args.output.clone().unwrap_or_else(get_export_dir);

    if args.series_only {
        let observations: Vec<PriceObservation> = series.into_iter().flat_map(|(_, obs)| obs).collect();
        let stats = export_time_series(&export_path(&folder), &observations)?;
        println!("\n✅ Time series written:");
        println!("   📈 Records:  {}", stats.records);
        println!("   💾 File:     {} ({} bytes)", stats.path.display(), stats.bytes_written);
        return Ok(());
    }

    let events: Vec<SocialUpdateEvent> = if args.social {
        source.social_posts()?.iter().map(|p| p.to_event()).collect()
    } else {
        Vec::new()
    };

    println!(
        "🔧 Enriching {} series (window={}, tolerance={}h, policy={:?}, social events={})",
        series.len(),
        config.window_size,
        args.tolerance_hours,
        config.partial_window_policy,
        events.len()
    );

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create runtime: {}", e)))?;
    let outcomes = runtime.block_on(enrich_batch(series, config, events));
    let (enriched, failed) = split_outcomes(outcomes);

    if args.json {
        let output: Vec<_> = enriched
            .iter()
            .map(|(key, records)| json!({ "series": key.to_string(), "records": records }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let records: Vec<EnrichedObservation> = enriched.into_iter().flat_map(|(_, records)| records).collect();
    let stats = export_enriched(&export_path(&folder), &records)?;

    println!("\n✅ Enrichment completed:");
    println!("   📈 Records:  {}", stats.records);
    println!("   ⚠️  Skipped:  {}", failed);
    println!("   💾 File:     {} ({} bytes)", stats.path.display(), stats.bytes_written);

    Ok(())
}
