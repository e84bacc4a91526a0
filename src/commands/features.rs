use crate::error::Error;
use crate::models::FeatureConfig;
use crate::services::{
    build_features, export_features, export_path, FeatureTable, JsonDirSource, PriceSource, SocialTable,
    DEFAULT_DECAY_WINDOWS,
};
use crate::utils::{get_data_dir, get_export_dir};
use std::path::PathBuf;

/// Arguments of the `features` command
pub struct FeaturesArgs {
    pub items: Vec<u32>,
    pub categories: Vec<u32>,
    pub data_dir: Option<PathBuf>,
    pub lags: String,
    pub windows: String,
    pub keep_unclean: bool,
    pub social: bool,
    pub output: Option<PathBuf>,
}

pub fn run(args: FeaturesArgs) {
    let config = match parse_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            eprintln!("   Lags and windows are comma-separated positive integers (e.g., 1,7,14,30)");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_features(&args, &config) {
        eprintln!("\n❌ Feature build failed: {}", e);
        std::process::exit(1);
    }
}

fn parse_config(args: &FeaturesArgs) -> Result<FeatureConfig, Error> {
    let config = FeatureConfig {
        diff_lags: FeatureConfig::parse_list(&args.lags).map_err(Error::InvalidInput)?,
        ma_windows: FeatureConfig::parse_list(&args.windows).map_err(Error::InvalidInput)?,
        drop_unclean: !args.keep_unclean,
    };
    config.validate()?;
    Ok(config)
}

fn run_features(args: &FeaturesArgs, config: &FeatureConfig) -> Result<(), Error> {
    let data_dir = args.data_dir.clone().unwrap_or_else(get_data_dir);
    println!("📁 Data directory: {}", data_dir.display());
    let source = JsonDirSource::new(data_dir);

    let series = super::load_requested_series(&source, &args.items, &args.categories)?;

    let mut table = FeatureTable::default();
    let mut skipped = 0;
    for (key, observations) in &series {
        match build_features(*key, observations, config) {
            Ok(item_table) => table.extend(item_table)?,
            Err(e) => {
                eprintln!("⚠️  {} skipped: {}", key, e);
                skipped += 1;
            }
        }
    }

    if table.rows.is_empty() {
        return Err(Error::EmptySeries("No feature rows left after cleaning".to_string()));
    }

    if args.social {
        println!("📰 Joining social feed...");
        let posts = source.social_posts()?;
        let social = SocialTable::build(&posts, &table.dates(), &DEFAULT_DECAY_WINDOWS);
        table.attach_social(&social);
    }

    let folder = args.output.clone().unwrap_or_else(get_export_dir);
    let stats = export_features(&export_path(&folder), &table)?;

    println!("\n✅ Feature table written:");
    println!("   📈 Rows:     {}", stats.records);
    println!("   📊 Columns:  {}", table.columns.len() + table.social_columns.len());
    println!("   ⚠️  Skipped:  {}", skipped);
    println!("   💾 File:     {} ({} bytes)", stats.path.display(), stats.bytes_written);

    Ok(())
}
