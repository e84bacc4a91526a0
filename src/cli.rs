use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands;

#[derive(Parser)]
#[command(name = "rspredict")]
#[command(about = "Grand Exchange price enrichment for predictive modeling", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Enrich item price histories with diffs, moving averages and social flags
    Enrich {
        /// Item ids (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        items: Vec<u32>,

        /// Catalogue category ids whose items are included (0-43, comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        categories: Vec<u32>,

        /// Raw data directory (default: $RSPREDICT_DATA_DIR or ./ge_data)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Moving average window
        #[arg(short, long, default_value_t = 7)]
        window: usize,

        /// Social join tolerance in hours (inclusive)
        #[arg(long, default_value_t = 12)]
        tolerance_hours: i64,

        /// Partial window policy: prefix or withhold
        #[arg(long, default_value = "prefix")]
        policy: String,

        /// Join social feed posts onto the series
        #[arg(long)]
        social: bool,

        /// Export folder (default: $RSPREDICT_EXPORT_DIR or ./exports)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print JSON to stdout instead of writing CSV
        #[arg(long)]
        json: bool,

        /// Export only the raw (id, price, date) series without enrichment
        #[arg(long)]
        series_only: bool,
    },
    /// Build multi-lag feature tables for modeling
    Features {
        /// Item ids (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        items: Vec<u32>,

        /// Catalogue category ids whose items are included (0-43, comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        categories: Vec<u32>,

        /// Raw data directory (default: $RSPREDICT_DATA_DIR or ./ge_data)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// Difference lags
        #[arg(long, default_value = "1,7,14,30")]
        lags: String,

        /// Moving average windows
        #[arg(long, default_value = "7,14,30")]
        windows: String,

        /// Keep rows with missing lags or a flat moving average
        #[arg(long)]
        keep_unclean: bool,

        /// Join daily social flags and decayed social features
        #[arg(long)]
        social: bool,

        /// Export folder (default: $RSPREDICT_EXPORT_DIR or ./exports)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show what raw data is available
    Inspect {
        /// Raw data directory (default: $RSPREDICT_DATA_DIR or ./ge_data)
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
}

pub fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Enrich {
            items,
            categories,
            data_dir,
            window,
            tolerance_hours,
            policy,
            social,
            output,
            json,
            series_only,
        } => {
            commands::enrich::run(commands::enrich::EnrichArgs {
                items,
                categories,
                data_dir,
                window,
                tolerance_hours,
                policy,
                social,
                output,
                json,
                series_only,
            });
        }
        Commands::Features {
            items,
            categories,
            data_dir,
            lags,
            windows,
            keep_unclean,
            social,
            output,
        } => {
            commands::features::run(commands::features::FeaturesArgs {
                items,
                categories,
                data_dir,
                lags,
                windows,
                keep_unclean,
                social,
                output,
            });
        }
        Commands::Inspect { data_dir } => {
            commands::inspect::run(data_dir);
        }
    }
}
