use std::path::PathBuf;

/// Get the raw data directory from environment variable or use default
pub fn get_data_dir() -> PathBuf {
    std::env::var("RSPREDICT_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("ge_data"))
}

/// Get the export directory from environment variable or use default
pub fn get_export_dir() -> PathBuf {
    std::env::var("RSPREDICT_EXPORT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("exports"))
}
