use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SERVER_PORT: u16 = 3000;
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_CLIENT_DIST_DIR: &str = "client/dist";
pub const DEFAULT_DATASET_REFRESH_SECS: u64 = 300; // 5 minutes

pub const DATA_CACHE_CONTROL: &str = "public, max-age=300";
pub const BUNDLE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";
pub const IMAGE_CACHE_CONTROL: &str = "public, max-age=86400";

pub fn server_port() -> u16 {
    std::env::var("SERVER_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_SERVER_PORT)
}

pub fn data_dir() -> PathBuf {
    std::env::var("DATA_DIR")
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

pub fn client_dist_dir() -> PathBuf {
    std::env::var("CLIENT_DIST_DIR")
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CLIENT_DIST_DIR))
}

pub fn dataset_refresh() -> Duration {
    std::env::var("DATASET_REFRESH_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(DEFAULT_DATASET_REFRESH_SECS))
}
