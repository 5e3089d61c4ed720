use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the bulk message source (JSON array of records).
    pub messages_path: String,
    /// Path to the precomputed location cache (JSON object).
    pub location_cache_path: String,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            messages_path: required_env("GEOFEED_MESSAGES_PATH"),
            location_cache_path: required_env("GEOFEED_LOCATION_CACHE_PATH"),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
