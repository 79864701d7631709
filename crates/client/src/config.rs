//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `KISAN_SETU_API_URL` - Marketplace backend base URL (default: <http://localhost:8001>)
//! - `KISAN_SETU_STORE_PATH` - Path of the persistent state file (default: kisan_setu_state.json)
//! - `KISAN_SETU_GEOCODER_URL` - Reverse geocoding endpoint
//! - `KISAN_SETU_IP_LOOKUP_URL` - IP geolocation endpoint
//! - `KISAN_SETU_GPS_TIMEOUT_MS` - Device geolocation timeout (default: 15000)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default backend base URL, matching the dev backend port.
const DEFAULT_API_URL: &str = "http://localhost:8001";
/// Free reverse-geocoding service; no API key required.
const DEFAULT_GEOCODER_URL: &str = "https://api.bigdatacloud.net/data/reverse-geocode-client";
/// Free IP geolocation service; no API key required.
const DEFAULT_IP_LOOKUP_URL: &str = "https://ipapi.co/json";
const DEFAULT_GPS_TIMEOUT_MS: u64 = 15_000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Marketplace backend base URL.
    pub api_url: Url,
    /// Path of the JSON file backing the persistent store.
    pub store_path: PathBuf,
    /// Reverse geocoding endpoint (coordinates to city/state).
    pub geocoder_url: String,
    /// IP geolocation endpoint.
    pub ip_lookup_url: String,
    /// How long to wait for a device geolocation fix.
    pub gps_timeout: Duration,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = get_env_or_default("KISAN_SETU_API_URL", DEFAULT_API_URL)
            .parse::<Url>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("KISAN_SETU_API_URL".to_owned(), e.to_string())
            })?;
        let store_path =
            PathBuf::from(get_env_or_default("KISAN_SETU_STORE_PATH", "kisan_setu_state.json"));
        let geocoder_url = get_env_or_default("KISAN_SETU_GEOCODER_URL", DEFAULT_GEOCODER_URL);
        let ip_lookup_url = get_env_or_default("KISAN_SETU_IP_LOOKUP_URL", DEFAULT_IP_LOOKUP_URL);
        let gps_timeout_ms = get_env_or_default(
            "KISAN_SETU_GPS_TIMEOUT_MS",
            &DEFAULT_GPS_TIMEOUT_MS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("KISAN_SETU_GPS_TIMEOUT_MS".to_owned(), e.to_string())
        })?;

        Ok(Self {
            api_url,
            store_path,
            geocoder_url,
            ip_lookup_url,
            gps_timeout: Duration::from_millis(gps_timeout_ms),
        })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        #[allow(clippy::unwrap_used)] // parsing a literal
        Self {
            api_url: DEFAULT_API_URL.parse().unwrap(),
            store_path: PathBuf::from("kisan_setu_state.json"),
            geocoder_url: DEFAULT_GEOCODER_URL.to_owned(),
            ip_lookup_url: DEFAULT_IP_LOOKUP_URL.to_owned(),
            gps_timeout: Duration::from_millis(DEFAULT_GPS_TIMEOUT_MS),
        }
    }
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}
