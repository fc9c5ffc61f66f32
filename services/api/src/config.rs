//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development. The backend URL and key come from the
//! deployment's secret store; they are read once and never re-read.

use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    /// Base URL of the hosted REST store, normalized (trimmed, no trailing '/').
    pub backend_url: String,
    /// API key sent as both `apikey` and bearer token.
    pub backend_key: String,
    /// Object-store bucket holding voice recordings.
    pub bucket: String,
    pub feedback_table: String,
    pub sensors_table: String,
    pub voice_table: String,
    /// Expiry for signed playback URLs, in seconds.
    pub signed_url_seconds: u32,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Backend Settings (strip whitespace; remove trailing '/') ---
        let backend_url = std::env::var("SUPABASE_URL")
            .map_err(|_| ConfigError::MissingVar("SUPABASE_URL".to_string()))?;
        let backend_url = normalize_url(&backend_url);

        let backend_key = std::env::var("SUPABASE_KEY")
            .map_err(|_| ConfigError::MissingVar("SUPABASE_KEY".to_string()))?
            .trim()
            .to_string();

        let bucket = std::env::var("SUPABASE_BUCKET")
            .unwrap_or_else(|_| "voice-recordings".to_string());
        let feedback_table =
            std::env::var("FEEDBACK_TABLE").unwrap_or_else(|_| "feedback".to_string());
        let sensors_table =
            std::env::var("SENSORS_TABLE").unwrap_or_else(|_| "sensor_readings".to_string());
        let voice_table =
            std::env::var("VOICE_TABLE").unwrap_or_else(|_| "voice_notes".to_string());

        let signed_url_seconds = match std::env::var("SIGNED_URL_SECONDS") {
            Ok(raw) => raw.parse::<u32>().map_err(|e| {
                ConfigError::InvalidValue("SIGNED_URL_SECONDS".to_string(), e.to_string())
            })?,
            Err(_) => 3600,
        };

        Ok(Self {
            bind_address,
            log_level,
            backend_url,
            backend_key,
            bucket,
            feedback_table,
            sensors_table,
            voice_table,
            signed_url_seconds,
        })
    }
}

/// Strips surrounding whitespace and any trailing slashes; a stray trailing
/// '/' in the secret would otherwise produce `//rest/v1` request paths.
pub fn normalize_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_whitespace_and_trailing_slash() {
        assert_eq!(
            normalize_url("  https://abc.supabase.co/ \n"),
            "https://abc.supabase.co"
        );
        assert_eq!(
            normalize_url("https://abc.supabase.co"),
            "https://abc.supabase.co"
        );
    }
}
