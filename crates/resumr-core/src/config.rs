use std::path::PathBuf;

use crate::app_config::AppConfig;
use crate::ConfigError;

const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
const DEFAULT_PLACES_BASE_URL: &str = "https://maps.googleapis.com/maps/api";
const DEFAULT_OPEN_GEOCODER_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it from a
/// `HashMap` without `set_var`/`remove_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Present-but-blank values are treated the same as unset.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let api_base_url = or_default("RESUMR_API_BASE_URL", DEFAULT_API_BASE_URL);
    let admin_api_base_url =
        optional("RESUMR_ADMIN_API_BASE_URL").unwrap_or_else(|| api_base_url.clone());

    let request_timeout_ms = parse_u64("RESUMR_REQUEST_TIMEOUT_MS", "30000")?;
    let max_attempts = parse_u32("RESUMR_MAX_ATTEMPTS", "3")?;
    if max_attempts == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "RESUMR_MAX_ATTEMPTS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let retry_base_delay_ms = parse_u64("RESUMR_RETRY_BASE_DELAY_MS", "1000")?;

    let session_path = optional("RESUMR_SESSION_PATH").map(PathBuf::from);
    let log_level = or_default("RESUMR_LOG_LEVEL", "info");
    let user_agent = or_default("RESUMR_USER_AGENT", "resumr/0.1 (resume-builder)");

    let places_api_key = optional("PLACES_API_KEY");
    let places_base_url = match lookup("PLACES_BASE_URL") {
        Ok(v) => Some(v.trim().to_string()).filter(|v| !v.is_empty()),
        Err(_) => Some(DEFAULT_PLACES_BASE_URL.to_string()),
    };
    let open_geocoder_base_url = match lookup("OPEN_GEOCODER_BASE_URL") {
        Ok(v) => Some(v.trim().to_string()).filter(|v| !v.is_empty()),
        Err(_) => Some(DEFAULT_OPEN_GEOCODER_BASE_URL.to_string()),
    };
    let geocoder_timeout_secs = parse_u64("RESUMR_GEOCODER_TIMEOUT_SECS", "10")?;

    Ok(AppConfig {
        api_base_url,
        admin_api_base_url,
        request_timeout_ms,
        max_attempts,
        retry_base_delay_ms,
        session_path,
        log_level,
        user_agent,
        places_api_key,
        places_base_url,
        open_geocoder_base_url,
        geocoder_timeout_secs,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
