use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn build_app_config_uses_defaults_for_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.api_base_url, "http://localhost:5000/api");
    assert_eq!(cfg.admin_api_base_url, "http://localhost:5000/api");
    assert_eq!(cfg.request_timeout_ms, 30_000);
    assert_eq!(cfg.max_attempts, 3);
    assert_eq!(cfg.retry_base_delay_ms, 1_000);
    assert!(cfg.session_path.is_none());
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.user_agent, "resumr/0.1 (resume-builder)");
    assert!(cfg.places_api_key.is_none());
    assert_eq!(
        cfg.places_base_url.as_deref(),
        Some("https://maps.googleapis.com/maps/api")
    );
    assert_eq!(
        cfg.open_geocoder_base_url.as_deref(),
        Some("https://nominatim.openstreetmap.org")
    );
    assert_eq!(cfg.geocoder_timeout_secs, 10);
}

#[test]
fn admin_base_url_follows_api_base_url_when_unset() {
    let mut map = HashMap::new();
    map.insert("RESUMR_API_BASE_URL", "https://api.example.com");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.admin_api_base_url, "https://api.example.com");
}

#[test]
fn admin_base_url_override() {
    let mut map = HashMap::new();
    map.insert("RESUMR_API_BASE_URL", "https://api.example.com");
    map.insert("RESUMR_ADMIN_API_BASE_URL", "https://admin.example.com");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.admin_api_base_url, "https://admin.example.com");
}

#[test]
fn request_timeout_ms_invalid() {
    let mut map = HashMap::new();
    map.insert("RESUMR_REQUEST_TIMEOUT_MS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "RESUMR_REQUEST_TIMEOUT_MS"),
        "expected InvalidEnvVar(RESUMR_REQUEST_TIMEOUT_MS), got: {result:?}"
    );
}

#[test]
fn max_attempts_zero_is_rejected() {
    let mut map = HashMap::new();
    map.insert("RESUMR_MAX_ATTEMPTS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "RESUMR_MAX_ATTEMPTS"),
        "expected InvalidEnvVar(RESUMR_MAX_ATTEMPTS), got: {result:?}"
    );
}

#[test]
fn max_attempts_override() {
    let mut map = HashMap::new();
    map.insert("RESUMR_MAX_ATTEMPTS", "5");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.max_attempts, 5);
}

#[test]
fn retry_base_delay_ms_invalid() {
    let mut map = HashMap::new();
    map.insert("RESUMR_RETRY_BASE_DELAY_MS", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "RESUMR_RETRY_BASE_DELAY_MS"),
        "expected InvalidEnvVar(RESUMR_RETRY_BASE_DELAY_MS), got: {result:?}"
    );
}

#[test]
fn blank_places_api_key_is_treated_as_unset() {
    let mut map = HashMap::new();
    map.insert("PLACES_API_KEY", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.places_api_key.is_none());
}

#[test]
fn empty_open_geocoder_base_url_disables_provider() {
    let mut map = HashMap::new();
    map.insert("OPEN_GEOCODER_BASE_URL", "");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.open_geocoder_base_url.is_none());
}

#[test]
fn session_path_override() {
    let mut map = HashMap::new();
    map.insert("RESUMR_SESSION_PATH", "/tmp/resumr-session.json");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(
        cfg.session_path,
        Some(PathBuf::from("/tmp/resumr-session.json"))
    );
}

#[test]
fn debug_redacts_places_api_key() {
    let mut map = HashMap::new();
    map.insert("PLACES_API_KEY", "super-secret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("super-secret"), "{rendered}");
    assert!(rendered.contains("[redacted]"), "{rendered}");
}
