use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub admin_api_base_url: String,
    pub request_timeout_ms: u64,
    pub max_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub session_path: Option<PathBuf>,
    pub log_level: String,
    pub user_agent: String,
    pub places_api_key: Option<String>,
    pub places_base_url: Option<String>,
    pub open_geocoder_base_url: Option<String>,
    pub geocoder_timeout_secs: u64,
}

impl AppConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    #[must_use]
    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_base_url", &self.api_base_url)
            .field("admin_api_base_url", &self.admin_api_base_url)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("max_attempts", &self.max_attempts)
            .field("retry_base_delay_ms", &self.retry_base_delay_ms)
            .field("session_path", &self.session_path)
            .field("log_level", &self.log_level)
            .field("user_agent", &self.user_agent)
            .field(
                "places_api_key",
                &self.places_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("places_base_url", &self.places_base_url)
            .field("open_geocoder_base_url", &self.open_geocoder_base_url)
            .field("geocoder_timeout_secs", &self.geocoder_timeout_secs)
            .finish()
    }
}
