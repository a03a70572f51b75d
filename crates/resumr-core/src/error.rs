use thiserror::Error;

/// Errors produced while loading [`crate::AppConfig`] from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Errors produced while reading or flushing a file-backed [`crate::SessionStore`].
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
