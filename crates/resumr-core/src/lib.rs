//! Shared configuration and session-context types for the resumr client workspace.

pub mod app_config;
pub mod config;
pub mod error;
pub mod session;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, SessionError};
pub use session::{Namespace, SessionRecord, SessionStore};
