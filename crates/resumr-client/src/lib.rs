//! HTTP client layer for the resumr backend.
//!
//! [`ApiClient`] performs one logical request with a fixed timeout, bounded
//! linear retry, bearer-token injection from a [`resumr_core::SessionStore`]
//! namespace, and uniform error translation. The [`services`] module wraps it
//! with the auth, user, resume, and admin endpoints.

pub mod client;
pub mod error;
pub mod request;
pub mod retry;
pub mod services;
pub mod types;

pub use client::{ApiClient, ApiClientOptions};
pub use error::{default_status_message, ErrorKind, RequestError};
pub use request::{RequestBody, RequestDescriptor, UploadFile, UploadForm};
pub use retry::RetryPolicy;
pub use services::{AdminAuthService, AdminService, AuthService, ResumeService, UserService};
