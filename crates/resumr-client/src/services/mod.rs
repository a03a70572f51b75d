//! Domain services over [`crate::ApiClient`].
//!
//! Every service call routes its result through [`clear_on_unauthorized`]:
//! a 401 clears the client's session namespace before the error reaches the
//! caller. The client itself never touches token storage.

mod admin;
mod auth;
mod resume;
mod user;

pub use admin::AdminService;
pub use auth::{AdminAuthService, AuthService};
pub use resume::ResumeService;
pub use user::UserService;

use resumr_core::SessionRecord;

use crate::client::ApiClient;
use crate::error::RequestError;
use crate::types::AuthResponse;

/// Clears the client's namespace when `result` is a 401, then returns it.
pub(crate) fn clear_on_unauthorized<T>(
    client: &ApiClient,
    result: Result<T, RequestError>,
) -> Result<T, RequestError> {
    if let Err(err) = &result {
        if err.is_unauthorized() {
            let namespace = client.namespace();
            tracing::info!(%namespace, "received 401, clearing session");
            if let Err(e) = client.session().clear(namespace) {
                tracing::warn!(%namespace, error = %e, "failed to clear session after 401");
            }
        }
    }
    result
}

/// Replaces the client's namespace with the tokens from `auth`.
///
/// `fallback_profile` is written when the response carries no user object,
/// so a token refresh keeps the signed-in profile without merging keys.
pub(crate) fn store_session(
    client: &ApiClient,
    auth: &AuthResponse,
    fallback_profile: Option<serde_json::Value>,
) -> Result<(), RequestError> {
    let record = SessionRecord {
        token: auth.token.clone(),
        refresh_token: auth.refresh_token.clone(),
        profile: auth.user.clone().or(fallback_profile),
        role: auth.role.clone(),
    };
    client.session().replace(client.namespace(), record)?;
    Ok(())
}
