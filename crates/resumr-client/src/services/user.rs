use super::clear_on_unauthorized;
use crate::client::ApiClient;
use crate::error::RequestError;
use crate::types::{PasswordChange, ProfileUpdate, UserProfile};

/// Profile endpoints for the signed-in user.
#[derive(Debug, Clone)]
pub struct UserService {
    client: ApiClient,
}

impl UserService {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// # Errors
    ///
    /// Returns [`RequestError`] on failure; a 401 clears the session.
    pub async fn profile(&self) -> Result<UserProfile, RequestError> {
        clear_on_unauthorized(&self.client, self.client.get("users/profile", &[]).await)
    }

    /// # Errors
    ///
    /// Returns [`RequestError`] on failure; a 401 clears the session.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, RequestError> {
        clear_on_unauthorized(
            &self.client,
            self.client.put("users/profile", update).await,
        )
    }

    /// # Errors
    ///
    /// Returns [`RequestError`] on failure; a 401 clears the session.
    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), RequestError> {
        let body = PasswordChange {
            current_password: current_password.to_owned(),
            new_password: new_password.to_owned(),
        };
        let _: serde_json::Value = clear_on_unauthorized(
            &self.client,
            self.client.patch("users/password", &body).await,
        )?;
        Ok(())
    }
}
