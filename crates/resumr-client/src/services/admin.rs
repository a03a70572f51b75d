//! Admin dashboard endpoints. Use with an [`ApiClient`] bound to the admin
//! namespace.

use super::clear_on_unauthorized;
use crate::client::ApiClient;
use crate::error::RequestError;
use crate::types::{DashboardStats, Page, Resume, UserProfile, UserStatus};

#[derive(Debug, Clone)]
pub struct AdminService {
    client: ApiClient,
}

impl AdminService {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// # Errors
    ///
    /// Returns [`RequestError`] on failure; a 401 clears the admin session.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, RequestError> {
        clear_on_unauthorized(&self.client, self.client.get("admin/stats", &[]).await)
    }

    /// Lists users. `search` is omitted from the query when `None`.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] on failure; a 401 clears the admin session.
    pub async fn list_users(
        &self,
        page: u32,
        limit: u32,
        search: Option<&str>,
    ) -> Result<Page<UserProfile>, RequestError> {
        let page = page.to_string();
        let limit = limit.to_string();
        let query = [
            ("page", Some(page.as_str())),
            ("limit", Some(limit.as_str())),
            ("search", search),
        ];
        clear_on_unauthorized(&self.client, self.client.get("admin/users", &query).await)
    }

    /// # Errors
    ///
    /// Returns [`RequestError`] on failure; a 401 clears the admin session.
    pub async fn get_user(&self, id: &str) -> Result<UserProfile, RequestError> {
        clear_on_unauthorized(
            &self.client,
            self.client.get(&format!("admin/users/{id}"), &[]).await,
        )
    }

    /// # Errors
    ///
    /// Returns [`RequestError`] on failure; a 401 clears the admin session.
    pub async fn set_user_status(
        &self,
        id: &str,
        status: UserStatus,
    ) -> Result<UserProfile, RequestError> {
        let body = serde_json::json!({ "status": status });
        clear_on_unauthorized(
            &self.client,
            self.client
                .patch(&format!("admin/users/{id}/status"), &body)
                .await,
        )
    }

    /// # Errors
    ///
    /// Returns [`RequestError`] on failure; a 401 clears the admin session.
    pub async fn delete_user(&self, id: &str) -> Result<(), RequestError> {
        let _: serde_json::Value = clear_on_unauthorized(
            &self.client,
            self.client.delete(&format!("admin/users/{id}")).await,
        )?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`RequestError`] on failure; a 401 clears the admin session.
    pub async fn list_resumes(&self, page: u32, limit: u32) -> Result<Page<Resume>, RequestError> {
        let page = page.to_string();
        let limit = limit.to_string();
        clear_on_unauthorized(
            &self.client,
            self.client
                .get(
                    "admin/resumes",
                    &[("page", Some(page.as_str())), ("limit", Some(limit.as_str()))],
                )
                .await,
        )
    }

    /// CSV export of all users. Single attempt, like every download.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Download`] on a non-success status; a 401
    /// clears the admin session.
    pub async fn export_users_csv(&self) -> Result<Vec<u8>, RequestError> {
        clear_on_unauthorized(
            &self.client,
            self.client
                .download("admin/users/export", &[("format", Some("csv"))])
                .await,
        )
    }
}
