//! Saved-resume endpoints: CRUD, PDF export, and photo upload.

use super::clear_on_unauthorized;
use crate::client::ApiClient;
use crate::error::RequestError;
use crate::request::UploadForm;
use crate::types::{Resume, ResumeDraft};

#[derive(Debug, Clone)]
pub struct ResumeService {
    client: ApiClient,
}

impl ResumeService {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// # Errors
    ///
    /// Returns [`RequestError`] on failure; a 401 clears the session.
    pub async fn list(&self) -> Result<Vec<Resume>, RequestError> {
        clear_on_unauthorized(&self.client, self.client.get("resumes", &[]).await)
    }

    /// # Errors
    ///
    /// Returns [`RequestError`] on failure; a 401 clears the session.
    pub async fn get(&self, id: &str) -> Result<Resume, RequestError> {
        clear_on_unauthorized(
            &self.client,
            self.client.get(&format!("resumes/{id}"), &[]).await,
        )
    }

    /// # Errors
    ///
    /// Returns [`RequestError`] on failure; a 401 clears the session.
    pub async fn create(&self, draft: &ResumeDraft) -> Result<Resume, RequestError> {
        clear_on_unauthorized(&self.client, self.client.post("resumes", draft).await)
    }

    /// Replaces the whole resume.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] on failure; a 401 clears the session.
    pub async fn update(&self, id: &str, draft: &ResumeDraft) -> Result<Resume, RequestError> {
        clear_on_unauthorized(
            &self.client,
            self.client.put(&format!("resumes/{id}"), draft).await,
        )
    }

    /// # Errors
    ///
    /// Returns [`RequestError`] on failure; a 401 clears the session.
    pub async fn rename(&self, id: &str, title: &str) -> Result<Resume, RequestError> {
        let body = serde_json::json!({ "title": title });
        clear_on_unauthorized(
            &self.client,
            self.client.patch(&format!("resumes/{id}"), &body).await,
        )
    }

    /// # Errors
    ///
    /// Returns [`RequestError`] on failure; a 401 clears the session.
    pub async fn delete(&self, id: &str) -> Result<(), RequestError> {
        let _: serde_json::Value = clear_on_unauthorized(
            &self.client,
            self.client.delete(&format!("resumes/{id}")).await,
        )?;
        Ok(())
    }

    /// Rendered PDF for a resume, optionally in a specific template.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Download`] on a non-success status (not
    /// retried); a 401 clears the session.
    pub async fn download_pdf(
        &self,
        id: &str,
        template: Option<&str>,
    ) -> Result<Vec<u8>, RequestError> {
        clear_on_unauthorized(
            &self.client,
            self.client
                .download(&format!("resumes/{id}/pdf"), &[("template", template)])
                .await,
        )
    }

    /// Uploads a profile photo attached to the resume.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] on failure; a 401 clears the session.
    pub async fn upload_photo(
        &self,
        id: &str,
        file_name: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> Result<Resume, RequestError> {
        let form = UploadForm::new().file("photo", file_name, mime, bytes);
        clear_on_unauthorized(
            &self.client,
            self.client
                .upload(&format!("resumes/{id}/photo"), &form)
                .await,
        )
    }
}
