//! Request descriptors replayed verbatim on every attempt.

use reqwest::multipart::{Form, Part};
use reqwest::Method;

use crate::error::RequestError;

/// Body of a [`RequestDescriptor`].
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart(UploadForm),
}

/// One file part of an [`UploadForm`].
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub field: String,
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Multipart form data kept in owned form so it can be rebuilt per attempt.
///
/// `reqwest::multipart::Form` is consumed on send, so retries rebuild it
/// from this description.
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    fields: Vec<(String, String)>,
    files: Vec<UploadFile>,
}

impl UploadForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn file(
        mut self,
        field: impl Into<String>,
        file_name: impl Into<String>,
        mime: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.files.push(UploadFile {
            field: field.into(),
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        });
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.files.is_empty()
    }

    /// Builds a fresh multipart form.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidRequest`] if a file's MIME type does
    /// not parse.
    pub(crate) fn to_multipart(&self) -> Result<Form, RequestError> {
        let mut form = Form::new();
        for (name, value) in &self.fields {
            form = form.text(name.clone(), value.clone());
        }
        for file in &self.files {
            let part = Part::bytes(file.bytes.clone())
                .file_name(file.file_name.clone())
                .mime_str(&file.mime)
                .map_err(|e| RequestError::InvalidRequest {
                    reason: format!("invalid MIME type \"{}\": {e}", file.mime),
                })?;
            form = form.part(file.field.clone(), part);
        }
        Ok(form)
    }
}

/// Everything needed to send one logical request.
///
/// Built once per call; the bearer token is the snapshot taken when the call
/// started, so a concurrent logout does not alter an in-flight request.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub path: String,
    /// Ordered query pairs. Duplicates are kept.
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    pub bearer: Option<String>,
}

impl RequestDescriptor {
    /// Creates a descriptor, dropping query entries whose value is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::EmptyPath`] if `path` is empty after trimming
    /// slashes and whitespace.
    pub fn new(
        method: Method,
        path: &str,
        query: &[(&str, Option<&str>)],
        body: RequestBody,
        bearer: Option<String>,
    ) -> Result<Self, RequestError> {
        let path = path.trim().trim_start_matches('/');
        if path.is_empty() {
            return Err(RequestError::EmptyPath);
        }
        let query = query
            .iter()
            .filter_map(|(k, v)| v.map(|v| ((*k).to_owned(), v.to_owned())))
            .collect();
        Ok(Self {
            method,
            path: path.to_owned(),
            query,
            body,
            bearer,
        })
    }

    /// Short `"METHOD path"` label for logs and error contexts.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}
