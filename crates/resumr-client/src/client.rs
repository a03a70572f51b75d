//! Resilient HTTP client for the resumr REST backend.
//!
//! Each call snapshots the namespace's bearer token, then runs up to
//! [`RetryPolicy::max_attempts`] attempts. Every attempt is bounded twice:
//! by reqwest's per-request timeout and by a racing `tokio::time::timeout`,
//! so a transport that ignores its own deadline still cannot hang the call.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Method, Url};
use resumr_core::{AppConfig, Namespace, SessionStore};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::RequestError;
use crate::request::{RequestBody, RequestDescriptor, UploadForm};
use crate::retry::{retry_with_backoff, RetryPolicy};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_USER_AGENT: &str = "resumr/0.1 (resume-builder)";

/// Construction-time settings for an [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ApiClientOptions {
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub user_agent: String,
}

impl Default for ApiClientOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl ApiClientOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            timeout: config.request_timeout(),
            retry: RetryPolicy {
                max_attempts: config.max_attempts,
                base_delay: config.retry_base_delay(),
            },
            user_agent: config.user_agent.clone(),
        }
    }
}

/// HTTP client bound to one base URL and one session namespace.
///
/// Cheap to clone; clones share the connection pool and session store.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    timeout: Duration,
    retry: RetryPolicy,
    session: SessionStore,
    namespace: Namespace,
}

impl ApiClient {
    /// Creates a client rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidRequest`] if `base_url` does not parse,
    /// or [`RequestError::Network`] if the underlying `reqwest::Client`
    /// cannot be built.
    pub fn new(
        base_url: &str,
        session: SessionStore,
        namespace: Namespace,
        options: ApiClientOptions,
    ) -> Result<Self, RequestError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(options.user_agent)
            .build()
            .map_err(RequestError::Network)?;

        // Normalise to exactly one trailing slash so `Url::join` appends to
        // the base path instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim().trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| RequestError::InvalidRequest {
            reason: format!("invalid base URL '{base_url}': {e}"),
        })?;

        Ok(Self {
            client,
            base_url,
            timeout: options.timeout,
            retry: options.retry,
            session,
            namespace,
        })
    }

    /// Builds the client for `namespace` from application config: the user
    /// namespace talks to `api_base_url`, the admin namespace to
    /// `admin_api_base_url`.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::new`].
    pub fn from_config(
        config: &AppConfig,
        session: SessionStore,
        namespace: Namespace,
    ) -> Result<Self, RequestError> {
        let base_url = match namespace {
            Namespace::User => &config.api_base_url,
            Namespace::Admin => &config.admin_api_base_url,
        };
        Self::new(
            base_url,
            session,
            namespace,
            ApiClientOptions::from_config(config),
        )
    }

    #[must_use]
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// # Errors
    ///
    /// See [`RequestError`]; transient failures are retried first.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, Option<&str>)],
    ) -> Result<T, RequestError> {
        self.execute(Method::GET, path, query, RequestBody::Empty)
            .await
    }

    /// # Errors
    ///
    /// See [`RequestError`]; transient failures are retried first.
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, RequestError> {
        let body = Self::json_body(body)?;
        self.execute(Method::POST, path, &[], body).await
    }

    /// # Errors
    ///
    /// See [`RequestError`]; transient failures are retried first.
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, RequestError> {
        let body = Self::json_body(body)?;
        self.execute(Method::PUT, path, &[], body).await
    }

    /// # Errors
    ///
    /// See [`RequestError`]; transient failures are retried first.
    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, RequestError> {
        let body = Self::json_body(body)?;
        self.execute(Method::PATCH, path, &[], body).await
    }

    /// # Errors
    ///
    /// See [`RequestError`]; transient failures are retried first.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, RequestError> {
        self.execute(Method::DELETE, path, &[], RequestBody::Empty)
            .await
    }

    /// Sends a multipart form. reqwest sets the multipart content type; no
    /// JSON content type is added.
    ///
    /// # Errors
    ///
    /// See [`RequestError`]; transient failures are retried first.
    pub async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &UploadForm,
    ) -> Result<T, RequestError> {
        self.execute(
            Method::POST,
            path,
            &[],
            RequestBody::Multipart(form.clone()),
        )
        .await
    }

    /// Fetches a binary payload in a single attempt.
    ///
    /// No retry and no JSON error parsing: a non-success status becomes
    /// [`RequestError::Download`] immediately.
    ///
    /// # Errors
    ///
    /// - [`RequestError::Download`] on a non-success status.
    /// - [`RequestError::Timeout`] if the attempt exceeds the client timeout.
    /// - [`RequestError::Network`] on transport failure.
    pub async fn download(
        &self,
        path: &str,
        query: &[(&str, Option<&str>)],
    ) -> Result<Vec<u8>, RequestError> {
        let descriptor = self.describe(Method::GET, path, query, RequestBody::Empty)?;
        let url = self.build_url(&descriptor)?;
        tracing::debug!(request = %descriptor.label(), "sending download request");

        self.race(async {
            let response = self
                .build_request(&descriptor, url)?
                .send()
                .await
                .map_err(|e| RequestError::from_transport(e, self.timeout))?;
            let status = response.status();
            if !status.is_success() {
                return Err(RequestError::Download {
                    status: status.as_u16(),
                });
            }
            let bytes = response
                .bytes()
                .await
                .map_err(|e| RequestError::from_transport(e, self.timeout))?;
            Ok(bytes.to_vec())
        })
        .await
    }

    fn json_body<B: Serialize + ?Sized>(body: &B) -> Result<RequestBody, RequestError> {
        serde_json::to_value(body)
            .map(RequestBody::Json)
            .map_err(|e| RequestError::InvalidRequest {
                reason: format!("request body is not serializable: {e}"),
            })
    }

    fn describe(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, Option<&str>)],
        body: RequestBody,
    ) -> Result<RequestDescriptor, RequestError> {
        let bearer = self.session.token(self.namespace);
        RequestDescriptor::new(method, path, query, body, bearer)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, Option<&str>)],
        body: RequestBody,
    ) -> Result<T, RequestError> {
        let descriptor = self.describe(method, path, query, body)?;
        let url = self.build_url(&descriptor)?;
        let descriptor = &descriptor;

        let value = retry_with_backoff(self.retry, |attempt| {
            let url = url.clone();
            async move {
                tracing::debug!(request = %descriptor.label(), attempt, "sending request");
                self.attempt_json(descriptor, url).await
            }
        })
        .await?;

        serde_json::from_value(value).map_err(|e| RequestError::Decode {
            context: descriptor.label(),
            source: e,
        })
    }

    /// One bounded attempt against a JSON endpoint.
    async fn attempt_json(
        &self,
        descriptor: &RequestDescriptor,
        url: Url,
    ) -> Result<serde_json::Value, RequestError> {
        self.race(async {
            let response = self
                .build_request(descriptor, url)?
                .send()
                .await
                .map_err(|e| RequestError::from_transport(e, self.timeout))?;
            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| RequestError::from_transport(e, self.timeout))?;

            if !status.is_success() {
                return Err(RequestError::from_status(status.as_u16(), &body));
            }
            if body.trim().is_empty() {
                return Ok(serde_json::Value::Null);
            }
            serde_json::from_str(&body).map_err(|e| RequestError::Decode {
                context: descriptor.label(),
                source: e,
            })
        })
        .await
    }

    /// Races `attempt` against the client timeout.
    async fn race<T>(
        &self,
        attempt: impl Future<Output = Result<T, RequestError>>,
    ) -> Result<T, RequestError> {
        tokio::time::timeout(self.timeout, attempt)
            .await
            .unwrap_or(Err(RequestError::Timeout {
                after: self.timeout,
            }))
    }

    fn build_request(
        &self,
        descriptor: &RequestDescriptor,
        url: Url,
    ) -> Result<reqwest::RequestBuilder, RequestError> {
        let mut request = self
            .client
            .request(descriptor.method.clone(), url)
            .timeout(self.timeout)
            .header(reqwest::header::ACCEPT, "application/json");

        if let Some(token) = &descriptor.bearer {
            request = request.bearer_auth(token);
        }

        let request = match &descriptor.body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(value),
            RequestBody::Multipart(form) => request.multipart(form.to_multipart()?),
        };
        Ok(request)
    }

    /// Joins the descriptor path onto the base URL and appends its query
    /// pairs, percent-encoded.
    fn build_url(&self, descriptor: &RequestDescriptor) -> Result<Url, RequestError> {
        let mut url =
            self.base_url
                .join(&descriptor.path)
                .map_err(|e| RequestError::InvalidRequest {
                    reason: format!("invalid path '{}': {e}", descriptor.path),
                })?;
        if !descriptor.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in &descriptor.query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
