//! Login, refresh, and logout for the user and admin session namespaces.

use resumr_core::Namespace;

use super::{clear_on_unauthorized, store_session};
use crate::client::ApiClient;
use crate::error::RequestError;
use crate::types::{AuthResponse, Credentials, Registration, UserProfile};

struct Endpoints {
    login: &'static str,
    refresh: &'static str,
    logout: &'static str,
    me: &'static str,
}

const USER_ENDPOINTS: Endpoints = Endpoints {
    login: "auth/login",
    refresh: "auth/refresh",
    logout: "auth/logout",
    me: "auth/me",
};

const ADMIN_ENDPOINTS: Endpoints = Endpoints {
    login: "admin/auth/login",
    refresh: "admin/auth/refresh",
    logout: "admin/auth/logout",
    me: "admin/auth/me",
};

async fn login_at(
    client: &ApiClient,
    path: &str,
    email: &str,
    password: &str,
) -> Result<AuthResponse, RequestError> {
    let credentials = Credentials {
        email: email.to_owned(),
        password: password.to_owned(),
    };
    let mut auth: AuthResponse =
        clear_on_unauthorized(client, client.post(path, &credentials).await)?;
    if auth.role.is_none() {
        auth.role = role_from_user(auth.user.as_ref());
    }
    store_session(client, &auth, None)?;
    tracing::info!(namespace = %client.namespace(), "signed in");
    Ok(auth)
}

async fn refresh_at(client: &ApiClient, path: &str) -> Result<AuthResponse, RequestError> {
    let namespace = client.namespace();
    let refresh_token = client
        .session()
        .refresh_token(namespace)
        .ok_or(RequestError::NoRefreshToken(namespace))?;
    let body = serde_json::json!({ "refreshToken": refresh_token });

    let mut auth: AuthResponse = clear_on_unauthorized(client, client.post(path, &body).await)?;
    if auth.refresh_token.is_none() {
        auth.refresh_token = Some(refresh_token);
    }
    if auth.role.is_none() {
        auth.role = client
            .session()
            .role()
            .filter(|_| namespace == Namespace::Admin);
    }
    store_session(client, &auth, client.session().profile(namespace))?;
    tracing::debug!(%namespace, "session token refreshed");
    Ok(auth)
}

/// Tells the server about the logout when a token is held, then always
/// clears the namespace locally.
async fn logout_at(client: &ApiClient, path: &str) -> Result<(), RequestError> {
    let namespace = client.namespace();
    if client.session().is_authenticated(namespace) {
        let result: Result<serde_json::Value, _> =
            client.post(path, &serde_json::json!({})).await;
        if let Err(e) = result {
            tracing::debug!(%namespace, error = %e, "server-side logout failed; clearing locally");
        }
    }
    client.session().clear(namespace)?;
    Ok(())
}

fn role_from_user(user: Option<&serde_json::Value>) -> Option<String> {
    user.and_then(|u| u.get("role"))
        .and_then(serde_json::Value::as_str)
        .map(str::to_owned)
}

/// Authentication for end users (the `user` session namespace).
#[derive(Debug, Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        if client.namespace() != Namespace::User {
            tracing::warn!(namespace = %client.namespace(), "AuthService built on a non-user client");
        }
        Self { client }
    }

    /// Creates an account and signs it in.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] if the request fails or the session cannot be
    /// stored. A 401 also clears any previous user session.
    pub async fn register(&self, registration: &Registration) -> Result<AuthResponse, RequestError> {
        let auth: AuthResponse = clear_on_unauthorized(
            &self.client,
            self.client.post("auth/register", registration).await,
        )?;
        store_session(&self.client, &auth, None)?;
        Ok(auth)
    }

    /// # Errors
    ///
    /// Returns [`RequestError`] if the request fails or the session cannot be
    /// stored. A 401 also clears any previous user session.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, RequestError> {
        login_at(&self.client, USER_ENDPOINTS.login, email, password).await
    }

    /// Exchanges the stored refresh token for a new token pair.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::NoRefreshToken`] if none is stored, or any
    /// request error. A 401 clears the user session.
    pub async fn refresh(&self) -> Result<AuthResponse, RequestError> {
        refresh_at(&self.client, USER_ENDPOINTS.refresh).await
    }

    /// # Errors
    ///
    /// Returns [`RequestError::Session`] only if the local clear cannot be
    /// persisted; server-side failures are logged and ignored.
    pub async fn logout(&self) -> Result<(), RequestError> {
        logout_at(&self.client, USER_ENDPOINTS.logout).await
    }

    /// # Errors
    ///
    /// Returns [`RequestError`] on failure; a 401 clears the user session.
    pub async fn current_user(&self) -> Result<UserProfile, RequestError> {
        clear_on_unauthorized(&self.client, self.client.get(USER_ENDPOINTS.me, &[]).await)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.client.session().is_authenticated(Namespace::User)
    }
}

/// Authentication for administrators (the `admin` session namespace).
#[derive(Debug, Clone)]
pub struct AdminAuthService {
    client: ApiClient,
}

impl AdminAuthService {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        if client.namespace() != Namespace::Admin {
            tracing::warn!(namespace = %client.namespace(), "AdminAuthService built on a non-admin client");
        }
        Self { client }
    }

    /// # Errors
    ///
    /// Returns [`RequestError`] if the request fails or the session cannot be
    /// stored. A 401 also clears any previous admin session.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, RequestError> {
        login_at(&self.client, ADMIN_ENDPOINTS.login, email, password).await
    }

    /// # Errors
    ///
    /// Returns [`RequestError::NoRefreshToken`] if none is stored, or any
    /// request error. A 401 clears the admin session.
    pub async fn refresh(&self) -> Result<AuthResponse, RequestError> {
        refresh_at(&self.client, ADMIN_ENDPOINTS.refresh).await
    }

    /// # Errors
    ///
    /// Returns [`RequestError::Session`] only if the local clear cannot be persisted.
    pub async fn logout(&self) -> Result<(), RequestError> {
        logout_at(&self.client, ADMIN_ENDPOINTS.logout).await
    }

    /// # Errors
    ///
    /// Returns [`RequestError`] on failure; a 401 clears the admin session.
    pub async fn current_admin(&self) -> Result<UserProfile, RequestError> {
        clear_on_unauthorized(&self.client, self.client.get(ADMIN_ENDPOINTS.me, &[]).await)
    }

    #[must_use]
    pub fn role(&self) -> Option<String> {
        self.client.session().role()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.client.session().is_authenticated(Namespace::Admin)
    }
}
