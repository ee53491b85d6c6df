//! # HTTP Auth Backend
//!
//! `AuthBackend` against the json-server style auth endpoints, with the
//! plaintext fallback the product has always shipped: when the auth routes
//! are missing (plain json-server) or reject the shape, credentials are
//! compared against the raw user record. Insecure, and stays that way:
//! hardening is out of scope for this client.

use async_trait::async_trait;
use domains::{AppError, AuthBackend, AuthResponse, Credentials, Registration, Result, Role, User};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub struct HttpAuthBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAuthBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn users_by_email(&self, email: &str) -> Result<Vec<StoredUserRecord>> {
        self.client
            .get(format!("{}/users", self.base_url))
            .query(&[("email", email)])
            .send()
            .await
            .map_err(backend_err)?
            .error_for_status()
            .map_err(backend_err)?
            .json()
            .await
            .map_err(backend_err)
    }

    /// Plain-text credential comparison against the stored record. Only
    /// matches records whose password was hand-edited into the collection.
    async fn login_fallback(&self, credentials: &Credentials) -> Result<AuthResponse> {
        let users = self.users_by_email(&credentials.email).await?;
        if let Some(record) = users.into_iter().next() {
            if record.password.as_deref() == Some(credentials.password.as_str()) {
                let user = record.into_user();
                return Ok(AuthResponse {
                    access_token: format!("fake-jwt-token-{}", user.id),
                    user,
                });
            }
        }
        Err(AppError::Unauthorized("invalid credentials".to_string()))
    }

    /// Manual registration for a collection without auth routes: duplicate
    /// check, then a plain user insert carrying the password.
    async fn register_fallback(&self, registration: &Registration) -> Result<AuthResponse> {
        let existing = self.users_by_email(&registration.email).await?;
        if !existing.is_empty() {
            return Err(AppError::Conflict("email already exists".to_string()));
        }

        let record = StoredUserRecord {
            id: Uuid::new_v4().to_string(),
            username: registration.username.clone(),
            email: registration.email.clone(),
            role: Role::User,
            password: Some(registration.password.clone()),
        };
        let created: StoredUserRecord = self
            .client
            .post(format!("{}/users", self.base_url))
            .json(&record)
            .send()
            .await
            .map_err(backend_err)?
            .error_for_status()
            .map_err(backend_err)?
            .json()
            .await
            .map_err(backend_err)?;

        let user = created.into_user();
        Ok(AuthResponse {
            access_token: format!("fake-jwt-token-{}", user.id),
            user,
        })
    }
}

fn backend_err(err: reqwest::Error) -> AppError {
    AppError::Backend(err.to_string())
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse> {
        let response = self
            .client
            .post(format!("{}/login", self.base_url))
            .json(credentials)
            .send()
            .await
            .map_err(backend_err)?;

        if response.status().is_success() {
            return response.json().await.map_err(backend_err);
        }
        match response.status() {
            // Missing endpoint or rejected shape: try the raw user record.
            StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST => {
                self.login_fallback(credentials).await
            }
            status => Err(AppError::Unauthorized(format!("login rejected: {status}"))),
        }
    }

    async fn register(&self, registration: &Registration) -> Result<AuthResponse> {
        let response = self
            .client
            .post(format!("{}/register", self.base_url))
            .json(registration)
            .send()
            .await
            .map_err(backend_err)?;

        if response.status().is_success() {
            return response.json().await.map_err(backend_err);
        }
        match response.status() {
            StatusCode::NOT_FOUND => self.register_fallback(registration).await,
            StatusCode::BAD_REQUEST => {
                Err(AppError::Conflict("email already exists".to_string()))
            }
            status => Err(AppError::Backend(format!("register rejected: {status}"))),
        }
    }
}

/// User record as stored in the collection; may carry a plain-text password
/// when the data was hand-edited.
#[derive(Debug, Serialize, Deserialize)]
struct StoredUserRecord {
    id: String,
    username: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    password: Option<String>,
}

impl StoredUserRecord {
    fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            role: self.role,
        }
    }
}
