//! Client for the account endpoints that produce the session token.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use tasklist_core::{extract_api_message, parse_base_url, AppError, AuthError, NetworkError, ReqwestErrorExt};

use crate::session::SessionGate;
use crate::storage::{StorageError, TokenStore};

const DEFAULT_LOGIN_FAILURE: &str = "Login failed";
const DEFAULT_REGISTER_FAILURE: &str = "Registration failed";

#[derive(Debug, Error)]
pub enum AuthClientError {
    #[error("Invalid auth API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Login rejected ({status}): {message}")]
    LoginRejected { status: u16, message: String },

    #[error("Registration rejected ({status}): {message}")]
    RegistrationRejected { status: u16, message: String },

    #[error("Malformed auth response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<AuthClientError> for AppError {
    fn from(e: AuthClientError) -> Self {
        match e {
            AuthClientError::InvalidUrl(e) => {
                tasklist_core::ConfigError::Invalid(e.to_string()).into()
            }
            AuthClientError::Http(e) => e.into_network_error().into(),
            AuthClientError::LoginRejected { message, .. } => AuthError::LoginFailed(message).into(),
            AuthClientError::RegistrationRejected { message, .. } => {
                AuthError::RegistrationFailed(message).into()
            }
            AuthClientError::InvalidResponse(msg) => NetworkError::InvalidResponse(msg).into(),
            AuthClientError::Storage(e) => e.into(),
        }
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

/// New account details
#[derive(Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Login/registration client. A successful login installs the token in the
/// shared [`SessionGate`] and, when a [`TokenStore`] is configured, persists it.
#[derive(Debug, Clone)]
pub struct AuthClient {
    base_url: Url,
    client: Arc<Client>,
    gate: SessionGate,
    store: Option<TokenStore>,
}

impl AuthClient {
    pub fn new(base_url: &str, gate: SessionGate, timeout: Duration) -> Result<Self, AuthClientError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: parse_base_url(base_url)?,
            client: Arc::new(client),
            gate,
            store: None,
        })
    }

    /// Persist tokens in `store` across runs
    pub fn with_store(mut self, store: TokenStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn gate(&self) -> &SessionGate {
        &self.gate
    }

    /// Load a previously stored token into the gate.
    ///
    /// Returns whether a token was found. Nothing is checked with the server;
    /// a stale token surfaces on the first rejected task request.
    pub fn restore_session(&self) -> Result<bool, AuthClientError> {
        let Some(store) = &self.store else {
            return Ok(false);
        };

        match store.load()? {
            Some(token) => {
                self.gate.set_token(token);
                tracing::info!("Restored stored session");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Sign in and install the returned token
    pub async fn login(&self, email: &str, password: &str) -> Result<(), AuthClientError> {
        tracing::debug!("Logging in as {}", email);

        let url = self.base_url.join("api/v1/auth/login")?;
        let response = self
            .client
            .post(url)
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message =
                extract_api_message(&body).unwrap_or_else(|| DEFAULT_LOGIN_FAILURE.to_string());
            tracing::warn!("Login rejected ({}): {}", status, message);
            return Err(AuthClientError::LoginRejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| AuthClientError::InvalidResponse(e.to_string()))?;
        if body.token.trim().is_empty() {
            return Err(AuthClientError::InvalidResponse(
                "login response carried an empty token".to_string(),
            ));
        }

        self.gate.set_token(body.token.clone());
        if let Some(store) = &self.store {
            // The session is usable for this run even if it can't be saved
            if let Err(e) = store.store(&body.token) {
                tracing::warn!("Failed to persist session token: {}", e);
            }
        }

        tracing::info!("Logged in as {}", email);
        Ok(())
    }

    /// Create an account. Does not sign in; call [`AuthClient::login`] afterwards.
    pub async fn register(&self, request: &RegisterRequest) -> Result<(), AuthClientError> {
        tracing::debug!("Registering account {}", request.email);

        let url = self.base_url.join("api/v1/auth/register")?;
        let response = self.client.post(url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message =
                extract_api_message(&body).unwrap_or_else(|| DEFAULT_REGISTER_FAILURE.to_string());
            tracing::warn!("Registration rejected ({}): {}", status, message);
            return Err(AuthClientError::RegistrationRejected {
                status: status.as_u16(),
                message,
            });
        }

        tracing::info!("Registered account {}", request.email);
        Ok(())
    }

    /// Drop the session locally and forget the stored token
    pub fn logout(&self) -> Result<(), AuthClientError> {
        self.gate.clear();
        if let Some(store) = &self.store {
            store.clear()?;
        }
        Ok(())
    }
}
