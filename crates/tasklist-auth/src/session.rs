//! Session gate: the single owner of the current session token.
//!
//! The gate never judges whether a token is valid. It only stamps outbound
//! requests; the remote store decides whether to accept them.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::RequestBuilder;

/// Holds the session token and decorates every outbound request with it.
///
/// Clones share the same token slot, so a login performed through one handle
/// is visible to every client holding another.
#[derive(Clone, Default)]
pub struct SessionGate {
    token: Arc<RwLock<Option<String>>>,
}

impl SessionGate {
    /// Create a gate with no token (signed out).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a gate already holding `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        let gate = Self::new();
        gate.set_token(token);
        gate
    }

    /// Install the token produced by a successful login.
    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write() = Some(token.into());
        tracing::debug!("Session token installed");
    }

    /// Discard the held token. Requests already attached keep theirs.
    pub fn clear(&self) {
        if self.token.write().take().is_some() {
            tracing::info!("Session token cleared");
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.read().is_some()
    }

    /// Current token, if any.
    pub fn token(&self) -> Option<String> {
        self.token.read().clone()
    }

    /// Return `request` with the JSON content type and, when a token is held,
    /// a bearer `Authorization` header.
    ///
    /// The token is copied into the request here, so a later `clear()` does not
    /// affect a request that is already on its way. Without a token the request
    /// is still sent unauthenticated.
    pub fn attach(&self, request: RequestBuilder) -> RequestBuilder {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        match self.token() {
            Some(token) => match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(header::AUTHORIZATION, value);
                }
                Err(_) => {
                    tracing::warn!("Session token contains invalid header characters; sending without it");
                }
            },
            None => tracing::debug!("No session token held; sending request unauthenticated"),
        }

        request.headers(headers)
    }
}

impl fmt::Debug for SessionGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.has_token() { "[REDACTED]" } else { "<none>" };
        f.debug_struct("SessionGate").field("token", &token).finish()
    }
}
