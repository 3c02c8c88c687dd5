//! services/catalog_client/src/session.rs
//!
//! Resolves the headers attached to outgoing catalog requests.
//!
//! Authorization is best-effort: when the identity provider has no session, or fails,
//! the request goes out anonymously and the backend decides what to allow.

use book_catalog_core::ports::IdentityProvider;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::sync::Arc;
use tracing::{debug, warn};

/// Reads the current session token from the identity provider, fresh on every call.
#[derive(Clone)]
pub struct SessionResolver {
    identity: Arc<dyn IdentityProvider>,
}

impl SessionResolver {
    pub fn new(identity: Arc<dyn IdentityProvider>) -> Self {
        Self { identity }
    }

    /// The current id token, or `None` when there is no usable session.
    pub async fn bearer_token(&self) -> Option<String> {
        match self.identity.fetch_session().await {
            Ok(session) => session.id_token.filter(|token| !token.trim().is_empty()),
            Err(e) => {
                debug!("No session available, continuing anonymously: {}", e);
                None
            }
        }
    }

    /// Builds the request headers. Always contains `Content-Type: application/json`;
    /// contains `Authorization: Bearer <token>` only when a session exists.
    pub async fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = self.bearer_token().await {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => warn!("Session token is not a valid header value; sending anonymously"),
            }
        }

        headers
    }
}
