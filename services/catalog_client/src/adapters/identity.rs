//! services/catalog_client/src/adapters/identity.rs
//!
//! An in-memory implementation of the `IdentityProvider` port, used in mock mode.
//! Accounts created through sign-up must be confirmed before sign-in completes,
//! the same way a hosted identity provider gates new registrations.

use async_trait::async_trait;
use book_catalog_core::ports::{
    IdentityError, IdentityProvider, IdentityResult, IdentitySession, IdentityUser,
    SignInOutcome, SignUpRequest,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

struct Account {
    user_id: String,
    password: String,
    name: String,
    confirmed: bool,
}

struct ActiveSession {
    username: String,
    id_token: String,
}

#[derive(Default)]
struct IdentityState {
    accounts: HashMap<String, Account>,
    active: Option<ActiveSession>,
}

/// In-memory identity provider.
///
/// Failure switches let callers simulate an unreachable provider.
#[derive(Default)]
pub struct MockIdentityProvider {
    state: Mutex<IdentityState>,
    fail_sign_out: AtomicBool,
    fail_session: AtomicBool,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a confirmed account.
    pub fn with_account(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        self.state.get_mut().accounts.insert(
            username.into(),
            Account {
                user_id: Uuid::new_v4().to_string(),
                password: password.into(),
                name: name.into(),
                confirmed: true,
            },
        );
        self
    }

    /// Starts out with `username` already signed in. The account must exist.
    pub fn signed_in_as(mut self, username: impl Into<String>) -> Self {
        let username = username.into();
        let state = self.state.get_mut();
        if state.accounts.contains_key(&username) {
            state.active = Some(ActiveSession {
                username,
                id_token: Uuid::new_v4().to_string(),
            });
        }
        self
    }

    pub fn set_sign_out_failure(&self, fail: bool) {
        self.fail_sign_out.store(fail, Ordering::SeqCst);
    }

    pub fn set_session_failure(&self, fail: bool) {
        self.fail_session.store(fail, Ordering::SeqCst);
    }

    /// Confirms a registration made through `sign_up`.
    pub async fn confirm_account(&self, username: &str) -> IdentityResult<()> {
        let mut state = self.state.lock().await;
        let account = state
            .accounts
            .get_mut(username)
            .ok_or(IdentityError::InvalidCredentials)?;
        account.confirmed = true;
        Ok(())
    }

    /// The id token of the active session, if any.
    pub async fn active_token(&self) -> Option<String> {
        let state = self.state.lock().await;
        state.active.as_ref().map(|s| s.id_token.clone())
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn sign_in(&self, username: &str, password: &str) -> IdentityResult<SignInOutcome> {
        let mut state = self.state.lock().await;
        let account = state
            .accounts
            .get(username)
            .filter(|a| a.password == password)
            .ok_or(IdentityError::InvalidCredentials)?;

        if !account.confirmed {
            debug!("Sign-in for {} requires confirmation", username);
            return Ok(SignInOutcome { is_signed_in: false });
        }

        state.active = Some(ActiveSession {
            username: username.to_string(),
            id_token: Uuid::new_v4().to_string(),
        });
        Ok(SignInOutcome { is_signed_in: true })
    }

    async fn sign_out(&self) -> IdentityResult<()> {
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(IdentityError::Provider("sign-out unavailable".to_string()));
        }
        self.state.lock().await.active = None;
        Ok(())
    }

    async fn sign_up(&self, request: SignUpRequest) -> IdentityResult<()> {
        let mut state = self.state.lock().await;
        if state.accounts.contains_key(&request.username) {
            return Err(IdentityError::AlreadyExists(request.username));
        }
        state.accounts.insert(
            request.username,
            Account {
                user_id: Uuid::new_v4().to_string(),
                password: request.password,
                name: request.name,
                confirmed: false,
            },
        );
        Ok(())
    }

    async fn current_user(&self) -> IdentityResult<IdentityUser> {
        let state = self.state.lock().await;
        let active = state.active.as_ref().ok_or(IdentityError::NotAuthenticated)?;
        let account = state
            .accounts
            .get(&active.username)
            .ok_or(IdentityError::NotAuthenticated)?;
        Ok(IdentityUser {
            user_id: account.user_id.clone(),
            login_id: Some(active.username.clone()),
            display_name: account.name.clone(),
        })
    }

    async fn fetch_session(&self) -> IdentityResult<IdentitySession> {
        if self.fail_session.load(Ordering::SeqCst) {
            return Err(IdentityError::Provider("session unavailable".to_string()));
        }
        let state = self.state.lock().await;
        let active = state.active.as_ref().ok_or(IdentityError::NotAuthenticated)?;
        Ok(IdentitySession {
            id_token: Some(active.id_token.clone()),
        })
    }
}
