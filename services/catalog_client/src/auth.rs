//! services/catalog_client/src/auth.rs
//!
//! Owns the current-user slot and its lifecycle: bootstrap check, login, logout, signup.
//!
//! The slot lives in a `tokio::sync::watch` channel, so any number of observers can
//! subscribe and be woken on every change. Only the four operations below write to it.

use book_catalog_core::domain::{Role, User};
use book_catalog_core::ports::{IdentityError, IdentityProvider, IdentityUser, SignUpRequest};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::config::LogoutPolicy;

//=========================================================================================
// Observable State
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    Loading,
    Unauthenticated,
    Authenticated,
}

/// A snapshot of the auth state. Authentication is always derived from the user slot.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    user: Option<User>,
    is_loading: bool,
}

impl AuthState {
    fn initial() -> Self {
        Self {
            user: None,
            is_loading: true,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn status(&self) -> AuthStatus {
        match (&self.user, self.is_loading) {
            (Some(_), _) => AuthStatus::Authenticated,
            (None, true) => AuthStatus::Loading,
            (None, false) => AuthStatus::Unauthenticated,
        }
    }
}

fn user_from_identity(identity: IdentityUser, email: String) -> User {
    User {
        id: identity.user_id,
        email,
        name: identity.display_name,
        role: Role::User,
        created_at: Utc::now(),
    }
}

//=========================================================================================
// The Manager
//=========================================================================================

pub struct AuthStateManager {
    identity: Arc<dyn IdentityProvider>,
    state: watch::Sender<AuthState>,
    logout_policy: LogoutPolicy,
    bootstrapped: AtomicBool,
}

impl AuthStateManager {
    pub fn new(identity: Arc<dyn IdentityProvider>, logout_policy: LogoutPolicy) -> Self {
        let (state, _) = watch::channel(AuthState::initial());
        Self {
            identity,
            state,
            logout_policy,
            bootstrapped: AtomicBool::new(false),
        }
    }

    /// Returns a receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn logout_policy(&self) -> LogoutPolicy {
        self.logout_policy
    }

    fn set_user(&self, user: Option<User>) {
        self.state.send_modify(|state| state.user = user);
    }

    /// Asks the identity provider who is signed in. Runs once per manager; later calls
    /// return the current state untouched. Never fails: any error means "signed out".
    pub async fn bootstrap(&self) -> AuthState {
        if self.bootstrapped.swap(true, Ordering::SeqCst) {
            return self.snapshot();
        }

        let user = match self.identity.current_user().await {
            Ok(identity) => {
                let email = identity.login_id.clone().unwrap_or_default();
                info!("Restored session for user {}", identity.user_id);
                Some(user_from_identity(identity, email))
            }
            Err(e) => {
                info!("No existing session: {}", e);
                None
            }
        };

        self.state.send_modify(|state| {
            state.user = user;
            state.is_loading = false;
        });
        self.snapshot()
    }

    /// Signs in. On a completed sign-in the user is populated with the email as typed,
    /// not as reported back by the provider. Failures are logged and returned.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), IdentityError> {
        let result = async {
            let outcome = self.identity.sign_in(email, password).await?;
            if !outcome.is_signed_in {
                info!("Sign-in for {} needs a further step; staying signed out", email);
                return Ok(None);
            }
            let identity = self.identity.current_user().await?;
            Ok::<_, IdentityError>(Some(user_from_identity(identity, email.to_string())))
        }
        .await;

        match result {
            Ok(Some(user)) => {
                info!("User {} logged in", user.id);
                self.set_user(Some(user));
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(e) => {
                error!("Login error: {}", e);
                Err(e)
            }
        }
    }

    /// Signs out. Failures are logged, never returned; whether the local user is
    /// cleared on failure depends on the configured `LogoutPolicy`.
    pub async fn logout(&self) {
        match self.identity.sign_out().await {
            Ok(()) => {
                self.set_user(None);
                info!("User logged out");
            }
            Err(e) => {
                error!("Logout error: {}", e);
                if self.logout_policy == LogoutPolicy::AlwaysClear {
                    warn!("Clearing local user despite failed sign-out");
                    self.set_user(None);
                }
            }
        }
    }

    /// Registers a new account. Does not sign the user in.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<(), IdentityError> {
        let request = SignUpRequest {
            username: email.to_string(),
            password: password.to_string(),
            email: email.to_string(),
            name: name.to_string(),
        };
        self.identity.sign_up(request).await.map_err(|e| {
            error!("Signup error: {}", e);
            e
        })
    }
}
