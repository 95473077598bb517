//! # Session Manager
//!
//! Owns the bearer token and the resolved user identity.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Session Lifecycle                                  │
//! │                                                                         │
//! │   new() ── token read from storage, loading = true                      │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │   initialize() ──► resolve_identity()                                   │
//! │                      │                                                  │
//! │          ┌───────────┼─────────────────────────┐                        │
//! │          │ no token  │ GET /users/me ok        │ GET /users/me failed   │
//! │          ▼           ▼                         ▼                        │
//! │     user = None   user = Some(profile)      logout()                    │
//! │     loading=false loading = false           (token, user, storage       │
//! │                                              all cleared)               │
//! │                                                                         │
//! │   login() ──► POST /token ──► set_token() ──► resolve_identity()        │
//! │   logout() ─► token = None, user = None, storage key removed            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Superseded Resolutions
//! Every token change bumps a generation counter. A resolution remembers the
//! generation it started under and discards its result if the counter moved
//! while the request was in flight, so a logout (or re-login) during
//! `GET /users/me` always wins.
//!
//! The state lock is a `std::sync::RwLock` that is never held across an
//! `.await`, which keeps [`SessionManager::logout`] synchronous.

use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use secrecy::{ExposeSecret, SecretString};
use storefront_core::types::UserProfile;
use storefront_core::validation::{validate_email, validate_password, validate_password_confirmation};
use storefront_core::ValidationError;
use tracing::{debug, info, instrument, warn};

use crate::api::StorefrontApi;
use crate::error::ClientResult;
use crate::storage::KeyValueStore;

// =============================================================================
// Public Types
// =============================================================================

/// Point-in-time view of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// A token is held (it may not be validated yet).
    pub has_token: bool,
    /// Set only after the token was validated by the backend.
    pub user: Option<UserProfile>,
    /// True only during the startup resolution.
    pub loading: bool,
}

/// Result of the registration form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// Account created. The user still has to log in.
    Registered,
    /// Rejected locally; nothing was sent.
    Rejected(ValidationError),
    /// The backend or the network refused the request.
    Failed(String),
}

struct SessionState {
    token: Option<SecretString>,
    user: Option<UserProfile>,
    loading: bool,
    generation: u64,
}

// =============================================================================
// Session Manager
// =============================================================================

/// Login, logout, registration and identity resolution.
pub struct SessionManager {
    api: Arc<dyn StorefrontApi>,
    store: Arc<dyn KeyValueStore>,
    token_key: String,
    state: RwLock<SessionState>,
}

impl SessionManager {
    /// Creates the manager and restores the persisted token.
    ///
    /// The session starts in the loading state; call
    /// [`SessionManager::initialize`] to resolve the identity.
    pub fn new(
        api: Arc<dyn StorefrontApi>,
        store: Arc<dyn KeyValueStore>,
        token_key: impl Into<String>,
    ) -> Self {
        let token_key = token_key.into();

        let token = match store.get(&token_key) {
            Ok(Some(raw)) if !raw.trim().is_empty() => Some(raw.trim().to_string()),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "Could not read stored token, starting signed out");
                None
            }
        };

        debug!(restored = token.is_some(), "Session created");
        api.set_bearer(token.as_deref());

        SessionManager {
            api,
            store,
            token_key,
            state: RwLock::new(SessionState {
                token: token.map(SecretString::from),
                user: None,
                loading: true,
                generation: 0,
            }),
        }
    }

    /// Startup identity resolution.
    pub async fn initialize(&self) {
        self.resolve_identity().await;
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Exchanges credentials for a token.
    ///
    /// Returns `true` once a token was obtained and stored; the identity is
    /// then resolved before returning. On failure the previous session is
    /// left untouched and `false` is returned.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &SecretString) -> bool {
        if let Err(e) = validate_email(email).and_then(|_| validate_password(password.expose_secret())) {
            debug!(error = %e, "Login rejected before sending");
            return false;
        }

        let token = match self.api.obtain_token(email.trim(), password).await {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Login failed");
                return false;
            }
        };

        self.set_token(token.access_token);
        info!("Logged in");

        self.resolve_identity().await;
        true
    }

    /// Clears the token, the user and the stored token. Idempotent.
    pub fn logout(&self) {
        let mut state = self.write_state();
        self.reset(&mut state);
        info!("Logged out");
    }

    /// Creates an account. Does not log in.
    #[instrument(skip(self, password))]
    pub async fn register(&self, email: &str, password: &SecretString) -> bool {
        if let Err(e) = validate_email(email).and_then(|_| validate_password(password.expose_secret())) {
            debug!(error = %e, "Registration rejected before sending");
            return false;
        }
        self.try_register(email, password).await.is_ok()
    }

    /// Registration with the confirmation field checked first.
    #[instrument(skip(self, password, confirm))]
    pub async fn register_with_confirmation(
        &self,
        email: &str,
        password: &SecretString,
        confirm: &SecretString,
    ) -> RegisterOutcome {
        let checked = validate_email(email)
            .and_then(|_| validate_password(password.expose_secret()))
            .and_then(|_| validate_password_confirmation(password.expose_secret(), confirm.expose_secret()));

        if let Err(e) = checked {
            return RegisterOutcome::Rejected(e);
        }

        match self.try_register(email, password).await {
            Ok(_) => RegisterOutcome::Registered,
            Err(e) => RegisterOutcome::Failed(e.to_string()),
        }
    }

    /// Fetches the identity for the current token.
    ///
    /// Without a token the user is cleared. A failed fetch logs out. The
    /// result is dropped if the token changed while the request was in
    /// flight.
    pub async fn resolve_identity(&self) {
        let (generation, has_token) = {
            let state = self.read_state();
            (state.generation, state.token.is_some())
        };

        if !has_token {
            let mut state = self.write_state();
            if state.generation == generation {
                state.user = None;
                state.loading = false;
            }
            return;
        }

        let result = self.api.current_user().await;

        let mut state = self.write_state();
        if state.generation != generation {
            debug!(
                started = generation,
                current = state.generation,
                "Discarding superseded identity resolution"
            );
            return;
        }

        match result {
            Ok(user) => {
                info!(user_id = %user.id, email = %user.email, "Identity resolved");
                state.user = Some(user);
                state.loading = false;
            }
            Err(e) => {
                warn!(error = %e, "Identity resolution failed, logging out");
                self.reset(&mut state);
            }
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn snapshot(&self) -> Session {
        let state = self.read_state();
        Session {
            has_token: state.token.is_some(),
            user: state.user.clone(),
            loading: state.loading,
        }
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.read_state().user.clone()
    }

    pub fn token_present(&self) -> bool {
        self.read_state().token.is_some()
    }

    /// A validated identity is present.
    pub fn is_authenticated(&self) -> bool {
        self.read_state().user.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.read_state().loading
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn try_register(&self, email: &str, password: &SecretString) -> ClientResult<UserProfile> {
        match self.api.create_user(email.trim(), password).await {
            Ok(user) => {
                info!(user_id = %user.id, "Account registered");
                Ok(user)
            }
            Err(e) => {
                warn!(error = %e, "Registration failed");
                Err(e)
            }
        }
    }

    /// Stores a new token in memory, in storage and on the API client.
    fn set_token(&self, token: String) {
        let mut state = self.write_state();
        state.generation += 1;
        state.user = None;

        if let Err(e) = self.store.set(&self.token_key, &token) {
            warn!(error = %e, "Could not persist token");
        }
        self.api.set_bearer(Some(&token));
        state.token = Some(SecretString::from(token));
    }

    /// Returns the session to the signed-out state. Runs under the write lock.
    fn reset(&self, state: &mut SessionState) {
        state.generation += 1;
        state.token = None;
        state.user = None;
        state.loading = false;

        self.api.set_bearer(None);
        if let Err(e) = self.store.remove(&self.token_key) {
            warn!(error = %e, "Could not remove stored token");
        }
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
