//! # Auth Store
//!
//! The current-user session: login, registration, logout, profile edits.
//!
//! There is no authentication backend. Accounts live in memory, seeded
//! with hard-coded demo users, and "network" calls are timed delays.
//!
//! ## Session Broadcast
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      AuthStore Events                           │
//! │                                                                 │
//! │  login ────────► AuthEvent::LoggedIn(user) ──┐                  │
//! │  register ─────► AuthEvent::LoggedIn(user) ──┼──► subscribers   │
//! │  logout ───────► AuthEvent::LoggedOut ───────┤   (CartStore     │
//! │  update_profile► AuthEvent::ProfileUpdated ──┘    re-keys its   │
//! │                                                   storage)      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//! Downstream stores MUST react to LoggedIn/LoggedOut by reloading or
//! dropping their per-user slices; this replaces the context-provider
//! broadcast of the original UI stack.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use uuid::Uuid;

use bookstore_core::validation::{
    validate_email, validate_password, validate_required, validate_username,
};
use bookstore_core::{CoreError, Role, User};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};

// =============================================================================
// Events
// =============================================================================

/// Session change broadcast to downstream stores.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    /// A user logged in (or registered, which logs them in).
    LoggedIn(User),
    /// The session ended. Persisted slices stay untouched.
    LoggedOut,
    /// The current user's profile fields changed.
    ProfileUpdated(User),
}

// =============================================================================
// Requests
// =============================================================================

/// Fields required to register an account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

/// Profile fields merged into the current user. `None` leaves a field
/// unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

// =============================================================================
// Store
// =============================================================================

#[derive(Debug)]
struct Inner {
    users: Vec<User>,
    current: Option<User>,
    last_error: Option<String>,
}

/// The session store.
///
/// ## Thread Safety
/// State lives behind `Arc<Mutex<Inner>>`: operations are quick and all
/// of them mutate, so a plain mutex beats a RwLock here. The struct is
/// `Clone` and all clones share the same session.
#[derive(Debug, Clone)]
pub struct AuthStore {
    inner: Arc<Mutex<Inner>>,
    events: broadcast::Sender<AuthEvent>,
    delay: Duration,
}

impl AuthStore {
    /// Creates a store seeded with the given accounts.
    pub fn new(accounts: Vec<User>, config: &StoreConfig) -> Self {
        let (events, _) = broadcast::channel(16);
        AuthStore {
            inner: Arc::new(Mutex::new(Inner {
                users: accounts,
                current: None,
                last_error: None,
            })),
            events,
            delay: config.auth_delay,
        }
    }

    /// Subscribes to session changes.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    /// The currently logged-in user, if any.
    pub fn current_user(&self) -> Option<User> {
        self.with_inner(|inner| inner.current.clone())
    }

    /// The last mutator failure, surfaced inline by forms.
    pub fn last_error(&self) -> Option<String> {
        self.with_inner(|inner| inner.last_error.clone())
    }

    /// Clears the mirrored error field.
    pub fn clear_error(&self) {
        self.with_inner(|inner| inner.last_error = None);
    }

    /// Validates credentials against the known accounts and opens a
    /// session.
    ///
    /// ## Errors
    /// `InvalidCredentials` when the pair matches no account.
    pub async fn login(&self, username: &str, password: &str) -> StoreResult<User> {
        debug!(username = %username, "login");
        sleep(self.delay).await;

        let result = self.with_inner(|inner| {
            let user = inner
                .users
                .iter()
                .find(|u| u.username == username && u.password == password)
                .cloned();

            match user {
                Some(user) => {
                    inner.current = Some(user.clone());
                    inner.last_error = None;
                    Ok(user)
                }
                None => Err(StoreError::Core(CoreError::InvalidCredentials)),
            }
        });

        match result {
            Ok(user) => {
                info!(user_id = %user.id, username = %user.username, "User logged in");
                let _ = self.events.send(AuthEvent::LoggedIn(user.clone()));
                Ok(user)
            }
            Err(e) => {
                warn!(username = %username, "Login rejected");
                self.record_error(&e);
                Err(e)
            }
        }
    }

    /// Creates a customer account and logs it in.
    ///
    /// ## Errors
    /// - `ValidationError` for missing/malformed required fields
    /// - `ValidationError::Duplicate` for an already-taken username
    pub async fn register(&self, new_user: NewUser) -> StoreResult<User> {
        debug!(username = %new_user.username, "register");
        sleep(self.delay).await;

        let result = (|| -> StoreResult<User> {
            validate_username(&new_user.username)?;
            validate_password(&new_user.password)?;
            validate_required("firstname", &new_user.firstname)?;
            validate_required("lastname", &new_user.lastname)?;
            validate_email(&new_user.email)?;

            self.with_inner(|inner| {
                if inner.users.iter().any(|u| u.username == new_user.username) {
                    return Err(bookstore_core::ValidationError::Duplicate {
                        field: "username".to_string(),
                        value: new_user.username.clone(),
                    }
                    .into());
                }

                let user = User {
                    id: Uuid::new_v4().to_string(),
                    username: new_user.username.clone(),
                    password: new_user.password.clone(),
                    firstname: new_user.firstname.clone(),
                    lastname: new_user.lastname.clone(),
                    email: new_user.email.clone(),
                    phone: new_user.phone.clone(),
                    address: new_user.address.clone(),
                    role: Role::Customer,
                };

                inner.users.push(user.clone());
                inner.current = Some(user.clone());
                inner.last_error = None;
                Ok(user)
            })
        })();

        match result {
            Ok(user) => {
                info!(user_id = %user.id, username = %user.username, "User registered");
                let _ = self.events.send(AuthEvent::LoggedIn(user.clone()));
                Ok(user)
            }
            Err(e) => {
                self.record_error(&e);
                Err(e)
            }
        }
    }

    /// Ends the session. The logged-out user's persisted slices are left
    /// untouched for their next login.
    pub fn logout(&self) {
        let had_user = self.with_inner(|inner| inner.current.take());

        if let Some(user) = had_user {
            info!(user_id = %user.id, "User logged out");
            let _ = self.events.send(AuthEvent::LoggedOut);
        }
    }

    /// Simulated password-reset request.
    ///
    /// Always succeeds for a syntactically plausible address; there is no
    /// mail to send.
    pub async fn forgot_password(&self, email: &str) -> StoreResult<()> {
        debug!(email = %email, "forgot_password");
        sleep(self.delay).await;

        if let Err(e) = validate_email(email) {
            let err = StoreError::Core(CoreError::InvalidEmail(format!("{email}: {e}")));
            self.record_error(&err);
            return Err(err);
        }

        info!(email = %email, "Password reset acknowledged (mock)");
        Ok(())
    }

    /// Merges profile fields into the current user.
    ///
    /// ## Errors
    /// - `NotLoggedIn` without a session
    /// - `ValidationError` for a malformed replacement email
    pub fn update_profile(&self, update: ProfileUpdate) -> StoreResult<User> {
        if let Some(email) = &update.email {
            if let Err(e) = validate_email(email) {
                let err: StoreError = e.into();
                self.record_error(&err);
                return Err(err);
            }
        }

        let result = self.with_inner(|inner| {
            let current = inner.current.as_mut().ok_or(StoreError::NotLoggedIn)?;

            if let Some(v) = update.firstname.clone() {
                current.firstname = v;
            }
            if let Some(v) = update.lastname.clone() {
                current.lastname = v;
            }
            if let Some(v) = update.email.clone() {
                current.email = v;
            }
            if let Some(v) = update.phone.clone() {
                current.phone = v;
            }
            if let Some(v) = update.address.clone() {
                current.address = v;
            }

            let updated = current.clone();

            // Keep the account list in step so the next login sees the
            // edited profile.
            if let Some(account) = inner.users.iter_mut().find(|u| u.id == updated.id) {
                *account = updated.clone();
            }

            inner.last_error = None;
            Ok(updated)
        });

        match result {
            Ok(user) => {
                info!(user_id = %user.id, "Profile updated");
                let _ = self.events.send(AuthEvent::ProfileUpdated(user.clone()));
                Ok(user)
            }
            Err(e) => {
                self.record_error(&e);
                Err(e)
            }
        }
    }

    fn record_error(&self, err: &StoreError) {
        self.with_inner(|inner| inner.last_error = Some(err.to_string()));
    }

    fn with_inner<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Inner) -> R,
    {
        let mut inner = self.inner.lock().expect("Auth mutex poisoned");
        f(&mut inner)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
