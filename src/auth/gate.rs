//! Session gate: the single owner of authentication state.
//!
//! ARCHITECTURE
//! ============
//! A `SessionGate` is a cheap clonable handle. Views and the API client get
//! a clone injected; nothing reads a global. State changes are published on
//! a `watch` channel so views can re-render on `subscribe()`.
//!
//! LIFECYCLE
//! =========
//! `Pending -> Authenticated | Unauthenticated`, exactly once per gate.
//! Restoring the persisted session runs at most once (`OnceCell`), whether
//! triggered by `initialize()` or lazily by the first `get_token()`. After
//! that the state only moves between the two resolved phases through
//! sign-in, sign-out, refresh, or a failed refresh.
//!
//! ERROR HANDLING
//! ==============
//! Provider and storage failures during restore or token refresh are logged
//! and degrade to signed-out. Only a provider rejection deletes the stored
//! record; an unreachable provider leaves it for the next load. Errors from explicit user actions (`sign_in`,
//! `sign_up`, ...) are returned to the caller unchanged.

use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell, watch};

use super::forms;
use super::provider::{AuthError, IdentityProvider, SignUpOutcome};
use super::session::Session;
use super::store::KeyValueStore;

/// Storage key of the persisted session record.
pub const SESSION_STORAGE_KEY: &str = "user";

/// UI-facing projection of the gate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<Session>,
    pub loading: bool,
}

impl Default for AuthState {
    /// Every gate starts pending.
    fn default() -> Self {
        Self { user: None, loading: true }
    }
}

impl AuthState {
    #[must_use]
    pub fn phase(&self) -> AuthPhase {
        match (self.loading, &self.user) {
            (true, _) => AuthPhase::Pending,
            (false, Some(_)) => AuthPhase::Authenticated,
            (false, None) => AuthPhase::Unauthenticated,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthPhase {
    Pending,
    Authenticated,
    Unauthenticated,
}

#[derive(Clone)]
pub struct SessionGate {
    inner: Arc<GateInner>,
}

struct GateInner {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn KeyValueStore>,
    state: watch::Sender<AuthState>,
    restored: OnceCell<()>,
    refresh_lock: Mutex<()>,
}

impl SessionGate {
    pub fn new(provider: Arc<dyn IdentityProvider>, store: Arc<dyn KeyValueStore>) -> Self {
        let (state, _) = watch::channel(AuthState::default());
        Self {
            inner: Arc::new(GateInner { provider, store, state, restored: OnceCell::new(), refresh_lock: Mutex::new(()) }),
        }
    }

    /// Receive every subsequent state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.state.subscribe()
    }

    #[must_use]
    pub fn auth_state(&self) -> AuthState {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<Session> {
        self.inner.state.borrow().user.clone()
    }

    fn is_loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    // =========================================================================
    // STARTUP
    // =========================================================================

    /// Resolve the persisted session, if any. Safe to call repeatedly;
    /// concurrent callers share one restore.
    pub async fn initialize(&self) -> AuthState {
        self.inner.restored.get_or_init(|| self.restore()).await;
        self.auth_state()
    }

    async fn restore(&self) {
        if !self.is_loading() {
            return;
        }

        let raw = match self.inner.store.get(SESSION_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!("no persisted session");
                self.settle(None);
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "session store unreadable; starting signed out");
                self.settle(None);
                return;
            }
        };

        let restored = match Session::from_record(&raw) {
            Ok(session) => self.revalidate(session).await,
            Err(e) => Err(e),
        };

        // A sign-in may have landed while the provider was busy; it wins.
        if !self.is_loading() {
            return;
        }

        match restored {
            Ok((session, refreshed)) => {
                if refreshed {
                    self.persist(&session);
                }
                tracing::info!(username = %session.username, refreshed, "session restored");
                self.settle(Some(session));
            }
            Err(e) if e.invalidates_session() => {
                tracing::info!(reason = %e, "discarding persisted session");
                self.forget();
                self.settle(None);
            }
            Err(e) => {
                tracing::warn!(reason = %e, "session check failed; starting signed out, record kept");
                self.settle(None);
            }
        }
    }

    /// Leave `Pending`. No-op once resolved.
    fn settle(&self, user: Option<Session>) {
        self.inner.state.send_if_modified(|state| {
            if !state.loading {
                return false;
            }
            state.user = user;
            state.loading = false;
            true
        });
    }

    /// Check local expiry; if expired, try one refresh. The flag reports
    /// whether a refresh happened.
    async fn revalidate(&self, session: Session) -> Result<(Session, bool), AuthError> {
        if session.is_valid() {
            return Ok((session, false));
        }
        if !session.can_refresh() {
            return Err(AuthError::SessionInvalid("session expired".into()));
        }
        let refreshed = self.inner.provider.refresh(&session).await?;
        if !refreshed.is_valid() {
            return Err(AuthError::SessionInvalid("refreshed session is already expired".into()));
        }
        Ok((refreshed, true))
    }

    // =========================================================================
    // TOKEN ACCESS
    // =========================================================================

    /// Identity token of a valid session, or `None` to proceed unauthenticated.
    ///
    /// Forces initialization first, so no caller ever sees a token (or its
    /// absence) while the gate is still pending. An expired session gets one
    /// silent refresh; if that fails the gate signs out. A rejected refresh
    /// also clears the stored record; a transport failure keeps it for the
    /// next load.
    pub async fn get_token(&self) -> Option<String> {
        self.initialize().await;

        let session = self.current_user()?;
        if session.is_valid() {
            return Some(session.id_token);
        }

        let _guard = self.inner.refresh_lock.lock().await;
        // Re-read: another caller may have refreshed or signed out while we waited.
        let session = self.current_user()?;
        if session.is_valid() {
            return Some(session.id_token);
        }

        let outcome = self.revalidate(session.clone()).await;
        if self.current_user().as_ref() != Some(&session) {
            // Signed out or replaced mid-refresh: drop the result.
            return self.current_user().filter(Session::is_valid).map(|s| s.id_token);
        }
        match outcome {
            Ok((fresh, _)) => {
                tracing::info!(username = %fresh.username, "session refreshed");
                self.set_user(Some(fresh.clone()));
                Some(fresh.id_token)
            }
            Err(e) if e.invalidates_session() => {
                tracing::warn!(reason = %e, username = %session.username, "session refresh rejected; signing out");
                self.set_user(None);
                None
            }
            Err(e) => {
                tracing::warn!(reason = %e, username = %session.username, "session refresh failed; signed out, record kept");
                self.publish(None);
                None
            }
        }
    }

    // =========================================================================
    // MUTATION
    // =========================================================================

    /// Replace the current user. `Some` persists the session, `None` clears
    /// both memory and durable storage. Resolves a pending gate.
    pub fn set_user(&self, user: Option<Session>) {
        match &user {
            Some(session) => self.persist(session),
            None => self.forget(),
        }
        self.publish(user);
    }

    /// Update memory and notify without touching durable storage.
    fn publish(&self, user: Option<Session>) {
        self.inner.state.send_replace(AuthState { user, loading: false });
        let _ = self.inner.restored.set(());
    }

    fn persist(&self, session: &Session) {
        let result = session
            .to_record()
            .map_err(|e| e.to_string())
            .and_then(|raw| self.inner.store.set(SESSION_STORAGE_KEY, &raw).map_err(|e| e.to_string()));
        if let Err(error) = result {
            tracing::warn!(%error, "failed to persist session; it will not survive a reload");
        }
    }

    fn forget(&self) {
        if let Err(e) = self.inner.store.clear(SESSION_STORAGE_KEY) {
            tracing::warn!(error = %e, "failed to clear persisted session");
        }
    }

    // =========================================================================
    // USER ACTIONS
    // =========================================================================

    /// Authenticate and persist the new session.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidInput`] before any network call, otherwise whatever
    /// the provider reports. State is untouched on failure.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = forms::validate_sign_in(email, password)?;
        let session = self.inner.provider.authenticate(&email, password).await?;
        tracing::info!(username = %session.username, "signed in");
        self.set_user(Some(session.clone()));
        Ok(session)
    }

    pub fn sign_out(&self) {
        if let Some(session) = self.current_user() {
            tracing::info!(username = %session.username, "signed out");
        }
        self.set_user(None);
    }

    /// # Errors
    ///
    /// [`AuthError::InvalidInput`] for a bad email or weak password, otherwise
    /// the provider's rejection.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        let email = forms::validate_sign_up(email, password)?;
        let outcome = self.inner.provider.sign_up(&email, password).await?;
        tracing::info!(%email, confirmed = outcome.user_confirmed, "account created");
        Ok(outcome)
    }

    /// # Errors
    ///
    /// [`AuthError::InvalidInput`] for a malformed code, otherwise the provider's rejection.
    pub async fn confirm_sign_up(&self, email: &str, code: &str) -> Result<(), AuthError> {
        let email = forms::validate_email(email)?;
        let code = forms::validate_code(code)?;
        self.inner.provider.confirm_sign_up(&email, &code).await?;
        tracing::info!(%email, "account verified");
        Ok(())
    }

    /// # Errors
    ///
    /// [`AuthError::InvalidInput`] for a bad email, otherwise the provider's rejection.
    pub async fn resend_code(&self, email: &str) -> Result<Option<String>, AuthError> {
        let email = forms::validate_email(email)?;
        self.inner.provider.resend_code(&email).await
    }
}

#[cfg(test)]
#[path = "gate_test.rs"]
mod tests;
