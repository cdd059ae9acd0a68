//! Identity provider seam.
//!
//! The hosted user pool is reached through [`IdentityProvider`], a single
//! async trait returning `Result`, so sign-in call sites have one
//! continuation instead of success/failure/challenge callbacks. The
//! production implementation lives in `cognito`; tests substitute mocks.

use super::session::Session;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by identity provider operations and session handling.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Invalid credentials, unverified account, or any other provider-side
    /// rejection of an explicit user action.
    #[error("{message}")]
    AuthenticationFailure { code: String, message: String },

    /// Expired or unparsable session. Absorbed at startup, never shown.
    #[error("session invalid: {0}")]
    SessionInvalid(String),

    /// The identity provider could not be reached.
    #[error("identity provider unreachable: {0}")]
    Transport(String),

    /// Input rejected before any network call.
    #[error("{0}")]
    InvalidInput(&'static str),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl AuthError {
    /// Whether the provider judged the session itself dead, as opposed to
    /// being unreachable.
    #[must_use]
    pub fn invalidates_session(&self) -> bool {
        matches!(self, Self::SessionInvalid(_) | Self::AuthenticationFailure { .. })
    }
}

impl crate::error::ErrorCode for AuthError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::AuthenticationFailure { .. } => "E_AUTH_FAILED",
            Self::SessionInvalid(_) => "E_SESSION_INVALID",
            Self::Transport(_) => "E_AUTH_TRANSPORT",
            Self::InvalidInput(_) => "E_INVALID_INPUT",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Result of a sign-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpOutcome {
    /// `true` when the pool auto-confirmed the account (no code needed).
    pub user_confirmed: bool,
    pub user_sub: Option<String>,
    /// Masked destination the verification code was sent to.
    pub code_destination: Option<String>,
}

// =============================================================================
// PROVIDER TRAIT
// =============================================================================

/// Hosted user-pool operations. Enables mocking in tests.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register a new account; a verification code is sent to `email`.
    ///
    /// # Errors
    ///
    /// [`AuthError::AuthenticationFailure`] when the pool rejects the request
    /// (existing user, weak password), [`AuthError::Transport`] on network failure.
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError>;

    /// Confirm an account with the emailed numeric code.
    ///
    /// # Errors
    ///
    /// [`AuthError::AuthenticationFailure`] for wrong or expired codes.
    async fn confirm_sign_up(&self, email: &str, code: &str) -> Result<(), AuthError>;

    /// Send a fresh verification code. Returns the masked destination if known.
    ///
    /// # Errors
    ///
    /// [`AuthError::AuthenticationFailure`] when the pool refuses (rate limits, unknown user).
    async fn resend_code(&self, email: &str) -> Result<Option<String>, AuthError>;

    /// Exchange credentials for a session.
    ///
    /// # Errors
    ///
    /// [`AuthError::AuthenticationFailure`] for bad credentials, unconfirmed
    /// accounts, or an unsupported follow-up challenge.
    async fn authenticate(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// Obtain fresh identity/access tokens using the session's refresh token.
    ///
    /// # Errors
    ///
    /// [`AuthError::SessionInvalid`] when the refresh token is rejected.
    async fn refresh(&self, session: &Session) -> Result<Session, AuthError>;
}
