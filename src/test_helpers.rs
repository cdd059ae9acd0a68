//! Shared fixtures for unit tests: token minting, mock identity provider,
//! and an in-process HTTP server.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use jsonwebtoken::{EncodingKey, Header};

use crate::auth::provider::{AuthError, IdentityProvider, SignUpOutcome};
use crate::auth::session::{Session, now_secs};

/// Mint an HS256 JWT carrying `iat`/`exp`. Signature is never checked by the client.
pub fn mint_token(iat: i64, exp: i64) -> String {
    let claims = serde_json::json!({
        "sub": "user-sub-1",
        "email": "cook@example.com",
        "iat": iat,
        "exp": exp,
    });
    jsonwebtoken::encode(&Header::default(), &claims, &EncodingKey::from_secret(b"test-secret")).unwrap()
}

/// Session valid for the next hour.
pub fn fresh_session(username: &str) -> Session {
    let now = now_secs();
    Session::from_tokens(username, mint_token(now, now + 3600), mint_token(now, now + 3600), "refresh-1", now).unwrap()
}

/// Session that expired an hour ago, optionally refreshable.
pub fn expired_session(username: &str, refresh_token: &str) -> Session {
    let now = now_secs();
    let issued = now - 7200;
    Session {
        username: username.to_owned(),
        id_token: mint_token(issued, now - 3600),
        access_token: mint_token(issued, now - 3600),
        refresh_token: refresh_token.to_owned(),
        clock_drift: 0,
    }
}

// =============================================================================
// MockProvider
// =============================================================================

/// Identity provider double with scripted outcomes and call counters.
#[derive(Default)]
pub struct MockProvider {
    pub sign_in_result: Mutex<Option<Result<Session, AuthError>>>,
    pub refresh_result: Mutex<Option<Result<Session, AuthError>>>,
    pub sign_in_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub sign_up_calls: AtomicUsize,
    pub confirm_calls: AtomicUsize,
    pub resend_calls: AtomicUsize,
}

impl MockProvider {
    pub fn signing_in_as(session: Session) -> Self {
        let mock = Self::default();
        *mock.sign_in_result.lock().unwrap() = Some(Ok(session));
        mock
    }

    pub fn refreshing_to(session: Session) -> Self {
        let mock = Self::default();
        *mock.refresh_result.lock().unwrap() = Some(Ok(session));
        mock
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

fn rejected() -> AuthError {
    AuthError::AuthenticationFailure {
        code: "NotAuthorizedException".into(),
        message: "Incorrect username or password.".into(),
    }
}

#[async_trait::async_trait]
impl IdentityProvider for MockProvider {
    async fn sign_up(&self, email: &str, _password: &str) -> Result<SignUpOutcome, AuthError> {
        self.sign_up_calls.fetch_add(1, Ordering::SeqCst);
        Ok(SignUpOutcome { user_confirmed: false, user_sub: Some("sub-1".into()), code_destination: Some(email.into()) })
    }

    async fn confirm_sign_up(&self, _email: &str, code: &str) -> Result<(), AuthError> {
        self.confirm_calls.fetch_add(1, Ordering::SeqCst);
        if code == "000000" {
            return Err(AuthError::AuthenticationFailure {
                code: "CodeMismatchException".into(),
                message: "Invalid verification code provided, please try again.".into(),
            });
        }
        Ok(())
    }

    async fn resend_code(&self, _email: &str) -> Result<Option<String>, AuthError> {
        self.resend_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some("c***@example.com".into()))
    }

    async fn authenticate(&self, _email: &str, _password: &str) -> Result<Session, AuthError> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        self.sign_in_result.lock().unwrap().clone().unwrap_or_else(|| Err(rejected()))
    }

    async fn refresh(&self, _session: &Session) -> Result<Session, AuthError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.refresh_result
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(AuthError::SessionInvalid("Refresh Token has expired".into())))
    }
}

// =============================================================================
// In-process HTTP server
// =============================================================================

/// Serve `router` on an ephemeral localhost port and return its base URL.
pub async fn spawn_server(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{addr}")
}
