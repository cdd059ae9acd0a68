//! Session model and its persisted record.
//!
//! DESIGN
//! ======
//! Tokens are JWTs issued by the user pool. The client never verifies
//! signatures (the remote API does); it only reads `iat`/`exp` to decide
//! whether a session is still worth presenting. Clock drift between this
//! machine and the issuer is captured once, when the session is created,
//! and applied to every later expiry check.

use jsonwebtoken::{DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use super::provider::AuthError;

/// Claims the client reads from identity and access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    pub exp: i64,
    pub iat: i64,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Decode a JWT payload without verifying its signature.
///
/// # Errors
///
/// Returns [`AuthError::SessionInvalid`] when the token is not a JWT or
/// lacks `exp`/`iat`.
pub fn decode_claims(token: &str) -> Result<TokenClaims, AuthError> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    jsonwebtoken::decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| AuthError::SessionInvalid(format!("unreadable token: {e}")))
}

/// Current time as seconds since Unix epoch.
#[must_use]
pub fn now_secs() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}

/// Tokens and identity obtained from a successful authentication.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredUser", into = "StoredUser")]
pub struct Session {
    pub username: String,
    pub id_token: String,
    pub access_token: String,
    pub refresh_token: String,
    /// Local clock minus issuer clock, in seconds, at creation.
    pub clock_drift: i64,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("clock_drift", &self.clock_drift)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Build a session from freshly issued tokens, measuring clock drift
    /// against `now`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SessionInvalid`] if either token is unreadable.
    pub fn from_tokens(
        username: impl Into<String>,
        id_token: impl Into<String>,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        now: i64,
    ) -> Result<Self, AuthError> {
        let id_token = id_token.into();
        let access_token = access_token.into();
        let id = decode_claims(&id_token)?;
        let access = decode_claims(&access_token)?;
        Ok(Self {
            username: username.into(),
            id_token,
            access_token,
            refresh_token: refresh_token.into(),
            clock_drift: now - id.iat.min(access.iat),
        })
    }

    /// Whether both tokens are unexpired at `now`, adjusted for clock drift.
    /// Unreadable tokens count as expired.
    #[must_use]
    pub fn is_valid_at(&self, now: i64) -> bool {
        let (Ok(id), Ok(access)) = (decode_claims(&self.id_token), decode_claims(&self.access_token)) else {
            return false;
        };
        let adjusted = now - self.clock_drift;
        adjusted < id.exp && adjusted < access.exp
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(now_secs())
    }

    #[must_use]
    pub fn can_refresh(&self) -> bool {
        !self.refresh_token.trim().is_empty()
    }

    /// Serialize into the persisted record format.
    ///
    /// # Errors
    ///
    /// Propagates `serde_json` failures.
    pub fn to_record(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a persisted record.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SessionInvalid`] for malformed records.
    pub fn from_record(raw: &str) -> Result<Self, AuthError> {
        serde_json::from_str(raw).map_err(|e| AuthError::SessionInvalid(format!("malformed session record: {e}")))
    }
}

// =============================================================================
// PERSISTED RECORD
// =============================================================================

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredUser {
    username: String,
    sign_in_user_session: StoredSession,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSession {
    id_token: StoredJwt,
    access_token: StoredJwt,
    refresh_token: StoredRefresh,
    #[serde(default)]
    clock_drift: i64,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredJwt {
    jwt_token: String,
}

#[derive(Serialize, Deserialize)]
struct StoredRefresh {
    #[serde(default)]
    token: String,
}

impl From<StoredUser> for Session {
    fn from(user: StoredUser) -> Self {
        let s = user.sign_in_user_session;
        Self {
            username: user.username,
            id_token: s.id_token.jwt_token,
            access_token: s.access_token.jwt_token,
            refresh_token: s.refresh_token.token,
            clock_drift: s.clock_drift,
        }
    }
}

impl From<Session> for StoredUser {
    fn from(session: Session) -> Self {
        Self {
            username: session.username,
            sign_in_user_session: StoredSession {
                id_token: StoredJwt { jwt_token: session.id_token },
                access_token: StoredJwt { jwt_token: session.access_token },
                refresh_token: StoredRefresh { token: session.refresh_token },
                clock_drift: session.clock_drift,
            },
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
