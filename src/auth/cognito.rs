//! Hosted user pool client speaking the Cognito Identity Provider JSON
//! protocol.
//!
//! Every operation is a `POST /` to the regional endpoint with the
//! operation named in `X-Amz-Target`. Only unauthenticated operations are
//! used, so requests carry the app client id and no AWS signature.
//!
//! Sign-in uses `USER_PASSWORD_AUTH`; the app client must allow that flow.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::provider::{AuthError, IdentityProvider, SignUpOutcome};
use super::session::{Session, now_secs};
use crate::config::{HttpTimeouts, IdentityConfig};

const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";

pub struct CognitoClient {
    http: reqwest::Client,
    endpoint: String,
    client_id: String,
}

impl CognitoClient {
    /// # Errors
    ///
    /// Returns [`AuthError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn new(config: &IdentityConfig, timeouts: HttpTimeouts) -> Result<Self, AuthError> {
        let http = timeouts
            .http_client()
            .map_err(|e| AuthError::HttpClientBuild(e.to_string()))?;
        Ok(Self::with_http(http, &config.endpoint, &config.client_id))
    }

    pub fn with_http(http: reqwest::Client, endpoint: &str, client_id: &str) -> Self {
        Self { http, endpoint: endpoint.trim_end_matches('/').to_owned(), client_id: client_id.to_owned() }
    }

    async fn call<Req, Resp>(&self, operation: &str, body: &Req) -> Result<Resp, AuthError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let payload = serde_json::to_string(body).map_err(|e| AuthError::Transport(e.to_string()))?;
        let response = self
            .http
            .post(format!("{}/", self.endpoint))
            .header("X-Amz-Target", format!("{TARGET_PREFIX}.{operation}"))
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .body(payload)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        if !(200..300).contains(&status) {
            tracing::debug!(operation, status, "identity provider rejected request");
            return Err(provider_error(status, &text));
        }
        serde_json::from_str(&text).map_err(|e| AuthError::Transport(format!("unexpected {operation} response: {e}")))
    }

    async fn initiate_auth(&self, flow: &'static str, parameters: AuthParameters<'_>) -> Result<AuthResult, AuthError> {
        let body = InitiateAuthRequest { auth_flow: flow, client_id: &self.client_id, auth_parameters: parameters };
        let response: InitiateAuthResponse = self.call("InitiateAuth", &body).await?;
        if let Some(challenge) = response.challenge_name {
            return Err(AuthError::AuthenticationFailure {
                message: format!("additional sign-in step required: {challenge}"),
                code: challenge,
            });
        }
        response.authentication_result.ok_or_else(|| AuthError::AuthenticationFailure {
            code: "MissingAuthenticationResult".into(),
            message: "identity provider returned no tokens".into(),
        })
    }
}

/// Map an error response (`{"__type": "...#NotAuthorizedException", "message": "..."}`).
fn provider_error(status: u16, body: &str) -> AuthError {
    if status >= 500 {
        return AuthError::Transport(format!("identity provider returned {status}"));
    }
    let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
    let (code, message) = match parsed {
        Some(err) => {
            let code = err
                .kind
                .as_deref()
                .map(|k| k.rsplit('#').next().unwrap_or(k).to_owned())
                .unwrap_or_else(|| "Unknown".into());
            let message = err.message.unwrap_or_else(|| code.clone());
            (code, message)
        }
        None => ("Unknown".into(), body.trim().to_owned()),
    };
    AuthError::AuthenticationFailure { code, message }
}

#[async_trait::async_trait]
impl IdentityProvider for CognitoClient {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        let body = SignUpRequest { client_id: &self.client_id, username: email, password };
        let response: SignUpResponse = self.call("SignUp", &body).await?;
        Ok(SignUpOutcome {
            user_confirmed: response.user_confirmed,
            user_sub: response.user_sub,
            code_destination: response.code_delivery_details.and_then(|d| d.destination),
        })
    }

    async fn confirm_sign_up(&self, email: &str, code: &str) -> Result<(), AuthError> {
        let body = ConfirmSignUpRequest {
            client_id: &self.client_id,
            username: email,
            confirmation_code: code,
            force_alias_creation: true,
        };
        let _: serde_json::Value = self.call("ConfirmSignUp", &body).await?;
        Ok(())
    }

    async fn resend_code(&self, email: &str) -> Result<Option<String>, AuthError> {
        let body = ResendCodeRequest { client_id: &self.client_id, username: email };
        let response: ResendCodeResponse = self.call("ResendConfirmationCode", &body).await?;
        Ok(response.code_delivery_details.and_then(|d| d.destination))
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let params = AuthParameters { username: Some(email), password: Some(password), refresh_token: None };
        let result = self.initiate_auth("USER_PASSWORD_AUTH", params).await?;
        let refresh = result.refresh_token.unwrap_or_default();
        Session::from_tokens(email, result.id_token, result.access_token, refresh, now_secs())
    }

    async fn refresh(&self, session: &Session) -> Result<Session, AuthError> {
        let params = AuthParameters { username: None, password: None, refresh_token: Some(&session.refresh_token) };
        let result = self
            .initiate_auth("REFRESH_TOKEN_AUTH", params)
            .await
            .map_err(|e| match e {
                AuthError::AuthenticationFailure { message, .. } => AuthError::SessionInvalid(message),
                other => other,
            })?;
        // The pool only rotates the refresh token when configured to.
        let refresh = result.refresh_token.unwrap_or_else(|| session.refresh_token.clone());
        Session::from_tokens(&session.username, result.id_token, result.access_token, refresh, now_secs())
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SignUpRequest<'a> {
    client_id: &'a str,
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SignUpResponse {
    #[serde(default)]
    user_confirmed: bool,
    #[serde(default)]
    user_sub: Option<String>,
    #[serde(default)]
    code_delivery_details: Option<CodeDeliveryDetails>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CodeDeliveryDetails {
    #[serde(default)]
    destination: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ConfirmSignUpRequest<'a> {
    client_id: &'a str,
    username: &'a str,
    confirmation_code: &'a str,
    force_alias_creation: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ResendCodeRequest<'a> {
    client_id: &'a str,
    username: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ResendCodeResponse {
    #[serde(default)]
    code_delivery_details: Option<CodeDeliveryDetails>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthRequest<'a> {
    auth_flow: &'static str,
    client_id: &'a str,
    auth_parameters: AuthParameters<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct AuthParameters<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    #[serde(default)]
    authentication_result: Option<AuthResult>,
    #[serde(default)]
    challenge_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthResult {
    id_token: String,
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(rename = "__type", default)]
    kind: Option<String>,
    #[serde(default, alias = "Message")]
    message: Option<String>,
}

#[cfg(test)]
#[path = "cognito_test.rs"]
mod tests;
