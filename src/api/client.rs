//! Authenticated JSON transport.
//!
//! DESIGN
//! ======
//! Every call asks the session gate for a token first. The gate resolves a
//! pending restore before answering, so no request leaves while the session
//! state is unknown. A `None` token means the request goes out without an
//! `Authorization` header and the server decides.
//!
//! There is no retry and no partial result: a call either yields the parsed
//! body or exactly one [`ApiError`].

use reqwest::RequestBuilder;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::auth::SessionGate;
use crate::config::ClientConfig;
use crate::error::ErrorCode;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server answered with a non-success status. `body` is the raw
    /// response text.
    #[error("API error ({status}): {body}")]
    Status { status: u16, body: String },
    #[error("API request failed: {0}")]
    Transport(String),
    #[error("failed to decode API response: {0}")]
    Decode(String),
    #[error("failed to encode API request: {0}")]
    Encode(String),
    /// Rejected before anything was sent.
    #[error("{0}")]
    InvalidRequest(&'static str),
    #[error("failed to build HTTP client: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl ErrorCode for ApiError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Status { .. } => "E_API_STATUS",
            Self::Transport(_) => "E_API_TRANSPORT",
            Self::Decode(_) => "E_API_DECODE",
            Self::Encode(_) => "E_API_ENCODE",
            Self::InvalidRequest(_) => "E_API_INVALID_REQUEST",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    gate: SessionGate,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn new(config: &ClientConfig, gate: SessionGate) -> Result<Self, ApiError> {
        let http = config
            .timeouts
            .http_client()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self::with_http(http, &config.api_base_url, gate))
    }

    pub fn with_http(http: reqwest::Client, base_url: &str, gate: SessionGate) -> Self {
        Self { http, base_url: base_url.trim_end_matches('/').to_owned(), gate }
    }

    #[must_use]
    pub fn gate(&self) -> &SessionGate {
        &self.gate
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET {base}{path}` and parse the JSON response.
    ///
    /// # Errors
    ///
    /// [`ApiError::Status`] on a non-2xx answer, [`ApiError::Transport`] if
    /// the request never completed, [`ApiError::Decode`] if the body is not
    /// the expected JSON.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let text = self.send(self.http.get(self.url(path))).await?;
        decode(&text)
    }

    /// `POST {base}{path}` with `body` as JSON and parse the JSON response.
    ///
    /// # Errors
    ///
    /// As [`ApiClient::get`], plus [`ApiError::Encode`] if `body` cannot be
    /// serialized.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_vec(body).map_err(|e| ApiError::Encode(e.to_string()))?;
        let text = self.send(self.http.post(self.url(path)).body(payload)).await?;
        decode(&text)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let mut request = request.header(CONTENT_TYPE, "application/json");
        if let Some(token) = self.gate.get_token().await {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !(200..300).contains(&status) {
            tracing::debug!(status, "API call failed");
            return Err(ApiError::Status { status, body: text });
        }
        Ok(text)
    }
}

fn decode<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
