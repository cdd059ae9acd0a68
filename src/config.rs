//! Client configuration parsed from environment variables.
//!
//! `from_env` is a thin wrapper over [`ClientConfig::from_lookup`], which takes
//! any key lookup so tests never touch the process environment.

use std::path::PathBuf;

pub const DEFAULT_API_BASE_URL: &str = "https://sryh2mh2sg.execute-api.us-east-1.amazonaws.com/prod/api";
pub const DEFAULT_USER_POOL_ID: &str = "us-east-1_5Dqa8D8i7";
pub const DEFAULT_CLIENT_ID: &str = "6qrre3jn99ddasc9q6p7036vcg";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Errors produced while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("user pool id {0:?} is not of the form <region>_<id>")]
    InvalidUserPoolId(String),
}

impl crate::error::ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidValue { .. } => "E_CONFIG_VALUE",
            Self::InvalidUserPoolId(_) => "E_CONFIG_USER_POOL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

impl HttpTimeouts {
    /// Build a `reqwest` client honoring these timeouts.
    ///
    /// # Errors
    ///
    /// Returns the underlying builder error when the TLS backend cannot initialize.
    pub fn http_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(self.request_secs))
            .connect_timeout(std::time::Duration::from_secs(self.connect_secs))
            .build()
    }
}

/// Hosted user pool coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    pub user_pool_id: String,
    pub client_id: String,
    pub region: String,
    pub endpoint: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub identity: IdentityConfig,
    pub timeouts: HttpTimeouts,
    /// Directory for the file-backed session store. `None` when no user
    /// config directory exists and none was configured.
    pub session_dir: Option<PathBuf>,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `CLOUDCHEF_API_BASE_URL`: remote API base, default production gateway
    /// - `CLOUDCHEF_USER_POOL_ID`: `<region>_<id>`
    /// - `CLOUDCHEF_CLIENT_ID`: user pool app client id
    /// - `CLOUDCHEF_IDENTITY_ENDPOINT`: default `https://cognito-idp.<region>.amazonaws.com`
    /// - `CLOUDCHEF_REQUEST_TIMEOUT_SECS`: default 30
    /// - `CLOUDCHEF_CONNECT_TIMEOUT_SECS`: default 10
    /// - `CLOUDCHEF_SESSION_DIR`: default `<config dir>/cloudchef`
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric value does not parse or the pool id has no region.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`ClientConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = trim_url(lookup("CLOUDCHEF_API_BASE_URL").as_deref().unwrap_or(DEFAULT_API_BASE_URL));

        let user_pool_id = lookup("CLOUDCHEF_USER_POOL_ID").unwrap_or_else(|| DEFAULT_USER_POOL_ID.to_owned());
        let region = region_from_pool_id(&user_pool_id)?;
        let client_id = lookup("CLOUDCHEF_CLIENT_ID").unwrap_or_else(|| DEFAULT_CLIENT_ID.to_owned());
        let endpoint = lookup("CLOUDCHEF_IDENTITY_ENDPOINT")
            .map_or_else(|| default_identity_endpoint(&region), |raw| trim_url(&raw));

        let timeouts = HttpTimeouts {
            request_secs: parse_u64(&lookup, "CLOUDCHEF_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_secs: parse_u64(&lookup, "CLOUDCHEF_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };

        let session_dir = lookup("CLOUDCHEF_SESSION_DIR")
            .map(PathBuf::from)
            .or_else(|| dirs::config_dir().map(|dir| dir.join("cloudchef")));

        Ok(Self {
            api_base_url,
            identity: IdentityConfig { user_pool_id, client_id, region, endpoint },
            timeouts,
            session_dir,
        })
    }
}

fn parse_u64<F>(lookup: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}

fn trim_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

/// Extract the region prefix from a `<region>_<id>` user pool id.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidUserPoolId`] when either half is empty.
pub fn region_from_pool_id(pool_id: &str) -> Result<String, ConfigError> {
    match pool_id.split_once('_') {
        Some((region, id)) if !region.is_empty() && !id.is_empty() => Ok(region.to_owned()),
        _ => Err(ConfigError::InvalidUserPoolId(pool_id.to_owned())),
    }
}

fn default_identity_endpoint(region: &str) -> String {
    format!("https://cognito-idp.{region}.amazonaws.com")
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
