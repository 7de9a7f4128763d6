//! Content API credentials supplied through the environment

use std::fmt;

use crate::error::{ContentError, Result};

/// Environment variable holding the repository API endpoint
pub const ENDPOINT_VAR: &str = "PRISMIC_END_POINT";

/// Environment variable holding the repository access token
pub const ACCESS_TOKEN_VAR: &str = "PRISMIC_ACCESS_TOKEN";

/// Endpoint and token for the content API, read once at startup
#[derive(Clone, PartialEq, Eq)]
pub struct ContentApiConfig {
    pub endpoint: String,
    pub access_token: String,
}

impl ContentApiConfig {
    /// Build a config from explicit values, validating both
    pub fn new(endpoint: impl Into<String>, access_token: impl Into<String>) -> Result<Self> {
        let endpoint = endpoint.into().trim().trim_end_matches('/').to_string();
        let access_token = access_token.into().trim().to_string();

        if endpoint.is_empty() {
            return Err(ContentError::Configuration(format!(
                "{} is empty",
                ENDPOINT_VAR
            )));
        }
        let parsed = reqwest::Url::parse(&endpoint).map_err(|e| {
            ContentError::Configuration(format!("{} is not a valid URL: {}", ENDPOINT_VAR, e))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ContentError::Configuration(format!(
                "{} must be an http(s) URL, got scheme {:?}",
                ENDPOINT_VAR,
                parsed.scheme()
            )));
        }
        if access_token.is_empty() {
            return Err(ContentError::Configuration(format!(
                "{} is empty",
                ACCESS_TOKEN_VAR
            )));
        }

        Ok(Self {
            endpoint,
            access_token,
        })
    }

    /// Read the config from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the config through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = lookup(ENDPOINT_VAR).ok_or_else(|| {
            ContentError::Configuration(format!("{} is not set", ENDPOINT_VAR))
        })?;
        let access_token = lookup(ACCESS_TOKEN_VAR).ok_or_else(|| {
            ContentError::Configuration(format!("{} is not set", ACCESS_TOKEN_VAR))
        })?;
        Self::new(endpoint, access_token)
    }
}

// Keeps the token out of logs and panic messages
impl fmt::Debug for ContentApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentApiConfig")
            .field("endpoint", &self.endpoint)
            .field("access_token", &"<redacted>")
            .finish()
    }
}
