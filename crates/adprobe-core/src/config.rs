use std::time::Duration;

use crate::ConfigError;

pub const DEFAULT_UPSTREAM: &str = "http://localhost:8082";
pub const API_PREFIX: &str = "/api";

/// Everything a transport and its operations need, passed explicitly so that
/// several independently configured clients can coexist.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Option<Duration>,
    /// Pre-obtained SPNEGO token forwarded as `Authorization: Negotiate`.
    pub negotiate_token: Option<String>,
    pub accept_invalid_certs: bool,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let base_url = base_url.into();
        validate_base_url(&base_url)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: None,
            negotiate_token: None,
            accept_invalid_certs: false,
        })
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_negotiate_token(mut self, token: Option<String>) -> Self {
        self.negotiate_token = token
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        self
    }

    pub fn with_insecure(mut self, accept_invalid_certs: bool) -> Self {
        self.accept_invalid_certs = accept_invalid_certs;
        self
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// API base: an explicit override wins, otherwise the `/api` prefix on the
/// upstream origin.
pub fn resolve_base_url(api_url: Option<&str>, upstream: Option<&str>) -> String {
    if let Some(api_url) = api_url.map(str::trim).filter(|value| !value.is_empty()) {
        return api_url.trim_end_matches('/').to_string();
    }
    let upstream = upstream
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_UPSTREAM);
    format!("{}{}", upstream.trim_end_matches('/'), API_PREFIX)
}

fn validate_base_url(base_url: &str) -> Result<(), ConfigError> {
    let parsed = reqwest::Url::parse(base_url).map_err(|err| ConfigError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: err.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: format!("unsupported scheme {scheme}"),
        }),
    }
}
