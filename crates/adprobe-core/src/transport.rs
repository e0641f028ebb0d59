use std::time::Instant;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::Method;
use tracing::debug;

use crate::{error_chain, ClientConfig, ConfigError, TransportError};

#[derive(Debug, Clone, Default)]
pub enum Credentials {
    /// Whatever the client already holds: session cookies and, when
    /// configured, a Negotiate token.
    #[default]
    Ambient,
    Basic {
        username: String,
        password: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub credentials: Credentials,
    pub no_cache: bool,
}

impl RequestOptions {
    pub fn ambient() -> Self {
        Self::default()
    }

    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            credentials: Credentials::Basic {
                username: username.into(),
                password: password.into(),
            },
            no_cache: false,
        }
    }

    pub fn no_cache(mut self) -> Self {
        self.no_cache = true;
        self
    }
}

/// An HTTP answer of any status. Transports hand these back for 4xx/5xx too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str, options: RequestOptions) -> Result<RawResponse, TransportError>;

    async fn post(
        &self,
        path: &str,
        body: Option<serde_json::Value>,
        options: RequestOptions,
    ) -> Result<RawResponse, TransportError>;
}

pub fn basic_authorization(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

/// reqwest-backed transport with an in-memory cookie jar.
pub struct HttpTransport {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpTransport {
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let mut builder = reqwest::Client::builder()
            .cookie_store(true)
            .danger_accept_invalid_certs(config.accept_invalid_certs);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| ConfigError::Client(error_chain(&err)))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn headers_for(&self, options: &RequestOptions) -> Result<HeaderMap, String> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let authorization = match &options.credentials {
            Credentials::Ambient => self
                .config
                .negotiate_token
                .as_deref()
                .map(|token| format!("Negotiate {token}")),
            Credentials::Basic { username, password } => {
                Some(basic_authorization(username, password))
            }
        };
        if let Some(authorization) = authorization {
            let mut value = HeaderValue::from_str(&authorization)
                .map_err(|err| format!("invalid authorization header: {err}"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        if options.no_cache {
            headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        }
        Ok(headers)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        options: RequestOptions,
    ) -> Result<RawResponse, TransportError> {
        let url = self.config.url_for(path);
        let headers = self
            .headers_for(&options)
            .map_err(|reason| TransportError::Local {
                url: url.clone(),
                reason,
            })?;
        let builder = self.client.request(method.clone(), &url).headers(headers);
        let builder = match body {
            Some(body) => builder.json(&body),
            None => builder,
        };

        debug!(method = %method, url = %url, "http request");
        let start = Instant::now();
        let response = builder
            .send()
            .await
            .map_err(|err| classify_send_error(&url, &err))?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response
            .text()
            .await
            .map_err(|err| TransportError::Local {
                url: url.clone(),
                reason: format!("failed to read response body: {}", error_chain(&err)),
            })?;
        debug!(
            method = %method,
            url = %url,
            status = %status,
            elapsed_ms = start.elapsed().as_millis(),
            "http response"
        );

        Ok(RawResponse {
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

fn classify_send_error(url: &str, err: &reqwest::Error) -> TransportError {
    let reason = error_chain(err);
    if err.is_builder() {
        TransportError::Local {
            url: url.to_string(),
            reason,
        }
    } else {
        TransportError::NoResponse {
            url: url.to_string(),
            reason,
            timed_out: err.is_timeout(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str, options: RequestOptions) -> Result<RawResponse, TransportError> {
        self.send(Method::GET, path, None, options).await
    }

    async fn post(
        &self,
        path: &str,
        body: Option<serde_json::Value>,
        options: RequestOptions,
    ) -> Result<RawResponse, TransportError> {
        self.send(Method::POST, path, body, options).await
    }
}
