use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    /// The request left the client but nothing came back.
    #[error("no response from {url}: {reason}")]
    NoResponse {
        url: String,
        reason: String,
        timed_out: bool,
    },
    #[error("request to {url} failed locally: {reason}")]
    Local { url: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid api url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("failed to build http client: {0}")]
    Client(String),
}

/// Flattens an error and its sources into one line.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        if !out.contains(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = inner.source();
    }
    out
}
