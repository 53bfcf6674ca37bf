use thiserror::Error;

/// Top-level error type for the `firefly-api` crate.
///
/// Variants fall into three disjoint classes that callers can tell apart:
/// transport (the request never produced a usable 2xx response), decode
/// (a 2xx body did not match the expected shape), and API (a well-formed
/// 2xx body carried a non-empty `error` string).
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The base URL cannot have path segments appended (e.g. `mailto:`).
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// API key rejected (HTTP 401).
    #[error("Invalid API key")]
    InvalidApiKey,

    /// The addressed resource does not exist (HTTP 404).
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Any other non-success HTTP status.
    #[error("Firefly API returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error at {endpoint}: {message}")]
    Deserialization {
        endpoint: String,
        message: String,
        body: String,
    },

    /// A no-content endpoint answered with a body that is not an API error.
    #[error("Unexpected response body (HTTP {status}): {body}")]
    UnexpectedBody { status: u16, body: String },

    // ── API ─────────────────────────────────────────────────────────
    /// The response decoded fine but its `error` field was set.
    #[error("Firefly API error: {message}")]
    Api { message: String },
}

impl Error {
    /// Returns `true` for connection, URL, TLS and non-2xx status failures.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport(_)
                | Self::InvalidUrl(_)
                | Self::InvalidBaseUrl(_)
                | Self::Tls(_)
                | Self::InvalidApiKey
                | Self::NotFound { .. }
                | Self::Status { .. }
        )
    }

    /// Returns `true` if a response body did not match the expected shape.
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            Self::Deserialization { .. } | Self::UnexpectedBody { .. }
        )
    }

    /// Returns `true` if the remote API rejected the request semantically.
    pub fn is_api(&self) -> bool {
        matches!(self, Self::Api { .. })
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            _ => false,
        }
    }

    /// Returns `true` if this is a transient error worth retrying.
    ///
    /// This crate never retries on its own; the flag is for callers.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => matches!(*status, 502..=504),
            _ => false,
        }
    }
}
