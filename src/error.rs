//! Error taxonomy for the trust-score pipeline.
//!
//! Library code returns typed errors; the binary maps them to distinct
//! exit codes so callers can tell bad input, auth failures, network
//! failures and a missing external tool apart.

use thiserror::Error;

use crate::model::SignalKind;

/// A failure while fetching a single signal.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("artifact not found in registry: {0}")]
    NotFound(String),

    #[error("authentication rejected: {0}")]
    Auth(String),

    #[error("signal unavailable: {0}")]
    Unavailable(String),

    #[error("rate limited by {0}, retry later")]
    RateLimited(String),

    #[error("timed out after {0}s")]
    Timeout(u64),

    #[error("external tool not available: {0}")]
    ToolMissing(String),

    #[error("external tool ran but failed: {0}")]
    ToolFailed(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl FetchError {
    /// True when the failure means the host process cannot invoke the
    /// external analyzer at all, as opposed to the analyzer running and
    /// failing.
    pub fn is_tool_missing(&self) -> bool {
        matches!(self, FetchError::ToolMissing(_))
    }
}

#[derive(Error, Debug)]
pub enum TrustError {
    #[error("invalid coordinates: {0}")]
    Input(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("failed to fetch {kind} signal: {source}")]
    Fetch {
        kind: SignalKind,
        #[source]
        source: FetchError,
    },

    #[error("could not normalize {kind} signal: {reason}")]
    Normalization { kind: SignalKind, reason: String },

    #[error("cannot compute a trust score: {0}")]
    Aggregation(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl TrustError {
    pub fn fetch(kind: SignalKind, source: FetchError) -> Self {
        TrustError::Fetch { kind, source }
    }
}

pub type Result<T> = std::result::Result<T, TrustError>;
