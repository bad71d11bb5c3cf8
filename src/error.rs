//! Error types shared by the client and its collaborators

use thiserror::Error;

/// Failures that can occur while talking to the source.
///
/// None of these reach callers of the plain catalog operations; they are
/// logged and turned into empty results there. The `try_*` operations
/// return them unchanged.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Connection-level failure (DNS, TLS, timeout, unreadable body)
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The server answered with a non-2xx status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// The body did not have the expected JSON shape
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// A manga or chapter id that cannot address anything
    #[error("invalid id: {0:?}")]
    InvalidId(String),

    /// Bad base URL or unreadable configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl SourceError {
    /// True for failures of the request itself, as opposed to its content.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Status { .. })
    }
}

pub type Result<T> = std::result::Result<T, SourceError>;
