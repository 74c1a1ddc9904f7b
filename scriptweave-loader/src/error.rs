//! Error types for the loader.

use scriptweave_types::ResourceUrl;
use std::time::Duration;
use thiserror::Error;

/// Result type for loader operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Errors that can occur while loading and assembling scripts.
///
/// Cloneable so one round outcome can be handed to every waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// A reference could not be turned into an absolute URL.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] scriptweave_types::Error),

    /// Non-success HTTP status.
    #[error("HTTP {status} for URL: {url}")]
    HttpStatus { status: u16, url: String },

    /// Network error.
    #[error("network error: {0}")]
    Network(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Content too large.
    #[error("content too large: {size} bytes (max: {max})")]
    ContentTooLarge { size: u64, max: u64 },

    /// Body is not valid UTF-8.
    #[error("response for {0} is not valid UTF-8")]
    InvalidEncoding(String),

    /// No transport handles this scheme.
    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    /// Fetch did not complete in time.
    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),

    /// A file transitively imports itself.
    #[error("import cycle detected: {}", join_chain(.chain))]
    ImportCycle { chain: Vec<ResourceUrl> },

    /// The execution sink failed.
    #[error("execution failed: {0}")]
    Execution(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Channel closed.
    #[error("loader channel closed")]
    ChannelClosed,
}

impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

fn join_chain(chain: &[ResourceUrl]) -> String {
    chain
        .iter()
        .map(ResourceUrl::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}
