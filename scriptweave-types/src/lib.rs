//! Core type definitions for scriptweave.
//!
//! This crate defines the plain data shared by the loader and its front
//! ends:
//! - Canonical absolute resource URLs
//! - Parsed script segments (literal code and import references)
//! - Units of the ordered assembly sequence and their import chains
//! - Session identifiers (UUID v7)
//!
//! Nothing here performs I/O.

mod ids;
mod segment;
mod unit;
mod url;

pub use ids::SessionId;
pub use segment::Segment;
pub use unit::{ImportChain, OrderedUnit, Placeholder};
pub use url::ResourceUrl;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: &'static str },

    #[error("invalid session id: {0}")]
    InvalidSessionId(String),
}
