//! Loader configuration.

use crate::error::{LoadError, LoadResult};
use scriptweave_types::ResourceUrl;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Maximum size for a single fetched script (50 MB).
pub const MAX_CONTENT_SIZE: u64 = 50 * 1024 * 1024;

/// Default per-fetch timeout (ms).
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 30_000;

/// What to do when a file transitively imports itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePolicy {
    /// Fail the round; nothing is executed.
    #[default]
    Error,
    /// Drop the import that closes the cycle and keep assembling.
    Skip,
}

impl FromStr for CyclePolicy {
    type Err = LoadError;

    fn from_str(s: &str) -> LoadResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "skip" => Ok(Self::Skip),
            other => Err(LoadError::Config(format!("unknown cycle policy: {other}"))),
        }
    }
}

/// Configuration for a load session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Base URL that root paths are resolved against.
    pub base_url: String,
    /// Per-fetch timeout (ms). `None` waits forever.
    pub fetch_timeout_ms: Option<u64>,
    /// Maximum accepted body size in bytes.
    pub max_content_size: u64,
    /// User agent sent by the HTTP transport.
    pub user_agent: String,
    /// Import cycle handling.
    pub cycle_policy: CyclePolicy,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost/".to_string(),
            fetch_timeout_ms: Some(DEFAULT_FETCH_TIMEOUT_MS),
            max_content_size: MAX_CONTENT_SIZE,
            user_agent: concat!("scriptweave/", env!("CARGO_PKG_VERSION")).to_string(),
            cycle_policy: CyclePolicy::Error,
        }
    }
}

impl LoaderConfig {
    /// Creates a config with the given base URL and defaults elsewhere.
    pub fn with_base(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Reads a JSON config file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> LoadResult<Self> {
        Self::from_json_file_over(path, &Self::default())
    }

    /// Reads a JSON config file. Missing fields are taken from `defaults`.
    pub fn from_json_file_over(path: &Path, defaults: &Self) -> LoadResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let overrides: serde_json::Value = serde_json::from_str(&raw)?;
        let serde_json::Value::Object(fields) = overrides else {
            return Err(LoadError::Config(format!(
                "{} must hold a JSON object",
                path.display()
            )));
        };

        let mut merged = serde_json::to_value(defaults)?;
        if let Some(base) = merged.as_object_mut() {
            base.extend(fields);
        }
        Ok(serde_json::from_value(merged)?)
    }

    /// The validated base URL.
    pub fn base(&self) -> LoadResult<ResourceUrl> {
        Ok(ResourceUrl::parse(&self.base_url)?)
    }

    /// The per-fetch timeout, if any.
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }
}
