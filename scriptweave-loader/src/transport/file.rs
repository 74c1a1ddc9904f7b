//! `file://` transport backed by the local filesystem.

use super::{FetchedText, ScriptTransport};
use crate::error::{LoadError, LoadResult};
use async_trait::async_trait;
use scriptweave_types::ResourceUrl;
use std::path::PathBuf;
use tracing::debug;

/// Reads scripts from disk. The URL authority is ignored, so
/// `file://localhost/srv/a.js` reads `/srv/a.js`.
#[derive(Debug, Clone)]
pub struct FileTransport {
    max_size: u64,
}

impl FileTransport {
    /// Creates a transport with the given size limit.
    pub fn new(max_size: u64) -> Self {
        Self { max_size }
    }

    /// The filesystem path a URL maps to.
    pub fn path_for(url: &ResourceUrl) -> PathBuf {
        PathBuf::from(format!("/{}", url.path()))
    }
}

#[async_trait]
impl ScriptTransport for FileTransport {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn fetch_text(&self, url: &ResourceUrl) -> LoadResult<FetchedText> {
        if url.scheme() != "file" {
            return Err(LoadError::UnsupportedScheme(url.scheme().to_string()));
        }

        let path = Self::path_for(url);
        let size = tokio::fs::metadata(&path).await?.len();
        if size > self.max_size {
            return Err(LoadError::ContentTooLarge {
                size,
                max: self.max_size,
            });
        }

        let bytes = tokio::fs::read(&path).await?;
        let body =
            String::from_utf8(bytes).map_err(|_| LoadError::InvalidEncoding(url.to_string()))?;

        debug!("Read {} ({} bytes)", path.display(), body.len());
        Ok(FetchedText {
            body,
            content_type: None,
        })
    }
}
