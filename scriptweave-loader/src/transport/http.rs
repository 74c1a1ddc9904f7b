//! HTTP(S) transport.
//!
//! Uses `reqwest` with rustls.

use super::{FetchedText, ScriptTransport};
use crate::config::LoaderConfig;
use crate::error::{LoadError, LoadResult};
use async_trait::async_trait;
use reqwest::Client;
use scriptweave_types::ResourceUrl;
use tracing::debug;

/// Fetches scripts with HTTP GET.
pub struct HttpTransport {
    client: Client,
    max_size: u64,
}

impl HttpTransport {
    /// Creates a transport using the config's timeout, user agent and size
    /// limit.
    pub fn new(config: &LoaderConfig) -> LoadResult<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.fetch_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| LoadError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_size: config.max_content_size,
        })
    }

    /// The body size limit in bytes.
    pub fn max_size(&self) -> u64 {
        self.max_size
    }
}

#[async_trait]
impl ScriptTransport for HttpTransport {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch_text(&self, url: &ResourceUrl) -> LoadResult<FetchedText> {
        let mut response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| LoadError::Network(format!("GET {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        if let Some(len) = response.content_length() {
            if len > self.max_size {
                return Err(LoadError::ContentTooLarge {
                    size: len,
                    max: self.max_size,
                });
            }
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        // Chunked bodies have no length up front.
        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| LoadError::Network(format!("reading body of {url} failed: {e}")))?
        {
            let size = (bytes.len() + chunk.len()) as u64;
            if size > self.max_size {
                return Err(LoadError::ContentTooLarge {
                    size,
                    max: self.max_size,
                });
            }
            bytes.extend_from_slice(&chunk);
        }

        let body = String::from_utf8(bytes)
            .map_err(|_| LoadError::InvalidEncoding(url.to_string()))?;

        debug!("Fetched {} ({} bytes, {:?})", url, body.len(), content_type);
        Ok(FetchedText { body, content_type })
    }
}
