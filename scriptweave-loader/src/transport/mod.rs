//! Transport layer abstraction.
//!
//! The loader never talks to the network directly. A `ScriptTransport`
//! fetches the text behind an absolute URL; the loader treats any error as
//! empty content.

mod file;
mod http;

pub use file::FileTransport;
pub use http::HttpTransport;

use crate::config::LoaderConfig;
use crate::error::{LoadError, LoadResult};
use async_trait::async_trait;
use scriptweave_types::ResourceUrl;
use std::collections::HashMap;
use std::sync::Arc;

/// A successfully fetched script body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedText {
    /// Body text.
    pub body: String,
    /// Content type (if provided by the server).
    pub content_type: Option<String>,
}

impl FetchedText {
    /// A body without a content type hint.
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            content_type: None,
        }
    }
}

/// Fetches script text by absolute URL.
#[async_trait]
pub trait ScriptTransport: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Fetches the body at `url`. Non-success results are errors.
    async fn fetch_text(&self, url: &ResourceUrl) -> LoadResult<FetchedText>;
}

/// Dispatches to a transport by URL scheme.
#[derive(Default, Clone)]
pub struct RoutingTransport {
    routes: HashMap<String, Arc<dyn ScriptTransport>>,
}

impl RoutingTransport {
    /// Creates an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// HTTP(S) through `reqwest` and `file://` through the filesystem.
    pub fn standard(config: &LoaderConfig) -> LoadResult<Self> {
        let http: Arc<dyn ScriptTransport> = Arc::new(HttpTransport::new(config)?);
        Ok(Self::new()
            .route("http", http.clone())
            .route("https", http)
            .route("file", Arc::new(FileTransport::new(config.max_content_size))))
    }

    /// Adds (or replaces) the transport for `scheme`.
    #[must_use]
    pub fn route(mut self, scheme: impl Into<String>, transport: Arc<dyn ScriptTransport>) -> Self {
        self.routes.insert(scheme.into().to_ascii_lowercase(), transport);
        self
    }

    /// Whether a transport is registered for `scheme`.
    pub fn handles(&self, scheme: &str) -> bool {
        self.routes.contains_key(&scheme.to_ascii_lowercase())
    }
}

#[async_trait]
impl ScriptTransport for RoutingTransport {
    fn name(&self) -> &'static str {
        "router"
    }

    async fn fetch_text(&self, url: &ResourceUrl) -> LoadResult<FetchedText> {
        let scheme = url.scheme().to_ascii_lowercase();
        let transport = self
            .routes
            .get(&scheme)
            .ok_or_else(|| LoadError::UnsupportedScheme(scheme.clone()))?;
        transport.fetch_text(url).await
    }
}

/// A scripted transport for testing.
pub mod mock {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    /// One scripted response.
    #[derive(Debug, Clone)]
    pub struct MockResponse {
        /// HTTP-like status; anything outside 200..300 is an error.
        pub status: u16,
        /// Body returned on success.
        pub body: String,
        /// Delay before the response is delivered.
        pub delay: Duration,
    }

    impl MockResponse {
        /// A 200 response with `body`.
        pub fn ok(body: impl Into<String>) -> Self {
            Self {
                status: 200,
                body: body.into(),
                delay: Duration::ZERO,
            }
        }

        /// An error response with `status`.
        pub fn status(status: u16) -> Self {
            Self {
                status,
                body: String::new(),
                delay: Duration::ZERO,
            }
        }

        /// Delays delivery by `ms` milliseconds.
        #[must_use]
        pub fn delayed(mut self, ms: u64) -> Self {
            self.delay = Duration::from_millis(ms);
            self
        }
    }

    /// Serves scripted responses and counts requests per URL.
    /// Unknown URLs answer 404.
    #[derive(Debug, Default, Clone)]
    pub struct MockTransport {
        responses: Arc<Mutex<HashMap<String, MockResponse>>>,
        requests: Arc<Mutex<Vec<String>>>,
    }

    impl MockTransport {
        /// Creates a transport with no scripted responses.
        pub fn new() -> Self {
            Self::default()
        }

        /// Scripts a 200 response for `url`.
        #[must_use]
        pub fn with(self, url: &str, body: &str) -> Self {
            self.respond(url, MockResponse::ok(body));
            self
        }

        /// Scripts an arbitrary response for `url`.
        #[must_use]
        pub fn with_response(self, url: &str, response: MockResponse) -> Self {
            self.respond(url, response);
            self
        }

        /// Scripts (or replaces) the response for `url`.
        pub fn respond(&self, url: &str, response: MockResponse) {
            self.responses
                .lock()
                .unwrap()
                .insert(url.to_string(), response);
        }

        /// Number of fetches issued for `url`.
        pub fn fetch_count(&self, url: &str) -> usize {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .filter(|u| u.as_str() == url)
                .count()
        }

        /// Every fetched URL, in issue order.
        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ScriptTransport for MockTransport {
        fn name(&self) -> &'static str {
            "mock"
        }

        async fn fetch_text(&self, url: &ResourceUrl) -> LoadResult<FetchedText> {
            self.requests.lock().unwrap().push(url.to_string());
            let response = self
                .responses
                .lock()
                .unwrap()
                .get(url.as_str())
                .cloned()
                .unwrap_or_else(|| MockResponse::status(404));

            if !response.delay.is_zero() {
                tokio::time::sleep(response.delay).await;
            }

            if !(200..300).contains(&response.status) {
                return Err(LoadError::HttpStatus {
                    status: response.status,
                    url: url.to_string(),
                });
            }

            Ok(FetchedText {
                body: response.body,
                content_type: Some("application/javascript".to_string()),
            })
        }
    }
}
