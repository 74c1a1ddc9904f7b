//! Issues fetches and collects their results.
//!
//! Fetches run concurrently on a `JoinSet`; results are handed back one at
//! a time so the caller can apply each to the session without interleaving.

use crate::error::{LoadError, LoadResult};
use crate::transport::{FetchedText, ScriptTransport};
use scriptweave_types::ResourceUrl;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{Id, JoinSet};
use tracing::{debug, warn};

/// A completed fetch.
pub type FetchOutcome = (ResourceUrl, LoadResult<FetchedText>);

/// Runs transport fetches with an optional timeout.
pub struct Fetcher {
    transport: Arc<dyn ScriptTransport>,
    timeout: Option<Duration>,
    tasks: JoinSet<FetchOutcome>,
    urls: HashMap<Id, ResourceUrl>,
}

impl Fetcher {
    /// Creates a fetcher over `transport`.
    pub fn new(transport: Arc<dyn ScriptTransport>, timeout: Option<Duration>) -> Self {
        Self {
            transport,
            timeout,
            tasks: JoinSet::new(),
            urls: HashMap::new(),
        }
    }

    /// Starts fetching `url`.
    pub fn spawn(&mut self, url: ResourceUrl) {
        debug!("Fetching {} via {}", url, self.transport.name());
        let transport = self.transport.clone();
        let timeout = self.timeout;
        let task_url = url.clone();

        let handle = self.tasks.spawn(async move {
            let result = match timeout {
                Some(limit) => tokio::time::timeout(limit, transport.fetch_text(&task_url))
                    .await
                    .unwrap_or_else(|_| Err(LoadError::Timeout(limit))),
                None => transport.fetch_text(&task_url).await,
            };
            (task_url, result)
        });
        self.urls.insert(handle.id(), url);
    }

    /// Waits for the next fetch to finish. Returns `None` when nothing is
    /// in flight.
    pub async fn next(&mut self) -> Option<FetchOutcome> {
        loop {
            match self.tasks.join_next_with_id().await? {
                Ok((id, outcome)) => {
                    self.urls.remove(&id);
                    return Some(outcome);
                }
                Err(e) => {
                    let Some(url) = self.urls.remove(&e.id()) else {
                        warn!("Fetch task failed: {}", e);
                        continue;
                    };
                    warn!("Fetch task for {} failed: {}", url, e);
                    return Some((url, Err(LoadError::Network(format!("fetch task failed: {e}")))));
                }
            }
        }
    }

    /// Number of fetches in flight.
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Cancels every fetch in flight.
    pub fn abort_all(&mut self) {
        self.tasks.abort_all();
        self.urls.clear();
    }
}
