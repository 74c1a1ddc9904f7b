//! Per-URL fetch status and cached content.
//!
//! The registry is append-only for the lifetime of a session: an entry is
//! created on first reference and never removed, which is what guarantees
//! at most one fetch per absolute URL.

use crate::directive::{self, ParsedScript};
use crate::error::LoadResult;
use crate::preprocess::Preprocessor;
use crate::transport::FetchedText;
use scriptweave_types::{ResourceUrl, Segment};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

/// Fetch status of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceStatus {
    /// Registered, request not issued yet.
    Pending,
    /// Request in flight.
    Loading,
    /// Content parsed and cached.
    Loaded,
}

/// Everything the session knows about one URL.
pub struct ResourceEntry {
    status: ResourceStatus,
    raw_content: String,
    segments: Vec<Segment>,
    preprocessor: Option<Preprocessor>,
    failed: bool,
}

impl ResourceEntry {
    fn new(preprocessor: Option<Preprocessor>) -> Self {
        Self {
            status: ResourceStatus::Pending,
            raw_content: String::new(),
            segments: Vec::new(),
            preprocessor,
            failed: false,
        }
    }

    /// Current status.
    pub fn status(&self) -> ResourceStatus {
        self.status
    }

    /// The text that was parsed, after preprocessing. Empty until loaded or
    /// when the fetch failed.
    pub fn raw_content(&self) -> &str {
        &self.raw_content
    }

    /// Parsed segments. Empty until loaded.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether a preprocessor is attached.
    pub fn has_preprocessor(&self) -> bool {
        self.preprocessor.is_some()
    }

    /// Whether the transport reported an error for this resource.
    pub fn failed(&self) -> bool {
        self.failed
    }
}

impl fmt::Debug for ResourceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceEntry")
            .field("status", &self.status)
            .field("raw_len", &self.raw_content.len())
            .field("segments", &self.segments.len())
            .field("preprocessor", &self.preprocessor.is_some())
            .field("failed", &self.failed)
            .finish()
    }
}

/// Tracks every resource referenced during a session.
#[derive(Debug, Default)]
pub struct Registry {
    entries: HashMap<ResourceUrl, ResourceEntry>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `url` if it is unknown and marks it as loading.
    ///
    /// Returns `true` when the caller must issue a fetch. Known URLs, in any
    /// status, return `false`; their preprocessor is left unchanged.
    pub fn request(&mut self, url: &ResourceUrl, preprocessor: Option<Preprocessor>) -> bool {
        if self.entries.contains_key(url) {
            debug!("Already registered, not fetching again: {}", url);
            return false;
        }

        let mut entry = ResourceEntry::new(preprocessor);
        entry.status = ResourceStatus::Loading;
        self.entries.insert(url.clone(), entry);
        true
    }

    /// Records a fetch result: errors become empty content, the
    /// preprocessor (if any) runs on successful bodies, and the text is
    /// parsed and cached.
    ///
    /// Returns `None` if `url` is unknown or already loaded.
    pub fn complete(
        &mut self,
        url: &ResourceUrl,
        result: LoadResult<FetchedText>,
    ) -> Option<ParsedScript> {
        let entry = self.entries.get_mut(url)?;
        if entry.status == ResourceStatus::Loaded {
            warn!("Ignoring duplicate completion for {}", url);
            return None;
        }

        let text = match result {
            Ok(fetched) => match &entry.preprocessor {
                Some(preprocess) => (**preprocess)(&fetched.body),
                None => fetched.body,
            },
            Err(e) => {
                warn!("Failed to fetch {}, treating as empty: {}", url, e);
                entry.failed = true;
                String::new()
            }
        };

        let parsed = directive::parse(&text, url);
        entry.raw_content = text;
        entry.segments = parsed.segments.clone();
        entry.status = ResourceStatus::Loaded;
        Some(parsed)
    }

    /// Returns the entry for `url`.
    pub fn get(&self, url: &ResourceUrl) -> Option<&ResourceEntry> {
        self.entries.get(url)
    }

    /// Returns the status of `url`, if registered.
    pub fn status(&self, url: &ResourceUrl) -> Option<ResourceStatus> {
        self.entries.get(url).map(ResourceEntry::status)
    }

    /// Cached segments of a loaded resource.
    pub fn loaded_segments(&self, url: &ResourceUrl) -> Option<&[Segment]> {
        self.entries
            .get(url)
            .filter(|e| e.status == ResourceStatus::Loaded)
            .map(ResourceEntry::segments)
    }

    /// Whether `url` has been registered.
    pub fn contains(&self, url: &ResourceUrl) -> bool {
        self.entries.contains_key(url)
    }

    /// Number of registered resources.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of resources in the given status.
    pub fn count(&self, status: ResourceStatus) -> usize {
        self.entries.values().filter(|e| e.status == status).count()
    }
}
