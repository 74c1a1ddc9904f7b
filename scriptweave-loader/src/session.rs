//! Load session: registry plus assembly sequence, without I/O.
//!
//! The session is a pure state machine. `load` and `on_fetched` return the
//! URLs that must be fetched next; the orchestrator performs the fetches
//! and feeds the results back in. Several sessions can live side by side in
//! one process.
//!
//! Roots of a round that failed never ran, so loading them again queues
//! them again. Their cached content is spliced by `splice_cached`.

use crate::assembler::Assembler;
use crate::config::{CyclePolicy, LoaderConfig};
use crate::error::LoadResult;
use crate::preprocess::Preprocessor;
use crate::registry::{Registry, ResourceStatus};
use crate::resolver::resolve;
use crate::transport::FetchedText;
use scriptweave_types::{ResourceUrl, SessionId};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// What happened after a fetch result was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionProgress {
    /// Placeholders remain; these URLs must be fetched.
    Pending { fetch: Vec<ResourceUrl> },
    /// No placeholders remain. The flattened source is ready to run and the
    /// sequence has been drained.
    Complete { round: u64, source: String },
    /// The result did not change the sequence: the URL was unknown, already
    /// loaded, or no placeholder was waiting on it.
    Unchanged,
}

/// One loading session.
#[derive(Debug)]
pub struct LoadSession {
    id: SessionId,
    base: ResourceUrl,
    registry: Registry,
    assembler: Assembler,
    rounds: u64,
    /// Roots of the round in progress.
    round_roots: Vec<ResourceUrl>,
    /// Roots of failed rounds; they never executed.
    abandoned: HashSet<ResourceUrl>,
    /// Re-queued roots whose content is cached but not spliced yet.
    cached_roots: Vec<ResourceUrl>,
}

impl LoadSession {
    /// Creates a session resolving root paths against `base`.
    pub fn new(base: ResourceUrl, cycle_policy: CyclePolicy) -> Self {
        Self {
            id: SessionId::new(),
            base,
            registry: Registry::new(),
            assembler: Assembler::new(cycle_policy),
            rounds: 0,
            round_roots: Vec::new(),
            abandoned: HashSet::new(),
            cached_roots: Vec::new(),
        }
    }

    /// Creates a session from a config.
    pub fn from_config(config: &LoaderConfig) -> LoadResult<Self> {
        Ok(Self::new(config.base()?, config.cycle_policy))
    }

    /// Session identifier.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Base URL for root paths.
    pub fn base(&self) -> &ResourceUrl {
        &self.base
    }

    /// Registers root files and appends one placeholder per new root, in
    /// order. Returns the URLs to fetch.
    ///
    /// Roots already known to the session (from this call, an earlier call,
    /// or as a nested import) are skipped, unless their round failed before
    /// executing: those get a placeholder again without a new fetch. If
    /// their content is already cached, call [`splice_cached`] next.
    /// Paths that do not resolve to a valid URL are logged and skipped.
    ///
    /// [`splice_cached`]: Self::splice_cached
    pub fn load<I, S>(&mut self, paths: I, preprocessor: Option<Preprocessor>) -> Vec<ResourceUrl>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut fetch = Vec::new();
        for path in paths {
            let path = path.as_ref();
            let url = match resolve(path, &self.base) {
                Ok(url) => url,
                Err(e) => {
                    warn!("Skipping root {:?}: {}", path, e);
                    continue;
                }
            };

            if self.abandoned.remove(&url) {
                debug!("Re-queuing root {} from a failed round", url);
                self.assembler.push_root(url.clone());
                self.round_roots.push(url.clone());
                if self.registry.status(&url) == Some(ResourceStatus::Loaded) {
                    self.cached_roots.push(url);
                }
                continue;
            }

            if !self.registry.request(&url, preprocessor.clone()) {
                debug!("Root {} already in session, skipping", url);
                continue;
            }

            self.assembler.push_root(url.clone());
            self.round_roots.push(url.clone());
            fetch.push(url);
        }

        if !fetch.is_empty() {
            info!("Queued {} root file(s)", fetch.len());
        }
        fetch
    }

    /// Applies one fetch result.
    ///
    /// Transport errors are not returned: the resource simply contributes
    /// empty text. The only error is an import cycle under
    /// [`CyclePolicy::Error`], in which case the sequence is cleared.
    pub fn on_fetched(
        &mut self,
        url: &ResourceUrl,
        result: LoadResult<FetchedText>,
    ) -> LoadResult<SessionProgress> {
        let Some(parsed) = self.registry.complete(url, result) else {
            return Ok(SessionProgress::Unchanged);
        };
        debug!(
            "Loaded {}: {} segment(s), {} import(s)",
            url,
            parsed.segments.len(),
            parsed.imports.len()
        );

        let splice = match self
            .assembler
            .on_resource_loaded(url, &parsed.segments, &self.registry)
        {
            Ok(splice) => splice,
            Err(e) => {
                self.abandon_round();
                return Err(e);
            }
        };

        // Nothing was waiting on this file, e.g. its round already failed.
        if splice.replaced == 0 {
            return Ok(SessionProgress::Unchanged);
        }

        Ok(self.advance(splice.introduced))
    }

    /// Splices re-queued roots whose content is already cached.
    ///
    /// Returns `Unchanged` when there are none. Errors as [`on_fetched`].
    ///
    /// [`on_fetched`]: Self::on_fetched
    pub fn splice_cached(&mut self) -> LoadResult<SessionProgress> {
        if self.cached_roots.is_empty() {
            return Ok(SessionProgress::Unchanged);
        }

        let mut introduced = Vec::new();
        for url in std::mem::take(&mut self.cached_roots) {
            let segments = self.registry.loaded_segments(&url).unwrap_or_default();
            match self
                .assembler
                .on_resource_loaded(&url, segments, &self.registry)
            {
                Ok(splice) => introduced.extend(splice.introduced),
                Err(e) => {
                    self.abandon_round();
                    return Err(e);
                }
            }
        }

        Ok(self.advance(introduced))
    }

    /// Completes the round if no placeholders remain, otherwise requests
    /// the newly referenced files.
    fn advance(&mut self, introduced: Vec<ResourceUrl>) -> SessionProgress {
        if self.assembler.is_complete() {
            self.rounds += 1;
            self.round_roots.clear();
            let source = self.assembler.take_flattened();
            info!(
                "Round {} complete: {} bytes from {} resource(s)",
                self.rounds,
                source.len(),
                self.registry.count(ResourceStatus::Loaded)
            );
            return SessionProgress::Complete {
                round: self.rounds,
                source,
            };
        }

        let fetch = introduced
            .into_iter()
            .filter(|import| self.registry.request(import, None))
            .collect();
        SessionProgress::Pending { fetch }
    }

    fn abandon_round(&mut self) {
        self.assembler.clear();
        self.cached_roots.clear();
        self.abandoned.extend(self.round_roots.drain(..));
    }

    /// Whether no placeholders are waiting.
    pub fn is_idle(&self) -> bool {
        self.assembler.is_complete()
    }

    /// URLs still awaited, in sequence order.
    pub fn pending(&self) -> Vec<&ResourceUrl> {
        self.assembler.pending()
    }

    /// Number of completed rounds.
    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    /// The resource registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The assembly sequence.
    pub fn assembler(&self) -> &Assembler {
        &self.assembler
    }
}
