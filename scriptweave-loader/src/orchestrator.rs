//! Async driver for a load session.
//!
//! The orchestrator owns the session on a single task. Load commands and
//! fetch completions are multiplexed with `select!`, and each is applied to
//! the session without awaiting in between, so no locking is needed.

use crate::config::LoaderConfig;
use crate::error::{LoadError, LoadResult};
use crate::executor::{ExecutionSink, Executor};
use crate::fetcher::Fetcher;
use crate::preprocess::{self, Preprocessor};
use crate::session::{LoadSession, SessionProgress};
use crate::transport::{FetchedText, ScriptTransport};
use scriptweave_types::{ResourceUrl, SessionId};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, info_span, Instrument};

const EVENT_CAPACITY: usize = 256;

/// Outcome reported to `finished()` callers: the most recently executed
/// source, if any.
pub type RoundOutcome = LoadResult<Option<String>>;

/// Commands accepted by the orchestrator.
pub enum LoadCommand {
    /// Register root files.
    Load {
        paths: Vec<String>,
        preprocessor: Option<Preprocessor>,
    },
    /// Reply once no placeholders remain.
    AwaitIdle { reply: oneshot::Sender<RoundOutcome> },
    /// Stop the orchestrator.
    Shutdown,
}

/// Progress notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadEvent {
    /// New root files were registered and are being fetched.
    RootsQueued { urls: Vec<ResourceUrl> },
    /// A fetch finished. `failed` resources contribute empty text.
    ResourceLoaded {
        url: ResourceUrl,
        bytes: usize,
        failed: bool,
    },
    /// A round was flattened and handed to the sink.
    Executed { round: u64, bytes: usize },
    /// A round was abandoned.
    RoundFailed { error: LoadError },
}

/// Cloneable handle for driving a running orchestrator.
#[derive(Clone)]
pub struct LoaderHandle {
    session_id: SessionId,
    command_tx: mpsc::UnboundedSender<LoadCommand>,
    event_tx: broadcast::Sender<LoadEvent>,
}

impl LoaderHandle {
    /// The session this handle drives.
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Loads root files. Chainable: `handle.load(["a.js"]).load(["b.js"])`.
    pub fn load<I, S>(&self, paths: I) -> &Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.send_load(paths, None)
    }

    /// Loads root files whose bodies are rewritten by `preprocessor` before
    /// parsing.
    pub fn load_with<I, S, F>(&self, paths: I, preprocessor: F) -> &Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.send_load(paths, Some(preprocess::from_fn(preprocessor)))
    }

    /// Loads root files with an already shared preprocessor.
    pub fn load_preprocessed<I, S>(&self, paths: I, preprocessor: Preprocessor) -> &Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.send_load(paths, Some(preprocessor))
    }

    fn send_load<I, S>(&self, paths: I, preprocessor: Option<Preprocessor>) -> &Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let paths = paths.into_iter().map(Into::into).collect();
        if self
            .command_tx
            .send(LoadCommand::Load {
                paths,
                preprocessor,
            })
            .is_err()
        {
            error!("Load ignored: orchestrator has stopped");
        }
        self
    }

    /// Waits until no placeholders remain and returns the most recently
    /// executed source.
    pub async fn finished(&self) -> RoundOutcome {
        let (reply, rx) = oneshot::channel();
        self.command_tx
            .send(LoadCommand::AwaitIdle { reply })
            .map_err(|_| LoadError::ChannelClosed)?;
        rx.await.map_err(|_| LoadError::ChannelClosed)?
    }

    /// Subscribes to progress events.
    pub fn subscribe(&self) -> broadcast::Receiver<LoadEvent> {
        self.event_tx.subscribe()
    }

    /// Stops the orchestrator. Pending waiters receive `ChannelClosed`.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(LoadCommand::Shutdown);
    }
}

/// Owns a session, its fetcher and its executor.
pub struct LoadOrchestrator {
    session: LoadSession,
    fetcher: Fetcher,
    executor: Executor,
    command_rx: mpsc::UnboundedReceiver<LoadCommand>,
    event_tx: broadcast::Sender<LoadEvent>,
    waiters: Vec<oneshot::Sender<RoundOutcome>>,
    last_outcome: RoundOutcome,
}

impl LoadOrchestrator {
    /// Creates an orchestrator and the handle that drives it.
    pub fn new(
        config: &LoaderConfig,
        transport: Arc<dyn ScriptTransport>,
        sink: Arc<dyn ExecutionSink>,
    ) -> LoadResult<(Self, LoaderHandle)> {
        let session = LoadSession::from_config(config)?;
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);

        let handle = LoaderHandle {
            session_id: session.id(),
            command_tx,
            event_tx: event_tx.clone(),
        };

        let orchestrator = Self {
            session,
            fetcher: Fetcher::new(transport, config.fetch_timeout()),
            executor: Executor::new(sink),
            command_rx,
            event_tx,
            waiters: Vec::new(),
            last_outcome: Ok(None),
        };

        Ok((orchestrator, handle))
    }

    /// Runs until shutdown or until every handle is dropped.
    pub async fn run(mut self) {
        let span = info_span!("load_session", session = %self.session.id());
        async move {
            info!("Loader started with base {}", self.session.base());
            loop {
                tokio::select! {
                    command = self.command_rx.recv() => match command {
                        Some(LoadCommand::Load { paths, preprocessor }) => {
                            self.handle_load(paths, preprocessor).await;
                        }
                        Some(LoadCommand::AwaitIdle { reply }) => self.handle_await(reply),
                        Some(LoadCommand::Shutdown) | None => break,
                    },
                    Some((url, result)) = self.fetcher.next(), if self.fetcher.in_flight() > 0 => {
                        self.handle_fetched(url, result).await;
                    }
                }
            }

            self.fetcher.abort_all();
            for waiter in self.waiters.drain(..) {
                let _ = waiter.send(Err(LoadError::ChannelClosed));
            }
            info!("Loader stopped after {} round(s)", self.session.rounds());
        }
        .instrument(span)
        .await
    }

    async fn handle_load(&mut self, paths: Vec<String>, preprocessor: Option<Preprocessor>) {
        let urls = self.session.load(paths, preprocessor);
        if !self.session.is_idle() {
            // Stale once a new round starts.
            self.last_outcome = Ok(None);
        }
        if !urls.is_empty() {
            self.emit(LoadEvent::RootsQueued { urls: urls.clone() });
        }
        for url in urls {
            self.fetcher.spawn(url);
        }

        let progress = self.session.splice_cached();
        self.apply(progress).await;
        self.notify_if_idle();
    }

    fn handle_await(&mut self, reply: oneshot::Sender<RoundOutcome>) {
        if self.session.is_idle() {
            let _ = reply.send(self.last_outcome.clone());
        } else {
            self.waiters.push(reply);
        }
    }

    async fn handle_fetched(&mut self, url: ResourceUrl, result: LoadResult<FetchedText>) {
        let (bytes, failed) = match &result {
            Ok(fetched) => (fetched.body.len(), false),
            Err(_) => (0, true),
        };
        self.emit(LoadEvent::ResourceLoaded {
            url: url.clone(),
            bytes,
            failed,
        });

        let progress = self.session.on_fetched(&url, result);
        self.apply(progress).await;
    }

    async fn apply(&mut self, progress: LoadResult<SessionProgress>) {
        match progress {
            Ok(SessionProgress::Pending { fetch }) => {
                for next in fetch {
                    self.fetcher.spawn(next);
                }
            }
            Ok(SessionProgress::Complete { round, source }) => {
                self.executor.execute(&source).await;
                self.emit(LoadEvent::Executed {
                    round,
                    bytes: source.len(),
                });
                self.last_outcome = Ok(Some(source));
                self.notify_if_idle();
            }
            Ok(SessionProgress::Unchanged) => {
                debug!("Sequence unchanged");
            }
            Err(e) => {
                error!("Round abandoned: {}", e);
                self.emit(LoadEvent::RoundFailed { error: e.clone() });
                self.last_outcome = Err(e);
                self.notify_if_idle();
            }
        }
    }

    fn notify_if_idle(&mut self) {
        if !self.session.is_idle() {
            return;
        }
        for waiter in self.waiters.drain(..) {
            let _ = waiter.send(self.last_outcome.clone());
        }
    }

    fn emit(&self, event: LoadEvent) {
        // No subscribers is fine.
        let _ = self.event_tx.send(event);
    }
}

/// Creates an orchestrator and spawns it on the current runtime.
pub fn spawn_loader(
    config: &LoaderConfig,
    transport: Arc<dyn ScriptTransport>,
    sink: Arc<dyn ExecutionSink>,
) -> LoadResult<(LoaderHandle, JoinHandle<()>)> {
    let (orchestrator, handle) = LoadOrchestrator::new(config, transport, sink)?;
    let task = tokio::spawn(orchestrator.run());
    Ok((handle, task))
}
