//! Import-directive script loader.
//!
//! Resolves a graph of script files declared with inline
//! `//@import(path)` directives, fetches every file exactly once, and
//! concatenates the fragments into one source text in the order a
//! synchronous depth-first inliner would produce.
//!
//! # Architecture
//!
//! ## Components
//!
//! - **Resolver**: relative-to-absolute URL resolution
//! - **Directive**: splits script text into literals and import references
//! - **Registry**: per-URL status and cached content; deduplicates fetches
//! - **Fetcher**: runs transport fetches concurrently
//! - **Assembler**: splices loaded files into the ordered sequence in place
//! - **Executor**: hands the flattened source to a sink
//! - **Session**: registry plus assembler as a pure state machine
//! - **Orchestrator**: drives a session from async commands and fetches
//!
//! ## Load process
//!
//! 1. **Register**: each root path is resolved and gets a placeholder
//! 2. **Fetch**: one request per URL not seen before
//! 3. **Splice**: a loaded file replaces its placeholders with its segments;
//!    nested imports become new placeholders (or are inlined if cached)
//! 4. **Recurse**: newly referenced files are fetched
//! 5. **Execute**: once no placeholders remain, the sequence is flattened
//!    and handed to the sink
//!
//! # Example
//!
//! ```
//! use scriptweave_loader::{LoadSession, LoaderConfig, SessionProgress};
//! use scriptweave_loader::transport::FetchedText;
//!
//! let config = LoaderConfig::with_base("http://h/app/");
//! let mut session = LoadSession::from_config(&config).unwrap();
//!
//! let fetch = session.load(["main.js"], None);
//! assert_eq!(fetch[0].as_str(), "http://h/app/main.js");
//!
//! let progress = session
//!     .on_fetched(&fetch[0], Ok(FetchedText::new("run();")))
//!     .unwrap();
//! assert!(matches!(progress, SessionProgress::Complete { .. }));
//! ```

pub mod assembler;
pub mod config;
pub mod directive;
mod error;
pub mod executor;
pub mod fetcher;
mod orchestrator;
pub mod preprocess;
pub mod registry;
pub mod resolver;
mod session;
pub mod transport;

pub use assembler::{Assembler, Splice};
pub use config::{CyclePolicy, LoaderConfig, DEFAULT_FETCH_TIMEOUT_MS, MAX_CONTENT_SIZE};
pub use directive::{parse, ParsedScript};
pub use error::{LoadError, LoadResult};
pub use executor::{CommandSink, ExecutionSink, Executor, FileSink, StdoutSink};
pub use fetcher::{FetchOutcome, Fetcher};
pub use orchestrator::{
    spawn_loader, LoadCommand, LoadEvent, LoadOrchestrator, LoaderHandle, RoundOutcome,
};
pub use preprocess::Preprocessor;
pub use registry::{Registry, ResourceEntry, ResourceStatus};
pub use resolver::{is_absolute, resolve};
pub use session::{LoadSession, SessionProgress};
pub use transport::{FetchedText, FileTransport, HttpTransport, RoutingTransport, ScriptTransport};

pub use scriptweave_types::{ImportChain, OrderedUnit, Placeholder, ResourceUrl, Segment, SessionId};
