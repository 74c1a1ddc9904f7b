//! Command-line front end for the scriptweave loader.
//!
//! Loads root scripts from a base URL, assembles their import graph and
//! hands the result to a sink: stdout, a file, or a child process.

use anyhow::{Context, Result};
use clap::Parser;
use scriptweave_loader::preprocess;
use scriptweave_loader::{
    spawn_loader, CommandSink, CyclePolicy, ExecutionSink, FileSink, LoaderConfig,
    RoutingTransport, StdoutSink,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug, Clone)]
#[command(name = "scriptweave")]
#[command(about = "Assemble scripts linked by //@import directives")]
#[command(version)]
pub struct Args {
    /// Root scripts, resolved against the base URL
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Base URL for root paths (default: the config file's, else the
    /// current directory as file://)
    #[arg(short, long)]
    pub base: Option<String>,

    /// JSON config file; flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write the assembled source to a file
    #[arg(short, long, conflicts_with = "exec")]
    pub output: Option<PathBuf>,

    /// Pipe the assembled source into a program, e.g. `node`
    #[arg(short, long)]
    pub exec: Option<String>,

    /// Argument for the --exec program (repeatable)
    #[arg(long = "arg", requires = "exec", allow_hyphen_values = true)]
    pub exec_args: Vec<String>,

    /// Per-fetch timeout in milliseconds; 0 disables it
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Maximum size of one script in bytes
    #[arg(long)]
    pub max_size: Option<u64>,

    /// Import cycle handling: error or skip
    #[arg(long)]
    pub on_cycle: Option<CyclePolicy>,

    /// Turn `load.model('name')` calls in the roots into imports of
    /// `<DIR>/name.js`
    #[arg(long, value_name = "DIR")]
    pub models: Option<String>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Builds the loader config: defaults, then the config file, then flags.
pub fn resolve_config(args: &Args) -> Result<LoaderConfig> {
    let mut config = match &args.config {
        Some(path) => {
            LoaderConfig::from_json_file_over(path, &LoaderConfig::with_base(current_dir_base()?))
                .with_context(|| format!("failed to read config {}", path.display()))?
        }
        None => LoaderConfig::with_base(current_dir_base()?),
    };

    if let Some(base) = &args.base {
        config.base_url = base.clone();
    }
    if let Some(ms) = args.timeout_ms {
        config.fetch_timeout_ms = (ms > 0).then_some(ms);
    }
    if let Some(max) = args.max_size {
        config.max_content_size = max;
    }
    if let Some(policy) = args.on_cycle {
        config.cycle_policy = policy;
    }

    config
        .base()
        .with_context(|| format!("invalid base URL {:?}", config.base_url))?;
    Ok(config)
}

fn current_dir_base() -> Result<String> {
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    let cwd = cwd.display().to_string();
    Ok(format!("file://{}/", cwd.trim_end_matches('/')))
}

/// Picks the sink: `--exec`, then `--output`, then stdout.
pub fn build_sink(args: &Args) -> Arc<dyn ExecutionSink> {
    if let Some(program) = &args.exec {
        Arc::new(CommandSink::new(program.clone(), args.exec_args.clone()))
    } else if let Some(path) = &args.output {
        Arc::new(FileSink::new(path.clone()))
    } else {
        Arc::new(StdoutSink)
    }
}

/// Loads the roots, waits for the round and returns the assembled source.
///
/// Fails if the round fails (an import cycle under the `error` policy).
pub async fn run(args: &Args) -> Result<String> {
    let config = resolve_config(args)?;
    let transport = Arc::new(
        RoutingTransport::standard(&config).context("failed to set up transports")?,
    );
    let sink = build_sink(args);
    info!("Loading {} root(s) from {}", args.paths.len(), config.base_url);

    let (handle, task) = spawn_loader(&config, transport, sink).context("failed to start loader")?;
    match &args.models {
        Some(dir) => handle.load_preprocessed(&args.paths, preprocess::module_calls(dir.clone())),
        None => handle.load(&args.paths),
    };

    let outcome = handle.finished().await;
    handle.shutdown();
    task.await.context("loader task failed")?;

    let source = outcome.context("load failed")?;
    if source.is_none() {
        warn!("Nothing was loaded");
    }
    Ok(source.unwrap_or_default())
}
