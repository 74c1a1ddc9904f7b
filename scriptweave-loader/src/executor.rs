//! Hands flattened source to an execution sink.
//!
//! Sink failures are the sink's concern: the executor logs them and moves
//! on.

use crate::error::{LoadError, LoadResult};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

/// Runs assembled source code.
#[async_trait]
pub trait ExecutionSink: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Runs (or emits) `code`.
    async fn execute_source(&self, code: &str) -> LoadResult<()>;
}

/// Passes completed rounds to a sink.
#[derive(Clone)]
pub struct Executor {
    sink: Arc<dyn ExecutionSink>,
}

impl Executor {
    /// Creates an executor over `sink`.
    pub fn new(sink: Arc<dyn ExecutionSink>) -> Self {
        Self { sink }
    }

    /// Runs `source`. Errors are logged, not returned.
    pub async fn execute(&self, source: &str) {
        info!("Executing {} bytes via {}", source.len(), self.sink.name());
        if let Err(e) = self.sink.execute_source(source).await {
            warn!("Sink {} failed: {}", self.sink.name(), e);
        }
    }
}

/// Writes source to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

#[async_trait]
impl ExecutionSink for StdoutSink {
    fn name(&self) -> &'static str {
        "stdout"
    }

    async fn execute_source(&self, code: &str) -> LoadResult<()> {
        let mut out = tokio::io::stdout();
        out.write_all(code.as_bytes()).await?;
        out.flush().await?;
        Ok(())
    }
}

/// Writes source to a file, replacing its contents.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    /// Creates a sink writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The output path.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl ExecutionSink for FileSink {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn execute_source(&self, code: &str) -> LoadResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, code).await?;
        Ok(())
    }
}

/// Pipes source into a child process, e.g. `node -`.
#[derive(Debug, Clone)]
pub struct CommandSink {
    program: String,
    args: Vec<String>,
}

impl CommandSink {
    /// Creates a sink running `program` with `args`.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

#[async_trait]
impl ExecutionSink for CommandSink {
    fn name(&self) -> &'static str {
        "command"
    }

    async fn execute_source(&self, code: &str) -> LoadResult<()> {
        let mut child = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| LoadError::Execution(format!("failed to spawn {}: {e}", self.program)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(code.as_bytes()).await?;
            stdin.shutdown().await?;
        }

        let status = child.wait().await?;
        if !status.success() {
            return Err(LoadError::Execution(format!(
                "{} exited with {}",
                self.program, status
            )));
        }
        Ok(())
    }
}

/// An in-memory sink for testing.
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Records every executed source.
    #[derive(Debug, Default, Clone)]
    pub struct MemorySink {
        executed: Arc<Mutex<Vec<String>>>,
    }

    impl MemorySink {
        /// Creates an empty sink.
        pub fn new() -> Self {
            Self::default()
        }

        /// Every executed source, in order.
        pub fn executed(&self) -> Vec<String> {
            self.executed.lock().unwrap().clone()
        }

        /// The most recent executed source.
        pub fn last(&self) -> Option<String> {
            self.executed.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl ExecutionSink for MemorySink {
        fn name(&self) -> &'static str {
            "memory"
        }

        async fn execute_source(&self, code: &str) -> LoadResult<()> {
            self.executed.lock().unwrap().push(code.to_string());
            Ok(())
        }
    }
}
