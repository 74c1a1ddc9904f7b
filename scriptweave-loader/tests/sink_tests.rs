use scriptweave_loader::executor::mock::MemorySink;
use scriptweave_loader::{CommandSink, ExecutionSink, Executor, FileSink, LoadError};
use std::sync::Arc;
use tempfile::TempDir;

// ── FileSink ────────────────────────────────────────────────────

#[tokio::test]
async fn file_sink_creates_parents_and_overwrites() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested/out/bundle.js");
    let sink = FileSink::new(&path);
    assert_eq!(sink.path(), &path);

    sink.execute_source("first").await.unwrap();
    sink.execute_source("second").await.unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
}

// ── CommandSink ─────────────────────────────────────────────────

#[cfg(unix)]
#[tokio::test]
async fn command_sink_pipes_source_to_stdin() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("piped.js");
    let sink = CommandSink::new(
        "sh",
        vec!["-c".into(), format!("cat > '{}'", path.display())],
    );

    sink.execute_source("console.log(1);").await.unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "console.log(1);");
}

#[cfg(unix)]
#[tokio::test]
async fn command_sink_reports_exit_status() {
    let sink = CommandSink::new("sh", vec!["-c".into(), "cat > /dev/null; exit 3".into()]);
    let err = sink.execute_source("x").await.unwrap_err();
    assert!(matches!(err, LoadError::Execution(_)));
}

#[tokio::test]
async fn command_sink_reports_spawn_failure() {
    let sink = CommandSink::new("scriptweave-no-such-program", vec![]);
    let err = sink.execute_source("x").await.unwrap_err();
    assert!(matches!(err, LoadError::Execution(msg) if msg.contains("failed to spawn")));
}

// ── Executor ────────────────────────────────────────────────────

#[tokio::test]
async fn executor_forwards_to_sink() {
    let sink = MemorySink::new();
    let executor = Executor::new(Arc::new(sink.clone()));
    executor.execute("a").await;
    executor.execute("b").await;
    assert_eq!(sink.executed(), vec!["a".to_string(), "b".to_string()]);
    assert_eq!(sink.last().as_deref(), Some("b"));
}

#[tokio::test]
async fn executor_swallows_sink_errors() {
    let executor = Executor::new(Arc::new(CommandSink::new("scriptweave-no-such-program", vec![])));
    // logs and returns
    executor.execute("x").await;
}
