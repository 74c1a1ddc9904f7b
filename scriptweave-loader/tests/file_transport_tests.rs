use scriptweave_loader::executor::mock::MemorySink;
use scriptweave_loader::transport::mock::MockTransport;
use scriptweave_loader::{
    spawn_loader, FileSink, FileTransport, LoadError, LoaderConfig, ResourceUrl,
    RoutingTransport, ScriptTransport,
};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn file_url(path: &Path) -> ResourceUrl {
    ResourceUrl::parse(&format!("file://{}", path.display())).unwrap()
}

// ── FileTransport ───────────────────────────────────────────────

#[test]
fn path_ignores_authority() {
    let url = ResourceUrl::parse("file://localhost/srv/a.js").unwrap();
    assert_eq!(FileTransport::path_for(&url), Path::new("/srv/a.js"));

    let url = ResourceUrl::parse("file:///srv/a.js").unwrap();
    assert_eq!(FileTransport::path_for(&url), Path::new("/srv/a.js"));
}

#[tokio::test]
async fn reads_file_contents() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("a.js");
    std::fs::write(&file, "let a = 1;").unwrap();

    let fetched = FileTransport::new(1024)
        .fetch_text(&file_url(&file))
        .await
        .unwrap();
    assert_eq!(fetched.body, "let a = 1;");
    assert_eq!(fetched.content_type, None);
}

#[tokio::test]
async fn missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = FileTransport::new(1024)
        .fetch_text(&file_url(&dir.path().join("nope.js")))
        .await
        .unwrap_err();
    assert!(matches!(err, LoadError::Io(_)));
}

#[tokio::test]
async fn oversized_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("big.js");
    std::fs::write(&file, "0123456789").unwrap();

    let err = FileTransport::new(4)
        .fetch_text(&file_url(&file))
        .await
        .unwrap_err();
    assert_eq!(err, LoadError::ContentTooLarge { size: 10, max: 4 });
}

#[tokio::test]
async fn non_file_scheme_is_rejected() {
    let err = FileTransport::new(1024)
        .fetch_text(&ResourceUrl::parse("http://h/a.js").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err, LoadError::UnsupportedScheme("http".into()));
}

// ── RoutingTransport ────────────────────────────────────────────

#[tokio::test]
async fn routes_by_scheme() {
    let mock = MockTransport::new().with("http://h/a.js", "A");
    let router = RoutingTransport::new().route("HTTP", Arc::new(mock.clone()));
    assert!(router.handles("http"));
    assert!(!router.handles("ftp"));

    let fetched = router
        .fetch_text(&ResourceUrl::parse("http://h/a.js").unwrap())
        .await
        .unwrap();
    assert_eq!(fetched.body, "A");
    assert_eq!(mock.requests(), vec!["http://h/a.js".to_string()]);
}

#[tokio::test]
async fn unknown_scheme_is_rejected() {
    let router = RoutingTransport::new();
    let err = router
        .fetch_text(&ResourceUrl::parse("ftp://h/a.js").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err, LoadError::UnsupportedScheme("ftp".into()));
}

#[tokio::test]
async fn standard_router_handles_web_and_file() {
    let router = RoutingTransport::standard(&LoaderConfig::default()).unwrap();
    assert!(router.handles("http"));
    assert!(router.handles("https"));
    assert!(router.handles("file"));
}

// ── End to end ──────────────────────────────────────────────────

#[tokio::test]
async fn loads_tree_from_disk_into_file_sink() {
    let src = TempDir::new().unwrap();
    std::fs::create_dir_all(src.path().join("lib")).unwrap();
    std::fs::write(src.path().join("main.js"), "//@import(lib/a.js)main();").unwrap();
    std::fs::write(src.path().join("lib/a.js"), "//@import(b.js)a();").unwrap();
    std::fs::write(src.path().join("lib/b.js"), "b();").unwrap();

    let out_dir = TempDir::new().unwrap();
    let out_path = out_dir.path().join("build/bundle.js");

    let config = LoaderConfig::with_base(format!("file://{}/", src.path().display()));
    let transport = Arc::new(RoutingTransport::standard(&config).unwrap());
    let sink = Arc::new(FileSink::new(&out_path));
    let (handle, _task) = spawn_loader(&config, transport, sink).unwrap();

    let out = handle.load(["main.js"]).finished().await.unwrap();
    assert_eq!(out.as_deref(), Some("b();a();main();"));
    assert_eq!(std::fs::read_to_string(&out_path).unwrap(), "b();a();main();");
}

#[tokio::test]
async fn missing_file_in_tree_is_empty() {
    let src = TempDir::new().unwrap();
    std::fs::write(src.path().join("main.js"), "x//@import(absent.js)y").unwrap();

    let config = LoaderConfig::with_base(format!("file://{}/", src.path().display()));
    let transport = Arc::new(FileTransport::new(config.max_content_size));
    let (handle, _task) =
        spawn_loader(&config, transport, Arc::new(MemorySink::new())).unwrap();

    let out = handle.load(["main.js"]).finished().await.unwrap();
    assert_eq!(out.as_deref(), Some("xy"));
}
