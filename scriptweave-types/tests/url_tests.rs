use proptest::prelude::*;
use scriptweave_types::{Error, ResourceUrl};
use std::collections::HashSet;
use std::str::FromStr;

// ── Parsing ─────────────────────────────────────────────────────

#[test]
fn parse_http_url() {
    let url = ResourceUrl::parse("http://h/dir/file.js").unwrap();
    assert_eq!(url.as_str(), "http://h/dir/file.js");
    assert_eq!(url.scheme(), "http");
    assert_eq!(url.authority(), "h");
    assert_eq!(url.path(), "dir/file.js");
}

#[test]
fn parse_https_with_port() {
    let url = ResourceUrl::parse("https://cdn.example.com:8443/lib/a.js").unwrap();
    assert_eq!(url.scheme(), "https");
    assert_eq!(url.authority(), "cdn.example.com:8443");
    assert_eq!(url.file_name(), Some("a.js"));
}

#[test]
fn parse_file_url_keeps_local_path() {
    let url = ResourceUrl::parse("file://localhost/srv/app/main.js").unwrap();
    assert_eq!(url.scheme(), "file");
    assert_eq!(url.authority(), "localhost");
    assert_eq!(url.directory_segments(), vec!["localhost", "srv", "app"]);
}

#[test]
fn parse_file_url_without_authority() {
    let url = ResourceUrl::parse("file:///srv/app/main.js").unwrap();
    assert_eq!(url.authority(), "");
    assert_eq!(url.path(), "srv/app/main.js");
    assert_eq!(url.directory_segments(), vec!["", "srv", "app"]);
}

#[test]
fn parse_rejects_missing_scheme() {
    let err = ResourceUrl::parse("dir/file.js").unwrap_err();
    assert!(matches!(err, Error::InvalidUrl { .. }));
}

#[test]
fn parse_rejects_empty_scheme() {
    assert!(ResourceUrl::parse("://h/a.js").is_err());
}

#[test]
fn parse_rejects_bad_scheme_characters() {
    assert!(ResourceUrl::parse("ht tp://h/a.js").is_err());
    assert!(ResourceUrl::parse("1http://h/a.js").is_err());
}

#[test]
fn parse_rejects_missing_authority() {
    assert!(ResourceUrl::parse("http:///a.js").is_err());
    assert!(ResourceUrl::parse("http://").is_err());
}

#[test]
fn from_str_matches_parse() {
    let a = ResourceUrl::from_str("http://h/a.js").unwrap();
    let b = ResourceUrl::parse("http://h/a.js").unwrap();
    assert_eq!(a, b);
}

// ── Directory segments ──────────────────────────────────────────

#[test]
fn directory_drops_file_name() {
    let url = ResourceUrl::parse("http://h/dir/file.js").unwrap();
    assert_eq!(url.directory_segments(), vec!["h", "dir"]);
}

#[test]
fn directory_of_trailing_slash() {
    let url = ResourceUrl::parse("http://h/dir/").unwrap();
    assert_eq!(url.directory_segments(), vec!["h", "dir"]);
}

#[test]
fn directory_of_bare_authority() {
    let url = ResourceUrl::parse("http://h").unwrap();
    assert_eq!(url.directory_segments(), vec!["h"]);
    assert_eq!(url.file_name(), None);
}

#[test]
fn directory_skips_empty_segments() {
    let url = ResourceUrl::parse("http://h//a//b.js").unwrap();
    assert_eq!(url.directory_segments(), vec!["h", "a"]);
}

// ── Traits ──────────────────────────────────────────────────────

#[test]
fn display_is_the_raw_url() {
    let url = ResourceUrl::parse("https://x/y.js").unwrap();
    assert_eq!(url.to_string(), "https://x/y.js");
}

#[test]
fn hash_and_eq() {
    let url = ResourceUrl::parse("http://h/a.js").unwrap();
    let mut set = HashSet::new();
    set.insert(url.clone());
    set.insert(url);
    assert_eq!(set.len(), 1);
}

#[test]
fn serde_roundtrip() {
    let url = ResourceUrl::parse("http://h/a.js").unwrap();
    let json = serde_json::to_string(&url).unwrap();
    assert_eq!(json, "\"http://h/a.js\"");
    let back: ResourceUrl = serde_json::from_str(&json).unwrap();
    assert_eq!(back, url);
}

#[test]
fn serde_rejects_invalid_url() {
    let result: Result<ResourceUrl, _> = serde_json::from_str("\"not a url\"");
    assert!(result.is_err());
}

// ── Properties ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn directory_segments_start_with_authority(
        host in "[a-z]{1,10}",
        dirs in prop::collection::vec("[a-z0-9_]{1,8}", 0..5),
        file in "[a-z]{1,8}\\.js",
    ) {
        let mut raw = format!("http://{host}");
        for d in &dirs {
            raw.push('/');
            raw.push_str(d);
        }
        raw.push('/');
        raw.push_str(&file);

        let url = ResourceUrl::parse(&raw).unwrap();
        let segments = url.directory_segments();
        prop_assert_eq!(segments[0], host.as_str());
        prop_assert_eq!(segments.len(), dirs.len() + 1);
        prop_assert_eq!(url.file_name(), Some(file.as_str()));
    }
}
