//! Relative-to-absolute URL resolution.
//!
//! Pure and deterministic. References are resolved once, where they are
//! first encountered, so the registry key is always the absolute form.

use scriptweave_types::{ResourceUrl, Result};

/// Whether `reference` is already an absolute http(s) URL.
pub fn is_absolute(reference: &str) -> bool {
    ["http://", "https://"].iter().any(|prefix| {
        reference
            .strip_prefix(prefix)
            .is_some_and(|rest| !rest.is_empty())
    })
}

/// Resolves `reference` against the directory of `base`.
///
/// Absolute http(s) references are returned unchanged. Otherwise each
/// `/`-separated segment is applied to the base directory: `..` pops one
/// segment (never the authority), `.` and empty segments are ignored, and
/// anything else is appended. A leading `/` starts from the authority.
pub fn resolve(reference: &str, base: &ResourceUrl) -> Result<ResourceUrl> {
    if is_absolute(reference) {
        return ResourceUrl::parse(reference);
    }

    let mut segments = if reference.starts_with('/') {
        vec![base.authority()]
    } else {
        base.directory_segments()
    };

    for part in reference.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                // Clamp at the authority.
                if segments.len() > 1 {
                    segments.pop();
                }
            }
            _ => segments.push(part),
        }
    }

    ResourceUrl::parse(&format!("{}://{}", base.scheme(), segments.join("/")))
}
