//! Import directive parsing.
//!
//! An import directive is a line comment marker immediately followed by a
//! call-like token wrapping a path: `//@import(../lib/util.js)`. Paths may
//! only contain letters, digits, `_`, `.` and `/`; anything else is left in
//! place as ordinary code.

use crate::resolver::resolve;
use regex_lite::Regex;
use scriptweave_types::{ResourceUrl, Segment};
use std::sync::LazyLock;
use tracing::warn;

static IMPORT_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"//@import\(([A-Za-z0-9_./]+)\)").expect("import directive pattern is valid")
});

/// The result of parsing one script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedScript {
    /// Literal code and import references, in source order. Never contains
    /// empty literals.
    pub segments: Vec<Segment>,
    /// Every imported URL in source order, repeats included.
    pub imports: Vec<ResourceUrl>,
}

impl ParsedScript {
    /// Whether the script imports anything.
    pub fn has_imports(&self) -> bool {
        !self.imports.is_empty()
    }
}

/// Splits `raw` into literal segments and resolved import references.
pub fn parse(raw: &str, containing: &ResourceUrl) -> ParsedScript {
    let mut parsed = ParsedScript::default();
    let mut literal_start = 0;

    for caps in IMPORT_DIRECTIVE.captures_iter(raw) {
        let (Some(whole), Some(path)) = (caps.get(0), caps.get(1)) else {
            continue;
        };

        let url = match resolve(path.as_str(), containing) {
            Ok(url) => url,
            Err(e) => {
                // Left as literal text; it stays in the pending literal run.
                warn!("Ignoring import {:?} in {}: {}", path.as_str(), containing, e);
                continue;
            }
        };

        push_literal(&mut parsed.segments, &raw[literal_start..whole.start()]);
        parsed.segments.push(Segment::ImportRef(url.clone()));
        parsed.imports.push(url);
        literal_start = whole.end();
    }

    push_literal(&mut parsed.segments, &raw[literal_start..]);
    parsed
}

fn push_literal(segments: &mut Vec<Segment>, text: &str) {
    if !text.is_empty() {
        segments.push(Segment::Literal(text.to_string()));
    }
}
