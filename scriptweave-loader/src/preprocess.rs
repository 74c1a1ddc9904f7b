//! Source preprocessors.
//!
//! A preprocessor rewrites a fetched body before directive parsing. It is
//! attached to the root files of one `load` call and runs once per
//! successful fetch of those files.

use regex_lite::Regex;
use std::sync::{Arc, LazyLock};

/// Synchronous text rewrite applied before directive parsing.
pub type Preprocessor = Arc<dyn Fn(&str) -> String + Send + Sync>;

static MODULE_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"load\.model\(\s*['"]([A-Za-z0-9_./]+)['"]\s*\)"#)
        .expect("module call pattern is valid")
});

/// Wraps a closure as a [`Preprocessor`].
pub fn from_fn<F>(f: F) -> Preprocessor
where
    F: Fn(&str) -> String + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Turns `load.model('name')` calls into import directives.
///
/// One `//@import(<dir>/<name>.js)` line is prepended per distinct module,
/// in order of first use. The calls themselves are left in place.
pub fn module_calls(dir: impl Into<String>) -> Preprocessor {
    let dir = dir.into().trim_end_matches('/').to_string();
    Arc::new(move |source: &str| {
        let mut seen: Vec<&str> = Vec::new();
        for caps in MODULE_CALL.captures_iter(source) {
            if let Some(name) = caps.get(1).map(|m| m.as_str()) {
                if !seen.contains(&name) {
                    seen.push(name);
                }
            }
        }

        if seen.is_empty() {
            return source.to_string();
        }

        let mut out = String::new();
        for name in seen {
            let file = if name.ends_with(".js") {
                name.to_string()
            } else {
                format!("{name}.js")
            };
            if dir.is_empty() {
                out.push_str(&format!("//@import({file})\n"));
            } else {
                out.push_str(&format!("//@import({dir}/{file})\n"));
            }
        }
        out.push_str(source);
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_calls_is_identity() {
        let pre = module_calls("model");
        assert_eq!(pre("var a;"), "var a;");
    }

    #[test]
    fn prepends_one_directive_per_module() {
        let pre = module_calls("model/");
        let out = pre("load.model('ajax');\nload.model(\"dom\");\nload.model('ajax');");
        assert_eq!(
            out,
            "//@import(model/ajax.js)\n//@import(model/dom.js)\n\
             load.model('ajax');\nload.model(\"dom\");\nload.model('ajax');"
        );
    }

    #[test]
    fn empty_dir_imports_relative_to_file() {
        let pre = module_calls("");
        assert!(pre("load.model('x.js')").starts_with("//@import(x.js)\n"));
    }
}
