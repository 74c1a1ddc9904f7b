//! Canonical absolute resource URLs.
//!
//! A `ResourceUrl` is the registry key for a script: every reference is
//! resolved to this form exactly once, where it is first encountered.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const SCHEME_SEPARATOR: &str = "://";

/// An absolute URL of the form `scheme://authority[/path]`, or
/// `file:///path` for local files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceUrl(String);

impl ResourceUrl {
    /// Validates `s` as an absolute URL.
    pub fn parse(s: &str) -> Result<Self> {
        let Some(idx) = s.find(SCHEME_SEPARATOR) else {
            return Err(invalid(s, "missing scheme separator"));
        };

        let scheme = &s[..idx];
        let valid_scheme = scheme.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if !valid_scheme {
            return Err(invalid(s, "invalid scheme"));
        }

        // `file:///path` has an empty authority; every other scheme needs one.
        let rest = &s[idx + SCHEME_SEPARATOR.len()..];
        let authority_missing = rest.split('/').next().is_none_or(str::is_empty);
        if authority_missing && !(scheme.eq_ignore_ascii_case("file") && rest.starts_with('/')) {
            return Err(invalid(s, "missing authority"));
        }

        Ok(Self(s.to_string()))
    }

    /// Returns the URL as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The scheme, without the `://` separator.
    pub fn scheme(&self) -> &str {
        let idx = self.0.find(SCHEME_SEPARATOR).unwrap_or(0);
        &self.0[..idx]
    }

    /// Everything after `scheme://`.
    pub fn after_scheme(&self) -> &str {
        self.0
            .find(SCHEME_SEPARATOR)
            .map_or("", |idx| &self.0[idx + SCHEME_SEPARATOR.len()..])
    }

    /// The authority (host and optional port).
    pub fn authority(&self) -> &str {
        self.after_scheme().split('/').next().unwrap_or_default()
    }

    /// The path after the authority, without the leading `/`.
    pub fn path(&self) -> &str {
        let rest = self.after_scheme();
        rest.find('/').map_or("", |idx| &rest[idx + 1..])
    }

    /// The directory containing this resource, as segments starting with the
    /// authority. The final segment (the file name) is dropped; empty
    /// segments are skipped.
    ///
    /// `http://h/dir/file.js` yields `["h", "dir"]`.
    pub fn directory_segments(&self) -> Vec<&str> {
        let mut segments: Vec<&str> = self.after_scheme().split('/').collect();
        if segments.len() > 1 {
            segments.pop();
        }
        segments
            .into_iter()
            .enumerate()
            .filter(|(i, seg)| *i == 0 || !seg.is_empty())
            .map(|(_, seg)| seg)
            .collect()
    }

    /// The final path segment, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.path().rsplit('/').next().filter(|name| !name.is_empty())
    }
}

fn invalid(url: &str, reason: &'static str) -> Error {
    Error::InvalidUrl {
        url: url.to_string(),
        reason,
    }
}

impl fmt::Display for ResourceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ResourceUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl AsRef<str> for ResourceUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ResourceUrl {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ResourceUrl> for String {
    fn from(url: ResourceUrl) -> Self {
        url.0
    }
}
