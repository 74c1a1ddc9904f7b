//! Units of the ordered assembly sequence.

use crate::ResourceUrl;
use std::fmt;
use std::sync::Arc;

/// The files a placeholder is nested in, outermost first.
///
/// Chains are shared between sibling placeholders, so extending one
/// allocates a new chain and leaves the original untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportChain(Arc<[ResourceUrl]>);

impl ImportChain {
    /// An empty chain, used for root placeholders.
    pub fn root() -> Self {
        Self(Arc::from(Vec::new()))
    }

    /// Returns a new chain with `url` appended.
    #[must_use]
    pub fn extended(&self, url: ResourceUrl) -> Self {
        let mut urls = self.0.to_vec();
        urls.push(url);
        Self(urls.into())
    }

    /// Whether `url` already appears in the chain.
    pub fn contains(&self, url: &ResourceUrl) -> bool {
        self.0.contains(url)
    }

    /// Nesting depth; zero for roots.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// The chain as a slice, outermost first.
    pub fn as_slice(&self) -> &[ResourceUrl] {
        &self.0
    }

    /// Copies the chain into a vector.
    pub fn to_vec(&self) -> Vec<ResourceUrl> {
        self.0.to_vec()
    }
}

impl Default for ImportChain {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for ImportChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, url) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{url}")?;
        }
        Ok(())
    }
}

/// A reserved position for a file whose content has not arrived yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// The file that will be spliced in here.
    pub url: ResourceUrl,
    /// The files this position is nested in.
    pub chain: ImportChain,
}

impl Placeholder {
    /// A placeholder for a root file.
    pub fn root(url: ResourceUrl) -> Self {
        Self {
            url,
            chain: ImportChain::root(),
        }
    }
}

/// One element of the assembly sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderedUnit {
    /// Final source text.
    Resolved(String),
    /// Waiting for a file to load.
    Unresolved(Placeholder),
}

impl OrderedUnit {
    /// Whether the unit is still waiting on a fetch.
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Self::Unresolved(_))
    }

    /// Returns the resolved text, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Resolved(text) => Some(text),
            Self::Unresolved(_) => None,
        }
    }

    /// Returns the URL this unit is waiting on, if any.
    pub fn pending_url(&self) -> Option<&ResourceUrl> {
        match self {
            Self::Resolved(_) => None,
            Self::Unresolved(placeholder) => Some(&placeholder.url),
        }
    }
}
