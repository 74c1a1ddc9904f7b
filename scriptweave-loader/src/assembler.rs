//! Ordered assembly of partially loaded script trees.
//!
//! The assembler holds one flat sequence of units. Each loaded file
//! replaces its placeholders in place with its own segments, so the final
//! concatenation matches a synchronous depth-first inliner no matter in
//! which order fetches complete.
//!
//! Placeholders only ever exist for files that are not loaded yet: an
//! import of a file already in the registry is inlined from the cached
//! segments while splicing.

use crate::config::CyclePolicy;
use crate::error::{LoadError, LoadResult};
use crate::registry::Registry;
use scriptweave_types::{ImportChain, OrderedUnit, Placeholder, ResourceUrl, Segment};
use tracing::{debug, warn};

/// Result of splicing one loaded file into the sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Splice {
    /// Number of placeholders replaced.
    pub replaced: usize,
    /// URLs of the placeholders introduced, in sequence order (repeats
    /// included).
    pub introduced: Vec<ResourceUrl>,
}

/// The session's ordered sequence of resolved text and placeholders.
#[derive(Debug, Default)]
pub struct Assembler {
    units: Vec<OrderedUnit>,
    cycle_policy: CyclePolicy,
}

impl Assembler {
    /// Creates an empty assembler.
    pub fn new(cycle_policy: CyclePolicy) -> Self {
        Self {
            units: Vec::new(),
            cycle_policy,
        }
    }

    /// Appends a placeholder for a root file.
    pub fn push_root(&mut self, url: ResourceUrl) {
        self.units.push(OrderedUnit::Unresolved(Placeholder::root(url)));
    }

    /// Splices `segments` in place of every placeholder for `url`.
    ///
    /// On an import cycle under
    /// [`CyclePolicy::Error`] the sequence is left untouched and the cycle
    /// is returned as an error.
    pub fn on_resource_loaded(
        &mut self,
        url: &ResourceUrl,
        segments: &[Segment],
        registry: &Registry,
    ) -> LoadResult<Splice> {
        let mut next = Vec::with_capacity(self.units.len() + segments.len());
        let mut splice = Splice::default();

        for unit in &self.units {
            match unit {
                OrderedUnit::Unresolved(placeholder) if &placeholder.url == url => {
                    splice.replaced += 1;
                    let chain = placeholder.chain.extended(url.clone());
                    self.splice(segments, &chain, registry, &mut next, &mut splice.introduced)?;
                }
                other => next.push(other.clone()),
            }
        }

        debug!(
            "Spliced {} into {} position(s), {} new placeholder(s)",
            url,
            splice.replaced,
            splice.introduced.len()
        );
        self.units = next;
        Ok(splice)
    }

    /// Emits one unit per segment. Imports of loaded files are inlined
    /// recursively; everything else becomes a placeholder.
    fn splice(
        &self,
        segments: &[Segment],
        chain: &ImportChain,
        registry: &Registry,
        out: &mut Vec<OrderedUnit>,
        introduced: &mut Vec<ResourceUrl>,
    ) -> LoadResult<()> {
        for segment in segments {
            match segment {
                Segment::Literal(text) => out.push(OrderedUnit::Resolved(text.clone())),
                Segment::ImportRef(import) => {
                    if chain.contains(import) {
                        let mut cycle = chain.to_vec();
                        cycle.push(import.clone());
                        match self.cycle_policy {
                            CyclePolicy::Error => return Err(LoadError::ImportCycle { chain: cycle }),
                            CyclePolicy::Skip => {
                                warn!(
                                    "Skipping import of {} that closes a cycle: {}",
                                    import,
                                    chain.extended(import.clone())
                                );
                                continue;
                            }
                        }
                    }

                    match registry.loaded_segments(import) {
                        Some(cached) => {
                            let nested = chain.extended(import.clone());
                            self.splice(cached, &nested, registry, out, introduced)?;
                        }
                        None => {
                            out.push(OrderedUnit::Unresolved(Placeholder {
                                url: import.clone(),
                                chain: chain.clone(),
                            }));
                            introduced.push(import.clone());
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Whether the sequence holds no placeholders.
    pub fn is_complete(&self) -> bool {
        !self.units.iter().any(OrderedUnit::is_unresolved)
    }

    /// Concatenates every resolved unit in order.
    pub fn flatten(&self) -> String {
        self.units.iter().filter_map(OrderedUnit::text).collect()
    }

    /// Flattens and empties the sequence.
    pub fn take_flattened(&mut self) -> String {
        let source = self.flatten();
        self.units.clear();
        source
    }

    /// URLs still awaited, in sequence order (repeats included).
    pub fn pending(&self) -> Vec<&ResourceUrl> {
        self.units.iter().filter_map(OrderedUnit::pending_url).collect()
    }

    /// The current sequence.
    pub fn units(&self) -> &[OrderedUnit] {
        &self.units
    }

    /// Whether the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Drops every unit.
    pub fn clear(&mut self) {
        self.units.clear();
    }
}
