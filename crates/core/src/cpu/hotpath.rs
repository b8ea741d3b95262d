//! Hot-path decode cache.
//!
//! The interpreter profiles execution counts per PC. Once a PC crosses the
//! configured threshold its decoded form is cached and subsequent fetches
//! skip both the memory system and the decoder. Visible semantics are
//! identical to plain interpretation: the cache is invalidated on TLB
//! flushes, I-cache invalidation, and stores to any physical page a cached
//! instruction was fetched from.

use std::collections::HashMap;

use crate::isa::decode::Decoded;

#[derive(Clone, Debug)]
struct HotEntry {
    decoded: Decoded,
    phys_page: u64,
}

/// Per-CPU execution profiler and decode cache.
#[derive(Debug)]
pub struct HotPathCache {
    threshold: u32,
    counters: HashMap<u64, u32>,
    cached: HashMap<u64, HotEntry>,
    by_page: HashMap<u64, Vec<u64>>,
}

impl HotPathCache {
    /// Creates a cache with the given promotion threshold.
    ///
    /// A threshold of zero disables profiling entirely.
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            counters: HashMap::new(),
            cached: HashMap::new(),
            by_page: HashMap::new(),
        }
    }

    /// Returns the cached decode for `pc`, if the block is hot.
    #[inline]
    pub fn lookup(&self, pc: u64) -> Option<&Decoded> {
        self.cached.get(&pc).map(|e| &e.decoded)
    }

    /// Records one execution of `pc`.
    ///
    /// Returns `true` once the counter crosses the threshold, at which point
    /// the caller should `install` the decoded instruction.
    pub fn profile(&mut self, pc: u64) -> bool {
        if self.threshold == 0 {
            return false;
        }
        let count = self.counters.entry(pc).or_insert(0);
        *count = count.saturating_add(1);
        *count == self.threshold
    }

    /// Caches the decoded instruction fetched from `phys_page`.
    pub fn install(&mut self, pc: u64, decoded: Decoded, phys_page: u64) {
        let _ = self.cached.insert(pc, HotEntry { decoded, phys_page });
        self.by_page.entry(phys_page).or_default().push(pc);
    }

    /// Drops every cached decode fetched from `phys_page` (a store hit it).
    pub fn invalidate_page(&mut self, phys_page: u64) {
        if let Some(pcs) = self.by_page.remove(&phys_page) {
            for pc in pcs {
                let _ = self.cached.remove(&pc);
                let _ = self.counters.remove(&pc);
            }
        }
    }

    /// Drops everything (TLB flush or I-cache invalidation).
    pub fn invalidate_all(&mut self) {
        self.cached.clear();
        self.counters.clear();
        self.by_page.clear();
    }

    /// Number of PCs currently cached.
    pub fn len(&self) -> usize {
        self.cached.len()
    }

    /// Returns whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.cached.is_empty()
    }
}
