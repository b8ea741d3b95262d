//! Per-CPU cache hierarchy.
//!
//! This module implements the three-level inclusive cache (split L1-I/L1-D,
//! unified L2 and L3). It provides:
//! 1. **Lookup:** Reads walk L1 toward backing memory, filling upward.
//! 2. **Write Handling:** Stores update the L1-D line, mark it Modified, and
//!    record it in the per-CPU write buffer drained by memory barriers.
//! 3. **Invalidation:** Coherency events invalidate a line in every level.
//!
//! The hierarchy is private to its CPU; cross-CPU coherency flows through
//! the `SmpCoordinator`, which turns remote stores into line invalidations.
//! Stores propagate to physical memory eagerly, so draining the write buffer
//! is a visibility bookkeeping point rather than a data transfer.

use crate::common::error::MemoryFault;
use crate::config::CacheLevelConfig;
use crate::soc::phys::PhysicalMemory;

/// Coherency state of one cache line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineState {
    /// The line holds no data.
    #[default]
    Invalid,
    /// The line is clean and may be present in other caches.
    Shared,
    /// The line is clean and present only in this cache.
    Exclusive,
    /// The line has been written by this CPU.
    Modified,
}

/// One cache line: tag, coherency state, and data payload.
#[derive(Clone, Debug, Default)]
struct CacheLine {
    tag: u64,
    state: LineState,
    data: Box<[u8]>,
    last_use: u64,
}

impl CacheLine {
    #[inline(always)]
    fn valid(&self) -> bool {
        self.state != LineState::Invalid
    }
}

/// A single set-associative cache level.
#[derive(Clone, Debug)]
pub struct Cache {
    lines: Vec<CacheLine>,
    num_sets: usize,
    ways: usize,
    line_bytes: usize,
    clock: u64,
    enabled: bool,
    /// Lookup hits at this level.
    pub hits: u64,
    /// Lookup misses at this level.
    pub misses: u64,
}

impl Cache {
    /// Creates a cache level from its configuration.
    pub fn new(config: &CacheLevelConfig) -> Self {
        let ways = config.ways.max(1);
        let line_bytes = config.line_bytes.max(8).next_power_of_two();
        let size = config.size_bytes.max(line_bytes * ways);
        let num_sets = (size / line_bytes / ways).max(1);

        Self {
            lines: vec![CacheLine::default(); num_sets * ways],
            num_sets,
            ways,
            line_bytes,
            clock: 0,
            enabled: config.enabled,
            hits: 0,
            misses: 0,
        }
    }

    #[inline(always)]
    fn set_index(&self, pa: u64) -> usize {
        ((pa as usize) / self.line_bytes) % self.num_sets
    }

    #[inline(always)]
    fn tag(&self, pa: u64) -> u64 {
        pa / (self.line_bytes * self.num_sets) as u64
    }

    #[inline(always)]
    fn line_base(&self, pa: u64) -> u64 {
        pa & !(self.line_bytes as u64 - 1)
    }

    fn find(&mut self, pa: u64) -> Option<usize> {
        if !self.enabled {
            return None;
        }
        let base = self.set_index(pa) * self.ways;
        let tag = self.tag(pa);
        (0..self.ways)
            .map(|w| base + w)
            .find(|&idx| self.lines[idx].valid() && self.lines[idx].tag == tag)
    }

    /// Probes for `pa`, updating LRU bookkeeping and hit/miss counters.
    pub fn probe(&mut self, pa: u64) -> bool {
        match self.find(pa) {
            Some(idx) => {
                self.clock += 1;
                self.lines[idx].last_use = self.clock;
                self.hits += 1;
                true
            }
            None => {
                if self.enabled {
                    self.misses += 1;
                }
                false
            }
        }
    }

    /// Installs the line containing `pa` with data from physical memory.
    ///
    /// The LRU way of the set is the victim. Returns whether a Modified
    /// victim was evicted (a write-back event for the statistics).
    pub fn fill(&mut self, pa: u64, phys: &PhysicalMemory, state: LineState) -> bool {
        if !self.enabled {
            return false;
        }
        let base = self.set_index(pa) * self.ways;
        let tag = self.tag(pa);
        let victim = (0..self.ways)
            .map(|w| base + w)
            .min_by_key(|&idx| {
                if self.lines[idx].valid() {
                    self.lines[idx].last_use + 1
                } else {
                    0
                }
            })
            .unwrap_or(base);

        let evicted_dirty = self.lines[victim].state == LineState::Modified;

        let line_base = self.line_base(pa);
        let mut data = vec![0u8; self.line_bytes];
        // A partial line at the very end of memory is clamped; the tail
        // stays zero and is never architecturally readable.
        let avail = (phys.len() as u64).saturating_sub(line_base) as usize;
        let copy = avail.min(self.line_bytes);
        if copy > 0 && phys.read_bytes(line_base, &mut data[..copy]).is_err() {
            return evicted_dirty;
        }

        self.clock += 1;
        self.lines[victim] = CacheLine {
            tag,
            state,
            data: data.into_boxed_slice(),
            last_use: self.clock,
        };
        evicted_dirty
    }

    /// Reads `size` bytes from a resident line. Returns `None` on miss.
    pub fn read(&mut self, pa: u64, size: usize) -> Option<u64> {
        let idx = self.find(pa)?;
        self.clock += 1;
        self.lines[idx].last_use = self.clock;
        let offset = (pa as usize) & (self.line_bytes - 1);
        let mut buf = [0u8; 8];
        buf[..size].copy_from_slice(&self.lines[idx].data[offset..offset + size]);
        Some(u64::from_le_bytes(buf))
    }

    /// Updates a resident line in place, marking it Modified.
    ///
    /// Returns whether the line was present.
    pub fn write(&mut self, pa: u64, val: u64, size: usize) -> bool {
        let Some(idx) = self.find(pa) else {
            return false;
        };
        self.clock += 1;
        let offset = (pa as usize) & (self.line_bytes - 1);
        let line = &mut self.lines[idx];
        line.last_use = self.clock;
        line.state = LineState::Modified;
        line.data[offset..offset + size].copy_from_slice(&val.to_le_bytes()[..size]);
        true
    }

    /// Invalidates the line containing `pa`, if resident.
    pub fn invalidate(&mut self, pa: u64) {
        if let Some(idx) = self.find(pa) {
            self.lines[idx].state = LineState::Invalid;
        }
    }

    /// Invalidates every line.
    pub fn invalidate_all(&mut self) {
        for line in &mut self.lines {
            line.state = LineState::Invalid;
        }
    }

    /// Downgrades every Modified line to Exclusive (write buffer drained).
    fn clean_all(&mut self) {
        for line in &mut self.lines {
            if line.state == LineState::Modified {
                line.state = LineState::Exclusive;
            }
        }
    }

    /// Returns the coherency state of the line containing `pa`.
    pub fn state_of(&mut self, pa: u64) -> LineState {
        self.find(pa)
            .map_or(LineState::Invalid, |idx| self.lines[idx].state)
    }

    /// Returns the configured line size in bytes.
    pub fn line_bytes(&self) -> usize {
        self.line_bytes
    }
}

/// The full three-level hierarchy of one CPU.
#[derive(Clone, Debug)]
pub struct CacheHierarchy {
    /// L1 instruction cache.
    pub l1i: Cache,
    /// L1 data cache.
    pub l1d: Cache,
    /// Unified second-level cache.
    pub l2: Cache,
    /// Unified third-level cache.
    pub l3: Cache,
    write_buffer: Vec<u64>,
    write_buffer_capacity: usize,
    /// Number of write-buffer drains performed.
    pub drains: u64,
    /// Number of Modified-line evictions observed.
    pub writebacks: u64,
}

impl CacheHierarchy {
    /// Creates the hierarchy from the per-level configurations.
    pub fn new(
        l1i: &CacheLevelConfig,
        l1d: &CacheLevelConfig,
        l2: &CacheLevelConfig,
        l3: &CacheLevelConfig,
        write_buffer_capacity: usize,
    ) -> Self {
        Self {
            l1i: Cache::new(l1i),
            l1d: Cache::new(l1d),
            l2: Cache::new(l2),
            l3: Cache::new(l3),
            write_buffer: Vec::new(),
            write_buffer_capacity: write_buffer_capacity.max(1),
            drains: 0,
            writebacks: 0,
        }
    }

    /// Reads through the hierarchy, filling upward on a lower-level hit.
    pub fn read(
        &mut self,
        pa: u64,
        size: usize,
        is_fetch: bool,
        phys: &PhysicalMemory,
    ) -> Result<u64, MemoryFault> {
        let l1 = if is_fetch { &mut self.l1i } else { &mut self.l1d };
        if let Some(val) = l1.read(pa, size) {
            l1.hits += 1;
            return Ok(val);
        }
        l1.misses += 1;

        // Walk down, recording which levels missed so they fill inclusively.
        let l2_hit = self.l2.probe(pa);
        let l3_hit = l2_hit || self.l3.probe(pa);

        let val = phys.read(pa, size)?;

        if !l3_hit {
            self.writebacks += u64::from(self.l3.fill(pa, phys, LineState::Shared));
        }
        if !l2_hit {
            self.writebacks += u64::from(self.l2.fill(pa, phys, LineState::Shared));
        }
        let l1 = if is_fetch { &mut self.l1i } else { &mut self.l1d };
        self.writebacks += u64::from(l1.fill(pa, phys, LineState::Shared));
        Ok(val)
    }

    /// Writes through the hierarchy.
    ///
    /// The L1-D line is updated (installed if absent) and marked Modified;
    /// lower levels are kept consistent when resident; the store is recorded
    /// in the write buffer and propagated to physical memory.
    pub fn write(
        &mut self,
        pa: u64,
        val: u64,
        size: usize,
        phys: &PhysicalMemory,
    ) -> Result<(), MemoryFault> {
        phys.write(pa, val, size)?;

        if !self.l1d.write(pa, val, size) {
            self.writebacks += u64::from(self.l1d.fill(pa, phys, LineState::Modified));
            self.l1d.misses += 1;
        } else {
            self.l1d.hits += 1;
        }
        let _ = self.l2.write(pa, val, size);
        let _ = self.l3.write(pa, val, size);
        // Keep the instruction side coherent with local stores.
        self.l1i.invalidate(pa);

        let line = pa & !(self.l1d.line_bytes() as u64 - 1);
        if !self.write_buffer.contains(&line) {
            self.write_buffer.push(line);
        }
        if self.write_buffer.len() >= self.write_buffer_capacity {
            let _ = self.drain_write_buffer();
        }
        Ok(())
    }

    /// Drains the write buffer (memory barrier or explicit flush).
    ///
    /// Returns the number of buffered lines retired.
    pub fn drain_write_buffer(&mut self) -> usize {
        let retired = self.write_buffer.len();
        if retired > 0 {
            self.write_buffer.clear();
            self.l1d.clean_all();
            self.drains += 1;
        }
        retired
    }

    /// Invalidates the line containing `pa` in every level.
    pub fn invalidate_line(&mut self, pa: u64) {
        self.l1i.invalidate(pa);
        self.l1d.invalidate(pa);
        self.l2.invalidate(pa);
        self.l3.invalidate(pa);
        self.write_buffer
            .retain(|&line| line != (pa & !(self.l1d.line_bytes() as u64 - 1)));
    }

    /// Invalidates the instruction side only (I-cache flush).
    pub fn invalidate_icache(&mut self) {
        self.l1i.invalidate_all();
    }

    /// Invalidates everything and drains the write buffer.
    pub fn flush(&mut self) {
        let _ = self.drain_write_buffer();
        self.l1i.invalidate_all();
        self.l1d.invalidate_all();
        self.l2.invalidate_all();
        self.l3.invalidate_all();
    }

    /// Returns the number of lines currently sitting in the write buffer.
    pub fn write_buffer_depth(&self) -> usize {
        self.write_buffer.len()
    }
}
