//! Per-CPU execution statistics.
//!
//! This module tracks counters for one CPU. It provides:
//! 1. **Instruction mix:** Retired counts by category (ALU, load, store,
//!    branch, FP, PAL).
//! 2. **Memory hierarchy:** TLB and cache hit/miss counts.
//! 3. **Atomics and SMP:** Store-conditional outcomes and IPIs.
//! 4. **Control flow:** Branch and return-stack prediction accounting.

/// Statistics for one CPU.
#[derive(Clone, Debug, Default)]
pub struct CpuStats {
    /// Instructions retired.
    pub instructions_retired: u64,
    /// Integer ALU operations retired.
    pub inst_alu: u64,
    /// Loads retired.
    pub inst_load: u64,
    /// Stores retired.
    pub inst_store: u64,
    /// Branches and jumps retired.
    pub inst_branch: u64,
    /// Conditional branches that were taken.
    pub branches_taken: u64,
    /// Floating-point operations retired.
    pub inst_fp: u64,
    /// CALL_PAL instructions retired.
    pub inst_pal: u64,

    /// Exceptions delivered through the PAL path.
    pub traps_taken: u64,
    /// Interrupts accepted.
    pub interrupts_taken: u64,

    /// Instruction TLB hits.
    pub itlb_hits: u64,
    /// Instruction TLB misses.
    pub itlb_misses: u64,
    /// Data TLB hits.
    pub dtlb_hits: u64,
    /// Data TLB misses.
    pub dtlb_misses: u64,

    /// Store-conditional successes.
    pub sc_success: u64,
    /// Store-conditional failures.
    pub sc_fail: u64,
    /// Interprocessor interrupts sent.
    pub ipis_sent: u64,

    /// Fetches served from the hot-path decode cache.
    pub hot_fetches: u64,
    /// Return-address-stack mispredictions (counted, not architectural).
    pub ras_mispredicts: u64,

    /// Memory-barrier write-buffer drains.
    pub barriers: u64,
}

impl CpuStats {
    /// Returns the fraction of fetches served by the hot-path cache.
    pub fn hot_fetch_rate(&self) -> f64 {
        if self.instructions_retired == 0 {
            0.0
        } else {
            self.hot_fetches as f64 / self.instructions_retired as f64
        }
    }

    /// Prints a compact summary to stderr.
    pub fn report(&self, cpu_id: usize) {
        eprintln!(
            "cpu{cpu_id}: retired={} alu={} ld={} st={} br={} fp={} pal={} traps={} irq={}",
            self.instructions_retired,
            self.inst_alu,
            self.inst_load,
            self.inst_store,
            self.inst_branch,
            self.inst_fp,
            self.inst_pal,
            self.traps_taken,
            self.interrupts_taken,
        );
        eprintln!(
            "cpu{cpu_id}: itlb={}h/{}m dtlb={}h/{}m sc={}ok/{}fail hot={:.1}%",
            self.itlb_hits,
            self.itlb_misses,
            self.dtlb_hits,
            self.dtlb_misses,
            self.sc_success,
            self.sc_fail,
            self.hot_fetch_rate() * 100.0,
        );
    }
}
