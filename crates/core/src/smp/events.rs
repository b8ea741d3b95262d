//! Cross-CPU event types and the timed rendezvous point.

use std::sync::{Condvar, Mutex};
use std::time::Duration;

/// A TLB invalidation broadcast to peer CPUs.
///
/// Peers apply the matching local invalidation at their next instruction
/// boundary so stale translations are shot down machine-wide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TlbShootdown {
    /// Invalidate everything (TBIA).
    All,
    /// Invalidate every non-global entry for one address space (TBIASN).
    Asn(u8),
    /// Invalidate one page in both TLB sides (TBIS).
    Single {
        /// Virtual address naming the page.
        va: u64,
        /// Address space of the mapping.
        asn: u8,
    },
    /// Invalidate one page in the data side only (TBISD).
    SingleData {
        /// Virtual address naming the page.
        va: u64,
        /// Address space of the mapping.
        asn: u8,
    },
    /// Invalidate one page in the instruction side only (TBISI).
    SingleInstr {
        /// Virtual address naming the page.
        va: u64,
        /// Address space of the mapping.
        asn: u8,
    },
}

/// An event queued for a CPU to apply at its next instruction boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoherencyEvent {
    /// A remote store touched this physical line; drop any cached copy.
    InvalidateLine(u64),
    /// A peer issued a TLB invalidation that may affect this CPU.
    TlbShootdown(TlbShootdown),
}

/// An interrupt queued for delivery to a CPU.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingInterrupt {
    /// Vector identifying the source (device IRQ or IPI vector).
    pub vector: u64,
    /// Priority level (1-7); delivered only when above the CPU's IPL.
    pub level: u8,
    /// Originating CPU for IPIs, or the CPU itself for software interrupts.
    pub source: usize,
}

/// A rendezvous point with a timeout.
///
/// Quiesce operations (pause, bus reconfiguration) gather every CPU here.
/// A CPU that waits longer than the configured timeout escalates to a
/// machine check rather than hanging the machine.
#[derive(Debug)]
pub struct SyncPoint {
    state: Mutex<SyncState>,
    cond: Condvar,
}

#[derive(Debug, Default)]
struct SyncState {
    arrived: usize,
    generation: u64,
}

impl SyncPoint {
    /// Creates a rendezvous point.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SyncState::default()),
            cond: Condvar::new(),
        }
    }

    /// Waits until `parties` callers have arrived, or the timeout elapses.
    ///
    /// Returns `false` on timeout; the caller escalates to a machine check.
    pub fn wait(&self, parties: usize, timeout: Duration) -> bool {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.arrived += 1;
        if state.arrived >= parties {
            state.arrived = 0;
            state.generation += 1;
            self.cond.notify_all();
            return true;
        }

        let generation = state.generation;
        let deadline = std::time::Instant::now() + timeout;
        while state.generation == generation {
            let now = std::time::Instant::now();
            let Some(remaining) = deadline.checked_duration_since(now).filter(|d| !d.is_zero())
            else {
                state.arrived = state.arrived.saturating_sub(1);
                return false;
            };
            let (guard, _) = match self.cond.wait_timeout(state, remaining) {
                Ok(r) => r,
                Err(poisoned) => poisoned.into_inner(),
            };
            state = guard;
        }
        true
    }
}

impl Default for SyncPoint {
    fn default() -> Self {
        Self::new()
    }
}
