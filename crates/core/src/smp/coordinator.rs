//! The SMP coordinator.
//!
//! One instance is shared by every CPU. It owns the reservation table used
//! to arbitrate load-locked/store-conditional pairs, the per-CPU queues of
//! coherency events and pending interrupts, and the quiesce rendezvous.
//! Critical sections are short: table lookups and small updates only.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::common::constants::RESERVATION_GRANULE;

use super::events::{CoherencyEvent, PendingInterrupt, SyncPoint, TlbShootdown};

/// A live load-locked reservation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Reservation {
    /// Physical address rounded down to the reservation granule.
    block: u64,
    /// Access size of the LL (4 or 8).
    size: usize,
}

#[derive(Debug, Default)]
struct Mailbox {
    coherency: VecDeque<CoherencyEvent>,
    interrupts: Vec<PendingInterrupt>,
}

/// Global coordinator for reservations, coherency, and IPIs.
///
/// Owned by the machine; each CPU borrows it for the duration of a step.
#[derive(Debug)]
pub struct SmpCoordinator {
    reservations: Mutex<Vec<Option<Reservation>>>,
    mailboxes: Vec<Mutex<Mailbox>>,
    quiesce: SyncPoint,
    barrier_timeout: Duration,
}

#[inline(always)]
fn block_of(pa: u64) -> u64 {
    pa & !(RESERVATION_GRANULE - 1)
}

impl SmpCoordinator {
    /// Creates a coordinator for `num_cpus` CPUs.
    pub fn new(num_cpus: usize, barrier_timeout: Duration) -> Self {
        Self {
            reservations: Mutex::new(vec![None; num_cpus]),
            mailboxes: (0..num_cpus).map(|_| Mutex::new(Mailbox::default())).collect(),
            quiesce: SyncPoint::new(),
            barrier_timeout,
        }
    }

    /// Returns the number of CPUs this coordinator serves.
    pub fn num_cpus(&self) -> usize {
        self.mailboxes.len()
    }

    fn lock_reservations(&self) -> std::sync::MutexGuard<'_, Vec<Option<Reservation>>> {
        match self.reservations.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn lock_mailbox(&self, cpu: usize) -> std::sync::MutexGuard<'_, Mailbox> {
        match self.mailboxes[cpu].lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Records a load-locked reservation for `cpu_id`.
    ///
    /// Any previous reservation by the same CPU is replaced.
    pub fn record_reservation(&self, cpu_id: usize, physical_address: u64, size: usize) {
        let mut table = self.lock_reservations();
        table[cpu_id] = Some(Reservation {
            block: block_of(physical_address),
            size,
        });
    }

    /// Arbitrates a store-conditional.
    ///
    /// Succeeds iff `cpu_id` still holds a reservation on the block
    /// containing `physical_address` with a matching size. On success every
    /// reservation on the block (the issuer's included) is cleared while the
    /// table lock is held, so a concurrent store and SC to the same block
    /// can never both succeed.
    pub fn try_store_conditional(&self, cpu_id: usize, physical_address: u64, size: usize) -> bool {
        let block = block_of(physical_address);
        let mut table = self.lock_reservations();
        let valid = table[cpu_id].is_some_and(|r| r.block == block && r.size == size);
        if valid {
            for slot in table.iter_mut() {
                if slot.is_some_and(|r| r.block == block) {
                    *slot = None;
                }
            }
        } else {
            table[cpu_id] = None;
        }
        valid
    }

    /// Clears every reservation on the block containing `physical_address`.
    ///
    /// Called on every non-atomic store: a store by CPU A to a block
    /// reserved by CPU B invalidates B's reservation.
    pub fn invalidate_block(&self, physical_address: u64) {
        let block = block_of(physical_address);
        let mut table = self.lock_reservations();
        for slot in table.iter_mut() {
            if slot.is_some_and(|r| r.block == block) {
                *slot = None;
            }
        }
    }

    /// Clears the reservation held by one CPU (exception delivery, REI).
    pub fn clear_reservation(&self, cpu_id: usize) {
        self.lock_reservations()[cpu_id] = None;
    }

    /// Returns whether `cpu_id` currently holds a valid reservation.
    pub fn has_reservation(&self, cpu_id: usize) -> bool {
        self.lock_reservations()[cpu_id].is_some()
    }

    /// Publishes a store so peers drop their cached copies of the line.
    ///
    /// The issuing CPU's own cache was already updated in place and is not
    /// notified.
    pub fn publish_store(&self, source: usize, line_address: u64) {
        for (cpu, mailbox) in self.mailboxes.iter().enumerate() {
            if cpu == source {
                continue;
            }
            let mut mb = match mailbox.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            mb.coherency
                .push_back(CoherencyEvent::InvalidateLine(line_address));
        }
    }

    /// Broadcasts a TLB invalidation so peers shoot down matching entries.
    pub fn on_tlb_invalidate(&self, source: usize, op: TlbShootdown) {
        tracing::trace!(source, ?op, "tlb shootdown broadcast");
        for (cpu, mailbox) in self.mailboxes.iter().enumerate() {
            if cpu == source {
                continue;
            }
            let mut mb = match mailbox.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            mb.coherency.push_back(CoherencyEvent::TlbShootdown(op));
        }
    }

    /// Sends an interprocessor interrupt to one CPU.
    pub fn send_ipi(&self, source: usize, target: usize, vector: u64, level: u8) {
        tracing::debug!(source, target, vector, level, "ipi");
        self.lock_mailbox(target)
            .interrupts
            .push(PendingInterrupt {
                vector,
                level,
                source,
            });
    }

    /// Sends an interprocessor interrupt to every CPU.
    pub fn broadcast_ipi(&self, source: usize, vector: u64, level: u8, include_self: bool) {
        for target in 0..self.mailboxes.len() {
            if target == source && !include_self {
                continue;
            }
            self.send_ipi(source, target, vector, level);
        }
    }

    /// Drains the coherency events queued for `cpu_id`.
    pub fn take_coherency_events(&self, cpu_id: usize) -> Vec<CoherencyEvent> {
        let mut mb = self.lock_mailbox(cpu_id);
        mb.coherency.drain(..).collect()
    }

    /// Removes and returns the highest-priority interrupt above `ipl`.
    ///
    /// Interrupts at or below the current IPL stay queued until the level
    /// is lowered; at IPL 7 nothing is ever returned.
    pub fn take_interrupt(&self, cpu_id: usize, ipl: u8) -> Option<PendingInterrupt> {
        let mut mb = self.lock_mailbox(cpu_id);
        let best = mb
            .interrupts
            .iter()
            .enumerate()
            .filter(|(_, int)| int.level > ipl)
            .max_by_key(|(_, int)| int.level)
            .map(|(idx, _)| idx)?;
        Some(mb.interrupts.swap_remove(best))
    }

    /// Returns whether any interrupt above `ipl` is pending for `cpu_id`.
    pub fn interrupt_pending(&self, cpu_id: usize, ipl: u8) -> bool {
        self.lock_mailbox(cpu_id)
            .interrupts
            .iter()
            .any(|int| int.level > ipl)
    }

    /// Gathers every CPU at the quiesce rendezvous.
    ///
    /// Returns `false` when the configured timeout elapsed first; the caller
    /// escalates to a machine check.
    pub fn quiesce(&self) -> bool {
        self.quiesce.wait(self.mailboxes.len(), self.barrier_timeout)
    }
}
