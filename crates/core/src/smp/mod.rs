//! Cross-CPU coordination.
//!
//! This module implements the one legitimate piece of cross-CPU mutable
//! state: the coordinator tracking load-locked reservations, cache coherency
//! events, interprocessor interrupts, and TLB shootdowns. It provides:
//! 1. **Reservations:** Linearizable LL/SC arbitration at 16-byte granularity.
//! 2. **Coherency:** Per-CPU event queues of remote line invalidations.
//! 3. **Interrupts:** IPI delivery and IPL-filtered acceptance.
//! 4. **Rendezvous:** A timed synchronization point for quiesce operations.

/// Coherency and interrupt event types, and the timed rendezvous point.
pub mod events;

/// The coordinator itself.
pub mod coordinator;

pub use coordinator::SmpCoordinator;
pub use events::{CoherencyEvent, PendingInterrupt, SyncPoint, TlbShootdown};
