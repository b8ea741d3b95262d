//! CPU core unit tests.


/// Branches, jumps, and the return-address stack.
pub mod control;


/// Hot-path profiling and invalidation.
pub mod hotpath;

/// Logical operations, conditional moves, and the extended group.
pub mod logical;


/// Barriers, RPCC, and the interrupt flag.
pub mod misc_ops;


/// Shifts and byte manipulation.
pub mod shift_bytes;
