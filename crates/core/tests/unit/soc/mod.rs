//! System component unit tests.

/// Bus mapping, overlap refusal, and access routing.
pub mod bus;


/// Physical memory bounds and byte access.
pub mod phys;
