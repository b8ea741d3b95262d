//! Machine-level unit tests.


/// Threaded run loop, pause, observer.
pub mod machine;
