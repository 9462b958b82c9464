//! Adapters for the application ports that need no I/O.

mod system_clock;

pub use system_clock::SystemClock;
