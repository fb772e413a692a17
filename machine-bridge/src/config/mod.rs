//! Configuration and dependency wiring for the bridge.

mod dependencies;

pub use dependencies::Dependencies;
