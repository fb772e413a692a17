//! # Machine Bridge Shared
//!
//! Shared types and data structures for the machine production bridge.
//!
//! This crate holds the value types that cross component boundaries:
//! the feedback record published after each indexing attempt, the receipt
//! returned by the index writer, and the process-wide connection state.

pub mod feedback;
pub mod receipt;
pub mod state;

pub use feedback::{FeedbackRecord, FeedbackStatus};
pub use receipt::IndexReceipt;
pub use state::BridgeState;
