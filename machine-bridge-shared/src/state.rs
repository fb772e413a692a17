//! Process-wide connection state shared between the supervisor and the
//! lifecycle controller.

use std::sync::atomic::{AtomicBool, Ordering};

/// Shared connection state for the bridge process.
///
/// `terminating` is written by the signal-handling path and read by both the
/// reconnect loop and the main wait loop. Once set it never reverts.
/// `connected` may toggle repeatedly as the broker session drops and
/// recovers.
#[derive(Debug, Default)]
pub struct BridgeState {
    connected: AtomicBool,
    terminating: AtomicBool,
}

impl BridgeState {
    /// Create a new state: disconnected, not terminating.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the broker session is currently established.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Record a change in broker session state.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Whether shutdown has been requested.
    pub fn is_terminating(&self) -> bool {
        self.terminating.load(Ordering::SeqCst)
    }

    /// Request shutdown. One-way: there is no method to clear the flag.
    pub fn begin_termination(&self) {
        self.terminating.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = BridgeState::new();
        assert!(!state.is_connected());
        assert!(!state.is_terminating());
    }

    #[test]
    fn test_connected_toggles() {
        let state = BridgeState::new();
        state.set_connected(true);
        assert!(state.is_connected());
        state.set_connected(false);
        assert!(!state.is_connected());
    }

    #[test]
    fn test_termination_is_one_way() {
        let state = BridgeState::new();
        state.begin_termination();
        assert!(state.is_terminating());

        // Repeated requests and connection changes must not clear the flag.
        state.begin_termination();
        state.set_connected(true);
        state.set_connected(false);
        assert!(state.is_terminating());
    }
}
