//! Session state machine for the broker connection.

use std::fmt;

/// States of the broker session.
///
/// `Disconnected → Connecting → Connected`, back to `Connecting` on an
/// unexpected drop. `Closed` is terminal and reachable from any state via
/// an explicit stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session and none being established.
    Disconnected,
    /// A session handshake is in progress or pending retry.
    Connecting,
    /// The session is established and subscribed.
    Connected,
    /// The session was stopped explicitly. Terminal.
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Connecting => "connecting",
            SessionState::Connected => "connected",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names() {
        assert_eq!(SessionState::Disconnected.to_string(), "disconnected");
        assert_eq!(SessionState::Connecting.to_string(), "connecting");
        assert_eq!(SessionState::Connected.to_string(), "connected");
        assert_eq!(SessionState::Closed.to_string(), "closed");
    }
}
