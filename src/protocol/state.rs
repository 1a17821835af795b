//! Connection lifecycle state.
//!
//! ```text
//! Connecting ──► Open ──► Closed
//!      │           │         ▲
//!      └──► Errored ◄┘───────┘
//! ```
//!
//! `Errored` and `Closed` are both terminal. A close notification after an
//! error is still accepted so that it can be logged.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use super::event::ConnectionEvent;

// ============================================================================
// ConnectionState
// ============================================================================

/// Lifecycle state of one connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// Handshake in progress.
    #[default]
    Connecting,
    /// Handshake completed; frames flow.
    Open,
    /// The transport reported a failure.
    Errored,
    /// The connection is closed.
    Closed,
}

impl ConnectionState {
    /// Returns `true` once no further data can flow.
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Errored | Self::Closed)
    }

    /// Returns the state reached by applying `event`, or `None` if the
    /// event is not valid here.
    #[must_use]
    pub fn apply(self, event: &ConnectionEvent) -> Option<Self> {
        match (self, event) {
            (Self::Connecting, ConnectionEvent::Opened(_)) => Some(Self::Open),
            (Self::Connecting | Self::Open, ConnectionEvent::Errored(_)) => Some(Self::Errored),
            (Self::Open, ConnectionEvent::MessageReceived(_)) => Some(Self::Open),
            (Self::Connecting | Self::Open | Self::Errored, ConnectionEvent::Closed(_)) => {
                Some(Self::Closed)
            }
            _ => None,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Errored => "errored",
            Self::Closed => "closed",
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
