//! Lifecycle event types.
//!
//! Every transport notification is translated into a [`ConnectionEvent`]
//! before it reaches the lifecycle dispatcher. The transport delivers
//! events one at a time from a single task.
//!
//! # Event Types
//!
//! | Event | Trigger | Record |
//! |-------|---------|--------|
//! | `Opened` | handshake completed | info |
//! | `Errored` | transport failure | error |
//! | `MessageReceived` | text or binary frame | info |
//! | `Closed` | close frame, stream end, or failure | info |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use tokio_tungstenite::tungstenite::protocol::CloseFrame;

// ============================================================================
// Constants
// ============================================================================

/// Close code reported when the connection ended without a close frame.
pub const ABNORMAL_CLOSURE: u16 = 1006;

// ============================================================================
// ConnectionEvent
// ============================================================================

/// A transition of the connection lifecycle as reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// The WebSocket handshake completed.
    Opened(OpenDescriptor),

    /// The transport failed.
    Errored(TransportError),

    /// A data frame arrived.
    MessageReceived(Payload),

    /// The connection is closed.
    Closed(CloseDescriptor),
}

impl ConnectionEvent {
    /// Returns the short lowercase name of the event kind.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Opened(_) => "open",
            Self::Errored(_) => "error",
            Self::MessageReceived(_) => "message",
            Self::Closed(_) => "close",
        }
    }
}

impl fmt::Display for ConnectionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Opened(open) => fmt::Display::fmt(open, f),
            Self::Errored(error) => fmt::Display::fmt(error, f),
            Self::MessageReceived(payload) => fmt::Display::fmt(payload, f),
            Self::Closed(close) => fmt::Display::fmt(close, f),
        }
    }
}

// ============================================================================
// OpenDescriptor
// ============================================================================

/// Details of a completed handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenDescriptor {
    /// Endpoint the connection was opened to.
    pub endpoint: String,
    /// HTTP status of the upgrade response (101 on success).
    pub status: u16,
}

impl fmt::Display for OpenDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "connected to {} (HTTP {})", self.endpoint, self.status)
    }
}

// ============================================================================
// TransportError
// ============================================================================

/// Where a transport failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// Before the connection was open (refused, rejected upgrade).
    Handshake,
    /// While the connection was open.
    Session,
}

/// A transport-level failure, terminal for the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    /// Stage the failure occurred in.
    pub stage: FailureStage,
    /// Human-readable cause.
    pub description: String,
}

impl TransportError {
    /// Creates a failure of the opening handshake.
    #[inline]
    #[must_use]
    pub fn handshake(cause: impl fmt::Display) -> Self {
        Self {
            stage: FailureStage::Handshake,
            description: cause.to_string(),
        }
    }

    /// Creates a failure of an open session.
    #[inline]
    #[must_use]
    pub fn session(cause: impl fmt::Display) -> Self {
        Self {
            stage: FailureStage::Session,
            description: cause.to_string(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stage {
            FailureStage::Handshake => write!(f, "handshake failed: {}", self.description),
            FailureStage::Session => write!(f, "session failed: {}", self.description),
        }
    }
}

// ============================================================================
// Payload
// ============================================================================

/// Inbound message data, kept exactly as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Text frame.
    Text(String),
    /// Binary frame.
    Binary(Vec<u8>),
}

impl Payload {
    /// Returns the payload length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Text(text) => text.len(),
            Self::Binary(bytes) => bytes.len(),
        }
    }

    /// Returns `true` if the payload is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Binary(bytes) => f.write_str(&String::from_utf8_lossy(bytes)),
        }
    }
}

// ============================================================================
// CloseDescriptor
// ============================================================================

/// Details of a closed connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseDescriptor {
    /// Close status code.
    pub code: u16,
    /// Close reason, possibly empty.
    pub reason: String,
    /// `true` if the closing handshake took place.
    pub was_clean: bool,
}

impl CloseDescriptor {
    /// Creates a descriptor for a connection that ended without a close frame.
    #[inline]
    #[must_use]
    pub fn abnormal() -> Self {
        Self {
            code: ABNORMAL_CLOSURE,
            reason: String::new(),
            was_clean: false,
        }
    }

    /// Creates a descriptor from a received close frame.
    ///
    /// A close frame without a body reports code 1005 (no status).
    #[must_use]
    pub fn from_frame(frame: Option<&CloseFrame>) -> Self {
        match frame {
            Some(frame) => Self {
                code: u16::from(frame.code),
                reason: frame.reason.as_str().to_owned(),
                was_clean: true,
            },
            None => Self {
                code: 1005,
                reason: String::new(),
                was_clean: true,
            },
        }
    }
}

impl fmt::Display for CloseDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code {}", self.code)?;
        if !self.reason.is_empty() {
            write!(f, " ({})", self.reason)?;
        }
        if !self.was_clean {
            f.write_str(", unclean")?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

    #[test]
    fn test_event_names() {
        assert_eq!(
            ConnectionEvent::Errored(TransportError::session("x")).name(),
            "error"
        );
        assert_eq!(
            ConnectionEvent::MessageReceived(Payload::Text("x".into())).name(),
            "message"
        );
        assert_eq!(
            ConnectionEvent::Closed(CloseDescriptor::abnormal()).name(),
            "close"
        );
    }

    #[test]
    fn test_text_payload_displayed_verbatim() {
        let payload = Payload::Text("status:ready".into());
        assert_eq!(payload.to_string(), "status:ready");
        assert_eq!(payload.len(), 12);
    }

    #[test]
    fn test_binary_payload_lossy() {
        let payload = Payload::Binary(vec![b'o', b'k', 0xff]);
        assert_eq!(payload.to_string(), "ok\u{fffd}");
        assert!(!payload.is_empty());
    }

    #[test]
    fn test_transport_error_display() {
        let err = TransportError::handshake("Connection refused");
        assert_eq!(err.stage, FailureStage::Handshake);
        assert_eq!(err.to_string(), "handshake failed: Connection refused");
    }

    #[test]
    fn test_close_from_frame() {
        let frame = CloseFrame {
            code: CloseCode::Normal,
            reason: "bye".into(),
        };
        let close = CloseDescriptor::from_frame(Some(&frame));
        assert_eq!(close.code, 1000);
        assert!(close.was_clean);
        assert_eq!(close.to_string(), "code 1000 (bye)");
    }

    #[test]
    fn test_close_without_frame() {
        let close = CloseDescriptor::from_frame(None);
        assert_eq!(close.code, 1005);
        assert!(close.was_clean);
    }

    #[test]
    fn test_abnormal_close() {
        let close = CloseDescriptor::abnormal();
        assert_eq!(close.code, ABNORMAL_CLOSURE);
        assert_eq!(close.to_string(), "code 1006, unclean");
    }

    #[test]
    fn test_open_display() {
        let open = OpenDescriptor {
            endpoint: "ws://127.0.0.1:5776/**lightrain_controller**/".into(),
            status: 101,
        };
        assert_eq!(
            open.to_string(),
            "connected to ws://127.0.0.1:5776/**lightrain_controller**/ (HTTP 101)"
        );
    }
}
