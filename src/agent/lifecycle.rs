//! Lifecycle dispatcher.
//!
//! Consumes [`ConnectionEvent`]s one at a time, keeps the connection state,
//! writes one diagnostic record per accepted event and tells the transport
//! what to send back. The only reply ever produced is the greeting after
//! `Opened`, and it is returned after the open record has been written.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use tokio_tungstenite::tungstenite::Message;
use tracing::{trace, warn};

use crate::diagnostics::{DiagnosticRecord, DiagnosticSink};
use crate::identifiers::ConnectionId;
use crate::protocol::{ConnectionEvent, ConnectionState, GREETING};

// ============================================================================
// Lifecycle
// ============================================================================

/// State and handlers of a single connection.
pub(crate) struct Lifecycle {
    /// Connection the events belong to.
    id: ConnectionId,
    /// Current lifecycle state.
    state: ConnectionState,
    /// Destination for lifecycle records.
    sink: Arc<dyn DiagnosticSink>,
}

impl Lifecycle {
    /// Creates a dispatcher in the `Connecting` state.
    pub(crate) fn new(id: ConnectionId, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            id,
            state: ConnectionState::Connecting,
            sink,
        }
    }

    /// Returns the connection ID.
    #[inline]
    pub(crate) fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns the current state.
    #[inline]
    pub(crate) fn state(&self) -> ConnectionState {
        self.state
    }

    /// Handles one event.
    ///
    /// Returns the frame the transport must send in response, if any.
    /// Events that are not valid in the current state are dropped without
    /// a record.
    pub(crate) fn dispatch(&mut self, event: ConnectionEvent) -> Option<Message> {
        let Some(next) = self.state.apply(&event) else {
            warn!(
                connection_id = %self.id,
                state = %self.state,
                event = event.name(),
                "Ignoring event not valid in current state"
            );
            return None;
        };

        self.sink
            .record(&DiagnosticRecord::from_event(self.id, &event));

        trace!(
            connection_id = %self.id,
            from = %self.state,
            to = %next,
            "State transition"
        );
        self.state = next;

        match event {
            ConnectionEvent::Opened(_) => Some(Message::text(GREETING)),
            ConnectionEvent::Errored(_)
            | ConnectionEvent::MessageReceived(_)
            | ConnectionEvent::Closed(_) => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use crate::diagnostics::{MemorySink, RecordKind, Severity};
    use crate::protocol::{CloseDescriptor, OpenDescriptor, Payload, TransportError};

    fn lifecycle() -> (Lifecycle, MemorySink) {
        let sink = MemorySink::new();
        let lifecycle = Lifecycle::new(ConnectionId::generate(), Arc::new(sink.clone()));
        (lifecycle, sink)
    }

    fn opened() -> ConnectionEvent {
        ConnectionEvent::Opened(OpenDescriptor {
            endpoint: "ws://127.0.0.1:5776/**lightrain_controller**/".into(),
            status: 101,
        })
    }

    fn is_greeting(reply: Option<Message>) -> bool {
        matches!(reply, Some(Message::Text(ref text)) if text.as_str() == GREETING)
    }

    #[test]
    fn test_open_logs_then_greets() {
        let (mut lifecycle, sink) = lifecycle();

        let reply = lifecycle.dispatch(opened());

        assert!(is_greeting(reply));
        assert_eq!(lifecycle.state(), ConnectionState::Open);
        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, RecordKind::Open);
        assert_eq!(records[0].severity, Severity::Info);
        assert_eq!(records[0].connection_id, lifecycle.id());
    }

    #[test]
    fn test_greeting_sent_once() {
        let (mut lifecycle, sink) = lifecycle();

        assert!(is_greeting(lifecycle.dispatch(opened())));
        assert!(lifecycle.dispatch(opened()).is_none());
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_message_logged_without_reply() {
        let (mut lifecycle, sink) = lifecycle();
        lifecycle.dispatch(opened());

        let reply = lifecycle.dispatch(ConnectionEvent::MessageReceived(Payload::Text(
            "status:ready".into(),
        )));

        assert!(reply.is_none());
        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].kind, RecordKind::Message);
        assert!(records[1].description.contains("status:ready"));
    }

    #[test]
    fn test_handshake_failure_logged_as_error() {
        let (mut lifecycle, sink) = lifecycle();

        let reply = lifecycle.dispatch(ConnectionEvent::Errored(TransportError::handshake(
            "Connection refused",
        )));

        assert!(reply.is_none());
        assert_eq!(lifecycle.state(), ConnectionState::Errored);
        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].severity, Severity::Error);
        assert!(records[0].description.contains("Connection refused"));
    }

    #[test]
    fn test_close_after_error_still_logged() {
        let (mut lifecycle, sink) = lifecycle();

        lifecycle.dispatch(ConnectionEvent::Errored(TransportError::handshake("refused")));
        lifecycle.dispatch(ConnectionEvent::Closed(CloseDescriptor::abnormal()));

        assert_eq!(lifecycle.state(), ConnectionState::Closed);
        let kinds: Vec<_> = sink.records().iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![RecordKind::Error, RecordKind::Close]);
    }

    #[test]
    fn test_peer_close_ends_lifecycle() {
        let (mut lifecycle, sink) = lifecycle();
        lifecycle.dispatch(opened());

        let reply = lifecycle.dispatch(ConnectionEvent::Closed(CloseDescriptor {
            code: 1000,
            reason: String::new(),
            was_clean: true,
        }));

        assert!(reply.is_none());
        assert_eq!(lifecycle.state(), ConnectionState::Closed);

        // Nothing after close is recorded.
        lifecycle.dispatch(ConnectionEvent::MessageReceived(Payload::Text("late".into())));
        lifecycle.dispatch(ConnectionEvent::Errored(TransportError::session("late")));
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_message_before_open_ignored() {
        let (mut lifecycle, sink) = lifecycle();

        let reply =
            lifecycle.dispatch(ConnectionEvent::MessageReceived(Payload::Binary(vec![1, 2])));

        assert!(reply.is_none());
        assert!(sink.is_empty());
        assert_eq!(lifecycle.state(), ConnectionState::Connecting);
    }

    proptest! {
        #[test]
        fn prop_inbound_text_logged_verbatim(text in ".*") {
            let (mut lifecycle, sink) = lifecycle();
            lifecycle.dispatch(opened());

            let reply = lifecycle.dispatch(ConnectionEvent::MessageReceived(
                Payload::Text(text.clone()),
            ));

            prop_assert!(reply.is_none());
            let records = sink.records();
            prop_assert_eq!(records.len(), 2);
            prop_assert_eq!(records[1].kind, RecordKind::Message);
            prop_assert_eq!(&records[1].description, &text);
        }
    }
}
