//! Diagnostic sinks for lifecycle records.
//!
//! Every lifecycle event handled by the agent produces exactly one
//! [`DiagnosticRecord`]. Where it goes is decided by the configured
//! [`DiagnosticSink`]:
//!
//! | Sink | Destination |
//! |------|-------------|
//! | [`TracingSink`] | `tracing` events (`info!` / `error!`), the default |
//! | [`MemorySink`] | in-memory buffer |
//! | [`JsonLinesSink`] | one JSON object per line on any writer |
//!
//! Sinks are called from the connection task, one record at a time.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::Result;
use crate::identifiers::ConnectionId;
use crate::protocol::ConnectionEvent;

// ============================================================================
// Severity
// ============================================================================

/// Severity of a diagnostic record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Expected lifecycle activity.
    Info,
    /// Transport failure.
    Error,
}

// ============================================================================
// RecordKind
// ============================================================================

/// Which lifecycle event a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// Connection opened.
    Open,
    /// Transport error.
    Error,
    /// Inbound message.
    Message,
    /// Connection closed.
    Close,
}

impl RecordKind {
    /// Returns the severity records of this kind are logged at.
    #[inline]
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::Error => Severity::Error,
            Self::Open | Self::Message | Self::Close => Severity::Info,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Open => "open",
            Self::Error => "error",
            Self::Message => "message",
            Self::Close => "close",
        })
    }
}

// ============================================================================
// DiagnosticRecord
// ============================================================================

/// One lifecycle log entry.
///
/// # Format
///
/// ```json
/// {
///   "connection_id": "0d7c…",
///   "severity": "info",
///   "kind": "message",
///   "description": "status:ready"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticRecord {
    /// Connection the record belongs to.
    pub connection_id: ConnectionId,
    /// Record severity.
    pub severity: Severity,
    /// Lifecycle event kind.
    pub kind: RecordKind,
    /// Human-readable event description. Inbound payloads appear verbatim.
    pub description: String,
}

impl DiagnosticRecord {
    /// Builds the record for `event` on connection `connection_id`.
    #[must_use]
    pub fn from_event(connection_id: ConnectionId, event: &ConnectionEvent) -> Self {
        let kind = match event {
            ConnectionEvent::Opened(_) => RecordKind::Open,
            ConnectionEvent::Errored(_) => RecordKind::Error,
            ConnectionEvent::MessageReceived(_) => RecordKind::Message,
            ConnectionEvent::Closed(_) => RecordKind::Close,
        };

        Self {
            connection_id,
            severity: kind.severity(),
            kind,
            description: event.to_string(),
        }
    }
}

impl fmt::Display for DiagnosticRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.description)
    }
}

// ============================================================================
// DiagnosticSink
// ============================================================================

/// Destination for lifecycle records.
///
/// Implementations must not fail the caller: problems writing a record are
/// the sink's own business.
pub trait DiagnosticSink: Send + Sync {
    /// Consumes one record.
    fn record(&self, record: &DiagnosticRecord);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Arc<S> {
    fn record(&self, record: &DiagnosticRecord) {
        (**self).record(record);
    }
}

// ============================================================================
// TracingSink
// ============================================================================

/// Forwards records to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, record: &DiagnosticRecord) {
        match record.severity {
            Severity::Info => info!(
                connection_id = %record.connection_id,
                kind = %record.kind,
                "{record}"
            ),
            Severity::Error => error!(
                connection_id = %record.connection_id,
                kind = %record.kind,
                "{record}"
            ),
        }
    }
}

// ============================================================================
// MemorySink
// ============================================================================

/// Keeps records in memory.
///
/// Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<DiagnosticRecord>>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the collected records.
    #[must_use]
    pub fn records(&self) -> Vec<DiagnosticRecord> {
        self.records.lock().clone()
    }

    /// Returns the number of collected records.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Returns `true` if nothing was recorded.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&self, record: &DiagnosticRecord) {
        self.records.lock().push(record.clone());
    }
}

// ============================================================================
// JsonLinesSink
// ============================================================================

/// Writes each record as a single JSON line.
pub struct JsonLinesSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    /// Creates a sink writing to `writer`.
    #[inline]
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Returns the writer, consuming the sink.
    #[inline]
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn write_record(&self, record: &DiagnosticRecord) -> Result<()> {
        let line = serde_json::to_string(record)?;
        let mut writer = self.writer.lock();
        writeln!(writer, "{line}")?;
        writer.flush()?;
        Ok(())
    }
}

impl<W: Write + Send> DiagnosticSink for JsonLinesSink<W> {
    fn record(&self, record: &DiagnosticRecord) {
        if let Err(e) = self.write_record(record) {
            warn!(error = %e, kind = %record.kind, "Failed to write diagnostic record");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::protocol::{CloseDescriptor, Payload, TransportError};

    #[test]
    fn test_record_from_message_event() {
        let id = ConnectionId::generate();
        let event = ConnectionEvent::MessageReceived(Payload::Text("status:ready".into()));
        let record = DiagnosticRecord::from_event(id, &event);

        assert_eq!(record.kind, RecordKind::Message);
        assert_eq!(record.severity, Severity::Info);
        assert_eq!(record.description, "status:ready");
        assert_eq!(record.to_string(), "message: status:ready");
    }

    #[test]
    fn test_error_record_severity() {
        let id = ConnectionId::generate();
        let event = ConnectionEvent::Errored(TransportError::handshake("refused"));
        let record = DiagnosticRecord::from_event(id, &event);

        assert_eq!(record.severity, Severity::Error);
        assert_eq!(record.to_string(), "error: handshake failed: refused");
    }

    #[test]
    fn test_memory_sink_shared_between_clones() {
        let sink = MemorySink::new();
        let clone = sink.clone();
        let record = DiagnosticRecord::from_event(
            ConnectionId::generate(),
            &ConnectionEvent::Closed(CloseDescriptor::abnormal()),
        );

        clone.record(&record);

        assert_eq!(sink.len(), 1);
        assert_eq!(sink.records()[0], record);
    }

    #[test]
    fn test_json_lines_sink() {
        let sink = JsonLinesSink::new(Vec::new());
        let id = ConnectionId::generate();
        sink.record(&DiagnosticRecord::from_event(
            id,
            &ConnectionEvent::MessageReceived(Payload::Text("a".into())),
        ));
        sink.record(&DiagnosticRecord::from_event(
            id,
            &ConnectionEvent::Errored(TransportError::session("reset")),
        ));

        let output = String::from_utf8(sink.into_inner()).expect("utf8");
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).expect("json");
        assert_eq!(first["kind"], "message");
        assert_eq!(first["severity"], "info");
        assert_eq!(first["description"], "a");
        assert_eq!(first["connection_id"], id.to_string());

        let second: serde_json::Value = serde_json::from_str(lines[1]).expect("json");
        assert_eq!(second["severity"], "error");
    }

    #[test]
    fn test_tracing_sink_does_not_panic_without_subscriber() {
        TracingSink.record(&DiagnosticRecord::from_event(
            ConnectionId::generate(),
            &ConnectionEvent::Closed(CloseDescriptor::abnormal()),
        ));
    }
}
