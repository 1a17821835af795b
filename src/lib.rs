//! lightrain client - single-connection WebSocket agent.
//!
//! Connects to the lightrain controller, greets it once the connection is
//! open, and logs every lifecycle event. Nothing else: inbound messages are
//! logged and never answered, and a failed or closed connection is never
//! retried.
//!
//! # Architecture
//!
//! - **Agent**: [`ConnectionAgent::open`] spawns one event loop per call
//! - **Transport**: the event loop owns the WebSocket stream and turns
//!   frames into [`ConnectionEvent`]s
//! - **Lifecycle**: events are handled one at a time; each produces one
//!   [`DiagnosticRecord`] for the configured [`DiagnosticSink`]
//!
//! # Quick Start
//!
//! ```no_run
//! use lightrain_client::{ConnectionAgent, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let agent = ConnectionAgent::new()?;
//!     let handle = agent.open()?;
//!
//!     let final_state = handle.wait().await?;
//!     println!("Connection ended: {final_state}");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`agent`] | [`ConnectionAgent`], [`AgentBuilder`], [`AgentHandle`] |
//! | [`diagnostics`] | Record type and sinks |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | [`ConnectionId`] |
//! | [`protocol`] | Events, state machine, endpoint and greeting |
//! | `transport` | WebSocket event loop (internal) |

// ============================================================================
// Modules
// ============================================================================

/// Connection agent and handle.
pub mod agent;

/// Lifecycle records and where they go.
pub mod diagnostics;

/// Error types and result aliases.
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// Lifecycle events and states.
pub mod protocol;

/// WebSocket transport layer.
mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Agent types
pub use agent::{AgentBuilder, AgentHandle, ConnectionAgent};

// Diagnostic types
pub use diagnostics::{
    DiagnosticRecord, DiagnosticSink, JsonLinesSink, MemorySink, RecordKind, Severity, TracingSink,
};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::ConnectionId;

// Protocol types
pub use protocol::{
    CloseDescriptor, ConnectionEvent, ConnectionState, DEFAULT_ENDPOINT, FailureStage, GREETING,
    OpenDescriptor, Payload, TransportError,
};
