//! Connection lifecycle types.
//!
//! The transport reports what happens to the connection as
//! [`ConnectionEvent`]s; [`ConnectionState`] tracks which of them are
//! still valid.
//!
//! # Wire Contract
//!
//! | Direction | Frame | When |
//! |-----------|-------|------|
//! | Client → Controller | text [`GREETING`] | once, right after the handshake |
//! | Controller → Client | any text/binary | logged, never answered |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `event` | Event enum and descriptors |
//! | `state` | Lifecycle state machine |

// ============================================================================
// Submodules
// ============================================================================

/// Lifecycle event types.
pub mod event;

/// Lifecycle state machine.
pub mod state;

// ============================================================================
// Constants
// ============================================================================

/// Controller endpoint the agent connects to by default.
pub const DEFAULT_ENDPOINT: &str = "ws://127.0.0.1:5776/**lightrain_controller**/";

/// Text sent once after the connection opens.
pub const GREETING: &str = "Hello Client";

// ============================================================================
// Re-exports
// ============================================================================

pub use event::{
    ABNORMAL_CLOSURE, CloseDescriptor, ConnectionEvent, FailureStage, OpenDescriptor, Payload,
    TransportError,
};
pub use state::ConnectionState;
