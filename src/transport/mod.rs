//! WebSocket transport layer.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐                              ┌──────────────────┐
//! │  lightrain       │         WebSocket            │  lightrain       │
//! │  client (Rust)   │─────────────────────────────►│  controller      │
//! │                  │  127.0.0.1:5776              │                  │
//! │  EventLoop       │  /**lightrain_controller**/  │                  │
//! └──────────────────┘                              └──────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `ConnectionAgent::open` - spawn the event loop
//! 2. `EventLoop::run` - handshake, then `Opened` and the greeting
//! 3. Inbound frames - `MessageReceived`
//! 4. Close frame, stream end or failure - `Closed` (after `Errored`)
//!
//! Internal module; the public surface is [`crate::agent`].

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket connection and event loop.
pub(crate) mod connection;

// ============================================================================
// Re-exports
// ============================================================================

pub(crate) use connection::EventLoop;
