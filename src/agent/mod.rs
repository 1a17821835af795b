//! Connection agent.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ConnectionAgent`] | Opens connections to the controller |
//! | [`AgentBuilder`] | Fluent configuration builder |
//! | [`AgentHandle`] | Observes one opened connection |

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder pattern for agent configuration.
pub mod builder;

/// Agent and handle implementation.
pub mod core;

/// Per-connection event handlers.
pub(crate) mod lifecycle;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::AgentBuilder;
pub use core::{AgentHandle, ConnectionAgent};
