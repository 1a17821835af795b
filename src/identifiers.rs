//! Type-safe identifiers.
//!
//! Each call to [`ConnectionAgent::open`](crate::ConnectionAgent::open)
//! gets its own [`ConnectionId`], which is attached to every diagnostic
//! record and tracing event produced for that connection.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

// ============================================================================
// ConnectionId
// ============================================================================

/// Identifier of one opened connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Generates a new random identifier.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[inline]
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_unique() {
        assert_ne!(ConnectionId::generate(), ConnectionId::generate());
    }

    #[test]
    fn test_display_matches_uuid() {
        let id = ConnectionId::generate();
        assert_eq!(id.to_string(), id.as_uuid().to_string());
    }

    #[test]
    fn test_serialize_transparent() {
        let id = ConnectionId::generate();
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, format!("\"{id}\""));
    }
}
