//! Builder pattern for agent configuration.
//!
//! # Example
//!
//! ```no_run
//! use lightrain_client::{ConnectionAgent, MemorySink};
//!
//! # fn example() -> lightrain_client::Result<()> {
//! let sink = MemorySink::new();
//! let agent = ConnectionAgent::builder()
//!     .endpoint("ws://127.0.0.1:5776/**lightrain_controller**/")
//!     .sink(sink.clone())
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use url::Url;

use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::error::{Error, Result};
use crate::protocol::DEFAULT_ENDPOINT;

use super::core::ConnectionAgent;

// ============================================================================
// AgentBuilder
// ============================================================================

/// Builder for configuring a [`ConnectionAgent`].
///
/// Use [`ConnectionAgent::builder()`] to create a new builder.
#[derive(Default, Clone)]
pub struct AgentBuilder {
    /// Endpoint URL, validated at build time.
    endpoint: Option<String>,
    /// Destination for lifecycle records.
    sink: Option<Arc<dyn DiagnosticSink>>,
}

impl fmt::Debug for AgentBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentBuilder")
            .field("endpoint", &self.endpoint)
            .field("custom_sink", &self.sink.is_some())
            .finish()
    }
}

// ============================================================================
// AgentBuilder Implementation
// ============================================================================

impl AgentBuilder {
    /// Creates a builder with default settings.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the controller endpoint.
    ///
    /// Defaults to [`DEFAULT_ENDPOINT`].
    #[inline]
    #[must_use]
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = Some(url.into());
        self
    }

    /// Sets where lifecycle records are written.
    ///
    /// Defaults to [`TracingSink`].
    #[inline]
    #[must_use]
    pub fn sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Builds the agent with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidEndpoint`] if the endpoint is not a URL
    /// - [`Error::Config`] if the endpoint is not a `ws://` URL with a host
    pub fn build(self) -> Result<ConnectionAgent> {
        let endpoint = self.validate_endpoint()?;
        let sink: Arc<dyn DiagnosticSink> = match self.sink {
            Some(sink) => sink,
            None => Arc::new(TracingSink),
        };

        Ok(ConnectionAgent::from_parts(endpoint, sink))
    }
}

// ============================================================================
// Validation
// ============================================================================

impl AgentBuilder {
    /// Validates the endpoint configuration.
    fn validate_endpoint(&self) -> Result<Url> {
        let raw = self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT);
        let endpoint = Url::parse(raw)?;

        if endpoint.scheme() != "ws" {
            return Err(Error::config(format!(
                "Unsupported endpoint scheme '{}': only ws:// is supported",
                endpoint.scheme()
            )));
        }

        if endpoint.host_str().is_none_or(str::is_empty) {
            return Err(Error::config(format!("Endpoint has no host: {raw}")));
        }

        Ok(endpoint)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoint() {
        let agent = AgentBuilder::new().build().expect("default config is valid");
        let endpoint = agent.endpoint();

        assert_eq!(endpoint.as_str(), DEFAULT_ENDPOINT);
        assert_eq!(endpoint.scheme(), "ws");
        assert_eq!(endpoint.host_str(), Some("127.0.0.1"));
        assert_eq!(endpoint.port(), Some(5776));
        assert_eq!(endpoint.path(), "/**lightrain_controller**/");
    }

    #[test]
    fn test_custom_endpoint() {
        let agent = AgentBuilder::new()
            .endpoint("ws://localhost:9000/ctl")
            .build()
            .expect("valid endpoint");
        assert_eq!(agent.endpoint().port(), Some(9000));
    }

    #[test]
    fn test_rejects_non_ws_scheme() {
        let err = AgentBuilder::new()
            .endpoint("http://127.0.0.1:5776/")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_rejects_wss() {
        let err = AgentBuilder::new()
            .endpoint("wss://127.0.0.1:5776/")
            .build()
            .unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_rejects_garbage() {
        let err = AgentBuilder::new().endpoint("::::").build().unwrap_err();
        assert!(matches!(err, Error::InvalidEndpoint(_)));
    }

    #[test]
    fn test_debug_hides_sink() {
        let builder = AgentBuilder::new().sink(TracingSink);
        let debug = format!("{builder:?}");
        assert!(debug.contains("custom_sink: true"));
    }
}
