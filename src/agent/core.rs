//! Connection agent and its observation handle.
//!
//! [`ConnectionAgent::open`] spawns one tokio task per call. The task owns
//! the WebSocket stream for its whole life and runs until the transport
//! reports closure or an error. The returned [`AgentHandle`] can watch the
//! connection but cannot drive it.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;
use url::Url;

use crate::diagnostics::DiagnosticSink;
use crate::error::{Error, Result};
use crate::identifiers::ConnectionId;
use crate::protocol::ConnectionState;
use crate::transport::EventLoop;

use super::builder::AgentBuilder;
use super::lifecycle::Lifecycle;

// ============================================================================
// ConnectionAgent
// ============================================================================

/// Client for the lightrain controller.
///
/// Connects, sends the greeting once the connection is open, and logs
/// every lifecycle event to its diagnostic sink. It never retries.
///
/// # Example
///
/// ```no_run
/// use lightrain_client::ConnectionAgent;
///
/// # async fn example() -> lightrain_client::Result<()> {
/// let agent = ConnectionAgent::new()?;
/// let handle = agent.open()?;
/// let final_state = handle.wait().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ConnectionAgent {
    /// Controller endpoint.
    endpoint: Url,
    /// Destination for lifecycle records.
    sink: Arc<dyn DiagnosticSink>,
}

impl fmt::Debug for ConnectionAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionAgent")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl ConnectionAgent {
    /// Creates an agent for the default endpoint, logging through `tracing`.
    ///
    /// # Errors
    ///
    /// Same as [`AgentBuilder::build`].
    pub fn new() -> Result<Self> {
        AgentBuilder::new().build()
    }

    /// Creates a configuration builder for the agent.
    #[inline]
    #[must_use]
    pub fn builder() -> AgentBuilder {
        AgentBuilder::new()
    }

    /// Assembles an agent from validated parts.
    pub(crate) fn from_parts(endpoint: Url, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { endpoint, sink }
    }

    /// Returns the endpoint connections are opened to.
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Starts connecting and returns immediately.
    ///
    /// Each call creates exactly one new connection; earlier connections
    /// are left alone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Runtime`] when called outside a tokio runtime.
    /// Connection failures are not errors here: they are logged.
    pub fn open(&self) -> Result<AgentHandle> {
        let runtime = Handle::try_current()
            .map_err(|e| Error::runtime(format!("open() requires a tokio runtime: {e}")))?;

        let id = ConnectionId::generate();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);
        let lifecycle = Lifecycle::new(id, Arc::clone(&self.sink));
        let event_loop = EventLoop::new(self.endpoint.clone(), lifecycle, state_tx);

        let task = runtime.spawn(event_loop.run());

        debug!(connection_id = %id, endpoint = %self.endpoint, "Connection opening");

        Ok(AgentHandle {
            id,
            state_rx,
            task,
        })
    }
}

// ============================================================================
// AgentHandle
// ============================================================================

/// Read-only view of one opened connection.
///
/// Dropping the handle does not stop the connection.
#[derive(Debug)]
pub struct AgentHandle {
    /// Connection ID.
    id: ConnectionId,
    /// Published lifecycle state.
    state_rx: watch::Receiver<ConnectionState>,
    /// Event loop task, yielding the final state.
    task: JoinHandle<ConnectionState>,
}

impl AgentHandle {
    /// Returns the connection ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns the most recently published state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Returns `true` once the connection task has ended.
    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the next state change and returns the new state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the connection task has ended
    /// and no further change will come.
    pub async fn changed(&mut self) -> Result<ConnectionState> {
        self.state_rx
            .changed()
            .await
            .map_err(|_| Error::ConnectionClosed)?;
        Ok(*self.state_rx.borrow_and_update())
    }

    /// Waits for the connection to end and returns its final state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Runtime`] if the connection task panicked or was
    /// cancelled by runtime shutdown.
    pub async fn wait(self) -> Result<ConnectionState> {
        self.task
            .await
            .map_err(|e| Error::runtime(format!("Connection task failed: {e}")))
    }
}

// ============================================================================
// Tests
// ============================================================================
