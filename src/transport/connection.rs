//! WebSocket connection and event loop.
//!
//! # Event Loop
//!
//! The loop runs in its own tokio task and owns the stream. It:
//!
//! - Performs the client handshake
//! - Translates frames and failures into [`ConnectionEvent`]s
//! - Hands each event to the lifecycle dispatcher, in arrival order
//! - Sends whatever reply the dispatcher asks for
//! - Publishes every state change to the agent handle
//!
//! A failure is always followed by an abnormal close notification, so the
//! dispatcher sees `Errored` and then `Closed`.

// ============================================================================
// Imports
// ============================================================================

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::{Message, Result as WsResult};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace};
use url::Url;

use crate::agent::lifecycle::Lifecycle;
use crate::protocol::{
    CloseDescriptor, ConnectionEvent, ConnectionState, OpenDescriptor, Payload, TransportError,
};

// ============================================================================
// Types
// ============================================================================

/// Client-side WebSocket stream.
type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Write half of the client stream.
type WsWriter = SplitSink<WsStream, Message>;

// ============================================================================
// EventLoop
// ============================================================================

/// Drives one connection from handshake to termination.
pub(crate) struct EventLoop {
    /// Controller endpoint.
    endpoint: Url,
    /// Event handlers and state.
    lifecycle: Lifecycle,
    /// Publishes state to the agent handle.
    state_tx: watch::Sender<ConnectionState>,
}

impl EventLoop {
    /// Creates an event loop that has not connected yet.
    pub(crate) fn new(
        endpoint: Url,
        lifecycle: Lifecycle,
        state_tx: watch::Sender<ConnectionState>,
    ) -> Self {
        Self {
            endpoint,
            lifecycle,
            state_tx,
        }
    }

    /// Connects and processes events until the connection terminates.
    ///
    /// Returns the final state.
    pub(crate) async fn run(mut self) -> ConnectionState {
        let (ws_stream, status) = match connect(&self.endpoint).await {
            Ok(connected) => connected,
            Err(e) => {
                self.fail(TransportError::handshake(&e));
                return self.lifecycle.state();
            }
        };

        debug!(
            connection_id = %self.lifecycle.id(),
            endpoint = %self.endpoint,
            status,
            "WebSocket connection established"
        );

        let (mut ws_write, mut ws_read) = ws_stream.split();

        let opened = ConnectionEvent::Opened(OpenDescriptor {
            endpoint: self.endpoint.to_string(),
            status,
        });
        self.deliver(opened, &mut ws_write).await;

        loop {
            match self.lifecycle.state() {
                ConnectionState::Closed => break,
                // Reply failed; the session is unusable.
                ConnectionState::Errored => {
                    self.notify(ConnectionEvent::Closed(CloseDescriptor::abnormal()));
                    break;
                }
                ConnectionState::Connecting | ConnectionState::Open => {}
            }

            match ws_read.next().await {
                Some(Ok(Message::Text(text))) => {
                    let payload = Payload::Text(text.as_str().to_owned());
                    self.deliver(ConnectionEvent::MessageReceived(payload), &mut ws_write)
                        .await;
                }

                Some(Ok(Message::Binary(bytes))) => {
                    let payload = Payload::Binary(bytes.to_vec());
                    self.deliver(ConnectionEvent::MessageReceived(payload), &mut ws_write)
                        .await;
                }

                Some(Ok(Message::Close(frame))) => {
                    let close = CloseDescriptor::from_frame(frame.as_ref());
                    self.deliver(ConnectionEvent::Closed(close), &mut ws_write)
                        .await;
                }

                Some(Err(e)) => {
                    self.fail(TransportError::session(&e));
                    break;
                }

                // The stream ends without an error only when the transport
                // already considers the connection closed. A peer that drops
                // TCP shows up as an error above.
                None => {
                    debug!(connection_id = %self.lifecycle.id(), "WebSocket stream ended");
                    self.notify(ConnectionEvent::Closed(CloseDescriptor::abnormal()));
                    break;
                }

                // Ping, Pong, raw frames
                Some(Ok(_)) => {}
            }
        }

        // Completes the closing handshake the transport has queued.
        if let Err(e) = ws_write.close().await {
            debug!(
                connection_id = %self.lifecycle.id(),
                error = %e,
                "WebSocket close after termination failed"
            );
        }

        debug!(
            connection_id = %self.lifecycle.id(),
            state = %self.lifecycle.state(),
            "Event loop terminated"
        );

        self.lifecycle.state()
    }

    /// Dispatches an event and sends the reply it produces, if any.
    async fn deliver(&mut self, event: ConnectionEvent, ws_write: &mut WsWriter) {
        let Some(reply) = self.notify(event) else {
            return;
        };

        match ws_write.send(reply).await {
            Ok(()) => trace!(connection_id = %self.lifecycle.id(), "Reply sent"),
            Err(e) => {
                self.notify(ConnectionEvent::Errored(TransportError::session(&e)));
            }
        }
    }

    /// Dispatches an event whose reply, if any, cannot be sent.
    fn notify(&mut self, event: ConnectionEvent) -> Option<Message> {
        let reply = self.lifecycle.dispatch(event);
        self.state_tx.send_replace(self.lifecycle.state());
        reply
    }

    /// Reports a terminal failure followed by an abnormal close.
    fn fail(&mut self, error: TransportError) {
        self.notify(ConnectionEvent::Errored(error));
        self.notify(ConnectionEvent::Closed(CloseDescriptor::abnormal()));
    }
}

// ============================================================================
// Handshake
// ============================================================================

/// Performs the client handshake.
///
/// Returns the stream and the HTTP status of the upgrade response.
async fn connect(endpoint: &Url) -> WsResult<(WsStream, u16)> {
    trace!(%endpoint, "Connecting");

    let (ws_stream, response) = tokio_tungstenite::connect_async(endpoint.as_str()).await?;

    Ok((ws_stream, response.status().as_u16()))
}

// ============================================================================
// Tests
// ============================================================================
