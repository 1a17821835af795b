//! lightrain client binary.
//!
//! Opens one connection to the controller at
//! `ws://127.0.0.1:5776/**lightrain_controller**/` and logs its lifecycle
//! until the connection ends or Ctrl+C is pressed.
//!
//! Usage:
//!   cargo run --bin lightrain-client

// ============================================================================
// Imports
// ============================================================================

use lightrain_client::{ConnectionAgent, Result};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    init_logging();

    if let Err(e) = run().await {
        eprintln!("[ERROR] {e}");
    }
}

async fn run() -> Result<()> {
    let agent = ConnectionAgent::new()?;
    let handle = agent.open()?;
    let id = handle.id();

    tokio::select! {
        final_state = handle.wait() => {
            let final_state = final_state?;
            debug!(connection_id = %id, state = %final_state, "Connection ended");
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!(connection_id = %id, "Interrupted");
        }
    }

    Ok(())
}

// ============================================================================
// Logging
// ============================================================================

/// Initializes tracing with a fixed filter.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("lightrain_client=info"))
        .with_target(false)
        .init();
}
