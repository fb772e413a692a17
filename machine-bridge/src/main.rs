//! Entry point for the machine production bridge.
//!
//! Wires dependencies, starts the supervised MQTT session, waits for a
//! termination signal, and performs orderly shutdown.

use std::sync::Arc;
use std::time::Duration;

use dotenv::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use machine_bridge::{BridgeError, Dependencies};
use machine_bridge_shared::BridgeState;

/// Granularity of the termination wait loop.
const TERMINATION_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        error!(error = %e, "Bridge terminated with error");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), BridgeError> {
    let Dependencies {
        supervisor,
        handle,
        state,
    } = Dependencies::new().await?;

    spawn_signal_listeners(state.clone());

    let mut run_task = tokio::spawn(supervisor.run());

    tokio::select! {
        result = &mut run_task => {
            // The supervisor ended on its own: either a fatal initial
            // connection failure or a termination observed inside the loop.
            match result {
                Ok(run_result) => run_result?,
                Err(e) => return Err(BridgeError::task(format!("Supervisor task failed: {}", e))),
            }
        }
        _ = wait_for_termination(state.clone()) => {
            info!("Termination requested, shutting down");
            handle.stop().await;
            match run_task.await {
                Ok(run_result) => run_result?,
                Err(e) => error!(error = %e, "Supervisor task failed during shutdown"),
            }
        }
    }

    info!("Bridge shut down cleanly");
    Ok(())
}

/// Coarse poll on the shared termination flag.
async fn wait_for_termination(state: Arc<BridgeState>) {
    while !state.is_terminating() {
        tokio::time::sleep(TERMINATION_POLL_INTERVAL).await;
    }
}

/// Install listeners for the interrupt and terminate signals.
///
/// Each listener flips the shared termination flag; shutdown itself is
/// cooperative and happens in `run`.
fn spawn_signal_listeners(state: Arc<BridgeState>) {
    let interrupt_state = state.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received interrupt signal");
            interrupt_state.begin_termination();
        }
    });

    #[cfg(unix)]
    tokio::spawn(async move {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                if terminate.recv().await.is_some() {
                    info!("Received terminate signal");
                    state.begin_termination();
                }
            }
            Err(e) => error!(error = %e, "Failed to install terminate signal handler"),
        }
    });

    #[cfg(not(unix))]
    drop(state);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_termination_observes_flag() {
        let state = Arc::new(BridgeState::new());
        let waiter = tokio::spawn(wait_for_termination(state.clone()));

        state.begin_termination();
        tokio::time::advance(Duration::from_secs(2)).await;

        waiter.await.unwrap();
    }
}
