//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGHUP, SIGTERM)
//! - Translate signals to `LifecycleEvent`s for the supervisor
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - SIGHUP deregisters and restarts the loop, it does not reload config
//! - No other signals are handled

use tokio::sync::mpsc;

use crate::lifecycle::LifecycleEvent;

/// Install the signal handlers and forward each signal as an event.
#[cfg(unix)]
pub fn spawn_signal_listener() -> std::io::Result<mpsc::Receiver<LifecycleEvent>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let (tx, rx) = mpsc::channel(4);

    tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                Some(()) = hangup.recv() => {
                    tracing::info!("SIGHUP received, deregistering");
                    LifecycleEvent::Reload
                }
                Some(()) = terminate.recv() => {
                    tracing::info!("SIGTERM received, cleaning up");
                    LifecycleEvent::Terminate
                }
                else => break,
            };
            if tx.send(event).await.is_err() {
                break;
            }
        }
    });

    Ok(rx)
}

/// Non-unix targets have no SIGHUP; ctrl-c stands in for termination.
#[cfg(not(unix))]
pub fn spawn_signal_listener() -> std::io::Result<mpsc::Receiver<LifecycleEvent>> {
    let (tx, rx) = mpsc::channel(1);

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl+C received, cleaning up");
            let _ = tx.send(LifecycleEvent::Terminate).await;
        }
    });

    Ok(rx)
}
