//! Lifecycle supervisor: binds lifecycle events to registry transitions.
//!
//! # State Transitions
//! ```text
//! Running → Deregistering → PausedForRestart → Running      (Reload)
//! Running → Deregistering → Terminated                      (Terminate)
//! ```

use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time;

use crate::config::TimingConfig;
use crate::control::{run_ticker, ControlLoop, ControlSignal, SyncError, CONTROL_CHANNEL_CAPACITY};

/// Input to the supervisor, decoupled from OS signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Deregister, pause, then restart the control loop.
    Reload,
    /// Deregister and stop.
    Terminate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Running,
    Deregistering,
    PausedForRestart,
    Terminated,
}

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("control loop failed: {0}")]
    Sync(#[source] SyncError),

    #[error("forced deregistration failed: {0}")]
    Deregister(#[source] SyncError),

    #[error("control loop task panicked")]
    LoopPanicked,

    #[error("control loop exited without being stopped")]
    LoopExited,
}

type LoopHandle = JoinHandle<Result<mpsc::Receiver<ControlSignal>, SyncError>>;

pub struct Supervisor {
    control_loop: ControlLoop,
    timing: TimingConfig,
    state: watch::Sender<SupervisorState>,
}

impl Supervisor {
    pub fn new(control_loop: ControlLoop, timing: TimingConfig) -> Self {
        let (state, _) = watch::channel(SupervisorState::Running);
        Self {
            control_loop,
            timing,
            state,
        }
    }

    /// Observe state transitions.
    pub fn subscribe(&self) -> watch::Receiver<SupervisorState> {
        self.state.subscribe()
    }

    /// Start the ticker and control loop, then react to `events` until terminated.
    ///
    /// Returns `Ok(())` once a termination has deregistered the entry. Any
    /// registry failure, in a cycle or during a forced deregistration, is
    /// returned as an error and nothing further is attempted. A closed event
    /// source counts as `Terminate`.
    pub async fn run(self, mut events: mpsc::Receiver<LifecycleEvent>) -> Result<(), SupervisorError> {
        let (control_tx, control_rx) = mpsc::channel(CONTROL_CHANNEL_CAPACITY);
        tokio::spawn(run_ticker(control_tx.clone(), self.timing.tick_interval));

        let mut worker = self.spawn_loop(control_rx);
        self.transition(SupervisorState::Running);

        loop {
            let event = tokio::select! {
                joined = &mut worker => {
                    return Err(match joined {
                        Ok(Ok(_)) => SupervisorError::LoopExited,
                        Ok(Err(e)) => SupervisorError::Sync(e),
                        Err(_) => SupervisorError::LoopPanicked,
                    });
                }
                event = events.recv() => event.unwrap_or(LifecycleEvent::Terminate),
            };

            tracing::info!(event = ?event, "Lifecycle event received, deregistering");
            self.transition(SupervisorState::Deregistering);
            let control_rx = stop_loop(&control_tx, worker).await?;
            self.deregister().await?;

            if event == LifecycleEvent::Terminate {
                self.transition(SupervisorState::Terminated);
                return Ok(());
            }

            tracing::info!(pause = ?self.timing.restart_pause, "Deregistered, paused before restart");
            self.transition(SupervisorState::PausedForRestart);
            if self.pause(&mut events).await == Some(LifecycleEvent::Terminate) {
                tracing::info!("Terminated while paused");
                self.deregister().await?;
                self.transition(SupervisorState::Terminated);
                return Ok(());
            }

            worker = self.spawn_loop(control_rx);
            self.transition(SupervisorState::Running);
        }
    }

    fn spawn_loop(&self, control_rx: mpsc::Receiver<ControlSignal>) -> LoopHandle {
        tokio::spawn(self.control_loop.clone().run(control_rx))
    }

    async fn deregister(&self) -> Result<(), SupervisorError> {
        self.control_loop
            .deregister()
            .await
            .map_err(SupervisorError::Deregister)?;
        tracing::info!(key = %self.control_loop.registration().key, "Server deregistered");
        Ok(())
    }

    /// Sleep out the restart pause. Only a termination cuts it short.
    async fn pause(&self, events: &mut mpsc::Receiver<LifecycleEvent>) -> Option<LifecycleEvent> {
        let deadline = time::sleep(self.timing.restart_pause);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = &mut deadline => return None,
                event = events.recv() => match event {
                    Some(LifecycleEvent::Reload) => {
                        tracing::debug!("Reload already in progress, ignoring");
                    }
                    Some(LifecycleEvent::Terminate) | None => return Some(LifecycleEvent::Terminate),
                },
            }
        }
    }

    fn transition(&self, next: SupervisorState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            tracing::debug!(from = ?previous, to = ?next, "Supervisor state change");
        }
    }
}

/// Ask the loop to stop and wait for it; any in-flight cycle finishes first.
async fn stop_loop(
    control: &mpsc::Sender<ControlSignal>,
    worker: LoopHandle,
) -> Result<mpsc::Receiver<ControlSignal>, SupervisorError> {
    // A failed send means the loop already exited; the join reports why.
    let _ = control.send(ControlSignal::Stop).await;
    match worker.await {
        Ok(Ok(control_rx)) => Ok(control_rx),
        Ok(Err(e)) => Err(SupervisorError::Sync(e)),
        Err(_) => Err(SupervisorError::LoopPanicked),
    }
}
