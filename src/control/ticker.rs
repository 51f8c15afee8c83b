//! Fixed-cadence tick producer.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time;

use crate::control::ControlSignal;

/// Push `Cycle` onto the control channel, then sleep `interval`, forever.
///
/// The send waits while a previous signal is still unconsumed, so the ticker
/// never queues more than one cycle. It outlives individual control loops and
/// only exits once every receiver is gone.
pub async fn run_ticker(control: mpsc::Sender<ControlSignal>, interval: Duration) {
    tracing::debug!(interval = ?interval, "Ticker started");
    loop {
        if control.send(ControlSignal::Cycle).await.is_err() {
            tracing::debug!("Control channel closed, ticker exiting");
            return;
        }
        time::sleep(interval).await;
    }
}
