//! Fixed-rate permit source for outbound listing requests
//!
//! The throttle issues one permit immediately and then one permit per
//! interval, no matter how long callers take between acquires. At most one
//! unclaimed permit is buffered; ticks that fire while the buffer is full
//! are dropped, so a slow consumer never earns a burst of catch-up permits.

use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::time::MissedTickBehavior;

/// A shared fixed-rate ticker gating calls to the listing API
///
/// Internally a spawned ticker task feeds a capacity-1 channel. The first
/// tick completes immediately, so the first `acquire` never waits.
pub struct Throttle {
    permits: Mutex<mpsc::Receiver<()>>,
}

impl Throttle {
    /// Creates a throttle issuing one permit per `interval`
    pub fn new(interval: Duration) -> Self {
        let (tx, rx) = mpsc::channel(1);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                // A full buffer means nobody claimed the previous permit;
                // drop this tick instead of queueing it.
                if let Err(mpsc::error::TrySendError::Closed(_)) = tx.try_send(()) {
                    break;
                }
            }
        });

        Self {
            permits: Mutex::new(rx),
        }
    }

    /// Blocks until a permit is available
    ///
    /// Permits are spaced at least one interval apart, measured from the
    /// previous permit's issuance rather than from the previous `acquire`
    /// return.
    pub async fn acquire(&self) {
        let mut permits = self.permits.lock().await;
        let _ = permits.recv().await;
    }
}
