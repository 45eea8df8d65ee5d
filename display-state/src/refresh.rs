//! Refresh requests from write paths to the poller
//!
//! Writes never refresh inline. They raise a request on a depth-1 channel;
//! while a request is pending, further requests fold into it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Sending half, held by [`DeviceState`](crate::DeviceState)
#[derive(Debug, Clone)]
pub struct RefreshSignal {
    tx: mpsc::Sender<()>,
    requested: Arc<AtomicU64>,
}

/// Receiving half, owned by the poller task
#[derive(Debug)]
pub struct RefreshRequests {
    rx: mpsc::Receiver<()>,
}

/// Create a connected signal/receiver pair
pub fn refresh_channel() -> (RefreshSignal, RefreshRequests) {
    let (tx, rx) = mpsc::channel(1);
    (
        RefreshSignal {
            tx,
            requested: Arc::new(AtomicU64::new(0)),
        },
        RefreshRequests { rx },
    )
}

impl RefreshSignal {
    /// Ask for a refresh soon. Never blocks.
    pub fn request(&self) {
        self.requested.fetch_add(1, Ordering::Relaxed);
        match self.tx.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => {}
            Err(TrySendError::Closed(())) => {
                tracing::debug!("Refresh requested with no poller running");
            }
        }
    }

    /// Total number of requests raised so far
    pub fn requested_count(&self) -> u64 {
        self.requested.load(Ordering::Relaxed)
    }
}

impl RefreshRequests {
    /// Wait for the next request. `None` once every signal is dropped.
    pub async fn recv(&mut self) -> Option<()> {
        self.rx.recv().await
    }

    /// Discard pending requests, returning how many were folded
    pub fn drain(&mut self) -> usize {
        let mut folded = 0;
        while self.rx.try_recv().is_ok() {
            folded += 1;
        }
        folded
    }
}
