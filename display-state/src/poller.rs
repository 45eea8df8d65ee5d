//! Background refresh loop for one device
//!
//! The poller refreshes on a fixed interval and whenever a write requests it.
//! Requests that arrive while one is pending, or during the debounce delay,
//! fold into a single refresh. Failed refreshes are not retried early; the
//! next one happens on the normal schedule.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::PollerConfig;
use crate::device::DeviceState;
use crate::error::{Result, StateError};
use crate::model::DeviceSnapshot;
use crate::refresh::RefreshRequests;

/// Counters describing a poller's activity
#[derive(Debug, Clone, Default)]
pub struct PollerStats {
    /// Refreshes attempted, including the first one
    pub refresh_count: u64,
    pub failure_count: u64,
    /// Requests folded into an already scheduled refresh
    pub coalesced_requests: u64,
    pub last_success: Option<Instant>,
    pub last_error: Option<String>,
}

enum Trigger {
    Interval,
    Requested,
}

/// Owns the refresh task of one device
#[derive(Debug)]
pub struct Poller {
    device: Arc<DeviceState>,
    config: PollerConfig,
    task: Option<JoinHandle<()>>,
    shutdown_signal: Arc<AtomicBool>,
    stats: Arc<Mutex<PollerStats>>,
}

impl Poller {
    /// Start the background loop
    ///
    /// The first periodic refresh happens one interval from now; use
    /// [`Poller::first_refresh`] to populate the cache immediately.
    pub fn start(device: Arc<DeviceState>, requests: RefreshRequests, config: PollerConfig) -> Self {
        let shutdown_signal = Arc::new(AtomicBool::new(false));
        let stats = Arc::new(Mutex::new(PollerStats::default()));

        let task = tokio::spawn(Self::polling_loop(
            Arc::clone(&device),
            requests,
            config.clone(),
            Arc::clone(&shutdown_signal),
            Arc::clone(&stats),
        ));

        Self {
            device,
            config,
            task: Some(task),
            shutdown_signal,
            stats,
        }
    }

    async fn polling_loop(
        device: Arc<DeviceState>,
        mut requests: RefreshRequests,
        config: PollerConfig,
        shutdown_signal: Arc<AtomicBool>,
        stats: Arc<Mutex<PollerStats>>,
    ) {
        info!(
            "Starting poller for {} (interval: {:?})",
            device.id(),
            config.update_interval
        );

        let start = tokio::time::Instant::now() + config.update_interval;
        let mut ticker = tokio::time::interval_at(start, config.update_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let trigger = tokio::select! {
                _ = ticker.tick() => Trigger::Interval,
                received = requests.recv() => match received {
                    Some(()) => Trigger::Requested,
                    None => break,
                },
            };

            if shutdown_signal.load(Ordering::Relaxed) {
                break;
            }

            if let Trigger::Requested = trigger {
                if !config.refresh_debounce.is_zero() {
                    tokio::time::sleep(config.refresh_debounce).await;
                }
                let folded = requests.drain();
                if folded > 0 {
                    stats.lock().coalesced_requests += folded as u64;
                }
                ticker.reset();
                debug!("Refresh requested for {}", device.id());
            }

            let result = device.refresh().await;
            Self::record(&stats, &result);
            if let Err(e) = result {
                warn!("Refresh failed: {}", e);
            }
        }

        debug!("Poller for {} stopped", device.id());
    }

    fn record(stats: &Mutex<PollerStats>, result: &Result<DeviceSnapshot>) {
        let mut stats = stats.lock();
        stats.refresh_count += 1;
        match result {
            Ok(_) => {
                stats.last_success = Some(Instant::now());
                stats.last_error = None;
            }
            Err(e) => {
                stats.failure_count += 1;
                stats.last_error = Some(e.to_string());
            }
        }
    }

    /// Refresh once right now and report the outcome
    pub async fn first_refresh(&self) -> Result<DeviceSnapshot> {
        if !self.is_running() {
            return Err(StateError::PollerStopped(self.device.id().clone()));
        }
        let result = self.device.refresh().await;
        Self::record(&self.stats, &result);
        result
    }

    /// Ask the loop for a refresh soon
    pub fn request_refresh(&self) {
        self.device.refresh_signal().request();
    }

    pub fn device(&self) -> &Arc<DeviceState> {
        &self.device
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    pub fn stats(&self) -> PollerStats {
        self.stats.lock().clone()
    }

    pub fn is_running(&self) -> bool {
        !self.shutdown_signal.load(Ordering::Relaxed)
            && self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop the loop, abandoning any refresh in flight
    pub async fn shutdown(mut self) {
        self.shutdown_signal.store(true, Ordering::Relaxed);
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
        info!("Poller for {} shut down", self.device.id());
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.shutdown_signal.store(true, Ordering::Relaxed);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
