//! Cached state of one monitor
//!
//! [`DeviceState`] owns the last known values of all four properties and is
//! the only place they change. Reads come from the cache; the poller refreshes
//! it from the control server and writes update it optimistically.

use display_client::{ClientError, DisplayClient, Feature};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::error::{Result, StateError};
use crate::model::{DeviceId, DeviceSnapshot};
use crate::property::{Brightness, InputSource, Mute, Property, Volume};
use crate::refresh::RefreshSignal;

/// Cached state and write path for one monitor
#[derive(Debug)]
pub struct DeviceState {
    id: DeviceId,
    client: DisplayClient,
    request_timeout: Duration,
    snapshot: watch::Sender<DeviceSnapshot>,
    available: watch::Sender<bool>,
    refresh: RefreshSignal,
}

impl DeviceState {
    /// Create a device with default cached values
    ///
    /// `request_timeout` bounds a whole refresh and each single write.
    pub fn new(
        id: DeviceId,
        client: DisplayClient,
        request_timeout: Duration,
        refresh: RefreshSignal,
    ) -> Self {
        let (snapshot, _) = watch::channel(DeviceSnapshot::default());
        let (available, _) = watch::channel(false);
        Self {
            id,
            client,
            request_timeout,
            snapshot,
            available,
            refresh,
        }
    }

    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    /// Base URL of the control server
    pub fn endpoint(&self) -> &str {
        self.client.base_url()
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Current cached value of a property
    pub fn get<P: Property>(&self) -> P {
        P::project(&self.snapshot.borrow())
    }

    pub fn snapshot(&self) -> DeviceSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Receiver notified whenever any cached value changes
    pub fn watch(&self) -> watch::Receiver<DeviceSnapshot> {
        self.snapshot.subscribe()
    }

    /// Whether the last refresh succeeded
    pub fn is_available(&self) -> bool {
        *self.available.borrow()
    }

    pub fn watch_availability(&self) -> watch::Receiver<bool> {
        self.available.subscribe()
    }

    pub fn refresh_signal(&self) -> &RefreshSignal {
        &self.refresh
    }

    // ========================================================================
    // Refresh
    // ========================================================================

    /// Read every feature from the control server into the cache
    ///
    /// Features are read in order volume, brightness, mute, input source.
    /// A transport failure or timeout aborts the cycle with
    /// [`StateError::Communication`]; features read before the failure keep
    /// their new values. A non-200 reply only skips that feature.
    pub async fn refresh(&self) -> Result<DeviceSnapshot> {
        let result = match tokio::time::timeout(self.request_timeout, self.read_all()).await {
            Ok(result) => result,
            Err(_) => Err(self.communication(ClientError::Timeout)),
        };

        let available = result.is_ok();
        self.available.send_if_modified(|current| {
            if *current == available {
                false
            } else {
                *current = available;
                true
            }
        });

        result
    }

    async fn read_all(&self) -> Result<DeviceSnapshot> {
        for feature in Feature::ALL {
            match feature {
                Feature::Volume => self.read_into::<Volume>().await?,
                Feature::Brightness => self.read_into::<Brightness>().await?,
                Feature::Mute => self.read_into::<Mute>().await?,
                Feature::InputSource => self.read_into::<InputSource>().await?,
            }
        }
        Ok(self.snapshot())
    }

    async fn read_into<P: Property>(&self) -> Result<()> {
        let reply = self
            .client
            .read(self.id.as_str(), P::FEATURE)
            .await
            .map_err(|e| self.communication(e))?;

        if !reply.is_ok() {
            let rejected = StateError::FeatureRejected {
                device: self.id.clone(),
                feature: P::KEY,
                status: reply.status,
            };
            match P::fallback() {
                Some(value) => {
                    debug!("{}, using fallback {:?}", rejected, value);
                    self.publish(value);
                }
                None => warn!("{}", rejected),
            }
            return Ok(());
        }

        match P::decode(&reply.body) {
            Some(value) => {
                self.publish(value);
            }
            None => warn!(
                "Unparsable {} from {}: {:?}",
                P::KEY,
                self.id,
                reply.body
            ),
        }
        Ok(())
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Write a property to the monitor
    ///
    /// On HTTP 200 the cache takes the written value at once and a refresh is
    /// requested. Failures are logged and leave the cache unchanged; the
    /// return value reports whether the write was accepted.
    pub async fn set<P: Property>(&self, value: P) -> bool {
        let encoded = value.encode();
        let request = self.client.write(self.id.as_str(), P::FEATURE, &encoded);

        match tokio::time::timeout(self.request_timeout, request).await {
            Ok(Ok(reply)) if reply.is_ok() => {
                info!("Set {} on {} to {}", P::KEY, self.id, encoded);
                self.publish(value);
                self.refresh.request();
                true
            }
            Ok(Ok(reply)) => {
                let rejected = StateError::FeatureRejected {
                    device: self.id.clone(),
                    feature: P::KEY,
                    status: reply.status,
                };
                warn!("Error setting {}: {}", P::KEY, rejected);
                false
            }
            Ok(Err(e)) => {
                error!("Error setting {}: {}", P::KEY, self.communication(e));
                false
            }
            Err(_) => {
                error!(
                    "Error setting {}: {}",
                    P::KEY,
                    self.communication(ClientError::Timeout)
                );
                false
            }
        }
    }

    /// Write a feature from its raw wire value
    ///
    /// Values that do not decode for the feature are rejected without a
    /// request being sent.
    pub async fn set_feature(&self, feature: Feature, value: &str) -> bool {
        match feature {
            Feature::Volume => self.set_decoded::<Volume>(value).await,
            Feature::Brightness => self.set_decoded::<Brightness>(value).await,
            Feature::Mute => self.set_decoded::<Mute>(value).await,
            Feature::InputSource => self.set_decoded::<InputSource>(value).await,
        }
    }

    async fn set_decoded<P: Property>(&self, raw: &str) -> bool {
        match P::decode(raw) {
            Some(value) => self.set(value).await,
            None => {
                warn!("Refusing to set {} on {} to {:?}", P::KEY, self.id, raw);
                false
            }
        }
    }

    fn publish<P: Property>(&self, value: P) -> bool {
        self.snapshot.send_if_modified(|snapshot| value.apply(snapshot))
    }

    fn communication(&self, source: ClientError) -> StateError {
        StateError::Communication {
            device: self.id.clone(),
            source,
        }
    }
}
