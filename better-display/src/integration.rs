//! Integration - lifecycle of config entries
//!
//! Owns, per loaded config entry, the device state, its poller, the source
//! catalog and the monitor handle. Hot reload walks this map directly.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use display_client::DisplayClient;
use display_state::{refresh_channel, DeviceId, DeviceState, Poller, PollerStats};

use crate::config::{ConfigEntry, EntryData, IntegrationConfig, Platform};
use crate::entity::{DeviceInfo, EntityContext, EntityInfo};
use crate::error::{Result, SdkError};
use crate::monitor::Monitor;
use crate::source::SourceCatalog;

/// Outcome of [`Integration::update_entry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadKind {
    /// Stored data was identical
    Unchanged,
    /// Only the source list changed; entities were updated in place
    SourcesRebuilt,
    /// Device name or URL changed; the entry was torn down and set up again
    Reloaded,
}

struct EntryRuntime {
    entry: ConfigEntry,
    monitor: Monitor,
    catalog: SourceCatalog,
    poller: Poller,
}

/// Main entry point: loads, updates and unloads config entries
///
/// # Example
///
/// ```rust,ignore
/// use better_display::{ConfigEntry, EntryInput, Integration, IntegrationConfig};
///
/// let integration = Integration::new(IntegrationConfig::default())?;
/// let data = EntryInput {
///     device_name: "DELL U2720Q".into(),
///     base_url: "http://192.168.6.248:55777".into(),
///     ..Default::default()
/// }
/// .validate()
/// .map_err(|errors| better_display::SdkError::InvalidConfig(format!("{:?}", errors)))?;
///
/// let monitor = integration.setup_entry(&ConfigEntry::new("entry-1", data)).await?;
/// for entity in monitor.entities() {
///     println!("{} = {}", entity.info().name, entity.state());
/// }
/// ```
pub struct Integration {
    config: IntegrationConfig,
    entries: RwLock<HashMap<String, EntryRuntime>>,
}

impl Integration {
    pub fn new(config: IntegrationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            entries: RwLock::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &IntegrationConfig {
        &self.config
    }

    /// Load a config entry
    ///
    /// Runs one refresh before registering anything; if it fails the poller
    /// is stopped and [`SdkError::EntryNotReady`] is returned.
    pub async fn setup_entry(&self, entry: &ConfigEntry) -> Result<Monitor> {
        entry.check_version()?;
        let data = &entry.data;
        if data.device_name.trim().is_empty() {
            return Err(SdkError::InvalidConfig("device name is empty".to_string()));
        }
        self.ensure_unclaimed(&entry.entry_id, &data.device_name, true)?;

        let client = DisplayClient::new(&data.base_url)?;
        let (signal, requests) = refresh_channel();
        let device = Arc::new(DeviceState::new(
            DeviceId::new(data.device_name.as_str()),
            client,
            self.config.poller.request_timeout,
            signal,
        ));
        let poller = Poller::start(Arc::clone(&device), requests, self.config.poller.clone());

        if let Err(e) = poller.first_refresh().await {
            warn!("First refresh of {} failed: {}", device.id(), e);
            poller.shutdown().await;
            return Err(SdkError::EntryNotReady {
                device: data.device_name.clone(),
                reason: e.to_string(),
            });
        }

        let catalog = SourceCatalog::new(data.source_list.clone());
        let device_info = DeviceInfo::new(data.device_name.trim(), device.endpoint());
        let context = EntityContext::new(device, device_info);
        let monitor = Monitor::new(context, catalog.clone(), &self.config.platforms);

        let runtime = EntryRuntime {
            entry: entry.clone(),
            monitor: monitor.clone(),
            catalog,
            poller,
        };

        // Another setup may have claimed the id or the device while we awaited
        let rejected = {
            let mut entries = self.entries.write();
            match claim_error(&entries, &entry.entry_id, &data.device_name, true) {
                Some(error) => Some((runtime, error)),
                None => {
                    entries.insert(entry.entry_id.clone(), runtime);
                    None
                }
            }
        };
        if let Some((runtime, error)) = rejected {
            runtime.poller.shutdown().await;
            return Err(error);
        }

        let platforms: Vec<&str> = self.config.platforms.iter().map(Platform::as_str).collect();
        info!(
            "Set up {} with {} entities ({})",
            monitor.name,
            monitor.entities().len(),
            platforms.join(", ")
        );
        Ok(monitor)
    }

    /// Apply changed entry data to a loaded entry
    ///
    /// A failed setup during a full reload leaves the entry unloaded.
    pub async fn update_entry(&self, entry: &ConfigEntry) -> Result<ReloadKind> {
        entry.check_version()?;
        let previous = self
            .entries
            .read()
            .get(&entry.entry_id)
            .map(|runtime| runtime.entry.data.clone())
            .ok_or_else(|| SdkError::EntryNotFound(entry.entry_id.clone()))?;

        if previous == entry.data {
            debug!("Entry {} unchanged", entry.entry_id);
            return Ok(ReloadKind::Unchanged);
        }

        if same_device(&previous, &entry.data) {
            let mut entries = self.entries.write();
            let runtime = entries
                .get_mut(&entry.entry_id)
                .ok_or_else(|| SdkError::EntryNotFound(entry.entry_id.clone()))?;
            runtime.catalog.rebuild(entry.data.source_list.clone());
            runtime.entry = entry.clone();
            info!(
                "Rebuilt sources of {}: {}",
                entry.data.device_name,
                entry.data.source_list.format()
            );
            return Ok(ReloadKind::SourcesRebuilt);
        }

        self.ensure_unclaimed(&entry.entry_id, &entry.data.device_name, false)?;
        self.unload_entry(&entry.entry_id).await;
        self.setup_entry(entry).await?;
        info!("Reloaded entry {}", entry.entry_id);
        Ok(ReloadKind::Reloaded)
    }

    /// Stop an entry's poller and drop its entities
    ///
    /// Returns false if the entry was not loaded.
    pub async fn unload_entry(&self, entry_id: &str) -> bool {
        let runtime = self.entries.write().remove(entry_id);
        match runtime {
            Some(runtime) => {
                runtime.poller.shutdown().await;
                info!("Unloaded {}", runtime.entry.data.device_name);
                true
            }
            None => false,
        }
    }

    /// Unload every entry
    pub async fn shutdown(&self) {
        for entry_id in self.entry_ids() {
            self.unload_entry(&entry_id).await;
        }
    }

    pub fn monitor(&self, entry_id: &str) -> Result<Monitor> {
        self.with_entry(entry_id, |runtime| runtime.monitor.clone())
    }

    /// Registration metadata of an entry's entities
    pub fn entities(&self, entry_id: &str) -> Result<Vec<EntityInfo>> {
        self.with_entry(entry_id, |runtime| {
            runtime
                .monitor
                .entities()
                .into_iter()
                .map(|e| e.info().clone())
                .collect()
        })
    }

    pub fn device(&self, entry_id: &str) -> Result<Arc<DeviceState>> {
        self.with_entry(entry_id, |runtime| Arc::clone(runtime.monitor.device()))
    }

    pub fn entry(&self, entry_id: &str) -> Result<ConfigEntry> {
        self.with_entry(entry_id, |runtime| runtime.entry.clone())
    }

    pub fn poller_stats(&self, entry_id: &str) -> Result<PollerStats> {
        self.with_entry(entry_id, |runtime| runtime.poller.stats())
    }

    /// Ids of loaded entries, sorted
    pub fn entry_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.entries.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    fn with_entry<T>(&self, entry_id: &str, f: impl FnOnce(&EntryRuntime) -> T) -> Result<T> {
        self.entries
            .read()
            .get(entry_id)
            .map(f)
            .ok_or_else(|| SdkError::EntryNotFound(entry_id.to_string()))
    }

    /// Fail if the entry id is loaded (when `new_entry`) or another entry owns the device
    fn ensure_unclaimed(&self, entry_id: &str, device_name: &str, new_entry: bool) -> Result<()> {
        match claim_error(&self.entries.read(), entry_id, device_name, new_entry) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn claim_error(
    entries: &HashMap<String, EntryRuntime>,
    entry_id: &str,
    device_name: &str,
    new_entry: bool,
) -> Option<SdkError> {
    if new_entry && entries.contains_key(entry_id) {
        return Some(SdkError::EntryAlreadyLoaded(entry_id.to_string()));
    }
    let taken = entries
        .iter()
        .any(|(id, runtime)| id != entry_id && runtime.monitor.name == device_name.trim());
    taken.then(|| SdkError::DuplicateDevice(device_name.to_string()))
}

fn same_device(a: &EntryData, b: &EntryData) -> bool {
    a.device_name == b.device_name && a.base_url == b.base_url
}
