//! Per-user device registry.
//!
//! Maps `(user, index)` to a stored [`DeviceCredential`] and opens
//! [`Session`](crate::session::Session)s from it. The map sits behind a
//! single `RwLock`: lookups share it, registration takes it exclusively for
//! the whole assign-index/insert/persist step so two concurrent
//! registrations for one user can never get the same index.
//!
//! Sessions are not stored here. [`SessionRegistry::open`] hands the caller
//! a [`SessionGuard`] that lives for one request.

mod credential;
mod store;

pub use credential::{DeviceCredential, DeviceSummary, StoredDevice, UserDeviceKey, UserId};
pub use store::{CredentialStore, JsonFileStore, MemoryStore};

use std::sync::RwLock;
use std::time::Duration;

use indexmap::IndexMap;
use log::{debug, info, warn};
use secrecy::SecretString;

use crate::error::{RegistryError, Result, StoreError, TransportError};
use crate::session::{Connector, Session, SessionGuard};

/// Command sent right after connecting; an empty reply means the device is
/// not usable.
pub const DEFAULT_PROBE_COMMAND: &str = "show ip int brief";

/// Registry of user devices and the connector used to reach them.
pub struct SessionRegistry<C, S = MemoryStore> {
    connector: C,
    store: S,
    devices: RwLock<IndexMap<UserDeviceKey, DeviceCredential>>,
    probe_command: String,
}

impl<C: Connector, S: CredentialStore> SessionRegistry<C, S> {
    /// Create a registry, loading previously registered devices from `store`.
    pub fn new(connector: C, store: S) -> Result<Self> {
        let mut devices = IndexMap::new();
        for stored in store.load()? {
            let (key, credential) = stored.into_entry();
            if key.index == 0 {
                return Err(StoreError::Corrupt {
                    message: format!("device index 0 for user '{}'", key.user),
                }
                .into());
            }
            if devices.insert(key.clone(), credential).is_some() {
                return Err(StoreError::Corrupt {
                    message: format!("duplicate device {} for user '{}'", key.index, key.user),
                }
                .into());
            }
        }
        debug!("Loaded {} registered device(s)", devices.len());

        Ok(Self {
            connector,
            store,
            devices: RwLock::new(devices),
            probe_command: DEFAULT_PROBE_COMMAND.to_string(),
        })
    }

    /// Override the liveness probe command.
    pub fn with_probe_command(mut self, command: impl Into<String>) -> Self {
        self.probe_command = command.into();
        self
    }

    /// Store a new device for `user` and return its index.
    ///
    /// Indices start at 1 and grow by one per registration. If persisting
    /// fails the registration is rolled back.
    ///
    /// This blocks on [`CredentialStore::save`] while holding the write
    /// lock; async callers should run it on a blocking thread, as
    /// [`Relay`](crate::relay::Relay) does.
    pub fn register(
        &self,
        user: &UserId,
        host: impl Into<String>,
        username: impl Into<String>,
        password: SecretString,
    ) -> Result<u32> {
        let credential = DeviceCredential::new(host, username, password);
        let mut devices = self.devices.write().map_err(|_| RegistryError::Poisoned)?;

        // Same as count + 1 while the registry is append-only.
        let index = devices
            .keys()
            .filter(|k| &k.user == user)
            .map(|k| k.index)
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or_else(|| RegistryError::IndexExhausted {
                user: user.to_string(),
            })?;
        let key = UserDeviceKey::new(user.clone(), index);
        let host = credential.host.clone();
        devices.insert(key.clone(), credential);

        let snapshot: Vec<StoredDevice> = devices
            .iter()
            .map(|(k, c)| StoredDevice::from_entry(k, c))
            .collect();
        if let Err(e) = self.store.save(&snapshot) {
            devices.shift_remove(&key);
            warn!("Failed to persist device for user {}: {}", user, e);
            return Err(e.into());
        }

        info!("Registered device {} ({}) for user {}", index, host, user);
        Ok(index)
    }

    /// Devices registered by `user`, in registration order.
    pub fn list(&self, user: &UserId) -> Result<Vec<DeviceSummary>> {
        let devices = self.devices.read().map_err(|_| RegistryError::Poisoned)?;
        Ok(devices
            .iter()
            .filter(|(k, _)| &k.user == user)
            .map(|(k, c)| DeviceSummary {
                index: k.index,
                host: c.host.clone(),
            })
            .collect())
    }

    /// Look up the credential at `(user, index)`.
    pub fn credential(&self, user: &UserId, index: u32) -> Result<DeviceCredential> {
        let devices = self.devices.read().map_err(|_| RegistryError::Poisoned)?;
        let key = UserDeviceKey::new(user.clone(), index);
        match devices.get(&key) {
            Some(credential) => Ok(credential.clone()),
            None => Err(RegistryError::NotFound {
                user: user.to_string(),
                index,
                registered: devices.keys().filter(|k| &k.user == user).count(),
            }
            .into()),
        }
    }

    /// Open a session to the user's device `index` (default 1).
    ///
    /// Connecting and the liveness probe are each bounded by `timeout`. An
    /// empty probe reply is reported as
    /// [`RegistryError::ConnectFailed`]. Any session opened here is closed
    /// before an error is returned.
    pub async fn open(
        &self,
        user: &UserId,
        index: Option<u32>,
        timeout: Duration,
    ) -> Result<SessionGuard<C::Session>> {
        let index = index.unwrap_or(1);
        let credential = self.credential(user, index)?;
        let host = credential.host.clone();
        debug!("Opening session to {} (device {} of {})", host, index, user);

        let session = tokio::time::timeout(timeout, self.connector.open(&credential))
            .await
            .map_err(|_| TransportError::Timeout(timeout))??;
        let mut guard = SessionGuard::new(session, host.clone());

        let probe = tokio::time::timeout(timeout, guard.session_mut()?.run(&self.probe_command))
            .await;
        match probe {
            Ok(Ok(output)) if !output.trim().is_empty() => {
                debug!("Session to {} is live", host);
                Ok(guard)
            }
            Ok(Ok(_)) => {
                warn!("Liveness probe on {} returned no output", host);
                guard.close().await;
                Err(RegistryError::ConnectFailed { host }.into())
            }
            Ok(Err(e)) => {
                guard.close().await;
                Err(e)
            }
            Err(_) => {
                warn!("Liveness probe on {} timed out", host);
                guard.close().await;
                Err(TransportError::Timeout(timeout).into())
            }
        }
    }
}

impl<C, S> std::fmt::Debug for SessionRegistry<C, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.devices.read().map(|d| d.len()).unwrap_or_default();
        f.debug_struct("SessionRegistry")
            .field("devices", &count)
            .field("probe_command", &self.probe_command)
            .finish()
    }
}
