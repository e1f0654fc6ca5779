//! Credential persistence.
//!
//! The registry rewrites the whole device list on every registration, so a
//! store only needs `load` and `save`.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::debug;
use tempfile::NamedTempFile;

use super::credential::StoredDevice;
use crate::error::StoreError;

/// Load/save capability injected into the registry.
pub trait CredentialStore: Send + Sync {
    /// Load every stored registration, in registration order.
    fn load(&self) -> Result<Vec<StoredDevice>, StoreError>;

    /// Replace the stored registrations.
    fn save(&self, devices: &[StoredDevice]) -> Result<(), StoreError>;
}

impl<T: CredentialStore + ?Sized> CredentialStore for &T {
    fn load(&self) -> Result<Vec<StoredDevice>, StoreError> {
        (**self).load()
    }

    fn save(&self, devices: &[StoredDevice]) -> Result<(), StoreError> {
        (**self).save(devices)
    }
}

impl<T: CredentialStore + ?Sized> CredentialStore for std::sync::Arc<T> {
    fn load(&self) -> Result<Vec<StoredDevice>, StoreError> {
        (**self).load()
    }

    fn save(&self, devices: &[StoredDevice]) -> Result<(), StoreError> {
        (**self).save(devices)
    }
}

/// Non-persistent store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    devices: Mutex<Vec<StoredDevice>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store, as if loaded from disk.
    pub fn with_devices(devices: Vec<StoredDevice>) -> Self {
        Self {
            devices: Mutex::new(devices),
        }
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self) -> Result<Vec<StoredDevice>, StoreError> {
        Ok(self.devices.lock().map_err(poisoned)?.clone())
    }

    fn save(&self, devices: &[StoredDevice]) -> Result<(), StoreError> {
        *self.devices.lock().map_err(poisoned)? = devices.to_vec();
        Ok(())
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> StoreError {
    StoreError::Corrupt {
        message: "memory store lock poisoned".to_string(),
    }
}

/// JSON file store. A missing file loads as empty.
///
/// The file holds cleartext passwords. It is always rewritten as a fresh
/// owner-only (`0600` on unix) file next to the target, then renamed over it.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for JsonFileStore {
    fn load(&self) -> Result<Vec<StoredDevice>, StoreError> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No credential file at {}", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&data)?)
    }

    fn save(&self, devices: &[StoredDevice]) -> Result<(), StoreError> {
        // Readers only ever see the old file or the complete new one.
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut file, devices)?;
        file.write_all(b"\n")?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|e| e.error)?;
        debug!(
            "Saved {} device(s) to {}",
            devices.len(),
            self.path.display()
        );
        Ok(())
    }
}
