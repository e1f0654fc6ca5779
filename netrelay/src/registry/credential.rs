//! Device identity and credential types.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Chat user identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self::new(id.to_string())
    }
}

/// `(user, device index)`; the index is 1-based and unique per user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserDeviceKey {
    pub user: UserId,
    pub index: u32,
}

impl UserDeviceKey {
    pub fn new(user: UserId, index: u32) -> Self {
        Self { user, index }
    }
}

/// Login details for one device. Immutable once registered.
#[derive(Clone)]
pub struct DeviceCredential {
    pub host: String,
    pub username: String,
    pub password: SecretString,
}

impl DeviceCredential {
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: SecretString,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password,
        }
    }
}

impl fmt::Debug for DeviceCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceCredential")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Public view of a registered device; carries no secrets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceSummary {
    pub index: u32,
    pub host: String,
}

/// Persisted form of one registration. The password is in cleartext here,
/// so this type only exists at the store boundary.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDevice {
    pub user: UserId,
    pub index: u32,
    pub host: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for StoredDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredDevice")
            .field("user", &self.user)
            .field("index", &self.index)
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl StoredDevice {
    pub(crate) fn from_entry(key: &UserDeviceKey, credential: &DeviceCredential) -> Self {
        Self {
            user: key.user.clone(),
            index: key.index,
            host: credential.host.clone(),
            username: credential.username.clone(),
            password: credential.password.expose_secret().to_string(),
        }
    }

    pub(crate) fn into_entry(self) -> (UserDeviceKey, DeviceCredential) {
        (
            UserDeviceKey::new(self.user, self.index),
            DeviceCredential::new(self.host, self.username, SecretString::from(self.password)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_password() {
        let cred = DeviceCredential::new("10.0.0.1", "admin", SecretString::from("hunter2"));
        let debug = format!("{cred:?}");
        assert!(debug.contains("10.0.0.1"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_stored_device_roundtrip_keeps_password() {
        let key = UserDeviceKey::new(UserId::from(42u64), 1);
        let cred = DeviceCredential::new("10.0.0.1", "admin", SecretString::from("pw"));
        let (key2, cred2) = StoredDevice::from_entry(&key, &cred).into_entry();
        assert_eq!(key2, key);
        assert_eq!(cred2.password.expose_secret(), "pw");
    }
}
