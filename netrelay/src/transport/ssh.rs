//! Authenticated russh connection to one device.
//!
//! Host keys are checked against OpenSSH `known_hosts` according to
//! [`HostKeyVerification`]. russh only sees a yes/no from the handler, so a
//! rejection reason is parked in a shared slot and reported by
//! [`SshTransport::connect`] in place of russh's generic error.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use log::{debug, warn};
use russh::Channel;
use russh::client::{self, Handle, Msg};
use russh::keys::PublicKey;
use secrecy::ExposeSecret;

use super::config::{HostKeyVerification, SshConfig};
use crate::error::{Result, TransportError};

type RejectionSlot = Arc<Mutex<Option<TransportError>>>;

/// A logged-in SSH connection. Shells are opened on it with
/// [`open_channel`](Self::open_channel).
pub struct SshTransport {
    handle: Handle<DeviceHostKeys>,
    config: SshConfig,
}

impl SshTransport {
    /// Connect within `config.timeout`, verify the host key and log in with
    /// the stored password.
    pub async fn connect(config: SshConfig) -> Result<Self> {
        let client_config = Arc::new(client::Config {
            inactivity_timeout: Some(config.timeout),
            ..Default::default()
        });
        let rejection = RejectionSlot::default();
        let handler = DeviceHostKeys {
            host: config.host.clone(),
            port: config.port,
            mode: config.host_key_verification.clone(),
            known_hosts: config.known_hosts_path.clone(),
            rejection: Arc::clone(&rejection),
        };

        debug!("Connecting to {}", config.socket_addr());
        let connecting = client::connect(client_config, (config.host.as_str(), config.port), handler);
        let mut handle = match tokio::time::timeout(config.timeout, connecting).await {
            Err(_) => return Err(TransportError::Timeout(config.timeout).into()),
            Ok(Err(e)) => {
                let parked = rejection.lock().ok().and_then(|mut slot| slot.take());
                return Err(parked.unwrap_or(TransportError::Ssh(e)).into());
            }
            Ok(Ok(handle)) => handle,
        };

        let accepted = handle
            .authenticate_password(&config.username, config.password.expose_secret())
            .await
            .map_err(TransportError::Ssh)?
            .success();
        if !accepted {
            return Err(TransportError::AuthenticationFailed {
                user: config.username.clone(),
            }
            .into());
        }

        Ok(Self { handle, config })
    }

    /// Open a session channel with a PTY and an interactive shell.
    pub async fn open_channel(&self) -> Result<Channel<Msg>> {
        let channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(TransportError::Ssh)?;
        channel
            .request_pty(
                true,
                "xterm",
                self.config.terminal_width,
                self.config.terminal_height,
                0,
                0,
                &[],
            )
            .await
            .map_err(TransportError::Ssh)?;
        channel
            .request_shell(true)
            .await
            .map_err(TransportError::Ssh)?;
        Ok(channel)
    }

    pub fn host(&self) -> &str {
        &self.config.host
    }

    /// Send an SSH disconnect.
    pub async fn close(self) -> Result<()> {
        self.handle
            .disconnect(russh::Disconnect::ByApplication, "", "en")
            .await
            .map_err(TransportError::Ssh)?;
        Ok(())
    }
}

/// Host key policy for one device.
struct DeviceHostKeys {
    host: String,
    port: u16,
    mode: HostKeyVerification,
    known_hosts: Option<PathBuf>,
    rejection: RejectionSlot,
}

impl DeviceHostKeys {
    /// `Ok(false)` when the host has no entry yet.
    fn is_known(&self, key: &PublicKey) -> std::result::Result<bool, TransportError> {
        let checked = match &self.known_hosts {
            Some(path) => russh::keys::check_known_hosts_path(&self.host, self.port, key, path),
            None => russh::keys::check_known_hosts(&self.host, self.port, key),
        };
        checked.map_err(|e| match e {
            russh::keys::Error::KeyChanged { line } => TransportError::HostKeyChanged {
                host: self.host.clone(),
                port: self.port,
                line,
            },
            other => TransportError::KnownHosts(other.to_string()),
        })
    }

    fn remember(&self, key: &PublicKey) {
        let learned = match &self.known_hosts {
            Some(path) => {
                russh::keys::known_hosts::learn_known_hosts_path(&self.host, self.port, key, path)
            }
            None => russh::keys::known_hosts::learn_known_hosts(&self.host, self.port, key),
        };
        if let Err(e) = learned {
            warn!("Could not record host key for {}: {}", self.host, e);
        }
    }

    fn verify(&self, key: &PublicKey) -> std::result::Result<(), TransportError> {
        if matches!(self.mode, HostKeyVerification::Disabled) {
            return Ok(());
        }
        match (self.is_known(key)?, &self.mode) {
            (true, _) => Ok(()),
            (false, HostKeyVerification::AcceptNew) => {
                debug!("Learning host key for {}:{}", self.host, self.port);
                self.remember(key);
                Ok(())
            }
            (false, _) => Err(TransportError::HostKeyUnknown {
                host: self.host.clone(),
                port: self.port,
            }),
        }
    }
}

impl client::Handler for DeviceHostKeys {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        match self.verify(server_public_key) {
            Ok(()) => Ok(true),
            Err(e) => {
                warn!("Rejecting host key for {}: {}", self.host, e);
                if let Ok(mut slot) = self.rejection.lock() {
                    *slot = Some(e);
                }
                Ok(false)
            }
        }
    }
}
