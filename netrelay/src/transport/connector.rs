//! Session capability over an interactive SSH shell.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, trace};
use russh::client::Msg;
use russh::{Channel, ChannelMsg};

use super::config::{HostKeyVerification, SshConfig};
use super::ssh::SshTransport;
use crate::channel::PatternBuffer;
use crate::error::{ChannelError, Result};
use crate::platform::{self, PlatformDefinition};
use crate::registry::DeviceCredential;
use crate::session::{Connector, Session};

/// Opens [`SshSession`]s to registered devices.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use netrelay::transport::{HostKeyVerification, SshConnector};
///
/// let connector = SshConnector::new()
///     .port(2222)
///     .timeout(Duration::from_secs(10))
///     .host_key_verification(HostKeyVerification::Strict);
/// ```
#[derive(Debug, Clone)]
pub struct SshConnector {
    port: u16,
    timeout: Duration,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
    platform: Arc<PlatformDefinition>,
}

impl Default for SshConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl SshConnector {
    /// Connector for Cisco IOS devices on port 22.
    pub fn new() -> Self {
        Self {
            port: 22,
            timeout: Duration::from_secs(30),
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
            platform: Arc::new(platform::cisco_ios()),
        }
    }

    /// Set the SSH port (default: 22).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Bound for connecting and for each wait on the prompt.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    /// Use a different vendor profile.
    pub fn platform(mut self, platform: PlatformDefinition) -> Self {
        self.platform = Arc::new(platform);
        self
    }

    /// The vendor profile in use.
    pub fn platform_definition(&self) -> &PlatformDefinition {
        &self.platform
    }

    fn ssh_config(&self, credential: &DeviceCredential) -> SshConfig {
        SshConfig {
            host: credential.host.clone(),
            port: self.port,
            username: credential.username.clone(),
            password: credential.password.clone(),
            timeout: self.timeout,
            terminal_width: self.platform.terminal_width,
            terminal_height: self.platform.terminal_height,
            host_key_verification: self.host_key_verification.clone(),
            known_hosts_path: self.known_hosts_path.clone(),
        }
    }
}

impl Connector for SshConnector {
    type Session = SshSession;

    async fn open(&self, credential: &DeviceCredential) -> Result<SshSession> {
        let transport = SshTransport::connect(self.ssh_config(credential)).await?;
        let channel = match transport.open_channel().await {
            Ok(channel) => channel,
            Err(e) => {
                let _ = transport.close().await;
                return Err(e);
            }
        };

        let mut session = SshSession {
            transport,
            channel,
            buffer: PatternBuffer::default(),
            platform: self.platform.clone(),
            timeout: self.timeout,
        };

        if let Err(e) = session.start().await {
            let _ = session.close().await;
            return Err(e);
        }
        Ok(session)
    }
}

/// An interactive CLI session on one device.
pub struct SshSession {
    transport: SshTransport,
    channel: Channel<Msg>,
    buffer: PatternBuffer,
    platform: Arc<PlatformDefinition>,
    timeout: Duration,
}

impl SshSession {
    /// Wait for the login prompt and run the platform's on-open commands.
    async fn start(&mut self) -> Result<()> {
        self.read_until_prompt().await?;
        let platform = self.platform.clone();
        for command in &platform.on_open_commands {
            self.send_and_read(command).await?;
        }
        debug!("Session to {} ready", self.transport.host());
        Ok(())
    }

    async fn send(&mut self, line: &str) -> Result<()> {
        trace!("-> {}", line);
        let data = format!("{line}\n");
        self.channel
            .data(data.as_bytes())
            .await
            .map_err(ChannelError::Ssh)?;
        Ok(())
    }

    /// Read until the prompt pattern matches the tail of the buffer.
    async fn read_until_prompt(&mut self) -> Result<String> {
        let deadline = tokio::time::Instant::now() + self.timeout;
        loop {
            if self.buffer.tail_contains(&self.platform.prompt_pattern) {
                let output = self.buffer.take_string();
                trace!("<- {:?}", output);
                return Ok(output);
            }

            let msg = tokio::time::timeout_at(deadline, self.channel.wait())
                .await
                .map_err(|_| ChannelError::PatternTimeout(self.timeout))?;

            match msg {
                Some(ChannelMsg::Data { data }) => self.buffer.extend(&data),
                Some(ChannelMsg::ExtendedData { data, .. }) => self.buffer.extend(&data),
                Some(ChannelMsg::Eof) | Some(ChannelMsg::Close) | None => {
                    return Err(ChannelError::Closed.into());
                }
                Some(_) => {}
            }
        }
    }

    async fn send_and_read(&mut self, line: &str) -> Result<String> {
        self.send(line).await?;
        self.read_until_prompt().await
    }
}

impl Session for SshSession {
    async fn run(&mut self, command: &str) -> Result<String> {
        let raw = self.send_and_read(command).await?;
        Ok(self.platform.normalize_output(&raw, command))
    }

    async fn run_batch(&mut self, commands: &[String]) -> Result<String> {
        let platform = self.platform.clone();
        let mut transcript = self.send_and_read(&platform.config_enter).await?;
        for command in commands {
            transcript.push_str(&self.send_and_read(command).await?);
        }
        transcript.push_str(&self.send_and_read(&platform.config_exit).await?);
        Ok(transcript)
    }

    async fn close(self) -> Result<()> {
        debug!("Disconnecting from {}", self.transport.host());
        let _ = self.channel.eof().await;
        self.transport.close().await
    }
}
