//! SSH implementation of the session capability.
//!
//! [`SshConnector`] logs in with a stored credential and opens a PTY shell;
//! [`SshSession`] drives the vendor CLI over it by writing lines and reading
//! until the platform's prompt reappears.

pub mod config;
mod connector;
mod ssh;

pub use config::{HostKeyVerification, SshConfig};
pub use connector::{SshConnector, SshSession};
pub use ssh::SshTransport;
