//! Error types for netrelay.
//!
//! Each layer has its own error enum; [`Error`] wraps them and maps every
//! failure onto the five user-facing [`ErrorKind`]s.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Main error type for netrelay operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed command argument, detected before any network I/O.
    #[error("Invalid argument: {0}")]
    Spec(#[from] SpecError),

    /// Device registry errors
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Credential persistence errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// SSH transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Channel operation errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// The device accepted the session but rejected the command sequence.
    #[error("Device rejected the command sequence")]
    Rejected { output: String },
}

/// Coarse classification of an [`Error`], used by front-ends to pick a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidSpec,
    NotFound,
    ConnectFailed,
    Rejected,
    Internal,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Spec(_) => ErrorKind::InvalidSpec,
            Error::Registry(RegistryError::NotFound { .. }) => ErrorKind::NotFound,
            Error::Registry(RegistryError::ConnectFailed { .. }) => ErrorKind::ConnectFailed,
            Error::Registry(RegistryError::IndexExhausted { .. } | RegistryError::Poisoned) => {
                ErrorKind::Internal
            }
            Error::Store(_) => ErrorKind::Internal,
            Error::Transport(_) | Error::Channel(_) => ErrorKind::ConnectFailed,
            Error::Rejected { .. } => ErrorKind::Rejected,
        }
    }

    /// Human-readable message for chat users. Internal details are not included.
    pub fn user_message(&self) -> String {
        match self {
            Error::Spec(e) => format!("Invalid argument: {e}"),
            Error::Registry(RegistryError::NotFound { index, registered: 0, .. }) => format!(
                "You haven't registered a device yet (no device {index}).\n\
                 Use !create_connection <ip> <username> <password> to add one."
            ),
            Error::Registry(RegistryError::NotFound {
                index, registered, ..
            }) => format!(
                "Device {index} doesn't exist; you have {registered} registered device(s). \
                 Use !show_connection to list them."
            ),
            Error::Registry(RegistryError::ConnectFailed { host, .. }) => {
                format!("Couldn't reach the device at {host}.")
            }
            Error::Transport(_) | Error::Channel(_) => {
                "Couldn't reach the device.".to_string()
            }
            Error::Rejected { output } => {
                format!("The device rejected that command:\n{}", output.trim())
            }
            Error::Registry(RegistryError::IndexExhausted { .. } | RegistryError::Poisoned)
            | Error::Store(_) => {
                "Something went wrong on our side. Please try again.".to_string()
            }
        }
    }
}

/// Input parsing errors.
///
/// `position` is the 1-based entry number within a comma-separated list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    /// Nothing to parse
    #[error("{what} must not be empty")]
    Empty { what: &'static str },

    /// Entry has the wrong number of delimited fields
    #[error("entry {position} '{token}' should look like {expected}")]
    FieldCount {
        token: String,
        position: usize,
        expected: &'static str,
    },

    /// Not a dotted-quad IPv4 address
    #[error("entry {position}: '{token}' is not an IPv4 address")]
    InvalidAddress { token: String, position: usize },

    /// Prefix length not a number in 1..=32
    #[error("entry {position}: '{token}' is not a prefix length between 1 and 32")]
    InvalidPrefix { token: String, position: usize },

    /// Prefix length outside 1..=32, given directly rather than in a list
    #[error("prefix length {len} is not between 1 and 32")]
    PrefixOutOfRange { len: u8 },

    /// Dotted-quad mask with non-contiguous bits
    #[error("'{token}' is not a contiguous subnet mask")]
    InvalidMask { token: String },

    /// OSPF area that is neither a number nor dotted-quad
    #[error("entry {position}: '{token}' is not an OSPF area")]
    InvalidArea { token: String, position: usize },

    /// Autonomous system number
    #[error("'{token}' is not an AS number")]
    InvalidAsn { token: String },

    /// Device selector
    #[error("'{token}' is not a device index (1, 2, ...)")]
    InvalidIndex { token: String },

    /// Any other single-token argument (interface name, VLAN id, ...)
    #[error("'{token}' is not a valid {what}")]
    InvalidValue { what: &'static str, token: String },

    /// Wrong number of positional arguments for a request
    #[error("usage: {usage}")]
    Usage { usage: &'static str },

    /// Request name not known to the relay
    #[error("unknown command '{name}'")]
    UnknownCommand { name: String },
}

/// Device registry errors.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// No credential stored at (user, index)
    #[error("No device {index} registered for user '{user}'")]
    NotFound {
        user: String,
        index: u32,
        /// How many devices the user does have.
        registered: usize,
    },

    /// The session opened but the device did not answer the liveness probe.
    #[error("Connected to {host} but the device returned no output")]
    ConnectFailed { host: String },

    /// The user's highest stored index is `u32::MAX`
    #[error("No device index left for user '{user}'")]
    IndexExhausted { user: String },

    /// A handler panicked while holding the registry lock
    #[error("Registry lock poisoned")]
    Poisoned,
}

/// Credential persistence errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O error reading or writing the store
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Stored data could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Stored data is inconsistent
    #[error("Corrupt store: {message}")]
    Corrupt { message: String },
}

/// Transport layer errors (SSH connection, authentication).
#[derive(Error, Debug)]
pub enum TransportError {
    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// Host key did not match known_hosts
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// Host not present in known_hosts under strict checking
    #[error("Host {host}:{port} is not in known_hosts")]
    HostKeyUnknown { host: String, port: u16 },

    /// known_hosts could not be read or written
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Channel layer errors (prompt matching, PTY operations).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Prompt not seen within the timeout
    #[error("Prompt not found within {0:?}")]
    PatternTimeout(Duration),

    /// Channel closed unexpectedly
    #[error("Channel closed")]
    Closed,

    /// Session already closed
    #[error("Session not open")]
    NotOpen,

    /// SSH protocol error on the channel
    #[error("Channel SSH error: {0}")]
    Ssh(russh::Error),
}

/// Result type alias using netrelay's Error.
pub type Result<T> = std::result::Result<T, Error>;
