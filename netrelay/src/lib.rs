//! # netrelay
//!
//! Relay core for chat-driven network device management.
//!
//! A chat front-end forwards a user's command; netrelay validates it,
//! generates the Cisco IOS CLI lines, opens an SSH session to the user's
//! registered device, submits the lines and classifies the response.
//!
//! ## Features
//!
//! - Per-user device registry with stable 1-based indices and pluggable
//!   credential persistence
//! - CLI generators for static routes, RIP, OSPF, EIGRP and BGP, plus
//!   interface, VLAN and exec commands
//! - Prefix-length to subnet/wildcard mask translation
//! - Async SSH sessions via russh, closed after every request
//! - Rejection detection from device output
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use netrelay::registry::{JsonFileStore, UserId};
//! use netrelay::relay::RelayBuilder;
//! use netrelay::transport::SshConnector;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), netrelay::Error> {
//!     let relay = RelayBuilder::new()
//!         .build(SshConnector::new(), JsonFileStore::new("devices.json"))?;
//!     let user = UserId::from("alice");
//!
//!     relay
//!         .dispatch(&user, "create_connection", &["192.168.1.1", "admin", "secret"])
//!         .await?;
//!     let report = relay
//!         .dispatch(&user, "eigrp", &["65000", "10.0.0.0/24,192.168.1.0/30"])
//!         .await?;
//!     println!("{report}");
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod command;
pub mod error;
pub mod executor;
pub mod mask;
pub mod platform;
pub mod registry;
pub mod relay;
pub mod session;
pub mod spec;
pub mod transport;

// Re-export main types for convenience
pub use command::{CommandSequence, RoutingProtocol, ShowCommand};
pub use error::{Error, ErrorKind, Result};
pub use executor::{Executor, Outcome};
pub use mask::PrefixLength;
pub use platform::PlatformDefinition;
pub use registry::{DeviceCredential, SessionRegistry, UserId};
pub use relay::{Relay, RelayBuilder, Report, Request};
pub use session::{Connector, Session, SessionGuard};
pub use transport::{SshConfig, SshConnector};
