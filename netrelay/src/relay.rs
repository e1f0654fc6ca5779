//! Chat request parsing and end-to-end dispatch.
//!
//! A chat front-end hands over a command name and its positional arguments.
//! [`Request::from_args`] validates them and generates the device commands
//! up front, so a malformed request never touches the network. [`Relay`]
//! then resolves the user's device, runs the request through the
//! [`Executor`] and returns a [`Report`].
//!
//! Device-targeting requests accept one optional trailing argument, the
//! 1-based device index. Without it device 1 is used.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::info;
use secrecy::SecretString;

use crate::command::{
    CommandSequence, RoutingProtocol, ShowCommand, bgp, device, eigrp, ospf, rip, static_route,
};
use crate::error::{RegistryError, Result, SpecError};
use crate::executor::{DEFAULT_REJECTION_MARKER, Executor};
use crate::platform::PlatformDefinition;
use crate::registry::{
    CredentialStore, DEFAULT_PROBE_COMMAND, DeviceSummary, MemoryStore, SessionRegistry, UserId,
};
use crate::session::Connector;
use crate::spec::{
    self, Asn, VlanId, parse_ip, parse_mask, parse_neighbors, parse_networks,
    parse_ospf_networks, parse_rip_networks, parse_static_routes, parse_word,
};

/// A validated chat request.
#[derive(Debug)]
pub enum Request {
    /// Store a device credential for the requesting user.
    Register {
        host: String,
        username: String,
        password: SecretString,
    },
    /// List the requesting user's devices.
    List,
    /// Submit configuration lines in configuration mode.
    Configure {
        /// Request name, for logging.
        label: &'static str,
        commands: CommandSequence,
        index: u32,
    },
    /// Run one exec-mode command.
    Show { command: ShowCommand, index: u32 },
}

impl Request {
    /// Build a request from a chat command name and its arguments.
    pub fn from_args(name: &str, args: &[&str]) -> std::result::Result<Self, SpecError> {
        let request = match name {
            "create_connection" => {
                let [host, username, password] = exact(args, "create_connection <ip> <username> <password>")?;
                Request::Register {
                    host: parse_word("host", host)?,
                    username: parse_word("username", username)?,
                    password: SecretString::from(password.to_string()),
                }
            }
            "show_connection" => {
                exact::<0>(args, "show_connection")?;
                Request::List
            }

            "rip" => {
                let ([networks], index) = positional(args, "rip <ip/prefix,...> [device]")?;
                configure("rip", rip::configure(&parse_rip_networks(networks)?), index)
            }
            "remove_rip_nw" => {
                let ([networks], index) = positional(args, "remove_rip_nw <ip/prefix,...> [device]")?;
                configure("remove_rip_nw", rip::remove_networks(&parse_rip_networks(networks)?), index)
            }
            "disable_rip" => {
                let ([], index) = positional(args, "disable_rip [device]")?;
                configure("disable_rip", RoutingProtocol::Rip.disable(), index)
            }
            "show_rip" => {
                let ([], index) = positional(args, "show_rip [device]")?;
                show(RoutingProtocol::Rip.status(), index)
            }

            "ospf" => {
                let ([networks], index) = positional(args, "ospf <ip/prefix/area,...> [device]")?;
                configure("ospf", ospf::configure(&parse_ospf_networks(networks)?), index)
            }
            "remove_ospf_nw" => {
                let ([networks], index) =
                    positional(args, "remove_ospf_nw <ip/prefix/area,...> [device]")?;
                configure(
                    "remove_ospf_nw",
                    ospf::remove_networks(&parse_ospf_networks(networks)?),
                    index,
                )
            }
            "disable_ospf" => {
                let ([], index) = positional(args, "disable_ospf [device]")?;
                configure("disable_ospf", RoutingProtocol::Ospf.disable(), index)
            }
            "show_ospf" => {
                let ([], index) = positional(args, "show_ospf [device]")?;
                show(RoutingProtocol::Ospf.status(), index)
            }

            "eigrp" => {
                let ([asn, networks], index) = positional(args, "eigrp <asn> <ip/prefix,...> [device]")?;
                let asn: Asn = asn.parse()?;
                configure("eigrp", eigrp::configure(&asn, &parse_networks(networks)?), index)
            }
            "remove_eigrp_nw" => {
                let ([asn, networks], index) =
                    positional(args, "remove_eigrp_nw <asn> <ip/prefix,...> [device]")?;
                let asn: Asn = asn.parse()?;
                configure(
                    "remove_eigrp_nw",
                    eigrp::remove_networks(&asn, &parse_networks(networks)?),
                    index,
                )
            }
            "disable_eigrp" => {
                let ([asn], index) = positional(args, "disable_eigrp <asn> [device]")?;
                configure("disable_eigrp", RoutingProtocol::Eigrp(asn.parse()?).disable(), index)
            }
            "show_eigrp" => {
                let ([], index) = positional(args, "show_eigrp [device]")?;
                show(ShowCommand::EigrpNeighbors, index)
            }

            "bgp" => {
                let ([asn, networks, neighbors], index) =
                    positional(args, "bgp <asn> <ip/prefix,...> <ip:remote-as,...> [device]")?;
                let asn: Asn = asn.parse()?;
                let commands =
                    bgp::configure(&asn, &parse_networks(networks)?, &parse_neighbors(neighbors)?);
                configure("bgp", commands, index)
            }
            "remove_bgp_nw" => {
                let ([asn, networks], index) =
                    positional(args, "remove_bgp_nw <asn> <ip/prefix,...> [device]")?;
                let asn: Asn = asn.parse()?;
                configure(
                    "remove_bgp_nw",
                    bgp::remove_networks(&asn, &parse_networks(networks)?),
                    index,
                )
            }
            "remove_bgp_neighbor" => {
                let ([asn, neighbors], index) =
                    positional(args, "remove_bgp_neighbor <asn> <ip:remote-as,...> [device]")?;
                let asn: Asn = asn.parse()?;
                configure(
                    "remove_bgp_neighbor",
                    bgp::remove_neighbors(&asn, &parse_neighbors(neighbors)?),
                    index,
                )
            }
            "disable_bgp" => {
                let ([asn], index) = positional(args, "disable_bgp <asn> [device]")?;
                configure("disable_bgp", RoutingProtocol::Bgp(asn.parse()?).disable(), index)
            }
            "show_bgp" => {
                let ([], index) = positional(args, "show_bgp [device]")?;
                show(ShowCommand::BgpSummary, index)
            }

            "ip_route" => {
                let ([routes], index) = positional(args, "ip_route <ip/prefix/next-hop,...> [device]")?;
                configure("ip_route", static_route::configure(&parse_static_routes(routes)?), index)
            }
            "delete_route" => {
                let ([routes], index) =
                    positional(args, "delete_route <ip/prefix/next-hop,...> [device]")?;
                configure("delete_route", static_route::remove(&parse_static_routes(routes)?), index)
            }
            "show_route" => {
                let ([], index) = positional(args, "show_route [device]")?;
                show(ShowCommand::Route, index)
            }

            "hostname" => {
                let ([name], index) = positional(args, "hostname <name> [device]")?;
                configure("hostname", device::hostname(&parse_word("hostname", name)?), index)
            }
            "banner" => {
                let ([text], index) = positional(args, "banner <text> [device]")?;
                if text.trim().is_empty() {
                    return Err(SpecError::Empty { what: "banner" });
                }
                configure("banner", device::banner(text), index)
            }
            "show_hostname" => {
                let ([], index) = positional(args, "show_hostname [device]")?;
                show(ShowCommand::Hostname, index)
            }
            "show_int" => {
                let ([], index) = positional(args, "show_int [device]")?;
                show(ShowCommand::InterfaceBrief, index)
            }
            "show_vlan" => {
                let ([], index) = positional(args, "show_vlan [device]")?;
                show(ShowCommand::Vlan, index)
            }
            "show_run" => {
                let ([], index) = positional(args, "show_run [device]")?;
                show(ShowCommand::RunningConfig, index)
            }
            "show_run_int" => {
                let ([iface], index) = positional(args, "show_run_int <interface> [device]")?;
                show(ShowCommand::RunningInterface(parse_word("interface", iface)?), index)
            }
            "show_spanning_tree" => {
                let ([], index) = positional(args, "show_spanning_tree [device]")?;
                show(ShowCommand::SpanningTree, index)
            }
            "show_cdp_neighbor" => {
                let ([], index) = positional(args, "show_cdp_neighbor [device]")?;
                show(ShowCommand::CdpNeighbors, index)
            }
            "show_mac_table" => {
                let ([], index) = positional(args, "show_mac_table [device]")?;
                show(ShowCommand::MacTable, index)
            }
            "save_config" => {
                let ([], index) = positional(args, "save_config [device]")?;
                show(ShowCommand::SaveConfig, index)
            }
            "ping" => {
                let ([ip], index) = positional(args, "ping <ip> [device]")?;
                show(ShowCommand::Ping(parse_ip(ip)?), index)
            }

            "create_vlan" => {
                let ([vlan], index) = positional(args, "create_vlan <vlan> [device]")?;
                configure("create_vlan", device::create_vlan(vlan.parse()?), index)
            }
            "delete_vlan" => {
                let ([vlan], index) = positional(args, "delete_vlan <vlan> [device]")?;
                configure("delete_vlan", device::delete_vlan(vlan.parse()?), index)
            }
            "vlan_ip_add" => {
                let ([vlan, ip, mask], index) =
                    positional(args, "vlan_ip_add <vlan> <ip> <mask> [device]")?;
                let vlan: VlanId = vlan.parse()?;
                configure(
                    "vlan_ip_add",
                    device::vlan_address(vlan, parse_ip(ip)?, parse_mask(mask)?),
                    index,
                )
            }
            "vlan_ip_delete" => {
                let ([vlan, ip, mask], index) =
                    positional(args, "vlan_ip_delete <vlan> <ip> <mask> [device]")?;
                let vlan: VlanId = vlan.parse()?;
                configure(
                    "vlan_ip_delete",
                    device::remove_vlan_address(vlan, parse_ip(ip)?, parse_mask(mask)?),
                    index,
                )
            }
            "vlan_no_shut" => {
                let ([vlan], index) = positional(args, "vlan_no_shut <vlan> [device]")?;
                configure("vlan_no_shut", device::vlan_shutdown(vlan.parse()?, false), index)
            }
            "vlan_shut" => {
                let ([vlan], index) = positional(args, "vlan_shut <vlan> [device]")?;
                configure("vlan_shut", device::vlan_shutdown(vlan.parse()?, true), index)
            }

            "int_ip_add" => {
                let ([iface, ip, mask], index) =
                    positional(args, "int_ip_add <interface> <ip> <mask> [device]")?;
                configure(
                    "int_ip_add",
                    device::interface_address(
                        &parse_word("interface", iface)?,
                        parse_ip(ip)?,
                        parse_mask(mask)?,
                    ),
                    index,
                )
            }
            "int_ip_delete" => {
                let ([iface, ip, mask], index) =
                    positional(args, "int_ip_delete <interface> <ip> <mask> [device]")?;
                configure(
                    "int_ip_delete",
                    device::remove_interface_address(
                        &parse_word("interface", iface)?,
                        parse_ip(ip)?,
                        parse_mask(mask)?,
                    ),
                    index,
                )
            }
            "int_ip_gateway_add" => {
                let ([gateway], index) = positional(args, "int_ip_gateway_add <ip> [device]")?;
                configure("int_ip_gateway_add", device::default_gateway(parse_ip(gateway)?), index)
            }
            "delete_gateway" => {
                let ([gateway], index) = positional(args, "delete_gateway <ip> [device]")?;
                configure(
                    "delete_gateway",
                    device::remove_default_gateway(parse_ip(gateway)?),
                    index,
                )
            }
            "int_switch_mode" => {
                let ([iface, mode], index) =
                    positional(args, "int_switch_mode <interface> <access|trunk> [device]")?;
                configure(
                    "int_switch_mode",
                    device::switchport_mode(&parse_word("interface", iface)?, mode.parse()?),
                    index,
                )
            }
            "int_no_shut" => {
                let ([iface], index) = positional(args, "int_no_shut <interface> [device]")?;
                configure(
                    "int_no_shut",
                    device::interface_shutdown(&parse_word("interface", iface)?, false),
                    index,
                )
            }
            "int_shut" => {
                let ([iface], index) = positional(args, "int_shut <interface> [device]")?;
                configure(
                    "int_shut",
                    device::interface_shutdown(&parse_word("interface", iface)?, true),
                    index,
                )
            }
            "router_on_a_stick" => {
                let ([iface, vlan, ip, mask], index) =
                    positional(args, "router_on_a_stick <interface> <vlan> <ip> <mask> [device]")?;
                configure(
                    "router_on_a_stick",
                    device::router_on_a_stick(
                        &parse_word("interface", iface)?,
                        vlan.parse()?,
                        parse_ip(ip)?,
                        parse_mask(mask)?,
                    ),
                    index,
                )
            }

            _ => {
                return Err(SpecError::UnknownCommand {
                    name: name.to_string(),
                });
            }
        };
        Ok(request)
    }

    /// The device this request targets, if any.
    pub fn index(&self) -> Option<u32> {
        match self {
            Request::Configure { index, .. } | Request::Show { index, .. } => Some(*index),
            Request::Register { .. } | Request::List => None,
        }
    }
}

fn configure(label: &'static str, commands: CommandSequence, index: u32) -> Request {
    Request::Configure {
        label,
        commands,
        index,
    }
}

fn show(command: ShowCommand, index: u32) -> Request {
    Request::Show { command, index }
}

/// Exactly `N` arguments.
fn exact<'a, const N: usize>(
    args: &[&'a str],
    usage: &'static str,
) -> std::result::Result<[&'a str; N], SpecError> {
    <[&str; N]>::try_from(args).map_err(|_| SpecError::Usage { usage })
}

/// `N` required arguments plus an optional trailing device index.
fn positional<'a, const N: usize>(
    args: &[&'a str],
    usage: &'static str,
) -> std::result::Result<([&'a str; N], u32), SpecError> {
    let (required, index) = match args.len() {
        n if n == N => (args, None),
        n if n == N + 1 => (&args[..N], Some(args[N])),
        _ => return Err(SpecError::Usage { usage }),
    };
    Ok((exact(required, usage)?, spec::parse_index(index)?))
}

/// Result of a successfully handled request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// A device was stored at `index`.
    Registered { index: u32, host: String },
    /// The user's devices, in registration order.
    Devices(Vec<DeviceSummary>),
    /// Configuration accepted; `output` is the device transcript.
    Applied {
        commands: CommandSequence,
        output: String,
    },
    /// Exec command output.
    Output(String),
    /// Exec command succeeded with nothing to show, e.g. a routing protocol
    /// that has not converged yet.
    Empty,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Registered { index, host } => {
                write!(f, "Registered {host} as device {index}.")
            }
            Report::Devices(devices) if devices.is_empty() => {
                write!(f, "No devices registered.")
            }
            Report::Devices(devices) => {
                for (i, device) in devices.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{}: {}", device.index, device.host)?;
                }
                Ok(())
            }
            Report::Applied { commands, .. } => {
                write!(f, "Applied {} command(s):\n{}", commands.len(), commands)
            }
            Report::Output(output) => write!(f, "{}", output.trim_end()),
            Report::Empty => write!(f, "Nothing to show yet."),
        }
    }
}

/// Relays validated requests to users' devices.
pub struct Relay<C, S = MemoryStore> {
    registry: Arc<SessionRegistry<C, S>>,
    executor: Executor,
    connect_timeout: Duration,
}

impl<C: Connector + 'static, S: CredentialStore + 'static> Relay<C, S> {
    /// Parse a chat command and handle it.
    pub async fn dispatch(&self, user: &UserId, name: &str, args: &[&str]) -> Result<Report> {
        let request = Request::from_args(name, args)?;
        self.handle(user, request).await
    }

    /// Handle one request for `user`.
    ///
    /// Device sessions are opened per request and closed before this
    /// returns, whatever the outcome.
    pub async fn handle(&self, user: &UserId, request: Request) -> Result<Report> {
        match request {
            Request::Register {
                host,
                username,
                password,
            } => {
                // Persisting may block on file I/O; keep it off the async workers.
                let registry = Arc::clone(&self.registry);
                let owner = user.clone();
                let address = host.clone();
                let index = tokio::task::spawn_blocking(move || {
                    registry.register(&owner, address, username, password)
                })
                .await
                .map_err(|_| RegistryError::Poisoned)??;
                Ok(Report::Registered { index, host })
            }

            Request::List => Ok(Report::Devices(self.registry.list(user)?)),

            Request::Configure {
                label,
                commands,
                index,
            } => {
                info!("{} on device {} for {}", label, index, user);
                let guard = self
                    .registry
                    .open(user, Some(index), self.connect_timeout)
                    .await?;
                let output = self.executor.configure(guard, &commands).await?.into_result()?;
                Ok(Report::Applied { commands, output })
            }

            Request::Show { command, index } => {
                info!("'{}' on device {} for {}", command, index, user);
                let guard = self
                    .registry
                    .open(user, Some(index), self.connect_timeout)
                    .await?;
                let outcome = self.executor.show(guard, &command).await?;
                if outcome.is_empty() {
                    return Ok(Report::Empty);
                }
                Ok(Report::Output(outcome.into_result()?))
            }
        }
    }

    pub fn registry(&self) -> &SessionRegistry<C, S> {
        &self.registry
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }
}

impl<C, S> fmt::Debug for Relay<C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relay")
            .field("registry", &self.registry)
            .field("executor", &self.executor)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

/// Builder for [`Relay`].
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use netrelay::registry::JsonFileStore;
/// use netrelay::relay::RelayBuilder;
/// use netrelay::transport::SshConnector;
///
/// # fn example() -> Result<(), netrelay::Error> {
/// let relay = RelayBuilder::new()
///     .connect_timeout(Duration::from_secs(10))
///     .rejection_markers(["Invalid", "% Incomplete"])
///     .build(SshConnector::new(), JsonFileStore::new("devices.json"))?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RelayBuilder {
    connect_timeout: Duration,
    command_timeout: Duration,
    probe_command: String,
    markers: Vec<String>,
}

impl Default for RelayBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayBuilder {
    pub fn new() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            command_timeout: Duration::from_secs(60),
            probe_command: DEFAULT_PROBE_COMMAND.to_string(),
            markers: vec![DEFAULT_REJECTION_MARKER.to_string()],
        }
    }

    /// Bound for connecting and for the liveness probe (default: 30s).
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Bound for running a request's commands (default: 60s).
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Command sent after connecting (default: `show ip int brief`).
    pub fn probe_command(mut self, command: impl Into<String>) -> Self {
        self.probe_command = command.into();
        self
    }

    /// Response text that marks a command as rejected (default: `Invalid`).
    pub fn rejection_markers<I, M>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        self.markers = markers.into_iter().map(Into::into).collect();
        self
    }

    /// Use the rejection markers of a vendor profile.
    pub fn platform(self, platform: &PlatformDefinition) -> Self {
        self.rejection_markers(platform.failed_when_contains.iter().cloned())
    }

    /// Load the registry from `store` and build the relay.
    pub fn build<C: Connector, S: CredentialStore>(
        self,
        connector: C,
        store: S,
    ) -> Result<Relay<C, S>> {
        let registry =
            SessionRegistry::new(connector, store)?.with_probe_command(self.probe_command);
        let executor = Executor::new(self.command_timeout).with_markers(self.markers);
        Ok(Relay {
            registry: Arc::new(registry),
            executor,
            connect_timeout: self.connect_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::{assert_err, assert_ok};

    use super::*;
    use crate::error::{Error, ErrorKind};
    use crate::session::mock::MockConnector;

    const PROBE: &str = "Interface   IP-Address   OK? Method Status   Protocol\n\
                         Gi0/0       10.0.0.1     YES manual up       up\n";
    const IOS_INVALID: &str = "R1(config)#router eigrp 65000\n\
                               R1(config-router)#netwrk 10.0.0.0\n\
                               % Invalid input detected at '^' marker.\n";

    fn commands(request: Request) -> Vec<String> {
        match request {
            Request::Configure { commands, .. } => commands.into_vec(),
            other => panic!("expected a configure request, got {other:?}"),
        }
    }

    fn relay(connector: &MockConnector) -> Relay<MockConnector> {
        RelayBuilder::new()
            .connect_timeout(Duration::from_secs(5))
            .command_timeout(Duration::from_secs(5))
            .build(connector.clone(), MemoryStore::new())
            .unwrap()
    }

    async fn registered(connector: &MockConnector) -> (Relay<MockConnector>, UserId) {
        let relay = relay(connector);
        let user = UserId::from(42u64);
        assert_ok!(
            relay
                .dispatch(&user, "create_connection", &["10.0.0.1", "admin", "cisco"])
                .await
        );
        (relay, user)
    }

    #[test]
    fn test_builder_markers() {
        let connector = MockConnector::new(PROBE);
        let platform = crate::platform::cisco_ios().with_failure_pattern("% Incomplete");
        let relay = RelayBuilder::new()
            .platform(&platform)
            .build(connector, MemoryStore::new())
            .unwrap();
        assert_eq!(relay.executor().markers(), ["Invalid", "% Incomplete"]);
        assert_eq!(relay.executor().timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_eigrp_request() {
        let request =
            Request::from_args("eigrp", &["65000", "10.0.0.0/24,192.168.1.0/30"]).unwrap();
        assert_eq!(request.index(), Some(1));
        assert_eq!(
            commands(request),
            vec![
                "router eigrp 65000",
                "network 10.0.0.0 0.0.0.255",
                "network 192.168.1.0 0.0.0.3",
            ]
        );
    }

    #[test]
    fn test_ospf_request() {
        let request = Request::from_args("ospf", &["10.0.0.0/24/0"]).unwrap();
        assert_eq!(
            commands(request),
            vec!["router ospf 1", "network 10.0.0.0 0.0.0.255 area 0"]
        );
    }

    #[test]
    fn test_bgp_request() {
        let request =
            Request::from_args("bgp", &["65000", "10.0.0.0/24", "192.168.1.1:65001"]).unwrap();
        assert_eq!(
            commands(request),
            vec![
                "router bgp 65000",
                "network 10.0.0.0 mask 255.255.255.0",
                "neighbor 192.168.1.1 remote-as 65001",
            ]
        );
    }

    #[test]
    fn test_trailing_device_index() {
        let request = Request::from_args("show_route", &["2"]).unwrap();
        assert_eq!(request.index(), Some(2));
        assert!(matches!(
            request,
            Request::Show {
                command: ShowCommand::Route,
                ..
            }
        ));

        let request = Request::from_args("rip", &["10.0.0.0/8", "3"]).unwrap();
        assert_eq!(request.index(), Some(3));

        let err = Request::from_args("show_route", &["0"]).unwrap_err();
        assert!(matches!(err, SpecError::InvalidIndex { .. }));
    }

    #[test]
    fn test_argument_count() {
        assert!(matches!(
            Request::from_args("eigrp", &["65000"]),
            Err(SpecError::Usage { .. })
        ));
        assert!(matches!(
            Request::from_args("disable_rip", &["1", "2"]),
            Err(SpecError::Usage { .. })
        ));
        assert!(matches!(
            Request::from_args("show_connection", &["1"]),
            Err(SpecError::Usage { .. })
        ));
        assert!(matches!(
            Request::from_args("create_connection", &["10.0.0.1", "admin"]),
            Err(SpecError::Usage { .. })
        ));
    }

    #[test]
    fn test_unknown_command() {
        let err = Request::from_args("reload", &[]).unwrap_err();
        assert_eq!(
            err,
            SpecError::UnknownCommand {
                name: "reload".into()
            }
        );
    }

    #[test]
    fn test_device_requests() {
        assert_eq!(
            commands(
                Request::from_args(
                    "router_on_a_stick",
                    &["Gi0/0", "10", "10.0.10.1", "255.255.255.0"]
                )
                .unwrap()
            ),
            vec![
                "interface Gi0/0.10",
                "encapsulation dot1Q 10",
                "ip address 10.0.10.1 255.255.255.0",
            ]
        );
        assert_eq!(
            commands(Request::from_args("int_shut", &["Gi0/1", "2"]).unwrap()),
            vec!["interface Gi0/1", "shutdown"]
        );
        assert_eq!(
            commands(Request::from_args("delete_gateway", &["10.0.0.254"]).unwrap()),
            vec!["no ip default-gateway 10.0.0.254"]
        );
        assert!(Request::from_args("int_ip_add", &["Gi0/0", "10.0.0.1", "255.0.255.0"]).is_err());
        assert!(Request::from_args("create_vlan", &["4095"]).is_err());
        assert!(Request::from_args("int_switch_mode", &["Gi0/2", "hybrid"]).is_err());
    }

    #[tokio::test]
    async fn test_slow_store_does_not_stall_runtime() {
        use std::time::Instant;

        use crate::error::StoreError;
        use crate::registry::StoredDevice;

        struct SlowStore;

        impl CredentialStore for SlowStore {
            fn load(&self) -> std::result::Result<Vec<StoredDevice>, StoreError> {
                Ok(Vec::new())
            }

            fn save(&self, _: &[StoredDevice]) -> std::result::Result<(), StoreError> {
                std::thread::sleep(Duration::from_millis(300));
                Ok(())
            }
        }

        let relay = RelayBuilder::new()
            .build(MockConnector::new(PROBE), SlowStore)
            .unwrap();
        let user = UserId::from("alice");
        let start = Instant::now();

        let (registered, ticked) = tokio::join!(
            relay.dispatch(&user, "create_connection", &["10.0.0.1", "admin", "cisco"]),
            async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                start.elapsed()
            }
        );

        assert_eq!(
            assert_ok!(registered),
            Report::Registered {
                index: 1,
                host: "10.0.0.1".into()
            }
        );
        // The timer fired while the save was still sleeping.
        assert!(ticked < Duration::from_millis(250), "{ticked:?}");
    }

    #[tokio::test]
    async fn test_register_and_list() {
        let connector = MockConnector::new(PROBE);
        let (relay, user) = registered(&connector).await;

        let report = assert_ok!(
            relay
                .dispatch(&user, "create_connection", &["10.0.0.2", "admin", "cisco"])
                .await
        );
        assert_eq!(
            report,
            Report::Registered {
                index: 2,
                host: "10.0.0.2".into()
            }
        );

        let report = assert_ok!(relay.dispatch(&user, "show_connection", &[]).await);
        assert_eq!(report.to_string(), "1: 10.0.0.1\n2: 10.0.0.2");
        // Registration never touches the device.
        assert_eq!(connector.opens(), 0);
    }

    #[tokio::test]
    async fn test_configure_end_to_end() {
        let connector = MockConnector::new(PROBE).reply(PROBE).reply("R1(config-router)#");
        let (relay, user) = registered(&connector).await;

        let report = assert_ok!(
            relay
                .dispatch(&user, "eigrp", &["65000", "10.0.0.0/24,192.168.1.0/30"])
                .await
        );
        assert!(matches!(report, Report::Applied { ref commands, .. } if commands.len() == 3));

        let t = connector.transcript.lock().unwrap();
        assert_eq!(t.runs, vec![DEFAULT_PROBE_COMMAND]);
        assert_eq!(
            t.batches,
            vec![vec![
                "router eigrp 65000".to_string(),
                "network 10.0.0.0 0.0.0.255".to_string(),
                "network 192.168.1.0 0.0.0.3".to_string(),
            ]]
        );
        assert_eq!(t.opens, 1);
        assert_eq!(t.closes, 1);
    }

    #[tokio::test]
    async fn test_rejected_configuration() {
        let connector = MockConnector::new(PROBE).reply(PROBE).reply(IOS_INVALID);
        let (relay, user) = registered(&connector).await;

        let err = assert_err!(relay.dispatch(&user, "eigrp", &["65000", "10.0.0.0/8"]).await);
        assert_eq!(err.kind(), ErrorKind::Rejected);
        assert!(matches!(err, Error::Rejected { ref output } if output.contains("% Invalid")));
        assert_eq!(connector.closes(), 1);
    }

    #[tokio::test]
    async fn test_empty_show_is_reported_distinctly() {
        let connector = MockConnector::new(PROBE).reply(PROBE).reply("");
        let (relay, user) = registered(&connector).await;

        let report = assert_ok!(relay.dispatch(&user, "show_bgp", &[]).await);
        assert_eq!(report, Report::Empty);
        assert_eq!(
            connector.transcript.lock().unwrap().runs,
            vec![DEFAULT_PROBE_COMMAND, "show ip bgp summary"]
        );
    }

    #[tokio::test]
    async fn test_show_output() {
        let connector = MockConnector::new(PROBE)
            .reply(PROBE)
            .reply("Gateway of last resort is not set\n");
        let (relay, user) = registered(&connector).await;

        let report = assert_ok!(relay.dispatch(&user, "show_route", &["1"]).await);
        assert_eq!(
            report,
            Report::Output("Gateway of last resort is not set\n".into())
        );
    }

    #[tokio::test]
    async fn test_invalid_spec_does_no_io() {
        let connector = MockConnector::new(PROBE);
        let (relay, user) = registered(&connector).await;

        let err = assert_err!(relay.dispatch(&user, "eigrp", &["65000", "10.0.0.0/33"]).await);
        assert_eq!(err.kind(), ErrorKind::InvalidSpec);
        assert_eq!(connector.opens(), 0);
    }

    #[tokio::test]
    async fn test_unregistered_user() {
        let connector = MockConnector::new(PROBE);
        let relay = relay(&connector);

        let err = assert_err!(relay.dispatch(&UserId::from("bob"), "show_route", &[]).await);
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.user_message().contains("haven't registered"));
        assert_eq!(connector.opens(), 0);
    }

    #[tokio::test]
    async fn test_missing_index() {
        let connector = MockConnector::new(PROBE);
        let (relay, user) = registered(&connector).await;

        let err = assert_err!(relay.dispatch(&user, "show_route", &["3"]).await);
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.user_message().contains("doesn't exist"));
    }

    #[tokio::test]
    async fn test_dead_device() {
        let connector = MockConnector::new("");
        let (relay, user) = registered(&connector).await;

        let err = assert_err!(relay.dispatch(&user, "show_run", &[]).await);
        assert_eq!(err.kind(), ErrorKind::ConnectFailed);
        assert_eq!(connector.closes(), 1);
    }
}
