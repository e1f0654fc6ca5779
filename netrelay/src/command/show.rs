//! Read-only and exec-mode commands, run outside configuration mode.

use std::fmt;
use std::net::Ipv4Addr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShowCommand {
    Route,
    RunningConfig,
    RunningInterface(String),
    InterfaceBrief,
    Vlan,
    SpanningTree,
    CdpNeighbors,
    MacTable,
    Hostname,
    RipDatabase,
    OspfNeighbors,
    EigrpNeighbors,
    BgpSummary,
    Ping(Ipv4Addr),
    SaveConfig,
}

impl ShowCommand {
    /// The CLI line to submit.
    pub fn command(&self) -> String {
        match self {
            ShowCommand::Route => "show ip route".into(),
            ShowCommand::RunningConfig => "show running-config".into(),
            ShowCommand::RunningInterface(iface) => {
                format!("show running-config interface {iface}")
            }
            ShowCommand::InterfaceBrief => "show ip interface brief".into(),
            ShowCommand::Vlan => "show vlan brief".into(),
            ShowCommand::SpanningTree => "show spanning-tree".into(),
            ShowCommand::CdpNeighbors => "show cdp neighbors".into(),
            ShowCommand::MacTable => "show mac address-table".into(),
            ShowCommand::Hostname => "show running-config | include hostname".into(),
            ShowCommand::RipDatabase => "show ip rip database".into(),
            ShowCommand::OspfNeighbors => "show ip ospf neighbor".into(),
            ShowCommand::EigrpNeighbors => "show ip eigrp neighbors".into(),
            ShowCommand::BgpSummary => "show ip bgp summary".into(),
            ShowCommand::Ping(ip) => format!("ping {ip}"),
            ShowCommand::SaveConfig => "write memory".into(),
        }
    }
}

impl fmt::Display for ShowCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command())
    }
}
