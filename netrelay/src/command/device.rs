//! Device-level configuration: hostname, interfaces, VLANs, gateway.
//!
//! Interface and hostname arguments are validated with
//! [`parse_word`](crate::spec::parse_word) before they reach these functions.

use std::net::Ipv4Addr;
use std::str::FromStr;

use super::{CommandSequence, negate};
use crate::error::SpecError;
use crate::spec::VlanId;

/// Layer 2 port mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchportMode {
    Access,
    Trunk,
}

impl FromStr for SwitchportMode {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "access" => Ok(SwitchportMode::Access),
            "trunk" => Ok(SwitchportMode::Trunk),
            _ => Err(SpecError::InvalidValue {
                what: "switchport mode (access|trunk)",
                token: s.to_string(),
            }),
        }
    }
}

impl SwitchportMode {
    fn as_str(self) -> &'static str {
        match self {
            SwitchportMode::Access => "access",
            SwitchportMode::Trunk => "trunk",
        }
    }
}

pub fn hostname(name: &str) -> CommandSequence {
    CommandSequence::new().with(format!("hostname {name}"))
}

/// Message-of-the-day banner, `#`-delimited. `#` in the text is dropped.
pub fn banner(text: &str) -> CommandSequence {
    let text: String = text.chars().filter(|&c| c != '#').collect();
    CommandSequence::new().with(format!("banner motd #{text}#"))
}

pub fn interface_address(interface: &str, ip: Ipv4Addr, mask: Ipv4Addr) -> CommandSequence {
    CommandSequence::new()
        .with(format!("interface {interface}"))
        .with(format!("ip address {ip} {mask}"))
}

pub fn remove_interface_address(
    interface: &str,
    ip: Ipv4Addr,
    mask: Ipv4Addr,
) -> CommandSequence {
    CommandSequence::new()
        .with(format!("interface {interface}"))
        .with(negate(&format!("ip address {ip} {mask}")))
}

/// `shutdown` when `shut`, `no shutdown` otherwise.
pub fn interface_shutdown(interface: &str, shut: bool) -> CommandSequence {
    CommandSequence::new()
        .with(format!("interface {interface}"))
        .with(shutdown_line(shut))
}

pub fn switchport_mode(interface: &str, mode: SwitchportMode) -> CommandSequence {
    CommandSequence::new()
        .with(format!("interface {interface}"))
        .with(format!("switchport mode {}", mode.as_str()))
}

pub fn create_vlan(vlan: VlanId) -> CommandSequence {
    CommandSequence::new().with(format!("vlan {vlan}"))
}

pub fn delete_vlan(vlan: VlanId) -> CommandSequence {
    CommandSequence::new().with(negate(&format!("vlan {vlan}")))
}

pub fn vlan_address(vlan: VlanId, ip: Ipv4Addr, mask: Ipv4Addr) -> CommandSequence {
    interface_address(&format!("vlan {vlan}"), ip, mask)
}

pub fn remove_vlan_address(vlan: VlanId, ip: Ipv4Addr, mask: Ipv4Addr) -> CommandSequence {
    remove_interface_address(&format!("vlan {vlan}"), ip, mask)
}

pub fn vlan_shutdown(vlan: VlanId, shut: bool) -> CommandSequence {
    interface_shutdown(&format!("vlan {vlan}"), shut)
}

pub fn default_gateway(gateway: Ipv4Addr) -> CommandSequence {
    CommandSequence::new().with(format!("ip default-gateway {gateway}"))
}

pub fn remove_default_gateway(gateway: Ipv4Addr) -> CommandSequence {
    CommandSequence::new().with(negate(&format!("ip default-gateway {gateway}")))
}

/// 802.1Q sub-interface `<interface>.<vlan>` for inter-VLAN routing.
pub fn router_on_a_stick(
    interface: &str,
    vlan: VlanId,
    ip: Ipv4Addr,
    mask: Ipv4Addr,
) -> CommandSequence {
    CommandSequence::new()
        .with(format!("interface {interface}.{vlan}"))
        .with(format!("encapsulation dot1Q {vlan}"))
        .with(format!("ip address {ip} {mask}"))
}

fn shutdown_line(shut: bool) -> &'static str {
    if shut { "shutdown" } else { "no shutdown" }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IP: Ipv4Addr = Ipv4Addr::new(192, 168, 10, 1);
    const MASK: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 0);

    fn vlan(id: &str) -> VlanId {
        id.parse().unwrap()
    }

    #[test]
    fn test_interface_address() {
        assert_eq!(
            interface_address("GigabitEthernet0/1", IP, MASK).into_vec(),
            ["interface GigabitEthernet0/1", "ip address 192.168.10.1 255.255.255.0"]
        );
        assert_eq!(
            remove_interface_address("Gi0/1", IP, MASK).into_vec(),
            ["interface Gi0/1", "no ip address 192.168.10.1 255.255.255.0"]
        );
    }

    #[test]
    fn test_vlan_commands() {
        assert_eq!(create_vlan(vlan("10")).into_vec(), ["vlan 10"]);
        assert_eq!(delete_vlan(vlan("10")).into_vec(), ["no vlan 10"]);
        assert_eq!(
            vlan_shutdown(vlan("20"), false).into_vec(),
            ["interface vlan 20", "no shutdown"]
        );
        assert_eq!(
            vlan_address(vlan("20"), IP, MASK).into_vec(),
            ["interface vlan 20", "ip address 192.168.10.1 255.255.255.0"]
        );
    }

    #[test]
    fn test_router_on_a_stick() {
        assert_eq!(
            router_on_a_stick("Gi0/0", vlan("10"), IP, MASK).into_vec(),
            [
                "interface Gi0/0.10",
                "encapsulation dot1Q 10",
                "ip address 192.168.10.1 255.255.255.0",
            ]
        );
    }

    #[test]
    fn test_misc() {
        assert_eq!(hostname("R1").into_vec(), ["hostname R1"]);
        assert_eq!(
            banner("Authorized # only").into_vec(),
            ["banner motd #Authorized  only#"]
        );
        assert_eq!(
            switchport_mode("Fa0/1", "TRUNK".parse().unwrap()).into_vec(),
            ["interface Fa0/1", "switchport mode trunk"]
        );
        assert!("hybrid".parse::<SwitchportMode>().is_err());
        assert_eq!(
            interface_shutdown("Fa0/1", true).into_vec(),
            ["interface Fa0/1", "shutdown"]
        );
        assert_eq!(
            default_gateway(IP).into_vec(),
            ["ip default-gateway 192.168.10.1"]
        );
        assert_eq!(
            remove_default_gateway(IP).into_vec(),
            ["no ip default-gateway 192.168.10.1"]
        );
    }
}
