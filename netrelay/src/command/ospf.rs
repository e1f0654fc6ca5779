//! OSPF, single process.

use super::{CommandSequence, negate};
use crate::spec::OspfNetwork;

/// Process id used for every OSPF instance the relay creates.
pub const PROCESS_ID: u32 = 1;

/// Enter `router ospf 1`, then one `network <ip> <wildcard> area <n>` per entry.
pub fn configure(networks: &[OspfNetwork]) -> CommandSequence {
    let mut commands = CommandSequence::new().with(router());
    commands.extend(networks.iter().map(network_line));
    commands
}

pub fn remove_networks(networks: &[OspfNetwork]) -> CommandSequence {
    let mut commands = CommandSequence::new().with(router());
    commands.extend(networks.iter().map(|n| negate(&network_line(n))));
    commands
}

/// `no router ospf`, without a process id.
pub fn disable() -> CommandSequence {
    CommandSequence::new().with("no router ospf")
}

fn router() -> String {
    format!("router ospf {PROCESS_ID}")
}

fn network_line(network: &OspfNetwork) -> String {
    format!(
        "network {} {} area {}",
        network.address,
        network.prefix.wildcard_mask(),
        network.area
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::parse_ospf_networks;

    #[test]
    fn test_configure() {
        let nets = parse_ospf_networks("10.0.0.0/24/0").unwrap();
        assert_eq!(
            configure(&nets).into_vec(),
            ["router ospf 1", "network 10.0.0.0 0.0.0.255 area 0"]
        );
    }

    #[test]
    fn test_remove() {
        let nets = parse_ospf_networks("10.0.0.0/24/0,172.16.0.0/12/1").unwrap();
        assert_eq!(
            remove_networks(&nets).into_vec(),
            [
                "router ospf 1",
                "no network 10.0.0.0 0.0.0.255 area 0",
                "no network 172.16.0.0 0.15.255.255 area 1",
            ]
        );
    }
}
