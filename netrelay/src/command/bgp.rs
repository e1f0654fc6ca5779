//! BGP. Network statements carry a subnet mask (`mask` keyword); neighbor
//! statements follow all network statements.

use super::{CommandSequence, negate};
use crate::spec::{Asn, Neighbor, Network};

pub fn configure(asn: &Asn, networks: &[Network], neighbors: &[Neighbor]) -> CommandSequence {
    let mut commands = CommandSequence::new().with(router(asn));
    commands.extend(networks.iter().map(network_line));
    commands.extend(neighbors.iter().map(neighbor_line));
    commands
}

pub fn remove_networks(asn: &Asn, networks: &[Network]) -> CommandSequence {
    let mut commands = CommandSequence::new().with(router(asn));
    commands.extend(networks.iter().map(|n| negate(&network_line(n))));
    commands
}

pub fn remove_neighbors(asn: &Asn, neighbors: &[Neighbor]) -> CommandSequence {
    let mut commands = CommandSequence::new().with(router(asn));
    commands.extend(neighbors.iter().map(|n| negate(&neighbor_line(n))));
    commands
}

pub fn disable(asn: &Asn) -> CommandSequence {
    CommandSequence::new().with(negate(&router(asn)))
}

fn router(asn: &Asn) -> String {
    format!("router bgp {asn}")
}

fn network_line(network: &Network) -> String {
    format!(
        "network {} mask {}",
        network.address,
        network.prefix.subnet_mask()
    )
}

fn neighbor_line(neighbor: &Neighbor) -> String {
    format!("neighbor {} remote-as {}", neighbor.address, neighbor.remote_as)
}
