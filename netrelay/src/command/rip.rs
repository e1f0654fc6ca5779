//! RIP version 2.

use super::{CommandSequence, negate};
use crate::spec::RipNetwork;

const ROUTER: &str = "router rip";

/// Enter RIP, force version 2 without auto-summary, then one `network`
/// line per entry.
pub fn configure(networks: &[RipNetwork]) -> CommandSequence {
    let mut commands = CommandSequence::new()
        .with(ROUTER)
        .with("version 2")
        .with("no auto-summary");
    commands.extend(networks.iter().map(network_line));
    commands
}

/// Withdraw networks from RIP.
pub fn remove_networks(networks: &[RipNetwork]) -> CommandSequence {
    let mut commands = CommandSequence::new().with(ROUTER);
    commands.extend(networks.iter().map(|n| negate(&network_line(n))));
    commands
}

pub fn disable() -> CommandSequence {
    CommandSequence::new().with(negate(ROUTER))
}

fn network_line(network: &RipNetwork) -> String {
    format!("network {}", network.address)
}
