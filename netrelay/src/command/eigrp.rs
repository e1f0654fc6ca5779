//! EIGRP. Network statements carry a wildcard mask.

use super::{CommandSequence, negate};
use crate::spec::{Asn, Network};

pub fn configure(asn: &Asn, networks: &[Network]) -> CommandSequence {
    let mut commands = CommandSequence::new().with(router(asn));
    commands.extend(networks.iter().map(network_line));
    commands
}

pub fn remove_networks(asn: &Asn, networks: &[Network]) -> CommandSequence {
    let mut commands = CommandSequence::new().with(router(asn));
    commands.extend(networks.iter().map(|n| negate(&network_line(n))));
    commands
}

pub fn disable(asn: &Asn) -> CommandSequence {
    CommandSequence::new().with(negate(&router(asn)))
}

fn router(asn: &Asn) -> String {
    format!("router eigrp {asn}")
}

fn network_line(network: &Network) -> String {
    format!(
        "network {} {}",
        network.address,
        network.prefix.wildcard_mask()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::parse_networks;

    #[test]
    fn test_configure() {
        let asn: Asn = "65000".parse().unwrap();
        let nets = parse_networks("10.0.0.0/24,192.168.1.0/30").unwrap();
        assert_eq!(
            configure(&asn, &nets).into_vec(),
            [
                "router eigrp 65000",
                "network 10.0.0.0 0.0.0.255",
                "network 192.168.1.0 0.0.0.3",
            ]
        );
    }

    #[test]
    fn test_remove_and_disable() {
        let asn: Asn = "100".parse().unwrap();
        let nets = parse_networks("10.0.0.0/8").unwrap();
        assert_eq!(
            remove_networks(&asn, &nets).into_vec(),
            ["router eigrp 100", "no network 10.0.0.0 0.255.255.255"]
        );
        assert_eq!(disable(&asn).into_vec(), ["no router eigrp 100"]);
    }
}
