//! Parsers for the compact argument grammars used by chat commands.
//!
//! | Type             | Grammar                         | Example                       |
//! |------------------|---------------------------------|-------------------------------|
//! | [`Network`]      | `ip/prefix,...`                 | `10.0.0.0/24,192.168.1.0/30`  |
//! | [`RipNetwork`]   | `ip[/prefix],...`               | `10.0.0.0,172.16.0.0`         |
//! | [`OspfNetwork`]  | `ip/prefix/area,...`            | `10.0.0.0/24/0`               |
//! | [`Neighbor`]     | `ip:as,...`                     | `192.168.1.1:65001`           |
//! | [`StaticRoute`]  | `ip/prefix/next-hop,...`        | `10.1.0.0/16/192.168.1.254`   |
//!
//! Every parser fails fast with a [`SpecError`] naming the offending entry,
//! so no command is generated from malformed input.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::SpecError;
use crate::mask::PrefixLength;

/// Network address plus prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Network {
    pub address: Ipv4Addr,
    pub prefix: PrefixLength,
}

/// RIP network statement; the prefix, if given, is ignored (RIP is classful here).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RipNetwork {
    pub address: Ipv4Addr,
}

/// OSPF network statement with its area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OspfNetwork {
    pub address: Ipv4Addr,
    pub prefix: PrefixLength,
    pub area: OspfArea,
}

/// BGP neighbor and its remote AS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighbor {
    pub address: Ipv4Addr,
    pub remote_as: Asn,
}

/// Static route to `destination/prefix` via `next_hop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticRoute {
    pub destination: Ipv4Addr,
    pub prefix: PrefixLength,
    pub next_hop: Ipv4Addr,
}

/// Autonomous system number, as plain (`65000`) or asdot (`1.10`) notation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Asn(String);

impl Asn {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Asn {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || SpecError::InvalidAsn {
            token: s.to_string(),
        };
        let valid = match s.split_once('.') {
            Some((high, low)) => high.parse::<u16>().is_ok() && low.parse::<u16>().is_ok(),
            None => s.parse::<u32>().is_ok(),
        };
        if valid && s.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
            Ok(Self(s.to_string()))
        } else {
            Err(invalid())
        }
    }
}

impl fmt::Display for Asn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// OSPF area id: decimal (`0`) or dotted-quad (`0.0.0.0`), kept as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OspfArea(String);

impl OspfArea {
    fn parse(token: &str, position: usize) -> Result<Self, SpecError> {
        if token.parse::<u32>().is_ok() || token.parse::<Ipv4Addr>().is_ok() {
            Ok(Self(token.to_string()))
        } else {
            Err(SpecError::InvalidArea {
                token: token.to_string(),
                position,
            })
        }
    }
}

impl fmt::Display for OspfArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// VLAN id in `1..=4094`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VlanId(u16);

impl VlanId {
    pub fn get(self) -> u16 {
        self.0
    }
}

impl FromStr for VlanId {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<u16>() {
            Ok(id) if (1..=4094).contains(&id) => Ok(Self(id)),
            _ => Err(SpecError::InvalidValue {
                what: "VLAN id",
                token: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for VlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parse `ip/prefix,...`.
pub fn parse_networks(input: &str) -> Result<Vec<Network>, SpecError> {
    parse_list(input, "networks", |entry, position| {
        let [address, prefix] = fields(entry, '/', position, "ip/prefix")?;
        Ok(Network {
            address: parse_address(address, position)?,
            prefix: parse_prefix(prefix, position)?,
        })
    })
}

/// Parse `ip[/prefix],...`.
pub fn parse_rip_networks(input: &str) -> Result<Vec<RipNetwork>, SpecError> {
    parse_list(input, "networks", |entry, position| {
        let address = match entry.split_once('/') {
            Some((address, prefix)) => {
                parse_prefix(prefix, position)?;
                address
            }
            None => entry,
        };
        Ok(RipNetwork {
            address: parse_address(address, position)?,
        })
    })
}

/// Parse `ip/prefix/area,...`.
pub fn parse_ospf_networks(input: &str) -> Result<Vec<OspfNetwork>, SpecError> {
    parse_list(input, "networks", |entry, position| {
        let [address, prefix, area] = fields(entry, '/', position, "ip/prefix/area")?;
        Ok(OspfNetwork {
            address: parse_address(address, position)?,
            prefix: parse_prefix(prefix, position)?,
            area: OspfArea::parse(area, position)?,
        })
    })
}

/// Parse `ip:as,...`.
pub fn parse_neighbors(input: &str) -> Result<Vec<Neighbor>, SpecError> {
    parse_list(input, "neighbors", |entry, position| {
        let [address, remote_as] = fields(entry, ':', position, "ip:as")?;
        Ok(Neighbor {
            address: parse_address(address, position)?,
            remote_as: remote_as.parse()?,
        })
    })
}

/// Parse `ip/prefix/next-hop,...`.
pub fn parse_static_routes(input: &str) -> Result<Vec<StaticRoute>, SpecError> {
    parse_list(input, "routes", |entry, position| {
        let [destination, prefix, next_hop] =
            fields(entry, '/', position, "ip/prefix/next-hop")?;
        Ok(StaticRoute {
            destination: parse_address(destination, position)?,
            prefix: parse_prefix(prefix, position)?,
            next_hop: parse_address(next_hop, position)?,
        })
    })
}

/// Parse an optional 1-based device index; `None` selects device 1.
pub fn parse_index(token: Option<&str>) -> Result<u32, SpecError> {
    let Some(token) = token else {
        return Ok(1);
    };
    match token.trim().parse::<u32>() {
        Ok(index) if index >= 1 => Ok(index),
        _ => Err(SpecError::InvalidIndex {
            token: token.to_string(),
        }),
    }
}

/// Parse a single IPv4 address argument.
pub fn parse_ip(token: &str) -> Result<Ipv4Addr, SpecError> {
    parse_address(token, 1)
}

/// Parse a dotted-quad subnet mask argument; it must be contiguous.
pub fn parse_mask(token: &str) -> Result<Ipv4Addr, SpecError> {
    let mask = token
        .trim()
        .parse::<Ipv4Addr>()
        .map_err(|_| SpecError::InvalidMask {
            token: token.to_string(),
        })?;
    PrefixLength::from_mask(mask)?;
    Ok(mask)
}

/// Parse a single CLI word (interface name, hostname): non-empty, no
/// whitespace or control characters, so it can't smuggle extra tokens.
pub fn parse_word(what: &'static str, token: &str) -> Result<String, SpecError> {
    if token.is_empty() || token.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(SpecError::InvalidValue {
            what,
            token: token.to_string(),
        });
    }
    Ok(token.to_string())
}

fn parse_list<T>(
    input: &str,
    what: &'static str,
    parse_entry: impl Fn(&str, usize) -> Result<T, SpecError>,
) -> Result<Vec<T>, SpecError> {
    if input.trim().is_empty() {
        return Err(SpecError::Empty { what });
    }
    input
        .split(',')
        .enumerate()
        .map(|(i, entry)| parse_entry(entry.trim(), i + 1))
        .collect()
}

fn fields<'a, const N: usize>(
    entry: &'a str,
    delimiter: char,
    position: usize,
    expected: &'static str,
) -> Result<[&'a str; N], SpecError> {
    let parts: Vec<&str> = entry.split(delimiter).map(str::trim).collect();
    parts.try_into().map_err(|_| SpecError::FieldCount {
        token: entry.to_string(),
        position,
        expected,
    })
}

fn parse_address(token: &str, position: usize) -> Result<Ipv4Addr, SpecError> {
    token
        .trim()
        .parse()
        .map_err(|_| SpecError::InvalidAddress {
            token: token.to_string(),
            position,
        })
}

fn parse_prefix(token: &str, position: usize) -> Result<PrefixLength, SpecError> {
    let invalid = || SpecError::InvalidPrefix {
        token: token.to_string(),
        position,
    };
    let len = token.trim().parse::<u8>().map_err(|_| invalid())?;
    PrefixLength::new(len).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_networks() {
        let nets = parse_networks("10.0.0.0/24, 192.168.1.0/30").unwrap();
        assert_eq!(nets.len(), 2);
        assert_eq!(nets[0].address, Ipv4Addr::new(10, 0, 0, 0));
        assert_eq!(nets[0].prefix.get(), 24);
        assert_eq!(nets[1].prefix.get(), 30);
    }

    #[test]
    fn test_parse_networks_errors_name_the_entry() {
        assert_eq!(
            parse_networks("10.0.0.0/24,192.168.1.0"),
            Err(SpecError::FieldCount {
                token: "192.168.1.0".into(),
                position: 2,
                expected: "ip/prefix",
            })
        );
        assert_eq!(
            parse_networks("10.0.0.0/abc"),
            Err(SpecError::InvalidPrefix {
                token: "abc".into(),
                position: 1,
            })
        );
        assert_eq!(
            parse_networks("10.0.0.0/33"),
            Err(SpecError::InvalidPrefix {
                token: "33".into(),
                position: 1,
            })
        );
        assert_eq!(
            parse_networks("10.0.0/24"),
            Err(SpecError::InvalidAddress {
                token: "10.0.0".into(),
                position: 1,
            })
        );
        assert_eq!(
            parse_networks("  "),
            Err(SpecError::Empty { what: "networks" })
        );
    }

    #[test]
    fn test_parse_rip_networks() {
        let nets = parse_rip_networks("10.0.0.0,172.16.0.0/16").unwrap();
        assert_eq!(nets[0].address, Ipv4Addr::new(10, 0, 0, 0));
        assert_eq!(nets[1].address, Ipv4Addr::new(172, 16, 0, 0));
        assert!(parse_rip_networks("10.0.0.0/99").is_err());
    }

    #[test]
    fn test_parse_ospf_networks() {
        let nets = parse_ospf_networks("10.0.0.0/24/0,10.1.0.0/16/0.0.0.1").unwrap();
        assert_eq!(nets[0].area.to_string(), "0");
        assert_eq!(nets[1].area.to_string(), "0.0.0.1");
        assert!(matches!(
            parse_ospf_networks("10.0.0.0/24"),
            Err(SpecError::FieldCount { .. })
        ));
        assert!(matches!(
            parse_ospf_networks("10.0.0.0/24/backbone"),
            Err(SpecError::InvalidArea { .. })
        ));
    }

    #[test]
    fn test_parse_neighbors() {
        let n = parse_neighbors("192.168.1.1:65001,10.0.0.2:1.10").unwrap();
        assert_eq!(n[0].address, Ipv4Addr::new(192, 168, 1, 1));
        assert_eq!(n[0].remote_as.as_str(), "65001");
        assert_eq!(n[1].remote_as.as_str(), "1.10");
        assert!(matches!(
            parse_neighbors("192.168.1.1"),
            Err(SpecError::FieldCount { .. })
        ));
        assert!(matches!(
            parse_neighbors("192.168.1.1:sixty"),
            Err(SpecError::InvalidAsn { .. })
        ));
    }

    #[test]
    fn test_parse_static_routes() {
        let r = parse_static_routes("10.1.0.0/16/192.168.1.254").unwrap();
        assert_eq!(r[0].next_hop, Ipv4Addr::new(192, 168, 1, 254));
        assert!(parse_static_routes("10.1.0.0/16").is_err());
    }

    #[test]
    fn test_asn() {
        assert!("65000".parse::<Asn>().is_ok());
        assert!("4294967295".parse::<Asn>().is_ok());
        assert!("65000 ".parse::<Asn>().is_ok());
        assert!("".parse::<Asn>().is_err());
        assert!("65000 1".parse::<Asn>().is_err());
        assert!("+1".parse::<Asn>().is_err());
        assert!("70000.1".parse::<Asn>().is_err());
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index(None), Ok(1));
        assert_eq!(parse_index(Some("3")), Ok(3));
        assert!(parse_index(Some("0")).is_err());
        assert!(parse_index(Some("one")).is_err());
    }

    #[test]
    fn test_parse_mask_and_word() {
        assert_eq!(
            parse_mask("255.255.255.0"),
            Ok(Ipv4Addr::new(255, 255, 255, 0))
        );
        assert!(parse_mask("255.0.255.0").is_err());
        assert!(parse_word("interface", "Gi0/1").is_ok());
        assert!(parse_word("interface", "Gi0/1 shutdown").is_err());
        assert!("4095".parse::<VlanId>().is_err());
        assert_eq!("10".parse::<VlanId>().unwrap().get(), 10);
    }
}
