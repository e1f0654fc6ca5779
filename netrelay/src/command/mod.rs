//! CLI command generation.
//!
//! Every generator is a pure function from parsed arguments to an ordered
//! [`CommandSequence`]. Order is significant: a protocol's context line
//! (`router ospf 1`) always precedes the statements that apply inside it.
//! Generators never reorder or deduplicate.

pub mod bgp;
pub mod device;
pub mod eigrp;
pub mod ospf;
pub mod rip;
pub mod show;
pub mod static_route;

pub use show::ShowCommand;

use std::fmt;
use std::ops::Deref;

use crate::spec::Asn;

/// Ordered list of CLI configuration lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSequence(Vec<String>);

impl CommandSequence {
    /// Create an empty sequence.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a line.
    pub fn push(&mut self, line: impl Into<String>) {
        self.0.push(line.into());
    }

    /// Append a line, builder style.
    pub fn with(mut self, line: impl Into<String>) -> Self {
        self.push(line);
        self
    }

    /// Consume into the underlying lines.
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl Deref for CommandSequence {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for CommandSequence {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>> Extend<S> for CommandSequence {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

impl IntoIterator for CommandSequence {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for CommandSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("\n"))
    }
}

/// Prefix a configuration line with `no `.
pub(crate) fn negate(line: &str) -> String {
    format!("no {line}")
}

/// A dynamic routing protocol instance, for operations that don't need
/// network lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingProtocol {
    Rip,
    Ospf,
    Eigrp(Asn),
    Bgp(Asn),
}

impl RoutingProtocol {
    /// Remove the whole routing process.
    pub fn disable(&self) -> CommandSequence {
        match self {
            RoutingProtocol::Rip => rip::disable(),
            RoutingProtocol::Ospf => ospf::disable(),
            RoutingProtocol::Eigrp(asn) => eigrp::disable(asn),
            RoutingProtocol::Bgp(asn) => bgp::disable(asn),
        }
    }

    /// The read-only status command for this protocol.
    pub fn status(&self) -> ShowCommand {
        match self {
            RoutingProtocol::Rip => ShowCommand::RipDatabase,
            RoutingProtocol::Ospf => ShowCommand::OspfNeighbors,
            RoutingProtocol::Eigrp(_) => ShowCommand::EigrpNeighbors,
            RoutingProtocol::Bgp(_) => ShowCommand::BgpSummary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_order_and_display() {
        let seq = CommandSequence::new().with("router rip").with("version 2");
        assert_eq!(seq.len(), 2);
        assert_eq!(seq[0], "router rip");
        assert_eq!(seq.to_string(), "router rip\nversion 2");
    }

    #[test]
    fn test_disable() {
        let asn: Asn = "65000".parse().unwrap();
        assert_eq!(RoutingProtocol::Rip.disable().into_vec(), ["no router rip"]);
        assert_eq!(RoutingProtocol::Ospf.disable().into_vec(), ["no router ospf"]);
        assert_eq!(
            RoutingProtocol::Eigrp(asn.clone()).disable().into_vec(),
            ["no router eigrp 65000"]
        );
        assert_eq!(
            RoutingProtocol::Bgp(asn).disable().into_vec(),
            ["no router bgp 65000"]
        );
    }
}
