// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Value Objects with Validation Invariants

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use thiserror::Error;

/// Network validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Invalid IPv4 address format: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid CIDR notation: {0}")]
    InvalidCidr(String),

    #[error("Invalid prefix length: {0} (must be 0-32 for IPv4)")]
    InvalidPrefixLength(u8),

    #[error("CIDR {0} has host bits set (network address is {1})")]
    HostBitsSet(String, String),

    #[error("Invalid port: {0} (must be 0-65535)")]
    InvalidPort(i64),

    #[error("Port is not a number: {0}")]
    UnparsablePort(String),

    #[error("Invalid port range: {from}-{to} (start must not exceed end)")]
    InvalidPortRange { from: u16, to: u16 },

    #[error("Unknown protocol: {0}")]
    UnknownProtocol(String),

    #[error("Protocol {0} requires a port range")]
    PortsRequired(Protocol),

    #[error("Protocol {0} does not take a port range")]
    PortsNotAllowed(Protocol),

    #[error("Cannot carve /{new_prefix} block #{index} out of {parent}")]
    BlockExhausted {
        parent: String,
        new_prefix: u8,
        index: u32,
    },
}

/// IPv4 address block in CIDR notation
///
/// Invariants:
/// - Valid dotted-quad address
/// - Prefix length 0-32
/// - Host bits are zero (the address is the network address)
///
/// # Examples
///
/// ```rust
/// use cim_cloud_stack::domain::Cidr;
///
/// let block = Cidr::new("10.0.0.0/16").unwrap();
/// assert_eq!(block.prefix_length(), 16);
/// assert!(block.contains(&Cidr::new("10.0.3.0/24").unwrap()));
/// assert!(Cidr::new("10.0.0.1/16").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cidr {
    network: Ipv4Addr,
    prefix_length: u8,
}

impl Cidr {
    /// The `0.0.0.0/0` block
    pub const ANY: Cidr = Cidr {
        network: Ipv4Addr::UNSPECIFIED,
        prefix_length: 0,
    };

    /// Parse and validate a CIDR block
    pub fn new(cidr: impl AsRef<str>) -> Result<Self, NetworkError> {
        let cidr = cidr.as_ref().trim();

        let (addr_str, prefix_str) = cidr
            .split_once('/')
            .ok_or_else(|| NetworkError::InvalidCidr(cidr.to_string()))?;

        let address = Ipv4Addr::from_str(addr_str)
            .map_err(|_| NetworkError::InvalidIpAddress(addr_str.to_string()))?;

        let prefix_length = prefix_str
            .parse::<u8>()
            .map_err(|_| NetworkError::InvalidCidr(cidr.to_string()))?;

        let block = Self::from_parts(address, prefix_length)?;

        // Invariant: no host bits
        if block.network != address {
            return Err(NetworkError::HostBitsSet(
                cidr.to_string(),
                block.to_string(),
            ));
        }

        Ok(block)
    }

    /// Build the block containing `address`, masking off host bits
    pub fn from_parts(address: Ipv4Addr, prefix_length: u8) -> Result<Self, NetworkError> {
        if prefix_length > 32 {
            return Err(NetworkError::InvalidPrefixLength(prefix_length));
        }

        let network = Ipv4Addr::from(u32::from(address) & Self::mask(prefix_length));
        Ok(Self {
            network,
            prefix_length,
        })
    }

    fn mask(prefix_length: u8) -> u32 {
        if prefix_length == 0 {
            0
        } else {
            u32::MAX << (32 - u32::from(prefix_length))
        }
    }

    /// Network address
    pub fn network(&self) -> Ipv4Addr {
        self.network
    }

    /// Prefix length
    pub fn prefix_length(&self) -> u8 {
        self.prefix_length
    }

    /// Number of addresses in the block
    pub fn size(&self) -> u64 {
        1u64 << (32 - u32::from(self.prefix_length))
    }

    fn first(&self) -> u64 {
        u64::from(u32::from(self.network))
    }

    fn last(&self) -> u64 {
        self.first() + self.size() - 1
    }

    /// Check whether `other` lies entirely inside this block
    pub fn contains(&self, other: &Cidr) -> bool {
        other.prefix_length >= self.prefix_length
            && other.first() >= self.first()
            && other.last() <= self.last()
    }

    /// Check whether two blocks share any address
    pub fn overlaps(&self, other: &Cidr) -> bool {
        self.first() <= other.last() && other.first() <= self.last()
    }

    /// The `index`-th sub-block of size `/new_prefix`
    pub fn subdivide(&self, new_prefix: u8, index: u32) -> Result<Cidr, NetworkError> {
        let exhausted = || NetworkError::BlockExhausted {
            parent: self.to_string(),
            new_prefix,
            index,
        };

        if new_prefix > 32 {
            return Err(NetworkError::InvalidPrefixLength(new_prefix));
        }
        if new_prefix < self.prefix_length {
            return Err(exhausted());
        }

        let count = 1u64 << u32::from(new_prefix - self.prefix_length);
        if u64::from(index) >= count {
            return Err(exhausted());
        }

        let step = 1u64 << (32 - u32::from(new_prefix));
        let start = self.first() + u64::from(index) * step;
        let start = u32::try_from(start).map_err(|_| exhausted())?;
        Cidr::from_parts(Ipv4Addr::from(start), new_prefix)
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix_length)
    }
}

impl FromStr for Cidr {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Cidr {
    type Error = NetworkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Cidr> for String {
    fn from(value: Cidr) -> Self {
        value.to_string()
    }
}

/// TCP/UDP port value object
///
/// Invariants:
/// - Port must be 0-65535
///
/// Raw values arrive as signed integers from configuration so that
/// out-of-range input is reported instead of silently truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u16")]
pub struct Port(u16);

impl Port {
    pub const SSH: Port = Port(22);
    pub const HTTP: Port = Port(80);
    pub const HTTPS: Port = Port(443);

    /// Create a port with validation
    pub fn new(port: i64) -> Result<Self, NetworkError> {
        u16::try_from(port)
            .map(Self)
            .map_err(|_| NetworkError::InvalidPort(port))
    }

    /// Get the port number
    pub fn value(&self) -> u16 {
        self.0
    }

    /// Well-known service label, used for rule descriptions
    pub fn service_name(&self) -> Option<&'static str> {
        match self.0 {
            22 => Some("SSH"),
            80 => Some("HTTP"),
            443 => Some("HTTPS"),
            _ => None,
        }
    }
}

impl From<u16> for Port {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl From<Port> for u16 {
    fn from(value: Port) -> Self {
        value.0
    }
}

impl TryFrom<i64> for Port {
    type Error = NetworkError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for Port {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .trim()
            .parse::<i64>()
            .map_err(|_| NetworkError::UnparsablePort(s.to_string()))?;
        Self::new(raw)
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inclusive port range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortRange {
    from: Port,
    to: Port,
}

impl PortRange {
    /// Create a range, requiring `from <= to`
    pub fn new(from: Port, to: Port) -> Result<Self, NetworkError> {
        if from > to {
            return Err(NetworkError::InvalidPortRange {
                from: from.value(),
                to: to.value(),
            });
        }
        Ok(Self { from, to })
    }

    /// Range covering a single port
    pub fn single(port: Port) -> Self {
        Self { from: port, to: port }
    }

    pub fn from_port(&self) -> Port {
        self.from
    }

    pub fn to_port(&self) -> Port {
        self.to
    }

    pub fn is_single(&self) -> bool {
        self.from == self.to
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single() {
            write!(f, "{}", self.from)
        } else {
            write!(f, "{}-{}", self.from, self.to)
        }
    }
}

/// IP protocol of a traffic rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
    /// All protocols (`-1`)
    All,
}

impl Protocol {
    /// Wire value used in security group rules
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
            Self::Icmp => "icmp",
            Self::All => "-1",
        }
    }

    /// Whether rules for this protocol must carry a port range
    pub fn requires_ports(&self) -> bool {
        matches!(self, Self::Tcp | Self::Udp)
    }
}

impl FromStr for Protocol {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tcp" | "6" => Ok(Self::Tcp),
            "udp" | "17" => Ok(Self::Udp),
            "icmp" | "1" => Ok(Self::Icmp),
            "all" | "-1" => Ok(Self::All),
            other => Err(NetworkError::UnknownProtocol(other.to_string())),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Source of inbound traffic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Peer(Cidr);

impl Peer {
    /// Any IPv4 address (`0.0.0.0/0`)
    pub fn any_ipv4() -> Self {
        Self(Cidr::ANY)
    }

    /// A specific IPv4 block
    pub fn ipv4(cidr: Cidr) -> Self {
        Self(cidr)
    }

    pub fn cidr(&self) -> Cidr {
        self.0
    }

    pub fn is_anywhere(&self) -> bool {
        self.0 == Cidr::ANY
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cidr_parsing() {
        let block = Cidr::new("10.0.0.0/16").unwrap();
        assert_eq!(block.network().to_string(), "10.0.0.0");
        assert_eq!(block.prefix_length(), 16);
        assert_eq!(block.size(), 65536);
        assert_eq!(block.to_string(), "10.0.0.0/16");
    }

    #[test]
    fn test_invalid_cidr() {
        assert!(Cidr::new("10.0.0.0").is_err()); // No prefix
        assert!(Cidr::new("999.0.0.0/8").is_err()); // Bad octet
        assert!(Cidr::new("10.0.0.0/33").is_err()); // Prefix too long
        assert!(Cidr::new("10.0.0.0/abc").is_err());
        assert!(matches!(
            Cidr::new("10.0.0.5/16"),
            Err(NetworkError::HostBitsSet(_, _))
        ));
    }

    #[test]
    fn test_containment_and_overlap() {
        let vpc = Cidr::new("10.0.0.0/16").unwrap();
        let inside = Cidr::new("10.0.1.0/24").unwrap();
        let outside = Cidr::new("10.1.0.0/24").unwrap();

        assert!(vpc.contains(&inside));
        assert!(!inside.contains(&vpc));
        assert!(vpc.overlaps(&inside));
        assert!(!vpc.overlaps(&outside));
        assert!(Cidr::ANY.contains(&outside));
    }

    #[test]
    fn test_subdivide() {
        let vpc = Cidr::new("10.0.0.0/16").unwrap();
        assert_eq!(vpc.subdivide(24, 0).unwrap().to_string(), "10.0.0.0/24");
        assert_eq!(vpc.subdivide(24, 3).unwrap().to_string(), "10.0.3.0/24");
        assert_eq!(vpc.subdivide(24, 255).unwrap().to_string(), "10.0.255.0/24");
        assert!(vpc.subdivide(24, 256).is_err());
        assert!(vpc.subdivide(8, 0).is_err());
    }

    #[test]
    fn test_port_bounds() {
        assert_eq!(Port::new(0).unwrap().value(), 0);
        assert_eq!(Port::new(65535).unwrap().value(), 65535);
        assert_eq!(Port::new(65536), Err(NetworkError::InvalidPort(65536)));
        assert_eq!(Port::new(-1), Err(NetworkError::InvalidPort(-1)));
        assert!("70000".parse::<Port>().is_err());
        assert_eq!("443".parse::<Port>().unwrap(), Port::HTTPS);
    }

    #[test]
    fn test_port_range() {
        let range = PortRange::new(Port::from(1024), Port::from(2048)).unwrap();
        assert_eq!(range.to_string(), "1024-2048");
        assert!(PortRange::new(Port::from(2048), Port::from(1024)).is_err());
        assert_eq!(PortRange::single(Port::SSH).to_string(), "22");
    }

    #[test]
    fn test_protocol() {
        assert_eq!("TCP".parse::<Protocol>().unwrap(), Protocol::Tcp);
        assert_eq!("-1".parse::<Protocol>().unwrap(), Protocol::All);
        assert!("sctp".parse::<Protocol>().is_err());
        assert!(Protocol::Tcp.requires_ports());
        assert!(!Protocol::All.requires_ports());
    }

    #[test]
    fn test_peer() {
        assert!(Peer::any_ipv4().is_anywhere());
        assert_eq!(Peer::any_ipv4().to_string(), "0.0.0.0/0");
    }
}
