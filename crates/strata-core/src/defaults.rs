//! Initial field values for newly created layers.

use crate::address::MacAddress;
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, Ipv6Addr};

/// IEEE 802 local experimental EtherType
pub const EXPERIMENTAL_ETHER_TYPE: u16 = 0x88B5;

/// RFC 3692 experimental IP protocol number
pub const EXPERIMENTAL_PROTOCOL: u8 = 253;

/// IPv6 "no next header"
pub const NO_NEXT_HEADER: u8 = 59;

/// Field defaults applied when a layer is first constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Ethernet source address
    pub src_mac: MacAddress,
    /// Ethernet destination address
    pub dst_mac: MacAddress,
    /// IPv4 source address
    pub src_ipv4: Ipv4Addr,
    /// IPv4 destination address
    pub dst_ipv4: Ipv4Addr,
    /// IPv6 source address
    pub src_ipv6: Ipv6Addr,
    /// IPv6 destination address
    pub dst_ipv6: Ipv6Addr,
    /// IPv4 time to live
    pub ttl: u8,
    /// IPv6 hop limit
    pub hop_limit: u8,
    /// EtherType written when the payload implies none
    pub ether_type: u16,
    /// IPv4 protocol written when the payload implies none
    pub ip_protocol: u8,
    /// IPv6 next header written when the payload implies none
    pub next_header: u8,
    /// TCP/UDP source port
    pub src_port: u16,
    /// TCP/UDP destination port
    pub dst_port: u16,
    /// TCP receive window
    pub tcp_window: u16,
    /// Initial text payload
    pub text: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            // Locally administered unicast
            src_mac: MacAddress::new(0x02, 0x00, 0x00, 0x00, 0x00, 0x01),
            dst_mac: MacAddress::BROADCAST,
            src_ipv4: Ipv4Addr::new(192, 0, 2, 1),
            dst_ipv4: Ipv4Addr::new(192, 0, 2, 2),
            src_ipv6: Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1),
            dst_ipv6: Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 2),
            ttl: 64,
            hop_limit: 64,
            ether_type: EXPERIMENTAL_ETHER_TYPE,
            ip_protocol: EXPERIMENTAL_PROTOCOL,
            next_header: NO_NEXT_HEADER,
            src_port: 40000,
            dst_port: 80,
            tcp_window: 64240,
            text: String::new(),
        }
    }
}
