//! Byte encoders for configured layers.
//!
//! A configured leaf layer yields an [`Encoder`]: its header parameters plus
//! the encoder of whatever layer is attached beneath it. Encoding walks the
//! chain outside-in. Each layer first encodes its payload, passing down the
//! [`Envelope`] (IP addresses) needed for pseudo-header checksums, then writes
//! its own header in front. Type fields of the outer layer (EtherType, IP
//! protocol, ICMP type) are derived from the attached payload when it is a
//! known layer, and fall back to the configured value otherwise.
//!
//! All multi-byte fields are big-endian (network byte order).

mod checksum;
mod ethernet;
mod icmp;
mod ip;
mod transport;

pub use ethernet::EthernetFrame;
pub use icmp::{EchoPayload, IcmpMessage};
pub use ip::{Ipv4Packet, Ipv6Packet, MAX_FLOW_LABEL};
pub use transport::{TcpFlags, TcpSegment, UdpDatagram};

use crate::grammar::LayerKind;
use std::net::{Ipv4Addr, Ipv6Addr};

pub(crate) mod field {
    pub(crate) type Field = ::core::ops::Range<usize>;
}

/// EtherType values
pub mod ether_type {
    /// Internet Protocol version 4
    pub const IPV4: u16 = 0x0800;
    /// Internet Protocol version 6
    pub const IPV6: u16 = 0x86DD;
}

/// IP protocol / IPv6 next-header numbers
pub mod ip_protocol {
    /// ICMP for IPv4
    pub const ICMP: u8 = 1;
    /// Transmission Control Protocol
    pub const TCP: u8 = 6;
    /// User Datagram Protocol
    pub const UDP: u8 = 17;
    /// ICMP for IPv6
    pub const ICMPV6: u8 = 58;
}

/// ICMP echo request type/code pairs
pub mod icmp_echo {
    /// ICMPv4 echo request
    pub const V4: (u8, u8) = (8, 0);
    /// ICMPv6 echo request
    pub const V6: (u8, u8) = (128, 0);
}

/// Addresses of the enclosing IP layer, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    /// No IP layer above
    Bare,
    /// Inside an IPv4 packet
    V4 {
        /// Source address
        src: Ipv4Addr,
        /// Destination address
        dst: Ipv4Addr,
    },
    /// Inside an IPv6 packet
    V6 {
        /// Source address
        src: Ipv6Addr,
        /// Destination address
        dst: Ipv6Addr,
    },
}

/// A raw text payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextBuffer {
    /// Payload text, emitted as UTF-8
    pub text: String,
}

/// The byte-producing artifact of a configured layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoder {
    /// Ethernet II frame
    Ethernet(EthernetFrame),
    /// IPv4 packet
    Ipv4(Ipv4Packet),
    /// IPv6 packet
    Ipv6(Ipv6Packet),
    /// ICMPv4 message
    Icmpv4(IcmpMessage),
    /// ICMPv6 message
    Icmpv6(IcmpMessage),
    /// ICMPv4 echo body
    Icmpv4Echo(EchoPayload),
    /// ICMPv6 echo body
    Icmpv6Echo(EchoPayload),
    /// TCP segment
    Tcp(TcpSegment),
    /// UDP datagram
    Udp(UdpDatagram),
    /// Text payload
    Text(TextBuffer),
}

impl Encoder {
    /// Layer kind this encoder was built for
    #[must_use]
    pub fn kind(&self) -> LayerKind {
        match self {
            Self::Ethernet(_) => LayerKind::EthernetFrame,
            Self::Ipv4(_) => LayerKind::Ipv4Frame,
            Self::Ipv6(_) => LayerKind::Ipv6Frame,
            Self::Icmpv4(_) => LayerKind::Icmpv4Frame,
            Self::Icmpv6(_) => LayerKind::Icmpv6Frame,
            Self::Icmpv4Echo(_) => LayerKind::Icmpv4EchoPayload,
            Self::Icmpv6Echo(_) => LayerKind::Icmpv6EchoPayload,
            Self::Tcp(_) => LayerKind::TcpFrame,
            Self::Udp(_) => LayerKind::UdpFrame,
            Self::Text(_) => LayerKind::TextBuffer,
        }
    }

    /// Encode the full layer chain to wire bytes.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        self.emit(&Envelope::Bare)
    }

    /// Encode with the given IP envelope for pseudo-header checksums.
    #[must_use]
    pub fn emit(&self, envelope: &Envelope) -> Vec<u8> {
        match self {
            Self::Ethernet(frame) => frame.emit(),
            Self::Ipv4(packet) => packet.emit(),
            Self::Ipv6(packet) => packet.emit(),
            Self::Icmpv4(message) => message.emit_v4(),
            Self::Icmpv6(message) => message.emit_v6(envelope),
            Self::Icmpv4Echo(echo) | Self::Icmpv6Echo(echo) => echo.emit(envelope),
            Self::Tcp(segment) => segment.emit(envelope),
            Self::Udp(datagram) => datagram.emit(envelope),
            Self::Text(buffer) => buffer.text.as_bytes().to_vec(),
        }
    }

    /// EtherType an enclosing Ethernet frame should carry.
    #[must_use]
    pub fn ether_type(&self) -> Option<u16> {
        match self {
            Self::Ipv4(_) => Some(ether_type::IPV4),
            Self::Ipv6(_) => Some(ether_type::IPV6),
            _ => None,
        }
    }

    /// Protocol number an enclosing IP header should carry.
    #[must_use]
    pub fn ip_protocol(&self) -> Option<u8> {
        match self {
            Self::Icmpv4(_) => Some(ip_protocol::ICMP),
            Self::Icmpv6(_) => Some(ip_protocol::ICMPV6),
            Self::Tcp(_) => Some(ip_protocol::TCP),
            Self::Udp(_) => Some(ip_protocol::UDP),
            _ => None,
        }
    }

    /// ICMP type and code an enclosing ICMP message should carry.
    #[must_use]
    pub fn icmp_type(&self) -> Option<(u8, u8)> {
        match self {
            Self::Icmpv4Echo(_) => Some(icmp_echo::V4),
            Self::Icmpv6Echo(_) => Some(icmp_echo::V6),
            _ => None,
        }
    }
}

/// Encode an optional payload, empty when absent.
pub(crate) fn emit_payload(payload: Option<&Encoder>, envelope: &Envelope) -> Vec<u8> {
    payload.map_or_else(Vec::new, |inner| inner.emit(envelope))
}

/// Clamp a length to a 16-bit header field.
pub(crate) fn len_u16(len: usize) -> u16 {
    u16::try_from(len).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_encodes_utf8() {
        let text = Encoder::Text(TextBuffer {
            text: "héllo".to_string(),
        });
        assert_eq!(text.encode(), "héllo".as_bytes());
        assert_eq!(text.kind(), LayerKind::TextBuffer);
        assert_eq!(text.ether_type(), None);
        assert_eq!(text.ip_protocol(), None);
    }

    #[test]
    fn test_type_hints() {
        let udp = Encoder::Udp(UdpDatagram::default());
        assert_eq!(udp.ip_protocol(), Some(ip_protocol::UDP));

        let echo = Encoder::Icmpv6Echo(EchoPayload::default());
        assert_eq!(echo.icmp_type(), Some((128, 0)));
    }

    #[test]
    fn test_len_clamps() {
        assert_eq!(len_u16(20), 20);
        assert_eq!(len_u16(70_000), u16::MAX);
    }
}
