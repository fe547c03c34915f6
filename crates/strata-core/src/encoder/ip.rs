//! IPv4 and IPv6 headers.

use super::field::Field;
use super::{Encoder, Envelope, checksum, emit_payload, len_u16};
use byteorder::{ByteOrder, NetworkEndian};
use std::net::{Ipv4Addr, Ipv6Addr};

mod v4 {
    use super::Field;

    pub(super) const VER_IHL: usize = 0;
    pub(super) const DSCP_ECN: usize = 1;
    pub(super) const LENGTH: Field = 2..4;
    pub(super) const IDENT: Field = 4..6;
    pub(super) const FLG_OFF: Field = 6..8;
    pub(super) const TTL: usize = 8;
    pub(super) const PROTOCOL: usize = 9;
    pub(super) const CHECKSUM: Field = 10..12;
    pub(super) const SRC_ADDR: Field = 12..16;
    pub(super) const DST_ADDR: Field = 16..20;
}

mod v6 {
    use super::Field;

    pub(super) const VER_TC_FLOW: Field = 0..4;
    pub(super) const LENGTH: Field = 4..6;
    pub(super) const NXT_HDR: usize = 6;
    pub(super) const HOP_LIMIT: usize = 7;
    pub(super) const SRC_ADDR: Field = 8..24;
    pub(super) const DST_ADDR: Field = 24..40;
}

/// IPv4 header length without options
pub const IPV4_HEADER_LEN: usize = v4::DST_ADDR.end;
/// IPv6 fixed header length
pub const IPV6_HEADER_LEN: usize = v6::DST_ADDR.end;
/// Largest value of the 20-bit IPv6 flow label
pub const MAX_FLOW_LABEL: u32 = 0x000f_ffff;

const DONT_FRAGMENT: u16 = 0x4000;

/// IPv4 packet parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv4Packet {
    /// Source address
    pub src: Ipv4Addr,
    /// Destination address
    pub dst: Ipv4Addr,
    /// Type of service (DSCP/ECN) octet
    pub tos: u8,
    /// Identification
    pub identification: u16,
    /// Set the don't-fragment flag
    pub dont_fragment: bool,
    /// Time to live
    pub ttl: u8,
    /// Protocol used when the payload does not imply one
    pub protocol: u8,
    /// Attached layer
    pub payload: Option<Box<Encoder>>,
}

impl Default for Ipv4Packet {
    fn default() -> Self {
        Self {
            src: Ipv4Addr::UNSPECIFIED,
            dst: Ipv4Addr::UNSPECIFIED,
            tos: 0,
            identification: 0,
            dont_fragment: false,
            ttl: 64,
            protocol: 0,
            payload: None,
        }
    }
}

impl Ipv4Packet {
    /// Protocol number that will be written.
    #[must_use]
    pub fn effective_protocol(&self) -> u8 {
        self.payload
            .as_deref()
            .and_then(Encoder::ip_protocol)
            .unwrap_or(self.protocol)
    }

    pub(crate) fn emit(&self) -> Vec<u8> {
        let envelope = Envelope::V4 {
            src: self.src,
            dst: self.dst,
        };
        let payload = emit_payload(self.payload.as_deref(), &envelope);

        let mut buf = vec![0u8; IPV4_HEADER_LEN];
        buf[v4::VER_IHL] = 0x45;
        buf[v4::DSCP_ECN] = self.tos;
        NetworkEndian::write_u16(
            &mut buf[v4::LENGTH],
            len_u16(IPV4_HEADER_LEN + payload.len()),
        );
        NetworkEndian::write_u16(&mut buf[v4::IDENT], self.identification);
        let flags = if self.dont_fragment { DONT_FRAGMENT } else { 0 };
        NetworkEndian::write_u16(&mut buf[v4::FLG_OFF], flags);
        buf[v4::TTL] = self.ttl;
        buf[v4::PROTOCOL] = self.effective_protocol();
        buf[v4::SRC_ADDR].copy_from_slice(&self.src.octets());
        buf[v4::DST_ADDR].copy_from_slice(&self.dst.octets());

        let sum = !checksum::data(&buf);
        NetworkEndian::write_u16(&mut buf[v4::CHECKSUM], sum);

        buf.extend_from_slice(&payload);
        buf
    }
}

/// IPv6 packet parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv6Packet {
    /// Source address
    pub src: Ipv6Addr,
    /// Destination address
    pub dst: Ipv6Addr,
    /// Traffic class
    pub traffic_class: u8,
    /// Flow label (20 bits)
    pub flow_label: u32,
    /// Hop limit
    pub hop_limit: u8,
    /// Next header used when the payload does not imply one
    pub next_header: u8,
    /// Attached layer
    pub payload: Option<Box<Encoder>>,
}

impl Default for Ipv6Packet {
    fn default() -> Self {
        Self {
            src: Ipv6Addr::UNSPECIFIED,
            dst: Ipv6Addr::UNSPECIFIED,
            traffic_class: 0,
            flow_label: 0,
            hop_limit: 64,
            // No next header
            next_header: 59,
            payload: None,
        }
    }
}

impl Ipv6Packet {
    /// Next header number that will be written.
    #[must_use]
    pub fn effective_next_header(&self) -> u8 {
        self.payload
            .as_deref()
            .and_then(Encoder::ip_protocol)
            .unwrap_or(self.next_header)
    }

    pub(crate) fn emit(&self) -> Vec<u8> {
        let envelope = Envelope::V6 {
            src: self.src,
            dst: self.dst,
        };
        let payload = emit_payload(self.payload.as_deref(), &envelope);

        let mut buf = vec![0u8; IPV6_HEADER_LEN];
        let word = (6u32 << 28)
            | (u32::from(self.traffic_class) << 20)
            | (self.flow_label & MAX_FLOW_LABEL);
        NetworkEndian::write_u32(&mut buf[v6::VER_TC_FLOW], word);
        NetworkEndian::write_u16(&mut buf[v6::LENGTH], len_u16(payload.len()));
        buf[v6::NXT_HDR] = self.effective_next_header();
        buf[v6::HOP_LIMIT] = self.hop_limit;
        buf[v6::SRC_ADDR].copy_from_slice(&self.src.octets());
        buf[v6::DST_ADDR].copy_from_slice(&self.dst.octets());

        buf.extend_from_slice(&payload);
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{TextBuffer, UdpDatagram, ip_protocol};

    fn text(s: &str) -> Option<Box<Encoder>> {
        Some(Box::new(Encoder::Text(TextBuffer {
            text: s.to_string(),
        })))
    }

    #[test]
    fn test_ipv4_header_fields() {
        let packet = Ipv4Packet {
            src: Ipv4Addr::new(192, 168, 1, 1),
            dst: Ipv4Addr::new(192, 168, 1, 2),
            tos: 0x10,
            identification: 0xbeef,
            dont_fragment: true,
            ttl: 32,
            protocol: 253,
            payload: text("hello"),
        };

        let bytes = packet.emit();
        assert_eq!(bytes.len(), IPV4_HEADER_LEN + 5);
        assert_eq!(bytes[0], 0x45);
        assert_eq!(bytes[1], 0x10);
        assert_eq!(NetworkEndian::read_u16(&bytes[2..4]), 25);
        assert_eq!(NetworkEndian::read_u16(&bytes[4..6]), 0xbeef);
        assert_eq!(NetworkEndian::read_u16(&bytes[6..8]), 0x4000);
        assert_eq!(bytes[8], 32);
        assert_eq!(bytes[9], 253);
        assert_eq!(&bytes[12..16], &[192, 168, 1, 1]);
        assert_eq!(&bytes[16..20], &[192, 168, 1, 2]);
        assert_eq!(&bytes[20..], b"hello");
    }

    #[test]
    fn test_ipv4_header_checksum_verifies() {
        let packet = Ipv4Packet {
            src: Ipv4Addr::new(10, 0, 0, 1),
            dst: Ipv4Addr::new(10, 0, 0, 2),
            ..Ipv4Packet::default()
        };
        let bytes = packet.emit();
        assert_eq!(!checksum::data(&bytes[..IPV4_HEADER_LEN]), 0);
    }

    #[test]
    fn test_ipv4_protocol_follows_payload() {
        let packet = Ipv4Packet {
            protocol: 253,
            payload: Some(Box::new(Encoder::Udp(UdpDatagram::default()))),
            ..Ipv4Packet::default()
        };
        assert_eq!(packet.effective_protocol(), ip_protocol::UDP);
        assert_eq!(packet.emit()[9], ip_protocol::UDP);
    }

    #[test]
    fn test_ipv6_header_fields() {
        let packet = Ipv6Packet {
            src: "fe80::1".parse().unwrap(),
            dst: "fe80::2".parse().unwrap(),
            traffic_class: 0xab,
            flow_label: 0x12345,
            hop_limit: 255,
            next_header: 59,
            payload: text("xyz"),
        };

        let bytes = packet.emit();
        assert_eq!(bytes.len(), IPV6_HEADER_LEN + 3);
        assert_eq!(NetworkEndian::read_u32(&bytes[0..4]), 0x6ab1_2345);
        assert_eq!(NetworkEndian::read_u16(&bytes[4..6]), 3);
        assert_eq!(bytes[6], 59);
        assert_eq!(bytes[7], 255);
        assert_eq!(bytes[8], 0xfe);
        assert_eq!(bytes[23], 1);
        assert_eq!(bytes[39], 2);
    }

    #[test]
    fn test_ipv6_flow_label_masked() {
        let packet = Ipv6Packet {
            flow_label: 0xfff_ffff,
            ..Ipv6Packet::default()
        };
        let word = NetworkEndian::read_u32(&packet.emit()[0..4]);
        assert_eq!(word >> 28, 6);
        assert_eq!(word & MAX_FLOW_LABEL, MAX_FLOW_LABEL);
        assert_eq!((word >> 20) & 0xff, 0);
    }
}
