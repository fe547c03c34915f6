//! ICMP messages and echo bodies.

use super::{Encoder, Envelope, checksum, emit_payload, ip_protocol};
use byteorder::{ByteOrder, NetworkEndian};

/// Type, code and checksum
pub const HEADER_LEN: usize = 4;
/// Identifier and sequence number
pub const ECHO_HEADER_LEN: usize = 4;

/// ICMP message parameters, shared by both versions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IcmpMessage {
    /// Type used when the body does not imply one
    pub icmp_type: u8,
    /// Code used when the body does not imply one
    pub code: u8,
    /// Attached body
    pub payload: Option<Box<Encoder>>,
}

impl IcmpMessage {
    /// Type and code that will be written.
    #[must_use]
    pub fn effective_type(&self) -> (u8, u8) {
        self.payload
            .as_deref()
            .and_then(Encoder::icmp_type)
            .unwrap_or((self.icmp_type, self.code))
    }

    fn emit_unsummed(&self, envelope: &Envelope) -> Vec<u8> {
        let body = emit_payload(self.payload.as_deref(), envelope);
        let (icmp_type, code) = self.effective_type();

        let mut buf = Vec::with_capacity(HEADER_LEN + body.len());
        buf.extend_from_slice(&[icmp_type, code, 0, 0]);
        buf.extend_from_slice(&body);
        buf
    }

    /// ICMPv4 checksums cover the message only.
    pub(crate) fn emit_v4(&self) -> Vec<u8> {
        let mut buf = self.emit_unsummed(&Envelope::Bare);
        let sum = !checksum::data(&buf);
        NetworkEndian::write_u16(&mut buf[2..4], sum);
        buf
    }

    /// ICMPv6 checksums include the IPv6 pseudo header.
    pub(crate) fn emit_v6(&self, envelope: &Envelope) -> Vec<u8> {
        let mut buf = self.emit_unsummed(envelope);
        let length = u32::try_from(buf.len()).unwrap_or(u32::MAX);
        let sum = !checksum::combine(&[
            checksum::pseudo_header(envelope, ip_protocol::ICMPV6, length),
            checksum::data(&buf),
        ]);
        NetworkEndian::write_u16(&mut buf[2..4], sum);
        buf
    }
}

/// Echo request body: identifier, sequence number, data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EchoPayload {
    /// Identifier
    pub identifier: u16,
    /// Sequence number
    pub sequence: u16,
    /// Echo data
    pub payload: Option<Box<Encoder>>,
}

impl EchoPayload {
    pub(crate) fn emit(&self, envelope: &Envelope) -> Vec<u8> {
        let data = emit_payload(self.payload.as_deref(), envelope);

        let mut buf = vec![0u8; ECHO_HEADER_LEN];
        NetworkEndian::write_u16(&mut buf[0..2], self.identifier);
        NetworkEndian::write_u16(&mut buf[2..4], self.sequence);
        buf.extend_from_slice(&data);
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::TextBuffer;
    use std::net::Ipv6Addr;

    fn echo(identifier: u16, sequence: u16, data: &str) -> Option<Box<Encoder>> {
        Some(Box::new(Encoder::Icmpv4Echo(EchoPayload {
            identifier,
            sequence,
            payload: Some(Box::new(Encoder::Text(TextBuffer {
                text: data.to_string(),
            }))),
        })))
    }

    #[test]
    fn test_echo_request_v4() {
        let message = IcmpMessage {
            icmp_type: 3,
            code: 1,
            payload: echo(0x1234, 7, "ping"),
        };

        let bytes = message.emit_v4();
        assert_eq!(bytes.len(), HEADER_LEN + ECHO_HEADER_LEN + 4);
        assert_eq!(bytes[0], 8);
        assert_eq!(bytes[1], 0);
        assert_eq!(NetworkEndian::read_u16(&bytes[4..6]), 0x1234);
        assert_eq!(NetworkEndian::read_u16(&bytes[6..8]), 7);
        assert_eq!(&bytes[8..], b"ping");
        assert_eq!(!checksum::data(&bytes), 0);
    }

    #[test]
    fn test_configured_type_without_body() {
        let message = IcmpMessage {
            icmp_type: 13,
            code: 0,
            payload: None,
        };
        let bytes = message.emit_v4();
        assert_eq!(bytes.len(), HEADER_LEN);
        assert_eq!(bytes[0], 13);
    }

    #[test]
    fn test_v6_checksum_covers_pseudo_header() {
        let envelope = Envelope::V6 {
            src: Ipv6Addr::LOCALHOST,
            dst: Ipv6Addr::LOCALHOST,
        };
        let message = IcmpMessage {
            icmp_type: 128,
            code: 0,
            payload: None,
        };

        let bytes = message.emit_v6(&envelope);
        let length = bytes.len() as u32;
        let verify = checksum::combine(&[
            checksum::pseudo_header(&envelope, ip_protocol::ICMPV6, length),
            checksum::data(&bytes),
        ]);
        assert_eq!(!verify, 0);
        assert_ne!(bytes, message.emit_v6(&Envelope::Bare));
    }
}
