//! Ethernet II framing.

use super::field::Field;
use super::{Encoder, Envelope, emit_payload};
use crate::address::MacAddress;
use byteorder::{ByteOrder, NetworkEndian};

mod field {
    use super::Field;

    pub(super) const DESTINATION: Field = 0..6;
    pub(super) const SOURCE: Field = 6..12;
    pub(super) const ETHERTYPE: Field = 12..14;
}

/// Ethernet header length (no FCS is emitted)
pub const HEADER_LEN: usize = field::ETHERTYPE.end;

/// Ethernet frame parameters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EthernetFrame {
    /// Destination address
    pub dst: MacAddress,
    /// Source address
    pub src: MacAddress,
    /// EtherType used when the payload does not imply one
    pub ether_type: u16,
    /// Attached layer
    pub payload: Option<Box<Encoder>>,
}

impl EthernetFrame {
    /// EtherType that will be written.
    #[must_use]
    pub fn effective_ether_type(&self) -> u16 {
        self.payload
            .as_deref()
            .and_then(Encoder::ether_type)
            .unwrap_or(self.ether_type)
    }

    pub(crate) fn emit(&self) -> Vec<u8> {
        let payload = emit_payload(self.payload.as_deref(), &Envelope::Bare);

        let mut buf = vec![0u8; HEADER_LEN];
        buf[field::DESTINATION].copy_from_slice(self.dst.as_bytes());
        buf[field::SOURCE].copy_from_slice(self.src.as_bytes());
        NetworkEndian::write_u16(&mut buf[field::ETHERTYPE], self.effective_ether_type());

        buf.extend_from_slice(&payload);
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{Ipv4Packet, TextBuffer, ether_type};

    #[test]
    fn test_header_layout() {
        let frame = EthernetFrame {
            dst: MacAddress::BROADCAST,
            src: MacAddress::new(0x02, 0, 0, 0, 0, 0x01),
            ether_type: 0x88b5,
            payload: Some(Box::new(Encoder::Text(TextBuffer {
                text: "ab".to_string(),
            }))),
        };

        let bytes = frame.emit();
        assert_eq!(bytes.len(), HEADER_LEN + 2);
        assert_eq!(&bytes[0..6], &[0xff; 6]);
        assert_eq!(&bytes[6..12], &[0x02, 0, 0, 0, 0, 0x01]);
        assert_eq!(&bytes[12..14], &[0x88, 0xb5]);
        assert_eq!(&bytes[14..], b"ab");
    }

    #[test]
    fn test_ether_type_follows_payload() {
        let frame = EthernetFrame {
            ether_type: 0x1234,
            payload: Some(Box::new(Encoder::Ipv4(Ipv4Packet::default()))),
            ..EthernetFrame::default()
        };
        assert_eq!(frame.effective_ether_type(), ether_type::IPV4);

        let bare = EthernetFrame {
            ether_type: 0x1234,
            ..EthernetFrame::default()
        };
        assert_eq!(bare.effective_ether_type(), 0x1234);
        assert_eq!(bare.emit().len(), HEADER_LEN);
    }
}
